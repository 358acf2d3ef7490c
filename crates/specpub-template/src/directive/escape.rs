//! Escaped delimiters.
//!
//! A backslash before an opener (`\<%`, `\[%`) makes it literal. The scanner
//! skips escaped openers; the outermost page expansion removes the
//! backslashes once no directive is left.

/// Escape every opener so the text can be returned by a resolver.
#[must_use]
pub fn escape_delimiters(text: &str) -> String {
    if !text.contains("<%") && !text.contains("[%") {
        return text.to_owned();
    }
    text.replace("<%", "\\<%").replace("[%", "\\[%")
}

/// Turn escaped openers back into literal ones.
#[must_use]
pub fn unescape_delimiters(text: &str) -> String {
    if !text.contains('\\') {
        return text.to_owned();
    }
    text.replace("\\<%", "<%").replace("\\[%", "[%")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::directive::count_openers;

    #[test]
    fn test_escape_hides_openers_from_scanner() {
        let escaped = escape_delimiters("use <% id %> or [% id %]");
        assert_eq!(escaped, r"use \<% id %> or \[% id %]");
        assert_eq!(count_openers(&escaped), 0);
    }

    #[test]
    fn test_unescape_restores_text() {
        let text = "use <% id %> or [% id %]";
        assert_eq!(unescape_delimiters(&escape_delimiters(text)), text);
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(escape_delimiters("100% [x]"), "100% [x]");
        assert_eq!(unescape_delimiters(r"C:\path"), r"C:\path");
    }
}
