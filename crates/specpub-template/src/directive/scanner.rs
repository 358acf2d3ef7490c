//! Directive scanner.
//!
//! Finds the next `<% ... %>` or `[% ... %]` span in a buffer. Delimiters do
//! not nest: the closer is the first matching closer after the opener.

use crate::error::ScanError;

/// Which delimiter pair a directive uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DelimiterStyle {
    /// `<% ... %>`
    Angle,
    /// `[% ... %]`
    Bracket,
}

impl DelimiterStyle {
    /// Opening sequence.
    #[must_use]
    pub fn opener(self) -> &'static str {
        match self {
            Self::Angle => "<%",
            Self::Bracket => "[%",
        }
    }

    /// Closing sequence.
    #[must_use]
    pub fn closer(self) -> &'static str {
        match self {
            Self::Angle => "%>",
            Self::Bracket => "%]",
        }
    }
}

/// Location of one directive in a buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DirectiveSpan<'a> {
    /// Delimiter style.
    pub style: DelimiterStyle,
    /// Byte offset of the opener.
    pub start: usize,
    /// Byte offset just past the closer.
    pub end: usize,
    /// Text between the delimiters, untrimmed.
    pub body: &'a str,
    /// Opener of a bracket directive that was passed over because this
    /// angle directive sits inside its body.
    pub enclosing: Option<usize>,
}

impl<'a> DirectiveSpan<'a> {
    /// Text before the directive.
    #[must_use]
    pub fn before(&self, buffer: &'a str) -> &'a str {
        &buffer[..self.start]
    }

    /// Text after the directive.
    #[must_use]
    pub fn after(&self, buffer: &'a str) -> &'a str {
        &buffer[self.end..]
    }

    /// Where scanning must resume once this directive has been replaced.
    ///
    /// Nothing before the returned offset can hold an unresolved opener.
    #[must_use]
    pub fn resume_at(&self) -> usize {
        self.enclosing.map_or(self.start, |opener| opener.min(self.start))
    }
}

/// Find the first directive in `buffer`.
///
/// # Errors
///
/// Returns [`ScanError::Unterminated`] if the first opener has no closer.
pub fn find_directive(buffer: &str) -> Result<Option<DirectiveSpan<'_>>, ScanError> {
    find_directive_from(buffer, 0)
}

/// Find the first directive starting at or after byte offset `from`.
///
/// `from` must lie on a character boundary. The character before `from` is
/// still consulted to recognise an escaped opener.
///
/// # Errors
///
/// Returns [`ScanError::Unterminated`] if the first opener has no closer.
pub fn find_directive_from(buffer: &str, from: usize) -> Result<Option<DirectiveSpan<'_>>, ScanError> {
    let angle = find_unescaped(buffer, DelimiterStyle::Angle.opener(), from);
    let bracket = find_unescaped(buffer, DelimiterStyle::Bracket.opener(), from);

    let (style, start, enclosing) = match (angle, bracket) {
        (None, None) => return Ok(None),
        (Some(a), None) => (DelimiterStyle::Angle, a, None),
        (None, Some(b)) => (DelimiterStyle::Bracket, b, None),
        (Some(a), Some(b)) if a < b => (DelimiterStyle::Angle, a, None),
        (Some(a), Some(b)) => {
            // An angle opener inside the bracket body still wins.
            let bracket_close = buffer[b + 2..].find(DelimiterStyle::Bracket.closer());
            if bracket_close.is_some_and(|close| a < b + 2 + close) {
                (DelimiterStyle::Angle, a, Some(b))
            } else {
                (DelimiterStyle::Bracket, b, None)
            }
        }
    };

    let body_start = start + style.opener().len();
    let Some(close) = buffer[body_start..].find(style.closer()) else {
        return Err(ScanError::Unterminated {
            opener: style.opener(),
            offset: start,
        });
    };
    let body_end = body_start + close;

    Ok(Some(DirectiveSpan {
        style,
        start,
        end: body_end + style.closer().len(),
        body: &buffer[body_start..body_end],
        enclosing,
    }))
}

/// Count unescaped openers of either style.
#[must_use]
pub fn count_openers(buffer: &str) -> usize {
    [DelimiterStyle::Angle, DelimiterStyle::Bracket]
        .into_iter()
        .map(|style| {
            let mut count = 0;
            let mut from = 0;
            while let Some(pos) = find_unescaped(buffer, style.opener(), from) {
                count += 1;
                from = pos + style.opener().len();
            }
            count
        })
        .sum()
}

/// Position of the first `pattern` at or after `from` not preceded by a backslash.
fn find_unescaped(buffer: &str, pattern: &str, from: usize) -> Option<usize> {
    let mut search = from;
    while let Some(offset) = buffer.get(search..)?.find(pattern) {
        let pos = search + offset;
        if pos == 0 || buffer.as_bytes()[pos - 1] != b'\\' {
            return Some(pos);
        }
        search = pos + pattern.len();
    }
    None
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_no_directive() {
        assert_eq!(find_directive("<p>plain 50% text</p>").unwrap(), None);
    }

    #[test]
    fn test_angle_directive() {
        let buffer = "<a>1<% id %>0</a>";
        let span = find_directive(buffer).unwrap().unwrap();
        assert_eq!(span.style, DelimiterStyle::Angle);
        assert_eq!(span.body, " id ");
        assert_eq!(span.before(buffer), "<a>1");
        assert_eq!(span.after(buffer), "0</a>");
    }

    #[test]
    fn test_bracket_directive() {
        let buffer = "x[%! note %]y";
        let span = find_directive(buffer).unwrap().unwrap();
        assert_eq!(span.style, DelimiterStyle::Bracket);
        assert_eq!(span.body, "! note ");
        assert_eq!(span.after(buffer), "y");
    }

    #[test]
    fn test_first_opener_wins() {
        let buffer = "[% a %] <% b %>";
        let span = find_directive(buffer).unwrap().unwrap();
        assert_eq!(span.style, DelimiterStyle::Bracket);
        assert_eq!(span.body, " a ");
    }

    #[test]
    fn test_angle_preferred_before_bracket_closer() {
        let buffer = "[% a <% b %> %]";
        let span = find_directive(buffer).unwrap().unwrap();
        assert_eq!(span.style, DelimiterStyle::Angle);
        assert_eq!(span.body, " b ");
        assert_eq!(span.enclosing, Some(0));
        assert_eq!(span.resume_at(), 0);
    }

    #[test]
    fn test_resume_at_plain_directive() {
        let buffer = "ab<% x %>[% y %]";
        let span = find_directive(buffer).unwrap().unwrap();
        assert_eq!(span.enclosing, None);
        assert_eq!(span.resume_at(), 2);
    }

    #[test]
    fn test_closer_is_plain_substring() {
        let buffer = "<% a <% b %> c %>";
        let span = find_directive(buffer).unwrap().unwrap();
        assert_eq!(span.body, " a <% b ");
    }

    #[test]
    fn test_unterminated() {
        let err = find_directive("text <% never closed").unwrap_err();
        assert_eq!(
            err,
            ScanError::Unterminated {
                opener: "<%",
                offset: 5
            }
        );
    }

    #[test]
    fn test_escaped_openers_skipped() {
        let buffer = r"literal \<% and \[% then <% real %>";
        let span = find_directive(buffer).unwrap().unwrap();
        assert_eq!(span.body, " real ");
        assert_eq!(count_openers(buffer), 1);
    }

    #[test]
    fn test_find_from_offset() {
        let buffer = "<% a %><% b %>";
        let span = find_directive_from(buffer, 7).unwrap().unwrap();
        assert_eq!(span.body, " b ");
        assert_eq!(span.start, 7);
    }

    #[test]
    fn test_find_from_respects_preceding_escape() {
        let buffer = r"\<% x %>";
        assert_eq!(find_directive_from(buffer, 1).unwrap(), None);
    }

    #[test]
    fn test_count_matches_single_style_templates() {
        let angle = "<% a %> text <% b c %> <%! d %>";
        let bracket = "[% a %][% b %]";
        assert_eq!(count_openers(angle), 3);
        assert_eq!(count_openers(bracket), 2);

        let mut found = 0;
        let mut from = 0;
        while let Some(span) = find_directive_from(angle, from).unwrap() {
            found += 1;
            from = span.end;
        }
        assert_eq!(found, 3);
    }
}
