//! Directive body parsing.
//!
//! A body is split on whitespace into a command and positional arguments.
//! Bodies starting with `!` are comments and produce no output.

use super::scanner::DelimiterStyle;
use crate::error::ResolveError;

/// A parsed directive.
///
/// Built per scan and discarded once resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Directive {
    /// Delimiter style the directive was written with.
    pub style: DelimiterStyle,
    /// Trimmed body text.
    pub raw: String,
    /// Command name (first word). Empty for comments.
    pub command: String,
    /// Remaining words.
    pub args: Vec<String>,
}

impl Directive {
    /// Parse a raw directive body.
    #[must_use]
    pub fn parse(style: DelimiterStyle, body: &str) -> Self {
        let raw = body.trim();
        if raw.starts_with('!') {
            return Self {
                style,
                raw: raw.to_owned(),
                command: String::new(),
                args: Vec::new(),
            };
        }
        let mut words = raw.split_whitespace().map(str::to_owned);
        let command = words.next().unwrap_or_default();
        Self {
            style,
            raw: raw.to_owned(),
            command,
            args: words.collect(),
        }
    }

    /// True for `!` comment directives.
    #[must_use]
    pub fn is_comment(&self) -> bool {
        self.raw.starts_with('!')
    }

    /// Positional argument.
    #[must_use]
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    /// Positional argument that must be present.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::MissingArgument`] naming the argument.
    pub fn require(&self, index: usize, name: &'static str) -> Result<&str, ResolveError> {
        self.arg(index).ok_or_else(|| ResolveError::MissingArgument {
            command: self.command.clone(),
            argument: name,
        })
    }

    /// Untouched text after the command word.
    ///
    /// Free-text commands read this instead of the split arguments so that
    /// spacing is preserved.
    #[must_use]
    pub fn remainder(&self) -> &str {
        self.raw[self.command.len()..].trim()
    }

    /// Untouched text after a command prefix, with one optional `:` removed.
    ///
    /// Used by commands matched by prefix, such as `settitle:Some Title`.
    #[must_use]
    pub fn text_after(&self, prefix: &str) -> &str {
        let rest = self.raw.strip_prefix(prefix).unwrap_or(&self.raw);
        rest.strip_prefix(':').unwrap_or(rest).trim()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_command_and_args() {
        let directive = Directive::parse(DelimiterStyle::Angle, "  vsref  gender   link ");
        assert_eq!(directive.command, "vsref");
        assert_eq!(directive.args, ["gender", "link"]);
        assert_eq!(directive.raw, "vsref  gender   link");
        assert!(!directive.is_comment());
    }

    #[test]
    fn test_comment() {
        let directive = Directive::parse(DelimiterStyle::Bracket, "! comment here ");
        assert!(directive.is_comment());
        assert_eq!(directive.command, "");
        assert!(directive.args.is_empty());
    }

    #[test]
    fn test_comment_without_space() {
        assert!(Directive::parse(DelimiterStyle::Angle, "!todo fix").is_comment());
    }

    #[test]
    fn test_remainder_keeps_spacing() {
        let directive = Directive::parse(DelimiterStyle::Angle, "qa-warn two  spaces here");
        assert_eq!(directive.remainder(), "two  spaces here");
    }

    #[test]
    fn test_text_after_prefix() {
        let directive = Directive::parse(DelimiterStyle::Angle, "settitle:Patient  {version}");
        assert_eq!(directive.command, "settitle:Patient");
        assert_eq!(directive.text_after("settitle"), "Patient  {version}");

        let spaced = Directive::parse(DelimiterStyle::Angle, "settitle Patient Resource");
        assert_eq!(spaced.text_after("settitle"), "Patient Resource");
    }

    #[test]
    fn test_require() {
        let directive = Directive::parse(DelimiterStyle::Angle, "include");
        let err = directive.require(0, "template").unwrap_err();
        assert_eq!(
            err.to_string(),
            "`include` requires argument `template`"
        );
    }

    #[test]
    fn test_empty_body() {
        let directive = Directive::parse(DelimiterStyle::Angle, "   ");
        assert_eq!(directive.command, "");
        assert_eq!(directive.remainder(), "");
    }
}
