use std::fmt::{self, Display, Formatter};

use colored::Colorize;

use crate::common::source::SourceText;

/// A `Span` refers to a section of a [`SourceText`],
/// much like a `&str`, but stored as a pair of absolute byte offsets.
/// Spans are `Copy`, so they are passed around freely;
/// to read the text a span covers, pair it with the source it came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub length: usize,
}

impl Span {
    /// Create a new `Span` from an offset with a length.
    pub fn new(start: usize, length: usize) -> Span {
        Span { start, length }
    }

    /// Create a `Span` covering `start..end`.
    /// If `end` lies before `start`, the span is empty.
    pub fn from_bounds(start: usize, end: usize) -> Span {
        Span::new(start, end.saturating_sub(start))
    }

    /// A `Span` that points at a specific point in the source.
    /// Has a length of `0`.
    pub fn point(offset: usize) -> Span {
        Span::new(offset, 0)
    }

    /// Return the index of the end of the `Span`.
    pub fn end(&self) -> usize {
        self.start + self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Creates a new `Span` which spans the space of the previous two.
    /// ```plain
    /// hello this is cool
    /// ^^^^^              | Span a
    ///            ^^      | Span b
    /// ^^^^^^^^^^^^^      | combined
    /// ```
    pub fn combine(a: &Span, b: &Span) -> Span {
        Span::from_bounds(a.start.min(b.start), a.end().max(b.end()))
    }

    /// Resolves this span against the source it came from,
    /// splitting the first line it touches into the text before,
    /// inside and after the span.
    pub fn format(&self, source: &SourceText) -> FormattedSpan {
        let line_index = source.line_index(self.start);
        let line = source.lines()[line_index];

        let start = self.start.min(line.end());
        let end = self.end().clamp(start, line.end());

        FormattedSpan {
            line: line_index + 1,
            column: self.start - line.start + 1,
            prefix: source.slice(Span::from_bounds(line.start, start)).to_string(),
            highlight: source.slice(Span::from_bounds(start, end)).to_string(),
            suffix: source.slice(Span::from_bounds(end, line.end())).to_string(),
        }
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end())
    }
}

/// Represents a formatted span, ready to be displayed.
/// Lines and columns are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedSpan {
    pub line: usize,
    pub column: usize,
    pub prefix: String,
    pub highlight: String,
    pub suffix: String,
}

impl Display for FormattedSpan {
    /// Writes the offending line with the spanned text in red:
    /// ```plain
    ///     var x = 10 + true
    /// ```
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "    {}{}{}", self.prefix, self.highlight.red(), self.suffix)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn combination() {
        let a = Span::new(0, 5);
        let b = Span::new(11, 2);

        assert_eq!(Span::combine(&a, &b), Span::new(0, 13));
        assert_eq!(Span::combine(&b, &a), Span::new(0, 13));
    }

    #[test]
    fn bounds() {
        assert_eq!(Span::from_bounds(3, 7), Span::new(3, 4));
        assert_eq!(Span::from_bounds(7, 3), Span::point(7));
        assert_eq!(Span::new(3, 4).end(), 7);
    }

    #[test]
    fn format_second_line() {
        colored::control::set_override(false);
        let source = SourceText::new("var x = 1\nx = true\n");
        let formatted = Span::new(14, 4).format(&source);

        assert_eq!(formatted.line, 2);
        assert_eq!(formatted.column, 5);
        assert_eq!(formatted.prefix, "x = ");
        assert_eq!(formatted.highlight, "true");
        assert_eq!(formatted.suffix, "");
    }

    #[test]
    fn format_clamps_to_line() {
        let source = SourceText::new("{\n  \"abc\n}");
        let formatted = Span::new(4, 20).format(&source);

        assert_eq!(formatted.line, 2);
        assert_eq!(formatted.highlight, "\"abc");
    }

    #[test]
    fn empty() {
        let source = SourceText::new("");
        let formatted = Span::point(0).format(&source);
        assert_eq!((formatted.line, formatted.column), (1, 1));
    }
}
