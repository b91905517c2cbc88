use std::{fmt, sync::Arc};

use crate::common::span::Span;

/// One line of a [`SourceText`].
/// `length` excludes the line break, `length_including_break` does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line {
    pub start: usize,
    pub length: usize,
    pub length_including_break: usize,
}

impl Line {
    pub fn end(&self) -> usize {
        self.start + self.length
    }

    pub fn span(&self) -> Span {
        Span::new(self.start, self.length)
    }
}

/// `SourceText` represents some literal source code,
/// whether a single REPL submission or a whole program.
/// It's essentially an immutable string with a line table,
/// so that absolute offsets (as stored in [`Span`]s)
/// can be mapped back to lines and columns when reporting.
#[derive(Debug, PartialEq, Eq)]
pub struct SourceText {
    contents: String,
    lines: Vec<Line>,
}

impl SourceText {
    /// Builds a shared `SourceText`, indexing its lines.
    /// `\r\n`, `\r` and `\n` all count as a single line break.
    /// There is always at least one line, even if the text is empty.
    pub fn new(contents: &str) -> Arc<SourceText> {
        Arc::new(SourceText {
            contents: contents.to_string(),
            lines: SourceText::index_lines(contents),
        })
    }

    fn index_lines(contents: &str) -> Vec<Line> {
        let bytes = contents.as_bytes();
        let mut lines = vec![];
        let mut line_start = 0;
        let mut position = 0;

        while position < bytes.len() {
            let width = match (bytes[position], bytes.get(position + 1)) {
                (b'\r', Some(b'\n')) => 2,
                (b'\r' | b'\n', _) => 1,
                _ => 0,
            };

            if width == 0 {
                position += 1;
                continue;
            }

            lines.push(Line {
                start: line_start,
                length: position - line_start,
                length_including_break: position - line_start + width,
            });
            position += width;
            line_start = position;
        }

        lines.push(Line {
            start: line_start,
            length: position - line_start,
            length_including_break: position - line_start,
        });
        lines
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Returns the index of the line containing `offset`.
    /// Offsets past the end of the text resolve to the last line.
    pub fn line_index(&self, offset: usize) -> usize {
        self.lines
            .partition_point(|line| line.start <= offset)
            .saturating_sub(1)
    }

    /// Maps an absolute offset to a 1-based `(line, column)` pair.
    pub fn line_column(&self, offset: usize) -> (usize, usize) {
        let index = self.line_index(offset);
        let start = self.lines[index].start;
        (index + 1, offset.saturating_sub(start) + 1)
    }

    /// Returns the text a span covers.
    /// Spans that fall outside of the text, or that
    /// split a character, produce an empty string.
    pub fn slice(&self, span: Span) -> &str {
        self.contents.get(span.start..span.end()).unwrap_or("")
    }
}

impl fmt::Display for SourceText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.contents)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn single_line() {
        let source = SourceText::new("print(\"hi\")");
        assert_eq!(source.lines().len(), 1);
        assert_eq!(source.lines()[0].length, 11);
    }

    #[test]
    fn line_breaks() {
        for text in ["a\nb", "a\rb", "a\r\nb"] {
            let source = SourceText::new(text);
            assert_eq!(source.lines().len(), 2, "{:?}", text);
            assert_eq!(source.lines()[0].length, 1);
            assert_eq!(source.slice(source.lines()[1].span()), "b");
        }
    }

    #[test]
    fn trailing_break_adds_empty_line() {
        let source = SourceText::new("x\n");
        assert_eq!(source.lines().len(), 2);
        assert_eq!(source.lines()[1], Line {
            start: 2,
            length: 0,
            length_including_break: 0,
        });
    }

    #[test]
    fn line_columns() {
        let source = SourceText::new("var a = 1\r\n{\n  a = 2\n}");
        assert_eq!(source.line_column(0), (1, 1));
        assert_eq!(source.line_column(4), (1, 5));
        assert_eq!(source.line_column(11), (2, 1));
        assert_eq!(source.line_column(15), (3, 3));
        assert_eq!(source.line_column(source.len()), (4, 2));
    }

    #[test]
    fn slice_out_of_bounds() {
        let source = SourceText::new("abc");
        assert_eq!(source.slice(Span::new(1, 1)), "b");
        assert_eq!(source.slice(Span::new(2, 9)), "");
    }
}
