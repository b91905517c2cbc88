use std::{
    fmt,
    io::{self, Write},
};

use colored::Colorize;

use crate::{
    common::{source::SourceText, span::Span, ty::Ty},
    construct::token::SyntaxKind,
};

/// Represents a static error (lexical, syntactic or semantic) found at compile time.
/// None of these stop compilation on their own: each pass recovers
/// and keeps going, so that as many errors as possible are reported at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub span: Span,
    pub message: String,
}

impl Diagnostic {
    pub fn new(span: Span, message: &str) -> Diagnostic {
        Diagnostic {
            span,
            message: message.to_string(),
        }
    }

    /// Writes the diagnostic the way the REPL shows it:
    /// ```plain
    /// (1, 9): Variable 'y' does not exist.
    ///     var x = y + 1
    /// ```
    /// With the offending text highlighted in red.
    pub fn render<W: Write>(&self, source: &SourceText, writer: &mut W) -> io::Result<()> {
        let formatted = self.span.format(source);
        let location = format!("({}, {}): {}", formatted.line, formatted.column, self.message);
        writeln!(writer, "{}", location.red())?;
        writeln!(writer, "{}", formatted)?;
        Ok(())
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.span, self.message)
    }
}

/// An ordered bag of [`Diagnostic`]s.
/// Each `report_*` method corresponds to one kind of error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Diagnostics {
        Diagnostics(vec![])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.0.extend(other.0)
    }

    /// Renders every diagnostic against the source it was reported for.
    pub fn render<W: Write>(&self, source: &SourceText, writer: &mut W) -> io::Result<()> {
        for diagnostic in self.iter() {
            diagnostic.render(source, writer)?;
        }
        Ok(())
    }

    fn report(&mut self, span: Span, message: String) {
        self.0.push(Diagnostic { span, message });
    }

    // Lexical

    pub fn report_invalid_number(&mut self, span: Span, text: &str, ty: Ty) {
        self.report(span, format!("The number {} isn't a valid {}.", text, ty));
    }

    pub fn report_bad_character(&mut self, position: usize, character: char) {
        let span = Span::new(position, character.len_utf8());
        self.report(span, format!("Bad character input: '{}'.", character));
    }

    pub fn report_unterminated_string(&mut self, span: Span) {
        self.report(span, "Unterminated string literal.".to_string());
    }

    // Syntactic

    pub fn report_unexpected_token(
        &mut self,
        span: Span,
        actual: SyntaxKind,
        expected: SyntaxKind,
    ) {
        self.report(
            span,
            format!("Unexpected token <{}>, expected <{}>.", actual, expected),
        );
    }

    // Semantic

    pub fn report_undefined_unary_operator(&mut self, span: Span, operator: &str, operand: Ty) {
        self.report(
            span,
            format!("Unary operator '{}' is not defined for type '{}'.", operator, operand),
        );
    }

    pub fn report_undefined_binary_operator(
        &mut self,
        span: Span,
        operator: &str,
        left: Ty,
        right: Ty,
    ) {
        self.report(
            span,
            format!(
                "Binary operator '{}' is not defined for types '{}' and '{}'.",
                operator, left, right,
            ),
        );
    }

    pub fn report_undefined_name(&mut self, span: Span, name: &str) {
        self.report(span, format!("Variable '{}' does not exist.", name));
    }

    pub fn report_cannot_convert(&mut self, span: Span, from: Ty, to: Ty) {
        self.report(span, format!("Cannot convert type '{}' to '{}'.", from, to));
    }

    pub fn report_variable_already_declared(&mut self, span: Span, name: &str) {
        self.report(span, format!("Variable '{}' is already declared.", name));
    }

    pub fn report_cannot_assign(&mut self, span: Span, name: &str) {
        self.report(
            span,
            format!("Variable '{}' is read-only and cannot be assigned to.", name),
        );
    }

    pub fn report_undefined_function(&mut self, span: Span, name: &str) {
        self.report(span, format!("Function '{}' does not exist.", name));
    }

    pub fn report_wrong_argument_count(
        &mut self,
        span: Span,
        name: &str,
        expected: usize,
        actual: usize,
    ) {
        self.report(
            span,
            format!(
                "Function '{}' requires {} arguments but was given {}.",
                name, expected, actual,
            ),
        );
    }

    pub fn report_wrong_argument_type(
        &mut self,
        span: Span,
        name: &str,
        expected: Ty,
        actual: Ty,
    ) {
        self.report(
            span,
            format!(
                "Parameter '{}' requires a value of type '{}' but was given a value of type '{}'.",
                name, expected, actual,
            ),
        );
    }

    pub fn report_expression_must_have_value(&mut self, span: Span) {
        self.report(span, "Expression must have a value.".to_string());
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn messages() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.report_cannot_convert(Span::new(3, 2), Ty::Integer, Ty::Boolean);
        diagnostics.report_bad_character(0, '$');

        let messages: Vec<_> = diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec![
            "Cannot convert type 'int' to 'bool'.",
            "Bad character input: '$'.",
        ]);
    }

    #[test]
    fn render() {
        // This is just a demo to check formatting
        colored::control::set_override(false);
        let source = SourceText::new("var x = 10\nx = \"Hello\"");
        let diagnostic = Diagnostic::new(
            Span::new(15, 7),
            "Cannot convert type 'string' to 'int'.",
        );

        let mut out = vec![];
        diagnostic.render(&source, &mut out).unwrap();
        let target = "(2, 5): Cannot convert type 'string' to 'int'.\n    x = \"Hello\"\n";

        assert_eq!(String::from_utf8(out).unwrap(), target);
    }
}
