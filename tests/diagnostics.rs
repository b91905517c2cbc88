//! Checks that each diagnostic is reported with the right message, at the right place.
//!
//! Expected locations are marked inline with square brackets,
//! which are stripped out before compiling:
//! ```plain
//! {
//!     let x = 10
//!     x [=] 0
//! }
//! ```
//! Sirius doesn't use square brackets, so there's no ambiguity.

use sirius::{common::Span, Compilation, SyntaxTree};

/// Source text with its marked spans pulled out.
#[derive(Debug)]
struct AnnotatedText {
    text: String,
    spans: Vec<Span>,
}

impl AnnotatedText {
    fn parse(text: &str) -> AnnotatedText {
        let text = unindent(text);

        let mut stripped = String::new();
        let mut spans = vec![];
        let mut starts = vec![];

        for c in text.chars() {
            match c {
                '[' => starts.push(stripped.len()),
                ']' => {
                    let start = starts.pop().expect("Too many ']' in text");
                    spans.push(Span::from_bounds(start, stripped.len()));
                },
                c => stripped.push(c),
            }
        }

        assert!(starts.is_empty(), "Missing ']' in text");
        AnnotatedText { text: stripped, spans }
    }
}

/// Removes the indentation common to every non-blank line,
/// along with any leading and trailing blank lines.
fn unindent(text: &str) -> String {
    let lines: Vec<&str> = text
        .lines()
        .map(|line| if line.trim().is_empty() { "" } else { line })
        .collect();

    let indentation = lines
        .iter()
        .filter(|line| !line.is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    let lines: Vec<&str> = lines
        .iter()
        .map(|line| if line.is_empty() { "" } else { &line[indentation..] })
        .collect();

    let start = lines.iter().position(|l| !l.is_empty()).unwrap_or(lines.len());
    let end = lines.iter().rposition(|l| !l.is_empty()).map_or(start, |e| e + 1);
    lines[start..end].join("\n")
}

fn assert_diagnostics(text: &str, expected: &[&str]) {
    let annotated = AnnotatedText::parse(text);
    let compilation = Compilation::new(SyntaxTree::parse(&annotated.text));
    let diagnostics = compilation.diagnostics();

    assert_eq!(
        annotated.spans.len(),
        expected.len(),
        "Must mark as many spans as there are expected diagnostics",
    );
    assert_eq!(diagnostics.len(), expected.len(), "{:#?}", diagnostics);

    for ((diagnostic, span), message) in diagnostics.iter().zip(annotated.spans).zip(expected) {
        assert_eq!(&diagnostic.message, message);
        assert_eq!(diagnostic.span, span, "{}", message);
    }
}

#[test]
fn unindent_strips_common_indentation() {
    let text = "
        {
            x
        }
    ";
    assert_eq!(unindent(text), "{\n    x\n}");
}

#[test]
fn annotations_are_stripped() {
    let annotated = AnnotatedText::parse("a [b] [[c]]");
    assert_eq!(annotated.text, "a b c");
    assert_eq!(annotated.spans, vec![
        Span::new(2, 1),
        Span::new(4, 1),
        Span::new(4, 1),
    ]);
}

// Lexical

#[test]
fn invalid_number() {
    assert_diagnostics("[99999999999]", &["The number 99999999999 isn't a valid int."]);
}

#[test]
fn unterminated_string() {
    assert_diagnostics("[\"]never closed", &["Unterminated string literal."]);
}

#[test]
fn bad_character_then_missing_operand() {
    assert_diagnostics("1 + [$][]", &[
        "Bad character input: '$'.",
        "Unexpected token <EndOfFileToken>, expected <IdentifierToken>.",
    ]);
}

// Syntactic

#[test]
fn unexpected_token_is_reported_where_it_is() {
    assert_diagnostics("1 + [[)]]", &[
        "Unexpected token <CloseParenthesisToken>, expected <IdentifierToken>.",
        "Unexpected token <CloseParenthesisToken>, expected <EndOfFileToken>.",
    ]);
}

#[test]
fn missing_close_brace() {
    assert_diagnostics(
        "
        {
            var x = 1[]
        ",
        &["Unexpected token <EndOfFileToken>, expected <CloseBraceToken>."],
    );
}

// Semantic

#[test]
fn shadowing_is_allowed() {
    assert_diagnostics(
        "
        {
            var x = 10
            {
                var x = 10
            }
        }
        ",
        &[],
    );
}

#[test]
fn redeclaration() {
    assert_diagnostics(
        "
        {
            var x = 10
            var y = 100
            {
                var x = 10
            }
            var [x] = 5
        }
        ",
        &["Variable 'x' is already declared."],
    );
}

#[test]
fn read_only_assignment() {
    assert_diagnostics(
        "
        {
            let x = 10
            x [=] 0
        }
        ",
        &["Variable 'x' is read-only and cannot be assigned to."],
    );
}

#[test]
fn loop_variable_is_read_only() {
    assert_diagnostics(
        "
        for i = 1 to 10
            i [=] i + 1
        ",
        &["Variable 'i' is read-only and cannot be assigned to."],
    );
}

#[test]
fn assignment_type_mismatch() {
    assert_diagnostics(
        "
        {
            var x = 10
            x = [true]
        }
        ",
        &["Cannot convert type 'bool' to 'int'."],
    );
}

#[test]
fn if_condition_must_be_bool() {
    assert_diagnostics(
        "
        {
            var x = 0
            if [10]
                x = 10
        }
        ",
        &["Cannot convert type 'int' to 'bool'."],
    );
}

#[test]
fn while_condition_must_be_bool() {
    assert_diagnostics(
        "
        {
            var x = 0
            while [\"yes\"]
                x = 10
        }
        ",
        &["Cannot convert type 'string' to 'bool'."],
    );
}

#[test]
fn do_while_condition_must_be_bool() {
    assert_diagnostics("do { } while [1]", &["Cannot convert type 'int' to 'bool'."]);
}

#[test]
fn for_bounds_must_be_int() {
    assert_diagnostics(
        "
        {
            var result = 0
            for i = [false] to [\"10\"]
                result = result + i
        }
        ",
        &[
            "Cannot convert type 'bool' to 'int'.",
            "Cannot convert type 'string' to 'int'.",
        ],
    );
}

#[test]
fn undefined_names() {
    assert_diagnostics("[x] * 10", &["Variable 'x' does not exist."]);
    assert_diagnostics("[x] = 10", &["Variable 'x' does not exist."]);
}

#[test]
fn errors_do_not_cascade() {
    assert_diagnostics(
        "
        {
            var x = [y] + 1
            x = x * 2
            print(string(x))
        }
        ",
        &["Variable 'y' does not exist."],
    );
}

#[test]
fn undefined_unary_operator() {
    assert_diagnostics("[+]true", &["Unary operator '+' is not defined for type 'bool'."]);
}

#[test]
fn undefined_binary_operator() {
    assert_diagnostics(
        "10 [*] false",
        &["Binary operator '*' is not defined for types 'int' and 'bool'."],
    );
}

#[test]
fn variable_hides_function() {
    assert_diagnostics(
        "
        {
            let print = 42
            [print](\"test\")
        }
        ",
        &["Function 'print' does not exist."],
    );
}

#[test]
fn wrong_argument_count() {
    assert_diagnostics(
        "[print(\"a\", \"b\")]",
        &["Function 'print' requires 1 arguments but was given 2."],
    );
}

#[test]
fn wrong_argument_type() {
    assert_diagnostics(
        "rnd([true])",
        &["Parameter 'max' requires a value of type 'int' but was given a value of type 'bool'."],
    );
}

#[test]
fn void_has_no_value() {
    assert_diagnostics("var x = [print(\"hi\")]", &["Expression must have a value."]);
}

#[test]
fn cannot_cast_between_int_and_bool() {
    assert_diagnostics("int([true])", &["Cannot convert type 'bool' to 'int'."]);
}

#[test]
fn rendering() {
    colored::control::set_override(false);

    let compilation = Compilation::new(SyntaxTree::parse("{\n    var x = 10\n    x = y\n}"));
    let diagnostics = compilation.diagnostics();
    assert_eq!(diagnostics.len(), 1, "{:#?}", diagnostics);

    let mut out = vec![];
    diagnostics
        .render(&compilation.syntax_tree().text, &mut out)
        .unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        "(3, 9): Variable 'y' does not exist.\n        x = y\n",
    );
}
