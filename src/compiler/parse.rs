use std::{
    io::{self, Write},
    sync::Arc,
};

use log::{debug, trace};

use crate::{
    common::{data::Data, source::SourceText},
    compiler::{lex::Lexer, syntax::Diagnostics},
    construct::{
        token::{SyntaxKind, SyntaxToken},
        tree::{CompilationUnit, ElseClause, ExpressionSyntax, SeparatedList, StatementSyntax},
    },
};

/// The result of parsing a source text:
/// the tree, along with everything the lexer and parser reported.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    pub text: Arc<SourceText>,
    pub root: CompilationUnit,
    pub diagnostics: Diagnostics,
}

impl SyntaxTree {
    pub fn parse(text: &str) -> SyntaxTree {
        SyntaxTree::parse_source(SourceText::new(text))
    }

    pub fn parse_source(text: Arc<SourceText>) -> SyntaxTree {
        let mut parser = Parser::new(Arc::clone(&text));
        let root = parser.parse_compilation_unit();
        debug!("Parsed with {} diagnostic(s)", parser.diagnostics.len());

        SyntaxTree {
            text,
            root,
            diagnostics: parser.diagnostics,
        }
    }

    /// Every token in `text` up to, but not including, the end of the file.
    /// Whitespace and bad tokens are included.
    pub fn parse_tokens(text: &str) -> Vec<SyntaxToken> {
        let (mut tokens, _) = Lexer::lex_all(SourceText::new(text));
        tokens.pop();
        tokens
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.root.write_to(writer)
    }
}

/// A recursive descent parser for statements,
/// with precedence climbing for expressions.
/// Like the lexer, it never gives up: when a token it requires is missing,
/// it reports the problem and fabricates the token,
/// so the resulting tree always has the expected shape.
#[derive(Debug)]
pub struct Parser {
    tokens: Vec<SyntaxToken>,
    position: usize,
    diagnostics: Diagnostics,
}

impl Parser {
    pub fn new(source: Arc<SourceText>) -> Parser {
        let (tokens, diagnostics) = Lexer::lex_all(source);
        trace!("Parsing {} token(s)", tokens.len());

        let tokens = tokens
            .into_iter()
            .filter(|token| {
                !matches!(token.kind, SyntaxKind::WhitespaceToken | SyntaxKind::BadToken)
            })
            .collect();

        Parser {
            tokens,
            position: 0,
            diagnostics,
        }
    }

    /// Looks ahead `offset` tokens.
    /// Anything past the end is the end-of-file token,
    /// which the lexer guarantees is last.
    fn peek(&self, offset: usize) -> &SyntaxToken {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[(self.position + offset).min(last)]
    }

    fn current(&self) -> &SyntaxToken {
        self.peek(0)
    }

    fn next_token(&mut self) -> SyntaxToken {
        let current = self.current().clone();
        self.position += 1;
        current
    }

    fn match_token(&mut self, kind: SyntaxKind) -> SyntaxToken {
        if self.current().kind == kind {
            return self.next_token();
        }

        let current = self.current();
        let (span, actual, position) = (current.span(), current.kind, current.position);
        self.diagnostics.report_unexpected_token(span, actual, kind);
        SyntaxToken::missing(kind, position)
    }

    pub fn parse_compilation_unit(&mut self) -> CompilationUnit {
        let statement = self.parse_statement();
        let end_of_file = self.match_token(SyntaxKind::EndOfFileToken);
        CompilationUnit { statement, end_of_file }
    }

    fn parse_statement(&mut self) -> StatementSyntax {
        match self.current().kind {
            SyntaxKind::OpenBraceToken => self.parse_block_statement(),
            SyntaxKind::LetKeyword | SyntaxKind::VarKeyword => self.parse_variable_declaration(),
            SyntaxKind::IfKeyword => self.parse_if_statement(),
            SyntaxKind::WhileKeyword => self.parse_while_statement(),
            SyntaxKind::DoKeyword => self.parse_do_while_statement(),
            SyntaxKind::ForKeyword => self.parse_for_statement(),
            _ => StatementSyntax::Expression {
                expression: self.parse_expression(),
            },
        }
    }

    fn parse_block_statement(&mut self) -> StatementSyntax {
        let open = self.match_token(SyntaxKind::OpenBraceToken);
        let mut statements = vec![];

        while !matches!(
            self.current().kind,
            SyntaxKind::EndOfFileToken | SyntaxKind::CloseBraceToken
        ) {
            let start = self.position;
            statements.push(self.parse_statement());

            // nothing was consumed, skip the token to guarantee progress.
            // the statement has already reported it.
            if self.position == start {
                self.next_token();
            }
        }

        let close = self.match_token(SyntaxKind::CloseBraceToken);
        StatementSyntax::Block { open, statements, close }
    }

    fn parse_variable_declaration(&mut self) -> StatementSyntax {
        let expected = match self.current().kind {
            SyntaxKind::LetKeyword => SyntaxKind::LetKeyword,
            _ => SyntaxKind::VarKeyword,
        };
        let keyword = self.match_token(expected);
        let identifier = self.match_token(SyntaxKind::IdentifierToken);
        let equals = self.match_token(SyntaxKind::EqualsToken);
        let initializer = self.parse_expression();

        StatementSyntax::VariableDeclaration { keyword, identifier, equals, initializer }
    }

    fn parse_if_statement(&mut self) -> StatementSyntax {
        let if_keyword = self.match_token(SyntaxKind::IfKeyword);
        let condition = self.parse_expression();
        let then_statement = Box::new(self.parse_statement());

        let else_clause = if self.current().kind == SyntaxKind::ElseKeyword {
            Some(ElseClause {
                else_keyword: self.next_token(),
                statement: Box::new(self.parse_statement()),
            })
        } else {
            None
        };

        StatementSyntax::If { if_keyword, condition, then_statement, else_clause }
    }

    fn parse_while_statement(&mut self) -> StatementSyntax {
        let while_keyword = self.match_token(SyntaxKind::WhileKeyword);
        let condition = self.parse_expression();
        let body = Box::new(self.parse_statement());

        StatementSyntax::While { while_keyword, condition, body }
    }

    fn parse_do_while_statement(&mut self) -> StatementSyntax {
        let do_keyword = self.match_token(SyntaxKind::DoKeyword);
        let body = Box::new(self.parse_statement());
        let while_keyword = self.match_token(SyntaxKind::WhileKeyword);
        let condition = self.parse_expression();

        StatementSyntax::DoWhile { do_keyword, body, while_keyword, condition }
    }

    fn parse_for_statement(&mut self) -> StatementSyntax {
        let for_keyword = self.match_token(SyntaxKind::ForKeyword);
        let identifier = self.match_token(SyntaxKind::IdentifierToken);
        let equals = self.match_token(SyntaxKind::EqualsToken);
        let lower_bound = self.parse_expression();
        let to_keyword = self.match_token(SyntaxKind::ToKeyword);
        let upper_bound = self.parse_expression();
        let body = Box::new(self.parse_statement());

        StatementSyntax::For {
            for_keyword,
            identifier,
            equals,
            lower_bound,
            to_keyword,
            upper_bound,
            body,
        }
    }

    fn parse_expression(&mut self) -> ExpressionSyntax {
        self.parse_assignment_expression()
    }

    /// `identifier = expression`, right associative.
    fn parse_assignment_expression(&mut self) -> ExpressionSyntax {
        if self.peek(0).kind == SyntaxKind::IdentifierToken
            && self.peek(1).kind == SyntaxKind::EqualsToken
        {
            let identifier = self.next_token();
            let equals = self.next_token();
            let expression = Box::new(self.parse_assignment_expression());
            return ExpressionSyntax::Assignment { identifier, equals, expression };
        }

        self.parse_binary_expression(0)
    }

    /// Climbs operator precedence.
    /// Operators binding no tighter than `parent` are left for the caller,
    /// which makes binary operators left associative.
    fn parse_binary_expression(&mut self, parent: u8) -> ExpressionSyntax {
        let unary = self.current().kind.unary_precedence();

        let mut left = if unary != 0 && unary >= parent {
            let operator = self.next_token();
            let operand = Box::new(self.parse_binary_expression(unary));
            ExpressionSyntax::Unary { operator, operand }
        } else {
            self.parse_primary_expression()
        };

        loop {
            let precedence = self.current().kind.binary_precedence();
            if precedence == 0 || precedence <= parent {
                break;
            }

            let operator = self.next_token();
            let right = Box::new(self.parse_binary_expression(precedence));
            left = ExpressionSyntax::Binary {
                left: Box::new(left),
                operator,
                right,
            };
        }

        left
    }

    fn parse_primary_expression(&mut self) -> ExpressionSyntax {
        match self.current().kind {
            SyntaxKind::OpenParenthesisToken => {
                let open = self.next_token();
                let expression = Box::new(self.parse_expression());
                let close = self.match_token(SyntaxKind::CloseParenthesisToken);
                ExpressionSyntax::Parenthesized { open, expression, close }
            },
            SyntaxKind::TrueKeyword | SyntaxKind::FalseKeyword => {
                let literal = self.next_token();
                let value = Data::Boolean(literal.kind == SyntaxKind::TrueKeyword);
                ExpressionSyntax::Literal { literal, value }
            },
            SyntaxKind::NumberToken => {
                let literal = self.next_token();
                let value = literal.value.clone().unwrap_or(Data::Integer(0));
                ExpressionSyntax::Literal { literal, value }
            },
            SyntaxKind::StringToken => {
                let literal = self.next_token();
                let value = literal.value.clone().unwrap_or_else(|| Data::from(""));
                ExpressionSyntax::Literal { literal, value }
            },
            SyntaxKind::IdentifierToken
                if self.peek(1).kind == SyntaxKind::OpenParenthesisToken =>
            {
                self.parse_call_expression()
            },
            _ => ExpressionSyntax::Name {
                identifier: self.match_token(SyntaxKind::IdentifierToken),
            },
        }
    }

    fn parse_call_expression(&mut self) -> ExpressionSyntax {
        let identifier = self.match_token(SyntaxKind::IdentifierToken);
        let open = self.match_token(SyntaxKind::OpenParenthesisToken);
        let arguments = self.parse_arguments();
        let close = self.match_token(SyntaxKind::CloseParenthesisToken);

        ExpressionSyntax::Call { identifier, open, arguments, close }
    }

    /// Comma separated, no trailing comma.
    /// The list only ends at `)` or the end of the file:
    /// anything else between two arguments is reported as a missing comma.
    /// After a comma another argument is always parsed,
    /// so a trailing comma is reported as a missing argument.
    fn parse_arguments(&mut self) -> SeparatedList<ExpressionSyntax> {
        let mut items = vec![];
        let mut separators = vec![];

        if !self.at_list_end() {
            loop {
                let start = self.position;
                items.push(self.parse_expression());
                if self.at_list_end() {
                    break;
                }
                separators.push(self.match_token(SyntaxKind::CommaToken));

                // neither an argument nor a comma, skip it to guarantee progress.
                if self.position == start {
                    self.next_token();
                }
            }
        }

        SeparatedList::new(items, separators)
    }

    fn at_list_end(&self) -> bool {
        matches!(
            self.current().kind,
            SyntaxKind::CloseParenthesisToken | SyntaxKind::EndOfFileToken
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::common::span::Span;

    fn expression(text: &str) -> ExpressionSyntax {
        let tree = SyntaxTree::parse(text);
        assert!(tree.diagnostics.is_empty(), "{:?}", tree.diagnostics);
        match tree.root.statement {
            StatementSyntax::Expression { expression } => expression,
            other => panic!("expected an expression statement, got {:?}", other),
        }
    }

    /// Renders an expression fully parenthesized, e.g. `((1 + 2) * 3)`.
    fn shape(expression: &ExpressionSyntax) -> String {
        match expression {
            ExpressionSyntax::Literal { literal, .. } => literal.text.clone(),
            ExpressionSyntax::Name { identifier } => identifier.text.clone(),
            ExpressionSyntax::Assignment { identifier, expression, .. } => {
                format!("({} = {})", identifier.text, shape(expression))
            },
            ExpressionSyntax::Unary { operator, operand } => {
                format!("({}{})", operator.text, shape(operand))
            },
            ExpressionSyntax::Binary { left, operator, right } => {
                format!("({} {} {})", shape(left), operator.text, shape(right))
            },
            ExpressionSyntax::Parenthesized { expression, .. } => shape(expression),
            ExpressionSyntax::Call { identifier, arguments, .. } => {
                let arguments: Vec<_> = arguments.iter().map(shape).collect();
                format!("{}({})", identifier.text, arguments.join(", "))
            },
        }
    }

    fn messages(text: &str) -> Vec<String> {
        SyntaxTree::parse(text)
            .diagnostics
            .iter()
            .map(|d| d.message.clone())
            .collect()
    }

    #[test]
    fn binary_precedence() {
        assert_eq!(shape(&expression("1 + 2 * 3")), "(1 + (2 * 3))");
        assert_eq!(shape(&expression("1 * 2 + 3")), "((1 * 2) + 3)");
        assert_eq!(shape(&expression("a || b && c == d")), "(a || (b && (c == d)))");
        assert_eq!(shape(&expression("1 < 2 == true")), "((1 < 2) == true)");
    }

    #[test]
    fn binary_operators_associate_left() {
        for op in SyntaxKind::binary_operators() {
            let text = op.text().unwrap();
            let source = format!("a {} b {} c", text, text);
            let expected = format!("((a {} b) {} c)", text, text);
            assert_eq!(shape(&expression(&source)), expected);
        }
    }

    #[test]
    fn unary_binds_tighter_than_binary() {
        for unary in SyntaxKind::unary_operators() {
            for binary in SyntaxKind::binary_operators() {
                let (u, b) = (unary.text().unwrap(), binary.text().unwrap());
                let source = format!("{}a {} b", u, b);
                let expected = format!("(({}a) {} b)", u, b);
                assert_eq!(shape(&expression(&source)), expected);
            }
        }
    }

    #[test]
    fn assignment_associates_right() {
        assert_eq!(shape(&expression("a = b = 1 + 2")), "(a = (b = (1 + 2)))");
        assert_eq!(shape(&expression("(a = 10) * a")), "((a = 10) * a)");
    }

    #[test]
    fn calls() {
        assert_eq!(shape(&expression("print(\"hi\")")), "print(\"hi\")");
        assert_eq!(shape(&expression("f(1, g(2), 3 + 4)")), "f(1, g(2), (3 + 4))");
        assert_eq!(shape(&expression("f()")), "f()");
        assert_eq!(shape(&expression("f")), "f");
    }

    #[test]
    fn statements() {
        let tree = SyntaxTree::parse(
            "{ var x = 1 let y = 2 if x < y x = y else { } while false { } do x = 0 while false for i = 1 to 10 { } }",
        );
        assert!(tree.diagnostics.is_empty());

        let kinds: Vec<_> = match &tree.root.statement {
            StatementSyntax::Block { statements, .. } => statements.iter().map(|s| s.kind()).collect(),
            other => panic!("expected a block, got {:?}", other),
        };
        assert_eq!(kinds, vec![
            SyntaxKind::VariableDeclaration,
            SyntaxKind::VariableDeclaration,
            SyntaxKind::IfStatement,
            SyntaxKind::WhileStatement,
            SyntaxKind::DoWhileStatement,
            SyntaxKind::ForStatement,
        ]);
    }

    #[test]
    fn missing_tokens_are_fabricated() {
        let tree = SyntaxTree::parse("(1 + 2");
        assert_eq!(tree.diagnostics.len(), 1);
        let diagnostic = tree.diagnostics.iter().next().unwrap();
        assert_eq!(
            diagnostic.message,
            "Unexpected token <EndOfFileToken>, expected <CloseParenthesisToken>."
        );
        assert_eq!(diagnostic.span, Span::point(6));

        match &tree.root.statement {
            StatementSyntax::Expression {
                expression: ExpressionSyntax::Parenthesized { close, .. },
            } => {
                assert_eq!(close.kind, SyntaxKind::CloseParenthesisToken);
                assert_eq!(close.span(), Span::point(6));
            },
            other => panic!("unexpected tree {:?}", other),
        }
    }

    #[test]
    fn only_one_statement() {
        assert_eq!(messages("1 2"), vec![
            "Unexpected token <NumberToken>, expected <EndOfFileToken>.",
        ]);
    }

    #[test]
    fn block_always_makes_progress() {
        // `)` can't start a statement, so each one is skipped after reporting
        let messages = messages("{ ) ) }");
        assert_eq!(messages, vec![
            "Unexpected token <CloseParenthesisToken>, expected <IdentifierToken>.",
            "Unexpected token <CloseParenthesisToken>, expected <IdentifierToken>.",
        ]);
    }

    #[test]
    fn unterminated_block() {
        assert_eq!(messages("{ var x = 1"), vec![
            "Unexpected token <EndOfFileToken>, expected <CloseBraceToken>.",
        ]);
    }

    #[test]
    fn argument_recovery() {
        assert_eq!(messages("f(1 2)"), vec![
            "Unexpected token <NumberToken>, expected <CommaToken>.",
        ]);
        match SyntaxTree::parse("f(1 2)").root.statement {
            StatementSyntax::Expression { expression } => {
                assert_eq!(shape(&expression), "f(1, 2)");
            },
            other => panic!("expected an expression statement, got {:?}", other),
        }
        assert_eq!(messages("f(1 else 2)"), vec![
            "Unexpected token <ElseKeyword>, expected <CommaToken>.",
            "Unexpected token <ElseKeyword>, expected <IdentifierToken>.",
            "Unexpected token <ElseKeyword>, expected <CommaToken>.",
        ]);
        assert_eq!(messages("f(1,)"), vec![
            "Unexpected token <CloseParenthesisToken>, expected <IdentifierToken>.",
        ]);
        assert_eq!(messages("f(1"), vec![
            "Unexpected token <EndOfFileToken>, expected <CloseParenthesisToken>.",
        ]);
    }

    #[test]
    fn lexer_diagnostics_come_first() {
        assert_eq!(messages("1 + $"), vec![
            "Bad character input: '$'.",
            "Unexpected token <EndOfFileToken>, expected <IdentifierToken>.",
        ]);
    }

    #[test]
    fn parse_tokens_keeps_trivia() {
        let kinds: Vec<_> = SyntaxTree::parse_tokens("a $")
            .iter()
            .map(|t| t.kind)
            .collect();
        assert_eq!(kinds, vec![
            SyntaxKind::IdentifierToken,
            SyntaxKind::WhitespaceToken,
            SyntaxKind::BadToken,
        ]);
    }

    proptest::proptest! {
        #[test]
        fn doesnt_crash(s in "\\PC*") {
            let tree = SyntaxTree::parse(&s);
            format!("{:?}", tree);
        }
    }
}
