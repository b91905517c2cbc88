use std::io::{self, Write};

use crate::{
    common::{data::Data, span::Span},
    construct::token::{SyntaxKind, SyntaxToken},
};

/// A list of nodes separated by tokens, e.g. call arguments.
/// Holds `n` items and `n - 1` separators,
/// except after a trailing separator the parser had to recover from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeparatedList<T> {
    pub items: Vec<T>,
    pub separators: Vec<SyntaxToken>,
}

impl<T> SeparatedList<T> {
    pub fn new(items: Vec<T>, separators: Vec<SyntaxToken>) -> Self {
        SeparatedList { items, separators }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpressionSyntax {
    Literal {
        literal: SyntaxToken,
        value: Data,
    },
    Name {
        identifier: SyntaxToken,
    },
    Assignment {
        identifier: SyntaxToken,
        equals: SyntaxToken,
        expression: Box<ExpressionSyntax>,
    },
    Unary {
        operator: SyntaxToken,
        operand: Box<ExpressionSyntax>,
    },
    Binary {
        left: Box<ExpressionSyntax>,
        operator: SyntaxToken,
        right: Box<ExpressionSyntax>,
    },
    Parenthesized {
        open: SyntaxToken,
        expression: Box<ExpressionSyntax>,
        close: SyntaxToken,
    },
    Call {
        identifier: SyntaxToken,
        open: SyntaxToken,
        arguments: SeparatedList<ExpressionSyntax>,
        close: SyntaxToken,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElseClause {
    pub else_keyword: SyntaxToken,
    pub statement: Box<StatementSyntax>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementSyntax {
    Block {
        open: SyntaxToken,
        statements: Vec<StatementSyntax>,
        close: SyntaxToken,
    },
    /// `var` or `let`, the latter being read-only.
    VariableDeclaration {
        keyword: SyntaxToken,
        identifier: SyntaxToken,
        equals: SyntaxToken,
        initializer: ExpressionSyntax,
    },
    If {
        if_keyword: SyntaxToken,
        condition: ExpressionSyntax,
        then_statement: Box<StatementSyntax>,
        else_clause: Option<ElseClause>,
    },
    While {
        while_keyword: SyntaxToken,
        condition: ExpressionSyntax,
        body: Box<StatementSyntax>,
    },
    DoWhile {
        do_keyword: SyntaxToken,
        body: Box<StatementSyntax>,
        while_keyword: SyntaxToken,
        condition: ExpressionSyntax,
    },
    For {
        for_keyword: SyntaxToken,
        identifier: SyntaxToken,
        equals: SyntaxToken,
        lower_bound: ExpressionSyntax,
        to_keyword: SyntaxToken,
        upper_bound: ExpressionSyntax,
        body: Box<StatementSyntax>,
    },
    Expression {
        expression: ExpressionSyntax,
    },
}

/// The root of a syntax tree: a single statement
/// followed by the end of the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationUnit {
    pub statement: StatementSyntax,
    pub end_of_file: SyntaxToken,
}

/// A borrowed view over any element of a syntax tree.
/// This is how the tree is walked generically:
/// each variant knows its own children, in source order.
#[derive(Debug, Clone, Copy)]
pub enum SyntaxNode<'a> {
    Token(&'a SyntaxToken),
    Expression(&'a ExpressionSyntax),
    Statement(&'a StatementSyntax),
    ElseClause(&'a ElseClause),
    CompilationUnit(&'a CompilationUnit),
}

impl<'a> From<&'a SyntaxToken> for SyntaxNode<'a> {
    fn from(token: &'a SyntaxToken) -> Self {
        SyntaxNode::Token(token)
    }
}

impl<'a> From<&'a ExpressionSyntax> for SyntaxNode<'a> {
    fn from(expression: &'a ExpressionSyntax) -> Self {
        SyntaxNode::Expression(expression)
    }
}

impl<'a> From<&'a StatementSyntax> for SyntaxNode<'a> {
    fn from(statement: &'a StatementSyntax) -> Self {
        SyntaxNode::Statement(statement)
    }
}

impl<'a> From<&'a Box<ExpressionSyntax>> for SyntaxNode<'a> {
    fn from(expression: &'a Box<ExpressionSyntax>) -> Self {
        SyntaxNode::Expression(expression.as_ref())
    }
}

impl<'a> From<&'a Box<StatementSyntax>> for SyntaxNode<'a> {
    fn from(statement: &'a Box<StatementSyntax>) -> Self {
        SyntaxNode::Statement(statement.as_ref())
    }
}

impl<'a> SyntaxNode<'a> {
    pub fn kind(&self) -> SyntaxKind {
        match self {
            SyntaxNode::Token(token) => token.kind,
            SyntaxNode::Expression(expression) => expression.kind(),
            SyntaxNode::Statement(statement) => statement.kind(),
            SyntaxNode::ElseClause(_) => SyntaxKind::ElseClause,
            SyntaxNode::CompilationUnit(_) => SyntaxKind::CompilationUnit,
        }
    }

    /// Child nodes and tokens, in the order they appear in the source.
    pub fn children(&self) -> Vec<SyntaxNode<'a>> {
        match *self {
            SyntaxNode::Token(_) => vec![],
            SyntaxNode::Expression(expression) => expression.children(),
            SyntaxNode::Statement(statement) => statement.children(),
            SyntaxNode::ElseClause(clause) => {
                vec![(&clause.else_keyword).into(), (&clause.statement).into()]
            },
            SyntaxNode::CompilationUnit(unit) => {
                vec![(&unit.statement).into(), (&unit.end_of_file).into()]
            },
        }
    }

    /// Spans from the start of the first token to the end of the last one.
    pub fn span(&self) -> Span {
        if let SyntaxNode::Token(token) = self {
            return token.span();
        }

        let children = self.children();
        match (children.first(), children.last()) {
            (Some(first), Some(last)) => {
                Span::from_bounds(first.span().start, last.span().end())
            },
            _ => Span::default(),
        }
    }

    /// Writes the tree rooted at this node, one node per line:
    /// ```plain
    /// └──BinaryExpression
    ///     ├──LiteralExpression
    ///     │   └──NumberToken 1
    ///     ├──PlusToken
    ///     └──LiteralExpression
    ///         └──NumberToken 2
    /// ```
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.pretty_print(writer, "", true)
    }

    fn pretty_print<W: Write>(
        &self,
        writer: &mut W,
        indent: &str,
        is_last: bool,
    ) -> io::Result<()> {
        let marker = if is_last { "└──" } else { "├──" };
        write!(writer, "{}{}{:?}", indent, marker, self.kind())?;

        if let SyntaxNode::Token(SyntaxToken { value: Some(value), .. }) = self {
            write!(writer, " {}", value)?;
        }
        writeln!(writer)?;

        let indent = format!("{}{}", indent, if is_last { "    " } else { "│   " });
        let children = self.children();
        for (index, child) in children.iter().enumerate() {
            child.pretty_print(writer, &indent, index + 1 == children.len())?;
        }

        Ok(())
    }
}

impl ExpressionSyntax {
    pub fn kind(&self) -> SyntaxKind {
        match self {
            ExpressionSyntax::Literal { .. } => SyntaxKind::LiteralExpression,
            ExpressionSyntax::Name { .. } => SyntaxKind::NameExpression,
            ExpressionSyntax::Assignment { .. } => SyntaxKind::AssignmentExpression,
            ExpressionSyntax::Unary { .. } => SyntaxKind::UnaryExpression,
            ExpressionSyntax::Binary { .. } => SyntaxKind::BinaryExpression,
            ExpressionSyntax::Parenthesized { .. } => SyntaxKind::ParenthesizedExpression,
            ExpressionSyntax::Call { .. } => SyntaxKind::CallExpression,
        }
    }

    pub fn children(&self) -> Vec<SyntaxNode<'_>> {
        match self {
            ExpressionSyntax::Literal { literal, .. } => vec![literal.into()],
            ExpressionSyntax::Name { identifier } => vec![identifier.into()],
            ExpressionSyntax::Assignment { identifier, equals, expression } => {
                vec![identifier.into(), equals.into(), expression.into()]
            },
            ExpressionSyntax::Unary { operator, operand } => {
                vec![operator.into(), operand.into()]
            },
            ExpressionSyntax::Binary { left, operator, right } => {
                vec![left.into(), operator.into(), right.into()]
            },
            ExpressionSyntax::Parenthesized { open, expression, close } => {
                vec![open.into(), expression.into(), close.into()]
            },
            ExpressionSyntax::Call { identifier, open, arguments, close } => {
                let mut children = vec![identifier.into(), open.into()];
                let mut separators = arguments.separators.iter();
                for argument in arguments.iter() {
                    children.push(argument.into());
                    if let Some(separator) = separators.next() {
                        children.push(separator.into());
                    }
                }
                children.push(close.into());
                children
            },
        }
    }

    pub fn span(&self) -> Span {
        SyntaxNode::from(self).span()
    }
}

impl StatementSyntax {
    pub fn kind(&self) -> SyntaxKind {
        match self {
            StatementSyntax::Block { .. } => SyntaxKind::BlockStatement,
            StatementSyntax::VariableDeclaration { .. } => SyntaxKind::VariableDeclaration,
            StatementSyntax::If { .. } => SyntaxKind::IfStatement,
            StatementSyntax::While { .. } => SyntaxKind::WhileStatement,
            StatementSyntax::DoWhile { .. } => SyntaxKind::DoWhileStatement,
            StatementSyntax::For { .. } => SyntaxKind::ForStatement,
            StatementSyntax::Expression { .. } => SyntaxKind::ExpressionStatement,
        }
    }

    pub fn children(&self) -> Vec<SyntaxNode<'_>> {
        match self {
            StatementSyntax::Block { open, statements, close } => {
                let mut children = vec![open.into()];
                children.extend(statements.iter().map(SyntaxNode::from));
                children.push(close.into());
                children
            },
            StatementSyntax::VariableDeclaration { keyword, identifier, equals, initializer } => {
                vec![keyword.into(), identifier.into(), equals.into(), initializer.into()]
            },
            StatementSyntax::If { if_keyword, condition, then_statement, else_clause } => {
                let mut children = vec![if_keyword.into(), condition.into(), then_statement.into()];
                if let Some(clause) = else_clause {
                    children.push(SyntaxNode::ElseClause(clause));
                }
                children
            },
            StatementSyntax::While { while_keyword, condition, body } => {
                vec![while_keyword.into(), condition.into(), body.into()]
            },
            StatementSyntax::DoWhile { do_keyword, body, while_keyword, condition } => {
                vec![do_keyword.into(), body.into(), while_keyword.into(), condition.into()]
            },
            StatementSyntax::For {
                for_keyword,
                identifier,
                equals,
                lower_bound,
                to_keyword,
                upper_bound,
                body,
            } => vec![
                for_keyword.into(),
                identifier.into(),
                equals.into(),
                lower_bound.into(),
                to_keyword.into(),
                upper_bound.into(),
                body.into(),
            ],
            StatementSyntax::Expression { expression } => vec![expression.into()],
        }
    }

    pub fn span(&self) -> Span {
        SyntaxNode::from(self).span()
    }
}

impl CompilationUnit {
    pub fn span(&self) -> Span {
        SyntaxNode::CompilationUnit(self).span()
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        SyntaxNode::CompilationUnit(self).write_to(writer)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn token(kind: SyntaxKind, position: usize, text: &str) -> SyntaxToken {
        SyntaxToken::new(kind, position, text, None)
    }

    fn number(position: usize, n: i32) -> ExpressionSyntax {
        ExpressionSyntax::Literal {
            literal: SyntaxToken::new(
                SyntaxKind::NumberToken,
                position,
                &n.to_string(),
                Some(Data::Integer(n)),
            ),
            value: Data::Integer(n),
        }
    }

    /// `1 + 23`
    fn addition() -> ExpressionSyntax {
        ExpressionSyntax::Binary {
            left: Box::new(number(0, 1)),
            operator: token(SyntaxKind::PlusToken, 2, "+"),
            right: Box::new(number(4, 23)),
        }
    }

    #[test]
    fn span_covers_first_to_last_token() {
        assert_eq!(addition().span(), Span::new(0, 6));
    }

    #[test]
    fn call_children_interleave_separators() {
        let call = ExpressionSyntax::Call {
            identifier: token(SyntaxKind::IdentifierToken, 0, "f"),
            open: token(SyntaxKind::OpenParenthesisToken, 1, "("),
            arguments: SeparatedList::new(
                vec![number(2, 1), number(4, 2)],
                vec![token(SyntaxKind::CommaToken, 3, ",")],
            ),
            close: token(SyntaxKind::CloseParenthesisToken, 5, ")"),
        };

        let kinds: Vec<_> = call.children().iter().map(|c| c.kind()).collect();
        assert_eq!(kinds, vec![
            SyntaxKind::IdentifierToken,
            SyntaxKind::OpenParenthesisToken,
            SyntaxKind::LiteralExpression,
            SyntaxKind::CommaToken,
            SyntaxKind::LiteralExpression,
            SyntaxKind::CloseParenthesisToken,
        ]);
        assert_eq!(call.span(), Span::new(0, 6));
    }

    #[test]
    fn pretty_print() {
        let unit = CompilationUnit {
            statement: StatementSyntax::Expression { expression: addition() },
            end_of_file: token(SyntaxKind::EndOfFileToken, 6, ""),
        };

        let mut out = vec![];
        unit.write_to(&mut out).unwrap();
        let printed = String::from_utf8(out).unwrap();

        assert_eq!(printed, [
            "└──CompilationUnit",
            "    ├──ExpressionStatement",
            "    │   └──BinaryExpression",
            "    │       ├──LiteralExpression",
            "    │       │   └──NumberToken 1",
            "    │       ├──PlusToken",
            "    │       └──LiteralExpression",
            "    │           └──NumberToken 23",
            "    └──EndOfFileToken",
            "",
        ].join("\n"));
    }
}
