use std::fmt::{self, Display, Formatter};

use crate::common::{data::Data, span::Span};

/// Every kind of token the lexer can produce,
/// and every kind of node the parser can build out of them.
/// The variant names double as the names used in diagnostics,
/// e.g. `Unexpected token <CloseParenthesisToken>, ...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub enum SyntaxKind {
    // Tokens
    BadToken,
    EndOfFileToken,
    WhitespaceToken,
    NumberToken,
    StringToken,
    PlusToken,
    MinusToken,
    StarToken,
    SlashToken,
    BangToken,
    EqualsToken,
    TildeToken,
    HatToken,
    AmpersandToken,
    AmpersandAmpersandToken,
    PipeToken,
    PipePipeToken,
    EqualsEqualsToken,
    BangEqualsToken,
    LessToken,
    LessOrEqualsToken,
    GreaterToken,
    GreaterOrEqualsToken,
    OpenParenthesisToken,
    CloseParenthesisToken,
    OpenBraceToken,
    CloseBraceToken,
    CommaToken,
    IdentifierToken,

    // Keywords
    DoKeyword,
    ElseKeyword,
    FalseKeyword,
    ForKeyword,
    IfKeyword,
    LetKeyword,
    ToKeyword,
    TrueKeyword,
    VarKeyword,
    WhileKeyword,

    // Nodes
    CompilationUnit,
    ElseClause,

    // Statements
    BlockStatement,
    VariableDeclaration,
    IfStatement,
    WhileStatement,
    DoWhileStatement,
    ForStatement,
    ExpressionStatement,

    // Expressions
    LiteralExpression,
    NameExpression,
    AssignmentExpression,
    UnaryExpression,
    BinaryExpression,
    ParenthesizedExpression,
    CallExpression,
}

/// Every kind the lexer can produce, in declaration order.
pub const TOKEN_KINDS: [SyntaxKind; 39] = {
    use SyntaxKind::*;
    [
        BadToken, EndOfFileToken, WhitespaceToken, NumberToken, StringToken,
        PlusToken, MinusToken, StarToken, SlashToken, BangToken, EqualsToken,
        TildeToken, HatToken, AmpersandToken, AmpersandAmpersandToken,
        PipeToken, PipePipeToken, EqualsEqualsToken, BangEqualsToken,
        LessToken, LessOrEqualsToken, GreaterToken, GreaterOrEqualsToken,
        OpenParenthesisToken, CloseParenthesisToken, OpenBraceToken,
        CloseBraceToken, CommaToken, IdentifierToken,
        DoKeyword, ElseKeyword, FalseKeyword, ForKeyword, IfKeyword,
        LetKeyword, ToKeyword, TrueKeyword, VarKeyword, WhileKeyword,
    ]
};

impl SyntaxKind {
    /// Precedence when used as a prefix operator, `0` if it isn't one.
    pub fn unary_precedence(self) -> u8 {
        use SyntaxKind::*;
        match self {
            PlusToken | MinusToken | BangToken | TildeToken => 6,
            _ => 0,
        }
    }

    /// Precedence when used as an infix operator, `0` if it isn't one.
    /// Higher binds tighter.
    pub fn binary_precedence(self) -> u8 {
        use SyntaxKind::*;
        match self {
            StarToken | SlashToken => 5,
            PlusToken | MinusToken => 4,
            EqualsEqualsToken
            | BangEqualsToken
            | LessToken
            | LessOrEqualsToken
            | GreaterToken
            | GreaterOrEqualsToken => 3,
            AmpersandToken | AmpersandAmpersandToken => 2,
            PipeToken | PipePipeToken | HatToken => 1,
            _ => 0,
        }
    }

    /// Maps a run of letters to its keyword kind,
    /// falling back to a plain identifier.
    pub fn keyword(text: &str) -> SyntaxKind {
        use SyntaxKind::*;
        match text {
            "do" => DoKeyword,
            "else" => ElseKeyword,
            "false" => FalseKeyword,
            "for" => ForKeyword,
            "if" => IfKeyword,
            "let" => LetKeyword,
            "to" => ToKeyword,
            "true" => TrueKeyword,
            "var" => VarKeyword,
            "while" => WhileKeyword,
            _ => IdentifierToken,
        }
    }

    /// The fixed text of operators, punctuation and keywords.
    pub fn text(self) -> Option<&'static str> {
        use SyntaxKind::*;
        let text = match self {
            PlusToken => "+",
            MinusToken => "-",
            StarToken => "*",
            SlashToken => "/",
            BangToken => "!",
            EqualsToken => "=",
            TildeToken => "~",
            HatToken => "^",
            AmpersandToken => "&",
            AmpersandAmpersandToken => "&&",
            PipeToken => "|",
            PipePipeToken => "||",
            EqualsEqualsToken => "==",
            BangEqualsToken => "!=",
            LessToken => "<",
            LessOrEqualsToken => "<=",
            GreaterToken => ">",
            GreaterOrEqualsToken => ">=",
            OpenParenthesisToken => "(",
            CloseParenthesisToken => ")",
            OpenBraceToken => "{",
            CloseBraceToken => "}",
            CommaToken => ",",
            DoKeyword => "do",
            ElseKeyword => "else",
            FalseKeyword => "false",
            ForKeyword => "for",
            IfKeyword => "if",
            LetKeyword => "let",
            ToKeyword => "to",
            TrueKeyword => "true",
            VarKeyword => "var",
            WhileKeyword => "while",
            _ => return None,
        };
        Some(text)
    }

    pub fn is_keyword(self) -> bool {
        self.text().map_or(false, |text| SyntaxKind::keyword(text) == self)
    }

    pub fn is_token(self) -> bool {
        TOKEN_KINDS.contains(&self)
    }

    pub fn unary_operators() -> impl Iterator<Item = SyntaxKind> {
        TOKEN_KINDS.into_iter().filter(|kind| kind.unary_precedence() > 0)
    }

    pub fn binary_operators() -> impl Iterator<Item = SyntaxKind> {
        TOKEN_KINDS.into_iter().filter(|kind| kind.binary_precedence() > 0)
    }
}

impl Display for SyntaxKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A single lexeme.
/// Tokens fabricated by the parser during error recovery
/// have empty text, and so an empty span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxToken {
    pub kind: SyntaxKind,
    pub position: usize,
    pub text: String,
    pub value: Option<Data>,
}

impl SyntaxToken {
    pub fn new(
        kind: SyntaxKind,
        position: usize,
        text: &str,
        value: Option<Data>,
    ) -> SyntaxToken {
        SyntaxToken {
            kind,
            position,
            text: text.to_string(),
            value,
        }
    }

    /// A zero-width token standing in for one the parser expected but didn't find.
    pub fn missing(kind: SyntaxKind, position: usize) -> SyntaxToken {
        SyntaxToken::new(kind, position, "", None)
    }

    pub fn span(&self) -> Span {
        Span::new(self.position, self.text.len())
    }
}
