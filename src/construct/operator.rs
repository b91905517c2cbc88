use std::fmt::{self, Display, Formatter};

use crate::{common::ty::Ty, construct::token::SyntaxKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperatorKind {
    Identity,
    Negation,
    LogicalNegation,
    OnesComplement,
}

/// A resolved prefix operator: the token it was written as,
/// what it does, and the types going in and out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnaryOperator {
    pub syntax_kind: SyntaxKind,
    pub kind: UnaryOperatorKind,
    pub operand: Ty,
    pub result: Ty,
}

impl UnaryOperator {
    pub const fn new(
        syntax_kind: SyntaxKind,
        kind: UnaryOperatorKind,
        operand: Ty,
        result: Ty,
    ) -> UnaryOperator {
        UnaryOperator { syntax_kind, kind, operand, result }
    }

    /// Finds the operator written as `syntax_kind` applying to `operand`.
    /// No implicit conversions are considered.
    pub fn bind(syntax_kind: SyntaxKind, operand: Ty) -> Option<UnaryOperator> {
        UNARY_OPERATORS
            .iter()
            .find(|op| op.syntax_kind == syntax_kind && op.operand == operand)
            .copied()
    }
}

const UNARY_OPERATORS: [UnaryOperator; 4] = {
    use SyntaxKind::*;
    use UnaryOperatorKind::*;
    [
        UnaryOperator::new(BangToken, LogicalNegation, Ty::Boolean, Ty::Boolean),
        UnaryOperator::new(PlusToken, Identity, Ty::Integer, Ty::Integer),
        UnaryOperator::new(MinusToken, Negation, Ty::Integer, Ty::Integer),
        UnaryOperator::new(TildeToken, OnesComplement, Ty::Integer, Ty::Integer),
    ]
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperatorKind {
    Addition,
    Subtraction,
    Multiplication,
    Division,
    LogicalAnd,
    LogicalOr,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    Equals,
    NotEquals,
    Less,
    LessOrEquals,
    Greater,
    GreaterOrEquals,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BinaryOperator {
    pub syntax_kind: SyntaxKind,
    pub kind: BinaryOperatorKind,
    pub left: Ty,
    pub right: Ty,
    pub result: Ty,
}

impl BinaryOperator {
    /// An operator over two operands of the same type.
    pub const fn new(
        syntax_kind: SyntaxKind,
        kind: BinaryOperatorKind,
        operands: Ty,
        result: Ty,
    ) -> BinaryOperator {
        BinaryOperator {
            syntax_kind,
            kind,
            left: operands,
            right: operands,
            result,
        }
    }

    /// Finds the operator written as `syntax_kind` applying to `left` and `right`.
    /// The table below is the only place legal combinations are defined.
    pub fn bind(syntax_kind: SyntaxKind, left: Ty, right: Ty) -> Option<BinaryOperator> {
        BINARY_OPERATORS
            .iter()
            .find(|op| {
                op.syntax_kind == syntax_kind && op.left == left && op.right == right
            })
            .copied()
    }
}

const BINARY_OPERATORS: [BinaryOperator; 21] = {
    use BinaryOperatorKind::*;
    use SyntaxKind::*;
    use Ty::{Boolean as B, Integer as I, String as S};
    [
        BinaryOperator::new(PlusToken, Addition, I, I),
        BinaryOperator::new(MinusToken, Subtraction, I, I),
        BinaryOperator::new(StarToken, Multiplication, I, I),
        BinaryOperator::new(SlashToken, Division, I, I),
        BinaryOperator::new(AmpersandToken, BitwiseAnd, I, I),
        BinaryOperator::new(PipeToken, BitwiseOr, I, I),
        BinaryOperator::new(HatToken, BitwiseXor, I, I),
        BinaryOperator::new(EqualsEqualsToken, Equals, I, B),
        BinaryOperator::new(BangEqualsToken, NotEquals, I, B),
        BinaryOperator::new(LessToken, Less, I, B),
        BinaryOperator::new(LessOrEqualsToken, LessOrEquals, I, B),
        BinaryOperator::new(GreaterToken, Greater, I, B),
        BinaryOperator::new(GreaterOrEqualsToken, GreaterOrEquals, I, B),
        BinaryOperator::new(AmpersandAmpersandToken, LogicalAnd, B, B),
        BinaryOperator::new(PipePipeToken, LogicalOr, B, B),
        BinaryOperator::new(AmpersandToken, BitwiseAnd, B, B),
        BinaryOperator::new(PipeToken, BitwiseOr, B, B),
        BinaryOperator::new(HatToken, BitwiseXor, B, B),
        BinaryOperator::new(EqualsEqualsToken, Equals, B, B),
        BinaryOperator::new(BangEqualsToken, NotEquals, B, B),
        BinaryOperator::new(PlusToken, Addition, S, S),
    ]
};

impl Display for UnaryOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)
    }
}

impl Display for BinaryOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)
    }
}

/// How a value of one type becomes a value of another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    /// Same type, nothing to do.
    Identity,
    /// Needs a conversion node, and may fail at runtime
    /// (e.g. `int("abc")`).
    Explicit,
    None,
}

impl Conversion {
    pub fn classify(from: Ty, to: Ty) -> Conversion {
        match (from, to) {
            (from, to) if from == to => Conversion::Identity,
            (Ty::Boolean | Ty::Integer, Ty::String) => Conversion::Explicit,
            (Ty::String, Ty::Boolean | Ty::Integer) => Conversion::Explicit,
            _ => Conversion::None,
        }
    }
}
