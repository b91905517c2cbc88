use thiserror::Error;

use crate::{common::ty::Ty, construct::symbol::LabelSymbol};

/// Represents a runtime error.
/// Unlike diagnostics, these are fatal:
/// evaluation stops at the first one raised.
///
/// Only the first few variants can be caused by a well-typed program,
/// the rest mean the bound tree handed to the evaluator was malformed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Trace {
    #[error("Division by zero.")]
    DivisionByZero,
    #[error("Cannot convert '{value}' to type '{ty}'.")]
    InvalidConversion { value: String, ty: Ty },
    #[error("Random number bound must not be negative, was {0}.")]
    NegativeBound(i32),
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Variable '{0}' was used before it was assigned.")]
    Unassigned(String),
    #[error("Function '{0}' has no implementation.")]
    UnknownFunction(&'static str),
    #[error("Jump to '{0}', which is not defined.")]
    UndefinedLabel(LabelSymbol),
    #[error("Expression produced no value.")]
    MissingValue,
    #[error("Operands don't match their operator.")]
    InvalidOperands,
    #[error("Unexpected {0} in lowered program.")]
    Unlowered(&'static str),
}
