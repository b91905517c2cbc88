use std::fmt::{self, Debug, Display, Formatter};

use crate::common::ty::Ty;

/// Built-in Sirius datatypes.
/// Produced by literals at lex time and by the evaluator at runtime.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Data {
    Integer(i32),
    Boolean(bool),
    String(String),
}

impl Data {
    pub fn ty(&self) -> Ty {
        match self {
            Data::Integer(_) => Ty::Integer,
            Data::Boolean(_) => Ty::Boolean,
            Data::String(_) => Ty::String,
        }
    }
}

impl From<i32> for Data {
    fn from(n: i32) -> Self {
        Data::Integer(n)
    }
}

impl From<bool> for Data {
    fn from(b: bool) -> Self {
        Data::Boolean(b)
    }
}

impl From<&str> for Data {
    fn from(s: &str) -> Self {
        Data::String(s.to_string())
    }
}

impl From<String> for Data {
    fn from(s: String) -> Self {
        Data::String(s)
    }
}

impl Display for Data {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Data::Integer(n) => write!(f, "{}", n),
            Data::Boolean(b) => write!(f, "{}", if *b { "true" } else { "false" }),
            Data::String(s) => write!(f, "{}", s),
        }
    }
}

impl Debug for Data {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Data::Integer(n) => write!(f, "Integer({:?})", n),
            Data::Boolean(b) => write!(f, "Boolean({:?})", b),
            Data::String(s) => write!(f, "String({:?})", s),
        }
    }
}
