use std::fmt::{self, Display, Formatter};

/// The static types of the language.
/// Every bound expression resolves to exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ty {
    /// Given to expressions that failed to bind.
    /// Anything involving an `Error` operand is assumed to have
    /// already been reported, so no further diagnostics are raised for it.
    Error,
    Boolean,
    Integer,
    String,
    /// The result of calling a function that returns nothing.
    Void,
}

impl Ty {
    /// Resolves a type name, as used in a conversion call like `int(x)`.
    /// `void` and the error type can't be named.
    pub fn lookup(name: &str) -> Option<Ty> {
        match name {
            "bool" => Some(Ty::Boolean),
            "int" => Some(Ty::Integer),
            "string" => Some(Ty::String),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Ty::Error => "?",
            Ty::Boolean => "bool",
            Ty::Integer => "int",
            Ty::String => "string",
            Ty::Void => "void",
        }
    }
}

impl Display for Ty {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn lookup_round_trips() {
        for ty in [Ty::Boolean, Ty::Integer, Ty::String] {
            assert_eq!(Ty::lookup(ty.name()), Some(ty));
        }
        assert_eq!(Ty::lookup("void"), None);
        assert_eq!(Ty::lookup("?"), None);
    }
}
