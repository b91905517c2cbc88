use std::{
    fmt::{self, Debug, Display, Formatter},
    hash::{Hash, Hasher},
    ptr,
    sync::Arc,
};

use crate::common::ty::Ty;

#[derive(Debug)]
struct Variable {
    name: String,
    read_only: bool,
    ty: Ty,
}

/// Represents a unique symbol that corresponds to a single variable.
/// In other words, if two variables with the same name exist in different scopes,
/// they will have different `VariableSymbol`s.
/// Equality and hashing go by identity, never by name,
/// which is what lets the runtime store key on symbols directly.
#[derive(Clone)]
pub struct VariableSymbol(Arc<Variable>);

impl VariableSymbol {
    pub fn new(name: &str, read_only: bool, ty: Ty) -> VariableSymbol {
        VariableSymbol(Arc::new(Variable {
            name: name.to_string(),
            read_only,
            ty,
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Declared with `let`, or the counter of a `for` loop.
    pub fn is_read_only(&self) -> bool {
        self.0.read_only
    }

    pub fn ty(&self) -> Ty {
        self.0.ty
    }
}

impl PartialEq for VariableSymbol {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for VariableSymbol {}

impl Hash for VariableSymbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        ptr::hash(Arc::as_ptr(&self.0), state)
    }
}

impl Debug for VariableSymbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "VariableSymbol({}: {})", self.name(), self.ty())
    }
}

impl Display for VariableSymbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParameterSymbol {
    pub name: &'static str,
    pub ty: Ty,
}

/// A callable built-in.
/// User code can't declare functions,
/// so every `FunctionSymbol` is a `static` below.
#[derive(Debug)]
pub struct FunctionSymbol {
    pub name: &'static str,
    pub parameters: &'static [ParameterSymbol],
    pub ty: Ty,
}

impl PartialEq for FunctionSymbol {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self, other)
    }
}

impl Eq for FunctionSymbol {}

impl Display for FunctionSymbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// `print(text: string)`, writes a line.
pub static PRINT: FunctionSymbol = FunctionSymbol {
    name: "print",
    parameters: &[ParameterSymbol { name: "text", ty: Ty::String }],
    ty: Ty::Void,
};

/// `input() -> string`, reads a line.
pub static INPUT: FunctionSymbol = FunctionSymbol {
    name: "input",
    parameters: &[],
    ty: Ty::String,
};

/// `rnd(max: int) -> int`, a random number in `[0, max)`.
pub static RND: FunctionSymbol = FunctionSymbol {
    name: "rnd",
    parameters: &[ParameterSymbol { name: "max", ty: Ty::Integer }],
    ty: Ty::Integer,
};

pub fn builtins() -> [&'static FunctionSymbol; 3] {
    [&PRINT, &INPUT, &RND]
}

/// A jump target produced while lowering control flow.
/// Only unique within a single lowered program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelSymbol(pub usize);

impl Display for LabelSymbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Label{}", self.0)
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn variables_compare_by_identity() {
        let outer = VariableSymbol::new("x", false, Ty::Integer);
        let inner = VariableSymbol::new("x", false, Ty::Integer);

        assert_ne!(outer, inner);
        assert_eq!(outer, outer.clone());

        let mut values = HashMap::new();
        values.insert(outer.clone(), 1);
        values.insert(inner.clone(), 2);
        assert_eq!(values[&outer], 1);
        assert_eq!(values[&inner], 2);
    }

    #[test]
    fn builtins_are_distinct() {
        let [print, input, rnd] = builtins();
        assert_eq!(print, &PRINT);
        assert_ne!(print, input);
        assert_ne!(input, rnd);
        assert_eq!(rnd.parameters[0].ty, Ty::Integer);
    }

    #[test]
    fn label_names() {
        assert_eq!(LabelSymbol(3).to_string(), "Label3");
    }
}
