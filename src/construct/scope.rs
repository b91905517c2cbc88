use std::collections::HashMap;

use crate::construct::symbol::{self, FunctionSymbol, VariableSymbol};

/// Represents an insertion-ordered map from names to symbols
/// with O(1) lookup. Note that this is insert-only.
#[derive(Debug, Clone)]
pub struct VecMap<T> {
    order: Vec<T>,
    members: HashMap<String, usize>,
}

impl<T> VecMap<T> {
    pub fn new() -> Self {
        VecMap {
            order: vec![],
            members: HashMap::new(),
        }
    }

    /// Inserts `item` under `name`.
    /// Returns `false`, leaving the map untouched, if the name is taken.
    pub fn insert(&mut self, name: &str, item: T) -> bool {
        if self.members.contains_key(name) {
            return false;
        }
        self.members.insert(name.to_string(), self.order.len());
        self.order.push(item);
        true
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.members.get(name).map(|index| &self.order[*index])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.members.contains_key(name)
    }

    pub fn items(&self) -> &[T] {
        &self.order
    }
}

impl<T> Default for VecMap<T> {
    fn default() -> Self {
        VecMap::new()
    }
}

/// Anything a name can resolve to.
#[derive(Debug, Clone, PartialEq)]
pub enum Symbol {
    Variable(VariableSymbol),
    Function(&'static FunctionSymbol),
}

/// A single lexical scope.
/// Both tables are only allocated once something is declared in them,
/// most scopes (think loop bodies) never declare anything.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    variables: Option<VecMap<VariableSymbol>>,
    functions: Option<VecMap<&'static FunctionSymbol>>,
}

impl Scope {
    pub fn new() -> Scope {
        Scope::default()
    }

    /// The outermost scope, holding the built-in functions.
    pub fn builtins() -> Scope {
        let mut scope = Scope::new();
        for function in symbol::builtins() {
            scope.try_declare_function(function);
        }
        scope
    }

    fn is_declared(&self, name: &str) -> bool {
        self.variables.as_ref().map_or(false, |v| v.contains(name))
            || self.functions.as_ref().map_or(false, |f| f.contains(name))
    }

    /// Returns `false` if the name is already declared in this scope.
    /// Names in enclosing scopes don't count, those are shadowed.
    pub fn try_declare_variable(&mut self, variable: VariableSymbol) -> bool {
        if self.is_declared(variable.name()) {
            return false;
        }
        let name = variable.name().to_string();
        self.variables
            .get_or_insert_with(VecMap::new)
            .insert(&name, variable)
    }

    pub fn try_declare_function(&mut self, function: &'static FunctionSymbol) -> bool {
        if self.is_declared(function.name) {
            return false;
        }
        self.functions
            .get_or_insert_with(VecMap::new)
            .insert(function.name, function)
    }

    pub fn get(&self, name: &str) -> Option<Symbol> {
        if let Some(variable) = self.variables.as_ref().and_then(|v| v.get(name)) {
            return Some(Symbol::Variable(variable.clone()));
        }
        self.functions
            .as_ref()
            .and_then(|f| f.get(name))
            .map(|function| Symbol::Function(*function))
    }

    /// Variables in the order they were declared.
    pub fn declared_variables(&self) -> Vec<VariableSymbol> {
        self.variables
            .as_ref()
            .map(|v| v.items().to_vec())
            .unwrap_or_default()
    }
}

/// The chain of scopes the binder is currently inside of.
/// The innermost scope is always present; entering pushes a new one,
/// exiting pops it back off.
#[derive(Debug, Clone)]
pub struct ScopeStack {
    local: Scope,
    enclosing: Vec<Scope>,
}

impl ScopeStack {
    pub fn new(root: Scope) -> ScopeStack {
        ScopeStack {
            local: root,
            enclosing: vec![],
        }
    }

    pub fn enter_scope(&mut self) {
        let enclosing = std::mem::take(&mut self.local);
        self.enclosing.push(enclosing);
    }

    /// Pops the innermost scope, returning it.
    /// The root scope is never popped, `None` is returned instead.
    pub fn exit_scope(&mut self) -> Option<Scope> {
        let enclosing = self.enclosing.pop()?;
        Some(std::mem::replace(&mut self.local, enclosing))
    }

    pub fn local_scope(&self) -> &Scope {
        &self.local
    }

    pub fn depth(&self) -> usize {
        self.enclosing.len()
    }

    pub fn try_declare_variable(&mut self, variable: VariableSymbol) -> bool {
        self.local.try_declare_variable(variable)
    }

    /// Walks outward from the innermost scope,
    /// stopping at the first scope that declares `name` at all.
    pub fn lookup(&self, name: &str) -> Option<Symbol> {
        std::iter::once(&self.local)
            .chain(self.enclosing.iter().rev())
            .find_map(|scope| scope.get(name))
    }

    pub fn lookup_variable(&self, name: &str) -> Option<VariableSymbol> {
        match self.lookup(name)? {
            Symbol::Variable(variable) => Some(variable),
            Symbol::Function(_) => None,
        }
    }

    /// Note that a variable in a nearer scope hides a function of the same name,
    /// so the function can't be found.
    pub fn lookup_function(&self, name: &str) -> Option<&'static FunctionSymbol> {
        match self.lookup(name)? {
            Symbol::Function(function) => Some(function),
            Symbol::Variable(_) => None,
        }
    }
}
