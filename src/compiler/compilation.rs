use std::{
    io::{self, Write},
    sync::{Arc, OnceLock},
};

use log::debug;

use crate::{
    common::data::Data,
    compiler::{
        bind::{Binder, BoundGlobalScope},
        lower::Lowerer,
        parse::SyntaxTree,
        syntax::Diagnostics,
    },
    construct::bound::BoundStatement,
    vm::{Console, Evaluator, Host, Trace, Variables},
};

/// What evaluating a compilation produced.
/// If there are any diagnostics, nothing was evaluated
/// and `value` is always `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationResult {
    pub diagnostics: Diagnostics,
    pub value: Option<Data>,
}

/// A single submission, along with every submission before it.
///
/// Binding is done lazily, the first time the global scope is needed,
/// and is then cached.
/// Chaining compilations with [`Compilation::continue_with`]
/// lets later submissions use variables declared by earlier ones,
/// which is how a REPL keeps its state.
#[derive(Debug)]
pub struct Compilation {
    previous: Option<Arc<Compilation>>,
    syntax_tree: SyntaxTree,
    global_scope: OnceLock<Arc<BoundGlobalScope>>,
}

impl Compilation {
    pub fn new(syntax_tree: SyntaxTree) -> Arc<Compilation> {
        Arc::new(Compilation {
            previous: None,
            syntax_tree,
            global_scope: OnceLock::new(),
        })
    }

    /// Creates a compilation for the next submission,
    /// which can see everything declared in this one.
    pub fn continue_with(self: &Arc<Self>, syntax_tree: SyntaxTree) -> Arc<Compilation> {
        Arc::new(Compilation {
            previous: Some(Arc::clone(self)),
            syntax_tree,
            global_scope: OnceLock::new(),
        })
    }

    pub fn previous(&self) -> Option<&Arc<Compilation>> {
        self.previous.as_ref()
    }

    pub fn syntax_tree(&self) -> &SyntaxTree {
        &self.syntax_tree
    }

    /// Binds this submission, if it hasn't been already.
    /// If two threads race to bind, both do the work,
    /// but only the first result is kept and everyone sees that one.
    pub fn global_scope(&self) -> Arc<BoundGlobalScope> {
        if let Some(global_scope) = self.global_scope.get() {
            return Arc::clone(global_scope);
        }

        let previous = self.previous.as_ref().map(|p| p.global_scope());
        let bound = Arc::new(Binder::bind_global_scope(previous, &self.syntax_tree.root));
        Arc::clone(self.global_scope.get_or_init(|| bound))
    }

    /// Every diagnostic, syntactic ones first.
    pub fn diagnostics(&self) -> Diagnostics {
        let mut diagnostics = self.syntax_tree.diagnostics.clone();
        diagnostics.extend(self.global_scope().diagnostics.clone());
        diagnostics
    }

    /// Evaluates against the console.
    /// See [`Compilation::evaluate_with`].
    pub fn evaluate(&self, variables: &mut Variables) -> Result<EvaluationResult, Trace> {
        self.evaluate_with(variables, &mut Console::new())
    }

    /// Evaluates the submission, unless there are any diagnostics.
    /// Diagnostics are returned as part of the result,
    /// the error case is reserved for failures at runtime.
    pub fn evaluate_with(
        &self,
        variables: &mut Variables,
        host: &mut dyn Host,
    ) -> Result<EvaluationResult, Trace> {
        let diagnostics = self.diagnostics();
        if !diagnostics.is_empty() {
            debug!("Not evaluating, {} diagnostic(s)", diagnostics.len());
            return Ok(EvaluationResult { diagnostics, value: None });
        }

        let program = self.program();
        let value = Evaluator::new(&program, variables, host).evaluate()?;

        Ok(EvaluationResult { diagnostics, value })
    }

    /// Writes the lowered bound tree.
    pub fn emit_tree<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.program().write_to(writer)
    }

    fn program(&self) -> Arc<BoundStatement> {
        Lowerer::lower(&self.global_scope().statement)
    }
}
