//! # Sirius
//! This repository contains the core of the Sirius Programming Language:
//! a small, statically typed, imperative language.
//! It includes the compiler front end, a tree-walking evaluator,
//! and the diagnostics machinery that ties them together.
//! The interactive shell lives elsewhere; this crate is what it embeds.
//!
//! ## Embedding Sirius in Rust
//! Add sirius to your `Cargo.toml`:
//! ```toml
//! sirius = "0.4"
//! ```
//! Then parse, compile and evaluate submissions,
//! chaining them together to keep variables around between them:
//! ```
//! use sirius::{Compilation, Data, SyntaxTree, Variables};
//!
//! let mut variables = Variables::new();
//!
//! let first = Compilation::new(SyntaxTree::parse("var x = 20"));
//! first.evaluate(&mut variables).unwrap();
//!
//! let second = first.continue_with(SyntaxTree::parse("x + 22"));
//! let result = second.evaluate(&mut variables).unwrap();
//!
//! assert!(result.diagnostics.is_empty());
//! assert_eq!(result.value, Some(Data::Integer(42)));
//! ```
//!
//! ## Overview of the compilation process
//! Source code is held in a `SourceText`, which knows where each line starts.
//! The `compiler` lexes and parses it into a `SyntaxTree`,
//! binds that into a type checked bound tree,
//! then lowers structured control flow into labels and gotos.
//! The `vm` steps through the lowered program.
//!
//! Compile time problems never abort a pass, they're collected as `Diagnostics`.
//! Only runtime errors, like dividing by zero, stop evaluation,
//! and are returned as a `Trace`.
//!
//! Passes log what they're doing through the `log` crate,
//! install any logger to see it.

pub mod common;
pub mod compiler;
pub mod construct;
pub mod vm;

pub use common::data::Data;
pub use compiler::{
    compilation::{Compilation, EvaluationResult},
    parse::SyntaxTree,
    syntax::{Diagnostic, Diagnostics},
};
pub use vm::{trace::Trace, Variables};

/// Compiles and evaluates a single, standalone submission.
#[inline(always)]
pub fn run(source: &str) -> Result<EvaluationResult, Trace> {
    Compilation::new(SyntaxTree::parse(source)).evaluate(&mut Variables::new())
}
