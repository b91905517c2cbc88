//! This module contains the compiler implementation.
//!
//! Each step in the compiler pipeline turns one datatype into another,
//! starting with a `SourceText`:
//!
//! 1. Tokens:       `lex.rs`
//! 2. Syntax tree:  `parse.rs`
//! 3. Bound tree:   `bind.rs`
//! 4. Lowered tree: `lower.rs`, built on `rewrite.rs`
//!
//! No step ever stops early: problems are collected as `Diagnostics`
//! and each step recovers, so every problem in a submission is reported at once.
//! `compilation.rs` ties the steps together and hands the result to the `vm`.

pub mod bind;
pub mod compilation;
pub mod lex;
pub mod lower;
pub mod parse;
pub mod rewrite;

pub mod syntax;

use std::sync::Arc;

pub use bind::{Binder, BoundGlobalScope};
pub use compilation::{Compilation, EvaluationResult};
pub use lex::Lexer;
pub use lower::Lowerer;
pub use parse::SyntaxTree;
pub use rewrite::BoundTreeRewriter;
pub use syntax::{Diagnostic, Diagnostics};

use crate::{
    common::source::SourceText,
    construct::{bound::BoundStatement, token::SyntaxToken},
};

#[inline(always)]
pub fn lex(source: &str) -> (Vec<SyntaxToken>, Diagnostics) {
    Lexer::lex_all(SourceText::new(source))
}

#[inline(always)]
pub fn parse(source: &str) -> SyntaxTree {
    SyntaxTree::parse(source)
}

#[inline(always)]
pub fn bind(previous: Option<Arc<BoundGlobalScope>>, tree: &SyntaxTree) -> BoundGlobalScope {
    Binder::bind_global_scope(previous, &tree.root)
}

#[inline(always)]
pub fn lower(statement: &Arc<BoundStatement>) -> Arc<BoundStatement> {
    Lowerer::lower(statement)
}
