//! The datastructures the compiler passes consume and produce.
//! Each pass turns one of these into the next:
//! tokens into a syntax tree, the syntax tree into a bound tree,
//! and the bound tree into a flat, lowered bound tree.

pub mod bound; // type checked IR, also used lowered
pub mod operator;
pub mod scope;
pub mod symbol;
pub mod token;
pub mod tree; // syntax tree, untyped
