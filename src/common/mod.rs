//! Contains datastructures and utility functions
//! common to both the `compiler` and `vm`.
//!
//! - Source code representation and span annotations.
//! - Static types and runtime data.

pub mod data;
pub mod source;
pub mod span;
pub mod ty;

pub use data::Data;
pub use source::SourceText;
pub use span::Span;
pub use ty::Ty;
