//! This module contains the evaluator, which runs lowered bound trees,
//! along with the runtime errors it can raise
//! and the host interface the built-in functions are implemented against.

pub mod eval;
pub mod host;
pub mod trace;

use std::collections::HashMap;

use crate::{common::data::Data, construct::symbol::VariableSymbol};

pub use eval::Evaluator;
pub use host::{Console, Host};
pub use trace::Trace;

/// The values of variables, keyed by symbol rather than name,
/// so that shadowed variables never collide.
/// Kept by the caller across submissions.
pub type Variables = HashMap<VariableSymbol, Data>;
