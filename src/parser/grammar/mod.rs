//! Grammar tables: operator legality, binding powers and builtin names.
//!
//! The evaluator is a single generic Pratt parser; everything that depends
//! on kinds lives in these tables and is consulted as each operator or call
//! is reduced.

pub mod builtins;
pub mod legality;
pub mod precedence;

pub use builtins::{Arguments, Builtin};
pub use legality::{BinaryOp, Rule, UnaryOp, RULES};
