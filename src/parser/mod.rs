//! Eager parser for field expressions
//!
//! This module turns expression text straight into field values:
//! - **logos** for lexing
//! - a table-driven **Pratt** evaluator that computes each value as soon as
//!   its operator, call or atom is reduced
//!
//! There is no syntax tree. Legality of every operator is decided from the
//! kinds of the already-evaluated operands, so an illegal combination such
//! as `vector + tensor` is a syntax error at the operator.
//!
//! ## Architecture
//!
//! ```text
//! Source Text
//!     ↓
//! Lexer (logos) → Tokens with SyntaxKind
//!     ↓
//! Evaluator (Pratt) ← grammar tables (legality, binding powers, builtins)
//!     ↓                ↘ plugins consume raw text and hand back an offset
//! TypedField
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use fieldexpr::{Database, Driver};
//!
//! let mut driver = Driver::new(&database);
//! let value = driver.parse("2*p + 1")?;
//! ```

mod calls;
pub mod errors;
mod evaluator;
pub mod grammar;
mod lexer;
mod syntax_kind;

pub use errors::{ErrorCode, SyntaxError, SyntaxErrorBuilder};
pub(crate) use evaluator::{Evaluator, describe};
pub use lexer::{Lexer, Token, tokenize};
pub use syntax_kind::SyntaxKind;
