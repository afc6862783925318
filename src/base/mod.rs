//! Foundation types for the expression engine.
//!
//! This module provides the tags every other layer agrees on:
//! - [`Kind`] - algebraic type of a field value
//! - [`Location`] - mesh domain a field lives over
//! - [`ValueType`] - a (kind, location) pair
//! - [`Dimensions`] - optional physical-dimension tag
//! - [`LineCol`], [`LineIndex`] - byte offset to line/column conversion
//!
//! This module has NO dependencies on other fieldexpr modules.

mod dimensions;
mod kind;
mod position;

pub use dimensions::{Dimensions, DimensionsParseError};
pub use kind::{Kind, Location, ValueType};
pub use position::{LineCol, LineIndex};

// Re-export text-size types for convenience
pub use text_size::{TextRange, TextSize};
