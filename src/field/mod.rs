//! Field values and the field-algebra library.
//!
//! [`TypedField`] is the single owned value every grammar reduction produces.
//! The [`algebra`] and [`functions`] modules implement the arithmetic,
//! reductions and tensor operations the grammar dispatches to; they assume
//! operator legality has already been decided and only guard element
//! counts and dimension tags.

pub mod algebra;
mod data;
pub mod functions;
mod typed;

pub use data::FieldData;
pub use typed::TypedField;

use thiserror::Error;

use crate::base::{Dimensions, Kind};

/// Runtime failures of the field-algebra layer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("operands do not have matching domain size: {left} vs {right}")]
    SizeMismatch { left: usize, right: usize },

    #[error("dimensions of operands differ for '{op}': {left} vs {right}")]
    DimensionMismatch {
        op: &'static str,
        left: Dimensions,
        right: Dimensions,
    },

    #[error("storage does not match kind {kind}")]
    StorageMismatch { kind: Kind },

    #[error("'{op}' is not defined for {kind}")]
    Unsupported { op: &'static str, kind: Kind },

    #[error("'{op}' needs at least one element")]
    Empty { op: &'static str },

    #[error("'{op}' of a singular tensor at element {index}")]
    Singular { op: &'static str, index: usize },
}
