//! Physical dimension tags.
//!
//! Exponents of the seven base quantities, written the usual way as
//! `[mass length time temperature moles current luminous]`.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

const BASE_COUNT: usize = 7;

/// Exponents of the seven base quantities.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Dimensions([f64; BASE_COUNT]);

/// Failure to read a `[...]` dimension set.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DimensionsParseError {
    #[error("dimension set must be enclosed in '[' and ']'")]
    MissingBrackets,
    #[error("expected {BASE_COUNT} exponents, found {0}")]
    WrongCount(usize),
    #[error("invalid exponent '{0}'")]
    InvalidExponent(String),
}

impl Dimensions {
    pub const DIMENSIONLESS: Dimensions = Dimensions([0.0; BASE_COUNT]);

    pub const fn new(exponents: [f64; BASE_COUNT]) -> Self {
        Self(exponents)
    }

    pub fn exponents(&self) -> &[f64; BASE_COUNT] {
        &self.0
    }

    pub fn is_dimensionless(&self) -> bool {
        self.0.iter().all(|e| *e == 0.0)
    }

    /// Dimensions of a product.
    pub fn multiply(&self, other: &Dimensions) -> Dimensions {
        let mut out = self.0;
        for (o, e) in out.iter_mut().zip(other.0) {
            *o += e;
        }
        Dimensions(out)
    }

    /// Dimensions of a quotient.
    pub fn divide(&self, other: &Dimensions) -> Dimensions {
        let mut out = self.0;
        for (o, e) in out.iter_mut().zip(other.0) {
            *o -= e;
        }
        Dimensions(out)
    }

    /// Dimensions raised to a power.
    pub fn pow(&self, exponent: f64) -> Dimensions {
        Dimensions(self.0.map(|e| e * exponent))
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{e}")?;
        }
        f.write_str("]")
    }
}

impl FromStr for Dimensions {
    type Err = DimensionsParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = s
            .trim()
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .ok_or(DimensionsParseError::MissingBrackets)?;

        let parts: Vec<&str> = inner.split_whitespace().collect();
        if parts.len() != BASE_COUNT {
            return Err(DimensionsParseError::WrongCount(parts.len()));
        }

        let mut exponents = [0.0; BASE_COUNT];
        for (slot, part) in exponents.iter_mut().zip(parts) {
            *slot = part
                .parse()
                .map_err(|_| DimensionsParseError::InvalidExponent(part.to_string()))?;
        }
        Ok(Dimensions(exponents))
    }
}
