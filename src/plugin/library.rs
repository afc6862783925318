//! Plugins shipped with the crate.

use super::{ArgumentReader, PluginError, PluginFunction};
use crate::base::Kind;
use crate::driver::Driver;
use crate::field::{FieldData, TypedField};
use crate::parser::describe;

/// `(scalar expression, number, number)` shared by both plugins.
fn bounded_scalar(
    text: &str,
    driver: &mut Driver<'_>,
) -> Result<(TypedField, f64, f64, usize), PluginError> {
    let mut args = ArgumentReader::new(text);
    args.open()?;
    let x = args.expression(driver, None)?;
    if x.kind() != Kind::Scalar {
        return Err(PluginError::WrongType {
            expected: "scalar".to_string(),
            found: describe(&x),
        });
    }
    args.separator()?;
    let lo = args.scalar()?;
    args.separator()?;
    let hi = args.scalar()?;
    args.close()?;
    if lo > hi {
        return Err(PluginError::Failed(format!(
            "lower bound {} exceeds upper bound {}",
            lo, hi
        )));
    }
    Ok((x, lo, hi, args.consumed()))
}

fn scalar_values(x: &TypedField) -> &[f64] {
    x.scalar_values().unwrap_or_default()
}

/// `clamp(x, lo, hi)`: scalar values clipped to `[lo, hi]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Clamp;

impl PluginFunction for Clamp {
    fn name(&self) -> &str {
        "clamp"
    }

    fn description(&self) -> &str {
        "scalar field clipped to literal bounds"
    }

    fn evaluate(
        &self,
        text: &str,
        driver: &mut Driver<'_>,
    ) -> Result<(TypedField, usize), PluginError> {
        let (x, lo, hi, consumed) = bounded_scalar(text, driver)?;
        let values = scalar_values(&x).iter().map(|v| v.clamp(lo, hi)).collect();
        let value = TypedField::from_parts(Kind::Scalar, x.location(), FieldData::Scalar(values))
            .with_dimensions(x.dimensions());
        Ok((value, consumed))
    }
}

/// `inRange(x, lo, hi)`: logical mask of `lo <= x <= hi`.
#[derive(Debug, Clone, Copy, Default)]
pub struct InRange;

impl PluginFunction for InRange {
    fn name(&self) -> &str {
        "inRange"
    }

    fn description(&self) -> &str {
        "logical mask of scalar values within literal bounds"
    }

    fn evaluate(
        &self,
        text: &str,
        driver: &mut Driver<'_>,
    ) -> Result<(TypedField, usize), PluginError> {
        let (x, lo, hi, consumed) = bounded_scalar(text, driver)?;
        let values = scalar_values(&x)
            .iter()
            .map(|&v| if (lo..=hi).contains(&v) { 1.0 } else { 0.0 })
            .collect();
        let value = TypedField::from_parts(Kind::Logical, x.location(), FieldData::Scalar(values));
        Ok((value, consumed))
    }
}
