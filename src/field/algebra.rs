//! Elementwise operators.
//!
//! Every function consumes its operands and returns a freshly owned result.
//! Kind legality is decided by the grammar before these are called; the
//! functions here still refuse storage combinations they cannot compute,
//! check element counts and propagate dimension tags.
//!
//! Dimension tags follow one rule: an untagged operand is a wildcard. It
//! adopts the other side's tag in sums and comparisons and counts as
//! dimensionless in products and quotients.

use nalgebra::{Matrix3, Vector3};

use super::data::{pick, zip_map};
use super::{FieldData, FieldError, TypedField};
use crate::base::{Dimensions, Kind, Location};

/// Comparison operators; all produce logical fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
}

impl CompareOp {
    pub fn as_str(self) -> &'static str {
        match self {
            CompareOp::Lt => "<",
            CompareOp::Gt => ">",
            CompareOp::Le => "<=",
            CompareOp::Ge => ">=",
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
        }
    }

    fn apply(self, a: f64, b: f64) -> bool {
        match self {
            CompareOp::Lt => a < b,
            CompareOp::Gt => a > b,
            CompareOp::Le => a <= b,
            CompareOp::Ge => a >= b,
            CompareOp::Eq => a == b,
            CompareOp::Ne => a != b,
        }
    }
}

/// Apply the same expression to matching storages of two operands.
macro_rules! same_storage {
    ($n:expr, $a:expr, $b:expr, |$p:ident, $q:ident| $body:expr) => {
        match ($a, $b) {
            (FieldData::Scalar(x), FieldData::Scalar(y)) => {
                Some(FieldData::Scalar(zip_map($n, x, y, |$p, $q| $body)))
            }
            (FieldData::Vector(x), FieldData::Vector(y)) => {
                Some(FieldData::Vector(zip_map($n, x, y, |$p, $q| $body)))
            }
            (FieldData::Tensor(x), FieldData::Tensor(y)) => {
                Some(FieldData::Tensor(zip_map($n, x, y, |$p, $q| $body)))
            }
            _ => None,
        }
    };
}

/// Common location and element count of two operands.
pub(crate) fn domain(a: &TypedField, b: &TypedField) -> Result<(Option<Location>, usize), FieldError> {
    match (a.location(), b.location()) {
        (Some(location), Some(other)) => {
            debug_assert_eq!(location, other, "operands at different locations");
            if a.len() != b.len() {
                return Err(FieldError::SizeMismatch {
                    left: a.len(),
                    right: b.len(),
                });
            }
            Ok((Some(location), a.len()))
        }
        (Some(location), None) => Ok((Some(location), a.len())),
        (None, Some(location)) => Ok((Some(location), b.len())),
        (None, None) => Ok((None, 1)),
    }
}

pub(crate) fn same_dimensions(
    op: &'static str,
    a: Option<Dimensions>,
    b: Option<Dimensions>,
) -> Result<Option<Dimensions>, FieldError> {
    match (a, b) {
        (Some(left), Some(right)) if left != right => {
            Err(FieldError::DimensionMismatch { op, left, right })
        }
        (Some(d), _) | (None, Some(d)) => Ok(Some(d)),
        (None, None) => Ok(None),
    }
}

pub(crate) fn product_dimensions(a: Option<Dimensions>, b: Option<Dimensions>) -> Option<Dimensions> {
    match (a, b) {
        (Some(left), Some(right)) => Some(left.multiply(&right)),
        (Some(d), None) | (None, Some(d)) => Some(d),
        (None, None) => None,
    }
}

fn quotient_dimensions(a: Option<Dimensions>, b: Option<Dimensions>) -> Option<Dimensions> {
    match (a, b) {
        (Some(left), Some(right)) => Some(left.divide(&right)),
        (Some(d), None) => Some(d),
        (None, Some(d)) => Some(Dimensions::DIMENSIONLESS.divide(&d)),
        (None, None) => None,
    }
}

fn unsupported(op: &'static str, kind: Kind) -> FieldError {
    FieldError::Unsupported { op, kind }
}

pub fn add(a: TypedField, b: TypedField) -> Result<TypedField, FieldError> {
    let (location, n) = domain(&a, &b)?;
    let dims = same_dimensions("+", a.dimensions(), b.dimensions())?;
    let data = same_storage!(n, a.data(), b.data(), |p, q| p + q)
        .ok_or_else(|| unsupported("+", b.kind()))?;
    Ok(TypedField::from_parts(a.kind(), location, data).with_dimensions(dims))
}

pub fn sub(a: TypedField, b: TypedField) -> Result<TypedField, FieldError> {
    let (location, n) = domain(&a, &b)?;
    let dims = same_dimensions("-", a.dimensions(), b.dimensions())?;
    let data = same_storage!(n, a.data(), b.data(), |p, q| p - q)
        .ok_or_else(|| unsupported("-", b.kind()))?;
    Ok(TypedField::from_parts(a.kind(), location, data).with_dimensions(dims))
}

pub fn neg(a: TypedField) -> TypedField {
    let dims = a.dimensions();
    let kind = a.kind();
    let location = a.location();
    let data = match a.into_data() {
        FieldData::Scalar(v) => FieldData::Scalar(v.into_iter().map(|x| -x).collect()),
        FieldData::Vector(v) => FieldData::Vector(v.into_iter().map(|x| -x).collect()),
        FieldData::Tensor(v) => FieldData::Tensor(v.into_iter().map(|x| -x).collect()),
    };
    TypedField::from_parts(kind, location, data).with_dimensions(dims)
}

fn scale(n: usize, factor: &[f64], data: &FieldData) -> FieldData {
    match data {
        FieldData::Scalar(x) => FieldData::Scalar(zip_map(n, factor, x, |s, v| s * v)),
        FieldData::Vector(x) => FieldData::Vector(zip_map(n, factor, x, |s, v| v * s)),
        FieldData::Tensor(x) => FieldData::Tensor(zip_map(n, factor, x, |s, v| v * s)),
    }
}

/// `*`: scalar times any kind, in either order.
pub fn mul(a: TypedField, b: TypedField) -> Result<TypedField, FieldError> {
    let (location, n) = domain(&a, &b)?;
    let dims = product_dimensions(a.dimensions(), b.dimensions());
    let (kind, data) = match (a.data(), b.data()) {
        (FieldData::Scalar(s), other) => (b.kind(), scale(n, s, other)),
        (other, FieldData::Scalar(s)) => (a.kind(), scale(n, s, other)),
        _ => return Err(unsupported("*", b.kind())),
    };
    Ok(TypedField::from_parts(kind, location, data).with_dimensions(dims))
}

/// `/`: any kind divided by a scalar.
pub fn div(a: TypedField, b: TypedField) -> Result<TypedField, FieldError> {
    let (location, n) = domain(&a, &b)?;
    let dims = quotient_dimensions(a.dimensions(), b.dimensions());
    let FieldData::Scalar(divisor) = b.data() else {
        return Err(unsupported("/", b.kind()));
    };
    let data = match a.data() {
        FieldData::Scalar(x) => FieldData::Scalar(zip_map(n, x, divisor, |v, d| v / d)),
        FieldData::Vector(x) => FieldData::Vector(zip_map(n, x, divisor, |v, d| v / d)),
        FieldData::Tensor(x) => FieldData::Tensor(zip_map(n, x, divisor, |v, d| v / d)),
    };
    Ok(TypedField::from_parts(a.kind(), location, data).with_dimensions(dims))
}

/// `%` on scalars: remainder with the sign of the dividend.
pub fn modulo(a: TypedField, b: TypedField) -> Result<TypedField, FieldError> {
    let (location, n) = domain(&a, &b)?;
    let dims = same_dimensions("%", a.dimensions(), b.dimensions())?;
    let (FieldData::Scalar(x), FieldData::Scalar(y)) = (a.data(), b.data()) else {
        return Err(unsupported("%", a.kind()));
    };
    let data = FieldData::Scalar(zip_map(n, x, y, |p, q| p % q));
    Ok(TypedField::from_parts(Kind::Scalar, location, data).with_dimensions(dims))
}

/// `&`: single contraction.
///
/// vector & vector is the dot product, tensor & vector and vector & tensor
/// are matrix-vector products, and two tensor-like operands give their
/// matrix product as a full tensor.
pub fn inner(a: TypedField, b: TypedField) -> Result<TypedField, FieldError> {
    let (location, n) = domain(&a, &b)?;
    let dims = product_dimensions(a.dimensions(), b.dimensions());
    let (kind, data) = match (a.data(), b.data()) {
        (FieldData::Vector(u), FieldData::Vector(v)) => {
            (Kind::Scalar, FieldData::Scalar(zip_map(n, u, v, |p, q| p.dot(&q))))
        }
        (FieldData::Tensor(t), FieldData::Vector(v)) => {
            (Kind::Vector, FieldData::Vector(zip_map(n, t, v, |m, q| m * q)))
        }
        (FieldData::Vector(v), FieldData::Tensor(t)) => (
            Kind::Vector,
            FieldData::Vector(zip_map(n, v, t, |q, m| m.transpose() * q)),
        ),
        (FieldData::Tensor(s), FieldData::Tensor(t)) => {
            let kind = match (a.kind(), b.kind()) {
                (Kind::SphericalTensor, Kind::SphericalTensor) => Kind::SphericalTensor,
                _ => Kind::Tensor,
            };
            (kind, FieldData::Tensor(zip_map(n, s, t, |p, q| p * q)))
        }
        _ => return Err(unsupported("&", a.kind())),
    };
    Ok(TypedField::from_parts(kind, location, data).with_dimensions(dims))
}

/// `^`: cross product of two vectors.
pub fn cross(a: TypedField, b: TypedField) -> Result<TypedField, FieldError> {
    let (location, n) = domain(&a, &b)?;
    let dims = product_dimensions(a.dimensions(), b.dimensions());
    let (FieldData::Vector(u), FieldData::Vector(v)) = (a.data(), b.data()) else {
        return Err(unsupported("^", a.kind()));
    };
    let data = FieldData::Vector(zip_map(n, u, v, |p: Vector3<f64>, q| p.cross(&q)));
    Ok(TypedField::from_parts(Kind::Vector, location, data).with_dimensions(dims))
}

/// `&&` between tensor-like operands: full contraction to a scalar.
pub fn double_inner(a: TypedField, b: TypedField) -> Result<TypedField, FieldError> {
    let (location, n) = domain(&a, &b)?;
    let dims = product_dimensions(a.dimensions(), b.dimensions());
    let (FieldData::Tensor(s), FieldData::Tensor(t)) = (a.data(), b.data()) else {
        return Err(unsupported("&&", a.kind()));
    };
    let data = FieldData::Scalar(zip_map(n, s, t, |p: Matrix3<f64>, q| p.component_mul(&q).sum()));
    Ok(TypedField::from_parts(Kind::Scalar, location, data).with_dimensions(dims))
}

pub fn compare(op: CompareOp, a: TypedField, b: TypedField) -> Result<TypedField, FieldError> {
    let (location, n) = domain(&a, &b)?;
    same_dimensions(op.as_str(), a.dimensions(), b.dimensions())?;
    let (FieldData::Scalar(x), FieldData::Scalar(y)) = (a.data(), b.data()) else {
        return Err(unsupported(op.as_str(), a.kind()));
    };
    let data = FieldData::Scalar(zip_map(n, x, y, |p, q| truth(op.apply(p, q))));
    Ok(TypedField::from_parts(Kind::Logical, location, data))
}

fn logical_pair(
    op: &'static str,
    a: TypedField,
    b: TypedField,
    f: impl Fn(bool, bool) -> bool,
) -> Result<TypedField, FieldError> {
    let (location, n) = domain(&a, &b)?;
    let (FieldData::Scalar(x), FieldData::Scalar(y)) = (a.data(), b.data()) else {
        return Err(unsupported(op, a.kind()));
    };
    let data = FieldData::Scalar(zip_map(n, x, y, |p, q| truth(f(p != 0.0, q != 0.0))));
    Ok(TypedField::from_parts(Kind::Logical, location, data))
}

pub fn and(a: TypedField, b: TypedField) -> Result<TypedField, FieldError> {
    logical_pair("&&", a, b, |p, q| p && q)
}

pub fn or(a: TypedField, b: TypedField) -> Result<TypedField, FieldError> {
    logical_pair("||", a, b, |p, q| p || q)
}

pub fn not(a: TypedField) -> Result<TypedField, FieldError> {
    let location = a.location();
    let FieldData::Scalar(x) = a.into_data() else {
        return Err(unsupported("!", Kind::Logical));
    };
    let data = FieldData::Scalar(x.into_iter().map(|v| truth(v == 0.0)).collect());
    Ok(TypedField::from_parts(Kind::Logical, location, data))
}

/// `cond ? a : b`, elementwise. Both branches are already evaluated.
pub fn select(cond: TypedField, a: TypedField, b: TypedField) -> Result<TypedField, FieldError> {
    let (branch_location, n) = domain(&a, &b)?;
    let (location, n) = match (cond.location(), branch_location) {
        (Some(_), Some(_)) if cond.len() != n => {
            return Err(FieldError::SizeMismatch {
                left: cond.len(),
                right: n,
            });
        }
        (Some(location), _) => (Some(location), cond.len()),
        (None, location) => (location, n),
    };
    let dims = same_dimensions("?:", a.dimensions(), b.dimensions())?;
    let FieldData::Scalar(mask) = cond.data() else {
        return Err(unsupported("?:", cond.kind()));
    };
    let chosen = |i: usize| pick(mask, i) != 0.0;
    let data = match (a.data(), b.data()) {
        (FieldData::Scalar(x), FieldData::Scalar(y)) => FieldData::Scalar(
            (0..n)
                .map(|i| if chosen(i) { pick(x, i) } else { pick(y, i) })
                .collect(),
        ),
        (FieldData::Vector(x), FieldData::Vector(y)) => FieldData::Vector(
            (0..n)
                .map(|i| if chosen(i) { pick(x, i) } else { pick(y, i) })
                .collect(),
        ),
        (FieldData::Tensor(x), FieldData::Tensor(y)) => FieldData::Tensor(
            (0..n)
                .map(|i| if chosen(i) { pick(x, i) } else { pick(y, i) })
                .collect(),
        ),
        _ => return Err(unsupported("?:", b.kind())),
    };
    Ok(TypedField::from_parts(a.kind(), location, data).with_dimensions(dims))
}

pub(crate) fn truth(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}
