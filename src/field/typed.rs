//! Typed field values.

use nalgebra::{Matrix3, Vector3};

use super::data::FieldData;
use super::FieldError;
use crate::base::{Dimensions, Kind, Location, ValueType};

/// An owned, kind-and-location-tagged array of numeric data.
///
/// A value with no location is a *constant*: exactly one element that
/// broadcasts against any located operand and is expanded to a location
/// when the expression is accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedField {
    kind: Kind,
    location: Option<Location>,
    data: FieldData,
    dimensions: Option<Dimensions>,
}

impl TypedField {
    /// Build a field, checking that `data` is the storage `kind` uses.
    pub fn try_new(kind: Kind, location: Location, data: FieldData) -> Result<Self, FieldError> {
        if !data.stores(kind) {
            return Err(FieldError::StorageMismatch { kind });
        }
        Ok(Self::from_parts(kind, Some(location), data))
    }

    pub(crate) fn from_parts(kind: Kind, location: Option<Location>, data: FieldData) -> Self {
        debug_assert!(data.stores(kind), "storage does not match {kind}");
        debug_assert!(location.is_some() || data.len() == 1, "constants hold one element");
        Self {
            kind,
            location,
            data,
            dimensions: None,
        }
    }

    pub fn scalar(location: Location, values: Vec<f64>) -> Self {
        Self::from_parts(Kind::Scalar, Some(location), FieldData::Scalar(values))
    }

    /// Logical field; any non-zero input counts as true.
    pub fn logical(location: Location, values: Vec<bool>) -> Self {
        let values = values.into_iter().map(|b| if b { 1.0 } else { 0.0 }).collect();
        Self::from_parts(Kind::Logical, Some(location), FieldData::Scalar(values))
    }

    pub fn vector(location: Location, values: Vec<Vector3<f64>>) -> Self {
        Self::from_parts(Kind::Vector, Some(location), FieldData::Vector(values))
    }

    pub fn tensor(location: Location, values: Vec<Matrix3<f64>>) -> Self {
        Self::from_parts(Kind::Tensor, Some(location), FieldData::Tensor(values))
    }

    /// Symmetric tensor field; the upper triangle of each input is mirrored.
    pub fn symm_tensor(location: Location, values: Vec<Matrix3<f64>>) -> Self {
        let values = values.into_iter().map(|m| symmetrize_upper(&m)).collect();
        Self::from_parts(Kind::SymmTensor, Some(location), FieldData::Tensor(values))
    }

    /// Spherical tensor field from the diagonal coefficients.
    pub fn spherical_tensor(location: Location, values: Vec<f64>) -> Self {
        let values = values.into_iter().map(|s| Matrix3::identity() * s).collect();
        Self::from_parts(Kind::SphericalTensor, Some(location), FieldData::Tensor(values))
    }

    pub fn constant_scalar(value: f64) -> Self {
        Self::from_parts(Kind::Scalar, None, FieldData::Scalar(vec![value]))
    }

    pub fn constant_logical(value: bool) -> Self {
        Self::from_parts(
            Kind::Logical,
            None,
            FieldData::Scalar(vec![if value { 1.0 } else { 0.0 }]),
        )
    }

    pub fn constant_vector(value: Vector3<f64>) -> Self {
        Self::from_parts(Kind::Vector, None, FieldData::Vector(vec![value]))
    }

    /// Constant of a tensor-like kind.
    pub fn constant_tensor(kind: Kind, value: Matrix3<f64>) -> Self {
        Self::from_parts(kind, None, FieldData::Tensor(vec![value]))
    }

    /// A located field with every element equal to `value`'s single element.
    pub fn uniform(location: Location, n: usize, value: &TypedField) -> Self {
        Self {
            kind: value.kind,
            location: Some(location),
            data: value.data.repeat(n),
            dimensions: value.dimensions,
        }
    }

    pub fn zeros(value_type: ValueType, n: usize) -> Self {
        Self::from_parts(
            value_type.kind,
            Some(value_type.location),
            FieldData::zeros(value_type.kind, n),
        )
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// `None` for constants.
    pub fn location(&self) -> Option<Location> {
        self.location
    }

    pub fn is_constant(&self) -> bool {
        self.location.is_none()
    }

    pub fn is_logical(&self) -> bool {
        self.kind == Kind::Logical
    }

    pub fn value_type(&self) -> Option<ValueType> {
        self.location.map(|location| ValueType::new(self.kind, location))
    }

    pub fn data(&self) -> &FieldData {
        &self.data
    }

    pub fn into_data(self) -> FieldData {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn dimensions(&self) -> Option<Dimensions> {
        self.dimensions
    }

    pub fn with_dimensions(mut self, dimensions: Option<Dimensions>) -> Self {
        self.dimensions = dimensions;
        self
    }

    pub fn scalar_values(&self) -> Option<&[f64]> {
        self.data.as_scalar()
    }

    pub fn vector_values(&self) -> Option<&[Vector3<f64>]> {
        self.data.as_vector()
    }

    pub fn tensor_values(&self) -> Option<&[Matrix3<f64>]> {
        self.data.as_tensor()
    }

    /// Logical values as booleans (non-zero is true).
    pub fn truth_values(&self) -> Option<Vec<bool>> {
        self.data
            .as_scalar()
            .map(|values| values.iter().map(|v| *v != 0.0).collect())
    }

    /// Expand a constant to `n` elements at `location`; located fields pass through.
    pub fn broadcast_to(self, location: Location, n: usize) -> Self {
        if self.location.is_some() {
            return self;
        }
        Self {
            kind: self.kind,
            location: Some(location),
            data: self.data.repeat(n),
            dimensions: self.dimensions,
        }
    }

    /// Retag the value without touching its storage.
    pub(crate) fn relabel(mut self, kind: Kind) -> Self {
        debug_assert!(self.data.stores(kind));
        self.kind = kind;
        self
    }

    pub(crate) fn with_location(mut self, location: Option<Location>) -> Self {
        self.location = location;
        self
    }

    /// Extract a named component (`x`, `yz`, `ii`, ...) as a scalar field.
    ///
    /// Returns `None` if the kind has no such component.
    pub fn component(&self, name: &str) -> Option<TypedField> {
        if !self.kind.components().contains(&name) {
            return None;
        }
        let values: Vec<f64> = match &self.data {
            FieldData::Vector(v) => {
                let i = axis(name.as_bytes()[0])?;
                v.iter().map(|e| e[i]).collect()
            }
            FieldData::Tensor(t) if name == "ii" => t.iter().map(|e| e[(0, 0)]).collect(),
            FieldData::Tensor(t) => {
                let bytes = name.as_bytes();
                let (r, c) = (axis(bytes[0])?, axis(bytes[1])?);
                t.iter().map(|e| e[(r, c)]).collect()
            }
            FieldData::Scalar(_) => return None,
        };
        Some(
            Self::from_parts(Kind::Scalar, self.location, FieldData::Scalar(values))
                .with_dimensions(self.dimensions),
        )
    }
}

fn axis(c: u8) -> Option<usize> {
    match c {
        b'x' => Some(0),
        b'y' => Some(1),
        b'z' => Some(2),
        _ => None,
    }
}

fn symmetrize_upper(m: &Matrix3<f64>) -> Matrix3<f64> {
    let mut out = *m;
    for r in 0..3 {
        for c in 0..r {
            out[(r, c)] = m[(c, r)];
        }
    }
    out
}
