//! Element storage.
//!
//! Logical values share scalar storage (0 or 1) and the three tensor-like
//! kinds share full 3x3 storage; the owning [`TypedField`](super::TypedField)
//! kind tag keeps the symmetric and spherical invariants.

use nalgebra::{Matrix3, Vector3};

use crate::base::Kind;

/// Element-indexed data of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldData {
    Scalar(Vec<f64>),
    Vector(Vec<Vector3<f64>>),
    Tensor(Vec<Matrix3<f64>>),
}

impl FieldData {
    pub fn len(&self) -> usize {
        match self {
            FieldData::Scalar(v) => v.len(),
            FieldData::Vector(v) => v.len(),
            FieldData::Tensor(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether this storage is the one used by `kind`.
    pub fn stores(&self, kind: Kind) -> bool {
        match self {
            FieldData::Scalar(_) => matches!(kind, Kind::Logical | Kind::Scalar),
            FieldData::Vector(_) => kind == Kind::Vector,
            FieldData::Tensor(_) => kind.is_tensor_like(),
        }
    }

    pub fn as_scalar(&self) -> Option<&[f64]> {
        match self {
            FieldData::Scalar(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<&[Vector3<f64>]> {
        match self {
            FieldData::Vector(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_tensor(&self) -> Option<&[Matrix3<f64>]> {
        match self {
            FieldData::Tensor(v) => Some(v),
            _ => None,
        }
    }

    /// Repeat a single-element storage `n` times.
    pub(crate) fn repeat(&self, n: usize) -> FieldData {
        match self {
            FieldData::Scalar(v) => FieldData::Scalar(vec![v[0]; n]),
            FieldData::Vector(v) => FieldData::Vector(vec![v[0]; n]),
            FieldData::Tensor(v) => FieldData::Tensor(vec![v[0]; n]),
        }
    }

    /// Pick the elements at `indices`, in order.
    pub(crate) fn gather(&self, indices: &[usize]) -> FieldData {
        match self {
            FieldData::Scalar(v) => FieldData::Scalar(indices.iter().map(|&i| v[i]).collect()),
            FieldData::Vector(v) => FieldData::Vector(indices.iter().map(|&i| v[i]).collect()),
            FieldData::Tensor(v) => FieldData::Tensor(indices.iter().map(|&i| v[i]).collect()),
        }
    }

    /// Zero storage of the given kind.
    pub(crate) fn zeros(kind: Kind, n: usize) -> FieldData {
        match kind {
            Kind::Logical | Kind::Scalar => FieldData::Scalar(vec![0.0; n]),
            Kind::Vector => FieldData::Vector(vec![Vector3::zeros(); n]),
            Kind::Tensor | Kind::SymmTensor | Kind::SphericalTensor => {
                FieldData::Tensor(vec![Matrix3::zeros(); n])
            }
        }
    }
}

/// Element `i` of a slice that may be a broadcast single element.
#[inline]
pub(crate) fn pick<T: Copy>(values: &[T], i: usize) -> T {
    if values.len() == 1 { values[0] } else { values[i] }
}

/// Combine two broadcastable slices into `n` results.
pub(crate) fn zip_map<A: Copy, B: Copy, R>(
    n: usize,
    a: &[A],
    b: &[B],
    f: impl Fn(A, B) -> R,
) -> Vec<R> {
    (0..n).map(|i| f(pick(a, i), pick(b, i))).collect()
}
