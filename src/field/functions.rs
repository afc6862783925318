//! Named functions over fields: elementwise maths, tensor algebra,
//! whole-field reductions and component builders.

use nalgebra::{Matrix3, Vector3};

use super::algebra::{domain, same_dimensions};
use super::data::{pick, zip_map};
use super::{FieldData, FieldError, TypedField};
use crate::base::{Dimensions, Kind, Location};

/// Elementwise functions of one scalar argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarFunction {
    Sqrt,
    Exp,
    Log,
    Log10,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Asinh,
    Acosh,
    Atanh,
    Erf,
    Erfc,
    Lgamma,
    BesselJ0,
    BesselJ1,
    BesselY0,
    BesselY1,
    /// `1` for non-negative input, `-1` otherwise
    Sign,
    /// `1` for non-negative input, `0` otherwise
    Pos,
    /// `1` for negative input, `0` otherwise
    Neg,
}

impl ScalarFunction {
    pub const ALL: [ScalarFunction; 26] = [
        ScalarFunction::Sqrt,
        ScalarFunction::Exp,
        ScalarFunction::Log,
        ScalarFunction::Log10,
        ScalarFunction::Sin,
        ScalarFunction::Cos,
        ScalarFunction::Tan,
        ScalarFunction::Asin,
        ScalarFunction::Acos,
        ScalarFunction::Atan,
        ScalarFunction::Sinh,
        ScalarFunction::Cosh,
        ScalarFunction::Tanh,
        ScalarFunction::Asinh,
        ScalarFunction::Acosh,
        ScalarFunction::Atanh,
        ScalarFunction::Erf,
        ScalarFunction::Erfc,
        ScalarFunction::Lgamma,
        ScalarFunction::BesselJ0,
        ScalarFunction::BesselJ1,
        ScalarFunction::BesselY0,
        ScalarFunction::BesselY1,
        ScalarFunction::Sign,
        ScalarFunction::Pos,
        ScalarFunction::Neg,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ScalarFunction::Sqrt => "sqrt",
            ScalarFunction::Exp => "exp",
            ScalarFunction::Log => "log",
            ScalarFunction::Log10 => "log10",
            ScalarFunction::Sin => "sin",
            ScalarFunction::Cos => "cos",
            ScalarFunction::Tan => "tan",
            ScalarFunction::Asin => "asin",
            ScalarFunction::Acos => "acos",
            ScalarFunction::Atan => "atan",
            ScalarFunction::Sinh => "sinh",
            ScalarFunction::Cosh => "cosh",
            ScalarFunction::Tanh => "tanh",
            ScalarFunction::Asinh => "asinh",
            ScalarFunction::Acosh => "acosh",
            ScalarFunction::Atanh => "atanh",
            ScalarFunction::Erf => "erf",
            ScalarFunction::Erfc => "erfc",
            ScalarFunction::Lgamma => "lgamma",
            ScalarFunction::BesselJ0 => "besselJ0",
            ScalarFunction::BesselJ1 => "besselJ1",
            ScalarFunction::BesselY0 => "besselY0",
            ScalarFunction::BesselY1 => "besselY1",
            ScalarFunction::Sign => "sign",
            ScalarFunction::Pos => "pos",
            ScalarFunction::Neg => "neg",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    fn apply(self, x: f64) -> f64 {
        match self {
            ScalarFunction::Sqrt => x.sqrt(),
            ScalarFunction::Exp => x.exp(),
            ScalarFunction::Log => x.ln(),
            ScalarFunction::Log10 => x.log10(),
            ScalarFunction::Sin => x.sin(),
            ScalarFunction::Cos => x.cos(),
            ScalarFunction::Tan => x.tan(),
            ScalarFunction::Asin => x.asin(),
            ScalarFunction::Acos => x.acos(),
            ScalarFunction::Atan => x.atan(),
            ScalarFunction::Sinh => x.sinh(),
            ScalarFunction::Cosh => x.cosh(),
            ScalarFunction::Tanh => x.tanh(),
            ScalarFunction::Asinh => x.asinh(),
            ScalarFunction::Acosh => x.acosh(),
            ScalarFunction::Atanh => x.atanh(),
            ScalarFunction::Erf => libm::erf(x),
            ScalarFunction::Erfc => libm::erfc(x),
            ScalarFunction::Lgamma => libm::lgamma(x),
            ScalarFunction::BesselJ0 => libm::j0(x),
            ScalarFunction::BesselJ1 => libm::j1(x),
            ScalarFunction::BesselY0 => libm::y0(x),
            ScalarFunction::BesselY1 => libm::y1(x),
            ScalarFunction::Sign => {
                if x >= 0.0 {
                    1.0
                } else {
                    -1.0
                }
            }
            ScalarFunction::Pos => {
                if x >= 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            ScalarFunction::Neg => {
                if x < 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    fn result_dimensions(self, input: Option<Dimensions>) -> Option<Dimensions> {
        match self {
            ScalarFunction::Sqrt => input.map(|d| d.pow(0.5)),
            _ => input.map(|_| Dimensions::DIMENSIONLESS),
        }
    }
}

pub fn apply_scalar(function: ScalarFunction, a: TypedField) -> Result<TypedField, FieldError> {
    let dims = function.result_dimensions(a.dimensions());
    let location = a.location();
    let kind = a.kind();
    let FieldData::Scalar(x) = a.into_data() else {
        return Err(FieldError::Unsupported {
            op: function.name(),
            kind,
        });
    };
    let data = FieldData::Scalar(x.into_iter().map(|v| function.apply(v)).collect());
    Ok(TypedField::from_parts(Kind::Scalar, location, data).with_dimensions(dims))
}

/// `pow(base, exponent)`; the exponent is usually a constant.
pub fn pow(base: TypedField, exponent: TypedField) -> Result<TypedField, FieldError> {
    let (location, n) = domain(&base, &exponent)?;
    let (FieldData::Scalar(x), FieldData::Scalar(e)) = (base.data(), exponent.data()) else {
        return Err(FieldError::Unsupported {
            op: "pow",
            kind: base.kind(),
        });
    };
    let dims = match (base.dimensions(), exponent.is_constant()) {
        (Some(d), true) => Some(d.pow(e[0])),
        (Some(_), false) => Some(Dimensions::DIMENSIONLESS),
        (None, _) => None,
    };
    let data = FieldData::Scalar(zip_map(n, x, e, f64::powf));
    Ok(TypedField::from_parts(Kind::Scalar, location, data).with_dimensions(dims))
}

/// Magnitude of any numeric kind (Frobenius norm for tensors).
pub fn mag(a: TypedField) -> TypedField {
    let dims = a.dimensions();
    let location = a.location();
    let values = match a.into_data() {
        FieldData::Scalar(v) => v.into_iter().map(f64::abs).collect(),
        FieldData::Vector(v) => v.iter().map(|x| x.norm()).collect(),
        FieldData::Tensor(v) => v.iter().map(|x| x.norm()).collect(),
    };
    TypedField::from_parts(Kind::Scalar, location, FieldData::Scalar(values)).with_dimensions(dims)
}

pub fn mag_sqr(a: TypedField) -> TypedField {
    let dims = a.dimensions().map(|d| d.pow(2.0));
    let location = a.location();
    let values = match a.into_data() {
        FieldData::Scalar(v) => v.into_iter().map(|x| x * x).collect(),
        FieldData::Vector(v) => v.iter().map(|x| x.norm_squared()).collect(),
        FieldData::Tensor(v) => v.iter().map(|x| x.norm_squared()).collect(),
    };
    TypedField::from_parts(Kind::Scalar, location, FieldData::Scalar(values)).with_dimensions(dims)
}

/// Square of a scalar, or the outer product `v v` of a vector.
pub fn sqr(a: TypedField) -> Result<TypedField, FieldError> {
    let dims = a.dimensions().map(|d| d.pow(2.0));
    let location = a.location();
    let kind = a.kind();
    let (kind, data) = match a.into_data() {
        FieldData::Scalar(v) => (Kind::Scalar, FieldData::Scalar(v.into_iter().map(|x| x * x).collect())),
        FieldData::Vector(v) => (
            Kind::SymmTensor,
            FieldData::Tensor(v.iter().map(|x| x * x.transpose()).collect()),
        ),
        FieldData::Tensor(_) => return Err(FieldError::Unsupported { op: "sqr", kind }),
    };
    Ok(TypedField::from_parts(kind, location, data).with_dimensions(dims))
}

/// Elementwise (componentwise for vectors and tensors) minimum of two fields.
pub fn min_of(a: TypedField, b: TypedField) -> Result<TypedField, FieldError> {
    extremum_of("min", a, b, false)
}

pub fn max_of(a: TypedField, b: TypedField) -> Result<TypedField, FieldError> {
    extremum_of("max", a, b, true)
}

fn extremum_of(
    op: &'static str,
    a: TypedField,
    b: TypedField,
    upper: bool,
) -> Result<TypedField, FieldError> {
    let (location, n) = domain(&a, &b)?;
    let dims = same_dimensions(op, a.dimensions(), b.dimensions())?;
    let data = match (a.data(), b.data()) {
        (FieldData::Scalar(x), FieldData::Scalar(y)) => FieldData::Scalar(zip_map(n, x, y, |p, q| {
            if upper { p.max(q) } else { p.min(q) }
        })),
        (FieldData::Vector(x), FieldData::Vector(y)) => FieldData::Vector(zip_map(n, x, y, |p, q| {
            if upper { p.sup(&q) } else { p.inf(&q) }
        })),
        (FieldData::Tensor(x), FieldData::Tensor(y)) => FieldData::Tensor(zip_map(n, x, y, |p, q| {
            if upper { p.sup(&q) } else { p.inf(&q) }
        })),
        _ => return Err(FieldError::Unsupported { op, kind: b.kind() }),
    };
    Ok(TypedField::from_parts(a.kind(), location, data).with_dimensions(dims))
}

/// Tensor-algebra functions, defined for the tensor-like kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TensorFunction {
    Transpose,
    Trace,
    Det,
    Cof,
    Inv,
    Dev,
    Dev2,
    Symm,
    TwoSymm,
    Skew,
    Sph,
    Diag,
    EigenValues,
    EigenVectors,
}

impl TensorFunction {
    pub const ALL: [TensorFunction; 14] = [
        TensorFunction::Transpose,
        TensorFunction::Trace,
        TensorFunction::Det,
        TensorFunction::Cof,
        TensorFunction::Inv,
        TensorFunction::Dev,
        TensorFunction::Dev2,
        TensorFunction::Symm,
        TensorFunction::TwoSymm,
        TensorFunction::Skew,
        TensorFunction::Sph,
        TensorFunction::Diag,
        TensorFunction::EigenValues,
        TensorFunction::EigenVectors,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TensorFunction::Transpose => "T",
            TensorFunction::Trace => "tr",
            TensorFunction::Det => "det",
            TensorFunction::Cof => "cof",
            TensorFunction::Inv => "inv",
            TensorFunction::Dev => "dev",
            TensorFunction::Dev2 => "dev2",
            TensorFunction::Symm => "symm",
            TensorFunction::TwoSymm => "twoSymm",
            TensorFunction::Skew => "skew",
            TensorFunction::Sph => "sph",
            TensorFunction::Diag => "diag",
            TensorFunction::EigenValues => "eigenValues",
            TensorFunction::EigenVectors => "eigenVectors",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    /// Result kind for a tensor-like argument kind.
    pub fn result_kind(self, input: Kind) -> Kind {
        match self {
            TensorFunction::Trace | TensorFunction::Det => Kind::Scalar,
            TensorFunction::Diag | TensorFunction::EigenValues => Kind::Vector,
            TensorFunction::Symm | TensorFunction::TwoSymm => match input {
                Kind::SphericalTensor => Kind::SphericalTensor,
                _ => Kind::SymmTensor,
            },
            TensorFunction::Skew | TensorFunction::EigenVectors => Kind::Tensor,
            TensorFunction::Sph => Kind::SphericalTensor,
            TensorFunction::Transpose
            | TensorFunction::Cof
            | TensorFunction::Inv
            | TensorFunction::Dev
            | TensorFunction::Dev2 => input,
        }
    }
}

pub fn apply_tensor(function: TensorFunction, a: TypedField) -> Result<TypedField, FieldError> {
    let input = a.kind();
    let kind = function.result_kind(input);
    let location = a.location();
    let dims = a.dimensions();
    let FieldData::Tensor(values) = a.into_data() else {
        return Err(FieldError::Unsupported {
            op: function.name(),
            kind: input,
        });
    };
    let symmetric = matches!(input, Kind::SymmTensor | Kind::SphericalTensor);
    let third = 1.0 / 3.0;

    let data = match function {
        TensorFunction::Trace => FieldData::Scalar(values.iter().map(|m| m.trace()).collect()),
        TensorFunction::Det => FieldData::Scalar(values.iter().map(|m| m.determinant()).collect()),
        TensorFunction::Diag => FieldData::Vector(values.iter().map(|m| m.diagonal()).collect()),
        TensorFunction::EigenValues => FieldData::Vector(
            values
                .iter()
                .map(|m| eigen_values(m, symmetric))
                .collect(),
        ),
        TensorFunction::EigenVectors => FieldData::Tensor(
            values
                .iter()
                .map(|m| eigen_vectors(m, symmetric))
                .collect(),
        ),
        TensorFunction::Inv => {
            let mut out = Vec::with_capacity(values.len());
            for (index, m) in values.iter().enumerate() {
                let inverse = m
                    .try_inverse()
                    .ok_or(FieldError::Singular { op: "inv", index })?;
                out.push(inverse);
            }
            FieldData::Tensor(out)
        }
        _ => FieldData::Tensor(
            values
                .into_iter()
                .map(|m| match function {
                    TensorFunction::Transpose => m.transpose(),
                    TensorFunction::Cof => cofactor(&m),
                    TensorFunction::Dev => m - Matrix3::identity() * (m.trace() * third),
                    TensorFunction::Dev2 => m - Matrix3::identity() * (2.0 * m.trace() * third),
                    TensorFunction::Symm => (m + m.transpose()) * 0.5,
                    TensorFunction::TwoSymm => m + m.transpose(),
                    TensorFunction::Skew => (m - m.transpose()) * 0.5,
                    _ => Matrix3::identity() * (m.trace() * third),
                })
                .collect(),
        ),
    };

    let dims = match function {
        TensorFunction::Det => dims.map(|d| d.pow(3.0)),
        TensorFunction::Cof => dims.map(|d| d.pow(2.0)),
        TensorFunction::Inv => dims.map(|d| Dimensions::DIMENSIONLESS.divide(&d)),
        TensorFunction::EigenVectors => dims.map(|_| Dimensions::DIMENSIONLESS),
        _ => dims,
    };
    Ok(TypedField::from_parts(kind, location, data).with_dimensions(dims))
}

fn cofactor(m: &Matrix3<f64>) -> Matrix3<f64> {
    let minor = |r0: usize, r1: usize, c0: usize, c1: usize| {
        m[(r0, c0)] * m[(r1, c1)] - m[(r0, c1)] * m[(r1, c0)]
    };
    Matrix3::new(
        minor(1, 2, 1, 2),
        -minor(1, 2, 0, 2),
        minor(1, 2, 0, 1),
        -minor(0, 2, 1, 2),
        minor(0, 2, 0, 2),
        -minor(0, 2, 0, 1),
        minor(0, 1, 1, 2),
        -minor(0, 1, 0, 2),
        minor(0, 1, 0, 1),
    )
}

/// Real eigenvalues in ascending order.
fn eigen_values(m: &Matrix3<f64>, symmetric: bool) -> Vector3<f64> {
    let mut values: Vec<f64> = if symmetric {
        m.symmetric_eigenvalues().iter().copied().collect()
    } else {
        m.complex_eigenvalues().iter().map(|c| c.re).collect()
    };
    values.sort_by(f64::total_cmp);
    Vector3::new(values[0], values[1], values[2])
}

/// Unit eigenvectors as tensor rows, ordered like [`eigen_values`].
fn eigen_vectors(m: &Matrix3<f64>, symmetric: bool) -> Matrix3<f64> {
    if symmetric {
        let eigen = m.symmetric_eigen();
        let mut order = [0usize, 1, 2];
        order.sort_by(|&i, &j| eigen.eigenvalues[i].total_cmp(&eigen.eigenvalues[j]));
        let rows: Vec<_> = order
            .iter()
            .map(|&i| eigen.eigenvectors.column(i).transpose())
            .collect();
        return Matrix3::from_rows(&rows);
    }

    let values = eigen_values(m, false);
    let rows: Vec<_> = (0..3)
        .map(|i| null_vector(&(m - Matrix3::identity() * values[i]), i).transpose())
        .collect();
    Matrix3::from_rows(&rows)
}

/// A unit vector spanning the null space of a rank-deficient matrix.
fn null_vector(a: &Matrix3<f64>, fallback: usize) -> Vector3<f64> {
    let r0 = a.row(0).transpose();
    let r1 = a.row(1).transpose();
    let r2 = a.row(2).transpose();
    let candidates = [r0.cross(&r1), r0.cross(&r2), r1.cross(&r2)];
    let best = candidates
        .iter()
        .copied()
        .max_by(|p, q| p.norm_squared().total_cmp(&q.norm_squared()))
        .unwrap_or_else(Vector3::zeros);
    if best.norm_squared() > f64::EPSILON {
        best.normalize()
    } else {
        let mut axis = Vector3::zeros();
        axis[fallback] = 1.0;
        axis
    }
}

/// Whole-field reductions returning a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reduction {
    Min,
    Max,
    Sum,
    Average,
}

impl Reduction {
    pub fn name(self) -> &'static str {
        match self {
            Reduction::Min => "min",
            Reduction::Max => "max",
            Reduction::Sum => "sum",
            Reduction::Average => "average",
        }
    }
}

/// Reduce a field to a constant; vectors and tensors reduce componentwise.
pub fn reduce(reduction: Reduction, a: TypedField) -> Result<TypedField, FieldError> {
    if a.is_empty() {
        return Err(FieldError::Empty {
            op: reduction.name(),
        });
    }
    let kind = a.kind();
    let dims = a.dimensions();
    let n = a.len() as f64;
    let data = match a.into_data() {
        FieldData::Scalar(v) => FieldData::Scalar(vec![fold(reduction, n, v)]),
        FieldData::Vector(v) => FieldData::Vector(vec![fold(reduction, n, v)]),
        FieldData::Tensor(v) => FieldData::Tensor(vec![fold(reduction, n, v)]),
    };
    Ok(TypedField::from_parts(kind, None, data).with_dimensions(dims))
}

fn fold<T: Reducible>(reduction: Reduction, n: f64, values: Vec<T>) -> T {
    let mut iter = values.into_iter();
    let first = iter.next().unwrap_or_else(T::zero);
    match reduction {
        Reduction::Min => iter.fold(first, |acc, x| acc.lower(&x)),
        Reduction::Max => iter.fold(first, |acc, x| acc.upper(&x)),
        Reduction::Sum => iter.fold(first, |acc, x| acc.plus(&x)),
        Reduction::Average => iter.fold(first, |acc, x| acc.plus(&x)).scaled(1.0 / n),
    }
}

trait Reducible: Copy {
    fn zero() -> Self;
    fn lower(&self, other: &Self) -> Self;
    fn upper(&self, other: &Self) -> Self;
    fn plus(&self, other: &Self) -> Self;
    fn scaled(&self, factor: f64) -> Self;
}

impl Reducible for f64 {
    fn zero() -> Self {
        0.0
    }
    fn lower(&self, other: &Self) -> Self {
        self.min(*other)
    }
    fn upper(&self, other: &Self) -> Self {
        self.max(*other)
    }
    fn plus(&self, other: &Self) -> Self {
        self + other
    }
    fn scaled(&self, factor: f64) -> Self {
        self * factor
    }
}

macro_rules! impl_reducible_matrix {
    ($ty:ty) => {
        impl Reducible for $ty {
            fn zero() -> Self {
                <$ty>::zeros()
            }
            fn lower(&self, other: &Self) -> Self {
                self.inf(other)
            }
            fn upper(&self, other: &Self) -> Self {
                self.sup(other)
            }
            fn plus(&self, other: &Self) -> Self {
                self + other
            }
            fn scaled(&self, factor: f64) -> Self {
                self * factor
            }
        }
    };
}

impl_reducible_matrix!(Vector3<f64>);
impl_reducible_matrix!(Matrix3<f64>);

/// Position of the minimum (or maximum) element of a scalar field.
///
/// `positions` are the coordinates of the field's elements.
pub fn extremum_position(
    a: &TypedField,
    positions: &[Vector3<f64>],
    maximum: bool,
) -> Result<TypedField, FieldError> {
    let op = if maximum { "maxPosition" } else { "minPosition" };
    let Some(values) = a.scalar_values() else {
        return Err(FieldError::Unsupported { op, kind: a.kind() });
    };
    if values.len() != positions.len() {
        return Err(FieldError::SizeMismatch {
            left: values.len(),
            right: positions.len(),
        });
    }
    let best = values
        .iter()
        .enumerate()
        .reduce(|best, candidate| {
            let better = if maximum {
                candidate.1 > best.1
            } else {
                candidate.1 < best.1
            };
            if better { candidate } else { best }
        })
        .map(|(i, _)| i)
        .ok_or(FieldError::Empty { op })?;
    Ok(TypedField::constant_vector(positions[best]))
}

/// Assemble a vector or tensor-like field from scalar component fields.
///
/// Component order is `x y z` for vectors, row-major for tensors, the upper
/// triangle `xx xy xz yy yz zz` for symmetric tensors and `ii` for spherical
/// tensors.
pub fn build(kind: Kind, components: Vec<TypedField>) -> Result<TypedField, FieldError> {
    let expected = kind.components().len();
    if components.len() != expected || expected == 0 {
        return Err(FieldError::Unsupported {
            op: "component constructor",
            kind,
        });
    }

    let mut location: Option<Location> = None;
    let mut n = 1;
    let mut dims = None;
    for (i, c) in components.iter().enumerate() {
        if c.scalar_values().is_none() || c.is_logical() {
            return Err(FieldError::Unsupported {
                op: "component constructor",
                kind: c.kind(),
            });
        }
        if i > 0 {
            let (l, m) = domain(&components[0], c)?;
            location = location.or(l);
            n = n.max(m);
        } else if c.location().is_some() {
            location = c.location();
            n = c.len();
        }
        dims = same_dimensions("component constructor", dims, c.dimensions())?;
    }
    let columns: Vec<&[f64]> = components.iter().filter_map(|c| c.scalar_values()).collect();
    let at = |k: usize, i: usize| pick(columns[k], i);

    let data = match kind {
        Kind::Vector => FieldData::Vector(
            (0..n)
                .map(|i| Vector3::new(at(0, i), at(1, i), at(2, i)))
                .collect(),
        ),
        Kind::Tensor => FieldData::Tensor(
            (0..n)
                .map(|i| Matrix3::from_iterator((0..9).map(|k| at(k, i))).transpose())
                .collect(),
        ),
        Kind::SymmTensor => FieldData::Tensor(
            (0..n)
                .map(|i| {
                    let (xx, xy, xz, yy, yz, zz) =
                        (at(0, i), at(1, i), at(2, i), at(3, i), at(4, i), at(5, i));
                    Matrix3::new(xx, xy, xz, xy, yy, yz, xz, yz, zz)
                })
                .collect(),
        ),
        Kind::SphericalTensor => {
            FieldData::Tensor((0..n).map(|i| Matrix3::identity() * at(0, i)).collect())
        }
        Kind::Logical | Kind::Scalar => {
            return Err(FieldError::Unsupported {
                op: "component constructor",
                kind,
            });
        }
    };
    Ok(TypedField::from_parts(kind, location, data).with_dimensions(dims))
}
