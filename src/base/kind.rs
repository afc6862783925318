//! Kind and location tags.
//!
//! A field value is classified along two independent axes: what it holds
//! ([`Kind`]) and which mesh entities it is indexed over ([`Location`]).
//! Operator legality is decided on these tags alone.

use std::fmt;

/// The algebraic type of a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Kind {
    Logical,
    Scalar,
    Vector,
    Tensor,
    SymmTensor,
    SphericalTensor,
}

impl Kind {
    /// All kinds, in declaration order.
    pub const ALL: [Kind; 6] = [
        Kind::Logical,
        Kind::Scalar,
        Kind::Vector,
        Kind::Tensor,
        Kind::SymmTensor,
        Kind::SphericalTensor,
    ];

    /// Kinds that take part in arithmetic (everything except logical).
    pub const NUMERIC: [Kind; 5] = [
        Kind::Scalar,
        Kind::Vector,
        Kind::Tensor,
        Kind::SymmTensor,
        Kind::SphericalTensor,
    ];

    /// True for tensor, symmetric tensor and spherical tensor.
    pub fn is_tensor_like(self) -> bool {
        matches!(self, Kind::Tensor | Kind::SymmTensor | Kind::SphericalTensor)
    }

    /// True for every kind except logical.
    pub fn is_numeric(self) -> bool {
        !matches!(self, Kind::Logical)
    }

    /// Component suffixes accepted after `.` for this kind.
    pub fn components(self) -> &'static [&'static str] {
        match self {
            Kind::Logical | Kind::Scalar => &[],
            Kind::Vector => &["x", "y", "z"],
            Kind::Tensor => &["xx", "xy", "xz", "yx", "yy", "yz", "zx", "zy", "zz"],
            Kind::SymmTensor => &["xx", "xy", "xz", "yy", "yz", "zz"],
            Kind::SphericalTensor => &["ii"],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Logical => "logical",
            Kind::Scalar => "scalar",
            Kind::Vector => "vector",
            Kind::Tensor => "tensor",
            Kind::SymmTensor => "symmTensor",
            Kind::SphericalTensor => "sphericalTensor",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The mesh domain a field's elements are indexed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Location {
    /// One element per cell
    #[default]
    Volume,
    /// One element per face (internal and boundary)
    Surface,
    /// One element per mesh point
    Point,
}

impl Location {
    pub const ALL: [Location; 3] = [Location::Volume, Location::Surface, Location::Point];

    pub fn as_str(self) -> &'static str {
        match self {
            Location::Volume => "volume",
            Location::Surface => "surface",
            Location::Point => "point",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A (kind, location) pair: the full static type of a located field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValueType {
    pub kind: Kind,
    pub location: Location,
}

impl ValueType {
    pub const fn new(kind: Kind, location: Location) -> Self {
        Self { kind, location }
    }

    pub const fn volume(kind: Kind) -> Self {
        Self::new(kind, Location::Volume)
    }

    pub const fn surface(kind: Kind) -> Self {
        Self::new(kind, Location::Surface)
    }

    pub const fn point(kind: Kind) -> Self {
        Self::new(kind, Location::Point)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.location, self.kind)
    }
}
