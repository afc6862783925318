//! Built-in function names
//!
//! Maps an identifier followed by `(` to the builtin it denotes and the
//! shape of its argument list. Names not listed here fall through to
//! lookup tables, foreign meshes and plugin functions.

use crate::base::{Kind, Location};
use crate::field::functions::{Reduction, ScalarFunction, TensorFunction};
use crate::mesh::Selection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    /// Elementwise scalar function; `pos()` with no argument is [`Builtin::Position`]
    Scalar(ScalarFunction),
    Mag,
    MagSqr,
    Sqr,
    Pow,
    /// `min`/`max` reduce with one argument and compare elementwise with two
    MinMax { maximum: bool },
    Reduce(Reduction),
    ExtremumPosition { maximum: bool },
    Tensor(TensorFunction),
    Build(Kind),

    Grad,
    Div,
    Curl,
    SnGrad,
    Laplacian,
    Interpolate,
    InterpolateToPoint,
    InterpolateToCell,
    FaceAverage,
    Integrate,
    SurfSum,
    Reconstruct,
    Flux,
    MagSqrGradGrad,
    MeshPhi,

    Ddt,
    D2dt2,
    OldTime,

    Position(Location),
    CellVolume,
    FaceArea,
    FaceAreaVector,
    CellId,
    Cpu,
    Time,
    DeltaT,
    Random { normal: bool, fixed: bool },
    Selection(Selection),
    OnPatch,
    InternalFace,
    DistToPatch,
    /// `surf(c)` and `point(c)`
    Broadcast(Location),
}

/// How a builtin's argument list is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arguments {
    /// Comma separated expressions, between `min` and `max` of them
    Expressions { min: usize, max: usize },
    /// A single bare name
    Name,
    /// An optional integer literal
    Seed,
}

impl Builtin {
    pub fn arguments(self) -> Arguments {
        let exprs = |min, max| Arguments::Expressions { min, max };
        match self {
            // `pos` doubles as the cell-centre constructor
            Builtin::Scalar(ScalarFunction::Pos) => exprs(0, 1),
            Builtin::Scalar(_)
            | Builtin::Mag
            | Builtin::MagSqr
            | Builtin::Sqr
            | Builtin::Reduce(_)
            | Builtin::ExtremumPosition { .. }
            | Builtin::Tensor(_)
            | Builtin::Grad
            | Builtin::Curl
            | Builtin::SnGrad
            | Builtin::Interpolate
            | Builtin::InterpolateToPoint
            | Builtin::InterpolateToCell
            | Builtin::FaceAverage
            | Builtin::Integrate
            | Builtin::SurfSum
            | Builtin::Reconstruct
            | Builtin::MagSqrGradGrad
            | Builtin::MeshPhi
            | Builtin::Broadcast(_) => exprs(1, 1),
            Builtin::Pow | Builtin::Flux => exprs(2, 2),
            Builtin::MinMax { .. } | Builtin::Div | Builtin::Laplacian => exprs(1, 2),
            Builtin::Build(kind) => {
                let n = kind.components().len();
                exprs(n, n)
            }
            Builtin::Ddt
            | Builtin::D2dt2
            | Builtin::OldTime
            | Builtin::Selection(_)
            | Builtin::OnPatch
            | Builtin::DistToPatch => Arguments::Name,
            Builtin::Random { fixed: false, .. } => Arguments::Seed,
            Builtin::Position(_)
            | Builtin::CellVolume
            | Builtin::FaceArea
            | Builtin::FaceAreaVector
            | Builtin::CellId
            | Builtin::Cpu
            | Builtin::Time
            | Builtin::DeltaT
            | Builtin::Random { fixed: true, .. }
            | Builtin::InternalFace => exprs(0, 0),
        }
    }
}

/// The builtin called `name`, if any.
pub fn lookup(name: &str) -> Option<Builtin> {
    if let Some(function) = ScalarFunction::from_name(name) {
        return Some(Builtin::Scalar(function));
    }
    if let Some(function) = TensorFunction::from_name(name) {
        return Some(Builtin::Tensor(function));
    }
    let builtin = match name {
        "mag" => Builtin::Mag,
        "magSqr" => Builtin::MagSqr,
        "sqr" => Builtin::Sqr,
        "pow" => Builtin::Pow,
        "min" => Builtin::MinMax { maximum: false },
        "max" => Builtin::MinMax { maximum: true },
        "sum" => Builtin::Reduce(Reduction::Sum),
        "average" => Builtin::Reduce(Reduction::Average),
        "minPosition" => Builtin::ExtremumPosition { maximum: false },
        "maxPosition" => Builtin::ExtremumPosition { maximum: true },
        "vector" => Builtin::Build(Kind::Vector),
        "tensor" => Builtin::Build(Kind::Tensor),
        "symmTensor" => Builtin::Build(Kind::SymmTensor),
        "sphericalTensor" => Builtin::Build(Kind::SphericalTensor),

        "grad" => Builtin::Grad,
        "div" => Builtin::Div,
        "curl" => Builtin::Curl,
        "snGrad" => Builtin::SnGrad,
        "laplacian" => Builtin::Laplacian,
        "interpolate" => Builtin::Interpolate,
        "interpolateToPoint" => Builtin::InterpolateToPoint,
        "interpolateToCell" => Builtin::InterpolateToCell,
        "faceAverage" => Builtin::FaceAverage,
        "integrate" => Builtin::Integrate,
        "surfSum" => Builtin::SurfSum,
        "reconstruct" => Builtin::Reconstruct,
        "flux" => Builtin::Flux,
        "magSqrGradGrad" => Builtin::MagSqrGradGrad,
        "meshPhi" => Builtin::MeshPhi,

        "ddt" => Builtin::Ddt,
        "d2dt2" => Builtin::D2dt2,
        "oldTime" => Builtin::OldTime,

        "fpos" => Builtin::Position(Location::Surface),
        "pts" => Builtin::Position(Location::Point),
        "vol" => Builtin::CellVolume,
        "area" => Builtin::FaceArea,
        "face" => Builtin::FaceAreaVector,
        "id" => Builtin::CellId,
        "cpu" => Builtin::Cpu,
        "time" => Builtin::Time,
        "deltaT" => Builtin::DeltaT,
        "rand" => Builtin::Random { normal: false, fixed: false },
        "randNormal" => Builtin::Random { normal: true, fixed: false },
        "randFixed" => Builtin::Random { normal: false, fixed: true },
        "randNormalFixed" => Builtin::Random { normal: true, fixed: true },
        "set" => Builtin::Selection(Selection::CellSet),
        "zone" => Builtin::Selection(Selection::CellZone),
        "fset" => Builtin::Selection(Selection::FaceSet),
        "fzone" => Builtin::Selection(Selection::FaceZone),
        "pset" => Builtin::Selection(Selection::PointSet),
        "pzone" => Builtin::Selection(Selection::PointZone),
        "onPatch" => Builtin::OnPatch,
        "internalFace" => Builtin::InternalFace,
        "distToPatch" => Builtin::DistToPatch,
        "surf" => Builtin::Broadcast(Location::Surface),
        "point" => Builtin::Broadcast(Location::Point),
        _ => return None,
    };
    Some(builtin)
}
