//! Finite-volume calculus.
//!
//! Explicit Gauss-linear operators over located fields. Boundary faces take
//! the owner cell's value, so boundary fluxes of a gradient are zero.
//! Differential results carry no dimension tag; interpolations keep theirs.

use nalgebra::{Matrix3, Vector3};

use super::Mesh;
use crate::base::{Kind, Location};
use crate::field::{FieldData, FieldError, TypedField};

fn expect_len(mesh: &Mesh, field: &TypedField, location: Location) -> Result<(), FieldError> {
    let expected = mesh.size(location);
    if field.len() != expected {
        return Err(FieldError::SizeMismatch {
            left: field.len(),
            right: expected,
        });
    }
    Ok(())
}

fn unsupported(op: &'static str, field: &TypedField) -> FieldError {
    FieldError::Unsupported {
        op,
        kind: field.kind(),
    }
}

/// Operations shared by the three storage element types.
trait Element:
    Copy
    + std::ops::Add<Output = Self>
    + std::ops::Sub<Output = Self>
    + std::ops::Mul<f64, Output = Self>
    + std::ops::AddAssign
{
    fn zero() -> Self;
}

impl Element for f64 {
    fn zero() -> Self {
        0.0
    }
}

impl Element for Vector3<f64> {
    fn zero() -> Self {
        Vector3::zeros()
    }
}

impl Element for Matrix3<f64> {
    fn zero() -> Self {
        Matrix3::zeros()
    }
}

/// Linear face values of a cell field; boundary faces copy the owner.
fn face_values<T: Element>(mesh: &Mesh, cells: &[T]) -> Vec<T> {
    let weights = mesh.weights();
    (0..mesh.n_faces())
        .map(|face| {
            let own = cells[mesh.owner()[face]];
            match mesh.neighbour_of(face) {
                Some(nei) => {
                    let w = weights[face];
                    own * w + cells[nei] * (1.0 - w)
                }
                None => own,
            }
        })
        .collect()
}

/// Sum face contributions into cells, owner `+`, neighbour `sign`.
fn accumulate<T: Element>(mesh: &Mesh, contributions: impl Fn(usize) -> T, sign: f64) -> Vec<T> {
    let mut out = vec![T::zero(); mesh.n_cells()];
    for face in 0..mesh.n_faces() {
        let c = contributions(face);
        out[mesh.owner()[face]] += c;
        if let Some(nei) = mesh.neighbour_of(face) {
            out[nei] += c * sign;
        }
    }
    out
}

fn per_volume<T: Element>(mesh: &Mesh, values: Vec<T>) -> Vec<T> {
    values
        .into_iter()
        .zip(mesh.cell_volumes())
        .map(|(v, vol)| v * (1.0 / vol))
        .collect()
}

fn volume_field(kind: Kind, data: FieldData) -> TypedField {
    TypedField::from_parts(kind, Some(Location::Volume), data)
}

fn surface_field(kind: Kind, data: FieldData) -> TypedField {
    TypedField::from_parts(kind, Some(Location::Surface), data)
}

/// Volume to surface, linear.
pub fn interpolate(mesh: &Mesh, field: &TypedField) -> Result<TypedField, FieldError> {
    expect_len(mesh, field, Location::Volume)?;
    let data = match field.data() {
        FieldData::Scalar(v) => FieldData::Scalar(face_values(mesh, v)),
        FieldData::Vector(v) => FieldData::Vector(face_values(mesh, v)),
        FieldData::Tensor(v) => FieldData::Tensor(face_values(mesh, v)),
    };
    Ok(surface_field(field.kind(), data).with_dimensions(field.dimensions()))
}

/// Volume to point, inverse-distance weighted over the cells around each point.
pub fn interpolate_to_point(mesh: &Mesh, field: &TypedField) -> Result<TypedField, FieldError> {
    expect_len(mesh, field, Location::Volume)?;
    fn weighted<T: Element>(mesh: &Mesh, cells: &[T]) -> Vec<T> {
        mesh.point_cells()
            .iter()
            .zip(mesh.points())
            .map(|(around, p)| {
                let mut sum = T::zero();
                let mut total = 0.0;
                for &c in around {
                    let w = 1.0 / (mesh.cell_centres()[c] - p).norm().max(f64::EPSILON);
                    sum += cells[c] * w;
                    total += w;
                }
                if total > 0.0 { sum * (1.0 / total) } else { sum }
            })
            .collect()
    }
    let data = match field.data() {
        FieldData::Scalar(v) => FieldData::Scalar(weighted(mesh, v)),
        FieldData::Vector(v) => FieldData::Vector(weighted(mesh, v)),
        FieldData::Tensor(v) => FieldData::Tensor(weighted(mesh, v)),
    };
    Ok(TypedField::from_parts(field.kind(), Some(Location::Point), data)
        .with_dimensions(field.dimensions()))
}

/// Point to volume: average of each cell's points.
pub fn interpolate_to_cell(mesh: &Mesh, field: &TypedField) -> Result<TypedField, FieldError> {
    expect_len(mesh, field, Location::Point)?;
    fn average<T: Element>(mesh: &Mesh, points: &[T]) -> Vec<T> {
        mesh.cell_points()
            .iter()
            .map(|around| {
                let mut sum = T::zero();
                for &p in around {
                    sum += points[p];
                }
                sum * (1.0 / around.len().max(1) as f64)
            })
            .collect()
    }
    let data = match field.data() {
        FieldData::Scalar(v) => FieldData::Scalar(average(mesh, v)),
        FieldData::Vector(v) => FieldData::Vector(average(mesh, v)),
        FieldData::Tensor(v) => FieldData::Tensor(average(mesh, v)),
    };
    Ok(volume_field(field.kind(), data).with_dimensions(field.dimensions()))
}

/// Gradient of a volume scalar (to vector) or vector (to tensor).
pub fn grad(mesh: &Mesh, field: &TypedField) -> Result<TypedField, FieldError> {
    expect_len(mesh, field, Location::Volume)?;
    let areas = mesh.face_areas();
    match field.data() {
        FieldData::Scalar(v) => {
            let faces = face_values(mesh, v);
            let sum = accumulate(mesh, |f| areas[f] * faces[f], -1.0);
            Ok(volume_field(Kind::Vector, FieldData::Vector(per_volume(mesh, sum))))
        }
        FieldData::Vector(v) => {
            let faces = face_values(mesh, v);
            let sum = accumulate(mesh, |f| areas[f] * faces[f].transpose(), -1.0);
            Ok(volume_field(Kind::Tensor, FieldData::Tensor(per_volume(mesh, sum))))
        }
        FieldData::Tensor(_) => Err(unsupported("grad", field)),
    }
}

/// Divergence of a volume vector (to scalar) or tensor (to vector), or the
/// integrated net flux of a surface scalar or vector.
pub fn div(mesh: &Mesh, field: &TypedField) -> Result<TypedField, FieldError> {
    if field.location() == Some(Location::Surface) {
        return surface_integrate(mesh, field).map(|f| f.with_dimensions(None));
    }
    expect_len(mesh, field, Location::Volume)?;
    let areas = mesh.face_areas();
    match field.data() {
        FieldData::Vector(v) => {
            let faces = face_values(mesh, v);
            let sum = accumulate(mesh, |f| areas[f].dot(&faces[f]), -1.0);
            Ok(volume_field(Kind::Scalar, FieldData::Scalar(per_volume(mesh, sum))))
        }
        FieldData::Tensor(v) => {
            let faces = face_values(mesh, v);
            let sum = accumulate(mesh, |f| faces[f].transpose() * areas[f], -1.0);
            Ok(volume_field(Kind::Vector, FieldData::Vector(per_volume(mesh, sum))))
        }
        FieldData::Scalar(_) => Err(unsupported("div", field)),
    }
}

/// Convective divergence `div(phi, X)` of a volume field `X` by the face flux `phi`.
pub fn div_flux(mesh: &Mesh, phi: &TypedField, field: &TypedField) -> Result<TypedField, FieldError> {
    let flux = flux(mesh, phi, field)?;
    surface_integrate(mesh, &flux).map(|f| f.with_dimensions(None))
}

pub fn curl(mesh: &Mesh, field: &TypedField) -> Result<TypedField, FieldError> {
    expect_len(mesh, field, Location::Volume)?;
    let FieldData::Vector(v) = field.data() else {
        return Err(unsupported("curl", field));
    };
    let areas = mesh.face_areas();
    let faces = face_values(mesh, v);
    let sum = accumulate(mesh, |f| areas[f].cross(&faces[f]), -1.0);
    Ok(volume_field(Kind::Vector, FieldData::Vector(per_volume(mesh, sum))))
}

/// Face-normal gradient; zero on boundary faces.
pub fn sn_grad(mesh: &Mesh, field: &TypedField) -> Result<TypedField, FieldError> {
    expect_len(mesh, field, Location::Volume)?;
    fn normal_gradient<T: Element>(mesh: &Mesh, cells: &[T]) -> Vec<T> {
        (0..mesh.n_faces())
            .map(|face| match mesh.neighbour_of(face) {
                Some(nei) => {
                    let own = mesh.owner()[face];
                    let n = mesh.face_areas()[face].normalize();
                    let d = mesh.cell_centres()[nei] - mesh.cell_centres()[own];
                    (cells[nei] - cells[own]) * (1.0 / n.dot(&d))
                }
                None => T::zero(),
            })
            .collect()
    }
    let data = match field.data() {
        FieldData::Scalar(v) => FieldData::Scalar(normal_gradient(mesh, v)),
        FieldData::Vector(v) => FieldData::Vector(normal_gradient(mesh, v)),
        FieldData::Tensor(v) => FieldData::Tensor(normal_gradient(mesh, v)),
    };
    Ok(surface_field(field.kind(), data))
}

/// Laplacian with an optional diffusivity.
///
/// The diffusivity may be a volume scalar (interpolated to faces), a surface
/// scalar, or a volume tensor/symmetric tensor (projected on the face normal).
pub fn laplacian(
    mesh: &Mesh,
    diffusivity: Option<&TypedField>,
    field: &TypedField,
) -> Result<TypedField, FieldError> {
    let gamma: Vec<f64> = match diffusivity {
        None => vec![1.0; mesh.n_faces()],
        Some(d) if d.location() == Some(Location::Surface) => {
            expect_len(mesh, d, Location::Surface)?;
            d.scalar_values()
                .ok_or_else(|| unsupported("laplacian", d))?
                .to_vec()
        }
        Some(d) => {
            expect_len(mesh, d, Location::Volume)?;
            match d.data() {
                FieldData::Scalar(v) => face_values(mesh, v),
                FieldData::Tensor(t) => face_values(mesh, t)
                    .iter()
                    .zip(mesh.face_areas())
                    .map(|(g, s)| {
                        let n = s.normalize();
                        n.dot(&(g * n))
                    })
                    .collect(),
                FieldData::Vector(_) => return Err(unsupported("laplacian", d)),
            }
        }
    };
    let sn = sn_grad(mesh, field)?;
    let mag_sf: Vec<f64> = mesh.face_areas().iter().map(|s| s.norm()).collect();
    let data = match sn.data() {
        FieldData::Scalar(g) => FieldData::Scalar(per_volume(
            mesh,
            accumulate(mesh, |f| g[f] * (gamma[f] * mag_sf[f]), -1.0),
        )),
        FieldData::Vector(g) => FieldData::Vector(per_volume(
            mesh,
            accumulate(mesh, |f| g[f] * (gamma[f] * mag_sf[f]), -1.0),
        )),
        FieldData::Tensor(g) => FieldData::Tensor(per_volume(
            mesh,
            accumulate(mesh, |f| g[f] * (gamma[f] * mag_sf[f]), -1.0),
        )),
    };
    Ok(volume_field(field.kind(), data))
}

/// Face flux `phi * X_f` of a volume field.
pub fn flux(mesh: &Mesh, phi: &TypedField, field: &TypedField) -> Result<TypedField, FieldError> {
    expect_len(mesh, phi, Location::Surface)?;
    let phi_values = phi.scalar_values().ok_or_else(|| unsupported("flux", phi))?;
    let faces = interpolate(mesh, field)?;
    let scaled = crate::field::algebra::mul(
        TypedField::scalar(Location::Surface, phi_values.to_vec()),
        faces,
    )?;
    Ok(scaled.with_dimensions(None))
}

/// Area-weighted average of the faces around each cell.
pub fn face_average(mesh: &Mesh, field: &TypedField) -> Result<TypedField, FieldError> {
    expect_len(mesh, field, Location::Surface)?;
    let mag_sf: Vec<f64> = mesh.face_areas().iter().map(|s| s.norm()).collect();
    let total = accumulate(mesh, |f| mag_sf[f], 1.0);
    fn averaged<T: Element>(mesh: &Mesh, faces: &[T], mag_sf: &[f64], total: &[f64]) -> Vec<T> {
        accumulate(mesh, |f| faces[f] * mag_sf[f], 1.0)
            .into_iter()
            .zip(total)
            .map(|(s, t)| s * (1.0 / t))
            .collect()
    }
    let data = match field.data() {
        FieldData::Scalar(v) => FieldData::Scalar(averaged(mesh, v, &mag_sf, &total)),
        FieldData::Vector(v) => FieldData::Vector(averaged(mesh, v, &mag_sf, &total)),
        FieldData::Tensor(v) => FieldData::Tensor(averaged(mesh, v, &mag_sf, &total)),
    };
    Ok(volume_field(field.kind(), data).with_dimensions(field.dimensions()))
}

/// Net outflow of a surface field per unit cell volume.
pub fn surface_integrate(mesh: &Mesh, field: &TypedField) -> Result<TypedField, FieldError> {
    expect_len(mesh, field, Location::Surface)?;
    let data = match field.data() {
        FieldData::Scalar(v) => FieldData::Scalar(per_volume(mesh, accumulate(mesh, |f| v[f], -1.0))),
        FieldData::Vector(v) => FieldData::Vector(per_volume(mesh, accumulate(mesh, |f| v[f], -1.0))),
        FieldData::Tensor(v) => FieldData::Tensor(per_volume(mesh, accumulate(mesh, |f| v[f], -1.0))),
    };
    Ok(volume_field(field.kind(), data).with_dimensions(field.dimensions()))
}

/// Plain sum of the faces around each cell.
pub fn surface_sum(mesh: &Mesh, field: &TypedField) -> Result<TypedField, FieldError> {
    expect_len(mesh, field, Location::Surface)?;
    let data = match field.data() {
        FieldData::Scalar(v) => FieldData::Scalar(accumulate(mesh, |f| v[f], 1.0)),
        FieldData::Vector(v) => FieldData::Vector(accumulate(mesh, |f| v[f], 1.0)),
        FieldData::Tensor(v) => FieldData::Tensor(accumulate(mesh, |f| v[f], 1.0)),
    };
    Ok(volume_field(field.kind(), data).with_dimensions(field.dimensions()))
}

/// Cell vectors whose face-normal components best match a face flux.
pub fn reconstruct(mesh: &Mesh, flux: &TypedField) -> Result<TypedField, FieldError> {
    expect_len(mesh, flux, Location::Surface)?;
    let phi = flux.scalar_values().ok_or_else(|| unsupported("reconstruct", flux))?;
    let areas = mesh.face_areas();
    let normals: Vec<Vector3<f64>> = areas.iter().map(|s| s / s.norm()).collect();
    let tensors = accumulate(mesh, |f| areas[f] * normals[f].transpose(), 1.0);
    let vectors = accumulate(mesh, |f| normals[f] * phi[f], 1.0);
    let mut out = Vec::with_capacity(mesh.n_cells());
    for (index, (t, v)) in tensors.iter().zip(&vectors).enumerate() {
        let inverse = t
            .try_inverse()
            .ok_or(FieldError::Singular { op: "reconstruct", index })?;
        out.push(inverse * v);
    }
    Ok(volume_field(Kind::Vector, FieldData::Vector(out)))
}

/// `magSqr(grad(grad(p)))` of a volume scalar.
pub fn mag_sqr_grad_grad(mesh: &Mesh, field: &TypedField) -> Result<TypedField, FieldError> {
    let first = grad(mesh, field)?;
    let FieldData::Vector(g) = first.data() else {
        return Err(unsupported("magSqrGradGrad", field));
    };
    let areas = mesh.face_areas();
    let faces = face_values(mesh, g);
    let second = per_volume(mesh, accumulate(mesh, |f| areas[f] * faces[f].transpose(), -1.0));
    let values = second.iter().map(|t| t.norm_squared()).collect();
    Ok(volume_field(Kind::Scalar, FieldData::Scalar(values)))
}

/// Distance from each cell centre to the nearest face centre of the given faces.
pub fn distance_to_faces(mesh: &Mesh, faces: std::ops::Range<usize>) -> TypedField {
    let targets = &mesh.face_centres()[faces];
    let values = mesh
        .cell_centres()
        .iter()
        .map(|c| {
            targets
                .iter()
                .map(|t| (t - c).norm())
                .fold(f64::INFINITY, f64::min)
        })
        .collect();
    volume_field(Kind::Scalar, FieldData::Scalar(values))
}
