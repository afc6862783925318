//! Mapping volume fields between meshes.

use nalgebra::Vector3;

use crate::base::Location;
use crate::field::{FieldData, FieldError, TypedField};
use crate::mesh::{Mesh, fvc};

/// How values are carried from a source mesh to target cell centres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InterpolationOrder {
    /// Value of the nearest source cell
    Nearest,
    /// Nearest source cell value corrected by its gradient
    #[default]
    Linear,
}

fn nearest_cells(source: &Mesh, targets: &[Vector3<f64>]) -> Vec<usize> {
    let centres = source.cell_centres();
    targets
        .iter()
        .map(|t| {
            centres
                .iter()
                .enumerate()
                .map(|(i, c)| (i, (c - t).norm_squared()))
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map_or(0, |(i, _)| i)
        })
        .collect()
}

/// Map a volume field of `source` onto the cells of `target`.
///
/// Tensor-like fields are always mapped by nearest cell.
pub fn map_cells(
    source: &Mesh,
    field: &TypedField,
    target: &Mesh,
    order: InterpolationOrder,
) -> Result<TypedField, FieldError> {
    if field.len() != source.n_cells() {
        return Err(FieldError::SizeMismatch {
            left: field.len(),
            right: source.n_cells(),
        });
    }
    let targets = target.cell_centres();
    let donors = nearest_cells(source, targets);
    let offset = |k: usize| targets[k] - source.cell_centres()[donors[k]];

    let linear = order == InterpolationOrder::Linear && source.n_cells() > 0;
    let data = match field.data() {
        FieldData::Scalar(v) if linear => {
            let g = fvc::grad(source, field)?;
            let g = g.vector_values().unwrap_or_default();
            FieldData::Scalar(
                (0..targets.len())
                    .map(|k| v[donors[k]] + g[donors[k]].dot(&offset(k)))
                    .collect(),
            )
        }
        FieldData::Vector(v) if linear => {
            let g = fvc::grad(source, field)?;
            let g = g.tensor_values().unwrap_or_default();
            FieldData::Vector(
                (0..targets.len())
                    .map(|k| v[donors[k]] + g[donors[k]].transpose() * offset(k))
                    .collect(),
            )
        }
        data => data.gather(&donors),
    };
    Ok(TypedField::from_parts(field.kind(), Some(Location::Volume), data)
        .with_dimensions(field.dimensions()))
}
