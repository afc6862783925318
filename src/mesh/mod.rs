//! Mesh geometry.
//!
//! A polyhedral mesh in the usual owner/neighbour face-addressing form:
//! internal faces come first, boundary faces follow and are grouped into
//! contiguous named patches. Face area vectors point from the owner cell
//! into the neighbour (out of the domain on boundary faces).
//!
//! All derived geometry is computed once in [`Mesh::new`].

mod block;
pub mod fvc;

pub use block::BlockSpec;

use indexmap::IndexMap;
use nalgebra::Vector3;
use smol_str::SmolStr;
use thiserror::Error;

use crate::base::Location;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeshError {
    #[error("face {face} has fewer than three points")]
    DegenerateFace { face: usize },

    #[error("face {face} refers to point {point}, but the mesh has {count} points")]
    PointOutOfRange { face: usize, point: usize, count: usize },

    #[error("expected one owner per face ({faces}), found {owners}")]
    OwnerCount { faces: usize, owners: usize },

    #[error("more neighbours ({neighbours}) than faces ({faces})")]
    NeighbourCount { faces: usize, neighbours: usize },

    #[error("patches must cover boundary faces {start}..{end} contiguously")]
    PatchCoverage { start: usize, end: usize },

    #[error("unknown patch '{0}'")]
    UnknownPatch(SmolStr),

    #[error("unknown {kind} '{name}'")]
    UnknownSelection { kind: &'static str, name: SmolStr },

    #[error("{kind} '{name}' refers to index {index}, outside 0..{count}")]
    SelectionOutOfRange {
        kind: &'static str,
        name: SmolStr,
        index: usize,
        count: usize,
    },

    #[error("block needs at least one cell in each direction and positive extent")]
    EmptyBlock,
}

/// A named, contiguous range of boundary faces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    pub name: SmolStr,
    pub start: usize,
    pub size: usize,
}

impl Patch {
    pub fn new(name: impl Into<SmolStr>, start: usize, size: usize) -> Self {
        Self {
            name: name.into(),
            start,
            size,
        }
    }

    pub fn faces(&self) -> std::ops::Range<usize> {
        self.start..self.start + self.size
    }
}

/// Named index lists attached to a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selection {
    CellSet,
    CellZone,
    FaceSet,
    FaceZone,
    PointSet,
    PointZone,
}

impl Selection {
    pub fn location(self) -> Location {
        match self {
            Selection::CellSet | Selection::CellZone => Location::Volume,
            Selection::FaceSet | Selection::FaceZone => Location::Surface,
            Selection::PointSet | Selection::PointZone => Location::Point,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Selection::CellSet => "cellSet",
            Selection::CellZone => "cellZone",
            Selection::FaceSet => "faceSet",
            Selection::FaceZone => "faceZone",
            Selection::PointSet => "pointSet",
            Selection::PointZone => "pointZone",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Mesh {
    points: Vec<Vector3<f64>>,
    faces: Vec<Vec<usize>>,
    owner: Vec<usize>,
    neighbour: Vec<usize>,
    patches: Vec<Patch>,
    selections: IndexMap<(Selection, SmolStr), Vec<usize>>,

    n_cells: usize,
    face_centres: Vec<Vector3<f64>>,
    face_areas: Vec<Vector3<f64>>,
    cell_centres: Vec<Vector3<f64>>,
    cell_volumes: Vec<f64>,
    cell_points: Vec<Vec<usize>>,
    point_cells: Vec<Vec<usize>>,
}

impl Mesh {
    /// Build a mesh from face addressing.
    ///
    /// `neighbour` holds one entry per internal face; faces beyond
    /// `neighbour.len()` are boundary faces and must be covered by
    /// `patches` in order.
    pub fn new(
        points: Vec<Vector3<f64>>,
        faces: Vec<Vec<usize>>,
        owner: Vec<usize>,
        neighbour: Vec<usize>,
        patches: Vec<Patch>,
    ) -> Result<Self, MeshError> {
        if owner.len() != faces.len() {
            return Err(MeshError::OwnerCount {
                faces: faces.len(),
                owners: owner.len(),
            });
        }
        if neighbour.len() > faces.len() {
            return Err(MeshError::NeighbourCount {
                faces: faces.len(),
                neighbours: neighbour.len(),
            });
        }
        for (face, f) in faces.iter().enumerate() {
            if f.len() < 3 {
                return Err(MeshError::DegenerateFace { face });
            }
            if let Some(&point) = f.iter().find(|&&p| p >= points.len()) {
                return Err(MeshError::PointOutOfRange {
                    face,
                    point,
                    count: points.len(),
                });
            }
        }
        let mut next = neighbour.len();
        for patch in &patches {
            if patch.start != next {
                return Err(MeshError::PatchCoverage {
                    start: neighbour.len(),
                    end: faces.len(),
                });
            }
            next += patch.size;
        }
        if next != faces.len() {
            return Err(MeshError::PatchCoverage {
                start: neighbour.len(),
                end: faces.len(),
            });
        }

        let n_cells = owner
            .iter()
            .chain(neighbour.iter())
            .map(|c| c + 1)
            .max()
            .unwrap_or(0);

        let mut mesh = Self {
            points,
            faces,
            owner,
            neighbour,
            patches,
            selections: IndexMap::new(),
            n_cells,
            face_centres: Vec::new(),
            face_areas: Vec::new(),
            cell_centres: Vec::new(),
            cell_volumes: Vec::new(),
            cell_points: Vec::new(),
            point_cells: Vec::new(),
        };
        mesh.calc_face_geometry();
        mesh.calc_cell_geometry();
        mesh.calc_point_addressing();
        Ok(mesh)
    }

    fn calc_face_geometry(&mut self) {
        let (centres, areas): (Vec<_>, Vec<_>) = self
            .faces
            .iter()
            .map(|f| {
                let estimate = f.iter().map(|&p| self.points[p]).sum::<Vector3<f64>>() / f.len() as f64;
                let mut area = Vector3::zeros();
                let mut weighted = Vector3::zeros();
                let mut total = 0.0;
                for (k, &p) in f.iter().enumerate() {
                    let a = self.points[p];
                    let b = self.points[f[(k + 1) % f.len()]];
                    let tri = (a - estimate).cross(&(b - estimate)) * 0.5;
                    let mag = tri.norm();
                    area += tri;
                    weighted += (a + b + estimate) / 3.0 * mag;
                    total += mag;
                }
                let centre = if total > f64::MIN_POSITIVE {
                    weighted / total
                } else {
                    estimate
                };
                (centre, area)
            })
            .unzip();
        self.face_centres = centres;
        self.face_areas = areas;
    }

    fn calc_cell_geometry(&mut self) {
        let mut estimate = vec![Vector3::zeros(); self.n_cells];
        let mut count = vec![0usize; self.n_cells];
        for face in 0..self.faces.len() {
            for cell in self.face_cells(face) {
                estimate[cell] += self.face_centres[face];
                count[cell] += 1;
            }
        }
        for (e, n) in estimate.iter_mut().zip(&count) {
            if *n > 0 {
                *e /= *n as f64;
            }
        }

        let mut volumes = vec![0.0; self.n_cells];
        let mut moments = vec![Vector3::zeros(); self.n_cells];
        for face in 0..self.faces.len() {
            let cf = self.face_centres[face];
            let sf = self.face_areas[face];
            let own = self.owner[face];
            let pyramid = sf.dot(&(cf - estimate[own])) / 3.0;
            volumes[own] += pyramid;
            moments[own] += (cf * 0.75 + estimate[own] * 0.25) * pyramid;
            if let Some(nei) = self.neighbour_of(face) {
                let pyramid = -sf.dot(&(cf - estimate[nei])) / 3.0;
                volumes[nei] += pyramid;
                moments[nei] += (cf * 0.75 + estimate[nei] * 0.25) * pyramid;
            }
        }
        self.cell_centres = moments
            .iter()
            .zip(&volumes)
            .zip(&estimate)
            .map(|((m, v), e)| if v.abs() > f64::MIN_POSITIVE { m / *v } else { *e })
            .collect();
        self.cell_volumes = volumes;
    }

    fn calc_point_addressing(&mut self) {
        let mut cell_points = vec![Vec::new(); self.n_cells];
        for face in 0..self.faces.len() {
            for cell in self.face_cells(face) {
                cell_points[cell].extend_from_slice(&self.faces[face]);
            }
        }
        let mut point_cells = vec![Vec::new(); self.points.len()];
        for (cell, points) in cell_points.iter_mut().enumerate() {
            points.sort_unstable();
            points.dedup();
            for &p in points.iter() {
                point_cells[p].push(cell);
            }
        }
        self.cell_points = cell_points;
        self.point_cells = point_cells;
    }

    /// Attach a named cell/face/point selection.
    pub fn add_selection(
        &mut self,
        kind: Selection,
        name: impl Into<SmolStr>,
        indices: Vec<usize>,
    ) -> Result<(), MeshError> {
        let name = name.into();
        let count = self.size(kind.location());
        if let Some(&index) = indices.iter().find(|&&i| i >= count) {
            return Err(MeshError::SelectionOutOfRange {
                kind: kind.as_str(),
                name,
                index,
                count,
            });
        }
        self.selections.insert((kind, name), indices);
        Ok(())
    }

    pub fn with_selection(
        mut self,
        kind: Selection,
        name: impl Into<SmolStr>,
        indices: Vec<usize>,
    ) -> Result<Self, MeshError> {
        self.add_selection(kind, name, indices)?;
        Ok(self)
    }

    pub fn selection(&self, kind: Selection, name: &str) -> Result<&[usize], MeshError> {
        self.selections
            .get(&(kind, SmolStr::new(name)))
            .map(Vec::as_slice)
            .ok_or_else(|| MeshError::UnknownSelection {
                kind: kind.as_str(),
                name: name.into(),
            })
    }

    pub fn n_cells(&self) -> usize {
        self.n_cells
    }

    pub fn n_faces(&self) -> usize {
        self.faces.len()
    }

    pub fn n_internal_faces(&self) -> usize {
        self.neighbour.len()
    }

    pub fn n_points(&self) -> usize {
        self.points.len()
    }

    /// Element count of fields at `location`.
    pub fn size(&self, location: Location) -> usize {
        match location {
            Location::Volume => self.n_cells,
            Location::Surface => self.faces.len(),
            Location::Point => self.points.len(),
        }
    }

    pub fn points(&self) -> &[Vector3<f64>] {
        &self.points
    }

    pub fn faces(&self) -> &[Vec<usize>] {
        &self.faces
    }

    pub fn owner(&self) -> &[usize] {
        &self.owner
    }

    pub fn neighbour(&self) -> &[usize] {
        &self.neighbour
    }

    pub fn neighbour_of(&self, face: usize) -> Option<usize> {
        self.neighbour.get(face).copied()
    }

    pub fn is_internal_face(&self, face: usize) -> bool {
        face < self.neighbour.len()
    }

    fn face_cells(&self, face: usize) -> impl Iterator<Item = usize> {
        std::iter::once(self.owner[face]).chain(self.neighbour_of(face))
    }

    pub fn patches(&self) -> &[Patch] {
        &self.patches
    }

    pub fn patch(&self, name: &str) -> Result<&Patch, MeshError> {
        self.patches
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| MeshError::UnknownPatch(name.into()))
    }

    pub fn face_centres(&self) -> &[Vector3<f64>] {
        &self.face_centres
    }

    /// Face area vectors (normal times area).
    pub fn face_areas(&self) -> &[Vector3<f64>] {
        &self.face_areas
    }

    pub fn cell_centres(&self) -> &[Vector3<f64>] {
        &self.cell_centres
    }

    pub fn cell_volumes(&self) -> &[f64] {
        &self.cell_volumes
    }

    pub fn cell_points(&self) -> &[Vec<usize>] {
        &self.cell_points
    }

    pub fn point_cells(&self) -> &[Vec<usize>] {
        &self.point_cells
    }

    /// Element positions at `location`.
    pub fn positions(&self, location: Location) -> &[Vector3<f64>] {
        match location {
            Location::Volume => &self.cell_centres,
            Location::Surface => &self.face_centres,
            Location::Point => &self.points,
        }
    }

    /// Linear interpolation weight of the owner value on each internal face.
    pub(crate) fn weights(&self) -> Vec<f64> {
        (0..self.neighbour.len())
            .map(|face| {
                let cf = self.face_centres[face];
                let d_own = (cf - self.cell_centres[self.owner[face]]).norm();
                let d_nei = (cf - self.cell_centres[self.neighbour[face]]).norm();
                let total = d_own + d_nei;
                if total > 0.0 { d_nei / total } else { 0.5 }
            })
            .collect()
    }
}
