//! Structured hexahedral box generator.

use nalgebra::Vector3;

use super::{Mesh, MeshError, Patch};

/// An axis-aligned box split into `nx * ny * nz` hexahedra.
///
/// Boundary faces are grouped into the patches `xmin`, `xmax`, `ymin`,
/// `ymax`, `zmin` and `zmax`, in that order.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockSpec {
    pub cells: [usize; 3],
    pub min: Vector3<f64>,
    pub max: Vector3<f64>,
}

impl BlockSpec {
    /// Unit box with the given cell counts.
    pub fn new(nx: usize, ny: usize, nz: usize) -> Self {
        Self {
            cells: [nx, ny, nz],
            min: Vector3::zeros(),
            max: Vector3::repeat(1.0),
        }
    }

    pub fn with_bounds(mut self, min: Vector3<f64>, max: Vector3<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }
}

/// Face directions, each with the two in-plane axes ordered so that the
/// right-hand rule gives the positive axis direction.
const DIRECTIONS: [(usize, usize, usize); 3] = [(0, 1, 2), (1, 2, 0), (2, 0, 1)];

impl Mesh {
    pub fn block(spec: BlockSpec) -> Result<Self, MeshError> {
        let [nx, ny, nz] = spec.cells;
        let extent = spec.max - spec.min;
        if nx == 0 || ny == 0 || nz == 0 || extent.iter().any(|e| *e <= 0.0) {
            return Err(MeshError::EmptyBlock);
        }
        let n = spec.cells;

        let point_id = |ijk: [usize; 3]| ijk[0] + (nx + 1) * (ijk[1] + (ny + 1) * ijk[2]);
        let cell_id = |ijk: [usize; 3]| ijk[0] + nx * (ijk[1] + ny * ijk[2]);

        let mut points = Vec::with_capacity((nx + 1) * (ny + 1) * (nz + 1));
        for k in 0..=nz {
            for j in 0..=ny {
                for i in 0..=nx {
                    let t = Vector3::new(i as f64 / nx as f64, j as f64 / ny as f64, k as f64 / nz as f64);
                    points.push(spec.min + extent.component_mul(&t));
                }
            }
        }

        // Quad on the plane `axis = level` spanning cell `(a, b)` of the other axes,
        // wound so its normal points along +axis.
        let quad = |axis: usize, u: usize, v: usize, level: usize, a: usize, b: usize| {
            let corner = |da: usize, db: usize| {
                let mut ijk = [0; 3];
                ijk[axis] = level;
                ijk[u] = a + da;
                ijk[v] = b + db;
                point_id(ijk)
            };
            vec![corner(0, 0), corner(1, 0), corner(1, 1), corner(0, 1)]
        };

        let mut faces = Vec::new();
        let mut owner = Vec::new();
        let mut neighbour = Vec::new();

        for &(axis, u, v) in &DIRECTIONS {
            for level in 1..n[axis] {
                for b in 0..n[v] {
                    for a in 0..n[u] {
                        let mut below = [0; 3];
                        below[axis] = level - 1;
                        below[u] = a;
                        below[v] = b;
                        let mut above = below;
                        above[axis] = level;
                        faces.push(quad(axis, u, v, level, a, b));
                        owner.push(cell_id(below));
                        neighbour.push(cell_id(above));
                    }
                }
            }
        }

        let mut patches = Vec::with_capacity(6);
        for &(axis, u, v) in &DIRECTIONS {
            for (upper, name) in [(false, "min"), (true, "max")] {
                let start = faces.len();
                let level = if upper { n[axis] } else { 0 };
                for b in 0..n[v] {
                    for a in 0..n[u] {
                        let mut cell = [0; 3];
                        cell[axis] = if upper { n[axis] - 1 } else { 0 };
                        cell[u] = a;
                        cell[v] = b;
                        let mut face = quad(axis, u, v, level, a, b);
                        if !upper {
                            face.reverse();
                        }
                        faces.push(face);
                        owner.push(cell_id(cell));
                    }
                }
                let axis_name = ["x", "y", "z"][axis];
                patches.push(Patch::new(
                    format!("{axis_name}{name}"),
                    start,
                    faces.len() - start,
                ));
            }
        }

        Mesh::new(points, faces, owner, neighbour, patches)
    }
}
