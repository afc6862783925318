//! Meshes and repositories used across the integration tests.

use fieldexpr::{BlockSpec, Database, LookupTable, Location, Mesh, Selection, TypedField};
use nalgebra::{Matrix3, Vector3};

/// A row of `n` unit-height cells along x, spanning `[0, 1]`.
pub fn row_mesh(n: usize) -> Mesh {
    Mesh::block(BlockSpec::new(n, 1, 1)).expect("valid block")
}

pub fn scalar(values: &[f64]) -> TypedField {
    TypedField::scalar(Location::Volume, values.to_vec())
}

pub fn vector(values: &[[f64; 3]]) -> TypedField {
    TypedField::vector(
        Location::Volume,
        values.iter().map(|v| Vector3::new(v[0], v[1], v[2])).collect(),
    )
}

/// Database over `n` cells with the given named fields.
pub fn database_with(n: usize, fields: Vec<(&str, TypedField)>) -> Database {
    let mut db = Database::new(row_mesh(n));
    for (name, field) in fields {
        db.insert(name, field).expect("field fits the mesh");
    }
    db
}

/// Three cells holding a representative field of every kind.
///
/// * `p = [1, 2, 3]`, `q = [4, 0.5, -2]`
/// * `U`, `V` vectors, `tau` tensor, `sigma` symmTensor, `iso` sphericalTensor
pub fn standard_database() -> Database {
    let tau = Matrix3::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 10.0);
    let sigma = Matrix3::new(2.0, 1.0, 0.0, 1.0, 3.0, 0.5, 0.0, 0.5, 4.0);
    let mesh = row_mesh(3)
        .with_selection(Selection::CellSet, "left", vec![0])
        .and_then(|m| m.with_selection(Selection::CellZone, "core", vec![1, 2]))
        .and_then(|m| m.with_selection(Selection::FaceSet, "cut", vec![0]))
        .expect("selections fit the mesh");
    let mut db = Database::new(mesh);
    let fields = vec![
        ("p", scalar(&[1.0, 2.0, 3.0])),
        ("q", scalar(&[4.0, 0.5, -2.0])),
        ("U", vector(&[[1.0, 0.0, 0.0], [3.0, 4.0, 0.0], [0.0, -2.0, 1.0]])),
        ("V", vector(&[[0.0, 1.0, 0.0], [1.0, 1.0, 1.0], [2.0, 0.0, -1.0]])),
        ("tau", TypedField::tensor(Location::Volume, vec![tau; 3])),
        ("sigma", TypedField::symm_tensor(Location::Volume, vec![sigma; 3])),
        ("iso", TypedField::spherical_tensor(Location::Volume, vec![1.0, 2.0, 3.0])),
    ];
    for (name, field) in fields {
        db.insert(name, field).expect("field fits the mesh");
    }
    db.insert_table(
        "ramp",
        LookupTable::new(vec![(0.0, 0.0), (10.0, 100.0)]).expect("valid table"),
    );
    db.set_time(2.0, 0.5);
    db
}
