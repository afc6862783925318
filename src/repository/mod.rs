//! Field storage the evaluator reads from.
//!
//! A [`FieldRepository`] owns a mesh and the named fields defined on it.
//! Names are classified into exactly one [`ValueType`] before the grammar
//! sees them, and resolving a name hands the evaluator its own copy.

mod database;
mod mapping;
mod table;

pub use database::Database;
pub use mapping::{InterpolationOrder, map_cells};
pub use table::LookupTable;

use smol_str::SmolStr;
use thiserror::Error;

use crate::base::ValueType;
use crate::field::TypedField;
use crate::mesh::Mesh;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RepositoryError {
    #[error("field '{0}' not found")]
    NotFound(SmolStr),

    #[error("field '{name}' is a {found}, not a {expected}")]
    WrongType {
        name: SmolStr,
        expected: ValueType,
        found: ValueType,
    },

    #[error("field '{name}' has {found} elements, the mesh needs {expected}")]
    SizeMismatch {
        name: SmolStr,
        expected: usize,
        found: usize,
    },

    #[error("field '{0}' must be located on the mesh, not a constant")]
    Unlocated(SmolStr),

    #[error("lookup table needs at least one point")]
    EmptyTable,

    #[error("lookup table points must be finite")]
    NonFiniteTable,
}

/// Source of mesh geometry and named fields.
pub trait FieldRepository {
    fn mesh(&self) -> &Mesh;

    /// The type `name` resolves to, if it exists.
    fn classify(&self, name: &str) -> Option<ValueType>;

    /// A copy of the current value of `name`.
    fn resolve(&self, name: &str) -> Result<TypedField, RepositoryError>;

    /// Resolve `name`, requiring it to have type `expected`.
    fn resolve_as(&self, name: &str, expected: ValueType) -> Result<TypedField, RepositoryError> {
        let field = self.resolve(name)?;
        match field.value_type() {
            Some(found) if found == expected => Ok(field),
            Some(found) => Err(RepositoryError::WrongType {
                name: name.into(),
                expected,
                found,
            }),
            None => Err(RepositoryError::Unlocated(name.into())),
        }
    }

    /// The value of `name` `level` time steps ago (`0` is current).
    fn resolve_old(&self, name: &str, level: usize) -> Result<TypedField, RepositoryError>;

    fn time(&self) -> f64;

    fn delta_t(&self) -> f64;

    fn lookup_table(&self, name: &str) -> Option<&LookupTable>;

    /// Another mesh's repository, for cross-mesh mapping.
    fn foreign(&self, name: &str) -> Option<&dyn FieldRepository>;

    /// Face flux swept by mesh motion; `None` on a static mesh.
    fn mesh_phi(&self) -> Option<TypedField>;
}
