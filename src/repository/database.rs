//! In-memory repository.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use super::{FieldRepository, LookupTable, RepositoryError};
use crate::base::{Kind, ValueType};
use crate::field::TypedField;
use crate::mesh::Mesh;

/// A mesh plus its named fields, old-time values, tables and foreign meshes.
#[derive(Debug, Clone)]
pub struct Database {
    mesh: Mesh,
    fields: IndexMap<SmolStr, TypedField>,
    /// `old[name][0]` is one step back.
    old: FxHashMap<SmolStr, Vec<TypedField>>,
    tables: IndexMap<SmolStr, LookupTable>,
    foreign: IndexMap<SmolStr, Database>,
    time: f64,
    delta_t: f64,
    mesh_phi: Option<TypedField>,
}

impl Database {
    pub fn new(mesh: Mesh) -> Self {
        Self {
            mesh,
            fields: IndexMap::new(),
            old: FxHashMap::default(),
            tables: IndexMap::new(),
            foreign: IndexMap::new(),
            time: 0.0,
            delta_t: 1.0,
            mesh_phi: None,
        }
    }

    fn check(&self, name: &SmolStr, field: &TypedField) -> Result<(), RepositoryError> {
        let Some(location) = field.location() else {
            return Err(RepositoryError::Unlocated(name.clone()));
        };
        let expected = self.mesh.size(location);
        if field.len() != expected {
            return Err(RepositoryError::SizeMismatch {
                name: name.clone(),
                expected,
                found: field.len(),
            });
        }
        Ok(())
    }

    /// Store the current value of a field, replacing any previous one.
    pub fn insert(&mut self, name: impl Into<SmolStr>, field: TypedField) -> Result<(), RepositoryError> {
        let name = name.into();
        self.check(&name, &field)?;
        self.fields.insert(name, field);
        Ok(())
    }

    /// Store an old-time value `level` steps back (`level >= 1`).
    pub fn insert_old(
        &mut self,
        name: impl Into<SmolStr>,
        level: usize,
        field: TypedField,
    ) -> Result<(), RepositoryError> {
        let name = name.into();
        self.check(&name, &field)?;
        let levels = self.old.entry(name).or_default();
        let slot = level.max(1) - 1;
        if levels.len() <= slot {
            levels.resize(slot + 1, field.clone());
        }
        levels[slot] = field;
        Ok(())
    }

    pub fn insert_table(&mut self, name: impl Into<SmolStr>, table: LookupTable) {
        self.tables.insert(name.into(), table);
    }

    pub fn insert_foreign(&mut self, name: impl Into<SmolStr>, database: Database) {
        self.foreign.insert(name.into(), database);
    }

    pub fn set_time(&mut self, time: f64, delta_t: f64) {
        self.time = time;
        self.delta_t = delta_t;
    }

    /// Face flux swept by mesh motion; must be a surface scalar.
    pub fn set_mesh_phi(&mut self, phi: TypedField) -> Result<(), RepositoryError> {
        let name = SmolStr::new_static("meshPhi");
        self.check(&name, &phi)?;
        let expected = ValueType::surface(Kind::Scalar);
        match phi.value_type() {
            Some(found) if found != expected => {
                return Err(RepositoryError::WrongType {
                    name,
                    expected,
                    found,
                });
            }
            _ => {}
        }
        self.mesh_phi = Some(phi);
        Ok(())
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(SmolStr::as_str)
    }
}

impl FieldRepository for Database {
    fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    fn classify(&self, name: &str) -> Option<ValueType> {
        self.fields.get(name).and_then(TypedField::value_type)
    }

    fn resolve(&self, name: &str) -> Result<TypedField, RepositoryError> {
        self.fields.get(name).cloned().ok_or_else(|| {
            tracing::warn!(name, "field not in repository");
            RepositoryError::NotFound(name.into())
        })
    }

    /// Missing old levels fall back to the closest newer value, so a field
    /// without history has a zero time derivative.
    fn resolve_old(&self, name: &str, level: usize) -> Result<TypedField, RepositoryError> {
        if level == 0 {
            return self.resolve(name);
        }
        match self.old.get(name) {
            Some(levels) if !levels.is_empty() => {
                Ok(levels[(level - 1).min(levels.len() - 1)].clone())
            }
            _ => self.resolve(name),
        }
    }

    fn time(&self) -> f64 {
        self.time
    }

    fn delta_t(&self) -> f64 {
        self.delta_t
    }

    fn lookup_table(&self, name: &str) -> Option<&LookupTable> {
        self.tables.get(name)
    }

    fn foreign(&self, name: &str) -> Option<&dyn FieldRepository> {
        self.foreign.get(name).map(|db| db as &dyn FieldRepository)
    }

    fn mesh_phi(&self) -> Option<TypedField> {
        self.mesh_phi.clone()
    }
}
