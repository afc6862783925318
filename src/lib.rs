//! # fieldexpr
//!
//! Typed, eagerly evaluated expression language over finite-volume mesh
//! fields.
//!
//! An expression such as `mag(U) > 2 ? p : 0` is lexed, parsed and
//! evaluated in one pass: every reduction computes its value immediately.
//! Each value carries a kind (scalar, vector, tensor, ...) and a location
//! (cells, faces or points), and whether an operator applies is decided
//! from those tags alone.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! driver      → Evaluation context: entry points, variables, result slot
//!   ↓
//! plugin      → Plugin registry and argument reader for plugin micro-grammars
//!   ↓
//! parser      → Logos lexer, Pratt evaluator, operator and builtin tables
//!   ↓
//! repository  → FieldRepository trait, in-memory Database, lookup tables
//!   ↓
//! mesh        → Mesh geometry, block meshes, finite-volume calculus
//!   ↓
//! field       → TypedField, field algebra and function library
//!   ↓
//! base        → Kind, Location, ValueType, Dimensions, text positions
//! ```
//!
//! The evaluator borrows the [`Driver`] for the length of one parse and
//! plugins receive it to evaluate their own arguments, so `parser`,
//! `plugin` and `driver` refer to each other.
//!
//! ## Example
//!
//! ```ignore
//! use fieldexpr::{BlockSpec, Database, Driver, Location, Mesh, TypedField};
//!
//! let mesh = Mesh::block(BlockSpec::new(3, 1, 1))?;
//! let mut db = Database::new(mesh);
//! db.insert("p", TypedField::scalar(Location::Volume, vec![1.0, 2.0, 3.0]))?;
//!
//! let mut driver = Driver::new(&db);
//! let value = driver.parse("2*p + 1")?;
//! assert_eq!(value.scalar_values(), Some(&[3.0, 5.0, 7.0][..]));
//! ```

// ============================================================================
// MODULES (dependency order: base → field → mesh → repository → parser → plugin → driver)
// ============================================================================

/// Foundation types: Kind, Location, ValueType, Dimensions
pub mod base;

/// Field values, elementwise algebra, reductions and tensor functions
pub mod field;

/// Mesh geometry and finite-volume operators
pub mod mesh;

/// Named field storage, old-time levels, lookup tables, foreign meshes
pub mod repository;

/// Lexer, Pratt evaluator, grammar tables and diagnostics
pub mod parser;

/// Plugin functions evaluated outside the grammar
pub mod plugin;

/// Evaluation context and entry points
pub mod driver;

/// Crate-level evaluation error
pub mod error;

// Re-export the types most callers need
pub use base::{Dimensions, Kind, LineCol, LineIndex, Location, TextRange, TextSize, ValueType};
pub use driver::{Driver, DriverOptions, InterpolationOrder};
pub use error::EvalError;
pub use field::{FieldData, FieldError, TypedField};
pub use mesh::{BlockSpec, Mesh, MeshError, Patch, Selection};
pub use parser::{ErrorCode, SyntaxError};
pub use plugin::{ArgumentReader, PluginError, PluginFunction, PluginRegistry};
pub use repository::{Database, FieldRepository, LookupTable, RepositoryError};
