//! Plugin functions.
//!
//! A plugin extends the function library without touching the grammar.
//! When the evaluator meets `name(` and `name` is neither a builtin, a
//! lookup table nor a foreign mesh, it looks the name up here and hands the
//! plugin the raw text that follows the name:
//!
//! ```text
//! 2*clamp(p - 1, 0, 1.5) + q
//!        └──── plugin text starts here
//! ```
//!
//! The plugin parses its own argument list (usually with an
//! [`ArgumentReader`]), evaluates it and reports how many bytes it
//! consumed. Lexing resumes right after them; everything in between is
//! opaque to the outer grammar.

mod arguments;
mod library;

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use thiserror::Error;

use crate::driver::Driver;
use crate::error::EvalError;
use crate::field::TypedField;

pub use arguments::ArgumentReader;
pub use library::{Clamp, InRange};

/// Failures inside a plugin's own micro-grammar or evaluation.
///
/// Offsets are relative to the text handed to the plugin.
#[derive(Debug, Clone, Error)]
pub enum PluginError {
    #[error("expected {expected} at offset {offset}")]
    Expected { expected: &'static str, offset: usize },

    #[error("argument at offset {offset} failed: {source}")]
    Argument {
        offset: usize,
        #[source]
        source: Box<EvalError>,
    },

    #[error("expected {expected} argument, found {found}")]
    WrongType { expected: String, found: String },

    #[error("consumed {consumed} bytes but only {available} were available")]
    Overrun { consumed: usize, available: usize },

    #[error("{0}")]
    Failed(String),
}

/// A function evaluated outside the grammar.
pub trait PluginFunction: Send + Sync {
    /// Name the function is called by.
    fn name(&self) -> &str;

    /// One-line description for listings.
    fn description(&self) -> &str;

    /// Evaluate a call.
    ///
    /// # Arguments
    /// * `text` - Everything after the function name, starting with the
    ///   argument list
    /// * `driver` - The evaluation context; use it to evaluate expression
    ///   arguments
    ///
    /// # Returns
    /// The value and the number of bytes of `text` consumed.
    fn evaluate(
        &self,
        text: &str,
        driver: &mut Driver<'_>,
    ) -> Result<(TypedField, usize), PluginError>;
}

/// Name → plugin lookup.
#[derive(Clone, Default)]
pub struct PluginRegistry {
    functions: FxHashMap<SmolStr, Arc<dyn PluginFunction>>,
}

impl PluginRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the library plugins `clamp` and `inRange`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Clamp);
        registry.register(InRange);
        registry
    }

    /// Add a plugin, replacing any previous one of the same name.
    pub fn register(&mut self, function: impl PluginFunction + 'static) {
        let name = SmolStr::new(function.name());
        if self.functions.insert(name.clone(), Arc::new(function)).is_some() {
            tracing::debug!(plugin = %name, "replaced plugin function");
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn PluginFunction>> {
        self.functions.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(SmolStr::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("functions", &self.names())
            .finish()
    }
}
