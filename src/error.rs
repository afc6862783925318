//! Crate-level evaluation error.

use smol_str::SmolStr;
use thiserror::Error;

use crate::base::Dimensions;
use crate::field::FieldError;
use crate::mesh::MeshError;
use crate::parser::SyntaxError;
use crate::plugin::PluginError;
use crate::repository::RepositoryError;

/// Every way a parse can fail. All of them abort the evaluation; the
/// driver's result slot stays empty.
#[derive(Debug, Clone, Error)]
pub enum EvalError {
    #[error("lexical error: {0}")]
    Lexical(SyntaxError),

    #[error("syntax error: {0}")]
    Syntax(SyntaxError),

    #[error("operands do not have matching domain size: {left} vs {right}")]
    SizeMismatch { left: usize, right: usize },

    #[error("dimensions of operands differ for '{op}': {left} vs {right}")]
    DimensionMismatch {
        op: &'static str,
        left: Dimensions,
        right: Dimensions,
    },

    #[error("unknown field '{0}'")]
    UnknownField(SmolStr),

    #[error("unknown function '{0}'")]
    UnknownFunction(SmolStr),

    #[error("plugin function '{name}' failed: {source}")]
    Plugin {
        name: SmolStr,
        #[source]
        source: PluginError,
    },

    #[error(transparent)]
    Repository(RepositoryError),

    #[error(transparent)]
    Mesh(#[from] MeshError),

    #[error(transparent)]
    Field(FieldError),
}

impl EvalError {
    /// The diagnostic for lexical and syntax errors.
    pub fn syntax_error(&self) -> Option<&SyntaxError> {
        match self {
            EvalError::Lexical(e) | EvalError::Syntax(e) => Some(e),
            _ => None,
        }
    }

    pub(crate) fn with_hint(mut self, hint: impl Into<String>) -> Self {
        if let EvalError::Lexical(e) | EvalError::Syntax(e) = &mut self {
            e.hint = Some(hint.into());
        }
        self
    }
}

impl From<FieldError> for EvalError {
    fn from(err: FieldError) -> Self {
        match err {
            FieldError::SizeMismatch { left, right } => EvalError::SizeMismatch { left, right },
            FieldError::DimensionMismatch { op, left, right } => {
                EvalError::DimensionMismatch { op, left, right }
            }
            other => EvalError::Field(other),
        }
    }
}

impl From<RepositoryError> for EvalError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(name) => EvalError::UnknownField(name),
            other => EvalError::Repository(other),
        }
    }
}
