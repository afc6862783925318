//! Error code definitions for parser diagnostics
//!
//! Error codes follow a naming convention: E{category}{number}
//! - E01xx: Lexical errors (invalid tokens)
//! - E02xx: Structural errors (delimiters)
//! - E04xx: Expression and type errors
//! - E09xx: Generic/fallback errors

use std::fmt;

/// Error codes for parser diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // E01xx: Lexical errors (invalid tokens)
    // =========================================================================
    /// Invalid or unexpected character in source
    E0101,
    /// Invalid numeric literal
    E0104,

    // =========================================================================
    // E02xx: Structural errors (delimiters)
    // =========================================================================
    /// Unclosed parenthesis `(`
    E0203,
    /// Input continues after a complete expression
    E0208,

    // =========================================================================
    // E04xx: Expression and type errors
    // =========================================================================
    /// Operator not defined for the operand kinds
    E0403,
    /// Function argument of the wrong kind or location
    E0405,
    /// Missing expression where expected
    E0406,
    /// Operands live at different locations
    E0407,
    /// Component suffix not valid for the kind
    E0408,
    /// Result is not of the requested type
    E0409,

    // =========================================================================
    // E09xx: Generic/fallback errors
    // =========================================================================
    /// Expected a specific token
    E0902,
}

impl ErrorCode {
    /// Get the string representation of the error code (e.g., "E0403")
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::E0101 => "E0101",
            Self::E0104 => "E0104",
            Self::E0203 => "E0203",
            Self::E0208 => "E0208",
            Self::E0403 => "E0403",
            Self::E0405 => "E0405",
            Self::E0406 => "E0406",
            Self::E0407 => "E0407",
            Self::E0408 => "E0408",
            Self::E0409 => "E0409",
            Self::E0902 => "E0902",
        }
    }

    /// Get a short description of the error category
    pub fn category_description(&self) -> &'static str {
        match self {
            Self::E0101 | Self::E0104 => "lexical error",
            Self::E0203 | Self::E0208 => "structural error",
            Self::E0406 => "expression error",
            Self::E0403 | Self::E0405 | Self::E0407 | Self::E0408 | Self::E0409 => "type error",
            Self::E0902 => "syntax error",
        }
    }

    /// Get the default message template for this error code
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::E0101 => "invalid character",
            Self::E0104 => "invalid numeric literal",
            Self::E0203 => "unclosed parenthesis",
            Self::E0208 => "unexpected input after expression",
            Self::E0403 => "operator not defined for these kinds",
            Self::E0405 => "invalid argument",
            Self::E0406 => "expected expression",
            Self::E0407 => "operands at different locations",
            Self::E0408 => "invalid component",
            Self::E0409 => "wrong result type",
            Self::E0902 => "expected token",
        }
    }

    pub fn is_lexical(&self) -> bool {
        matches!(self, Self::E0101 | Self::E0104)
    }

    /// Errors raised by kind/location checks rather than token shape
    pub fn is_type_error(&self) -> bool {
        self.category_description() == "type error"
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
