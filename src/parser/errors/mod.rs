//! Parser error handling module
//!
//! - Categorized error codes for filtering and documentation
//! - Expected-set and found-token reporting for type and syntax errors
//! - Hints for common mistakes

mod codes;
mod error;

pub use codes::ErrorCode;
pub use error::{SyntaxError, SyntaxErrorBuilder};
