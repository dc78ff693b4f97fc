//! Parser error handling module
//!
//! - Categorized error codes for filtering and documentation
//! - Suggestions/hints for common mistakes

mod codes;
mod error;

pub use codes::ErrorCode;
pub use error::SyntaxError;
