//! Foundation types for the Pure grammar toolchain.
//!
//! This module provides fundamental types used throughout the compiler:
//! - [`TextRange`], [`TextSize`] - Source positions (byte offsets)
//! - [`LineCol`], [`LineIndex`] - Line/column conversion
//! - [`SourceSpan`] - Absolute, source-qualified positions attached to AST nodes
//!
//! This module has NO dependencies on other crate modules.

mod line_index;
mod position;

pub use line_index::{LineCol, LineIndex};
pub use position::SourceSpan;

// Re-export text-size types for convenience
pub use rowan::{TextRange, TextSize};
