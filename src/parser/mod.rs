//! Rowan-based lossless parser for Pure
//!
//! This module provides the concrete syntax layer using:
//! - **logos** for fast lexing
//! - **rowan** for the CST (Concrete Syntax Tree)
//!
//! ## Architecture
//!
//! ```text
//! Source Text
//!     ↓
//! Lexer (logos) → Tokens with SyntaxKind
//!     ↓
//! Parser → GreenNode tree (immutable, cheap to clone)
//!     ↓
//! SyntaxNode (rowan) → CST with parent pointers
//!     ↓
//! AST layer → Typed wrappers over SyntaxNode
//!     ↓
//! builder → ValueSpecification model
//! ```
//!
//! The parser does not resolve operator precedence. Expressions come out as
//! a head plus a flat run of operator parts, which the builder folds.

#[allow(clippy::module_inception)]
mod parser;

pub mod ast;
pub mod errors;
mod lexer;
mod syntax_kind;

pub use ast::*;
pub use errors::{ErrorCode, SyntaxError};
pub use lexer::{Lexer, Token, tokenize};
pub use parser::{DEFAULT_PARSE_DEPTH, Parse, parse_pure, parse_pure_with_depth};
pub use syntax_kind::{PureLanguage, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken, kind_to_name};

/// Re-export rowan types for convenience
pub use rowan::{GreenNode, TextRange, TextSize};
