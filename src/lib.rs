//! # pure-grammar
//!
//! Grammar front end for the Pure modeling and expression language: source
//! text to a lossless CST, and CST to the value-specification AST consumed
//! by later compiler phases.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! builder   → Expression/declaration builders, precedence, islands
//!   ↓
//! model     → ValueSpecification, packageable elements, ParsedSource
//!   ↓
//! parser    → Logos lexer, recursive-descent parser, typed AST
//!   ↓
//! base      → Primitives (LineIndex, SourceSpan, TextRange)
//! ```

// ============================================================================
// MODULES (dependency order: base → parser → model → builder)
// ============================================================================

/// Foundation types: LineIndex, SourceSpan, TextRange
pub mod base;

/// Parser: Logos lexer, recursive-descent parser, typed AST wrappers
pub mod parser;

/// Output model: value specifications and declarations
pub mod model;

/// Builder: CST to output model
pub mod builder;

// Re-export foundation types
pub use base::{LineCol, LineIndex, SourceSpan, TextRange, TextSize};

// Re-export the compile entry points
pub use builder::{
    BuilderOptions, DEFAULT_MAX_DEPTH, IslandGrammar, IslandRegistry, ParseError, TranslationContext, compile_sources,
    parse_expression, parse_expression_with, parse_source, parse_source_with,
};
pub use model::{PackageableElement, ParsedSource, ValueSpecification};
