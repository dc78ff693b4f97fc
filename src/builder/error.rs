//! Error types for value-specification building.

use thiserror::Error;

use crate::base::SourceSpan;
use crate::parser::{ErrorCode, SyntaxError};

/// Errors that abort a compile unit.
///
/// Every variant carries the absolute span of the offending input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// Date literal that doesn't follow `YYYY[-MM[-DD[Thh...]]]`.
    #[error("invalid date literal '{text}' at {span}")]
    InvalidDateLiteral { text: String, span: SourceSpan },

    /// Strict time literal that doesn't follow `HH[:MM[:SS[.f]]]`.
    #[error("invalid strict time literal '{text}' at {span}")]
    InvalidTimeLiteral { text: String, span: SourceSpan },

    /// Numeric literal outside the representable range.
    #[error("invalid number literal '{text}' at {span}")]
    InvalidNumberLiteral { text: String, span: SourceSpan },

    /// Syntax the grammar accepts but the builder deliberately rejects.
    #[error("{message} at {span}")]
    UnsupportedSyntax { message: String, span: SourceSpan },

    /// An island grammar returned more than one result.
    #[error("{grammar} island produced {count} results, expected exactly one, at {span}")]
    AmbiguousIslandResult {
        grammar: String,
        count: usize,
        span: SourceSpan,
    },

    /// An island fragment with nothing between its delimiters.
    #[error("{grammar} island has no content at {span}")]
    MissingIslandContent { grammar: String, span: SourceSpan },

    /// Failure reported from inside an island grammar.
    #[error("{grammar} island error: {message} at {span}")]
    Island {
        grammar: String,
        message: String,
        span: SourceSpan,
    },

    /// Syntax error from the concrete syntax layer.
    #[error("{code}: {message} at {span}")]
    Syntax {
        message: String,
        code: ErrorCode,
        span: SourceSpan,
        /// Suggested fix, when the parser has one.
        hint: Option<String>,
    },

    /// Expression nesting beyond the configured limit.
    #[error("expression nesting exceeds maximum depth {max_depth} at {span}")]
    NestingTooDeep { max_depth: usize, span: SourceSpan },

    /// The same element path declared twice in one source.
    #[error("duplicate element '{path}' at {span}")]
    DuplicateElement { path: String, span: SourceSpan },
}

impl ParseError {
    /// The absolute source span of the error.
    pub fn span(&self) -> &SourceSpan {
        match self {
            Self::InvalidDateLiteral { span, .. }
            | Self::InvalidTimeLiteral { span, .. }
            | Self::InvalidNumberLiteral { span, .. }
            | Self::UnsupportedSyntax { span, .. }
            | Self::AmbiguousIslandResult { span, .. }
            | Self::MissingIslandContent { span, .. }
            | Self::Island { span, .. }
            | Self::Syntax { span, .. }
            | Self::NestingTooDeep { span, .. }
            | Self::DuplicateElement { span, .. } => span,
        }
    }

    /// Create an unsupported-syntax error.
    pub fn unsupported(message: impl Into<String>, span: SourceSpan) -> Self {
        Self::UnsupportedSyntax {
            message: message.into(),
            span,
        }
    }

    /// Create an island-internal error.
    pub fn island(grammar: impl Into<String>, message: impl Into<String>, span: SourceSpan) -> Self {
        Self::Island {
            grammar: grammar.into(),
            message: message.into(),
            span,
        }
    }

    /// Create a syntax error carrying the code's general hint.
    pub fn syntax(code: ErrorCode, message: impl Into<String>, span: SourceSpan) -> Self {
        Self::Syntax {
            message: message.into(),
            code,
            span,
            hint: code.hint().map(str::to_string),
        }
    }

    /// Convert a CST syntax error, given its already translated span.
    ///
    /// E0405 is the parser's nesting guard and surfaces as
    /// [`ParseError::NestingTooDeep`].
    pub fn from_syntax(error: &SyntaxError, span: SourceSpan, max_depth: usize) -> Self {
        if error.code == ErrorCode::E0405 {
            return Self::NestingTooDeep { max_depth, span };
        }
        Self::Syntax {
            message: error.message.clone(),
            code: error.code,
            span,
            hint: error.hint.clone(),
        }
    }
}

/// Result type for building operations.
pub type Result<T> = std::result::Result<T, ParseError>;
