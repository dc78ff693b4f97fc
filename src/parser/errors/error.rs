//! Syntax error type
//!
//! Carries the error code, the byte range in the parsed text, and an
//! optional hint for fixing the error.

use rowan::TextRange;

use super::codes::ErrorCode;

/// A syntax error produced while building the CST
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// Human-readable error message
    pub message: String,
    /// Source location (byte range in the parsed text)
    pub range: TextRange,
    /// Categorized error code
    pub code: ErrorCode,
    /// Optional suggestion for fixing the error
    pub hint: Option<String>,
}

impl SyntaxError {
    /// Create a new syntax error, taking the code's general hint if it has one
    pub fn new(message: impl Into<String>, range: TextRange, code: ErrorCode) -> Self {
        Self {
            message: message.into(),
            range,
            code,
            hint: code.hint().map(str::to_string),
        }
    }

    /// Replace the hint on this error
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowan::TextSize;

    #[test]
    fn test_syntax_error_new() {
        let err = SyntaxError::new(
            "expected ';'",
            TextRange::new(TextSize::new(10), TextSize::new(11)),
            ErrorCode::E0201,
        );

        assert_eq!(err.message, "expected ';'");
        assert_eq!(err.code, ErrorCode::E0201);
        assert_eq!(err.hint.as_deref(), ErrorCode::E0201.hint());
    }

    #[test]
    fn test_codes_without_hint() {
        let err = SyntaxError::new("expected ')'", TextRange::empty(TextSize::new(3)), ErrorCode::E0902);
        assert!(err.hint.is_none());
    }

    #[test]
    fn test_with_hint_replaces_default() {
        let err = SyntaxError::new("expected ':'", TextRange::empty(TextSize::new(0)), ErrorCode::E0302)
            .with_hint("properties are written as name: Type[m]");
        assert_eq!(err.hint.as_deref(), Some("properties are written as name: Type[m]"));
    }
}
