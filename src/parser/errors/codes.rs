//! Error code definitions for parser diagnostics
//!
//! Error codes follow a naming convention: E{category}{number}
//! - E01xx: Lexical errors (invalid tokens)
//! - E02xx: Structural errors (braces, semicolons)
//! - E03xx: Declaration errors (classes, functions, measures)
//! - E04xx: Expression errors
//! - E05xx: Import errors
//! - E09xx: Generic/fallback errors

use std::fmt;

/// Error codes for parser diagnostics
///
/// Each error code represents a specific category of parse error,
/// enabling filtering and documentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorCode {
    // =========================================================================
    // E01xx: Lexical errors
    // =========================================================================
    /// Invalid or unexpected character in source
    E0101,
    /// Unterminated string, comment or island
    E0102,

    // =========================================================================
    // E02xx: Structural errors
    // =========================================================================
    /// Missing semicolon
    E0201,
    /// Unclosed brace `{`
    E0202,
    /// Unclosed parenthesis `(`
    E0203,
    /// Unclosed bracket `[`
    E0204,

    // =========================================================================
    // E03xx: Declaration errors
    // =========================================================================
    /// Missing identifier/name
    E0301,
    /// Missing type annotation
    E0302,
    /// Missing or malformed multiplicity
    E0303,
    /// Unexpected token in element body
    E0304,
    /// Malformed measure body
    E0305,

    // =========================================================================
    // E04xx: Expression errors
    // =========================================================================
    /// Expected an expression
    E0401,
    /// Invalid lambda
    E0402,
    /// Invalid postfix member access
    E0403,
    /// Invalid argument list
    E0404,
    /// Expression nested beyond the depth limit
    E0405,

    // =========================================================================
    // E05xx: Import errors
    // =========================================================================
    /// Invalid import path
    E0501,

    // =========================================================================
    // E09xx: Generic/fallback errors
    // =========================================================================
    /// Unexpected token in current context
    E0901,
    /// Expected a specific token
    E0902,
}

impl ErrorCode {
    /// Get the string representation of the error code (e.g., "E0201")
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::E0101 => "E0101",
            Self::E0102 => "E0102",
            Self::E0201 => "E0201",
            Self::E0202 => "E0202",
            Self::E0203 => "E0203",
            Self::E0204 => "E0204",
            Self::E0301 => "E0301",
            Self::E0302 => "E0302",
            Self::E0303 => "E0303",
            Self::E0304 => "E0304",
            Self::E0305 => "E0305",
            Self::E0401 => "E0401",
            Self::E0402 => "E0402",
            Self::E0403 => "E0403",
            Self::E0404 => "E0404",
            Self::E0405 => "E0405",
            Self::E0501 => "E0501",
            Self::E0901 => "E0901",
            Self::E0902 => "E0902",
        }
    }

    /// Suggested fix attached to errors of this code, if there is a general one
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::E0201 => Some("add ';' to end the declaration or expression"),
            Self::E0303 => Some("write multiplicities as [1], [*], [0..1] or [1..*]"),
            Self::E0405 => Some("split the expression or raise the nesting limit"),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_as_str() {
        assert_eq!(ErrorCode::E0201.as_str(), "E0201");
        assert_eq!(ErrorCode::E0901.as_str(), "E0901");
    }

    #[test]
    fn test_error_code_display() {
        assert_eq!(format!("{}", ErrorCode::E0401), "E0401");
    }

    #[test]
    fn test_hints() {
        assert!(ErrorCode::E0201.hint().is_some_and(|h| h.contains("';'")));
        assert!(ErrorCode::E0303.hint().is_some_and(|h| h.contains("[0..1]")));
        assert_eq!(ErrorCode::E0902.hint(), None);
    }
}
