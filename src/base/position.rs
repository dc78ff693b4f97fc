/// Position tracking for AST nodes
///
/// Stores the absolute source location of value specifications and
/// declarations for error reporting and downstream tooling.
use smol_str::SmolStr;

/// An absolute source range.
///
/// Lines and columns are 1-based. `end_column` is inclusive: it is the
/// column of the last character covered by the span.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct SourceSpan {
    pub source_id: SmolStr,
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl SourceSpan {
    pub fn new(
        source_id: impl Into<SmolStr>,
        start_line: u32,
        start_column: u32,
        end_line: u32,
        end_column: u32,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn cover(&self, other: &SourceSpan) -> SourceSpan {
        let (start_line, start_column) = std::cmp::min(
            (self.start_line, self.start_column),
            (other.start_line, other.start_column),
        );
        let (end_line, end_column) = std::cmp::max(
            (self.end_line, self.end_column),
            (other.end_line, other.end_column),
        );
        SourceSpan {
            source_id: self.source_id.clone(),
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }

    /// Check if a 1-based (line, column) falls within this span
    pub fn contains(&self, line: u32, column: u32) -> bool {
        if line < self.start_line || line > self.end_line {
            return false;
        }
        if line == self.start_line && column < self.start_column {
            return false;
        }
        if line == self.end_line && column > self.end_column {
            return false;
        }
        true
    }
}

impl std::fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:[{}:{}-{}:{}]",
            self.source_id, self.start_line, self.start_column, self.end_line, self.end_column
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cover_orders_endpoints() {
        let a = SourceSpan::new("f", 2, 5, 2, 9);
        let b = SourceSpan::new("f", 1, 7, 2, 3);
        let c = a.cover(&b);
        assert_eq!((c.start_line, c.start_column), (1, 7));
        assert_eq!((c.end_line, c.end_column), (2, 9));
    }

    #[test]
    fn test_contains() {
        let span = SourceSpan::new("f", 1, 3, 2, 4);
        assert!(span.contains(1, 3));
        assert!(span.contains(2, 4));
        assert!(!span.contains(1, 2));
        assert!(!span.contains(2, 5));
        assert!(!span.contains(3, 1));
    }

    #[test]
    fn test_display() {
        let span = SourceSpan::new("model.pure", 1, 2, 3, 4);
        assert_eq!(span.to_string(), "model.pure:[1:2-3:4]");
    }
}
