//! Byte offset to line/column conversion.

use rowan::TextSize;

/// A position relative to the start of a text.
///
/// `line` is 1-based; `col` is the 0-based character index within the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineCol {
    pub line: u32,
    pub col: u32,
}

impl LineCol {
    pub fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

/// Precomputed line starts for a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    text: String,
    line_starts: Vec<u32>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (idx, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(idx as u32 + 1);
            }
        }
        Self {
            text: text.to_string(),
            line_starts,
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Convert a byte offset to a line/column pair.
    ///
    /// Offsets past the end of the text clamp to the end.
    pub fn line_col(&self, offset: TextSize) -> LineCol {
        let offset = u32::from(offset).min(self.text.len() as u32);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let start = self.line_starts[line] as usize;
        let col = self.text[start..offset as usize].chars().count() as u32;
        LineCol::new(line as u32 + 1, col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_line() {
        let index = LineIndex::new("abc\ndef");
        assert_eq!(index.line_col(TextSize::new(0)), LineCol::new(1, 0));
        assert_eq!(index.line_col(TextSize::new(2)), LineCol::new(1, 2));
    }

    #[test]
    fn test_following_lines_restart_columns() {
        let index = LineIndex::new("abc\ndef\n\nx");
        assert_eq!(index.line_col(TextSize::new(4)), LineCol::new(2, 0));
        assert_eq!(index.line_col(TextSize::new(6)), LineCol::new(2, 2));
        assert_eq!(index.line_col(TextSize::new(9)), LineCol::new(4, 0));
        assert_eq!(index.line_count(), 4);
    }

    #[test]
    fn test_columns_count_characters() {
        let index = LineIndex::new("'é' + x");
        assert_eq!(index.line_col(TextSize::new(5)), LineCol::new(1, 4));
    }

    #[test]
    fn test_offset_past_end_clamps() {
        let index = LineIndex::new("ab");
        assert_eq!(index.line_col(TextSize::new(40)), LineCol::new(1, 2));
    }
}
