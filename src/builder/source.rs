//! Translation of relative text positions to absolute source spans.
//!
//! The text being built is not always a whole file: it may be an island
//! fragment cut out of an outer text, or a standalone expression wrapped in a
//! synthetic declaration. A [`TranslationContext`] records where the text
//! sits in its real source so spans can be reported there.

use rowan::TextRange;
use smol_str::SmolStr;

use super::options::BuilderOptions;
use crate::base::{LineCol, LineIndex, SourceSpan};

/// Immutable offset state for one compile unit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TranslationContext {
    pub source_id: SmolStr,
    pub line_offset: i64,
    /// Applies to the first line only; later lines restart at column zero.
    pub column_offset: i64,
}

impl TranslationContext {
    pub fn new(source_id: impl Into<SmolStr>, line_offset: i64, column_offset: i64) -> Self {
        Self {
            source_id: source_id.into(),
            line_offset,
            column_offset,
        }
    }

    pub fn from_options(options: &BuilderOptions) -> Self {
        Self::new(options.source_id.clone(), options.line_offset, options.column_offset)
    }

    /// Resolve a relative range, given as 1-based lines and 0-based columns
    /// with an exclusive end, to an absolute span with an inclusive end.
    pub fn resolve(&self, start: LineCol, end: LineCol) -> SourceSpan {
        let start_line = self.line(start.line);
        let start_column = self.column(start.line, start.col as i64 + 1);
        let end_line = self.line(end.line).max(start_line);
        let mut end_column = self.column(end.line, end.col as i64);
        if end_line == start_line {
            end_column = end_column.max(start_column);
        }
        SourceSpan::new(self.source_id.clone(), start_line, start_column, end_line, end_column)
    }

    /// Context for an island whose opening delimiter is `anchor`.
    ///
    /// Island text starts right after the anchor, so the anchor's own length
    /// is part of the new column offset.
    pub fn for_island(&self, anchor: LineCol, anchor_len: u32) -> TranslationContext {
        let column_base = if anchor.line == 1 { self.column_offset } else { 0 };
        TranslationContext {
            source_id: self.source_id.clone(),
            line_offset: self.line_offset + (anchor.line as i64 - 1),
            column_offset: column_base + anchor.col as i64 + anchor_len as i64,
        }
    }

    fn line(&self, line: u32) -> u32 {
        saturate(line as i64 + self.line_offset)
    }

    fn column(&self, line: u32, column: i64) -> u32 {
        let offset = if line == 1 { self.column_offset } else { 0 };
        saturate(column + offset)
    }
}

fn saturate(value: i64) -> u32 {
    value.clamp(1, u32::MAX as i64) as u32
}

/// Turns CST byte ranges of one text into absolute spans.
#[derive(Debug, Clone)]
pub struct SpanResolver {
    line_index: LineIndex,
    context: TranslationContext,
}

impl SpanResolver {
    pub fn new(text: &str, context: TranslationContext) -> Self {
        Self {
            line_index: LineIndex::new(text),
            context,
        }
    }

    pub fn context(&self) -> &TranslationContext {
        &self.context
    }

    pub fn line_col(&self, offset: rowan::TextSize) -> LineCol {
        self.line_index.line_col(offset)
    }

    pub fn span(&self, range: TextRange) -> SourceSpan {
        let start = self.line_index.line_col(range.start());
        let end = self.line_index.line_col(range.end());
        self.context.resolve(start, end)
    }
}
