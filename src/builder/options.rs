//! Builder configuration.

use smol_str::SmolStr;

/// Default limit on expression nesting.
///
/// Each level costs several recursive frames in the parser and the builder;
/// this stays well inside a 2 MiB thread stack in unoptimized builds.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Options shared by every compile entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuilderOptions {
    /// Identifier stamped on every produced span.
    pub source_id: SmolStr,
    /// Added to every line number.
    pub line_offset: i64,
    /// Added to columns on the first line of the text.
    pub column_offset: i64,
    /// Accept the deprecated `x['key']` / `x[0]` indexing form.
    pub allow_property_brackets: bool,
    /// Maximum expression nesting before `NestingTooDeep`.
    pub max_depth: usize,
}

impl Default for BuilderOptions {
    fn default() -> Self {
        Self {
            source_id: SmolStr::default(),
            line_offset: 0,
            column_offset: 0,
            allow_property_brackets: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl BuilderOptions {
    pub fn new(source_id: impl Into<SmolStr>) -> Self {
        Self {
            source_id: source_id.into(),
            ..Self::default()
        }
    }

    pub fn with_source_id(mut self, source_id: impl Into<SmolStr>) -> Self {
        self.source_id = source_id.into();
        self
    }

    pub fn with_offsets(mut self, line_offset: i64, column_offset: i64) -> Self {
        self.line_offset = line_offset;
        self.column_offset = column_offset;
        self
    }

    pub fn with_property_brackets(mut self, allow: bool) -> Self {
        self.allow_property_brackets = allow;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
