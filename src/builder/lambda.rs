//! Synthetic names for anonymous functions.

use smol_str::{SmolStr, format_smolstr};

/// Per-declaration counter naming nested lambdas `owner$n`.
///
/// One context lives for one compile unit; names are unique within it only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LambdaContext {
    owner: SmolStr,
    counter: u32,
}

impl LambdaContext {
    /// `owner` is a declaration path; `::` separators become `_`.
    pub fn new(owner: &str) -> Self {
        Self {
            owner: SmolStr::new(owner.replace("::", "_")),
            counter: 0,
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn next_name(&mut self) -> SmolStr {
        let name = format_smolstr!("{}${}", self.owner, self.counter);
        self.counter += 1;
        name
    }
}
