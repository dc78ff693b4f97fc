//! Embedded island sub-grammars.
//!
//! An island is a verbatim fragment inside an expression, `#{...}#` for graph
//! fetch trees and `#/...#` for navigation paths. The builder cuts out the
//! text between the delimiters, derives a [`TranslationContext`] anchored at
//! the opening delimiter, and hands both to the grammar registered for the
//! island's tag.

mod graph_fetch;
mod lexer;
mod navigation;

use std::sync::Arc;

use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use tracing::debug;

pub use graph_fetch::{GRAPH_FETCH_TAG, GraphFetchGrammar};
pub use navigation::{NAVIGATION_TAG, NavigationGrammar};

use super::error::{ParseError, Result};
use super::source::{SpanResolver, TranslationContext};
use crate::model::ValueSpecification;
use crate::parser::{SyntaxKind, SyntaxToken};

/// Length of both island anchors, `#{` and `#/`.
const ANCHOR_LEN: u32 = 2;

/// A sub-grammar parsing the text of one island kind.
pub trait IslandGrammar: Send + Sync {
    /// Tag of the island kind; also the `type_tag` of produced class instances.
    fn tag(&self) -> &'static str;

    /// Parse island text. Spans must be resolved through `ctx`.
    fn parse(&self, text: &str, ctx: &TranslationContext) -> Result<Vec<ValueSpecification>>;
}

/// Island grammars keyed by tag.
#[derive(Clone)]
pub struct IslandRegistry {
    grammars: FxHashMap<SmolStr, Arc<dyn IslandGrammar>>,
}

impl Default for IslandRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(GraphFetchGrammar);
        registry.register(NavigationGrammar);
        registry
    }
}

impl std::fmt::Debug for IslandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut tags: Vec<_> = self.grammars.keys().collect();
        tags.sort();
        f.debug_struct("IslandRegistry").field("tags", &tags).finish()
    }
}

impl IslandRegistry {
    /// A registry with no grammars at all.
    pub fn empty() -> Self {
        Self {
            grammars: FxHashMap::default(),
        }
    }

    /// Register `grammar`, replacing any grammar with the same tag.
    pub fn register(&mut self, grammar: impl IslandGrammar + 'static) {
        self.grammars
            .insert(SmolStr::new(grammar.tag()), Arc::new(grammar));
    }

    pub fn get(&self, tag: &str) -> Option<&dyn IslandGrammar> {
        self.grammars.get(tag).map(|g| g.as_ref())
    }

    /// Build the single value of an island token.
    pub(crate) fn build(&self, token: &SyntaxToken, spans: &SpanResolver) -> Result<ValueSpecification> {
        let span = spans.span(token.text_range());
        let (tag, closer) = match token.kind() {
            SyntaxKind::GRAPH_FETCH_ISLAND => (GRAPH_FETCH_TAG, "}#"),
            SyntaxKind::NAVIGATION_ISLAND => (NAVIGATION_TAG, "#"),
            kind => return Err(ParseError::unsupported(format!("{:?} is not an island", kind), span)),
        };
        let Some(grammar) = self.get(tag) else {
            return Err(ParseError::unsupported(
                format!("no grammar registered for '{}' islands", tag),
                span,
            ));
        };

        let text = island_content(token.text(), closer);
        if text.trim().is_empty() {
            return Err(ParseError::MissingIslandContent {
                grammar: tag.to_string(),
                span,
            });
        }

        let anchor = spans.line_col(token.text_range().start());
        let ctx = spans.context().for_island(anchor, ANCHOR_LEN);
        debug!(tag, line = anchor.line, col = anchor.col, "island dispatch");

        let mut results = grammar.parse(text, &ctx)?;
        if results.len() != 1 {
            return Err(ParseError::AmbiguousIslandResult {
                grammar: tag.to_string(),
                count: results.len(),
                span,
            });
        }
        results.pop().ok_or(ParseError::MissingIslandContent {
            grammar: tag.to_string(),
            span,
        })
    }
}

/// Text between the anchor and `closer`.
fn island_content<'a>(token_text: &'a str, closer: &str) -> &'a str {
    let inner = token_text.get(ANCHOR_LEN as usize..).unwrap_or("");
    inner.strip_suffix(closer).unwrap_or(inner)
}
