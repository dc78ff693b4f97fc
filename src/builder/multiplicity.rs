//! Cardinality tokens to [`Multiplicity`].

use super::error::{ParseError, Result};
use super::source::SpanResolver;
use crate::model::Multiplicity;
use crate::parser::{self, AstNode, SyntaxKind, SyntaxToken};

/// Build a multiplicity from its bounds.
///
/// Without a lower bound, `[*]` means `0..*` and `[n]` means exactly `n`.
pub fn build_multiplicity(node: &parser::Multiplicity, spans: &SpanResolver) -> Result<Multiplicity> {
    let Some(upper) = node.upper() else {
        return Err(ParseError::syntax(
            parser::ErrorCode::E0303,
            "multiplicity has no upper bound",
            spans.span(node.syntax().text_range()),
        ));
    };
    let upper = bound(&upper, spans)?;
    let lower = match node.lower() {
        Some(lower) => bound(&lower, spans)?.unwrap_or(0),
        None => upper.unwrap_or(0),
    };
    Ok(Multiplicity::new(lower, upper))
}

/// `None` for `*`.
fn bound(token: &SyntaxToken, spans: &SpanResolver) -> Result<Option<u32>> {
    if token.kind() == SyntaxKind::STAR {
        return Ok(None);
    }
    token
        .text()
        .parse::<u32>()
        .map(Some)
        .map_err(|_| ParseError::InvalidNumberLiteral {
            text: token.text().to_string(),
            span: spans.span(token.text_range()),
        })
}
