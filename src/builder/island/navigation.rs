//! `#/pkg::Person/firm/legalName!name#`

use super::IslandGrammar;
use super::lexer::{IslandToken, TokenCursor};
use crate::builder::error::Result;
use crate::builder::source::TranslationContext;
use crate::model::{IslandValue, NavigationPath, PathElement, ValueSpecification};

pub const NAVIGATION_TAG: &str = "path";

/// Navigation paths: a start type, one or more `/property(args)` steps and
/// an optional `!name`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NavigationGrammar;

impl IslandGrammar for NavigationGrammar {
    fn tag(&self) -> &'static str {
        NAVIGATION_TAG
    }

    fn parse(&self, text: &str, ctx: &TranslationContext) -> Result<Vec<ValueSpecification>> {
        let mut cursor = TokenCursor::new(text, ctx, "navigation");
        let start = cursor.offset();
        let start_type = cursor.qualified_name()?;

        let mut path = Vec::new();
        while cursor.eat(IslandToken::Slash) {
            let step_start = cursor.offset();
            let property = cursor.ident()?;
            let mut parameters = Vec::new();
            if cursor.eat(IslandToken::LParen) && !cursor.eat(IslandToken::RParen) {
                loop {
                    parameters.push(cursor.value()?);
                    if !cursor.eat(IslandToken::Comma) {
                        break;
                    }
                }
                cursor.expect(IslandToken::RParen)?;
            }
            path.push(PathElement {
                property,
                parameters,
                source: Some(cursor.span_from(step_start)),
            });
        }
        if path.is_empty() {
            return Err(cursor.error("a path needs at least one property"));
        }

        let name = if cursor.eat(IslandToken::Bang) {
            Some(cursor.ident()?)
        } else {
            None
        };
        if !cursor.at_end() {
            return Err(cursor.error("unexpected content after path"));
        }

        let source = Some(cursor.span_from(start));
        Ok(vec![ValueSpecification::ClassInstance {
            type_tag: NAVIGATION_TAG.into(),
            value: Box::new(IslandValue::Path(NavigationPath {
                start_type,
                path,
                name,
                source: source.clone(),
            })),
            source,
        }])
    }
}
