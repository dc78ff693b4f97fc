//! `#{ pkg::Person { name, 'alias': firm { legalName } } }#`

use super::IslandGrammar;
use super::lexer::{IslandToken, TokenCursor};
use crate::builder::error::Result;
use crate::builder::source::TranslationContext;
use crate::model::{IslandValue, PropertyGraphFetchTree, RootGraphFetchTree, ValueSpecification};

pub const GRAPH_FETCH_TAG: &str = "rootGraphFetchTree";

/// Graph fetch trees.
///
/// ```text
/// Root     = QualifiedName '{' (Property (',' Property)*)? '}'
/// Property = (STRING ':')? Name ('(' Values ')')? ('->subType(@' QualifiedName ')')? ('{' ... '}')?
/// ```
///
/// Several comma-separated roots parse, but yield several results.
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphFetchGrammar;

impl IslandGrammar for GraphFetchGrammar {
    fn tag(&self) -> &'static str {
        GRAPH_FETCH_TAG
    }

    fn parse(&self, text: &str, ctx: &TranslationContext) -> Result<Vec<ValueSpecification>> {
        let mut cursor = TokenCursor::new(text, ctx, "graph fetch");
        let mut roots = vec![root(&mut cursor)?];
        while cursor.eat(IslandToken::Comma) {
            roots.push(root(&mut cursor)?);
        }
        if !cursor.at_end() {
            return Err(cursor.error("unexpected content after graph fetch tree"));
        }
        Ok(roots)
    }
}

fn root(cursor: &mut TokenCursor<'_>) -> Result<ValueSpecification> {
    let start = cursor.offset();
    let class = cursor.qualified_name()?;
    let sub_trees = sub_trees(cursor)?;
    let source = Some(cursor.span_from(start));
    Ok(ValueSpecification::ClassInstance {
        type_tag: GRAPH_FETCH_TAG.into(),
        value: Box::new(IslandValue::RootGraphFetchTree(RootGraphFetchTree {
            class,
            sub_trees,
            source: source.clone(),
        })),
        source,
    })
}

fn sub_trees(cursor: &mut TokenCursor<'_>) -> Result<Vec<PropertyGraphFetchTree>> {
    cursor.expect(IslandToken::LBrace)?;
    let mut trees = Vec::new();
    if cursor.eat(IslandToken::RBrace) {
        return Ok(trees);
    }
    loop {
        trees.push(property(cursor)?);
        if !cursor.eat(IslandToken::Comma) {
            break;
        }
    }
    cursor.expect(IslandToken::RBrace)?;
    Ok(trees)
}

fn property(cursor: &mut TokenCursor<'_>) -> Result<PropertyGraphFetchTree> {
    let start = cursor.offset();

    let alias = if cursor.at(IslandToken::String) {
        let alias = cursor.string()?;
        cursor.expect(IslandToken::Colon)?;
        Some(alias.into())
    } else {
        None
    };
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

    let sub_type = if cursor.eat(IslandToken::Arrow) {
        if cursor.ident()? != "subType" {
            return Err(cursor.error("expected 'subType'"));
        }
        cursor.expect(IslandToken::LParen)?;
        cursor.expect(IslandToken::At)?;
        let class = cursor.qualified_name()?;
        cursor.expect(IslandToken::RParen)?;
        Some(class)
    } else {
        None
    };

    let sub_trees = if cursor.at(IslandToken::LBrace) {
        sub_trees(cursor)?
    } else {
        Vec::new()
    };

    Ok(PropertyGraphFetchTree {
        property,
        alias,
        parameters,
        sub_type,
        sub_trees,
        source: Some(cursor.span_from(start)),
    })
}
