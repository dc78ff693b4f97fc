//! Value-specification builder: typed CST to output model.
//!
//! This module provides the compile entry points:
//! - [`parse_source`] - a whole source text to a [`ParsedSource`]
//! - [`parse_expression`] - a standalone expression to a [`ValueSpecification`]
//! - [`compile_sources`] - independent source texts, compiled in parallel
//!
//! Internally, declaration builders drive the [`ExpressionBuilder`], which
//! uses the precedence merger for operator runs, the literal scanners for
//! literal tokens, and the [`IslandRegistry`] for embedded fragments.

mod declarations;
mod error;
mod expression;
mod island;
mod lambda;
mod literals;
mod multiplicity;
mod options;
mod precedence;
mod source;

use rayon::prelude::*;
use smol_str::SmolStr;
use tracing::debug;

pub use declarations::{DeclarationBuilder, signature_name};
pub use error::{ParseError, Result};
pub use expression::{ExpressionBuilder, PRIMITIVE_TYPES, type_name};
pub use island::{
    GRAPH_FETCH_TAG, GraphFetchGrammar, IslandGrammar, IslandRegistry, NAVIGATION_TAG,
    NavigationGrammar,
};
pub use lambda::LambdaContext;
pub use literals::{build_literal, scan_date, scan_strict_time, unquote};
pub use multiplicity::build_multiplicity;
pub use options::{BuilderOptions, DEFAULT_MAX_DEPTH};
pub use precedence::{Arity, ArithmeticOp, BooleanOp, MergeOperator, Part, merge};
pub use source::{SpanResolver, TranslationContext};

use crate::model::{ParsedSource, ValueSpecification};
use crate::parser::{self, AstNode, Parse, parse_pure_with_depth};

/// Declaration shell a standalone expression is wrapped in.
const EXPRESSION_PREFIX: &str = "function __expression__():Any[*]{";
const EXPRESSION_SUFFIX: &str = "\n}";

/// Lambda owner for standalone expressions without a source id.
const EXPRESSION_OWNER: &str = "expression";

/// Compile a whole source text with the built-in island grammars.
pub fn parse_source(text: &str, options: &BuilderOptions) -> Result<ParsedSource> {
    parse_source_with(text, options, &IslandRegistry::default())
}

/// Compile a whole source text with a caller-supplied island registry.
pub fn parse_source_with(text: &str, options: &BuilderOptions, islands: &IslandRegistry) -> Result<ParsedSource> {
    debug!(source = %options.source_id, len = text.len(), "parse source");
    let spans = SpanResolver::new(text, TranslationContext::from_options(options));
    let parse = parse_pure_with_depth(text, options.max_depth);
    check_syntax(&parse, &spans, options)?;
    let Some(file) = parser::SourceFile::cast(parse.syntax()) else {
        return Ok(ParsedSource::default());
    };
    DeclarationBuilder::new(&spans, options, islands).source_file(&file)
}

/// Compile one standalone expression.
///
/// The expression is wrapped in a synthetic function declaration; the first
/// line's column offset is shifted back by the wrapper's length, so spans
/// point into `text` itself.
pub fn parse_expression(text: &str, options: &BuilderOptions) -> Result<ValueSpecification> {
    parse_expression_with(text, options, &IslandRegistry::default())
}

pub fn parse_expression_with(
    text: &str,
    options: &BuilderOptions,
    islands: &IslandRegistry,
) -> Result<ValueSpecification> {
    debug!(source = %options.source_id, len = text.len(), "parse expression");
    let wrapped = format!("{}{}{}", EXPRESSION_PREFIX, text, EXPRESSION_SUFFIX);
    let mut context = TranslationContext::from_options(options);
    context.column_offset -= EXPRESSION_PREFIX.chars().count() as i64;
    let spans = SpanResolver::new(&wrapped, context);

    let parse = parse_pure_with_depth(&wrapped, options.max_depth);
    check_syntax(&parse, &spans, options)?;

    let whole = spans.span(parse.syntax().text_range());
    let block = parse
        .syntax()
        .descendants()
        .find_map(parser::CodeBlock::cast)
        .ok_or_else(|| ParseError::unsupported("expected an expression", whole.clone()))?;
    let mut lines = block.lines();
    let (Some(line), None) = (lines.next(), lines.next()) else {
        return Err(ParseError::unsupported("expected a single expression", whole));
    };

    let owner = if options.source_id.is_empty() {
        EXPRESSION_OWNER
    } else {
        options.source_id.as_str()
    };
    let mut lambdas = LambdaContext::new(owner);
    ExpressionBuilder::new(&spans, options, islands, &mut lambdas).program_line(&line)
}

/// Compile independent source texts in parallel, one result per input.
///
/// Each text is its own compile unit; `options.source_id` is replaced by the
/// text's id.
pub fn compile_sources(sources: &[(SmolStr, String)], options: &BuilderOptions) -> Vec<Result<ParsedSource>> {
    debug!(count = sources.len(), "compile sources");
    let islands = IslandRegistry::default();
    sources
        .par_iter()
        .map(|(id, text)| {
            let options = options.clone().with_source_id(id.clone());
            parse_source_with(text, &options, &islands)
        })
        .collect()
}

/// Fail on the first syntax error of `parse`.
fn check_syntax(parse: &Parse, spans: &SpanResolver, options: &BuilderOptions) -> Result<()> {
    match parse.errors.first() {
        Some(error) => {
            debug!(count = parse.errors.len(), first = %error.message, "syntax errors");
            Err(ParseError::from_syntax(error, spans.span(error.range), options.max_depth))
        }
        None => Ok(()),
    }
}
