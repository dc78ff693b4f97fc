//! Builder Tests - Islands
//!
//! Graph fetch trees and navigation paths embedded in expressions, result
//! cardinality checks, and caller-registered grammars.

#![allow(clippy::unwrap_used)]

use pure_grammar::builder::{GRAPH_FETCH_TAG, NAVIGATION_TAG, Result};
use pure_grammar::model::{IslandValue, NavigationPath, RootGraphFetchTree, ValueSpecification};
use pure_grammar::{
    BuilderOptions, IslandGrammar, IslandRegistry, ParseError, SourceSpan, TranslationContext, parse_expression,
    parse_expression_with, parse_source_with,
};

fn build(text: &str) -> Result<ValueSpecification> {
    parse_expression(text, &BuilderOptions::new("q"))
}

fn graph(value: ValueSpecification) -> RootGraphFetchTree {
    match value {
        ValueSpecification::ClassInstance { type_tag, value, .. } => {
            assert_eq!(type_tag, GRAPH_FETCH_TAG);
            match *value {
                IslandValue::RootGraphFetchTree(tree) => tree,
                other => panic!("expected a graph fetch tree, got {:?}", other),
            }
        }
        other => panic!("expected a class instance, got {other}"),
    }
}

fn path(value: &ValueSpecification) -> &NavigationPath {
    match value {
        ValueSpecification::ClassInstance { type_tag, value, .. } => {
            assert_eq!(type_tag, NAVIGATION_TAG);
            match value.as_ref() {
                IslandValue::Path(path) => path,
                other => panic!("expected a path, got {:?}", other),
            }
        }
        other => panic!("expected a class instance, got {other}"),
    }
}

// ============================================================================
// Graph fetch
// ============================================================================

#[test]
fn test_graph_fetch_tree() {
    let tree = graph(build("#{a::Person{name, 'employer': firm{legalName}}}#").unwrap());
    assert_eq!(tree.class, "a::Person");
    assert_eq!(tree.sub_trees.len(), 2);
    assert_eq!(tree.sub_trees[1].alias.as_deref(), Some("employer"));
    assert_eq!(tree.sub_trees[1].sub_trees[0].property, "legalName");
}

#[test]
fn test_graph_fetch_as_function_argument() {
    let value = build("a::Person.all()->graphFetch(#{a::Person{name}}#)").unwrap();
    let ValueSpecification::AppliedFunction(call) = value else {
        panic!("expected a call");
    };
    assert_eq!(call.function, "graphFetch");
    assert_eq!(call.parameters[0].to_string(), "getAll(a::Person)");
    assert_eq!(call.parameters[1].to_string(), format!("#{}", GRAPH_FETCH_TAG));
}

#[test]
fn test_graph_fetch_root_span() {
    let tree = graph(build("#{A{x}}#").unwrap());
    assert_eq!(tree.source, Some(SourceSpan::new("q", 1, 3, 1, 6)));
    assert_eq!(tree.sub_trees[0].source, Some(SourceSpan::new("q", 1, 5, 1, 5)));
}

#[test]
fn test_two_roots_are_ambiguous() {
    let err = build("#{A{x}, B{y}}#").unwrap_err();
    match err {
        ParseError::AmbiguousIslandResult { grammar, count, span } => {
            assert_eq!(grammar, GRAPH_FETCH_TAG);
            assert_eq!(count, 2);
            assert_eq!(span, SourceSpan::new("q", 1, 1, 1, 14));
        }
        other => panic!("expected an ambiguous result, got {other}"),
    }
}

#[test]
fn test_empty_island() {
    let err = build("#{ }#").unwrap_err();
    assert!(matches!(err, ParseError::MissingIslandContent { .. }));
}

#[test]
fn test_island_error_is_reported_in_outer_coordinates() {
    let err = build("#{A{x}#").unwrap_err();
    assert!(matches!(err, ParseError::Island { .. }));
    assert_eq!(err.span().start_line, 1);
    assert_eq!(err.span().start_column, 6);
}

// ============================================================================
// Navigation
// ============================================================================

#[test]
fn test_navigation_path() {
    let value = build("#/a::Person/firm/employees('x')!staff#").unwrap();
    let nav = path(&value);
    assert_eq!(nav.start_type, "a::Person");
    let steps: Vec<_> = nav.path.iter().map(|e| e.property.as_str()).collect();
    assert_eq!(steps, ["firm", "employees"]);
    assert_eq!(nav.path[1].parameters[0].to_string(), "'x'");
    assert_eq!(nav.name.as_deref(), Some("staff"));
}

#[test]
fn test_navigation_on_second_line() {
    let value = build("[1,\n#/p::A/name#]").unwrap();
    let ValueSpecification::Collection(values) = value else {
        panic!("expected a collection");
    };
    let nav = path(&values.values()[1]);
    assert_eq!(nav.source, Some(SourceSpan::new("q", 2, 3, 2, 11)));
}

#[test]
fn test_navigation_without_steps() {
    let err = build("#/a::Person#").unwrap_err();
    assert!(matches!(err, ParseError::Island { .. }));
}

// ============================================================================
// Registered grammars
// ============================================================================

/// Replaces the navigation grammar with one returning the text verbatim.
struct Verbatim;

impl IslandGrammar for Verbatim {
    fn tag(&self) -> &'static str {
        NAVIGATION_TAG
    }

    fn parse(&self, text: &str, ctx: &TranslationContext) -> Result<Vec<ValueSpecification>> {
        let span = ctx.resolve(
            pure_grammar::LineCol::new(1, 0),
            pure_grammar::LineCol::new(1, text.chars().count() as u32),
        );
        Ok(vec![ValueSpecification::string(text, Some(span))])
    }
}

#[test]
fn test_registered_grammar_replaces_builtin() {
    let mut registry = IslandRegistry::default();
    registry.register(Verbatim);
    let value = parse_expression_with("#/any text#", &BuilderOptions::new("q"), &registry).unwrap();
    match value {
        ValueSpecification::CString { value, source } => {
            assert_eq!(value, "any text");
            assert_eq!(source, Some(SourceSpan::new("q", 1, 3, 1, 10)));
        }
        other => panic!("expected a string, got {other}"),
    }
}

#[test]
fn test_registered_grammar_in_source() {
    let mut registry = IslandRegistry::default();
    registry.register(Verbatim);
    let parsed = parse_source_with(
        "function a::f(): Any[1]\n{\n  #/x/y#\n}",
        &BuilderOptions::new("s"),
        &registry,
    )
    .unwrap();
    let function = parsed.function("a::f__Any_1_").unwrap();
    assert_eq!(function.body[0].source(), Some(&SourceSpan::new("s", 3, 5, 3, 7)));
}

#[test]
fn test_missing_grammar_is_unsupported() {
    let err = parse_expression_with("#/a::B/c#", &BuilderOptions::default(), &IslandRegistry::empty()).unwrap_err();
    assert!(matches!(err, ParseError::UnsupportedSyntax { .. }));
}
