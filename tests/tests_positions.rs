//! Builder Tests - Source Positions
//!
//! Absolute spans for standalone expressions and source texts, line and
//! column offsets, syntax errors, and builder limits.

#![allow(clippy::unwrap_used)]

use pure_grammar::model::ValueSpecification;
use pure_grammar::parser::ErrorCode;
use pure_grammar::{BuilderOptions, DEFAULT_MAX_DEPTH, ParseError, SourceSpan, parse_expression, parse_source};
use rstest::rstest;

fn operands(value: &ValueSpecification) -> Vec<SourceSpan> {
    let ValueSpecification::AppliedFunction(call) = value else {
        panic!("expected a call, got {value}");
    };
    let ValueSpecification::Collection(collection) = &call.parameters[0] else {
        panic!("expected a collection");
    };
    collection
        .values()
        .iter()
        .map(|v| v.source().cloned().unwrap())
        .collect()
}

// ============================================================================
// Expressions
// ============================================================================

#[test]
fn test_expression_spans_point_into_the_expression() {
    let value = parse_expression("1 + 2", &BuilderOptions::new("e")).unwrap();
    assert_eq!(value.source(), Some(&SourceSpan::new("e", 1, 1, 1, 5)));
    assert_eq!(
        operands(&value),
        vec![SourceSpan::new("e", 1, 1, 1, 1), SourceSpan::new("e", 1, 5, 1, 5)]
    );
}

#[test]
fn test_offsets_shift_first_line_columns_only() {
    let options = BuilderOptions::new("e").with_offsets(10, 3);
    let value = parse_expression("1 +\n  22", &options).unwrap();
    assert_eq!(
        operands(&value),
        vec![SourceSpan::new("e", 11, 4, 11, 4), SourceSpan::new("e", 12, 3, 12, 4)]
    );
}

#[rstest]
#[case("'abc'", SourceSpan::new("e", 1, 1, 1, 5))]
#[case("$p.name", SourceSpan::new("e", 1, 1, 1, 7))]
#[case("$p->f(1)", SourceSpan::new("e", 1, 1, 1, 8))]
#[case("  true", SourceSpan::new("e", 1, 3, 1, 6))]
fn test_whole_expression_span(#[case] input: &str, #[case] expected: SourceSpan) {
    let value = parse_expression(input, &BuilderOptions::new("e")).unwrap();
    assert_eq!(value.source(), Some(&expected));
}

#[test]
fn test_property_receiver_keeps_its_own_span() {
    let value = parse_expression("$person.name", &BuilderOptions::new("e")).unwrap();
    let ValueSpecification::AppliedProperty(property) = &value else {
        panic!("expected a property");
    };
    assert_eq!(property.parameters[0].source(), Some(&SourceSpan::new("e", 1, 1, 1, 7)));
    assert_eq!(property.source, Some(SourceSpan::new("e", 1, 1, 1, 12)));
}

#[test]
fn test_source_spans() {
    let parsed = parse_source("Class a::A\n{\n  name: String[1];\n}", &BuilderOptions::new("s")).unwrap();
    let class = parsed.class("a::A").unwrap();
    assert_eq!(class.source, Some(SourceSpan::new("s", 1, 1, 4, 1)));
    assert_eq!(class.properties[0].source, Some(SourceSpan::new("s", 3, 3, 3, 18)));
}

// ============================================================================
// Errors and limits
// ============================================================================

#[test]
fn test_syntax_error_code_and_span() {
    let err = parse_source("Class A { name: String[1] }", &BuilderOptions::new("s")).unwrap_err();
    match err {
        ParseError::Syntax { code, span, hint, .. } => {
            assert_eq!(code, ErrorCode::E0201);
            assert_eq!(span, SourceSpan::new("s", 1, 27, 1, 27));
            assert!(hint.is_some_and(|h| h.contains("';'")));
        }
        other => panic!("expected a syntax error, got {other}"),
    }
}

#[test]
fn test_syntax_error_in_expression_uses_expression_columns() {
    let err = parse_expression("1 + )", &BuilderOptions::new("e")).unwrap_err();
    assert!(matches!(err, ParseError::Syntax { .. }));
    assert_eq!(err.span().start_line, 1);
    assert_eq!(err.span().start_column, 5);
}

#[test]
fn test_multiple_lines_are_rejected() {
    let err = parse_expression("1; 2", &BuilderOptions::default()).unwrap_err();
    assert!(matches!(err, ParseError::UnsupportedSyntax { .. }));
}

#[test]
fn test_nesting_limit() {
    let options = BuilderOptions::default().with_max_depth(16);
    let text = format!("{}1{}", "[".repeat(20), "]".repeat(20));
    let err = parse_expression(&text, &options).unwrap_err();
    assert!(matches!(err, ParseError::NestingTooDeep { max_depth: 16, .. }));

    let shallow = format!("{}1{}", "[".repeat(4), "]".repeat(4));
    assert!(parse_expression(&shallow, &options).is_ok());
}

#[test]
fn test_default_nesting_limit_is_reported() {
    let nested = |n: usize| format!("{}1{}", "(".repeat(n), ")".repeat(n));
    let err = parse_expression(&nested(DEFAULT_MAX_DEPTH + 1), &BuilderOptions::new("e")).unwrap_err();
    match err {
        ParseError::NestingTooDeep { max_depth, span } => {
            assert_eq!(max_depth, DEFAULT_MAX_DEPTH);
            assert_eq!((span.start_line, span.start_column), (1, DEFAULT_MAX_DEPTH as u32 + 1));
        }
        other => panic!("expected a nesting error, got {other}"),
    }

    let deepest = parse_expression(&nested(DEFAULT_MAX_DEPTH - 1), &BuilderOptions::new("e")).unwrap();
    assert_eq!(deepest.to_string(), "1");
}

#[test]
fn test_deep_source_nesting_is_reported() {
    let text = format!("function a::f(): Any[1]\n{{\n  {}true\n}}", "!".repeat(DEFAULT_MAX_DEPTH * 2));
    let err = parse_source(&text, &BuilderOptions::new("s")).unwrap_err();
    assert!(matches!(err, ParseError::NestingTooDeep { .. }));
    assert_eq!(err.span().start_line, 3);
}

#[rstest]
#[case(false, None)]
#[case(true, Some("get($m, 'k')"))]
fn test_property_brackets_flag(#[case] allow: bool, #[case] expected: Option<&str>) {
    let options = BuilderOptions::default().with_property_brackets(allow);
    let result = parse_expression("$m['k']", &options);
    match expected {
        Some(text) => assert_eq!(result.unwrap().to_string(), text),
        None => assert!(matches!(result, Err(ParseError::UnsupportedSyntax { .. }))),
    }
}
