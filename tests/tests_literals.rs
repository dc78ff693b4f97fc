//! Builder Tests - Literals
//!
//! Scalar literal tokens, the date and strict-time scanners, and
//! multiplicities.

#![allow(clippy::unwrap_used)]

use pure_grammar::builder::{ParseError, scan_date, scan_strict_time};
use pure_grammar::model::{Multiplicity, ValueSpecification};
use pure_grammar::{BuilderOptions, SourceSpan, parse_expression, parse_source};
use rstest::rstest;

fn build(text: &str) -> ValueSpecification {
    parse_expression(text, &BuilderOptions::default())
        .unwrap_or_else(|e| panic!("failed to build {text}: {e}"))
}

fn span() -> SourceSpan {
    SourceSpan::new("t", 1, 1, 1, 10)
}

// ============================================================================
// Scalars
// ============================================================================

#[test]
fn test_scalar_literals() {
    assert!(matches!(build("42"), ValueSpecification::CInteger { value: 42, .. }));
    assert!(matches!(build("true"), ValueSpecification::CBoolean { value: true, .. }));
    assert!(matches!(build("false"), ValueSpecification::CBoolean { value: false, .. }));
    assert!(matches!(build("%latest"), ValueSpecification::CLatestDate { .. }));
    match build("1.5") {
        ValueSpecification::CFloat { value, .. } => assert!((value - 1.5).abs() < f64::EPSILON),
        other => panic!("expected a float, got {other}"),
    }
}

#[rstest]
#[case("'plain'", "plain")]
#[case(r"'it\'s'", "it's")]
#[case("''", "")]
fn test_string_literals(#[case] input: &str, #[case] expected: &str) {
    match build(input) {
        ValueSpecification::CString { value, .. } => assert_eq!(value, expected),
        other => panic!("expected a string, got {other}"),
    }
}

#[rstest]
#[case("1.5d", "1.5")]
#[case("3D", "3")]
fn test_decimal_literals_keep_text(#[case] input: &str, #[case] expected: &str) {
    match build(input) {
        ValueSpecification::CDecimal { value, .. } => assert_eq!(value, expected),
        other => panic!("expected a decimal, got {other}"),
    }
}

#[test]
fn test_integer_overflow_is_reported() {
    let err = parse_expression("99999999999999999999", &BuilderOptions::default()).unwrap_err();
    assert!(matches!(err, ParseError::InvalidNumberLiteral { .. }));
}

// ============================================================================
// Dates and times
// ============================================================================

#[rstest]
#[case("%2020", "dateTime", "2020")]
#[case("%2020-01", "dateTime", "2020-01")]
#[case("%2020-01-01", "strictDate", "2020-01-01")]
#[case("%2020-01-01T10:00:00", "dateTime", "2020-01-01T10:00:00")]
#[case("%2020-01-01T10:00:00+0100", "dateTime", "2020-01-01T10:00:00+0100")]
#[case("%10:30", "strictTime", "10:30")]
#[case("%10:30:15.250", "strictTime", "10:30:15.250")]
fn test_date_and_time_literals(#[case] input: &str, #[case] kind: &str, #[case] text: &str) {
    let (actual_kind, value) = match build(input) {
        ValueSpecification::CDateTime { value, .. } => ("dateTime", value),
        ValueSpecification::CStrictDate { value, .. } => ("strictDate", value),
        ValueSpecification::CStrictTime { value, .. } => ("strictTime", value),
        other => panic!("expected a date, got {other}"),
    };
    assert_eq!(actual_kind, kind);
    assert_eq!(value, text);
}

#[rstest]
#[case("%2020-", "")]
#[case("%2020-01-", "")]
#[case("%2020-01-01X", "X")]
#[case("%2020-01-01 10:00", " 10:00")]
#[case("%-", "-")]
fn test_malformed_dates(#[case] input: &str, #[case] offending: &str) {
    let err = scan_date(input, span()).unwrap_err();
    assert_eq!(err.span(), &span());
    match err {
        ParseError::InvalidDateLiteral { text, .. } => assert_eq!(text, offending, "{input}"),
        other => panic!("expected a date error for {input}, got {other}"),
    }
}

#[rstest]
#[case("%10:", "")]
#[case("%10:30:", "")]
#[case("%10:30:15.", "")]
#[case("%1a", "a")]
#[case("%10-30", "-30")]
fn test_malformed_times(#[case] input: &str, #[case] offending: &str) {
    match scan_strict_time(input, span()).unwrap_err() {
        ParseError::InvalidTimeLiteral { text, .. } => assert_eq!(text, offending, "{input}"),
        other => panic!("expected a time error for {input}, got {other}"),
    }
}

// ============================================================================
// Multiplicities
// ============================================================================

#[rstest]
#[case("[1]", Multiplicity::new(1, Some(1)))]
#[case("[*]", Multiplicity::new(0, None))]
#[case("[1..*]", Multiplicity::new(1, None))]
#[case("[2..5]", Multiplicity::new(2, Some(5)))]
#[case("[0..1]", Multiplicity::ZERO_ONE)]
#[case("[5]", Multiplicity::exactly(5))]
fn test_property_multiplicities(#[case] input: &str, #[case] expected: Multiplicity) {
    let text = format!("Class A {{ p: String{input}; }}");
    let parsed = parse_source(&text, &BuilderOptions::default()).unwrap();
    let class = parsed.class("A").unwrap();
    assert_eq!(class.properties[0].multiplicity, expected);
}
