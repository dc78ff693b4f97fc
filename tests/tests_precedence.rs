//! Builder Tests - Operator Precedence
//!
//! Flat operator runs from the grammar, merged into call trees. Arithmetic
//! operators are unranked among themselves; relational operators bind
//! looser than all of them, and `||` looser than `&&`.

#![allow(clippy::unwrap_used)]

use pure_grammar::model::ValueSpecification;
use pure_grammar::{BuilderOptions, parse_expression};
use rstest::rstest;

fn render(text: &str) -> String {
    parse_expression(text, &BuilderOptions::default())
        .unwrap_or_else(|e| panic!("failed to build {text}: {e}"))
        .to_string()
}

// ============================================================================
// Arithmetic and relational
// ============================================================================

#[rstest]
#[case("1+2*3", "times([plus([1, 2]), 3])")]
#[case("1*2+3", "plus([times([1, 2]), 3])")]
#[case("1+2+3", "plus([1, 2, 3])")]
#[case("1*2*3", "times([1, 2, 3])")]
#[case("1-2-3", "minus([1, 2, 3])")]
#[case("1+2-3", "minus([plus([1, 2]), 3])")]
#[case("8/4/2", "divide(divide(8, 4), 2)")]
#[case("8/4+1", "plus([divide(8, 4), 1])")]
#[case("1+8/4", "divide(plus([1, 8]), 4)")]
fn test_arithmetic_is_left_to_right(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(render(input), expected);
}

#[rstest]
#[case("1<2+3", "lessThan(1, plus([2, 3]))")]
#[case("1+2<3", "lessThan(plus([1, 2]), 3)")]
#[case("1+2<=3*4", "lessThanEqual(plus([1, 2]), times([3, 4]))")]
#[case("1>2*3+4", "greaterThan(1, plus([times([2, 3]), 4]))")]
#[case("1>=2/4", "greaterThanEqual(1, divide(2, 4))")]
#[case("1<2<3", "lessThan(lessThan(1, 2), 3)")]
fn test_relational_binds_loosest(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(render(input), expected);
}

#[rstest]
#[case("(1+2)*3", "times([plus([1, 2]), 3])")]
#[case("1*(2+3)", "times([1, plus([2, 3])])")]
#[case("(1<2)+3", "plus([lessThan(1, 2), 3])")]
#[case("2 - -1", "minus([2, minus([1])])")]
fn test_groups_and_signs(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(render(input), expected);
}

// ============================================================================
// Boolean and equality
// ============================================================================

#[rstest]
#[case("$a && $b || $c", "or(and($a, $b), $c)")]
#[case("$a || $b && $c", "or($a, and($b, $c))")]
#[case("$a || $b || $c", "or(or($a, $b), $c)")]
#[case("$a && $b && $c", "and(and($a, $b), $c)")]
#[case("!$a && $b", "and(not($a), $b)")]
fn test_boolean_ranks(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(render(input), expected);
}

#[rstest]
#[case("$a == $b", "equal($a, $b)")]
#[case("$a != $b", "not(equal($a, $b))")]
#[case("$a + 1 == $b", "equal(plus([$a, 1]), $b)")]
#[case("$a == $b + 1", "equal($a, plus([$b, 1]))")]
#[case("1 + 2 > 2 && $x", "and(greaterThan(plus([1, 2]), 2), $x)")]
#[case("$a == 1 || $b != 2 && $c", "or(equal($a, 1), and(not(equal($b, 2)), $c))")]
fn test_equality_sits_between_arithmetic_and_boolean(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(render(input), expected);
}

#[test]
fn test_nary_collection_multiplicity() {
    let value = parse_expression("1+2+3+4", &BuilderOptions::default()).unwrap();
    let ValueSpecification::AppliedFunction(plus) = value else {
        panic!("expected a call");
    };
    assert_eq!(plus.parameters.len(), 1);
    let ValueSpecification::Collection(operands) = &plus.parameters[0] else {
        panic!("expected a collection");
    };
    assert_eq!(operands.values().len(), 4);
    assert_eq!(operands.multiplicity().lower, 4);
    assert_eq!(operands.multiplicity().upper, Some(4));
}
