//! Builder Tests - Declarations
//!
//! Classes, associations, enumerations, profiles, functions, and measures,
//! built from whole source texts into the per-source element table.

#![allow(clippy::unwrap_used)]

use pure_grammar::model::{AggregationKind, Lambda, Multiplicity, PackageableElement, ValueSpecification};
use pure_grammar::{BuilderOptions, ParseError, compile_sources, parse_source};
use rstest::rstest;
use smol_str::SmolStr;

const PERSON: &str = r#"
import a::base::*;

Class <<doc.deprecated>> {doc.doc = 'A person'} a::Person extends a::Party
[
    c1: $this.items->filter(i|$i > 1)->isEmpty(),
    $this.items->map(j|$j)->size() > 0,
    named(~externalId: 'P-1' ~function: $this.name->length() > 0 ~enforcementLevel: Warn ~message: 'name' + $this.name)
]
{
    (composite) name: String[1];
    age: Integer[0..1] = 0;
    items: Integer[*];
    fullName(prefix: String[1]) { $prefix + $this.name }: String[1];
}
"#;

fn parse(text: &str) -> pure_grammar::model::ParsedSource {
    parse_source(text, &BuilderOptions::new("test"))
        .unwrap_or_else(|e| panic!("failed to build source: {e}"))
}

fn lambda_names(values: &[ValueSpecification]) -> Vec<SmolStr> {
    fn walk(value: &ValueSpecification, out: &mut Vec<SmolStr>) {
        match value {
            ValueSpecification::Lambda(Lambda { name, body, .. }) => {
                out.extend(name.clone());
                body.iter().for_each(|v| walk(v, out));
            }
            ValueSpecification::AppliedFunction(f) => f.parameters.iter().for_each(|v| walk(v, out)),
            ValueSpecification::AppliedProperty(p) => p.parameters.iter().for_each(|v| walk(v, out)),
            ValueSpecification::Collection(c) => c.values().iter().for_each(|v| walk(v, out)),
            _ => {}
        }
    }
    let mut out = Vec::new();
    values.iter().for_each(|v| walk(v, &mut out));
    out
}

// ============================================================================
// Classes
// ============================================================================

#[test]
fn test_class_header() {
    let parsed = parse(PERSON);
    assert_eq!(parsed.imports, vec![SmolStr::new("a::base")]);
    let class = parsed.class("a::Person").unwrap();
    assert_eq!(class.package, "a");
    assert_eq!(class.name, "Person");
    assert_eq!(class.super_types, vec![SmolStr::new("a::Party")]);
    assert_eq!(class.stereotypes[0].profile, "doc");
    assert_eq!(class.stereotypes[0].value, "deprecated");
    assert_eq!(class.tagged_values[0].tag, "doc");
    assert_eq!(class.tagged_values[0].value, "A person");
}

#[test]
fn test_class_properties() {
    let parsed = parse(PERSON);
    let class = parsed.class("a::Person").unwrap();
    let names: Vec<_> = class.properties.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["name", "age", "items"]);

    let name = &class.properties[0];
    assert_eq!(name.type_name, "String");
    assert_eq!(name.aggregation, Some(AggregationKind::Composite));

    let age = &class.properties[1];
    assert_eq!(age.multiplicity, Multiplicity::ZERO_ONE);
    match &age.default_value {
        Some(ValueSpecification::Lambda(lambda)) => {
            assert_eq!(lambda.name, None);
            assert!(lambda.parameters.is_empty());
            assert_eq!(lambda.body[0].to_string(), "0");
        }
        other => panic!("expected a default lambda, got {:?}", other),
    }
    assert_eq!(class.properties[2].multiplicity, Multiplicity::ZERO_MANY);
}

#[test]
fn test_qualified_property() {
    let parsed = parse(PERSON);
    let class = parsed.class("a::Person").unwrap();
    let qp = &class.qualified_properties[0];
    assert_eq!(qp.name, "fullName");
    assert_eq!(qp.parameters[0].name, "prefix");
    assert_eq!(qp.parameters[0].type_name.as_deref(), Some("String"));
    assert_eq!(qp.return_type, "String");
    assert_eq!(qp.body[0].to_string(), "plus([$prefix, .name($this)])");
}

#[test]
fn test_constraints() {
    let parsed = parse(PERSON);
    let class = parsed.class("a::Person").unwrap();
    let names: Vec<_> = class.constraints.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["c1", "1", "named"]);

    for constraint in &class.constraints {
        assert_eq!(constraint.function_definition.name, None);
    }
    let c1 = &class.constraints[0];
    assert_eq!(lambda_names(&c1.function_definition.body), ["c1$0"]);
    let anonymous = &class.constraints[1];
    assert_eq!(lambda_names(&anonymous.function_definition.body), ["1$0"]);

    let extended = &class.constraints[2];
    assert_eq!(extended.external_id.as_deref(), Some("P-1"));
    assert_eq!(extended.enforcement_level.as_deref(), Some("Warn"));
    let message = extended.message.as_ref().unwrap();
    assert_eq!(message.name, None);
    assert_eq!(message.body[0].to_string(), "plus(['name', .name($this)])");
}

#[test]
fn test_constraint_message_continues_lambda_numbering() {
    let parsed = parse(
        "Class A\n[\n    c1(~function: $this.items->filter(i|$i > 1)->isEmpty() ~message: $this.items->map(j|$j)->joinStrings())\n]\n{\n    items: Integer[*];\n}",
    );
    let constraint = &parsed.class("A").unwrap().constraints[0];
    assert_eq!(lambda_names(&constraint.function_definition.body), ["c1$0"]);
    let message = constraint.message.as_ref().unwrap();
    assert_eq!(lambda_names(&message.body), ["c1$1"]);
}

#[rstest]
#[case("\nClass A { x: Integer[1]; }")]
#[case("// doc\nClass A { x: Integer[1]; }")]
#[case("/* header */\n\n  Class A { x: Integer[1]; }\n// trailer\n")]
fn test_leading_trivia(#[case] input: &str) {
    let parsed = parse(input);
    assert_eq!(parsed.elements.len(), 1);
    assert_eq!(parsed.class("A").unwrap().properties[0].name, "x");
}

#[test]
fn test_duplicate_element() {
    let err = parse_source("Class a::A {} Class a::A {}", &BuilderOptions::default()).unwrap_err();
    match err {
        ParseError::DuplicateElement { path, span } => {
            assert_eq!(path, "a::A");
            assert_eq!(span.start_column, 15);
        }
        other => panic!("expected a duplicate, got {other}"),
    }
}

// ============================================================================
// Functions
// ============================================================================

#[test]
fn test_function_signature_and_body() {
    let parsed = parse(
        "function a::f(s: String[1], xs: Integer[*]): Boolean[0..1] { $xs->filter(x|$x > 1)->map(y|$y); true }",
    );
    let function = parsed.function("a::f_String_1__Integer_MANY__Boolean_$0_1$_").unwrap();
    assert_eq!(function.package, "a");
    assert_eq!(function.parameters.len(), 2);
    assert_eq!(function.return_type, "Boolean");
    assert_eq!(function.return_multiplicity, Multiplicity::ZERO_ONE);
    assert_eq!(function.body.len(), 2);
    assert_eq!(lambda_names(&function.body), ["a_f$0", "a_f$1"]);
}

#[test]
fn test_function_overloads_coexist() {
    let parsed = parse(
        "function a::g(x: String[1]): String[1] { $x } function a::g(x: Integer[1]): Integer[1] { $x }",
    );
    assert!(parsed.function("a::g_String_1__String_1_").is_some());
    assert!(parsed.function("a::g_Integer_1__Integer_1_").is_some());
    assert_eq!(parsed.elements.len(), 2);
}

#[rstest]
#[case("function h(): Boolean[1] { true }", "h__Boolean_1_")]
#[case("function h(p: a::Person[1..*]): Nil[0] { [] }", "h_Person_$1_MANY$__Nil_0_")]
#[case("function h(m: a::Mass~Gram[2]): Any[*] { $m }", "h_Mass_Gram_2__Any_MANY_")]
fn test_signature_names(#[case] input: &str, #[case] expected: &str) {
    let parsed = parse(input);
    let (path, _) = parsed.elements.first().unwrap();
    assert_eq!(path, expected);
}

// ============================================================================
// Measures
// ============================================================================

#[test]
fn test_convertible_measure() {
    let parsed = parse("Measure pkg::Mass { *Gram: x -> $x; Kilogram: x -> $x * 1000; }");
    let measure = parsed.measure("pkg::Mass").unwrap();
    let canonical = measure.canonical_unit.as_ref().unwrap();
    assert_eq!(canonical.name, "Mass~Gram");
    assert_eq!(canonical.package, "pkg");
    let conversion = canonical.conversion_function.as_ref().unwrap();
    assert_eq!(conversion.name.as_deref(), Some("pkg_Mass~Gram$0"));
    assert_eq!(conversion.parameters[0].name, "x");

    let kilogram = &measure.non_canonical_units[0];
    assert_eq!(kilogram.name, "Mass~Kilogram");
    let conversion = kilogram.conversion_function.as_ref().unwrap();
    assert_eq!(conversion.name.as_deref(), Some("pkg_Mass~Kilogram$0"));
    assert_eq!(conversion.body[0].to_string(), "times([$x, 1000])");
}

#[test]
fn test_non_convertible_measure() {
    let parsed = parse("Measure C { USD; GBP; }");
    let measure = parsed.measure("C").unwrap();
    assert_eq!(measure.canonical_unit.as_ref().unwrap().name, "C~USD");
    let others: Vec<_> = measure.non_canonical_units.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(others, ["C~GBP"]);
    assert!(measure.non_canonical_units[0].conversion_function.is_none());
}

#[test]
fn test_two_canonical_units_are_rejected() {
    let err = parse_source("Measure M { *A: x -> $x; *B: x -> $x; }", &BuilderOptions::default()).unwrap_err();
    assert!(matches!(err, ParseError::UnsupportedSyntax { .. }));
}

// ============================================================================
// Enumerations, profiles, associations
// ============================================================================

#[test]
fn test_enum_profile_association() {
    let parsed = parse(
        r#"
        Profile a::doc { stereotypes: [deprecated]; tags: [doc, todo]; }
        Enum a::Color { <<doc.deprecated>> RED, GREEN }
        Association a::Employment { employer: a::Firm[1]; employees: a::Person[*]; }
        "#,
    );
    let kinds: Vec<_> = parsed
        .elements
        .values()
        .map(|e| match e {
            PackageableElement::Profile(_) => "profile",
            PackageableElement::Enumeration(_) => "enum",
            PackageableElement::Association(_) => "association",
            _ => "other",
        })
        .collect();
    assert_eq!(kinds, ["profile", "enum", "association"]);

    let Some(PackageableElement::Profile(profile)) = parsed.get("a::doc") else {
        panic!("expected a profile");
    };
    assert_eq!(profile.stereotypes, vec![SmolStr::new("deprecated")]);
    assert_eq!(profile.tags.len(), 2);

    let Some(PackageableElement::Enumeration(color)) = parsed.get("a::Color") else {
        panic!("expected an enumeration");
    };
    assert_eq!(color.values[0].value, "RED");
    assert_eq!(color.values[0].stereotypes[0].value, "deprecated");
    assert!(color.values[1].stereotypes.is_empty());

    let Some(PackageableElement::Association(employment)) = parsed.get("a::Employment") else {
        panic!("expected an association");
    };
    assert_eq!(employment.properties[1].type_name, "a::Person");
    assert_eq!(employment.properties[1].multiplicity, Multiplicity::ZERO_MANY);
}

// ============================================================================
// Batches
// ============================================================================

#[test]
fn test_compile_sources_keeps_order_and_ids() {
    let sources = vec![
        (SmolStr::new("one.pure"), "Class a::A { x: Integer[1]; }".to_string()),
        (SmolStr::new("two.pure"), "Class a::B { x: Integer[1] }".to_string()),
        (SmolStr::new("three.pure"), "Enum a::E { X }".to_string()),
    ];
    let results = compile_sources(&sources, &BuilderOptions::default());
    assert_eq!(results.len(), 3);

    let first = results[0].as_ref().unwrap();
    let class = first.class("a::A").unwrap();
    assert_eq!(class.source.as_ref().unwrap().source_id, "one.pure");

    let err = results[1].as_ref().unwrap_err();
    assert_eq!(err.span().source_id, "two.pure");
    assert!(matches!(err, ParseError::Syntax { .. }));

    assert!(results[2].as_ref().unwrap().get("a::E").is_some());
}

#[cfg(feature = "serde")]
#[test]
fn test_protocol_json() {
    let parsed = parse("Class a::A { x: Integer[1] = 1 + 2; }");
    let json: serde_json::Value = serde_json::from_str(&parsed.to_json().unwrap()).unwrap();
    let class = &json["elements"]["a::A"];
    assert_eq!(class["_type"], "class");
    let default = &class["properties"][0]["defaultValue"];
    assert_eq!(default["_type"], "lambda");
    assert_eq!(default["body"][0]["_type"], "func");
    assert_eq!(default["body"][0]["function"], "plus");
}
