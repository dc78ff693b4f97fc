//! Output model of the builder.
//!
//! - [`ValueSpecification`] - the expression AST
//! - [`PackageableElement`] - declarations (classes, functions, measures, ...)
//! - [`ParsedSource`] - the element table of one compiled source text
//!
//! With the `serde` feature every type serializes to protocol-style JSON,
//! discriminated by a `_type` field.

mod element;
mod value;

pub use element::{
    AggregationKind, Association, Class, Constraint, EnumValue, Enumeration, Function, Measure,
    PackageableElement, ParsedSource, Profile, Property, QualifiedProperty, StereotypePtr,
    TaggedValue, Unit,
};
pub(crate) use element::join_path;
pub use value::{
    AppliedFunction, AppliedProperty, Collection, IslandValue, Lambda, Multiplicity,
    NavigationPath, PathElement, PropertyGraphFetchTree, ReferenceHint, RootGraphFetchTree,
    ValueSpecification, Variable,
};
