//! Declaration-level output: packageable elements and the per-source table.

use indexmap::IndexMap;
use smol_str::SmolStr;

use super::value::{Lambda, Multiplicity, ValueSpecification, Variable};
use crate::base::SourceSpan;

/// `<<profile.value>>`
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct StereotypePtr {
    pub profile: SmolStr,
    pub value: SmolStr,
    pub source: Option<SourceSpan>,
}

/// `{profile.tag = 'text'}`
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct TaggedValue {
    pub profile: SmolStr,
    pub tag: SmolStr,
    pub value: String,
    pub source: Option<SourceSpan>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum AggregationKind {
    None,
    Shared,
    Composite,
}

impl AggregationKind {
    pub fn from_keyword(text: &str) -> Option<Self> {
        match text {
            "none" => Some(Self::None),
            "shared" => Some(Self::Shared),
            "composite" => Some(Self::Composite),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Property {
    pub name: SmolStr,
    pub type_name: SmolStr,
    pub multiplicity: Multiplicity,
    pub aggregation: Option<AggregationKind>,
    pub default_value: Option<ValueSpecification>,
    pub stereotypes: Vec<StereotypePtr>,
    pub tagged_values: Vec<TaggedValue>,
    pub source: Option<SourceSpan>,
}

/// A derived property: `name(params) { body }: Type[m];`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct QualifiedProperty {
    pub name: SmolStr,
    pub parameters: Vec<Variable>,
    pub return_type: SmolStr,
    pub return_multiplicity: Multiplicity,
    pub body: Vec<ValueSpecification>,
    pub stereotypes: Vec<StereotypePtr>,
    pub tagged_values: Vec<TaggedValue>,
    pub source: Option<SourceSpan>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Constraint {
    /// Declared name, or the positional index for anonymous constraints.
    pub name: SmolStr,
    pub function_definition: Lambda,
    pub message: Option<Lambda>,
    pub external_id: Option<String>,
    pub enforcement_level: Option<SmolStr>,
    pub source: Option<SourceSpan>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Class {
    pub package: SmolStr,
    pub name: SmolStr,
    pub super_types: Vec<SmolStr>,
    pub properties: Vec<Property>,
    pub qualified_properties: Vec<QualifiedProperty>,
    pub constraints: Vec<Constraint>,
    pub stereotypes: Vec<StereotypePtr>,
    pub tagged_values: Vec<TaggedValue>,
    pub source: Option<SourceSpan>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Association {
    pub package: SmolStr,
    pub name: SmolStr,
    pub properties: Vec<Property>,
    pub qualified_properties: Vec<QualifiedProperty>,
    pub stereotypes: Vec<StereotypePtr>,
    pub tagged_values: Vec<TaggedValue>,
    pub source: Option<SourceSpan>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct EnumValue {
    pub value: SmolStr,
    pub stereotypes: Vec<StereotypePtr>,
    pub tagged_values: Vec<TaggedValue>,
    pub source: Option<SourceSpan>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Enumeration {
    pub package: SmolStr,
    pub name: SmolStr,
    pub values: Vec<EnumValue>,
    pub stereotypes: Vec<StereotypePtr>,
    pub tagged_values: Vec<TaggedValue>,
    pub source: Option<SourceSpan>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Profile {
    pub package: SmolStr,
    pub name: SmolStr,
    pub stereotypes: Vec<SmolStr>,
    pub tags: Vec<SmolStr>,
    pub source: Option<SourceSpan>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Function {
    pub package: SmolStr,
    /// Signature name, e.g. `f_String_1__Integer_1_`.
    pub name: SmolStr,
    pub parameters: Vec<Variable>,
    pub return_type: SmolStr,
    pub return_multiplicity: Multiplicity,
    pub body: Vec<ValueSpecification>,
    pub stereotypes: Vec<StereotypePtr>,
    pub tagged_values: Vec<TaggedValue>,
    pub source: Option<SourceSpan>,
}

/// One unit of a measure, named `Measure~Unit`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Unit {
    pub package: SmolStr,
    pub name: SmolStr,
    pub conversion_function: Option<Lambda>,
    pub source: Option<SourceSpan>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Measure {
    pub package: SmolStr,
    pub name: SmolStr,
    pub canonical_unit: Option<Unit>,
    pub non_canonical_units: Vec<Unit>,
    pub source: Option<SourceSpan>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "_type", rename_all = "camelCase"))]
pub enum PackageableElement {
    Class(Class),
    Association(Association),
    Enumeration(Enumeration),
    Profile(Profile),
    Function(Function),
    Measure(Measure),
}

impl PackageableElement {
    pub fn package(&self) -> &str {
        match self {
            Self::Class(e) => &e.package,
            Self::Association(e) => &e.package,
            Self::Enumeration(e) => &e.package,
            Self::Profile(e) => &e.package,
            Self::Function(e) => &e.package,
            Self::Measure(e) => &e.package,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Class(e) => &e.name,
            Self::Association(e) => &e.name,
            Self::Enumeration(e) => &e.name,
            Self::Profile(e) => &e.name,
            Self::Function(e) => &e.name,
            Self::Measure(e) => &e.name,
        }
    }

    /// `package::name`, or just `name` at the root package.
    pub fn path(&self) -> SmolStr {
        join_path(self.package(), self.name())
    }

    pub fn source(&self) -> Option<&SourceSpan> {
        match self {
            Self::Class(e) => e.source.as_ref(),
            Self::Association(e) => e.source.as_ref(),
            Self::Enumeration(e) => e.source.as_ref(),
            Self::Profile(e) => e.source.as_ref(),
            Self::Function(e) => e.source.as_ref(),
            Self::Measure(e) => e.source.as_ref(),
        }
    }
}

pub(crate) fn join_path(package: &str, name: &str) -> SmolStr {
    if package.is_empty() {
        SmolStr::new(name)
    } else {
        smol_str::format_smolstr!("{}::{}", package, name)
    }
}

/// Everything declared in one source text.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ParsedSource {
    /// Imported packages (`import a::b::*;` gives `a::b`).
    pub imports: Vec<SmolStr>,
    /// Elements keyed by full path, in declaration order.
    pub elements: IndexMap<SmolStr, PackageableElement>,
}

impl ParsedSource {
    pub fn get(&self, path: &str) -> Option<&PackageableElement> {
        self.elements.get(path)
    }

    pub fn class(&self, path: &str) -> Option<&Class> {
        match self.get(path) {
            Some(PackageableElement::Class(c)) => Some(c),
            _ => None,
        }
    }

    pub fn function(&self, path: &str) -> Option<&Function> {
        match self.get(path) {
            Some(PackageableElement::Function(f)) => Some(f),
            _ => None,
        }
    }

    pub fn measure(&self, path: &str) -> Option<&Measure> {
        match self.get(path) {
            Some(PackageableElement::Measure(m)) => Some(m),
            _ => None,
        }
    }

    /// Protocol-style JSON of the whole element table.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_joins_package() {
        let e = PackageableElement::Profile(Profile {
            package: "meta::pure".into(),
            name: "doc".into(),
            stereotypes: vec![],
            tags: vec![],
            source: None,
        });
        assert_eq!(e.path(), "meta::pure::doc");
        assert_eq!(join_path("", "A"), "A");
    }

    #[test]
    fn test_aggregation_keywords() {
        assert_eq!(AggregationKind::from_keyword("composite"), Some(AggregationKind::Composite));
        assert_eq!(AggregationKind::from_keyword("weird"), None);
    }
}
