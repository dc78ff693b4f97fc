//! Value specifications: the expression AST produced by the builder.

use std::fmt;

use smol_str::SmolStr;

use crate::base::SourceSpan;

/// Cardinality bound attached to typed values and parameters.
///
/// `upper = None` means unbounded (`*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Multiplicity {
    pub lower: u32,
    pub upper: Option<u32>,
}

impl Multiplicity {
    pub const PURE_ONE: Multiplicity = Multiplicity { lower: 1, upper: Some(1) };
    pub const ZERO_ONE: Multiplicity = Multiplicity { lower: 0, upper: Some(1) };
    pub const ZERO_MANY: Multiplicity = Multiplicity { lower: 0, upper: None };

    pub fn new(lower: u32, upper: Option<u32>) -> Self {
        Self { lower, upper }
    }

    pub fn exactly(n: u32) -> Self {
        Self { lower: n, upper: Some(n) }
    }

    pub fn is_unbounded(&self) -> bool {
        self.upper.is_none()
    }
}

impl Default for Multiplicity {
    fn default() -> Self {
        Self::PURE_ONE
    }
}

impl fmt::Display for Multiplicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upper {
            None if self.lower == 0 => write!(f, "[*]"),
            None => write!(f, "[{}..*]", self.lower),
            Some(upper) if upper == self.lower => write!(f, "[{}]", upper),
            Some(upper) => write!(f, "[{}..{}]", self.lower, upper),
        }
    }
}

/// How much the builder knows about what a bare qualified name refers to.
///
/// Resolution happens in a later phase; `Unresolved` is a valid output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum ReferenceHint {
    #[default]
    Unresolved,
    /// Established by an `all()`-family suffix.
    Class,
}

/// A variable reference or a declared parameter.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Variable {
    pub name: SmolStr,
    pub type_name: Option<SmolStr>,
    pub multiplicity: Option<Multiplicity>,
    pub source: Option<SourceSpan>,
}

impl Variable {
    pub fn new(name: impl Into<SmolStr>, source: Option<SourceSpan>) -> Self {
        Self {
            name: name.into(),
            type_name: None,
            multiplicity: None,
            source,
        }
    }

    pub fn typed(
        name: impl Into<SmolStr>,
        type_name: impl Into<SmolStr>,
        multiplicity: Multiplicity,
        source: Option<SourceSpan>,
    ) -> Self {
        Self {
            name: name.into(),
            type_name: Some(type_name.into()),
            multiplicity: Some(multiplicity),
            source,
        }
    }
}

/// An anonymous function.
///
/// Lambdas written inline carry a synthetic name unique within their
/// declaration; bodies wrapped by declarations (constraints, defaults) don't.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Lambda {
    pub name: Option<SmolStr>,
    pub parameters: Vec<Variable>,
    pub body: Vec<ValueSpecification>,
    pub source: Option<SourceSpan>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct AppliedFunction {
    pub function: SmolStr,
    pub parameters: Vec<ValueSpecification>,
    pub source: Option<SourceSpan>,
}

/// Member access. The first parameter is always the receiver.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct AppliedProperty {
    pub property: SmolStr,
    pub parameters: Vec<ValueSpecification>,
    pub source: Option<SourceSpan>,
}

/// An ordered sequence; its multiplicity is always its length.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", from = "CollectionRepr"))]
pub struct Collection {
    multiplicity: Multiplicity,
    values: Vec<ValueSpecification>,
    pub source: Option<SourceSpan>,
}

impl Collection {
    pub fn new(values: Vec<ValueSpecification>, source: Option<SourceSpan>) -> Self {
        Self {
            multiplicity: Multiplicity::exactly(values.len() as u32),
            values,
            source,
        }
    }

    pub fn multiplicity(&self) -> Multiplicity {
        self.multiplicity
    }

    pub fn values(&self) -> &[ValueSpecification] {
        &self.values
    }

    pub fn into_values(self) -> Vec<ValueSpecification> {
        self.values
    }
}

/// Incoming form of a [`Collection`]; any multiplicity in the input is
/// ignored and recomputed.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct CollectionRepr {
    values: Vec<ValueSpecification>,
    source: Option<SourceSpan>,
}

#[cfg(feature = "serde")]
impl From<CollectionRepr> for Collection {
    fn from(repr: CollectionRepr) -> Self {
        Collection::new(repr.values, repr.source)
    }
}

/// A property selected in a graph fetch tree.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct PropertyGraphFetchTree {
    pub property: SmolStr,
    pub alias: Option<SmolStr>,
    pub parameters: Vec<ValueSpecification>,
    pub sub_type: Option<SmolStr>,
    pub sub_trees: Vec<PropertyGraphFetchTree>,
    pub source: Option<SourceSpan>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct RootGraphFetchTree {
    pub class: SmolStr,
    pub sub_trees: Vec<PropertyGraphFetchTree>,
    pub source: Option<SourceSpan>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct PathElement {
    pub property: SmolStr,
    pub parameters: Vec<ValueSpecification>,
    pub source: Option<SourceSpan>,
}

/// A navigation path `#/Type/prop/prop!name#`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct NavigationPath {
    pub start_type: SmolStr,
    pub path: Vec<PathElement>,
    pub name: Option<SmolStr>,
    pub source: Option<SourceSpan>,
}

/// Payload of an island sub-grammar result.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum IslandValue {
    RootGraphFetchTree(RootGraphFetchTree),
    Path(NavigationPath),
}

/// The universal expression node.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "_type", rename_all_fields = "camelCase"))]
pub enum ValueSpecification {
    #[cfg_attr(feature = "serde", serde(rename = "string"))]
    CString { value: String, source: Option<SourceSpan> },
    #[cfg_attr(feature = "serde", serde(rename = "integer"))]
    CInteger { value: i64, source: Option<SourceSpan> },
    #[cfg_attr(feature = "serde", serde(rename = "float"))]
    CFloat { value: f64, source: Option<SourceSpan> },
    /// Kept as text so no precision is lost.
    #[cfg_attr(feature = "serde", serde(rename = "decimal"))]
    CDecimal { value: String, source: Option<SourceSpan> },
    #[cfg_attr(feature = "serde", serde(rename = "boolean"))]
    CBoolean { value: bool, source: Option<SourceSpan> },
    #[cfg_attr(feature = "serde", serde(rename = "dateTime"))]
    CDateTime { value: String, source: Option<SourceSpan> },
    #[cfg_attr(feature = "serde", serde(rename = "strictDate"))]
    CStrictDate { value: String, source: Option<SourceSpan> },
    #[cfg_attr(feature = "serde", serde(rename = "strictTime"))]
    CStrictTime { value: String, source: Option<SourceSpan> },
    #[cfg_attr(feature = "serde", serde(rename = "latestDate"))]
    CLatestDate { source: Option<SourceSpan> },
    #[cfg_attr(feature = "serde", serde(rename = "collection"))]
    Collection(Collection),
    #[cfg_attr(feature = "serde", serde(rename = "var"))]
    Variable(Variable),
    #[cfg_attr(feature = "serde", serde(rename = "func"))]
    AppliedFunction(AppliedFunction),
    #[cfg_attr(feature = "serde", serde(rename = "property"))]
    AppliedProperty(AppliedProperty),
    #[cfg_attr(feature = "serde", serde(rename = "packageableElementPtr"))]
    PackageableElementPtr {
        full_path: SmolStr,
        hint: ReferenceHint,
        source: Option<SourceSpan>,
    },
    #[cfg_attr(feature = "serde", serde(rename = "primitiveType"))]
    PrimitiveType { name: SmolStr, source: Option<SourceSpan> },
    /// `Measure~Unit`, with the measure's full path.
    #[cfg_attr(feature = "serde", serde(rename = "unitType"))]
    UnitType { unit: SmolStr, source: Option<SourceSpan> },
    #[cfg_attr(feature = "serde", serde(rename = "lambda"))]
    Lambda(Lambda),
    #[cfg_attr(feature = "serde", serde(rename = "keyExpression"))]
    KeyExpression {
        key: SmolStr,
        value: Box<ValueSpecification>,
        source: Option<SourceSpan>,
    },
    #[cfg_attr(feature = "serde", serde(rename = "classInstance"))]
    ClassInstance {
        type_tag: SmolStr,
        value: Box<IslandValue>,
        source: Option<SourceSpan>,
    },
}

impl ValueSpecification {
    pub fn string(value: impl Into<String>, source: Option<SourceSpan>) -> Self {
        Self::CString { value: value.into(), source }
    }

    pub fn integer(value: i64, source: Option<SourceSpan>) -> Self {
        Self::CInteger { value, source }
    }

    pub fn collection(values: Vec<ValueSpecification>, source: Option<SourceSpan>) -> Self {
        Self::Collection(Collection::new(values, source))
    }

    pub fn applied(
        function: impl Into<SmolStr>,
        parameters: Vec<ValueSpecification>,
        source: Option<SourceSpan>,
    ) -> Self {
        Self::AppliedFunction(AppliedFunction {
            function: function.into(),
            parameters,
            source,
        })
    }

    pub fn property(
        property: impl Into<SmolStr>,
        parameters: Vec<ValueSpecification>,
        source: Option<SourceSpan>,
    ) -> Self {
        Self::AppliedProperty(AppliedProperty {
            property: property.into(),
            parameters,
            source,
        })
    }

    pub fn element_ptr(full_path: impl Into<SmolStr>, hint: ReferenceHint, source: Option<SourceSpan>) -> Self {
        Self::PackageableElementPtr {
            full_path: full_path.into(),
            hint,
            source,
        }
    }

    /// The absolute span, `None` for synthetic nodes.
    pub fn source(&self) -> Option<&SourceSpan> {
        match self {
            Self::CString { source, .. }
            | Self::CInteger { source, .. }
            | Self::CFloat { source, .. }
            | Self::CDecimal { source, .. }
            | Self::CBoolean { source, .. }
            | Self::CDateTime { source, .. }
            | Self::CStrictDate { source, .. }
            | Self::CStrictTime { source, .. }
            | Self::CLatestDate { source }
            | Self::PackageableElementPtr { source, .. }
            | Self::PrimitiveType { source, .. }
            | Self::UnitType { source, .. }
            | Self::KeyExpression { source, .. }
            | Self::ClassInstance { source, .. } => source.as_ref(),
            Self::Collection(c) => c.source.as_ref(),
            Self::Variable(v) => v.source.as_ref(),
            Self::AppliedFunction(f) => f.source.as_ref(),
            Self::AppliedProperty(p) => p.source.as_ref(),
            Self::Lambda(l) => l.source.as_ref(),
        }
    }

    /// Name of the applied function, if this is one.
    pub fn function_name(&self) -> Option<&str> {
        match self {
            Self::AppliedFunction(f) => Some(f.function.as_str()),
            _ => None,
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, values: &[ValueSpecification], sep: &str) -> fmt::Result {
    for (idx, value) in values.iter().enumerate() {
        if idx > 0 {
            write!(f, "{}", sep)?;
        }
        write!(f, "{}", value)?;
    }
    Ok(())
}

/// Compact structural rendering, e.g. `times([plus([1, 2]), 3])`.
///
/// Applied properties render as `.name(receiver, params..)`.
impl fmt::Display for ValueSpecification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CString { value, .. } => write!(f, "'{}'", value),
            Self::CInteger { value, .. } => write!(f, "{}", value),
            Self::CFloat { value, .. } => write!(f, "{:?}", value),
            Self::CDecimal { value, .. } => write!(f, "{}d", value),
            Self::CBoolean { value, .. } => write!(f, "{}", value),
            Self::CDateTime { value, .. }
            | Self::CStrictDate { value, .. }
            | Self::CStrictTime { value, .. } => write!(f, "%{}", value),
            Self::CLatestDate { .. } => write!(f, "%latest"),
            Self::Collection(c) => {
                write!(f, "[")?;
                write_list(f, c.values(), ", ")?;
                write!(f, "]")
            }
            Self::Variable(v) => write!(f, "${}", v.name),
            Self::AppliedFunction(func) => {
                write!(f, "{}(", func.function)?;
                write_list(f, &func.parameters, ", ")?;
                write!(f, ")")
            }
            Self::AppliedProperty(p) => {
                write!(f, ".{}(", p.property)?;
                write_list(f, &p.parameters, ", ")?;
                write!(f, ")")
            }
            Self::PackageableElementPtr { full_path, .. } => write!(f, "{}", full_path),
            Self::PrimitiveType { name, .. } => write!(f, "{}", name),
            Self::UnitType { unit, .. } => write!(f, "{}", unit),
            Self::Lambda(l) => {
                write!(f, "{{")?;
                for (idx, p) in l.parameters.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", p.name)?;
                }
                write!(f, "|")?;
                write_list(f, &l.body, "; ")?;
                write!(f, "}}")
            }
            Self::KeyExpression { key, value, .. } => write!(f, "{}={}", key, value),
            Self::ClassInstance { type_tag, .. } => write!(f, "#{}", type_tag),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(n: i64) -> ValueSpecification {
        ValueSpecification::integer(n, None)
    }

    #[test]
    fn test_collection_multiplicity_tracks_length() {
        let c = Collection::new(vec![int(1), int(2), int(3)], None);
        assert_eq!(c.multiplicity(), Multiplicity::exactly(3));
        let empty = Collection::new(vec![], None);
        assert_eq!(empty.multiplicity(), Multiplicity::new(0, Some(0)));
    }

    #[test]
    fn test_multiplicity_display() {
        assert_eq!(Multiplicity::PURE_ONE.to_string(), "[1]");
        assert_eq!(Multiplicity::ZERO_MANY.to_string(), "[*]");
        assert_eq!(Multiplicity::new(1, None).to_string(), "[1..*]");
        assert_eq!(Multiplicity::new(2, Some(5)).to_string(), "[2..5]");
    }

    #[test]
    fn test_display_nested_calls() {
        let plus = ValueSpecification::applied(
            "plus",
            vec![ValueSpecification::collection(vec![int(1), int(2)], None)],
            None,
        );
        let times = ValueSpecification::applied(
            "times",
            vec![ValueSpecification::collection(vec![plus, int(3)], None)],
            None,
        );
        assert_eq!(times.to_string(), "times([plus([1, 2]), 3])");
    }

    #[test]
    fn test_source_accessor() {
        let span = SourceSpan::new("f", 1, 1, 1, 3);
        let v = ValueSpecification::string("abc", Some(span.clone()));
        assert_eq!(v.source(), Some(&span));
        assert_eq!(ValueSpecification::string("k", None).source(), None);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialized_collection_recomputes_multiplicity() {
        let original = Collection::new(vec![int(1), int(2)], None);
        let mut json = serde_json::to_value(&original).unwrap();
        assert!(json.get("multiplicity").is_some());
        json["multiplicity"] = serde_json::to_value(Multiplicity::exactly(5)).unwrap();

        let back: Collection = serde_json::from_value(json).unwrap();
        assert_eq!(back.multiplicity(), Multiplicity::exactly(2));
        assert_eq!(back, original);
    }
}
