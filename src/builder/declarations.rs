//! Declaration nodes to packageable elements.
//!
//! Each declaration owns its lambda naming: expression bodies are built with
//! a fresh [`LambdaContext`] named after the declaration.

use smol_str::{SmolStr, format_smolstr};
use tracing::{debug, trace};

use super::error::{ParseError, Result};
use super::expression::{ExpressionBuilder, type_name};
use super::island::IslandRegistry;
use super::lambda::LambdaContext;
use super::literals::unquote;
use super::multiplicity::build_multiplicity;
use super::options::BuilderOptions;
use super::source::SpanResolver;
use crate::base::SourceSpan;
use crate::model::{
    AggregationKind, Association, Class, Constraint, EnumValue, Enumeration, Function, Lambda,
    Measure, Multiplicity, PackageableElement, ParsedSource, Profile, Property, QualifiedProperty,
    StereotypePtr, TaggedValue, Unit, ValueSpecification, Variable, join_path,
};
use crate::parser::{self, AstNode, ErrorCode, SyntaxNode};

/// Builds every element of one source text.
pub struct DeclarationBuilder<'a> {
    spans: &'a SpanResolver,
    options: &'a BuilderOptions,
    islands: &'a IslandRegistry,
}

impl<'a> DeclarationBuilder<'a> {
    pub fn new(spans: &'a SpanResolver, options: &'a BuilderOptions, islands: &'a IslandRegistry) -> Self {
        Self {
            spans,
            options,
            islands,
        }
    }

    fn span(&self, node: &SyntaxNode) -> SourceSpan {
        self.spans.span(node.text_range())
    }

    fn missing(&self, node: &SyntaxNode, what: &str) -> ParseError {
        ParseError::syntax(ErrorCode::E0301, format!("missing {}", what), self.span(node))
    }

    fn expressions<'b>(&'b self, lambdas: &'b mut LambdaContext) -> ExpressionBuilder<'b> {
        ExpressionBuilder::new(self.spans, self.options, self.islands, lambdas)
    }

    pub fn source_file(&self, file: &parser::SourceFile) -> Result<ParsedSource> {
        let mut parsed = ParsedSource::default();
        for import in file.imports() {
            if let Some(path) = import.path() {
                parsed.imports.push(SmolStr::new(path.to_string()));
            }
        }
        for element in file.elements() {
            let built = self.element(&element)?;
            let path = built.path();
            if parsed.elements.contains_key(&path) {
                return Err(ParseError::DuplicateElement {
                    path: path.to_string(),
                    span: self.span(element.syntax()),
                });
            }
            debug!(%path, "element built");
            parsed.elements.insert(path, built);
        }
        Ok(parsed)
    }

    pub fn element(&self, element: &parser::Element) -> Result<PackageableElement> {
        Ok(match element {
            parser::Element::Class(node) => PackageableElement::Class(self.class(node)?),
            parser::Element::Association(node) => PackageableElement::Association(self.association(node)?),
            parser::Element::Enumeration(node) => PackageableElement::Enumeration(self.enumeration(node)?),
            parser::Element::Profile(node) => PackageableElement::Profile(self.profile(node)?),
            parser::Element::Function(node) => PackageableElement::Function(self.function(node)?),
            parser::Element::Measure(node) => PackageableElement::Measure(self.measure(node)?),
        })
    }

    /// Split a declared path into `(package, name)`.
    fn path(&self, node: &SyntaxNode, name: Option<parser::QualifiedName>) -> Result<(SmolStr, SmolStr)> {
        let name = name.ok_or_else(|| self.missing(node, "element name"))?;
        let mut segments = name.segments();
        let simple = segments
            .pop()
            .ok_or_else(|| self.missing(node, "element name"))?;
        Ok((SmolStr::new(segments.join("::")), SmolStr::new(simple)))
    }

    // =========================================================================
    // Annotations
    // =========================================================================

    fn stereotypes(&self, items: Vec<parser::Stereotype>) -> Result<Vec<StereotypePtr>> {
        items
            .iter()
            .map(|item| {
                let profile = item
                    .profile()
                    .ok_or_else(|| self.missing(item.syntax(), "profile"))?;
                let value = item
                    .name()
                    .ok_or_else(|| self.missing(item.syntax(), "stereotype"))?;
                Ok(StereotypePtr {
                    profile: SmolStr::new(profile.to_string()),
                    value: SmolStr::new(value.text()),
                    source: Some(self.span(item.syntax())),
                })
            })
            .collect()
    }

    fn tagged_values(&self, items: Vec<parser::TaggedValue>) -> Result<Vec<TaggedValue>> {
        items
            .iter()
            .map(|item| {
                let profile = item
                    .profile()
                    .ok_or_else(|| self.missing(item.syntax(), "profile"))?;
                let tag = item.tag().ok_or_else(|| self.missing(item.syntax(), "tag"))?;
                let value = item
                    .value()
                    .ok_or_else(|| self.missing(item.syntax(), "tag value"))?;
                Ok(TaggedValue {
                    profile: SmolStr::new(profile.to_string()),
                    tag: SmolStr::new(tag.text()),
                    value: unquote(value.text()),
                    source: Some(self.span(item.syntax())),
                })
            })
            .collect()
    }

    // =========================================================================
    // Types, parameters, properties
    // =========================================================================

    fn typed(
        &self,
        node: &SyntaxNode,
        type_ref: Option<parser::TypeRef>,
        multiplicity: Option<parser::Multiplicity>,
    ) -> Result<(SmolStr, Multiplicity)> {
        let type_ref = type_ref.ok_or_else(|| self.missing(node, "type"))?;
        let multiplicity = multiplicity.ok_or_else(|| self.missing(node, "multiplicity"))?;
        Ok((type_name(&type_ref), build_multiplicity(&multiplicity, self.spans)?))
    }

    fn parameters(&self, list: Option<parser::ParameterList>) -> Result<Vec<Variable>> {
        let Some(list) = list else {
            return Ok(Vec::new());
        };
        list.parameters()
            .map(|param| {
                let name = param
                    .name()
                    .ok_or_else(|| self.missing(param.syntax(), "parameter name"))?;
                let (type_name, multiplicity) =
                    self.typed(param.syntax(), param.type_ref(), param.multiplicity())?;
                Ok(Variable::typed(
                    name.text(),
                    type_name,
                    multiplicity,
                    Some(self.span(param.syntax())),
                ))
            })
            .collect()
    }

    /// Properties share `lambdas`, the owning element's context, for defaults.
    fn property(&self, node: &parser::Property, lambdas: &mut LambdaContext) -> Result<Property> {
        let name = node.name().ok_or_else(|| self.missing(node.syntax(), "property name"))?;
        let (type_name, multiplicity) = self.typed(node.syntax(), node.type_ref(), node.multiplicity())?;
        let aggregation = match node.aggregation() {
            Some(token) => Some(AggregationKind::from_keyword(token.text()).ok_or_else(|| {
                ParseError::unsupported(
                    format!("unknown aggregation kind '{}'", token.text()),
                    self.spans.span(token.text_range()),
                )
            })?),
            None => None,
        };
        let default_value = match node.default_value() {
            Some(expr) => Some(ValueSpecification::Lambda(
                self.expressions(lambdas).wrap_lambda(&expr, Vec::new())?,
            )),
            None => None,
        };
        Ok(Property {
            name: SmolStr::new(name.text()),
            type_name,
            multiplicity,
            aggregation,
            default_value,
            stereotypes: self.stereotypes(node.stereotypes())?,
            tagged_values: self.tagged_values(node.tagged_values())?,
            source: Some(self.span(node.syntax())),
        })
    }

    fn qualified_property(&self, owner: &str, node: &parser::QualifiedProperty) -> Result<QualifiedProperty> {
        let name = node.name().ok_or_else(|| self.missing(node.syntax(), "property name"))?;
        let (return_type, return_multiplicity) =
            self.typed(node.syntax(), node.type_ref(), node.multiplicity())?;
        let mut lambdas = LambdaContext::new(&format!("{}_{}", owner, name.text()));
        let body = match node.body() {
            Some(block) => self.expressions(&mut lambdas).code_block(&block)?,
            None => Vec::new(),
        };
        Ok(QualifiedProperty {
            name: SmolStr::new(name.text()),
            parameters: self.parameters(node.parameter_list())?,
            return_type,
            return_multiplicity,
            body,
            stereotypes: self.stereotypes(node.stereotypes())?,
            tagged_values: self.tagged_values(node.tagged_values())?,
            source: Some(self.span(node.syntax())),
        })
    }

    fn members(
        &self,
        owner: &str,
        body: Option<parser::ClassBody>,
    ) -> Result<(Vec<Property>, Vec<QualifiedProperty>)> {
        let Some(body) = body else {
            return Ok((Vec::new(), Vec::new()));
        };
        let mut lambdas = LambdaContext::new(owner);
        let properties = body
            .properties()
            .map(|p| self.property(&p, &mut lambdas))
            .collect::<Result<Vec<_>>>()?;
        let qualified = body
            .qualified_properties()
            .map(|q| self.qualified_property(owner, &q))
            .collect::<Result<Vec<_>>>()?;
        Ok((properties, qualified))
    }

    // =========================================================================
    // Elements
    // =========================================================================

    pub fn class(&self, node: &parser::ClassDef) -> Result<Class> {
        let (package, name) = self.path(node.syntax(), node.name())?;
        let owner = join_path(&package, &name);
        trace!(%owner, "class");
        let (properties, qualified_properties) = self.members(&owner, node.body())?;
        let constraints = node
            .constraints()
            .iter()
            .enumerate()
            .map(|(idx, c)| self.constraint(idx, c))
            .collect::<Result<Vec<_>>>()?;
        Ok(Class {
            super_types: node.super_types().iter().map(type_name).collect(),
            properties,
            qualified_properties,
            constraints,
            stereotypes: self.stereotypes(node.stereotypes())?,
            tagged_values: self.tagged_values(node.tagged_values())?,
            source: Some(self.span(node.syntax())),
            package,
            name,
        })
    }

    /// `name: expr`, `expr`, or `name(~function: expr ~message: expr ...)`.
    ///
    /// Function and message share one lambda context, owned by the
    /// constraint name or, for anonymous constraints, the position.
    fn constraint(&self, index: usize, node: &parser::Constraint) -> Result<Constraint> {
        let name = match node.name() {
            Some(token) => SmolStr::new(token.text()),
            None => format_smolstr!("{}", index),
        };
        let mut lambdas = LambdaContext::new(&name);
        let function = node
            .expression()
            .or_else(|| node.function())
            .ok_or_else(|| self.missing(node.syntax(), "constraint function"))?;
        let function_definition = self.expressions(&mut lambdas).wrap_lambda(&function, Vec::new())?;
        let message = match node.message() {
            Some(expr) => Some(self.expressions(&mut lambdas).wrap_lambda(&expr, Vec::new())?),
            None => None,
        };
        Ok(Constraint {
            name,
            function_definition,
            message,
            external_id: node.external_id().map(|t| unquote(t.text())),
            enforcement_level: node.enforcement_level().map(|t| SmolStr::new(t.text())),
            source: Some(self.span(node.syntax())),
        })
    }

    pub fn association(&self, node: &parser::AssociationDef) -> Result<Association> {
        let (package, name) = self.path(node.syntax(), node.name())?;
        let (properties, qualified_properties) = self.members(&join_path(&package, &name), node.body())?;
        Ok(Association {
            properties,
            qualified_properties,
            stereotypes: self.stereotypes(node.stereotypes())?,
            tagged_values: self.tagged_values(node.tagged_values())?,
            source: Some(self.span(node.syntax())),
            package,
            name,
        })
    }

    pub fn enumeration(&self, node: &parser::EnumDef) -> Result<Enumeration> {
        let (package, name) = self.path(node.syntax(), node.name())?;
        let values = node
            .values()
            .map(|value| {
                let token = value
                    .name()
                    .ok_or_else(|| self.missing(value.syntax(), "enum value"))?;
                Ok(EnumValue {
                    value: SmolStr::new(token.text()),
                    stereotypes: self.stereotypes(value.stereotypes())?,
                    tagged_values: self.tagged_values(value.tagged_values())?,
                    source: Some(self.span(value.syntax())),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Enumeration {
            values,
            stereotypes: self.stereotypes(node.stereotypes())?,
            tagged_values: self.tagged_values(node.tagged_values())?,
            source: Some(self.span(node.syntax())),
            package,
            name,
        })
    }

    pub fn profile(&self, node: &parser::ProfileDef) -> Result<Profile> {
        let (package, name) = self.path(node.syntax(), node.name())?;
        Ok(Profile {
            stereotypes: node.stereotypes().into_iter().map(SmolStr::from).collect(),
            tags: node.tags().into_iter().map(SmolStr::from).collect(),
            source: Some(self.span(node.syntax())),
            package,
            name,
        })
    }

    /// Functions are keyed by signature name, so overloads don't collide.
    pub fn function(&self, node: &parser::FunctionDef) -> Result<Function> {
        let (package, simple) = self.path(node.syntax(), node.name())?;
        let parameters = self.parameters(node.parameter_list())?;
        let (return_type, return_multiplicity) =
            self.typed(node.syntax(), node.return_type(), node.return_multiplicity())?;

        let mut lambdas = LambdaContext::new(&join_path(&package, &simple));
        let body = match node.body() {
            Some(block) => self.expressions(&mut lambdas).code_block(&block)?,
            None => Vec::new(),
        };
        Ok(Function {
            name: signature_name(&simple, &parameters, &return_type, return_multiplicity),
            parameters,
            return_type,
            return_multiplicity,
            body,
            stereotypes: self.stereotypes(node.stereotypes())?,
            tagged_values: self.tagged_values(node.tagged_values())?,
            source: Some(self.span(node.syntax())),
            package,
        })
    }

    /// Convertible measures mark their canonical unit with `*`; in the
    /// non-convertible form the first unit is canonical.
    pub fn measure(&self, node: &parser::MeasureDef) -> Result<Measure> {
        let (package, name) = self.path(node.syntax(), node.name())?;
        let measure_path = join_path(&package, &name);
        let unit = |unit_name: &str, conversion_function: Option<Lambda>, span: SourceSpan| Unit {
            package: package.clone(),
            name: format_smolstr!("{}~{}", name, unit_name),
            conversion_function,
            source: Some(span),
        };

        let mut canonical_unit = None;
        let mut non_canonical_units = Vec::new();
        for def in node.units() {
            let unit_name = def.name().ok_or_else(|| self.missing(def.syntax(), "unit name"))?;
            let conversion = match def.conversion() {
                Some(conversion) => Some(self.unit_conversion(&measure_path, unit_name.text(), &conversion)?),
                None => None,
            };
            let built = unit(unit_name.text(), conversion, self.span(def.syntax()));
            if !def.is_canonical() {
                non_canonical_units.push(built);
            } else if canonical_unit.is_none() {
                canonical_unit = Some(built);
            } else {
                return Err(ParseError::unsupported(
                    format!("measure {} declares more than one canonical unit", measure_path),
                    self.span(def.syntax()),
                ));
            }
        }
        for (idx, def) in node.non_convertible_units().enumerate() {
            let unit_name = def.name().ok_or_else(|| self.missing(def.syntax(), "unit name"))?;
            let built = unit(unit_name.text(), None, self.span(def.syntax()));
            if idx == 0 && canonical_unit.is_none() {
                canonical_unit = Some(built);
            } else {
                non_canonical_units.push(built);
            }
        }

        Ok(Measure {
            canonical_unit,
            non_canonical_units,
            source: Some(self.span(node.syntax())),
            package,
            name,
        })
    }

    /// `x -> $x * 1000` as a named one-parameter lambda.
    fn unit_conversion(&self, measure_path: &str, unit: &str, node: &parser::UnitConversion) -> Result<Lambda> {
        let mut lambdas = LambdaContext::new(&format!("{}~{}", measure_path, unit));
        let param = node
            .parameter()
            .ok_or_else(|| self.missing(node.syntax(), "conversion parameter"))?;
        let body = node
            .body()
            .ok_or_else(|| self.missing(node.syntax(), "conversion body"))?;
        let name = lambdas.next_name();
        let mut builder = self.expressions(&mut lambdas);
        let parameter = builder.lambda_param(&param)?;
        let body = builder.combined(&body)?;
        Ok(Lambda {
            name: Some(name),
            parameters: vec![parameter],
            body: vec![body],
            source: Some(self.span(node.syntax())),
        })
    }
}

/// `name_T1_m1__T2_m2__R_m_`: parameter and return types by simple name.
pub fn signature_name(
    name: &str,
    parameters: &[Variable],
    return_type: &str,
    return_multiplicity: Multiplicity,
) -> SmolStr {
    let params: Vec<String> = parameters
        .iter()
        .map(|p| {
            signature_part(
                p.type_name.as_deref().unwrap_or("Any"),
                p.multiplicity.unwrap_or_default(),
            )
        })
        .collect();
    let returns = signature_part(return_type, return_multiplicity);
    if params.is_empty() {
        format_smolstr!("{}__{}_", name, returns)
    } else {
        format_smolstr!("{}_{}__{}_", name, params.join("__"), returns)
    }
}

fn signature_part(type_name: &str, multiplicity: Multiplicity) -> String {
    let simple = type_name.rsplit("::").next().unwrap_or(type_name).replace('~', "_");
    format!("{}_{}", simple, signature_multiplicity(multiplicity))
}

fn signature_multiplicity(multiplicity: Multiplicity) -> String {
    let bound = |b: Option<u32>| b.map_or_else(|| "MANY".to_string(), |n| n.to_string());
    match (multiplicity.lower, multiplicity.upper) {
        (0, None) => "MANY".to_string(),
        (lower, Some(upper)) if lower == upper => lower.to_string(),
        (lower, upper) => format!("${}_{}$", lower, bound(upper)),
    }
}
