use super::*;

// ============================================================================
// Source file
// ============================================================================

ast_node!(SourceFile, SOURCE_FILE);

impl SourceFile {
    children_method!(imports, Import);
    children_method!(elements, Element);
}

ast_enum! {
    /// A top-level packageable element declaration
    Element {
        Class(ClassDef),
        Association(AssociationDef),
        Enumeration(EnumDef),
        Profile(ProfileDef),
        Function(FunctionDef),
        Measure(MeasureDef),
    }
}

impl Element {
    /// The declared path of the element, if it parsed.
    pub fn name(&self) -> Option<QualifiedName> {
        self.syntax().children().find_map(QualifiedName::cast)
    }
}

ast_node!(Import, IMPORT);

impl Import {
    first_child_method!(path, QualifiedName);
}

// ============================================================================
// Names and annotations
// ============================================================================

ast_node!(QualifiedName, QUALIFIED_NAME);

impl QualifiedName {
    /// Get the individual segments (e.g., `["meta", "pure", "Person"]`).
    pub fn segments(&self) -> Vec<String> {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .filter(|t| is_name_token(t.kind()))
            .map(|t| t.text().to_string())
            .collect()
    }

    /// The last segment.
    pub fn simple_name(&self) -> Option<String> {
        self.segments().pop()
    }
}

impl std::fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.segments().join("::"))
    }
}

ast_node!(Stereotypes, STEREOTYPES);

impl Stereotypes {
    children_method!(items, Stereotype);
}

ast_node!(Stereotype, STEREOTYPE);

impl Stereotype {
    first_child_method!(profile, QualifiedName);
    name_token_method!();
}

ast_node!(TaggedValues, TAGGED_VALUES);

impl TaggedValues {
    children_method!(items, TaggedValue);
}

ast_node!(TaggedValue, TAGGED_VALUE);

impl TaggedValue {
    first_child_method!(profile, QualifiedName);

    /// The tag name after the `.`.
    pub fn tag(&self) -> Option<SyntaxToken> {
        find_name_token(&self.0)
    }

    /// The quoted value token.
    pub fn value(&self) -> Option<SyntaxToken> {
        find_token(&self.0, SyntaxKind::STRING)
    }
}

// ============================================================================
// Types and multiplicities
// ============================================================================

ast_node!(Multiplicity, MULTIPLICITY);

impl Multiplicity {
    fn bounds(&self) -> Vec<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .filter(|t| matches!(t.kind(), SyntaxKind::INTEGER | SyntaxKind::STAR))
            .collect()
    }

    /// The lower bound of a `[a..b]` range; `None` for `[n]` and `[*]`.
    pub fn lower(&self) -> Option<SyntaxToken> {
        if has_token(&self.0, SyntaxKind::DOT_DOT) {
            self.bounds().into_iter().next()
        } else {
            None
        }
    }

    /// The upper (or only) bound token: an integer or `*`.
    pub fn upper(&self) -> Option<SyntaxToken> {
        self.bounds().pop()
    }
}

ast_node!(TypeRef, TYPE_REF);

impl TypeRef {
    first_child_method!(name, QualifiedName);
    first_child_method!(unit, UnitName);
}

ast_node!(UnitName, UNIT_NAME);

impl UnitName {
    name_token_method!();
}

ast_node!(Parameter, PARAMETER);

impl Parameter {
    name_token_method!();
    first_child_method!(type_ref, TypeRef);
    first_child_method!(multiplicity, Multiplicity);
}

ast_node!(ParameterList, PARAMETER_LIST);

impl ParameterList {
    children_method!(parameters, Parameter);
}

// ============================================================================
// Class
// ============================================================================

ast_node!(ClassDef, CLASS_DEF);

impl ClassDef {
    first_child_method!(name, QualifiedName);
    first_child_method!(body, ClassBody);
    annotations_methods!();

    /// Types after `extends`.
    pub fn super_types(&self) -> Vec<TypeRef> {
        self.0
            .children()
            .find(|n| n.kind() == SyntaxKind::SUPER_TYPES)
            .map(|n| n.children().filter_map(TypeRef::cast).collect())
            .unwrap_or_default()
    }

    /// Constraints from the `[...]` block, in declaration order.
    pub fn constraints(&self) -> Vec<Constraint> {
        self.0
            .children()
            .find(|n| n.kind() == SyntaxKind::CONSTRAINT_LIST)
            .map(|n| n.children().filter_map(Constraint::cast).collect())
            .unwrap_or_default()
    }
}

ast_node!(ClassBody, CLASS_BODY);

impl ClassBody {
    children_method!(properties, Property);
    children_method!(qualified_properties, QualifiedProperty);
}

ast_node!(Constraint, CONSTRAINT);

impl Constraint {
    /// The constraint name; anonymous constraints have none.
    pub fn name(&self) -> Option<SyntaxToken> {
        find_name_token(&self.0)
    }

    first_child_method!(expression, CombinedExpr);

    /// `~function:` body of the extended form.
    pub fn function(&self) -> Option<CombinedExpr> {
        self.clause(SyntaxKind::CONSTRAINT_FUNCTION)
            .and_then(|n| n.children().find_map(CombinedExpr::cast))
    }

    /// `~message:` body of the extended form.
    pub fn message(&self) -> Option<CombinedExpr> {
        self.clause(SyntaxKind::CONSTRAINT_MESSAGE)
            .and_then(|n| n.children().find_map(CombinedExpr::cast))
    }

    pub fn external_id(&self) -> Option<SyntaxToken> {
        self.clause(SyntaxKind::CONSTRAINT_EXTERNAL_ID)
            .and_then(|n| find_token(&n, SyntaxKind::STRING))
    }

    pub fn enforcement_level(&self) -> Option<SyntaxToken> {
        // The clause keyword itself is a name token; the level is the second one.
        self.clause(SyntaxKind::CONSTRAINT_ENFORCEMENT).and_then(|n| {
            n.children_with_tokens()
                .filter_map(|e| e.into_token())
                .filter(|t| is_name_token(t.kind()))
                .nth(1)
        })
    }

    fn clause(&self, kind: SyntaxKind) -> Option<SyntaxNode> {
        self.0.children().find(|n| n.kind() == kind)
    }
}

ast_node!(Property, PROPERTY);

impl Property {
    name_token_method!();
    first_child_method!(type_ref, TypeRef);
    first_child_method!(multiplicity, Multiplicity);
    annotations_methods!();

    /// Aggregation kind from `(shared)` / `(composite)` / `(none)`.
    pub fn aggregation(&self) -> Option<SyntaxToken> {
        self.0
            .children()
            .find(|n| n.kind() == SyntaxKind::AGGREGATION)
            .and_then(|n| find_name_token(&n))
    }

    /// The `= expr` default, if present.
    pub fn default_value(&self) -> Option<CombinedExpr> {
        self.0
            .children()
            .find(|n| n.kind() == SyntaxKind::DEFAULT_VALUE)
            .and_then(|n| n.children().find_map(CombinedExpr::cast))
    }
}

ast_node!(QualifiedProperty, QUALIFIED_PROPERTY);

impl QualifiedProperty {
    name_token_method!();
    first_child_method!(parameter_list, ParameterList);
    first_child_method!(body, CodeBlock);
    first_child_method!(type_ref, TypeRef);
    first_child_method!(multiplicity, Multiplicity);
    annotations_methods!();
}

// ============================================================================
// Association, Enum, Profile
// ============================================================================

ast_node!(AssociationDef, ASSOCIATION_DEF);

impl AssociationDef {
    first_child_method!(name, QualifiedName);
    first_child_method!(body, ClassBody);
    annotations_methods!();
}

ast_node!(EnumDef, ENUM_DEF);

impl EnumDef {
    first_child_method!(name, QualifiedName);
    children_method!(values, EnumValue);
    annotations_methods!();
}

ast_node!(EnumValue, ENUM_VALUE);

impl EnumValue {
    name_token_method!();
    annotations_methods!();
}

ast_node!(ProfileDef, PROFILE_DEF);

impl ProfileDef {
    first_child_method!(name, QualifiedName);

    /// Names listed in `stereotypes: [...]`.
    pub fn stereotypes(&self) -> Vec<String> {
        self.listed(SyntaxKind::PROFILE_STEREOTYPES)
    }

    /// Names listed in `tags: [...]`.
    pub fn tags(&self) -> Vec<String> {
        self.listed(SyntaxKind::PROFILE_TAGS)
    }

    fn listed(&self, kind: SyntaxKind) -> Vec<String> {
        self.0
            .children()
            .filter(|n| n.kind() == kind)
            .flat_map(|n| {
                n.children_with_tokens()
                    .filter_map(|e| e.into_token())
                    .filter(|t| is_name_token(t.kind()))
                    // skip the clause keyword
                    .skip(1)
                    .map(|t| t.text().to_string())
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}

// ============================================================================
// Function
// ============================================================================

ast_node!(FunctionDef, FUNCTION_DEF);

impl FunctionDef {
    first_child_method!(name, QualifiedName);
    first_child_method!(parameter_list, ParameterList);
    first_child_method!(return_type, TypeRef);
    first_child_method!(return_multiplicity, Multiplicity);
    first_child_method!(body, CodeBlock);
    annotations_methods!();
}

// ============================================================================
// Measure
// ============================================================================

ast_node!(MeasureDef, MEASURE_DEF);

impl MeasureDef {
    first_child_method!(name, QualifiedName);
    children_method!(units, UnitDef);
    children_method!(non_convertible_units, NonConvertibleUnit);
}

ast_node!(UnitDef, UNIT_DEF);

impl UnitDef {
    name_token_method!();
    first_child_method!(conversion, UnitConversion);
    has_token_method!(is_canonical, STAR, "*Gram: x -> $x;");
}

ast_node!(UnitConversion, UNIT_CONVERSION);

impl UnitConversion {
    first_child_method!(parameter, LambdaParam);
    first_child_method!(body, CombinedExpr);
}

ast_node!(NonConvertibleUnit, NON_CONVERTIBLE_UNIT);

impl NonConvertibleUnit {
    name_token_method!();
}
