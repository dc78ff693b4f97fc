use super::*;

// ============================================================================
// Code blocks
// ============================================================================

ast_node!(CodeBlock, CODE_BLOCK);

impl CodeBlock {
    children_method!(lines, ProgramLine);
}

ast_enum! {
    /// One `;`-separated statement of a code block
    ProgramLine {
        Let(LetExpr),
        Expr(CombinedExpr),
    }
}

ast_node!(LetExpr, LET_EXPR);

impl LetExpr {
    name_token_method!();
    first_child_method!(value, CombinedExpr);
}

// ============================================================================
// Combined expressions (flat operator runs)
// ============================================================================

ast_node!(CombinedExpr, COMBINED_EXPR);

impl CombinedExpr {
    first_child_method!(head, Expression);
    children_method!(parts, ExpressionPart);
}

ast_enum! {
    /// An operator part trailing the head of a combined expression
    ExpressionPart {
        Arithmetic(ArithmeticPart),
        Boolean(BooleanPart),
        Equality(EqualityPart),
    }
}

ast_node!(ArithmeticPart, ARITHMETIC_PART);

impl ArithmeticPart {
    /// The operator token kind shared by every operand of this part.
    pub fn operator(&self) -> Option<SyntaxKind> {
        first_significant_token(&self.0).map(|t| t.kind())
    }

    children_method!(operands, Expression);
}

ast_node!(BooleanPart, BOOLEAN_PART);

impl BooleanPart {
    pub fn operator(&self) -> Option<SyntaxKind> {
        first_significant_token(&self.0).map(|t| t.kind())
    }

    first_child_method!(operand, Expression);
}

ast_node!(EqualityPart, EQUALITY_PART);

impl EqualityPart {
    pub fn operator(&self) -> Option<SyntaxKind> {
        first_significant_token(&self.0).map(|t| t.kind())
    }

    first_child_method!(operand, Expression);
    children_method!(arithmetic_parts, ArithmeticPart);
}

// ============================================================================
// Expression = primary + postfix suffixes
// ============================================================================

ast_node!(Expression, EXPRESSION);

impl Expression {
    first_child_method!(primary, Primary);
    children_method!(suffixes, PostfixSuffix);
}

ast_enum! {
    /// The leading atom of an expression
    Primary {
        Literal(Literal),
        Island(Island),
        New(NewExpr),
        Variable(VariableRef),
        Not(NotExpr),
        Signed(SignedExpr),
        Array(ArrayExpr),
        Paren(ParenExpr),
        Lambda(LambdaExpr),
        Name(NameRef),
        UnitType(UnitTypeRef),
    }
}

ast_enum! {
    /// Member access or arrow call applied to a receiver
    PostfixSuffix {
        Property(PropertySuffix),
        Function(FunctionSuffix),
        Bracket(BracketSuffix),
    }
}

ast_node!(Literal, LITERAL);

impl Literal {
    pub fn token(&self) -> Option<SyntaxToken> {
        first_significant_token(&self.0)
    }
}

ast_node!(Island, ISLAND);

impl Island {
    /// The whole `#{...}#` / `#/...#` fragment token.
    pub fn token(&self) -> Option<SyntaxToken> {
        first_significant_token(&self.0)
    }
}

ast_node!(NewExpr, NEW_EXPR);

impl NewExpr {
    first_child_method!(class, QualifiedName);
    children_method!(entries, KeyValue);
}

ast_node!(KeyValue, KEY_VALUE);

impl KeyValue {
    /// The property being assigned.
    pub fn key(&self) -> Option<SyntaxToken> {
        find_name_token(&self.0)
    }

    first_child_method!(value, CombinedExpr);
}

ast_node!(VariableRef, VARIABLE_REF);

impl VariableRef {
    name_token_method!();
}

ast_node!(NotExpr, NOT_EXPR);

impl NotExpr {
    first_child_method!(operand, Expression);
}

ast_node!(SignedExpr, SIGNED_EXPR);

impl SignedExpr {
    has_token_method!(is_negative, MINUS, "-1");
    first_child_method!(operand, Expression);
}

ast_node!(ArrayExpr, ARRAY_EXPR);

impl ArrayExpr {
    children_method!(items, CombinedExpr);
}

ast_node!(ParenExpr, PAREN_EXPR);

impl ParenExpr {
    first_child_method!(inner, CombinedExpr);
}

ast_node!(LambdaExpr, LAMBDA_EXPR);

impl LambdaExpr {
    children_method!(params, LambdaParam);
    first_child_method!(body, CodeBlock);
}

ast_node!(LambdaParam, LAMBDA_PARAM);

impl LambdaParam {
    name_token_method!();
    first_child_method!(type_ref, TypeRef);
    first_child_method!(multiplicity, Multiplicity);
}

ast_node!(NameRef, NAME_REF);

impl NameRef {
    first_child_method!(name, QualifiedName);
    first_child_method!(args, CallArgs);
}

ast_node!(UnitTypeRef, UNIT_TYPE_REF);

impl UnitTypeRef {
    first_child_method!(measure, QualifiedName);

    /// The unit after `~`.
    pub fn unit(&self) -> Option<SyntaxToken> {
        find_name_token(&self.0)
    }
}

ast_node!(CallArgs, CALL_ARGS);

impl CallArgs {
    children_method!(args, CombinedExpr);
}

ast_node!(PropertySuffix, PROPERTY_SUFFIX);

impl PropertySuffix {
    name_token_method!();
    first_child_method!(args, CallArgs);
}

ast_node!(FunctionSuffix, FUNCTION_SUFFIX);

impl FunctionSuffix {
    first_child_method!(name, QualifiedName);
    first_child_method!(args, CallArgs);
}

ast_node!(BracketSuffix, BRACKET_SUFFIX);

impl BracketSuffix {
    /// The string or integer key between the brackets.
    pub fn key(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| matches!(t.kind(), SyntaxKind::STRING | SyntaxKind::INTEGER))
    }
}
