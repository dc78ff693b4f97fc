//! Expression nodes to [`ValueSpecification`] trees.

use rowan::TextRange;
use smol_str::{SmolStr, format_smolstr};
use tracing::{trace, warn};

use super::error::{ParseError, Result};
use super::island::IslandRegistry;
use super::lambda::LambdaContext;
use super::literals::{build_literal, unquote};
use super::multiplicity::build_multiplicity;
use super::options::BuilderOptions;
use super::precedence::{ArithmeticOp, BooleanOp, Part, cover, merge};
use super::source::SpanResolver;
use crate::base::SourceSpan;
use crate::model::{Lambda, Multiplicity, ReferenceHint, ValueSpecification, Variable};
use crate::parser::{
    self, AstNode, CombinedExpr, ErrorCode, Expression, ExpressionPart, PostfixSuffix, Primary,
    ProgramLine, SyntaxKind, SyntaxNode,
};

/// Names that denote built-in primitive types rather than elements.
pub const PRIMITIVE_TYPES: &[&str] = &[
    "String",
    "Boolean",
    "Binary",
    "Date",
    "StrictDate",
    "DateTime",
    "StrictTime",
    "Float",
    "Decimal",
    "Integer",
    "Number",
    "LatestDate",
    "Byte",
];

/// Render a type reference as `pkg::Type` or `pkg::Measure~Unit`.
pub fn type_name(node: &parser::TypeRef) -> SmolStr {
    let base = node.name().map(|n| n.to_string()).unwrap_or_default();
    match node.unit().and_then(|u| u.name()) {
        Some(unit) => format_smolstr!("{}~{}", base, unit.text()),
        None => SmolStr::new(base),
    }
}

/// Builds value specifications for one compile unit.
///
/// Borrows the lambda context mutably, so every lambda built through one
/// builder draws its name from the same counter.
pub struct ExpressionBuilder<'a> {
    spans: &'a SpanResolver,
    options: &'a BuilderOptions,
    islands: &'a IslandRegistry,
    lambdas: &'a mut LambdaContext,
    depth: usize,
}

impl<'a> ExpressionBuilder<'a> {
    pub fn new(
        spans: &'a SpanResolver,
        options: &'a BuilderOptions,
        islands: &'a IslandRegistry,
        lambdas: &'a mut LambdaContext,
    ) -> Self {
        Self {
            spans,
            options,
            islands,
            lambdas,
            depth: 0,
        }
    }

    fn span(&self, node: &SyntaxNode) -> SourceSpan {
        self.spans.span(node.text_range())
    }

    fn missing(&self, node: &SyntaxNode, what: &str) -> ParseError {
        ParseError::syntax(ErrorCode::E0401, format!("missing {}", what), self.span(node))
    }

    /// Run `f` one nesting level deeper.
    fn nested<T>(&mut self, node: &SyntaxNode, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= self.options.max_depth {
            return Err(ParseError::NestingTooDeep {
                max_depth: self.options.max_depth,
                span: self.span(node),
            });
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    // =========================================================================
    // Code blocks
    // =========================================================================

    pub fn code_block(&mut self, node: &parser::CodeBlock) -> Result<Vec<ValueSpecification>> {
        node.lines().map(|line| self.program_line(&line)).collect()
    }

    pub fn program_line(&mut self, line: &ProgramLine) -> Result<ValueSpecification> {
        match line {
            ProgramLine::Expr(expr) => self.combined(expr),
            ProgramLine::Let(let_expr) => {
                let name = let_expr
                    .name()
                    .ok_or_else(|| self.missing(let_expr.syntax(), "variable name"))?;
                let value = let_expr
                    .value()
                    .ok_or_else(|| self.missing(let_expr.syntax(), "let value"))?;
                let value = self.combined(&value)?;
                let name = ValueSpecification::string(name.text(), Some(self.spans.span(name.text_range())));
                Ok(ValueSpecification::applied(
                    "letFunction",
                    vec![name, value],
                    Some(self.span(let_expr.syntax())),
                ))
            }
        }
    }

    // =========================================================================
    // Operator runs
    // =========================================================================

    /// Build a flat operator run.
    ///
    /// Arithmetic parts merge into the operand they follow; an equality part
    /// closes the current operand as its left side; boolean parts separate
    /// operands, which are merged last.
    pub fn combined(&mut self, node: &CombinedExpr) -> Result<ValueSpecification> {
        let head = node.head().ok_or_else(|| self.missing(node.syntax(), "expression"))?;
        let mut seed = self.expression(&head)?;
        let mut pending: Vec<Part<ArithmeticOp>> = Vec::new();
        let mut operands = Vec::new();
        let mut booleans = Vec::new();

        for part in node.parts() {
            match part {
                ExpressionPart::Arithmetic(arith) => pending.push(self.arithmetic_part(&arith)?),
                ExpressionPart::Equality(eq) => {
                    let left = merge(seed, std::mem::take(&mut pending));
                    let operand = eq
                        .operand()
                        .ok_or_else(|| self.missing(eq.syntax(), "right operand"))?;
                    let right_seed = self.expression(&operand)?;
                    let right_parts = eq
                        .arithmetic_parts()
                        .map(|p| self.arithmetic_part(&p))
                        .collect::<Result<Vec<_>>>()?;
                    let right = merge(right_seed, right_parts);
                    let source = cover(left.source(), right.source());
                    let equal = ValueSpecification::applied("equal", vec![left, right], source.clone());
                    seed = if eq.operator() == Some(SyntaxKind::BANG_EQ) {
                        ValueSpecification::applied("not", vec![equal], source)
                    } else {
                        equal
                    };
                }
                ExpressionPart::Boolean(boolean) => {
                    let op = boolean
                        .operator()
                        .and_then(BooleanOp::from_kind)
                        .ok_or_else(|| self.missing(boolean.syntax(), "boolean operator"))?;
                    let operand = boolean
                        .operand()
                        .ok_or_else(|| self.missing(boolean.syntax(), "right operand"))?;
                    operands.push(merge(seed, std::mem::take(&mut pending)));
                    booleans.push(op);
                    seed = self.expression(&operand)?;
                }
            }
        }
        let last = merge(seed, pending);

        if booleans.is_empty() {
            return Ok(last);
        }
        operands.push(last);
        let mut operands = operands.into_iter();
        let Some(first) = operands.next() else {
            return Err(self.missing(node.syntax(), "operand"));
        };
        let parts = booleans.into_iter().zip(operands.map(|v| vec![v])).collect();
        Ok(merge(first, parts))
    }

    fn arithmetic_part(&mut self, part: &parser::ArithmeticPart) -> Result<Part<ArithmeticOp>> {
        let op = part
            .operator()
            .and_then(ArithmeticOp::from_kind)
            .ok_or_else(|| self.missing(part.syntax(), "arithmetic operator"))?;
        let operands = part
            .operands()
            .map(|e| self.expression(&e))
            .collect::<Result<Vec<_>>>()?;
        trace!(?op, count = operands.len(), "arithmetic part");
        Ok((op, operands))
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    /// Build a primary and thread it through its postfix suffixes.
    pub fn expression(&mut self, node: &Expression) -> Result<ValueSpecification> {
        self.nested(node.syntax(), |this| this.postfix_chain(node))
    }

    // Kept out of the closure so each nesting level holds only small frames.
    fn postfix_chain(&mut self, node: &Expression) -> Result<ValueSpecification> {
        let primary = node
            .primary()
            .ok_or_else(|| self.missing(node.syntax(), "expression"))?;
        let suffixes: Vec<PostfixSuffix> = node.suffixes().collect();
        let start = primary.syntax().text_range().start();

        let (mut value, rest) = match self.all_family(&primary, &suffixes)? {
            Some(value) => (value, &suffixes[1..]),
            None => (self.primary(&primary)?, &suffixes[..]),
        };
        for suffix in rest {
            let range = TextRange::new(start, suffix.syntax().text_range().end());
            value = self.suffix(value, suffix, self.spans.span(range))?;
        }
        Ok(value)
    }

    /// `Class.all()`, `Class.allVersions()` and friends.
    ///
    /// Returns `None` when the primary and first suffix aren't that shape.
    fn all_family(&mut self, primary: &Primary, suffixes: &[PostfixSuffix]) -> Result<Option<ValueSpecification>> {
        let (Primary::Name(name_ref), Some(PostfixSuffix::Property(suffix))) = (primary, suffixes.first()) else {
            return Ok(None);
        };
        if name_ref.args().is_some() {
            return Ok(None);
        }
        let Some(property) = suffix.name() else {
            return Ok(None);
        };
        let function = match property.text() {
            "all" => "getAll",
            "allVersions" => "getAllVersions",
            "allVersionsInRange" => {
                return Err(ParseError::unsupported(
                    "allVersionsInRange() is not supported",
                    self.span(suffix.syntax()),
                ));
            }
            _ => return Ok(None),
        };

        let class = name_ref
            .name()
            .ok_or_else(|| self.missing(name_ref.syntax(), "class name"))?;
        let class = ValueSpecification::element_ptr(
            class.to_string(),
            ReferenceHint::Class,
            Some(self.span(class.syntax())),
        );
        let mut parameters = vec![class];
        if let Some(args) = suffix.args() {
            for arg in args.args() {
                let date = self.combined(&arg)?;
                if !matches!(
                    date,
                    ValueSpecification::Variable(_)
                        | ValueSpecification::CDateTime { .. }
                        | ValueSpecification::CStrictDate { .. }
                        | ValueSpecification::CLatestDate { .. }
                ) {
                    return Err(ParseError::unsupported(
                        format!("{}() takes only dates or variables", property.text()),
                        self.span(arg.syntax()),
                    ));
                }
                parameters.push(date);
            }
        }
        let range = TextRange::new(
            primary.syntax().text_range().start(),
            suffix.syntax().text_range().end(),
        );
        trace!(function, "all() family");
        Ok(Some(ValueSpecification::applied(
            function,
            parameters,
            Some(self.spans.span(range)),
        )))
    }

    fn primary(&mut self, primary: &Primary) -> Result<ValueSpecification> {
        let node = primary.syntax();
        let source = Some(self.span(node));
        match primary {
            Primary::Literal(literal) => {
                let token = literal.token().ok_or_else(|| self.missing(node, "literal"))?;
                build_literal(&token, self.spans.span(token.text_range()))
            }
            Primary::Island(island) => {
                let token = island.token().ok_or_else(|| self.missing(node, "island"))?;
                self.islands.build(&token, self.spans)
            }
            Primary::New(new) => self.new_instance(new, source),
            Primary::Variable(var) => {
                let name = var.name().ok_or_else(|| self.missing(node, "variable name"))?;
                Ok(ValueSpecification::Variable(Variable::new(name.text(), source)))
            }
            Primary::Not(not) => {
                let operand = not.operand().ok_or_else(|| self.missing(node, "operand"))?;
                let operand = self.expression(&operand)?;
                Ok(ValueSpecification::applied("not", vec![operand], source))
            }
            Primary::Signed(signed) => {
                let operand = signed.operand().ok_or_else(|| self.missing(node, "operand"))?;
                let operand = self.expression(&operand)?;
                let function = if signed.is_negative() { "minus" } else { "plus" };
                Ok(ValueSpecification::applied(
                    function,
                    vec![ValueSpecification::collection(vec![operand], source.clone())],
                    source,
                ))
            }
            Primary::Array(array) => {
                let items = array
                    .items()
                    .map(|item| self.combined(&item))
                    .collect::<Result<Vec<_>>>()?;
                Ok(ValueSpecification::collection(items, source))
            }
            Primary::Paren(paren) => {
                let inner = paren.inner().ok_or_else(|| self.missing(node, "expression"))?;
                self.combined(&inner)
            }
            Primary::Lambda(lambda) => self.lambda(lambda),
            Primary::Name(name_ref) => self.name_ref(name_ref, source),
            Primary::UnitType(unit_type) => {
                let measure = unit_type.measure().ok_or_else(|| self.missing(node, "measure"))?;
                let unit = unit_type.unit().ok_or_else(|| self.missing(node, "unit"))?;
                Ok(ValueSpecification::UnitType {
                    unit: format_smolstr!("{}~{}", measure, unit.text()),
                    source,
                })
            }
        }
    }

    /// `^Class(key = value, ...)`
    fn new_instance(&mut self, new: &parser::NewExpr, source: Option<SourceSpan>) -> Result<ValueSpecification> {
        let class = new.class().ok_or_else(|| self.missing(new.syntax(), "class name"))?;
        let class_ptr = ValueSpecification::element_ptr(
            class.to_string(),
            ReferenceHint::Unresolved,
            Some(self.span(class.syntax())),
        );
        let mut assignments = Vec::new();
        for entry in new.entries() {
            let key = entry.key().ok_or_else(|| self.missing(entry.syntax(), "property name"))?;
            let value = entry
                .value()
                .ok_or_else(|| self.missing(entry.syntax(), "property value"))?;
            assignments.push(ValueSpecification::KeyExpression {
                key: SmolStr::new(key.text()),
                value: Box::new(self.combined(&value)?),
                source: Some(self.span(entry.syntax())),
            });
        }
        Ok(ValueSpecification::applied(
            "new",
            vec![
                class_ptr,
                ValueSpecification::string("", None),
                ValueSpecification::collection(assignments, source.clone()),
            ],
            source,
        ))
    }

    fn name_ref(&mut self, name_ref: &parser::NameRef, source: Option<SourceSpan>) -> Result<ValueSpecification> {
        let name = name_ref
            .name()
            .ok_or_else(|| self.missing(name_ref.syntax(), "name"))?;
        let path = name.to_string();
        if let Some(args) = name_ref.args() {
            let parameters = args
                .args()
                .map(|arg| self.combined(&arg))
                .collect::<Result<Vec<_>>>()?;
            return Ok(ValueSpecification::applied(path, parameters, source));
        }
        if PRIMITIVE_TYPES.contains(&path.as_str()) {
            return Ok(ValueSpecification::PrimitiveType {
                name: SmolStr::new(path),
                source,
            });
        }
        Ok(ValueSpecification::element_ptr(path, ReferenceHint::Unresolved, source))
    }

    fn suffix(&mut self, receiver: ValueSpecification, suffix: &PostfixSuffix, span: SourceSpan) -> Result<ValueSpecification> {
        let node = suffix.syntax();
        match suffix {
            PostfixSuffix::Property(property) => {
                let name = property.name().ok_or_else(|| self.missing(node, "property name"))?;
                let mut parameters = vec![receiver];
                if let Some(args) = property.args() {
                    for arg in args.args() {
                        parameters.push(self.combined(&arg)?);
                    }
                }
                Ok(ValueSpecification::property(name.text(), parameters, Some(span)))
            }
            PostfixSuffix::Function(function) => {
                let name = function.name().ok_or_else(|| self.missing(node, "function name"))?;
                let mut parameters = vec![receiver];
                if let Some(args) = function.args() {
                    for arg in args.args() {
                        parameters.push(self.combined(&arg)?);
                    }
                }
                Ok(ValueSpecification::applied(name.to_string(), parameters, Some(span)))
            }
            PostfixSuffix::Bracket(bracket) => {
                if !self.options.allow_property_brackets {
                    return Err(ParseError::unsupported(
                        "bracket indexing is deprecated; use ->get() or ->at()",
                        self.span(node),
                    ));
                }
                let key = bracket.key().ok_or_else(|| self.missing(node, "index"))?;
                warn!(key = key.text(), "deprecated bracket indexing accepted");
                if key.kind() == SyntaxKind::STRING {
                    let key = ValueSpecification::string(unquote(key.text()), None);
                    Ok(ValueSpecification::applied("get", vec![receiver, key], Some(span)))
                } else {
                    let key = build_literal(&key, self.spans.span(key.text_range()))?;
                    Ok(ValueSpecification::applied("at", vec![receiver, key], Some(span)))
                }
            }
        }
    }

    // =========================================================================
    // Lambdas
    // =========================================================================

    fn lambda(&mut self, node: &parser::LambdaExpr) -> Result<ValueSpecification> {
        let name = self.lambdas.next_name();
        trace!(%name, "lambda");
        let parameters = node
            .params()
            .map(|param| self.lambda_param(&param))
            .collect::<Result<Vec<_>>>()?;
        let body = match node.body() {
            Some(body) => self.code_block(&body)?,
            None => Vec::new(),
        };
        Ok(ValueSpecification::Lambda(Lambda {
            name: Some(name),
            parameters,
            body,
            source: Some(self.span(node.syntax())),
        }))
    }

    /// `x` or `x: Type[m]`.
    pub fn lambda_param(&self, node: &parser::LambdaParam) -> Result<Variable> {
        let name = node
            .name()
            .ok_or_else(|| self.missing(node.syntax(), "parameter name"))?;
        let source = Some(self.span(node.syntax()));
        let Some(type_ref) = node.type_ref() else {
            return Ok(Variable::new(name.text(), source));
        };
        let multiplicity = match node.multiplicity() {
            Some(m) => build_multiplicity(&m, self.spans)?,
            None => Multiplicity::default(),
        };
        Ok(Variable::typed(name.text(), type_name(&type_ref), multiplicity, source))
    }

    /// Wrap a single expression as an unnamed, parameterless lambda.
    ///
    /// Used for declaration bodies (constraints, defaults) that carry no
    /// lambda syntax of their own.
    pub fn wrap_lambda(&mut self, node: &CombinedExpr, parameters: Vec<Variable>) -> Result<Lambda> {
        let body = self.combined(node)?;
        Ok(Lambda {
            name: None,
            parameters,
            body: vec![body],
            source: Some(self.span(node.syntax())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::source::TranslationContext;
    use crate::parser::parse_pure;

    fn build_with(body: &str, options: &BuilderOptions) -> Result<Vec<ValueSpecification>> {
        let text = format!("function f():Any[*]{{{}}}", body);
        let parse = parse_pure(&text);
        assert!(parse.ok(), "{:?}", parse.errors);
        let block = parse
            .syntax()
            .descendants()
            .find_map(parser::CodeBlock::cast)
            .unwrap();
        let spans = SpanResolver::new(&text, TranslationContext::from_options(options));
        let islands = IslandRegistry::default();
        let mut lambdas = LambdaContext::new("f");
        ExpressionBuilder::new(&spans, options, &islands, &mut lambdas).code_block(&block)
    }

    fn build(body: &str) -> String {
        let values = build_with(body, &BuilderOptions::default()).unwrap();
        values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join("; ")
    }

    #[test]
    fn test_flat_arithmetic() {
        assert_eq!(build("1+2*3"), "times([plus([1, 2]), 3])");
        assert_eq!(build("1+2+3"), "plus([1, 2, 3])");
        assert_eq!(build("1<2+3"), "lessThan(1, plus([2, 3]))");
    }

    #[test]
    fn test_boolean_and_equality_layers() {
        assert_eq!(build("$a == 1 && $b != 2"), "and(equal($a, 1), not(equal($b, 2)))");
        assert_eq!(build("$a + 1 == $b * 2"), "equal(plus([$a, 1]), times([$b, 2]))");
        assert_eq!(build("$a || $b && $c"), "or($a, and($b, $c))");
    }

    #[test]
    fn test_paren_groups_are_atomic() {
        assert_eq!(build("1*(2+3)"), "times([1, plus([2, 3])])");
    }

    #[test]
    fn test_prefix_operators() {
        assert_eq!(build("!true"), "not(true)");
        assert_eq!(build("-5"), "minus([5])");
    }

    #[test]
    fn test_names_classify() {
        assert_eq!(build("String"), "String");
        let values = build_with("a::Person", &BuilderOptions::default()).unwrap();
        assert!(matches!(
            values[0],
            ValueSpecification::PackageableElementPtr { hint: ReferenceHint::Unresolved, .. }
        ));
    }

    #[test]
    fn test_all_family() {
        assert_eq!(build("a::Person.all()"), "getAll(a::Person)");
        assert_eq!(build("A.allVersions(%2020-01-01)"), "getAllVersions(A, %2020-01-01)");
        let values = build_with("A.all()", &BuilderOptions::default()).unwrap();
        let ValueSpecification::AppliedFunction(f) = &values[0] else { panic!() };
        assert!(matches!(
            f.parameters[0],
            ValueSpecification::PackageableElementPtr { hint: ReferenceHint::Class, .. }
        ));
    }

    #[test]
    fn test_all_versions_in_range_is_unsupported() {
        let err = build_with("A.allVersionsInRange(%2020, %2021)", &BuilderOptions::default()).unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedSyntax { .. }));
    }

    #[test]
    fn test_suffix_chain() {
        assert_eq!(build("$p.firm.name->toUpper()"), "toUpper(.name(.firm($p)))");
        assert_eq!(build("$p.address('home')"), ".address($p, 'home')");
    }

    #[test]
    fn test_brackets_require_flag() {
        let err = build_with("$x['k']", &BuilderOptions::default()).unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedSyntax { .. }));

        let options = BuilderOptions::default().with_property_brackets(true);
        let values = build_with("$x['k']; $x[3]", &options).unwrap();
        assert_eq!(values[0].to_string(), "get($x, 'k')");
        assert_eq!(values[1].to_string(), "at($x, 3)");
        let ValueSpecification::AppliedFunction(get) = &values[0] else { panic!() };
        assert_eq!(get.parameters[1].source(), None);
    }

    #[test]
    fn test_new_instance() {
        assert_eq!(build("^a::P(name='x', age=3)"), "new(a::P, '', [name='x', age=3])");
    }

    #[test]
    fn test_lambdas_are_named_in_order() {
        let values = build_with("{x|$x + 1}; y|$y", &BuilderOptions::default()).unwrap();
        let names: Vec<_> = values
            .iter()
            .map(|v| match v {
                ValueSpecification::Lambda(l) => l.name.clone().unwrap(),
                other => panic!("not a lambda: {}", other),
            })
            .collect();
        assert_eq!(names, ["f$0", "f$1"]);
    }

    #[test]
    fn test_typed_lambda_parameter() {
        let values = build_with("{x: Integer[1..*]|$x}", &BuilderOptions::default()).unwrap();
        let ValueSpecification::Lambda(lambda) = &values[0] else { panic!() };
        assert_eq!(lambda.parameters[0].type_name.as_deref(), Some("Integer"));
        assert_eq!(lambda.parameters[0].multiplicity, Some(Multiplicity::new(1, None)));
    }

    #[test]
    fn test_let_line() {
        assert_eq!(build("let x = 1; $x"), "letFunction('x', 1); $x");
    }

    #[test]
    fn test_unit_type() {
        assert_eq!(build("a::Mass~Kilogram"), "a::Mass~Kilogram");
    }

    #[test]
    fn test_nesting_limit() {
        let options = BuilderOptions::default().with_max_depth(8);
        let body = format!("{}1{}", "(".repeat(10), ")".repeat(10));
        let err = build_with(&body, &options).unwrap_err();
        assert!(matches!(err, ParseError::NestingTooDeep { max_depth: 8, .. }));
    }
}
