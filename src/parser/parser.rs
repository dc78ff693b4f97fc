//! Recursive descent parser for Pure
//!
//! Builds a rowan GreenNode tree from tokens.
//! Supports error recovery and produces a lossless CST.
//!
//! Expressions are parsed into the flattened shape the builder expects: a
//! `COMBINED_EXPR` holds a head `EXPRESSION` followed by a flat run of
//! `ARITHMETIC_PART` / `BOOLEAN_PART` / `EQUALITY_PART` nodes. No precedence is
//! resolved here; that is the builder's job.

use super::errors::{ErrorCode, SyntaxError};
use super::lexer::{Lexer, Token};
use super::syntax_kind::{SyntaxKind, kind_to_name};
use rowan::{GreenNode, GreenNodeBuilder, TextRange, TextSize, Checkpoint};

/// Expression nesting [`parse_pure`] descends into before reporting E0405.
pub const DEFAULT_PARSE_DEPTH: usize = 256;

/// Parse result containing the green tree and any errors
#[derive(Debug, Clone)]
pub struct Parse {
    pub green: GreenNode,
    pub errors: Vec<SyntaxError>,
}

impl Parse {
    /// Get the root syntax node
    pub fn syntax(&self) -> super::SyntaxNode {
        super::SyntaxNode::new_root(self.green.clone())
    }

    /// Check if parsing succeeded without errors
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parse Pure source code into a CST
pub fn parse_pure(input: &str) -> Parse {
    parse_pure_with_depth(input, DEFAULT_PARSE_DEPTH)
}

/// Parse with a custom expression nesting limit.
///
/// Nesting past `max_depth` is reported as E0405 and the rest of that
/// expression is skipped, so deep input never exhausts the stack.
pub fn parse_pure_with_depth(input: &str, max_depth: usize) -> Parse {
    let tokens: Vec<_> = Lexer::new(input).collect();
    let mut parser = Parser::new(&tokens, max_depth);
    parser.parse_source_file();
    parser.finish()
}

const ELEMENT_START: &[SyntaxKind] = &[
    SyntaxKind::IMPORT_KW,
    SyntaxKind::CLASS_KW,
    SyntaxKind::ASSOCIATION_KW,
    SyntaxKind::ENUM_KW,
    SyntaxKind::PROFILE_KW,
    SyntaxKind::FUNCTION_KW,
    SyntaxKind::MEASURE_KW,
];

const EXPRESSION_END: &[SyntaxKind] = &[
    SyntaxKind::SEMICOLON,
    SyntaxKind::COMMA,
    SyntaxKind::R_BRACE,
    SyntaxKind::R_PAREN,
    SyntaxKind::R_BRACKET,
];

/// The parser state
struct Parser<'a> {
    tokens: &'a [Token<'a>],
    pos: usize,
    depth: usize,
    max_depth: usize,
    builder: GreenNodeBuilder<'static>,
    errors: Vec<SyntaxError>,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token<'a>], max_depth: usize) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
            max_depth,
            builder: GreenNodeBuilder::new(),
            errors: Vec::new(),
        }
    }

    fn finish(self) -> Parse {
        Parse {
            green: self.builder.finish(),
            errors: self.errors,
        }
    }

    // =========================================================================
    // Token inspection (all lookahead skips trivia)
    // =========================================================================

    fn nth_token(&self, n: usize) -> Option<&Token<'a>> {
        self.tokens[self.pos.min(self.tokens.len())..]
            .iter()
            .filter(|t| !t.kind.is_trivia())
            .nth(n)
    }

    fn nth(&self, n: usize) -> SyntaxKind {
        self.nth_token(n).map(|t| t.kind).unwrap_or(SyntaxKind::ERROR)
    }

    fn current_kind(&self) -> SyntaxKind {
        self.nth(0)
    }

    fn at(&self, kind: SyntaxKind) -> bool {
        self.current_kind() == kind
    }

    fn at_any(&self, kinds: &[SyntaxKind]) -> bool {
        kinds.contains(&self.current_kind())
    }

    fn at_name(&self) -> bool {
        self.current_kind().is_contextual_name()
    }

    fn at_eof(&self) -> bool {
        self.nth_token(0).is_none()
    }

    // =========================================================================
    // Token consumption
    // =========================================================================

    fn skip_trivia(&mut self) {
        while let Some(token) = self.tokens.get(self.pos) {
            if !token.kind.is_trivia() {
                break;
            }
            self.builder.token(token.kind.into(), token.text);
            self.pos += 1;
        }
    }

    fn bump(&mut self) {
        self.skip_trivia();
        if let Some(token) = self.tokens.get(self.pos) {
            self.builder.token(token.kind.into(), token.text);
            self.pos += 1;
        }
    }

    fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: SyntaxKind) -> bool {
        self.expect_with(kind, ErrorCode::E0902)
    }

    fn expect_with(&mut self, kind: SyntaxKind, code: ErrorCode) -> bool {
        if self.eat(kind) {
            true
        } else {
            let found = kind_to_name(self.current_kind());
            self.error(code, format!("expected {}, found {}", kind_to_name(kind), found));
            false
        }
    }

    fn expect_lambda_pipe(&mut self) -> bool {
        if self.eat(SyntaxKind::PIPE) {
            return true;
        }
        let found = kind_to_name(self.current_kind());
        self.error_with_hint(
            ErrorCode::E0402,
            format!("expected '|', found {}", found),
            "separate lambda parameters from the body with '|'",
        );
        false
    }

    fn expect_name(&mut self) -> bool {
        if self.at_name() {
            self.bump();
            true
        } else {
            let found = kind_to_name(self.current_kind());
            self.error(ErrorCode::E0301, format!("expected identifier, found {}", found));
            false
        }
    }

    // =========================================================================
    // Error handling
    // =========================================================================

    fn current_range(&self) -> TextRange {
        match self.nth_token(0) {
            Some(t) => TextRange::at(t.offset, TextSize::of(t.text)),
            None => {
                let end = self
                    .tokens
                    .last()
                    .map(|t| t.offset + TextSize::of(t.text))
                    .unwrap_or_default();
                TextRange::empty(end)
            }
        }
    }

    fn error(&mut self, code: ErrorCode, message: impl Into<String>) {
        let range = self.current_range();
        self.errors.push(SyntaxError::new(message, range, code));
    }

    fn error_with_hint(&mut self, code: ErrorCode, message: impl Into<String>, hint: &str) {
        let range = self.current_range();
        self.errors.push(SyntaxError::new(message, range, code).with_hint(hint));
    }

    fn error_recover(&mut self, code: ErrorCode, message: impl Into<String>, recovery: &[SyntaxKind]) {
        self.error(code, message);
        self.start_node(SyntaxKind::ERROR);
        let mut consumed = false;
        while !self.at_eof() && !self.at_any(recovery) {
            self.bump();
            consumed = true;
        }
        // Always make progress
        if !consumed && !self.at_eof() {
            self.bump();
        }
        self.finish_node();
    }

    // =========================================================================
    // Node building helpers
    // =========================================================================

    /// Start a node; leading trivia stays with the parent.
    fn start_node(&mut self, kind: SyntaxKind) {
        self.skip_trivia();
        self.builder.start_node(kind.into());
    }

    fn checkpoint(&mut self) -> Checkpoint {
        self.skip_trivia();
        self.builder.checkpoint()
    }

    fn start_node_at(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) {
        self.builder.start_node_at(checkpoint, kind.into());
    }

    fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    // =========================================================================
    // Top level
    // =========================================================================

    /// SourceFile = (Import | Element)*
    fn parse_source_file(&mut self) {
        // Leading trivia must land inside the root.
        self.builder.start_node(SyntaxKind::SOURCE_FILE.into());

        while !self.at_eof() {
            let pos_before = self.pos;
            match self.current_kind() {
                SyntaxKind::IMPORT_KW => self.parse_import(),
                SyntaxKind::CLASS_KW => self.parse_class(),
                SyntaxKind::ASSOCIATION_KW => self.parse_association(),
                SyntaxKind::ENUM_KW => self.parse_enumeration(),
                SyntaxKind::PROFILE_KW => self.parse_profile(),
                SyntaxKind::FUNCTION_KW => self.parse_function(),
                SyntaxKind::MEASURE_KW => self.parse_measure(),
                SyntaxKind::ERROR => {
                    self.error_recover(ErrorCode::E0101, "invalid token", ELEMENT_START);
                }
                kind => {
                    self.error_recover(
                        ErrorCode::E0901,
                        format!("unexpected {} at top level", kind_to_name(kind)),
                        ELEMENT_START,
                    );
                }
            }
            if self.pos == pos_before && !self.at_eof() {
                self.bump();
            }
        }
        // Trailing trivia belongs to the file
        self.skip_trivia();
        self.finish_node();
    }

    /// Import = 'import' QualifiedName '::' '*' ';'
    fn parse_import(&mut self) {
        self.start_node(SyntaxKind::IMPORT);
        self.bump(); // import
        self.parse_qualified_name();
        if self.expect_with(SyntaxKind::COLON_COLON, ErrorCode::E0501) {
            self.expect_with(SyntaxKind::STAR, ErrorCode::E0501);
        }
        self.expect_with(SyntaxKind::SEMICOLON, ErrorCode::E0201);
        self.finish_node();
    }

    /// QualifiedName = Name ('::' Name)*
    fn parse_qualified_name(&mut self) {
        self.start_node(SyntaxKind::QUALIFIED_NAME);
        self.expect_name();
        while self.at(SyntaxKind::COLON_COLON) && self.nth(1).is_contextual_name() {
            self.bump(); // ::
            self.bump(); // name
        }
        self.finish_node();
    }

    /// Stereotypes = '<<' Stereotype (',' Stereotype)* '>>'
    fn parse_stereotypes(&mut self) {
        self.start_node(SyntaxKind::STEREOTYPES);
        self.bump(); // <<
        loop {
            self.start_node(SyntaxKind::STEREOTYPE);
            self.parse_qualified_name();
            self.expect(SyntaxKind::DOT);
            self.expect_name();
            self.finish_node();
            if !self.eat(SyntaxKind::COMMA) {
                break;
            }
        }
        self.expect(SyntaxKind::GT_GT);
        self.finish_node();
    }

    /// TaggedValues = '{' TaggedValue (',' TaggedValue)* '}'
    fn parse_tagged_values(&mut self) {
        self.start_node(SyntaxKind::TAGGED_VALUES);
        self.bump(); // {
        loop {
            self.start_node(SyntaxKind::TAGGED_VALUE);
            self.parse_qualified_name();
            self.expect(SyntaxKind::DOT);
            self.expect_name();
            self.expect(SyntaxKind::EQ);
            self.expect(SyntaxKind::STRING);
            self.finish_node();
            if !self.eat(SyntaxKind::COMMA) {
                break;
            }
        }
        self.expect_with(SyntaxKind::R_BRACE, ErrorCode::E0202);
        self.finish_node();
    }

    /// Optional `<<...>>` and `{...}` annotations in declaration headers
    fn parse_annotations(&mut self) {
        if self.at(SyntaxKind::LT_LT) {
            self.parse_stereotypes();
        }
        // `{` only opens tagged values when it is followed by `profile.tag`
        if self.at(SyntaxKind::L_BRACE) && self.nth(1).is_contextual_name() && self.looks_like_tagged_value() {
            self.parse_tagged_values();
        }
    }

    fn looks_like_tagged_value(&self) -> bool {
        // { a::b::p . tag =
        let mut n = 1;
        while self.nth(n).is_contextual_name() && self.nth(n + 1) == SyntaxKind::COLON_COLON {
            n += 2;
        }
        self.nth(n).is_contextual_name() && self.nth(n + 1) == SyntaxKind::DOT
    }

    /// Multiplicity = '[' (INTEGER '..')? (INTEGER | '*') ']'
    fn parse_multiplicity(&mut self) {
        self.start_node(SyntaxKind::MULTIPLICITY);
        self.expect_with(SyntaxKind::L_BRACKET, ErrorCode::E0303);
        if self.at(SyntaxKind::INTEGER) && self.nth(1) == SyntaxKind::DOT_DOT {
            self.bump();
            self.bump();
        }
        if self.at(SyntaxKind::INTEGER) || self.at(SyntaxKind::STAR) {
            self.bump();
        } else {
            self.error(ErrorCode::E0303, "expected integer or '*' in multiplicity");
        }
        self.expect_with(SyntaxKind::R_BRACKET, ErrorCode::E0204);
        self.finish_node();
    }

    /// TypeRef = QualifiedName ('~' Name)?
    fn parse_type_ref(&mut self) {
        self.start_node(SyntaxKind::TYPE_REF);
        if self.at_name() {
            self.parse_qualified_name();
            if self.at(SyntaxKind::TILDE) {
                self.start_node(SyntaxKind::UNIT_NAME);
                self.bump(); // ~
                self.expect_name();
                self.finish_node();
            }
        } else {
            self.error(ErrorCode::E0302, "expected type");
        }
        self.finish_node();
    }

    /// Parameter = Name ':' TypeRef Multiplicity
    fn parse_parameter(&mut self) {
        self.start_node(SyntaxKind::PARAMETER);
        self.expect_name();
        self.expect_with(SyntaxKind::COLON, ErrorCode::E0302);
        self.parse_type_ref();
        self.parse_multiplicity();
        self.finish_node();
    }

    /// ParameterList = '(' (Parameter (',' Parameter)*)? ')'
    fn parse_parameter_list(&mut self) {
        self.start_node(SyntaxKind::PARAMETER_LIST);
        self.expect(SyntaxKind::L_PAREN);
        if !self.at(SyntaxKind::R_PAREN) {
            loop {
                self.parse_parameter();
                if !self.eat(SyntaxKind::COMMA) {
                    break;
                }
            }
        }
        self.expect_with(SyntaxKind::R_PAREN, ErrorCode::E0203);
        self.finish_node();
    }

    // =========================================================================
    // Elements
    // =========================================================================

    /// Class = 'Class' Annotations QualifiedName ('extends' SuperTypes)? Constraints? ClassBody
    fn parse_class(&mut self) {
        self.start_node(SyntaxKind::CLASS_DEF);
        self.bump(); // Class
        self.parse_annotations();
        self.parse_qualified_name();
        if self.at(SyntaxKind::EXTENDS_KW) {
            self.start_node(SyntaxKind::SUPER_TYPES);
            self.bump();
            loop {
                self.parse_type_ref();
                if !self.eat(SyntaxKind::COMMA) {
                    break;
                }
            }
            self.finish_node();
        }
        if self.at(SyntaxKind::L_BRACKET) {
            self.parse_constraint_list();
        }
        self.parse_class_body();
        self.finish_node();
    }

    /// Constraints = '[' Constraint (',' Constraint)* ']'
    fn parse_constraint_list(&mut self) {
        self.start_node(SyntaxKind::CONSTRAINT_LIST);
        self.bump(); // [
        if !self.at(SyntaxKind::R_BRACKET) {
            loop {
                self.parse_constraint();
                if !self.eat(SyntaxKind::COMMA) {
                    break;
                }
            }
        }
        self.expect_with(SyntaxKind::R_BRACKET, ErrorCode::E0204);
        self.finish_node();
    }

    /// Constraint = Name ':' CombinedExpr
    ///            | Name '(' ('~' Name ':' ...)* ')'
    ///            | CombinedExpr
    fn parse_constraint(&mut self) {
        self.start_node(SyntaxKind::CONSTRAINT);
        if self.at_name() && self.nth(1) == SyntaxKind::COLON {
            self.bump(); // name
            self.bump(); // :
            self.parse_combined_expression();
        } else if self.at_name() && self.nth(1) == SyntaxKind::L_PAREN && self.nth(2) == SyntaxKind::TILDE {
            self.bump(); // name
            self.bump(); // (
            while self.at(SyntaxKind::TILDE) {
                self.parse_constraint_clause();
            }
            self.expect_with(SyntaxKind::R_PAREN, ErrorCode::E0203);
        } else {
            self.parse_combined_expression();
        }
        self.finish_node();
    }

    fn parse_constraint_clause(&mut self) {
        let clause = self.nth_token(1).map(|t| t.text).unwrap_or("");
        let kind = match clause {
            "function" => SyntaxKind::CONSTRAINT_FUNCTION,
            "message" => SyntaxKind::CONSTRAINT_MESSAGE,
            "externalId" => SyntaxKind::CONSTRAINT_EXTERNAL_ID,
            "enforcementLevel" => SyntaxKind::CONSTRAINT_ENFORCEMENT,
            other => {
                let message = format!("unknown constraint clause '~{}'", other);
                self.error_recover(ErrorCode::E0304, message, &[SyntaxKind::TILDE, SyntaxKind::R_PAREN]);
                return;
            }
        };
        self.start_node(kind);
        self.bump(); // ~
        self.bump(); // clause name (function is a keyword, the rest are identifiers)
        self.expect(SyntaxKind::COLON);
        match kind {
            SyntaxKind::CONSTRAINT_EXTERNAL_ID => {
                self.expect(SyntaxKind::STRING);
            }
            SyntaxKind::CONSTRAINT_ENFORCEMENT => {
                self.expect_name();
            }
            _ => self.parse_combined_expression(),
        }
        self.finish_node();
    }

    /// ClassBody = '{' (Property | QualifiedProperty)* '}'
    fn parse_class_body(&mut self) {
        self.start_node(SyntaxKind::CLASS_BODY);
        if !self.expect_with(SyntaxKind::L_BRACE, ErrorCode::E0202) {
            self.finish_node();
            return;
        }
        while !self.at_eof() && !self.at(SyntaxKind::R_BRACE) {
            let pos_before = self.pos;
            self.parse_class_member();
            if self.pos == pos_before {
                self.error_recover(
                    ErrorCode::E0304,
                    format!("unexpected {} in element body", kind_to_name(self.current_kind())),
                    &[SyntaxKind::SEMICOLON, SyntaxKind::R_BRACE],
                );
                self.eat(SyntaxKind::SEMICOLON);
            }
        }
        self.expect_with(SyntaxKind::R_BRACE, ErrorCode::E0202);
        self.finish_node();
    }

    fn parse_class_member(&mut self) {
        if !(self.at_name() || self.at_any(&[SyntaxKind::LT_LT, SyntaxKind::L_BRACE, SyntaxKind::L_PAREN])) {
            return;
        }
        let checkpoint = self.checkpoint();
        self.parse_annotations();
        if self.at(SyntaxKind::L_PAREN) {
            self.start_node(SyntaxKind::AGGREGATION);
            self.bump(); // (
            self.expect_name();
            self.expect_with(SyntaxKind::R_PAREN, ErrorCode::E0203);
            self.finish_node();
        }
        self.expect_name();
        if self.at(SyntaxKind::L_PAREN) {
            self.start_node_at(checkpoint, SyntaxKind::QUALIFIED_PROPERTY);
            self.parse_parameter_list();
            self.expect_with(SyntaxKind::L_BRACE, ErrorCode::E0202);
            self.parse_code_block();
            self.expect_with(SyntaxKind::R_BRACE, ErrorCode::E0202);
        } else {
            self.start_node_at(checkpoint, SyntaxKind::PROPERTY);
        }
        self.expect_with(SyntaxKind::COLON, ErrorCode::E0302);
        self.parse_type_ref();
        self.parse_multiplicity();
        if self.at(SyntaxKind::EQ) {
            self.start_node(SyntaxKind::DEFAULT_VALUE);
            self.bump(); // =
            self.parse_combined_expression();
            self.finish_node();
        }
        self.expect_with(SyntaxKind::SEMICOLON, ErrorCode::E0201);
        self.finish_node();
    }

    /// Association = 'Association' Annotations QualifiedName ClassBody
    fn parse_association(&mut self) {
        self.start_node(SyntaxKind::ASSOCIATION_DEF);
        self.bump(); // Association
        self.parse_annotations();
        self.parse_qualified_name();
        self.parse_class_body();
        self.finish_node();
    }

    /// Enum = 'Enum' Annotations QualifiedName '{' EnumValue (',' EnumValue)* '}'
    fn parse_enumeration(&mut self) {
        self.start_node(SyntaxKind::ENUM_DEF);
        self.bump(); // Enum
        self.parse_annotations();
        self.parse_qualified_name();
        if self.expect_with(SyntaxKind::L_BRACE, ErrorCode::E0202) {
            while !self.at_eof() && !self.at(SyntaxKind::R_BRACE) {
                self.start_node(SyntaxKind::ENUM_VALUE);
                self.parse_annotations();
                if !self.expect_name() {
                    self.finish_node();
                    self.error_recover(ErrorCode::E0304, "expected enum value", &[SyntaxKind::COMMA, SyntaxKind::R_BRACE]);
                } else {
                    self.finish_node();
                }
                if !self.eat(SyntaxKind::COMMA) {
                    break;
                }
            }
            self.expect_with(SyntaxKind::R_BRACE, ErrorCode::E0202);
        }
        self.finish_node();
    }

    /// Profile = 'Profile' QualifiedName '{' (ProfileStereotypes | ProfileTags)* '}'
    fn parse_profile(&mut self) {
        self.start_node(SyntaxKind::PROFILE_DEF);
        self.bump(); // Profile
        self.parse_qualified_name();
        if self.expect_with(SyntaxKind::L_BRACE, ErrorCode::E0202) {
            loop {
                let kind = match self.current_kind() {
                    SyntaxKind::STEREOTYPES_KW => SyntaxKind::PROFILE_STEREOTYPES,
                    SyntaxKind::TAGS_KW => SyntaxKind::PROFILE_TAGS,
                    _ => break,
                };
                self.start_node(kind);
                self.bump();
                self.expect(SyntaxKind::COLON);
                self.expect_with(SyntaxKind::L_BRACKET, ErrorCode::E0204);
                if !self.at(SyntaxKind::R_BRACKET) {
                    loop {
                        self.expect_name();
                        if !self.eat(SyntaxKind::COMMA) {
                            break;
                        }
                    }
                }
                self.expect_with(SyntaxKind::R_BRACKET, ErrorCode::E0204);
                self.expect_with(SyntaxKind::SEMICOLON, ErrorCode::E0201);
                self.finish_node();
            }
            self.expect_with(SyntaxKind::R_BRACE, ErrorCode::E0202);
        }
        self.finish_node();
    }

    /// Function = 'function' Annotations QualifiedName ParameterList ':' TypeRef Multiplicity '{' CodeBlock '}'
    fn parse_function(&mut self) {
        self.start_node(SyntaxKind::FUNCTION_DEF);
        self.bump(); // function
        self.parse_annotations();
        self.parse_qualified_name();
        self.parse_parameter_list();
        self.expect_with(SyntaxKind::COLON, ErrorCode::E0302);
        self.parse_type_ref();
        self.parse_multiplicity();
        if self.expect_with(SyntaxKind::L_BRACE, ErrorCode::E0202) {
            self.parse_code_block();
            self.expect_with(SyntaxKind::R_BRACE, ErrorCode::E0202);
        }
        self.finish_node();
    }

    /// Measure = 'Measure' QualifiedName '{' (UnitDef+ | NonConvertibleUnit+) '}'
    fn parse_measure(&mut self) {
        self.start_node(SyntaxKind::MEASURE_DEF);
        self.bump(); // Measure
        self.parse_qualified_name();
        if self.expect_with(SyntaxKind::L_BRACE, ErrorCode::E0202) {
            while !self.at_eof() && !self.at(SyntaxKind::R_BRACE) {
                let pos_before = self.pos;
                if self.at(SyntaxKind::STAR) || (self.at_name() && self.nth(1) == SyntaxKind::COLON) {
                    self.parse_unit_def();
                } else if self.at_name() && self.nth(1) == SyntaxKind::SEMICOLON {
                    self.start_node(SyntaxKind::NON_CONVERTIBLE_UNIT);
                    self.bump(); // name
                    self.bump(); // ;
                    self.finish_node();
                }
                if self.pos == pos_before {
                    self.error_recover(
                        ErrorCode::E0305,
                        "expected unit definition",
                        &[SyntaxKind::SEMICOLON, SyntaxKind::R_BRACE],
                    );
                    self.eat(SyntaxKind::SEMICOLON);
                }
            }
            self.expect_with(SyntaxKind::R_BRACE, ErrorCode::E0202);
        }
        self.finish_node();
    }

    /// UnitDef = '*'? Name ':' Name '->' CombinedExpr ';'
    fn parse_unit_def(&mut self) {
        self.start_node(SyntaxKind::UNIT_DEF);
        self.eat(SyntaxKind::STAR);
        self.expect_name();
        self.expect(SyntaxKind::COLON);
        self.start_node(SyntaxKind::UNIT_CONVERSION);
        self.start_node(SyntaxKind::LAMBDA_PARAM);
        self.expect_name();
        self.finish_node();
        self.expect(SyntaxKind::ARROW);
        self.parse_combined_expression();
        self.finish_node();
        self.expect_with(SyntaxKind::SEMICOLON, ErrorCode::E0201);
        self.finish_node();
    }

    // =========================================================================
    // Code blocks and expressions
    // =========================================================================

    /// CodeBlock = ProgramLine (';' ProgramLine)* ';'?
    fn parse_code_block(&mut self) {
        self.start_node(SyntaxKind::CODE_BLOCK);
        while !self.at_eof() && !self.at(SyntaxKind::R_BRACE) {
            let pos_before = self.pos;
            if self.at(SyntaxKind::LET_KW) {
                self.parse_let();
            } else {
                self.parse_combined_expression();
            }
            if !self.eat(SyntaxKind::SEMICOLON) {
                if !self.at(SyntaxKind::R_BRACE) && !self.at_eof() {
                    self.error(ErrorCode::E0201, "expected ';' between expressions");
                }
                if self.pos == pos_before {
                    self.error_recover(ErrorCode::E0401, "expected expression", &[SyntaxKind::SEMICOLON, SyntaxKind::R_BRACE]);
                    self.eat(SyntaxKind::SEMICOLON);
                } else {
                    break;
                }
            }
        }
        self.finish_node();
    }

    /// Let = 'let' Name '=' CombinedExpr
    fn parse_let(&mut self) {
        self.start_node(SyntaxKind::LET_EXPR);
        self.bump(); // let
        self.expect_name();
        self.expect(SyntaxKind::EQ);
        self.parse_combined_expression();
        self.finish_node();
    }

    /// CombinedExpr = Expression ExpressionPart*
    fn parse_combined_expression(&mut self) {
        self.start_node(SyntaxKind::COMBINED_EXPR);
        self.parse_expression();
        loop {
            match self.current_kind() {
                SyntaxKind::PLUS
                | SyntaxKind::STAR
                | SyntaxKind::MINUS
                | SyntaxKind::SLASH
                | SyntaxKind::LT
                | SyntaxKind::LT_EQ
                | SyntaxKind::GT
                | SyntaxKind::GT_EQ => self.parse_arithmetic_part(),
                SyntaxKind::AMP_AMP | SyntaxKind::PIPE_PIPE => {
                    self.start_node(SyntaxKind::BOOLEAN_PART);
                    self.bump();
                    self.parse_expression();
                    self.finish_node();
                }
                SyntaxKind::EQ_EQ | SyntaxKind::BANG_EQ => {
                    self.start_node(SyntaxKind::EQUALITY_PART);
                    self.bump();
                    self.parse_expression();
                    while self.at_any(&[
                        SyntaxKind::PLUS,
                        SyntaxKind::STAR,
                        SyntaxKind::MINUS,
                        SyntaxKind::SLASH,
                        SyntaxKind::LT,
                        SyntaxKind::LT_EQ,
                        SyntaxKind::GT,
                        SyntaxKind::GT_EQ,
                    ]) {
                        self.parse_arithmetic_part();
                    }
                    self.finish_node();
                }
                _ => break,
            }
        }
        self.finish_node();
    }

    /// ArithmeticPart groups a run of one repeated n-ary/divide operator;
    /// relational operators take exactly one operand.
    fn parse_arithmetic_part(&mut self) {
        self.start_node(SyntaxKind::ARITHMETIC_PART);
        let op = self.current_kind();
        self.bump();
        self.parse_expression();
        let repeatable = matches!(
            op,
            SyntaxKind::PLUS | SyntaxKind::STAR | SyntaxKind::MINUS | SyntaxKind::SLASH
        );
        while repeatable && self.at(op) {
            self.bump();
            self.parse_expression();
        }
        self.finish_node();
    }

    /// Expression = Primary PostfixSuffix*
    fn parse_expression(&mut self) {
        if self.depth >= self.max_depth {
            self.error_recover(ErrorCode::E0405, "expression nested too deeply", EXPRESSION_END);
            return;
        }
        self.depth += 1;
        self.start_node(SyntaxKind::EXPRESSION);
        self.parse_primary();
        self.parse_postfix_suffixes();
        self.finish_node();
        self.depth -= 1;
    }

    fn parse_primary(&mut self) {
        let kind = self.current_kind();
        match kind {
            k if k.is_literal() => {
                self.start_node(SyntaxKind::LITERAL);
                self.bump();
                self.finish_node();
            }
            k if k.is_island() => {
                self.start_node(SyntaxKind::ISLAND);
                self.bump();
                self.finish_node();
            }
            SyntaxKind::CARET => self.parse_new_expression(),
            SyntaxKind::DOLLAR => {
                self.start_node(SyntaxKind::VARIABLE_REF);
                self.bump(); // $
                self.expect_name();
                self.finish_node();
            }
            SyntaxKind::BANG => {
                self.start_node(SyntaxKind::NOT_EXPR);
                self.bump();
                self.parse_expression();
                self.finish_node();
            }
            SyntaxKind::PLUS | SyntaxKind::MINUS => {
                self.start_node(SyntaxKind::SIGNED_EXPR);
                self.bump();
                self.parse_expression();
                self.finish_node();
            }
            SyntaxKind::L_BRACKET => {
                self.start_node(SyntaxKind::ARRAY_EXPR);
                self.bump(); // [
                self.parse_expression_list(SyntaxKind::R_BRACKET);
                self.expect_with(SyntaxKind::R_BRACKET, ErrorCode::E0204);
                self.finish_node();
            }
            SyntaxKind::L_PAREN => {
                self.start_node(SyntaxKind::PAREN_EXPR);
                self.bump(); // (
                self.parse_combined_expression();
                self.expect_with(SyntaxKind::R_PAREN, ErrorCode::E0203);
                self.finish_node();
            }
            SyntaxKind::L_BRACE => self.parse_braced_lambda(),
            SyntaxKind::PIPE => {
                self.start_node(SyntaxKind::LAMBDA_EXPR);
                self.bump(); // |
                self.parse_lambda_line();
                self.finish_node();
            }
            _ if self.at_name() => {
                if self.nth(1) == SyntaxKind::PIPE
                    || (self.nth(1) == SyntaxKind::COLON && self.nth(2).is_contextual_name())
                {
                    self.parse_bare_lambda();
                } else {
                    self.parse_name_reference();
                }
            }
            _ => {
                let message = format!("expected expression, found {}", kind_to_name(kind));
                if self.at_any(EXPRESSION_END) || self.at_eof() {
                    self.error(ErrorCode::E0401, message);
                } else {
                    self.error_recover(ErrorCode::E0401, message, EXPRESSION_END);
                }
            }
        }
    }

    /// New = '^' QualifiedName '(' (KeyValue (',' KeyValue)*)? ')'
    fn parse_new_expression(&mut self) {
        self.start_node(SyntaxKind::NEW_EXPR);
        self.bump(); // ^
        self.parse_qualified_name();
        self.expect(SyntaxKind::L_PAREN);
        if !self.at(SyntaxKind::R_PAREN) {
            loop {
                self.start_node(SyntaxKind::KEY_VALUE);
                self.expect_name();
                self.expect(SyntaxKind::EQ);
                self.parse_combined_expression();
                self.finish_node();
                if !self.eat(SyntaxKind::COMMA) {
                    break;
                }
            }
        }
        self.expect_with(SyntaxKind::R_PAREN, ErrorCode::E0203);
        self.finish_node();
    }

    /// NameRef = QualifiedName CallArgs? | UnitTypeRef
    fn parse_name_reference(&mut self) {
        let checkpoint = self.checkpoint();
        self.parse_qualified_name();
        if self.at(SyntaxKind::TILDE)
            && self.nth(1).is_contextual_name()
            && self.nth(2) != SyntaxKind::COLON
        {
            self.start_node_at(checkpoint, SyntaxKind::UNIT_TYPE_REF);
            self.bump(); // ~
            self.bump(); // unit
            self.finish_node();
            return;
        }
        self.start_node_at(checkpoint, SyntaxKind::NAME_REF);
        if self.at(SyntaxKind::L_PAREN) {
            self.parse_call_args();
        }
        self.finish_node();
    }

    /// LambdaExpr = '{' (LambdaParam (',' LambdaParam)*)? '|' CodeBlock '}'
    fn parse_braced_lambda(&mut self) {
        self.start_node(SyntaxKind::LAMBDA_EXPR);
        self.bump(); // {
        if !self.at(SyntaxKind::PIPE) {
            loop {
                self.parse_lambda_param();
                if !self.eat(SyntaxKind::COMMA) {
                    break;
                }
            }
        }
        self.expect_lambda_pipe();
        self.parse_code_block();
        self.expect_with(SyntaxKind::R_BRACE, ErrorCode::E0202);
        self.finish_node();
    }

    /// `x|body` or `x: T[m]|body`: a single parameter and a single line.
    fn parse_bare_lambda(&mut self) {
        self.start_node(SyntaxKind::LAMBDA_EXPR);
        self.parse_lambda_param();
        self.expect_lambda_pipe();
        self.parse_lambda_line();
        self.finish_node();
    }

    fn parse_lambda_line(&mut self) {
        self.start_node(SyntaxKind::CODE_BLOCK);
        if self.at(SyntaxKind::LET_KW) {
            self.parse_let();
        } else {
            self.parse_combined_expression();
        }
        self.finish_node();
    }

    /// LambdaParam = Name (':' TypeRef Multiplicity)?
    fn parse_lambda_param(&mut self) {
        self.start_node(SyntaxKind::LAMBDA_PARAM);
        self.expect_name();
        if self.eat(SyntaxKind::COLON) {
            self.parse_type_ref();
            self.parse_multiplicity();
        }
        self.finish_node();
    }

    fn parse_expression_list(&mut self, close: SyntaxKind) {
        if self.at(close) {
            return;
        }
        loop {
            self.parse_combined_expression();
            if !self.eat(SyntaxKind::COMMA) {
                break;
            }
        }
    }

    /// CallArgs = '(' (CombinedExpr (',' CombinedExpr)*)? ')'
    fn parse_call_args(&mut self) {
        self.start_node(SyntaxKind::CALL_ARGS);
        self.bump(); // (
        self.parse_expression_list(SyntaxKind::R_PAREN);
        self.expect_with(SyntaxKind::R_PAREN, ErrorCode::E0404);
        self.finish_node();
    }

    fn parse_postfix_suffixes(&mut self) {
        loop {
            match self.current_kind() {
                SyntaxKind::DOT => {
                    self.start_node(SyntaxKind::PROPERTY_SUFFIX);
                    self.bump(); // .
                    if !self.at_name() {
                        self.error(ErrorCode::E0403, "expected property name after '.'");
                    } else {
                        self.bump();
                    }
                    if self.at(SyntaxKind::L_PAREN) {
                        self.parse_call_args();
                    }
                    self.finish_node();
                }
                SyntaxKind::ARROW => {
                    self.start_node(SyntaxKind::FUNCTION_SUFFIX);
                    self.bump(); // ->
                    self.parse_qualified_name();
                    if self.at(SyntaxKind::L_PAREN) {
                        self.parse_call_args();
                    } else {
                        self.error(ErrorCode::E0404, "expected '(' after function name");
                    }
                    self.finish_node();
                }
                SyntaxKind::L_BRACKET
                    if matches!(self.nth(1), SyntaxKind::STRING | SyntaxKind::INTEGER)
                        && self.nth(2) == SyntaxKind::R_BRACKET =>
                {
                    self.start_node(SyntaxKind::BRACKET_SUFFIX);
                    self.bump(); // [
                    self.bump(); // key
                    self.bump(); // ]
                    self.finish_node();
                }
                _ => break,
            }
        }
    }
}
