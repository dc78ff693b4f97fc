//! Syntax kinds for the Rowan-based CST
//!
//! This enum defines all possible node and token kinds in the syntax tree.
//! Expression nodes follow the flattened Pure grammar: a combined expression
//! is a head expression followed by a flat run of operator parts.

/// All syntax kinds (tokens and nodes) in Pure
///
/// Tokens are leaf nodes (identifiers, keywords, punctuation).
/// Nodes are composite (elements, expressions, parts).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    WHITESPACE = 0,
    LINE_COMMENT,
    BLOCK_COMMENT,

    // =========================================================================
    // LITERALS
    // =========================================================================
    IDENT,              // identifier
    INTEGER,            // 42
    FLOAT,              // 3.14
    DECIMAL,            // 3.14d
    STRING,             // 'hello'
    DATE,               // %2020-01-01
    STRICT_TIME,        // %10:30:00
    LATEST_DATE,        // %latest
    GRAPH_FETCH_ISLAND, // #{ ... }#
    NAVIGATION_ISLAND,  // #/ ... #

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    L_BRACE,            // {
    R_BRACE,            // }
    L_BRACKET,          // [
    R_BRACKET,          // ]
    L_PAREN,            // (
    R_PAREN,            // )
    SEMICOLON,          // ;
    COLON,              // :
    COLON_COLON,        // ::
    DOT,                // .
    DOT_DOT,            // ..
    COMMA,              // ,
    EQ,                 // =
    EQ_EQ,              // ==
    BANG_EQ,            // !=
    LT,                 // <
    GT,                 // >
    LT_EQ,              // <=
    GT_EQ,              // >=
    LT_LT,              // <<
    GT_GT,              // >>
    ARROW,              // ->
    STAR,               // *
    PLUS,               // +
    MINUS,              // -
    SLASH,              // /
    CARET,              // ^
    TILDE,              // ~
    BANG,               // !
    PIPE,               // |
    AMP_AMP,            // &&
    PIPE_PIPE,          // ||
    DOLLAR,             // $

    // =========================================================================
    // KEYWORDS
    // =========================================================================
    CLASS_KW,
    ASSOCIATION_KW,
    ENUM_KW,
    PROFILE_KW,
    FUNCTION_KW,
    MEASURE_KW,
    IMPORT_KW,
    EXTENDS_KW,
    LET_KW,
    TRUE_KW,
    FALSE_KW,
    STEREOTYPES_KW,
    TAGS_KW,

    // =========================================================================
    // NODES - Structure
    // =========================================================================
    SOURCE_FILE,
    IMPORT,
    QUALIFIED_NAME,
    STEREOTYPES,
    STEREOTYPE,
    TAGGED_VALUES,
    TAGGED_VALUE,
    MULTIPLICITY,
    TYPE_REF,
    UNIT_NAME,
    PARAMETER,
    PARAMETER_LIST,
    AGGREGATION,
    DEFAULT_VALUE,

    // Elements
    CLASS_DEF,
    SUPER_TYPES,
    CONSTRAINT_LIST,
    CONSTRAINT,
    CONSTRAINT_FUNCTION,
    CONSTRAINT_MESSAGE,
    CONSTRAINT_EXTERNAL_ID,
    CONSTRAINT_ENFORCEMENT,
    CLASS_BODY,
    PROPERTY,
    QUALIFIED_PROPERTY,
    ASSOCIATION_DEF,
    ENUM_DEF,
    ENUM_VALUE,
    PROFILE_DEF,
    PROFILE_STEREOTYPES,
    PROFILE_TAGS,
    FUNCTION_DEF,
    MEASURE_DEF,
    UNIT_DEF,
    UNIT_CONVERSION,
    NON_CONVERTIBLE_UNIT,

    // =========================================================================
    // NODES - Expressions
    // =========================================================================
    CODE_BLOCK,
    LET_EXPR,
    COMBINED_EXPR,
    ARITHMETIC_PART,
    BOOLEAN_PART,
    EQUALITY_PART,
    EXPRESSION,
    LITERAL,
    ISLAND,
    NEW_EXPR,
    KEY_VALUE,
    VARIABLE_REF,
    NOT_EXPR,
    SIGNED_EXPR,
    ARRAY_EXPR,
    PAREN_EXPR,
    LAMBDA_EXPR,
    LAMBDA_PARAM,
    NAME_REF,
    UNIT_TYPE_REF,
    CALL_ARGS,
    PROPERTY_SUFFIX,
    FUNCTION_SUFFIX,
    BRACKET_SUFFIX,

    // Special
    ERROR,

    #[doc(hidden)]
    __LAST,
}

impl SyntaxKind {
    /// Check if this is a trivia token (whitespace or comment)
    pub fn is_trivia(self) -> bool {
        matches!(self, Self::WHITESPACE | Self::LINE_COMMENT | Self::BLOCK_COMMENT)
    }

    /// Check if this is a keyword
    pub fn is_keyword(self) -> bool {
        (self as u16) >= (Self::CLASS_KW as u16) && (self as u16) <= (Self::TAGS_KW as u16)
    }

    /// Check if this is a punctuation token
    pub fn is_punct(self) -> bool {
        (self as u16) >= (Self::L_BRACE as u16) && (self as u16) <= (Self::DOLLAR as u16)
    }

    /// Check if this is a literal token
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            Self::INTEGER
                | Self::FLOAT
                | Self::DECIMAL
                | Self::STRING
                | Self::DATE
                | Self::STRICT_TIME
                | Self::LATEST_DATE
                | Self::TRUE_KW
                | Self::FALSE_KW
        )
    }

    /// Check if this token is an embedded island fragment
    pub fn is_island(self) -> bool {
        matches!(self, Self::GRAPH_FETCH_ISLAND | Self::NAVIGATION_ISLAND)
    }

    /// Keywords that may still be used as property or parameter names.
    pub fn is_contextual_name(self) -> bool {
        matches!(self, Self::IDENT | Self::STEREOTYPES_KW | Self::TAGS_KW | Self::EXTENDS_KW)
    }
}

/// Human-readable name for a token kind, used in diagnostics.
pub fn kind_to_name(kind: SyntaxKind) -> &'static str {
    match kind {
        SyntaxKind::IDENT => "identifier",
        SyntaxKind::INTEGER => "integer",
        SyntaxKind::FLOAT => "float",
        SyntaxKind::DECIMAL => "decimal",
        SyntaxKind::STRING => "string",
        SyntaxKind::DATE => "date",
        SyntaxKind::STRICT_TIME => "strict time",
        SyntaxKind::LATEST_DATE => "'%latest'",
        SyntaxKind::GRAPH_FETCH_ISLAND => "graph fetch tree",
        SyntaxKind::NAVIGATION_ISLAND => "navigation path",
        SyntaxKind::L_BRACE => "'{'",
        SyntaxKind::R_BRACE => "'}'",
        SyntaxKind::L_BRACKET => "'['",
        SyntaxKind::R_BRACKET => "']'",
        SyntaxKind::L_PAREN => "'('",
        SyntaxKind::R_PAREN => "')'",
        SyntaxKind::SEMICOLON => "';'",
        SyntaxKind::COLON => "':'",
        SyntaxKind::COLON_COLON => "'::'",
        SyntaxKind::DOT => "'.'",
        SyntaxKind::DOT_DOT => "'..'",
        SyntaxKind::COMMA => "','",
        SyntaxKind::EQ => "'='",
        SyntaxKind::EQ_EQ => "'=='",
        SyntaxKind::BANG_EQ => "'!='",
        SyntaxKind::LT => "'<'",
        SyntaxKind::GT => "'>'",
        SyntaxKind::LT_EQ => "'<='",
        SyntaxKind::GT_EQ => "'>='",
        SyntaxKind::LT_LT => "'<<'",
        SyntaxKind::GT_GT => "'>>'",
        SyntaxKind::ARROW => "'->'",
        SyntaxKind::STAR => "'*'",
        SyntaxKind::PLUS => "'+'",
        SyntaxKind::MINUS => "'-'",
        SyntaxKind::SLASH => "'/'",
        SyntaxKind::CARET => "'^'",
        SyntaxKind::TILDE => "'~'",
        SyntaxKind::BANG => "'!'",
        SyntaxKind::PIPE => "'|'",
        SyntaxKind::AMP_AMP => "'&&'",
        SyntaxKind::PIPE_PIPE => "'||'",
        SyntaxKind::DOLLAR => "'$'",
        SyntaxKind::CLASS_KW => "'Class'",
        SyntaxKind::ASSOCIATION_KW => "'Association'",
        SyntaxKind::ENUM_KW => "'Enum'",
        SyntaxKind::PROFILE_KW => "'Profile'",
        SyntaxKind::FUNCTION_KW => "'function'",
        SyntaxKind::MEASURE_KW => "'Measure'",
        SyntaxKind::IMPORT_KW => "'import'",
        SyntaxKind::EXTENDS_KW => "'extends'",
        SyntaxKind::LET_KW => "'let'",
        SyntaxKind::TRUE_KW => "'true'",
        SyntaxKind::FALSE_KW => "'false'",
        SyntaxKind::STEREOTYPES_KW => "'stereotypes'",
        SyntaxKind::TAGS_KW => "'tags'",
        SyntaxKind::ERROR => "end of input",
        k if k.is_trivia() => "whitespace",
        _ => "syntax node",
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

impl From<rowan::SyntaxKind> for SyntaxKind {
    fn from(raw: rowan::SyntaxKind) -> Self {
        assert!(raw.0 < SyntaxKind::__LAST as u16);
        // Safety: we control all syntax kinds and check bounds above
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }
}

/// Language definition for Rowan
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PureLanguage {}

impl rowan::Language for PureLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        raw.into()
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type aliases for convenience
pub type SyntaxNode = rowan::SyntaxNode<PureLanguage>;
pub type SyntaxToken = rowan::SyntaxToken<PureLanguage>;
pub type SyntaxElement = rowan::SyntaxElement<PureLanguage>;
