//! Logos-based lexer for Pure
//!
//! Fast tokenization using the logos crate. Island fragments (`#{...}#`,
//! `#/...#`) and date/time literals are lexed as single tokens; their inner
//! structure is scanned later by the builder.

use super::syntax_kind::SyntaxKind;
use logos::Logos;
use rowan::TextSize;

/// A token with its kind, text, and position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: SyntaxKind,
    pub text: &'a str,
    pub offset: TextSize,
}

/// Lexer wrapping the logos-generated tokenizer
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, LogosToken>,
    offset: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: LogosToken::lexer(input),
            offset: 0,
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let logos_token = self.inner.next()?;
        let text = self.inner.slice();
        let offset = TextSize::new(self.offset);
        self.offset += text.len() as u32;

        let kind = match logos_token {
            Ok(t) => t.into(),
            Err(()) => SyntaxKind::ERROR,
        };

        Some(Token { kind, text, offset })
    }
}

/// Tokenize an entire string into a Vec
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

/// Consume up to and including `terminator`; fail the token if it never appears.
fn bump_through(lex: &mut logos::Lexer<'_, LogosToken>, terminator: &str) -> bool {
    match lex.remainder().find(terminator) {
        Some(idx) => {
            lex.bump(idx + terminator.len());
            true
        }
        None => false,
    }
}

fn block_comment(lex: &mut logos::Lexer<'_, LogosToken>) -> bool {
    bump_through(lex, "*/")
}

fn graph_fetch_island(lex: &mut logos::Lexer<'_, LogosToken>) -> bool {
    bump_through(lex, "}#")
}

fn navigation_island(lex: &mut logos::Lexer<'_, LogosToken>) -> bool {
    bump_through(lex, "#")
}

/// Logos token enum - maps to SyntaxKind
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
pub enum LogosToken {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    #[regex(r"//[^\n]*")]
    LineComment,

    #[token("/*", block_comment)]
    BlockComment,

    // =========================================================================
    // LITERALS
    // =========================================================================
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    #[regex(r"[0-9]+")]
    Integer,

    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?")]
    Float,

    #[regex(r"[0-9]+(\.[0-9]+)?[dD]")]
    Decimal,

    #[regex(r"'([^'\\]|\\.)*'")]
    String,

    #[regex(r"%-?[0-9]+(-[0-9]+(-[0-9]+(T[0-9]+(:[0-9]+(:[0-9]+(\.[0-9]+)?)?)?([+-][0-9]+|Z)?)?)?)?")]
    Date,

    #[regex(r"%[0-9]+:[0-9]+(:[0-9]+(\.[0-9]+)?)?")]
    StrictTime,

    #[token("%latest")]
    LatestDate,

    #[token("#{", graph_fetch_island)]
    GraphFetchIsland,

    #[token("#/", navigation_island)]
    NavigationIsland,

    // =========================================================================
    // MULTI-CHARACTER PUNCTUATION (must come before single-char)
    // =========================================================================
    #[token("::")]
    ColonColon,
    #[token("..")]
    DotDot,
    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("<<")]
    LtLt,
    #[token(">>")]
    GtGt,
    #[token("->")]
    Arrow,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,

    // =========================================================================
    // SINGLE-CHARACTER PUNCTUATION
    // =========================================================================
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token("=")]
    Eq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("*")]
    Star,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("/")]
    Slash,
    #[token("^")]
    Caret,
    #[token("~")]
    Tilde,
    #[token("!")]
    Bang,
    #[token("|")]
    Pipe,
    #[token("$")]
    Dollar,

    // =========================================================================
    // KEYWORDS
    // =========================================================================
    #[token("Class")]
    ClassKw,
    #[token("Association")]
    AssociationKw,
    #[token("Enum")]
    EnumKw,
    #[token("Profile")]
    ProfileKw,
    #[token("function")]
    FunctionKw,
    #[token("Measure")]
    MeasureKw,
    #[token("import")]
    ImportKw,
    #[token("extends")]
    ExtendsKw,
    #[token("let")]
    LetKw,
    #[token("true")]
    TrueKw,
    #[token("false")]
    FalseKw,
    #[token("stereotypes")]
    StereotypesKw,
    #[token("tags")]
    TagsKw,
}

impl From<LogosToken> for SyntaxKind {
    fn from(token: LogosToken) -> Self {
        use LogosToken::*;
        match token {
            Whitespace => SyntaxKind::WHITESPACE,
            LineComment => SyntaxKind::LINE_COMMENT,
            BlockComment => SyntaxKind::BLOCK_COMMENT,
            Ident => SyntaxKind::IDENT,
            Integer => SyntaxKind::INTEGER,
            Float => SyntaxKind::FLOAT,
            Decimal => SyntaxKind::DECIMAL,
            String => SyntaxKind::STRING,
            Date => SyntaxKind::DATE,
            StrictTime => SyntaxKind::STRICT_TIME,
            LatestDate => SyntaxKind::LATEST_DATE,
            GraphFetchIsland => SyntaxKind::GRAPH_FETCH_ISLAND,
            NavigationIsland => SyntaxKind::NAVIGATION_ISLAND,
            ColonColon => SyntaxKind::COLON_COLON,
            DotDot => SyntaxKind::DOT_DOT,
            EqEq => SyntaxKind::EQ_EQ,
            BangEq => SyntaxKind::BANG_EQ,
            LtEq => SyntaxKind::LT_EQ,
            GtEq => SyntaxKind::GT_EQ,
            LtLt => SyntaxKind::LT_LT,
            GtGt => SyntaxKind::GT_GT,
            Arrow => SyntaxKind::ARROW,
            AmpAmp => SyntaxKind::AMP_AMP,
            PipePipe => SyntaxKind::PIPE_PIPE,
            LBrace => SyntaxKind::L_BRACE,
            RBrace => SyntaxKind::R_BRACE,
            LBracket => SyntaxKind::L_BRACKET,
            RBracket => SyntaxKind::R_BRACKET,
            LParen => SyntaxKind::L_PAREN,
            RParen => SyntaxKind::R_PAREN,
            Semicolon => SyntaxKind::SEMICOLON,
            Colon => SyntaxKind::COLON,
            Dot => SyntaxKind::DOT,
            Comma => SyntaxKind::COMMA,
            Eq => SyntaxKind::EQ,
            Lt => SyntaxKind::LT,
            Gt => SyntaxKind::GT,
            Star => SyntaxKind::STAR,
            Plus => SyntaxKind::PLUS,
            Minus => SyntaxKind::MINUS,
            Slash => SyntaxKind::SLASH,
            Caret => SyntaxKind::CARET,
            Tilde => SyntaxKind::TILDE,
            Bang => SyntaxKind::BANG,
            Pipe => SyntaxKind::PIPE,
            Dollar => SyntaxKind::DOLLAR,
            ClassKw => SyntaxKind::CLASS_KW,
            AssociationKw => SyntaxKind::ASSOCIATION_KW,
            EnumKw => SyntaxKind::ENUM_KW,
            ProfileKw => SyntaxKind::PROFILE_KW,
            FunctionKw => SyntaxKind::FUNCTION_KW,
            MeasureKw => SyntaxKind::MEASURE_KW,
            ImportKw => SyntaxKind::IMPORT_KW,
            ExtendsKw => SyntaxKind::EXTENDS_KW,
            LetKw => SyntaxKind::LET_KW,
            TrueKw => SyntaxKind::TRUE_KW,
            FalseKw => SyntaxKind::FALSE_KW,
            StereotypesKw => SyntaxKind::STEREOTYPES_KW,
            TagsKw => SyntaxKind::TAGS_KW,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<SyntaxKind> {
        Lexer::new(input)
            .map(|t| t.kind)
            .filter(|k| !k.is_trivia())
            .collect()
    }

    #[test]
    fn test_lex_class_header() {
        let tokens: Vec<_> = Lexer::new("Class A").collect();
        assert_eq!(tokens.len(), 3); // Class, whitespace, A
        assert_eq!(tokens[0].kind, SyntaxKind::CLASS_KW);
        assert_eq!(tokens[1].kind, SyntaxKind::WHITESPACE);
        assert_eq!(tokens[2].kind, SyntaxKind::IDENT);
    }

    #[test]
    fn test_lex_qualified_name() {
        assert_eq!(
            kinds("a::b::C"),
            vec![
                SyntaxKind::IDENT,
                SyntaxKind::COLON_COLON,
                SyntaxKind::IDENT,
                SyntaxKind::COLON_COLON,
                SyntaxKind::IDENT
            ]
        );
    }

    #[test]
    fn test_lex_numbers() {
        assert_eq!(kinds("42"), vec![SyntaxKind::INTEGER]);
        assert_eq!(kinds("4.2"), vec![SyntaxKind::FLOAT]);
        assert_eq!(kinds("4.2d"), vec![SyntaxKind::DECIMAL]);
        assert_eq!(kinds("1e"), vec![SyntaxKind::INTEGER, SyntaxKind::IDENT]);
    }

    #[test]
    fn test_lex_multiplicity_range() {
        assert_eq!(
            kinds("[2..5]"),
            vec![
                SyntaxKind::L_BRACKET,
                SyntaxKind::INTEGER,
                SyntaxKind::DOT_DOT,
                SyntaxKind::INTEGER,
                SyntaxKind::R_BRACKET
            ]
        );
    }

    #[test]
    fn test_lex_dates_and_times() {
        assert_eq!(kinds("%2020"), vec![SyntaxKind::DATE]);
        assert_eq!(kinds("%2020-01-01"), vec![SyntaxKind::DATE]);
        assert_eq!(kinds("%2020-01-01T10:00:00.000+0000"), vec![SyntaxKind::DATE]);
        assert_eq!(kinds("%10:30"), vec![SyntaxKind::STRICT_TIME]);
        assert_eq!(kinds("%latest"), vec![SyntaxKind::LATEST_DATE]);
    }

    #[test]
    fn test_lex_islands() {
        let tokens = tokenize("#{ A { b { c } } }# + #/A/b#");
        assert_eq!(tokens[0].kind, SyntaxKind::GRAPH_FETCH_ISLAND);
        assert_eq!(tokens[0].text, "#{ A { b { c } } }#");
        let nav = tokens.iter().find(|t| t.kind == SyntaxKind::NAVIGATION_ISLAND);
        assert_eq!(nav.map(|t| t.text), Some("#/A/b#"));
    }

    #[test]
    fn test_lex_unterminated_island_is_error() {
        assert_eq!(kinds("#{ A { b }")[0], SyntaxKind::ERROR);
    }

    #[test]
    fn test_lex_comment() {
        let tokens: Vec<_> = Lexer::new("// comment\nClass").collect();
        assert_eq!(tokens[0].kind, SyntaxKind::LINE_COMMENT);
        assert_eq!(tokens[1].kind, SyntaxKind::WHITESPACE);
        assert_eq!(tokens[2].kind, SyntaxKind::CLASS_KW);
    }

    #[test]
    fn test_lex_block_comment_with_stars() {
        assert_eq!(kinds("/* a **/ x"), vec![SyntaxKind::IDENT]);
    }

    #[test]
    fn test_lex_string_with_escape() {
        let tokens = tokenize(r"'it\'s'");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, SyntaxKind::STRING);
    }

    #[test]
    fn test_lex_offsets_are_cumulative() {
        let tokens = tokenize("$x->f()");
        let offsets: Vec<u32> = tokens.iter().map(|t| t.offset.into()).collect();
        assert_eq!(offsets, vec![0, 1, 2, 4, 5, 6]);
    }
}
