//! Token stream shared by the built-in island grammars.
//!
//! Island text is lexed with its own small logos token set; whitespace is
//! skipped. Date and time tokens are lexed loosely and validated by the
//! literal scanners, so malformed ones report the usual literal errors.

use std::ops::Range;

use logos::Logos;
use rowan::TextSize;
use smol_str::SmolStr;

use crate::base::{LineIndex, SourceSpan};
use crate::builder::error::{ParseError, Result};
use crate::builder::literals::{scan_date, scan_strict_time, unquote};
use crate::builder::source::TranslationContext;
use crate::model::{ValueSpecification, Variable};

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub(super) enum IslandToken {
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    #[regex(r"-?[0-9]+")]
    Integer,

    #[regex(r"-?[0-9]+\.[0-9]+")]
    Float,

    #[regex(r"'([^'\\]|\\.)*'")]
    String,

    /// `%2020-01-01`, `%10:30`, `%latest`
    #[regex(r"%[-0-9A-Za-z:.+]*")]
    Temporal,

    #[token("::")]
    ColonColon,
    #[token("->")]
    Arrow,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token("/")]
    Slash,
    #[token("!")]
    Bang,
    #[token("@")]
    At,
    #[token("$")]
    Dollar,
}

impl IslandToken {
    fn describe(self) -> &'static str {
        match self {
            Self::Ident => "identifier",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::Temporal => "date",
            Self::ColonColon => "'::'",
            Self::Arrow => "'->'",
            Self::LBrace => "'{'",
            Self::RBrace => "'}'",
            Self::LParen => "'('",
            Self::RParen => "')'",
            Self::Comma => "','",
            Self::Colon => "':'",
            Self::Slash => "'/'",
            Self::Bang => "'!'",
            Self::At => "'@'",
            Self::Dollar => "'$'",
        }
    }
}

/// One lexed token; `kind` is `None` for input no token matches.
#[derive(Debug, Clone)]
struct Lexeme {
    kind: Option<IslandToken>,
    range: Range<usize>,
}

/// Cursor over the tokens of one island text.
///
/// Spans run from a token's start to the end of the last consumed token and
/// are resolved through the island's [`TranslationContext`].
pub(super) struct TokenCursor<'a> {
    text: &'a str,
    lexemes: Vec<Lexeme>,
    pos: usize,
    last_end: usize,
    lines: LineIndex,
    ctx: &'a TranslationContext,
    grammar: &'static str,
}

impl<'a> TokenCursor<'a> {
    pub(super) fn new(text: &'a str, ctx: &'a TranslationContext, grammar: &'static str) -> Self {
        let lexemes = IslandToken::lexer(text)
            .spanned()
            .map(|(kind, range)| Lexeme { kind: kind.ok(), range })
            .collect();
        Self {
            text,
            lexemes,
            pos: 0,
            last_end: 0,
            lines: LineIndex::new(text),
            ctx,
            grammar,
        }
    }

    /// Byte offset where the next token starts.
    pub(super) fn offset(&self) -> usize {
        self.lexemes
            .get(self.pos)
            .map_or(self.text.len(), |lexeme| lexeme.range.start)
    }

    pub(super) fn peek(&self) -> Option<IslandToken> {
        self.lexemes.get(self.pos).and_then(|lexeme| lexeme.kind)
    }

    pub(super) fn at(&self, kind: IslandToken) -> bool {
        self.peek() == Some(kind)
    }

    pub(super) fn at_end(&self) -> bool {
        self.pos >= self.lexemes.len()
    }

    fn bump(&mut self) -> &'a str {
        let text = self.text;
        match self.lexemes.get(self.pos) {
            Some(lexeme) => {
                self.last_end = lexeme.range.end;
                let range = lexeme.range.clone();
                self.pos += 1;
                &text[range]
            }
            None => "",
        }
    }

    pub(super) fn eat(&mut self, kind: IslandToken) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub(super) fn expect(&mut self, kind: IslandToken) -> Result<&'a str> {
        if self.at(kind) {
            Ok(self.bump())
        } else {
            Err(self.unexpected(kind.describe()))
        }
    }

    pub(super) fn ident(&mut self) -> Result<SmolStr> {
        self.expect(IslandToken::Ident).map(SmolStr::new)
    }

    /// `a::b::C`
    pub(super) fn qualified_name(&mut self) -> Result<SmolStr> {
        let mut name = self.ident()?.to_string();
        while self.eat(IslandToken::ColonColon) {
            name.push_str("::");
            name.push_str(&self.ident()?);
        }
        Ok(SmolStr::new(name))
    }

    pub(super) fn string(&mut self) -> Result<String> {
        self.expect(IslandToken::String).map(unquote)
    }

    /// A scalar parameter value: string, number, boolean, date, or `$variable`.
    pub(super) fn value(&mut self) -> Result<ValueSpecification> {
        let start = self.offset();
        let Some(kind) = self.peek() else {
            return Err(self.unexpected("value"));
        };
        match kind {
            IslandToken::String => {
                let value = self.string()?;
                Ok(ValueSpecification::string(value, Some(self.span_from(start))))
            }
            IslandToken::Dollar => {
                self.bump();
                let name = self.ident()?;
                Ok(ValueSpecification::Variable(Variable::new(name, Some(self.span_from(start)))))
            }
            IslandToken::Temporal => {
                let text = self.bump();
                let span = self.span_from(start);
                if text == "%latest" {
                    Ok(ValueSpecification::CLatestDate { source: Some(span) })
                } else if text.contains(':') && !text[1..].contains('-') {
                    scan_strict_time(text, span)
                } else {
                    scan_date(text, span)
                }
            }
            IslandToken::Integer => {
                let text = self.bump();
                let span = self.span_from(start);
                match text.parse::<i64>() {
                    Ok(value) => Ok(ValueSpecification::CInteger { value, source: Some(span) }),
                    Err(_) => Err(ParseError::InvalidNumberLiteral { text: text.to_string(), span }),
                }
            }
            IslandToken::Float => {
                let text = self.bump();
                let span = self.span_from(start);
                match text.parse::<f64>() {
                    Ok(value) => Ok(ValueSpecification::CFloat { value, source: Some(span) }),
                    Err(_) => Err(ParseError::InvalidNumberLiteral { text: text.to_string(), span }),
                }
            }
            IslandToken::Ident => {
                let word = self.bump();
                let source = Some(self.span_from(start));
                match word {
                    "true" => Ok(ValueSpecification::CBoolean { value: true, source }),
                    "false" => Ok(ValueSpecification::CBoolean { value: false, source }),
                    _ => Err(self.error_at(self.pos - 1, format!("unexpected '{}'", word))),
                }
            }
            _ => Err(self.unexpected("value")),
        }
    }

    /// Absolute span from byte offset `start` to the end of the last consumed token.
    pub(super) fn span_from(&self, start: usize) -> SourceSpan {
        let end = self.last_end.max(start);
        self.ctx.resolve(
            self.lines.line_col(TextSize::new(start as u32)),
            self.lines.line_col(TextSize::new(end as u32)),
        )
    }

    /// Error at the next token, or at the end of the text.
    pub(super) fn error(&self, message: impl Into<String>) -> ParseError {
        self.error_at(self.pos, message)
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        let found = match self.lexemes.get(self.pos) {
            None => "end of input".to_string(),
            Some(Lexeme { kind: Some(kind), .. }) => kind.describe().to_string(),
            Some(Lexeme { range, .. }) => format!("'{}'", &self.text[range.clone()]),
        };
        self.error(format!("expected {}, found {}", expected, found))
    }

    fn error_at(&self, index: usize, message: impl Into<String>) -> ParseError {
        let range = self
            .lexemes
            .get(index)
            .map_or(self.text.len()..self.text.len(), |lexeme| lexeme.range.clone());
        let span = self.ctx.resolve(
            self.lines.line_col(TextSize::new(range.start as u32)),
            self.lines.line_col(TextSize::new(range.end as u32)),
        );
        ParseError::island(self.grammar, message, span)
    }
}
