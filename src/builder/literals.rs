//! Literal tokens to literal value specifications.
//!
//! Date and strict-time literals arrive as whole tokens (`%2020-01-01`,
//! `%10:30`); their structure is checked here with small hand-written
//! scanners.

use tracing::trace;

use super::error::{ParseError, Result};
use crate::base::SourceSpan;
use crate::model::ValueSpecification;
use crate::parser::{SyntaxKind, SyntaxToken};

/// Build the literal value for a literal token.
pub fn build_literal(token: &SyntaxToken, span: SourceSpan) -> Result<ValueSpecification> {
    let text = token.text();
    trace!(kind = ?token.kind(), text, "literal");
    let source = Some(span.clone());
    match token.kind() {
        SyntaxKind::STRING => Ok(ValueSpecification::string(unquote(text), source)),
        SyntaxKind::INTEGER => text
            .parse::<i64>()
            .map(|value| ValueSpecification::CInteger { value, source })
            .map_err(|_| invalid_number(text, span)),
        SyntaxKind::FLOAT => text
            .parse::<f64>()
            .map(|value| ValueSpecification::CFloat { value, source })
            .map_err(|_| invalid_number(text, span)),
        SyntaxKind::DECIMAL => Ok(ValueSpecification::CDecimal {
            value: text.trim_end_matches(['d', 'D']).to_string(),
            source,
        }),
        SyntaxKind::TRUE_KW => Ok(ValueSpecification::CBoolean { value: true, source }),
        SyntaxKind::FALSE_KW => Ok(ValueSpecification::CBoolean { value: false, source }),
        SyntaxKind::DATE => scan_date(text, span),
        SyntaxKind::STRICT_TIME => scan_strict_time(text, span),
        SyntaxKind::LATEST_DATE => Ok(ValueSpecification::CLatestDate { source }),
        kind => Err(ParseError::unsupported(
            format!("{:?} is not a literal", kind),
            span,
        )),
    }
}

fn invalid_number(text: &str, span: SourceSpan) -> ParseError {
    ParseError::InvalidNumberLiteral {
        text: text.to_string(),
        span,
    }
}

/// Strip the quotes of a `'...'` literal and resolve backslash escapes.
pub fn unquote(text: &str) -> String {
    let inner = text
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(text);
    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some(other) => result.push(other),
            None => result.push('\\'),
        }
    }
    result
}

/// Cursor over the body of a date or time literal.
struct Scanner<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn done(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn eat(&mut self, expected: u8) -> bool {
        if self.text.as_bytes().get(self.pos) == Some(&expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Unscanned remainder; after a failed step, the offending text.
    fn rest(&self) -> &'a str {
        self.text.get(self.pos..).unwrap_or_default()
    }

    /// A non-empty digit run that fits an `i64`, optionally signed.
    ///
    /// Leaves the position untouched on failure.
    fn number(&mut self, signed: bool) -> bool {
        let start = self.pos;
        if signed {
            self.eat(b'-');
        }
        let digits_start = self.pos;
        while self
            .text
            .as_bytes()
            .get(self.pos)
            .is_some_and(|b| b.is_ascii_digit())
        {
            self.pos += 1;
        }
        let ok = self.pos > digits_start && self.text[start..self.pos].parse::<i64>().is_ok();
        if !ok {
            self.pos = start;
        }
        ok
    }
}

/// Text after the last `%`, trimmed.
fn literal_body(text: &str) -> &str {
    let trimmed = text.trim();
    match trimmed.rfind('%') {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    }
}

/// Scan `[-]YYYY[-MM[-DD[T...]]]`.
///
/// A complete year-month-day yields a strict date. A bare year, a year-month,
/// or anything with a time part yields a date-time holding the whole text.
/// Errors carry the text from the first character that doesn't fit.
pub fn scan_date(text: &str, span: SourceSpan) -> Result<ValueSpecification> {
    let body = literal_body(text);
    let invalid = |scanner: &Scanner, span: SourceSpan| ParseError::InvalidDateLiteral {
        text: scanner.rest().to_string(),
        span,
    };
    let date_time = |span: SourceSpan| ValueSpecification::CDateTime {
        value: body.to_string(),
        source: Some(span),
    };

    let mut scanner = Scanner::new(body);
    if !scanner.number(true) {
        return Err(invalid(&scanner, span));
    }
    if scanner.done() {
        return Ok(date_time(span));
    }
    if !scanner.eat(b'-') || !scanner.number(false) {
        return Err(invalid(&scanner, span));
    }
    if scanner.done() {
        return Ok(date_time(span));
    }
    if !scanner.eat(b'-') || !scanner.number(false) {
        return Err(invalid(&scanner, span));
    }
    if scanner.done() {
        return Ok(ValueSpecification::CStrictDate {
            value: body.to_string(),
            source: Some(span),
        });
    }
    if !scanner.eat(b'T') {
        return Err(invalid(&scanner, span));
    }
    Ok(date_time(span))
}

/// Scan `HH[:MM[:SS[.fraction]]]`; every well-formed prefix is a strict time.
pub fn scan_strict_time(text: &str, span: SourceSpan) -> Result<ValueSpecification> {
    let body = literal_body(text);
    let mut scanner = Scanner::new(body);
    let separators = [b':', b':', b'.'];

    let mut well_formed = scanner.number(false);
    for separator in separators {
        if !well_formed || scanner.done() {
            break;
        }
        well_formed = scanner.eat(separator) && scanner.number(false);
    }

    if well_formed && scanner.done() {
        Ok(ValueSpecification::CStrictTime {
            value: body.to_string(),
            source: Some(span),
        })
    } else {
        Err(ParseError::InvalidTimeLiteral {
            text: scanner.rest().to_string(),
            span,
        })
    }
}
