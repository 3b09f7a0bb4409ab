//! Relaxed structured-literal decoding for free-text config fields.
//!
//! DESIGN
//! ======
//! Input is tried against an ordered list of pure `text -> value` strategies,
//! each attempted only when the previous one failed:
//!
//! 1. strict JSON;
//! 2. lenient normalization (drop an `identifier:` label prefix, turn
//!    single-quoted strings into double-quoted ones, quote bare keys, drop
//!    trailing commas) followed by strict JSON;
//! 3. a small relaxed-literal grammar (comments, backtick strings, hex
//!    numbers, `undefined`, ...) parsed directly into a value.
//!
//! Nothing here evaluates input as code. Every stage is bounded by
//! [`DecodeLimits`].

#[cfg(test)]
#[path = "literal_test.rs"]
mod literal_test;

use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::consts::{MAX_LITERAL_BYTES, MAX_LITERAL_DEPTH};

/// Which strategy accepted the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodeStage {
    /// Canonical JSON.
    Strict,
    /// JSON after lenient normalization.
    Normalized,
    /// Relaxed literal grammar.
    Literal,
}

/// A successfully decoded value and the stage that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub value: Value,
    pub stage: DecodeStage,
}

/// Size bounds for decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Longest accepted input, in bytes.
    pub max_bytes: usize,
    /// Deepest accepted bracket nesting.
    pub max_depth: usize,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self { max_bytes: MAX_LITERAL_BYTES, max_depth: MAX_LITERAL_DEPTH }
    }
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("input is {len} bytes, limit is {max}")]
    TooLong { len: usize, max: usize },
    #[error("input is empty")]
    Empty,
    #[error("not a structured value: {reason}")]
    Rejected { reason: String },
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum LiteralError {
    #[error("unexpected end of input")]
    UnexpectedEnd,
    #[error("unexpected {found:?} at offset {offset}")]
    Unexpected { found: char, offset: usize },
    #[error("unterminated string starting at offset {0}")]
    UnterminatedString(usize),
    #[error("invalid escape at offset {0}")]
    InvalidEscape(usize),
    #[error("invalid number {0:?}")]
    InvalidNumber(String),
    #[error("unknown identifier {0:?}")]
    UnknownIdentifier(String),
    #[error("nesting deeper than {0}")]
    TooDeep(usize),
}

type Strategy = fn(&str, &DecodeLimits) -> Result<Value, String>;

/// The fallback chain, in order.
const STRATEGIES: [(DecodeStage, Strategy); 3] = [
    (DecodeStage::Strict, decode_strict),
    (DecodeStage::Normalized, decode_normalized),
    (DecodeStage::Literal, decode_literal),
];

/// Decode free text through the fallback chain.
///
/// # Errors
///
/// Returns `Empty` or `TooLong` before any stage runs, and `Rejected`
/// with the last stage's reason when every stage fails.
pub fn decode(text: &str, limits: &DecodeLimits) -> Result<Decoded, DecodeError> {
    if text.len() > limits.max_bytes {
        return Err(DecodeError::TooLong { len: text.len(), max: limits.max_bytes });
    }
    if text.trim().is_empty() {
        return Err(DecodeError::Empty);
    }

    let mut reason = String::new();
    for (stage, strategy) in STRATEGIES {
        match strategy(text, limits) {
            Ok(value) => return Ok(Decoded { value, stage }),
            Err(e) => reason = e,
        }
    }
    Err(DecodeError::Rejected { reason })
}

/// Pretty JSON for an edit buffer.
#[must_use]
pub fn encode(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn decode_strict(text: &str, limits: &DecodeLimits) -> Result<Value, String> {
    let value = serde_json::from_str(text).map_err(|e| e.to_string())?;
    within_depth(value, limits.max_depth)
}

fn decode_normalized(text: &str, limits: &DecodeLimits) -> Result<Value, String> {
    let value = serde_json::from_str(&normalize(strip_label_prefix(text))).map_err(|e| e.to_string())?;
    within_depth(value, limits.max_depth)
}

fn within_depth(value: Value, max_depth: usize) -> Result<Value, String> {
    if nesting(&value) > max_depth {
        return Err(LiteralError::TooDeep(max_depth).to_string());
    }
    Ok(value)
}

/// Bracket nesting of a value; scalars are 0.
fn nesting(value: &Value) -> usize {
    match value {
        Value::Array(items) => 1 + items.iter().map(nesting).max().unwrap_or(0),
        Value::Object(map) => 1 + map.values().map(nesting).max().unwrap_or(0),
        _ => 0,
    }
}

fn decode_literal(text: &str, limits: &DecodeLimits) -> Result<Value, String> {
    parse_literal(strip_label_prefix(text), limits.max_depth).map_err(|e| e.to_string())
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

/// Drop a leading `identifier:` label.
///
/// `data: {"a": 1}` becomes `{"a": 1}` and `value: 42` becomes `42`; text
/// without a label is only trimmed.
#[must_use]
pub fn strip_label_prefix(text: &str) -> &str {
    let trimmed = text.trim();
    let mut chars = trimmed.char_indices();
    let Some((_, first)) = chars.next() else {
        return trimmed;
    };
    if !is_ident_start(first) {
        return trimmed;
    }
    let end = chars.find(|(_, c)| !is_ident_continue(*c)).map_or(trimmed.len(), |(i, _)| i);
    let Some(after) = trimmed[end..].trim_start().strip_prefix(':') else {
        return trimmed;
    };
    after.trim_start()
}

/// Rewrite JS-style object syntax toward JSON.
///
/// Converts single-quoted strings to double-quoted, quotes bare identifier
/// keys, and drops commas directly before a closing bracket. Text inside
/// double-quoted strings is copied untouched.
#[must_use]
pub fn normalize(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 16);
    let mut last_significant: Option<char> = None;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '"' => {
                let start = i;
                i += 1;
                while i < chars.len() && chars[i] != '"' {
                    if chars[i] == '\\' {
                        i += 1;
                    }
                    i += 1;
                }
                let end = (i + 1).min(chars.len());
                out.extend(&chars[start..end]);
                i = end;
                last_significant = Some('"');
            }
            '\'' => {
                i += 1;
                out.push('"');
                while i < chars.len() && chars[i] != '\'' {
                    match chars[i] {
                        '\\' if i + 1 < chars.len() && chars[i + 1] == '\'' => {
                            out.push('\'');
                            i += 2;
                        }
                        '\\' if i + 1 < chars.len() => {
                            out.push('\\');
                            out.push(chars[i + 1]);
                            i += 2;
                        }
                        '"' => {
                            out.push_str("\\\"");
                            i += 1;
                        }
                        other => {
                            out.push(other);
                            i += 1;
                        }
                    }
                }
                out.push('"');
                i += 1;
                last_significant = Some('"');
            }
            ',' => {
                let next = chars[i + 1..].iter().find(|ch| !ch.is_whitespace());
                if !matches!(next, Some('}' | ']')) {
                    out.push(',');
                    last_significant = Some(',');
                }
                i += 1;
            }
            c if is_ident_start(c) => {
                let start = i;
                while i < chars.len() && is_ident_continue(chars[i]) {
                    i += 1;
                }
                let ident: String = chars[start..i].iter().collect();
                let next = chars[i..].iter().find(|ch| !ch.is_whitespace());
                let key_position = matches!(last_significant, Some('{' | ','));
                if key_position && next == Some(&':') {
                    out.push('"');
                    out.push_str(&ident);
                    out.push('"');
                } else {
                    out.push_str(&ident);
                }
                last_significant = chars.get(i - 1).copied();
            }
            other => {
                out.push(other);
                if !other.is_whitespace() {
                    last_significant = Some(other);
                }
                i += 1;
            }
        }
    }
    out
}

/// Parse the relaxed literal grammar into a JSON value.
///
/// Accepts everything JSON does plus: `//` and `/* */` comments, single-
/// and backtick-quoted strings, bare identifier and numeric keys, trailing
/// commas, `+`/leading-dot/trailing-dot decimals, hex/octal/binary
/// integers, and `undefined`/`None`/`True`/`False`.
///
/// # Errors
///
/// Returns a [`LiteralError`] describing the first problem found.
pub fn parse_literal(text: &str, max_depth: usize) -> Result<Value, LiteralError> {
    let mut parser = LiteralParser { src: text, pos: 0, depth: 0, max_depth };
    parser.skip_trivia();
    let value = parser.value()?;
    parser.skip_trivia();
    match parser.peek() {
        None => Ok(value),
        Some(found) => Err(LiteralError::Unexpected { found, offset: parser.pos }),
    }
}

struct LiteralParser<'a> {
    src: &'a str,
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl LiteralParser<'_> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.src[self.pos..].chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, want: char) -> Result<(), LiteralError> {
        match self.bump() {
            Some(c) if c == want => Ok(()),
            Some(found) => Err(LiteralError::Unexpected { found, offset: self.pos - found.len_utf8() }),
            None => Err(LiteralError::UnexpectedEnd),
        }
    }

    fn skip_trivia(&mut self) {
        loop {
            match (self.peek(), self.peek_at(1)) {
                (Some(c), _) if c.is_whitespace() => {
                    self.bump();
                }
                (Some('/'), Some('/')) => {
                    while let Some(c) = self.bump() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                (Some('/'), Some('*')) => {
                    self.pos += 2;
                    match self.src[self.pos..].find("*/") {
                        Some(end) => self.pos += end + 2,
                        None => self.pos = self.src.len(),
                    }
                }
                _ => return,
            }
        }
    }

    fn value(&mut self) -> Result<Value, LiteralError> {
        match self.peek() {
            None => Err(LiteralError::UnexpectedEnd),
            Some('{') => self.nested(Self::object),
            Some('[') => self.nested(Self::array),
            Some(q @ ('"' | '\'' | '`')) => self.string(q).map(Value::String),
            Some(c) if c.is_ascii_digit() || matches!(c, '-' | '+' | '.') => self.number(),
            Some(c) if is_ident_start(c) => self.keyword(),
            Some(found) => Err(LiteralError::Unexpected { found, offset: self.pos }),
        }
    }

    fn nested(&mut self, parse: fn(&mut Self) -> Result<Value, LiteralError>) -> Result<Value, LiteralError> {
        if self.depth >= self.max_depth {
            return Err(LiteralError::TooDeep(self.max_depth));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn object(&mut self) -> Result<Value, LiteralError> {
        self.eat('{')?;
        let mut map = Map::new();
        loop {
            self.skip_trivia();
            if self.peek() == Some('}') {
                self.bump();
                return Ok(Value::Object(map));
            }
            let key = self.key()?;
            self.skip_trivia();
            self.eat(':')?;
            self.skip_trivia();
            let value = self.value()?;
            map.insert(key, value);
            self.skip_trivia();
            match self.bump() {
                Some(',') => {}
                Some('}') => return Ok(Value::Object(map)),
                Some(found) => return Err(LiteralError::Unexpected { found, offset: self.pos - found.len_utf8() }),
                None => return Err(LiteralError::UnexpectedEnd),
            }
        }
    }

    fn key(&mut self) -> Result<String, LiteralError> {
        match self.peek() {
            Some(q @ ('"' | '\'' | '`')) => self.string(q),
            Some(c) if is_ident_start(c) => Ok(self.identifier().to_owned()),
            Some(c) if c.is_ascii_digit() => {
                let start = self.pos;
                while self.peek().is_some_and(|c| c.is_ascii_alphanumeric() || c == '.') {
                    self.bump();
                }
                Ok(self.src[start..self.pos].to_owned())
            }
            Some(found) => Err(LiteralError::Unexpected { found, offset: self.pos }),
            None => Err(LiteralError::UnexpectedEnd),
        }
    }

    fn array(&mut self) -> Result<Value, LiteralError> {
        self.eat('[')?;
        let mut items = Vec::new();
        loop {
            self.skip_trivia();
            if self.peek() == Some(']') {
                self.bump();
                return Ok(Value::Array(items));
            }
            items.push(self.value()?);
            self.skip_trivia();
            match self.bump() {
                Some(',') => {}
                Some(']') => return Ok(Value::Array(items)),
                Some(found) => return Err(LiteralError::Unexpected { found, offset: self.pos - found.len_utf8() }),
                None => return Err(LiteralError::UnexpectedEnd),
            }
        }
    }

    fn identifier(&mut self) -> &str {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_continue) {
            self.bump();
        }
        &self.src[start..self.pos]
    }

    fn keyword(&mut self) -> Result<Value, LiteralError> {
        match self.identifier() {
            "true" | "True" => Ok(Value::Bool(true)),
            "false" | "False" => Ok(Value::Bool(false)),
            "null" | "undefined" | "None" => Ok(Value::Null),
            other => Err(LiteralError::UnknownIdentifier(other.to_owned())),
        }
    }

    fn string(&mut self, quote: char) -> Result<String, LiteralError> {
        let start = self.pos;
        self.bump();
        let mut out = String::new();
        loop {
            let Some(c) = self.bump() else {
                return Err(LiteralError::UnterminatedString(start));
            };
            if c == quote {
                return Ok(out);
            }
            if c != '\\' {
                out.push(c);
                continue;
            }
            let escape_at = self.pos - 1;
            let Some(e) = self.bump() else {
                return Err(LiteralError::UnterminatedString(start));
            };
            match e {
                'n' => out.push('\n'),
                't' => out.push('\t'),
                'r' => out.push('\r'),
                'b' => out.push('\u{8}'),
                'f' => out.push('\u{c}'),
                'v' => out.push('\u{b}'),
                '0' => out.push('\0'),
                '\n' => {}
                'x' => out.push(self.hex_escape(2, escape_at)?),
                'u' => out.push(self.unicode_escape(escape_at)?),
                other => out.push(other),
            }
        }
    }

    fn hex_digits(&mut self, count: usize, escape_at: usize) -> Result<u32, LiteralError> {
        let end = self.pos + count;
        let digits = self.src.get(self.pos..end).ok_or(LiteralError::InvalidEscape(escape_at))?;
        let code = u32::from_str_radix(digits, 16).map_err(|_| LiteralError::InvalidEscape(escape_at))?;
        self.pos = end;
        Ok(code)
    }

    fn hex_escape(&mut self, count: usize, escape_at: usize) -> Result<char, LiteralError> {
        let code = self.hex_digits(count, escape_at)?;
        char::from_u32(code).ok_or(LiteralError::InvalidEscape(escape_at))
    }

    fn unicode_escape(&mut self, escape_at: usize) -> Result<char, LiteralError> {
        let high = self.hex_digits(4, escape_at)?;
        if (0xD800..0xDC00).contains(&high) {
            if self.src[self.pos..].starts_with("\\u") {
                self.pos += 2;
                let low = self.hex_digits(4, escape_at)?;
                if (0xDC00..0xE000).contains(&low) {
                    let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                    return char::from_u32(code).ok_or(LiteralError::InvalidEscape(escape_at));
                }
            }
            return Err(LiteralError::InvalidEscape(escape_at));
        }
        char::from_u32(high).ok_or(LiteralError::InvalidEscape(escape_at))
    }

    fn number(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        let negative = match self.peek() {
            Some('-') => {
                self.bump();
                true
            }
            Some('+') => {
                self.bump();
                false
            }
            _ => false,
        };

        let radix = match (self.peek(), self.peek_at(1)) {
            (Some('0'), Some('x' | 'X')) => Some(16),
            (Some('0'), Some('o' | 'O')) => Some(8),
            (Some('0'), Some('b' | 'B')) => Some(2),
            _ => None,
        };
        if let Some(radix) = radix {
            self.pos += 2;
            let digits_start = self.pos;
            while self.peek().is_some_and(|c| c.is_ascii_alphanumeric() || c == '_') {
                self.bump();
            }
            let digits = self.src[digits_start..self.pos].replace('_', "");
            let magnitude = i64::from_str_radix(&digits, radix)
                .map_err(|_| LiteralError::InvalidNumber(self.src[start..self.pos].to_owned()))?;
            return Ok(Value::from(if negative { -magnitude } else { magnitude }));
        }

        let body_start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit() || c == '.') {
            self.bump();
        }
        if self.peek().is_some_and(|c| c == 'e' || c == 'E') {
            self.bump();
            if self.peek().is_some_and(|c| c == '+' || c == '-') {
                self.bump();
            }
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.bump();
            }
        }
        let body = &self.src[body_start..self.pos];
        let raw = &self.src[start..self.pos];
        let invalid = || LiteralError::InvalidNumber(raw.to_owned());

        if body.is_empty() || body == "." {
            return Err(invalid());
        }
        let is_integer = body.bytes().all(|b| b.is_ascii_digit());
        if is_integer {
            if let Ok(n) = body.parse::<i64>() {
                return Ok(Value::from(if negative { -n } else { n }));
            }
        }
        let mut text = String::with_capacity(body.len() + 2);
        if body.starts_with('.') {
            text.push('0');
        }
        text.push_str(body);
        if text.ends_with('.') {
            text.push('0');
        }
        let n: f64 = text.parse().map_err(|_| invalid())?;
        let n = if negative { -n } else { n };
        Number::from_f64(n).map(Value::Number).ok_or_else(invalid)
    }
}
