//! Reader for manifest files written as a Python literal expression.
//!
//! Manifests of this kind are a single dict display such as
//!
//! ```text
//! # -*- coding: utf-8 -*-
//! {
//!     'name': "Sales",
//!     'version': '1.0',
//!     'depends': ['base', 'web'],
//!     'installable': True,
//! }
//! ```
//!
//! Only literal syntax is accepted: dicts, lists, tuples, sets, strings
//! (any quote style, `r`/`u`/`b` prefixes, implicit concatenation), numbers,
//! `True`, `False` and `None`. Anything else is an error. The result is a
//! [`serde_json::Value`] so manifests in every supported format share one
//! downstream representation. Tuples and sets become arrays.

use serde_json::{Map, Number, Value};

/// Deepest container nesting accepted, matching `serde_json`'s limit.
pub const MAX_DEPTH: usize = 128;

/// A syntax error with a 1-based source position.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}, column {column}: {message}")]
pub struct LiteralError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

/// Parse `source` as a single Python literal expression.
pub fn parse(source: &str) -> Result<Value, LiteralError> {
    let mut parser = Parser::new(source);
    parser.skip_trivia();
    let value = parser.value()?;
    parser.skip_trivia();
    if let Some(c) = parser.peek() {
        return Err(parser.error(format!("unexpected trailing character {c:?}")));
    }
    Ok(value)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn error(&self, message: impl Into<String>) -> LiteralError {
        let consumed = &self.chars[..self.pos.min(self.chars.len())];
        let line = consumed.iter().filter(|&&c| c == '\n').count() + 1;
        let column = consumed.iter().rev().take_while(|&&c| c != '\n').count() + 1;
        LiteralError {
            line,
            column,
            message: message.into(),
        }
    }

    /// Skip whitespace, `#` comments and backslash line continuations.
    fn skip_trivia(&mut self) {
        while let Some(c) = self.peek() {
            match c {
                '#' => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.pos += 1;
                    }
                }
                '\\' if matches!(self.peek_at(1), Some('\n')) => self.pos += 2,
                '\\' if self.peek_at(1) == Some('\r') && self.peek_at(2) == Some('\n') => {
                    self.pos += 3
                }
                c if c.is_whitespace() || c == '\u{feff}' => self.pos += 1,
                _ => break,
            }
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), LiteralError> {
        match self.bump() {
            Some(c) if c == expected => Ok(()),
            Some(c) => {
                self.pos -= 1;
                Err(self.error(format!("expected {expected:?}, found {c:?}")))
            }
            None => Err(self.error(format!("expected {expected:?}, found end of input"))),
        }
    }

    fn value(&mut self) -> Result<Value, LiteralError> {
        match self.peek() {
            None => Err(self.error("unexpected end of input")),
            Some('{') => self.nested(Self::brace),
            Some('[') => self.nested(|p| p.sequence('[', ']').map(Value::Array)),
            Some('(') => self.nested(Self::paren),
            Some('\'' | '"') => self.strings(),
            Some(c) if c.is_ascii_digit() || c == '.' || c == '-' || c == '+' => self.number(),
            Some(c) if c.is_alphabetic() || c == '_' => {
                if self.string_prefix_len().is_some() {
                    self.strings()
                } else {
                    self.name()
                }
            }
            Some(c) => Err(self.error(format!("unexpected character {c:?}"))),
        }
    }

    /// Run a container parser one level deeper.
    fn nested(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<Value, LiteralError>,
    ) -> Result<Value, LiteralError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error(format!("nesting too deep, limit is {MAX_DEPTH}")));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Comma-separated values up to `close`, trailing comma allowed.
    fn sequence(&mut self, open: char, close: char) -> Result<Vec<Value>, LiteralError> {
        self.expect(open)?;
        let mut items = Vec::new();
        loop {
            self.skip_trivia();
            if self.peek() == Some(close) {
                self.pos += 1;
                return Ok(items);
            }
            items.push(self.value()?);
            self.skip_trivia();
            match self.peek() {
                Some(',') => self.pos += 1,
                Some(c) if c == close => {
                    self.pos += 1;
                    return Ok(items);
                }
                _ => return Err(self.error(format!("expected ',' or {close:?}"))),
            }
        }
    }

    /// `( expr )` is the expression itself; `()` and `(a, ...)` are tuples.
    fn paren(&mut self) -> Result<Value, LiteralError> {
        self.expect('(')?;
        self.skip_trivia();
        if self.peek() == Some(')') {
            self.pos += 1;
            return Ok(Value::Array(Vec::new()));
        }
        let first = self.value()?;
        self.skip_trivia();
        match self.peek() {
            Some(')') => {
                self.pos += 1;
                Ok(first)
            }
            Some(',') => {
                self.pos += 1;
                let mut items = vec![first];
                loop {
                    self.skip_trivia();
                    if self.peek() == Some(')') {
                        self.pos += 1;
                        return Ok(Value::Array(items));
                    }
                    items.push(self.value()?);
                    self.skip_trivia();
                    match self.peek() {
                        Some(',') => self.pos += 1,
                        Some(')') => {
                            self.pos += 1;
                            return Ok(Value::Array(items));
                        }
                        _ => return Err(self.error("expected ',' or ')'")),
                    }
                }
            }
            _ => Err(self.error("expected ',' or ')'")),
        }
    }

    /// Dict or set display.
    fn brace(&mut self) -> Result<Value, LiteralError> {
        self.expect('{')?;
        self.skip_trivia();
        if self.peek() == Some('}') {
            self.pos += 1;
            return Ok(Value::Object(Map::new()));
        }

        let first = self.value()?;
        self.skip_trivia();
        if self.peek() != Some(':') {
            let mut items = vec![first];
            loop {
                self.skip_trivia();
                match self.peek() {
                    Some('}') => {
                        self.pos += 1;
                        return Ok(Value::Array(items));
                    }
                    Some(',') => {
                        self.pos += 1;
                        self.skip_trivia();
                        if self.peek() == Some('}') {
                            continue;
                        }
                        items.push(self.value()?);
                    }
                    _ => return Err(self.error("expected ',' or '}'")),
                }
            }
        }

        let mut map = Map::new();
        let mut key = first;
        loop {
            let key_str = self.key_string(key)?;
            self.skip_trivia();
            self.expect(':')?;
            self.skip_trivia();
            let value = self.value()?;
            map.insert(key_str, value);
            self.skip_trivia();
            match self.peek() {
                Some(',') => {
                    self.pos += 1;
                    self.skip_trivia();
                    if self.peek() == Some('}') {
                        self.pos += 1;
                        return Ok(Value::Object(map));
                    }
                    key = self.value()?;
                    self.skip_trivia();
                }
                Some('}') => {
                    self.pos += 1;
                    return Ok(Value::Object(map));
                }
                _ => return Err(self.error("expected ',' or '}'")),
            }
        }
    }

    fn key_string(&self, key: Value) -> Result<String, LiteralError> {
        match key {
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(true) => Ok("True".to_string()),
            Value::Bool(false) => Ok("False".to_string()),
            Value::Null => Ok("None".to_string()),
            _ => Err(self.error("dict keys must be strings, numbers or constants")),
        }
    }

    fn name(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        let ident: String = self.chars[start..self.pos].iter().collect();
        match ident.as_str() {
            "True" => Ok(Value::Bool(true)),
            "False" => Ok(Value::Bool(false)),
            "None" => Ok(Value::Null),
            other => {
                self.pos = start;
                Err(self.error(format!("unsupported name '{other}', only literals are allowed")))
            }
        }
    }

    fn number(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        let mut negative = false;
        while let Some(sign @ ('-' | '+')) = self.peek() {
            if sign == '-' {
                negative = !negative;
            }
            self.pos += 1;
            self.skip_trivia();
        }

        let body_start = self.pos;
        while let Some(c) = self.peek() {
            let exponent_sign = (c == '-' || c == '+')
                && matches!(self.chars.get(self.pos.wrapping_sub(1)), Some('e' | 'E'))
                && !self.chars[body_start..self.pos]
                    .iter()
                    .any(|c| matches!(c, 'x' | 'X'));
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' || exponent_sign {
                self.pos += 1;
            } else {
                break;
            }
        }
        let body: String = self.chars[body_start..self.pos]
            .iter()
            .filter(|&&c| c != '_')
            .collect();
        if body.is_empty() {
            self.pos = start;
            return Err(self.error("expected a number"));
        }

        let lower = body.to_ascii_lowercase();
        let integer = if let Some(hex) = lower.strip_prefix("0x") {
            i64::from_str_radix(hex, 16).ok()
        } else if let Some(oct) = lower.strip_prefix("0o") {
            i64::from_str_radix(oct, 8).ok()
        } else if let Some(bin) = lower.strip_prefix("0b") {
            i64::from_str_radix(bin, 2).ok()
        } else {
            lower.parse::<i64>().ok()
        };

        if let Some(n) = integer {
            return Ok(Value::Number(Number::from(if negative { -n } else { n })));
        }

        match lower.parse::<f64>() {
            Ok(f) => {
                let f = if negative { -f } else { f };
                Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| self.error(format!("number '{body}' is not finite")))
            }
            Err(_) => {
                self.pos = start;
                Err(self.error(format!("invalid number '{body}'")))
            }
        }
    }

    /// Length of a string prefix (`r`, `u`, `b`, `br`, `rb`) directly
    /// followed by a quote.
    fn string_prefix_len(&self) -> Option<usize> {
        let mut len = 0;
        while let Some(c) = self.peek_at(len) {
            if matches!(c, 'r' | 'R' | 'u' | 'U' | 'b' | 'B') && len < 2 {
                len += 1;
            } else {
                break;
            }
        }
        if len == 0 {
            return None;
        }
        matches!(self.peek_at(len), Some('\'' | '"')).then_some(len)
    }

    /// One or more adjacent string literals, concatenated.
    fn strings(&mut self) -> Result<Value, LiteralError> {
        let mut out = self.string()?;
        loop {
            let checkpoint = self.pos;
            self.skip_trivia();
            let next_is_string = matches!(self.peek(), Some('\'' | '"'))
                || self.string_prefix_len().is_some();
            if !next_is_string {
                self.pos = checkpoint;
                return Ok(Value::String(out));
            }
            out.push_str(&self.string()?);
        }
    }

    fn string(&mut self) -> Result<String, LiteralError> {
        let prefix_len = self.string_prefix_len().unwrap_or(0);
        let raw = self.chars[self.pos..self.pos + prefix_len]
            .iter()
            .any(|c| matches!(c, 'r' | 'R'));
        self.pos += prefix_len;

        let quote = match self.bump() {
            Some(q @ ('\'' | '"')) => q,
            _ => return Err(self.error("expected a string")),
        };
        let triple = self.peek() == Some(quote) && self.peek_at(1) == Some(quote);
        if triple {
            self.pos += 2;
        }

        let mut out = String::new();
        loop {
            let Some(c) = self.bump() else {
                return Err(self.error("unterminated string"));
            };
            if c == quote {
                if !triple {
                    return Ok(out);
                }
                if self.peek() == Some(quote) && self.peek_at(1) == Some(quote) {
                    self.pos += 2;
                    return Ok(out);
                }
                out.push(c);
                continue;
            }
            if c == '\n' && !triple {
                return Err(self.error("newline in single-quoted string"));
            }
            if c != '\\' {
                out.push(c);
                continue;
            }

            let Some(escaped) = self.bump() else {
                return Err(self.error("unterminated string"));
            };
            if raw {
                out.push('\\');
                out.push(escaped);
                continue;
            }
            match escaped {
                '\n' => {}
                '\\' => out.push('\\'),
                '\'' => out.push('\''),
                '"' => out.push('"'),
                'n' => out.push('\n'),
                'r' => out.push('\r'),
                't' => out.push('\t'),
                'a' => out.push('\u{07}'),
                'b' => out.push('\u{08}'),
                'f' => out.push('\u{0c}'),
                'v' => out.push('\u{0b}'),
                'x' => out.push(self.hex_escape(2)?),
                'u' => out.push(self.hex_escape(4)?),
                'U' => out.push(self.hex_escape(8)?),
                '0'..='7' => {
                    let mut code = escaped.to_digit(8).unwrap_or(0);
                    for _ in 0..2 {
                        match self.peek().and_then(|c| c.to_digit(8)) {
                            Some(d) => {
                                code = code * 8 + d;
                                self.pos += 1;
                            }
                            None => break,
                        }
                    }
                    out.push(char::from_u32(code).ok_or_else(|| self.error("invalid octal escape"))?);
                }
                other => {
                    out.push('\\');
                    out.push(other);
                }
            }
        }
    }

    fn hex_escape(&mut self, digits: usize) -> Result<char, LiteralError> {
        let end = self.pos + digits;
        if end > self.chars.len() {
            return Err(self.error("truncated escape sequence"));
        }
        let hex: String = self.chars[self.pos..end].iter().collect();
        let code = u32::from_str_radix(&hex, 16)
            .map_err(|_| self.error(format!("invalid escape digits '{hex}'")))?;
        self.pos = end;
        char::from_u32(code).ok_or_else(|| self.error(format!("invalid code point {code:#x}")))
    }
}
