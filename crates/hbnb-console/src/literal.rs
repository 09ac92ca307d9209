//! Restricted literal parser for `update` dictionaries.
//!
//! Accepts only data: mappings with string keys, lists, quoted strings,
//! numbers, booleans, and null, in either console (`'a'`, `True`, `None`) or
//! JSON (`"a"`, `true`, `null`) spelling. Nothing is ever evaluated.

use hbnb_types::AttrValue;
use serde_json::{Map, Number};

use crate::error::LiteralError;

const MAX_DEPTH: usize = 64;

/// Parse a complete literal; trailing non-whitespace is an error.
pub fn parse_literal(text: &str) -> Result<AttrValue, LiteralError> {
    let mut parser = LiteralParser { src: text, pos: 0 };
    let value = parser.value(0)?;
    parser.skip_ws();
    if parser.pos != text.len() {
        return Err(LiteralError::new(parser.pos, "unexpected trailing characters"));
    }
    Ok(value)
}

struct LiteralParser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> LiteralParser<'a> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn expect(&mut self, want: char) -> Result<(), LiteralError> {
        match self.bump() {
            Some(c) if c == want => Ok(()),
            Some(c) => Err(LiteralError::new(
                self.pos - c.len_utf8(),
                format!("expected {want:?}, found {c:?}"),
            )),
            None => Err(self.eof()),
        }
    }

    fn eof(&self) -> LiteralError {
        LiteralError::new(self.pos, "unexpected end of input")
    }

    fn value(&mut self, depth: usize) -> Result<AttrValue, LiteralError> {
        if depth > MAX_DEPTH {
            return Err(LiteralError::new(self.pos, "literal nested too deeply"));
        }
        self.skip_ws();
        match self.peek() {
            Some('{') => self.object(depth),
            Some('[') => self.array(depth),
            Some(q @ ('\'' | '"')) => self.string(q).map(AttrValue::String),
            Some(c) if c == '-' || c == '+' || c == '.' || c.is_ascii_digit() => self.number(),
            Some(c) if c.is_alphabetic() || c == '_' => self.keyword(),
            Some(c) => Err(LiteralError::new(self.pos, format!("unexpected character {c:?}"))),
            None => Err(self.eof()),
        }
    }

    fn object(&mut self, depth: usize) -> Result<AttrValue, LiteralError> {
        self.expect('{')?;
        let mut map = Map::new();
        loop {
            self.skip_ws();
            match self.peek() {
                Some('}') => {
                    self.bump();
                    return Ok(AttrValue::Object(map));
                }
                Some(q @ ('\'' | '"')) => {
                    let key = self.string(q)?;
                    self.skip_ws();
                    self.expect(':')?;
                    let value = self.value(depth + 1)?;
                    map.insert(key, value);
                }
                Some(_) => {
                    return Err(LiteralError::new(self.pos, "dictionary keys must be strings"))
                }
                None => return Err(self.eof()),
            }
            self.skip_ws();
            match self.bump() {
                Some(',') => {}
                Some('}') => return Ok(AttrValue::Object(map)),
                Some(c) => {
                    return Err(LiteralError::new(
                        self.pos - c.len_utf8(),
                        format!("expected ',' or '}}', found {c:?}"),
                    ))
                }
                None => return Err(self.eof()),
            }
        }
    }

    fn array(&mut self, depth: usize) -> Result<AttrValue, LiteralError> {
        self.expect('[')?;
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.peek() == Some(']') {
                self.bump();
                return Ok(AttrValue::Array(items));
            }
            items.push(self.value(depth + 1)?);
            self.skip_ws();
            match self.bump() {
                Some(',') => {}
                Some(']') => return Ok(AttrValue::Array(items)),
                Some(c) => {
                    return Err(LiteralError::new(
                        self.pos - c.len_utf8(),
                        format!("expected ',' or ']', found {c:?}"),
                    ))
                }
                None => return Err(self.eof()),
            }
        }
    }

    fn string(&mut self, quote: char) -> Result<String, LiteralError> {
        let start = self.pos;
        self.expect(quote)?;
        let mut out = String::new();
        loop {
            match self.bump() {
                Some(c) if c == quote => return Ok(out),
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some('0') => out.push('\0'),
                    Some('u') => out.push(self.unicode_escape()?),
                    Some(c @ ('\\' | '\'' | '"' | '/')) => out.push(c),
                    Some(other) => {
                        out.push('\\');
                        out.push(other);
                    }
                    None => break,
                },
                Some('\n') => {
                    return Err(LiteralError::new(self.pos - 1, "newline in string literal"))
                }
                Some(c) => out.push(c),
                None => break,
            }
        }
        Err(LiteralError::new(start, "unterminated string literal"))
    }

    fn unicode_escape(&mut self) -> Result<char, LiteralError> {
        let start = self.pos;
        let hex = self
            .src
            .get(self.pos..self.pos + 4)
            .ok_or_else(|| LiteralError::new(start, "truncated \\u escape"))?;
        let code = u32::from_str_radix(hex, 16)
            .map_err(|_| LiteralError::new(start, "invalid \\u escape"))?;
        self.pos += 4;
        char::from_u32(code).ok_or_else(|| LiteralError::new(start, "invalid \\u code point"))
    }

    fn number(&mut self) -> Result<AttrValue, LiteralError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.' | '_'))
        {
            self.bump();
        }
        let raw: String = self.src[start..self.pos].chars().filter(|c| *c != '_').collect();
        let text = raw.strip_prefix('+').unwrap_or(&raw);

        if let Ok(i) = text.parse::<i64>() {
            return Ok(AttrValue::Number(Number::from(i)));
        }
        if let Ok(u) = text.parse::<u64>() {
            return Ok(AttrValue::Number(Number::from(u)));
        }
        text.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .and_then(Number::from_f64)
            .map(AttrValue::Number)
            .ok_or_else(|| LiteralError::new(start, format!("invalid number {raw:?}")))
    }

    fn keyword(&mut self) -> Result<AttrValue, LiteralError> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.bump();
        }
        match &self.src[start..self.pos] {
            "True" | "true" => Ok(AttrValue::Bool(true)),
            "False" | "false" => Ok(AttrValue::Bool(false)),
            "None" | "null" => Ok(AttrValue::Null),
            word => Err(LiteralError::new(start, format!("unsupported name {word:?}"))),
        }
    }
}
