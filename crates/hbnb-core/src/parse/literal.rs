//! Value coercion and the restricted dictionary literal grammar
//!
//! ```text
//! dict  := '{' ws [ pair { ws ',' ws pair } [ ws ',' ] ] ws '}'
//! pair  := key ws ':' ws value
//! key   := quoted | word
//! value := quoted | word
//! ```
//!
//! Quoted values are literal strings; words go through the numeric coercion
//! rules. Nothing is evaluated.

use serde_json::{Number, Value};

use super::tokenizer::{unescape, unquote};
use crate::errors::{HbnbError, Result};

/// Coerce a raw console token into an attribute value
///
/// Quoted → literal string. Otherwise a token containing `.` becomes a float,
/// any other an integer; if that parse fails the raw text is kept.
pub fn coerce_token(raw: &str) -> Value {
    match unquote(raw) {
        Some(s) => Value::String(s),
        None => coerce_unquoted(raw),
    }
}

/// Numeric coercion for an unquoted token
///
/// Tokens with a `.` become floats, others 64-bit integers. An integer that
/// overflows 64 bits stays a string.
pub fn coerce_unquoted(raw: &str) -> Value {
    if raw.contains('.') {
        if let Some(n) = raw.parse::<f64>().ok().and_then(Number::from_f64) {
            return Value::Number(n);
        }
    } else if let Ok(i) = raw.parse::<i64>() {
        return Value::from(i);
    }
    Value::String(raw.to_string())
}

/// Parse a `key=value` create parameter
///
/// Quoted values are unescaped with `_` read as a space; unquoted values are
/// coerced. Returns `None` when there is no `=` or the key is empty.
pub fn parse_create_param(param: &str) -> Option<(String, Value)> {
    let (key, raw) = param.split_once('=')?;
    if key.is_empty() {
        return None;
    }
    let value = if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        let inner = &raw[1..raw.len() - 1];
        Value::String(unescape(&inner.replace('_', " ")))
    } else {
        coerce_unquoted(raw)
    };
    Some((key.to_string(), value))
}

/// Parse a dictionary literal into ordered key/value pairs
///
/// # Errors
///
/// Returns `MalformedLiteral` for anything outside the grammar.
pub fn parse_dict_literal(input: &str) -> Result<Vec<(String, Value)>> {
    let mut parser = DictParser {
        chars: input.char_indices().collect(),
        pos: 0,
    };
    parser.parse()
}

struct DictParser {
    chars: Vec<(usize, char)>,
    pos: usize,
}

impl DictParser {
    fn parse(&mut self) -> Result<Vec<(String, Value)>> {
        let mut pairs = Vec::new();
        self.skip_ws();
        self.expect('{')?;
        self.skip_ws();

        if self.peek() == Some('}') {
            self.pos += 1;
            return self.finish(pairs);
        }

        loop {
            let key = self.key()?;
            self.skip_ws();
            self.expect(':')?;
            self.skip_ws();
            let value = self.value()?;
            pairs.push((key, value));
            self.skip_ws();

            match self.peek() {
                Some(',') => {
                    self.pos += 1;
                    self.skip_ws();
                    if self.peek() == Some('}') {
                        self.pos += 1;
                        return self.finish(pairs);
                    }
                }
                Some('}') => {
                    self.pos += 1;
                    return self.finish(pairs);
                }
                _ => return Err(self.error("expected ',' or '}'")),
            }
        }
    }

    fn finish(&mut self, pairs: Vec<(String, Value)>) -> Result<Vec<(String, Value)>> {
        self.skip_ws();
        if self.pos != self.chars.len() {
            return Err(self.error("trailing characters after '}'"));
        }
        Ok(pairs)
    }

    fn key(&mut self) -> Result<String> {
        match self.peek() {
            Some('"') | Some('\'') => self.quoted(),
            _ => {
                let word = self.word();
                if word.is_empty() {
                    Err(self.error("expected key"))
                } else {
                    Ok(word)
                }
            }
        }
    }

    fn value(&mut self) -> Result<Value> {
        match self.peek() {
            Some('"') | Some('\'') => self.quoted().map(Value::String),
            Some('{') | Some('[') => Err(self.error("nested values are not supported")),
            _ => {
                let word = self.word();
                if word.is_empty() {
                    Err(self.error("expected value"))
                } else {
                    Ok(coerce_unquoted(&word))
                }
            }
        }
    }

    fn quoted(&mut self) -> Result<String> {
        let Some(q) = self.peek() else {
            return Err(self.error("expected quote"));
        };
        self.pos += 1;
        let mut out = String::new();
        while let Some(c) = self.peek() {
            self.pos += 1;
            if c == '\\' {
                match self.peek() {
                    Some(next) => {
                        if next != q && next != '\\' {
                            out.push('\\');
                        }
                        out.push(next);
                        self.pos += 1;
                    }
                    None => break,
                }
            } else if c == q {
                return Ok(out);
            } else {
                out.push(c);
            }
        }
        Err(self.error("unterminated string"))
    }

    fn word(&mut self) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if c.is_whitespace() || matches!(c, ',' | ':' | '}' | '{' | '"' | '\'') {
                break;
            }
            out.push(c);
            self.pos += 1;
        }
        out
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        if self.peek() == Some(expected) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", expected)))
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|&(_, c)| c)
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn error(&self, reason: &str) -> HbnbError {
        let offset = self
            .chars
            .get(self.pos)
            .map(|&(i, _)| i)
            .unwrap_or_else(|| self.chars.last().map_or(0, |&(i, c)| i + c.len_utf8()));
        HbnbError::MalformedLiteral {
            offset,
            reason: reason.to_string(),
        }
    }
}
