// src/parser.rs
use crate::errors::{EvalError, Result};
use crate::value::Value;

/// Deepest nesting of groups, call arguments, unary operators and operator
/// chains an expression may have.
pub const MAX_DEPTH: usize = 200;

/// Character-level scanner shared by the expression grammar.
/// `i` is a byte offset; columns reported in errors are 1-based characters.
pub struct Parser<'a> {
    s: &'a str,
    i: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(s: &'a str) -> Self {
        Self { s, i: 0, depth: 0 }
    }

    /// Enter one level of grammar recursion; fails past [`MAX_DEPTH`].
    pub fn descend(&mut self) -> Result<()> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error("expression nested too deeply"));
        }
        self.depth += 1;
        Ok(())
    }

    pub fn ascend(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// 1-based column of a byte offset into the source.
    pub fn column_at(&self, offset: usize) -> usize {
        self.s[..offset.min(self.s.len())].chars().count() + 1
    }

    pub fn column(&self) -> usize {
        self.column_at(self.i)
    }

    pub fn error_at(&self, offset: usize, message: impl Into<String>) -> EvalError {
        EvalError::compilation(message, self.column_at(offset))
    }

    pub fn error(&self, message: impl Into<String>) -> EvalError {
        self.error_at(self.i, message)
    }

    pub fn parse_identifier(&mut self) -> Result<String> {
        let start = self.i;
        match self.peek_char() {
            Some(c) if c == '_' || c.is_ascii_alphabetic() => self.i += 1,
            _ => return Err(self.error("identifier expected")),
        }
        while let Some(c) = self.peek_char() {
            if c == '_' || c.is_ascii_alphanumeric() {
                self.i += 1;
            } else {
                break;
            }
        }
        Ok(self.s[start..self.i].to_string())
    }

    /// Unsigned decimal literal; a fractional part makes it a float.
    pub fn parse_number_literal(&mut self) -> Result<Value> {
        let start = self.i;
        self.skip_digits();
        if self.i == start {
            return Err(self.error("number expected"));
        }
        if self.peek_char() == Some('.') {
            self.i += 1;
            let frac = self.i;
            self.skip_digits();
            if self.i == frac {
                return Err(self.error("digit expected after `.`"));
            }
        }
        let s = &self.s[start..self.i];
        if s.contains('.') {
            let f: f64 = s
                .parse()
                .map_err(|_| self.error_at(start, format!("bad float literal `{s}`")))?;
            Ok(Value::Float(f))
        } else {
            let i: i64 = s
                .parse()
                .map_err(|_| self.error_at(start, format!("integer literal `{s}` is too large")))?;
            Ok(Value::Int(i))
        }
    }

    fn skip_digits(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                self.i += 1;
            } else {
                break;
            }
        }
    }

    pub fn expect(&mut self, c: char) -> Result<()> {
        if self.consume_char(c) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{c}'")))
        }
    }

    pub fn consume_char(&mut self, c: char) -> bool {
        if self.peek_char() == Some(c) {
            self.i += c.len_utf8();
            true
        } else {
            false
        }
    }

    pub fn consume_str(&mut self, lit: &str) -> bool {
        if self.peek_str(lit) {
            self.i += lit.len();
            true
        } else {
            false
        }
    }

    pub fn peek_char(&self) -> Option<char> {
        self.s[self.i..].chars().next()
    }

    pub fn peek_str(&self, lit: &str) -> bool {
        self.s[self.i..].starts_with(lit)
    }

    pub fn skip_ws(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() {
                self.i += c.len_utf8();
            } else {
                break;
            }
        }
    }

    pub fn eof(&self) -> bool {
        self.i >= self.s.len()
    }
}
