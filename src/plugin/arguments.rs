//! Reader for plugin argument lists.

use unicode_ident::{is_xid_continue, is_xid_start};

use super::PluginError;
use crate::base::ValueType;
use crate::driver::Driver;
use crate::field::TypedField;
use crate::parser::{Lexer, SyntaxKind, Token};

/// Walks a plugin's raw text, tracking how much of it has been consumed.
///
/// ```ignore
/// let mut args = ArgumentReader::new(text);
/// args.open()?;
/// let x = args.expression(driver, None)?;
/// args.separator()?;
/// let bound = args.scalar()?;
/// args.close()?;
/// Ok((value, args.consumed()))
/// ```
#[derive(Debug, Clone)]
pub struct ArgumentReader<'a> {
    text: &'a str,
    consumed: usize,
}

impl<'a> ArgumentReader<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, consumed: 0 }
    }

    /// Bytes of the text consumed so far.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    pub fn remaining(&self) -> &'a str {
        &self.text[self.consumed..]
    }

    fn peek(&self) -> Option<Token<'a>> {
        Lexer::at_offset(self.text, self.consumed).next_significant()
    }

    fn punct(&mut self, kind: SyntaxKind, expected: &'static str) -> Result<(), PluginError> {
        match self.peek() {
            Some(token) if token.kind == kind => {
                self.consumed = token.end();
                Ok(())
            }
            _ => Err(self.expected(expected)),
        }
    }

    fn expected(&self, expected: &'static str) -> PluginError {
        let offset = self.consumed + (self.remaining().len() - self.remaining().trim_start().len());
        PluginError::Expected { expected, offset }
    }

    /// `(`
    pub fn open(&mut self) -> Result<(), PluginError> {
        self.punct(SyntaxKind::L_PAREN, "'('")
    }

    /// `,`
    pub fn separator(&mut self) -> Result<(), PluginError> {
        self.punct(SyntaxKind::COMMA, "','")
    }

    /// `)`
    pub fn close(&mut self) -> Result<(), PluginError> {
        self.punct(SyntaxKind::R_PAREN, "')'")
    }

    /// Whether the next token is `)`.
    pub fn at_close(&self) -> bool {
        self.peek().is_some_and(|t| t.kind == SyntaxKind::R_PAREN)
    }

    /// A full expression, ending before the next top-level `,` or `)`.
    pub fn expression(
        &mut self,
        driver: &mut Driver<'_>,
        expected: Option<ValueType>,
    ) -> Result<TypedField, PluginError> {
        let offset = self.consumed;
        let (value, end) = driver
            .parse_argument(self.text, offset, expected)
            .map_err(|source| PluginError::Argument {
                offset,
                source: Box::new(source),
            })?;
        self.consumed = end;
        Ok(value)
    }

    /// A bare word; may contain any Unicode identifier characters.
    pub fn word(&mut self) -> Result<&'a str, PluginError> {
        let rest = self.remaining();
        let start = self.consumed + (rest.len() - rest.trim_start().len());
        let tail = &self.text[start..];
        let mut chars = tail.char_indices();
        match chars.next() {
            Some((_, c)) if is_xid_start(c) || c == '_' => {}
            _ => return Err(self.expected("name")),
        }
        let len = chars
            .find(|&(_, c)| !is_xid_continue(c))
            .map_or(tail.len(), |(i, _)| i);
        self.consumed = start + len;
        Ok(&tail[..len])
    }

    /// A numeric literal, optionally negated; `pi` is accepted.
    pub fn scalar(&mut self) -> Result<f64, PluginError> {
        let mut lexer = Lexer::at_offset(self.text, self.consumed);
        let mut token = lexer.next_significant();
        let negative = token.as_ref().is_some_and(|t| t.kind == SyntaxKind::MINUS);
        if negative {
            token = lexer.next_significant();
        }
        let value = match token {
            Some(ref t) if t.kind == SyntaxKind::PI_KW => std::f64::consts::PI,
            Some(ref t) if t.kind.is_number() => t
                .text
                .parse::<f64>()
                .map_err(|_| self.expected("number"))?,
            _ => return Err(self.expected("number")),
        };
        if let Some(t) = token {
            self.consumed = t.end();
        }
        Ok(if negative { -value } else { value })
    }

    /// An integer literal, optionally negated.
    pub fn integer(&mut self) -> Result<i64, PluginError> {
        let mut lexer = Lexer::at_offset(self.text, self.consumed);
        let mut token = lexer.next_significant();
        let negative = token.as_ref().is_some_and(|t| t.kind == SyntaxKind::MINUS);
        if negative {
            token = lexer.next_significant();
        }
        let Some(t) = token.filter(|t| t.kind == SyntaxKind::INTEGER) else {
            return Err(self.expected("integer"));
        };
        let value = t
            .text
            .parse::<i64>()
            .map_err(|_| self.expected("integer"))?;
        self.consumed = t.end();
        Ok(if negative { -value } else { value })
    }
}
