//! Eager Pratt evaluator
//!
//! Parsing and evaluation happen in one pass: every time an operator,
//! call or atom is reduced its value is computed immediately and the
//! operand values are moved into the computation. Kind and location
//! legality is decided from the operands' tags before any data is touched,
//! so an illegal combination is reported as a syntax error at the operator.

use nalgebra::Matrix3;
use text_size::TextSize;

use super::errors::{ErrorCode, SyntaxError};
use super::grammar::legality::{self, BinaryOp, UnaryOp};
use super::grammar::precedence;
use super::lexer::{Lexer, Token};
use super::syntax_kind::SyntaxKind;
use crate::base::Kind;
use crate::driver::Driver;
use crate::error::EvalError;
use crate::field::TypedField;
use crate::field::algebra::{self, CompareOp};
use crate::field::functions::{self, TensorFunction};

/// Tokens that can start an operand.
const OPERAND_START: &[&str] = &["identifier", "number", "'pi'", "'true'", "'false'", "'('", "'-'", "'!'"];

pub(crate) struct Evaluator<'s, 'd, 'r> {
    source: &'s str,
    lexer: Lexer<'s>,
    current: Token<'s>,
    /// End of the last consumed token
    last_end: usize,
    /// Offset of `source` within the outermost expression
    base: usize,
    pub(super) driver: &'d mut Driver<'r>,
}

/// Short description of a value's type for diagnostics.
pub(crate) fn describe(field: &TypedField) -> String {
    match field.value_type() {
        Some(value_type) => value_type.to_string(),
        None => format!("constant {}", field.kind()),
    }
}

impl<'s, 'd, 'r> Evaluator<'s, 'd, 'r> {
    pub(crate) fn new(driver: &'d mut Driver<'r>, source: &'s str, start: usize, base: usize) -> Self {
        let start = start.min(source.len());
        let mut evaluator = Self {
            source,
            lexer: Lexer::at_offset(source, start),
            current: Token {
                kind: SyntaxKind::EOF,
                text: "",
                offset: TextSize::new(start as u32),
            },
            last_end: start,
            base,
            driver,
        };
        evaluator.current = evaluator.next_token();
        evaluator.sync_position();
        evaluator
    }

    // =========================================================================
    // TOKEN STREAM
    // =========================================================================

    fn next_token(&mut self) -> Token<'s> {
        let eof = self.source.len();
        self.lexer.next_significant().unwrap_or(Token {
            kind: SyntaxKind::EOF,
            text: "",
            offset: TextSize::new(eof as u32),
        })
    }

    fn sync_position(&mut self) {
        let offset = u32::from(self.current.offset) as usize;
        self.driver.set_position(self.base + offset);
    }

    pub(super) fn current(&self) -> &Token<'s> {
        &self.current
    }

    pub(super) fn at(&self, kind: SyntaxKind) -> bool {
        self.current.kind == kind
    }

    /// Consume the current token and return it.
    pub(super) fn advance(&mut self) -> Token<'s> {
        let next = self.next_token();
        let token = std::mem::replace(&mut self.current, next);
        self.last_end = token.end();
        self.sync_position();
        token
    }

    /// Kind of the token after the current one.
    pub(super) fn peek_second(&self) -> SyntaxKind {
        self.lexer
            .clone()
            .next_significant()
            .map_or(SyntaxKind::EOF, |t| t.kind)
    }

    /// Restart lexing at `offset` of the source, discarding the lookahead.
    pub(super) fn resume_at(&mut self, offset: usize) {
        self.lexer = Lexer::at_offset(self.source, offset);
        self.last_end = offset;
        self.current = self.next_token();
        self.sync_position();
    }

    pub(super) fn source(&self) -> &'s str {
        self.source
    }

    pub(super) fn base(&self) -> usize {
        self.base
    }

    /// Offset just past the last token that belongs to the expression.
    pub(crate) fn end_offset(&self) -> usize {
        self.last_end
    }

    pub(super) fn expect(&mut self, kind: SyntaxKind) -> Result<Token<'s>, EvalError> {
        if self.at(kind) {
            return Ok(self.advance());
        }
        if self.at(SyntaxKind::ERROR) {
            return Err(self.lexical_error());
        }
        Err(self.unexpected(ErrorCode::E0902, [kind.display_name()]))
    }

    /// Fail unless the whole input has been consumed; `value` is the
    /// expression read so far and decides which continuations are listed.
    pub(crate) fn expect_end(&self, value: &TypedField) -> Result<(), EvalError> {
        match self.current.kind {
            SyntaxKind::EOF => Ok(()),
            SyntaxKind::ERROR => Err(self.lexical_error()),
            _ => Err(self.unexpected(ErrorCode::E0208, continuations(value.kind()))),
        }
    }

    // =========================================================================
    // DIAGNOSTICS
    // =========================================================================

    pub(super) fn lexical_error(&self) -> EvalError {
        EvalError::Lexical(
            SyntaxError::builder(ErrorCode::E0101)
                .message(format!("invalid character '{}'", self.current.text))
                .range(self.token_range(&self.current))
                .found(self.current.text)
                .build(),
        )
    }

    pub(super) fn unexpected<I, S>(&self, code: ErrorCode, expected: I) -> EvalError
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let found = match self.current.kind {
            SyntaxKind::EOF => SyntaxKind::EOF.display_name(),
            _ => self.current.text,
        };
        EvalError::Syntax(
            SyntaxError::builder(code)
                .message(format!("unexpected {}", found))
                .range(self.token_range(&self.current))
                .found(found)
                .expected(expected)
                .build(),
        )
    }

    /// A type error at `token`.
    pub(super) fn type_error<I, S>(
        &self,
        code: ErrorCode,
        token: &Token<'_>,
        message: String,
        expected: I,
    ) -> EvalError
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        EvalError::Syntax(
            SyntaxError::builder(code)
                .message(message)
                .range(self.token_range(token))
                .found(token.text)
                .expected(expected)
                .build(),
        )
    }

    fn token_range(&self, token: &Token<'_>) -> text_size::TextRange {
        let start = TextSize::new((self.base + u32::from(token.offset) as usize) as u32);
        text_size::TextRange::at(start, TextSize::of(token.text))
    }

    pub(super) fn trace_reduction(&self, rule: impl FnOnce() -> String) {
        if self.driver.options().trace {
            tracing::trace!(rule = %rule(), "reduce");
        }
    }

    // =========================================================================
    // EXPRESSIONS
    // =========================================================================

    /// Parse and evaluate an expression whose operators bind at least `min_bp`.
    pub(crate) fn expression(&mut self, min_bp: u8) -> Result<TypedField, EvalError> {
        let mut lhs = self.operand()?;
        loop {
            let token = self.current.kind;
            match token {
                SyntaxKind::ERROR => return Err(self.lexical_error()),
                SyntaxKind::DOT => {
                    if precedence::POSTFIX < min_bp {
                        break;
                    }
                    lhs = self.component(lhs)?;
                    continue;
                }
                SyntaxKind::QUESTION => {
                    if precedence::TERNARY < min_bp {
                        break;
                    }
                    lhs = self.ternary(lhs)?;
                    continue;
                }
                _ => {}
            }
            let Some((op, lbp, rbp)) = precedence::infix(token, lhs.kind()) else {
                // an enclosing level may still read `&&` as logical AND
                if token == SyntaxKind::AMP_AMP && min_bp <= precedence::LOGICAL_AND {
                    let at = self.current.clone();
                    return Err(self.type_error(
                        ErrorCode::E0403,
                        &at,
                        format!("'&&' is not defined for {}", describe(&lhs)),
                        quoted(legality::operators_after(lhs.kind())),
                    ));
                }
                break;
            };
            if lbp < min_bp {
                break;
            }
            // no right operand can make `lhs op _` legal
            if legality::right_operands(op, lhs.kind()).is_empty() {
                let at = self.current.clone();
                return Err(self.type_error(
                    ErrorCode::E0403,
                    &at,
                    format!("'{}' is not defined for {}", op, describe(&lhs)),
                    quoted(legality::operators_after(lhs.kind())),
                ));
            }
            let op_token = self.advance();
            let rhs = self.expression(rbp)?;
            lhs = self.binary(op, lhs, rhs, &op_token)?;
        }
        Ok(lhs)
    }

    fn operand(&mut self) -> Result<TypedField, EvalError> {
        match self.current.kind {
            SyntaxKind::MINUS => self.unary(UnaryOp::Neg),
            SyntaxKind::BANG => self.unary(UnaryOp::Not),
            SyntaxKind::L_PAREN => {
                let open = self.advance();
                let value = self.expression(0)?;
                if !self.at(SyntaxKind::R_PAREN) {
                    return Err(self.unclosed(&open));
                }
                self.advance();
                Ok(value)
            }
            SyntaxKind::INTEGER | SyntaxKind::DECIMAL => {
                let token = self.advance();
                let value: f64 = token.text.parse().map_err(|_| {
                    EvalError::Lexical(
                        SyntaxError::builder(ErrorCode::E0104)
                            .range(self.token_range(&token))
                            .found(token.text)
                            .build(),
                    )
                })?;
                Ok(TypedField::constant_scalar(value))
            }
            SyntaxKind::PI_KW => {
                self.advance();
                Ok(TypedField::constant_scalar(std::f64::consts::PI))
            }
            SyntaxKind::TRUE_KW => {
                self.advance();
                Ok(TypedField::constant_logical(true))
            }
            SyntaxKind::FALSE_KW => {
                self.advance();
                Ok(TypedField::constant_logical(false))
            }
            SyntaxKind::IDENT => self.identifier(),
            SyntaxKind::ERROR => Err(self.lexical_error()),
            _ => Err(self.unexpected(ErrorCode::E0406, OPERAND_START.iter().copied())),
        }
    }

    pub(super) fn unclosed(&self, open: &Token<'_>) -> EvalError {
        if self.at(SyntaxKind::ERROR) {
            return self.lexical_error();
        }
        let code = if self.at(SyntaxKind::EOF) {
            ErrorCode::E0203
        } else {
            ErrorCode::E0902
        };
        let opened = u32::from(open.offset) as usize + self.base;
        self.unexpected(code, ["')'"])
            .with_hint(format!("parenthesis opened at {}", opened))
    }

    fn unary(&mut self, op: UnaryOp) -> Result<TypedField, EvalError> {
        let token = self.advance();
        let operand = self.expression(precedence::PREFIX)?;
        let Some(result) = legality::unary_result(op, operand.kind()) else {
            let expected = match op {
                UnaryOp::Neg => "numeric operand",
                UnaryOp::Not => "logical operand",
            };
            return Err(self.type_error(
                ErrorCode::E0403,
                &token,
                format!("unary '{}' is not defined for {}", op.symbol(), describe(&operand)),
                [expected],
            ));
        };
        self.trace_reduction(|| format!("{}{} -> {}", op.symbol(), describe(&operand), result));
        let value = match op {
            UnaryOp::Neg => algebra::neg(operand),
            UnaryOp::Not => algebra::not(operand)?,
        };
        Ok(value.relabel(result))
    }

    /// Bare names: named constants, variables, then repository fields.
    fn identifier(&mut self) -> Result<TypedField, EvalError> {
        if self.peek_second() == SyntaxKind::L_PAREN {
            let name = self.advance();
            return self.call(name);
        }
        let name = self.advance();
        if name.text == "unitTensor" {
            return Ok(TypedField::constant_tensor(Kind::Tensor, Matrix3::identity()));
        }
        let field = match self.driver.variable(name.text) {
            Some(value) => value.clone(),
            None => self.driver.repository().resolve(name.text)?,
        };
        Ok(self.adopt(field))
    }

    /// Apply the dimension-checking option to a value entering the expression.
    pub(super) fn adopt(&self, field: TypedField) -> TypedField {
        if self.driver.options().check_dimensions {
            field
        } else {
            field.with_dimensions(None)
        }
    }

    /// `.x`, `.yz`, `.ii` and the postfix tensor call `.T()`.
    fn component(&mut self, value: TypedField) -> Result<TypedField, EvalError> {
        self.advance();
        if !self.at(SyntaxKind::IDENT) {
            let expected = quoted(value.kind().components().to_vec());
            return Err(self.unexpected(ErrorCode::E0408, expected));
        }
        let name = self.advance();
        let postfix_call = match TensorFunction::from_name(name.text) {
            Some(function) if self.at(SyntaxKind::L_PAREN) => Some(function),
            _ => None,
        };
        if let Some(function) = postfix_call {
            self.advance();
            self.expect(SyntaxKind::R_PAREN)?;
            if !value.kind().is_tensor_like() {
                return Err(self.type_error(
                    ErrorCode::E0405,
                    &name,
                    format!("'{}' needs a tensor, found {}", name.text, describe(&value)),
                    ["tensor", "symmTensor", "sphericalTensor"],
                ));
            }
            self.trace_reduction(|| {
                let result = function.result_kind(value.kind());
                format!("{}.{}() -> {}", describe(&value), name.text, result)
            });
            return Ok(functions::apply_tensor(function, value)?);
        }
        match value.component(name.text) {
            Some(component) => {
                self.trace_reduction(|| format!("{}.{} -> scalar", describe(&value), name.text));
                Ok(component)
            }
            None => {
                let components = value.kind().components();
                let hint = if components.is_empty() {
                    format!("{} has no components", value.kind())
                } else {
                    format!("{} components are {}", value.kind(), components.join(", "))
                };
                Err(self
                    .type_error(
                        ErrorCode::E0408,
                        &name,
                        format!("'{}' is not a component of {}", name.text, describe(&value)),
                        quoted(components.to_vec()),
                    )
                    .with_hint(hint))
            }
        }
    }

    /// `cond ? a : b`; both branches are evaluated.
    fn ternary(&mut self, cond: TypedField) -> Result<TypedField, EvalError> {
        let question = self.advance();
        if cond.kind() != Kind::Logical {
            return Err(self.type_error(
                ErrorCode::E0403,
                &question,
                format!("condition of '?:' must be logical, found {}", describe(&cond)),
                quoted(legality::operators_after(cond.kind())),
            ));
        }
        let then = self.expression(0)?;
        let colon = self.expect(SyntaxKind::COLON)?;
        let otherwise = self.expression(precedence::TERNARY_ELSE)?;
        let Some(result) = legality::ternary_result(cond.kind(), then.kind(), otherwise.kind()) else {
            return Err(self.type_error(
                ErrorCode::E0403,
                &colon,
                format!(
                    "branches of '?:' differ: {} and {}",
                    describe(&then),
                    describe(&otherwise)
                ),
                [then.kind().as_str()],
            ));
        };
        self.check_locations("?:", &cond, &then, &question)?;
        self.check_locations("?:", &then, &otherwise, &colon)?;
        self.check_locations("?:", &cond, &otherwise, &question)?;
        self.trace_reduction(|| {
            format!(
                "{} ? {} : {} -> {}",
                describe(&cond),
                describe(&then),
                describe(&otherwise),
                result
            )
        });
        Ok(algebra::select(cond, then, otherwise)?.relabel(result))
    }

    /// Reject two located values at different locations.
    pub(super) fn check_locations(
        &self,
        op: &str,
        a: &TypedField,
        b: &TypedField,
        at: &Token<'_>,
    ) -> Result<(), EvalError> {
        match (a.location(), b.location()) {
            (Some(left), Some(right)) if left != right => Err(self.type_error(
                ErrorCode::E0407,
                at,
                format!(
                    "'{}' combines {} with {}",
                    op,
                    describe(a),
                    describe(b)
                ),
                [format!("{} operand", left)],
            )),
            _ => Ok(()),
        }
    }

    fn binary(
        &mut self,
        op: BinaryOp,
        lhs: TypedField,
        rhs: TypedField,
        at: &Token<'_>,
    ) -> Result<TypedField, EvalError> {
        let Some(result) = legality::binary_result(op, lhs.kind(), rhs.kind()) else {
            let expected: Vec<String> = legality::right_operands(op, lhs.kind())
                .iter()
                .map(|k| k.as_str().to_string())
                .collect();
            return Err(self.type_error(
                ErrorCode::E0403,
                at,
                format!(
                    "'{}' is not defined for {} and {}",
                    op,
                    describe(&lhs),
                    describe(&rhs)
                ),
                expected,
            ));
        };
        self.check_locations(op.symbol(), &lhs, &rhs, at)?;
        self.trace_reduction(|| format!("{} {} {} -> {}", describe(&lhs), op, describe(&rhs), result));
        let value = match op {
            BinaryOp::Add => algebra::add(lhs, rhs)?,
            BinaryOp::Sub => algebra::sub(lhs, rhs)?,
            BinaryOp::Mul => algebra::mul(lhs, rhs)?,
            BinaryOp::Div => algebra::div(lhs, rhs)?,
            BinaryOp::Mod => algebra::modulo(lhs, rhs)?,
            BinaryOp::Inner => algebra::inner(lhs, rhs)?,
            BinaryOp::Cross => algebra::cross(lhs, rhs)?,
            BinaryOp::DoubleInner => algebra::double_inner(lhs, rhs)?,
            BinaryOp::Lt => algebra::compare(CompareOp::Lt, lhs, rhs)?,
            BinaryOp::Gt => algebra::compare(CompareOp::Gt, lhs, rhs)?,
            BinaryOp::Le => algebra::compare(CompareOp::Le, lhs, rhs)?,
            BinaryOp::Ge => algebra::compare(CompareOp::Ge, lhs, rhs)?,
            BinaryOp::Eq => algebra::compare(CompareOp::Eq, lhs, rhs)?,
            BinaryOp::Ne => algebra::compare(CompareOp::Ne, lhs, rhs)?,
            BinaryOp::And => algebra::and(lhs, rhs)?,
            BinaryOp::Or => algebra::or(lhs, rhs)?,
        };
        Ok(value.relabel(result))
    }
}

/// Tokens that may follow a complete operand of `kind`, including end of input.
fn continuations(kind: Kind) -> Vec<String> {
    let mut expected = quoted(legality::operators_after(kind));
    if kind == Kind::Logical {
        expected.push("'?'".to_string());
    }
    if !kind.components().is_empty() || kind.is_tensor_like() {
        expected.push("'.'".to_string());
    }
    expected.push("end of input".to_string());
    expected
}

/// Wrap operator symbols in quotes for an expected-set.
pub(super) fn quoted<S: AsRef<str>>(symbols: Vec<S>) -> Vec<String> {
    symbols
        .into_iter()
        .map(|s| format!("'{}'", s.as_ref()))
        .collect()
}
