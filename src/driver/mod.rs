//! Driver: the evaluation context for field expressions.
//!
//! The `Driver` owns everything that lives longer than one reduction: the
//! repository it resolves names against, the plugin registry, variables,
//! the options, the random generator and the result slot. The evaluator
//! borrows it mutably for the length of one parse.
//!
//! ## Usage
//!
//! ```ignore
//! let mut driver = Driver::new(&database);
//!
//! // Unconstrained: whatever kind the expression has
//! let value = driver.parse("mag(U) + p")?;
//!
//! // Constrained to one type
//! let mask = driver.parse_logical("p > 2", Location::Volume)?;
//!
//! // Variables shadow repository fields
//! driver.add_variables("a = 2*p; b = mag(U);")?;
//! let value = driver.parse("a + b")?;
//! ```

mod options;

pub use options::{DriverOptions, InterpolationOrder};

use indexmap::IndexMap;
use rand::SeedableRng;
use rand::rngs::StdRng;
use smol_str::SmolStr;
use std::sync::Arc;
use text_size::{TextRange, TextSize};

use crate::base::{Kind, Location, ValueType};
use crate::error::EvalError;
use crate::field::TypedField;
use crate::mesh::Mesh;
use crate::parser::{ErrorCode, Evaluator, Lexer, SyntaxError, SyntaxKind, Token, describe};
use crate::plugin::{PluginFunction, PluginRegistry};
use crate::repository::FieldRepository;

fn text_range(start: usize, end: usize) -> TextRange {
    TextRange::new(TextSize::new(start as u32), TextSize::new(end.max(start) as u32))
}

/// Evaluation context: entry points, variables and the result slot.
pub struct Driver<'r> {
    repository: &'r dyn FieldRepository,
    plugins: PluginRegistry,
    options: DriverOptions,
    variables: IndexMap<SmolStr, TypedField>,
    result: Option<TypedField>,
    /// Offset just past the accepted expression
    end_offset: usize,
    /// Offset of the token under the cursor
    position: usize,
    /// Where each active plugin's text starts in the outermost expression
    origins: Vec<usize>,
    rng: StdRng,
}

impl<'r> Driver<'r> {
    /// A driver with default options and the library plugins.
    pub fn new(repository: &'r dyn FieldRepository) -> Self {
        let options = DriverOptions::default();
        Self {
            repository,
            plugins: PluginRegistry::with_defaults(),
            rng: StdRng::seed_from_u64(options.random_seed),
            options,
            variables: IndexMap::new(),
            result: None,
            end_offset: 0,
            position: 0,
            origins: Vec::new(),
        }
    }

    /// Replace the options; the random generator is reseeded.
    pub fn with_options(mut self, options: DriverOptions) -> Self {
        self.rng = StdRng::seed_from_u64(options.random_seed);
        self.options = options;
        self
    }

    pub fn with_plugins(mut self, plugins: PluginRegistry) -> Self {
        self.plugins = plugins;
        self
    }

    pub fn register_plugin(&mut self, function: impl PluginFunction + 'static) {
        self.plugins.register(function);
    }

    // =========================================================================
    // ENTRY POINTS
    // =========================================================================

    /// Evaluate the whole of `text` as an expression of any type.
    ///
    /// A constant result is broadcast to the default location.
    pub fn parse(&mut self, text: &str) -> Result<&TypedField, EvalError> {
        self.accept(text, None, true)
    }

    /// Evaluate the whole of `text`, which must have type `expected`.
    pub fn parse_as(&mut self, text: &str, expected: ValueType) -> Result<&TypedField, EvalError> {
        self.accept(text, Some(expected), true)
    }

    /// Evaluate the whole of `text` as a logical field at `location`.
    pub fn parse_logical(
        &mut self,
        text: &str,
        location: Location,
    ) -> Result<&TypedField, EvalError> {
        self.accept(text, Some(ValueType::new(Kind::Logical, location)), true)
    }

    /// Evaluate the longest expression at the start of `text`.
    ///
    /// Evaluation stops at the first token that cannot continue the
    /// expression; [`end_offset`](Self::end_offset) reports where.
    pub fn parse_prefix(&mut self, text: &str) -> Result<&TypedField, EvalError> {
        self.accept(text, None, false)
    }

    /// Evaluate one argument of a plugin call.
    ///
    /// Parsing starts at byte `start` of `text` and stops before the next
    /// top-level `,` or `)`. Returns the value and the offset where it
    /// ended. A constant stays constant unless `expected` is given.
    pub fn parse_argument(
        &mut self,
        text: &str,
        start: usize,
        expected: Option<ValueType>,
    ) -> Result<(TypedField, usize), EvalError> {
        let base = self.origin();
        let mut evaluator = Evaluator::new(self, text, start, base);
        let value = evaluator.expression(0)?;
        let end = evaluator.end_offset();
        let value = match expected {
            Some(expected) => self.conform(value, expected, text_range(base + start, base + end))?,
            None => value,
        };
        Ok((value, end))
    }

    /// Evaluate `name = expression` assignments separated by `;`.
    ///
    /// Each value is visible to the assignments after it.
    pub fn add_variables(&mut self, text: &str) -> Result<(), EvalError> {
        let mut offset = 0;
        loop {
            let mut lexer = Lexer::at_offset(text, offset);
            let Some(name) = lexer.next_significant() else {
                return Ok(());
            };
            if name.kind != SyntaxKind::IDENT {
                return Err(statement_error(&name, text, "identifier"));
            }
            let eq = match lexer.next_significant() {
                Some(token) if token.kind == SyntaxKind::EQ => token,
                other => return Err(statement_error_at(other.as_ref(), text, "'='")),
            };

            let mut evaluator = Evaluator::new(self, text, eq.end(), 0);
            let value = evaluator.expression(0)?;
            let end = evaluator.end_offset();
            tracing::debug!(variable = name.text, value = %describe(&value), "assigned variable");
            self.variables.insert(SmolStr::new(name.text), value);

            match Lexer::at_offset(text, end).next_significant() {
                None => return Ok(()),
                Some(token) if token.kind == SyntaxKind::SEMICOLON => offset = token.end(),
                Some(token) => return Err(statement_error(&token, text, "';'")),
            }
        }
    }

    fn accept(
        &mut self,
        text: &str,
        expected: Option<ValueType>,
        whole: bool,
    ) -> Result<&TypedField, EvalError> {
        tracing::debug!(expression = text, "parse");
        self.result = None;
        self.origins.clear();

        let mut evaluator = Evaluator::new(self, text, 0, 0);
        let value = evaluator.expression(0)?;
        if whole {
            evaluator.expect_end(&value)?;
        }
        let end = evaluator.end_offset();

        let value = match expected {
            Some(expected) => self.conform(value, expected, text_range(0, end))?,
            None => {
                let location = self.options.default_location;
                value.broadcast_to(location, self.mesh().size(location))
            }
        };
        tracing::debug!(result = %describe(&value), end, "accepted");
        self.end_offset = end;
        Ok(self.result.insert(value))
    }

    /// Check `value` against `expected`, broadcasting a constant.
    fn conform(
        &self,
        value: TypedField,
        expected: ValueType,
        range: TextRange,
    ) -> Result<TypedField, EvalError> {
        let location_matches = value.location().is_none_or(|l| l == expected.location);
        if value.kind() != expected.kind || !location_matches {
            let found = describe(&value);
            return Err(EvalError::Syntax(
                SyntaxError::builder(ErrorCode::E0409)
                    .message(format!("expected {}, found {}", expected, found))
                    .range(range)
                    .expected([expected.to_string()])
                    .found(found)
                    .build(),
            ));
        }
        Ok(value.broadcast_to(expected.location, self.mesh().size(expected.location)))
    }

    // =========================================================================
    // VARIABLES
    // =========================================================================

    pub fn variable(&self, name: &str) -> Option<&TypedField> {
        self.variables.get(name)
    }

    pub fn set_variable(&mut self, name: impl Into<SmolStr>, value: TypedField) {
        self.variables.insert(name.into(), value);
    }

    /// Variables in assignment order.
    pub fn variables(&self) -> impl Iterator<Item = (&str, &TypedField)> {
        self.variables.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn clear_variables(&mut self) {
        self.variables.clear();
    }

    // =========================================================================
    // RESULT SLOT
    // =========================================================================

    /// Value of the last successful parse.
    pub fn result(&self) -> Option<&TypedField> {
        self.result.as_ref()
    }

    pub fn take_result(&mut self) -> Option<TypedField> {
        self.result.take()
    }

    pub fn result_type(&self) -> Option<ValueType> {
        self.result.as_ref().and_then(TypedField::value_type)
    }

    pub fn is_logical(&self) -> bool {
        self.result.as_ref().is_some_and(TypedField::is_logical)
    }

    /// Offset just past the last accepted expression.
    pub fn end_offset(&self) -> usize {
        self.end_offset
    }

    /// Offset of the token the evaluator last looked at.
    pub fn position(&self) -> usize {
        self.position
    }

    // =========================================================================
    // CONTEXT
    // =========================================================================

    pub fn options(&self) -> &DriverOptions {
        &self.options
    }

    pub fn repository(&self) -> &'r dyn FieldRepository {
        self.repository
    }

    pub fn mesh(&self) -> &'r Mesh {
        self.repository.mesh()
    }

    pub fn plugins(&self) -> &PluginRegistry {
        &self.plugins
    }

    pub(crate) fn plugin(&self, name: &str) -> Option<Arc<dyn PluginFunction>> {
        self.plugins.get(name)
    }

    pub(crate) fn set_position(&mut self, position: usize) {
        self.position = position;
    }

    pub(crate) fn push_origin(&mut self, origin: usize) {
        self.origins.push(origin);
    }

    pub(crate) fn pop_origin(&mut self) {
        self.origins.pop();
    }

    /// Start of the innermost plugin text, 0 outside plugins.
    pub(crate) fn origin(&self) -> usize {
        self.origins.last().copied().unwrap_or(0)
    }

    pub(crate) fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}

fn statement_error(token: &Token<'_>, text: &str, expected: &str) -> EvalError {
    statement_error_at(Some(token), text, expected)
}

fn statement_error_at(token: Option<&Token<'_>>, text: &str, expected: &str) -> EvalError {
    let (range, found) = match token {
        Some(token) => {
            let start = u32::from(token.offset) as usize;
            (text_range(start, token.end()), token.text)
        }
        None => (text_range(text.len(), text.len()), SyntaxKind::EOF.display_name()),
    };
    if token.is_some_and(|t| t.kind == SyntaxKind::ERROR) {
        return EvalError::Lexical(
            SyntaxError::builder(ErrorCode::E0101)
                .message(format!("invalid character '{}'", found))
                .range(range)
                .found(found)
                .build(),
        );
    }
    EvalError::Syntax(
        SyntaxError::builder(ErrorCode::E0902)
            .message(format!("unexpected {}", found))
            .range(range)
            .found(found)
            .expected([expected])
            .build(),
    )
}
