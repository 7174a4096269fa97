//! # builder.rs
//!
//! This module provides the grammar options and a builder that evaluates a
//! formula in one chained call.

use crate::parser::ExpressionParser;
use crate::error::ParseError;
use crate::variable::Variables;

/// Default limit for nested parentheses, function arguments and `√` operands.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Grammar options of an [`ExpressionParser`].
///
/// The default enables every feature: built-in functions, multi-letter
/// variable names and implicit multiplication. Turning features off yields
/// the smaller dialects where, for example, `xy` means `x*y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options
{
    /// Recognize `sin(..)`, `cos(..)`, `tan(..)` and `log(..)`.
    pub functions: bool,
    /// Read a whole run of letters as one variable name.
    pub multi_letter_variables: bool,
    /// Insert multiplication between adjacent operands such as `2x`.
    pub implicit_multiplication: bool,
    /// Maximum nesting depth before evaluation is refused.
    pub max_depth: usize,
}

impl Default for Options
{
    fn default() -> Self
    {
        Self {
            functions: true,
            multi_letter_variables: true,
            implicit_multiplication: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Options
{
    pub fn with_functions(mut self, enabled: bool) -> Self
    {
        self.functions = enabled;
        self
    }

    pub fn with_multi_letter_variables(mut self, enabled: bool) -> Self
    {
        self.multi_letter_variables = enabled;
        self
    }

    pub fn with_implicit_multiplication(mut self, enabled: bool) -> Self
    {
        self.implicit_multiplication = enabled;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self
    {
        self.max_depth = max_depth;
        self
    }
}

/// Evaluates a formula with chained configuration.
///
/// # Examples
/// ```rust
/// use calcplex::{Builder, Variables};
/// use num_complex::Complex;
///
/// let parser = Builder::new("x^2 + 1")
///     .with_variables(Variables::from(&[("x", Complex::new(0.0, 1.0))]))
///     .evaluate()
///     .expect("Failed to evaluate 'x^2 + 1'");
///
/// assert_eq!(parser.lisp_tree().as_deref(), Some("(+ (^ x 2) 1)"));
/// ```
pub struct Builder
{
    formula: String,
    vars: Variables,
    options: Options,
    conjugate: bool,
}

impl Builder
{
    /// Creates a new `Builder` for `formula` with no variables and default
    /// options.
    pub fn new(formula: &str) -> Self
    {
        Self {
            formula: formula.to_string(),
            vars: Variables::new(),
            options: Options::default(),
            conjugate: false,
        }
    }

    /// Adds variable bindings. Later bindings overwrite earlier ones.
    pub fn with_variables(mut self, variables: Variables) -> Self
    {
        for (key, val) in variables.iter() {
            self.vars.insert(&[(key, *val)]);
        }
        self
    }

    /// Replaces the grammar options.
    pub fn with_options(mut self, options: Options) -> Self
    {
        self.options = options;
        self
    }

    /// Sets the nesting limit.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self
    {
        self.options.max_depth = max_depth;
        self
    }

    /// Evaluates the conjugate of the formula instead of the formula itself.
    pub fn conjugated(mut self) -> Self
    {
        self.conjugate = true;
        self
    }

    /// Parses and evaluates the formula.
    ///
    /// # Returns
    /// The parser holding the value and AST of the formula.
    ///
    /// # Errors
    /// Any [`ParseError`] raised during evaluation.
    pub fn evaluate(&self) -> Result<ExpressionParser, ParseError>
    {
        let mut parser = ExpressionParser::with_options(self.options);
        if self.conjugate {
            parser.evaluate_conjugate(&self.formula, &self.vars)?;
        } else {
            parser.evaluate(&self.formula, &self.vars)?;
        }
        Ok(parser)
    }
}

#[cfg(test)]
mod options_tests {
    use super::*;

    #[test]
    fn test_default_enables_everything() {
        let options = Options::default();
        assert!(options.functions);
        assert!(options.multi_letter_variables);
        assert!(options.implicit_multiplication);
        assert_eq!(options.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_chained_setters() {
        let options = Options::default()
            .with_functions(false)
            .with_multi_letter_variables(false)
            .with_implicit_multiplication(false)
            .with_max_depth(8);
        assert_eq!(options, Options {
            functions: false,
            multi_letter_variables: false,
            implicit_multiplication: false,
            max_depth: 8,
        });
    }
}
