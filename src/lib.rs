//! # calcplex
//!
//! `calcplex` is a Rust library for evaluating **complex-valued** arithmetic
//! expressions typed by a person, such as `2x + 3i`, `(1+1i)*(1-1i)` or
//! `√-4 + sin(30)`, and for exporting the syntax tree of what was evaluated.
//!
//! ## Overview
//! - Evaluate expressions over [`num_complex::Complex<f64>`] with `+ - * / ^`,
//!   unary minus, `√` and the real functions `sin`, `cos`, `tan` (degrees)
//!   and `log` (base 10).
//! - Write products implicitly: `2x`, `3(x+1)`, `(a)(b)`.
//! - Bind variables with [`Variables`]; `i` and `I` are the imaginary unit.
//! - Inspect the result as a labelled display tree, a LISP string, or compare
//!   two expressions structurally.
//!
//! Internally, the text is normalized (whitespace removed, implicit products
//! made explicit) and then read by a recursive-descent parser that computes
//! the value and builds the AST in the same pass.
//!
//! ## Example
//! ```rust
//! use num_complex::Complex;
//! use calcplex::{ComplexExt, ExpressionParser, Variables};
//!
//! let mut vars = Variables::new();
//! vars.insert(&[("a", Complex::new(3.0, 2.0))]);
//!
//! let mut parser = ExpressionParser::new();
//! let result = parser.evaluate("2a - (1+1i)", &vars)
//!     .expect("Failed to evaluate formula");
//!
//! assert_eq!(result.format(), "5.0000 + 3.0000i");
//! assert_eq!(parser.lisp_tree().as_deref(), Some("(- (* 2 a) 1+1i)"));
//! println!("{}", parser.execution_tree().unwrap());
//! ```
//!
//! ## Example: Retrieving All Names
//! ```rust
//! use calcplex::functions::FunctionKind;
//! use calcplex::operators::BinaryOperatorKind;
//!
//! // Functions
//! let function_names: &[&str] = FunctionKind::available_names();
//! println!("Functions: {:?}", function_names);
//!
//! // Binary operators
//! let binary_names: &[char] = BinaryOperatorKind::names();
//! println!("Binary Operators: {:?}", binary_names);
//! ```
//!
//! ## License
//! Licensed under either **MIT** or **Apache-2.0** at your option.

pub mod astnode;
pub mod builder;
pub mod complex;
pub mod error;
pub mod functions;
pub mod lexer;
pub mod operators;
pub mod parser;
pub mod variable;

pub use crate::astnode::{AstNode, DisplayNode};
pub use crate::builder::{Builder, Options};
pub use crate::complex::{Canonical, ComplexExt};
pub use crate::error::{BindingError, FormatError, ParseError};
pub use crate::parser::ExpressionParser;
pub use crate::variable::{collect_bindings, Variables};

use num_complex::Complex;

/// Evaluates a formula once with the default [`Options`].
///
/// Use an [`ExpressionParser`] instead when the AST of the formula is
/// needed afterwards.
///
/// # Example
/// ```rust
/// use num_complex::Complex;
/// use calcplex::{evaluate, Variables};
///
/// let vars = Variables::from(&[("z", Complex::new(0.0, 2.0))]);
/// assert_eq!(evaluate("z * z", &vars), Ok(Complex::new(-4.0, 0.0)));
/// ```
pub fn evaluate(formula: &str, vars: &Variables) -> Result<Complex<f64>, ParseError>
{
    ExpressionParser::new().evaluate(formula, vars)
}

#[cfg(test)]
mod evaluate_test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_constant_number() {
        let result = evaluate("42", &Variables::new());
        assert_eq!(result, Ok(Complex::new(42.0, 0.0)));
    }

    #[test]
    fn test_imaginary_unit() {
        assert_eq!(evaluate("i", &Variables::new()), Ok(Complex::new(0.0, 1.0)));
        assert_eq!(evaluate("-I", &Variables::new()).map(|z| z.format()), Ok("-i".to_string()));
    }

    #[test]
    fn test_addition() {
        let x = Complex::new(2.0, 1.0);
        let y = Complex::new(3.0, 5.0);
        let vars = Variables::from(&[("x", x), ("y", y)]);
        let result = evaluate("x + y", &vars).unwrap();
        assert_abs_diff_eq!(result.re, (x + y).re, epsilon=1.0e-12);
        assert_abs_diff_eq!(result.im, (x + y).im, epsilon=1.0e-12);
    }

    #[test]
    fn test_nested_expression() {
        let vars = Variables::from(&[("x", 29.0)]);
        let result = evaluate("2 * sin(x + 1) + √(4)", &vars).unwrap();
        assert_abs_diff_eq!(result.re, 3.0, epsilon=1.0e-12);
        assert_abs_diff_eq!(result.im, 0.0, epsilon=1.0e-12);
    }

    #[test]
    fn test_binary_operator_precedence() {
        let result = evaluate("2 + 3 * 4 ^ 2", &Variables::new()).unwrap();
        assert_abs_diff_eq!(result.re, 50.0, epsilon=1.0e-9);
        assert_abs_diff_eq!(result.im, 0.0, epsilon=1.0e-9);
    }

    #[test]
    fn test_variables() {
        let a = Complex::new(2.0, 1.0);
        let b = Complex::new(-4.0, 2.0);
        let x = Complex::new(1.0, 0.0);
        let vars = Variables::from(&[("a", a), ("b", b), ("x", x)]);

        let result = evaluate("a * x + b", &vars).unwrap();
        let expected = a * x + b;
        assert_abs_diff_eq!(result.re, expected.re, epsilon=1.0e-12);
        assert_abs_diff_eq!(result.im, expected.im, epsilon=1.0e-12);
    }

    #[test]
    fn test_error_is_reported() {
        assert_eq!(evaluate("1/(1-1)", &Variables::new()), Err(ParseError::DivisionByZero));
    }
}
