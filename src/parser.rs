//! # parser.rs
//!
//! This module provides [`ExpressionParser`], a recursive-descent evaluator
//! for complex-valued expressions that builds the AST of the expression while
//! computing its value.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! Expr    := Term (('+' | '-') Term)*
//! Term    := Power (('*' | '/' | implicit) Power)*
//! Power   := Unary ('^' Unary)*
//! Unary   := '-'? Primary
//! Primary := '√' Unary
//!          | '(' (ComplexLiteral | Expr) ')'
//!          | Identifier
//!          | Number
//! ```
//!
//! # Notes
//! - `^` folds left to right: `2^3^2` is `(2^3)^2`.
//! - A parenthesized group whose content reads as a complex literal, such as
//!   `(3+2i)`, becomes a single leaf.
//! - Positions in errors are character indices into the normalized text (see
//!   [`ExpressionParser::normalized`]).

use crate::astnode::{AstNode, DisplayNode};
use crate::builder::Options;
use crate::complex::{self, Canonical, ComplexExt};
use crate::error::ParseError;
use crate::lexer::{self, Identifier, IMPLICIT_MULTIPLICATION, SQUARE_ROOT};
use crate::operators::{BinaryOperatorKind, UnaryOperatorKind};
use crate::variable::Variables;

use num_complex::Complex;
use tracing::{debug, trace};

/// Subtree together with its value.
#[derive(Debug, Clone)]
struct Evaluated {
    ast: AstNode,
    value: Complex<f64>,
}

impl Evaluated
{
    fn unary(kind: UnaryOperatorKind, operand: Self) -> Result<Self, ParseError>
    {
        let value = kind.apply(operand.value)?;
        Ok(Self { ast: AstNode::unary(kind, operand.ast), value })
    }

    fn binary(kind: BinaryOperatorKind, left: Self, right: Self) -> Result<Self, ParseError>
    {
        let value = kind.apply(left.value, right.value)?;
        Ok(Self { ast: AstNode::binary(kind, left.ast, right.ast), value })
    }

    fn negation(operand: Self) -> Self
    {
        Self { value: operand.value.scale_by(-1.0), ast: AstNode::negation(operand.ast) }
    }
}

/// Per-call parsing state over a normalized expression.
struct Cursor<'a> {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
    vars: &'a Variables,
    options: &'a Options,
}

impl<'a> Cursor<'a>
{
    fn new(normalized: &str, vars: &'a Variables, options: &'a Options) -> Self
    {
        Self { chars: normalized.chars().collect(), pos: 0, depth: 0, vars, options }
    }

    fn peek(&self) -> Option<char>
    {
        self.chars.get(self.pos).copied()
    }

    fn rest(&self, from: usize, to: usize) -> String
    {
        self.chars[from..to].iter().collect()
    }

    fn enter(&mut self) -> Result<(), ParseError>
    {
        self.depth += 1;
        if self.depth > self.options.max_depth {
            return Err(ParseError::NestingTooDeep { limit: self.options.max_depth });
        }
        Ok(())
    }

    fn leave(&mut self)
    {
        self.depth -= 1;
    }

    /// Binary operator at the cursor if it satisfies `accept`.
    fn operator(&self, accept: impl Fn(&BinaryOperatorKind) -> bool) -> Option<BinaryOperatorKind>
    {
        self.peek()
            .and_then(|ch| BinaryOperatorKind::try_from(ch).ok())
            .filter(|kind| accept(kind))
    }

    /// Parses the whole input.
    fn parse(mut self) -> Result<Evaluated, ParseError>
    {
        let result = self.expr()?;
        if self.pos < self.chars.len() {
            return Err(ParseError::TrailingInputError {
                position: self.pos,
                rest: self.rest(self.pos, self.chars.len()),
            });
        }
        Ok(result)
    }

    fn expr(&mut self) -> Result<Evaluated, ParseError>
    {
        let mut left = self.term()?;
        while let Some(kind) = self.operator(BinaryOperatorKind::is_additive) {
            self.pos += 1;
            let right = self.term()?;
            left = Evaluated::binary(kind, left, right)?;
        }
        Ok(left)
    }

    fn term(&mut self) -> Result<Evaluated, ParseError>
    {
        let mut left = self.power()?;
        while let Some(kind) = self.operator(BinaryOperatorKind::is_multiplicative) {
            self.pos += 1;
            let right = self.power()?;
            left = Evaluated::binary(kind, left, right)?;
        }
        Ok(left)
    }

    fn power(&mut self) -> Result<Evaluated, ParseError>
    {
        let mut base = self.unary()?;
        while self.operator(|kind| *kind == BinaryOperatorKind::Pow).is_some() {
            self.pos += 1;
            let exponent = self.unary()?;
            base = Evaluated::binary(BinaryOperatorKind::Pow, base, exponent)?;
        }
        Ok(base)
    }

    fn unary(&mut self) -> Result<Evaluated, ParseError>
    {
        if self.peek() == Some('-') {
            self.pos += 1;
            return Ok(Evaluated::negation(self.primary()?));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Evaluated, ParseError>
    {
        match self.peek() {
            Some(SQUARE_ROOT) => {
                self.pos += 1;
                self.enter()?;
                let operand = self.unary()?;
                self.leave();
                Evaluated::unary(UnaryOperatorKind::Sqrt, operand)
            },
            Some('(') => self.group(),
            Some(ch) if lexer::is_letter(ch) => self.identifier(),
            _ => self.number(),
        }
    }

    /// Index of the `)` matching the `(` at `open`.
    fn matching_close(&self, open: usize) -> Option<usize>
    {
        let mut level = 0usize;
        for (idx, ch) in self.chars.iter().enumerate().skip(open) {
            match ch {
                '(' => level += 1,
                ')' => {
                    level -= 1;
                    if level == 0 {
                        return Some(idx);
                    }
                },
                _ => {},
            }
        }
        None
    }

    /// Consumes the `)` closing the group opened at `open`.
    fn expect_close(&mut self, open: usize) -> Result<(), ParseError>
    {
        if self.peek() == Some(')') {
            self.pos += 1;
            return Ok(());
        }
        match self.matching_close(open) {
            None => Err(ParseError::UnclosedParenthesis { position: open }),
            Some(close) => Err(ParseError::TrailingInputError {
                position: self.pos,
                rest: self.rest(self.pos, close),
            }),
        }
    }

    /// `( ComplexLiteral )` or `( Expr )`.
    fn group(&mut self) -> Result<Evaluated, ParseError>
    {
        let open = self.pos;
        let close = self.matching_close(open)
            .ok_or(ParseError::UnclosedParenthesis { position: open })?;
        self.enter()?;

        let literal: String = self.chars[open + 1..close]
            .iter()
            .filter(|&&ch| ch != IMPLICIT_MULTIPLICATION)
            .collect();
        let result = match complex::parse(&literal) {
            Ok(value) => {
                trace!(literal = %literal, value = %Canonical(&value), "complex literal");
                self.pos = close + 1;
                Evaluated { ast: AstNode::leaf(literal), value }
            },
            Err(_) => {
                self.pos = open + 1;
                let inner = self.expr()?;
                self.expect_close(open)?;
                inner
            },
        };

        self.leave();
        Ok(result)
    }

    /// Function call or variable reference.
    fn identifier(&mut self) -> Result<Evaluated, ParseError>
    {
        let (ident, end) = lexer::read_identifier(&self.chars, self.pos, self.options);
        match ident {
            Identifier::Function(kind) => {
                let open = end;
                self.pos = open + 1;
                self.enter()?;
                let argument = self.expr()?;
                self.expect_close(open)?;
                self.leave();
                Evaluated::unary(UnaryOperatorKind::Function(kind), argument)
            },
            Identifier::Variable(name) => {
                let value = self.vars.resolve(&name)
                    .ok_or_else(|| ParseError::UnknownVariable { name: name.clone() })?;
                self.pos = end;
                Ok(Evaluated { ast: AstNode::Leaf(name), value })
            },
        }
    }

    /// Unsigned decimal numeral.
    fn number(&mut self) -> Result<Evaluated, ParseError>
    {
        let start = self.pos;
        while matches!(self.peek(), Some(ch) if ch.is_ascii_digit() || ch == '.') {
            self.pos += 1;
        }

        if self.pos == start {
            return Err(ParseError::NumberFormatError {
                position: start,
                text: self.peek().map(String::from).unwrap_or_default(),
            });
        }

        let text = self.rest(start, self.pos);
        let re = text.parse::<f64>()
            .map_err(|_| ParseError::NumberFormatError { position: start, text: text.clone() })?;
        Ok(Evaluated { ast: AstNode::Leaf(text), value: Complex::new(re, 0.0) })
    }
}

/// Evaluator for complex-valued expressions that keeps the AST of the last
/// successful evaluation.
///
/// # Examples
/// ```
/// use calcplex::{ComplexExt, ExpressionParser, Variables};
/// use num_complex::Complex;
///
/// let mut parser = ExpressionParser::new();
/// let vars = Variables::from(&[("x", Complex::new(3.0, 0.0))]);
///
/// let value = parser.evaluate("x^2 + 2i", &vars).unwrap();
/// assert_eq!(value.format(), "9.0000 + 2.0000i");
/// assert_eq!(parser.lisp_tree().as_deref(), Some("(+ (^ x 2) (* 2 i))"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExpressionParser
{
    options: Options,
    normalized: String,
    bindings: Variables,
    ast: Option<AstNode>,
    value: Option<Complex<f64>>,
}

impl ExpressionParser
{
    /// Creates a parser with the default [`Options`].
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Creates a parser with the given grammar options.
    pub fn with_options(options: Options) -> Self
    {
        Self { options, ..Self::default() }
    }

    fn parse(&self, text: &str, vars: &Variables) -> Result<(String, Evaluated), ParseError>
    {
        let normalized = lexer::normalize(text, &self.options);
        debug!(input = text, normalized = %normalized, "evaluating expression");
        let evaluated = Cursor::new(&normalized, vars, &self.options).parse()?;
        Ok((normalized, evaluated))
    }

    fn commit(&mut self, normalized: String, vars: &Variables, evaluated: Evaluated) -> Complex<f64>
    {
        debug!(value = %Canonical(&evaluated.value), "expression evaluated");
        self.normalized = normalized;
        self.bindings = vars.clone();
        self.ast = Some(evaluated.ast);
        self.value = Some(evaluated.value);
        evaluated.value
    }

    /// Parses and evaluates `text` against `vars`.
    ///
    /// On success the AST and value replace those of the previous call; on
    /// failure they are left untouched.
    ///
    /// # Errors
    /// Any [`ParseError`]; evaluation stops at the first one.
    pub fn evaluate(&mut self, text: &str, vars: &Variables) -> Result<Complex<f64>, ParseError>
    {
        let (normalized, evaluated) = self.parse(text, vars)?;
        Ok(self.commit(normalized, vars, evaluated))
    }

    /// Evaluates `text` and keeps its conjugate.
    ///
    /// The AST is wrapped in a `conjugado` node.
    pub fn evaluate_conjugate(&mut self, text: &str, vars: &Variables) -> Result<Complex<f64>, ParseError>
    {
        let (normalized, evaluated) = self.parse(text, vars)?;
        let conjugated = Evaluated::unary(UnaryOperatorKind::Conjugate, evaluated)?;
        Ok(self.commit(normalized, vars, conjugated))
    }

    /// AST of the last successful evaluation.
    pub fn ast(&self) -> Option<&AstNode>
    {
        self.ast.as_ref()
    }

    /// Value of the last successful evaluation.
    pub fn value(&self) -> Option<Complex<f64>>
    {
        self.value
    }

    /// Normalized text of the last successful evaluation.
    pub fn normalized(&self) -> &str
    {
        &self.normalized
    }

    /// Display tree rooted at `Resultado: <value>`, or `None` before the
    /// first successful evaluation.
    pub fn execution_tree(&self) -> Option<DisplayNode>
    {
        let (ast, value) = (self.ast.as_ref()?, self.value.as_ref()?);
        Some(DisplayNode::execution_tree(value, ast, &self.bindings))
    }

    /// LISP form of the AST.
    pub fn lisp_tree(&self) -> Option<String>
    {
        self.ast.as_ref().map(AstNode::to_lisp)
    }

    /// Returns true if both parsers hold no AST or hold node-by-node equal
    /// ASTs. Operand order matters.
    pub fn structurally_equals(&self, other: &ExpressionParser) -> bool
    {
        self.ast == other.ast
    }
}

#[cfg(test)]
mod expression_parser_tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use crate::functions::FunctionKind;

    fn eval(text: &str) -> Result<Complex<f64>, ParseError> {
        ExpressionParser::new().evaluate(text, &Variables::new())
    }

    fn formatted(text: &str) -> String {
        eval(text).unwrap().format()
    }

    fn lisp(text: &str, vars: &Variables) -> String {
        let mut parser = ExpressionParser::new();
        parser.evaluate(text, vars).unwrap();
        parser.lisp_tree().unwrap()
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(formatted("2+3"), "5.0000");
        assert_eq!(formatted("7 - 10"), "-3.0000");
        assert_eq!(formatted("2 + 3 * 4"), "14.0000");
        assert_eq!(formatted("(2 + 3) * 4"), "20.0000");
        assert_eq!(formatted("1 / 4"), "0.2500");
        assert_eq!(formatted("2^3"), "8.0000");
        assert_eq!(formatted("0.5 * 4"), "2.0000");
    }

    #[test]
    fn test_complex_values() {
        assert_eq!(formatted("2+3i"), "2.0000 + 3.0000i");
        assert_eq!(formatted("(1+1i)*(1-1i)"), "2.0000");
        assert_eq!(formatted("i*i"), "-1.0000");
        assert_eq!(formatted("I"), "i");
        assert_eq!(formatted("(2-i)"), "2.0000 - 1.0000i");
    }

    #[test]
    fn test_variables() {
        let vars = Variables::from(&[("x", 3.0)]);
        let mut parser = ExpressionParser::new();
        assert_eq!(parser.evaluate("x^2", &vars).unwrap().format(), "9.0000");
        assert_eq!(parser.evaluate("2x + 1", &vars).unwrap().format(), "7.0000");

        let err = parser.evaluate("y + 1", &vars).unwrap_err();
        assert_eq!(err, ParseError::UnknownVariable { name: "y".into() });
    }

    #[test]
    fn test_multi_letter_variables() {
        let vars = Variables::from(&[("ab", 5.0), ("a", 2.0), ("b", 3.0)]);
        let mut parser = ExpressionParser::new();
        assert_eq!(parser.evaluate("ab", &vars).unwrap(), Complex::new(5.0, 0.0));

        let mut single = ExpressionParser::with_options(Options::default().with_multi_letter_variables(false));
        assert_eq!(single.evaluate("ab", &vars).unwrap(), Complex::new(6.0, 0.0));
        assert_eq!(single.lisp_tree().as_deref(), Some("(* a b)"));
    }

    #[test]
    fn test_implicit_multiplication() {
        let vars = Variables::from(&[("x", 2.0)]);
        assert_eq!(lisp("2(3+1)", &vars), "(* 2 (+ 3 1))");
        assert_eq!(lisp("3x", &vars), "(* 3 x)");
        assert_eq!(lisp("(x)(x)", &vars), "(* x x)");

        let mut parser = ExpressionParser::with_options(Options::default().with_implicit_multiplication(false));
        let err = parser.evaluate("2x", &vars).unwrap_err();
        assert_eq!(err, ParseError::TrailingInputError { position: 1, rest: "x".into() });
    }

    #[test]
    fn test_unary_minus() {
        assert_eq!(formatted("-5 + 2"), "-3.0000");
        assert_eq!(formatted("-2^2"), "4.0000");
        assert_eq!(formatted("2^-1"), "0.5000");
        assert_eq!(lisp("-x", &Variables::from(&[("x", 1.0)])), "(- 0 x)");
    }

    #[test]
    fn test_power_folds_left() {
        assert_eq!(formatted("2^3^2"), "64.0000");
        assert_eq!(lisp("2^3^2", &Variables::new()), "(^ (^ 2 3) 2)");
    }

    #[test]
    fn test_square_root() {
        assert_eq!(formatted("√16"), "4.0000");
        assert_eq!(formatted("√-4"), "2.0000i");
        assert_eq!(formatted("√(2i)"), "1.0000 + 1.0000i");
        assert_eq!(lisp("√9 + 1", &Variables::new()), "(+ (√ 9) 1)");
    }

    #[test]
    fn test_functions() {
        assert_eq!(formatted("sin(30)"), "0.5000");
        assert_eq!(formatted("cos(60)"), "0.5000");
        assert_eq!(formatted("tan(45)"), "1.0000");
        assert_eq!(formatted("log(1000)"), "3.0000");
        assert_eq!(formatted("2sin(30)"), "1.0000");
        assert_eq!(lisp("sin(30) + 1", &Variables::new()), "(+ (sin 30) 1)");
    }

    #[test]
    fn test_function_errors() {
        assert!(matches!(
            eval("sin(i)"),
            Err(ParseError::ComplexArgumentUnsupported { function: FunctionKind::sin, .. })
        ));
        assert!(matches!(
            eval("log(0)"),
            Err(ParseError::DomainError { function: FunctionKind::log, .. })
        ));
        assert!(matches!(eval("log(-10)"), Err(ParseError::DomainError { .. })));
    }

    #[test]
    fn test_functions_disabled() {
        let mut parser = ExpressionParser::with_options(Options::default().with_functions(false));
        let vars = Variables::from(&[("sin", 2.0)]);
        assert_eq!(parser.evaluate("sin(3)", &vars).unwrap(), Complex::new(6.0, 0.0));
    }

    #[test]
    fn test_complex_literal_groups() {
        assert_eq!(lisp("(3+2i)", &Variables::new()), "3+2i");
        assert_eq!(lisp("(5)", &Variables::new()), "5");
        assert_eq!(lisp("3+2i", &Variables::new()), "(+ 3 (* 2 i))");
    }

    #[test]
    fn test_errors() {
        assert_eq!(eval("1/0"), Err(ParseError::DivisionByZero));
        assert_eq!(eval("(1+2"), Err(ParseError::UnclosedParenthesis { position: 0 }));
        assert_eq!(eval("sin(30"), Err(ParseError::UnclosedParenthesis { position: 3 }));
        assert_eq!(eval("2)"), Err(ParseError::TrailingInputError { position: 1, rest: ")".into() }));
        assert_eq!(eval("1.2.3"), Err(ParseError::NumberFormatError { position: 0, text: "1.2.3".into() }));
        assert_eq!(eval("2*"), Err(ParseError::NumberFormatError { position: 2, text: String::new() }));
        assert_eq!(eval(""), Err(ParseError::NumberFormatError { position: 0, text: String::new() }));
        assert_eq!(eval("2^i"), Err(ParseError::ComplexExponentUnsupported { exponent: "i".into() }));
    }

    #[test]
    fn test_nesting_guard() {
        let deep = format!("{}1{}", "(".repeat(300), ")".repeat(300));
        assert_eq!(eval(&deep), Err(ParseError::NestingTooDeep { limit: 256 }));

        let shallow = format!("{}1{}", "(".repeat(200), ")".repeat(200));
        assert_eq!(eval(&shallow), Ok(Complex::new(1.0, 0.0)));

        let roots = format!("{}4", "√".repeat(300));
        assert_eq!(eval(&roots), Err(ParseError::NestingTooDeep { limit: 256 }));
    }

    #[test]
    fn test_failed_evaluation_keeps_previous_state() {
        let mut parser = ExpressionParser::new();
        parser.evaluate("2+3", &Variables::new()).unwrap();
        let lisp_before = parser.lisp_tree();

        assert!(parser.evaluate("1/0", &Variables::new()).is_err());
        assert_eq!(parser.value(), Some(Complex::new(5.0, 0.0)));
        assert_eq!(parser.lisp_tree(), lisp_before);
        assert_eq!(parser.normalized(), "2+3");
    }

    #[test]
    fn test_empty_parser() {
        let parser = ExpressionParser::new();
        assert!(parser.ast().is_none());
        assert!(parser.value().is_none());
        assert!(parser.execution_tree().is_none());
        assert!(parser.lisp_tree().is_none());
        assert!(parser.structurally_equals(&ExpressionParser::new()));
    }

    #[test]
    fn test_execution_tree() {
        let vars = Variables::from(&[("x", 3.0)]);
        let mut parser = ExpressionParser::new();
        parser.evaluate("2 + x", &vars).unwrap();

        let tree = parser.execution_tree().unwrap();
        assert_eq!(tree.label, "Resultado: 5.0000");
        assert_eq!(tree.children.len(), 1);
        assert_eq!(tree.children[0].label, "+");
        assert_eq!(tree.children[0].children[0].label, "2.0000");
        assert_eq!(tree.children[0].children[1].label, "x = 3.0000");

        // exports are repeatable
        assert_eq!(parser.execution_tree(), Some(tree));
        assert_eq!(parser.lisp_tree(), parser.lisp_tree());
    }

    #[test]
    fn test_lisp_precedence() {
        assert_eq!(lisp("2+3*4", &Variables::new()), "(+ 2 (* 3 4))");
        assert_eq!(lisp("1-2-3", &Variables::new()), "(- (- 1 2) 3)");
        assert_eq!(lisp("8/4/2", &Variables::new()), "(/ (/ 8 4) 2)");
    }

    #[test]
    fn test_structural_equality() {
        let vars = Variables::from(&[("a", 1.0), ("b", 2.0)]);
        let mut ab = ExpressionParser::new();
        let mut ba = ExpressionParser::new();
        ab.evaluate("a+b", &vars).unwrap();
        ba.evaluate("b+a", &vars).unwrap();
        assert!(!ab.structurally_equals(&ba));

        let mut again = ExpressionParser::new();
        again.evaluate("a + b", &vars).unwrap();
        assert!(ab.structurally_equals(&again));
        assert!(!ab.structurally_equals(&ExpressionParser::new()));
    }

    #[test]
    fn test_leaf_count_of_parsed_expressions() {
        let vars = Variables::from(&[("x", 2.0), ("y", 1.0)]);
        let mut parser = ExpressionParser::new();

        parser.evaluate("2x + (3+2i) - y", &vars).unwrap();
        assert_eq!(parser.ast().unwrap().leaf_count(), 4);

        // `-x` keeps a synthetic `0` leaf
        parser.evaluate("-x", &vars).unwrap();
        assert_eq!(parser.lisp_tree().as_deref(), Some("(- 0 x)"));
        assert_eq!(parser.ast().unwrap().leaf_count(), 2);
    }

    #[test]
    fn test_long_operator_chain() {
        let terms = 200_000;
        let text = vec!["1"; terms].join("+");
        let mut parser = ExpressionParser::new();
        let value = parser.evaluate(&text, &Variables::new()).unwrap();
        assert_abs_diff_eq!(value.re, terms as f64);
        assert_eq!(parser.ast().unwrap().leaf_count(), terms);

        let lisp = parser.lisp_tree().unwrap();
        assert!(lisp.starts_with("(+ (+ "));
        assert!(lisp.ends_with(" 1)"));

        let tree = parser.execution_tree().unwrap();
        assert_eq!(tree.label, format!("Resultado: {}", value.format()));
        assert_eq!(tree.children[0].label, "+");

        let mut again = ExpressionParser::new();
        again.evaluate(&text, &Variables::new()).unwrap();
        assert!(parser.structurally_equals(&again));
        assert_eq!(parser.execution_tree(), again.execution_tree());

        // replacing the AST drops the old chain
        again.evaluate("1", &Variables::new()).unwrap();
        assert!(!parser.structurally_equals(&again));
    }

    #[test]
    fn test_conjugate() {
        let mut parser = ExpressionParser::new();
        let value = parser.evaluate_conjugate("3+2i", &Variables::new()).unwrap();
        assert_eq!(value, Complex::new(3.0, -2.0));
        assert_eq!(parser.value(), Some(value));
        assert_eq!(parser.lisp_tree().as_deref(), Some("(conjugado (+ 3 (* 2 i)))"));

        let tree = parser.execution_tree().unwrap();
        assert_eq!(tree.label, "Resultado: 3.0000 - 2.0000i");
        assert_eq!(tree.children[0].label, "conjugado");
    }

    #[test]
    fn test_division() {
        let value = eval("(1+2i)/(3-4i)").unwrap();
        assert_abs_diff_eq!(value.re, -0.2, epsilon = 1.0e-12);
        assert_abs_diff_eq!(value.im, 0.4, epsilon = 1.0e-12);
    }
}
