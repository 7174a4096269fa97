//! # operators.rs
//!
//! Closed sets of operators that can appear as inner nodes of the AST.

use crate::complex::ComplexExt;
use crate::error::ParseError;
use crate::functions::FunctionKind;
use crate::lexer::IMPLICIT_MULTIPLICATION;

use num_complex::Complex;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseOperatorError {
    UnknownOperator,
}

macro_rules! binary_operator_kinds {
    ($( $name: ident => { symbol: $symbol:literal, apply: $apply:expr } ), + $(,)? ) => {
        /// Binary operators of the grammar.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum BinaryOperatorKind {
            $($name), *
        }

        impl BinaryOperatorKind {
            /// Applies the operator to `l` and `r`.
            pub fn apply(&self, l: Complex<f64>, r: Complex<f64>) -> Result<Complex<f64>, ParseError>
            {
                match self {
                    $( Self::$name => $apply(l, r), )*
                }
            }

            /// Returns the character that spells the operator.
            pub fn symbol(&self) -> char
            {
                match self {
                    $( Self::$name => $symbol, )*
                }
            }

            pub fn names() -> &'static [char]
            {
                &[ $( $symbol ),+ ]
            }
        }

        impl TryFrom<char> for BinaryOperatorKind {
            type Error = ParseOperatorError;

            fn try_from(ch: char) -> Result<Self, Self::Error>
            {
                match ch {
                    $(
                        $symbol => Ok(Self::$name),
                    )+
                    IMPLICIT_MULTIPLICATION => Ok(Self::Mul),
                    _ => Err(ParseOperatorError::UnknownOperator),
                }
            }
        }
    };
}

binary_operator_kinds! {
    Add => { symbol: '+', apply: |l: Complex<f64>, r: Complex<f64>| Ok(l + r) },
    Sub => { symbol: '-', apply: |l: Complex<f64>, r: Complex<f64>| Ok(l - r) },
    Mul => { symbol: '*', apply: |l: Complex<f64>, r: Complex<f64>| Ok(l * r) },
    Div => { symbol: '/', apply: |l: Complex<f64>, r: Complex<f64>| l.checked_div(&r).ok_or(ParseError::DivisionByZero) },
    Pow => { symbol: '^', apply: pow },
}

/// `^` only accepts real exponents.
fn pow(base: Complex<f64>, exponent: Complex<f64>) -> Result<Complex<f64>, ParseError>
{
    if exponent.im != 0.0 {
        return Err(ParseError::ComplexExponentUnsupported { exponent: exponent.format() });
    }
    Ok(base.pow_real(exponent.re))
}

impl BinaryOperatorKind
{
    /// Additive operators, the loosest level of the grammar.
    pub fn is_additive(&self) -> bool
    {
        matches!(self, Self::Add | Self::Sub)
    }

    /// Multiplicative operators, including implicit multiplication.
    pub fn is_multiplicative(&self) -> bool
    {
        matches!(self, Self::Mul | Self::Div)
    }
}

impl std::fmt::Display for BinaryOperatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Label of the node wrapped around an expression by
/// [`ExpressionParser::evaluate_conjugate`](crate::ExpressionParser::evaluate_conjugate).
pub const CONJUGATE_LABEL: &str = "conjugado";

/// Single-child AST nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOperatorKind {
    /// `√x`.
    Sqrt,
    /// Built-in function call such as `sin(x)`.
    Function(FunctionKind),
    /// Synthetic wrapper marking a conjugated result.
    Conjugate,
}

impl UnaryOperatorKind
{
    /// Applies the operator to `x`.
    ///
    /// Square roots of real operands stay exact (`√-4 = 2i`); complex operands
    /// take the principal root through the polar form.
    pub fn apply(&self, x: Complex<f64>) -> Result<Complex<f64>, ParseError>
    {
        match self {
            Self::Sqrt if x.im == 0.0 => Ok(<Complex<f64>>::sqrt_real(x.re)),
            Self::Sqrt => Ok(x.pow_real(0.5)),
            Self::Function(kind) => kind.apply(x),
            Self::Conjugate => Ok(x.conjugate()),
        }
    }

    /// Returns the label used in LISP output and display trees.
    pub fn label(&self) -> &'static str
    {
        match self {
            Self::Sqrt => "√",
            Self::Function(kind) => kind.name(),
            Self::Conjugate => CONJUGATE_LABEL,
        }
    }
}

impl std::fmt::Display for UnaryOperatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
