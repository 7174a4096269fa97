//! # functions.rs
//!
//! Built-in real-argument functions callable from expressions.
//!
//! The trigonometric functions take their argument in degrees and `log` is the
//! base-10 logarithm. All of them reject arguments with a non-zero imaginary
//! part; evaluating them on complex numbers is out of reach of this grammar.

use crate::error::ParseError;
use crate::complex::ComplexExt;
use num_complex::Complex;

/// Error type for parsing function names.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseFunctionError {
    /// The function name is not recognized.
    UnknownFunction,
}

macro_rules! define_functions {
    ( $( $name:ident => { domain: $domain:expr, apply: $apply:expr } ), + $(,)? ) => {
        /// Enumeration of the available built-in functions.
        #[allow(non_camel_case_types)] // To use ident as string to compare them.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum FunctionKind {
            $( $name ), +
        }

        impl FunctionKind {
            /// Returns a list of available function names.
            pub fn available_names() -> &'static [&'static str]
            {
                &[ $( stringify!($name) ),+ ]
            }

            /// Returns the name used in expressions, LISP output and tree labels.
            pub fn name(&self) -> &'static str
            {
                match self {
                    $( Self::$name => stringify!($name), )+
                }
            }

            fn in_domain(&self, x: f64) -> bool
            {
                match self {
                    $( Self::$name => $domain(x), )+
                }
            }

            fn apply_real(&self, x: f64) -> f64
            {
                match self {
                    $( Self::$name => $apply(x), )+
                }
            }
        }

        impl std::str::FromStr for FunctionKind {
            type Err = ParseFunctionError;

            fn from_str(s: &str) -> Result<Self, Self::Err>
            {
                match s {
                    $(
                        stringify!($name) => Ok(Self::$name),
                    )+
                    _ => Err(ParseFunctionError::UnknownFunction),
                }
            }
        }
    };
}

define_functions!(
    sin => { domain: |_: f64| true,     apply: |x: f64| x.to_radians().sin() },
    cos => { domain: |_: f64| true,     apply: |x: f64| x.to_radians().cos() },
    tan => { domain: |_: f64| true,     apply: |x: f64| x.to_radians().tan() },
    log => { domain: |x: f64| x > 0.0,  apply: |x: f64| x.log10() },
);

impl FunctionKind
{
    /// Applies the function to `arg`.
    ///
    /// # Errors
    /// - [`ParseError::ComplexArgumentUnsupported`] if `arg.im != 0`.
    /// - [`ParseError::DomainError`] if the real argument lies outside the
    ///   function's domain (`log` of a non-positive number).
    pub fn apply(&self, arg: Complex<f64>) -> Result<Complex<f64>, ParseError>
    {
        if arg.im != 0.0 {
            return Err(ParseError::ComplexArgumentUnsupported {
                function: *self,
                argument: arg.format(),
            });
        }
        if !self.in_domain(arg.re) {
            return Err(ParseError::DomainError { function: *self, argument: arg.format() });
        }
        Ok(Complex::new(self.apply_real(arg.re), 0.0))
    }
}

impl std::fmt::Display for FunctionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
