//! # variable.rs
//!
//! Variable bindings for expressions, and the collaborator that asks a user
//! for the value of every variable an expression mentions.
//!
//! The imaginary unit `i` (and `I`) is reserved: it always resolves to
//! `(0, 1)` and a user binding with that name is ignored.

use crate::builder::Options;
use crate::complex::{self, Canonical};
use crate::error::BindingError;

use num_complex::Complex;
use phf::Map;
use phf_macros::phf_map;
use std::collections::HashMap;
use tracing::debug;

pub use crate::lexer::variable_names;

/// Identifiers bound by the grammar itself.
static RESERVED: Map<&'static str, Complex<f64>> = phf_map! {
    "i" => Complex::new(0.0, 1.0),
    "I" => Complex::new(0.0, 1.0),
};

/// Returns true if `name` is reserved and cannot be rebound.
pub fn is_reserved(name: &str) -> bool
{
    RESERVED.contains_key(name)
}

/// Case-sensitive name to value bindings used during evaluation.
///
/// An expression sees the reserved imaginary unit first and these bindings
/// second; see [`Variables::resolve`].
///
/// # Examples
///
/// ```
/// use calcplex::Variables;
/// use num_complex::Complex;
///
/// let mut vars = Variables::new();
/// vars.insert(&[("z", Complex::new(2.0, 3.0)), ("k", Complex::new(0.5, 0.0))]);
///
/// assert_eq!(vars.get("z"), Some(&Complex::new(2.0, 3.0)));
/// assert_eq!(vars.resolve("i"), Some(Complex::new(0.0, 1.0)));
/// assert_eq!(vars.resolve("Z"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Variables {
    bindings: HashMap<String, Complex<f64>>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds bindings from `(name, value)` pairs; values are anything that
    /// converts into `Complex<f64>`, such as plain `f64`.
    ///
    /// ```
    /// use calcplex::Variables;
    ///
    /// let vars = Variables::from(&[("r", 4.0), ("s", -1.5)]);
    /// assert_eq!(vars.len(), 2);
    /// ```
    pub fn from<V>(pairs: &[(&str, V)]) -> Self
    where
        V: Clone,
        Complex<f64>: From<V>,
    {
        let mut vars = Self::new();
        vars.insert(pairs);
        vars
    }

    /// Binds every pair, replacing earlier values of the same name.
    pub fn insert<V>(&mut self, pairs: &[(&str, V)])
    where
        V: Clone,
        Complex<f64>: From<V>,
    {
        self.bindings.extend(
            pairs.iter().map(|(name, value)| (name.to_string(), Complex::from(value.clone()))),
        );
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// User-supplied value of `name`. Reserved names are not consulted.
    pub fn get(&self, name: &str) -> Option<&Complex<f64>> {
        self.bindings.get(name)
    }

    /// Looks a name up the way expressions see it: reserved identifiers
    /// first, then the user bindings.
    pub fn resolve(&self, name: &str) -> Option<Complex<f64>> {
        RESERVED.get(name).or_else(|| self.bindings.get(name)).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Complex<f64>)> {
        self.bindings.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Asks for the value of every variable in `input` that `known` does not
/// already bind.
///
/// `prompt` is called once per missing name, in order of first appearance,
/// and returns the text typed by the user or `None` if the prompt was
/// cancelled. Answers are read with [`complex::parse`].
///
/// # Returns
/// `known` extended with the answers.
///
/// # Errors
/// - [`BindingError::Cancelled`] if a prompt is cancelled or answered with
///   blank text.
/// - [`BindingError::InvalidValue`] if an answer is not a complex literal.
///
/// Collection stops at the first error and no partial table is returned.
///
/// # Examples
/// ```
/// use calcplex::{collect_bindings, Options, Variables};
/// use num_complex::Complex;
///
/// let vars = collect_bindings("x^2 + y", &Options::default(), &Variables::new(), |name| {
///     Some(if name == "x" { "3".to_string() } else { "1-2i".to_string() })
/// }).unwrap();
///
/// assert_eq!(vars.get("x"), Some(&Complex::new(3.0, 0.0)));
/// assert_eq!(vars.get("y"), Some(&Complex::new(1.0, -2.0)));
/// ```
pub fn collect_bindings<F>(
    input: &str,
    options: &Options,
    known: &Variables,
    mut prompt: F,
) -> Result<Variables, BindingError>
where
    F: FnMut(&str) -> Option<String>,
{
    let mut vars = known.clone();
    for name in variable_names(input, options) {
        if vars.contains(&name) {
            continue;
        }

        let answer = prompt(&name)
            .filter(|answer| !answer.trim().is_empty())
            .ok_or_else(|| BindingError::Cancelled { name: name.clone() })?;
        let value = complex::parse(&answer)
            .map_err(|source| BindingError::InvalidValue { name: name.clone(), source })?;

        debug!(name = %name, value = %Canonical(&value), "variable bound");
        vars.insert(&[(name.as_str(), value)]);
    }
    Ok(vars)
}
