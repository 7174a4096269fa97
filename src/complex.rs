//! # complex.rs
//!
//! Complex-number operations used by the evaluator, together with the literal
//! syntax (`3`, `2i`, `3+2i`, `-i`, ...) and the canonical four-decimal
//! rendering shared by every output of the crate.
//!
//! Values are plain [`num_complex::Complex<f64>`]; the extra operations are
//! provided through the [`ComplexExt`] extension trait.

use crate::error::FormatError;
use num_complex::Complex;
use num_traits::Zero;

/// Magnitude under which a component is rendered as zero.
const DISPLAY_EPSILON: f64 = 1.0e-9;

/// Extension trait with the arithmetic the grammar needs on top of
/// `num_complex`.
///
/// Every method is pure: the receiver is never modified and a new value is
/// returned.
pub trait ComplexExt: Sized
{
    /// Component-wise multiplication by a real scalar.
    fn scale_by(&self, k: f64) -> Self;

    /// Returns `(re, -im)`.
    fn conjugate(&self) -> Self;

    /// Divides by `rhs` through its conjugate.
    ///
    /// Returns `None` when `|rhs|² == 0`.
    fn checked_div(&self, rhs: &Self) -> Option<Self>;

    /// Raises the value to a real power via its polar form.
    ///
    /// `0 ^ e` with `e > 0` is exactly zero.
    fn pow_real(&self, exponent: f64) -> Self;

    /// Square root of a real number; negative inputs give a purely imaginary
    /// root.
    fn sqrt_real(x: f64) -> Self;

    /// Canonical rendering. See [`Canonical`].
    fn format(&self) -> String;
}

impl ComplexExt for Complex<f64>
{
    fn scale_by(&self, k: f64) -> Self { Complex::new(self.re * k, self.im * k) }

    fn conjugate(&self) -> Self { Complex::new(self.re, -self.im) }

    fn checked_div(&self, rhs: &Self) -> Option<Self>
    {
        let divisor = rhs.norm_sqr();
        if divisor.is_zero() {
            return None;
        }
        let numerator = *self * rhs.conjugate();
        Some(Complex::new(numerator.re / divisor, numerator.im / divisor))
    }

    fn pow_real(&self, exponent: f64) -> Self
    {
        if self.is_zero() && exponent > 0.0 {
            return Complex::zero();
        }
        let (r, theta) = self.to_polar();
        Complex::from_polar(r.powf(exponent), theta * exponent)
    }

    fn sqrt_real(x: f64) -> Self
    {
        if x >= 0.0 {
            Complex::new(x.sqrt(), 0.0)
        } else {
            Complex::new(0.0, (-x).sqrt())
        }
    }

    fn format(&self) -> String { Canonical(self).to_string() }
}

/// `Display` adapter producing the canonical four-decimal form:
///
/// - `5.0000` when the imaginary part is negligible,
/// - `i`, `-i` or `2.5000i` when the real part is negligible,
/// - `1.0000 + 2.0000i` / `1.0000 - 2.0000i` otherwise.
pub struct Canonical<'a>(pub &'a Complex<f64>);

impl std::fmt::Display for Canonical<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // `+ 0.0` turns a negative zero into a positive one
        let (re, im) = (self.0.re + 0.0, self.0.im + 0.0);
        if im.abs() < DISPLAY_EPSILON {
            return write!(f, "{re:.4}");
        }
        if re.abs() < DISPLAY_EPSILON {
            if (im - 1.0).abs() < DISPLAY_EPSILON {
                return f.write_str("i");
            }
            if (im + 1.0).abs() < DISPLAY_EPSILON {
                return f.write_str("-i");
            }
            return write!(f, "{im:.4}i");
        }
        if im < 0.0 {
            write!(f, "{re:.4} - {:.4}i", -im)
        } else {
            write!(f, "{re:.4} + {im:.4}i")
        }
    }
}

fn is_imaginary_unit(ch: char) -> bool
{
    ch == 'i' || ch == 'I'
}

/// Parses a signed decimal such as `-3`, `.5` or `1.5e-3`.
///
/// Only digits, `.`, exponent markers and signs are accepted, so spellings
/// like `inf` or `NaN` that `f64::from_str` would take are rejected.
fn parse_decimal(s: &str) -> Option<f64>
{
    let allowed = |ch: char| ch.is_ascii_digit() || matches!(ch, '.' | 'e' | 'E' | '+' | '-');
    if !s.chars().all(allowed) || !s.chars().any(|ch| ch.is_ascii_digit()) {
        return None;
    }
    s.parse::<f64>().ok()
}

/// Reads the real component of a mixed literal.
fn parse_real_component(s: &str) -> Result<f64, FormatError>
{
    parse_decimal(s).ok_or_else(|| FormatError::InvalidComponent(s.to_string()))
}

/// Reads an imaginary component (`i`, `-i`, `+2.5i`, ...).
///
/// The caller guarantees the trailing imaginary unit; a missing or lone-sign
/// coefficient means magnitude one.
fn parse_imaginary_component(s: &str) -> Result<f64, FormatError>
{
    let coefficient = &s[..s.len() - 1];
    match coefficient {
        "" | "+" => Ok(1.0),
        "-" => Ok(-1.0),
        _ => parse_decimal(coefficient).ok_or_else(|| FormatError::InvalidComponent(s.to_string())),
    }
}

/// Index of the `+`/`-` separating the real and imaginary parts.
///
/// A sign at index 0 belongs to the real part and a sign right after an
/// exponent marker belongs to its number.
fn split_index(s: &str) -> Option<usize>
{
    let bytes = s.as_bytes();
    (1..bytes.len()).find(|&idx| {
        matches!(bytes[idx], b'+' | b'-') && !matches!(bytes[idx - 1], b'e' | b'E')
    })
}

/// Parses a complex literal.
///
/// Accepted forms are `R`, `Ri`, `R+Si`, `R-Si`, `i`, `+i` and `-i`, where
/// `R` and `S` are optionally signed decimals. Whitespace is ignored.
///
/// # Errors
/// - [`FormatError::Empty`] for empty input.
/// - [`FormatError::InvalidComponent`] if a component is not a decimal.
/// - [`FormatError::MissingSplit`] if a mixed literal has no sign between its
///   real and imaginary parts.
///
/// # Examples
/// ```
/// use calcplex::complex::parse;
/// use num_complex::Complex;
///
/// assert_eq!(parse("3 - 2i"), Ok(Complex::new(3.0, -2.0)));
/// assert_eq!(parse("-i"), Ok(Complex::new(0.0, -1.0)));
/// assert!(parse("3x").is_err());
/// ```
pub fn parse(s: &str) -> Result<Complex<f64>, FormatError>
{
    let clean: String = s.chars().filter(|ch| !ch.is_whitespace()).collect();
    if clean.is_empty() {
        return Err(FormatError::Empty);
    }

    if !clean.chars().any(is_imaginary_unit) {
        return parse_real_component(&clean).map(|re| Complex::new(re, 0.0));
    }

    if !clean.ends_with(is_imaginary_unit) {
        return Err(FormatError::MissingSplit(clean));
    }

    match split_index(&clean) {
        None => parse_imaginary_component(&clean).map(|im| Complex::new(0.0, im)),
        Some(idx) => {
            let (real, imag) = clean.split_at(idx);
            if real.chars().any(is_imaginary_unit) {
                return Err(FormatError::MissingSplit(clean.clone()));
            }
            Ok(Complex::new(parse_real_component(real)?, parse_imaginary_component(imag)?))
        },
    }
}
