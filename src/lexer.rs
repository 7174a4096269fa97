//! lexer.rs
//!
//! Normalization of raw expression text into the character stream consumed by
//! the parser.
//!
//! There is no separate token stream. Instead, whitespace is removed and an
//! explicit marker ([`IMPLICIT_MULTIPLICATION`]) is inserted wherever two
//! adjacent characters imply a product, e.g. `2x`, `3(x+1)` or `(a)(b)`.
//! Identifier reading is shared between normalization, the parser and the
//! variable scanner so that all three agree on what a name is.

use crate::builder::Options;
use crate::functions::FunctionKind;
use crate::variable;

/// Marker inserted for implicit multiplication (U+2062 INVISIBLE TIMES).
///
/// The parser treats it exactly like `*`; it is dropped again when the content
/// of a parenthesized group is tried as a complex literal.
pub const IMPLICIT_MULTIPLICATION: char = '\u{2062}';

/// Prefix square-root operator.
pub const SQUARE_ROOT: char = '√';

/// What a run of letters turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub enum Identifier {
    /// A built-in function name directly followed by `(`.
    Function(FunctionKind),
    /// A variable reference.
    Variable(String),
}

/// Returns true for characters that may form an identifier.
pub fn is_letter(ch: char) -> bool
{
    ch.is_alphabetic()
}

/// Reads the identifier starting at `start`.
///
/// A maximal run of letters directly followed by `(` that names a built-in
/// function is a function call. Otherwise the identifier is a variable: the
/// whole run, or only its first letter when multi-letter variables are
/// disabled.
///
/// # Returns
///
/// The identifier and the index just past it.
pub fn read_identifier(chars: &[char], start: usize, options: &Options) -> (Identifier, usize)
{
    let mut end = start;
    while end < chars.len() && is_letter(chars[end]) {
        end += 1;
    }
    let word: String = chars[start..end].iter().collect();

    if options.functions && chars.get(end) == Some(&'(') {
        if let Ok(kind) = word.parse::<FunctionKind>() {
            return (Identifier::Function(kind), end);
        }
    }

    if options.multi_letter_variables {
        (Identifier::Variable(word), end)
    } else {
        (Identifier::Variable(chars[start].to_string()), start + 1)
    }
}

/// Returns true if a product is implied between `prev` and `next`.
fn implies_multiplication(prev: char, next: char) -> bool
{
    let prev_digit = prev.is_ascii_digit();
    let prev_letter = is_letter(prev);
    let prev_close = prev == ')';

    match next {
        '(' => prev_digit || prev_letter || prev_close,
        d if d.is_ascii_digit() => prev_letter || prev_close,
        l if is_letter(l) => prev_digit || prev_close || prev_letter,
        _ => false,
    }
}

/// Normalizes an expression for parsing.
///
/// # Arguments
///
/// * `input` - The raw expression text.
/// * `options` - Grammar options; markers are only inserted when implicit
///   multiplication is enabled.
///
/// # Returns
///
/// The expression without whitespace, with implicit products made explicit.
pub fn normalize(input: &str, options: &Options) -> String
{
    let chars: Vec<char> = input.chars().filter(|ch| !ch.is_whitespace()).collect();
    let mut normalized = String::with_capacity(chars.len() * 2);
    let mut prev: Option<char> = None;
    let mut idx = 0;

    let push = |normalized: &mut String, prev: Option<char>, next: char| {
        if let Some(prev) = prev {
            if options.implicit_multiplication && implies_multiplication(prev, next) {
                normalized.push(IMPLICIT_MULTIPLICATION);
            }
        }
        normalized.push(next);
    };

    while idx < chars.len() {
        let ch = chars[idx];
        if !is_letter(ch) {
            push(&mut normalized, prev, ch);
            prev = Some(ch);
            idx += 1;
            continue;
        }

        let (ident, end) = read_identifier(&chars, idx, options);
        push(&mut normalized, prev, ch);
        normalized.extend(&chars[idx + 1..end]);
        prev = Some(chars[end - 1]);
        idx = end;

        if let Identifier::Function(_) = ident {
            // the call's own parenthesis
            normalized.push('(');
            prev = Some('(');
            idx += 1;
        }
    }

    normalized
}

/// Returns the distinct variable names of `input`, in order of first
/// appearance.
///
/// The imaginary unit and function names used as calls are not variables.
///
/// # Examples
/// ```
/// use calcplex::{lexer, Options};
///
/// let names = lexer::variable_names("2x + sin(y) * x - 3i", &Options::default());
/// assert_eq!(names, vec!["x", "y"]);
/// ```
pub fn variable_names(input: &str, options: &Options) -> Vec<String>
{
    let chars: Vec<char> = normalize(input, options).chars().collect();
    let mut names: Vec<String> = Vec::new();
    let mut idx = 0;

    while idx < chars.len() {
        if !is_letter(chars[idx]) {
            idx += 1;
            continue;
        }
        let (ident, end) = read_identifier(&chars, idx, options);
        if let Identifier::Variable(name) = ident {
            if !variable::is_reserved(&name) && !names.contains(&name) {
                names.push(name);
            }
        }
        idx = end;
    }

    names
}
