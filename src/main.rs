//! # main.rs
//!
//! Command-line front end: evaluates one expression, asks on stdin for any
//! variable that was not given with `--var`, and prints the result with the
//! requested exports.

use anyhow::{bail, Context, Result};
use calcplex::{collect_bindings, complex, ComplexExt, ExpressionParser, Options, Variables};
use clap::Parser;
use num_complex::Complex;
use std::io::{self, BufRead, Write};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "calcplex")]
#[command(version)]
#[command(about = "Evaluate complex-valued arithmetic expressions")]
struct Cli {
    /// Expression to evaluate; read from the first line of stdin if omitted
    expression: Option<String>,

    /// Bind a variable, e.g. `--var x=3-2i` (repeatable)
    #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_binding)]
    vars: Vec<(String, Complex<f64>)>,

    /// Print the execution tree
    #[arg(long)]
    tree: bool,

    /// Print the AST in LISP form
    #[arg(long)]
    lisp: bool,

    /// Evaluate the conjugate of the expression
    #[arg(long)]
    conjugate: bool,

    /// Report whether EXPR has the same syntax tree as the expression
    #[arg(long, value_name = "EXPR")]
    compare: Option<String>,

    /// Maximum nesting depth of parentheses, function calls and roots
    #[arg(long, default_value_t = calcplex::builder::DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Require explicit `*` between operands
    #[arg(long)]
    no_implicit_multiplication: bool,

    /// Read `xy` as `x*y` instead of one variable named `xy`
    #[arg(long)]
    single_letter_variables: bool,

    /// Treat `sin`, `cos`, `tan` and `log` as ordinary variables
    #[arg(long)]
    no_functions: bool,
}

impl Cli
{
    fn options(&self) -> Options
    {
        Options::default()
            .with_functions(!self.no_functions)
            .with_multi_letter_variables(!self.single_letter_variables)
            .with_implicit_multiplication(!self.no_implicit_multiplication)
            .with_max_depth(self.max_depth)
    }
}

/// Parses `NAME=VALUE` where VALUE is a complex literal.
fn parse_binding(s: &str) -> Result<(String, Complex<f64>), String>
{
    let (name, value) = s.split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got `{s}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing variable name in `{s}`"));
    }
    let value = complex::parse(value).map_err(|e| e.to_string())?;
    Ok((name.to_string(), value))
}

/// Reads one line from stdin, without its line terminator. `None` on EOF.
fn read_line(stdin: &mut impl BufRead) -> io::Result<Option<String>>
{
    let mut line = String::new();
    if stdin.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(&['\r', '\n'][..]).to_string()))
}

fn main() -> Result<()>
{
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("calcplex=warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let options = cli.options();
    let mut stdin = io::stdin().lock();

    let expression = match &cli.expression {
        Some(expression) => expression.clone(),
        None => match read_line(&mut stdin).context("failed to read expression from stdin")? {
            Some(line) if !line.trim().is_empty() => line,
            _ => bail!("no expression given"),
        },
    };

    let mut known = Variables::new();
    for (name, value) in &cli.vars {
        known.insert(&[(name.as_str(), *value)]);
    }

    let mut prompt = |name: &str| {
        eprint!("{name} = ");
        io::stderr().flush().ok()?;
        read_line(&mut stdin).ok().flatten()
    };
    let mut vars = collect_bindings(&expression, &options, &known, &mut prompt)?;
    if let Some(other) = &cli.compare {
        vars = collect_bindings(other, &options, &vars, &mut prompt)?;
    }
    debug!(count = vars.len(), "bindings collected");

    let mut parser = ExpressionParser::with_options(options);
    let value = if cli.conjugate {
        parser.evaluate_conjugate(&expression, &vars)
    } else {
        parser.evaluate(&expression, &vars)
    }
    .with_context(|| format!("failed to evaluate `{expression}`"))?;

    println!("{}", value.format());

    if cli.tree {
        if let Some(tree) = parser.execution_tree() {
            print!("{tree}");
        }
    }
    if cli.lisp {
        if let Some(lisp) = parser.lisp_tree() {
            println!("{lisp}");
        }
    }
    if let Some(other) = &cli.compare {
        let mut other_parser = ExpressionParser::with_options(options);
        other_parser.evaluate(other, &vars)
            .with_context(|| format!("failed to evaluate `{other}`"))?;
        println!("structurally equal: {}", parser.structurally_equals(&other_parser));
    }

    Ok(())
}
