//! # astnode.rs
//!
//! Abstract Syntax Tree (AST) produced while an expression is evaluated, and
//! its exports:
//!
//! - LISP serialization, a fully parenthesized prefix form such as
//!   `(+ 2 (* 3 4))`;
//! - [`DisplayNode`], a labelled tree meant for tree widgets or terminals;
//! - structural equality, which is plain `==` on nodes.
//!
//! # Notes
//! - Unary negation has no node of its own: `-x` is stored as `0 - x`.
//! - Structural equality is order-sensitive, so `a+b` and `b+a` differ.

use crate::complex::{self, ComplexExt};
use crate::operators::{BinaryOperatorKind, UnaryOperatorKind};
use crate::variable::Variables;

use num_complex::Complex;

/// Label prefix of the root of an execution tree.
pub const RESULT_LABEL: &str = "Resultado";

/// Node of the expression AST.
///
/// Operator chains such as `1+1+...+1` nest one level per operator, so every
/// walk over the tree (drop, equality, clone, exports) uses an explicit stack
/// instead of recursion.
#[derive(Eq)]
pub enum AstNode {
    /// Numeral, variable name or parenthesized complex literal, stored as its
    /// source text.
    Leaf(String),

    /// Square root, function call or conjugate wrapper.
    UnaryOperator {
        kind: UnaryOperatorKind,
        expr: Box<AstNode>,
    },

    /// Binary operator applied to left and right expressions.
    BinaryOperator {
        kind: BinaryOperatorKind,
        left: Box<AstNode>,
        right: Box<AstNode>,
    },
}

/// Pending work of the LISP writer.
enum LispStep<'a> {
    Node(&'a AstNode),
    Space,
    Close,
}

impl AstNode
{
    pub fn leaf(text: impl Into<String>) -> Self
    {
        Self::Leaf(text.into())
    }

    pub fn unary(kind: UnaryOperatorKind, expr: Self) -> Self
    {
        Self::UnaryOperator { kind, expr: Box::new(expr) }
    }

    pub fn binary(kind: BinaryOperatorKind, left: Self, right: Self) -> Self
    {
        Self::BinaryOperator { kind, left: Box::new(left), right: Box::new(right) }
    }

    /// `-expr`, represented as `0 - expr`.
    pub fn negation(expr: Self) -> Self
    {
        Self::binary(BinaryOperatorKind::Sub, Self::leaf("0"), expr)
    }

    /// Returns the stored text of a leaf or the symbol of an operator.
    pub fn text(&self) -> String
    {
        match self {
            Self::Leaf(text) => text.clone(),
            Self::UnaryOperator { kind, .. } => kind.to_string(),
            Self::BinaryOperator { kind, .. } => kind.to_string(),
        }
    }

    /// Returns the children, left first.
    pub fn children(&self) -> Vec<&AstNode>
    {
        match self {
            Self::Leaf(_) => Vec::new(),
            Self::UnaryOperator { expr, .. } => vec![expr.as_ref()],
            Self::BinaryOperator { left, right, .. } => vec![left.as_ref(), right.as_ref()],
        }
    }

    /// Number of leaves in the tree.
    pub fn leaf_count(&self) -> usize
    {
        let mut count = 0;
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            match node {
                Self::Leaf(_) => count += 1,
                _ => pending.extend(node.children()),
            }
        }
        count
    }

    /// Post-order fold: `combine` receives a node and the results of its
    /// children, left first.
    fn fold<T>(&self, mut combine: impl FnMut(&AstNode, Vec<T>) -> T) -> T
    {
        let mut pending = vec![(self, false)];
        let mut results: Vec<T> = Vec::new();
        while let Some((node, expanded)) = pending.pop() {
            let children = node.children();
            if expanded || children.is_empty() {
                let args = results.split_off(results.len() - children.len());
                results.push(combine(node, args));
            } else {
                pending.push((node, true));
                pending.extend(children.into_iter().rev().map(|child| (child, false)));
            }
        }
        match results.pop() {
            Some(result) => result,
            None => unreachable!("the root is always folded"),
        }
    }

    /// Moves the children out, leaving empty leaves behind.
    fn detach_children(&mut self, out: &mut Vec<AstNode>)
    {
        let take = |child: &mut Box<AstNode>| std::mem::replace(child.as_mut(), Self::Leaf(String::new()));
        match self {
            Self::Leaf(_) => {},
            Self::UnaryOperator { expr, .. } => out.push(take(expr)),
            Self::BinaryOperator { left, right, .. } => {
                out.push(take(left));
                out.push(take(right));
            },
        }
    }

    /// Serializes the tree in prefix notation.
    ///
    /// # Examples
    /// ```
    /// use calcplex::AstNode;
    /// use calcplex::operators::BinaryOperatorKind;
    ///
    /// let ast = AstNode::binary(BinaryOperatorKind::Add, AstNode::leaf("2"), AstNode::leaf("x"));
    /// assert_eq!(ast.to_lisp(), "(+ 2 x)");
    /// ```
    pub fn to_lisp(&self) -> String
    {
        let mut out = String::new();
        let mut steps = vec![LispStep::Node(self)];
        while let Some(step) = steps.pop() {
            match step {
                LispStep::Space => out.push(' '),
                LispStep::Close => out.push(')'),
                LispStep::Node(Self::Leaf(text)) => out.push_str(text),
                LispStep::Node(Self::UnaryOperator { kind, expr }) => {
                    out.push('(');
                    out.push_str(kind.label());
                    out.push(' ');
                    steps.extend([LispStep::Close, LispStep::Node(expr)]);
                },
                LispStep::Node(Self::BinaryOperator { kind, left, right }) => {
                    out.push('(');
                    out.push(kind.symbol());
                    out.push(' ');
                    steps.extend([LispStep::Close, LispStep::Node(right), LispStep::Space, LispStep::Node(left)]);
                },
            }
        }
        out
    }

    /// Label of this node in a display tree.
    ///
    /// Bound variables read `name = value`, leaves that are complex literals
    /// are shown in canonical form, anything else by its text.
    fn display_label(&self, vars: &Variables) -> String
    {
        let Self::Leaf(text) = self else {
            return self.text();
        };
        if let Some(value) = vars.resolve(text) {
            return format!("{text} = {}", value.format());
        }
        match complex::parse(text) {
            Ok(value) => value.format(),
            Err(_) => text.clone(),
        }
    }

    /// Maps the tree onto display nodes, resolving variables against `vars`.
    pub fn to_display_tree(&self, vars: &Variables) -> DisplayNode
    {
        self.fold(|node, children| DisplayNode { label: node.display_label(vars), children })
    }
}

impl Drop for AstNode {
    fn drop(&mut self) {
        let mut detached = Vec::new();
        self.detach_children(&mut detached);
        while let Some(mut node) = detached.pop() {
            node.detach_children(&mut detached);
        }
    }
}

impl PartialEq for AstNode {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self, other)];
        while let Some(pair) = pending.pop() {
            match pair {
                (Self::Leaf(a), Self::Leaf(b)) if a == b => {},
                (
                    Self::UnaryOperator { kind: ka, expr: ea },
                    Self::UnaryOperator { kind: kb, expr: eb },
                ) if ka == kb => pending.push((ea.as_ref(), eb.as_ref())),
                (
                    Self::BinaryOperator { kind: ka, left: la, right: ra },
                    Self::BinaryOperator { kind: kb, left: lb, right: rb },
                ) if ka == kb => pending.extend([(la.as_ref(), lb.as_ref()), (ra.as_ref(), rb.as_ref())]),
                _ => return false,
            }
        }
        true
    }
}

impl Clone for AstNode {
    fn clone(&self) -> Self {
        self.fold(|node, children| {
            let mut children = children.into_iter();
            match (node, children.next(), children.next()) {
                (Self::UnaryOperator { kind, .. }, Some(expr), _) => Self::unary(*kind, expr),
                (Self::BinaryOperator { kind, .. }, Some(left), Some(right)) => Self::binary(*kind, left, right),
                (node, ..) => Self::Leaf(node.text()),
            }
        })
    }
}

impl std::fmt::Debug for AstNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AstNode").field(&self.to_lisp()).finish()
    }
}

impl std::fmt::Display for AstNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_lisp())
    }
}

/// Labelled tree for presentation.
///
/// Rendering with `{}` draws the tree with box-drawing characters:
///
/// ```text
/// Resultado: 14.0000
/// └── +
///     ├── 2.0000
///     └── *
///         ├── 3.0000
///         └── 4.0000
/// ```
#[derive(Eq)]
pub struct DisplayNode {
    pub label: String,
    pub children: Vec<DisplayNode>,
}

impl DisplayNode
{
    /// Builds the execution tree of an evaluated expression: a root labelled
    /// with the result whose only child is the AST.
    pub fn execution_tree(result: &Complex<f64>, ast: &AstNode, vars: &Variables) -> Self
    {
        Self {
            label: format!("{RESULT_LABEL}: {}", result.format()),
            children: vec![ast.to_display_tree(vars)],
        }
    }
}

impl Drop for DisplayNode {
    fn drop(&mut self) {
        let mut detached = std::mem::take(&mut self.children);
        while let Some(mut node) = detached.pop() {
            detached.append(&mut node.children);
        }
    }
}

impl PartialEq for DisplayNode {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self, other)];
        while let Some((a, b)) = pending.pop() {
            if a.label != b.label || a.children.len() != b.children.len() {
                return false;
            }
            pending.extend(a.children.iter().zip(&b.children));
        }
        true
    }
}

impl std::fmt::Debug for DisplayNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisplayNode")
            .field("label", &self.label)
            .field("children", &self.children.len())
            .finish()
    }
}

impl std::fmt::Display for DisplayNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.label)?;

        // (node, indentation of its line, last among its siblings)
        let mut pending: Vec<(&DisplayNode, String, bool)> = self.children.iter()
            .enumerate()
            .rev()
            .map(|(idx, child)| (child, String::new(), idx + 1 == self.children.len()))
            .collect();
        while let Some((node, prefix, last)) = pending.pop() {
            let (branch, indent) = if last { ("└── ", "    ") } else { ("├── ", "│   ") };
            writeln!(f, "{prefix}{branch}{}", node.label)?;

            let inner = format!("{prefix}{indent}");
            let count = node.children.len();
            pending.extend(
                node.children.iter()
                    .enumerate()
                    .rev()
                    .map(|(idx, child)| (child, inner.clone(), idx + 1 == count)),
            );
        }
        Ok(())
    }
}
