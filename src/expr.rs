//! Boolean expressions.
//!
//! The analyses in this crate only ever look at a formula through the [`Formula`] trait:
//! its top-level connective ([`Formula::shape`]), its atoms, and its value under a partial
//! assignment. [`Expr`] is the built-in implementation, with a small text parser.
//!
//! # Syntax
//!
//! ```text
//! expr    := term ('|' term)*
//! term    := factor ('&' factor)*
//! factor  := '!' factor | '~' factor | '(' expr ')' | 'true' | 'false' | ident
//! ident   := [A-Za-z_][A-Za-z0-9_.]*
//! ```
//!
//! A chain of the same operator becomes one n-ary node, but parentheses are kept:
//! `a & b & c` is a single three-way conjunction, while `(a & b) & c` nests.
//!
//! # Example
//!
//! ```
//! use misclass_rs::expr::{Expr, Formula};
//! use misclass_rs::types::Assignment;
//!
//! let f: Expr = "(a & b) | (a & c)".parse().unwrap();
//! assert_eq!(f.atoms().len(), 3);
//!
//! // `a = false` kills both terms, so the value is known without `b` and `c`.
//! let partial: Assignment = [("a", false)].into_iter().collect();
//! assert_eq!(f.evaluate(&partial), Some(false));
//!
//! // `a = true` alone is not enough.
//! let partial: Assignment = [("a", true)].into_iter().collect();
//! assert_eq!(f.evaluate(&partial), None);
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;
use crate::types::{Assignment, Var};

/// The top-level structure of a formula: its connective and direct children.
#[derive(Debug)]
pub enum Shape<'a, F> {
    Const(bool),
    Atom(&'a Var),
    Not(&'a F),
    And(&'a [F]),
    Or(&'a [F]),
}

/// The narrow interface the analyses need from a boolean-expression engine.
///
/// Only [`shape`][Formula::shape] is required; atom extraction and partial evaluation
/// are derived from it.
pub trait Formula: Sized {
    fn shape(&self) -> Shape<'_, Self>;

    /// The set of variables occurring anywhere in the formula.
    fn atoms(&self) -> BTreeSet<Var> {
        let mut atoms = BTreeSet::new();
        collect_atoms(self, &mut atoms);
        atoms
    }

    /// Substitutes `assignment` and returns the resulting truth value if it is fully
    /// determined, or `None` if it still depends on unassigned variables.
    fn evaluate(&self, assignment: &Assignment) -> Option<bool> {
        match self.shape() {
            Shape::Const(value) => Some(value),
            Shape::Atom(var) => assignment.get(var),
            Shape::Not(inner) => inner.evaluate(assignment).map(|v| !v),
            Shape::And(children) => {
                let mut determined = true;
                for child in children {
                    match child.evaluate(assignment) {
                        Some(false) => return Some(false),
                        Some(true) => {}
                        None => determined = false,
                    }
                }
                determined.then_some(true)
            }
            Shape::Or(children) => {
                let mut determined = true;
                for child in children {
                    match child.evaluate(assignment) {
                        Some(true) => return Some(true),
                        Some(false) => {}
                        None => determined = false,
                    }
                }
                determined.then_some(false)
            }
        }
    }
}

fn collect_atoms<F: Formula>(formula: &F, atoms: &mut BTreeSet<Var>) {
    match formula.shape() {
        Shape::Const(_) => {}
        Shape::Atom(var) => {
            atoms.insert(var.clone());
        }
        Shape::Not(inner) => collect_atoms(inner, atoms),
        Shape::And(children) | Shape::Or(children) => {
            for child in children {
                collect_atoms(child, atoms);
            }
        }
    }
}

/// A boolean expression tree with n-ary conjunctions and disjunctions.
///
/// Construction never simplifies: `a & a` stays a two-child conjunction.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Expr {
    Const(bool),
    Var(Var),
    Not(Box<Expr>),
    And(Vec<Expr>),
    Or(Vec<Expr>),
}

impl Expr {
    pub fn var(var: impl Into<Var>) -> Self {
        Expr::Var(var.into())
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(inner: Expr) -> Self {
        Expr::Not(Box::new(inner))
    }

    pub fn and(children: impl IntoIterator<Item = Expr>) -> Self {
        Expr::And(children.into_iter().collect())
    }

    pub fn or(children: impl IntoIterator<Item = Expr>) -> Self {
        Expr::Or(children.into_iter().collect())
    }

    /// Builds a DNF from a list of terms, each given as a list of variable names.
    ///
    /// A single-variable term becomes a bare variable, and a single term becomes the
    /// whole formula. An empty term list yields `false`; an empty term yields `true`.
    ///
    /// ```
    /// use misclass_rs::expr::Expr;
    ///
    /// let f = Expr::from_terms([["a", "b"], ["a", "c"]]);
    /// assert_eq!(f.to_string(), "(a & b) | (a & c)");
    /// ```
    pub fn from_terms<T, V>(terms: impl IntoIterator<Item = T>) -> Self
    where
        T: IntoIterator<Item = V>,
        V: Into<Var>,
    {
        let mut terms: Vec<Expr> = terms
            .into_iter()
            .map(|term| {
                let mut vars: Vec<Expr> = term.into_iter().map(Expr::var).collect();
                match vars.len() {
                    0 => Expr::Const(true),
                    1 => vars.remove(0),
                    _ => Expr::And(vars),
                }
            })
            .collect();
        match terms.len() {
            0 => Expr::Const(false),
            1 => terms.remove(0),
            _ => Expr::Or(terms),
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Or(children) if children.len() > 1 => 1,
            Expr::And(children) if children.len() > 1 => 2,
            _ => 3,
        }
    }

    fn fmt_child(child: &Expr, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Compound children are always parenthesized, so nesting survives a re-parse.
        if child.precedence() < 3 {
            write!(f, "({})", child)
        } else {
            write!(f, "{}", child)
        }
    }
}

impl Formula for Expr {
    fn shape(&self) -> Shape<'_, Self> {
        match self {
            Expr::Const(value) => Shape::Const(*value),
            Expr::Var(var) => Shape::Atom(var),
            Expr::Not(inner) => Shape::Not(inner),
            Expr::And(children) => Shape::And(children),
            Expr::Or(children) => Shape::Or(children),
        }
    }
}

impl From<Var> for Expr {
    fn from(var: Var) -> Self {
        Expr::Var(var)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Const(value) => write!(f, "{}", value),
            Expr::Var(var) => write!(f, "{}", var),
            Expr::Not(inner) => {
                write!(f, "!")?;
                Self::fmt_child(inner, f)
            }
            Expr::And(children) | Expr::Or(children) => {
                let (op, empty) = match self {
                    Expr::And(_) => (" & ", "true"),
                    _ => (" | ", "false"),
                };
                if children.is_empty() {
                    return write!(f, "{}", empty);
                }
                if children.len() == 1 {
                    return write!(f, "({})", children[0]);
                }
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, "{}", op)?;
                    }
                    Self::fmt_child(child, f)?;
                }
                Ok(())
            }
        }
    }
}

impl FromStr for Expr {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parser = Parser::new(s);
        let expr = parser.parse_or()?;
        parser.skip_whitespace();
        if let Some(c) = parser.peek() {
            return Err(ParseError::new(parser.pos, format!("unexpected character `{}`", c)));
        }
        Ok(expr)
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_whitespace();
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut children = vec![self.parse_and()?];
        while self.eat('|') {
            children.push(self.parse_and()?);
        }
        Ok(if children.len() == 1 {
            children.remove(0)
        } else {
            Expr::Or(children)
        })
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut children = vec![self.parse_factor()?];
        while self.eat('&') {
            children.push(self.parse_factor()?);
        }
        Ok(if children.len() == 1 {
            children.remove(0)
        } else {
            Expr::And(children)
        })
    }

    fn parse_factor(&mut self) -> Result<Expr, ParseError> {
        self.skip_whitespace();
        let start = self.pos;
        match self.peek() {
            Some('!') | Some('~') => {
                self.bump();
                Ok(Expr::not(self.parse_factor()?))
            }
            Some('(') => {
                self.bump();
                let inner = self.parse_or()?;
                if !self.eat(')') {
                    return Err(ParseError::new(self.pos, "expected `)`"));
                }
                Ok(inner)
            }
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                while self
                    .peek()
                    .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
                {
                    self.bump();
                }
                Ok(match &self.input[start..self.pos] {
                    "true" => Expr::Const(true),
                    "false" => Expr::Const(false),
                    name => Expr::var(name),
                })
            }
            Some(c) => Err(ParseError::new(start, format!("unexpected character `{}`", c))),
            None => Err(ParseError::new(start, "unexpected end of input")),
        }
    }
}
