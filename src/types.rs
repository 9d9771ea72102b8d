//! Variables, assignments and per-variable error probabilities.
//!
//! All maps are ordered by variable name, so iteration (and everything built from it,
//! such as integer programs) is deterministic.

use std::collections::btree_map;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// An atomic boolean identifier.
///
/// # Invariants
///
/// - The name is non-empty.
/// - Two variables are the same iff their names are equal.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Var(String);

impl Var {
    /// Creates a new variable with the given name.
    ///
    /// # Panics
    ///
    /// Panics if `name` is empty.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        assert!(!name.is_empty(), "Variable names must be non-empty");
        Var(name)
    }

    /// Returns the name of the variable.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fallible counterpart of [`Var::new`] for untrusted text: rejects empty names.
impl FromStr for Var {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if name.is_empty() {
            return Err(ParseError::new(0, "variable name must be non-empty"));
        }
        Ok(Var(name.to_string()))
    }
}

impl From<&str> for Var {
    fn from(name: &str) -> Self {
        Var::new(name)
    }
}

impl From<String> for Var {
    fn from(name: String) -> Self {
        Var::new(name)
    }
}

impl From<&Var> for Var {
    fn from(var: &Var) -> Self {
        var.clone()
    }
}

/// A (possibly partial) mapping from variables to truth values.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Assignment(BTreeMap<Var, bool>);

impl Assignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the value of `var`, returning the previous value if there was one.
    pub fn insert(&mut self, var: impl Into<Var>, value: bool) -> Option<bool> {
        self.0.insert(var.into(), value)
    }

    pub fn get(&self, var: &Var) -> Option<bool> {
        self.0.get(var).copied()
    }

    pub fn contains(&self, var: &Var) -> bool {
        self.0.contains_key(var)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The variables this assignment is defined on, in order.
    pub fn domain(&self) -> impl Iterator<Item = &Var> + '_ {
        self.0.keys()
    }

    pub fn domain_set(&self) -> BTreeSet<Var> {
        self.0.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Var, bool)> + '_ {
        self.0.iter().map(|(var, &value)| (var, value))
    }

    /// Returns `true` if both assignments give the same value to every variable in their
    /// shared domain.
    pub fn agrees_with(&self, other: &Assignment) -> bool {
        self.iter()
            .all(|(var, value)| other.get(var).map_or(true, |v| v == value))
    }

    /// Combines both assignments over the union of their domains.
    ///
    /// Returns `None` if they disagree on some shared variable.
    pub fn union(&self, other: &Assignment) -> Option<Assignment> {
        if !self.agrees_with(other) {
            return None;
        }
        let mut result = self.clone();
        for (var, value) in other.iter() {
            result.0.insert(var.clone(), value);
        }
        Some(result)
    }
}

impl<V: Into<Var>> FromIterator<(V, bool)> for Assignment {
    fn from_iter<I: IntoIterator<Item = (V, bool)>>(iter: I) -> Self {
        Assignment(iter.into_iter().map(|(v, b)| (v.into(), b)).collect())
    }
}

impl<'a> IntoIterator for &'a Assignment {
    type Item = (&'a Var, &'a bool);
    type IntoIter = btree_map::Iter<'a, Var, bool>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (var, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", var, value)?;
        }
        write!(f, "}}")
    }
}

/// Parses `a=true,b=false`. Values may also be spelled `1`/`0` or `t`/`f`.
impl FromStr for Assignment {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut assignment = Assignment::new();
        for (offset, key, value) in split_pairs(s)? {
            let value = match value.to_ascii_lowercase().as_str() {
                "true" | "t" | "1" => true,
                "false" | "f" | "0" => false,
                _ => return Err(ParseError::new(offset, format!("invalid truth value `{}`", value))),
            };
            if assignment.insert(key, value).is_some() {
                return Err(ParseError::new(offset, format!("duplicate variable `{}`", key)));
            }
        }
        Ok(assignment)
    }
}

/// Per-variable error probabilities.
///
/// The validator requires every value to be in `[0, 0.5)` and at least one to be positive;
/// the map itself does not enforce this.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Probabilities(BTreeMap<Var, f64>);

impl Probabilities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, var: impl Into<Var>, prob: f64) -> Option<f64> {
        self.0.insert(var.into(), prob)
    }

    pub fn get(&self, var: &Var) -> Option<f64> {
        self.0.get(var).copied()
    }

    pub fn contains(&self, var: &Var) -> bool {
        self.0.contains_key(var)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn vars(&self) -> impl Iterator<Item = &Var> + '_ {
        self.0.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.values().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Var, f64)> + '_ {
        self.0.iter().map(|(var, &p)| (var, p))
    }

    /// Returns `true` if every probability is exactly zero (or the map is empty).
    pub fn all_zero(&self) -> bool {
        self.values().all(|p| p == 0.0)
    }

    /// Returns a copy with the probability of `var` set to zero.
    ///
    /// The original map is left untouched.
    pub fn with_zeroed(&self, var: &Var) -> Probabilities {
        let mut result = self.clone();
        result.0.insert(var.clone(), 0.0);
        result
    }
}

impl<V: Into<Var>> FromIterator<(V, f64)> for Probabilities {
    fn from_iter<I: IntoIterator<Item = (V, f64)>>(iter: I) -> Self {
        Probabilities(iter.into_iter().map(|(v, p)| (v.into(), p)).collect())
    }
}

impl fmt::Display for Probabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (var, p)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", var, p)?;
        }
        write!(f, "}}")
    }
}

/// Parses `a=0.1,b=0.25`.
impl FromStr for Probabilities {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut probs = Probabilities::new();
        for (offset, key, value) in split_pairs(s)? {
            let prob: f64 = value
                .parse()
                .map_err(|e| ParseError::new(offset, format!("invalid probability `{}`: {}", value, e)))?;
            if probs.insert(key, prob).is_some() {
                return Err(ParseError::new(offset, format!("duplicate variable `{}`", key)));
            }
        }
        Ok(probs)
    }
}

/// Splits `key=value` pairs separated by commas, keeping the byte offset of each pair.
fn split_pairs(s: &str) -> Result<Vec<(usize, &str, &str)>, ParseError> {
    let mut pairs = Vec::new();
    let mut offset = 0;
    for chunk in s.split(',') {
        let start = offset;
        offset += chunk.len() + 1;
        if chunk.trim().is_empty() {
            continue;
        }
        let (key, value) = chunk
            .split_once('=')
            .ok_or_else(|| ParseError::new(start, format!("expected `name=value`, got `{}`", chunk.trim())))?;
        let (key, value) = (key.trim(), value.trim());
        if key.is_empty() {
            return Err(ParseError::new(start, "missing variable name"));
        }
        pairs.push((start, key, value));
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_var_creation() {
        let a = Var::new("a");
        let b = Var::from("b");
        assert_eq!(a.name(), "a");
        assert_eq!(b.to_string(), "b");
        assert!(a < b);
    }

    #[test]
    fn test_var_parse() {
        assert_eq!("x1".parse::<Var>(), Ok(Var::new("x1")));
        assert_eq!(" y ".parse::<Var>(), Ok(Var::new("y")));
        assert_eq!("".parse::<Var>().unwrap_err().offset, 0);
        assert!("   ".parse::<Var>().is_err());
    }

    #[test]
    #[should_panic(expected = "Variable names must be non-empty")]
    fn test_var_empty_panics() {
        Var::new("");
    }

    #[test]
    fn test_assignment_union() {
        let x: Assignment = [("a", true), ("b", false)].into_iter().collect();
        let y: Assignment = [("b", false), ("c", true)].into_iter().collect();
        let z: Assignment = [("a", false)].into_iter().collect();

        let xy = x.union(&y).unwrap();
        assert_eq!(xy.len(), 3);
        assert_eq!(xy.get(&Var::new("c")), Some(true));

        assert!(x.agrees_with(&y));
        assert!(!x.agrees_with(&z));
        assert_eq!(x.union(&z), None);
    }

    #[test]
    fn test_assignment_parse() {
        let a: Assignment = "a=true, b=0,c=F".parse().unwrap();
        assert_eq!(a.get(&Var::new("a")), Some(true));
        assert_eq!(a.get(&Var::new("b")), Some(false));
        assert_eq!(a.get(&Var::new("c")), Some(false));
        assert_eq!(a.to_string(), "{a=true, b=false, c=false}");

        assert!("".parse::<Assignment>().unwrap().is_empty());
        assert!("a=maybe".parse::<Assignment>().is_err());
        assert!("a=1,a=0".parse::<Assignment>().is_err());

        let err = "a=1,b".parse::<Assignment>().unwrap_err();
        assert_eq!(err.offset, 4);
    }

    #[test]
    fn test_probabilities_parse() {
        let p: Probabilities = "a=0.1,b=0".parse().unwrap();
        assert_eq!(p.get(&Var::new("a")), Some(0.1));
        assert_eq!(p.get(&Var::new("b")), Some(0.0));
        assert!("a=x".parse::<Probabilities>().is_err());
        assert!("=0.1".parse::<Probabilities>().is_err());
    }

    #[test]
    fn test_with_zeroed() {
        let p: Probabilities = [("a", 0.1), ("b", 0.2)].into_iter().collect();
        let q = p.with_zeroed(&Var::new("a"));
        assert_eq!(p.get(&Var::new("a")), Some(0.1));
        assert_eq!(q.get(&Var::new("a")), Some(0.0));
        assert!(!q.all_zero());
        assert!(q.with_zeroed(&Var::new("b")).all_zero());
    }
}
