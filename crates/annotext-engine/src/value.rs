//! Recursive attribute values and the tree walker used by queries and
//! collection edits.
//!
//! Attribute paths are slices of key segments relative to an annotation's
//! attribute mapping, so `"attributes.link.href"` arrives here as
//! `["link", "href"]`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{DocumentError, Result};

/// Nested attribute mapping carried by every annotation.
pub type Attributes = BTreeMap<String, Value>;

/// A single attribute value.
///
/// Integers and floats are kept apart so `1` reads back as `1`, not `1.0`.
/// `Integer` must stay ahead of `Float` for untagged deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(Attributes),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Any number, widening integers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Attributes> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl From<Attributes> for Value {
    fn from(value: Attributes) -> Self {
        Value::Map(value)
    }
}

/// Splits a dot-delimited path into its segments.
pub(crate) fn split_path(path: &str) -> Result<Vec<&str>> {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(DocumentError::InvalidPath(path.to_string()));
    }
    Ok(segments)
}

/// Partial structural match: every key in `pattern` must be present in
/// `candidate` with an equal value. Nested mappings match recursively;
/// lists and scalars compare by equality.
pub fn matches_partial(pattern: &Attributes, candidate: &Attributes) -> bool {
    pattern
        .iter()
        .all(|(key, expected)| match (expected, candidate.get(key)) {
            (Value::Map(expected), Some(Value::Map(actual))) => matches_partial(expected, actual),
            (expected, Some(actual)) => expected == actual,
            (_, None) => false,
        })
}

/// Merges `patch` into `target`. Keys only in `target` survive; mappings
/// present on both sides are merged recursively; anything else is
/// overwritten by the patch.
pub fn deep_merge(target: &mut Attributes, patch: &Attributes) {
    for (key, value) in patch {
        if let Some(Value::Map(existing)) = target.get_mut(key)
            && let Value::Map(incoming) = value
        {
            deep_merge(existing, incoming);
            continue;
        }
        target.insert(key.clone(), value.clone());
    }
}

pub fn get_path<'a>(attributes: &'a Attributes, path: &[&str]) -> Option<&'a Value> {
    let (last, parents) = path.split_last()?;
    let mut current = attributes;
    for segment in parents {
        match current.get(*segment)? {
            Value::Map(map) => current = map,
            _ => return None,
        }
    }
    current.get(*last)
}

fn parent_mut<'a>(attributes: &'a mut Attributes, parents: &[&str]) -> Option<&'a mut Attributes> {
    let mut current = attributes;
    for segment in parents {
        match current.get_mut(*segment)? {
            Value::Map(map) => current = map,
            _ => return None,
        }
    }
    Some(current)
}

/// Removes the value at `path`, returning it. Missing paths return `None`.
pub fn remove_path(attributes: &mut Attributes, path: &[&str]) -> Option<Value> {
    let (last, parents) = path.split_last()?;
    parent_mut(attributes, parents)?.remove(*last)
}

/// Moves values between keys. Every source is lifted out before any
/// destination is written, so renames never observe each other's results.
pub(crate) fn rename_keys(attributes: &mut Attributes, renames: &[(Vec<String>, String)]) {
    let mut lifted = Vec::new();
    for (path, new_name) in renames {
        let segments: Vec<&str> = path.iter().map(String::as_str).collect();
        if let Some(value) = remove_path(attributes, &segments) {
            lifted.push((&path[..path.len() - 1], new_name, value));
        }
    }

    for (parents, new_name, value) in lifted {
        let parents: Vec<&str> = parents.iter().map(String::as_str).collect();
        if let Some(parent) = parent_mut(attributes, &parents) {
            parent.insert(new_name.clone(), value);
        }
    }
}
