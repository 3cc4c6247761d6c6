//! Extended attributes
//!
//! Extended attributes (`[Name]`, `[Name=Value]`, `[Constructor(...)]`) are the
//! declarative traits that steer code generation. Most carry nothing or a
//! string; a handful carry argument lists, which is why the value is a tagged
//! [`ExtAttrValue`] rather than a string.

use crate::ir::IdlArgument;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Signature of a `[NamedConstructor=Name(...)]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallSignature {
    pub name: String,
    pub arguments: Vec<IdlArgument>,
}

/// Value carried by an extended attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ExtAttrValue {
    /// Bare `[Name]`
    Flag,
    /// `[Name=Value]`
    Value(String),
    /// Accumulated `[Constructor(...)]` / `[CustomConstructor(...)]` signatures
    Overloads(Vec<Vec<IdlArgument>>),
    /// `[NamedConstructor=Name(...)]` before it is turned into an operation
    Call(CallSignature),
    /// `[SetWrapperReferenceTo(...)]`
    Arguments(Vec<IdlArgument>),
}

impl ExtAttrValue {
    /// String value, if any
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ExtAttrValue::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_flag(&self) -> bool {
        matches!(self, ExtAttrValue::Flag)
    }
}

/// Ordered map of extended attribute name -> value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtendedAttributes {
    entries: IndexMap<String, ExtAttrValue>,
}

impl ExtendedAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion of a bare flag
    pub fn with_flag(mut self, name: impl Into<String>) -> Self {
        self.insert(name, ExtAttrValue::Flag);
        self
    }

    /// Builder-style insertion of a string value
    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, ExtAttrValue::Value(value.into()));
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: ExtAttrValue) -> Option<ExtAttrValue> {
        self.entries.insert(name.into(), value)
    }

    /// Remove a key, keeping the order of the rest
    pub fn remove(&mut self, name: &str) -> Option<ExtAttrValue> {
        self.entries.shift_remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&ExtAttrValue> {
        self.entries.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ExtAttrValue> {
        self.entries.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// String value of `name`, if present and not a bare flag
    pub fn value(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ExtAttrValue::as_str)
    }

    /// Values of `name` split on `|` and `&`
    ///
    /// A bare flag yields an empty list.
    pub fn values(&self, name: &str) -> Vec<&str> {
        self.value(name)
            .map(|v| v.split(&['|', '&'][..]).map(str::trim).filter(|s| !s.is_empty()).collect())
            .unwrap_or_default()
    }

    /// Whether `name` is present and one of its split values is `value`
    pub fn has_value(&self, name: &str, value: &str) -> bool {
        self.values(name).contains(&value)
    }

    /// Whether the string value of `name` is exactly `value`
    pub fn value_is(&self, name: &str, value: &str) -> bool {
        self.value(name) == Some(value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ExtAttrValue)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, ExtAttrValue)> for ExtendedAttributes {
    fn from_iter<T: IntoIterator<Item = (String, ExtAttrValue)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
