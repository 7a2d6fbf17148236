//! Property bags passed between stacks
//!
//! A producer stack publishes the identifiers of resources its dependents
//! need; a consumer stack reads specific keys it expects to exist. A missing
//! key is a wiring bug and fails construction immediately.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A scalar value stored in a [`PropertyBag`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    /// String value (the common case: names, ids, tokens)
    Str(String),
    /// Boolean flag
    Bool(bool),
    /// Small integer
    Int(i64),
}

impl PropValue {
    /// Borrow the string value, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{s}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

/// String-keyed scalar values handed from a producer stack to its consumers
///
/// The bag is a value type: the builder methods consume `self` and return a
/// new bag, so a producer extending its input bag can never alias the copy a
/// consumer already holds. Keys are only ever added, never removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyBag {
    values: BTreeMap<String, PropValue>,
}

impl PropertyBag {
    /// Create an empty bag
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key, consuming and returning the bag
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Read a key, failing with [`Error::MissingProp`] when absent
    pub fn get(&self, key: &str) -> Result<&PropValue> {
        self.values
            .get(key)
            .ok_or_else(|| Error::MissingProp(key.to_string()))
    }

    /// Read a key as a string value
    ///
    /// Fails with [`Error::MissingProp`] when the key is absent and
    /// [`Error::PropNotString`] when it holds a non-string scalar.
    pub fn get_str(&self, key: &str) -> Result<&str> {
        self.get(key)?
            .as_str()
            .ok_or_else(|| Error::PropNotString(key.to_string()))
    }

    /// Check whether a key is present
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Iterate over keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Iterate over entries in sorted key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of keys in the bag
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the bag is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_round_trip() {
        let bag = PropertyBag::new()
            .with("vpc-id", "vpc-123")
            .with("multi_az", false)
            .with("port", 3306_i64);

        assert_eq!(bag.get_str("vpc-id").unwrap(), "vpc-123");
        assert_eq!(bag.get("multi_az").unwrap(), &PropValue::Bool(false));
        assert_eq!(bag.get("port").unwrap(), &PropValue::Int(3306));
    }

    #[test]
    fn test_missing_key_fails() {
        let bag = PropertyBag::new().with("present", "yes");
        let err = bag.get("absent").unwrap_err();
        assert!(matches!(err, Error::MissingProp(key) if key == "absent"));
    }

    #[test]
    fn test_non_string_read_as_string_fails() {
        let bag = PropertyBag::new().with("count", 2_i64);
        let err = bag.get_str("count").unwrap_err();
        assert!(matches!(err, Error::PropNotString(key) if key == "count"));
    }

    #[test]
    fn test_extend_preserves_input_keys() {
        // Producer pattern: take the input bag, add identifiers, hand it on.
        let input = PropertyBag::new()
            .with("vpc_name", "tutorial")
            .with("wan_ip", "203.0.113.9");

        let output = input.clone().with("vpc-id", "vpc-456");

        for (key, value) in input.iter() {
            assert_eq!(output.get(key).unwrap(), value);
        }
        assert_eq!(output.len(), input.len() + 1);
    }

    #[test]
    fn test_with_is_a_fresh_value() {
        let producer = PropertyBag::new().with("a", "1");
        let consumer = producer.clone();
        let producer = producer.with("b", "2");

        assert!(producer.contains("b"));
        assert!(!consumer.contains("b"));
    }
}
