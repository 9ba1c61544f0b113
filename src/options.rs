//! Ordered option sets.
//!
//! Every ShrinkTheWeb option is a `stw`-prefixed key with a string or integer
//! value. Options are kept in an explicit list of pairs rather than a hash map
//! because the rendered query string must come out in a reproducible order:
//! the order in which keys were first inserted.
//!
//! ## Merge Semantics
//!
//! An option set is built in layers (settings defaults, then instance
//! defaults, then tag keywords). When a later layer repeats a key, the key
//! keeps its original position and takes the new value:
//!
//! ```text
//! defaults:  stwaccesskeyid=key  stwembed=0
//! keywords:  stwsize=lrg         stwembed=1
//! merged:    stwaccesskeyid=key  stwembed=1  stwsize=lrg
//! ```

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Prefix carried by every option key the remote service understands.
pub const KEY_PREFIX: &str = "stw";

/// Credential identifying the caller to the remote service.
pub const ACCESS_KEY: &str = "stwaccesskeyid";
pub const SIZE: &str = "stwsize";
pub const LANG: &str = "stwlang";
pub const EMBED: &str = "stwembed";
pub const FULL: &str = "stwfull";
pub const X_MAX: &str = "stwxmax";
pub const Y_MAX: &str = "stwymax";
pub const URL: &str = "stwurl";

/// A single option value: a string or a small integer.
///
/// Integers print as their decimal form, never quoted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Int(i64),
    Str(String),
}

impl OptionValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, OptionValue::Str(s) if s.is_empty())
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Int(n) => write!(f, "{n}"),
            OptionValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Str(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Str(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Int(value)
    }
}

/// Insertion-ordered option mapping with unique keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionSet {
    entries: Vec<(String, OptionValue)>,
}

impl OptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace. A replaced key keeps its original position.
    ///
    /// Returns the previous value when the key was already present.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<OptionValue>,
    ) -> Option<OptionValue> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Layer `overlay` on top of `self`, overlay values winning.
    pub fn extend_from(&mut self, overlay: &OptionSet) {
        for (key, value) in overlay.iter() {
            if let Some(previous) = self.insert(key, value.clone()) {
                tracing::trace!(key, %previous, replacement = %value, "option overridden");
            }
        }
    }

    /// Iterate over options whose keys are not in `excluded`, in order.
    pub fn without<'a>(
        &'a self,
        excluded: &'a [&'a str],
    ) -> impl Iterator<Item = (&'a str, &'a OptionValue)> + 'a {
        self.iter().filter(move |(k, _)| !excluded.contains(k))
    }

    /// Merge the three layers of a tag's options.
    ///
    /// Later layers win: settings `defaults` < `instance_defaults` <
    /// `overrides`.
    pub fn merged(
        defaults: &OptionSet,
        instance_defaults: &OptionSet,
        overrides: &OptionSet,
    ) -> OptionSet {
        let mut merged = defaults.clone();
        merged.extend_from(instance_defaults);
        merged.extend_from(overrides);
        merged
    }
}

impl<K: Into<String>, V: Into<OptionValue>> FromIterator<(K, V)> for OptionSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = OptionSet::new();
        for (key, value) in iter {
            set.insert(key, value);
        }
        set
    }
}

impl Serialize for OptionSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for OptionSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OptionSetVisitor;

        impl<'de> Visitor<'de> for OptionSetVisitor {
            type Value = OptionSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a table of string or integer options")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<OptionSet, A::Error> {
                let mut set = OptionSet::new();
                while let Some((key, value)) = access.next_entry::<String, OptionValue>()? {
                    set.insert(key, value);
                }
                Ok(set)
            }
        }

        deserializer.deserialize_map(OptionSetVisitor)
    }
}
