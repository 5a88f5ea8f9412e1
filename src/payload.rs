//! Provider payload values.
//!
//! Outgoing API payloads are built as a JSON-like tree that, unlike
//! `serde_json::Value`, can carry deferred localized text ([`Text`]) and
//! raw attachment bytes. Deferred leaves are forced with the `resolve_*`
//! helpers, payload overrides are folded in with [`update_deep`], and the
//! finished tree is converted to JSON at the provider boundary with
//! [`Value::into_json`].

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use base64::Engine;
use chrono::{DateTime, Utc};

use crate::dates::rfc2822date;
use crate::i18n::{lang, Lang, Text};

/// Key-value container used for payload objects.
pub type Map = BTreeMap<String, Value>;

/// A payload value: the JSON data model plus deferred text and bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// JSON null.
    Null,
    /// Boolean.
    Bool(bool),
    /// Integer or float.
    Number(serde_json::Number),
    /// Concrete string.
    String(String),
    /// Raw bytes (attachment content); base64-encoded at the JSON boundary.
    Bytes(Vec<u8>),
    /// Possibly-deferred localized text.
    Text(Text),
    /// Ordered sequence.
    Array(Vec<Value>),
    /// Nested mapping.
    Object(Map),
}

impl Value {
    /// Convert into JSON for a provider API body, resolving every deferred
    /// leaf at any depth against the process-wide current language.
    ///
    /// `Bytes` become standard-base64 strings.
    pub fn into_json(self) -> serde_json::Value {
        self.into_json_with(lang())
    }

    /// Like [`Value::into_json`], with an explicit language.
    pub fn into_json_with(self, lang: Lang) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(b),
            Self::Number(n) => serde_json::Value::Number(n),
            Self::String(s) => serde_json::Value::String(s),
            Self::Bytes(bytes) => serde_json::Value::String(
                base64::engine::general_purpose::STANDARD.encode(bytes),
            ),
            Self::Text(text) => serde_json::Value::String(text.resolve_with(lang)),
            Self::Array(items) => serde_json::Value::Array(
                items.into_iter().map(|v| v.into_json_with(lang)).collect(),
            ),
            Self::Object(map) => serde_json::Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, v.into_json_with(lang)))
                    .collect(),
            ),
        }
    }
}

/// Force a single value against the current language.
///
/// A deferred [`Text`] leaf becomes a concrete `String`; every other value
/// is returned unchanged, containers included. This is the identity on
/// already-concrete values and never recurses.
pub fn resolve_value(value: Value) -> Value {
    resolve_value_with(value, lang())
}

/// Like [`resolve_value`], with an explicit language.
pub fn resolve_value_with(value: Value, lang: Lang) -> Value {
    match value {
        Value::Text(text) => Value::String(text.resolve_with(lang)),
        other => other,
    }
}

/// Force every value of a mapping, recursing into nested mappings.
///
/// Sequences are left alone: a deferred leaf inside an array survives until
/// the [`Value::into_json`] boundary.
pub fn resolve_map(map: Map) -> Map {
    resolve_map_with(map, lang())
}

/// Like [`resolve_map`], with an explicit language.
pub fn resolve_map_with(map: Map, lang: Lang) -> Map {
    map.into_iter()
        .map(|(key, value)| {
            let value = match value {
                Value::Object(nested) => Value::Object(resolve_map_with(nested, lang)),
                other => resolve_value_with(other, lang),
            };
            (key, value)
        })
        .collect()
}

/// Force every element of a sequence, without recursing into nested
/// sequences or mappings.
pub fn resolve_list(list: Vec<Value>) -> Vec<Value> {
    resolve_list_with(list, lang())
}

/// Like [`resolve_list`], with an explicit language.
pub fn resolve_list_with(list: Vec<Value>, lang: Lang) -> Vec<Value> {
    list.into_iter()
        .map(|value| resolve_value_with(value, lang))
        .collect()
}

/// Merge `source` into `target` in place.
///
/// For each key in `source`: when both sides hold a mapping, the nested
/// mappings are merged recursively; any other pairing overwrites the target
/// entry wholesale (sequences and scalars are never merged element-wise).
///
/// `source` is any mapping-like sequence of pairs: a [`Map`], a `HashMap`,
/// a `Vec` of tuples, or anything else that iterates as `(String, Value)`.
pub fn update_deep(target: &mut Map, source: impl IntoIterator<Item = (String, Value)>) {
    for (key, value) in source {
        match (target.entry(key), value) {
            (Entry::Occupied(mut entry), Value::Object(incoming)) => match entry.get_mut() {
                Value::Object(existing) => update_deep(existing, incoming),
                other => *other = Value::Object(incoming),
            },
            (Entry::Occupied(mut entry), value) => {
                entry.insert(value);
            }
            (Entry::Vacant(entry), value) => {
                entry.insert(value);
            }
        }
    }
}

// ── Conversions ─────────────────────────────────────────────────

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<f64> for Value {
    /// Non-finite floats have no JSON representation and map to `Null`.
    fn from(n: f64) -> Self {
        serde_json::Number::from_f64(n).map_or(Self::Null, Self::Number)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Text> for Value {
    fn from(text: Text) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::Array(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Self::Object(map)
    }
}

impl From<DateTime<Utc>> for Value {
    /// Dates render as RFC 2822 strings, the form mail headers use.
    fn from(dt: DateTime<Utc>) -> Self {
        Self::String(rfc2822date(&dt))
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Self::Object(
                map.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            ),
        }
    }
}

impl From<toml::Value> for Value {
    fn from(value: toml::Value) -> Self {
        match value {
            toml::Value::String(s) => Self::String(s),
            toml::Value::Integer(n) => Self::Number(n.into()),
            toml::Value::Float(n) => Self::from(n),
            toml::Value::Boolean(b) => Self::Bool(b),
            toml::Value::Datetime(dt) => Self::String(dt.to_string()),
            toml::Value::Array(items) => {
                Self::Array(items.into_iter().map(Value::from).collect())
            }
            toml::Value::Table(table) => Self::Object(
                table.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            ),
        }
    }
}
