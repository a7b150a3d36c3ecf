//! Form Encoding
//!
//! `application/x-www-form-urlencoded` bodies with a deterministic field order.

use std::collections::BTreeMap;

/// Form body whose fields are always emitted in lexicographic key order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormBody {
    fields: BTreeMap<String, String>,
}

impl FormBody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a field.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Encode; spaces become `%20`.
    pub fn encode(&self) -> String {
        self.fields
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormBody {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut body = Self::new();
        for (k, v) in iter {
            body.insert(k, v);
        }
        body
    }
}
