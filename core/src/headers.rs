//! Single-valued header mapping.
//!
//! Names are stored in canonical MIME form (`content-type` becomes
//! `Content-Type`), so lookups are case-insensitive and case variants of the
//! same name share one slot. Iteration order is unspecified; use
//! [`Headers::sorted`] when a stable order matters.

use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: HashMap<String, String>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `name`, replacing any previous value.
    pub fn set(&mut self, name: &str, value: &str) {
        self.entries.insert(canonical_name(name), value.to_string());
    }

    /// Store `value` under `name` only if the name has no value yet.
    pub fn insert_first(&mut self, name: &str, value: &str) {
        self.entries
            .entry(canonical_name(name))
            .or_insert_with(|| value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(&canonical_name(name)).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries ordered by name.
    pub fn sorted(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

/// Canonical form of a header name: the first letter and every letter after
/// a hyphen upper-cased, everything else lower-cased. Names that are not
/// valid HTTP tokens are returned unchanged.
pub fn canonical_name(name: &str) -> String {
    if name.is_empty() || !name.bytes().all(is_token_byte) {
        return name.to_string();
    }
    let mut upper = true;
    name.chars()
        .map(|c| {
            let out = if upper {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            };
            upper = c == '-';
            out
        })
        .collect()
}

fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}
