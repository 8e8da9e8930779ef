//! Message Resolution
//!
//! Turns the `message-spec` attribute into a lookup table and picks the
//! message for a validity outcome.
//!
//! A spec is either a JSON object mapping flag names to messages or plain
//! text used for every failure. Object keys may be written in camelCase,
//! kebab-case or snake_case, in any letter case: `valueMissing`,
//! `value-missing` and `VALUE_MISSING` all name the same entry.

use std::collections::HashMap;
use std::sync::Arc;

use autocheck_dom::ValidityFlag;
use serde_json::Value;

/// Key of the catch-all message
pub const CATCH_ALL: &str = "all";

/// Normalize a flag name for lookup: separators dropped, lowercased.
pub fn canonical_key(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Canonical key -> message text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageTable {
    entries: HashMap<String, String>,
}

impl MessageTable {
    /// Parse a message spec. Anything that is not a JSON object becomes a
    /// single catch-all message holding the raw text.
    pub fn parse(spec: &str) -> Self {
        let map = match serde_json::from_str::<Value>(spec) {
            Ok(Value::Object(map)) => map,
            _ => return Self::flat(spec),
        };

        let mut entries = HashMap::with_capacity(map.len() + 1);
        for (key, value) in map {
            let text = match value {
                Value::String(text) => text,
                Value::Null => continue,
                other => other.to_string(),
            };
            entries.insert(canonical_key(&key), text);
        }
        entries.entry(CATCH_ALL.to_string()).or_default();

        Self { entries }
    }

    /// A table with only a catch-all message
    pub fn flat(message: &str) -> Self {
        let mut entries = HashMap::with_capacity(1);
        entries.insert(CATCH_ALL.to_string(), message.to_string());
        Self { entries }
    }

    /// Exact entry for `key`, in any naming style
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(&canonical_key(key)).map(String::as_str)
    }

    /// Message for a flag name, falling back to the catch-all entry.
    ///
    /// `None` as the flag name looks up the catch-all directly. An empty
    /// string is returned as is; callers decide whether it means "no message".
    pub fn lookup(&self, flag_name: Option<&str>) -> Option<&str> {
        flag_name
            .and_then(|name| self.get(name))
            .or_else(|| self.entries.get(CATCH_ALL).map(String::as_str))
    }

    /// Message for the first failing flag of a validity state
    pub fn message_for(&self, flag: Option<ValidityFlag>) -> Option<&str> {
        self.lookup(flag.map(|flag| flag.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolve a message straight from a raw spec, without caching.
///
/// An absent spec resolves to `None`.
pub fn resolve(message_spec: Option<&str>, flag_name: Option<&str>) -> Option<String> {
    let spec = message_spec?;
    MessageTable::parse(spec)
        .lookup(flag_name)
        .map(str::to_string)
}

/// Per-element cache of the parsed table for the current spec
#[derive(Debug, Default)]
pub struct MessageCache {
    raw: Option<String>,
    table: Option<Arc<MessageTable>>,
}

impl MessageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table for `spec`, parsed at most once per distinct value
    pub fn table(&mut self, spec: &str) -> Arc<MessageTable> {
        if let (Some(raw), Some(table)) = (&self.raw, &self.table) {
            if raw == spec {
                tracing::trace!("message table cache hit");
                return Arc::clone(table);
            }
        }

        let table = Arc::new(MessageTable::parse(spec));
        tracing::debug!(entries = table.len(), "parsed message spec");
        self.raw = Some(spec.to_string());
        self.table = Some(Arc::clone(&table));
        table
    }

    /// Resolve through the cache
    pub fn resolve(&mut self, spec: Option<&str>, flag: Option<ValidityFlag>) -> Option<String> {
        let spec = spec?;
        self.table(spec).message_for(flag).map(str::to_string)
    }

    /// Drop the cached table
    pub fn invalidate(&mut self) {
        self.raw = None;
        self.table = None;
    }

    pub fn is_cached(&self) -> bool {
        self.table.is_some()
    }
}
