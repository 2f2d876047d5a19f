//! Dirty-tracking records.
//!
//! A [`Data`] is one persisted entity: a named-field mapping plus the set of
//! field names written since the last clean state. The dirty set is what the
//! mapper turns into partial UPDATE statements, so a write is recorded as a
//! change even when the new value equals the old one — recording happens on
//! invocation, not on diff.

use crate::error::{MapError, MapResult};
use crate::value::{Row, Value};
use std::collections::{BTreeMap, BTreeSet};

/// A mutable record with dirty-field tracking.
///
/// Lifecycle: `Clean → set → Dirty → (successful update | discard_changes) → Clean`.
/// A failed update leaves the record dirty so the caller can retry.
#[derive(Debug, Clone)]
pub struct Data {
    table: String,
    fields: BTreeMap<String, Value>,
    dirty: BTreeSet<String>,
}

impl Data {
    /// Create an empty, clean record bound to a collection.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            fields: BTreeMap::new(),
            dirty: BTreeSet::new(),
        }
    }

    /// Create a clean record from a loaded row. Loading is not a change.
    pub fn from_row(table: impl Into<String>, row: Row) -> Self {
        Self {
            table: table.into(),
            fields: row.into_iter().collect(),
            dirty: BTreeSet::new(),
        }
    }

    /// The collection this record belongs to.
    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Set a field and record it as changed, regardless of whether the value
    /// differs from the current one.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let name = name.into();
        self.dirty.insert(name.clone());
        self.fields.insert(name, value.into());
        self
    }

    /// Set fields from a flat name/value list: `[name, value, name, value, ..]`.
    ///
    /// Fails with an argument error on an odd-length list or when a name
    /// position does not hold a text value.
    pub fn set_pairs(&mut self, pairs: &[Value]) -> MapResult<&mut Self> {
        if pairs.len() % 2 != 0 {
            return Err(MapError::argument(format!(
                "set_pairs: odd-length name/value list ({} items)",
                pairs.len()
            )));
        }
        for pair in pairs.chunks_exact(2) {
            let Value::Text(name) = &pair[0] else {
                return Err(MapError::argument(format!(
                    "set_pairs: field name must be text, got {}",
                    pair[0].kind()
                )));
            };
            self.set(name.clone(), pair[1].clone());
        }
        Ok(self)
    }

    /// All known field names, in deterministic (sorted) order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// True iff any field was written since the last clean state.
    pub fn is_changed(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Snapshot of the dirty field names, in deterministic (sorted) order.
    pub fn changed_keys(&self) -> Vec<&str> {
        self.dirty.iter().map(String::as_str).collect()
    }

    /// Current values of the dirty fields only.
    pub fn changes(&self) -> Row {
        self.dirty
            .iter()
            .filter_map(|k| self.fields.get(k).map(|v| (k.clone(), v.clone())))
            .collect()
    }

    /// Clear the dirty set without touching field values. Called by the
    /// mapper after a successful persistence round trip.
    pub fn discard_changes(&mut self) {
        self.dirty.clear();
    }

    /// Current field values as a row.
    pub fn row(&self) -> Row {
        self.fields
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Consume the record, yielding its field values.
    pub fn into_row(self) -> Row {
        self.fields.into_iter().collect()
    }
}

/// Structural equality: same collection and same field mapping. The dirty
/// set is deliberately not part of equality.
impl PartialEq for Data {
    fn eq(&self, other: &Self) -> bool {
        self.table == other.table && self.fields == other.fields
    }
}
