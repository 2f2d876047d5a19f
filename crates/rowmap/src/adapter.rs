//! The storage-access contract between the mapper and concrete backends.
//!
//! Every capability has a default body that fails with
//! [`MapError::Unsupported`] naming the capability — the explicit contract a
//! concrete adapter overrides. This keeps partial adapters honest: calling a
//! capability the backend never implemented is an integration bug surfaced
//! as a typed error, not a panic.

use crate::condition::{Cond, FindOptions};
use crate::error::{MapError, MapResult};
use crate::value::Row;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Schema metadata for one table: its primary-key columns, in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableSchema {
    pub primary_keys: Vec<String>,
}

impl TableSchema {
    pub fn new(primary_keys: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            primary_keys: primary_keys.into_iter().map(Into::into).collect(),
        }
    }
}

/// Schema metadata for all known tables.
pub type Schemata = BTreeMap<String, TableSchema>;

/// Storage-access capability set over named collections.
///
/// All methods take `&self`; an adapter instance performs one synchronous
/// round trip per call and holds no per-call state.
pub trait Adapter: Send + Sync {
    /// Persist a new row and return it as stored.
    ///
    /// When the collection has exactly one primary-key column and the caller
    /// did not supply a value for it, the adapter populates it from the
    /// backend-generated id. Composite keys are never auto-populated.
    fn create(&self, table: &str, row: Row) -> impl Future<Output = MapResult<Row>> + Send {
        let _ = (table, row);
        async { Err(MapError::Unsupported("create")) }
    }

    /// Return the first row matching `cond` under the options' ordering, or
    /// `None` when nothing matches.
    fn find(
        &self,
        table: &str,
        cond: &Cond,
        options: &FindOptions,
    ) -> impl Future<Output = MapResult<Option<Row>>> + Send {
        let _ = (table, cond, options);
        async { Err(MapError::Unsupported("find")) }
    }

    /// Return all rows matching `cond`, honoring the options' ordering.
    fn search(
        &self,
        table: &str,
        cond: &Cond,
        options: &FindOptions,
    ) -> impl Future<Output = MapResult<Vec<Row>>> + Send {
        let _ = (table, cond, options);
        async { Err(MapError::Unsupported("search")) }
    }

    /// Apply `set` to all rows matching `cond`; returns the affected-row count.
    fn update(
        &self,
        table: &str,
        set: &Row,
        cond: &Cond,
    ) -> impl Future<Output = MapResult<u64>> + Send {
        let _ = (table, set, cond);
        async { Err(MapError::Unsupported("update")) }
    }

    /// Delete all rows matching `cond`; returns the affected-row count.
    fn delete(&self, table: &str, cond: &Cond) -> impl Future<Output = MapResult<u64>> + Send {
        let _ = (table, cond);
        async { Err(MapError::Unsupported("delete")) }
    }

    /// Primary-key metadata per table, used by the mapper to build
    /// where-clauses. Implementations may cache; the result is assumed
    /// static for the adapter's lifetime.
    fn schemata(&self) -> impl Future<Output = MapResult<Arc<Schemata>>> + Send {
        async { Err(MapError::Unsupported("schemata")) }
    }
}
