//! The execution interface consumed by the SQL adapter.
//!
//! A driver wraps one logical connection: it executes parameterized
//! statements, reports the active dialect, and exposes whatever
//! last-inserted-key hooks the backend provides. Driver failures travel
//! through the adapter as [`crate::MapError::Driver`] without being
//! reinterpreted.

use crate::adapter::Schemata;
use crate::dialect::Dialect;
use crate::error::MapResult;
use crate::value::{Row, Value};

/// A prepared-and-execute driver handle with positional bind parameters.
///
/// The handle is not required to be safe for concurrent use; callers sharing
/// one across tasks must serialize access externally.
pub trait Driver: Send + Sync {
    /// The dialect this connection speaks.
    fn dialect(&self) -> Dialect;

    /// Execute a statement and return all result rows.
    fn query(&self, sql: &str, params: &[Value]) -> impl Future<Output = MapResult<Vec<Row>>> + Send;

    /// Execute a statement and return the affected-row count.
    fn execute(&self, sql: &str, params: &[Value]) -> impl Future<Output = MapResult<u64>> + Send;

    /// Connection-local last-insert id, where the backend tracks one (MySQL).
    fn last_insert_id(&self) -> Option<i64> {
        None
    }

    /// Driver-level last-row-id function, where the backend has one (SQLite).
    fn last_row_id(&self) -> Option<i64> {
        None
    }

    /// Catalog introspection: primary-key column names per table.
    fn schemata(&self) -> impl Future<Output = MapResult<Schemata>> + Send;
}
