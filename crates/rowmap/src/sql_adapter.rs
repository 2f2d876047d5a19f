//! Concrete [`Adapter`] over SQL backends.
//!
//! Translates the adapter contract into parameterized statements, executes
//! them through an injected [`Driver`] handle (or a factory producing one,
//! re-resolved per call for pool-style indirection), and resolves
//! auto-generated primary keys per dialect. Driver failures propagate
//! unmodified; this layer never interprets SQL error codes.

use crate::adapter::{Adapter, Schemata};
use crate::condition::{Cond, FindOptions};
use crate::dialect::AutoId;
use crate::driver::Driver;
use crate::error::{MapError, MapResult};
use crate::sql;
use crate::value::{Row, Value};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Where the adapter gets its driver handle from.
pub enum DriverSource<D> {
    /// A fixed handle shared for the adapter's lifetime.
    Handle(Arc<D>),
    /// A factory invoked per call (e.g. to check a handle out of a pool).
    Factory(Box<dyn Fn() -> Arc<D> + Send + Sync>),
}

/// SQL-backed adapter delegating execution to an injected driver.
pub struct SqlAdapter<D> {
    source: Option<DriverSource<D>>,
    // Lazily populated on first schemata() call, immutable afterwards.
    // Schema is assumed static for a process lifetime.
    schema_cache: Mutex<Option<Arc<Schemata>>>,
}

impl<D: Driver> SqlAdapter<D> {
    /// Create an adapter owning its driver handle.
    pub fn new(driver: D) -> Self {
        Self::from_handle(Arc::new(driver))
    }

    /// Create an adapter from a shared driver handle.
    pub fn from_handle(driver: Arc<D>) -> Self {
        Self {
            source: Some(DriverSource::Handle(driver)),
            schema_cache: Mutex::new(None),
        }
    }

    /// Create an adapter that resolves a fresh handle from `factory` on
    /// every call.
    pub fn from_factory(factory: impl Fn() -> Arc<D> + Send + Sync + 'static) -> Self {
        Self {
            source: Some(DriverSource::Factory(Box::new(factory))),
            schema_cache: Mutex::new(None),
        }
    }

    /// Create an adapter without a driver. Every capability fails with a
    /// configuration error until a driver exists; useful for wiring checks.
    pub fn unconfigured() -> Self {
        Self {
            source: None,
            schema_cache: Mutex::new(None),
        }
    }

    fn driver(&self) -> MapResult<Arc<D>> {
        match &self.source {
            None => Err(MapError::configuration("driver not set")),
            Some(DriverSource::Handle(handle)) => Ok(handle.clone()),
            Some(DriverSource::Factory(factory)) => Ok(factory()),
        }
    }

    async fn load_schemata(&self, driver: &D) -> MapResult<Arc<Schemata>> {
        if let Some(cached) = self.schema_cache.lock().unwrap().clone() {
            return Ok(cached);
        }
        let loaded = Arc::new(driver.schemata().await?);
        let mut guard = self.schema_cache.lock().unwrap();
        Ok(guard.get_or_insert_with(|| loaded).clone())
    }

    /// Resolve the auto-generated id for the row just inserted into
    /// `table`, per the dialect's strategy. `Ok(None)` means the dialect
    /// has no mechanism (caller-supplied ids required).
    async fn generated_id(&self, driver: &D, table: &str) -> MapResult<Option<Value>> {
        match driver.dialect().auto_id(table) {
            AutoId::InsertId => Ok(driver.last_insert_id().map(Value::Int)),
            AutoId::Sequence(seq) => {
                let mut q = sql::sql("SELECT currval(");
                q.push_bind(seq).push(")");
                let text = q.to_sql(driver.dialect());
                let rows = driver.query(&text, q.params()).await?;
                Ok(rows
                    .into_iter()
                    .next()
                    .and_then(|row| row.values().next().cloned()))
            }
            AutoId::LastRowId => Ok(driver.last_row_id().map(Value::Int)),
            AutoId::None => Ok(None),
        }
    }
}

impl<D: Driver> Adapter for SqlAdapter<D> {
    async fn create(&self, table: &str, mut row: Row) -> MapResult<Row> {
        let driver = self.driver()?;
        let stmt = sql::insert(table, &row)?;
        let text = stmt.to_sql(driver.dialect());
        debug!(sql = %text, binds = stmt.params().len(), "create");
        driver.execute(&text, stmt.params()).await?;

        // Auto-populate a single-column primary key the caller left unset.
        let schemata = self.load_schemata(&driver).await?;
        if let Some(schema) = schemata.get(table)
            && let [pk] = schema.primary_keys.as_slice()
            && row.get(pk).is_none_or(Value::is_null)
            && let Some(id) = self.generated_id(&driver, table).await?
        {
            row.insert(pk.clone(), id);
        }
        Ok(row)
    }

    async fn find(&self, table: &str, cond: &Cond, options: &FindOptions) -> MapResult<Option<Row>> {
        let driver = self.driver()?;
        let stmt = sql::select(table, cond, options)?;
        let text = stmt.to_sql(driver.dialect());
        debug!(sql = %text, binds = stmt.params().len(), "find");
        let rows = driver.query(&text, stmt.params()).await?;
        Ok(rows.into_iter().next())
    }

    async fn search(&self, table: &str, cond: &Cond, options: &FindOptions) -> MapResult<Vec<Row>> {
        let driver = self.driver()?;
        let stmt = sql::select(table, cond, options)?;
        let text = stmt.to_sql(driver.dialect());
        debug!(sql = %text, binds = stmt.params().len(), "search");
        driver.query(&text, stmt.params()).await
    }

    async fn update(&self, table: &str, set: &Row, cond: &Cond) -> MapResult<u64> {
        let driver = self.driver()?;
        let stmt = sql::update(table, set, cond)?;
        let text = stmt.to_sql(driver.dialect());
        debug!(sql = %text, binds = stmt.params().len(), "update");
        let affected = driver.execute(&text, stmt.params()).await?;
        debug!(affected, "update done");
        Ok(affected)
    }

    async fn delete(&self, table: &str, cond: &Cond) -> MapResult<u64> {
        let driver = self.driver()?;
        let stmt = sql::delete(table, cond)?;
        let text = stmt.to_sql(driver.dialect());
        debug!(sql = %text, binds = stmt.params().len(), "delete");
        let affected = driver.execute(&text, stmt.params()).await?;
        debug!(affected, "delete done");
        Ok(affected)
    }

    async fn schemata(&self) -> MapResult<Arc<Schemata>> {
        let driver = self.driver()?;
        self.load_schemata(&driver).await
    }
}
