//! Orchestration between typed records and the adapter contract.
//!
//! The mapper wraps raw rows into [`Data`] records via a per-collection
//! factory registry, and unwraps dirty records into the `{set, where}`
//! parameters that drive partial UPDATEs and keyed DELETEs. Registration is
//! explicit: resolving an unregistered collection is a lookup error, never a
//! silent fallback to a generic record type.

use crate::adapter::Adapter;
use crate::condition::{Cond, FindOptions};
use crate::data::Data;
use crate::error::{MapError, MapResult};
use crate::value::Row;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Constructs a collection's record type from a stored row.
pub type DataFactory = Arc<dyn Fn(Row) -> Data + Send + Sync>;

/// The change-application parameters for one record: dirty columns to set
/// and the primary-key equality conditions selecting the row. Computed
/// fresh per update/delete call, never cached on the record.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedParams {
    pub set: Row,
    pub where_clause: Cond,
}

/// Converts between stored rows and [`Data`] records, delegating storage
/// access to an [`Adapter`].
pub struct Mapper<A> {
    adapter: A,
    registry: BTreeMap<String, DataFactory>,
}

impl<A: Adapter> Mapper<A> {
    pub fn new(adapter: A) -> Self {
        Self {
            adapter,
            registry: BTreeMap::new(),
        }
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Register a record factory for a collection.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: impl Fn(Row) -> Data + Send + Sync + 'static,
    ) -> &mut Self {
        self.registry.insert(name.into(), Arc::new(factory));
        self
    }

    /// Register the plain [`Data`] factory for a collection.
    pub fn register_collection(&mut self, name: impl Into<String>) -> &mut Self {
        let name = name.into();
        let table = name.clone();
        self.register(name, move |row| Data::from_row(table.clone(), row))
    }

    /// Resolve the registered factory for a collection. Resolution is
    /// deterministic; repeated calls yield the same factory.
    pub fn data_factory(&self, name: &str) -> MapResult<&DataFactory> {
        self.registry.get(name).ok_or_else(|| {
            MapError::lookup(format!("no data type registered for collection '{name}'"))
        })
    }

    /// Wrap a stored row into the collection's record type.
    pub fn map_data(&self, name: &str, row: Row) -> MapResult<Data> {
        Ok(self.data_factory(name)?(row))
    }

    /// Wrap a structured input into the collection's record type. The input
    /// must serialize to a plain mapping; anything else is rejected at the
    /// boundary.
    pub fn map_serialized<T: Serialize>(&self, name: &str, source: &T) -> MapResult<Data> {
        let row = Row::from_serialize(source)?;
        self.map_data(name, row)
    }

    /// Persist a new row and wrap the stored result (including any
    /// backend-generated primary key) as a clean record.
    pub async fn create(&self, name: &str, row: Row) -> MapResult<Data> {
        let stored = self.adapter.create(name, row).await?;
        self.map_data(name, stored)
    }

    /// Fetch at most one record. An absent row yields `None`; no record is
    /// constructed.
    pub async fn find(
        &self,
        name: &str,
        cond: &Cond,
        options: &FindOptions,
    ) -> MapResult<Option<Data>> {
        match self.adapter.find(name, cond, options).await? {
            Some(row) => Ok(Some(self.map_data(name, row)?)),
            None => Ok(None),
        }
    }

    /// Fetch all matching records, honoring the options' ordering.
    pub async fn search(
        &self,
        name: &str,
        cond: &Cond,
        options: &FindOptions,
    ) -> MapResult<Vec<Data>> {
        let rows = self.adapter.search(name, cond, options).await?;
        rows.into_iter()
            .map(|row| self.map_data(name, row))
            .collect()
    }

    /// Persist a record's dirty fields as a partial UPDATE.
    ///
    /// Returns `Ok(None)` without touching the adapter when the record is
    /// clean. On success the record's dirty set is cleared; on failure it is
    /// preserved so the caller can retry.
    pub async fn update(&self, data: &mut Data) -> MapResult<Option<u64>> {
        if !data.is_changed() {
            debug!(table = data.table(), "record is clean, skipping update");
            return Ok(None);
        }
        let params = self.mapped_params(data).await?;
        let affected = self
            .adapter
            .update(data.table(), &params.set, &params.where_clause)
            .await?;
        data.discard_changes();
        Ok(Some(affected))
    }

    /// Delete the row a record points at, keyed by its primary-key values.
    pub async fn delete(&self, data: &Data) -> MapResult<u64> {
        let params = self.mapped_params(data).await?;
        self.adapter.delete(data.table(), &params.where_clause).await
    }

    /// Compute `{set, where}` for a record: `set` holds exactly the dirty
    /// fields with their current values, `where` the primary-key columns
    /// with their current values.
    ///
    /// Fails with a lookup error when the record's table has no schema
    /// entry, and with a configuration error when the table has no primary
    /// keys or no primary-key value is present on the record (which would
    /// otherwise produce an unconditioned UPDATE/DELETE).
    pub async fn mapped_params(&self, data: &Data) -> MapResult<MappedParams> {
        let schemata = self.adapter.schemata().await?;
        let schema = schemata.get(data.table()).ok_or_else(|| {
            MapError::lookup(format!("no schema entry for table '{}'", data.table()))
        })?;
        if schema.primary_keys.is_empty() {
            return Err(MapError::configuration(format!(
                "table '{}' has no primary key columns",
                data.table()
            )));
        }

        let set = data.changes();

        let mut where_clause = Cond::new();
        for pk in &schema.primary_keys {
            if let Some(value) = data.get(pk)
                && !value.is_null()
            {
                where_clause = where_clause.eq(pk.clone(), value.clone());
            }
        }
        if where_clause.is_empty() {
            return Err(MapError::configuration("where clause is empty"));
        }

        Ok(MappedParams { set, where_clause })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{Schemata, TableSchema};
    use crate::value::Value;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Spy adapter: records update/delete invocations and replays canned
    /// find/search results. Everything else keeps the unsupported default.
    #[derive(Default)]
    struct SpyAdapter {
        schemata: Schemata,
        find_result: Mutex<Option<Row>>,
        search_result: Mutex<Vec<Row>>,
        update_calls: AtomicUsize,
        last_update: Mutex<Option<(String, Row, Cond)>>,
        last_delete: Mutex<Option<(String, Cond)>>,
        fail_update: bool,
    }

    impl SpyAdapter {
        fn with_table(table: &str, primary_keys: &[&str]) -> Self {
            let mut spy = Self::default();
            spy.schemata.insert(
                table.to_string(),
                TableSchema::new(primary_keys.iter().copied()),
            );
            spy
        }
    }

    impl Adapter for SpyAdapter {
        async fn create(&self, table: &str, mut row: Row) -> MapResult<Row> {
            let _ = table;
            row.insert("id", 1_i64);
            Ok(row)
        }

        async fn find(&self, _: &str, _: &Cond, _: &FindOptions) -> MapResult<Option<Row>> {
            Ok(self.find_result.lock().unwrap().take())
        }

        async fn search(&self, _: &str, _: &Cond, _: &FindOptions) -> MapResult<Vec<Row>> {
            Ok(self.search_result.lock().unwrap().clone())
        }

        async fn update(&self, table: &str, set: &Row, cond: &Cond) -> MapResult<u64> {
            self.update_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_update {
                return Err(MapError::driver("connection reset"));
            }
            *self.last_update.lock().unwrap() =
                Some((table.to_string(), set.clone(), cond.clone()));
            Ok(1)
        }

        async fn delete(&self, table: &str, cond: &Cond) -> MapResult<u64> {
            *self.last_delete.lock().unwrap() = Some((table.to_string(), cond.clone()));
            Ok(1)
        }

        async fn schemata(&self) -> MapResult<Arc<Schemata>> {
            Ok(Arc::new(self.schemata.clone()))
        }
    }

    fn users_mapper(adapter: SpyAdapter) -> Mapper<SpyAdapter> {
        let mut mapper = Mapper::new(adapter);
        mapper.register_collection("users");
        mapper
    }

    fn loaded_user() -> Data {
        let row: Row = [("id", Value::Int(1)), ("value", Value::from("a"))]
            .into_iter()
            .collect();
        Data::from_row("users", row)
    }

    #[tokio::test]
    async fn update_clean_record_is_a_noop() {
        let mapper = users_mapper(SpyAdapter::with_table("users", &["id"]));
        let mut data = loaded_user();

        let result = mapper.update(&mut data).await.unwrap();
        assert_eq!(result, None);
        assert_eq!(mapper.adapter().update_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn update_sends_dirty_fields_and_primary_key_where() {
        let mapper = users_mapper(SpyAdapter::with_table("users", &["id"]));
        let mut data = loaded_user();
        data.set("value", "b");

        let affected = mapper.update(&mut data).await.unwrap();
        assert_eq!(affected, Some(1));
        assert!(!data.is_changed());

        let (table, set, cond) = mapper.adapter().last_update.lock().unwrap().clone().unwrap();
        assert_eq!(table, "users");
        assert_eq!(set, [("value", Value::from("b"))].into_iter().collect());
        assert_eq!(cond, Cond::new().eq("id", 1_i64));
    }

    #[tokio::test]
    async fn failed_update_preserves_dirty_state() {
        let mut adapter = SpyAdapter::with_table("users", &["id"]);
        adapter.fail_update = true;
        let mapper = users_mapper(adapter);

        let mut data = loaded_user();
        data.set("value", "b");

        let err = mapper.update(&mut data).await.unwrap_err();
        assert!(err.is_driver());
        assert!(data.is_changed());
        assert_eq!(data.changed_keys(), vec!["value"]);
    }

    #[tokio::test]
    async fn delete_uses_primary_key_where_only() {
        let mapper = users_mapper(SpyAdapter::with_table("users", &["id"]));
        let mut data = loaded_user();
        data.set("value", "b");

        let affected = mapper.delete(&data).await.unwrap();
        assert_eq!(affected, 1);

        let (table, cond) = mapper.adapter().last_delete.lock().unwrap().clone().unwrap();
        assert_eq!(table, "users");
        assert_eq!(cond, Cond::new().eq("id", 1_i64));
    }

    #[tokio::test]
    async fn mapped_params_requires_a_schema_entry() {
        let mapper = users_mapper(SpyAdapter::with_table("posts", &["id"]));
        let err = mapper.mapped_params(&loaded_user()).await.unwrap_err();
        assert!(err.is_lookup());
        assert!(err.to_string().contains("users"));
    }

    #[tokio::test]
    async fn mapped_params_requires_primary_key_columns() {
        let mapper = users_mapper(SpyAdapter::with_table("users", &[]));
        let err = mapper.mapped_params(&loaded_user()).await.unwrap_err();
        assert!(err.is_configuration());
    }

    #[tokio::test]
    async fn mapped_params_fails_when_no_key_value_is_present() {
        let mapper = users_mapper(SpyAdapter::with_table("users", &["id"]));
        let mut data = Data::new("users");
        data.set("value", "b");

        let err = mapper.mapped_params(&data).await.unwrap_err();
        assert!(matches!(err, MapError::Configuration(ref m) if m == "where clause is empty"));
    }

    #[tokio::test]
    async fn mapped_params_uses_composite_keys() {
        let mapper = users_mapper(SpyAdapter::with_table("users", &["a", "b"]));
        let row: Row = [
            ("a", Value::Int(1)),
            ("b", Value::Int(2)),
            ("value", Value::from("x")),
        ]
        .into_iter()
        .collect();
        let mut data = Data::from_row("users", row);
        data.set("value", "y");

        let params = mapper.mapped_params(&data).await.unwrap();
        assert_eq!(
            params.where_clause,
            Cond::new().eq("a", 1_i64).eq("b", 2_i64)
        );
        assert_eq!(params.set, [("value", Value::from("y"))].into_iter().collect());
    }

    #[tokio::test]
    async fn find_absent_row_constructs_nothing() {
        let mapper = users_mapper(SpyAdapter::with_table("users", &["id"]));
        let found = mapper
            .find("users", &Cond::new().eq("id", 1_i64), &FindOptions::default())
            .await
            .unwrap();
        assert_eq!(found, None);
    }

    #[tokio::test]
    async fn search_maps_every_row_clean() {
        let adapter = SpyAdapter::with_table("users", &["id"]);
        let rows: Vec<Row> = (1..=3)
            .map(|i| [("id", Value::Int(i))].into_iter().collect())
            .collect();
        *adapter.search_result.lock().unwrap() = rows;
        let mapper = users_mapper(adapter);

        let results = mapper
            .search("users", &Cond::new(), &FindOptions::default())
            .await
            .unwrap();
        assert_eq!(results.len(), 3);
        for data in &results {
            assert_eq!(data.table(), "users");
            assert!(!data.is_changed());
        }
    }

    #[test]
    fn data_factory_resolution_is_deterministic() {
        let mapper = users_mapper(SpyAdapter::default());
        let first = mapper.data_factory("users").unwrap().clone();
        let second = mapper.data_factory("users").unwrap().clone();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn unregistered_collection_is_a_lookup_error() {
        let mapper = Mapper::new(SpyAdapter::default());
        let err = mapper.map_data("ghosts", Row::new()).unwrap_err();
        assert!(err.is_lookup());
        assert!(err.to_string().contains("ghosts"));
    }

    #[test]
    fn map_serialized_accepts_structs_and_rejects_scalars() {
        #[derive(serde::Serialize)]
        struct NewUser {
            value: String,
        }

        let mut mapper = Mapper::new(SpyAdapter::default());
        mapper.register_collection("users");

        let data = mapper
            .map_serialized("users", &NewUser { value: "a".into() })
            .unwrap();
        assert_eq!(data.get("value"), Some(&Value::Text("a".into())));
        assert!(!data.is_changed());

        let err = mapper.map_serialized("users", &5_i64).unwrap_err();
        assert!(matches!(err, MapError::Contract(_)));
    }

    #[tokio::test]
    async fn create_wraps_stored_row_with_generated_id() {
        let mapper = users_mapper(SpyAdapter::with_table("users", &["id"]));
        let row: Row = [("value", Value::from("a"))].into_iter().collect();

        let data = mapper.create("users", row).await.unwrap();
        assert_eq!(data.get("id"), Some(&Value::Int(1)));
        assert_eq!(data.get("value"), Some(&Value::Text("a".into())));
        assert!(!data.is_changed());
    }
}
