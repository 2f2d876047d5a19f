//! In-memory adapter used by the integration tests.

use rowmap::{Adapter, Cond, Fields, FindOptions, MapResult, Row, Schemata, SortDir, TableSchema, Value};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex};

/// A storage adapter over plain vectors, with single-column primary-key
/// auto-assignment mirroring what a SQL backend would do.
pub struct MemoryAdapter {
    tables: Mutex<BTreeMap<String, Vec<Row>>>,
    next_id: AtomicI64,
    schemata: Arc<Schemata>,
}

impl MemoryAdapter {
    /// An adapter with one table `test` keyed by `id`.
    pub fn new() -> Self {
        let mut schemata = Schemata::new();
        schemata.insert("test".to_string(), TableSchema::new(["id"]));
        Self::with_schemata(schemata)
    }

    pub fn with_schemata(schemata: Schemata) -> Self {
        Self {
            tables: Mutex::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
            schemata: Arc::new(schemata),
        }
    }

    fn matches(row: &Row, cond: &Cond) -> bool {
        cond.iter().all(|(column, value)| row.get(column) == Some(value))
    }

    fn compare(a: &Value, b: &Value) -> Ordering {
        match (a, b) {
            (Value::Int(x), Value::Int(y)) => x.cmp(y),
            (Value::Float(x), Value::Float(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
            (Value::Text(x), Value::Text(y)) => x.cmp(y),
            (Value::Timestamp(x), Value::Timestamp(y)) => x.cmp(y),
            _ => Ordering::Equal,
        }
    }

    fn apply_options(mut rows: Vec<Row>, options: &FindOptions) -> Vec<Row> {
        if let Some(order) = &options.order_by {
            rows.sort_by(|a, b| {
                let ord = match (a.get(&order.column), b.get(&order.column)) {
                    (Some(x), Some(y)) => Self::compare(x, y),
                    _ => Ordering::Equal,
                };
                match order.dir {
                    SortDir::Asc => ord,
                    SortDir::Desc => ord.reverse(),
                }
            });
        }
        if let Fields::Only(columns) = &options.fields {
            rows = rows
                .into_iter()
                .map(|row| {
                    columns
                        .iter()
                        .filter_map(|c| row.get(c).map(|v| (c.clone(), v.clone())))
                        .collect()
                })
                .collect();
        }
        rows
    }
}

impl Adapter for MemoryAdapter {
    async fn create(&self, table: &str, mut row: Row) -> MapResult<Row> {
        if let Some(schema) = self.schemata.get(table)
            && let [pk] = schema.primary_keys.as_slice()
            && row.get(pk).is_none_or(Value::is_null)
        {
            let id = self.next_id.fetch_add(1, AtomicOrdering::SeqCst);
            row.insert(pk.clone(), id);
        }
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .push(row.clone());
        Ok(row)
    }

    async fn find(&self, table: &str, cond: &Cond, options: &FindOptions) -> MapResult<Option<Row>> {
        let rows = self.search(table, cond, options).await?;
        Ok(rows.into_iter().next())
    }

    async fn search(&self, table: &str, cond: &Cond, options: &FindOptions) -> MapResult<Vec<Row>> {
        let tables = self.tables.lock().unwrap();
        let rows = tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| Self::matches(row, cond))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(Self::apply_options(rows, options))
    }

    async fn update(&self, table: &str, set: &Row, cond: &Cond) -> MapResult<u64> {
        let mut tables = self.tables.lock().unwrap();
        let mut affected = 0;
        if let Some(rows) = tables.get_mut(table) {
            for row in rows.iter_mut().filter(|row| Self::matches(row, cond)) {
                for (column, value) in set.iter() {
                    row.insert(column, value.clone());
                }
                affected += 1;
            }
        }
        Ok(affected)
    }

    async fn delete(&self, table: &str, cond: &Cond) -> MapResult<u64> {
        let mut tables = self.tables.lock().unwrap();
        let mut affected = 0;
        if let Some(rows) = tables.get_mut(table) {
            let before = rows.len();
            rows.retain(|row| !Self::matches(row, cond));
            affected = (before - rows.len()) as u64;
        }
        Ok(affected)
    }

    async fn schemata(&self) -> MapResult<Arc<Schemata>> {
        Ok(self.schemata.clone())
    }
}
