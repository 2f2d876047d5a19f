//! Equality conditions and find options.
//!
//! Conditions are column→value equality maps; that is the full operator
//! surface of this core. Options cover field selection and a single
//! `ORDER BY column direction` clause.

use crate::value::Value;
use std::collections::BTreeMap;

/// A set of equality conditions, ANDed together.
///
/// # Example
/// ```
/// use rowmap::Cond;
///
/// let cond = Cond::new().eq("status", "active").eq("id", 42_i64);
/// assert_eq!(cond.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cond {
    items: BTreeMap<String, Value>,
}

impl Cond {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a `column = value` condition.
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.items.insert(column.into(), value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.items.get(column)
    }

    /// Column/value pairs in deterministic (sorted) order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.items.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Cond {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            items: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Column selection for SELECT statements.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Fields {
    /// All columns (`*`).
    #[default]
    All,
    /// An explicit column list.
    Only(Vec<String>),
}

/// Sort direction for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

impl SortDir {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDir::Asc => "ASC",
            SortDir::Desc => "DESC",
        }
    }
}

/// A single `ORDER BY column direction` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub column: String,
    pub dir: SortDir,
}

impl OrderBy {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            dir: SortDir::Asc,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            dir: SortDir::Desc,
        }
    }
}

/// Options for `find`/`search`: which columns to fetch and in what order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    pub fields: Fields,
    pub order_by: Option<OrderBy>,
}

impl FindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.fields = Fields::Only(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by = Some(order);
        self
    }
}
