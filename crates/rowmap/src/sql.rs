//! Parameter-safe SQL building.
//!
//! [`Sql`] stores raw SQL pieces and bind values separately and generates
//! placeholders (`$1, $2, ...` or `?`) for the active dialect when the
//! statement is rendered, so composing SQL never requires tracking
//! placeholder indices by hand. The statement constructors at the bottom
//! ([`insert`], [`select`], [`update`], [`delete`]) are the full statement
//! surface the SQL adapter needs.
//!
//! Safe defaults: UPDATE requires a SET clause, UPDATE and DELETE require a
//! WHERE clause. An unconditioned mutation is a builder error, not a
//! runtime surprise.

use crate::condition::{Cond, Fields, FindOptions};
use crate::dialect::Dialect;
use crate::error::{MapError, MapResult};
use crate::value::{Row, Value};

#[derive(Debug)]
enum SqlPart {
    Raw(String),
    Param,
}

/// A parameter-safe dynamic SQL builder.
#[derive(Debug, Default)]
pub struct Sql {
    parts: Vec<SqlPart>,
    params: Vec<Value>,
}

/// Start building a SQL statement.
pub fn sql(initial_sql: impl Into<String>) -> Sql {
    Sql::new(initial_sql)
}

impl Sql {
    /// Create a new builder with an initial SQL fragment.
    pub fn new(initial_sql: impl Into<String>) -> Self {
        Self {
            parts: vec![SqlPart::Raw(initial_sql.into())],
            params: Vec::new(),
        }
    }

    /// Create an empty builder.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Append raw SQL (no parameters).
    pub fn push(&mut self, sql: &str) -> &mut Self {
        if sql.is_empty() {
            return self;
        }

        match self.parts.last_mut() {
            Some(SqlPart::Raw(last)) => last.push_str(sql),
            _ => self.parts.push(SqlPart::Raw(sql.to_string())),
        }
        self
    }

    /// Append a parameter placeholder and bind its value.
    pub fn push_bind(&mut self, value: impl Into<Value>) -> &mut Self {
        self.parts.push(SqlPart::Param);
        self.params.push(value.into());
        self
    }

    /// Append a SQL identifier (table/column) safely.
    ///
    /// Identifiers cannot be parameterized, so to prevent injection when
    /// they are dynamic this validates that each `.`-separated segment
    /// matches `[A-Za-z_][A-Za-z0-9_]*`.
    pub fn push_ident(&mut self, ident: &str) -> MapResult<&mut Self> {
        if ident.is_empty() {
            return Err(MapError::argument("push_ident: empty identifier"));
        }

        for seg in ident.split('.') {
            let mut chars = seg.chars();
            let first_ok = chars
                .next()
                .is_some_and(|c| c == '_' || c.is_ascii_alphabetic());
            if !first_ok || !chars.all(|c| c == '_' || c.is_ascii_alphanumeric()) {
                return Err(MapError::argument(format!(
                    "push_ident: invalid identifier '{ident}'"
                )));
            }
        }

        Ok(self.push(ident))
    }

    /// Append equality conditions joined by `AND`. Empty conditions are a
    /// no-op; callers decide whether an empty WHERE is acceptable.
    pub fn push_cond(&mut self, cond: &Cond) -> MapResult<&mut Self> {
        for (i, (column, value)) in cond.iter().enumerate() {
            if i > 0 {
                self.push(" AND ");
            }
            self.push_ident(column)?;
            self.push(" = ");
            self.push_bind(value.clone());
        }
        Ok(self)
    }

    /// Render the statement with the dialect's placeholder style.
    pub fn to_sql(&self, dialect: Dialect) -> String {
        let mut out = String::new();
        let mut idx: usize = 0;

        for part in &self.parts {
            match part {
                SqlPart::Raw(s) => out.push_str(s),
                SqlPart::Param => {
                    idx += 1;
                    out.push_str(&dialect.placeholder(idx));
                }
            }
        }
        out
    }

    /// Positional bind values, in placeholder order.
    pub fn params(&self) -> &[Value] {
        &self.params
    }
}

/// Build `INSERT INTO table (columns...) VALUES (...)` from a row.
pub fn insert(table: &str, row: &Row) -> MapResult<Sql> {
    if row.is_empty() {
        return Err(MapError::argument(format!(
            "insert into '{table}': no values supplied"
        )));
    }

    let mut q = sql("INSERT INTO ");
    q.push_ident(table)?;
    q.push(" (");
    for (i, column) in row.columns().enumerate() {
        if i > 0 {
            q.push(", ");
        }
        q.push_ident(column)?;
    }
    q.push(") VALUES (");
    for (i, value) in row.values().enumerate() {
        if i > 0 {
            q.push(", ");
        }
        q.push_bind(value.clone());
    }
    q.push(")");
    Ok(q)
}

/// Build `SELECT fields FROM table [WHERE ...] [ORDER BY ...]`.
pub fn select(table: &str, cond: &Cond, options: &FindOptions) -> MapResult<Sql> {
    let mut q = sql("SELECT ");
    match &options.fields {
        Fields::All => {
            q.push("*");
        }
        Fields::Only(columns) => {
            if columns.is_empty() {
                return Err(MapError::argument(format!(
                    "select from '{table}': empty field list"
                )));
            }
            for (i, column) in columns.iter().enumerate() {
                if i > 0 {
                    q.push(", ");
                }
                q.push_ident(column)?;
            }
        }
    }
    q.push(" FROM ");
    q.push_ident(table)?;
    if !cond.is_empty() {
        q.push(" WHERE ");
        q.push_cond(cond)?;
    }
    if let Some(order) = &options.order_by {
        q.push(" ORDER BY ");
        q.push_ident(&order.column)?;
        q.push(" ");
        q.push(order.dir.as_sql());
    }
    Ok(q)
}

/// Build `UPDATE table SET ... WHERE ...`. Both clauses are required.
pub fn update(table: &str, set: &Row, cond: &Cond) -> MapResult<Sql> {
    if set.is_empty() {
        return Err(MapError::argument(format!(
            "update '{table}': SET clause is empty"
        )));
    }
    if cond.is_empty() {
        return Err(MapError::argument(format!(
            "update '{table}': WHERE clause is required"
        )));
    }

    let mut q = sql("UPDATE ");
    q.push_ident(table)?;
    q.push(" SET ");
    for (i, (column, value)) in set.iter().enumerate() {
        if i > 0 {
            q.push(", ");
        }
        q.push_ident(column)?;
        q.push(" = ");
        q.push_bind(value.clone());
    }
    q.push(" WHERE ");
    q.push_cond(cond)?;
    Ok(q)
}

/// Build `DELETE FROM table WHERE ...`. The WHERE clause is required.
pub fn delete(table: &str, cond: &Cond) -> MapResult<Sql> {
    if cond.is_empty() {
        return Err(MapError::argument(format!(
            "delete from '{table}': WHERE clause is required"
        )));
    }

    let mut q = sql("DELETE FROM ");
    q.push_ident(table)?;
    q.push(" WHERE ");
    q.push_cond(cond)?;
    Ok(q)
}
