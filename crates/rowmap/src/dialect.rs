//! SQL dialect identifiers and their auto-generated-id strategies.

/// The SQL backend in use, determining placeholder style and how a freshly
/// inserted auto-increment key is retrieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    #[default]
    Postgres,
    Mysql,
    Sqlite,
    /// Any backend without a known auto-id mechanism; callers must supply
    /// primary-key values themselves.
    Other,
}

/// How to obtain the auto-generated primary key after an INSERT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoId {
    /// Read the connection-local last-insert id (MySQL).
    InsertId,
    /// Query the named sequence (Postgres, `<table>_id_seq` convention).
    Sequence(String),
    /// Call the driver-level last-row-id function (SQLite).
    LastRowId,
    /// No auto-id mechanism; the generated key cannot be resolved.
    None,
}

impl Dialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Postgres => "postgres",
            Dialect::Mysql => "mysql",
            Dialect::Sqlite => "sqlite",
            Dialect::Other => "other",
        }
    }

    /// Placeholder text for the 1-based bind position `idx`.
    pub fn placeholder(&self, idx: usize) -> String {
        match self {
            Dialect::Postgres => format!("${idx}"),
            _ => "?".to_string(),
        }
    }

    /// The auto-id retrieval strategy for `table` under this dialect.
    pub fn auto_id(&self, table: &str) -> AutoId {
        match self {
            Dialect::Postgres => AutoId::Sequence(format!("{table}_id_seq")),
            Dialect::Mysql => AutoId::InsertId,
            Dialect::Sqlite => AutoId::LastRowId,
            Dialect::Other => AutoId::None,
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
