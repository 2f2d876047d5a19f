//! # rowmap
//!
//! A minimal data-mapper core for Rust.
//!
//! ## Features
//!
//! - **Dirty-tracking records**: [`Data`] remembers which fields changed
//!   since the last clean state, so updates touch only what moved
//! - **Pluggable storage**: the [`Adapter`] contract covers create / find /
//!   search / update / delete plus schema introspection; un-overridden
//!   capabilities fail with a typed error
//! - **Dialect-aware SQL**: [`SqlAdapter`] builds parameterized statements
//!   (never string-interpolated) and resolves auto-generated primary keys
//!   per dialect (last-insert id, `<table>_id_seq`, last-row id)
//! - **Safe defaults**: DELETE requires WHERE, UPDATE requires SET, and a
//!   record without resolvable primary-key values never produces an
//!   unconditioned mutation
//!
//! ## Example
//!
//! ```ignore
//! use rowmap::{Cond, FindOptions, Mapper, Row, SqlAdapter};
//!
//! let mut mapper = Mapper::new(SqlAdapter::new(driver));
//! mapper.register_collection("users");
//!
//! let mut row = Row::new();
//! row.insert("value", "a");
//! let mut user = mapper.create("users", row).await?;
//!
//! user.set("value", "b");
//! mapper.update(&mut user).await?;   // UPDATE users SET value = $1 WHERE id = $2
//! mapper.delete(&user).await?;
//! ```

pub mod adapter;
pub mod condition;
pub mod data;
pub mod dialect;
pub mod driver;
pub mod error;
pub mod mapper;
pub mod sql;
pub mod sql_adapter;
pub mod value;

pub use adapter::{Adapter, Schemata, TableSchema};
pub use condition::{Cond, Fields, FindOptions, OrderBy, SortDir};
pub use data::Data;
pub use dialect::{AutoId, Dialect};
pub use driver::Driver;
pub use error::{MapError, MapResult};
pub use mapper::{DataFactory, MappedParams, Mapper};
pub use sql::{Sql, sql};
pub use sql_adapter::{DriverSource, SqlAdapter};
pub use value::{FromValue, Row, Value};
