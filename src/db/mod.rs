//! Database module: the SQLite row store behind every repository.
//!
//! Layout:
//! - `row.rs`: the flat `Row` representation records translate to and from
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `actor.rs`: the actor that owns the connection pool
//! - `store.rs`: the `RowStore` seam repositories depend on

pub mod actor;
pub mod row;
pub mod schema;
pub mod store;

pub use actor::{DbActorHandle, spawn};
pub use row::{ID_COLUMN, Row, Value};
pub use schema::SQLITE_INIT;
pub use store::RowStore;
