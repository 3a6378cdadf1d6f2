//! Generic persistence for reactive records.
//!
//! A record type implements [`Persistable`] (table name plus row translation); a single
//! [`Repository`] gives it `sync`/`save`/`delete` against any [`RowStore`], mirroring the
//! results into an observable [`Collection`].
//!
//! [`RowStore`]: crate::db::RowStore

mod collection;
mod repository;

pub use collection::{Change, Collection};
pub use repository::{Repository, RowFailure, SyncReport};

use async_trait::async_trait;

use crate::db::Row;
use crate::error::TomeError;

/// Anything with an optional durable identity.
pub trait Identified {
    /// `None` until the record has been saved once.
    fn id(&self) -> Option<i64>;
}

#[async_trait]
pub trait Persistable: Identified + Clone + Send + Sync + 'static {
    /// Backing table.
    const TABLE: &'static str;

    /// Whatever hydration needs besides the row (HTTP clients, config, sinks).
    type Context: Send + Sync + 'static;

    fn set_id(&mut self, id: i64);

    /// Flat representation written on save. The `id` column is ignored if present.
    fn to_row(&self) -> Result<Row, TomeError>;

    /// Builds a record from a stored row. May perform I/O; an error excludes the row from
    /// the current sync without affecting the others.
    async fn from_row(row: Row, ctx: &Self::Context) -> Result<Self, TomeError>;
}
