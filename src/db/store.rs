use async_trait::async_trait;

use crate::db::actor::DbActorHandle;
use crate::db::row::Row;
use crate::error::TomeError;

/// Row-oriented local store the repositories persist through.
///
/// Implementations must make `insert` and `update` single atomic writes: either the whole
/// row lands (and `insert` returns its id) or nothing does.
#[async_trait]
pub trait RowStore: Send + Sync {
    async fn select_all(&self, table: &str) -> Result<Vec<Row>, TomeError>;

    async fn insert(&self, table: &str, row: Row) -> Result<i64, TomeError>;

    /// Fails with `TomeError::NotFound` when no row has this id.
    async fn update(&self, table: &str, id: i64, row: Row) -> Result<(), TomeError>;

    /// Fails with `TomeError::NotFound` when no row has this id.
    async fn delete(&self, table: &str, id: i64) -> Result<(), TomeError>;
}

#[async_trait]
impl RowStore for DbActorHandle {
    async fn select_all(&self, table: &str) -> Result<Vec<Row>, TomeError> {
        DbActorHandle::select_all(self, table).await
    }

    async fn insert(&self, table: &str, row: Row) -> Result<i64, TomeError> {
        DbActorHandle::insert(self, table, row).await
    }

    async fn update(&self, table: &str, id: i64, row: Row) -> Result<(), TomeError> {
        DbActorHandle::update(self, table, id, row).await
    }

    async fn delete(&self, table: &str, id: i64) -> Result<(), TomeError> {
        DbActorHandle::delete(self, table, id).await
    }
}
