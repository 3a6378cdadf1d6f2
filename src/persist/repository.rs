use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{Collection, Persistable};
use crate::db::RowStore;
use crate::error::TomeError;

/// A row that could not be hydrated during a sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFailure {
    pub id: Option<i64>,
    pub error: String,
}

/// Outcome of one `sync()`: how many records made it into the collection and which rows
/// were left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub table: &'static str,
    pub loaded: usize,
    pub failures: Vec<RowFailure>,
}

impl SyncReport {
    pub fn rows(&self) -> usize {
        self.loaded + self.failures.len()
    }
}

/// Load/save/delete for one record type, mirrored into a [`Collection`].
pub struct Repository<T: Persistable> {
    store: Arc<dyn RowStore>,
    ctx: Arc<T::Context>,
    collection: Collection<T>,
}

impl<T: Persistable> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            ctx: self.ctx.clone(),
            collection: self.collection.clone(),
        }
    }
}

impl<T: Persistable> Repository<T> {
    pub fn new(store: Arc<dyn RowStore>, ctx: T::Context) -> Self {
        Self {
            store,
            ctx: Arc::new(ctx),
            collection: Collection::new(),
        }
    }

    pub fn context(&self) -> &T::Context {
        &self.ctx
    }

    pub fn collection(&self) -> &Collection<T> {
        &self.collection
    }

    pub fn all(&self) -> Arc<Vec<T>> {
        self.collection.snapshot()
    }

    pub fn get(&self, id: i64) -> Option<T> {
        self.collection.get(id)
    }

    /// Reloads every row and swaps the collection contents once all rows are hydrated.
    ///
    /// Rows hydrate concurrently. A row whose hydration fails is logged, left out, and
    /// listed in the report; only a failure to read the table fails the call.
    pub async fn sync(&self) -> Result<SyncReport, TomeError> {
        let rows = self.store.select_all(T::TABLE).await?;
        let ctx = &*self.ctx;

        let hydrated = join_all(rows.into_iter().map(|row| async move {
            let id = row.id();
            let record = match row.check_decoded(T::TABLE) {
                Ok(()) => T::from_row(row, ctx).await,
                Err(e) => Err(e),
            };
            (id, record)
        }))
        .await;

        let mut records = Vec::with_capacity(hydrated.len());
        let mut failures = Vec::new();
        for (id, result) in hydrated {
            match result {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(table = T::TABLE, id = ?id, error = %e, "row hydration failed; skipping");
                    failures.push(RowFailure {
                        id,
                        error: e.to_string(),
                    });
                }
            }
        }

        let report = SyncReport {
            table: T::TABLE,
            loaded: records.len(),
            failures,
        };
        self.collection.replace(records);

        info!(
            table = T::TABLE,
            loaded = report.loaded,
            failed = report.failures.len(),
            "sync complete"
        );
        Ok(report)
    }

    /// Inserts a record without identity (adopting the new id) or updates the row with the
    /// record's id. The record's id is only touched once the row is written.
    pub async fn save(&self, record: &mut T) -> Result<i64, TomeError> {
        let row = record.to_row()?.into_fields();

        let id = match record.id() {
            None => {
                let id = self.store.insert(T::TABLE, row).await?;
                record.set_id(id);
                debug!(table = T::TABLE, id, "record inserted");
                id
            }
            Some(id) => {
                self.store.update(T::TABLE, id, row).await?;
                debug!(table = T::TABLE, id, "record updated");
                id
            }
        };

        self.collection.upsert(record.clone());
        Ok(id)
    }

    /// Removes the row, then the mirrored record. On failure neither changes.
    pub async fn delete(&self, id: i64) -> Result<(), TomeError> {
        self.store.delete(T::TABLE, id).await?;
        self.collection.remove(id);
        debug!(table = T::TABLE, id, "record deleted");
        Ok(())
    }

    /// Deletes a record by its identity; a never-saved record is `NotPersisted`.
    pub async fn delete_record(&self, record: &T) -> Result<(), TomeError> {
        let id = record.id().ok_or(TomeError::NotPersisted)?;
        self.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Row;
    use crate::persist::Identified;
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// In-memory store that can be told to reject writes.
    #[derive(Default)]
    struct MemoryStore {
        rows: Mutex<BTreeMap<i64, Row>>,
        next_id: Mutex<i64>,
        reject_writes: AtomicBool,
    }

    impl MemoryStore {
        fn check_writable(&self) -> Result<(), TomeError> {
            if self.reject_writes.load(Ordering::SeqCst) {
                return Err(TomeError::RactorError("store offline".to_string()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl RowStore for MemoryStore {
        async fn select_all(&self, _table: &str) -> Result<Vec<Row>, TomeError> {
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .iter()
                .map(|(id, row)| row.clone().with("id", *id))
                .collect())
        }

        async fn insert(&self, _table: &str, row: Row) -> Result<i64, TomeError> {
            self.check_writable()?;
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            self.rows.lock().unwrap().insert(*next, row);
            Ok(*next)
        }

        async fn update(&self, table: &str, id: i64, row: Row) -> Result<(), TomeError> {
            self.check_writable()?;
            match self.rows.lock().unwrap().get_mut(&id) {
                Some(slot) => {
                    *slot = row;
                    Ok(())
                }
                None => Err(TomeError::NotFound {
                    table: table.to_string(),
                    id,
                }),
            }
        }

        async fn delete(&self, table: &str, id: i64) -> Result<(), TomeError> {
            self.check_writable()?;
            match self.rows.lock().unwrap().remove(&id) {
                Some(_) => Ok(()),
                None => Err(TomeError::NotFound {
                    table: table.to_string(),
                    id,
                }),
            }
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Note {
        id: Option<i64>,
        text: String,
    }

    impl Identified for Note {
        fn id(&self) -> Option<i64> {
            self.id
        }
    }

    #[async_trait]
    impl Persistable for Note {
        const TABLE: &'static str = "notes";
        type Context = ();

        fn set_id(&mut self, id: i64) {
            self.id = Some(id);
        }

        fn to_row(&self) -> Result<Row, TomeError> {
            Ok(Row::new().with("text", self.text.as_str()))
        }

        async fn from_row(row: Row, _ctx: &()) -> Result<Self, TomeError> {
            let text = row.text(Self::TABLE, "text")?;
            if text == "poison" {
                return Err(TomeError::malformed(Self::TABLE, "poisoned note"));
            }
            Ok(Note {
                id: Some(row.require_id(Self::TABLE)?),
                text: text.to_string(),
            })
        }
    }

    fn note(text: &str) -> Note {
        Note {
            id: None,
            text: text.to_string(),
        }
    }

    fn repo() -> (Arc<MemoryStore>, Repository<Note>) {
        let store = Arc::new(MemoryStore::default());
        let repo = Repository::new(store.clone() as Arc<dyn RowStore>, ());
        (store, repo)
    }

    #[tokio::test]
    async fn failing_row_is_reported_without_aborting_the_sync() {
        let (_store, repo) = repo();
        for text in ["a", "poison", "c"] {
            repo.save(&mut note(text)).await.unwrap();
        }

        let report = repo.sync().await.unwrap();

        assert_eq!(report.loaded, 2);
        assert_eq!(report.rows(), 3);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].id, Some(2));
        let texts: Vec<_> = repo.all().iter().map(|n| n.text.clone()).collect();
        assert_eq!(texts, ["a", "c"]);
    }

    #[tokio::test]
    async fn rejected_insert_leaves_record_without_identity() {
        let (store, repo) = repo();
        store.reject_writes.store(true, Ordering::SeqCst);

        let mut fresh = note("draft");
        let err = repo.save(&mut fresh).await.unwrap_err();

        assert!(err.is_store_failure());
        assert_eq!(fresh.id, None);
        assert!(repo.all().is_empty());
    }

    #[tokio::test]
    async fn rejected_delete_keeps_store_and_collection_intact() {
        let (store, repo) = repo();
        let mut kept = note("keep me");
        let id = repo.save(&mut kept).await.unwrap();

        store.reject_writes.store(true, Ordering::SeqCst);
        assert!(repo.delete(id).await.is_err());

        assert_eq!(repo.get(id), Some(kept));
        assert_eq!(store.rows.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unsaved_record_cannot_be_deleted() {
        let (_store, repo) = repo();
        assert!(matches!(
            repo.delete_record(&note("never saved")).await,
            Err(TomeError::NotPersisted)
        ));
    }

    #[tokio::test]
    async fn update_of_vanished_row_is_not_found() {
        let (store, repo) = repo();
        let mut n = note("x");
        let id = repo.save(&mut n).await.unwrap();
        store.rows.lock().unwrap().clear();

        n.text = "y".to_string();
        assert!(matches!(
            repo.save(&mut n).await,
            Err(TomeError::NotFound { id: missing, .. }) if missing == id
        ));
    }
}
