use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tokio_stream::wrappers::WatchStream;

use super::Identified;

const EVENT_CAPACITY: usize = 64;

/// What last happened to a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// Whole contents swapped by a sync.
    Replaced { len: usize },
    /// One record inserted or updated in place.
    Upserted { id: i64 },
    /// One record removed.
    Removed { id: i64 },
}

struct Inner<T> {
    state: watch::Sender<Arc<Vec<T>>>,
    events: broadcast::Sender<Change>,
}

/// Ordered in-memory list of records observed by the UI.
///
/// Observers either hold a `watch` receiver (always sees the latest snapshot) or listen to
/// [`Change`] events. Every mutation publishes a new snapshot atomically, so a reader never
/// sees a half-applied sync.
pub struct Collection<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Default for Collection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync + 'static> Collection<T> {
    pub fn new() -> Self {
        let (state, _) = watch::channel(Arc::new(Vec::new()));
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner { state, events }),
        }
    }

    pub fn snapshot(&self) -> Arc<Vec<T>> {
        self.inner.state.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.state.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.state.borrow().is_empty()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<T>>> {
        self.inner.state.subscribe()
    }

    /// Snapshot stream, starting with the current contents.
    pub fn changes(&self) -> WatchStream<Arc<Vec<T>>> {
        WatchStream::new(self.subscribe())
    }

    pub fn events(&self) -> broadcast::Receiver<Change> {
        self.inner.events.subscribe()
    }

    pub fn replace(&self, records: Vec<T>) {
        let len = records.len();
        self.inner.state.send_replace(Arc::new(records));
        self.emit(Change::Replaced { len });
    }

    fn emit(&self, change: Change) {
        // No listeners is fine.
        let _ = self.inner.events.send(change);
    }
}

impl<T: Identified + Clone + Send + Sync + 'static> Collection<T> {
    pub fn get(&self, id: i64) -> Option<T> {
        self.inner
            .state
            .borrow()
            .iter()
            .find(|r| r.id() == Some(id))
            .cloned()
    }

    /// Replaces the record with the same id, or appends it. Records without an id are
    /// ignored: they are not persisted and have no place in the mirror.
    pub fn upsert(&self, record: T) {
        let Some(id) = record.id() else {
            return;
        };
        self.inner.state.send_modify(|records| {
            let records = Arc::make_mut(records);
            match records.iter_mut().find(|r| r.id() == Some(id)) {
                Some(slot) => *slot = record,
                None => records.push(record),
            }
        });
        self.emit(Change::Upserted { id });
    }

    pub fn remove(&self, id: i64) -> bool {
        let removed = self.inner.state.send_if_modified(|records| {
            let Some(pos) = records.iter().position(|r| r.id() == Some(id)) else {
                return false;
            };
            Arc::make_mut(records).remove(pos);
            true
        });
        if removed {
            self.emit(Change::Removed { id });
        }
        removed
    }
}
