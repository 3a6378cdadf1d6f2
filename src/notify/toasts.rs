use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tracing::{debug, warn};

pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub kind: ToastKind,
    pub duration_ms: u64,
    pub created_at: DateTime<Utc>,
}

struct Entry {
    toast: Toast,
    expiry: Option<AbortHandle>,
}

struct Inner {
    entries: Mutex<Vec<Entry>>,
    tx: watch::Sender<Arc<Vec<Toast>>>,
    last_id: AtomicU64,
    default_duration: Duration,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, Vec<Entry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn publish(&self, entries: &[Entry]) {
        let snapshot: Vec<Toast> = entries.iter().map(|e| e.toast.clone()).collect();
        self.tx.send_replace(Arc::new(snapshot));
    }

    /// Millisecond timestamp, bumped past the previous id on collision.
    fn next_id(&self) -> u64 {
        let now = Utc::now().timestamp_millis().max(0) as u64;
        let prev = self
            .last_id
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        now.max(prev + 1)
    }

    fn remove(&self, id: u64) -> Option<Entry> {
        let mut entries = self.lock();
        let pos = entries.iter().position(|e| e.toast.id == id)?;
        let entry = entries.remove(pos);
        self.publish(&entries);
        Some(entry)
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        let entries = self
            .entries
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        for entry in entries.drain(..) {
            if let Some(handle) = entry.expiry {
                handle.abort();
            }
        }
    }
}

/// Ordered queue of transient notifications.
///
/// Cheap to clone; all clones share one queue. Each toast expires on its own timer, and
/// needs a Tokio runtime to do so.
#[derive(Clone)]
pub struct Toasts {
    inner: Arc<Inner>,
}

impl Default for Toasts {
    fn default() -> Self {
        Self::new(DEFAULT_TOAST_DURATION)
    }
}

impl Toasts {
    pub fn new(default_duration: Duration) -> Self {
        let (tx, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            inner: Arc::new(Inner {
                entries: Mutex::new(Vec::new()),
                tx,
                last_id: AtomicU64::new(0),
                default_duration,
            }),
        }
    }

    pub fn info(&self, message: impl Into<String>, duration: Option<Duration>) -> u64 {
        self.push(ToastKind::Info, message.into(), duration)
    }

    pub fn success(&self, message: impl Into<String>, duration: Option<Duration>) -> u64 {
        self.push(ToastKind::Success, message.into(), duration)
    }

    pub fn error(&self, message: impl Into<String>, duration: Option<Duration>) -> u64 {
        self.push(ToastKind::Error, message.into(), duration)
    }

    /// Removes a toast before it expires. Returns `false` if it is already gone.
    pub fn dismiss(&self, id: u64) -> bool {
        match self.inner.remove(id) {
            Some(entry) => {
                if let Some(handle) = entry.expiry {
                    handle.abort();
                }
                debug!(toast.id = id, "Toast dismissed");
                true
            }
            None => false,
        }
    }

    pub fn list(&self) -> Arc<Vec<Toast>> {
        self.inner.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<Toast>>> {
        self.inner.tx.subscribe()
    }

    fn push(&self, kind: ToastKind, message: String, duration: Option<Duration>) -> u64 {
        let duration = duration.unwrap_or(self.inner.default_duration);
        let mut entries = self.inner.lock();

        let id = self.inner.next_id();
        let toast = Toast {
            id,
            message,
            kind,
            duration_ms: duration.as_millis() as u64,
            created_at: Utc::now(),
        };

        // Spawned under the lock so a zero-length expiry cannot run before the push lands.
        let expiry = match Handle::try_current() {
            Ok(handle) => {
                let weak: Weak<Inner> = Arc::downgrade(&self.inner);
                let task = handle.spawn(async move {
                    tokio::time::sleep(duration).await;
                    if let Some(inner) = weak.upgrade() {
                        inner.remove(id);
                    }
                });
                Some(task.abort_handle())
            }
            Err(_) => {
                warn!(toast.id = id, "No Tokio runtime; toast will not expire");
                None
            }
        };

        debug!(toast.id = id, toast.kind = ?kind, duration_ms = toast.duration_ms, "Toast queued");
        entries.push(Entry { toast, expiry });
        self.inner.publish(&entries);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn settle(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        tokio::task::yield_now().await;
    }

    #[tokio::test(start_paused = true)]
    async fn expires_without_touching_others() {
        let toasts = Toasts::default();
        let short = toasts.error("x", Some(Duration::from_millis(100)));
        let long = toasts.info("y", Some(Duration::from_secs(1)));

        let now = toasts.list();
        assert_eq!(now.len(), 2);
        assert_eq!(now[0].id, short);
        assert_eq!(now[0].kind, ToastKind::Error);

        settle(150).await;
        let left = toasts.list();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, long);

        settle(1000).await;
        assert!(toasts.list().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn ids_are_unique_within_a_millisecond() {
        let toasts = Toasts::default();
        let ids: Vec<u64> = (0..50).map(|i| toasts.info(format!("t{i}"), None)).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test(start_paused = true)]
    async fn dismiss_cancels_expiry() {
        let toasts = Toasts::default();
        let id = toasts.success("saved", None);
        let keep = toasts.info("keep", Some(Duration::from_secs(10)));

        assert!(toasts.dismiss(id));
        assert!(!toasts.dismiss(id));
        assert_eq!(toasts.list().len(), 1);

        settle(DEFAULT_TOAST_DURATION.as_millis() as u64 + 10).await;
        assert_eq!(toasts.list()[0].id, keep);
    }

    #[tokio::test(start_paused = true)]
    async fn default_duration_applies() {
        let toasts = Toasts::new(Duration::from_millis(50));
        let mut rx = toasts.subscribe();
        toasts.info("hi", None);
        assert_eq!(rx.borrow_and_update()[0].duration_ms, 50);

        settle(60).await;
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_empty());
    }

    #[test]
    fn without_runtime_toast_stays() {
        let toasts = Toasts::default();
        toasts.info("no runtime", None);
        assert_eq!(toasts.list().len(), 1);
    }
}
