use std::sync::Arc;
use tokio::sync::watch;
use tracing::warn;

/// Sticky warning raised while loading, e.g. when a local model server is unreachable.
///
/// Unlike toasts it does not expire; it stays until [`StartupWarning::clear`].
#[derive(Clone)]
pub struct StartupWarning {
    tx: Arc<watch::Sender<Option<String>>>,
}

impl Default for StartupWarning {
    fn default() -> Self {
        Self::new()
    }
}

impl StartupWarning {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    pub fn set(&self, message: impl Into<String>) {
        let message = message.into();
        warn!(warning = %message, "Startup warning raised");
        self.tx.send_replace(Some(message));
    }

    pub fn clear(&self) {
        self.tx.send_replace(None);
    }

    pub fn current(&self) -> Option<String> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_see_set_and_clear() {
        let warning = StartupWarning::new();
        let mut rx = warning.subscribe();
        assert_eq!(warning.current(), None);

        warning.clone().set("down");
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().as_deref(), Some("down"));

        warning.clear();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), None);
    }
}
