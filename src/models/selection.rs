use std::sync::Arc;

use tokio::sync::watch;

/// The thread id currently selected by the session.
///
/// Cloned handles share one value. Writers are the session itself and the
/// resume controller (which clears it to force a fresh thread); readers
/// subscribe to follow changes.
#[derive(Debug, Clone)]
pub struct ThreadSelection {
    tx: Arc<watch::Sender<Option<String>>>,
}

impl Default for ThreadSelection {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ThreadSelection {
    pub fn new(initial: Option<String>) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    pub fn current(&self) -> Option<String> {
        self.tx.borrow().clone()
    }

    /// Select a thread. Subscribers are only notified when the value changes.
    pub fn set(&self, thread_id: Option<String>) {
        self.tx.send_if_modified(|current| {
            if *current == thread_id {
                false
            } else {
                *current = thread_id;
                true
            }
        });
    }

    pub fn clear(&self) {
        self.set(None);
    }

    /// Replace the selection only if it still equals `expected`.
    ///
    /// Returns whether the value was replaced.
    pub fn replace_if(&self, expected: Option<&str>, thread_id: Option<String>) -> bool {
        self.tx.send_if_modified(|current| {
            if current.as_deref() != expected || *current == thread_id {
                return false;
            }
            *current = thread_id;
            true
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_shared_between_clones() {
        let selection = ThreadSelection::default();
        let other = selection.clone();
        selection.set(Some("t-1".to_string()));
        assert_eq!(other.current(), Some("t-1".to_string()));
        other.clear();
        assert_eq!(selection.current(), None);
    }

    #[test]
    fn test_replace_if_guards_on_expected() {
        let selection = ThreadSelection::new(Some("t-1".to_string()));
        assert!(!selection.replace_if(Some("t-2"), Some("t-3".to_string())));
        assert_eq!(selection.current(), Some("t-1".to_string()));
        assert!(selection.replace_if(Some("t-1"), Some("t-3".to_string())));
        assert_eq!(selection.current(), Some("t-3".to_string()));
    }

    #[tokio::test]
    async fn test_subscribers_see_changes_only() {
        let selection = ThreadSelection::default();
        let mut rx = selection.subscribe();
        selection.set(None);
        assert!(!rx.has_changed().unwrap());
        selection.set(Some("t-9".to_string()));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().clone(), Some("t-9".to_string()));
    }
}
