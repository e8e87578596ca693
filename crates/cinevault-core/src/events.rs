use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tracing::{debug, error};

/// The user lists the list manager owns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    Watched,
    WantToWatch,
    Favorites,
}

impl ListKind {
    pub fn storage_key(self) -> &'static str {
        use crate::storage::keys;
        match self {
            ListKind::Watched => keys::WATCHED_MOVIES,
            ListKind::WantToWatch => keys::WANT_TO_WATCH_MOVIES,
            ListKind::Favorites => keys::FAVORITES,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ListKind::Watched => "watched",
            ListKind::WantToWatch => "want to watch",
            ListKind::Favorites => "favorites",
        }
    }
}

/// State changes published to whoever renders the application
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppEvent {
    /// The persisted identity has been read; `user` is the restored session
    SessionLoaded { user: Option<String> },
    SessionChanged { user: Option<String> },
    ListsLoaded,
    ListChanged { list: ListKind, len: usize },
    /// A write to storage failed; memory and storage disagree until the next successful write
    PersistFailed { key: String, error: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Arc<dyn Fn(&AppEvent) + Send + Sync>;

/// Synchronous publish/subscribe hub
///
/// Handlers run on the emitting task, in subscription order. A panicking
/// handler is logged and does not stop the others.
#[derive(Clone, Default)]
pub struct EventBus {
    handlers: Arc<RwLock<Vec<(SubscriptionId, Handler)>>>,
    next_id: Arc<AtomicU64>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&AppEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push((id, Arc::new(handler)));
        id
    }

    /// Returns false if the subscription was already gone
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.write().unwrap_or_else(|e| e.into_inner());
        let before = handlers.len();
        handlers.retain(|(existing, _)| *existing != id);
        handlers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn emit(&self, event: AppEvent) {
        // Snapshot so handlers may subscribe/unsubscribe without deadlocking
        let handlers: Vec<Handler> = self
            .handlers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(_, h)| h.clone())
            .collect();

        debug!(event = ?event, handlers = handlers.len(), "Emitting event");

        for (idx, handler) in handlers.iter().enumerate() {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| handler(&event)));
            if result.is_err() {
                error!(handler = idx, event = ?event, "Event handler panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_handlers_run_in_subscription_order() {
        let bus = EventBus::new();
        let sequence = Arc::new(Mutex::new(Vec::new()));

        for n in 1..=3 {
            let seq = sequence.clone();
            bus.subscribe(move |_| seq.lock().unwrap().push(n));
        }

        bus.emit(AppEvent::ListsLoaded);
        assert_eq!(*sequence.lock().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let seen_clone = seen.clone();
        let id = bus.subscribe(move |event| seen_clone.lock().unwrap().push(event.clone()));

        bus.emit(AppEvent::SessionChanged { user: Some("a@b.com".to_string()) });
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.emit(AppEvent::SessionChanged { user: None });

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_panicking_handler_does_not_block_others() {
        let bus = EventBus::new();
        let delivered = Arc::new(Mutex::new(0));

        bus.subscribe(|_| panic!("handler failure"));
        let delivered_clone = delivered.clone();
        bus.subscribe(move |_| *delivered_clone.lock().unwrap() += 1);

        bus.emit(AppEvent::ListsLoaded);
        assert_eq!(*delivered.lock().unwrap(), 1);
    }

    #[test]
    fn test_event_json_shape() {
        let event = AppEvent::ListChanged {
            list: ListKind::WantToWatch,
            len: 0,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "list_changed");
        assert_eq!(json["list"], "want_to_watch");
        assert_eq!(json["len"], 0);
    }
}
