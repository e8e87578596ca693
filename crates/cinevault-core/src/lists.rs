use crate::events::{AppEvent, EventBus, ListKind};
use crate::storage::{load_json, save_json, KeyValueStore};
use cinevault_models::{Movie, UserRating, WatchedMovie};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use tracing::{debug, error, info, warn};

trait ListEntry: Clone + Serialize + DeserializeOwned + Send + Sync {
    fn entry_id(&self) -> &str;
}

impl ListEntry for Movie {
    fn entry_id(&self) -> &str {
        &self.id
    }
}

impl ListEntry for WatchedMovie {
    fn entry_id(&self) -> &str {
        self.id()
    }
}

/// One persisted collection
///
/// `items` is the snapshot readers see; `gate` serializes the
/// read-modify-persist cycle of mutations.
struct Collection<T> {
    kind: ListKind,
    items: RwLock<Vec<T>>,
    gate: tokio::sync::Mutex<()>,
}

impl<T: ListEntry> Collection<T> {
    fn new(kind: ListKind) -> Self {
        Self {
            kind,
            items: RwLock::new(Vec::new()),
            gate: tokio::sync::Mutex::new(()),
        }
    }

    fn snapshot(&self) -> Vec<T> {
        self.items.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn contains(&self, id: &str) -> bool {
        self.items
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .any(|item| item.entry_id() == id)
    }

    fn replace(&self, items: Vec<T>) {
        *self.items.write().unwrap_or_else(|e| e.into_inner()) = items;
    }
}

/// The user's watched, want-to-watch and favorites lists
///
/// Each list is persisted under its own key. A failed write is reported as
/// [`AppEvent::PersistFailed`] but the in-memory list keeps the change, so
/// memory and storage disagree until the next successful write.
pub struct ListManager {
    store: Arc<dyn KeyValueStore>,
    events: EventBus,
    watched: Collection<WatchedMovie>,
    want_to_watch: Collection<Movie>,
    favorites: Collection<Movie>,
    is_loading: AtomicBool,
}

impl ListManager {
    pub fn new(store: Arc<dyn KeyValueStore>, events: EventBus) -> Self {
        Self {
            store,
            events,
            watched: Collection::new(ListKind::Watched),
            want_to_watch: Collection::new(ListKind::WantToWatch),
            favorites: Collection::new(ListKind::Favorites),
            is_loading: AtomicBool::new(true),
        }
    }

    /// Read every list from storage; unreadable lists start empty
    pub async fn load(&self) {
        self.load_collection(&self.watched).await;
        self.load_collection(&self.want_to_watch).await;
        self.load_collection(&self.favorites).await;
        self.is_loading.store(false, Ordering::SeqCst);
        self.events.emit(AppEvent::ListsLoaded);
    }

    async fn load_collection<T: ListEntry>(&self, collection: &Collection<T>) {
        let _gate = collection.gate.lock().await;
        let key = collection.kind.storage_key();
        let items = match load_json::<Vec<T>>(self.store.as_ref(), key).await {
            Ok(items) => items.unwrap_or_default(),
            Err(e) => {
                error!(key, "Failed to load {} list: {}", collection.kind.label(), e);
                Vec::new()
            }
        };
        debug!(key, count = items.len(), "Loaded {} list", collection.kind.label());
        collection.replace(items);
    }

    /// Apply `change` under the collection's gate, then persist and announce it
    ///
    /// Returns whatever `change` returned; `false` means nothing changed and
    /// nothing is written.
    async fn mutate<T, F>(&self, collection: &Collection<T>, change: F) -> bool
    where
        T: ListEntry,
        F: FnOnce(&mut Vec<T>) -> bool,
    {
        let _gate = collection.gate.lock().await;

        let mut items = collection.snapshot();
        if !change(&mut items) {
            return false;
        }
        collection.replace(items.clone());

        let key = collection.kind.storage_key();
        if let Err(e) = save_json(self.store.as_ref(), key, &items).await {
            warn!(key, "Failed to persist {} list: {}", collection.kind.label(), e);
            self.events.emit(AppEvent::PersistFailed {
                key: key.to_string(),
                error: e.to_string(),
            });
        }

        self.events.emit(AppEvent::ListChanged {
            list: collection.kind,
            len: items.len(),
        });
        true
    }

    /// Append to watched unless the id is already there
    pub async fn add_watched_movie(&self, movie: Movie, user_rating: UserRating) -> bool {
        let id = movie.id.clone();
        let added = self
            .mutate(&self.watched, |items| {
                if items.iter().any(|m| m.id() == movie.id) {
                    return false;
                }
                items.push(WatchedMovie::new(movie, user_rating));
                true
            })
            .await;
        if added {
            info!(id = %id, rating = %user_rating, "Marked as watched");
        }
        added
    }

    pub async fn remove_watched_movie(&self, id: &str) -> bool {
        self.mutate(&self.watched, |items| remove_all(items, id)).await
    }

    pub async fn update_watched_rating(&self, id: &str, user_rating: UserRating) -> bool {
        self.mutate(&self.watched, |items| {
            let mut changed = false;
            for entry in items.iter_mut().filter(|m| m.id() == id) {
                if entry.user_rating != user_rating {
                    entry.user_rating = user_rating;
                    changed = true;
                }
            }
            changed
        })
        .await
    }

    pub async fn add_want_to_watch_movie(&self, movie: Movie) -> bool {
        self.mutate(&self.want_to_watch, |items| push_unique(items, movie)).await
    }

    pub async fn remove_want_to_watch_movie(&self, id: &str) -> bool {
        self.mutate(&self.want_to_watch, |items| remove_all(items, id)).await
    }

    /// Remove from want-to-watch, then record as watched
    ///
    /// These are two separate writes. If the second one fails to persist the
    /// movie is in neither stored list, though memory has it as watched.
    /// When the movie is already watched only the removal happens.
    pub async fn move_from_want_to_watch_to_watched(&self, id: &str, movie: Movie, user_rating: UserRating) {
        self.remove_want_to_watch_movie(id).await;
        self.add_watched_movie(movie, user_rating).await;
        info!(id = %id, "Moved from want to watch to watched");
    }

    pub async fn add_favorite(&self, movie: Movie) -> bool {
        self.mutate(&self.favorites, |items| push_unique(items, movie)).await
    }

    pub async fn remove_favorite(&self, id: &str) -> bool {
        self.mutate(&self.favorites, |items| remove_all(items, id)).await
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.contains(id)
    }

    pub fn is_movie_watched(&self, id: &str) -> bool {
        self.watched.contains(id)
    }

    pub fn is_movie_want_to_watch(&self, id: &str) -> bool {
        self.want_to_watch.contains(id)
    }

    pub fn watched_movies(&self) -> Vec<WatchedMovie> {
        self.watched.snapshot()
    }

    pub fn want_to_watch_movies(&self) -> Vec<Movie> {
        self.want_to_watch.snapshot()
    }

    pub fn favorites(&self) -> Vec<Movie> {
        self.favorites.snapshot()
    }

    pub fn is_want_to_watch_empty(&self) -> bool {
        self.want_to_watch.items.read().unwrap_or_else(|e| e.into_inner()).is_empty()
    }

    pub fn is_watched_empty(&self) -> bool {
        self.watched.items.read().unwrap_or_else(|e| e.into_inner()).is_empty()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading.load(Ordering::SeqCst)
    }
}

fn push_unique(items: &mut Vec<Movie>, movie: Movie) -> bool {
    if items.iter().any(|m| m.id == movie.id) {
        return false;
    }
    items.push(movie);
    true
}

fn remove_all<T: ListEntry>(items: &mut Vec<T>, id: &str) -> bool {
    let before = items.len();
    items.retain(|item| item.entry_id() != id);
    items.len() != before
}
