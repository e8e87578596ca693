pub mod app;
pub mod catalog;
pub mod events;
pub mod file_store;
pub mod lists;
pub mod memory_store;
pub mod session;
pub mod storage;
pub mod validation;

pub use app::{App, AppError};
pub use catalog::{default_cache_ttl, CatalogService, DEFAULT_POPULAR_LIMIT};
pub use events::{AppEvent, EventBus, ListKind, SubscriptionId};
pub use file_store::FileStore;
pub use lists::ListManager;
pub use memory_store::MemoryStore;
pub use session::{LoginOutcome, SessionError, SessionManager};
pub use storage::{keys, load_json, save_json, KeyValueStore, StorageError};
pub use validation::{parse_rating, validate_email, validate_password, validate_query, ValidationError, MIN_PASSWORD_LEN};
