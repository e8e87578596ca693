use crate::events::{AppEvent, EventBus};
use crate::storage::{keys, load_json, save_json, KeyValueStore, StorageError};
use crate::validation::{validate_email, validate_password, ValidationError};
use cinevault_models::Credential;
use serde::Serialize;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, error, info, warn};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginOutcome {
    Success,
    /// Nobody has registered on this device
    NoAccount,
    InvalidCredentials,
}

#[derive(Debug)]
struct SessionState {
    user: Option<String>,
    is_loading: bool,
}

/// Local single-account identity
///
/// The account is one credential record; the session is the `user` key.
pub struct SessionManager {
    store: Arc<dyn KeyValueStore>,
    events: EventBus,
    state: RwLock<SessionState>,
    initialized: OnceCell<()>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn KeyValueStore>, events: EventBus) -> Self {
        Self {
            store,
            events,
            state: RwLock::new(SessionState {
                user: None,
                is_loading: true,
            }),
            initialized: OnceCell::new(),
        }
    }

    /// Restore the persisted session; runs once, later calls return immediately
    pub async fn initialize(&self) {
        self.initialized
            .get_or_init(|| async {
                let user = match self.store.get(keys::USER).await {
                    Ok(user) => user.filter(|u| !u.is_empty()),
                    Err(e) => {
                        error!("Failed to restore session: {}", e);
                        None
                    }
                };
                match &user {
                    Some(user) => info!(user = %user, "Restored session"),
                    None => debug!("No saved session"),
                }
                {
                    let mut state = self.write_state();
                    state.user = user.clone();
                    state.is_loading = false;
                }
                self.events.emit(AppEvent::SessionLoaded { user });
            })
            .await;
    }

    /// Create the device account, replacing any existing one, and sign in
    pub async fn register(&self, email: &str, password: &str) -> Result<(), SessionError> {
        validate_email(email)?;
        validate_password(password)?;

        let credential = Credential::new(email, password);
        save_json(self.store.as_ref(), keys::CREDENTIALS, &credential).await?;
        self.store.set(keys::USER, email).await?;

        info!(user = %email, "Registered account");
        self.set_user(Some(email.to_string()));
        Ok(())
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, SessionError> {
        let credential: Option<Credential> = load_json(self.store.as_ref(), keys::CREDENTIALS).await?;

        let outcome = match credential {
            None => LoginOutcome::NoAccount,
            Some(credential) if credential.matches(email, password) => LoginOutcome::Success,
            Some(_) => LoginOutcome::InvalidCredentials,
        };

        match outcome {
            LoginOutcome::Success => {
                if let Err(e) = self.store.set(keys::USER, email).await {
                    warn!("Signed in but could not persist session: {}", e);
                    self.events.emit(AppEvent::PersistFailed {
                        key: keys::USER.to_string(),
                        error: e.to_string(),
                    });
                }
                info!(user = %email, "Signed in");
                self.set_user(Some(email.to_string()));
            }
            LoginOutcome::NoAccount => debug!("Login attempted with no registered account"),
            LoginOutcome::InvalidCredentials => debug!(user = %email, "Login rejected"),
        }
        Ok(outcome)
    }

    /// Always ends signed out, even when the stored session cannot be removed
    pub async fn logout(&self) {
        if let Err(e) = self.store.remove(keys::USER).await {
            warn!("Failed to remove stored session: {}", e);
            self.events.emit(AppEvent::PersistFailed {
                key: keys::USER.to_string(),
                error: e.to_string(),
            });
        }
        info!("Signed out");
        self.set_user(None);
    }

    pub fn current_user(&self) -> Option<String> {
        self.read_state().user.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.read_state().is_loading
    }

    pub fn is_authenticated(&self) -> bool {
        self.read_state().user.is_some()
    }

    fn set_user(&self, user: Option<String>) {
        self.write_state().user = user.clone();
        self.events.emit(AppEvent::SessionChanged { user });
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_store::MemoryStore;
    use std::sync::Mutex;

    fn manager() -> (SessionManager, Arc<MemoryStore>, Arc<Mutex<Vec<AppEvent>>>) {
        let store = Arc::new(MemoryStore::new());
        let events = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        events.subscribe(move |event| seen_clone.lock().unwrap().push(event.clone()));
        (SessionManager::new(store.clone(), events), store, seen)
    }

    #[tokio::test]
    async fn test_initial_state_is_loading() {
        let (session, _, _) = manager();
        assert!(session.is_loading());
        assert!(!session.is_authenticated());

        session.initialize().await;
        assert!(!session.is_loading());
        assert_eq!(session.current_user(), None);
    }

    #[tokio::test]
    async fn test_initialize_restores_user_once() {
        let (session, store, seen) = manager();
        store.set(keys::USER, "a@b.com").await.unwrap();

        session.initialize().await;
        assert_eq!(session.current_user().as_deref(), Some("a@b.com"));

        store.remove(keys::USER).await.unwrap();
        session.initialize().await;
        assert_eq!(session.current_user().as_deref(), Some("a@b.com"));

        let loaded = seen
            .lock()
            .unwrap()
            .iter()
            .filter(|e| matches!(e, AppEvent::SessionLoaded { .. }))
            .count();
        assert_eq!(loaded, 1);
    }

    #[tokio::test]
    async fn test_credential_gate() {
        let (session, _, _) = manager();
        session.initialize().await;

        assert_eq!(session.login("a@b.com", "secret1").await.unwrap(), LoginOutcome::NoAccount);

        session.register("a@b.com", "secret1").await.unwrap();
        assert_eq!(session.current_user().as_deref(), Some("a@b.com"));

        session.logout().await;
        assert_eq!(session.current_user(), None);

        assert_eq!(
            session.login("a@b.com", "secret2").await.unwrap(),
            LoginOutcome::InvalidCredentials
        );
        assert_eq!(session.current_user(), None);

        assert_eq!(
            session.login("A@b.com", "secret1").await.unwrap(),
            LoginOutcome::InvalidCredentials
        );

        assert_eq!(session.login("a@b.com", "secret1").await.unwrap(), LoginOutcome::Success);
        assert_eq!(session.current_user().as_deref(), Some("a@b.com"));
    }

    #[tokio::test]
    async fn test_register_replaces_the_account() {
        let (session, _, _) = manager();
        session.register("a@b.com", "secret1").await.unwrap();
        session.register("c@d.org", "secret2").await.unwrap();
        session.logout().await;

        assert_eq!(
            session.login("a@b.com", "secret1").await.unwrap(),
            LoginOutcome::InvalidCredentials
        );
        assert_eq!(session.login("c@d.org", "secret2").await.unwrap(), LoginOutcome::Success);
    }

    #[tokio::test]
    async fn test_register_validates_before_writing() {
        let (session, store, _) = manager();

        let err = session.register("not-an-email", "secret1").await.unwrap_err();
        assert!(matches!(err, SessionError::Validation(ValidationError::InvalidEmail(_))));

        let err = session.register("a@b.com", "12345").await.unwrap_err();
        assert!(matches!(err, SessionError::Validation(ValidationError::PasswordTooShort)));

        assert!(store.snapshot(keys::CREDENTIALS).is_none());
        assert!(store.snapshot(keys::USER).is_none());
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_session_persists_across_managers() {
        let store = Arc::new(MemoryStore::new());
        {
            let session = SessionManager::new(store.clone(), EventBus::new());
            session.register("a@b.com", "secret1").await.unwrap();
        }

        let session = SessionManager::new(store, EventBus::new());
        session.initialize().await;
        assert_eq!(session.current_user().as_deref(), Some("a@b.com"));
    }

    #[tokio::test]
    async fn test_logout_swallows_storage_failure() {
        let (session, store, seen) = manager();
        session.register("a@b.com", "secret1").await.unwrap();
        store.fail_writes_to(keys::USER);

        session.logout().await;

        assert!(!session.is_authenticated());
        assert!(seen
            .lock()
            .unwrap()
            .iter()
            .any(|e| matches!(e, AppEvent::PersistFailed { key, .. } if key == keys::USER)));
    }

    #[tokio::test]
    async fn test_identity_changes_are_announced() {
        let (session, _, seen) = manager();
        session.register("a@b.com", "secret1").await.unwrap();
        session.logout().await;

        let changes: Vec<Option<String>> = seen
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                AppEvent::SessionChanged { user } => Some(user.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(changes, vec![Some("a@b.com".to_string()), None]);
    }
}
