//! crates/studio_booking_core/src/session.rs
//!
//! The client-held session: who is signed in right now. The in-memory value
//! is authoritative; the copy in the local store only exists so a restart
//! can pick the session back up without signing in again.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::{info, warn};

use crate::domain::{SessionUser, User};
use crate::ports::LocalStore;

/// Key holding the serialized session user.
pub const USER_KEY: &str = "user";
/// Keys written by earlier releases. Removed on logout.
pub const LEGACY_KEYS: [&str; 2] = ["userId", "userName"];

pub struct SessionStore {
    current: Mutex<Option<SessionUser>>,
    local: Arc<dyn LocalStore>,
}

impl SessionStore {
    /// Creates a signed-out session store backed by `local`.
    pub fn new(local: Arc<dyn LocalStore>) -> Self {
        Self {
            current: Mutex::new(None),
            local,
        }
    }

    /// Adopts the persisted session, if there is a readable one.
    pub async fn restore(&self) -> Option<SessionUser> {
        let raw = match self.local.get(USER_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Failed to read persisted session: {}", e);
                return None;
            }
        };
        match serde_json::from_str::<SessionUser>(&raw) {
            Ok(user) => {
                info!("Restored session for user {}", user.id);
                self.set_current(Some(user.clone()));
                Some(user)
            }
            Err(e) => {
                warn!("Ignoring unreadable persisted session: {}", e);
                None
            }
        }
    }

    /// Signs `user` in. The password never reaches the session.
    pub async fn login(&self, user: User) -> SessionUser {
        let session_user = SessionUser::from(user);
        self.set_current(Some(session_user.clone()));

        match serde_json::to_string(&session_user) {
            Ok(raw) => {
                if let Err(e) = self.local.set(USER_KEY, &raw).await {
                    warn!("Failed to persist session for user {}: {}", session_user.id, e);
                }
            }
            Err(e) => warn!("Failed to serialize session: {}", e),
        }
        session_user
    }

    pub async fn logout(&self) {
        self.set_current(None);

        let keys: Vec<String> = std::iter::once(USER_KEY)
            .chain(LEGACY_KEYS)
            .map(str::to_string)
            .collect();
        if let Err(e) = self.local.remove(&keys).await {
            warn!("Failed to clear persisted session: {}", e);
        }
    }

    pub fn current(&self) -> Option<SessionUser> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn set_current(&self, user: Option<SessionUser>) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = user;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{MockLocalStore, PortError};
    use mockall::predicate::eq;

    fn user() -> User {
        User {
            id: "-Nk1".to_string(),
            email: "mia@example.com".to_string(),
            name: "Mia".to_string(),
            password: "secret".to_string(),
            created_at: "2024-11-01T09:00:00.000Z".to_string(),
        }
    }

    #[tokio::test]
    async fn login_persists_user_without_password() {
        let mut local = MockLocalStore::new();
        local
            .expect_set()
            .withf(|key, value| key == USER_KEY && !value.contains("secret") && value.contains("-Nk1"))
            .times(1)
            .returning(|_, _| Ok(()));
        let store = SessionStore::new(Arc::new(local));

        let session = store.login(user()).await;

        assert!(store.is_authenticated());
        assert_eq!(session.id, "-Nk1");
        assert_eq!(store.current(), Some(session));
    }

    #[tokio::test]
    async fn persistence_failure_keeps_in_memory_session() {
        let mut local = MockLocalStore::new();
        local
            .expect_set()
            .returning(|_, _| Err(PortError::Unexpected("disk full".to_string())));
        let store = SessionStore::new(Arc::new(local));

        store.login(user()).await;

        assert!(store.is_authenticated());
    }

    #[tokio::test]
    async fn logout_clears_session_and_all_keys() {
        let mut local = MockLocalStore::new();
        local.expect_set().returning(|_, _| Ok(()));
        local
            .expect_remove()
            .withf(|keys| {
                keys.iter().map(String::as_str).collect::<Vec<_>>() == vec!["user", "userId", "userName"]
            })
            .times(1)
            .returning(|_| Err(PortError::Unexpected("locked".to_string())));
        let store = SessionStore::new(Arc::new(local));
        store.login(user()).await;

        store.logout().await;

        assert!(!store.is_authenticated());
        assert_eq!(store.current(), None);
    }

    #[tokio::test]
    async fn restore_adopts_persisted_user() {
        let persisted = serde_json::to_string(&SessionUser::from(user())).unwrap();
        let mut local = MockLocalStore::new();
        local
            .expect_get()
            .with(eq(USER_KEY))
            .returning(move |_| Ok(Some(persisted.clone())));
        let store = SessionStore::new(Arc::new(local));

        let restored = store.restore().await;

        assert_eq!(restored.map(|u| u.id), Some("-Nk1".to_string()));
        assert!(store.is_authenticated());
    }

    #[tokio::test]
    async fn restore_ignores_corrupt_data() {
        let mut local = MockLocalStore::new();
        local
            .expect_get()
            .returning(|_| Ok(Some("{not json".to_string())));
        let store = SessionStore::new(Arc::new(local));

        assert_eq!(store.restore().await, None);
        assert!(!store.is_authenticated());
    }
}
