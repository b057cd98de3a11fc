use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::errors::SessionError;
use crate::utils::gen_random_string;

/// Transient per-browser-session key/value storage surviving across the
/// connect → callback → finalize sequence. Implemented by the host
/// application; an in-memory implementation ships for demos and tests.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Ensure the session exists before reading or writing it.
    async fn start(&self, session_id: &str) -> Result<(), SessionError>;

    async fn get(&self, session_id: &str, key: &str) -> Result<Option<String>, SessionError>;

    async fn set(&self, session_id: &str, key: &str, value: String) -> Result<(), SessionError>;

    async fn unset(&self, session_id: &str, key: &str) -> Result<(), SessionError>;

    /// Move the session's data under a fresh identifier and return it. Called
    /// on login to defeat session fixation.
    async fn regenerate_id(&self, session_id: &str) -> Result<String, SessionError>;
}

/// HashMap-backed [`SessionStore`].
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<String, HashMap<String, String>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        tracing::info!("Creating new in-memory session store");
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn start(&self, session_id: &str) -> Result<(), SessionError> {
        self.sessions
            .lock()
            .unwrap()
            .entry(session_id.to_string())
            .or_default();
        Ok(())
    }

    async fn get(&self, session_id: &str, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .get(session_id)
            .and_then(|data| data.get(key).cloned()))
    }

    async fn set(&self, session_id: &str, key: &str, value: String) -> Result<(), SessionError> {
        self.sessions
            .lock()
            .unwrap()
            .entry(session_id.to_string())
            .or_default()
            .insert(key.to_string(), value);
        Ok(())
    }

    async fn unset(&self, session_id: &str, key: &str) -> Result<(), SessionError> {
        if let Some(data) = self.sessions.lock().unwrap().get_mut(session_id) {
            data.remove(key);
        }
        Ok(())
    }

    async fn regenerate_id(&self, session_id: &str) -> Result<String, SessionError> {
        let new_id = gen_random_string(32)?;
        let mut sessions = self.sessions.lock().unwrap();
        let data = sessions.remove(session_id).unwrap_or_default();
        sessions.insert(new_id.clone(), data);
        Ok(new_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_unset() {
        let store = InMemorySessionStore::new();
        store.start("s1").await.unwrap();

        store.set("s1", "k", "v".to_string()).await.unwrap();
        assert_eq!(store.get("s1", "k").await.unwrap().as_deref(), Some("v"));

        store.unset("s1", "k").await.unwrap();
        assert_eq!(store.get("s1", "k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = InMemorySessionStore::new();
        store.set("s1", "k", "one".to_string()).await.unwrap();
        store.set("s2", "k", "two".to_string()).await.unwrap();

        assert_eq!(store.get("s1", "k").await.unwrap().as_deref(), Some("one"));
        assert_eq!(store.get("s2", "k").await.unwrap().as_deref(), Some("two"));
    }

    #[tokio::test]
    async fn test_regenerate_id_carries_data_and_drops_old_id() {
        let store = InMemorySessionStore::new();
        store.set("s1", "k", "v".to_string()).await.unwrap();

        let new_id = store.regenerate_id("s1").await.unwrap();
        assert_ne!(new_id, "s1");
        assert_eq!(store.get(&new_id, "k").await.unwrap().as_deref(), Some("v"));
        assert_eq!(store.get("s1", "k").await.unwrap(), None);
    }
}
