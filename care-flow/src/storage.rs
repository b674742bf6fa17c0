use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

use crate::{error::Result, session::SessionState};

/// Trait for storing and retrieving sessions
///
/// Implementations only need to make a single `save` visible atomically;
/// callers do load, modify, save without any cross-request locking.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    async fn save(&self, session: SessionState) -> Result<()>;
    async fn get(&self, id: &str) -> Result<Option<SessionState>>;

    /// Loads a session, creating and storing a fresh one on first reference.
    async fn get_or_create(&self, id: &str) -> Result<SessionState> {
        if let Some(session) = self.get(id).await? {
            return Ok(session);
        }
        let session = SessionState::new(id);
        self.save(session.clone()).await?;
        Ok(session)
    }
}

/// In-memory implementation of SessionStorage
///
/// Sessions live until the process exits; there is no removal operation.
#[derive(Clone, Default)]
pub struct InMemorySessionStorage {
    sessions: Arc<DashMap<String, SessionState>>,
}

impl InMemorySessionStorage {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl SessionStorage for InMemorySessionStorage {
    async fn save(&self, session: SessionState) -> Result<()> {
        self.sessions.insert(session.id.clone(), session);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<SessionState>> {
        Ok(self.sessions.get(id).map(|entry| entry.clone()))
    }

    async fn get_or_create(&self, id: &str) -> Result<SessionState> {
        Ok(self
            .sessions
            .entry(id.to_string())
            .or_insert_with(|| SessionState::new(id))
            .clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_and_get() {
        let storage = InMemorySessionStorage::new();
        let mut session = SessionState::new("session1");
        session.fall.running = true;

        storage.save(session).await.unwrap();
        let retrieved = storage.get("session1").await.unwrap();
        assert!(retrieved.is_some_and(|s| s.fall.running));
        assert!(storage.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_or_create_is_stable() {
        let storage = InMemorySessionStorage::new();

        let first = storage.get_or_create("abc").await.unwrap();
        let second = storage.get_or_create("abc").await.unwrap();

        assert_eq!(first.id, "abc");
        assert_eq!(first.created_at, second.created_at);
        assert_eq!(storage.len(), 1);
    }

    #[tokio::test]
    async fn test_save_replaces_existing_session() {
        let storage = InMemorySessionStorage::new();
        let mut session = storage.get_or_create("kept").await.unwrap();
        session.fall.running = true;
        storage.save(session).await.unwrap();

        assert_eq!(storage.len(), 1);
        assert!(storage.get("kept").await.unwrap().is_some_and(|s| s.fall.running));
    }

    struct PlainStorage(InMemorySessionStorage);

    #[async_trait]
    impl SessionStorage for PlainStorage {
        async fn save(&self, session: SessionState) -> Result<()> {
            self.0.save(session).await
        }
        async fn get(&self, id: &str) -> Result<Option<SessionState>> {
            self.0.get(id).await
        }
    }

    #[tokio::test]
    async fn test_default_get_or_create_persists() {
        let storage = PlainStorage(InMemorySessionStorage::new());
        storage.get_or_create("fresh").await.unwrap();
        assert!(storage.get("fresh").await.unwrap().is_some());
    }
}
