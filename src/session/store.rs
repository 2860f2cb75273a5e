//! Durable chat session storage.
//!
//! Sessions are held in memory and mirrored into a key-value table:
//! one row per session id holding that session's serialized message
//! log, plus a row under a fixed key holding the serialized session
//! index. Every write replaces the whole row for the affected key so
//! reads always see the last completed write.

use rusqlite::OptionalExtension;
use thiserror::Error;
use tokio_rusqlite::Connection;
use uuid::Uuid;

use super::models::{Message, Session, SessionMeta};
use crate::core::db::initialize_db;

const INDEX_KEY: &str = "sessions";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session {0} not found")]
    SessionNotFound(String),
    #[error(transparent)]
    Db(#[from] tokio_rusqlite::Error),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

pub struct SessionStore {
    db: Connection,
    sessions: Vec<Session>,
    active: Option<String>,
}

impl SessionStore {
    /// Open the store, creating the schema if needed and loading the
    /// index and every session log into memory. The first session in
    /// index order starts out active.
    pub async fn open(db: Connection) -> Result<Self, StoreError> {
        db.call(|conn| {
            initialize_db(conn)?;
            Ok(())
        })
        .await?;

        let index_data = read_key(&db, INDEX_KEY).await?;
        let index: Vec<SessionMeta> = match index_data {
            Some(data) => serde_json::from_str(&data)?,
            None => Vec::new(),
        };

        let mut sessions = Vec::with_capacity(index.len());
        for meta in index {
            let messages = match read_key(&db, &meta.id).await? {
                Some(data) => serde_json::from_str(&data)?,
                None => Vec::new(),
            };
            sessions.push(Session { meta, messages });
        }

        let active = sessions.first().map(|s| s.meta.id.clone());

        Ok(Self {
            db,
            sessions,
            active,
        })
    }

    /// Current index, in creation order.
    pub fn list(&self) -> Vec<SessionMeta> {
        self.sessions.iter().map(|s| s.meta.clone()).collect()
    }

    pub fn get(&self, id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.meta.id == id)
    }

    pub fn messages(&self, id: &str) -> Option<&[Message]> {
        self.get(id).map(|s| s.messages.as_slice())
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn active(&self) -> Option<&Session> {
        self.get(self.active.as_deref()?)
    }

    /// Create a session with a fresh id and an empty log. The new
    /// session becomes active.
    pub async fn create(&mut self, label: &str) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        let meta = SessionMeta {
            id: id.clone(),
            display_label: label.to_string(),
        };
        self.sessions.push(Session {
            meta,
            messages: Vec::new(),
        });
        self.active = Some(id.clone());

        let index = serde_json::to_string(&self.list())?;
        let session_id = id.clone();
        self.db
            .call(move |conn| {
                let tx = conn.transaction()?;
                tx.execute(
                    "INSERT OR REPLACE INTO kv (key, data) VALUES (?, ?)",
                    [INDEX_KEY.to_string(), index],
                )?;
                tx.execute(
                    "INSERT OR REPLACE INTO kv (key, data) VALUES (?, ?)",
                    [session_id, "[]".to_string()],
                )?;
                tx.commit()?;
                Ok(())
            })
            .await?;

        Ok(id)
    }

    /// Point the active session at `id`. State is left untouched when
    /// the id is unknown.
    pub fn activate(&mut self, id: &str) -> Result<(), StoreError> {
        if self.get(id).is_none() {
            return Err(StoreError::SessionNotFound(id.to_string()));
        }
        self.active = Some(id.to_string());
        Ok(())
    }

    /// Remove a session and discard its log. Absent ids are ignored.
    /// When the active session is deleted the first remaining index
    /// entry becomes active, or none when the store is empty.
    pub async fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        if self.get(id).is_none() {
            return Ok(());
        }
        self.sessions.retain(|s| s.meta.id != id);
        if self.active.as_deref() == Some(id) {
            self.active = self.sessions.first().map(|s| s.meta.id.clone());
        }

        let index = serde_json::to_string(&self.list())?;
        let session_id = id.to_string();
        self.db
            .call(move |conn| {
                let tx = conn.transaction()?;
                tx.execute(
                    "INSERT OR REPLACE INTO kv (key, data) VALUES (?, ?)",
                    [INDEX_KEY.to_string(), index],
                )?;
                tx.execute("DELETE FROM kv WHERE key = ?", [session_id])?;
                tx.commit()?;
                Ok(())
            })
            .await?;

        Ok(())
    }

    /// Append a message to a session's log and persist the full
    /// updated log.
    pub async fn append_message(&mut self, id: &str, msg: Message) -> Result<(), StoreError> {
        let session = self
            .sessions
            .iter_mut()
            .find(|s| s.meta.id == id)
            .ok_or_else(|| StoreError::SessionNotFound(id.to_string()))?;
        session.messages.push(msg);

        let log = serde_json::to_string(&session.messages)?;
        let session_id = id.to_string();
        self.db
            .call(move |conn| {
                conn.execute(
                    "INSERT OR REPLACE INTO kv (key, data) VALUES (?, ?)",
                    [session_id, log],
                )?;
                Ok(())
            })
            .await?;

        Ok(())
    }
}

async fn read_key(db: &Connection, key: &str) -> Result<Option<String>, tokio_rusqlite::Error> {
    let key = key.to_string();
    db.call(move |conn| {
        let mut stmt = conn.prepare("SELECT data FROM kv WHERE key = ?")?;
        let data = stmt.query_row([key], |row| row.get(0)).optional()?;
        Ok(data)
    })
    .await
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::core::db::async_db;
    use crate::session::Role;

    async fn open_store(dir: &TempDir) -> SessionStore {
        let db = async_db(dir.path().to_str().unwrap())
            .await
            .expect("Failed to connect to async db");
        SessionStore::open(db).await.expect("Failed to open store")
    }

    /// Reload the store from disk and return the ids in the durable
    /// index.
    async fn durable_ids(dir: &TempDir) -> Vec<String> {
        let store = open_store(dir).await;
        store.list().into_iter().map(|m| m.id).collect()
    }

    #[tokio::test]
    async fn it_keeps_the_durable_index_in_sync_with_memory() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir).await;

        let a = store.create("Chat A").await.unwrap();
        assert_eq!(durable_ids(&dir).await, vec![a.clone()]);

        let b = store.create("Chat B").await.unwrap();
        assert_eq!(durable_ids(&dir).await, vec![a.clone(), b.clone()]);

        store.delete(&a).await.unwrap();
        assert_eq!(durable_ids(&dir).await, vec![b.clone()]);

        store.delete(&b).await.unwrap();
        assert!(durable_ids(&dir).await.is_empty());
    }

    #[tokio::test]
    async fn it_activates_new_sessions() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir).await;
        assert!(store.active_id().is_none());

        let a = store.create("Chat A").await.unwrap();
        assert_eq!(store.active_id(), Some(a.as_str()));

        let b = store.create("Chat B").await.unwrap();
        assert_eq!(store.active_id(), Some(b.as_str()));
    }

    #[tokio::test]
    async fn it_reassigns_active_when_the_active_session_is_deleted() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir).await;

        let a = store.create("Chat A").await.unwrap();
        let b = store.create("Chat B").await.unwrap();
        let c = store.create("Chat C").await.unwrap();

        // Deleting the active session falls back to the first
        // remaining index entry
        store.delete(&c).await.unwrap();
        assert_eq!(store.active_id(), Some(a.as_str()));

        // Deleting a non-active session leaves the pointer alone
        store.delete(&b).await.unwrap();
        assert_eq!(store.active_id(), Some(a.as_str()));

        store.delete(&a).await.unwrap();
        assert!(store.active_id().is_none());
    }

    #[tokio::test]
    async fn it_reports_missing_sessions() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir).await;

        assert!(matches!(
            store.activate("nope"),
            Err(StoreError::SessionNotFound(_))
        ));
        // Deleting an unknown id is a no-op
        assert!(store.delete("nope").await.is_ok());
        assert!(matches!(
            store
                .append_message("nope", Message::new(Role::User, "hola"))
                .await,
            Err(StoreError::SessionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn it_round_trips_message_logs() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir).await;

        let id = store.create("Chat A").await.unwrap();
        let first = Message {
            role: Role::User,
            content: "hola".to_string(),
            timestamp: "14:05".to_string(),
        };
        let second = Message {
            role: Role::Assistant,
            content: "hola, como estas".to_string(),
            timestamp: "14:06".to_string(),
        };
        store.append_message(&id, first.clone()).await.unwrap();
        store.append_message(&id, second.clone()).await.unwrap();

        let reloaded = open_store(&dir).await;
        assert_eq!(reloaded.messages(&id).unwrap(), &[first, second]);
        // The first index entry starts out active after a reload
        assert_eq!(reloaded.active_id(), Some(id.as_str()));
    }
}
