//! Conversation persistence.
//!
//! `ConversationStore` is the seam between the conversation loop and storage.
//! `MemoryStore` backs tests and ephemeral runs; `FileStore` persists each
//! session as a JSON file under the data directory and keeps a write-through
//! cache in memory.

mod types;

pub use types::{Role, Session, Turn};

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{OrbitError, Result};

/// Storage seam for sessions and their turn history.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Create a new session, returning its id.
    async fn create_session(&self, user_id: Option<&str>) -> Result<String>;

    /// Look up a session by id.
    async fn get_session(&self, session_id: &str) -> Result<Option<Session>>;

    /// Fetch the session, creating an anonymous one under this id if absent.
    async fn get_or_create_session(&self, session_id: &str) -> Result<Session>;

    /// Attach a user to an existing session.
    async fn link_session_to_user(&self, session_id: &str, user_id: &str) -> Result<()>;

    /// Mark a session inactive. Linked user identity is kept but no longer resolves.
    async fn end_session(&self, session_id: &str) -> Result<()>;

    /// Append one turn to the session history.
    async fn append_turn(
        &self,
        session_id: &str,
        role: Role,
        content: &str,
        intent: Option<&str>,
        route: Option<&str>,
    ) -> Result<()>;

    /// The most recent `limit` turns, in chronological order.
    async fn get_recent_turns(&self, session_id: &str, limit: usize) -> Result<Vec<Turn>>;

    /// Resolve the authenticated user for a session. Inactive or unknown
    /// sessions resolve to anonymous.
    async fn get_session_user(&self, session_id: &str) -> Result<Option<String>> {
        match self.get_session(session_id).await? {
            Some(session) if session.active => Ok(session.user_id),
            _ => Ok(None),
        }
    }
}

/// One session plus its full history, as persisted to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionRecord {
    session: Session,
    turns: Vec<Turn>,
}

impl SessionRecord {
    fn new(session: Session) -> Self {
        Self {
            session,
            turns: Vec::new(),
        }
    }
}

/// In-memory store. State is lost on drop.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, SessionRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_record<T>(
        &self,
        session_id: &str,
        f: impl FnOnce(&mut SessionRecord) -> T,
    ) -> Result<T> {
        let mut records = self
            .records
            .write()
            .map_err(|_| OrbitError::Store("session store lock poisoned".to_string()))?;
        let record = records
            .get_mut(session_id)
            .ok_or_else(|| OrbitError::NotFound(format!("session {session_id}")))?;
        Ok(f(record))
    }
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn create_session(&self, user_id: Option<&str>) -> Result<String> {
        let session = Session::generate(user_id);
        let id = session.id.clone();
        let mut records = self
            .records
            .write()
            .map_err(|_| OrbitError::Store("session store lock poisoned".to_string()))?;
        records.insert(id.clone(), SessionRecord::new(session));
        Ok(id)
    }

    async fn get_session(&self, session_id: &str) -> Result<Option<Session>> {
        let records = self
            .records
            .read()
            .map_err(|_| OrbitError::Store("session store lock poisoned".to_string()))?;
        Ok(records.get(session_id).map(|r| r.session.clone()))
    }

    async fn get_or_create_session(&self, session_id: &str) -> Result<Session> {
        let mut records = self
            .records
            .write()
            .map_err(|_| OrbitError::Store("session store lock poisoned".to_string()))?;
        let record = records
            .entry(session_id.to_string())
            .or_insert_with(|| SessionRecord::new(Session::new(session_id, None)));
        Ok(record.session.clone())
    }

    async fn link_session_to_user(&self, session_id: &str, user_id: &str) -> Result<()> {
        self.with_record(session_id, |record| {
            record.session.user_id = Some(user_id.to_string());
            record.session.active = true;
            record.session.last_active = Utc::now();
        })
    }

    async fn end_session(&self, session_id: &str) -> Result<()> {
        self.with_record(session_id, |record| {
            record.session.active = false;
            record.session.last_active = Utc::now();
        })
    }

    async fn append_turn(
        &self,
        session_id: &str,
        role: Role,
        content: &str,
        intent: Option<&str>,
        route: Option<&str>,
    ) -> Result<()> {
        self.with_record(session_id, |record| {
            record
                .turns
                .push(Turn::new(session_id, role, content, intent, route));
            record.session.last_active = Utc::now();
        })
    }

    async fn get_recent_turns(&self, session_id: &str, limit: usize) -> Result<Vec<Turn>> {
        let records = self
            .records
            .read()
            .map_err(|_| OrbitError::Store("session store lock poisoned".to_string()))?;
        Ok(records
            .get(session_id)
            .map(|r| tail(&r.turns, limit))
            .unwrap_or_default())
    }
}

/// File-backed store: one JSON document per session, plus an in-memory
/// write-through cache.
pub struct FileStore {
    dir: PathBuf,
    cache: RwLock<HashMap<String, SessionRecord>>,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `dir`.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            cache: RwLock::new(HashMap::new()),
        })
    }

    fn record_path(&self, session_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key(session_id)))
    }

    fn load_record(&self, session_id: &str) -> Result<Option<SessionRecord>> {
        {
            let cache = self
                .cache
                .read()
                .map_err(|_| OrbitError::Store("session cache lock poisoned".to_string()))?;
            if let Some(record) = cache.get(session_id) {
                return Ok(Some(record.clone()));
            }
        }
        let path = self.record_path(session_id);
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path)?;
        match serde_json::from_str::<SessionRecord>(&contents) {
            Ok(record) => {
                let mut cache = self
                    .cache
                    .write()
                    .map_err(|_| OrbitError::Store("session cache lock poisoned".to_string()))?;
                cache.insert(session_id.to_string(), record.clone());
                Ok(Some(record))
            }
            Err(err) => {
                warn!(session = %session_id, error = %err, "corrupt session file, ignoring");
                Ok(None)
            }
        }
    }

    fn save_record(&self, record: SessionRecord) -> Result<()> {
        let path = self.record_path(&record.session.id);
        let json = serde_json::to_string_pretty(&record)?;
        std::fs::write(&path, json)?;
        debug!(session = %record.session.id, turns = record.turns.len(), "session saved");
        let mut cache = self
            .cache
            .write()
            .map_err(|_| OrbitError::Store("session cache lock poisoned".to_string()))?;
        cache.insert(record.session.id.clone(), record);
        Ok(())
    }

    fn update_record(
        &self,
        session_id: &str,
        f: impl FnOnce(&mut SessionRecord),
    ) -> Result<()> {
        let mut record = self
            .load_record(session_id)?
            .ok_or_else(|| OrbitError::NotFound(format!("session {session_id}")))?;
        f(&mut record);
        self.save_record(record)
    }
}

#[async_trait]
impl ConversationStore for FileStore {
    async fn create_session(&self, user_id: Option<&str>) -> Result<String> {
        let session = Session::generate(user_id);
        let id = session.id.clone();
        self.save_record(SessionRecord::new(session))?;
        Ok(id)
    }

    async fn get_session(&self, session_id: &str) -> Result<Option<Session>> {
        Ok(self.load_record(session_id)?.map(|r| r.session))
    }

    async fn get_or_create_session(&self, session_id: &str) -> Result<Session> {
        if let Some(record) = self.load_record(session_id)? {
            return Ok(record.session);
        }
        let session = Session::new(session_id, None);
        self.save_record(SessionRecord::new(session.clone()))?;
        Ok(session)
    }

    async fn link_session_to_user(&self, session_id: &str, user_id: &str) -> Result<()> {
        self.update_record(session_id, |record| {
            record.session.user_id = Some(user_id.to_string());
            record.session.active = true;
            record.session.last_active = Utc::now();
        })
    }

    async fn end_session(&self, session_id: &str) -> Result<()> {
        self.update_record(session_id, |record| {
            record.session.active = false;
            record.session.last_active = Utc::now();
        })
    }

    async fn append_turn(
        &self,
        session_id: &str,
        role: Role,
        content: &str,
        intent: Option<&str>,
        route: Option<&str>,
    ) -> Result<()> {
        self.update_record(session_id, |record| {
            record
                .turns
                .push(Turn::new(session_id, role, content, intent, route));
            record.session.last_active = Utc::now();
        })
    }

    async fn get_recent_turns(&self, session_id: &str, limit: usize) -> Result<Vec<Turn>> {
        Ok(self
            .load_record(session_id)?
            .map(|r| tail(&r.turns, limit))
            .unwrap_or_default())
    }
}

fn tail(turns: &[Turn], limit: usize) -> Vec<Turn> {
    let start = turns.len().saturating_sub(limit);
    turns[start..].to_vec()
}

/// Restrict session ids to filesystem-safe characters.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
