//! Per-visitor session state
//!
//! Provides:
//! - `SessionContext`: pagination cursor and chat transcripts of one visitor
//! - `SessionStore`: id-keyed registry with lazy idle expiry

mod transcript;

pub use transcript::{EntryKind, Role, Transcript, TranscriptEntry};

use crate::metrics;
use crate::pagination::{PageWindow, PaginationCursor};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Which conversation a question belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChatScope {
    /// Questions about the whole dataset
    Dataset,
    /// Questions about one post, by identifier
    Post(String),
}

impl ChatScope {
    /// Metric and log label
    pub fn label(&self) -> &'static str {
        match self {
            ChatScope::Dataset => "dataset",
            ChatScope::Post(_) => "post",
        }
    }
}

/// State owned by one browser session
#[derive(Debug)]
pub struct SessionContext {
    id: Uuid,
    created_at: DateTime<Utc>,
    cursor: Option<PaginationCursor>,
    dataset_chat: Transcript,
    post_chats: HashMap<String, Transcript>,
}

/// Serializable view of a session
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub visible_posts: Option<usize>,
    pub dataset_chat: Transcript,
    pub post_chats: HashMap<String, Transcript>,
}

impl SessionContext {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            cursor: None,
            dataset_chat: Transcript::new(),
            post_chats: HashMap::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Current post list window, starting the cursor on first use
    pub fn window(&mut self, page_size: usize, total: usize) -> PageWindow {
        self.cursor
            .get_or_insert_with(|| PaginationCursor::new(page_size, total))
            .window(total)
    }

    /// Reveal one more page of the post list
    pub fn load_more(&mut self, page_size: usize, total: usize) -> PageWindow {
        let cursor = self
            .cursor
            .get_or_insert_with(|| PaginationCursor::new(page_size, total));
        if cursor.load_more(total) {
            debug!(session = %self.id, visible = cursor.visible(), "Post list extended");
        }
        cursor.window(total)
    }

    /// Transcript for a scope, if anything was ever asked there
    pub fn transcript(&self, scope: &ChatScope) -> Option<&Transcript> {
        match scope {
            ChatScope::Dataset => Some(&self.dataset_chat),
            ChatScope::Post(id) => self.post_chats.get(id),
        }
    }

    /// Transcript for a scope, created empty on first use
    pub fn transcript_mut(&mut self, scope: &ChatScope) -> &mut Transcript {
        match scope {
            ChatScope::Dataset => &mut self.dataset_chat,
            ChatScope::Post(id) => self.post_chats.entry(id.clone()).or_default(),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            created_at: self.created_at,
            visible_posts: self.cursor.map(|c| c.visible()),
            dataset_chat: self.dataset_chat.clone(),
            post_chats: self.post_chats.clone(),
        }
    }
}

/// Handle to one session's state
pub type SharedSession = Arc<Mutex<SessionContext>>;

struct StoreEntry {
    session: SharedSession,
    last_seen: Instant,
}

/// Registry of live sessions
///
/// Sessions idle for longer than `idle_ttl` are dropped the next time the
/// store is touched; there is no background sweeper. At most
/// `max_sessions` are held; starting one more evicts the least recently seen.
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, StoreEntry>>,
    idle_ttl: Duration,
    max_sessions: usize,
}

impl SessionStore {
    pub fn new(idle_ttl: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_ttl,
            max_sessions: max_sessions.max(1),
        }
    }

    /// Find the session for `id` or start a new one
    ///
    /// Returns the effective id and whether a session was created.
    pub async fn resolve(&self, id: Option<Uuid>) -> (Uuid, SharedSession, bool) {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        self.purge_expired_locked(&mut sessions, now);

        if let Some(id) = id {
            if let Some(entry) = sessions.get_mut(&id) {
                entry.last_seen = now;
                return (id, Arc::clone(&entry.session), false);
            }
        }

        while sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_seen)
                .map(|(id, _)| *id);
            match oldest {
                Some(oldest) => {
                    sessions.remove(&oldest);
                    warn!(session = %oldest, limit = self.max_sessions, "Session store full, evicted least recent session");
                }
                None => break,
            }
        }

        let id = Uuid::new_v4();
        let session = Arc::new(Mutex::new(SessionContext::new(id)));
        sessions.insert(
            id,
            StoreEntry {
                session: Arc::clone(&session),
                last_seen: now,
            },
        );
        metrics::set_active_sessions(sessions.len());
        info!(session = %id, active = sessions.len(), "Session started");

        (id, session, true)
    }

    /// Look up a live session without creating one
    pub async fn get(&self, id: Uuid) -> Option<SharedSession> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        self.purge_expired_locked(&mut sessions, now);
        sessions.get_mut(&id).map(|entry| {
            entry.last_seen = now;
            Arc::clone(&entry.session)
        })
    }

    /// Tear a session down; returns whether it existed
    pub async fn end(&self, id: Uuid) -> bool {
        let mut sessions = self.sessions.write().await;
        let removed = sessions.remove(&id).is_some();
        if removed {
            metrics::set_active_sessions(sessions.len());
            info!(session = %id, active = sessions.len(), "Session ended");
        }
        removed
    }

    /// Drop idle sessions now
    pub async fn purge_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        self.purge_expired_locked(&mut sessions, Instant::now())
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    fn purge_expired_locked(&self, sessions: &mut HashMap<Uuid, StoreEntry>, now: Instant) -> usize {
        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.last_seen) <= self.idle_ttl);
        let expired = before - sessions.len();
        if expired > 0 {
            metrics::set_active_sessions(sessions.len());
            info!(expired, active = sessions.len(), "Expired idle sessions");
        }
        expired
    }
}
