use crate::domain::dataset::Table;
use crate::domain::profile::DatasetProfile;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// A session's most recent upload
#[derive(Debug)]
pub struct SessionEntry {
    pub session_id: String,
    pub table: Table,
    pub profile: DatasetProfile,
    pub uploaded_at: DateTime<Utc>,
}

struct CachedSession {
    entry: Arc<SessionEntry>,
    stored_at: Instant,
}

/// Per-session dataset store with TTL and capacity eviction
pub struct SessionDatasetCache {
    sessions: RwLock<HashMap<String, CachedSession>>,
    ttl: Duration,
    max_sessions: usize,
}

impl SessionDatasetCache {
    pub fn new(ttl: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
            max_sessions: max_sessions.max(1),
        }
    }

    /// Store (or replace) the dataset for a session; empty ids are ignored
    pub fn set(&self, session_id: &str, table: Table, profile: DatasetProfile) {
        if session_id.is_empty() {
            return;
        }

        let entry = Arc::new(SessionEntry {
            session_id: session_id.to_string(),
            table,
            profile,
            uploaded_at: Utc::now(),
        });

        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        Self::sweep(&mut sessions, self.ttl);

        // Evict oldest uploads if at capacity
        while sessions.len() >= self.max_sessions && !sessions.contains_key(session_id) {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, cached)| cached.stored_at)
                .map(|(key, _)| key.clone());
            match oldest {
                Some(key) => {
                    sessions.remove(&key);
                    info!(session_id = %key, "Evicted oldest session dataset");
                }
                None => break,
            }
        }

        sessions.insert(
            session_id.to_string(),
            CachedSession {
                entry,
                stored_at: Instant::now(),
            },
        );
    }

    /// Dataset for a session, if one was uploaded and has not expired
    pub fn get(&self, session_id: Option<&str>) -> Option<Arc<SessionEntry>> {
        let session_id = session_id.filter(|id| !id.is_empty())?;

        {
            let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
            let cached = sessions.get(session_id)?;
            if cached.stored_at.elapsed() < self.ttl {
                return Some(Arc::clone(&cached.entry));
            }
        }

        // Remove expired entry
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        if sessions
            .get(session_id)
            .is_some_and(|cached| cached.stored_at.elapsed() >= self.ttl)
        {
            sessions.remove(session_id);
            debug!(session_id = %session_id, "Session dataset expired");
        }
        None
    }

    /// Drop every expired entry, returning how many were removed
    pub fn evict_expired(&self) -> usize {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        Self::sweep(&mut sessions, self.ttl)
    }

    pub fn len(&self) -> usize {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn sweep(sessions: &mut HashMap<String, CachedSession>, ttl: Duration) -> usize {
        let before = sessions.len();
        sessions.retain(|_, cached| cached.stored_at.elapsed() < ttl);
        let removed = before - sessions.len();
        if removed > 0 {
            info!(removed, "Expired session datasets removed");
        }
        removed
    }
}
