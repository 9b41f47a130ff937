// src/exam/store.rs

use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::{Mutex, RwLock};

use crate::exam::session::{ExamSession, SessionStatus};

/// How long after its deadline an untouched session is kept before it is
/// treated as abandoned. Covers manual retries after a failed automatic submit.
pub const ABANDON_GRACE_SECS: i64 = 15 * 60;

/// Handle to one candidate's session. Holding the lock serialises that
/// candidate's actions; other candidates are unaffected.
pub type SessionHandle = Arc<Mutex<ExamSession>>;

struct Entry {
    handle: SessionHandle,
    deadline: DateTime<Utc>,
}

#[derive(Default)]
struct Sessions {
    active: HashMap<String, Entry>,

    /// Candidates whose attempt is over: `Submitted`, or `Expired` when the
    /// session was abandoned. Only the status is kept, never the questions.
    closed: HashMap<String, SessionStatus>,
}

impl Sessions {
    fn evict_abandoned(&mut self, now: DateTime<Utc>, grace: TimeDelta) {
        let closed = &mut self.closed;
        self.active.retain(|app_no, entry| {
            if now - entry.deadline <= grace {
                return true;
            }
            tracing::info!(app_no = %app_no, "Discarding abandoned exam session");
            closed.insert(app_no.clone(), SessionStatus::Expired);
            false
        });
    }
}

/// In-memory sessions keyed by application number.
///
/// Nothing here is durable: the remote service is the only system of record.
/// A session leaves the store when it is submitted ([`SessionStore::retire`])
/// or when its deadline is more than the grace period in the past.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<Sessions>>,
    grace: TimeDelta,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_grace(TimeDelta::seconds(ABANDON_GRACE_SECS))
    }

    pub fn with_grace(grace: TimeDelta) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Sessions::default())),
            grace,
        }
    }

    /// The candidate's live session, if any. An abandoned one is evicted
    /// instead of returned.
    pub async fn get(&self, app_no: &str, now: DateTime<Utc>) -> Option<SessionHandle> {
        {
            let sessions = self.inner.read().await;
            let entry = sessions.active.get(app_no)?;
            if now - entry.deadline <= self.grace {
                return Some(entry.handle.clone());
            }
        }

        self.inner.write().await.evict_abandoned(now, self.grace);
        None
    }

    /// How the candidate's attempt ended, once it has left the store.
    pub async fn closed(&self, app_no: &str) -> Option<SessionStatus> {
        self.inner.read().await.closed.get(app_no).copied()
    }

    /// Inserts `session` unless the candidate already has one, in which case
    /// the existing handle wins. Returns the handle now stored and whether it
    /// is the one just created. Abandoned sessions are swept first.
    pub async fn insert_if_absent(
        &self,
        app_no: &str,
        session: ExamSession,
        now: DateTime<Utc>,
    ) -> (SessionHandle, bool) {
        let mut sessions = self.inner.write().await;
        sessions.evict_abandoned(now, self.grace);

        if let Some(existing) = sessions.active.get(app_no) {
            return (existing.handle.clone(), false);
        }

        let deadline = session.deadline();
        let handle = Arc::new(Mutex::new(session));
        sessions.active.insert(
            app_no.to_string(),
            Entry {
                handle: handle.clone(),
                deadline,
            },
        );
        (handle, true)
    }

    /// Drops a submitted session, keeping only the fact that it was submitted.
    pub async fn retire(&self, app_no: &str) {
        let mut sessions = self.inner.write().await;
        sessions.active.remove(app_no);
        sessions
            .closed
            .insert(app_no.to_string(), SessionStatus::Submitted);
    }
}
