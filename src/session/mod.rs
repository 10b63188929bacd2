use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::campaign::CampaignId;
use crate::error::Error;

pub mod endpoints;
pub mod manager;
pub use endpoints::*;

/// Per-user state: the campaign being edited and a pending delete.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionContext {
    pub id: Uuid,
    pub selected_campaign: Option<CampaignId>,
    pub pending_deletion: Option<CampaignId>,
    pub created_at: DateTime<Utc>,
}

pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 12 * 60;

/// Sessions live for `ttl` after creation; expired ones are dropped whenever
/// the store is touched.
#[derive(Debug)]
pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, SessionContext>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> SessionStore {
        SessionStore::with_ttl(Duration::minutes(DEFAULT_SESSION_TTL_MINUTES))
    }
}

impl SessionStore {
    pub fn new() -> SessionStore {
        SessionStore::default()
    }

    pub fn with_ttl(ttl: Duration) -> SessionStore {
        SessionStore {
            sessions: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub fn create(&self) -> Result<SessionContext, Error> {
        self.evict_expired(Utc::now())?;

        let session = SessionContext {
            id: Uuid::new_v4(),
            selected_campaign: None,
            pending_deletion: None,
            created_at: Utc::now(),
        };
        self.lock()?.insert(session.id, session.clone());

        Ok(session)
    }

    pub fn get(&self, session_id: Uuid) -> Result<SessionContext, Error> {
        self.evict_expired(Utc::now())?;
        self.lock()?
            .get(&session_id)
            .cloned()
            .ok_or(Error::SessionNotFound { session_id })
    }

    /// Applies `change` to a copy and stores it only if `change` succeeds.
    pub fn update<F>(&self, session_id: Uuid, change: F) -> Result<SessionContext, Error>
    where
        F: FnOnce(&mut SessionContext) -> Result<(), Error>,
    {
        self.evict_expired(Utc::now())?;
        let mut sessions = self.lock()?;
        let session = sessions
            .get_mut(&session_id)
            .ok_or(Error::SessionNotFound { session_id })?;

        let mut updated = session.clone();
        change(&mut updated)?;
        *session = updated.clone();

        Ok(updated)
    }

    pub fn remove(&self, session_id: Uuid) -> Result<(), Error> {
        self.lock()?
            .remove(&session_id)
            .map(|_| ())
            .ok_or(Error::SessionNotFound { session_id })
    }

    /// Drops every session created more than `ttl` before `now`.
    pub fn evict_expired(&self, now: DateTime<Utc>) -> Result<usize, Error> {
        let mut sessions = self.lock()?;
        let before = sessions.len();
        sessions.retain(|_, session| session.created_at + self.ttl > now);

        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::debug!(evicted, "evicted expired sessions");
        }

        Ok(evicted)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<Uuid, SessionContext>>, Error> {
        self.sessions
            .lock()
            .map_err(|_| Error::ExistentialState("session store lock poisoned".into()))
    }
}
