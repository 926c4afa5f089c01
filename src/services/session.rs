// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-user session state: Strava access tokens and cached collections.
//!
//! Held in `AppState` and handed to handlers explicitly. Nothing here is
//! persisted; a restart logs everyone out. A session lives as long as the
//! session JWT issued with it; expired entries are dropped on lookup and by
//! [`SessionStore::purge_expired`].

use crate::middleware::auth::SESSION_TTL_SECS;
use crate::models::ActivityCollection;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Access token plus the moment its session ends.
#[derive(Clone, Debug)]
pub struct SessionToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

/// Shared token map type (athlete ID -> session token).
pub type TokenMap = Arc<DashMap<u64, SessionToken>>;

/// Shared per-user fetch locks.
pub type FetchLocks = Arc<DashMap<u64, Arc<Mutex<()>>>>;

/// Token store and collection cache, keyed by Strava athlete ID.
#[derive(Clone, Default)]
pub struct SessionStore {
    tokens: TokenMap,
    collections: Arc<DashMap<u64, Arc<ActivityCollection>>>,
    fetch_locks: FetchLocks,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember the access token obtained at login for one session lifetime.
    pub fn store_token(&self, athlete_id: u64, access_token: String) {
        let expires_at = Utc::now() + Duration::seconds(SESSION_TTL_SECS as i64);
        self.store_token_until(athlete_id, access_token, expires_at);
    }

    /// Remember an access token until `expires_at`.
    pub fn store_token_until(
        &self,
        athlete_id: u64,
        access_token: String,
        expires_at: DateTime<Utc>,
    ) {
        self.tokens.insert(
            athlete_id,
            SessionToken {
                access_token,
                expires_at,
            },
        );
        // A new login may belong to a different Strava account state.
        self.collections.remove(&athlete_id);
    }

    pub fn token(&self, athlete_id: u64) -> Option<String> {
        {
            let entry = self.tokens.get(&athlete_id)?;
            if Utc::now() < entry.expires_at {
                return Some(entry.access_token.clone());
            }
        }

        // Read guard released above; removing under it would deadlock.
        tracing::debug!(athlete_id, "Session expired, dropping");
        self.remove(athlete_id);
        None
    }

    /// Forget everything about a user (logout, rejected or expired token).
    pub fn remove(&self, athlete_id: u64) {
        self.tokens.remove(&athlete_id);
        self.collections.remove(&athlete_id);
        self.fetch_locks.remove(&athlete_id);
    }

    /// Drop every session whose lifetime has ended. Returns how many went.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let expired: Vec<u64> = self
            .tokens
            .iter()
            .filter(|entry| entry.expires_at <= now)
            .map(|entry| *entry.key())
            .collect();

        for athlete_id in &expired {
            self.remove(*athlete_id);
        }

        // Cache or lock entries left behind by a session that is already gone.
        self.collections
            .retain(|athlete_id, _| self.tokens.contains_key(athlete_id));
        self.fetch_locks
            .retain(|athlete_id, _| self.tokens.contains_key(athlete_id));

        expired.len()
    }

    pub fn session_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn cache_collection(&self, athlete_id: u64, collection: Arc<ActivityCollection>) {
        self.collections.insert(athlete_id, collection);
    }

    pub fn cached_collection(&self, athlete_id: u64) -> Option<Arc<ActivityCollection>> {
        self.collections.get(&athlete_id).map(|c| c.value().clone())
    }

    /// Lock serializing fetches for one user.
    pub fn fetch_lock(&self, athlete_id: u64) -> Arc<Mutex<()>> {
        self.fetch_locks
            .entry(athlete_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
