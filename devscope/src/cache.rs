// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Short-lived memo of fetched profile snapshots keyed by username.
//!
//! Only complete snapshots (profile and repository listing both fetched) are
//! stored. Expired entries are evicted lazily on lookup and on insert, and the
//! oldest entry is dropped once [`MAX_CACHED_PROFILES`] is reached.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
    time::{Duration, Instant},
};

use tracing::debug;

use crate::model::{Profile, Repository};

/// Upper bound on stored snapshots regardless of TTL.
pub const MAX_CACHED_PROFILES: usize = 256;

/// Profile and repository listing fetched together for one user.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct ProfileSnapshot
{
    pub profile:      Profile,
    pub repositories: Vec<Repository,>,
}

#[derive(Debug,)]
struct Entry
{
    stored_at: Instant,
    snapshot:  Arc<ProfileSnapshot,>,
}

/// Time-bounded snapshot memo. A zero TTL disables caching.
#[derive(Debug,)]
pub struct SnapshotCache
{
    ttl:      Duration,
    capacity: usize,
    entries:  Mutex<HashMap<String, Entry,>,>,
}

impl SnapshotCache
{
    pub fn new(ttl: Duration,) -> Self
    {
        Self::with_capacity(ttl, MAX_CACHED_PROFILES,)
    }

    /// Cache holding at most `capacity` snapshots; zero behaves like one.
    pub fn with_capacity(ttl: Duration, capacity: usize,) -> Self
    {
        Self {
            ttl,
            capacity: capacity.max(1,),
            entries: Mutex::new(HashMap::new(),),
        }
    }

    /// Returns the snapshot stored under `key` if it has not expired.
    pub fn get(&self, key: &str,) -> Option<Arc<ProfileSnapshot,>,>
    {
        if self.ttl.is_zero() {
            return None;
        }

        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner,);
        match entries.get(key,) {
            Some(entry,) if entry.stored_at.elapsed() < self.ttl => {
                debug!("Snapshot cache hit for {}", key);
                Some(Arc::clone(&entry.snapshot,),)
            }
            Some(_,) => {
                debug!("Snapshot cache entry for {} expired", key);
                entries.remove(key,);
                None
            }
            None => None,
        }
    }

    /// Stores `snapshot` under `key` and returns the shared handle.
    pub fn insert(&self, key: String, snapshot: ProfileSnapshot,) -> Arc<ProfileSnapshot,>
    {
        let snapshot = Arc::new(snapshot,);
        if self.ttl.is_zero() {
            return snapshot;
        }

        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner,);
        let ttl = self.ttl;
        entries.retain(|_, entry| entry.stored_at.elapsed() < ttl,);
        if !entries.contains_key(&key,) && entries.len() >= self.capacity {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry,)| entry.stored_at,)
                .map(|(name, _,)| name.clone(),);
            if let Some(oldest,) = oldest {
                debug!("Snapshot cache full, evicting {}", oldest);
                entries.remove(&oldest,);
            }
        }
        entries.insert(
            key,
            Entry {
                stored_at: Instant::now(), snapshot: Arc::clone(&snapshot,),
            },
        );

        snapshot
    }

    pub fn len(&self,) -> usize
    {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner,).len()
    }

    pub fn is_empty(&self,) -> bool
    {
        self.len() == 0
    }
}
