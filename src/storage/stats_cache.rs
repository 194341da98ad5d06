// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! LRU cache for per-environment transaction stats.
//!
//! Stats are an aggregate over every transaction of an environment, so they
//! are cached until the next transaction write in that environment.
//!
//! ## Fill ordering
//!
//! A reader computes stats from a snapshot and fills the cache afterwards. A
//! write that commits in between would leave the snapshot's counts cached
//! after its own invalidation. Readers therefore take a [`StatsCache::generation`]
//! before reading and pass it to [`StatsCache::put`], which drops the fill if
//! any invalidation happened since.

use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use lru::LruCache;

use crate::models::AppEnvStats;

pub const DEFAULT_CAPACITY: usize = 1024;
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

struct CacheEntry {
    stats: AppEnvStats,
    inserted_at: Instant,
}

struct Inner {
    entries: LruCache<String, CacheEntry>,
    /// Bumped by every invalidation.
    generation: u64,
}

/// In-process LRU cache keyed by AppEnv id.
pub struct StatsCache {
    inner: Mutex<Inner>,
    ttl: Duration,
}

impl StatsCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: LruCache::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)),
                generation: 0,
            }),
            ttl,
        }
    }

    /// Returns `None` if not cached or expired.
    pub fn get(&self, app_env_id: &str) -> Option<AppEnvStats> {
        let mut inner = self.inner.lock().ok()?;
        if let Some(entry) = inner.entries.get(app_env_id) {
            if entry.inserted_at.elapsed() < self.ttl {
                return Some(entry.stats.clone());
            }
            inner.entries.pop(app_env_id);
        }
        None
    }

    /// Current invalidation generation. Take it before reading the data a
    /// later [`put`](Self::put) will cache.
    pub fn generation(&self) -> u64 {
        self.inner.lock().map(|inner| inner.generation).unwrap_or(u64::MAX)
    }

    /// Cache `stats` unless an invalidation happened after `generation` was
    /// taken. Returns whether the entry was stored.
    pub fn put(&self, app_env_id: &str, stats: AppEnvStats, generation: u64) -> bool {
        let Ok(mut inner) = self.inner.lock() else {
            return false;
        };
        if inner.generation != generation {
            return false;
        }
        inner.entries.put(
            app_env_id.to_string(),
            CacheEntry {
                stats,
                inserted_at: Instant::now(),
            },
        );
        true
    }

    pub fn invalidate(&self, app_env_id: &str) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.generation = inner.generation.wrapping_add(1);
            inner.entries.pop(app_env_id);
        }
    }
}

impl Default for StatsCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TTL)
    }
}
