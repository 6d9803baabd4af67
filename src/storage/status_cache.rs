// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! LRU cache for gateway transaction status lookups.
//!
//! Admin lookups of the same reference within a short window reuse the last
//! gateway answer instead of spending another authenticated call.

use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use lru::LruCache;

use crate::providers::Transaction;

pub const DEFAULT_CAPACITY: usize = 256;
pub const DEFAULT_TTL: Duration = Duration::from_secs(30);

struct CacheEntry {
    transaction: Transaction,
    inserted_at: Instant,
}

/// In-process LRU cache keyed by gateway reference (case-insensitive).
pub struct StatusCache {
    cache: Mutex<LruCache<String, CacheEntry>>,
    ttl: Duration,
}

impl Default for StatusCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TTL)
    }
}

impl StatusCache {
    /// A zero capacity is bumped to one entry.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN),
            )),
            ttl,
        }
    }

    /// Returns `None` if not cached or expired.
    pub fn get(&self, reference: &str) -> Option<Transaction> {
        let key = reference.to_lowercase();
        let mut cache = self.cache.lock().ok()?;
        if let Some(entry) = cache.get(&key) {
            if entry.inserted_at.elapsed() < self.ttl {
                return Some(entry.transaction.clone());
            }
            cache.pop(&key);
        }
        None
    }

    pub fn put(&self, reference: &str, transaction: Transaction) {
        let key = reference.to_lowercase();
        if let Ok(mut cache) = self.cache.lock() {
            cache.put(
                key,
                CacheEntry {
                    transaction,
                    inserted_at: Instant::now(),
                },
            );
        }
    }

    pub fn invalidate(&self, reference: &str) {
        let key = reference.to_lowercase();
        if let Ok(mut cache) = self.cache.lock() {
            cache.pop(&key);
        }
    }
}
