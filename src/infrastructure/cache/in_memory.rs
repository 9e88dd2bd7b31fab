//! In-memory result cache implementation using moka

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache as MokaCache;

use crate::domain::cache::{Fingerprint, ResultCache};
use crate::domain::error::CacheError;
use crate::domain::outcome::RawOutcome;

/// Configuration for the in-memory result cache
#[derive(Debug, Clone)]
pub struct InMemoryResultCacheConfig {
    /// Maximum number of entries
    pub max_capacity: u64,
    /// Upper bound moka applies on top of per-entry TTLs
    pub max_ttl: Duration,
}

impl Default for InMemoryResultCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 100_000,
            max_ttl: Duration::from_secs(7 * 24 * 3600),
        }
    }
}

impl InMemoryResultCacheConfig {
    pub fn with_max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = capacity;
        self
    }

    pub fn with_max_ttl(mut self, ttl: Duration) -> Self {
        self.max_ttl = ttl;
        self
    }
}

/// Stored entry with its own expiry timestamp
#[derive(Debug, Clone)]
struct CacheEntry {
    outcome: RawOutcome,
    /// Millis since epoch
    expires_at: u64,
}

/// Thread-safe in-memory result cache.
///
/// Each entry carries its own TTL, evaluated lazily on read; moka's eviction
/// only acts as a capacity and upper-bound backstop. Inserts replace whole
/// entries, so a reader never observes a partial write.
#[derive(Debug)]
pub struct InMemoryResultCache {
    cache: MokaCache<String, CacheEntry>,
}

impl InMemoryResultCache {
    pub fn new() -> Self {
        Self::with_config(InMemoryResultCacheConfig::default())
    }

    pub fn with_config(config: InMemoryResultCacheConfig) -> Self {
        let cache = MokaCache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(config.max_ttl)
            .build();

        Self { cache }
    }

    fn current_time_millis() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }

    fn is_expired(entry: &CacheEntry) -> bool {
        Self::current_time_millis() > entry.expires_at
    }

    /// Number of live entries (test and diagnostics aid)
    pub async fn size(&self) -> usize {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count() as usize
    }
}

impl Default for InMemoryResultCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResultCache for InMemoryResultCache {
    async fn get(&self, fingerprint: &Fingerprint) -> Result<Option<RawOutcome>, CacheError> {
        match self.cache.get(fingerprint.as_str()).await {
            Some(entry) => {
                if Self::is_expired(&entry) {
                    self.cache.remove(fingerprint.as_str()).await;
                    return Ok(None);
                }

                Ok(Some(entry.outcome))
            }
            None => Ok(None),
        }
    }

    async fn put(
        &self,
        fingerprint: &Fingerprint,
        outcome: &RawOutcome,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let entry = CacheEntry {
            outcome: outcome.clone(),
            expires_at: Self::current_time_millis() + ttl.as_millis() as u64,
        };

        self.cache.insert(fingerprint.as_str().to_string(), entry).await;
        Ok(())
    }
}

/// Cache used when caching is disabled: `get` always reports absent and
/// `put` is a no-op.
#[derive(Debug, Default)]
pub struct NoopResultCache;

#[async_trait]
impl ResultCache for NoopResultCache {
    async fn get(&self, _fingerprint: &Fingerprint) -> Result<Option<RawOutcome>, CacheError> {
        Ok(None)
    }

    async fn put(
        &self,
        _fingerprint: &Fingerprint,
        _outcome: &RawOutcome,
        _ttl: Duration,
    ) -> Result<(), CacheError> {
        Ok(())
    }
}
