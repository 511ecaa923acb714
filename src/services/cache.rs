use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use crate::models::GeoCode;
use super::store::{GeocodeStore, StoreError};

/// Errors that can occur with cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Cache miss: {0}")]
    CacheMiss(String),
}

/// Multi-tier cache manager
///
/// L1 is an in-process moka cache; L2 is Redis, shared across instances, and
/// only used when a Redis URL is configured. Both tiers use the same TTL.
pub struct CacheManager {
    redis: Option<Arc<tokio::sync::Mutex<ConnectionManager>>>,
    l1_cache: moka::future::Cache<String, Vec<u8>>,
    ttl_secs: u64,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CacheManager {
    /// Create a cache manager backed by Redis
    pub async fn new(redis_url: &str, l1_size: u64, ttl_secs: u64) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let redis = redis::aio::ConnectionManager::new(client).await?;

        let mut manager = Self::in_memory(l1_size, ttl_secs);
        manager.redis = Some(Arc::new(tokio::sync::Mutex::new(redis)));
        Ok(manager)
    }

    /// Create an L1-only cache manager
    pub fn in_memory(l1_size: u64, ttl_secs: u64) -> Self {
        let l1_cache = moka::future::CacheBuilder::new(l1_size)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self {
            redis: None,
            l1_cache,
            ttl_secs,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn has_redis(&self) -> bool {
        self.redis.is_some()
    }

    /// Get a value from cache (L1 first, then L2)
    pub async fn get<T>(&self, key: &str) -> Result<T, CacheError>
    where
        T: for<'de> Deserialize<'de>,
    {
        // Try L1 cache first
        if let Some(bytes) = self.l1_cache.get(key).await {
            tracing::trace!("L1 cache hit: {}", key);
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(serde_json::from_slice(&bytes)?);
        }

        // Try L2 cache (Redis)
        if let Some(l2) = &self.redis {
            let mut conn = l2.lock().await;
            let value: Option<String> = redis::cmd("GET")
                .arg(key)
                .query_async(&mut *conn)
                .await?;
            drop(conn);

            if let Some(json) = value {
                tracing::trace!("L2 cache hit: {}", key);
                self.hits.fetch_add(1, Ordering::Relaxed);

                // Populate L1 cache
                let bytes = json.as_bytes().to_vec();
                self.l1_cache.insert(key.to_string(), bytes).await;

                return Ok(serde_json::from_str(&json)?);
            }
        }

        tracing::trace!("Cache miss: {}", key);
        self.misses.fetch_add(1, Ordering::Relaxed);
        Err(CacheError::CacheMiss(key.to_string()))
    }

    /// Set a value in cache (both tiers)
    pub async fn set<T>(&self, key: &str, value: &T) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let json = serde_json::to_string(value)?;

        // Set in L1 cache (uses configured TTL)
        let bytes = json.as_bytes().to_vec();
        self.l1_cache.insert(key.to_string(), bytes).await;

        // Set in L2 cache with explicit TTL
        if let Some(l2) = &self.redis {
            let mut conn = l2.lock().await;
            let _: () = redis::cmd("SETEX")
                .arg(key)
                .arg(self.ttl_secs)
                .arg(json)
                .query_async(&mut *conn)
                .await?;
        }

        tracing::trace!("Cache set: {}", key);
        Ok(())
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let lookups = hits + misses;

        CacheStats {
            l1_size: self.l1_cache.entry_count(),
            hit_count: hits,
            miss_count: misses,
            hit_rate: if lookups > 0 { hits as f64 / lookups as f64 } else { 0.0 },
            redis_enabled: self.has_redis(),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub l1_size: u64,
    pub hit_count: u64,
    pub miss_count: u64,
    pub hit_rate: f64,
    pub redis_enabled: bool,
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Build a cache key for an exact geocode lookup
    pub fn geocode(postal_code: &str) -> String {
        format!("geocode:{}", postal_code)
    }

    /// Build a cache key for a prefix geocode lookup
    pub fn geocode_prefix(prefix: &str) -> String {
        format!("geocode-prefix:{}", prefix)
    }

    /// Build a cache key for the channel status counts
    pub fn status_counts() -> String {
        "channels:status-counts".to_string()
    }
}

/// Geocode store that memoizes hits in the cache manager
///
/// Misses are not cached so newly loaded codes show up immediately.
/// Cache failures are logged and fall through to the inner store.
pub struct CachedGeocodeStore<S> {
    inner: S,
    cache: Arc<CacheManager>,
}

impl<S: GeocodeStore> CachedGeocodeStore<S> {
    pub fn new(inner: S, cache: Arc<CacheManager>) -> Self {
        Self { inner, cache }
    }

    async fn cached(&self, key: String) -> Option<GeoCode> {
        match self.cache.get::<GeoCode>(&key).await {
            Ok(geocode) => Some(geocode),
            Err(CacheError::CacheMiss(_)) => None,
            Err(e) => {
                tracing::warn!("Geocode cache read failed for {}: {}", key, e);
                None
            }
        }
    }

    async fn remember(&self, key: &str, geocode: Option<&GeoCode>) {
        if let Some(geocode) = geocode {
            if let Err(e) = self.cache.set(key, geocode).await {
                tracing::warn!("Geocode cache write failed for {}: {}", key, e);
            }
        }
    }
}

impl<S: GeocodeStore> GeocodeStore for CachedGeocodeStore<S> {
    async fn find_exact(&self, postal_code: &str) -> Result<Option<GeoCode>, StoreError> {
        let key = CacheKey::geocode(postal_code);
        if let Some(hit) = self.cached(key.clone()).await {
            return Ok(Some(hit));
        }

        let found = self.inner.find_exact(postal_code).await?;
        self.remember(&key, found.as_ref()).await;
        Ok(found)
    }

    async fn find_by_prefix(&self, prefix: &str) -> Result<Option<GeoCode>, StoreError> {
        let key = CacheKey::geocode_prefix(prefix);
        if let Some(hit) = self.cached(key.clone()).await {
            return Ok(Some(hit));
        }

        let found = self.inner.find_by_prefix(prefix).await?;
        self.remember(&key, found.as_ref()).await;
        Ok(found)
    }
}
