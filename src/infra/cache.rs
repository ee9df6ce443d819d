//! Redis cache implementation.
//!
//! Best-effort result cache in front of read operations. Every Redis round
//! trip is bounded by a timeout, and a missing, slow or failing Redis only
//! ever costs a recompute.

use std::future::Future;

use redis::{aio::ConnectionManager, AsyncCommands, Client, RedisError};
use serde::{de::DeserializeOwned, Serialize};
use sha2::{Digest, Sha256};
use tokio::time::{timeout, Duration};

use crate::config::{Config, CACHE_KEY_MAX_LEN, CACHE_PREFIX};
use crate::errors::{AppError, AppResult};

/// Redis cache wrapper; cheap to clone.
#[derive(Clone)]
pub struct Cache {
    connection: Option<ConnectionManager>,
    default_ttl: u64,
    timeout: Duration,
}

impl Cache {
    /// Cache that never stores anything.
    pub fn disabled() -> Self {
        Self {
            connection: None,
            default_ttl: 0,
            timeout: Duration::ZERO,
        }
    }

    /// Connect to `REDIS_URL` when configured.
    ///
    /// A failed connection is logged and yields a disabled cache.
    pub async fn connect(config: &Config) -> Self {
        let Some(url) = config.redis_url.as_deref() else {
            tracing::info!("REDIS_URL not set, caching disabled");
            return Self::disabled();
        };

        match Self::try_connect(url, config).await {
            Ok(cache) => {
                tracing::info!("Redis cache connected");
                cache
            }
            Err(e) => {
                tracing::error!("Failed to connect to Redis, caching disabled: {}", e);
                Self::disabled()
            }
        }
    }

    /// Try to connect to Redis, returning an error instead of degrading.
    pub async fn try_connect(url: &str, config: &Config) -> AppResult<Self> {
        let client = Client::open(url).map_err(cache_error)?;
        let wait = Duration::from_millis(config.cache_timeout_ms);
        let connection = match timeout(wait, ConnectionManager::new(client)).await {
            Ok(connection) => connection.map_err(cache_error)?,
            Err(_) => return Err(AppError::internal("Redis connection timed out")),
        };

        Ok(Self {
            connection: Some(connection),
            default_ttl: config.cache_ttl_seconds,
            timeout: wait,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.connection.is_some()
    }

    fn connection(&self) -> AppResult<ConnectionManager> {
        self.connection
            .clone()
            .ok_or_else(|| AppError::internal("Cache disabled"))
    }

    async fn bounded<T>(&self, fut: impl Future<Output = Result<T, RedisError>>) -> AppResult<T> {
        match timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(cache_error),
            Err(_) => Err(AppError::internal("Cache operation timed out")),
        }
    }

    // =========================================================================
    // Generic Cache Operations
    // =========================================================================

    async fn get_raw(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.connection()?;
        self.bounded(conn.get::<_, Option<String>>(key)).await
    }

    /// Set a value in cache with custom TTL (in seconds).
    pub async fn set_with_ttl<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl_seconds: u64,
    ) -> AppResult<()> {
        let mut conn = self.connection()?;
        let json = serde_json::to_string(value)
            .map_err(|e| AppError::internal(format!("Cache serialization error: {}", e)))?;

        self.bounded(conn.set_ex::<_, _, ()>(key, json, ttl_seconds))
            .await
    }

    /// Delete a value from cache.
    pub async fn delete(&self, key: &str) -> AppResult<()> {
        let mut conn = self.connection()?;
        self.bounded(conn.del::<_, ()>(key)).await
    }

    /// Round trip to Redis.
    pub async fn ping(&self) -> AppResult<()> {
        let mut conn = self.connection()?;
        self.bounded(redis::cmd("PING").query_async::<String>(&mut conn))
            .await
            .map(|_| ())
    }

    // =========================================================================
    // Operation Result Cache
    // =========================================================================

    /// Return the cached result of `operation(args)` or compute and store it.
    ///
    /// Only `Some` results are stored. Errors from `compute` propagate and
    /// are never cached; cache failures are logged and skipped.
    pub async fn cached<T, A, E, F, Fut>(
        &self,
        operation: &str,
        args: &A,
        ttl_seconds: Option<u64>,
        compute: F,
    ) -> Result<Option<T>, E>
    where
        T: Serialize + DeserializeOwned,
        A: Serialize + ?Sized,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<T>, E>>,
    {
        if !self.is_enabled() {
            return compute().await;
        }

        let key = match cache_key(operation, args) {
            Ok(key) => key,
            Err(e) => {
                tracing::error!(operation, "Failed to build cache key: {}", e);
                return compute().await;
            }
        };

        match self.get_raw(&key).await {
            Ok(Some(raw)) => match serde_json::from_str::<T>(&raw) {
                Ok(value) => {
                    tracing::debug!(key = %key, "Cache hit");
                    return Ok(Some(value));
                }
                Err(e) => {
                    tracing::error!(key = %key, "Corrupted cache entry: {}", e);
                    if let Err(e) = self.delete(&key).await {
                        tracing::warn!(key = %key, "Failed to drop corrupted entry: {}", e);
                    }
                }
            },
            Ok(None) => tracing::debug!(key = %key, "Cache miss"),
            Err(e) => tracing::warn!(key = %key, "Cache read skipped: {}", e),
        }

        let result = compute().await?;

        if let Some(value) = &result {
            let ttl = ttl_seconds.unwrap_or(self.default_ttl);
            match self.set_with_ttl(&key, value, ttl).await {
                Ok(()) => tracing::debug!(key = %key, ttl, "Result cached"),
                Err(e) => tracing::warn!(key = %key, "Cache write skipped: {}", e),
            }
        }

        Ok(result)
    }

    /// Drop the cached result of `operation(args)`, if any.
    pub async fn invalidate<A: Serialize + ?Sized>(&self, operation: &str, args: &A) {
        if !self.is_enabled() {
            return;
        }

        let result = match cache_key(operation, args) {
            Ok(key) => self.delete(&key).await,
            Err(e) => Err(AppError::internal(e.to_string())),
        };
        if let Err(e) = result {
            tracing::warn!(operation, "Cache invalidation skipped: {}", e);
        }
    }
}

/// `cache:<operation>:<sha256 of the JSON-encoded arguments>`, capped in length
pub fn cache_key<A: Serialize + ?Sized>(
    operation: &str,
    args: &A,
) -> Result<String, serde_json::Error> {
    let encoded = serde_json::to_vec(args)?;
    let digest = hex::encode(Sha256::digest(&encoded));

    let mut key = format!("{}:{}:{}", CACHE_PREFIX, operation, digest);
    if key.len() > CACHE_KEY_MAX_LEN {
        let mut end = CACHE_KEY_MAX_LEN;
        while !key.is_char_boundary(end) {
            end -= 1;
        }
        key.truncate(end);
    }
    Ok(key)
}

fn cache_error(e: RedisError) -> AppError {
    tracing::error!("Redis error: {}", e);
    AppError::internal(format!("Cache error: {}", e))
}
