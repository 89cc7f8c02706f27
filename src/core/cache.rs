//! Key-value cache abstraction shared by the price chain and its stores.

use async_trait::async_trait;
use std::time::Duration;

/// A cache whose entries may carry a time-to-live.
///
/// Implementations treat an expired entry as a miss. Failures inside a cache
/// are logged and swallowed: a broken cache must never fail a price lookup.
#[async_trait]
pub trait Cache<K, V>: Send + Sync
where
    K: Send + Sync,
    V: Send + Sync,
{
    async fn get(&self, key: &K) -> Option<V>;

    /// Stores `value`. With `ttl = None` the entry never expires.
    async fn put(&self, key: K, value: V, ttl: Option<Duration>);

    async fn remove(&self, key: &K);

    async fn clear(&self);
}
