use crate::core::cache::Cache;
use anyhow::{Context, Result};
use async_trait::async_trait;
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::marker::PhantomData;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing::debug;

#[derive(Serialize, Deserialize)]
struct CacheEntry<V> {
    value: V,
    expires_at: Option<SystemTime>,
}

/// Cache persisted in a fjall partition so entries outlive a single command.
pub struct DiskCache<V> {
    keyspace: Keyspace,
    partition: PartitionHandle,
    _marker: PhantomData<fn() -> V>,
}

impl<V> DiskCache<V>
where
    V: Serialize + DeserializeOwned,
{
    pub fn open(path: &Path, partition: &str) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create cache directory: {}", path.display()))?;

        let keyspace = Config::new(path)
            .open()
            .with_context(|| format!("Failed to open cache keyspace: {}", path.display()))?;
        let partition = keyspace
            .open_partition(partition, PartitionCreateOptions::default())
            .with_context(|| format!("Failed to open cache partition: {partition}"))?;

        Ok(Self {
            keyspace,
            partition,
            _marker: PhantomData,
        })
    }

    fn read(&self, key: &str) -> Result<Option<V>> {
        let Some(bytes) = self.partition.get(key)? else {
            debug!("Cache MISS for key: {}", key);
            return Ok(None);
        };
        let entry: CacheEntry<V> = serde_json::from_slice(&bytes)?;
        if let Some(expires_at) = entry.expires_at {
            if SystemTime::now() > expires_at {
                debug!("Cache entry expired for key: {}", key);
                self.partition.remove(key)?;
                return Ok(None);
            }
        }
        debug!("Cache HIT for key: {}", key);
        Ok(Some(entry.value))
    }

    fn write(&self, key: &str, value: V, ttl: Option<Duration>) -> Result<()> {
        let entry = CacheEntry {
            value,
            expires_at: ttl.map(|d| SystemTime::now() + d),
        };
        self.partition.insert(key, serde_json::to_vec(&entry)?)?;
        self.keyspace.persist(PersistMode::Buffer)?;
        debug!("Cache PUT for key: {}", key);
        Ok(())
    }

    fn wipe(&self) -> Result<()> {
        let keys = self
            .partition
            .keys()
            .collect::<std::result::Result<Vec<_>, _>>()?;
        for key in keys {
            self.partition.remove(key)?;
        }
        self.keyspace.persist(PersistMode::Buffer)?;
        Ok(())
    }
}

#[async_trait]
impl<V> Cache<String, V> for DiskCache<V>
where
    V: Clone + Send + Sync + Serialize + DeserializeOwned + 'static,
{
    async fn get(&self, key: &String) -> Option<V> {
        match self.read(key) {
            Ok(value) => value,
            Err(e) => {
                debug!("DiskCache get error: {}", e);
                None
            }
        }
    }

    async fn put(&self, key: String, value: V, ttl: Option<Duration>) {
        if let Err(e) = self.write(&key, value, ttl) {
            debug!("DiskCache put error: {}", e);
        }
    }

    async fn remove(&self, key: &String) {
        if let Err(e) = self.partition.remove(key.as_str()) {
            debug!("DiskCache remove error: {}", e);
        }
    }

    async fn clear(&self) {
        if let Err(e) = self.wipe() {
            debug!("DiskCache clear error: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::price::PriceQuote;
    use tempfile::tempdir;
    use tokio::time::sleep;

    #[tokio::test]
    async fn test_disk_cache_get_put() {
        let dir = tempdir().unwrap();
        let cache = DiskCache::<PriceQuote>::open(dir.path(), "prices").unwrap();

        assert!(cache.get(&"BONK".to_string()).await.is_none());

        let quote = PriceQuote::new("BONK", 0.000021, "CoinCap");
        cache.put("BONK".to_string(), quote.clone(), None).await;

        assert_eq!(cache.get(&"BONK".to_string()).await, Some(quote));
        assert!(cache.get(&"SHIB".to_string()).await.is_none());
    }

    #[tokio::test]
    async fn test_disk_cache_ttl_expiration() {
        let dir = tempdir().unwrap();
        let cache = DiskCache::<i32>::open(dir.path(), "prices").unwrap();

        cache
            .put("key1".to_string(), 123, Some(Duration::from_millis(10)))
            .await;
        assert_eq!(cache.get(&"key1".to_string()).await, Some(123));

        sleep(Duration::from_millis(20)).await;
        assert!(cache.get(&"key1".to_string()).await.is_none());
    }

    #[tokio::test]
    async fn test_disk_cache_remove_and_clear() {
        let dir = tempdir().unwrap();
        let cache = DiskCache::<i32>::open(dir.path(), "prices").unwrap();

        cache.put("key1".to_string(), 1, None).await;
        cache.put("key2".to_string(), 2, None).await;

        cache.remove(&"key1".to_string()).await;
        assert!(cache.get(&"key1".to_string()).await.is_none());

        cache.clear().await;
        assert!(cache.get(&"key2".to_string()).await.is_none());
    }
}
