use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

/// Default staleness tolerated by cached reads.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);

/// Per-read options passed through to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOptions {
    /// How stale a cached value may be. Backends without a cache ignore it.
    pub cache_ttl: Duration,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

/// Single-key get/put storage.
///
/// A `put` must be visible to a later `get` of the same key once the
/// backend's cache window has passed; nothing stronger is assumed.
#[async_trait]
pub trait KvBackend: Send + Sync {
    async fn get(&self, key: &str, opts: ReadOptions) -> Result<Option<String>>;

    async fn put(&self, key: &str, value: &str) -> Result<()>;
}

/// Process-local backend. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvBackend for MemoryBackend {
    async fn get(&self, key: &str, _opts: ReadOptions) -> Result<Option<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| anyhow::anyhow!("memory backend lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| anyhow::anyhow!("memory backend lock poisoned"))?;
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_put_then_get() {
        let b = MemoryBackend::new();
        assert_eq!(b.get("a.txt", ReadOptions::default()).await.unwrap(), None);
        b.put("a.txt", "one").await.unwrap();
        b.put("a.txt", "two").await.unwrap();
        assert_eq!(
            b.get("a.txt", ReadOptions::default()).await.unwrap(),
            Some("two".into())
        );
    }
}
