use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::backend::{KvBackend, ReadOptions};
use crate::decode::decode_payload;
use crate::error::{AppError, AppResult};

/// Key whose reads are capped at [`IP_LIST_MAX_LINES`].
pub const IP_LIST_KEY: &str = "ip.txt";
pub const IP_LIST_MAX_LINES: usize = 2000;
/// Returned in place of the IP list when nothing is stored.
pub const NO_IP_DATA: &str = "没有 IP 地址数据";

/// Read and write contracts layered over a [`KvBackend`].
#[derive(Clone)]
pub struct ContentStore {
    backend: Arc<dyn KvBackend>,
    read_opts: ReadOptions,
}

impl ContentStore {
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self {
            backend,
            read_opts: ReadOptions::default(),
        }
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.read_opts.cache_ttl = ttl;
        self
    }

    /// The stored IP list, truncated to its first 2000 lines.
    pub async fn read_list(&self) -> AppResult<String> {
        match self.backend.get(IP_LIST_KEY, self.read_opts).await? {
            Some(value) if !value.is_empty() => Ok(first_lines(&value, IP_LIST_MAX_LINES)),
            _ => Ok(NO_IP_DATA.to_owned()),
        }
    }

    /// Plain read; the value comes back untouched.
    pub async fn read(&self, key: &str) -> AppResult<String> {
        self.backend
            .get(key, self.read_opts)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Store `content` under `key`, then read it back and require an exact
    /// match. A mismatch leaves the put in place.
    pub async fn write_and_verify(&self, key: &str, content: &str) -> AppResult<String> {
        self.backend.put(key, content).await?;
        let readback = self.backend.get(key, self.read_opts).await?;

        match readback {
            Some(stored) if stored == content => {
                debug!(key = %key, bytes = content.len(), "write verified");
                Ok(stored)
            }
            _ => {
                warn!(key = %key, "readback differs from written content");
                Err(AppError::Verification)
            }
        }
    }

    /// Read when no payload is supplied, otherwise decode and write.
    pub async fn file_operation(
        &self,
        key: &str,
        text: Option<&str>,
        b64: Option<&str>,
    ) -> AppResult<String> {
        match decode_payload(text, b64)? {
            None => self.read(key).await,
            Some(content) => self.write_and_verify(key, &content).await,
        }
    }
}

fn first_lines(value: &str, max: usize) -> String {
    value.split('\n').take(max).collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryBackend;
    use async_trait::async_trait;

    fn memory_store() -> ContentStore {
        ContentStore::new(Arc::new(MemoryBackend::new()))
    }

    /// Accepts puts but keeps answering reads with what it held before.
    struct StaleBackend {
        value: Option<String>,
    }

    #[async_trait]
    impl KvBackend for StaleBackend {
        async fn get(&self, _key: &str, _opts: ReadOptions) -> anyhow::Result<Option<String>> {
            Ok(self.value.clone())
        }

        async fn put(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
            Ok(())
        }
    }

    struct BrokenBackend;

    #[async_trait]
    impl KvBackend for BrokenBackend {
        async fn get(&self, _key: &str, _opts: ReadOptions) -> anyhow::Result<Option<String>> {
            anyhow::bail!("backend unreachable")
        }

        async fn put(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
            anyhow::bail!("backend unreachable")
        }
    }

    /// Remembers the options of the last read.
    #[derive(Default)]
    struct RecordingBackend {
        last_opts: std::sync::Mutex<Option<ReadOptions>>,
    }

    #[async_trait]
    impl KvBackend for RecordingBackend {
        async fn get(&self, _key: &str, opts: ReadOptions) -> anyhow::Result<Option<String>> {
            *self.last_opts.lock().unwrap() = Some(opts);
            Ok(None)
        }

        async fn put(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn configured_cache_ttl_reaches_backend() {
        let backend = Arc::new(RecordingBackend::default());
        let s = ContentStore::new(backend.clone()).with_cache_ttl(Duration::from_secs(5));
        s.read_list().await.unwrap();
        assert_eq!(
            backend.last_opts.lock().unwrap().map(|o| o.cache_ttl),
            Some(Duration::from_secs(5))
        );
    }

    #[tokio::test]
    async fn write_then_read_returns_content() {
        let s = memory_store();
        let content = "line one\nзначение\n\tindented";
        assert_eq!(s.write_and_verify("a.txt", content).await.unwrap(), content);
        assert_eq!(s.read("a.txt").await.unwrap(), content);
    }

    #[tokio::test]
    async fn missing_key_is_not_found() {
        let s = memory_store();
        assert!(matches!(s.read("nope.txt").await, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn missing_ip_list_is_sentinel() {
        let s = memory_store();
        assert_eq!(s.read_list().await.unwrap(), NO_IP_DATA);
    }

    #[tokio::test]
    async fn empty_ip_list_is_sentinel() {
        let s = memory_store();
        s.write_and_verify(IP_LIST_KEY, "").await.unwrap();
        assert_eq!(s.read_list().await.unwrap(), NO_IP_DATA);
    }

    #[tokio::test]
    async fn ip_list_truncated_to_2000_lines() {
        let s = memory_store();
        let lines: Vec<String> = (1..=3000)
            .map(|i| format!("10.0.{}.{}", i / 256, i % 256))
            .collect();
        s.write_and_verify(IP_LIST_KEY, &lines.join("\n")).await.unwrap();

        let listed = s.read_list().await.unwrap();
        assert_eq!(listed, lines[..2000].join("\n"));
        assert!(!listed.contains(&lines[2000]));
    }

    #[tokio::test]
    async fn plain_read_of_ip_list_not_truncated() {
        let s = memory_store();
        let body = vec!["x"; 2500].join("\n");
        s.write_and_verify(IP_LIST_KEY, &body).await.unwrap();
        assert_eq!(s.read(IP_LIST_KEY).await.unwrap(), body);
    }

    #[tokio::test]
    async fn stale_readback_fails_verification() {
        let s = ContentStore::new(Arc::new(StaleBackend {
            value: Some("old".into()),
        }));
        let err = s.write_and_verify("a.txt", "new").await.unwrap_err();
        assert!(matches!(err, AppError::Verification));

        let s = ContentStore::new(Arc::new(StaleBackend { value: None }));
        assert!(matches!(
            s.write_and_verify("a.txt", "new").await,
            Err(AppError::Verification)
        ));
    }

    #[tokio::test]
    async fn backend_failure_propagates() {
        let s = ContentStore::new(Arc::new(BrokenBackend));
        assert!(matches!(s.read("a.txt").await, Err(AppError::Backend(_))));
        assert!(matches!(
            s.write_and_verify("a.txt", "v").await,
            Err(AppError::Backend(_))
        ));
    }

    #[tokio::test]
    async fn file_operation_dispatches_on_payload() {
        let s = memory_store();
        assert!(matches!(
            s.file_operation("f.txt", None, None).await,
            Err(AppError::NotFound)
        ));
        assert_eq!(
            s.file_operation("f.txt", None, Some("aGVsbG8=")).await.unwrap(),
            "hello"
        );
        assert_eq!(s.file_operation("f.txt", None, None).await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn bad_base64_never_writes() {
        let s = memory_store();
        assert!(matches!(
            s.file_operation("f.txt", None, Some("@@@")).await,
            Err(AppError::Decode)
        ));
        assert!(matches!(s.read("f.txt").await, Err(AppError::NotFound)));
    }
}
