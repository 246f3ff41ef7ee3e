//! Fault-injecting store for unit tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, BoxStream, StreamExt};

use crate::error::StorageError;

use super::memory::MemoryStore;
use super::traits::{ContentFetcher, ObjectStore, StorageResult};
use super::types::StoredObject;

/// Wraps a [`MemoryStore`], failing or delaying selected operations
#[derive(Clone, Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    /// Puts to keys containing any of these substrings fail
    fail_puts: Vec<String>,
    /// Per-key put delay, to scramble completion order
    put_delays: HashMap<String, Duration>,
    fail_reads: bool,
    fail_list: bool,
    pub puts: Arc<AtomicUsize>,
    pub stats: Arc<AtomicUsize>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_puts(mut self, pattern: &str) -> Self {
        self.fail_puts.push(pattern.to_string());
        self
    }

    pub fn delayed_put(mut self, key: &str, delay: Duration) -> Self {
        self.put_delays.insert(key.to_string(), delay);
        self
    }

    pub fn failing_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    pub fn failing_list(mut self) -> Self {
        self.fail_list = true;
        self
    }

    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn stat_count(&self) -> usize {
        self.stats.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for FlakyStore {
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> StorageResult<StoredObject> {
        self.puts.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.put_delays.get(key) {
            tokio::time::sleep(*delay).await;
        }

        if self.fail_puts.iter().any(|p| key.contains(p.as_str())) {
            return Err(StorageError::WriteFailed {
                key: key.to_string(),
                reason: "injected failure".to_string(),
            });
        }

        self.inner.put(key, bytes, content_type).await
    }

    fn list<'a>(&'a self, prefix: &'a str) -> BoxStream<'a, StorageResult<StoredObject>> {
        if self.fail_list {
            return stream::once(async {
                Err(StorageError::Unavailable("injected list failure".to_string()))
            })
            .boxed();
        }
        self.inner.list(prefix)
    }

    async fn read_url(&self, key: &str) -> StorageResult<String> {
        if self.fail_reads {
            return Err(StorageError::Unavailable("injected read failure".to_string()));
        }
        self.inner.read_url(key).await
    }

    async fn stat(&self, key: &str) -> StorageResult<StoredObject> {
        self.stats.fetch_add(1, Ordering::SeqCst);
        self.inner.stat(key).await
    }
}

#[async_trait]
impl ContentFetcher for FlakyStore {
    async fn fetch(&self, url: &str) -> StorageResult<Bytes> {
        self.inner.fetch(url).await
    }
}
