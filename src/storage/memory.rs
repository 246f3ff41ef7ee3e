//! In-memory object store
//!
//! Process-local backend used for development and tests. Read URLs are
//! `memory://<key>` handles that only this store can dereference.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::RwLock;

use crate::error::StorageError;

use super::traits::{ContentFetcher, ObjectStore, StorageResult};
use super::types::StoredObject;

const URL_SCHEME: &str = "memory://";

#[derive(Debug, Clone)]
struct MemoryObject {
    metadata: StoredObject,
    data: Bytes,
}

/// In-memory object store
#[derive(Clone, Default)]
pub struct MemoryStore {
    objects: Arc<RwLock<BTreeMap<String, MemoryObject>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw content of an object
    pub async fn get(&self, key: &str) -> Option<Bytes> {
        self.objects.read().await.get(key).map(|o| o.data.clone())
    }

    /// Number of stored objects
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> StorageResult<StoredObject> {
        let metadata = StoredObject {
            key: key.to_string(),
            upload_timestamp: Utc::now(),
            byte_length: bytes.len() as u64,
            content_type: Some(content_type.to_string()),
        };

        self.objects.write().await.insert(
            key.to_string(),
            MemoryObject {
                metadata: metadata.clone(),
                data: bytes,
            },
        );

        Ok(metadata)
    }

    fn list<'a>(&'a self, prefix: &'a str) -> BoxStream<'a, StorageResult<StoredObject>> {
        // Snapshot taken on first poll; no lock is held while the caller iterates
        stream::once(async move {
            let objects = self.objects.read().await;
            let snapshot: Vec<StorageResult<StoredObject>> = objects
                .range(prefix.to_string()..)
                .take_while(|(key, _)| key.starts_with(prefix))
                .map(|(_, object)| Ok(object.metadata.clone()))
                .collect();
            snapshot
        })
        .flat_map(stream::iter)
        .boxed()
    }

    async fn read_url(&self, key: &str) -> StorageResult<String> {
        if !self.objects.read().await.contains_key(key) {
            return Err(StorageError::ObjectNotFound(key.to_string()));
        }
        Ok(format!("{}{}", URL_SCHEME, key))
    }

    async fn stat(&self, key: &str) -> StorageResult<StoredObject> {
        self.objects
            .read()
            .await
            .get(key)
            .map(|o| o.metadata.clone())
            .ok_or_else(|| StorageError::ObjectNotFound(key.to_string()))
    }
}

#[async_trait]
impl ContentFetcher for MemoryStore {
    async fn fetch(&self, url: &str) -> StorageResult<Bytes> {
        let key = url
            .strip_prefix(URL_SCHEME)
            .ok_or_else(|| StorageError::InvalidHandle(url.to_string()))?;

        self.get(key)
            .await
            .ok_or_else(|| StorageError::ObjectNotFound(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;

    #[tokio::test]
    async fn test_put_and_stat() {
        let store = MemoryStore::new();

        let stored = store
            .put("uploads/a.html", Bytes::from_static(b"<p>a</p>"), "text/html")
            .await
            .unwrap();
        assert_eq!(stored.byte_length, 8);

        let stat = store.stat("uploads/a.html").await.unwrap();
        assert_eq!(stat, stored);
        assert_eq!(stat.content_type.as_deref(), Some("text/html"));
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let store = MemoryStore::new();
        store.put("k", Bytes::from_static(b"one"), "text/html").await.unwrap();
        store.put("k", Bytes::from_static(b"two"), "text/html").await.unwrap();

        assert_eq!(store.len().await, 1);
        assert_eq!(store.get("k").await.unwrap(), Bytes::from_static(b"two"));
    }

    #[tokio::test]
    async fn test_missing_object() {
        let store = MemoryStore::new();

        assert!(store.stat("nope").await.unwrap_err().is_not_found());
        assert!(store.read_url("nope").await.unwrap_err().is_not_found());
        assert!(store.fetch("memory://nope").await.unwrap_err().is_not_found());
        assert!(matches!(
            store.fetch("https://example.com/x").await,
            Err(StorageError::InvalidHandle(_))
        ));
    }

    #[tokio::test]
    async fn test_list_prefix_is_restartable() {
        let store = MemoryStore::new();
        for key in ["uploads/a.html", "uploads/b.html", "other/c.html"] {
            store.put(key, Bytes::from_static(b"x"), "text/html").await.unwrap();
        }

        for _ in 0..2 {
            let keys: Vec<String> = store
                .list("uploads/")
                .map_ok(|o| o.key)
                .try_collect()
                .await
                .unwrap();
            assert_eq!(keys, vec!["uploads/a.html", "uploads/b.html"]);
        }
    }

    #[tokio::test]
    async fn test_read_url_round_trip() {
        let store = MemoryStore::new();
        store
            .put("uploads/a.html", Bytes::from_static(b"hello"), "text/html")
            .await
            .unwrap();

        let url = store.read_url("uploads/a.html").await.unwrap();
        assert_eq!(url, "memory://uploads/a.html");
        assert_eq!(store.fetch(&url).await.unwrap(), Bytes::from_static(b"hello"));
    }
}
