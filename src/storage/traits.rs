//! Storage traits
//!
//! Vendor-agnostic interfaces over the object store. Every call is remote
//! I/O; nothing is cached.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use crate::error::StorageError;

use super::types::StoredObject;

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Durable key -> blob store
///
/// There is no locking: concurrent writes to one key race and the last write
/// observed by the backend wins.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write `bytes` at `key`, replacing any existing object
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> StorageResult<StoredObject>;

    /// Stream all objects under `prefix`
    ///
    /// The stream is lazy and finite. Calling `list` again starts over.
    /// Order is unspecified.
    fn list<'a>(&'a self, prefix: &'a str) -> BoxStream<'a, StorageResult<StoredObject>>;

    /// URL (or backend handle) the full content can be fetched from
    async fn read_url(&self, key: &str) -> StorageResult<String>;

    /// Object metadata
    async fn stat(&self, key: &str) -> StorageResult<StoredObject>;
}

/// Dereferences URLs produced by [`ObjectStore::read_url`]
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> StorageResult<Bytes>;
}
