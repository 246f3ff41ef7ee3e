//! Object storage
//!
//! A durable key -> blob store behind [`ObjectStore`], with two backends:
//! S3-compatible services (MinIO, Cloudflare R2, Backblaze B2, AWS S3) and a
//! process-local in-memory store. Read URLs handed out by a store are turned
//! into bytes by a [`ContentFetcher`].

mod fetcher;
mod memory;
mod s3_client;
mod traits;
mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use fetcher::HttpFetcher;
pub use memory::MemoryStore;
pub use s3_client::S3Client;
pub use traits::{ContentFetcher, ObjectStore, StorageResult};
pub use types::*;
