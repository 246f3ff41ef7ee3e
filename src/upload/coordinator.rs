//! Upload Coordinator
//!
//! Stores a batch of uploaded files:
//! - Names are normalized into storage keys
//! - The collision policy decides the final key of each item
//! - Puts run concurrently, bounded by `max_in_flight`
//! - Every item gets its own result; one failure never fails the batch
//!
//! Results come back in submission order regardless of which put finished
//! first. Nothing is retried.

use std::collections::HashSet;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::Instrument;
use uuid::Uuid;

use crate::naming::{self, Namespace, StorageKey};
use crate::storage::ObjectStore;

use super::types::{CollisionPolicy, UploadError, UploadItem, UploadResult, MAX_SUFFIX_ATTEMPTS};

/// An item whose final key has been decided
struct PlannedWrite {
    key: StorageKey,
    item: UploadItem,
}

/// Coordinates batch uploads into the object store
#[derive(Clone)]
pub struct UploadCoordinator {
    store: Arc<dyn ObjectStore>,
    namespace: Namespace,
    policy: CollisionPolicy,
    max_in_flight: usize,
}

impl UploadCoordinator {
    pub fn new(store: Arc<dyn ObjectStore>, namespace: Namespace) -> Self {
        Self {
            store,
            namespace,
            policy: CollisionPolicy::default(),
            max_in_flight: 8,
        }
    }

    pub fn with_policy(mut self, policy: CollisionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight.max(1);
        self
    }

    /// Store every item, returning one result per item in submission order
    pub async fn submit(&self, items: Vec<UploadItem>) -> Vec<UploadResult> {
        let batch_id = Uuid::new_v4();
        let span = tracing::info_span!("upload_batch", %batch_id, items = items.len());

        async move {
            let planned = self.plan(items).await;

            let results: Vec<UploadResult> = stream::iter(planned)
                .map(|plan| async move {
                    match plan {
                        Ok(write) => self.write(write).await,
                        Err(result) => result,
                    }
                })
                .buffered(self.max_in_flight)
                .collect()
                .await;

            let succeeded = results.iter().filter(|r| r.is_success()).count();
            tracing::info!(
                succeeded,
                failed = results.len() - succeeded,
                "Upload batch complete"
            );

            results
        }
        .instrument(span)
        .await
    }

    /// Decide the key of every item; items that cannot be written get their
    /// final result here
    async fn plan(&self, items: Vec<UploadItem>) -> Vec<Result<PlannedWrite, UploadResult>> {
        let mut claimed: HashSet<StorageKey> = HashSet::new();
        let mut planned = Vec::with_capacity(items.len());

        for item in items {
            let key = naming::normalize(&item.raw_name);

            if key.is_malformed() {
                tracing::warn!(raw_name = %item.raw_name, "Rejecting upload with unusable filename");
                let error = UploadError::MalformedInput(item.raw_name.clone());
                planned.push(Err(UploadResult::failure(key.slug(), &error)));
                continue;
            }

            let decided = match self.policy {
                CollisionPolicy::Overwrite => Ok(key),
                CollisionPolicy::Reject => self.claim_exact(key, &claimed).await,
                CollisionPolicy::Suffix => self.claim_suffixed(key, &claimed).await,
            };

            match decided {
                Ok(key) => {
                    claimed.insert(key.clone());
                    planned.push(Ok(PlannedWrite { key, item }));
                }
                Err((slug, error)) => {
                    tracing::warn!(raw_name = %item.raw_name, error = %error, "Upload not attempted");
                    planned.push(Err(UploadResult::failure(&slug, &error)));
                }
            }
        }

        planned
    }

    /// `reject`: the key must be free in the store and in this batch
    async fn claim_exact(
        &self,
        key: StorageKey,
        claimed: &HashSet<StorageKey>,
    ) -> Result<StorageKey, (String, UploadError)> {
        let slug = key.slug().to_string();
        if claimed.contains(&key) {
            return Err((slug, UploadError::Conflict(key.to_string())));
        }

        match self.is_taken(&key).await {
            Ok(false) => Ok(key),
            Ok(true) => Err((slug, UploadError::Conflict(key.to_string()))),
            Err(e) => Err((slug, e)),
        }
    }

    /// `suffix`: first free key among `name`, `name-1`, `name-2`, ...
    async fn claim_suffixed(
        &self,
        key: StorageKey,
        claimed: &HashSet<StorageKey>,
    ) -> Result<StorageKey, (String, UploadError)> {
        let slug = key.slug().to_string();

        for attempt in 0..=MAX_SUFFIX_ATTEMPTS {
            let candidate = if attempt == 0 {
                key.clone()
            } else {
                key.with_counter(attempt)
            };

            if claimed.contains(&candidate) {
                continue;
            }

            match self.is_taken(&candidate).await {
                Ok(false) => {
                    if attempt > 0 {
                        tracing::debug!(original = %key, renamed = %candidate, "Key taken, using suffix");
                    }
                    return Ok(candidate);
                }
                Ok(true) => continue,
                Err(e) => return Err((slug, e)),
            }
        }

        Err((slug, UploadError::SuffixExhausted(key.to_string())))
    }

    /// Whether an object already exists at `key`
    ///
    /// Check-then-put is not atomic; a concurrent writer can still take the
    /// key before our put lands.
    async fn is_taken(&self, key: &StorageKey) -> Result<bool, UploadError> {
        match self.store.stat(&self.namespace.object_path(key)).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(UploadError::Storage(e)),
        }
    }

    async fn write(&self, write: PlannedWrite) -> UploadResult {
        let PlannedWrite { key, item } = write;
        let path = self.namespace.object_path(&key);

        match self.store.put(&path, item.bytes, &item.content_type).await {
            Ok(stored) => {
                tracing::info!(
                    raw_name = %item.raw_name,
                    key = %stored.key,
                    bytes = stored.byte_length,
                    "Page stored"
                );
                UploadResult::success(key.slug())
            }
            Err(e) => {
                tracing::warn!(raw_name = %item.raw_name, key = %path, error = %e, "Page upload failed");
                UploadResult::failure(key.slug(), &UploadError::Storage(e))
            }
        }
    }
}
