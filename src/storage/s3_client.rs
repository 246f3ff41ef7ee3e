//! S3-compatible storage client
//!
//! Wraps the AWS SDK for S3-compatible storage access.

use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{
    config::{Credentials, Region},
    error::{DisplayErrorContext, ProvideErrorMetadata},
    presigning::PresigningConfig,
    primitives::ByteStream,
    Client,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};

use crate::config::StorageConfig;
use crate::error::StorageError;

use super::traits::{ObjectStore, StorageResult};
use super::types::{ListOptions, ObjectList, StoredObject};

/// Keys requested per listing page
const LIST_PAGE_SIZE: i32 = 1000;

/// S3-compatible storage client
#[derive(Clone)]
pub struct S3Client {
    client: Client,
    bucket: String,
    read_url_ttl: Duration,
}

/// Pagination cursor for [`ObjectStore::list`]
enum ListCursor {
    Start,
    Next(String),
    Done,
}

impl S3Client {
    /// Create a new S3 client from configuration
    pub async fn new(config: &StorageConfig) -> StorageResult<Self> {
        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "htmlup",
        );

        let region = config
            .region
            .clone()
            .unwrap_or_else(|| "us-east-1".to_string());

        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint)
            .region(Region::new(region))
            .credentials_provider(credentials)
            .force_path_style(true) // Required for MinIO and other S3-compatible services
            .build();

        let client = Client::from_conf(s3_config);

        // Test connection by checking if bucket exists
        let bucket = config.bucket.clone();
        match client.head_bucket().bucket(&bucket).send().await {
            Ok(_) => {
                tracing::info!("Connected to S3 bucket: {}", bucket);
            }
            Err(e) => {
                tracing::warn!(
                    "Could not verify bucket {}: {}. Will attempt operations anyway.",
                    bucket,
                    DisplayErrorContext(&e)
                );
            }
        }

        Ok(Self {
            client,
            bucket,
            read_url_ttl: Duration::from_secs(config.read_url_ttl_secs.max(1)),
        })
    }

    /// List one page of objects in the bucket
    pub async fn list_objects(&self, options: ListOptions) -> StorageResult<ObjectList> {
        let mut request = self.client.list_objects_v2().bucket(&self.bucket);

        if let Some(prefix) = options.prefix {
            request = request.prefix(prefix);
        }

        if let Some(max_keys) = options.max_keys {
            request = request.max_keys(max_keys);
        }

        if let Some(token) = options.continuation_token {
            request = request.continuation_token(token);
        }

        let response = request.send().await.map_err(|e| {
            StorageError::Unavailable(format!("Failed to list objects: {}", DisplayErrorContext(&e)))
        })?;

        let objects: Vec<StoredObject> = response
            .contents()
            .iter()
            .map(|obj| StoredObject {
                key: obj.key().unwrap_or_default().to_string(),
                upload_timestamp: obj
                    .last_modified()
                    .and_then(|dt| DateTime::from_timestamp(dt.secs(), dt.subsec_nanos()))
                    .unwrap_or_default(),
                byte_length: obj.size().unwrap_or(0).max(0) as u64,
                content_type: None, // Not available in list response
            })
            .collect();

        Ok(ObjectList {
            objects,
            continuation_token: response.next_continuation_token().map(|s| s.to_string()),
            is_truncated: response.is_truncated().unwrap_or(false),
        })
    }

    /// Get object metadata (HEAD request)
    pub async fn head_object(&self, key: &str) -> StorageResult<StoredObject> {
        let response = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| match e.as_service_error() {
                Some(err) if err.is_not_found() => StorageError::ObjectNotFound(key.to_string()),
                Some(err) if err.code() == Some("AccessDenied") => {
                    StorageError::AccessDenied(key.to_string())
                }
                _ => StorageError::Unavailable(format!(
                    "Failed to head object {}: {}",
                    key,
                    DisplayErrorContext(&e)
                )),
            })?;

        Ok(StoredObject {
            key: key.to_string(),
            upload_timestamp: response
                .last_modified()
                .and_then(|dt| DateTime::from_timestamp(dt.secs(), dt.subsec_nanos()))
                .unwrap_or_default(),
            byte_length: response.content_length().unwrap_or(0).max(0) as u64,
            content_type: response.content_type().map(|s| s.to_string()),
        })
    }
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> StorageResult<StoredObject> {
        let byte_length = bytes.len() as u64;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| StorageError::WriteFailed {
                key: key.to_string(),
                reason: DisplayErrorContext(&e).to_string(),
            })?;

        Ok(StoredObject {
            key: key.to_string(),
            upload_timestamp: Utc::now(),
            byte_length,
            content_type: Some(content_type.to_string()),
        })
    }

    fn list<'a>(&'a self, prefix: &'a str) -> BoxStream<'a, StorageResult<StoredObject>> {
        stream::try_unfold(ListCursor::Start, move |cursor| async move {
            let mut options = ListOptions::new()
                .with_prefix(prefix)
                .with_max_keys(LIST_PAGE_SIZE);

            match cursor {
                ListCursor::Done => return Ok::<_, StorageError>(None),
                ListCursor::Next(token) => options = options.with_continuation_token(token),
                ListCursor::Start => {}
            }

            let page = self.list_objects(options).await?;
            let next = match page.continuation_token {
                Some(token) if page.is_truncated => ListCursor::Next(token),
                _ => ListCursor::Done,
            };

            let objects = page.objects.into_iter().map(Ok::<_, StorageError>);
            Ok(Some((stream::iter(objects), next)))
        })
        .try_flatten()
        .boxed()
    }

    async fn read_url(&self, key: &str) -> StorageResult<String> {
        // Presigning never contacts the bucket, so absence is checked first
        self.head_object(key).await?;

        let presigning = PresigningConfig::expires_in(self.read_url_ttl)
            .map_err(|e| StorageError::Unavailable(format!("Invalid presigning config: {}", e)))?;

        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| {
                StorageError::Unavailable(format!(
                    "Failed to presign {}: {}",
                    key,
                    DisplayErrorContext(&e)
                ))
            })?;

        Ok(request.uri().to_string())
    }

    async fn stat(&self, key: &str) -> StorageResult<StoredObject> {
        self.head_object(key).await
    }
}
