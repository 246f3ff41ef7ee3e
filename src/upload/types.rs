//! Upload types

use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::naming;

/// Content type used when the client did not send one
pub const DEFAULT_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// How far the `suffix` policy searches for a free key
pub const MAX_SUFFIX_ATTEMPTS: u32 = 100;

/// A file selected for upload
///
/// Lives only until the coordinator has processed it.
#[derive(Debug, Clone)]
pub struct UploadItem {
    /// Filename as supplied by the client
    pub raw_name: String,
    pub bytes: Bytes,
    pub content_type: String,
}

impl UploadItem {
    pub fn new(raw_name: impl Into<String>, bytes: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Self {
            raw_name: raw_name.into(),
            bytes: bytes.into(),
            content_type: content_type.into(),
        }
    }

    /// HTML item with the default content type
    pub fn html(raw_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self::new(raw_name, bytes, DEFAULT_CONTENT_TYPE)
    }
}

/// What happens when an upload's key is already taken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Replace the existing page; last writer wins
    #[default]
    Overwrite,
    /// Report the item as failed
    Reject,
    /// Store under the first free `name-N.html`
    Suffix,
}

impl FromStr for CollisionPolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "overwrite" => Ok(CollisionPolicy::Overwrite),
            "reject" => Ok(CollisionPolicy::Reject),
            "suffix" => Ok(CollisionPolicy::Suffix),
            _ => Err(()),
        }
    }
}

/// Per-item outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Success,
    Error,
}

/// Result of one item in a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    #[serde(rename = "name")]
    pub slug: String,
    pub status: UploadStatus,
    #[serde(rename = "url", skip_serializing_if = "Option::is_none")]
    pub public_url: Option<String>,
    #[serde(rename = "error", skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl UploadResult {
    pub fn success(slug: &str) -> Self {
        Self {
            slug: slug.to_string(),
            status: UploadStatus::Success,
            public_url: Some(naming::public_url(slug)),
            error_detail: None,
        }
    }

    pub fn failure(slug: &str, error: &UploadError) -> Self {
        Self {
            slug: slug.to_string(),
            status: UploadStatus::Error,
            public_url: None,
            error_detail: Some(error.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == UploadStatus::Success
    }
}

/// Response body of the upload endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub results: Vec<UploadResult>,
    pub succeeded: usize,
    pub failed: usize,
}

impl From<Vec<UploadResult>> for UploadResponse {
    fn from(results: Vec<UploadResult>) -> Self {
        let succeeded = results.iter().filter(|r| r.is_success()).count();
        let failed = results.len() - succeeded;
        Self {
            results,
            succeeded,
            failed,
        }
    }
}

/// Why a single item could not be stored
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Filename {0:?} does not contain a usable name")]
    MalformedInput(String),

    #[error("A page named {0:?} already exists")]
    Conflict(String),

    #[error("No free name found for {0:?}")]
    SuffixExhausted(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collision_policy_from_str() {
        assert_eq!("Reject".parse::<CollisionPolicy>(), Ok(CollisionPolicy::Reject));
        assert_eq!("suffix".parse::<CollisionPolicy>(), Ok(CollisionPolicy::Suffix));
        assert!("merge".parse::<CollisionPolicy>().is_err());
    }

    #[test]
    fn test_result_wire_format() {
        let ok = serde_json::to_value(UploadResult::success("My-Report")).unwrap();
        assert_eq!(
            ok,
            serde_json::json!({ "name": "My-Report", "status": "success", "url": "/up/My-Report" })
        );

        let err = UploadResult::failure("x", &UploadError::Conflict("x.html".into()));
        let err = serde_json::to_value(err).unwrap();
        assert_eq!(err["status"], "error");
        assert!(err.get("url").is_none());
        assert!(err["error"].as_str().unwrap().contains("already exists"));
    }

    #[test]
    fn test_response_counts() {
        let response = UploadResponse::from(vec![
            UploadResult::success("a"),
            UploadResult::failure("b", &UploadError::MalformedInput(String::new())),
            UploadResult::success("c"),
        ]);
        assert_eq!(response.succeeded, 2);
        assert_eq!(response.failed, 1);
    }
}
