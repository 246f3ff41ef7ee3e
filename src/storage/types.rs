//! Storage types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata of an object held by a store
///
/// Objects are never modified in place: a second `put` to the same key
/// replaces the whole object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    /// Full object path, namespace included
    pub key: String,
    pub upload_timestamp: DateTime<Utc>,
    pub byte_length: u64,
    /// Not reported by every listing API
    pub content_type: Option<String>,
}

/// One page of a listing
#[derive(Debug, Clone)]
pub struct ObjectList {
    pub objects: Vec<StoredObject>,
    pub continuation_token: Option<String>,
    pub is_truncated: bool,
}

/// Options for listing objects
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub prefix: Option<String>,
    pub max_keys: Option<i32>,
    pub continuation_token: Option<String>,
}

impl ListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_max_keys(mut self, max_keys: i32) -> Self {
        self.max_keys = Some(max_keys);
        self
    }

    pub fn with_continuation_token(mut self, token: impl Into<String>) -> Self {
        self.continuation_token = Some(token.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_options_builder() {
        let options = ListOptions::new()
            .with_prefix("uploads/")
            .with_max_keys(100)
            .with_continuation_token("abc");

        assert_eq!(options.prefix, Some("uploads/".to_string()));
        assert_eq!(options.max_keys, Some(100));
        assert_eq!(options.continuation_token, Some("abc".to_string()));
    }
}
