//! Known-slug index
//!
//! Holds the slugs enumerated from the store (and those uploaded since).
//! Only slugs are kept; page content is always fetched per request.

use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct PageIndex {
    slugs: Arc<RwLock<BTreeSet<String>>>,
}

impl PageIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole index
    pub async fn replace(&self, slugs: impl IntoIterator<Item = String>) {
        *self.slugs.write().await = slugs.into_iter().collect();
    }

    pub async fn insert(&self, slug: &str) {
        self.slugs.write().await.insert(slug.to_string());
    }

    pub async fn remove(&self, slug: &str) {
        self.slugs.write().await.remove(slug);
    }

    pub async fn contains(&self, slug: &str) -> bool {
        self.slugs.read().await.contains(slug)
    }

    /// Sorted snapshot
    pub async fn slugs(&self) -> Vec<String> {
        self.slugs.read().await.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replace_and_lookup() {
        let index = PageIndex::new();
        index.insert("stale").await;
        index.replace(vec!["b".to_string(), "a".to_string()]).await;

        assert!(!index.contains("stale").await);
        assert!(index.contains("a").await);
        assert_eq!(index.slugs().await, vec!["a", "b"]);

        index.remove("a").await;
        assert_eq!(index.slugs().await, vec!["b"]);
    }
}
