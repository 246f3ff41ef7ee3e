//! Page Resolver
//!
//! Maps a requested slug back to stored content:
//!
//! `Requested -> Resolving (read URL) -> Fetching (download) ->
//! Rendered | NotFound | TransientError`
//!
//! Transient failures are surfaced to the caller, never retried here.
//!
//! Only keys in normalized form are pages. Objects written under other names
//! (`uploads/My Report.html` placed in the bucket by another tool) are neither
//! listed nor served, since no upload through this service can produce them
//! and their names are not safe as `/up/` paths.

use std::collections::BTreeSet;
use std::sync::Arc;

use futures::TryStreamExt;

use crate::naming::{self, Namespace, StorageKey, HTML_SUFFIX};
use crate::storage::{ContentFetcher, ObjectStore};

use super::index::PageIndex;
use super::sanitize::{Passthrough, Sanitizer};
use super::types::{PageError, PageView, ResolutionStrategy, ResolveStage};

/// Resolves slugs to page content
#[derive(Clone)]
pub struct PageResolver {
    store: Arc<dyn ObjectStore>,
    fetcher: Arc<dyn ContentFetcher>,
    namespace: Namespace,
    sanitizer: Arc<dyn Sanitizer>,
    strategy: ResolutionStrategy,
    index: PageIndex,
}

impl PageResolver {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        fetcher: Arc<dyn ContentFetcher>,
        namespace: Namespace,
    ) -> Self {
        Self {
            store,
            fetcher,
            namespace,
            sanitizer: Arc::new(Passthrough),
            strategy: ResolutionStrategy::default(),
            index: PageIndex::new(),
        }
    }

    pub fn with_sanitizer(mut self, sanitizer: Arc<dyn Sanitizer>) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    pub fn with_strategy(mut self, strategy: ResolutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn strategy(&self) -> ResolutionStrategy {
        self.strategy
    }

    pub fn index(&self) -> &PageIndex {
        &self.index
    }

    /// Enumerate the slugs of every page in the store, sorted
    pub async fn list_known_slugs(&self) -> Result<Vec<String>, PageError> {
        let prefix = self.namespace.list_prefix();
        let mut objects = self.store.list(&prefix);
        let mut slugs = BTreeSet::new();

        while let Some(object) = objects.try_next().await.map_err(|e| PageError::Transient {
            stage: ResolveStage::Listing,
            reason: e.to_string(),
        })? {
            let slug = self
                .namespace
                .strip(&object.key)
                .filter(|key| key.ends_with(HTML_SUFFIX))
                .map(naming::slug_of)
                .filter(|slug| naming::is_canonical_slug(slug));

            match slug {
                Some(slug) => {
                    slugs.insert(slug.to_string());
                }
                None => tracing::debug!(key = %object.key, "Skipping object that is not a page"),
            }
        }

        Ok(slugs.into_iter().collect())
    }

    /// Rebuild the index from the store, returning the number of pages
    pub async fn refresh_index(&self) -> Result<usize, PageError> {
        let slugs = self.list_known_slugs().await?;
        let count = slugs.len();
        self.index.replace(slugs).await;
        tracing::info!(pages = count, "Page index rebuilt");
        Ok(count)
    }

    /// Record a freshly uploaded page
    pub async fn register(&self, slug: &str) {
        self.index.insert(slug).await;
    }

    /// Fetch and render the page stored under `slug`
    pub async fn resolve(&self, slug: &str) -> Result<PageView, PageError> {
        if !naming::is_canonical_slug(slug) {
            tracing::debug!(slug, "Rejecting non-canonical slug");
            return Err(PageError::NotFound(slug.to_string()));
        }

        let indexed = self.index.contains(slug).await;
        if self.strategy == ResolutionStrategy::EagerStrict && !indexed {
            return Err(PageError::NotFound(slug.to_string()));
        }

        let key = StorageKey::from_slug(slug);
        let path = self.namespace.object_path(&key);

        let result = self.fetch(slug, &path).await;

        match (&result, indexed) {
            (Err(e), true) if e.is_not_found() => {
                tracing::info!(slug, "Indexed page no longer exists");
                self.index.remove(slug).await;
            }
            (Ok(_), false) if self.strategy == ResolutionStrategy::Eager => {
                self.index.insert(slug).await;
            }
            _ => {}
        }

        result
    }

    async fn fetch(&self, slug: &str, path: &str) -> Result<PageView, PageError> {
        let url = self
            .store
            .read_url(path)
            .await
            .map_err(|e| PageError::from_storage(slug, ResolveStage::Resolving, e))?;

        let bytes = self
            .fetcher
            .fetch(&url)
            .await
            .map_err(|e| PageError::from_storage(slug, ResolveStage::Fetching, e))?;

        let html = String::from_utf8_lossy(&bytes);
        let html_content = self.sanitizer.sanitize(&html)?;

        tracing::debug!(slug, bytes = bytes.len(), "Page rendered");

        Ok(PageView {
            slug: slug.to_string(),
            html_content,
        })
    }
}
