//! Application state management

use std::sync::Arc;

use crate::config::Config;
use crate::error::StorageError;
use crate::naming::Namespace;
use crate::pages::PageResolver;
use crate::storage::{ContentFetcher, HttpFetcher, MemoryStore, ObjectStore, S3Client};
use crate::upload::UploadCoordinator;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    coordinator: UploadCoordinator,
    resolver: PageResolver,
}

impl AppState {
    /// Create application state over an explicit store and fetcher
    pub fn new(
        config: Config,
        store: Arc<dyn ObjectStore>,
        fetcher: Arc<dyn ContentFetcher>,
    ) -> Self {
        let namespace = Namespace::new(config.storage.namespace.clone());

        let coordinator = UploadCoordinator::new(store.clone(), namespace.clone())
            .with_policy(config.upload.collision_policy)
            .with_max_in_flight(config.upload.max_in_flight);

        let resolver = PageResolver::new(store, fetcher, namespace)
            .with_strategy(config.pages.resolution)
            .with_sanitizer(config.pages.sanitizer.build());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                coordinator,
                resolver,
            }),
        }
    }

    /// Create application state with the backend named in the configuration
    pub async fn from_config(config: Config) -> Result<Self, StorageError> {
        if config.storage.provider.is_s3_compatible() {
            let client = S3Client::new(&config.storage).await?;
            Ok(Self::new(config, Arc::new(client), Arc::new(HttpFetcher::default())))
        } else {
            tracing::warn!("Using in-memory storage; uploaded pages are lost on restart");
            let store = MemoryStore::new();
            Ok(Self::new(config, Arc::new(store.clone()), Arc::new(store)))
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the upload coordinator
    pub fn coordinator(&self) -> &UploadCoordinator {
        &self.inner.coordinator
    }

    /// Get the page resolver
    pub fn resolver(&self) -> &PageResolver {
        &self.inner.resolver
    }
}
