//! Page resolution types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// Rendered content of a stored page
///
/// Built per request and never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageView {
    pub slug: String,
    pub html_content: String,
}

/// How requested slugs are matched against stored pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionStrategy {
    /// Every request goes to the store
    OnDemand,
    /// Slugs are enumerated up front; unknown slugs fall back to the store
    #[default]
    Eager,
    /// Only enumerated (or since uploaded) slugs are served
    EagerStrict,
}

impl ResolutionStrategy {
    /// Whether the page index is built at startup
    pub fn prefetches_index(&self) -> bool {
        !matches!(self, ResolutionStrategy::OnDemand)
    }
}

impl FromStr for ResolutionStrategy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "on-demand" | "lazy" => Ok(ResolutionStrategy::OnDemand),
            "eager" => Ok(ResolutionStrategy::Eager),
            "eager-strict" | "strict" => Ok(ResolutionStrategy::EagerStrict),
            _ => Err(()),
        }
    }
}

/// Step of the resolution pipeline a transient failure happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveStage {
    Listing,
    Resolving,
    Fetching,
}

impl fmt::Display for ResolveStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ResolveStage::Listing => "listing pages",
            ResolveStage::Resolving => "resolving page",
            ResolveStage::Fetching => "fetching page",
        })
    }
}

/// Page resolution errors
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("Page not found: {0}")]
    NotFound(String),

    /// Network or availability failure; the caller may retry
    #[error("Storage unavailable while {stage}: {reason}")]
    Transient { stage: ResolveStage, reason: String },

    #[error("Sanitizer failed: {0}")]
    Sanitize(#[from] SanitizeError),
}

impl PageError {
    /// Convert a storage failure for `slug` at `stage`
    pub fn from_storage(slug: &str, stage: ResolveStage, error: StorageError) -> Self {
        match error {
            StorageError::ObjectNotFound(_) => PageError::NotFound(slug.to_string()),
            other => PageError::Transient {
                stage,
                reason: other.to_string(),
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PageError::NotFound(_))
    }
}

/// Sanitization errors
#[derive(Debug, thiserror::Error)]
pub enum SanitizeError {
    #[error("HTML rewrite failed: {0}")]
    Rewrite(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("lazy".parse::<ResolutionStrategy>(), Ok(ResolutionStrategy::OnDemand));
        assert_eq!("Eager".parse::<ResolutionStrategy>(), Ok(ResolutionStrategy::Eager));
        assert_eq!(
            "eager-strict".parse::<ResolutionStrategy>(),
            Ok(ResolutionStrategy::EagerStrict)
        );
        assert!("sometimes".parse::<ResolutionStrategy>().is_err());
    }

    #[test]
    fn test_storage_error_mapping() {
        let not_found = PageError::from_storage(
            "a",
            ResolveStage::Fetching,
            StorageError::ObjectNotFound("uploads/a.html".into()),
        );
        assert!(not_found.is_not_found());

        let denied = PageError::from_storage(
            "a",
            ResolveStage::Resolving,
            StorageError::AccessDenied("uploads/a.html".into()),
        );
        assert!(matches!(
            denied,
            PageError::Transient { stage: ResolveStage::Resolving, .. }
        ));
    }
}
