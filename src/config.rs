//! Configuration management for the htmlup server

use serde::Deserialize;
use std::env;
use std::str::FromStr;

use crate::pages::{ResolutionStrategy, SanitizerKind};
use crate::upload::CollisionPolicy;

/// Errors raised while reading configuration from the environment
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable {name}: {source}")]
    Missing {
        name: &'static str,
        #[source]
        source: env::VarError,
    },

    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub upload: UploadConfig,
    pub pages: PagesConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub provider: StorageProvider,
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: Option<String>,
    /// Logical collection every page is stored under
    pub namespace: String,
    /// Lifetime of presigned read URLs
    pub read_url_ttl_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProvider {
    Minio,
    R2,
    S3,
    B2,
    /// Process-local store, contents are lost on restart
    Memory,
}

impl StorageProvider {
    pub fn is_s3_compatible(&self) -> bool {
        !matches!(self, StorageProvider::Memory)
    }
}

impl FromStr for StorageProvider {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "minio" => Ok(StorageProvider::Minio),
            "r2" => Ok(StorageProvider::R2),
            "s3" => Ok(StorageProvider::S3),
            "b2" => Ok(StorageProvider::B2),
            "memory" => Ok(StorageProvider::Memory),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    pub collision_policy: CollisionPolicy,
    /// Maximum number of concurrently outstanding puts per batch
    pub max_in_flight: usize,
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PagesConfig {
    pub resolution: ResolutionStrategy,
    pub sanitizer: SanitizerKind,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            storage: StorageConfig {
                provider: StorageProvider::Memory,
                endpoint: "http://localhost:9000".to_string(),
                bucket: "htmlup".to_string(),
                access_key: "admin".to_string(),
                secret_key: "password123".to_string(),
                region: Some("us-east-1".to_string()),
                namespace: "uploads".to_string(),
                read_url_ttl_secs: 300,
            },
            upload: UploadConfig {
                collision_policy: CollisionPolicy::Overwrite,
                max_in_flight: 8,
                max_body_bytes: 25 * 1024 * 1024,
            },
            pages: PagesConfig {
                resolution: ResolutionStrategy::Eager,
                sanitizer: SanitizerKind::None,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Config::default();

        let provider = parse_or("STORAGE_PROVIDER", defaults.storage.provider)?;

        // Credentials are only mandatory when talking to a real bucket
        let (endpoint, bucket, access_key, secret_key) = if provider.is_s3_compatible() {
            (
                required("S3_ENDPOINT")?,
                required("S3_BUCKET")?,
                required("S3_ACCESS_KEY")?,
                required("S3_SECRET_KEY")?,
            )
        } else {
            (
                defaults.storage.endpoint,
                defaults.storage.bucket,
                defaults.storage.access_key,
                defaults.storage.secret_key,
            )
        };

        Ok(Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: parse_or("SERVER_PORT", defaults.server.port)?,
            },
            storage: StorageConfig {
                provider,
                endpoint,
                bucket,
                access_key,
                secret_key,
                region: env::var("S3_REGION").ok().or(defaults.storage.region),
                namespace: env::var("STORAGE_NAMESPACE").unwrap_or(defaults.storage.namespace),
                read_url_ttl_secs: parse_or("READ_URL_TTL_SECS", defaults.storage.read_url_ttl_secs)?,
            },
            upload: UploadConfig {
                collision_policy: parse_or(
                    "UPLOAD_COLLISION_POLICY",
                    defaults.upload.collision_policy,
                )?,
                max_in_flight: parse_or("UPLOAD_MAX_IN_FLIGHT", defaults.upload.max_in_flight)?
                    .max(1),
                max_body_bytes: parse_or("UPLOAD_MAX_BODY_BYTES", defaults.upload.max_body_bytes)?,
            },
            pages: PagesConfig {
                resolution: parse_or("PAGE_RESOLUTION", defaults.pages.resolution)?,
                sanitizer: parse_or("PAGE_SANITIZER", defaults.pages.sanitizer)?,
            },
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|source| ConfigError::Missing { name, source })
}

/// Parse an optional variable, keeping `default` when it is unset
fn parse_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}
