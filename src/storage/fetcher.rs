//! HTTP content fetcher for presigned read URLs

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;

use crate::error::StorageError;

use super::traits::{ContentFetcher, StorageResult};

/// Fetches object content over HTTP(S)
#[derive(Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ContentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> StorageResult<Bytes> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| StorageError::Unavailable(format!("Fetch failed: {}", e)))?;

        match response.status() {
            status if status.is_success() => response
                .bytes()
                .await
                .map_err(|e| StorageError::Unavailable(format!("Failed to read body: {}", e))),
            // The object vanished between presigning and fetching
            StatusCode::NOT_FOUND => Err(StorageError::ObjectNotFound(strip_query(url))),
            StatusCode::FORBIDDEN => Err(StorageError::AccessDenied(strip_query(url))),
            status => Err(StorageError::Unavailable(format!(
                "Fetch returned HTTP {}",
                status
            ))),
        }
    }
}

/// Drop the presigning signature before a URL ends up in errors or logs
fn strip_query(url: &str) -> String {
    url.split('?').next().unwrap_or(url).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode as HttpStatus, routing::get, Router};
    use std::net::SocketAddr;

    /// Serve a small object endpoint on an ephemeral port
    async fn spawn_bucket() -> SocketAddr {
        let app = Router::new()
            .route("/bucket/page.html", get(|| async { "<p>page</p>" }))
            .route("/bucket/missing.html", get(|| async { HttpStatus::NOT_FOUND }))
            .route("/bucket/denied.html", get(|| async { HttpStatus::FORBIDDEN }))
            .route("/bucket/broken.html", get(|| async { HttpStatus::INTERNAL_SERVER_ERROR }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let addr = spawn_bucket().await;
        let bytes = HttpFetcher::default()
            .fetch(&format!("http://{}/bucket/page.html?X-Amz-Signature=abc", addr))
            .await
            .unwrap();
        assert_eq!(bytes, Bytes::from_static(b"<p>page</p>"));
    }

    #[tokio::test]
    async fn test_fetch_maps_status_codes() {
        let addr = spawn_bucket().await;
        let fetcher = HttpFetcher::default();

        let missing = fetcher
            .fetch(&format!("http://{}/bucket/missing.html?X-Amz-Signature=abc", addr))
            .await
            .unwrap_err();
        assert_eq!(
            missing,
            StorageError::ObjectNotFound(format!("http://{}/bucket/missing.html", addr))
        );

        let denied = fetcher
            .fetch(&format!("http://{}/bucket/denied.html", addr))
            .await
            .unwrap_err();
        assert!(matches!(denied, StorageError::AccessDenied(_)));

        let broken = fetcher
            .fetch(&format!("http://{}/bucket/broken.html", addr))
            .await
            .unwrap_err();
        assert!(matches!(broken, StorageError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused_is_unavailable() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = HttpFetcher::default()
            .fetch(&format!("http://{}/bucket/page.html", addr))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Unavailable(_)));
    }

    #[test]
    fn test_strip_query() {
        assert_eq!(
            strip_query("https://s3.example.com/b/uploads/a.html?X-Amz-Signature=abc"),
            "https://s3.example.com/b/uploads/a.html"
        );
        assert_eq!(strip_query("memory://a.html"), "memory://a.html");
    }
}
