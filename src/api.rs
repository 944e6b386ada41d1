//! HTTP client for the order-processing service.
//!
//! | Method | Path | Used by |
//! |--------|------|---------|
//! | POST   | `/orders/upload` | chunk transmitter (multipart, streamed response) |
//! | GET    | `/orders/processing/{fileIdentifier}` | status poller |
//! | GET    | `/orders?page=&numberOfItemsPerPage=` | result fetcher |

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

use crate::config::ClientConfig;
use crate::error::{Result, UploaderError};
use crate::orders::{OrderPage, OrderSource};
use crate::status::{ProcessingStatus, StatusSource};
use crate::upload::{drain_body, ChunkTransmitter, ChunkUpload};

#[derive(Debug, Clone)]
pub struct OrderServiceClient {
    http: reqwest::Client,
    base_url: String,
}

impl OrderServiceClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base_url = config.base_url()?;

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build()?;

        Ok(Self {
            http,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn upload_url(&self) -> String {
        format!("{}/orders/upload", self.base_url)
    }

    fn status_url(&self, file_identifier: &str) -> String {
        format!(
            "{}/orders/processing/{}",
            self.base_url,
            urlencoding::encode(file_identifier)
        )
    }

    fn orders_url(&self) -> String {
        format!("{}/orders", self.base_url)
    }

    /// POST one chunk and drain the streamed response to text
    pub async fn upload_chunk(&self, chunk: ChunkUpload) -> Result<String> {
        let file_part = Part::bytes(chunk.bytes)
            .file_name(chunk.file_identifier.clone())
            .mime_str("application/octet-stream")?;

        let form = Form::new()
            .part("fileChunk", file_part)
            .text("fileName", chunk.file_identifier)
            .text("fileChunkIndex", chunk.chunk_index.to_string())
            .text("totalChunks", chunk.total_chunks.to_string())
            .text("isLastChunk", chunk.is_last.to_string());

        let response = self
            .http
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await?;

        let mut response = ensure_success(response).await?;
        drain_body(&mut response).await
    }

    pub async fn processing_status(&self, file_identifier: &str) -> Result<ProcessingStatus> {
        let response = self.http.get(self.status_url(file_identifier)).send().await?;
        let response = ensure_success(response).await?;

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn list_orders(&self, page: u32, items_per_page: u32) -> Result<OrderPage> {
        let response = self
            .http
            .get(self.orders_url())
            .query(&[("page", page), ("numberOfItemsPerPage", items_per_page)])
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Map non-2xx responses to `UploaderError::Server`, keeping the body for context
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(UploaderError::Server {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl ChunkTransmitter for OrderServiceClient {
    async fn send(&self, chunk: ChunkUpload) -> Result<String> {
        self.upload_chunk(chunk).await
    }
}

#[async_trait]
impl StatusSource for OrderServiceClient {
    async fn processing_status(&self, file_identifier: &str) -> Result<ProcessingStatus> {
        OrderServiceClient::processing_status(self, file_identifier).await
    }
}

#[async_trait]
impl OrderSource for OrderServiceClient {
    async fn list_orders(&self, page: u32, items_per_page: u32) -> Result<OrderPage> {
        OrderServiceClient::list_orders(self, page, items_per_page).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_for(url: &str) -> OrderServiceClient {
        let config = ClientConfig {
            server_url: url.to_string(),
            ..ClientConfig::default()
        };
        OrderServiceClient::new(&config).unwrap()
    }

    #[test]
    fn test_urls_from_default_base() {
        let client = client_for("http://localhost:8080");
        assert_eq!(client.upload_url(), "http://localhost:8080/orders/upload");
        assert_eq!(client.orders_url(), "http://localhost:8080/orders");
    }

    #[test]
    fn test_base_path_is_preserved() {
        let client = client_for("https://gateway.example.com/api/");
        assert_eq!(
            client.upload_url(),
            "https://gateway.example.com/api/orders/upload"
        );
    }

    #[test]
    fn test_status_url_encodes_identifier() {
        let client = client_for("http://localhost:8080");
        assert_eq!(
            client.status_url("1234_my orders.csv"),
            "http://localhost:8080/orders/processing/1234_my%20orders.csv"
        );
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let config = ClientConfig {
            server_url: "::nope::".to_string(),
            ..ClientConfig::default()
        };
        assert!(matches!(
            OrderServiceClient::new(&config),
            Err(UploaderError::Config(_))
        ));
    }
}
