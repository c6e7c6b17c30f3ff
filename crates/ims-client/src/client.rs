//! IMS gateway HTTP client implementation

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, instrument};
use url::Url;

use crate::error::{ClientError, Result};

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default connection timeout
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Gateway endpoint path
const API_PATH: &str = "/api/IMS";

/// Error body returned by the gateway
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Client for the gateway's envelope endpoint
#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: Client,
    base_url: Url,
}

impl GatewayClient {
    /// Create a new gateway client
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the gateway (e.g., "http://localhost:5050")
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_config(base_url, DEFAULT_TIMEOUT, DEFAULT_CONNECT_TIMEOUT)
    }

    /// Create a new gateway client with custom configuration
    pub fn with_config(
        base_url: &str,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()?;

        let base_url = Url::parse(base_url)?;

        Ok(Self { client, base_url })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Check gateway health
    #[instrument(skip(self))]
    pub async fn health(&self) -> Result<String> {
        let url = self.base_url.join("/health")?;
        let response = self.client.get(url).send().await.map_err(map_send_error)?;

        if response.status().is_success() {
            Ok(response.text().await?)
        } else {
            let status = response.status();
            Err(extract_error_from_status(response, status).await)
        }
    }

    /// Send one envelope: `meth` plus the given fields
    #[instrument(skip(self, fields))]
    pub async fn call(&self, meth: &str, fields: Map<String, Value>) -> Result<Value> {
        let mut envelope = fields;
        envelope.insert("meth".to_string(), Value::String(meth.to_string()));

        let url = self.base_url.join(API_PATH)?;
        debug!("Posting envelope to {}", url);

        let response = self
            .client
            .post(url)
            .json(&envelope)
            .send()
            .await
            .map_err(map_send_error)?;

        handle_response(response).await
    }
}

fn map_send_error(e: reqwest::Error) -> ClientError {
    if e.is_timeout() {
        ClientError::Timeout
    } else {
        ClientError::HttpError(e)
    }
}

async fn handle_response(response: reqwest::Response) -> Result<Value> {
    let status = response.status();

    if status.is_success() {
        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(e.to_string()))
    } else {
        Err(extract_error_from_status(response, status).await)
    }
}

async fn extract_error_from_status(response: reqwest::Response, status: StatusCode) -> ClientError {
    let message = match response.json::<ErrorResponse>().await {
        Ok(err) => err.error,
        Err(_) => format!("HTTP {}", status),
    };

    match status {
        StatusCode::NOT_FOUND if message.starts_with("Method not found") => {
            ClientError::MethodNotFound(message)
        }
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => ClientError::Timeout,
        _ => ClientError::server_error(status.as_u16(), message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = GatewayClient::new("http://localhost:5050");
        assert!(client.is_ok());
    }

    #[test]
    fn test_invalid_url() {
        let client = GatewayClient::new("not a url");
        assert!(matches!(client, Err(ClientError::InvalidUrl(_))));
    }

    #[test]
    fn test_api_path_joins_onto_base() {
        let client = GatewayClient::new("http://localhost:5050/ui/").unwrap();
        let url = client.base_url().join(API_PATH).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5050/api/IMS");
    }
}
