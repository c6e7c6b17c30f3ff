//! XML-RPC over HTTP client

use std::time::Duration;

use async_trait::async_trait;
use ims_core::{BackendError, BackendResult, RpcBackend, RpcValue};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use crate::codec::{decode_response, encode_call, MethodResponse};
use crate::error::{Result, RpcError};

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default connection timeout
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for a remote XML-RPC service.
///
/// Each [`call`](XmlRpcClient::call) is a single `POST` of a `methodCall`
/// document; there are no retries. Cloning is cheap and shares the
/// connection pool.
#[derive(Debug, Clone)]
pub struct XmlRpcClient {
    client: Client,
    url: Url,
    endpoint: String,
}

impl XmlRpcClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `url` - Endpoint of the XML-RPC server (e.g., "http://localhost:8000/")
    pub fn new(url: &str) -> Result<Self> {
        Self::with_config(url, DEFAULT_TIMEOUT, DEFAULT_CONNECT_TIMEOUT)
    }

    /// Create a new client with custom timeouts
    pub fn with_config(url: &str, timeout: Duration, connect_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()?;

        let url = Url::parse(url)?;
        let endpoint = url.to_string();

        Ok(Self {
            client,
            url,
            endpoint,
        })
    }

    /// Get the endpoint URL
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Invoke a remote procedure and return the decoded response.
    ///
    /// A fault is a successful exchange and comes back as
    /// [`MethodResponse::Fault`]; only transport and decoding problems are
    /// errors here.
    #[instrument(skip(self, params), fields(endpoint = %self.url, params = params.len()))]
    pub async fn invoke(&self, method: &str, params: &[RpcValue]) -> Result<MethodResponse> {
        let body = encode_call(method, params);

        let response = self
            .client
            .post(self.url.clone())
            .header(CONTENT_TYPE, "text/xml")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(RpcError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let decoded = decode_response(&text)?;
        debug!(fault = matches!(decoded, MethodResponse::Fault { .. }), "Decoded response");
        Ok(decoded)
    }
}

#[async_trait]
impl RpcBackend for XmlRpcClient {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn call(&self, method: &str, params: &[RpcValue]) -> BackendResult<RpcValue> {
        match self.invoke(method, params).await? {
            MethodResponse::Success(value) => Ok(value),
            MethodResponse::Fault { code, message } => Err(BackendError::Fault { code, message }),
        }
    }
}
