//! Integration tests for the IMS gateway
//!
//! These tests exercise the full stack over real sockets:
//! - HTTP envelope endpoint and SPA fallback
//! - XML-RPC encoding and decoding
//! - An in-process XML-RPC backend recording every call
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p ims-tests
//! ```
//!
//! # Test Structure
//!
//! - `gateway_e2e_test.rs` - Browser-style requests through the gateway to the mock backend
//! - `portal_e2e_test.rs` - Portal workflows driven through `ims-client`

use std::sync::Arc;
use std::time::Duration;

use ims_api::{create_router, AppState, StaticFiles};
use ims_client::testing::TestServer;
use ims_client::{Portal, PortalClient};
use ims_core::RpcValue;
use ims_rpc::testing::MockRpcServer;
use ims_rpc::{MethodResponse, XmlRpcClient};

/// Gateway served in front of a mock XML-RPC backend
///
/// The gateway talks to the backend through the production
/// [`XmlRpcClient`]; both servers shut down when this is dropped.
pub struct Gateway {
    pub backend: MockRpcServer,
    pub server: TestServer,
}

impl Gateway {
    /// Start a backend answering through `handler` and a gateway in front of it
    pub async fn start<F>(handler: F) -> anyhow::Result<Self>
    where
        F: Fn(&str, &[RpcValue]) -> MethodResponse + Send + Sync + 'static,
    {
        let backend = MockRpcServer::start(handler).await?;
        Self::with_backend(backend, StaticFiles::default()).await
    }

    /// Put a gateway serving `static_files` in front of an existing backend
    pub async fn with_backend(
        backend: MockRpcServer,
        static_files: StaticFiles,
    ) -> anyhow::Result<Self> {
        let client = XmlRpcClient::with_config(
            &backend.url(),
            Duration::from_secs(5),
            Duration::from_secs(2),
        )?;
        let state = AppState::with_static_files(Arc::new(client), static_files);
        let server = TestServer::start(create_router(state)).await?;
        Ok(Self { backend, server })
    }

    pub fn base_url(&self) -> String {
        self.server.base_url()
    }

    pub fn portal<P: Portal>(&self) -> PortalClient<P> {
        self.server.portal()
    }
}
