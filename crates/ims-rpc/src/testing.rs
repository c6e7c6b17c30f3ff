//! Test utilities for ims-rpc
//!
//! Provides an in-process XML-RPC server that records every call it
//! receives, for exercising the gateway against a real HTTP backend.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;
use ims_core::RpcValue;
use parking_lot::Mutex;
use tokio::net::TcpListener;

use crate::codec::{decode_call, encode_response, MethodCall, MethodResponse};

type Handler = dyn Fn(&str, &[RpcValue]) -> MethodResponse + Send + Sync;

#[derive(Clone)]
struct MockState {
    handler: Arc<Handler>,
    calls: Arc<Mutex<Vec<MethodCall>>>,
}

/// An XML-RPC server on an ephemeral port that shuts down when dropped
pub struct MockRpcServer {
    pub addr: SocketAddr,
    calls: Arc<Mutex<Vec<MethodCall>>>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl MockRpcServer {
    /// Start a server that answers every call with `handler`
    ///
    /// # Example
    ///
    /// ```ignore
    /// use ims_rpc::testing::MockRpcServer;
    /// use ims_rpc::MethodResponse;
    ///
    /// let server = MockRpcServer::start(|method, _params| match method {
    ///     "products_read" => MethodResponse::Success(vec!["a".into()].into()),
    ///     _ => MethodResponse::fault(1, "unsupported"),
    /// })
    /// .await?;
    /// let client = XmlRpcClient::new(&server.url())?;
    /// ```
    pub async fn start<F>(handler: F) -> std::io::Result<Self>
    where
        F: Fn(&str, &[RpcValue]) -> MethodResponse + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let calls = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            handler: Arc::new(handler),
            calls: calls.clone(),
        };
        let router = Router::new().route("/", post(handle_call)).with_state(state);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .ok();
        });

        Ok(Self {
            addr,
            calls,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    /// Start a server answering from a fixed method → response table.
    ///
    /// Methods missing from the table get the fault Python's
    /// `SimpleXMLRPCServer` produces for unregistered functions.
    pub async fn with_responses(responses: HashMap<String, MethodResponse>) -> std::io::Result<Self> {
        Self::start(move |method, _params| {
            responses.get(method).cloned().unwrap_or_else(|| {
                MethodResponse::fault(1, format!("method \"{}\" is not supported", method))
            })
        })
        .await
    }

    /// Endpoint URL to hand to the client
    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Every call received so far, in arrival order
    pub fn calls(&self) -> Vec<MethodCall> {
        self.calls.lock().clone()
    }

    /// Shutdown the server gracefully
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for MockRpcServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

async fn handle_call(State(state): State<MockState>, body: Bytes) -> impl IntoResponse {
    let text = String::from_utf8_lossy(&body);
    let call = match decode_call(&text) {
        Ok(call) => call,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    let response = (state.handler)(call.method.as_str(), call.params.as_slice());
    state.calls.lock().push(call);

    (
        [(header::CONTENT_TYPE, "text/xml")],
        encode_response(&response),
    )
        .into_response()
}
