//! ims-rpc - XML-RPC transport for the IMS gateway
//!
//! Implements [`ims_core::RpcBackend`] by sending `methodCall` documents over
//! HTTP to a remote XML-RPC server (such as a Python `SimpleXMLRPCServer`
//! started with `allow_none=True`).
//!
//! # Example
//!
//! ```rust,no_run
//! use ims_core::{RpcBackend, RpcValue};
//! use ims_rpc::XmlRpcClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = XmlRpcClient::new("http://localhost:8000/")?;
//!     let row = client.call("product_read", &[RpcValue::from("42")]).await?;
//!     println!("{:?}", row);
//!     Ok(())
//! }
//! ```
//!
//! # Testing
//!
//! The `testing` module provides an in-process XML-RPC server:
//!
//! ```rust,ignore
//! use ims_rpc::testing::MockRpcServer;
//!
//! let backend = MockRpcServer::start(|_, _| MethodResponse::Success(RpcValue::Nil)).await?;
//! let client = XmlRpcClient::new(&backend.url())?;
//! ```

mod client;
pub mod codec;
mod error;
pub mod testing;

pub use client::{XmlRpcClient, DEFAULT_CONNECT_TIMEOUT, DEFAULT_TIMEOUT};
pub use codec::{MethodCall, MethodResponse};
pub use error::{Result, RpcError};
