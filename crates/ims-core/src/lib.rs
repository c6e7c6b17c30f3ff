//! ims-core - Core traits and types for the IMS gateway
//!
//! This crate provides the abstractions shared by the gateway, the XML-RPC
//! transport and the gateway client: the [`RpcBackend`] trait, the RPC value
//! model, entity projections and the closed method table.

pub mod backend;
pub mod error;
pub mod models;
pub mod value;

pub use backend::RpcBackend;
pub use error::{BackendError, BackendResult};
pub use models::*;
pub use value::RpcValue;
