//! RpcBackend trait - the core abstraction for the remote procedure backend

use async_trait::async_trait;

use crate::error::BackendResult;
use crate::value::RpcValue;

/// A remote service exposing named procedures with positional arguments.
///
/// The gateway holds one `Arc<dyn RpcBackend>` and issues exactly one
/// [`call`](RpcBackend::call) per inbound request. Implementations must not
/// retry or batch; a failed call is reported once and the gateway decides
/// how to present it.
#[async_trait]
pub trait RpcBackend: Send + Sync {
    /// Where calls go, for log lines (usually the backend URL)
    fn endpoint(&self) -> &str;

    /// Invoke `method` with `params` in the given order.
    async fn call(&self, method: &str, params: &[RpcValue]) -> BackendResult<RpcValue>;
}
