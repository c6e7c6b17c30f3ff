//! Application state for the gateway

use std::sync::Arc;

use ims_core::RpcBackend;

use crate::spa::StaticFiles;

/// Application state shared across all handlers.
///
/// Immutable after startup; handlers never write to it.
#[derive(Clone)]
pub struct AppState {
    backend: Arc<dyn RpcBackend>,
    static_files: Arc<StaticFiles>,
}

impl AppState {
    /// Create a new AppState serving the SPA from the default location
    pub fn new(backend: Arc<dyn RpcBackend>) -> Self {
        Self::with_static_files(backend, StaticFiles::default())
    }

    /// Create a new AppState with an explicit static content location
    pub fn with_static_files(backend: Arc<dyn RpcBackend>, static_files: StaticFiles) -> Self {
        Self {
            backend,
            static_files: Arc::new(static_files),
        }
    }

    /// Get the RPC backend
    pub fn backend(&self) -> &dyn RpcBackend {
        self.backend.as_ref()
    }

    /// Get the static content location
    pub fn static_files(&self) -> &StaticFiles {
        &self.static_files
    }
}
