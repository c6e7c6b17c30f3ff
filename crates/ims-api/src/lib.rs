//! ims-api - HTTP layer of the IMS gateway
//!
//! Accepts JSON envelopes from the browser on [`API_PATH`], forwards each to
//! the backend as a single RPC call and shapes the result. Every other path
//! serves the single-page frontend.

pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod shape;
pub mod spa;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use spa::StaticFiles;
pub use state::AppState;

/// Path of the gateway endpoint
pub const API_PATH: &str = "/api/IMS";

/// Create the router for the gateway
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let frontend = spa::service(state.static_files());

    Router::new()
        .route("/health", get(handlers::health::health))
        .route(API_PATH, post(handlers::ims::handle_envelope))
        .fallback_service(frontend)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
