//! IMS Gateway Client Library
//!
//! Provides a typed HTTP client for the gateway's envelope endpoint and the
//! per-entity portals that validate form input before it is sent.
//!
//! # Example
//!
//! ```rust,no_run
//! use ims_client::{FormInput, GatewayClient, PortalClient, ProductPortal};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let gateway = GatewayClient::new("http://localhost:5050")?;
//!     let products = PortalClient::<ProductPortal>::new(gateway);
//!
//!     let form = FormInput::new()
//!         .set("name", "phone")
//!         .set("description", "mobile device")
//!         .set("quantity", "0")
//!         .set("price", "34.5");
//!     let id = products.create(&form).await?;
//!     let product = products.read(&id.to_string()).await?;
//!     println!("{:?}", product);
//!     Ok(())
//! }
//! ```
//!
//! # Testing
//!
//! The `testing` module serves a router on an ephemeral port:
//!
//! ```rust,ignore
//! use ims_client::testing::TestServer;
//! use ims_api::{create_router, AppState};
//!
//! let server = TestServer::start(create_router(state)).await?;
//! let health = server.client.health().await?;
//! ```

mod client;
mod error;
pub mod portal;
pub mod testing;

pub use client::GatewayClient;
pub use error::{ClientError, Result};
pub use portal::{
    AssociationOwner, CategoryPortal, FormField, FormInput, ImagePortal, InputKind, Portal,
    PortalClient, PortalOp, ProductPortal, SupplierPortal, ValidationError,
};

pub use ims_core::{Association, EntityKind, Scalar};
