//! Command implementations for ims-cli

/// Run `$body` with `$portal` bound to the portal type for `$kind`
macro_rules! with_portal {
    ($kind:expr, $portal:ident => $body:expr) => {
        match $kind {
            ims_core::EntityKind::Product => {
                type $portal = ims_client::ProductPortal;
                $body
            }
            ims_core::EntityKind::Supplier => {
                type $portal = ims_client::SupplierPortal;
                $body
            }
            ims_core::EntityKind::Category => {
                type $portal = ims_client::CategoryPortal;
                $body
            }
            ims_core::EntityKind::Image => {
                type $portal = ims_client::ImagePortal;
                $body
            }
        }
    };
}

pub mod associate;
pub mod crud;
pub mod health;

pub use associate::{associate, dissociate, products};
pub use crud::{create, delete, list, read, update};
pub use health::health;
