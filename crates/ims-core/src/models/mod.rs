//! Shared data models for the IMS gateway

mod entity;
mod method;

pub use entity::*;
pub use method::*;
