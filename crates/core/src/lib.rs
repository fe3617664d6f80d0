//! `storefront-core`: shared building blocks for the storefront client.
//!
//! This crate contains **pure** primitives (no IO, no HTTP, no storage).

pub mod entity;
pub mod error;
pub mod id;

pub use entity::{Entity, position_of};
pub use error::{DomainError, DomainResult};
pub use id::ProductId;
