//! `storefront-client`
//!
//! **Responsibility:** the IO side of the storefront.
//!
//! This crate provides:
//! - The catalog HTTP client (products, categories, product detail, login)
//! - Cart and wishlist stores with best-effort local persistence
//! - The `Storefront` application state gating everything behind a session
//! - A thin command-line shell over all of the above
//!
//! The catalog service stays the authority for product data; nothing here
//! writes back to it.

pub mod app;
pub mod cart;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod entries;
pub mod login;
pub mod routes;
pub mod storage;
pub mod wishlist;

pub use app::{AppError, HeaderCounts, Notice, NoticeLevel, ProductCard, ProductListing, Receipt, Storefront};
pub use cart::{CartEntry, CartStore};
pub use catalog::{CatalogClient, CatalogError, CatalogSnapshot};
pub use config::ClientConfig;
pub use login::HttpAuthenticator;
pub use routes::{Route, UnknownRoute};
pub use storage::{MemoryBackend, Persister, SqliteBackend, StateBackend};
pub use wishlist::{WishlistEntry, WishlistStore, WishlistToggle};
