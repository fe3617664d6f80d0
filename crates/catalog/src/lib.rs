//! Catalog domain module.
//!
//! Products as served by the remote catalog, plus the view pipeline that turns
//! a fetched product list into what the listing page shows. Pure domain logic
//! (no IO, no HTTP, no storage).

pub mod product;
pub mod view;

pub use product::{Product, Rating, category_label, format_price};
pub use view::{ProductQuery, SortOption, UnknownSortOption, compare_titles};
