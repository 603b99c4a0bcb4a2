//! Engine operations exposed to the calling layer.
//!
//! # Services
//!
//! - [`catalog`] - `CatalogService`, the single entry point: store
//!   creation and edits, listing, tag browsing, search, top stores,
//!   reviews, and the hearts toggle.

pub mod catalog;

pub use catalog::{CatalogService, StorePage, TagListing};
