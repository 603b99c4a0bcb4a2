//! Localspot Catalog - the catalog & discovery engine.
//!
//! This crate implements the algorithmic core of the Localspot directory:
//!
//! - Slug assignment with collision resolution ([`slug`])
//! - Relevance-ranked text search ([`search`])
//! - Top-stores and tag-facet aggregation ([`aggregate`])
//! - Pagination arithmetic with corrective redirects ([`pagination`])
//! - The atomic favorites (heart) toggle ([`db::users`])
//!
//! The web layer (authentication, templating, uploads) lives elsewhere and
//! drives this crate through [`services::CatalogService`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod aggregate;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod pagination;
pub mod search;
pub mod services;
pub mod slug;

pub use error::{CatalogError, Result};
pub use services::CatalogService;
