//! Localspot Core - Shared types library.
//!
//! This crate provides common types used across all Localspot components:
//! - `catalog` - The catalog & discovery engine
//! - the (separate) web layer that drives it
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access. This
//! keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe entity IDs

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
