//! Domain types for the catalog.
//!
//! These types represent validated domain objects separate from database
//! row types (which live in [`crate::db`]).

pub mod review;
pub mod store;
pub mod user;

pub use review::{NewReview, Review};
pub use store::{Location, NewStore, Store, StorePatch};
pub use user::User;
