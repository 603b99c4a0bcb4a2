//! Store domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use localspot_core::{StoreId, UserId};

/// Geographic location of a store.
///
/// Coordinates and address are both required on creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Longitude in degrees.
    pub longitude: f64,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Free-text street address.
    pub address: String,
}

/// A store listing (domain type).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Store {
    /// Unique store ID, generated at creation, immutable.
    pub id: StoreId,
    /// Display name, non-empty and trimmed.
    pub name: String,
    /// URL-safe identifier derived from `name`; unique across all stores.
    pub slug: String,
    /// Trimmed description, may be empty.
    pub description: String,
    /// Tag labels in submission order. Duplicates are kept as submitted.
    pub tags: Vec<String>,
    /// Where the store is.
    pub location: Location,
    /// Opaque photo file reference, if one was uploaded.
    pub photo: Option<String>,
    /// User who created the listing; never reassigned.
    pub author: UserId,
    /// When the listing was created.
    pub created_at: DateTime<Utc>,
}

impl Store {
    /// Whether `user_id` owns this store.
    ///
    /// The calling layer uses this predicate for its authorization check;
    /// the engine itself does not enforce ownership.
    #[must_use]
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.author == user_id
    }
}

/// Input for creating a store. The slug is resolved by the engine.
#[derive(Debug, Clone, Deserialize)]
pub struct NewStore {
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub location: Location,
    pub photo: Option<String>,
    pub author: UserId,
}

/// Patch applied by `update_store`. `None` fields are left unchanged.
///
/// The slug is re-resolved only when `name` is present and differs from
/// the stored name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub location: Option<Location>,
    pub photo: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_store(author: UserId) -> Store {
        Store {
            id: StoreId::generate(),
            name: "Cafe Joe".to_string(),
            slug: "cafe-joe".to_string(),
            description: String::new(),
            tags: vec![],
            location: Location {
                longitude: -0.1,
                latitude: 51.5,
                address: "1 High Street".to_string(),
            },
            photo: None,
            author,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn store_serializes_for_json_responses() {
        let store = sample_store(UserId::generate());
        let json = serde_json::to_value(&store).expect("serialize");
        assert_eq!(json["slug"], "cafe-joe");
        assert_eq!(json["location"]["address"], "1 High Street");
    }

    #[test]
    fn ownership_matches_author_only() {
        let owner = UserId::generate();
        let store = sample_store(owner);
        assert!(store.is_owned_by(owner));
        assert!(!store.is_owned_by(UserId::generate()));
    }
}
