//! Review domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use localspot_core::{ReviewId, StoreId, UserId};

/// A review left by a user against a store.
///
/// Reviews are immutable once created; there is no edit or delete path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    /// User who wrote the review.
    pub author: UserId,
    /// Store the review is about.
    pub store: StoreId,
    /// Review body, non-empty.
    pub text: String,
    /// Star rating, 1 through 5 inclusive.
    pub rating: i16,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a review.
#[derive(Debug, Clone, Deserialize)]
pub struct NewReview {
    pub author: UserId,
    pub store: StoreId,
    pub text: String,
    pub rating: i16,
}
