//! User domain types.
//!
//! User accounts are owned by the (external) auth layer. The engine only
//! reads the parts it needs: the ID and the favorites ("hearts") set.

use serde::{Deserialize, Serialize};

use localspot_core::{StoreId, UserId};

/// The engine's read-only view of a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Stores this user has hearted. Each store appears at most once.
    pub hearts: Vec<StoreId>,
}

impl User {
    /// Whether this user has hearted the given store.
    #[must_use]
    pub fn has_hearted(&self, store_id: StoreId) -> bool {
        self.hearts.contains(&store_id)
    }
}
