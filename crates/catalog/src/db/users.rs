//! User repository for database operations.
//!
//! User accounts are owned by the auth layer; the engine's only write is
//! the atomic hearts toggle.

use sqlx::PgPool;
use uuid::Uuid;

use localspot_core::{StoreId, UserId};

use super::RepositoryError;
use crate::models::User;

/// Repository for the engine's user operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the engine's view of a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row: Option<(Uuid, Vec<Uuid>)> =
            sqlx::query_as("SELECT id, hearts FROM catalog.app_user WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_optional(self.pool)
                .await?;

        Ok(row.map(|(id, hearts)| User {
            id: UserId::new(id),
            hearts: hearts.into_iter().map(StoreId::new).collect(),
        }))
    }

    /// Toggle a store in a user's hearts set and return the updated set.
    ///
    /// Presence check and mutation are one statement, so two concurrent
    /// toggles serialize on the row instead of racing read-then-write.
    /// The `array_remove` inside the add arm keeps the add duplicate-safe
    /// even if a duplicate ever slipped into the array.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn toggle_heart(
        &self,
        user_id: UserId,
        store_id: StoreId,
    ) -> Result<Vec<StoreId>, RepositoryError> {
        let row: Option<(Vec<Uuid>,)> = sqlx::query_as(
            "UPDATE catalog.app_user
             SET hearts = CASE
                 WHEN $2 = ANY(hearts) THEN array_remove(hearts, $2)
                 ELSE array_append(array_remove(hearts, $2), $2)
             END
             WHERE id = $1
             RETURNING hearts",
        )
        .bind(user_id.as_uuid())
        .bind(store_id.as_uuid())
        .fetch_optional(self.pool)
        .await?;

        let (hearts,) = row.ok_or(RepositoryError::NotFound)?;
        Ok(hearts.into_iter().map(StoreId::new).collect())
    }
}
