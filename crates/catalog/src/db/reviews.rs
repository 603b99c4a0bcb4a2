//! Review repository for database operations.
//!
//! Reviews are write-once: there is an insert path and read paths, and
//! nothing else.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use localspot_core::{ReviewId, StoreId, UserId};

use super::RepositoryError;
use crate::models::Review;

/// Database row for a review.
#[derive(Debug, sqlx::FromRow)]
struct ReviewRow {
    id: Uuid,
    author: Uuid,
    store_id: Uuid,
    body: String,
    rating: i16,
    created_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Self {
            id: ReviewId::new(row.id),
            author: UserId::new(row.author),
            store: StoreId::new(row.store_id),
            text: row.body,
            rating: row.rating,
            created_at: row.created_at,
        }
    }
}

/// Repository for review database operations.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails (including
    /// the rating range CHECK and the store foreign key).
    pub async fn insert(&self, review: &Review) -> Result<Review, RepositoryError> {
        let row = sqlx::query_as::<_, ReviewRow>(
            "INSERT INTO catalog.review (id, author, store_id, body, rating, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id, author, store_id, body, rating, created_at",
        )
        .bind(review.id.as_uuid())
        .bind(review.author.as_uuid())
        .bind(review.store.as_uuid())
        .bind(&review.text)
        .bind(review.rating)
        .bind(review.created_at)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// All reviews for one store, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn for_store(&self, store_id: StoreId) -> Result<Vec<Review>, RepositoryError> {
        let rows = sqlx::query_as::<_, ReviewRow>(
            "SELECT id, author, store_id, body, rating, created_at
             FROM catalog.review
             WHERE store_id = $1
             ORDER BY created_at DESC",
        )
        .bind(store_id.as_uuid())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Every `(store, rating)` pair in the catalog. Aggregation input for
    /// [`crate::aggregate::top_stores`].
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn ratings(&self) -> Result<Vec<(StoreId, i16)>, RepositoryError> {
        let rows: Vec<(Uuid, i16)> =
            sqlx::query_as("SELECT store_id, rating FROM catalog.review")
                .fetch_all(self.pool)
                .await?;

        Ok(rows
            .into_iter()
            .map(|(store_id, rating)| (StoreId::new(store_id), rating))
            .collect())
    }
}
