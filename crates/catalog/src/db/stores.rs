//! Store repository for database operations.
//!
//! Queries are runtime-checked (`sqlx::query_as` with `FromRow` rows) so
//! the crate builds without a live database.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use localspot_core::{StoreId, UserId};

use super::RepositoryError;
use crate::models::{Location, Store, StorePatch};
use crate::search::ScoredStore;

/// Database row for a store.
#[derive(Debug, sqlx::FromRow)]
struct StoreRow {
    id: Uuid,
    name: String,
    slug: String,
    description: String,
    tags: Vec<String>,
    longitude: f64,
    latitude: f64,
    address: String,
    photo: Option<String>,
    author: Uuid,
    created_at: DateTime<Utc>,
}

impl From<StoreRow> for Store {
    fn from(row: StoreRow) -> Self {
        Self {
            id: StoreId::new(row.id),
            name: row.name,
            slug: row.slug,
            description: row.description,
            tags: row.tags,
            location: Location {
                longitude: row.longitude,
                latitude: row.latitude,
                address: row.address,
            },
            photo: row.photo,
            author: UserId::new(row.author),
            created_at: row.created_at,
        }
    }
}

/// Database row for a scored text-search hit.
#[derive(Debug, sqlx::FromRow)]
struct ScoredStoreRow {
    #[sqlx(flatten)]
    store: StoreRow,
    score: f32,
}

const STORE_COLUMNS: &str = "id, name, slug, description, tags, longitude, latitude, \
                             address, photo, author, created_at";

/// Repository for store database operations.
pub struct StoreRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StoreRepository<'a> {
    /// Create a new store repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a store with its already-resolved slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is already taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn insert(&self, store: &Store) -> Result<Store, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(
            "INSERT INTO catalog.store
                 (id, name, slug, description, tags, longitude, latitude,
                  address, photo, author, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING id, name, slug, description, tags, longitude, latitude,
                       address, photo, author, created_at",
        )
        .bind(store.id.as_uuid())
        .bind(&store.name)
        .bind(&store.slug)
        .bind(&store.description)
        .bind(&store.tags)
        .bind(store.location.longitude)
        .bind(store.location.latitude)
        .bind(&store.location.address)
        .bind(store.photo.as_deref())
        .bind(store.author.as_uuid())
        .bind(store.created_at)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "slug already exists"))?;

        Ok(row.into())
    }

    /// Apply a patch to a store in a single statement.
    ///
    /// `slug` must be `Some` exactly when the patch renames the store.
    /// Either the whole patch persists or none of it does.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the store doesn't exist.
    /// Returns `RepositoryError::Conflict` if the new slug is taken.
    pub async fn update(
        &self,
        id: StoreId,
        patch: &StorePatch,
        slug: Option<&str>,
    ) -> Result<Store, RepositoryError> {
        let (longitude, latitude, address) = match &patch.location {
            Some(loc) => (Some(loc.longitude), Some(loc.latitude), Some(loc.address.as_str())),
            None => (None, None, None),
        };

        let row = sqlx::query_as::<_, StoreRow>(
            "UPDATE catalog.store SET
                 name        = COALESCE($2, name),
                 slug        = COALESCE($3, slug),
                 description = COALESCE($4, description),
                 tags        = COALESCE($5, tags),
                 longitude   = COALESCE($6, longitude),
                 latitude    = COALESCE($7, latitude),
                 address     = COALESCE($8, address),
                 photo       = COALESCE($9, photo)
             WHERE id = $1
             RETURNING id, name, slug, description, tags, longitude, latitude,
                       address, photo, author, created_at",
        )
        .bind(id.as_uuid())
        .bind(patch.name.as_deref())
        .bind(slug)
        .bind(patch.description.as_deref())
        .bind(patch.tags.as_deref())
        .bind(longitude)
        .bind(latitude)
        .bind(address)
        .bind(patch.photo.as_deref())
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "slug already exists"))?;

        row.map(Into::into).ok_or(RepositoryError::NotFound)
    }

    /// Get a store by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: StoreId) -> Result<Option<Store>, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(&format!(
            "SELECT {STORE_COLUMNS} FROM catalog.store WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Get a store by its slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Store>, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(&format!(
            "SELECT {STORE_COLUMNS} FROM catalog.store WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// List one page of stores, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_page(&self, skip: i64, limit: i64) -> Result<Vec<Store>, RepositoryError> {
        let rows = sqlx::query_as::<_, StoreRow>(&format!(
            "SELECT {STORE_COLUMNS} FROM catalog.store
             ORDER BY created_at DESC
             LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(skip)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Count all stores.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM catalog.store")
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }

    /// All stores. Aggregation input; the catalog is small by design.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn all(&self) -> Result<Vec<Store>, RepositoryError> {
        let rows = sqlx::query_as::<_, StoreRow>(&format!(
            "SELECT {STORE_COLUMNS} FROM catalog.store ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Slugs matching a case-insensitive POSIX pattern, in slug order.
    ///
    /// Used by the slug resolver with [`crate::slug::collision_pattern`].
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn slugs_matching(&self, pattern: &str) -> Result<Vec<String>, RepositoryError> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT slug FROM catalog.store WHERE slug ~* $1 ORDER BY slug")
                .bind(pattern)
                .fetch_all(self.pool)
                .await?;

        Ok(rows.into_iter().map(|(slug,)| slug).collect())
    }

    /// Stores carrying `tag`, or - with no tag - any store that is tagged
    /// at all.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn by_tag(&self, tag: Option<&str>) -> Result<Vec<Store>, RepositoryError> {
        let rows = match tag {
            Some(tag) => {
                sqlx::query_as::<_, StoreRow>(&format!(
                    "SELECT {STORE_COLUMNS} FROM catalog.store
                     WHERE $1 = ANY(tags)
                     ORDER BY created_at DESC"
                ))
                .bind(tag)
                .fetch_all(self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, StoreRow>(&format!(
                    "SELECT {STORE_COLUMNS} FROM catalog.store
                     WHERE cardinality(tags) > 0
                     ORDER BY created_at DESC"
                ))
                .fetch_all(self.pool)
                .await?
            }
        };

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Token search over name and description, scored by `ts_rank`,
    /// best match first.
    ///
    /// Zero rows is a legitimate "no results" response, including for an
    /// empty query; only a failing query is an error.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn text_search(
        &self,
        query: &str,
        limit: i64,
    ) -> Result<Vec<ScoredStore>, RepositoryError> {
        let rows = sqlx::query_as::<_, ScoredStoreRow>(&format!(
            "SELECT {STORE_COLUMNS},
                    ts_rank(to_tsvector('english', name || ' ' || description),
                            plainto_tsquery('english', $1)) AS score
             FROM catalog.store
             WHERE to_tsvector('english', name || ' ' || description)
                   @@ plainto_tsquery('english', $1)
             ORDER BY score DESC
             LIMIT $2"
        ))
        .bind(query)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ScoredStore {
                store: row.store.into(),
                score: row.score,
            })
            .collect())
    }

    /// Stores whose IDs are in `ids` (used for the hearts listing).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn by_ids(&self, ids: &[StoreId]) -> Result<Vec<Store>, RepositoryError> {
        let ids: Vec<Uuid> = ids.iter().map(StoreId::as_uuid).collect();
        let rows = sqlx::query_as::<_, StoreRow>(&format!(
            "SELECT {STORE_COLUMNS} FROM catalog.store
             WHERE id = ANY($1)
             ORDER BY created_at DESC"
        ))
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
