//! The catalog service: every operation the engine exposes.
//!
//! The calling layer resolves identity and authorization before invoking
//! these operations (the ownership check itself is
//! [`Store::is_owned_by`]); the service performs required-field
//! validation, identifier resolution, and the read/write orchestration
//! against the repositories.

use chrono::Utc;
use sqlx::PgPool;
use tracing::instrument;

use localspot_core::{ReviewId, StoreId, UserId};

use crate::aggregate::{self, RatedStore, TagCount};
use crate::db::{ReviewRepository, RepositoryError, StoreRepository, UserRepository};
use crate::error::{CatalogError, Result};
use crate::models::{NewReview, NewStore, Review, Store, StorePatch};
use crate::pagination::{self, PAGE_SIZE, PagePlan};
use crate::search::{self, ScoredStore};
use crate::slug;

/// How many times a create/update re-resolves its slug after losing a
/// uniqueness race before giving up with `SlugConflict`.
const SLUG_RESOLUTION_ATTEMPTS: u32 = 3;

/// One page of the store listing, or a corrective redirect.
#[derive(Debug)]
pub enum StorePage {
    /// A fetched page. `total_pages` is 0 for an empty catalog, served as
    /// this single empty page.
    Listing {
        stores: Vec<Store>,
        page: i64,
        total_pages: i64,
        total: i64,
    },
    /// The requested page was below 1; re-issue at page 1.
    RedirectToFirst,
    /// The requested page was past the end; re-issue at `total_pages`.
    RedirectToLast { total_pages: i64 },
}

/// Tag facets together with the stores matching the browsed tag.
#[derive(Debug)]
pub struct TagListing {
    /// All tags with occurrence counts, most frequent first.
    pub tags: Vec<TagCount>,
    /// Stores carrying the browsed tag (or any tag, when none was given).
    pub stores: Vec<Store>,
}

/// The catalog & discovery engine.
#[derive(Clone)]
pub struct CatalogService {
    pool: PgPool,
}

impl CatalogService {
    /// Create a service over a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn stores(&self) -> StoreRepository<'_> {
        StoreRepository::new(&self.pool)
    }

    fn reviews(&self) -> ReviewRepository<'_> {
        ReviewRepository::new(&self.pool)
    }

    fn users(&self) -> UserRepository<'_> {
        UserRepository::new(&self.pool)
    }

    /// Create a store listing.
    ///
    /// Validates required fields, resolves the slug from the name, and
    /// persists. Losing a slug-uniqueness race triggers re-resolution
    /// against a fresh snapshot, up to `SLUG_RESOLUTION_ATTEMPTS` times.
    ///
    /// # Errors
    ///
    /// `CatalogError::Validation` for missing required fields,
    /// `CatalogError::SlugConflict` when every resolution attempt lost
    /// its race, `CatalogError::Persistence` for backend failures.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_store(&self, input: NewStore) -> Result<Store> {
        let input = normalize_new_store(input);
        validate_new_store(&input)?;

        let repo = self.stores();
        let base = slug::slugify(&input.name);

        for attempt in 1..=SLUG_RESOLUTION_ATTEMPTS {
            let existing = repo.slugs_matching(&slug::collision_pattern(&base)).await?;
            // After a conflict the count-based candidate may be the very
            // slug that was just rejected, so later attempts advance past
            // the largest suffix in the snapshot instead.
            let resolved = if attempt == 1 {
                slug::resolve(&input.name, &existing)
            } else {
                slug::resolve_after_conflict(&input.name, &existing)
            };

            let store = Store {
                id: StoreId::generate(),
                name: input.name.clone(),
                slug: resolved,
                description: input.description.clone(),
                tags: input.tags.clone(),
                location: input.location.clone(),
                photo: input.photo.clone(),
                author: input.author,
                created_at: Utc::now(),
            };

            match repo.insert(&store).await {
                Ok(created) => return Ok(created),
                Err(RepositoryError::Conflict(_)) => {
                    tracing::warn!(slug = %store.slug, attempt, "slug race lost, re-resolving");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(CatalogError::SlugConflict(base))
    }

    /// Apply a patch to a store.
    ///
    /// The slug is re-resolved only when the patch changes the name;
    /// unrelated edits never touch it. The patch persists atomically.
    ///
    /// # Errors
    ///
    /// `CatalogError::Validation` for empty patched fields,
    /// `CatalogError::SlugConflict` after exhausted re-resolution,
    /// `CatalogError::Persistence` for backend failures (including an
    /// unknown store id).
    #[instrument(skip(self, patch))]
    pub async fn update_store(&self, id: StoreId, patch: StorePatch) -> Result<Store> {
        let patch = normalize_patch(patch);
        validate_patch(&patch)?;

        let repo = self.stores();
        let current = repo.get_by_id(id).await?.ok_or(RepositoryError::NotFound)?;

        let renamed = patch
            .name
            .as_deref()
            .is_some_and(|name| name != current.name);

        if !renamed {
            return Ok(repo.update(id, &patch, None).await?);
        }

        let name = patch.name.as_deref().unwrap_or_default();
        let base = slug::slugify(name);

        for attempt in 1..=SLUG_RESOLUTION_ATTEMPTS {
            let existing = repo.slugs_matching(&slug::collision_pattern(&base)).await?;
            let resolved = if attempt == 1 {
                slug::resolve(name, &existing)
            } else {
                slug::resolve_after_conflict(name, &existing)
            };

            match repo.update(id, &patch, Some(&resolved)).await {
                Ok(updated) => return Ok(updated),
                Err(RepositoryError::Conflict(_)) => {
                    tracing::warn!(slug = %resolved, attempt, "slug race lost, re-resolving");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(CatalogError::SlugConflict(base))
    }

    /// A store addressed by slug, with its reviews populated.
    ///
    /// # Errors
    ///
    /// `CatalogError::Persistence` for backend failures.
    #[instrument(skip(self))]
    pub async fn get_store_by_slug(&self, slug: &str) -> Result<Option<(Store, Vec<Review>)>> {
        let Some(store) = self.stores().get_by_slug(slug).await? else {
            return Ok(None);
        };
        let reviews = self.reviews().for_store(store.id).await?;
        Ok(Some((store, reviews)))
    }

    /// One page of the store listing, newest first, 4 per page.
    ///
    /// The out-of-range correction is evaluated after the fetch: the
    /// count and the fetch are separate queries, so the catalog may have
    /// shrunk in between. A planned page that comes back empty (with a
    /// non-zero skip) turns into a redirect to the true last page.
    ///
    /// # Errors
    ///
    /// `CatalogError::Persistence` for backend failures.
    #[instrument(skip(self))]
    pub async fn list_stores(&self, requested_page: i64) -> Result<StorePage> {
        let repo = self.stores();
        let total = repo.count().await?;

        let (page, skip, limit, total_pages) =
            match pagination::plan(requested_page, PAGE_SIZE, total) {
                PagePlan::RedirectToFirst => return Ok(StorePage::RedirectToFirst),
                PagePlan::RedirectToLast { total_pages } => {
                    return Ok(StorePage::RedirectToLast { total_pages });
                }
                PagePlan::Page {
                    page,
                    skip,
                    limit,
                    total_pages,
                } => (page, skip, limit, total_pages),
            };

        let stores = repo.list_page(skip, limit).await?;

        if stores.is_empty() && skip > 0 {
            // The count drifted under us; redirect against a fresh one.
            let total = repo.count().await?;
            return Ok(StorePage::RedirectToLast {
                total_pages: pagination::total_pages(total, PAGE_SIZE),
            });
        }

        Ok(StorePage::Listing {
            stores,
            page,
            total_pages,
            total,
        })
    }

    /// Tag facets plus the stores matching `tag`.
    ///
    /// No tag matches every store that has at least one tag.
    ///
    /// # Errors
    ///
    /// `CatalogError::Persistence` for backend failures.
    #[instrument(skip(self))]
    pub async fn list_by_tag(&self, tag: Option<&str>) -> Result<TagListing> {
        let repo = self.stores();
        let all = repo.all().await?;
        let tags = aggregate::tag_facets(&all);
        let stores = repo.by_tag(tag.filter(|t| !t.is_empty())).await?;
        Ok(TagListing { tags, stores })
    }

    /// Top 5 stores by text relevance against `query`.
    ///
    /// Zero matches - including for an empty query - is an empty result,
    /// not an error.
    ///
    /// # Errors
    ///
    /// `CatalogError::SearchUnavailable` when the search backend fails;
    /// callers must not fold that into "no results."
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<ScoredStore>> {
        let limit = i64::try_from(search::SEARCH_LIMIT).unwrap_or(i64::MAX);
        let hits = self
            .stores()
            .text_search(query, limit)
            .await
            .map_err(CatalogError::SearchUnavailable)?;
        Ok(search::rank(hits, search::SEARCH_LIMIT))
    }

    /// Top 10 stores by average rating, computed fresh from current
    /// reviews. Stores with fewer than 2 reviews never rank.
    ///
    /// # Errors
    ///
    /// `CatalogError::Persistence` for backend failures.
    #[instrument(skip(self))]
    pub async fn top_stores(&self) -> Result<Vec<RatedStore>> {
        let stores = self.stores().all().await?;
        let ratings = self.reviews().ratings().await?;
        Ok(aggregate::top_stores(stores, &ratings))
    }

    /// Toggle a store in a user's hearts and return the updated set.
    ///
    /// The toggle is a single atomic statement; toggling twice always
    /// returns to the original membership state.
    ///
    /// # Errors
    ///
    /// `CatalogError::Persistence` for backend failures (including an
    /// unknown user).
    #[instrument(skip(self))]
    pub async fn toggle_heart(&self, user_id: UserId, store_id: StoreId) -> Result<Vec<StoreId>> {
        Ok(self.users().toggle_heart(user_id, store_id).await?)
    }

    /// The stores a user has hearted, newest first.
    ///
    /// # Errors
    ///
    /// `CatalogError::Persistence` for backend failures (including an
    /// unknown user).
    #[instrument(skip(self))]
    pub async fn hearted_stores(&self, user_id: UserId) -> Result<Vec<Store>> {
        let user = self
            .users()
            .get(user_id)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        Ok(self.stores().by_ids(&user.hearts).await?)
    }

    /// Leave a review against a store. Reviews are immutable once created.
    ///
    /// # Errors
    ///
    /// `CatalogError::Validation` for empty text or an out-of-range
    /// rating, `CatalogError::Persistence` for backend failures.
    #[instrument(skip(self, input), fields(store = %input.store))]
    pub async fn add_review(&self, input: NewReview) -> Result<Review> {
        let text = input.text.trim().to_string();
        validate_review(&text, input.rating)?;

        let review = Review {
            id: ReviewId::generate(),
            author: input.author,
            store: input.store,
            text,
            rating: input.rating,
            created_at: Utc::now(),
        };

        Ok(self.reviews().insert(&review).await?)
    }
}

/// Trim the text fields of a create input.
fn normalize_new_store(mut input: NewStore) -> NewStore {
    input.name = input.name.trim().to_string();
    input.description = input.description.trim().to_string();
    input.location.address = input.location.address.trim().to_string();
    input
}

/// Trim the text fields of a patch.
fn normalize_patch(mut patch: StorePatch) -> StorePatch {
    patch.name = patch.name.map(|n| n.trim().to_string());
    patch.description = patch.description.map(|d| d.trim().to_string());
    if let Some(loc) = patch.location.as_mut() {
        loc.address = loc.address.trim().to_string();
    }
    patch
}

/// Required-field checks for store creation, ahead of slug resolution
/// and persistence.
fn validate_new_store(input: &NewStore) -> Result<()> {
    validate_name(&input.name)?;
    validate_address(&input.location.address)?;
    validate_coordinates(input.location.longitude, input.location.latitude)?;
    Ok(())
}

/// Required-field checks for the fields a patch actually carries.
fn validate_patch(patch: &StorePatch) -> Result<()> {
    if let Some(name) = &patch.name {
        validate_name(name)?;
    }
    if let Some(loc) = &patch.location {
        validate_address(&loc.address)?;
        validate_coordinates(loc.longitude, loc.latitude)?;
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(CatalogError::Validation(
            "You must supply a store name".to_string(),
        ));
    }
    // Names with no alphanumeric content would produce an empty slug,
    // which the unique-slug invariant forbids.
    if slug::slugify(name).is_empty() {
        return Err(CatalogError::Validation(
            "Store name must contain letters or digits".to_string(),
        ));
    }
    Ok(())
}

fn validate_address(address: &str) -> Result<()> {
    if address.is_empty() {
        return Err(CatalogError::Validation(
            "You must supply an address".to_string(),
        ));
    }
    Ok(())
}

fn validate_coordinates(longitude: f64, latitude: f64) -> Result<()> {
    if !longitude.is_finite() || !latitude.is_finite() {
        return Err(CatalogError::Validation(
            "You must supply coordinates".to_string(),
        ));
    }
    Ok(())
}

fn validate_review(text: &str, rating: i16) -> Result<()> {
    if text.is_empty() {
        return Err(CatalogError::Validation(
            "You must provide some text".to_string(),
        ));
    }
    if !(1..=5).contains(&rating) {
        return Err(CatalogError::Validation(
            "Rating must be between 1 and 5".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use localspot_core::UserId;

    use super::*;
    use crate::models::Location;

    fn new_store(name: &str, address: &str) -> NewStore {
        NewStore {
            name: name.to_string(),
            description: "  roomy  ".to_string(),
            tags: vec!["wifi".to_string()],
            location: Location {
                longitude: -0.1,
                latitude: 51.5,
                address: address.to_string(),
            },
            photo: None,
            author: UserId::generate(),
        }
    }

    #[test]
    fn normalization_trims_text_fields() {
        let input = normalize_new_store(new_store("  Cafe Joe  ", " 1 High St "));
        assert_eq!(input.name, "Cafe Joe");
        assert_eq!(input.description, "roomy");
        assert_eq!(input.location.address, "1 High St");
    }

    #[test]
    fn missing_name_is_rejected() {
        let input = normalize_new_store(new_store("   ", "1 High St"));
        assert!(matches!(
            validate_new_store(&input),
            Err(CatalogError::Validation(_))
        ));
    }

    #[test]
    fn name_without_alphanumerics_is_rejected() {
        let input = new_store("!!!", "1 High St");
        assert!(matches!(
            validate_new_store(&input),
            Err(CatalogError::Validation(_))
        ));
    }

    #[test]
    fn missing_address_is_rejected() {
        let input = normalize_new_store(new_store("Cafe Joe", "  "));
        assert!(matches!(
            validate_new_store(&input),
            Err(CatalogError::Validation(_))
        ));
    }

    #[test]
    fn non_finite_coordinates_are_rejected() {
        let mut input = new_store("Cafe Joe", "1 High St");
        input.location.latitude = f64::NAN;
        assert!(matches!(
            validate_new_store(&input),
            Err(CatalogError::Validation(_))
        ));
    }

    #[test]
    fn valid_input_passes() {
        let input = normalize_new_store(new_store("Cafe Joe", "1 High St"));
        assert!(validate_new_store(&input).is_ok());
    }

    #[test]
    fn patch_only_validates_present_fields() {
        let patch = StorePatch {
            description: Some("new blurb".to_string()),
            ..StorePatch::default()
        };
        assert!(validate_patch(&patch).is_ok());

        let patch = StorePatch {
            name: Some("  ".to_string()),
            ..StorePatch::default()
        };
        assert!(validate_patch(&normalize_patch(patch)).is_err());
    }

    #[test]
    fn review_rating_must_be_in_range() {
        assert!(validate_review("great", 5).is_ok());
        assert!(validate_review("great", 0).is_err());
        assert!(validate_review("great", 6).is_err());
        assert!(validate_review("", 3).is_err());
    }
}
