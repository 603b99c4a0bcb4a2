//! Derived views over current catalog data.
//!
//! Both aggregations are stateless: they recompute from the data they are
//! handed on every call, with no incremental maintenance. The repository
//! supplies the join inputs; the ranking and counting happen here so they
//! are pure and independently testable.

use std::collections::HashMap;

use serde::Serialize;

use localspot_core::StoreId;

use crate::models::Store;

/// Stores with fewer reviews than this are excluded from the top-stores
/// view, so a single outlier rating cannot dominate the ranking.
pub const MIN_REVIEWS_FOR_RANKING: usize = 2;

/// Maximum stores in the top-stores view.
pub const TOP_STORES_LIMIT: usize = 10;

/// A store together with its derived average rating.
///
/// `average_rating` is never persisted; it exists only in this view.
#[derive(Debug, Clone, Serialize)]
pub struct RatedStore {
    pub store: Store,
    pub average_rating: f64,
    pub review_count: usize,
}

/// A tag facet: one tag value and how often it occurs across all stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: u64,
}

/// Rank stores by average review rating.
///
/// Joins each store against the `(store, rating)` pairs, keeps stores
/// with at least [`MIN_REVIEWS_FOR_RANKING`] reviews, and returns at most
/// [`TOP_STORES_LIMIT`] stores ordered by non-increasing average rating.
/// Secondary order under ties is unspecified.
#[must_use]
pub fn top_stores(stores: Vec<Store>, ratings: &[(StoreId, i16)]) -> Vec<RatedStore> {
    let mut per_store: HashMap<StoreId, (u64, usize)> = HashMap::new();
    for &(store_id, rating) in ratings {
        let entry = per_store.entry(store_id).or_insert((0, 0));
        entry.0 += u64::from(rating.unsigned_abs());
        entry.1 += 1;
    }

    let mut rated: Vec<RatedStore> = stores
        .into_iter()
        .filter_map(|store| {
            let &(sum, count) = per_store.get(&store.id)?;
            if count < MIN_REVIEWS_FOR_RANKING {
                return None;
            }
            #[allow(clippy::cast_precision_loss)]
            let average_rating = sum as f64 / count as f64;
            Some(RatedStore {
                store,
                average_rating,
                review_count: count,
            })
        })
        .collect();

    rated.sort_by(|a, b| b.average_rating.total_cmp(&a.average_rating));
    rated.truncate(TOP_STORES_LIMIT);
    rated
}

/// Count tag occurrences across all stores.
///
/// Every `(store, tag)` occurrence counts once - a store submitting the
/// same tag twice counts twice. Facets are ordered by descending count,
/// then ascending tag for a deterministic listing.
#[must_use]
pub fn tag_facets<'a, I>(stores: I) -> Vec<TagCount>
where
    I: IntoIterator<Item = &'a Store>,
{
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for store in stores {
        for tag in &store.tags {
            *counts.entry(tag.as_str()).or_insert(0) += 1;
        }
    }

    let mut facets: Vec<TagCount> = counts
        .into_iter()
        .map(|(tag, count)| TagCount {
            tag: tag.to_string(),
            count,
        })
        .collect();

    facets.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));
    facets
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use localspot_core::UserId;

    use super::*;
    use crate::models::Location;

    fn store_with_tags(tags: &[&str]) -> Store {
        Store {
            id: StoreId::generate(),
            name: "Store".to_string(),
            slug: "store".to_string(),
            description: String::new(),
            tags: tags.iter().map(ToString::to_string).collect(),
            location: Location {
                longitude: 0.0,
                latitude: 0.0,
                address: "somewhere".to_string(),
            },
            photo: None,
            author: UserId::generate(),
            created_at: Utc::now(),
        }
    }

    fn ratings_for(store: &Store, ratings: &[i16]) -> Vec<(StoreId, i16)> {
        ratings.iter().map(|&r| (store.id, r)).collect()
    }

    #[test]
    fn stores_with_fewer_than_two_reviews_are_excluded() {
        let lonely = store_with_tags(&[]);
        let popular = store_with_tags(&[]);
        let mut ratings = ratings_for(&lonely, &[5]);
        ratings.extend(ratings_for(&popular, &[3, 4]));

        let top = top_stores(vec![lonely.clone(), popular.clone()], &ratings);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].store.id, popular.id);
        assert!(top.iter().all(|r| r.review_count >= MIN_REVIEWS_FOR_RANKING));
    }

    #[test]
    fn average_rating_is_the_arithmetic_mean() {
        let store = store_with_tags(&[]);
        let ratings = ratings_for(&store, &[2, 3, 4]);
        let top = top_stores(vec![store], &ratings);
        assert_eq!(top[0].average_rating, 3.0);
        assert_eq!(top[0].review_count, 3);
    }

    #[test]
    fn top_stores_is_sorted_descending_and_capped_at_ten() {
        let stores: Vec<Store> = (0..12).map(|_| store_with_tags(&[])).collect();
        let mut ratings = Vec::new();
        for (i, store) in stores.iter().enumerate() {
            let r = i16::try_from(1 + i % 5).expect("small rating");
            ratings.extend(ratings_for(store, &[r, r, 5]));
        }

        let top = top_stores(stores, &ratings);
        assert_eq!(top.len(), TOP_STORES_LIMIT);
        for pair in top.windows(2) {
            assert!(pair[0].average_rating >= pair[1].average_rating);
        }
    }

    #[test]
    fn stores_without_reviews_never_rank() {
        let unreviewed = store_with_tags(&[]);
        let top = top_stores(vec![unreviewed], &[]);
        assert!(top.is_empty());
    }

    #[test]
    fn facet_counts_sum_to_total_tag_occurrences() {
        let stores = vec![
            store_with_tags(&["wifi", "vegan"]),
            store_with_tags(&["wifi"]),
            store_with_tags(&["vegan", "wifi", "family-friendly"]),
        ];
        let facets = tag_facets(&stores);

        let occurrences: usize = stores.iter().map(|s| s.tags.len()).sum();
        let counted: u64 = facets.iter().map(|f| f.count).sum();
        assert_eq!(counted, occurrences as u64);

        assert_eq!(facets[0], TagCount { tag: "wifi".to_string(), count: 3 });
    }

    #[test]
    fn duplicate_tags_within_one_store_count_twice() {
        let stores = vec![store_with_tags(&["food", "food"])];
        let facets = tag_facets(&stores);
        assert_eq!(facets, vec![TagCount { tag: "food".to_string(), count: 2 }]);
    }

    #[test]
    fn facet_ties_are_ordered_by_tag() {
        let stores = vec![store_with_tags(&["b", "a"])];
        let facets = tag_facets(&stores);
        assert_eq!(facets[0].tag, "a");
        assert_eq!(facets[1].tag, "b");
    }
}
