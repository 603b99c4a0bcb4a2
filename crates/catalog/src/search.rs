//! Relevance ranking over text-search hits.
//!
//! The persistence layer performs the token-based match over store names
//! and descriptions and attaches a relevance score to each hit (see
//! [`crate::db::stores::StoreRepository::text_search`]). This module holds
//! the engine's own guarantees: results come back sorted by non-increasing
//! score and never exceed the requested `k`, and every hit carries its
//! score. Ties keep the backend's natural order, which is not guaranteed
//! stable across calls.

use serde::Serialize;

use crate::models::Store;

/// Number of results a search returns at most.
pub const SEARCH_LIMIT: usize = 5;

/// A store matched by a text query, with its relevance score.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredStore {
    pub store: Store,
    pub score: f32,
}

/// Order hits by descending relevance and cap at `k`.
#[must_use]
pub fn rank(mut hits: Vec<ScoredStore>, k: usize) -> Vec<ScoredStore> {
    hits.sort_by(|a, b| b.score.total_cmp(&a.score));
    hits.truncate(k);
    hits
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use localspot_core::{StoreId, UserId};

    use super::*;
    use crate::models::Location;

    fn hit(name: &str, score: f32) -> ScoredStore {
        ScoredStore {
            store: Store {
                id: StoreId::generate(),
                name: name.to_string(),
                slug: crate::slug::slugify(name),
                description: String::new(),
                tags: vec![],
                location: Location {
                    longitude: 0.0,
                    latitude: 0.0,
                    address: "somewhere".to_string(),
                },
                photo: None,
                author: UserId::generate(),
                created_at: Utc::now(),
            },
            score,
        }
    }

    #[test]
    fn rank_sorts_by_descending_score() {
        let ranked = rank(vec![hit("a", 0.2), hit("b", 0.9), hit("c", 0.5)], 5);
        let scores: Vec<f32> = ranked.iter().map(|h| h.score).collect();
        assert_eq!(scores, vec![0.9, 0.5, 0.2]);
    }

    #[test]
    fn rank_never_returns_more_than_k() {
        let hits: Vec<ScoredStore> = (0..10).map(|i| hit("s", i as f32)).collect();
        assert_eq!(rank(hits, SEARCH_LIMIT).len(), SEARCH_LIMIT);
    }

    #[test]
    fn empty_hits_are_a_valid_empty_result() {
        assert!(rank(vec![], SEARCH_LIMIT).is_empty());
    }
}
