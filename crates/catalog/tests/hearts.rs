//! Integration tests for the hearts (favorites) toggle.
//!
//! These tests require a running `PostgreSQL` database reachable via
//! `CATALOG_TEST_DATABASE_URL`; migrations are applied on connect. They
//! are `#[ignore]`d so the default unit run stays database-free.
//!
//! Run with: CATALOG_TEST_DATABASE_URL=... cargo test -p localspot-catalog -- --ignored

use secrecy::SecretString;
use sqlx::PgPool;

use localspot_catalog::db::{self, UserRepository};
use localspot_catalog::models::{Location, NewStore};
use localspot_catalog::CatalogService;
use localspot_core::UserId;

/// Connect to the test database, or `None` when the env var is unset.
async fn test_pool() -> Option<PgPool> {
    let url = std::env::var("CATALOG_TEST_DATABASE_URL").ok()?;
    let pool = db::create_pool(&SecretString::from(url), 2)
        .await
        .expect("connect to test database");
    db::run_migrations(&pool).await.expect("run migrations");
    Some(pool)
}

/// Insert a bare user row the way the auth layer would.
async fn create_user(pool: &PgPool) -> UserId {
    let user_id = UserId::generate();
    sqlx::query("INSERT INTO catalog.app_user (id) VALUES ($1)")
        .bind(user_id.as_uuid())
        .execute(pool)
        .await
        .expect("insert user");
    user_id
}

fn unique_store(author: UserId) -> NewStore {
    // The author's UUID in the name keeps slugs unique across test runs.
    NewStore {
        name: format!("Heart Test {author}"),
        description: "somewhere to heart".to_string(),
        tags: vec!["test".to_string()],
        location: Location {
            longitude: -0.1,
            latitude: 51.5,
            address: "1 High Street".to_string(),
        },
        photo: None,
        author,
    }
}

#[tokio::test]
#[ignore = "requires CATALOG_TEST_DATABASE_URL"]
async fn double_toggle_returns_to_the_original_state() {
    let Some(pool) = test_pool().await else { return };
    let user_id = create_user(&pool).await;

    let service = CatalogService::new(pool.clone());
    let store = service
        .create_store(unique_store(user_id))
        .await
        .expect("create store");

    let after_first = service
        .toggle_heart(user_id, store.id)
        .await
        .expect("first toggle");
    assert_eq!(after_first, vec![store.id]);

    let after_second = service
        .toggle_heart(user_id, store.id)
        .await
        .expect("second toggle");
    assert_eq!(after_second, Vec::new());
}

#[tokio::test]
#[ignore = "requires CATALOG_TEST_DATABASE_URL"]
async fn repeated_toggles_never_duplicate_a_heart() {
    let Some(pool) = test_pool().await else { return };
    let user_id = create_user(&pool).await;

    let service = CatalogService::new(pool.clone());
    let store = service
        .create_store(unique_store(user_id))
        .await
        .expect("create store");

    // Odd number of toggles lands on "hearted", exactly once.
    for _ in 0..3 {
        service
            .toggle_heart(user_id, store.id)
            .await
            .expect("toggle");
    }

    let user = UserRepository::new(&pool)
        .get(user_id)
        .await
        .expect("load user")
        .expect("user exists");
    assert!(user.has_hearted(store.id));
    let occurrences = user.hearts.iter().filter(|&&id| id == store.id).count();
    assert_eq!(occurrences, 1);
}
