/// Integration tests for the user service

mod common;

use campaignhub_shared::error::is_unique_violation;
use campaignhub_shared::models::{CreateUser, User};
use campaignhub_shared::services::{CampaignService, UserService};
use campaignhub_shared::ServiceError;
use chrono::Utc;

async fn count_users_with_email(pool: &sqlx::PgPool, email: &str) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = $1")
        .bind(email)
        .fetch_one(pool)
        .await
        .expect("Failed to count users")
}

#[tokio::test]
async fn test_create_user_normalizes_email() {
    let Some(pool) = common::test_pool().await else { return };
    let users = UserService::new(pool.clone());

    let email = common::unique_email("Artist");
    let raw = format!("  {}  ", email.to_uppercase());

    let created = users
        .create_user(&raw, Some("  DJ Nova  "))
        .await
        .expect("Failed to create user");

    assert!(created.id > 0);
    assert_eq!(created.email, email.to_lowercase());
    assert_eq!(created.artist_name.as_deref(), Some("DJ Nova"));
    assert!(created.is_active);
    assert_eq!(created.created_at, created.updated_at);

    let fetched = users
        .get_user_by_id(created.id)
        .await
        .expect("Failed to fetch user");
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_create_user_duplicate_is_conflict() {
    let Some(pool) = common::test_pool().await else { return };
    let users = UserService::new(pool.clone());

    let email = common::unique_email("dup");
    users.create_user(&email, None).await.expect("First create failed");

    // Same address with different casing and padding
    let again = users
        .create_user(&format!(" {} ", email.to_uppercase()), Some("Other"))
        .await;

    assert!(matches!(again, Err(ServiceError::Conflict(_))));
    assert_eq!(count_users_with_email(&pool, &email).await, 1);
}

#[tokio::test]
async fn test_create_user_invalid_email() {
    let Some(pool) = common::test_pool().await else { return };
    let users = UserService::new(pool);

    for bad in ["", "invalid-email", "user@localhost", "@example.com"] {
        let result = users.create_user(bad, None).await;
        assert!(
            matches!(result, Err(ServiceError::InvalidInput(_))),
            "{:?} should be rejected",
            bad
        );
    }
}

#[tokio::test]
async fn test_blank_artist_name_is_stored_as_none() {
    let Some(pool) = common::test_pool().await else { return };
    let users = UserService::new(pool);

    let user = users
        .create_user(&common::unique_email("blank"), Some("   "))
        .await
        .expect("Failed to create user");

    assert!(user.artist_name.is_none());
}

#[tokio::test]
async fn test_get_user_not_found() {
    let Some(pool) = common::test_pool().await else { return };
    let users = UserService::new(pool);

    let result = users.get_user_by_id(-1).await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn test_get_all_users_in_insertion_order() {
    let Some(pool) = common::test_pool().await else { return };
    let users = UserService::new(pool);

    let first = users.create_user(&common::unique_email("order-a"), None).await.unwrap();
    let second = users.create_user(&common::unique_email("order-b"), None).await.unwrap();

    let all = users.get_all_users().await.expect("Failed to list users");
    let position = |id: i64| all.iter().position(|u| u.id == id).expect("user missing from list");

    assert!(position(first.id) < position(second.id));
}

#[tokio::test]
async fn test_get_user_campaigns() {
    let Some(pool) = common::test_pool().await else { return };
    let users = UserService::new(pool.clone());
    let campaigns = CampaignService::new(pool.clone());

    let user = users.create_user(&common::unique_email("owner"), None).await.unwrap();
    let a = campaigns.create_campaign(user.id, "Single", None).await.unwrap();
    let b = campaigns.create_campaign(user.id, "Album", Some("active")).await.unwrap();

    let owned = users.get_user_campaigns(user.id).await.expect("Failed to list campaigns");
    assert_eq!(owned.iter().map(|c| c.id).collect::<Vec<_>>(), vec![a.id, b.id]);

    let missing = users.get_user_campaigns(-1).await;
    assert!(matches!(missing, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn test_deleting_user_cascades_to_campaigns_and_tasks() {
    let Some(pool) = common::test_pool().await else { return };
    let users = UserService::new(pool.clone());
    let campaigns = CampaignService::new(pool.clone());

    let user = users.create_user(&common::unique_email("cascade"), None).await.unwrap();
    let campaign = campaigns.create_campaign(user.id, "Tour", None).await.unwrap();
    campaigns.add_task(campaign.id, "Book venues", None).await.unwrap();

    assert!(User::delete(&pool, user.id).await.expect("Failed to delete user"));

    let campaign_result = campaigns.get_campaign(campaign.id).await;
    assert!(matches!(campaign_result, Err(ServiceError::NotFound(_))));

    let orphaned: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM campaign_tasks WHERE campaign_id = $1")
        .bind(campaign.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(orphaned, 0);
}

#[tokio::test]
async fn test_create_user_rejects_email_wider_than_column() {
    let Some(pool) = common::test_pool().await else { return };
    let users = UserService::new(pool.clone());

    let email = format!("{}@example.com", "a".repeat(280));
    let result = users.create_user(&email, None).await;

    assert!(matches!(result, Err(ServiceError::InvalidInput(_))));
    assert_eq!(count_users_with_email(&pool, &email).await, 0);
}

#[tokio::test]
async fn test_create_user_rejects_nul_in_artist_name() {
    let Some(pool) = common::test_pool().await else { return };
    let users = UserService::new(pool.clone());

    let email = common::unique_email("nul");
    let result = users.create_user(&email, Some("DJ\u{0}Nova")).await;

    assert!(matches!(result, Err(ServiceError::InvalidInput(_))));
    assert_eq!(count_users_with_email(&pool, &email).await, 0);
}

#[tokio::test]
async fn test_duplicate_insert_is_unique_violation() {
    let Some(pool) = common::test_pool().await else { return };
    let email = common::unique_email("raw-dup");

    let data = || CreateUser {
        email: email.clone(),
        artist_name: None,
        created_at: Utc::now(),
    };

    User::create(&pool, data()).await.expect("First insert failed");
    let err = User::create(&pool, data())
        .await
        .expect_err("Second insert should hit the unique constraint");

    assert!(is_unique_violation(&err));
}

#[tokio::test]
async fn test_concurrent_creates_store_one_user() {
    let Some(pool) = common::test_pool().await else { return };
    let users = UserService::new(pool.clone());
    let email = common::unique_email("race");

    let (a, b) = tokio::join!(users.create_user(&email, None), users.create_user(&email, None));

    let created = [&a, &b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(created, 1, "results: {:?} / {:?}", a, b);
    for result in [&a, &b] {
        if let Err(err) = result {
            assert!(matches!(err, ServiceError::Conflict(_)), "unexpected error: {:?}", err);
        }
    }
    assert_eq!(count_users_with_email(&pool, &email).await, 1);
}
