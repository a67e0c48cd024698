//! Runs against a real Postgres when `TEST_DB_URL` is set, and skips
//! otherwise. The database should be disposable: tables are truncated.

use std::path::Path;
use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use serial_test::serial;
use sqlx::PgPool;

use tweet_service::auth::{Passwords, TokenService};
use tweet_service::models::{NewTweet, NewUser};
use tweet_service::store::{PgStore, Store, StoreError};
use tweet_service::{db, routes, AppState};

async fn fresh_pool() -> Option<PgPool> {
    let url = match std::env::var("TEST_DB_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("TEST_DB_URL not set, skipping");
            return None;
        }
    };

    let pool = db::connect(&url, 2).await.unwrap();
    db::initialize_schema(&pool, Path::new("db/schema.sql"))
        .await
        .unwrap();
    sqlx::raw_sql("TRUNCATE tweets, users RESTART IDENTITY CASCADE")
        .execute(&pool)
        .await
        .unwrap();
    Some(pool)
}

fn new_user(username: &str, email: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        email: email.to_string(),
        password_hash: "$2b$04$placeholder".to_string(),
        created_at: Utc::now(),
    }
}

#[tokio::test]
#[serial]
async fn postgres_store_round_trip() {
    let Some(pool) = fresh_pool().await else {
        return;
    };
    let store = PgStore::new(pool.clone());

    // Schema application is repeatable.
    db::initialize_schema(&pool, Path::new("db/schema.sql"))
        .await
        .unwrap();

    let alice = store.create_user(new_user("alice", "a@x.com")).await.unwrap();
    assert_eq!(alice.username, "alice");
    assert_eq!(alice.created_at, alice.updated_at);

    let duplicate = store.create_user(new_user("alice2", "a@x.com")).await;
    assert!(matches!(duplicate, Err(StoreError::Conflict)));

    let found = store.find_user_by_email("a@x.com").await.unwrap().unwrap();
    assert_eq!(found.id, alice.id);
    assert!(store.find_user_by_email("b@x.com").await.unwrap().is_none());

    let start = Utc::now() - Duration::hours(1);
    for i in 0..150 {
        store
            .create_tweet(NewTweet {
                user_id: alice.id,
                content: format!("tweet {}", i),
                created_at: start + Duration::seconds(i),
            })
            .await
            .unwrap();
    }

    let tweets = store.recent_tweets(100).await.unwrap();
    assert_eq!(tweets.len(), 100);
    assert_eq!(tweets[0].content, "tweet 149");
    assert_eq!(tweets[99].content, "tweet 50");
    assert!(tweets.windows(2).all(|w| w[0].created_at >= w[1].created_at));
}

#[tokio::test]
#[serial]
async fn transaction_rolls_back_on_error() {
    let Some(pool) = fresh_pool().await else {
        return;
    };

    let result: Result<(), StoreError> = db::transaction(&pool, |tx| {
        Box::pin(async move {
            sqlx::query(
                "INSERT INTO users (username, email, password_hash) VALUES ('ghost', 'g@x.com', 'h')",
            )
            .execute(&mut **tx)
            .await?;
            Err::<(), _>(StoreError::Conflict)
        })
    })
    .await;
    assert!(result.is_err());

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = 'g@x.com'")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[actix_web::test]
#[serial]
async fn column_limits_surface_as_bad_requests() {
    let Some(pool) = fresh_pool().await else {
        return;
    };
    let state = web::Data::new(AppState::new(
        Arc::new(PgStore::new(pool.clone())),
        TokenService::new(b"postgres-test-secret-value"),
        Passwords::with_cost(4).unwrap(),
    ));
    let app = test::init_service(App::new().app_data(state).configure(routes::configure)).await;

    let long_email = format!("{}@x.com", "a".repeat(300));
    let req = test::TestRequest::post()
        .uri("/register")
        .set_json(json!({"username": "alice", "email": long_email, "password": "secret1"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/register")
        .set_json(json!({"username": "alice", "email": "a@x.com", "password": "secret1"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let token = body["token"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri("/tweets")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .set_json(json!({"content": "hi\u{0}there"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tweets")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}
