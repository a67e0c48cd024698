use async_trait::async_trait;
use log::debug;
use sqlx::PgPool;

use super::{Store, StoreError};
use crate::db;
use crate::models::{NewTweet, NewUser, Tweet, User};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        db::transaction(&self.pool, move |tx| {
            Box::pin(async move {
                let row = sqlx::query_as::<_, User>(
                    r#"
                    INSERT INTO users (username, email, password_hash, created_at, updated_at)
                    VALUES ($1, $2, $3, $4, $4)
                    RETURNING id, username, email, password_hash, created_at, updated_at
                    "#,
                )
                .bind(&user.username)
                .bind(&user.email)
                .bind(&user.password_hash)
                .bind(user.created_at)
                .fetch_one(&mut **tx)
                .await?;
                Ok::<_, StoreError>(row)
            })
        })
        .await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn create_tweet(&self, tweet: NewTweet) -> Result<Tweet, StoreError> {
        let row = sqlx::query_as::<_, Tweet>(
            r#"
            INSERT INTO tweets (user_id, content, created_at, updated_at)
            VALUES ($1, $2, $3, $3)
            RETURNING id, user_id, content, created_at, updated_at
            "#,
        )
        .bind(tweet.user_id)
        .bind(&tweet.content)
        .bind(tweet.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn recent_tweets(&self, limit: i64) -> Result<Vec<Tweet>, StoreError> {
        let tweets = sqlx::query_as::<_, Tweet>(
            r#"
            SELECT id, user_id, content, created_at, updated_at
            FROM tweets
            ORDER BY created_at DESC, id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        debug!("Fetched {} tweets", tweets.len());
        Ok(tweets)
    }
}
