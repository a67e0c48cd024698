mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{NewTweet, NewUser, Tweet, User};

/// Upper bound on `GET /tweets`. There is no cursor.
pub const RECENT_TWEETS_LIMIT: i64 = 100;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("a user with this email or username already exists")]
    Conflict,
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => StoreError::Conflict,
            _ => StoreError::Database(err),
        }
    }
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Inserts the user atomically and returns the stored row.
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn create_tweet(&self, tweet: NewTweet) -> Result<Tweet, StoreError>;

    /// Newest first, ties broken by id, at most `limit` rows.
    async fn recent_tweets(&self, limit: i64) -> Result<Vec<Tweet>, StoreError>;
}
