use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::{Store, StoreError};
use crate::models::{NewTweet, NewUser, Tweet, User};

/// In-process store with the same uniqueness and ordering rules as the
/// Postgres schema. Backs the HTTP tests.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    tweets: Vec<Tweet>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        // Every write completes before the guard drops, so poisoned data is still whole.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.tables();
        if tables
            .users
            .iter()
            .any(|u| u.email == user.email || u.username == user.username)
        {
            return Err(StoreError::Conflict);
        }

        let row = User {
            id: tables.users.len() as i64 + 1,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            created_at: user.created_at,
            updated_at: user.created_at,
        };
        tables.users.push(row.clone());
        Ok(row)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.tables().users.iter().find(|u| u.email == email).cloned())
    }

    async fn create_tweet(&self, tweet: NewTweet) -> Result<Tweet, StoreError> {
        let mut tables = self.tables();
        let row = Tweet {
            id: tables.tweets.len() as i64 + 1,
            user_id: tweet.user_id,
            content: tweet.content,
            created_at: tweet.created_at,
            updated_at: tweet.created_at,
        };
        tables.tweets.push(row.clone());
        Ok(row)
    }

    async fn recent_tweets(&self, limit: i64) -> Result<Vec<Tweet>, StoreError> {
        let mut tweets = self.tables().tweets.clone();
        tweets.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        tweets.truncate(limit.max(0) as usize);
        Ok(tweets)
    }
}
