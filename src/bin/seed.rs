use std::error::Error;
use std::path::Path;

use chrono::Utc;
use fake::faker::internet::en::{SafeEmail, Username};
use fake::faker::lorem::en::Sentence;
use fake::Fake;

use tweet_service::auth::Passwords;
use tweet_service::config;
use tweet_service::db;
use tweet_service::models::{NewTweet, NewUser};
use tweet_service::store::{PgStore, Store, StoreError};

const SEED_PASSWORD: &str = "password123";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    println!("Starting data seeding...");

    let database_url = config::database_url_from_env()?;
    let pool = db::connect(&database_url, 5).await?;
    db::initialize_schema(&pool, Path::new("db/schema.sql")).await?;
    let store = PgStore::new(pool);

    // Configuration
    let num_users = 100;
    let tweets_per_user = 20;

    let users = seed_users(&store, num_users).await?;
    seed_tweets(&store, &users, tweets_per_user).await?;

    store.pool().close().await;
    println!("Seeding completed!");
    Ok(())
}

async fn seed_users(store: &PgStore, count: usize) -> Result<Vec<i64>, Box<dyn Error>> {
    println!("Creating {} users...", count);
    // Every seeded account shares one password, so hash it once.
    let password_hash = Passwords::new()?.hash(SEED_PASSWORD)?;
    let mut users = Vec::with_capacity(count);

    while users.len() < count {
        let username: String = Username().fake();
        let email: String = SafeEmail().fake();

        let result = store
            .create_user(NewUser {
                username: username.chars().take(50).collect(),
                email,
                password_hash: password_hash.clone(),
                created_at: Utc::now(),
            })
            .await;

        match result {
            Ok(user) => {
                users.push(user.id);
                println!(
                    "Created user {}/{}: {} ({})",
                    users.len(),
                    count,
                    user.username,
                    user.id
                );
            }
            // Faker names repeat now and then; draw again.
            Err(StoreError::Conflict) => continue,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(users)
}

async fn seed_tweets(
    store: &PgStore,
    users: &[i64],
    tweets_per_user: usize,
) -> Result<(), Box<dyn Error>> {
    println!("Creating {} tweets per user...", tweets_per_user);
    let total_tweets = users.len() * tweets_per_user;
    let mut current_tweet = 0;

    for &user_id in users {
        for _ in 0..tweets_per_user {
            let content: String = Sentence(3..10).fake();

            store
                .create_tweet(NewTweet {
                    user_id,
                    content: content.chars().take(280).collect(),
                    created_at: Utc::now(),
                })
                .await?;

            current_tweet += 1;
            if current_tweet % 100 == 0 {
                println!("Created {}/{} tweets", current_tweet, total_tweets);
            }
        }
    }

    Ok(())
}
