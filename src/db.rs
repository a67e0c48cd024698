use std::path::Path;

use futures::future::BoxFuture;
use log::{error, info};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, Transaction};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("unable to connect to database: {0}")]
    Connect(#[source] sqlx::Error),
    #[error("failed to load schema file {path}: {source}")]
    SchemaRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to execute schema: {0}")]
    SchemaExec(#[source] sqlx::Error),
}

/// Opens a pool and pings it so a bad DSN fails at startup rather than on the
/// first request.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, DbError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .map_err(DbError::Connect)?;

    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .map_err(DbError::Connect)?;

    info!("Connection to database is established");
    Ok(pool)
}

/// Applies the DDL script in one batch. The script is expected to guard its
/// own statements (`IF NOT EXISTS`).
pub async fn initialize_schema(pool: &PgPool, path: &Path) -> Result<(), DbError> {
    let script = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| DbError::SchemaRead {
            path: path.display().to_string(),
            source,
        })?;

    sqlx::raw_sql(&script)
        .execute(pool)
        .await
        .map_err(DbError::SchemaExec)?;

    info!("Database schema applied from {}", path.display());
    Ok(())
}

/// Runs `f` inside a transaction. Commits only when `f` succeeds; any error
/// rolls the transaction back before it is returned.
pub async fn transaction<T, E, F>(pool: &PgPool, f: F) -> Result<T, E>
where
    T: Send + 'static,
    E: From<sqlx::Error> + Send + 'static,
    F: for<'c> FnOnce(&'c mut Transaction<'static, Postgres>) -> BoxFuture<'c, Result<T, E>>,
{
    let mut tx = pool.begin().await?;

    match f(&mut tx).await {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                error!("Rollback failed: {:?}", rollback_err);
            }
            Err(err)
        }
    }
}
