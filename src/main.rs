use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::{Builder, Env};
use log::{error, info};

use tweet_service::auth::{Passwords, TokenService};
use tweet_service::config::Config;
use tweet_service::store::PgStore;
use tweet_service::{db, routes, AppState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    info!("Starting tweet service...");

    let config = Config::from_env().map_err(fatal)?;

    let pool = db::connect(&config.database_url, config.max_connections)
        .await
        .map_err(fatal)?;
    db::initialize_schema(&pool, &config.schema_path)
        .await
        .map_err(fatal)?;

    let passwords = Passwords::new().map_err(fatal)?;
    let tokens = TokenService::new(config.jwt_secret.as_bytes());
    let state = web::Data::new(AppState::new(
        Arc::new(PgStore::new(pool.clone())),
        tokens,
        passwords,
    ));

    info!(
        "Listening on {} with {} workers",
        config.bind_addr, config.workers
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(routes::configure)
    })
    .workers(config.workers)
    .bind(&config.bind_addr)
    .map_err(fatal)?
    .run()
    .await?;

    pool.close().await;
    info!("Shut down cleanly");
    Ok(())
}

/// Startup failures are logged and end the process before it serves anything.
fn fatal(err: impl std::fmt::Display) -> std::io::Error {
    error!("Startup failed: {}", err);
    std::io::Error::other(err.to_string())
}
