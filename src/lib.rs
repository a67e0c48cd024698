pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod store;

use std::sync::Arc;

use auth::{Passwords, TokenService};
use store::Store;

/// Everything a handler needs, built once in `main` and shared read-only.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: TokenService,
    pub passwords: Passwords,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, tokens: TokenService, passwords: Passwords) -> Self {
        Self {
            store,
            tokens,
            passwords,
        }
    }
}
