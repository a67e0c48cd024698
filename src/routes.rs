use actix_web::middleware::from_fn;
use actix_web::web;
use log::warn;

use crate::auth::require_bearer;
use crate::error::ApiError;
use crate::handlers;

/// Registers every route. `/register` and `/login` are open; `/tweets` sits
/// behind the bearer-token gate.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(handlers::register)
        .service(handlers::login)
        .service(
            web::resource("/tweets")
                .route(web::post().to(handlers::create_tweet))
                .route(web::get().to(handlers::list_tweets))
                .wrap(from_fn(require_bearer)),
        );
}

/// Malformed or mistyped JSON becomes a 400 with the parser's message.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, req| {
        warn!("Rejected body on {}: {}", req.path(), err);
        ApiError::InvalidBody(err.to_string()).into()
    })
}
