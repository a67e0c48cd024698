use actix_web::{post, web, HttpResponse};
use chrono::Utc;
use log::{debug, error, info, warn};

use crate::error::ApiError;
use crate::models::{
    AuthResponse, CreateTweetRequest, Identity, LoginRequest, NewTweet, NewUser, RegisterRequest,
    TweetCreatedResponse, TweetListResponse,
};
use crate::store::{StoreError, RECENT_TWEETS_LIMIT};
use crate::AppState;

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 50;
const PASSWORD_MIN: usize = 6;
const EMAIL_MAX: usize = 255;
const CONTENT_MIN: usize = 1;
const CONTENT_MAX: usize = 280;

#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    let req = body.into_inner();
    validate_register(&req)?;

    let passwords = state.passwords.clone();
    let password = req.password;
    let password_hash = web::block(move || passwords.hash(&password)).await??;

    let user = state
        .store
        .create_user(NewUser {
            username: req.username,
            email: req.email,
            password_hash,
            created_at: Utc::now(),
        })
        .await
        .map_err(|e| {
            match &e {
                StoreError::Conflict => warn!("Registration for an existing user"),
                StoreError::Database(_) => error!("Failed to create user: {}", e),
            }
            ApiError::from(e)
        })?;

    let token = state.tokens.issue(user.id, &user.username)?;

    info!("User registered: {} ({})", user.username, user.id);
    Ok(HttpResponse::Created().json(AuthResponse {
        status: "success".to_string(),
        message: "user created".to_string(),
        token,
    }))
}

#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    let req = body.into_inner();
    validate_login(&req)?;

    let user = state.store.find_user_by_email(&req.email).await.map_err(|e| {
        error!("Failed to look up user: {}", e);
        ApiError::from(e)
    })?;

    let passwords = state.passwords.clone();
    let password = req.password;
    let (user, matches) = web::block(move || match user {
        Some(user) => {
            let matches = passwords.verify(&user.password_hash, &password);
            (Some(user), matches)
        }
        None => {
            passwords.verify_dummy(&password);
            (None, false)
        }
    })
    .await?;

    let user = match user {
        Some(user) => user,
        None => {
            warn!("Login attempt for unknown email");
            return Err(ApiError::Unauthorized(
                "user does not exist, please register".into(),
            ));
        }
    };

    if !matches {
        warn!("Invalid password for user {}", user.id);
        return Err(ApiError::Unauthorized(
            "invalid password, please try again".into(),
        ));
    }

    let token = state.tokens.issue(user.id, &user.username)?;

    info!("User logged in: {} ({})", user.username, user.id);
    Ok(HttpResponse::Ok().json(AuthResponse {
        status: "success".to_string(),
        message: "logged in".to_string(),
        token,
    }))
}

/// The owner is always the authenticated caller. A `user_id` in the body is
/// tolerated only when it names that same caller.
pub async fn create_tweet(
    state: web::Data<AppState>,
    identity: web::ReqData<Identity>,
    body: web::Json<CreateTweetRequest>,
) -> Result<HttpResponse, ApiError> {
    let identity = identity.into_inner();
    let req = body.into_inner();
    validate_tweet(&req)?;

    if let Some(claimed) = req.user_id {
        if claimed != identity.user_id {
            warn!(
                "User {} tried to post as user {}",
                identity.user_id, claimed
            );
            return Err(ApiError::Forbidden(
                "user_id does not match the authenticated user".into(),
            ));
        }
    }

    let tweet = state
        .store
        .create_tweet(NewTweet {
            user_id: identity.user_id,
            content: req.content,
            created_at: Utc::now(),
        })
        .await
        .map_err(|e| {
            error!("Failed to create tweet: {}", e);
            ApiError::server("Unable to create tweet", e)
        })?;

    info!("Tweet created successfully: {}", tweet.id);
    Ok(HttpResponse::Created().json(TweetCreatedResponse {
        message: "tweet created".to_string(),
        tweet,
    }))
}

pub async fn list_tweets(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let tweets = state
        .store
        .recent_tweets(RECENT_TWEETS_LIMIT)
        .await
        .map_err(|e| {
            error!("Failed to fetch tweets: {}", e);
            ApiError::server("Unable to get tweets", e)
        })?;

    debug!("Returning {} tweets", tweets.len());
    Ok(HttpResponse::Ok().json(TweetListResponse {
        status: "tweets fetched".to_string(),
        tweets,
    }))
}

fn validate_register(req: &RegisterRequest) -> Result<(), ApiError> {
    let username_len = req.username.chars().count();
    if !(USERNAME_MIN..=USERNAME_MAX).contains(&username_len) {
        return Err(ApiError::InvalidBody(format!(
            "username must be between {} and {} characters",
            USERNAME_MIN, USERNAME_MAX
        )));
    }
    if req.username.chars().any(char::is_control) {
        return Err(ApiError::InvalidBody(
            "username must not contain control characters".into(),
        ));
    }
    validate_email(&req.email)?;
    validate_password(&req.password)
}

fn validate_login(req: &LoginRequest) -> Result<(), ApiError> {
    validate_email(&req.email)?;
    validate_password(&req.password)
}

fn validate_tweet(req: &CreateTweetRequest) -> Result<(), ApiError> {
    let len = req.content.chars().count();
    if !(CONTENT_MIN..=CONTENT_MAX).contains(&len) {
        return Err(ApiError::InvalidBody(format!(
            "content must be between {} and {} characters",
            CONTENT_MIN, CONTENT_MAX
        )));
    }
    // Line breaks and tabs are content; other control characters, NUL
    // included, cannot be stored.
    if req
        .content
        .chars()
        .any(|c| c.is_control() && !matches!(c, '\n' | '\r' | '\t'))
    {
        return Err(ApiError::InvalidBody(
            "content must not contain control characters".into(),
        ));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.chars().count() < PASSWORD_MIN {
        return Err(ApiError::InvalidBody(format!(
            "password must be at least {} characters",
            PASSWORD_MIN
        )));
    }
    if password.contains('\0') {
        return Err(ApiError::InvalidBody(
            "password must not contain NUL characters".into(),
        ));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), ApiError> {
    if email.chars().count() > EMAIL_MAX {
        return Err(ApiError::InvalidBody(format!(
            "email must be at most {} characters",
            EMAIL_MAX
        )));
    }
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(ApiError::InvalidBody("email is not a valid address".into()))
    }
}

fn is_valid_email(email: &str) -> bool {
    if email
        .chars()
        .any(|c| c.is_whitespace() || c.is_control())
    {
        return false;
    }
    let (local, domain) = match email.split_once('@') {
        Some(parts) => parts,
        None => return false,
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..")
}
