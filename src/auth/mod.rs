//! Credential handling: bcrypt password hashing, HS256 bearer tokens, and
//! the request gate that guards the protected routes.

pub mod gate;
mod passwords;
mod tokens;

pub use gate::require_bearer;
pub use passwords::{PasswordError, Passwords};
pub use tokens::{Claims, TokenError, TokenService, TOKEN_TTL_DAYS};
