mod caller;
mod claims;
mod jwt;

use thiserror::Error;

pub use caller::Caller;
pub use claims::Claims;
pub use jwt::JwtValidator;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Invalid API key")]
    InvalidApiKey,
}
