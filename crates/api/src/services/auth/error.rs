//! Authentication error types.

use thiserror::Error;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Password hashing or hash parsing failed.
    #[error("password hashing error")]
    PasswordHash,

    /// Token is malformed, expired, or has a bad signature.
    #[error("invalid or expired token")]
    InvalidToken,

    /// Token is valid but of the wrong type (e.g., a refresh token
    /// presented where an access token is required).
    #[error("wrong token type")]
    WrongTokenType,

    /// Token signing failed.
    #[error("token signing error: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}
