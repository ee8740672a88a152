//! Auth errors.

use thiserror::Error;

/// Result type for auth operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Username or password did not match (generic, never says which).
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No bearer credential on a protected request.
    #[error("Access denied. No token provided.")]
    MissingToken,

    /// Bad signature, malformed token, wrong role or elapsed expiry.
    #[error("Invalid or expired token")]
    InvalidOrExpiredToken,

    /// Signing failed.
    #[error("Internal error: token generation failed")]
    TokenIssue,
}

impl AuthError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::InvalidCredentials => 401,
            AuthError::MissingToken => 401,
            AuthError::InvalidOrExpiredToken => 401,
            AuthError::TokenIssue => 500,
        }
    }

    /// Whether the caller is at fault.
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}
