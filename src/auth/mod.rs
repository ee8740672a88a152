//! Admin authentication.
//!
//! A single static admin identity logs in with a username/password pair and
//! receives a short-lived signed token. Protected routes accept that token as
//! a bearer credential. Verification is stateless: no session table, no
//! refresh tokens.

pub mod errors;
pub mod credential;
pub mod token;

pub use errors::{AuthError, AuthResult};
pub use credential::AdminCredential;
pub use token::{
    bearer_token, AdminClaims, IssuedToken, TokenConfig, TokenService, ADMIN_ROLE,
    DEFAULT_TOKEN_TTL_SECS,
};
