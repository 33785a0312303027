//! Authentication and Authorization
//!
//! This module is the security core of the pipeline: credential checks at
//! login, bearer-token issuance and verification on protected routes, and
//! role gating.
//!
//! # Module Structure
//!
//! - [`auth::password`](crate::auth::password) - Argon2id hashing with a configurable cost
//! - [`auth::authenticator`](crate::auth::authenticator) - identifier + secret to identity
//! - [`auth::jwt`](crate::auth::jwt) - HS512 token issuance and signature/expiry checks
//! - [`auth::verifier`](crate::auth::verifier) - bearer header to [`IdentityContext`]
//! - [`auth::roles`](crate::auth::roles) - role-based authorization decision
//! - [`auth::middleware`](crate::auth::middleware) - axum stages and extractors
//!
//! # Uniform failures
//!
//! Callers cannot tell failure causes apart. Every login failure is
//! [`AuthError::AuthenticationFailed`] and every token or authorization
//! rejection is the same 401 "Unauthorized" envelope. The specific
//! [`TokenRejection`] is only written to the logs.
//!
//! # Usage
//!
//! ```ignore
//! use gatekeeper::auth::middleware::{gate, require_identity, CurrentIdentity};
//!
//! let protected = get(me).layer(middleware::from_fn_with_state(state.clone(), require_identity));
//!
//! async fn me(CurrentIdentity(ctx): CurrentIdentity) -> impl IntoResponse {
//!     format!("Hello, {}!", ctx.identity.username)
//! }
//! ```

/// Credential authentication for logins.
pub mod authenticator;
/// Token signing and verification.
pub mod jwt;
/// Axum stages and extractors for protected routes.
pub mod middleware;
/// Password hashing.
pub mod password;
/// Authorization decisions.
pub mod roles;
/// Bearer token verification state machine.
pub mod verifier;

use crate::db::Identity;
use crate::types::PublicIdentity;

pub use authenticator::Authenticator;
pub use jwt::{SigningKey, TokenService};
pub use password::PasswordHasher;
pub use roles::{authorize, Decision};
pub use verifier::TokenVerifier;

/// The single, folded login failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Authentication failed")]
    AuthenticationFailed,
}

/// Why a bearer token was rejected. Logged, never sent to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenRejection {
    #[error("missing or malformed authorization header")]
    MissingOrMalformedToken,

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("token expired")]
    Expired,

    #[error("token subject does not resolve to an identity")]
    UnknownSubject,
}

impl TokenRejection {
    pub fn tag(&self) -> &'static str {
        match self {
            TokenRejection::MissingOrMalformedToken => "missing_or_malformed",
            TokenRejection::InvalidSignature => "invalid_signature",
            TokenRejection::Expired => "expired",
            TokenRejection::UnknownSubject => "unknown_subject",
        }
    }
}

/// Identity resolved for the current request by the token verifier.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityContext {
    pub identity: PublicIdentity,
}

impl IdentityContext {
    pub fn role_codes(&self) -> impl Iterator<Item = &str> {
        self.identity.roles.iter().map(|r| r.code.as_str())
    }
}

impl From<&Identity> for IdentityContext {
    fn from(identity: &Identity) -> Self {
        Self {
            identity: PublicIdentity::from(identity),
        }
    }
}
