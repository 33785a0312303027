use super::{IdentityContext, TokenRejection, TokenService};
use crate::db::IdentityStore;
use axum::http::{header, HeaderMap};
use std::sync::Arc;
use tracing::warn;

/// Turns the bearer header of a request into an [`IdentityContext`].
///
/// Steps, each terminal on failure: extract the bearer token, check the
/// signature, check expiry, resolve the subject against the store.
pub struct TokenVerifier {
    tokens: Arc<TokenService>,
    store: Arc<dyn IdentityStore>,
}

impl TokenVerifier {
    pub fn new(tokens: Arc<TokenService>, store: Arc<dyn IdentityStore>) -> Self {
        Self { tokens, store }
    }

    pub async fn verify(&self, headers: &HeaderMap) -> Result<IdentityContext, TokenRejection> {
        let token = bearer_token(headers).ok_or(TokenRejection::MissingOrMalformedToken)?;
        let claims = self.tokens.verify(token)?;

        let identity = match self.store.find_by_username(&claims.sub).await {
            Ok(found) => found,
            Err(e) => {
                warn!(error = %e, "identity lookup failed during token verification");
                None
            }
        };

        identity
            .map(|identity| IdentityContext::from(&identity))
            .ok_or(TokenRejection::UnknownSubject)
    }
}

/// The token of an `Authorization: Bearer <token>` header. The scheme is
/// matched case-insensitively; the token must be non-empty.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() && !token.contains(' ') {
        Some(token)
    } else {
        None
    }
}
