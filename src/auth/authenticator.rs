use super::{AuthError, PasswordHasher};
use crate::db::{Identity, IdentityStore};
use crate::types::Result;
use std::sync::Arc;
use tracing::{debug, warn};

/// Resolves an identifier/secret pair to an active identity.
///
/// Unknown identifier, inactive account, wrong secret and store failures all
/// return the same [`AuthError::AuthenticationFailed`]. Unknown identifiers
/// are checked against a decoy digest so they cost as much as a wrong secret.
pub struct Authenticator {
    store: Arc<dyn IdentityStore>,
    hasher: PasswordHasher,
    decoy_digest: String,
}

impl Authenticator {
    pub fn new(store: Arc<dyn IdentityStore>, hasher: PasswordHasher) -> Result<Self> {
        let decoy_digest = hasher.hash("decoy-secret-never-matches")?;

        Ok(Self {
            store,
            hasher,
            decoy_digest,
        })
    }

    pub async fn authenticate(
        &self,
        identifier: &str,
        secret: &str,
    ) -> std::result::Result<Identity, AuthError> {
        let identity = match self.store.find_by_username(identifier).await {
            Ok(found) => found,
            Err(e) => {
                warn!(error = %e, "identity lookup failed during login");
                None
            }
        };

        let digest = identity
            .as_ref()
            .map(|i| i.password_hash.clone())
            .unwrap_or_else(|| self.decoy_digest.clone());
        let matched = self
            .hasher
            .verify_blocking(digest, secret.to_string())
            .await;

        match identity {
            None => {
                debug!(reason = "unknown_identifier", "authentication failed");
                Err(AuthError::AuthenticationFailed)
            }
            Some(identity) if !identity.is_active => {
                debug!(reason = "inactive", user_id = identity.id, "authentication failed");
                Err(AuthError::AuthenticationFailed)
            }
            Some(identity) if !matched => {
                debug!(reason = "secret_mismatch", user_id = identity.id, "authentication failed");
                Err(AuthError::AuthenticationFailed)
            }
            Some(identity) => Ok(identity),
        }
    }
}
