use super::traits::{IdentityStore, NewIdentity};
use crate::auth::password::PasswordHasher;
use crate::types::Result;
use tracing::{debug, info};

/// Account to create at startup when it does not exist yet.
#[derive(Clone)]
pub struct SeedIdentity {
    pub username: String,
    pub email: String,
    pub password: String,
    pub roles: Vec<String>,
    pub is_active: bool,
}

impl std::fmt::Debug for SeedIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedIdentity")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("roles", &self.roles)
            .field("is_active", &self.is_active)
            .finish_non_exhaustive()
    }
}

/// Creates the missing seed accounts, returning how many were created.
/// Existing usernames are left untouched.
pub async fn seed_identities(
    store: &dyn IdentityStore,
    hasher: &PasswordHasher,
    seeds: &[SeedIdentity],
) -> Result<usize> {
    let mut created = 0;

    for seed in seeds {
        if store.find_by_username(&seed.username).await?.is_some() {
            debug!(username = %seed.username, "seed account already present");
            continue;
        }

        let mut role_ids = Vec::with_capacity(seed.roles.len());
        for code in &seed.roles {
            role_ids.push(store.upsert_role(code, code).await?.id);
        }

        let password_hash = hasher.hash_blocking(seed.password.clone()).await?;
        store
            .create(NewIdentity {
                username: seed.username.clone(),
                email: seed.email.clone(),
                password_hash,
                is_active: seed.is_active,
                role_ids,
            })
            .await?;
        created += 1;
    }

    if created > 0 {
        info!(created, "seeded accounts");
    }
    Ok(created)
}
