use super::traits::{Identity, IdentityStore, IdentityUpdate, NewIdentity, Role};
use crate::types::{AppError, Result};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// In-process identity store.
///
/// Reads take a shared lock, writes an exclusive one; no lock is held across
/// an await point.
#[derive(Default)]
pub struct MemoryIdentityStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    next_identity_id: i64,
    next_role_id: i64,
    identities: BTreeMap<i64, Identity>,
    roles: BTreeMap<i64, Role>,
}

impl Inner {
    fn resolve_roles(&self, ids: &[i64]) -> Result<Vec<Role>> {
        ids.iter()
            .map(|id| {
                self.roles
                    .get(id)
                    .cloned()
                    .ok_or_else(|| AppError::InvalidInput(format!("Unknown role id {}", id)))
            })
            .collect()
    }

    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.identities
            .values()
            .any(|i| i.email == email && Some(i.id) != except)
    }
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>> {
        Ok(self
            .inner
            .read()
            .identities
            .values()
            .find(|i| i.username == username)
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Identity>> {
        Ok(self.inner.read().identities.get(&id).cloned())
    }

    async fn create(&self, identity: NewIdentity) -> Result<Identity> {
        let mut inner = self.inner.write();

        if inner
            .identities
            .values()
            .any(|i| i.username == identity.username)
        {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }
        if inner.email_taken(&identity.email, None) {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }

        let roles = inner.resolve_roles(&identity.role_ids)?;
        inner.next_identity_id += 1;
        let now = Utc::now();
        let created = Identity {
            id: inner.next_identity_id,
            username: identity.username,
            email: identity.email,
            password_hash: identity.password_hash,
            is_active: identity.is_active,
            roles,
            created_at: now,
            updated_at: now,
        };

        inner.identities.insert(created.id, created.clone());
        Ok(created)
    }

    async fn search(&self, fragment: &str) -> Result<Vec<Identity>> {
        Ok(self
            .inner
            .read()
            .identities
            .values()
            .filter(|i| i.username.contains(fragment))
            .cloned()
            .collect())
    }

    async fn update(&self, id: i64, update: IdentityUpdate) -> Result<Identity> {
        let mut inner = self.inner.write();

        if !inner.identities.contains_key(&id) {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        if let Some(ref email) = update.email {
            if inner.email_taken(email, Some(id)) {
                return Err(AppError::Conflict("Email already exists".to_string()));
            }
        }
        let roles = match update.role_ids {
            Some(ref ids) => Some(inner.resolve_roles(ids)?),
            None => None,
        };

        let identity = inner
            .identities
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        if let Some(email) = update.email {
            identity.email = email;
        }
        if let Some(hash) = update.password_hash {
            identity.password_hash = hash;
        }
        if let Some(active) = update.is_active {
            identity.is_active = active;
        }
        if let Some(roles) = roles {
            identity.roles = roles;
        }
        identity.updated_at = Utc::now();

        Ok(identity.clone())
    }

    async fn upsert_role(&self, code: &str, name: &str) -> Result<Role> {
        let mut inner = self.inner.write();

        if let Some(role) = inner.roles.values().find(|r| r.code == code) {
            return Ok(role.clone());
        }

        inner.next_role_id += 1;
        let role = Role {
            id: inner.next_role_id,
            code: code.to_string(),
            name: name.to_string(),
        };
        inner.roles.insert(role.id, role.clone());
        Ok(role)
    }
}
