//! Identity store abstraction
//!
//! The pipeline only reads identities. Account creation and updates go
//! through the same store from the account handlers.

use crate::types::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Role attached to an identity. Authorization compares `code` values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Role {
    pub id: i64,
    pub code: String,
    pub name: String,
}

/// Account record as held by the store
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub id: i64,
    /// Unique, case-sensitive login identifier
    pub username: String,
    pub email: String,
    /// Self-describing password digest
    pub password_hash: String,
    pub is_active: bool,
    pub roles: Vec<Role>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identity {
    pub fn role_codes(&self) -> impl Iterator<Item = &str> {
        self.roles.iter().map(|r| r.code.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_active: bool,
    pub role_ids: Vec<i64>,
}

/// Partial update; `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct IdentityUpdate {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub is_active: Option<bool>,
    pub role_ids: Option<Vec<i64>>,
}

/// Identity persistence used by the authenticator, the token verifier and
/// the account handlers. Implementations must allow concurrent reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// `Ok(None)` for unknown identifiers, never an error.
    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Identity>>;

    /// Fails with `AppError::Conflict` on a duplicate username or email.
    async fn create(&self, identity: NewIdentity) -> Result<Identity>;

    /// Identities whose username contains `fragment`, ordered by id.
    async fn search(&self, fragment: &str) -> Result<Vec<Identity>>;

    /// Fails with `AppError::NotFound` for an unknown id and
    /// `AppError::Conflict` when the new email belongs to another identity.
    async fn update(&self, id: i64, update: IdentityUpdate) -> Result<Identity>;

    /// Returns the role with `code`, creating it if needed.
    async fn upsert_role(&self, code: &str, name: &str) -> Result<Role>;
}
