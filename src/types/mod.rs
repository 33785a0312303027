use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::api::response::Envelope;
use crate::auth::AuthError;
use crate::db::{Identity, Role};
use crate::validation::{FieldRules, Rule, Validate, ValidationError};

// ============= API Request/Response Types =============

/// Login payload. `username`/`password` are accepted as aliases; sending a
/// field together with its alias fails to decode.
#[derive(Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct LoginRequest {
    #[serde(alias = "username")]
    pub identifier: String,
    #[serde(alias = "password")]
    pub secret: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("identifier", &self.identifier)
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl Validate for LoginRequest {
    const RULES: &'static [FieldRules] = &[
        FieldRules::new("identifier", &[Rule::Required]),
        FieldRules::new("secret", &[Rule::Required]),
    ];
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
}

#[derive(Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub repeat_password: String,
    pub email: String,
}

impl std::fmt::Debug for CreateUserRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateUserRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl Validate for CreateUserRequest {
    const RULES: &'static [FieldRules] = &[
        FieldRules::new(
            "username",
            &[Rule::Required, Rule::PrintAscii, Rule::Min(5), Rule::Max(20)],
        ),
        FieldRules::new("password", &[Rule::Required, Rule::Min(5)]),
        FieldRules::new(
            "repeatPassword",
            &[Rule::Required, Rule::EqField("password")],
        ),
        FieldRules::new("email", &[Rule::Required, Rule::Email]),
    ];
}

/// Partial account update. Absent fields are left untouched.
#[derive(Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub password: Option<String>,
    pub repeat_password: Option<String>,
    pub email: Option<String>,
    pub is_active: Option<bool>,
    /// Role ids replacing the current role set
    pub roles: Option<Vec<i64>>,
}

impl std::fmt::Debug for UpdateUserRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateUserRequest")
            .field("email", &self.email)
            .field("is_active", &self.is_active)
            .field("roles", &self.roles)
            .finish_non_exhaustive()
    }
}

impl Validate for UpdateUserRequest {
    const RULES: &'static [FieldRules] = &[
        FieldRules::new("password", &[Rule::Min(5)]),
        FieldRules::new(
            "repeatPassword",
            &[Rule::RequiredWith("password"), Rule::EqField("password")],
        ),
        FieldRules::new("email", &[Rule::Email]),
    ];
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FindUsersQuery {
    /// Substring of the username; empty or absent matches every account
    pub username: Option<String>,
}

/// Safe projection of an identity. Never carries the password digest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicIdentity {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub is_active: bool,
    pub roles: Vec<Role>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Identity> for PublicIdentity {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id,
            username: identity.username.clone(),
            email: identity.email.clone(),
            is_active: identity.is_active,
            roles: identity.roles.clone(),
            created_at: identity.created_at,
            updated_at: identity.updated_at,
        }
    }
}

impl From<Identity> for PublicIdentity {
    fn from(identity: Identity) -> Self {
        PublicIdentity::from(&identity)
    }
}

// ============= Authentication Types =============

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Identifier (username) of the authenticated identity
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Unauthorized")]
    Unauthorized,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    NotFound(String),

    /// The signing key cannot produce tokens. Configuration fault, not a bad request.
    #[error("Failed to sign token: {0}")]
    TokenSigning(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        match self {
            AppError::Auth(err) => {
                Envelope::empty(StatusCode::UNAUTHORIZED, err.to_string()).into_response()
            }
            AppError::Unauthorized => Envelope::unauthorized().into_response(),
            AppError::Validation(err) => err.into_response(),
            AppError::Conflict(msg) | AppError::InvalidInput(msg) => {
                Envelope::empty(StatusCode::BAD_REQUEST, msg).into_response()
            }
            AppError::NotFound(msg) => Envelope::empty(StatusCode::NOT_FOUND, msg).into_response(),
            AppError::TokenSigning(msg) => {
                tracing::error!(error = %msg, "token signing failed, check the configured signing key");
                Envelope::reason(StatusCode::INTERNAL_SERVER_ERROR).into_response()
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                Envelope::reason(StatusCode::INTERNAL_SERVER_ERROR).into_response()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
