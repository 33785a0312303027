//! # Gatekeeper
//!
//! Authentication, authorization and request-validation pipeline for small
//! HTTP services built on Axum.
//!
//! ## Overview
//!
//! Every inbound request passes through up to three stages before its
//! handler runs:
//!
//! 1. **Request Validator** - decodes the JSON body into a typed payload and
//!    checks its declarative rule set ([`validation`])
//! 2. **Token Verifier** - turns the bearer token into an identity context
//!    ([`auth::middleware::require_identity`])
//! 3. **Authorization Gate** - checks the identity's roles
//!    ([`auth::middleware::gate`])
//!
//! Login runs the validator, then the credential authenticator, then the
//! token issuer.
//!
//! Gatekeeper can be used in two ways:
//!
//! 1. **As a standalone server** - Run the `gatekeeper-server` binary
//! 2. **As a library** - Mount the stages on your own routes
//!
//! ## Library Usage
//!
//! ```rust,ignore
//! use gatekeeper::{auth::middleware::require_identity, validation::validate_body};
//! use axum::{middleware, routing::post, Router};
//!
//! let router: Router<AppState> = Router::new().route(
//!     "/orders",
//!     post(create_order)
//!         .layer(middleware::from_fn_with_state(state.clone(), require_identity))
//!         .layer(middleware::from_fn(validate_body::<CreateOrder>)),
//! );
//! ```
//!
//! ## Modules
//!
//! - [`api`] - REST API handlers, routes and the response envelope
//! - [`auth`] - Password hashing, tokens, verification and role gating
//! - [`db`] - Identity store abstraction and the in-memory store
//! - [`validation`] - Declarative request body validation
//! - [`types`] - Request/response types and error handling

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// HTTP API handlers and routes.
pub mod api;
/// Authentication, token handling and authorization.
pub mod auth;
/// Command-line interface.
pub mod cli;
/// Identity storage.
pub mod db;
/// Stage plumbing shared by the middleware stages.
pub mod pipeline;
/// Core types (requests, responses, errors).
pub mod types;
/// Configuration and logging setup.
pub mod utils;
/// Request body validation.
pub mod validation;

// Re-export commonly used types
pub use api::response::Envelope;
pub use api::routes::app;
pub use types::{AppError, Result};
pub use utils::config::{ConfigError, GatekeeperConfig};

use crate::auth::{Authenticator, PasswordHasher, SigningKey, TokenService, TokenVerifier};
use crate::db::IdentityStore;
use std::sync::Arc;

/// Application state shared across handlers and stages
#[derive(Clone)]
pub struct AppState {
    /// Configuration loaded at startup
    pub config: Arc<GatekeeperConfig>,
    /// Identity store
    pub store: Arc<dyn IdentityStore>,
    /// Password hasher used for new and changed passwords
    pub hasher: PasswordHasher,
    /// Token issuer holding the process-wide signing key
    pub tokens: Arc<TokenService>,
    /// Credential authenticator for logins
    pub authenticator: Arc<Authenticator>,
    /// Bearer token verifier for protected routes
    pub verifier: Arc<TokenVerifier>,
}

impl AppState {
    /// Wires the services from the configuration, the signing key and a store.
    pub fn build(
        config: GatekeeperConfig,
        key: &SigningKey,
        store: Arc<dyn IdentityStore>,
    ) -> Result<Self> {
        let hasher = PasswordHasher::new(config.auth.hash_cost)?;
        let ttl = config.auth.token_ttl().ok_or_else(|| {
            AppError::Internal("auth.token_ttl_hours is out of range".to_string())
        })?;
        let tokens = Arc::new(TokenService::new(key, ttl));
        let authenticator = Arc::new(Authenticator::new(store.clone(), hasher.clone())?);
        let verifier = Arc::new(TokenVerifier::new(tokens.clone(), store.clone()));

        Ok(Self {
            config: Arc::new(config),
            store,
            hasher,
            tokens,
            authenticator,
            verifier,
        })
    }
}
