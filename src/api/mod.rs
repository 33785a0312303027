//! HTTP API Handlers and Routes
//!
//! The REST surface of Gatekeeper, built on Axum. Pipeline stages are
//! mounted per route in [`routes`](crate::api::routes).
//!
//! # API Endpoints
//!
//! ## Public
//! - `GET /api/v1/hello` - Greeting
//! - `POST /api/v1/users/login` - Exchange credentials for an access token
//! - `GET /health` - Health check
//! - `GET /api/openapi.json` - OpenAPI document
//!
//! ## Protected (`Authorization: Bearer <token>`)
//! - `GET /api/v1/users/me` - The calling identity
//! - `POST /api/v1/users` - Create an account
//! - `GET /api/v1/users?username=<fragment>` - Search accounts
//! - `PATCH /api/v1/users/{id}` - Update an account (`admin` role)
//!
//! Every JSON response uses the [`Envelope`](response::Envelope) shape.

/// OpenAPI document.
pub mod docs;
/// Request and response handlers for all API endpoints.
pub mod handlers;
/// Response envelope.
pub mod response;
/// Router configuration and route definitions.
pub mod routes;
