//! API request handlers.
//!
//! Handlers only run after the stages mounted on their route have accepted
//! the request, so they take typed payloads and identities as extractors.

/// Public greeting and health endpoints.
pub mod hello;
/// Login and account management handlers.
pub mod users;
