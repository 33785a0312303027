use super::{validate, Validate, ValidationError};
use crate::pipeline::Proceed;
use crate::types::AppError;
use axum::{
    body::Body,
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::any::type_name;
use tracing::debug;

/// Upper bound on accepted request bodies.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// A payload that passed its rule set, handed from the validator stage to the handler.
#[derive(Debug, Clone)]
pub struct Valid<T>(pub T);

/// Axum middleware running the validator stage for payload type `T`.
pub async fn validate_body<T>(req: Request, next: Next) -> Response
where
    T: Validate + Clone + Send + Sync + 'static,
{
    validate_stage::<T, _>(req, next).await
}

/// Reads the body, validates it as `T` and forwards the request with the typed
/// payload in its extensions. Terminates with 500 (decode) or 400 (fields).
pub async fn validate_stage<T, P>(req: Request, next: P) -> Response
where
    T: Validate + Clone + Send + Sync + 'static,
    P: Proceed,
{
    let (mut parts, body) = req.into_parts();

    let bytes = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => return ValidationError::Decode(e.to_string()).into_response(),
    };

    match validate::<T>(&bytes) {
        Ok(payload) => {
            parts.extensions.insert(Valid(payload));
            next.proceed(Request::from_parts(parts, Body::empty())).await
        }
        Err(err) => {
            debug!(
                payload = type_name::<T>(),
                path = %parts.uri.path(),
                error = %err,
                "request body rejected"
            );
            err.into_response()
        }
    }
}

impl<S, T> FromRequestParts<S> for Valid<T>
where
    S: Send + Sync,
    T: Clone + Send + Sync + 'static,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.remove::<Valid<T>>().ok_or_else(|| {
            AppError::Internal(format!(
                "no validated {} payload, validate_body is not mounted on this route",
                type_name::<T>()
            ))
        })
    }
}
