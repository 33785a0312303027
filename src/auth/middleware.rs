use super::{authorize, Decision, IdentityContext, TokenVerifier};
use crate::api::response::Envelope;
use crate::pipeline::Proceed;
use crate::AppState;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

/// Token verifier stage for protected routes.
pub async fn require_identity(State(state): State<AppState>, req: Request, next: Next) -> Response {
    verify_stage(&state.verifier, req, next).await
}

/// Verifies the bearer token, attaches the [`IdentityContext`] and proceeds.
/// Every rejection produces the same 401 envelope.
pub async fn verify_stage<P: Proceed>(
    verifier: &TokenVerifier,
    mut req: Request,
    next: P,
) -> Response {
    let verdict = verifier.verify(req.headers()).await;

    match verdict {
        Ok(ctx) => {
            req.extensions_mut().insert(ctx);
            next.proceed(req).await
        }
        Err(rejection) => {
            debug!(
                reason = rejection.tag(),
                path = %req.uri().path(),
                "token rejected"
            );
            Envelope::unauthorized().into_response()
        }
    }
}

/// Authorization gate stage. Mount inside [`require_identity`]:
///
/// ```ignore
/// patch(handler)
///     .layer(middleware::from_fn(|req: Request, next: Next| gate(&[ADMIN], req, next)))
///     .layer(middleware::from_fn_with_state(state.clone(), require_identity))
/// ```
///
/// A request without an identity context is denied.
pub async fn gate<P: Proceed>(required: &'static [&'static str], req: Request, next: P) -> Response {
    let decision = match req.extensions().get::<IdentityContext>() {
        Some(ctx) => authorize(ctx, required),
        None => Decision::Denied,
    };

    match decision {
        Decision::Allowed => next.proceed(req).await,
        Decision::Denied => {
            debug!(?required, path = %req.uri().path(), "authorization denied");
            Envelope::unauthorized().into_response()
        }
    }
}

/// Extractor for the identity attached by [`require_identity`].
#[derive(Debug, Clone)]
pub struct CurrentIdentity(pub IdentityContext);

impl<S> FromRequestParts<S> for CurrentIdentity
where
    S: Send + Sync,
{
    type Rejection = Envelope;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<IdentityContext>()
            .cloned()
            .map(CurrentIdentity)
            .ok_or_else(Envelope::unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{roles::ADMIN, SigningKey, TokenService};
    use crate::db::{IdentityStore, MemoryIdentityStore, NewIdentity};
    use crate::pipeline::testing::{body_json, RecordingNext};
    use axum::{body::Body, http::StatusCode};
    use chrono::Duration;
    use std::sync::Arc;

    async fn setup(roles: &[&str]) -> (TokenVerifier, Arc<TokenService>) {
        let tokens = Arc::new(TokenService::new(
            &SigningKey::new("middleware-secret").expect("key"),
            Duration::hours(1),
        ));
        let store = Arc::new(MemoryIdentityStore::new());
        let mut role_ids = vec![];
        for code in roles {
            role_ids.push(store.upsert_role(code, code).await.expect("role").id);
        }
        store
            .create(NewIdentity {
                username: "user".to_string(),
                email: "user@example.com".to_string(),
                password_hash: "digest".to_string(),
                is_active: true,
                role_ids,
            })
            .await
            .expect("create");

        (TokenVerifier::new(tokens.clone(), store), tokens)
    }

    fn request(authorization: Option<String>) -> Request {
        let mut builder = Request::builder().uri("/api/v1/users/me");
        if let Some(value) = authorization {
            builder = builder.header("authorization", value);
        }
        builder.body(Body::empty()).expect("should build request")
    }

    #[tokio::test]
    async fn test_valid_token_injects_context() {
        let (verifier, tokens) = setup(&[]).await;
        let token = tokens.issue("user").expect("issue");
        let next = RecordingNext::default();

        let response =
            verify_stage(&verifier, request(Some(format!("Bearer {token}"))), next.clone()).await;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let forwarded = next.take().expect("should proceed");
        let ctx = forwarded
            .extensions()
            .get::<IdentityContext>()
            .expect("context should be attached");
        assert_eq!(ctx.identity.username, "user");
    }

    #[tokio::test]
    async fn test_rejections_are_uniform() {
        let (verifier, _) = setup(&[]).await;
        let foreign = TokenService::new(&SigningKey::new("other").expect("key"), Duration::hours(1))
            .issue("user")
            .expect("issue");

        for authorization in [
            None,
            Some("Token abc".to_string()),
            Some(format!("Bearer {foreign}")),
        ] {
            let next = RecordingNext::default();
            let response = verify_stage(&verifier, request(authorization), next.clone()).await;

            assert_eq!(next.calls(), 0);
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            let body = body_json(response).await;
            assert_eq!(
                body,
                serde_json::json!({"status": 401, "message": "Unauthorized", "data": null})
            );
        }
    }

    #[tokio::test]
    async fn test_gate_allows_matching_role() {
        let (verifier, tokens) = setup(&[ADMIN]).await;
        let ctx = verifier
            .verify(request(Some(format!("Bearer {}", tokens.issue("user").expect("issue")))).headers())
            .await
            .expect("verify");
        let mut req = request(None);
        req.extensions_mut().insert(ctx);
        let next = RecordingNext::default();

        let response = gate(&[ADMIN, "user-manager"], req, next.clone()).await;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(next.calls(), 1);
    }

    #[tokio::test]
    async fn test_gate_denies_without_role() {
        let (verifier, tokens) = setup(&["reader"]).await;
        let ctx = verifier
            .verify(request(Some(format!("Bearer {}", tokens.issue("user").expect("issue")))).headers())
            .await
            .expect("verify");
        let mut req = request(None);
        req.extensions_mut().insert(ctx);
        let next = RecordingNext::default();

        let response = gate(&[ADMIN], req, next.clone()).await;

        assert_eq!(next.calls(), 0);
        let body = body_json(response).await;
        assert_eq!(body["status"], 401);
        assert_eq!(body["message"], "Unauthorized");
        assert!(body["data"].is_null());
    }

    #[tokio::test]
    async fn test_gate_denies_without_context() {
        let next = RecordingNext::default();

        let response = gate(&[], request(None), next.clone()).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(next.calls(), 0);
    }
}
