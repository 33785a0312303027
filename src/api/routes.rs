use crate::api::{docs::ApiDoc, handlers::hello, handlers::users};
use crate::auth::{
    middleware::{gate, require_identity},
    roles::ADMIN,
};
use crate::types::{CreateUserRequest, LoginRequest, UpdateUserRequest};
use crate::validation::validate_body;
use crate::AppState;
use axum::{
    extract::Request,
    middleware::{self, Next},
    routing::{get, patch, post},
    Json, Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;

/// Routes mounted under `/api/v1`.
///
/// Stages run in the order validator, token verifier, authorization gate,
/// so each route lists its layers innermost first.
pub fn create_router(state: &AppState) -> Router<AppState> {
    let verify = || middleware::from_fn_with_state(state.clone(), require_identity);

    Router::new()
        // Public routes (no token required)
        .route("/hello", get(hello::hello))
        .route(
            "/users/login",
            post(users::login).layer(middleware::from_fn(validate_body::<LoginRequest>)),
        )
        // Protected routes
        .route("/users/me", get(users::me).layer(verify()))
        .route(
            "/users",
            post(users::create_user)
                .layer(verify())
                .layer(middleware::from_fn(validate_body::<CreateUserRequest>))
                .merge(get(users::find_users).layer(verify())),
        )
        .route(
            "/users/{id}",
            patch(users::update_user)
                .layer(middleware::from_fn(|req: Request, next: Next| {
                    gate(&[ADMIN], req, next)
                }))
                .layer(verify())
                .layer(middleware::from_fn(validate_body::<UpdateUserRequest>)),
        )
}

/// The complete service: API routes, health probe, OpenAPI document and the
/// tracing/CORS layers.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(hello::health))
        .route("/api/openapi.json", get(openapi))
        .nest("/api/v1", create_router(&state))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
