use crate::{
    api::response::Envelope,
    auth::middleware::CurrentIdentity,
    db::{IdentityUpdate, NewIdentity},
    types::{
        AppError, CreateUserRequest, FindUsersQuery, LoginRequest, LoginResponse,
        PublicIdentity, Result, UpdateUserRequest,
    },
    validation::Valid,
    AppState,
};
use axum::extract::{Path, Query, State};
use tracing::info;

/// Exchange credentials for an access token
#[utoipa::path(
    post,
    path = "/api/v1/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Missing identifier or secret"),
        (status = 401, description = "Authentication failed")
    ),
    tag = "users"
)]
pub async fn login(
    State(state): State<AppState>,
    Valid(payload): Valid<LoginRequest>,
) -> Result<Envelope<LoginResponse>> {
    let identity = state
        .authenticator
        .authenticate(&payload.identifier, &payload.secret)
        .await?;

    let access_token = state.tokens.issue(&identity.username)?;
    info!(user_id = identity.id, "login succeeded");

    Ok(Envelope::success(LoginResponse { access_token }))
}

/// The authenticated caller
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current identity", body = PublicIdentity),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn me(CurrentIdentity(ctx): CurrentIdentity) -> Envelope<PublicIdentity> {
    Envelope::success(ctx.identity)
}

/// Create a new account
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "Account created", body = PublicIdentity),
        (status = 400, description = "Field violations or duplicate username/email"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    CurrentIdentity(caller): CurrentIdentity,
    Valid(payload): Valid<CreateUserRequest>,
) -> Result<Envelope<PublicIdentity>> {
    let password_hash = state.hasher.hash_blocking(payload.password).await?;

    let identity = state
        .store
        .create(NewIdentity {
            username: payload.username,
            email: payload.email,
            password_hash,
            is_active: true,
            role_ids: vec![],
        })
        .await?;

    info!(
        user_id = identity.id,
        created_by = caller.identity.id,
        "account created"
    );
    Ok(Envelope::success(identity.into()))
}

/// Search accounts by username fragment
#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(FindUsersQuery),
    responses(
        (status = 200, description = "Matching accounts", body = Vec<PublicIdentity>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn find_users(
    State(state): State<AppState>,
    Query(query): Query<FindUsersQuery>,
) -> Result<Envelope<Vec<PublicIdentity>>> {
    let fragment = query.username.unwrap_or_default();
    let found = state.store.search(&fragment).await?;

    Ok(Envelope::success(
        found.into_iter().map(PublicIdentity::from).collect(),
    ))
}

/// Update an account. Requires the `admin` role.
#[utoipa::path(
    patch,
    path = "/api/v1/users/{id}",
    params(("id" = i64, Path, description = "Account id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Account updated", body = PublicIdentity),
        (status = 400, description = "Field violations, bad id, duplicate email or unknown role"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    CurrentIdentity(caller): CurrentIdentity,
    Valid(payload): Valid<UpdateUserRequest>,
) -> Result<Envelope<PublicIdentity>> {
    let id: i64 = id
        .parse()
        .map_err(|_| AppError::InvalidInput("Invalid user id".to_string()))?;

    // Empty strings mean "leave unchanged"; the rules skip them as absent.
    let password = payload.password.filter(|p| !p.is_empty());
    let email = payload.email.filter(|e| !e.is_empty());

    let password_hash = match password {
        Some(password) => Some(state.hasher.hash_blocking(password).await?),
        None => None,
    };

    let identity = state
        .store
        .update(
            id,
            IdentityUpdate {
                email,
                password_hash,
                is_active: payload.is_active,
                role_ids: payload.roles,
            },
        )
        .await?;

    info!(
        user_id = identity.id,
        updated_by = caller.identity.id,
        "account updated"
    );
    Ok(Envelope::success(identity.into()))
}
