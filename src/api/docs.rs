use crate::api::handlers::{hello, users};
use crate::db::Role;
use crate::types::{
    CreateUserRequest, LoginRequest, LoginResponse, PublicIdentity, UpdateUserRequest,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

/// OpenAPI document served at `/api/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    info(title = "Gatekeeper", description = "Authentication, authorization and request validation"),
    paths(
        hello::hello,
        hello::health,
        users::login,
        users::me,
        users::create_user,
        users::find_users,
        users::update_user,
    ),
    components(schemas(
        LoginRequest,
        LoginResponse,
        CreateUserRequest,
        UpdateUserRequest,
        PublicIdentity,
        Role,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "users", description = "Login and account management"),
        (name = "public", description = "Unauthenticated endpoints")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
