/// Public greeting
#[utoipa::path(
    get,
    path = "/api/v1/hello",
    responses((status = 200, description = "Greeting", body = String)),
    tag = "public"
)]
pub async fn hello() -> &'static str {
    "Hello World!"
}

/// Liveness probe
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = String)),
    tag = "public"
)]
pub async fn health() -> &'static str {
    "OK"
}
