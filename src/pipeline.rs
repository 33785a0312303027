//! Stage plumbing shared by the validator and the auth stages.
//!
//! A stage either terminates the request with an envelope or hands it to the
//! next stage through [`Proceed`]. Stages are generic over `Proceed` so they
//! can be driven by a recording fake in tests instead of a full router.

use async_trait::async_trait;
use axum::{extract::Request, middleware::Next, response::Response};

/// Capability to advance a request to the next stage.
#[async_trait]
pub trait Proceed: Send {
    async fn proceed(self, req: Request) -> Response;
}

#[async_trait]
impl Proceed for Next {
    async fn proceed(self, req: Request) -> Response {
        self.run(req).await
    }
}
