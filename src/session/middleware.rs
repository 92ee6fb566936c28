use super::context::SessionContext;
use crate::errors::ConsoleError;
use actix_session::SessionExt;
use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
};
use serde_json::json;
use tracing::debug;

pub const LOGIN_PATH: &str = "/auth/login";

fn sign_in_required(req: ServiceRequest) -> ServiceResponse<BoxBody> {
    let resp = HttpResponse::Unauthorized().json(json!({
        "error": ConsoleError::Unauthorized.banner(),
        "login": LOGIN_PATH,
    }));
    req.into_response(resp.map_into_boxed_body())
}

/// Rejects console requests without a live session and attaches the
/// signed-in context to those that have one.
///
/// Must run inside the session middleware.
pub async fn session_gate(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let Some(context) = SessionContext::current(&req.get_session()) else {
        debug!(path = %req.path(), "No live session");
        return Ok(sign_in_required(req));
    };

    req.extensions_mut().insert(context);
    next.call(req).await
}
