use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use taskhub_services::AuthService;

use crate::app::errors;
use crate::context::ActorContext;

#[derive(Clone)]
pub struct AuthState {
    pub auth: Arc<AuthService>,
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer(req.headers()).ok_or_else(|| {
        errors::json_error(StatusCode::UNAUTHORIZED, "unauthenticated", "missing bearer token")
    })?;

    let user = state
        .auth
        .authenticate(token)
        .await
        .map_err(errors::domain_error_to_response)?;

    req.extensions_mut().insert(ActorContext::new(user.actor()));

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let token = header.to_str().ok()?.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}
