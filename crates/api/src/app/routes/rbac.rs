//! RBAC endpoints for transparent authorization debugging.
//!
//! Answers "why was this request denied?" without performing the request.

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use taskhub_auth::{explain_authorization, permissions_for, Role};

use crate::app::dto;
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/roles", get(list_roles))
        .route("/explain", get(explain))
}

/// GET /rbac/roles - the static role to permission table
pub async fn list_roles() -> axum::response::Response {
    let roles: Vec<_> = Role::ALL
        .iter()
        .map(|role| {
            serde_json::json!({
                "role": role,
                "permissions": permissions_for(*role),
            })
        })
        .collect();
    (StatusCode::OK, Json(serde_json::json!({ "roles": roles }))).into_response()
}

/// GET /rbac/explain?permission= - would the caller be granted `permission`?
pub async fn explain(
    Extension(ctx): Extension<ActorContext>,
    Query(query): Query<dto::ExplainQuery>,
) -> axum::response::Response {
    let explanation = explain_authorization(ctx.actor(), &query.permission);
    (StatusCode::OK, Json(explanation)).into_response()
}
