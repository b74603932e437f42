use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use taskhub_services::Services;

use crate::app::errors;
use crate::context::ActorContext;

/// GET /audit-log - newest entries visible to the caller
pub async fn list_audit_log(
    Extension(services): Extension<Arc<Services>>,
    Extension(ctx): Extension<ActorContext>,
) -> axum::response::Response {
    match services.audit.find_all(ctx.actor()).await {
        Ok(items) => (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
