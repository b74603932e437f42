use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};

use taskhub_core::OrganizationId;
use taskhub_services::Services;

use crate::app::{dto, errors};
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_organizations).post(create_organization))
        .route("/:id", delete(delete_organization))
}

pub async fn list_organizations(
    Extension(services): Extension<Arc<Services>>,
    Extension(ctx): Extension<ActorContext>,
) -> axum::response::Response {
    match services.organizations.list(ctx.actor()).await {
        Ok(items) => (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn create_organization(
    Extension(services): Extension<Arc<Services>>,
    Extension(ctx): Extension<ActorContext>,
    Json(body): Json<dto::CreateOrganizationRequest>,
) -> axum::response::Response {
    match services
        .organizations
        .create(&body.name, body.parent_id, ctx.actor())
        .await
    {
        Ok(org) => (StatusCode::CREATED, Json(org)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_organization(
    Extension(services): Extension<Arc<Services>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_id::<OrganizationId>(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };
    match services.organizations.remove(id, ctx.actor()).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
