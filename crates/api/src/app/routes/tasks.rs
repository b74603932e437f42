use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use taskhub_core::TaskId;
use taskhub_domain::{NewTask, TaskPatch};
use taskhub_services::Services;

use crate::app::errors;
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_tasks).post(create_task))
        .route("/:id", get(get_task).put(update_task).delete(delete_task))
}

pub async fn list_tasks(
    Extension(services): Extension<Arc<Services>>,
    Extension(ctx): Extension<ActorContext>,
) -> axum::response::Response {
    match services.tasks.list(ctx.actor()).await {
        Ok(items) => (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn create_task(
    Extension(services): Extension<Arc<Services>>,
    Extension(ctx): Extension<ActorContext>,
    Json(body): Json<NewTask>,
) -> axum::response::Response {
    match services.tasks.create(body, ctx.actor()).await {
        Ok(task) => (StatusCode::CREATED, Json(task)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_task(
    Extension(services): Extension<Arc<Services>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_id::<TaskId>(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };
    match services.tasks.get(id, ctx.actor()).await {
        Ok(task) => (StatusCode::OK, Json(task)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_task(
    Extension(services): Extension<Arc<Services>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<TaskPatch>,
) -> axum::response::Response {
    let id = match errors::parse_id::<TaskId>(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };
    match services.tasks.update(id, body, ctx.actor()).await {
        Ok(task) => (StatusCode::OK, Json(task)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_task(
    Extension(services): Extension<Arc<Services>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_id::<TaskId>(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };
    match services.tasks.remove(id, ctx.actor()).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
