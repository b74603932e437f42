use axum::{routing::get, Router};

pub mod audit;
pub mod auth;
pub mod organizations;
pub mod rbac;
pub mod system;
pub mod tasks;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/audit-log", get(audit::list_audit_log))
        .nest("/tasks", tasks::router())
        .nest("/organizations", organizations::router())
        .nest("/rbac", rbac::router())
}
