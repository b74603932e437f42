//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: storage selection and service construction
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use taskhub_infra::AppConfig;
use taskhub_services::Services;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &AppConfig) -> anyhow::Result<Router> {
    let services = services::build_services(config).await?;
    Ok(router(services))
}

/// Router over already-wired services.
pub fn router(services: Services) -> Router {
    let auth_state = middleware::AuthState {
        auth: services.auth.clone(),
    };
    let services = Arc::new(services);

    // Protected routes: require a valid bearer token and an existing user.
    let protected = routes::router()
        .layer(Extension(services.clone()))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/auth", routes::auth::router().layer(Extension(services)))
        .merge(protected)
        .layer(ServiceBuilder::new())
}
