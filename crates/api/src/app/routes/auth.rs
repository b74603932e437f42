//! Public authentication endpoints.

use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use taskhub_auth::Role;
use taskhub_services::{Services, SignupRequest};

use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/organizations", get(signup_organizations))
}

pub async fn signup(
    Extension(services): Extension<Arc<Services>>,
    Json(body): Json<SignupRequest>,
) -> axum::response::Response {
    match services.auth.signup(body).await {
        Ok(result) => (StatusCode::CREATED, Json(result)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn login(
    Extension(services): Extension<Arc<Services>>,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    let user = match services.auth.validate_user(&body.email, &body.password).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return errors::json_error(
                StatusCode::UNAUTHORIZED,
                "unauthenticated",
                "invalid credentials",
            );
        }
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.auth.login(&user).await {
        Ok(token) => (StatusCode::OK, Json(token)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// GET /auth/organizations?role= - organizations a new user may join
pub async fn signup_organizations(
    Extension(services): Extension<Arc<Services>>,
    Query(query): Query<dto::SignupOrganizationsQuery>,
) -> axum::response::Response {
    // Unrecognized roles see the unfiltered list, like no role at all.
    let role = query.role.and_then(|r| r.parse::<Role>().ok());
    match services.auth.organizations_for_signup(role).await {
        Ok(items) => (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
