use serde::Deserialize;

use taskhub_core::OrganizationId;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrganizationRequest {
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<OrganizationId>,
}

// -------------------------
// Query parameters
// -------------------------

#[derive(Debug, Deserialize)]
pub struct SignupOrganizationsQuery {
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExplainQuery {
    pub permission: String,
}
