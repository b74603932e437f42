//! `taskhub-auth`: the authorization and multi-tenant scoping engine.
//!
//! Pure decisions only: this crate is decoupled from HTTP and storage.
//! Callers fetch snapshots, these functions answer "is this allowed".

pub mod access;
pub mod authorize;
pub mod claims;
pub mod credentials;
pub mod hierarchy;
pub mod permissions;
pub mod principal;
pub mod roles;

pub use access::{
    authorize_organization_removal, can_access_organization, can_access_task_org,
    ensure_removable, plan_organization_creation, require_owner, CreationPlan, OrgDependents,
    OrgNode, OrgPolicyError, RemovalPlan,
};
pub use authorize::{
    explain_authorization, require_organization, require_permission, AuthorizationExplanation,
    AuthzError,
};
pub use claims::{validate_claims, Hs256Tokens, SessionClaims, SessionTokens, TokenError};
pub use credentials::{Argon2Hasher, CredentialError, CredentialHasher};
pub use hierarchy::accessible_org_ids;
pub use permissions::{has_permission, permissions_for, permissions_for_role_name, Permission};
pub use principal::{Actor, OrgMembership};
pub use roles::{Role, UnknownRole};
