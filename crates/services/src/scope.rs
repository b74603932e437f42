//! Storage-backed organization scope resolution.

use taskhub_auth::accessible_org_ids;
use taskhub_core::{DomainResult, OrganizationId};
use taskhub_infra::OrganizationRepository;

/// The actor's home organization plus its direct children, home first.
pub async fn accessible_organizations(
    organizations: &dyn OrganizationRepository,
    home: OrganizationId,
) -> DomainResult<Vec<OrganizationId>> {
    let children = organizations.children_of(home).await?;
    Ok(accessible_org_ids(home, children.into_iter().map(|c| c.id)))
}
