mod common;

use common::Harness;
use taskhub_auth::Role;
use taskhub_core::{DomainError, OrganizationId};
use taskhub_domain::{NewTask, Organization};

#[tokio::test]
async fn owner_without_organization_creates_root_and_joins_it() {
    let h = Harness::new();
    let owner = h.user("owner@example.com", Role::Owner, None).await;

    let org = h
        .services
        .organizations
        .create("Acme", None, &owner.actor())
        .await
        .unwrap();

    assert!(org.parent_id.is_none());
    let actor = h.actor(owner.id).await;
    assert_eq!(actor.organization_id(), Some(org.id));

    let entries = h.store.audit_entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, "organization:create");
    assert_eq!(entries[0].resource_id, org.id.to_string());
    assert_eq!(entries[0].organization_id, Some(org.id));
}

#[tokio::test]
async fn root_owner_creates_child() {
    let h = Harness::new();
    let root = h.org("R", None).await;
    let owner = h.user("owner@example.com", Role::Owner, Some(root.id)).await;

    let child = h
        .services
        .organizations
        .create("Sub", Some(root.id), &owner.actor())
        .await
        .unwrap();
    assert_eq!(child.parent_id, Some(root.id));

    // Parent defaults to the owner's root.
    let implicit = h
        .services
        .organizations
        .create("Other", None, &owner.actor())
        .await
        .unwrap();
    assert_eq!(implicit.parent_id, Some(root.id));

    let entries = h.store.audit_entries();
    assert_eq!(entries[0].organization_id, Some(root.id));
}

#[tokio::test]
async fn non_owner_cannot_create_and_storage_is_untouched() {
    let h = Harness::new();
    let root = h.org("R", None).await;
    let admin = h.user("admin@example.com", Role::Admin, Some(root.id)).await;
    let before = h.store.operations();

    let err = h
        .services
        .organizations
        .create("Nope", None, &admin.actor())
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Forbidden(_)));
    assert_eq!(h.store.operations(), before);
    assert!(h.store.audit_entries().is_empty());
}

#[tokio::test]
async fn child_member_cannot_create() {
    let h = Harness::new();
    let root = h.org("R", None).await;
    let child = h.org("C", Some(root.id)).await;
    let owner = h.user("owner@example.com", Role::Owner, Some(child.id)).await;

    let err = h
        .services
        .organizations
        .create("Grandchild", None, &owner.actor())
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Forbidden(_)));
    assert!(h.store.audit_entries().is_empty());
}

#[tokio::test]
async fn depth_three_is_never_created() {
    let h = Harness::new();
    let root = h.org("R", None).await;
    let child = h.org("C", Some(root.id)).await;
    let owner = h.user("owner@example.com", Role::Owner, Some(root.id)).await;

    let err = h
        .services
        .organizations
        .create("Deep", Some(child.id), &owner.actor())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));

    let listed = h.services.organizations.list(&owner.actor()).await.unwrap();
    assert_eq!(listed.len(), 2);
}

#[tokio::test]
async fn first_organization_cannot_have_parent() {
    let h = Harness::new();
    let other = h.org("Other", None).await;
    let owner = h.user("owner@example.com", Role::Owner, None).await;

    let err = h
        .services
        .organizations
        .create("Acme", Some(other.id), &owner.actor())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));
}

#[tokio::test]
async fn parent_must_be_own_root() {
    let h = Harness::new();
    let mine = h.org("Mine", None).await;
    let theirs = h.org("Theirs", None).await;
    let owner = h.user("owner@example.com", Role::Owner, Some(mine.id)).await;

    let err = h
        .services
        .organizations
        .create("Sub", Some(theirs.id), &owner.actor())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::BadRequest(_)));

    let err = h
        .services
        .organizations
        .create("Sub", Some(OrganizationId::new()), &owner.actor())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_)));
}

#[tokio::test]
async fn list_depends_on_role_and_position() {
    let h = Harness::new();
    let root = h.org("R", None).await;
    let child = h.org("C", Some(root.id)).await;
    let owner = h.user("owner@example.com", Role::Owner, Some(root.id)).await;
    let admin = h.user("admin@example.com", Role::Admin, Some(root.id)).await;
    let child_owner = h.user("c@example.com", Role::Owner, Some(child.id)).await;
    let loner = h.user("loner@example.com", Role::Owner, None).await;

    let ids = |orgs: Vec<Organization>| orgs.into_iter().map(|o| o.id).collect::<Vec<_>>();
    let svc = &h.services.organizations;
    assert_eq!(ids(svc.list(&owner.actor()).await.unwrap()), vec![root.id, child.id]);
    assert_eq!(ids(svc.list(&admin.actor()).await.unwrap()), vec![root.id]);
    assert_eq!(ids(svc.list(&child_owner.actor()).await.unwrap()), vec![child.id]);
    assert!(svc.list(&loner.actor()).await.unwrap().is_empty());
}

#[tokio::test]
async fn organization_with_users_cannot_be_removed() {
    let h = Harness::new();
    let root = h.org("R", None).await;
    let owner = h.user("owner@example.com", Role::Owner, Some(root.id)).await;
    h.user("member@example.com", Role::Viewer, Some(root.id)).await;

    let err = h
        .services
        .organizations
        .remove(root.id, &owner.actor())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::BadRequest(_)));
    assert_eq!(h.actor(owner.id).await.organization_id(), Some(root.id));
}

#[tokio::test]
async fn removing_own_root_clears_membership() {
    let h = Harness::new();
    let root = h.org("R", None).await;
    let owner = h.user("owner@example.com", Role::Owner, Some(root.id)).await;

    h.services
        .organizations
        .remove(root.id, &owner.actor())
        .await
        .unwrap();

    assert_eq!(h.actor(owner.id).await.organization_id(), None);
    let entries = h.store.audit_entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, "organization:delete");
    assert_eq!(entries[0].resource_id, root.id.to_string());
}

#[tokio::test]
async fn child_removal_keeps_membership() {
    let h = Harness::new();
    let root = h.org("R", None).await;
    let child = h.org("C", Some(root.id)).await;
    let owner = h.user("owner@example.com", Role::Owner, Some(root.id)).await;

    h.services
        .organizations
        .remove(child.id, &owner.actor())
        .await
        .unwrap();
    assert_eq!(h.actor(owner.id).await.organization_id(), Some(root.id));
}

#[tokio::test]
async fn removal_refuses_children_tasks_and_foreign_targets() {
    let h = Harness::new();
    let root = h.org("R", None).await;
    let child = h.org("C", Some(root.id)).await;
    let foreign = h.org("F", None).await;
    let owner = h.user("owner@example.com", Role::Owner, Some(root.id)).await;
    let actor = owner.actor();
    let svc = &h.services.organizations;

    let err = svc.remove(root.id, &actor).await.unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));

    let input = NewTask {
        title: "Keep me".to_string(),
        organization_id: Some(child.id),
        ..Default::default()
    };
    h.services.tasks.create(input, &actor).await.unwrap();
    let err = svc.remove(child.id, &actor).await.unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));

    let err = svc.remove(foreign.id, &actor).await.unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(_)));

    let err = svc.remove(OrganizationId::new(), &actor).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_)));
}

#[tokio::test]
async fn removal_requires_owner_with_organization() {
    let h = Harness::new();
    let root = h.org("R", None).await;
    let admin = h.user("admin@example.com", Role::Admin, Some(root.id)).await;
    let loner = h.user("loner@example.com", Role::Owner, None).await;

    let err = h
        .services
        .organizations
        .remove(root.id, &admin.actor())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(_)));

    let err = h
        .services
        .organizations
        .remove(root.id, &loner.actor())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(_)));
}
