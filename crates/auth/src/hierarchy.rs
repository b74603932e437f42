//! Organization hierarchy resolution.
//!
//! Organizations nest at most two levels deep, so the set of organizations a
//! user may act within is their home organization plus its direct children.
//! The resolver never recurses.

use taskhub_core::OrganizationId;

/// Compute the accessible organization set for a home organization.
///
/// The home organization comes first; children follow in the order the caller
/// supplied them (no re-sorting). Duplicates, including a child equal to the
/// home id, are dropped.
///
/// The home id is not optional: callers short-circuit the unaffiliated case
/// before resolving.
pub fn accessible_org_ids<I>(home: OrganizationId, children: I) -> Vec<OrganizationId>
where
    I: IntoIterator<Item = OrganizationId>,
{
    let mut ids = vec![home];
    for child in children {
        if !ids.contains(&child) {
            ids.push(child);
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn home_only_when_no_children() {
        let home = OrganizationId::new();
        assert_eq!(accessible_org_ids(home, Vec::new()), vec![home]);
    }

    #[test]
    fn children_keep_caller_order() {
        let home = OrganizationId::new();
        let a = OrganizationId::new();
        let b = OrganizationId::new();
        assert_eq!(accessible_org_ids(home, [b, a]), vec![home, b, a]);
    }

    #[test]
    fn home_is_never_duplicated() {
        let home = OrganizationId::new();
        let a = OrganizationId::new();
        assert_eq!(accessible_org_ids(home, [home, a, a]), vec![home, a]);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;
        use std::collections::HashSet;

        proptest! {
            /// Property: result == {home} ∪ children, home first and never repeated.
            #[test]
            fn closure_is_home_plus_children(
                home_idx in 0usize..6,
                child_idxs in prop::collection::vec(0usize..6, 0..12)
            ) {
                let pool: Vec<OrganizationId> = (0..6).map(|_| OrganizationId::new()).collect();
                let home = pool[home_idx];
                let children: Vec<OrganizationId> = child_idxs.iter().map(|i| pool[*i]).collect();

                let ids = accessible_org_ids(home, children.clone());

                prop_assert_eq!(ids[0], home);
                prop_assert_eq!(ids.iter().filter(|id| **id == home).count(), 1);

                let got: HashSet<OrganizationId> = ids.iter().copied().collect();
                let mut want: HashSet<OrganizationId> = children.into_iter().collect();
                want.insert(home);
                prop_assert_eq!(got.len(), ids.len());
                prop_assert_eq!(got, want);
            }
        }
    }
}
