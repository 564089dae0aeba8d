use prodcat::{Action, CatalogError, Resource, Role, authorize, has_permission, has_permission_str};

#[test]
fn manage_is_reserved_for_super_admins() {
    for resource in Resource::ALL {
        assert!(has_permission(Role::SuperAdmin, Action::Manage, resource));
        assert!(!has_permission(Role::OrgAdmin, Action::Manage, resource));
        assert!(!has_permission(Role::Member, Action::Manage, resource));
    }
}

#[test]
fn member_never_exceeds_org_admin() {
    for resource in Resource::ALL {
        for action in Action::ALL {
            if has_permission(Role::Member, action, resource) {
                assert!(
                    has_permission(Role::OrgAdmin, action, resource),
                    "member may {action} {resource} but org admin may not"
                );
            }
        }
    }
}

#[test]
fn unknown_tokens_are_denied() {
    assert!(!has_permission_str("GUEST", "view", "products"));
    assert!(!has_permission_str("SUPER_ADMIN", "approve", "products"));
    assert!(!has_permission_str("SUPER_ADMIN", "view", "invoices"));
    assert!(!has_permission_str("", "", ""));
}

#[test]
fn denial_is_uniform() {
    let err = authorize(Role::Member, Action::Delete, Resource::Users).unwrap_err();
    assert!(matches!(err, CatalogError::AccessDenied { .. }));
    assert_eq!(err.to_string(), "access denied: MEMBER may not delete users");

    assert!(authorize(Role::OrgAdmin, Action::Edit, Resource::Products).is_ok());
}
