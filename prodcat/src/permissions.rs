//! Role-based permission table consulted by route guards.
//!
//! Roles come from an identity token that has already been verified
//! upstream; nothing here inspects tokens.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CatalogError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    SuperAdmin,
    OrgAdmin,
    Member,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    View,
    Create,
    Edit,
    Delete,
    Manage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Organizations,
    Users,
    Invitations,
    Products,
    Categories,
    Fields,
    Settings,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::SuperAdmin, Role::OrgAdmin, Role::Member];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "SUPER_ADMIN",
            Role::OrgAdmin => "ORG_ADMIN",
            Role::Member => "MEMBER",
        }
    }
}

impl Action {
    pub const ALL: [Action; 5] = [Action::View, Action::Create, Action::Edit, Action::Delete, Action::Manage];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Create => "create",
            Action::Edit => "edit",
            Action::Delete => "delete",
            Action::Manage => "manage",
        }
    }
}

impl Resource {
    pub const ALL: [Resource; 7] = [
        Resource::Organizations,
        Resource::Users,
        Resource::Invitations,
        Resource::Products,
        Resource::Categories,
        Resource::Fields,
        Resource::Settings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Organizations => "organizations",
            Resource::Users => "users",
            Resource::Invitations => "invitations",
            Resource::Products => "products",
            Resource::Categories => "categories",
            Resource::Fields => "fields",
            Resource::Settings => "settings",
        }
    }
}

macro_rules! display_via_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_via_as_str!(Role, Action, Resource);

/// Unrecognised role, action or resource token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownToken(pub String);

impl fmt::Display for UnknownToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown token '{}'", self.0)
    }
}

impl std::error::Error for UnknownToken {}

impl FromStr for Role {
    type Err = UnknownToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownToken(s.to_string()))
    }
}

impl FromStr for Action {
    type Err = UnknownToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|action| action.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownToken(s.to_string()))
    }
}

impl FromStr for Resource {
    type Err = UnknownToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resource::ALL
            .into_iter()
            .find(|resource| resource.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownToken(s.to_string()))
    }
}

use Action::{Create, Delete, Edit, View};

/// Actions an org admin may take per resource. Super admins may do
/// everything; `manage` is theirs alone.
const ORG_ADMIN_TABLE: &[(Resource, &[Action])] = &[
    (Resource::Organizations, &[View, Edit]),
    (Resource::Users, &[View, Create, Edit, Delete]),
    (Resource::Invitations, &[View, Create, Delete]),
    (Resource::Products, &[View, Create, Edit, Delete]),
    (Resource::Categories, &[View]),
    (Resource::Fields, &[View]),
    (Resource::Settings, &[View, Edit]),
];

const MEMBER_TABLE: &[(Resource, &[Action])] = &[
    (Resource::Organizations, &[View]),
    (Resource::Users, &[View]),
    (Resource::Products, &[View]),
    (Resource::Categories, &[View]),
    (Resource::Fields, &[View]),
];

fn lookup(table: &[(Resource, &[Action])], action: Action, resource: Resource) -> bool {
    table
        .iter()
        .any(|(entry, actions)| *entry == resource && actions.contains(&action))
}

pub fn has_permission(role: Role, action: Action, resource: Resource) -> bool {
    match role {
        Role::SuperAdmin => true,
        Role::OrgAdmin => lookup(ORG_ADMIN_TABLE, action, resource),
        Role::Member => lookup(MEMBER_TABLE, action, resource),
    }
}

/// String form for guards holding raw token claims. Any unknown role,
/// action or resource is denied.
pub fn has_permission_str(role: &str, action: &str, resource: &str) -> bool {
    match (role.parse(), action.parse(), resource.parse()) {
        (Ok(role), Ok(action), Ok(resource)) => has_permission(role, action, resource),
        _ => false,
    }
}

/// Guard form: `Ok(())` when allowed, a uniform access-denied error otherwise.
pub fn authorize(role: Role, action: Action, resource: Resource) -> Result<(), CatalogError> {
    if has_permission(role, action, resource) {
        Ok(())
    } else {
        Err(CatalogError::AccessDenied {
            role: role.to_string(),
            action: action.to_string(),
            resource: resource.to_string(),
        })
    }
}

pub fn allowed_actions(role: Role, resource: Resource) -> Vec<Action> {
    Action::ALL
        .into_iter()
        .filter(|action| has_permission(role, *action, resource))
        .collect()
}
