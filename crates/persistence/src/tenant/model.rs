//! Entities of the role graph.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{GroupId, RightId, RoleId, RoleTypeId, UserId};
use super::permissions::{Permission, Resource};

/// A group: the tenancy boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Group id.
    pub id: GroupId,
    /// Display name.
    pub name: String,
}

impl Group {
    /// Creates a group with a generated id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: GroupId::generate(),
            name: name.into(),
        }
    }
}

/// A named bundle of rights.
///
/// A role type scoped to a group (`group_id: Some`) only means something for
/// roles in that group. A global role type (`group_id: None`) carries its
/// rights into every group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleType {
    /// Role type id.
    pub id: RoleTypeId,
    /// Display name.
    pub name: String,
    /// Owning group, or `None` for a global role type.
    #[serde(default)]
    pub group_id: Option<GroupId>,
}

impl RoleType {
    /// Creates a group-scoped role type with a generated id.
    pub fn scoped(name: impl Into<String>, group_id: GroupId) -> Self {
        Self {
            id: RoleTypeId::generate(),
            name: name.into(),
            group_id: Some(group_id),
        }
    }

    /// Creates a global role type with a generated id.
    pub fn global(name: impl Into<String>) -> Self {
        Self {
            id: RoleTypeId::generate(),
            name: name.into(),
            group_id: None,
        }
    }

    /// Returns `true` if the role type is not bound to a group.
    pub fn is_global(&self) -> bool {
        self.group_id.is_none()
    }
}

/// Permissions a role type holds on one resource.
///
/// At most one right exists per `(role_type_id, resource)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Right {
    /// Right id.
    pub id: RightId,
    /// Role type holding the right.
    pub role_type_id: RoleTypeId,
    /// Target resource.
    pub resource: Resource,
    /// Granted permission bits.
    pub permissions: Permission,
    /// Creation time.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Right {
    /// Creates a right with a generated id, stamped now.
    pub fn new(role_type_id: RoleTypeId, resource: Resource, permissions: Permission) -> Self {
        Self {
            id: RightId::generate(),
            role_type_id,
            resource,
            permissions,
            created_at: Utc::now(),
        }
    }
}

/// A user's membership in a group under a role type.
///
/// At most one role exists per `(user_id, group_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Role id.
    pub id: RoleId,
    /// Member.
    pub user_id: UserId,
    /// Group the membership is in.
    pub group_id: GroupId,
    /// Role type granting the rights.
    pub role_type_id: RoleTypeId,
}

impl Role {
    /// Creates a role with a generated id.
    pub fn new(user_id: UserId, group_id: GroupId, role_type_id: RoleTypeId) -> Self {
        Self {
            id: RoleId::generate(),
            user_id,
            group_id,
            role_type_id,
        }
    }
}
