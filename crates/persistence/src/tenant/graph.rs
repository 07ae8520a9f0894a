//! In-memory role graph and the access rules evaluated over it.
//!
//! A [`RoleGraph`] holds groups, role types, roles and rights and enforces the
//! two uniqueness invariants of the model: one role per `(user, group)` and
//! one right per `(role type, resource)`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::id::{GroupId, RoleId, RoleTypeId, UserId};
use super::model::{Group, Right, Role, RoleType};
use super::permissions::{Permission, Resource};
use super::scope::AccessScope;
use crate::error::ValidationError;

const ROLE_CONSTRAINT: &str = "role(user_id, group_id)";
const RIGHT_CONSTRAINT: &str = "right(role_type_id, resource)";

/// A snapshot of the role/right graph.
///
/// Serializes as `{groups, role_types, roles, rights}` lists; deserializing
/// re-checks the uniqueness invariants.
///
/// # Examples
///
/// ```
/// use taskdesk_persistence::tenant::{
///     GroupId, Permission, Resource, Right, Role, RoleGraph, RoleType, UserId,
/// };
///
/// let group = GroupId::new("acme");
/// let member = RoleType::scoped("member", group.clone());
/// let mut graph = RoleGraph::new();
/// graph.insert_right(Right::new(member.id.clone(), Resource::Task, Permission::READ)).unwrap();
/// graph.insert_role(Role::new(UserId::new("alice"), group.clone(), member.id.clone())).unwrap();
/// graph.insert_role_type(member).unwrap();
///
/// assert!(graph.can(Permission::READ, &UserId::new("alice"), &group, Resource::Task));
/// assert!(!graph.can(Permission::DELETE, &UserId::new("alice"), &group, Resource::Task));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RoleGraphData", into = "RoleGraphData")]
pub struct RoleGraph {
    groups: BTreeMap<GroupId, Group>,
    role_types: BTreeMap<RoleTypeId, RoleType>,
    roles: BTreeMap<(UserId, GroupId), Role>,
    rights: BTreeMap<(RoleTypeId, Resource), Right>,
}

/// Serialized form of a [`RoleGraph`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleGraphData {
    /// Groups.
    #[serde(default)]
    pub groups: Vec<Group>,
    /// Role types.
    #[serde(default)]
    pub role_types: Vec<RoleType>,
    /// Role assignments.
    #[serde(default)]
    pub roles: Vec<Role>,
    /// Rights.
    #[serde(default)]
    pub rights: Vec<Right>,
}

impl RoleGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from its parts, checking the uniqueness invariants.
    pub fn from_parts(
        groups: impl IntoIterator<Item = Group>,
        role_types: impl IntoIterator<Item = RoleType>,
        roles: impl IntoIterator<Item = Role>,
        rights: impl IntoIterator<Item = Right>,
    ) -> Result<Self, ValidationError> {
        let mut graph = Self::new();
        for group in groups {
            graph.insert_group(group)?;
        }
        for role_type in role_types {
            graph.insert_role_type(role_type)?;
        }
        for role in roles {
            graph.insert_role(role)?;
        }
        for right in rights {
            graph.insert_right(right)?;
        }
        Ok(graph)
    }

    /// Adds a group.
    pub fn insert_group(&mut self, group: Group) -> Result<(), ValidationError> {
        if self.groups.contains_key(&group.id) {
            return Err(ValidationError::UniqueViolation {
                constraint: "group(id)".to_string(),
                key: group.id.to_string(),
            });
        }
        self.groups.insert(group.id.clone(), group);
        Ok(())
    }

    /// Adds a role type.
    pub fn insert_role_type(&mut self, role_type: RoleType) -> Result<(), ValidationError> {
        if self.role_types.contains_key(&role_type.id) {
            return Err(ValidationError::UniqueViolation {
                constraint: "role_type(id)".to_string(),
                key: role_type.id.to_string(),
            });
        }
        self.role_types.insert(role_type.id.clone(), role_type);
        Ok(())
    }

    /// Adds a role. Fails if the user already holds a role in the group.
    pub fn insert_role(&mut self, role: Role) -> Result<(), ValidationError> {
        let key = (role.user_id.clone(), role.group_id.clone());
        if self.roles.contains_key(&key) {
            return Err(ValidationError::UniqueViolation {
                constraint: ROLE_CONSTRAINT.to_string(),
                key: format!("{}/{}", role.user_id, role.group_id),
            });
        }
        self.roles.insert(key, role);
        Ok(())
    }

    /// Adds a right. Fails if the role type already has a right on the resource.
    pub fn insert_right(&mut self, right: Right) -> Result<(), ValidationError> {
        let key = (right.role_type_id.clone(), right.resource);
        if self.rights.contains_key(&key) {
            return Err(ValidationError::UniqueViolation {
                constraint: RIGHT_CONSTRAINT.to_string(),
                key: format!("{}/{}", right.role_type_id, right.resource),
            });
        }
        self.rights.insert(key, right);
        Ok(())
    }

    /// Removes a role by id.
    pub fn remove_role(&mut self, id: &RoleId) -> Option<Role> {
        let key = self
            .roles
            .iter()
            .find(|(_, role)| &role.id == id)
            .map(|(key, _)| key.clone())?;
        self.roles.remove(&key)
    }

    /// Looks up a group.
    pub fn group(&self, id: &GroupId) -> Option<&Group> {
        self.groups.get(id)
    }

    /// Looks up a role type.
    pub fn role_type(&self, id: &RoleTypeId) -> Option<&RoleType> {
        self.role_types.get(id)
    }

    /// Looks up the right of a role type on a resource.
    pub fn right(&self, role_type_id: &RoleTypeId, resource: Resource) -> Option<&Right> {
        self.rights.get(&(role_type_id.clone(), resource))
    }

    /// Iterates over the roles held by `user`, ordered by group.
    pub fn roles_for_user<'a>(&'a self, user: &'a UserId) -> impl Iterator<Item = &'a Role> + 'a {
        self.roles
            .range((user.clone(), GroupId::new(String::new()))..)
            .take_while(move |((holder, _), _)| holder == user)
            .map(|(_, role)| role)
    }

    /// Iterates over all roles.
    pub fn roles(&self) -> impl Iterator<Item = &Role> {
        self.roles.values()
    }

    fn role_grants(&self, role: &Role, permission: Permission, resource: Resource) -> bool {
        self.right(&role.role_type_id, resource)
            .is_some_and(|right| right.permissions.grants(permission))
    }

    /// Returns `true` if `user` may exercise `permission` on `resource` in `group`.
    ///
    /// Granted by a role in `group` whose role type has a matching right, or by
    /// a role in any group whose role type is global and has a matching right.
    pub fn can(
        &self,
        permission: Permission,
        user: &UserId,
        group: &GroupId,
        resource: Resource,
    ) -> bool {
        self.roles_for_user(user).any(|role| {
            if !self.role_grants(role, permission, resource) {
                return false;
            }
            &role.group_id == group
                || self
                    .role_type(&role.role_type_id)
                    .is_some_and(RoleType::is_global)
        })
    }

    /// Returns the groups of every role of `user` whose role type has a right
    /// on `resource` intersecting `permission`.
    ///
    /// Global role types grant access in the group of the role itself; they do
    /// not expand the set to other groups.
    pub fn tenants_with_access(
        &self,
        permission: Permission,
        user: &UserId,
        resource: Resource,
    ) -> AccessScope {
        self.roles_for_user(user)
            .filter(|role| self.role_grants(role, permission, resource))
            .map(|role| role.group_id.clone())
            .collect()
    }
}

impl TryFrom<RoleGraphData> for RoleGraph {
    type Error = ValidationError;

    fn try_from(data: RoleGraphData) -> Result<Self, Self::Error> {
        Self::from_parts(data.groups, data.role_types, data.roles, data.rights)
    }
}

impl From<RoleGraph> for RoleGraphData {
    fn from(graph: RoleGraph) -> Self {
        Self {
            groups: graph.groups.into_values().collect(),
            role_types: graph.role_types.into_values().collect(),
            roles: graph.roles.into_values().collect(),
            rights: graph.rights.into_values().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        graph: RoleGraph,
        alice: UserId,
        acme: GroupId,
        globex: GroupId,
    }

    fn fixture() -> Fixture {
        let alice = UserId::new("alice");
        let acme = GroupId::new("acme");
        let globex = GroupId::new("globex");
        let reader = RoleType::scoped("reader", acme.clone());
        let editor = RoleType::scoped("editor", globex.clone());

        let graph = RoleGraph::from_parts(
            [
                Group {
                    id: acme.clone(),
                    name: "Acme".to_string(),
                },
                Group {
                    id: globex.clone(),
                    name: "Globex".to_string(),
                },
            ],
            [reader.clone(), editor.clone()],
            [
                Role::new(alice.clone(), acme.clone(), reader.id.clone()),
                Role::new(alice.clone(), globex.clone(), editor.id.clone()),
            ],
            [
                Right::new(reader.id.clone(), Resource::Task, Permission::READ),
                Right::new(
                    editor.id.clone(),
                    Resource::Task,
                    Permission::READ | Permission::UPDATE,
                ),
            ],
        )
        .unwrap();

        Fixture {
            graph,
            alice,
            acme,
            globex,
        }
    }

    #[test]
    fn test_can_per_group() {
        let f = fixture();
        assert!(f.graph.can(Permission::READ, &f.alice, &f.acme, Resource::Task));
        assert!(!f.graph.can(Permission::UPDATE, &f.alice, &f.acme, Resource::Task));
        assert!(f.graph.can(Permission::UPDATE, &f.alice, &f.globex, Resource::Task));
        assert!(!f.graph.can(Permission::READ, &f.alice, &f.acme, Resource::Tag));
        assert!(!f.graph.can(
            Permission::READ,
            &f.alice,
            &GroupId::new("initech"),
            Resource::Task
        ));
    }

    #[test]
    fn test_tenants_with_access() {
        let f = fixture();
        let read = f.graph.tenants_with_access(Permission::READ, &f.alice, Resource::Task);
        assert_eq!(read, [f.acme.clone(), f.globex.clone()].into_iter().collect::<AccessScope>());

        let update = f.graph.tenants_with_access(Permission::UPDATE, &f.alice, Resource::Task);
        assert_eq!(update, [f.globex.clone()].into_iter().collect::<AccessScope>());

        let nobody = f
            .graph
            .tenants_with_access(Permission::READ, &UserId::new("bob"), Resource::Task);
        assert!(nobody.is_empty());
    }

    #[test]
    fn test_global_role_type() {
        let mut f = fixture();
        let admin = RoleType::global("admin");
        let root = UserId::new("root");
        f.graph
            .insert_right(Right::new(admin.id.clone(), Resource::Group, Permission::all()))
            .unwrap();
        f.graph
            .insert_role(Role::new(root.clone(), f.acme.clone(), admin.id.clone()))
            .unwrap();
        f.graph.insert_role_type(admin).unwrap();

        assert!(f.graph.can(Permission::DELETE, &root, &f.globex, Resource::Group));
        assert!(f.graph.can(Permission::DELETE, &root, &GroupId::new("any"), Resource::Group));

        let scope = f.graph.tenants_with_access(Permission::DELETE, &root, Resource::Group);
        assert_eq!(scope, [f.acme.clone()].into_iter().collect::<AccessScope>());
    }

    #[test]
    fn test_uniqueness_invariants() {
        let mut f = fixture();
        let role_type = RoleTypeId::new("other");
        let err = f
            .graph
            .insert_role(Role::new(f.alice.clone(), f.acme.clone(), role_type.clone()))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "unique constraint violated on role(user_id, group_id): alice/acme"
        );

        f.graph
            .insert_right(Right::new(role_type.clone(), Resource::Tag, Permission::READ))
            .unwrap();
        assert!(matches!(
            f.graph
                .insert_right(Right::new(role_type, Resource::Tag, Permission::CREATE)),
            Err(ValidationError::UniqueViolation { .. })
        ));
    }

    #[test]
    fn test_remove_role_revokes_access() {
        let mut f = fixture();
        let role_id = f
            .graph
            .roles_for_user(&f.alice)
            .find(|role| role.group_id == f.acme)
            .map(|role| role.id.clone())
            .unwrap();
        assert!(f.graph.remove_role(&role_id).is_some());
        assert!(!f.graph.can(Permission::READ, &f.alice, &f.acme, Resource::Task));
    }

    #[test]
    fn test_serde_round_trip_rechecks_invariants() {
        let f = fixture();
        let json = serde_json::to_value(&f.graph).unwrap();
        let back: RoleGraph = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(back, f.graph);

        let mut data = json;
        let role = data["roles"][0].clone();
        data["roles"].as_array_mut().unwrap().push(role);
        assert!(serde_json::from_value::<RoleGraph>(data).is_err());
    }
}
