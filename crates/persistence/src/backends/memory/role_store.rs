//! In-memory [`RoleStore`].

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::core::RoleStore;
use crate::error::{StorageResult, ValidationError};
use crate::tenant::{
    Group, Resource, Right, Role, RoleGraph, RoleId, RoleType, RoleTypeId, UserId,
};

/// A role store backed by a locked [`RoleGraph`].
///
/// Writes go through the graph's insert methods, so the uniqueness
/// invariants hold for everything the store returns.
#[derive(Debug, Default)]
pub struct MemoryRoleStore {
    graph: RwLock<RoleGraph>,
}

impl MemoryRoleStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with `graph`.
    pub fn from_graph(graph: RoleGraph) -> Self {
        Self {
            graph: RwLock::new(graph),
        }
    }

    /// Adds a group.
    pub fn add_group(&self, group: Group) -> Result<(), ValidationError> {
        self.graph.write().insert_group(group)
    }

    /// Adds a role type.
    pub fn add_role_type(&self, role_type: RoleType) -> Result<(), ValidationError> {
        self.graph.write().insert_role_type(role_type)
    }

    /// Adds a role; fails if the user already holds a role in the group.
    pub fn add_role(&self, role: Role) -> Result<(), ValidationError> {
        self.graph.write().insert_role(role)
    }

    /// Adds a right; fails if the role type already has one on the resource.
    pub fn add_right(&self, right: Right) -> Result<(), ValidationError> {
        self.graph.write().insert_right(right)
    }

    /// Removes a role, returning it if it existed.
    pub fn remove_role(&self, id: &RoleId) -> Option<Role> {
        self.graph.write().remove_role(id)
    }

    /// Returns a copy of the whole graph.
    pub fn snapshot(&self) -> RoleGraph {
        self.graph.read().clone()
    }
}

#[async_trait]
impl RoleStore for MemoryRoleStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn roles_for_user(&self, user: &UserId) -> StorageResult<Vec<Role>> {
        Ok(self.graph.read().roles_for_user(user).cloned().collect())
    }

    async fn role_types(&self, ids: &[RoleTypeId]) -> StorageResult<Vec<RoleType>> {
        let graph = self.graph.read();
        Ok(ids
            .iter()
            .filter_map(|id| graph.role_type(id))
            .cloned()
            .collect())
    }

    async fn rights_for(
        &self,
        role_type_ids: &[RoleTypeId],
        resource: Resource,
    ) -> StorageResult<Vec<Right>> {
        let graph = self.graph.read();
        Ok(role_type_ids
            .iter()
            .filter_map(|id| graph.right(id, resource))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tenant::{GroupId, Permission};

    #[tokio::test]
    async fn test_store_returns_user_slice() {
        let store = MemoryRoleStore::new();
        let g1 = GroupId::new("g-1");
        let member = RoleType::scoped("member", g1.clone());
        store.add_role_type(member.clone()).unwrap();
        store
            .add_right(Right::new(member.id.clone(), Resource::Task, Permission::READ))
            .unwrap();
        store
            .add_role(Role::new(UserId::new("alice"), g1.clone(), member.id.clone()))
            .unwrap();
        store
            .add_role(Role::new(UserId::new("bob"), g1, member.id.clone()))
            .unwrap();

        let roles = store.roles_for_user(&UserId::new("alice")).await.unwrap();
        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].user_id, UserId::new("alice"));

        let ids = vec![member.id.clone(), RoleTypeId::new("missing")];
        assert_eq!(store.role_types(&ids).await.unwrap().len(), 1);
        assert_eq!(store.rights_for(&ids, Resource::Task).await.unwrap().len(), 1);
        assert!(store.rights_for(&ids, Resource::Tag).await.unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_role_rejected() {
        let store = MemoryRoleStore::new();
        let group = GroupId::new("g-1");
        let member = RoleTypeId::new("member");
        let user = UserId::new("alice");
        store
            .add_role(Role::new(user.clone(), group.clone(), member.clone()))
            .unwrap();
        let err = store.add_role(Role::new(user, group, member)).unwrap_err();
        assert!(matches!(err, ValidationError::UniqueViolation { .. }));
    }

    #[test]
    fn test_remove_role() {
        let store = MemoryRoleStore::new();
        let role = Role::new(UserId::new("alice"), GroupId::new("g-1"), RoleTypeId::new("m"));
        let id = role.id.clone();
        store.add_role(role).unwrap();
        assert!(store.remove_role(&id).is_some());
        assert!(store.remove_role(&id).is_none());
        assert_eq!(store.snapshot().roles().count(), 0);
    }
}
