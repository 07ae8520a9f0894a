//! Access resolution against a [`RoleStore`].

use std::collections::BTreeSet;
use std::sync::Arc;

use super::graph::RoleGraph;
use super::id::{GroupId, RoleTypeId, UserId};
use super::permissions::{Permission, Resource};
use super::scope::AccessScope;
use crate::core::RoleStore;
use crate::error::{AccessError, StorageResult};

/// Answers access questions for a `(user, permission, resource)` triple.
///
/// Each call loads a fresh snapshot of the user's roles, their role types and
/// the rights on the resource, then evaluates it with [`RoleGraph`]. Nothing
/// is cached between calls.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use taskdesk_persistence::backends::memory::MemoryRoleStore;
/// use taskdesk_persistence::tenant::{
///     AccessScopeResolver, GroupId, Permission, Resource, Right, Role, RoleType, UserId,
/// };
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let store = Arc::new(MemoryRoleStore::new());
/// let group = GroupId::new("acme");
/// let reader = RoleType::scoped("reader", group.clone());
/// store.add_right(Right::new(reader.id.clone(), Resource::Task, Permission::READ)).unwrap();
/// store.add_role(Role::new(UserId::new("alice"), group.clone(), reader.id.clone())).unwrap();
/// store.add_role_type(reader).unwrap();
///
/// let resolver = AccessScopeResolver::new(store);
/// let alice = UserId::new("alice");
/// assert!(resolver.can(Permission::READ, &alice, &group, Resource::Task).await.unwrap());
///
/// let scope = resolver
///     .all_tenants_with_access(Permission::READ, &alice, Resource::Task)
///     .await
///     .unwrap();
/// assert!(scope.contains(&group));
/// # }
/// ```
#[derive(Debug)]
pub struct AccessScopeResolver<S: RoleStore + ?Sized> {
    store: Arc<S>,
}

impl<S: RoleStore + ?Sized> Clone for AccessScopeResolver<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: RoleStore + ?Sized> AccessScopeResolver<S> {
    /// Creates a resolver over the given store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Loads the part of the role graph that concerns `user` and `resource`.
    ///
    /// Rows breaking a uniqueness invariant are skipped with a warning; the
    /// first one read wins.
    pub async fn snapshot(&self, user: &UserId, resource: Resource) -> StorageResult<RoleGraph> {
        let roles = self.store.roles_for_user(user).await?;
        let role_type_ids: Vec<RoleTypeId> = roles
            .iter()
            .map(|role| role.role_type_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut graph = RoleGraph::new();
        if role_type_ids.is_empty() {
            return Ok(graph);
        }

        let role_types = self.store.role_types(&role_type_ids).await?;
        let rights = self.store.rights_for(&role_type_ids, resource).await?;

        for role_type in role_types {
            if let Err(e) = graph.insert_role_type(role_type) {
                tracing::warn!("Skipping role type from {}: {}", self.store.backend_name(), e);
            }
        }
        for role in roles {
            if let Err(e) = graph.insert_role(role) {
                tracing::warn!("Skipping role from {}: {}", self.store.backend_name(), e);
            }
        }
        for right in rights {
            if let Err(e) = graph.insert_right(right) {
                tracing::warn!("Skipping right from {}: {}", self.store.backend_name(), e);
            }
        }
        Ok(graph)
    }

    /// Returns whether `user` may exercise `permission` on `resource` in `group`.
    pub async fn can(
        &self,
        permission: Permission,
        user: &UserId,
        group: &GroupId,
        resource: Resource,
    ) -> StorageResult<bool> {
        let graph = self.snapshot(user, resource).await?;
        Ok(graph.can(permission, user, group, resource))
    }

    /// Like [`can`](Self::can), but fails with
    /// [`AccessError::PermissionDenied`] instead of returning `false`.
    pub async fn require(
        &self,
        permission: Permission,
        user: &UserId,
        group: &GroupId,
        resource: Resource,
    ) -> StorageResult<()> {
        if self.can(permission, user, group, resource).await? {
            return Ok(());
        }

        tracing::debug!(
            "Denied {} on {} in group {} for user {}",
            permission,
            resource,
            group,
            user
        );
        Err(AccessError::PermissionDenied {
            user_id: user.clone(),
            group_id: group.clone(),
            resource,
            permission,
        }
        .into())
    }

    /// Returns every group in which `user` holds a role whose role type has a
    /// right on `resource` intersecting `permission`.
    pub async fn all_tenants_with_access(
        &self,
        permission: Permission,
        user: &UserId,
        resource: Resource,
    ) -> StorageResult<AccessScope> {
        let graph = self.snapshot(user, resource).await?;
        let scope = graph.tenants_with_access(permission, user, resource);
        tracing::debug!(
            "User {} reaches {} group(s) for {} on {}",
            user,
            scope.len(),
            permission,
            resource
        );
        Ok(scope)
    }
}
