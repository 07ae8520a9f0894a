//! Role graph storage trait.
//!
//! The access resolver never holds the whole role graph. It asks a
//! [`RoleStore`] for the slice that concerns one user and one resource.

use async_trait::async_trait;

use crate::error::StorageResult;
use crate::tenant::{Resource, Right, Role, RoleType, RoleTypeId, UserId};

/// Read access to roles, role types and rights.
///
/// Implementations own their synchronization and caching; the resolver calls
/// the store once per check and keeps nothing between calls.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use taskdesk_persistence::core::RoleStore;
/// use taskdesk_persistence::error::StorageResult;
/// use taskdesk_persistence::tenant::{Resource, Right, Role, RoleType, RoleTypeId, UserId};
///
/// struct SqlRoleStore { /* connection pool */ }
///
/// #[async_trait]
/// impl RoleStore for SqlRoleStore {
///     fn backend_name(&self) -> &'static str {
///         "sql"
///     }
///
///     async fn roles_for_user(&self, user: &UserId) -> StorageResult<Vec<Role>> {
///         // SELECT * FROM role WHERE user_id = ?
///         todo!()
///     }
///
///     // ... role_types and rights_for
/// }
/// ```
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Returns a short name for logs and errors.
    fn backend_name(&self) -> &'static str;

    /// Returns every role held by `user`.
    async fn roles_for_user(&self, user: &UserId) -> StorageResult<Vec<Role>>;

    /// Returns the role types with the given ids. Unknown ids are skipped.
    async fn role_types(&self, ids: &[RoleTypeId]) -> StorageResult<Vec<RoleType>>;

    /// Returns the rights of the given role types on `resource`.
    async fn rights_for(
        &self,
        role_type_ids: &[RoleTypeId],
        resource: Resource,
    ) -> StorageResult<Vec<Right>>;
}
