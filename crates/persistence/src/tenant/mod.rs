//! Tenant access model.
//!
//! Groups are the tenancy boundary. A user reaches a group through a
//! [`Role`], whose [`RoleType`] carries [`Right`]s: one [`Permission`] set per
//! [`Resource`].
//!
//! # Core Types
//!
//! - [`Permission`] - Wire-stable permission bits
//! - [`Resource`] - The domain nouns rights target
//! - [`Group`], [`RoleType`], [`Role`], [`Right`] - The persistent entities
//! - [`RoleGraph`] - A pure in-memory snapshot with the access rules
//! - [`AccessScope`] - The set of groups reachable for one question
//! - [`AccessScopeResolver`] - Loads snapshots from a [`RoleStore`](crate::core::RoleStore)
//!
//! # Access Rules
//!
//! `can(permission, user, group, resource)` holds when the user has a role in
//! `group` whose role type has a right on `resource` sharing at least one bit
//! with `permission`. A role type without a group is global: a matching right
//! on it grants access in every group.
//!
//! `tenants_with_access(permission, user, resource)` is the set of groups of
//! the user's matching roles. Global role types do not widen it.
//!
//! # Examples
//!
//! ```
//! use taskdesk_persistence::tenant::{
//!     GroupId, Permission, Resource, Right, Role, RoleGraph, RoleType, UserId,
//! };
//!
//! let acme = GroupId::new("acme");
//! let admin = RoleType::global("admin");
//! let root = UserId::new("root");
//!
//! let graph = RoleGraph::from_parts(
//!     [],
//!     [admin.clone()],
//!     [Role::new(root.clone(), acme.clone(), admin.id.clone())],
//!     [Right::new(admin.id.clone(), Resource::Group, Permission::all())],
//! )
//! .unwrap();
//!
//! assert!(graph.can(Permission::DELETE, &root, &GroupId::new("other"), Resource::Group));
//! assert_eq!(
//!     graph.tenants_with_access(Permission::DELETE, &root, Resource::Group).len(),
//!     1
//! );
//! ```

mod graph;
mod id;
mod model;
mod permissions;
mod resolver;
mod scope;

pub use graph::{RoleGraph, RoleGraphData};
pub use id::{GroupId, RightId, RoleId, RoleTypeId, UserId};
pub use model::{Group, Right, Role, RoleType};
pub use permissions::{Permission, Resource};
pub use resolver::AccessScopeResolver;
pub use scope::AccessScope;
