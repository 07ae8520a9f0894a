//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{Value, json};

use taskdesk_persistence::backends::memory::{MemoryRoleStore, MemoryTable};
use taskdesk_persistence::tenant::{
    AccessScopeResolver, GroupId, Permission, Resource, Right, Role, RoleType, UserId,
};
use taskdesk_persistence::types::{FieldType, Schema};

/// The task schema used across the tests.
pub fn task_schema() -> Schema {
    Schema::new()
        .field("title", FieldType::String)
        .field("age", FieldType::Int)
        .field("score", FieldType::Float)
        .field("done", FieldType::Bool)
        .field("group_id", FieldType::String)
        .field("valid_until", FieldType::optional(FieldType::DateTime))
}

/// Task rows spread over three groups.
pub fn task_rows() -> Vec<Value> {
    vec![
        json!({"id": 1, "title": "Quarterly report", "age": 30, "done": false, "group_id": "acme", "valid_until": "2023-05-01T00:00:00+00:00"}),
        json!({"id": 2, "title": "Release notes", "age": 17, "done": true, "group_id": "acme", "valid_until": null}),
        json!({"id": 3, "title": "Quarterly budget", "age": 45, "done": false, "group_id": "globex", "valid_until": "2023-04-01T00:00:00+00:00"}),
        json!({"id": 4, "title": "Onboarding", "age": 22, "done": false, "group_id": "initech", "valid_until": null}),
    ]
}

/// A table holding [`task_rows`].
pub fn task_table() -> MemoryTable {
    MemoryTable::with_rows("task", task_rows())
}

/// The users, groups and role types of the access scenarios.
pub struct World {
    pub store: Arc<MemoryRoleStore>,
    pub acme: GroupId,
    pub globex: GroupId,
    pub initech: GroupId,
    pub alice: UserId,
    pub bob: UserId,
    pub carol: UserId,
    pub nobody: UserId,
}

impl World {
    /// Builds the scenario:
    ///
    /// - alice reads tasks in acme and globex
    /// - bob holds a global auditor role (registered in initech) that reads every group's tasks
    /// - carol is a member of initech without any task right
    /// - nobody holds no role
    pub fn new() -> Self {
        let store = Arc::new(MemoryRoleStore::new());
        let acme = GroupId::new("acme");
        let globex = GroupId::new("globex");
        let initech = GroupId::new("initech");

        let reader = RoleType::scoped("reader", acme.clone());
        let editor = RoleType::scoped("editor", globex.clone());
        let visitor = RoleType::scoped("visitor", initech.clone());
        let auditor = RoleType::global("auditor");

        store
            .add_right(Right::new(reader.id.clone(), Resource::Task, Permission::READ))
            .unwrap();
        store
            .add_right(Right::new(
                editor.id.clone(),
                Resource::Task,
                Permission::READ | Permission::UPDATE,
            ))
            .unwrap();
        store
            .add_right(Right::new(visitor.id.clone(), Resource::Tag, Permission::READ))
            .unwrap();
        store
            .add_right(Right::new(auditor.id.clone(), Resource::Task, Permission::READ))
            .unwrap();

        let alice = UserId::new("alice");
        let bob = UserId::new("bob");
        let carol = UserId::new("carol");
        store
            .add_role(Role::new(alice.clone(), acme.clone(), reader.id.clone()))
            .unwrap();
        store
            .add_role(Role::new(alice.clone(), globex.clone(), editor.id.clone()))
            .unwrap();
        store
            .add_role(Role::new(bob.clone(), initech.clone(), auditor.id.clone()))
            .unwrap();
        store
            .add_role(Role::new(carol.clone(), initech.clone(), visitor.id.clone()))
            .unwrap();

        for role_type in [reader, editor, visitor, auditor] {
            store.add_role_type(role_type).unwrap();
        }

        Self {
            store,
            acme,
            globex,
            initech,
            alice,
            bob,
            carol,
            nobody: UserId::new("nobody"),
        }
    }

    /// A resolver over the scenario store.
    pub fn resolver(&self) -> AccessScopeResolver<MemoryRoleStore> {
        AccessScopeResolver::new(Arc::clone(&self.store))
    }
}
