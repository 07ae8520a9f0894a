use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::id::GroupId;

/// The set of groups a caller may touch for one `(permission, resource)`.
///
/// An empty scope means no access: restricting a plan to it matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessScope {
    groups: BTreeSet<GroupId>,
}

impl AccessScope {
    /// Creates an empty scope.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns `true` if the scope contains `group`.
    pub fn contains(&self, group: &GroupId) -> bool {
        self.groups.contains(group)
    }

    /// Returns `true` if no group is reachable.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of reachable groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Iterates over the reachable groups in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = &GroupId> {
        self.groups.iter()
    }

    /// Adds a group.
    pub fn insert(&mut self, group: GroupId) -> bool {
        self.groups.insert(group)
    }
}

impl FromIterator<GroupId> for AccessScope {
    fn from_iter<I: IntoIterator<Item = GroupId>>(iter: I) -> Self {
        Self {
            groups: iter.into_iter().collect(),
        }
    }
}

impl Extend<GroupId> for AccessScope {
    fn extend<I: IntoIterator<Item = GroupId>>(&mut self, iter: I) {
        self.groups.extend(iter);
    }
}

impl IntoIterator for AccessScope {
    type Item = GroupId;
    type IntoIter = std::collections::btree_set::IntoIter<GroupId>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}

impl fmt::Display for AccessScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<&str> = self.groups.iter().map(GroupId::as_str).collect();
        write!(f, "{{{}}}", ids.join(", "))
    }
}
