//! Permission bits and the resource vocabulary.
//!
//! A [`Right`](super::Right) grants a [`Permission`] set on one [`Resource`]
//! to every holder of a role type.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

bitflags! {
    /// Actions a right can grant.
    ///
    /// The bit values are persisted as a single integer and must not change.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct Permission: u32 {
        /// Read or list.
        const READ = 1;
        /// Modify existing entities.
        const UPDATE = 2;
        /// Create new entities.
        const CREATE = 4;
        /// Remove entities.
        const DELETE = 8;
        /// Run domain actions.
        const EXECUTE = 16;
        /// Receive change notifications.
        const SUBSCRIBE = 32;
    }
}

impl Default for Permission {
    fn default() -> Self {
        Self::empty()
    }
}

impl Permission {
    /// Returns `true` if at least one bit of `requested` is granted.
    pub fn grants(&self, requested: Permission) -> bool {
        self.intersects(requested)
    }
}

// Persisted as the raw integer
impl Serialize for Permission {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Permission {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bits = u32::deserialize(deserializer)?;
        Self::from_bits(bits).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid Permission bits: {:#04x}", bits))
        })
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }
        let names: Vec<String> = self
            .iter_names()
            .map(|(name, _)| name.to_lowercase())
            .collect();
        write!(f, "{}", names.join("|"))
    }
}

impl FromStr for Permission {
    type Err = ValidationError;

    /// Parses `read|update` (also `,` or `+` separated), `none`, or the raw integer.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidText {
            kind: "permission".to_string(),
            value: s.to_string(),
        };

        let trimmed = s.trim();
        if let Ok(bits) = trimmed.parse::<u32>() {
            return Self::from_bits(bits).ok_or_else(invalid);
        }
        if trimmed.eq_ignore_ascii_case("none") {
            return Ok(Self::empty());
        }

        let mut permission = Self::empty();
        for name in trimmed.split(['|', ',', '+']).map(str::trim) {
            let flag = Self::from_name(&name.to_uppercase()).ok_or_else(invalid)?;
            permission |= flag;
        }
        Ok(permission)
    }
}

/// Domain nouns a right can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Resource {
    /// Tasks.
    Task,
    /// Tags.
    Tag,
    /// Groups.
    Group,
    /// Role assignments.
    Role,
    /// Role types.
    RoleType,
    /// Rights.
    Right,
    /// Users.
    User,
}

impl Resource {
    /// Every resource, in declaration order.
    pub const ALL: [Resource; 7] = [
        Resource::Task,
        Resource::Tag,
        Resource::Group,
        Resource::Role,
        Resource::RoleType,
        Resource::Right,
        Resource::User,
    ];

    /// Returns the PascalCase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Task => "Task",
            Resource::Tag => "Tag",
            Resource::Group => "Group",
            Resource::Role => "Role",
            Resource::RoleType => "RoleType",
            Resource::Right => "Right",
            Resource::User => "User",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect();
        Self::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| ValidationError::InvalidText {
                kind: "resource".to_string(),
                value: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_bits() {
        assert_eq!(Permission::READ.bits(), 1);
        assert_eq!(Permission::UPDATE.bits(), 2);
        assert_eq!(Permission::CREATE.bits(), 4);
        assert_eq!(Permission::DELETE.bits(), 8);
        assert_eq!(Permission::EXECUTE.bits(), 16);
        assert_eq!(Permission::SUBSCRIBE.bits(), 32);
    }

    #[test]
    fn test_grants_intersects() {
        let granted = Permission::READ | Permission::UPDATE;
        assert!(granted.grants(Permission::READ));
        assert!(granted.grants(Permission::READ | Permission::DELETE));
        assert!(!granted.grants(Permission::DELETE));
        assert!(!granted.grants(Permission::empty()));
    }

    #[test]
    fn test_permission_text_forms() {
        let p = Permission::READ | Permission::DELETE;
        assert_eq!(p.to_string(), "read|delete");
        assert_eq!("read|delete".parse::<Permission>().unwrap(), p);
        assert_eq!("Read, Delete".parse::<Permission>().unwrap(), p);
        assert_eq!("9".parse::<Permission>().unwrap(), p);
        assert_eq!("none".parse::<Permission>().unwrap(), Permission::empty());
        assert_eq!(Permission::empty().to_string(), "none");
        assert!("read|fly".parse::<Permission>().is_err());
        assert!("64".parse::<Permission>().is_err());
    }

    #[test]
    fn test_permission_serde_as_integer() {
        let p = Permission::READ | Permission::SUBSCRIBE;
        assert_eq!(serde_json::to_value(p).unwrap(), serde_json::json!(33));
        let back: Permission = serde_json::from_str("33").unwrap();
        assert_eq!(back, p);
        assert!(serde_json::from_str::<Permission>("128").is_err());
    }

    #[test]
    fn test_resource_parse() {
        assert_eq!("task".parse::<Resource>().unwrap(), Resource::Task);
        assert_eq!("role_type".parse::<Resource>().unwrap(), Resource::RoleType);
        assert_eq!("RoleType".parse::<Resource>().unwrap(), Resource::RoleType);
        assert!("project".parse::<Resource>().is_err());
        assert_eq!(Resource::Right.to_string(), "Right");
    }
}
