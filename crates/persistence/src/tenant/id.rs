//! Identifier types for the access model.
//!
//! Every entity of the role graph is keyed by an opaque string identifier.
//! Each gets its own newtype so a [`GroupId`] can never be passed where a
//! [`UserId`] is expected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an identifier from the given string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Creates a random (UUID v4) identifier.
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self::new(s))
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::new(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(
    /// Identifies a user. Authentication is out of scope; the id is trusted.
    UserId
);

define_id!(
    /// Identifies a group, the tenancy boundary.
    ///
    /// # Examples
    ///
    /// ```
    /// use taskdesk_persistence::tenant::GroupId;
    ///
    /// let group = GroupId::new("acme");
    /// assert_eq!(group.as_str(), "acme");
    /// assert_eq!(format!("{:?}", group), "GroupId(acme)");
    /// ```
    GroupId
);

define_id!(
    /// Identifies a role type.
    RoleTypeId
);

define_id!(
    /// Identifies a role assignment.
    RoleId
);

define_id!(
    /// Identifies a right.
    RightId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_unique() {
        assert_ne!(UserId::generate(), UserId::generate());
        assert_eq!(RoleId::generate().as_str().len(), 36);
    }

    #[test]
    fn test_serde_transparent() {
        let id = GroupId::new("g-1");
        assert_eq!(serde_json::to_value(&id).unwrap(), serde_json::json!("g-1"));
        let back: GroupId = serde_json::from_str("\"g-1\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_ordering() {
        let mut ids = vec![GroupId::new("b"), GroupId::new("a")];
        ids.sort();
        assert_eq!(ids, vec![GroupId::new("a"), GroupId::new("b")]);
        assert_eq!("x".parse::<RightId>().unwrap().to_string(), "x");
    }
}
