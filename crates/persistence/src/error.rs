//! Error types for the persistence layer.
//!
//! This module defines all error types used throughout the crate, following a
//! hierarchy that separates filter errors, access errors, validation errors
//! and backend errors.
//!
//! Malformed query keys are never errors: the filter parser drops them. The
//! only errors a caller has to translate into a user-facing response are
//! [`FilterError::ValueCoercion`] and [`AccessError::PermissionDenied`].

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

use crate::tenant::{GroupId, Permission, Resource, UserId};
use crate::types::{FieldType, Operation};

/// The primary error type for all persistence operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Query filter errors
    #[error(transparent)]
    Filter(#[from] FilterError),

    /// Authorization errors
    #[error(transparent)]
    Access(#[from] AccessError),

    /// Validation errors
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Backend-specific errors
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl StorageError {
    /// Returns `true` if this error is a permission denial.
    pub fn is_permission_denied(&self) -> bool {
        matches!(
            self,
            StorageError::Access(AccessError::PermissionDenied { .. })
        )
    }
}

/// Errors raised while turning a query string into filters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    /// A value could not be coerced to the schema type of a required field.
    #[error("cannot coerce value '{value}' of {field}_{operation} to {expected}")]
    ValueCoercion {
        field: String,
        operation: Operation,
        value: String,
        expected: FieldType,
    },
}

/// Errors raised by authorization checks.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AccessError {
    /// The user holds no role granting the permission on the resource in the group.
    #[error("permission denied: user {user_id} lacks {permission} on {resource} in group {group_id}")]
    PermissionDenied {
        user_id: UserId,
        group_id: GroupId,
        resource: Resource,
        permission: Permission,
    },
}

/// Errors related to input validation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A uniqueness invariant of the role graph would be violated.
    #[error("unique constraint violated on {constraint}: {key}")]
    UniqueViolation { constraint: String, key: String },

    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A text form (field type, permission, resource, operation) is malformed.
    #[error("invalid {kind}: '{value}'")]
    InvalidText { kind: String, value: String },

    /// Configuration values are inconsistent.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// Errors originating from a storage backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The plan uses a feature this backend cannot execute.
    #[error("capability '{capability}' not supported by {backend_name}")]
    UnsupportedCapability {
        backend_name: String,
        capability: String,
    },

    /// Serialization/deserialization error.
    #[error("serialization error: {message}")]
    SerializationError { message: String },
}

/// Result type alias for persistence operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type alias for filter parsing.
pub type FilterResult<T> = Result<T, FilterError>;

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Backend(BackendError::SerializationError {
            message: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_error_display() {
        let err = FilterError::ValueCoercion {
            field: "age".to_string(),
            operation: Operation::Eq,
            value: "abc".to_string(),
            expected: FieldType::Int,
        };
        assert_eq!(err.to_string(), "cannot coerce value 'abc' of age_eq to int");
    }

    #[test]
    fn test_access_error_display() {
        let err = AccessError::PermissionDenied {
            user_id: UserId::new("u-1"),
            group_id: GroupId::new("g-1"),
            resource: Resource::Task,
            permission: Permission::DELETE,
        };
        let message = err.to_string();
        assert!(message.contains("permission denied"));
        assert!(message.contains("delete"));
        assert!(message.contains("Task"));
    }

    #[test]
    fn test_storage_error_from_access() {
        let err: StorageError = AccessError::PermissionDenied {
            user_id: UserId::new("u-1"),
            group_id: GroupId::new("g-1"),
            resource: Resource::Tag,
            permission: Permission::READ,
        }
        .into();
        assert!(err.is_permission_denied());

        let err: StorageError = ValidationError::NotFound {
            entity: "Role".to_string(),
            id: "r-1".to_string(),
        }
        .into();
        assert!(!err.is_permission_denied());
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::UniqueViolation {
            constraint: "role(user_id, group_id)".to_string(),
            key: "u-1/g-1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unique constraint violated on role(user_id, group_id): u-1/g-1"
        );
    }
}
