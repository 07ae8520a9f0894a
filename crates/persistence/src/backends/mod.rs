//! Storage backend implementations.
//!
//! Each backend implements the traits in [`crate::core`] and is gated behind a
//! feature flag.
//!
//! # Available Backends
//!
//! | Backend | Feature | Description |
//! |---------|---------|-------------|
//! | Memory | `memory` | In-process role store and plan executor, used by tests and the CLI |

#[cfg(feature = "memory")]
pub mod memory;
