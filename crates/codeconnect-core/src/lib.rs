//! codeconnect core: transport-agnostic primitives shared by the gateway and
//! its collaborators.
//!
//! This crate defines the error surface, identity types, environment mode and
//! event function descriptors. It carries no transport or runtime
//! dependencies so collaborators (identity providers, storage, event runtimes)
//! can depend on it without pulling in the HTTP stack.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. All fallible paths
//! surface as `GatewayError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod env;
pub mod error;
pub mod events;
pub mod identity;

/// Shared result type.
pub use error::{GatewayError, Result};
