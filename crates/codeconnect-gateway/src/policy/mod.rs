//! Cross-origin access policy.
//!
//! Compiles the CORS configuration into one of two mutually exclusive
//! variants and exposes it both as a per-request decision (for logging and
//! request context) and as a `tower-http` `CorsLayer` (for headers and
//! preflights). Both read the same predicate.

pub mod origin;

pub use origin::{OriginDecision, OriginPolicy};
