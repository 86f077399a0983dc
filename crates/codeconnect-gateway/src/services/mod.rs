//! Handler groups for the chat and session prefixes.
//!
//! Business logic lives in external services; the gateway either relays to a
//! configured upstream or reports the group as unavailable.

pub mod unavailable;
pub mod upstream;

pub use unavailable::UnavailableGroup;
pub use upstream::UpstreamGroup;
