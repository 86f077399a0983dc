//! Per-request context handed to handler groups.

pub mod request;

pub use request::RequestContext;
