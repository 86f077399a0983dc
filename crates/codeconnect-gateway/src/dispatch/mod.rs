//! Route dispatch.
//!
//! A fixed prefix table maps each path to a built-in health responder or a
//! registered handler group. Unmatched paths fall through to the static
//! client bundle (production only) or a 404.

pub mod dispatcher;
pub mod table;

pub use dispatcher::{dispatch, Dispatcher, HandlerGroup};
pub use table::{RouteKind, RouteTable};
