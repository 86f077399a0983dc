//! codeconnect gateway library entry.
//!
//! Composes the request pipeline (origin policy, body parsing, auth
//! attachment, dispatch), the event-function bridge and the startup
//! sequencer. Consumed by the binary (`main.rs`) and by integration tests.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod app_state;
pub mod auth;
pub mod bridge;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod ops;
pub mod pipeline;
pub mod policy;
pub mod relay;
pub mod router;
pub mod services;
pub mod startup;
pub mod storage;
