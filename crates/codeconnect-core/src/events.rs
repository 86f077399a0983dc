//! Registered event function descriptors.
//!
//! The gateway never executes these; it forwards the table to the event
//! runtime alongside each relayed invocation.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{GatewayError, Result};

/// What fires a function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Trigger {
    pub event: String,
}

/// One background function known to the event runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FunctionDescriptor {
    /// Stable function id.
    pub name: String,
    pub trigger: Trigger,
    /// Opaque reference the runtime uses to locate the handler.
    #[serde(default)]
    pub handler: Option<String>,
}

impl FunctionDescriptor {
    pub fn new(name: impl Into<String>, event: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            trigger: Trigger { event: event.into() },
            handler: None,
        }
    }
}

/// Ordered, validated collection of function descriptors.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct FunctionTable {
    functions: Vec<FunctionDescriptor>,
}

impl FunctionTable {
    /// Build a table, rejecting empty or duplicate names.
    pub fn new(functions: Vec<FunctionDescriptor>) -> Result<Self> {
        let mut seen = HashSet::new();
        for f in &functions {
            if f.name.trim().is_empty() {
                return Err(GatewayError::Config("event function name must not be empty".into()));
            }
            if f.trigger.event.trim().is_empty() {
                return Err(GatewayError::Config(format!(
                    "event function {} has an empty trigger event",
                    f.name
                )));
            }
            if !seen.insert(f.name.as_str()) {
                return Err(GatewayError::Config(format!(
                    "duplicate event function name: {}",
                    f.name
                )));
            }
        }
        Ok(Self { functions })
    }

    /// User lifecycle sync functions driven by identity-provider events.
    pub fn builtin() -> Self {
        Self {
            functions: vec![
                FunctionDescriptor::new("sync-user", "clerk/user.created"),
                FunctionDescriptor::new("delete-user-from-db", "clerk/user.deleted"),
            ],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &FunctionDescriptor> {
        self.functions.iter()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.functions.iter().map(|f| f.name.as_str()).collect()
    }
}
