//! Environment mode the process runs in.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentMode {
    #[default]
    Development,
    Production,
    Test,
}

impl EnvironmentMode {
    pub fn as_str(self) -> &'static str {
        match self {
            EnvironmentMode::Development => "development",
            EnvironmentMode::Production => "production",
            EnvironmentMode::Test => "test",
        }
    }

    /// Static client bundle serving is only enabled in production.
    pub fn serves_static_bundle(self) -> bool {
        self == EnvironmentMode::Production
    }
}

impl FromStr for EnvironmentMode {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(EnvironmentMode::Development),
            "production" | "prod" => Ok(EnvironmentMode::Production),
            "test" => Ok(EnvironmentMode::Test),
            other => Err(GatewayError::Config(format!(
                "unknown environment mode: {other} (expected development|production|test)"
            ))),
        }
    }
}

impl fmt::Display for EnvironmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
