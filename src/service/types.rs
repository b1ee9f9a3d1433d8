use crate::error::SearchError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Parking Pro search endpoint
pub const DEFAULT_ENDPOINT: &str = "https://parking-pro.onrender.com/parking";

/// Message shown for any failed search under the generic strategy
pub const GENERIC_ERROR_MESSAGE: &str = "Could not fetch parking spots.";

/// How a failed search is described to the user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorMessageStrategy {
    /// Always the same fixed message
    #[default]
    Generic,
    /// "HTTP error: <code>" when the service answered with a failure status
    StatusDerived,
}

impl ErrorMessageStrategy {
    pub fn message_for(&self, error: &SearchError) -> String {
        match (self, error) {
            (ErrorMessageStrategy::StatusDerived, SearchError::Status(_)) => error.to_string(),
            _ => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }
}

impl FromStr for ErrorMessageStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "generic" => Ok(ErrorMessageStrategy::Generic),
            "status" | "status-derived" => Ok(ErrorMessageStrategy::StatusDerived),
            other => anyhow::bail!("Unknown error message strategy: {}", other),
        }
    }
}
