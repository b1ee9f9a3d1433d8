use reqwest::StatusCode;
use thiserror::Error;

/// Why a search request did not produce a list of spots
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("HTTP error: {}", .0.as_u16())]
    Status(StatusCode),
    #[error("Request to parking service failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("Could not decode parking service response: {0}")]
    Decode(#[source] serde_json::Error),
}

impl SearchError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            SearchError::Status(status) => Some(*status),
            _ => None,
        }
    }
}

/// Rejected form edits
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FinderError {
    #[error("Unknown form field `{0}`")]
    UnknownField(String),
    #[error("Unknown parking type `{0}`, expected any, free or paid")]
    InvalidParkingType(String),
}
