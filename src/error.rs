//! @acp:module "Errors"
//! @acp:summary "Library error type and result alias"
//! @acp:domain core
//! @acp:layer utility
//!
//! Lookups that find nothing (no marker, no following element, empty
//! hierarchy) are ordinary `None`/empty results and never surface here.

use thiserror::Error;

/// @acp:summary "Errors produced by the inspector library"
#[derive(Debug, Error)]
pub enum InspectorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse HTML: {0}")]
    Html(String),

    #[error("Unknown node id: {0}")]
    UnknownNode(usize),

    #[error("No element matches target: {0}")]
    TargetNotFound(String),

    #[error("Invalid target query: {0}")]
    InvalidTarget(String),

    #[error("Invalid key chord: {0}")]
    InvalidChord(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, InspectorError>;
