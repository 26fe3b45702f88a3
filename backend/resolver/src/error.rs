use std::time::Duration;

use thiserror::Error;

/// Why a remote read did not produce content. Every variant resolves to catalog content.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("Request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("{url} responded with status {status}")]
    Status { url: String, status: u16 },

    #[error("{url} did not respond within {}ms", .timeout.as_millis())]
    Timeout { url: String, timeout: Duration },

    #[error("Malformed payload from {url}: {reason}")]
    Malformed { url: String, reason: String },
}

/// Contact form problems shown inline to the submitter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContactError {
    #[error("Please enter your {0}")]
    Missing(&'static str),

    #[error("Please enter a valid email address")]
    InvalidEmail,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown content kind: {0}")]
pub struct UnknownKind(pub String);
