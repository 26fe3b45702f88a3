use std::sync::LazyLock;

use catalog::models::ContactSubmission;
use regex::Regex;
use serde::Serialize;

use crate::error::ContactError;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+$").expect("email pattern is valid"));

/// Both outcomes read as success to the submitter.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContactOutcome {
    /// The API accepted the submission.
    Delivered,
    /// The API was unreachable or refused it; success was reported after a delay.
    Simulated,
}

impl ContactOutcome {
    pub fn delivered(self) -> bool {
        self == ContactOutcome::Delivered
    }
}

pub fn validate(form: &ContactSubmission) -> Result<(), ContactError> {
    if form.name.trim().is_empty() {
        return Err(ContactError::Missing("name"));
    }

    if form.email.trim().is_empty() {
        return Err(ContactError::Missing("email"));
    }

    if !EMAIL.is_match(form.email.trim()) {
        return Err(ContactError::InvalidEmail);
    }

    if form.message.trim().is_empty() {
        return Err(ContactError::Missing("message"));
    }

    Ok(())
}
