//! Runtime-agnostic helpers shared by the transport and the resource clients.
//!
//! - **Retry State**: [`RetryState`] for tracking HTTP retry attempts
//! - **Request checks**: [`ensure_id`], [`is_valid_email`], [`validate_email`], [`ensure_date_order`]

use chrono::NaiveDate;
use reqwest::StatusCode;

use crate::errors::{Error, Result, RetryMetadata, ValidationError};

/// Tracks retry state across attempts.
#[derive(Default)]
pub(crate) struct RetryState {
    pub(crate) attempts: u32,
    pub(crate) last_status: Option<u16>,
    pub(crate) last_error: Option<String>,
}

impl RetryState {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_attempt(&mut self, attempt: u32) {
        self.attempts = attempt;
    }

    pub(crate) fn record_status(&mut self, status: StatusCode) {
        self.last_status = Some(status.as_u16());
    }

    pub(crate) fn record_error(&mut self, err: &reqwest::Error) {
        self.last_error = Some(err.to_string());
    }

    pub(crate) fn metadata(&self) -> Option<RetryMetadata> {
        if self.attempts <= 1 {
            None
        } else {
            Some(RetryMetadata {
                attempts: self.attempts,
                last_status: self.last_status,
                last_error: self.last_error.clone(),
            })
        }
    }
}

/// Rejects the zero identifier before it is interpolated into a path.
pub(crate) fn ensure_id(id: u64, field: &str) -> Result<()> {
    if id == 0 {
        return Err(Error::Validation(
            ValidationError::new(format!("{field} must be a positive identifier")).with_field(field),
        ));
    }
    Ok(())
}

/// Simple email validation - text on both sides of a single @ and a dot in the domain.
pub(crate) fn is_valid_email(email: &str) -> bool {
    let parts: Vec<&str> = email.trim().split('@').collect();
    if parts.len() != 2 {
        return false;
    }
    let local = parts[0];
    let domain = parts[1];
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

pub(crate) fn validate_email(email: &str, field: &str) -> Result<()> {
    if email.trim().is_empty() {
        return Err(ValidationError::required(field).into());
    }
    if !is_valid_email(email) {
        return Err(Error::Validation(
            ValidationError::new("invalid email format").with_field(field),
        ));
    }
    Ok(())
}

/// Fails when both dates are set and `end` falls before `start`.
pub(crate) fn ensure_date_order(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    end_field: &str,
    start_field: &str,
) -> Result<()> {
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            return Err(Error::Validation(
                ValidationError::new(format!("{end_field} must not be before {start_field}"))
                    .with_field(end_field),
            ));
        }
    }
    Ok(())
}
