//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at
//! process startup and then passed into record operations. The intent is
//! to avoid reading process-wide environment variables during operation,
//! which can lead to inconsistent behaviour in multi-threaded runtimes
//! and test harnesses.

use crate::error::{RecordError, RecordResult};

/// Submission configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct SubmissionConfig {
    jurisdiction_id: String,
    source_endpoint: String,
    destination_endpoint: String,
}

impl SubmissionConfig {
    /// Default receiving endpoint for death-record submissions.
    pub const DEFAULT_DESTINATION: &'static str = "http://nchs.cdc.gov/vrdr_submission";
    /// Default sending endpoint identifying this jurisdiction.
    pub const DEFAULT_SOURCE: &'static str = "https://example-jurisdiction.gov/vital_records";
    /// Default jurisdiction tag carried in void payloads.
    pub const DEFAULT_JURISDICTION: &'static str = "WA";

    /// Create a new `SubmissionConfig`.
    pub fn new(
        jurisdiction_id: impl Into<String>,
        source_endpoint: impl Into<String>,
        destination_endpoint: impl Into<String>,
    ) -> RecordResult<Self> {
        let jurisdiction_id = jurisdiction_id.into();
        let source_endpoint = source_endpoint.into();
        let destination_endpoint = destination_endpoint.into();

        if jurisdiction_id.trim().is_empty() {
            return Err(RecordError::InvalidInput(
                "jurisdiction_id cannot be empty".into(),
            ));
        }
        if source_endpoint.trim().is_empty() || destination_endpoint.trim().is_empty() {
            return Err(RecordError::InvalidInput(
                "submission endpoints cannot be empty".into(),
            ));
        }

        Ok(Self {
            jurisdiction_id,
            source_endpoint,
            destination_endpoint,
        })
    }

    pub fn jurisdiction_id(&self) -> &str {
        &self.jurisdiction_id
    }

    pub fn source_endpoint(&self) -> &str {
        &self.source_endpoint
    }

    pub fn destination_endpoint(&self) -> &str {
        &self.destination_endpoint
    }
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            jurisdiction_id: Self::DEFAULT_JURISDICTION.to_string(),
            source_endpoint: Self::DEFAULT_SOURCE.to_string(),
            destination_endpoint: Self::DEFAULT_DESTINATION.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_jurisdiction() {
        let err = SubmissionConfig::new("  ", "https://src", "https://dst")
            .expect_err("should reject empty jurisdiction");
        assert!(matches!(err, RecordError::InvalidInput(_)));
    }

    #[test]
    fn default_carries_example_endpoints() {
        let config = SubmissionConfig::default();
        assert_eq!(config.jurisdiction_id(), "WA");
        assert_eq!(
            config.destination_endpoint(),
            "http://nchs.cdc.gov/vrdr_submission"
        );
    }
}
