//! Core error taxonomy.

/// Errors returned by the `vrr-core` crate.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("conflicting dotted paths at {0}")]
    PathConflict(String),

    #[error("invalid workflow definition: {0}")]
    WorkflowDefinition(String),

    #[error("failed to read workflow definition: {0}")]
    WorkflowRead(std::io::Error),

    #[error("failed to serialize record view: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("FHIR boundary error: {0}")]
    Fhir(#[from] fhir::FhirError),

    #[error("focus conversion failed: {0}")]
    Conversion(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The record was marked submitted but the transport failed afterwards.
    ///
    /// This is a known inconsistency window: the submission bundle was
    /// built and the record state advanced, yet the message never left.
    /// It must never be conflated with total success or total failure.
    #[error("record {record_id} submitted but not transmitted: {source}")]
    SubmittedNotTransmitted {
        record_id: uuid::Uuid,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Type alias for Results that can fail with a [`RecordError`].
pub type RecordResult<T> = Result<T, RecordError>;
