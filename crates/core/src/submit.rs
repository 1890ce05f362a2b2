//! Record submission pipeline.
//!
//! Submission is the only collaborator-calling sequence in this core and
//! it is strictly ordered: convert contents to the focus resource, build
//! the message bundle, mark the record submitted, then transmit. The
//! record is marked submitted exactly once per successful export and
//! never before mapping succeeds. A transport failure after marking is a
//! known inconsistency window surfaced as its own error state
//! ([`RecordError::SubmittedNotTransmitted`]); nothing here retries.

use crate::config::SubmissionConfig;
use crate::error::{RecordError, RecordResult};
use crate::record::Record;
use chrono::Utc;
use fhir::{FlatContents, SubmissionBundle, SubmissionContext, SubmissionEvent};
use serde_json::Value;
use uuid::Uuid;

/// Boxed error type collaborators report their failures with.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// External service converting a flat record into its focus resource.
pub trait FocusConverter {
    fn convert(&self, contents: &FlatContents) -> Result<Value, BoxError>;
}

/// External transport delivering a built submission bundle.
pub trait MessageTransport {
    fn deliver(&self, bundle: &Value) -> Result<(), BoxError>;
}

/// What a submission call did.
#[derive(Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The bundle was built and delivered.
    Delivered { message_id: Uuid },
    /// The record already has a coded response and was not resubmitted.
    SkippedAlreadyCoded,
}

/// Submit a record: map, mark submitted, transmit.
///
/// The contents sent to the converter carry the record identifier as
/// `certificateNumber`; working aliases under `decedentName.akas` are not
/// part of the exchange contract and are removed.
///
/// # Errors
///
/// - [`RecordError::Conversion`] when the focus converter fails; the
///   record is left untouched.
/// - [`RecordError::SubmittedNotTransmitted`] when the transport fails
///   after the record was marked submitted.
pub fn submit_record(
    record: &mut Record,
    converter: &dyn FocusConverter,
    transport: &dyn MessageTransport,
    config: &SubmissionConfig,
) -> RecordResult<SubmitOutcome> {
    if record.coding_message_id().is_some() {
        tracing::info!(record_id = %record.id(), "record already coded, skipping submission");
        return Ok(SubmitOutcome::SkippedAlreadyCoded);
    }

    let mut contents = record.contents().clone();
    contents.insert(
        "certificateNumber".to_string(),
        Value::String(record.id().to_string()),
    );
    contents.remove("decedentName.akas");

    let focus = converter
        .convert(&contents)
        .map_err(RecordError::Conversion)?;

    let event = SubmissionEvent::for_record(record.voided(), record.submitted());
    let bundle = SubmissionBundle::build(&SubmissionContext {
        message_id: record.message_id(),
        record_id: record.id(),
        timestamp: Utc::now(),
        event,
        focus: &focus,
        jurisdiction_id: config.jurisdiction_id(),
        destination_endpoint: config.destination_endpoint(),
        source_endpoint: config.source_endpoint(),
    })?;

    // Map succeeded; the record state advances before the transport runs.
    record.mark_submitted();
    tracing::info!(record_id = %record.id(), event = ?event, "record marked submitted");

    transport
        .deliver(&bundle)
        .map_err(|source| RecordError::SubmittedNotTransmitted {
            record_id: record.id(),
            source,
        })?;

    Ok(SubmitOutcome::Delivered {
        message_id: record.message_id(),
    })
}
