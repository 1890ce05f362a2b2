//! Outbound submission bundle builder.
//!
//! Wraps an already-mapped focus resource (or, for a voided record, a
//! `Parameters` payload) in a message envelope: one `MessageHeader` entry
//! followed by exactly one focus entry. The header's event URI is chosen
//! by record state precedence: voided beats submitted-update beats
//! initial submission.

use crate::{FhirError, FhirResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// The three mutually exclusive submission event kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmissionEvent {
    /// First submission of a record.
    Submission,
    /// Update to a record already submitted.
    Update,
    /// Void of a record.
    Void,
}

impl SubmissionEvent {
    /// Chooses the event for a record's current state.
    ///
    /// Voided takes priority over submitted-update, which takes priority
    /// over initial submission.
    pub fn for_record(voided: bool, submitted: bool) -> Self {
        if voided {
            SubmissionEvent::Void
        } else if submitted {
            SubmissionEvent::Update
        } else {
            SubmissionEvent::Submission
        }
    }

    /// The event classifier URI carried in the message header.
    pub fn uri(&self) -> &'static str {
        match self {
            SubmissionEvent::Submission => "http://nchs.cdc.gov/vrdr_submission",
            SubmissionEvent::Update => "http://nchs.cdc.gov/vrdr_submission_update",
            SubmissionEvent::Void => "http://nchs.cdc.gov/vrdr_submission_void",
        }
    }
}

/// Everything the bundle builder needs from the record and deployment.
#[derive(Clone, Debug)]
pub struct SubmissionContext<'a> {
    /// Stable per-record message identifier.
    pub message_id: Uuid,
    /// The record's own identifier.
    pub record_id: Uuid,
    /// Envelope timestamp.
    pub timestamp: DateTime<Utc>,
    /// Event kind (see [`SubmissionEvent::for_record`]).
    pub event: SubmissionEvent,
    /// The previously mapped focus resource.
    pub focus: &'a serde_json::Value,
    /// Jurisdiction tag carried in void payloads.
    pub jurisdiction_id: &'a str,
    /// Receiving endpoint.
    pub destination_endpoint: &'a str,
    /// Sending endpoint.
    pub source_endpoint: &'a str,
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Serialize)]
struct BundleWire {
    #[serde(rename = "resourceType")]
    resource_type: &'static str,
    #[serde(rename = "type")]
    bundle_type: &'static str,
    id: String,
    timestamp: String,
    entry: Vec<EntryWire>,
}

#[derive(Serialize)]
struct EntryWire {
    resource: serde_json::Value,
}

#[derive(Serialize)]
struct MessageHeaderWire<'a> {
    #[serde(rename = "resourceType")]
    resource_type: &'static str,
    id: String,
    timestamp: String,
    #[serde(rename = "eventUri")]
    event_uri: &'static str,
    destination: Vec<EndpointWire<'a>>,
    source: EndpointWire<'a>,
    focus: Vec<ReferenceWire>,
}

#[derive(Serialize)]
struct EndpointWire<'a> {
    endpoint: &'a str,
}

#[derive(Serialize)]
struct ReferenceWire {
    reference: String,
}

#[derive(Serialize)]
struct ParametersWire<'a> {
    #[serde(rename = "resourceType")]
    resource_type: &'static str,
    parameter: Vec<ParameterWire<'a>>,
}

#[derive(Serialize)]
struct ParameterWire<'a> {
    name: &'static str,
    #[serde(rename = "valueString")]
    value_string: &'a str,
}

// ============================================================================
// Public SubmissionBundle operations
// ============================================================================

/// Submission bundle operations.
///
/// This is a zero-sized type used for namespacing bundle construction.
/// All methods are associated functions.
pub struct SubmissionBundle;

impl SubmissionBundle {
    /// Build the outbound message bundle for a record.
    ///
    /// The bundle carries a `MessageHeader` entry and exactly one focus
    /// entry: the mapped focus resource, or a `Parameters` payload (record
    /// identifier + jurisdiction tag) when the event is a void.
    ///
    /// Building is pure; marking the record submitted is the caller's
    /// responsibility and must happen only after this succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::Translation`] if the assembled envelope fails
    /// to serialise.
    pub fn build(context: &SubmissionContext<'_>) -> FhirResult<serde_json::Value> {
        // The header focus points at the mapped resource when it carries
        // its own id; the record id is the fallback.
        let focus_id = context
            .focus
            .get("id")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| context.record_id.to_string());

        let timestamp = context.timestamp.to_rfc3339();

        let header = MessageHeaderWire {
            resource_type: "MessageHeader",
            id: context.message_id.to_string(),
            timestamp: timestamp.clone(),
            event_uri: context.event.uri(),
            destination: vec![EndpointWire {
                endpoint: context.destination_endpoint,
            }],
            source: EndpointWire {
                endpoint: context.source_endpoint,
            },
            focus: vec![ReferenceWire {
                reference: format!("urn:uuid:{focus_id}"),
            }],
        };

        let record_id = context.record_id.to_string();
        let focus_entry = if context.event == SubmissionEvent::Void {
            let void = ParametersWire {
                resource_type: "Parameters",
                parameter: vec![
                    ParameterWire {
                        name: "cert_no",
                        value_string: &record_id,
                    },
                    ParameterWire {
                        name: "state_id",
                        value_string: context.jurisdiction_id,
                    },
                ],
            };
            to_value(&void)?
        } else {
            context.focus.clone()
        };

        let bundle = BundleWire {
            resource_type: "Bundle",
            bundle_type: "message",
            id: context.message_id.to_string(),
            timestamp,
            entry: vec![
                EntryWire {
                    resource: to_value(&header)?,
                },
                EntryWire {
                    resource: focus_entry,
                },
            ],
        };

        to_value(&bundle)
    }
}

fn to_value<T: Serialize>(value: &T) -> FhirResult<serde_json::Value> {
    serde_json::to_value(value)
        .map_err(|e| FhirError::Translation(format!("Failed to serialise bundle: {e}")))
}
