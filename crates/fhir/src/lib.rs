//! FHIR wire/boundary support for the Vital Records Registry.
//!
//! This crate provides **wire models** and **translation helpers** for the
//! death-record message exchange:
//! - lenient wire structs for the inbound resource graph (a message bundle
//!   carrying decedent, certifier, cause-of-death conditions and
//!   observations)
//! - the ingest mapper that translates a resource graph into the registry's
//!   flat dotted-key record
//! - the outbound submission bundle builder (message header + focus or
//!   void parameters)
//! - the static code lookup tables shared by both directions
//!
//! This crate focuses on:
//! - FHIR semantic alignment (without FHIR JSON/REST transport)
//! - serialisation/deserialisation
//! - translation between record contents and wire structs
//!
//! Workflow state, step schemas and record lifecycle live in `vrr-core`;
//! this crate knows nothing about them beyond the flags needed to pick a
//! submission event.

pub mod codes;
pub mod consume;
pub mod datetime;
pub mod submission;
pub mod wire;

// Re-export facades
pub use consume::{certifier_name, from_fhir};
pub use submission::SubmissionBundle;

// Re-export public domain-level types
pub use codes::CodeTables;
pub use submission::{SubmissionContext, SubmissionEvent};
pub use wire::{DeathRecordBundle, ResourceSet};

use std::collections::BTreeMap;

/// A flat dotted-key record fragment or full record.
///
/// Keys are fully-qualified dotted paths (`decedentName.firstName`); values
/// are scalars. `BTreeMap` keeps the mapping deterministically ordered so
/// identical inputs always produce byte-identical output.
pub type FlatContents = BTreeMap<String, serde_json::Value>;

/// Errors returned by the `fhir` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum FhirError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("structural mismatch: {0}")]
    StructuralMismatch(String),

    #[error("unparseable date/time: {0}")]
    InvalidDateTime(String),

    #[error("conflicting values for {key}: {existing} vs {incoming}")]
    MergeConflict {
        key: String,
        existing: String,
        incoming: String,
    },

    #[error("translation error: {0}")]
    Translation(String),
}

/// Type alias for Results that can fail with a [`FhirError`].
pub type FhirResult<T> = Result<T, FhirError>;
