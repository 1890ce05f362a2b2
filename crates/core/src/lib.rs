//! # VRR Core
//!
//! Core business logic for the Vital Records Registry death-record
//! system.
//!
//! This crate contains pure data operations and the workflow state
//! machine:
//! - the dotted-hash transform between nested and flat record contents
//! - step schemas and per-step content slicing
//! - workflow definitions (validated YAML configuration, shared read-only)
//! - the record lifecycle: linear movement, divert-and-resume edit
//!   requests, ownership, projection cache, certificate state
//! - the submission pipeline over converter/transport collaborators
//!
//! **No API concerns**: authentication, HTTP servers, storage engines and
//! notification delivery belong to external collaborators and are
//! consumed only through the interfaces defined here.

pub mod actor;
pub mod config;
pub mod contents;
pub mod error;
pub mod record;
pub mod step;
pub mod submit;
pub mod workflow;

pub use actor::Actor;
pub use config::SubmissionConfig;
pub use contents::{flatten, merge_step_contents, nest, Nested};
pub use error::{RecordError, RecordResult};
pub use record::{Certificate, Comment, Progress, Record, Registration};
pub use step::Step;
pub use submit::{submit_record, FocusConverter, MessageTransport, SubmitOutcome};
pub use workflow::{StepFlow, Workflow};

// Re-export the boundary crate's flat record type; contents flow through
// both crates in this shape.
pub use fhir::FlatContents;
