//! Death records and the workflow state machine.
//!
//! A record occupies a (backbone node, progress) pair. During normal
//! linear movement the progress mirrors the backbone node; a divert (an
//! edit request jumping back to an earlier step) makes them diverge until
//! the next increment resolves the jump, restoring the pre-jump node and,
//! when a requestor was recorded, the pre-jump owner.
//!
//! Every operation takes `&mut self`: exclusive access per record is
//! enforced by the borrow checker, so the progress state and the cached
//! projection always change as one unit relative to any reader. Workflow
//! definitions are shared read-only via `Arc` and never mutated here.

use crate::actor::Actor;
use crate::contents::{flatten, nest, Nested};
use crate::error::{RecordError, RecordResult};
use crate::step::Step;
use crate::workflow::{StepFlow, Workflow};
use chrono::{DateTime, Utc};
use fhir::FlatContents;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

/// Where a record's actual position stands relative to its backbone node.
///
/// The divergence is a named state rather than a pair of fields to
/// compare: a record is either tracking the backbone (`Linear`) or
/// diverted to another step with an optional requestor awaiting its
/// return.
#[derive(Clone, Debug, PartialEq)]
pub enum Progress {
    /// The record mirrors its backbone node.
    Linear,
    /// The record has jumped to another step; the backbone node is
    /// unchanged and the jump resolves on the next increment.
    Diverted {
        step: String,
        /// The actor who requested the jump; ownership returns to them
        /// when the jump resolves. Present only while diverted.
        requestor: Option<Actor>,
    },
}

/// A remark attached to a record during review.
#[derive(Clone, Debug, PartialEq)]
pub struct Comment {
    pub author: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Registration of a completed record by the local registrar.
#[derive(Clone, Debug, PartialEq)]
pub struct Registration {
    pub registered_by: String,
    pub registered_at: DateTime<Utc>,
}

/// A generated certificate. Rendering to a printable document is an
/// external concern; this core keeps the text form and the metadata
/// snapshot it was generated from.
#[derive(Clone, Debug, PartialEq)]
pub struct Certificate {
    pub creator: String,
    pub created_at: DateTime<Utc>,
    pub metadata: Value,
    pub document: String,
}

/// A death-record case moving through a review workflow.
pub struct Record {
    id: Uuid,
    message_id: Uuid,
    contents: FlatContents,
    workflow: Arc<Workflow>,
    position: usize,
    progress: Progress,
    owner: Option<Actor>,
    creator: Actor,
    voided: bool,
    submitted: bool,
    notify: bool,
    coding_message_id: Option<String>,
    comments: Vec<Comment>,
    registration: Option<Registration>,
    certificate: Option<Certificate>,
    updated_at: DateTime<Utc>,
    cached_json: Value,
}

impl Record {
    /// Create a record at the workflow's entry node, owned by its creator.
    pub fn new(workflow: Arc<Workflow>, creator: Actor) -> Self {
        Self::with_contents(workflow, creator, FlatContents::new())
    }

    /// Create a record with initial flat contents (e.g. from ingest).
    pub fn with_contents(workflow: Arc<Workflow>, creator: Actor, contents: FlatContents) -> Self {
        let mut record = Self {
            id: Uuid::new_v4(),
            message_id: Uuid::new_v4(),
            contents,
            workflow,
            position: 0,
            progress: Progress::Linear,
            owner: Some(creator.clone()),
            creator,
            voided: false,
            submitted: false,
            notify: false,
            coding_message_id: None,
            comments: Vec::new(),
            registration: None,
            certificate: None,
            updated_at: Utc::now(),
            cached_json: Value::Null,
        };
        record.update_cache();
        record
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Stable identifier used for outbound message envelopes.
    pub fn message_id(&self) -> Uuid {
        self.message_id
    }

    /// The canonical flat contents.
    pub fn contents(&self) -> &FlatContents {
        &self.contents
    }

    pub fn workflow(&self) -> &Arc<Workflow> {
        &self.workflow
    }

    pub fn owner(&self) -> Option<&Actor> {
        self.owner.as_ref()
    }

    pub fn creator(&self) -> &Actor {
        &self.creator
    }

    pub fn voided(&self) -> bool {
        self.voided
    }

    pub fn submitted(&self) -> bool {
        self.submitted
    }

    pub fn notify(&self) -> bool {
        self.notify
    }

    pub fn coding_message_id(&self) -> Option<&str> {
        self.coding_message_id.as_deref()
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn registration(&self) -> Option<&Registration> {
        self.registration.as_ref()
    }

    pub fn certificate(&self) -> Option<&Certificate> {
        self.certificate.as_ref()
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// The backbone node the record currently sits on.
    pub fn current_flow(&self) -> &StepFlow {
        &self.workflow.flows()[self.position]
    }

    /// The step actually active, which differs from the backbone node's
    /// step while a jump is outstanding.
    pub fn current_step_name(&self) -> &str {
        match &self.progress {
            Progress::Linear => self.current_flow().step().name(),
            Progress::Diverted { step, .. } => step,
        }
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn is_diverted(&self) -> bool {
        matches!(self.progress, Progress::Diverted { .. })
    }

    /// The actor awaiting the record's return, while a jump with a
    /// recorded requestor is outstanding.
    pub fn requestor(&self) -> Option<&Actor> {
        match &self.progress {
            Progress::Diverted { requestor, .. } => requestor.as_ref(),
            Progress::Linear => None,
        }
    }

    // ========================================================================
    // Step transitions
    // ========================================================================

    /// Whether a next backbone node exists.
    pub fn can_increment_step(&self) -> bool {
        self.current_flow().next().is_some()
    }

    /// The next step in the backbone, if any.
    pub fn next_step(&self) -> Option<&Step> {
        self.current_flow()
            .next()
            .map(|index| self.workflow.flows()[index].step())
    }

    /// Whether a previous backbone node exists.
    pub fn can_decrement_step(&self) -> bool {
        self.current_flow().prev().is_some()
    }

    /// The previous step in the backbone, if any.
    pub fn previous_step(&self) -> Option<&Step> {
        self.current_flow()
            .prev()
            .map(|index| self.workflow.flows()[index].step())
    }

    /// Move one step forward, or resolve an outstanding jump.
    ///
    /// In the linear state this advances the backbone node when a next
    /// node exists (and is a no-op on position otherwise). While a jump
    /// is outstanding it instead mirrors the record back onto the
    /// unchanged backbone node, restores ownership to the recorded
    /// requestor and clears it.
    pub fn increment_step(&mut self) {
        match std::mem::replace(&mut self.progress, Progress::Linear) {
            Progress::Linear => {
                if let Some(next) = self.current_flow().next() {
                    self.position = next;
                }
            }
            Progress::Diverted { requestor, .. } => {
                if let Some(requestor) = requestor {
                    self.owner = Some(requestor);
                }
            }
        }
        self.touch_and_cache();
    }

    /// Move one step backward. A no-op (state unchanged) when the
    /// current backbone node has no previous edge.
    pub fn decrement_step(&mut self) {
        let Some(prev) = self.current_flow().prev() else {
            return;
        };
        self.position = prev;
        self.progress = Progress::Linear;
        self.touch_and_cache();
    }

    /// Reposition the record to an arbitrary step of its workflow.
    ///
    /// With `linear = true` the backbone node moves directly to the node
    /// for the target step (normal progress continues from there). With
    /// `linear = false` this is a jump: only the active step changes and
    /// the next [`Record::increment_step`] returns the record to its
    /// current backbone node.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotFound`] when the workflow has no node
    /// for the target step; the record is unchanged.
    pub fn update_step(&mut self, step_name: &str, linear: bool) -> RecordResult<()> {
        if linear {
            let index = self.workflow.flow_index_for_step(step_name).ok_or_else(|| {
                RecordError::NotFound(format!(
                    "workflow '{}' has no step '{step_name}'",
                    self.workflow.name()
                ))
            })?;
            self.position = index;
            self.progress = Progress::Linear;
            self.touch_and_cache();
            Ok(())
        } else {
            self.divert_to(step_name, None)
        }
    }

    /// Jump to the given step without moving the backbone node.
    ///
    /// When a requestor is recorded, resolving the jump restores
    /// ownership to them.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotFound`] when the workflow has no node
    /// for the target step.
    pub fn divert_to(&mut self, step_name: &str, requestor: Option<Actor>) -> RecordResult<()> {
        if self.workflow.flow_index_for_step(step_name).is_none() {
            return Err(RecordError::NotFound(format!(
                "workflow '{}' has no step '{step_name}'",
                self.workflow.name()
            )));
        }
        self.progress = Progress::Diverted {
            step: step_name.to_string(),
            requestor,
        };
        self.touch_and_cache();
        Ok(())
    }

    /// Send the record to an earlier step for edits and hand it to the
    /// actor who should make them.
    ///
    /// The current owner is recorded as the requestor; once the edits are
    /// made and the record increments, ownership returns to them and the
    /// record resumes its backbone position.
    pub fn request_edits(&mut self, step_name: &str, new_owner: Actor) -> RecordResult<()> {
        let requestor = self.owner.clone();
        self.divert_to(step_name, requestor)?;
        self.owner = Some(new_owner);
        self.notify = true;
        self.touch_and_cache();
        Ok(())
    }

    /// Change ownership. The owner is replaced only when an actor is
    /// given; the pending-notification flag is raised either way.
    pub fn update_owner(&mut self, actor: Option<Actor>) {
        if let Some(actor) = actor {
            self.owner = Some(actor);
        }
        self.notify = true;
        self.touch_and_cache();
    }

    /// Clear the pending-notification flag once a notification went out.
    pub fn clear_notify(&mut self) {
        self.notify = false;
        self.touch_and_cache();
    }

    // ========================================================================
    // Lifecycle state
    // ========================================================================

    /// Mark the record voided. Retirement is a state, not a deletion.
    pub fn void(&mut self) {
        self.voided = true;
        self.touch_and_cache();
    }

    pub(crate) fn mark_submitted(&mut self) {
        self.submitted = true;
        self.touch_and_cache();
    }

    /// Record the identifier of a received coded response. A record with
    /// a coded response is never resubmitted.
    pub fn record_coded(&mut self, coding_message_id: impl Into<String>) {
        self.coding_message_id = Some(coding_message_id.into());
        self.touch_and_cache();
    }

    pub fn add_comment(&mut self, comment: Comment) {
        self.comments.push(comment);
        self.touch_and_cache();
    }

    pub fn register(&mut self, registration: Registration) {
        self.registration = Some(registration);
        self.touch_and_cache();
    }

    /// Generate the record's certificate.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::AlreadyExists`] when a certificate has
    /// already been generated for this record.
    pub fn generate_certificate(&mut self, actor: &Actor) -> RecordResult<&Certificate> {
        if self.certificate.is_some() {
            return Err(RecordError::AlreadyExists(format!(
                "certificate for record {}",
                self.id
            )));
        }

        let metadata = self.metadata();
        let document = serde_json::to_string_pretty(&metadata)?;
        let certificate = Certificate {
            creator: actor.name.as_str().to_string(),
            created_at: Utc::now(),
            metadata,
            document,
        };
        let certificate = self.certificate.insert(certificate);
        Ok(certificate)
    }

    // ========================================================================
    // Contents
    // ========================================================================

    /// All dotted keys allowed by this record's workflow: the union of
    /// every step's declared schema.
    pub fn whitelist(&self) -> std::collections::BTreeSet<String> {
        self.workflow
            .steps()
            .flat_map(|step| step.params().iter().cloned())
            .collect()
    }

    /// The nested form of the record's contents.
    pub fn nested_contents(&self) -> RecordResult<Nested> {
        nest(&self.contents)
    }

    /// Split the flat contents into one nested mapping per step, sliced
    /// by each step's declared schema.
    ///
    /// Keys declared by no step appear in no slice; they remain
    /// reachable only through the flat mapping.
    pub fn separate_step_contents(&self) -> RecordResult<BTreeMap<String, Nested>> {
        let nested = self.nested_contents()?;
        Ok(self
            .workflow
            .steps()
            .map(|step| (step.name().to_string(), step.slice(&nested)))
            .collect())
    }

    /// Replace the record's contents from per-step nested mappings read
    /// back from storage.
    pub fn rebuild_contents<'a>(
        &mut self,
        step_contents: impl IntoIterator<Item = &'a Nested>,
    ) -> RecordResult<()> {
        self.contents = crate::contents::merge_step_contents(step_contents)?;
        self.touch_and_cache();
        Ok(())
    }

    /// Merge one step's nested contents into the record.
    ///
    /// The input is sliced through the step's declared schema first, so
    /// an unrecognised key is excluded explicitly, never silently kept.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotFound`] for a step outside this
    /// workflow and [`RecordError::PathConflict`] for contents that do
    /// not flatten cleanly.
    pub fn apply_step_contents(&mut self, step_name: &str, nested: &Nested) -> RecordResult<()> {
        let step = self.workflow.step(step_name).ok_or_else(|| {
            RecordError::NotFound(format!(
                "workflow '{}' has no step '{step_name}'",
                self.workflow.name()
            ))
        })?;

        let flat = flatten(&step.slice(nested))?;
        self.contents.extend(flat);
        self.touch_and_cache();
        Ok(())
    }

    // ========================================================================
    // Edit permissions
    // ========================================================================

    /// The steps the given actor may edit: every step whose backbone
    /// node assigns a role the actor holds. A pure derived query.
    pub fn steps_editable(&self, actor: &Actor) -> Vec<&Step> {
        self.workflow
            .flows()
            .iter()
            .filter(|flow| actor.has_role(flow.role()))
            .map(StepFlow::step)
            .collect()
    }

    /// Whether the given actor may edit the given step.
    pub fn step_editable(&self, actor: &Actor, step_name: &str) -> bool {
        self.steps_editable(actor)
            .iter()
            .any(|step| step.name() == step_name)
    }

    /// The editable step with the given name, if the actor may edit it.
    pub fn editable_step_by_name(&self, actor: &Actor, step_name: &str) -> Option<&Step> {
        self.steps_editable(actor)
            .into_iter()
            .find(|step| step.name() == step_name)
    }

    // ========================================================================
    // Projection
    // ========================================================================

    /// Simple decedent metadata drawn from the contents.
    pub fn metadata(&self) -> Value {
        let field = |key: &str| {
            self.contents
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string()
        };
        json!({
            "firstName": field("decedentName.firstName"),
            "middleName": field("decedentName.middleName"),
            "lastName": field("decedentName.lastName"),
            "suffix": field("decedentName.suffix"),
            "ssn1": field("ssn.ssn1"),
            "ssn2": field("ssn.ssn2"),
            "ssn3": field("ssn.ssn3"),
        })
    }

    /// Assemble the read-only record view.
    ///
    /// Always regenerated whole from current state, never hand-patched;
    /// [`Record::as_json`] serves the cached copy.
    pub fn generate_json(&self) -> Value {
        let next_step_role = self
            .workflow
            .flow_index_for_step(self.current_step_name())
            .and_then(|index| self.workflow.flows()[index].send_to_role());
        let next_step_role_pretty = next_step_role.map(|role| role.pretty());

        let steps: Vec<Value> = self.workflow.steps().map(Step::as_json).collect();
        let comments: Vec<Value> = self
            .comments
            .iter()
            .map(|comment| {
                json!({
                    "author": comment.author,
                    "text": comment.text,
                    "createdAt": comment.created_at.to_rfc3339(),
                })
            })
            .collect();

        json!({
            "id": self.id,
            "owner": self.owner.as_ref().map(Actor::as_json),
            "creator": self.creator.as_json(),
            "comments": comments,
            "stepStatus": {
                "currentStep": self.current_step_name(),
                "requestor": self.requestor().map(Actor::as_json),
            },
            "nextStepRole": next_step_role,
            "nextStepRolePretty": next_step_role_pretty,
            "steps": steps,
            "metadata": self.metadata(),
            "lastUpdatedAt": self.updated_at.to_rfc3339(),
            "registration": self.registration.as_ref().map(|registration| {
                json!({
                    "registeredBy": registration.registered_by,
                    "registeredAt": registration.registered_at.to_rfc3339(),
                })
            }),
            "notify": self.notify,
        })
    }

    /// The cached record view. Derived and regenerable, never a source
    /// of truth.
    pub fn as_json(&self) -> &Value {
        &self.cached_json
    }

    fn update_cache(&mut self) {
        self.cached_json = self.generate_json();
    }

    fn touch_and_cache(&mut self) {
        self.updated_at = Utc::now();
        self.update_cache();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vrr_types::{NonEmptyText, Role};

    const WORKFLOW: &str = r#"name: standard
flows:
  - step:
      name: Identity
      schema: [decedentName, ssn]
    role: funeral_director
    send_to_role: funeral_director
  - step:
      name: Demographics
      schema: [decedentAddress, race, sex]
    role: funeral_director
    send_to_role: physician
  - step:
      name: MedicalCertification
      schema: [cod, mannerOfDeath]
    role: physician
    send_to_role: registrar
  - step:
      name: Review
    role: registrar
"#;

    fn workflow() -> Arc<Workflow> {
        Arc::new(Workflow::from_yaml(WORKFLOW).expect("parse workflow"))
    }

    fn actor(name: &str, roles: &[&str]) -> Actor {
        Actor {
            id: Uuid::new_v4(),
            name: NonEmptyText::new(name).expect("valid name"),
            roles: roles
                .iter()
                .map(|r| Role::new(r).expect("valid role"))
                .collect(),
        }
    }

    fn record() -> Record {
        Record::new(workflow(), actor("Frank Dale", &["funeral_director"]))
    }

    #[test]
    fn starts_at_entry_node_mirroring_backbone() {
        let record = record();
        assert_eq!(record.current_step_name(), "Identity");
        assert!(!record.is_diverted());
        assert!(record.requestor().is_none());
    }

    #[test]
    fn increment_advances_and_mirrors() {
        let mut record = record();
        record.increment_step();
        assert_eq!(record.current_step_name(), "Demographics");
        assert_eq!(record.current_flow().step().name(), "Demographics");
    }

    #[test]
    fn increment_at_terminal_keeps_position() {
        let mut record = record();
        record.update_step("Review", true).expect("move to terminal");
        record.increment_step();
        assert_eq!(record.current_step_name(), "Review");
    }

    #[test]
    fn linear_increment_never_touches_requestor() {
        let mut record = record();
        assert!(record.requestor().is_none());
        record.increment_step();
        assert!(record.requestor().is_none());
    }

    #[test]
    fn decrement_moves_back() {
        let mut record = record();
        record.increment_step();
        record.decrement_step();
        assert_eq!(record.current_step_name(), "Identity");
    }

    #[test]
    fn decrement_at_entry_is_a_no_op() {
        let mut record = record();
        let before = record.updated_at();
        record.decrement_step();
        assert_eq!(record.current_step_name(), "Identity");
        assert_eq!(record.updated_at(), before);
        assert!(!record.is_diverted());
    }

    #[test]
    fn jump_then_increment_restores_position() {
        let mut record = record();
        record.update_step("MedicalCertification", true).expect("reposition");

        record.update_step("Identity", false).expect("jump");
        assert_eq!(record.current_step_name(), "Identity");
        assert_eq!(record.current_flow().step().name(), "MedicalCertification");

        record.increment_step();
        assert_eq!(record.current_step_name(), "MedicalCertification");
        assert_eq!(record.current_flow().step().name(), "MedicalCertification");
        assert!(!record.is_diverted());
    }

    #[test]
    fn request_edits_restores_owner_on_resolution() {
        let mut record = record();
        let physician = actor("Pat Hale", &["physician"]);
        let director = actor("Frank Dale", &["funeral_director"]);

        record.update_step("MedicalCertification", true).expect("reposition");
        record.update_owner(Some(physician.clone()));

        record
            .request_edits("Identity", director.clone())
            .expect("request edits");
        assert_eq!(record.current_step_name(), "Identity");
        assert_eq!(record.owner(), Some(&director));
        assert_eq!(record.requestor(), Some(&physician));

        record.increment_step();
        assert_eq!(record.current_step_name(), "MedicalCertification");
        assert_eq!(record.owner(), Some(&physician));
        assert!(record.requestor().is_none());
    }

    #[test]
    fn linear_move_to_unknown_step_is_not_found() {
        let mut record = record();
        let err = record
            .update_step("NoSuchStep", true)
            .expect_err("should reject unknown step");
        assert!(matches!(err, RecordError::NotFound(_)));
        assert_eq!(record.current_step_name(), "Identity");
    }

    #[test]
    fn jump_to_unknown_step_is_not_found() {
        let mut record = record();
        let err = record
            .divert_to("NoSuchStep", None)
            .expect_err("should reject unknown step");
        assert!(matches!(err, RecordError::NotFound(_)));
        assert!(!record.is_diverted());
    }

    #[test]
    fn update_owner_without_actor_keeps_owner_but_flags_notify() {
        let mut record = record();
        let owner_before = record.owner().cloned();
        record.update_owner(None);
        assert_eq!(record.owner(), owner_before.as_ref());
        assert!(record.notify());
    }

    #[test]
    fn steps_editable_follows_roles() {
        let record = record();
        let director = actor("Frank Dale", &["funeral_director"]);
        let physician = actor("Pat Hale", &["physician"]);
        let dual = actor("Jo Lin", &["registrar", "physician"]);

        let names = |actor: &Actor| {
            record
                .steps_editable(actor)
                .iter()
                .map(|s| s.name().to_string())
                .collect::<Vec<_>>()
        };

        assert_eq!(names(&director), vec!["Identity", "Demographics"]);
        assert_eq!(names(&physician), vec!["MedicalCertification"]);
        assert_eq!(names(&dual), vec!["MedicalCertification", "Review"]);

        assert!(record.step_editable(&physician, "MedicalCertification"));
        assert!(!record.step_editable(&physician, "Identity"));
        assert!(record
            .editable_step_by_name(&director, "Identity")
            .is_some());
    }

    #[test]
    fn apply_step_contents_slices_out_undeclared_keys() {
        let mut record = record();
        let nested = serde_json::json!({
            "decedentName": {"firstName": "Jane", "lastName": "Doe"},
            "mannerOfDeath": {"mannerOfDeath": "Natural"}
        });
        record
            .apply_step_contents("Identity", nested.as_object().expect("object"))
            .expect("apply contents");

        assert_eq!(
            record.contents().get("decedentName.firstName"),
            Some(&serde_json::json!("Jane"))
        );
        // mannerOfDeath belongs to MedicalCertification, not Identity.
        assert!(record
            .contents()
            .get("mannerOfDeath.mannerOfDeath")
            .is_none());
    }

    #[test]
    fn separate_step_contents_splits_by_schema() {
        let mut record = record();
        let nested = serde_json::json!({
            "decedentName": {"firstName": "Jane"},
            "ssn": {"ssn1": "123"}
        });
        record
            .apply_step_contents("Identity", nested.as_object().expect("object"))
            .expect("apply contents");

        let separated = record.separate_step_contents().expect("separate contents");
        let identity = separated.get("Identity").expect("identity slice");
        assert_eq!(identity.len(), 2);
        assert!(separated.get("Review").expect("review slice").is_empty());
    }

    #[test]
    fn metadata_defaults_to_empty_strings() {
        let record = record();
        let metadata = record.metadata();
        assert_eq!(metadata["firstName"], "");
        assert_eq!(metadata["ssn1"], "");
    }

    #[test]
    fn projection_reports_next_step_role() {
        let mut record = record();
        record.update_step("Demographics", true).expect("reposition");

        let view = record.generate_json();
        assert_eq!(view["stepStatus"]["currentStep"], "Demographics");
        assert_eq!(view["nextStepRole"], "physician");
        assert_eq!(view["nextStepRolePretty"], "Physician");
        assert_eq!(view["notify"], false);
    }

    #[test]
    fn cache_tracks_every_transition() {
        let mut record = record();
        record.increment_step();
        assert_eq!(record.as_json(), &record.generate_json());

        record.update_owner(Some(actor("Pat Hale", &["physician"])));
        assert_eq!(record.as_json(), &record.generate_json());
    }

    #[test]
    fn second_certificate_generation_fails() {
        let mut record = record();
        let registrar = actor("Jo Lin", &["registrar"]);

        record
            .generate_certificate(&registrar)
            .expect("first certificate");
        let err = record
            .generate_certificate(&registrar)
            .expect_err("second certificate should fail");
        assert!(matches!(err, RecordError::AlreadyExists(_)));
    }

    #[test]
    fn void_is_a_state_flip() {
        let mut record = record();
        record.void();
        assert!(record.voided());
        assert_eq!(record.current_step_name(), "Identity");
    }
}
