//! Workflow definitions.
//!
//! A workflow is the ordered backbone of steps a record passes through.
//! Definitions are configuration: loaded once from strict YAML, validated,
//! then shared read-only (via `Arc`) across every record that references
//! them. "Next"/"previous" denote the linear backbone; non-linear movement
//! is a record-level concern (see `record`).

use crate::error::{RecordError, RecordResult};
use crate::step::Step;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use vrr_types::Role;

/// A node in the workflow backbone: the step it represents, pointers to
/// the neighbouring nodes, and the roles involved at this node.
#[derive(Clone, Debug)]
pub struct StepFlow {
    step: Step,
    role: Role,
    send_to_role: Option<Role>,
    next: Option<usize>,
    prev: Option<usize>,
}

impl StepFlow {
    pub fn step(&self) -> &Step {
        &self.step
    }

    /// The role authorized to act at this node.
    pub fn role(&self) -> &Role {
        &self.role
    }

    /// The role the record is handed to when this node's work completes.
    pub fn send_to_role(&self) -> Option<&Role> {
        self.send_to_role.as_ref()
    }

    pub fn next(&self) -> Option<usize> {
        self.next
    }

    pub fn prev(&self) -> Option<usize> {
        self.prev
    }
}

/// An ordered definition of steps connected by flow edges.
///
/// Exactly one node has no previous edge (the entry) and at least one has
/// no next edge (a terminal); load-time validation enforces this.
#[derive(Clone, Debug)]
pub struct Workflow {
    name: String,
    flows: Vec<StepFlow>,
}

impl Workflow {
    /// Parse a workflow definition from YAML text.
    ///
    /// This uses `serde_path_to_error` to surface a best-effort path
    /// (e.g. `flows[2].step.schema`) to the failing field when the YAML
    /// does not match the definition schema.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::WorkflowDefinition`] if:
    /// - the YAML does not match the strict definition schema (unknown
    ///   keys are rejected),
    /// - the definition has no flow nodes,
    /// - two flow nodes share a step name.
    pub fn from_yaml(yaml_text: &str) -> RecordResult<Self> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);

        let wire = match serde_path_to_error::deserialize::<_, WorkflowWire>(deserializer) {
            Ok(parsed) => parsed,
            Err(err) => {
                let path = err.path().to_string();
                let source = err.into_inner();
                let path = if path.is_empty() {
                    "<root>"
                } else {
                    path.as_str()
                };
                return Err(RecordError::WorkflowDefinition(format!(
                    "schema mismatch at {path}: {source}"
                )));
            }
        };

        wire_to_domain(wire)
    }

    /// Read and parse a workflow definition file.
    pub fn from_file(path: impl AsRef<Path>) -> RecordResult<Self> {
        let yaml_text = std::fs::read_to_string(path).map_err(RecordError::WorkflowRead)?;
        Self::from_yaml(&yaml_text)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The backbone nodes in order.
    pub fn flows(&self) -> &[StepFlow] {
        &self.flows
    }

    /// The entry node (the single node with no previous edge).
    pub fn entry(&self) -> &StepFlow {
        &self.flows[0]
    }

    /// The steps in backbone order.
    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.flows.iter().map(StepFlow::step)
    }

    /// The backbone index of the node for the given step, if the step is
    /// part of this workflow.
    pub fn flow_index_for_step(&self, step_name: &str) -> Option<usize> {
        self.flows
            .iter()
            .position(|flow| flow.step.name() == step_name)
    }

    /// The step with the given name, if part of this workflow.
    pub fn step(&self, step_name: &str) -> Option<&Step> {
        self.flow_index_for_step(step_name)
            .map(|index| self.flows[index].step())
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

/// Wire representation of a workflow definition file.
///
/// Definitions are internal configuration, so the wire schema is strict:
/// unknown keys are rejected.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WorkflowWire {
    name: String,
    flows: Vec<FlowWire>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FlowWire {
    step: Step,
    role: Role,
    #[serde(default)]
    send_to_role: Option<Role>,
}

fn wire_to_domain(wire: WorkflowWire) -> RecordResult<Workflow> {
    if wire.flows.is_empty() {
        return Err(RecordError::WorkflowDefinition(format!(
            "workflow '{}' has no flow nodes",
            wire.name
        )));
    }

    let mut seen = HashSet::new();
    for flow in &wire.flows {
        if !seen.insert(flow.step.name().to_string()) {
            return Err(RecordError::WorkflowDefinition(format!(
                "workflow '{}' declares step '{}' more than once",
                wire.name,
                flow.step.name()
            )));
        }
    }

    let last = wire.flows.len() - 1;
    let flows = wire
        .flows
        .into_iter()
        .enumerate()
        .map(|(index, flow)| StepFlow {
            step: flow.step,
            role: flow.role,
            send_to_role: flow.send_to_role,
            next: (index < last).then_some(index + 1),
            prev: (index > 0).then(|| index - 1),
        })
        .collect();

    Ok(Workflow {
        name: wire.name,
        flows,
    })
}
