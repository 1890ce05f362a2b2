//! Steps and their declared schemas.
//!
//! A step is a named unit of work owning a declared set of top-level
//! contents properties. The schema drives two things: slicing flat
//! contents into per-step storage, and bounding what a role may edit.

use crate::contents::Nested;
use serde::Deserialize;

/// A named unit of work with a declared field schema.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Step {
    name: String,

    /// Top-level contents property names this step owns. A step with no
    /// declared schema owns nothing (and slices to an empty mapping).
    #[serde(default)]
    schema: Vec<String>,
}

impl Step {
    /// Create a step directly (definitions usually arrive via workflow
    /// YAML instead).
    pub fn new(name: impl Into<String>, schema: Vec<String>) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The property names declared by this step's schema.
    ///
    /// Empty (not an error) for a step with no declared schema.
    pub fn params(&self) -> &[String] {
        &self.schema
    }

    /// Project a nested contents mapping down to just the branches this
    /// step declares.
    ///
    /// Keys not declared by any step are excluded from every slice; they
    /// remain reachable only through the unsliced flat mapping.
    pub fn slice(&self, nested: &Nested) -> Nested {
        let mut sliced = Nested::new();
        for property in &self.schema {
            if let Some(value) = nested.get(property) {
                sliced.insert(property.clone(), value.clone());
            }
        }
        sliced
    }

    /// Read-only JSON view used by record projections.
    pub fn as_json(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.name,
            "schema": self.schema,
        })
    }
}
