//! Inbound wire models for the death-record resource graph.
//!
//! These structs are deliberately **lenient**: inbound clinical resources
//! carry many fields this registry does not consume, and unknown
//! observation kinds must be ignored rather than rejected. Only the fields
//! the ingest mapper reads are modelled; everything else passes through
//! untouched.
//!
//! Classification of bundle entries is by declared `resourceType`, not by
//! position: [`ResourceSet::classify`] performs an explicit capability
//! query over the resource graph and the ingest mapper dispatches on the
//! result.

use crate::{FhirError, FhirResult};
use serde::Deserialize;

// ============================================================================
// Bundle envelope
// ============================================================================

/// Wire representation of an inbound death-record message bundle.
#[derive(Clone, Debug, Deserialize)]
pub struct DeathRecordBundle {
    #[serde(rename = "resourceType")]
    pub resource_type: String,

    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub entry: Vec<BundleEntry>,
}

/// A single bundle entry wrapping an arbitrary resource.
#[derive(Clone, Debug, Deserialize)]
pub struct BundleEntry {
    #[serde(default)]
    pub resource: Option<serde_json::Value>,
}

impl DeathRecordBundle {
    /// Parse a death-record bundle from JSON text.
    ///
    /// Uses `serde_path_to_error` to surface a best-effort path (e.g.
    /// `entry.3.resource`) to the failing field when the JSON does not
    /// match the bundle envelope.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError`] if the JSON is malformed, the envelope shape
    /// is wrong, or `resourceType` is not `Bundle`.
    pub fn parse(json_text: &str) -> FhirResult<Self> {
        let mut deserializer = serde_json::Deserializer::from_str(json_text);

        let bundle = match serde_path_to_error::deserialize::<_, DeathRecordBundle>(
            &mut deserializer,
        ) {
            Ok(parsed) => parsed,
            Err(err) => {
                let path = err.path().to_string();
                let source = err.into_inner();
                let path = if path.is_empty() {
                    "<root>"
                } else {
                    path.as_str()
                };
                return Err(FhirError::Translation(format!(
                    "Bundle schema mismatch at {path}: {source}"
                )));
            }
        };

        if bundle.resource_type != "Bundle" {
            return Err(FhirError::InvalidInput(format!(
                "Expected resourceType 'Bundle', got '{}'",
                bundle.resource_type
            )));
        }

        Ok(bundle)
    }
}

// ============================================================================
// Classified resource set
// ============================================================================

/// The typed resources of a death-record bundle, keyed by resource kind.
///
/// The decedent is the first `Patient` resource and the certifier the first
/// `Practitioner`; condition and observation resources keep their document
/// order. Resources of any other kind are skipped.
#[derive(Clone, Debug, Default)]
pub struct ResourceSet {
    pub decedent: Option<PatientWire>,
    pub certifier: Option<PractitionerWire>,
    pub conditions: Vec<ConditionWire>,
    pub observations: Vec<ObservationWire>,
}

impl ResourceSet {
    /// Classify the entries of a bundle by declared resource kind.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::Translation`] when a recognised resource kind
    /// fails to deserialise into its wire struct. Unknown resource kinds
    /// and empty entries are skipped, never errors.
    pub fn classify(bundle: &DeathRecordBundle) -> FhirResult<Self> {
        let mut set = ResourceSet::default();

        for (index, entry) in bundle.entry.iter().enumerate() {
            let Some(resource) = &entry.resource else {
                tracing::warn!(index, "bundle entry without a resource, skipping");
                continue;
            };

            let kind = resource
                .get("resourceType")
                .and_then(|v| v.as_str())
                .unwrap_or_default();

            match kind {
                "Patient" => {
                    let patient: PatientWire = typed_resource(resource, index, kind)?;
                    if set.decedent.is_none() {
                        set.decedent = Some(patient);
                    }
                }
                "Practitioner" => {
                    let practitioner: PractitionerWire = typed_resource(resource, index, kind)?;
                    if set.certifier.is_none() {
                        set.certifier = Some(practitioner);
                    }
                }
                "Condition" => set.conditions.push(typed_resource(resource, index, kind)?),
                "Observation" => set.observations.push(typed_resource(resource, index, kind)?),
                other => {
                    tracing::warn!(index, kind = other, "unrecognised resource kind, skipping");
                }
            }
        }

        Ok(set)
    }
}

fn typed_resource<T: serde::de::DeserializeOwned>(
    resource: &serde_json::Value,
    index: usize,
    kind: &str,
) -> FhirResult<T> {
    serde_path_to_error::deserialize(resource.clone()).map_err(|err| {
        let path = err.path().to_string();
        FhirError::Translation(format!(
            "{kind} resource at entry {index}: schema mismatch at {path}: {}",
            err.into_inner()
        ))
    })
}

// ============================================================================
// Resource wire structs
// ============================================================================

/// Wire representation of the decedent `Patient` resource.
#[derive(Clone, Debug, Deserialize)]
pub struct PatientWire {
    #[serde(default)]
    pub name: Vec<HumanNameWire>,

    #[serde(rename = "birthDate", default)]
    pub birth_date: Option<String>,

    #[serde(rename = "deceasedDateTime", default)]
    pub deceased_date_time: Option<String>,

    #[serde(default)]
    pub address: Vec<AddressWire>,

    #[serde(default)]
    pub extension: Vec<ExtensionWire>,
}

/// Wire representation of the certifier `Practitioner` resource.
#[derive(Clone, Debug, Deserialize)]
pub struct PractitionerWire {
    #[serde(default)]
    pub name: Vec<HumanNameWire>,

    #[serde(default)]
    pub address: Vec<AddressWire>,

    #[serde(default)]
    pub extension: Vec<ExtensionWire>,
}

/// Wire representation of a cause-of-death `Condition` resource.
#[derive(Clone, Debug, Deserialize)]
pub struct ConditionWire {
    #[serde(default)]
    pub text: Option<NarrativeWire>,

    #[serde(rename = "onsetString", default)]
    pub onset_string: Option<String>,
}

/// Wire representation of an `Observation` resource.
#[derive(Clone, Debug, Deserialize)]
pub struct ObservationWire {
    #[serde(default)]
    pub code: Option<CodeableConceptWire>,

    #[serde(rename = "valueBoolean", default)]
    pub value_boolean: Option<bool>,

    #[serde(rename = "valueDateTime", default)]
    pub value_date_time: Option<String>,

    #[serde(rename = "valueString", default)]
    pub value_string: Option<String>,

    #[serde(rename = "valueCodeableConcept", default)]
    pub value_codeable_concept: Option<CodeableConceptWire>,
}

impl ObservationWire {
    /// The observation's classification code: the code of the first coding
    /// entry under `code`.
    pub fn classification_code(&self) -> Option<&str> {
        self.code.as_ref().and_then(CodeableConceptWire::first_code)
    }
}

/// Wire representation of a human name.
///
/// `family` accepts both the scalar and the array wire forms; older
/// producers emitted family names as arrays.
#[derive(Clone, Debug, Deserialize)]
pub struct HumanNameWire {
    #[serde(default)]
    pub given: Vec<String>,

    #[serde(default)]
    pub family: Option<FamilyNameWire>,

    #[serde(default)]
    pub suffix: Vec<String>,
}

/// Scalar-or-array wire form of a family name.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum FamilyNameWire {
    One(String),
    Many(Vec<String>),
}

impl FamilyNameWire {
    /// All family names joined with a single space; `None` when empty.
    pub fn joined(&self) -> Option<String> {
        let joined = match self {
            FamilyNameWire::One(name) => name.clone(),
            FamilyNameWire::Many(names) => names.join(" "),
        };
        if joined.trim().is_empty() {
            None
        } else {
            Some(joined)
        }
    }
}

/// Wire representation of an address.
#[derive(Clone, Debug, Deserialize)]
pub struct AddressWire {
    #[serde(default)]
    pub line: Vec<String>,

    #[serde(default)]
    pub city: Option<String>,

    #[serde(default)]
    pub state: Option<String>,

    #[serde(rename = "postalCode", default)]
    pub postal_code: Option<String>,
}

/// Wire representation of an extension block.
///
/// Extensions are an unordered set of (url, value) pairs and may nest.
#[derive(Clone, Debug, Deserialize)]
pub struct ExtensionWire {
    pub url: String,

    #[serde(rename = "valueCodeableConcept", default)]
    pub value_codeable_concept: Option<CodeableConceptWire>,

    #[serde(rename = "valueCoding", default)]
    pub value_coding: Option<CodingWire>,

    #[serde(rename = "valueCode", default)]
    pub value_code: Option<String>,

    #[serde(rename = "valueString", default)]
    pub value_string: Option<String>,

    #[serde(rename = "valueBoolean", default)]
    pub value_boolean: Option<bool>,

    #[serde(rename = "valueAddress", default)]
    pub value_address: Option<AddressWire>,

    #[serde(default)]
    pub extension: Vec<ExtensionWire>,
}

/// Wire representation of a codeable concept.
#[derive(Clone, Debug, Deserialize)]
pub struct CodeableConceptWire {
    #[serde(default)]
    pub coding: Vec<CodingWire>,

    #[serde(default)]
    pub text: Option<String>,
}

impl CodeableConceptWire {
    /// Code of the first coding entry, if any.
    pub fn first_code(&self) -> Option<&str> {
        self.coding.first().and_then(|c| c.code.as_deref())
    }

    /// Display of the first coding entry, if any.
    pub fn first_display(&self) -> Option<&str> {
        self.coding.first().and_then(|c| c.display.as_deref())
    }
}

/// Wire representation of a single coding.
#[derive(Clone, Debug, Deserialize)]
pub struct CodingWire {
    #[serde(default)]
    pub system: Option<String>,

    #[serde(default)]
    pub code: Option<String>,

    #[serde(default)]
    pub display: Option<String>,
}

/// Wire representation of a narrative block.
#[derive(Clone, Debug, Deserialize)]
pub struct NarrativeWire {
    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub div: Option<String>,
}
