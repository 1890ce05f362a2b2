//! Ingest mapper: death-record resource graph -> flat dotted record.
//!
//! Each resource kind has its own typed extraction function returning a
//! partial record fragment; [`from_fhir`] classifies the bundle's
//! resources, runs the extractions and combines the fragments with an
//! explicit, order-independent merge. Two fragments may agree on a key
//! (the date of death legitimately appears both on the decedent resource
//! and on the actual-or-presumed-date observation); disagreement is a
//! conflict, never a silent overwrite.

mod certifier;
mod conditions;
mod decedent;
mod observations;

use crate::codes::CodeTables;
use crate::wire::{AddressWire, DeathRecordBundle, HumanNameWire, ResourceSet};
use crate::{FhirError, FhirResult, FlatContents};

/// Translate a death-record bundle into the registry's flat record form.
///
/// # Errors
///
/// Returns [`FhirError::StructuralMismatch`] when the bundle lacks a
/// decedent (`Patient`) or certifier (`Practitioner`) resource, or when an
/// observation recognised by its classification code lacks the value
/// attribute that kind requires; [`FhirError::InvalidDateTime`] when a
/// date/time value fails to parse. Unknown codes and unknown observation
/// kinds are omissions, not errors.
pub fn from_fhir(bundle: &DeathRecordBundle, tables: &CodeTables) -> FhirResult<FlatContents> {
    let resources = ResourceSet::classify(bundle)?;

    let decedent = resources.decedent.as_ref().ok_or_else(|| {
        FhirError::StructuralMismatch("bundle has no Patient (decedent) resource".to_string())
    })?;
    let certifier = resources.certifier.as_ref().ok_or_else(|| {
        FhirError::StructuralMismatch("bundle has no Practitioner (certifier) resource".to_string())
    })?;

    let mut fragments = vec![
        decedent::extract(decedent, tables)?,
        certifier::extract(certifier, tables),
        conditions::extract(&resources.conditions),
    ];

    for observation in &resources.observations {
        if let Some(fragment) = observations::extract(observation, tables)? {
            fragments.push(fragment);
        }
    }

    merge_fragments(fragments)
}

/// First and last name of the certifier, used to locate the practitioner
/// who should own the record once it has been consumed.
pub fn certifier_name(
    bundle: &DeathRecordBundle,
    tables: &CodeTables,
) -> FhirResult<(Option<String>, Option<String>)> {
    let resources = ResourceSet::classify(bundle)?;
    let certifier = resources.certifier.as_ref().ok_or_else(|| {
        FhirError::StructuralMismatch("bundle has no Practitioner (certifier) resource".to_string())
    })?;

    let fragment = certifier::extract(certifier, tables);
    let field = |key: &str| {
        fragment
            .get(key)
            .and_then(|v| v.as_str())
            .map(str::to_string)
    };
    Ok((
        field("personCompletingCauseOfDeathName.firstName"),
        field("personCompletingCauseOfDeathName.lastName"),
    ))
}

/// Combine extraction fragments into a single flat record.
///
/// Order-independent: the same fragments in any order produce the same
/// result or the same error. Re-assigning a key to an equal value is
/// tolerated; assigning a different value fails with
/// [`FhirError::MergeConflict`].
pub fn merge_fragments(
    fragments: impl IntoIterator<Item = FlatContents>,
) -> FhirResult<FlatContents> {
    let mut merged = FlatContents::new();
    for fragment in fragments {
        for (key, value) in fragment {
            match merged.get(&key) {
                None => {
                    merged.insert(key, value);
                }
                Some(existing) if *existing == value => {}
                Some(existing) => {
                    return Err(FhirError::MergeConflict {
                        existing: existing.to_string(),
                        incoming: value.to_string(),
                        key,
                    });
                }
            }
        }
    }
    Ok(merged)
}

// ============================================================================
// Shared extraction helpers
// ============================================================================

pub(crate) fn put(fragment: &mut FlatContents, key: &str, value: impl Into<String>) {
    fragment.insert(key.to_string(), serde_json::Value::String(value.into()));
}

pub(crate) fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

/// Extract name parts under `<prefix>.firstName` / `middleName` /
/// `lastName` / `suffix`.
///
/// The first given name is the first name; all remaining given names join
/// into the middle name (omitted when blank); family names join into the
/// last name; suffixes join into the suffix (omitted when blank).
pub(crate) fn name_fields(fragment: &mut FlatContents, prefix: &str, name: &HumanNameWire) {
    if let Some(first) = name.given.first() {
        if !first.trim().is_empty() {
            put(fragment, &format!("{prefix}.firstName"), first.clone());
        }
    }
    let middle = name.given.iter().skip(1).cloned().collect::<Vec<_>>().join(" ");
    if !middle.trim().is_empty() {
        put(fragment, &format!("{prefix}.middleName"), middle);
    }
    if let Some(last) = name.family.as_ref().and_then(|f| f.joined()) {
        put(fragment, &format!("{prefix}.lastName"), last);
    }
    let suffix = name.suffix.join(" ");
    if !suffix.trim().is_empty() {
        put(fragment, &format!("{prefix}.suffix"), suffix);
    }
}

/// Extract address parts under `<prefix>.street` / `city` / `state` /
/// `zip`.
///
/// The street is the first address line; city, state and zip are each
/// independently trimmed and omitted when blank.
pub(crate) fn address_fields(fragment: &mut FlatContents, prefix: &str, address: &AddressWire) {
    if let Some(street) = address.line.first() {
        if !street.trim().is_empty() {
            put(fragment, &format!("{prefix}.street"), street.clone());
        }
    }
    put_trimmed(fragment, &format!("{prefix}.city"), address.city.as_deref());
    put_trimmed(fragment, &format!("{prefix}.state"), address.state.as_deref());
    put_trimmed(fragment, &format!("{prefix}.zip"), address.postal_code.as_deref());
}

pub(crate) fn put_trimmed(fragment: &mut FlatContents, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            put(fragment, key, trimmed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn fragment_of(pairs: &[(&str, &str)]) -> FlatContents {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect()
    }

    #[test]
    fn merge_is_order_independent() {
        let a = fragment_of(&[("x.y", "1")]);
        let b = fragment_of(&[("z.w", "2")]);

        let forward = merge_fragments([a.clone(), b.clone()]).expect("merge forward");
        let backward = merge_fragments([b, a]).expect("merge backward");
        assert_eq!(forward, backward);
    }

    #[test]
    fn merge_tolerates_equal_reassignment() {
        let a = fragment_of(&[("dateOfDeath.dateOfDeath", "2018-03-10")]);
        let b = fragment_of(&[("dateOfDeath.dateOfDeath", "2018-03-10")]);

        let merged = merge_fragments([a, b]).expect("equal values should merge");
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn merge_rejects_disagreement() {
        let a = fragment_of(&[("dateOfDeath.dateOfDeath", "2018-03-10")]);
        let b = fragment_of(&[("dateOfDeath.dateOfDeath", "2018-03-11")]);

        let err = merge_fragments([a, b]).expect_err("should reject conflicting values");
        match err {
            FhirError::MergeConflict { key, .. } => {
                assert_eq!(key, "dateOfDeath.dateOfDeath");
            }
            other => panic!("expected MergeConflict error, got {other:?}"),
        }
    }

    #[test]
    fn ingest_is_deterministic() {
        let input = r#"{
            "resourceType": "Bundle",
            "entry": [
                {"resource": {"resourceType": "Patient",
                              "name": [{"given": ["Jane", "Ann"], "family": "Doe"}],
                              "birthDate": "1931-04-04"}},
                {"resource": {"resourceType": "Practitioner",
                              "name": [{"given": ["Sam"], "family": "Reed"}]}},
                {"resource": {"resourceType": "Observation",
                              "code": {"coding": [{"code": "69449-7"}]},
                              "valueCodeableConcept": {"coding": [{"code": "38605008"}]}}}
            ]
        }"#;

        let tables = CodeTables::new();
        let bundle = DeathRecordBundle::parse(input).expect("parse bundle");
        let first = from_fhir(&bundle, &tables).expect("first ingest");
        let second = from_fhir(&bundle, &tables).expect("second ingest");

        let first_text = serde_json::to_string(&first).expect("serialize first");
        let second_text = serde_json::to_string(&second).expect("serialize second");
        assert_eq!(first_text, second_text);
    }

    #[test]
    fn missing_decedent_is_fatal() {
        let input = r#"{
            "resourceType": "Bundle",
            "entry": [{"resource": {"resourceType": "Practitioner"}}]
        }"#;

        let bundle = DeathRecordBundle::parse(input).expect("parse bundle");
        let err = from_fhir(&bundle, &CodeTables::new()).expect_err("should require decedent");
        match err {
            FhirError::StructuralMismatch(msg) => assert!(msg.contains("Patient")),
            other => panic!("expected StructuralMismatch error, got {other:?}"),
        }
    }

    #[test]
    fn missing_certifier_is_fatal() {
        let input = r#"{
            "resourceType": "Bundle",
            "entry": [{"resource": {"resourceType": "Patient"}}]
        }"#;

        let bundle = DeathRecordBundle::parse(input).expect("parse bundle");
        let err = from_fhir(&bundle, &CodeTables::new()).expect_err("should require certifier");
        match err {
            FhirError::StructuralMismatch(msg) => assert!(msg.contains("Practitioner")),
            other => panic!("expected StructuralMismatch error, got {other:?}"),
        }
    }

    #[test]
    fn scenario_jane_doe_with_autopsy_results_observation() {
        let input = r#"{
            "resourceType": "Bundle",
            "entry": [
                {"resource": {"resourceType": "Patient",
                              "name": [{"given": ["Jane"], "family": "Doe"}]}},
                {"resource": {"resourceType": "Practitioner"}},
                {"resource": {"resourceType": "Observation",
                              "code": {"coding": [{"code": "85699-7"}]},
                              "valueBoolean": true}}
            ]
        }"#;

        let bundle = DeathRecordBundle::parse(input).expect("parse bundle");
        let contents = from_fhir(&bundle, &CodeTables::new()).expect("ingest bundle");

        assert_eq!(
            contents.get("decedentName.firstName"),
            Some(&Value::String("Jane".to_string()))
        );
        assert_eq!(
            contents.get("decedentName.lastName"),
            Some(&Value::String("Doe".to_string()))
        );
        assert_eq!(
            contents.get("autopsyAvailableToCompleteCauseOfDeath.autopsyAvailableToCompleteCauseOfDeath"),
            Some(&Value::String("Yes".to_string()))
        );
    }

    #[test]
    fn certifier_name_reads_practitioner_fields() {
        let input = r#"{
            "resourceType": "Bundle",
            "entry": [
                {"resource": {"resourceType": "Patient"}},
                {"resource": {"resourceType": "Practitioner",
                              "name": [{"given": ["Sam", "Lee"], "family": "Reed"}]}}
            ]
        }"#;

        let bundle = DeathRecordBundle::parse(input).expect("parse bundle");
        let (first, last) =
            certifier_name(&bundle, &CodeTables::new()).expect("extract certifier name");
        assert_eq!(first.as_deref(), Some("Sam"));
        assert_eq!(last.as_deref(), Some("Reed"));
    }
}
