//! Observation extraction: dispatch on the classification code.
//!
//! Eleven observation kinds are recognised; each owns its parse logic.
//! An observation whose code matches none of them is skipped, which keeps
//! ingest forward-compatible with observation kinds this registry does
//! not yet consume. A recognised observation missing the value attribute
//! its kind requires is a structural mismatch and aborts the ingest.

use super::{put, yes_no};
use crate::codes::CodeTables;
use crate::datetime::split_datetime;
use crate::wire::ObservationWire;
use crate::{FhirError, FhirResult, FlatContents};

/// Actual or presumed date of death.
const CODE_DATE_OF_DEATH: &str = "81956-5";
/// Autopsy results available to complete the cause of death.
const CODE_AUTOPSY_RESULTS_AVAILABLE: &str = "85699-7";
/// Autopsy performed.
const CODE_AUTOPSY_PERFORMED: &str = "69436-4";
/// Date pronounced dead.
const CODE_DATE_PRONOUNCED_DEAD: &str = "80616-6";
/// Death resulted from injury at work.
const CODE_INJURY_AT_WORK: &str = "69444-8";
/// Injury leading to death associated with transportation event.
const CODE_TRANSPORT_INJURY: &str = "69448-9";
/// Details of injury.
const CODE_DETAILS_OF_INJURY: &str = "11374-6";
/// Manner of death.
const CODE_MANNER_OF_DEATH: &str = "69449-7";
/// Medical examiner or coroner contacted.
const CODE_EXAMINER_CONTACTED: &str = "74497-9";
/// Timing of recent pregnancy in relation to death.
const CODE_PREGNANCY_TIMING: &str = "69442-2";
/// Tobacco use contributed to death.
const CODE_TOBACCO_USE: &str = "69443-0";

/// Extract one observation into a flat fragment.
///
/// Returns `Ok(None)` when the observation's classification code is not
/// one of the eleven recognised kinds.
pub fn extract(
    observation: &ObservationWire,
    tables: &CodeTables,
) -> FhirResult<Option<FlatContents>> {
    let Some(code) = observation.classification_code() else {
        tracing::warn!("observation without a classification code, skipping");
        return Ok(None);
    };

    let fragment = match code {
        CODE_DATE_OF_DEATH => date_pair(observation, code, "dateOfDeath.dateOfDeath", "timeOfDeath.timeOfDeath")?,
        CODE_AUTOPSY_RESULTS_AVAILABLE => boolean(
            observation,
            code,
            "autopsyAvailableToCompleteCauseOfDeath.autopsyAvailableToCompleteCauseOfDeath",
        )?,
        CODE_AUTOPSY_PERFORMED => boolean(observation, code, "autopsyPerformed.autopsyPerformed")?,
        CODE_DATE_PRONOUNCED_DEAD => date_pair(
            observation,
            code,
            "datePronouncedDead.datePronouncedDead",
            "timePronouncedDead.timePronouncedDead",
        )?,
        CODE_INJURY_AT_WORK => boolean(
            observation,
            code,
            "deathResultedFromInjuryAtWork.deathResultedFromInjuryAtWork",
        )?,
        CODE_TRANSPORT_INJURY => transport_injury(observation, tables)?,
        CODE_DETAILS_OF_INJURY => free_text(observation, code, "detailsOfInjury.detailsOfInjury")?,
        CODE_MANNER_OF_DEATH => coded(observation, code, "mannerOfDeath.mannerOfDeath", |c| {
            tables.manner_of_death_display(c)
        })?,
        CODE_EXAMINER_CONTACTED => boolean(
            observation,
            code,
            "meOrCoronerContacted.meOrCoronerContacted",
        )?,
        CODE_PREGNANCY_TIMING => coded(observation, code, "pregnancyStatus.pregnancyStatus", |c| {
            tables.pregnancy_status_display(c)
        })?,
        CODE_TOBACCO_USE => coded(
            observation,
            code,
            "didTobaccoUseContributeToDeath.didTobaccoUseContributeToDeath",
            |c| tables.tobacco_use_display(c),
        )?,
        other => {
            tracing::warn!(code = other, "unrecognised observation kind, skipping");
            return Ok(None);
        }
    };

    Ok(Some(fragment))
}

fn boolean(observation: &ObservationWire, code: &str, key: &str) -> FhirResult<FlatContents> {
    let value = observation.value_boolean.ok_or_else(|| {
        FhirError::StructuralMismatch(format!("observation {code} has no valueBoolean"))
    })?;
    let mut fragment = FlatContents::new();
    put(&mut fragment, key, yes_no(value));
    Ok(fragment)
}

fn date_pair(
    observation: &ObservationWire,
    code: &str,
    date_key: &str,
    time_key: &str,
) -> FhirResult<FlatContents> {
    let value = observation.value_date_time.as_deref().ok_or_else(|| {
        FhirError::StructuralMismatch(format!("observation {code} has no valueDateTime"))
    })?;
    let split = split_datetime(value)?;
    let mut fragment = FlatContents::new();
    put(&mut fragment, date_key, split.date);
    put(&mut fragment, time_key, split.time);
    Ok(fragment)
}

fn free_text(observation: &ObservationWire, code: &str, key: &str) -> FhirResult<FlatContents> {
    let value = observation.value_string.as_deref().ok_or_else(|| {
        FhirError::StructuralMismatch(format!("observation {code} has no valueString"))
    })?;
    let mut fragment = FlatContents::new();
    put(&mut fragment, key, value);
    Ok(fragment)
}

fn coded(
    observation: &ObservationWire,
    code: &str,
    key: &str,
    lookup: impl Fn(&str) -> Option<&'static str>,
) -> FhirResult<FlatContents> {
    let coded = observation
        .value_codeable_concept
        .as_ref()
        .and_then(|concept| concept.first_code())
        .ok_or_else(|| {
            FhirError::StructuralMismatch(format!(
                "observation {code} has no coded valueCodeableConcept"
            ))
        })?;

    let mut fragment = FlatContents::new();
    match lookup(coded) {
        Some(display) => put(&mut fragment, key, display),
        None => tracing::warn!(code, value = coded, "unmapped observation value, omitting"),
    }
    Ok(fragment)
}

/// Transport-injury role: the lookup direction is reversed relative to
/// the other coded observations (internal display -> external code).
fn transport_injury(
    observation: &ObservationWire,
    tables: &CodeTables,
) -> FhirResult<FlatContents> {
    let coded = observation
        .value_codeable_concept
        .as_ref()
        .and_then(|concept| concept.first_code())
        .ok_or_else(|| {
            FhirError::StructuralMismatch(format!(
                "observation {CODE_TRANSPORT_INJURY} has no coded valueCodeableConcept"
            ))
        })?;

    let mut fragment = FlatContents::new();
    match tables.transport_injury_code(coded) {
        Some(code) => put(&mut fragment, "ifTransInjury.ifTransInjury", code),
        None => tracing::warn!(
            value = coded,
            "unmapped transport-injury role, omitting"
        ),
    }
    Ok(fragment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn observation(json: &str) -> ObservationWire {
        serde_json::from_str(json).expect("valid observation wire JSON")
    }

    fn text(fragment: &FlatContents, key: &str) -> Option<String> {
        fragment.get(key).and_then(Value::as_str).map(str::to_string)
    }

    #[test]
    fn manner_of_death_scenario_suicide() {
        let wire = observation(
            r#"{"code": {"coding": [{"code": "69449-7"}]},
                "valueCodeableConcept": {"coding": [{"code": "44301001"}]}}"#,
        );
        let fragment = extract(&wire, &CodeTables::new())
            .expect("extract observation")
            .expect("recognised kind");
        assert_eq!(
            text(&fragment, "mannerOfDeath.mannerOfDeath").as_deref(),
            Some("Suicide")
        );
    }

    #[test]
    fn autopsy_results_available_maps_boolean() {
        let wire = observation(
            r#"{"code": {"coding": [{"code": "85699-7"}]}, "valueBoolean": true}"#,
        );
        let fragment = extract(&wire, &CodeTables::new())
            .expect("extract observation")
            .expect("recognised kind");
        assert_eq!(
            text(
                &fragment,
                "autopsyAvailableToCompleteCauseOfDeath.autopsyAvailableToCompleteCauseOfDeath"
            )
            .as_deref(),
            Some("Yes")
        );
    }

    #[test]
    fn autopsy_performed_maps_boolean() {
        let wire = observation(
            r#"{"code": {"coding": [{"code": "69436-4"}]}, "valueBoolean": false}"#,
        );
        let fragment = extract(&wire, &CodeTables::new())
            .expect("extract observation")
            .expect("recognised kind");
        assert_eq!(
            text(&fragment, "autopsyPerformed.autopsyPerformed").as_deref(),
            Some("No")
        );
    }

    #[test]
    fn date_pronounced_dead_splits_datetime() {
        let wire = observation(
            r#"{"code": {"coding": [{"code": "80616-6"}]},
                "valueDateTime": "2018-03-10T13:05:00+00:00"}"#,
        );
        let fragment = extract(&wire, &CodeTables::new())
            .expect("extract observation")
            .expect("recognised kind");
        assert_eq!(
            text(&fragment, "datePronouncedDead.datePronouncedDead").as_deref(),
            Some("2018-03-10")
        );
        assert_eq!(
            text(&fragment, "timePronouncedDead.timePronouncedDead").as_deref(),
            Some("13:05")
        );
    }

    #[test]
    fn missing_value_boolean_is_structural_mismatch() {
        let wire = observation(r#"{"code": {"coding": [{"code": "85699-7"}]}}"#);
        let err = extract(&wire, &CodeTables::new()).expect_err("should require valueBoolean");
        match err {
            FhirError::StructuralMismatch(msg) => assert!(msg.contains("85699-7")),
            other => panic!("expected StructuralMismatch error, got {other:?}"),
        }
    }

    #[test]
    fn unparseable_value_date_time_is_fatal() {
        let wire = observation(
            r#"{"code": {"coding": [{"code": "81956-5"}]}, "valueDateTime": "whenever"}"#,
        );
        let err = extract(&wire, &CodeTables::new()).expect_err("should reject bad datetime");
        assert!(matches!(err, FhirError::InvalidDateTime(_)));
    }

    #[test]
    fn transport_injury_stores_external_code() {
        let wire = observation(
            r#"{"code": {"coding": [{"code": "69448-9"}]},
                "valueCodeableConcept": {"coding": [{"code": "Passenger"}]}}"#,
        );
        let fragment = extract(&wire, &CodeTables::new())
            .expect("extract observation")
            .expect("recognised kind");
        assert_eq!(
            text(&fragment, "ifTransInjury.ifTransInjury").as_deref(),
            Some("257500003")
        );
    }

    #[test]
    fn unmapped_code_omits_field_without_error() {
        let wire = observation(
            r#"{"code": {"coding": [{"code": "69443-0"}]},
                "valueCodeableConcept": {"coding": [{"code": "no-such-code"}]}}"#,
        );
        let fragment = extract(&wire, &CodeTables::new())
            .expect("extract observation")
            .expect("recognised kind");
        assert!(fragment.is_empty());
    }

    #[test]
    fn unknown_observation_kind_is_ignored() {
        let wire = observation(
            r#"{"code": {"coding": [{"code": "00000-0"}]}, "valueBoolean": true}"#,
        );
        let result = extract(&wire, &CodeTables::new()).expect("extract observation");
        assert!(result.is_none());
    }

    #[test]
    fn details_of_injury_passes_text_through() {
        let wire = observation(
            r#"{"code": {"coding": [{"code": "11374-6"}]},
                "valueString": "Fell from ladder while painting"}"#,
        );
        let fragment = extract(&wire, &CodeTables::new())
            .expect("extract observation")
            .expect("recognised kind");
        assert_eq!(
            text(&fragment, "detailsOfInjury.detailsOfInjury").as_deref(),
            Some("Fell from ladder while painting")
        );
    }

    #[test]
    fn pregnancy_not_applicable_uses_aliased_display() {
        let wire = observation(
            r#"{"code": {"coding": [{"code": "69442-2"}]},
                "valueCodeableConcept": {"coding": [{"code": "N/A"}]}}"#,
        );
        let fragment = extract(&wire, &CodeTables::new())
            .expect("extract observation")
            .expect("recognised kind");
        assert_eq!(
            text(&fragment, "pregnancyStatus.pregnancyStatus").as_deref(),
            Some("Not pregnant within past year")
        );
    }
}
