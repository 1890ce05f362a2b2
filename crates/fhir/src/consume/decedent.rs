//! Decedent (`Patient` resource) extraction.

use super::{address_fields, name_fields, put, put_trimmed, yes_no};
use crate::codes::CodeTables;
use crate::datetime::split_datetime;
use crate::wire::{ExtensionWire, PatientWire};
use crate::{FhirResult, FlatContents};

const URL_RACE: &str = "http://hl7.org/fhir/us/core/StructureDefinition/us-core-race";
const URL_ETHNICITY: &str = "http://hl7.org/fhir/us/core/StructureDefinition/us-core-ethnicity";
const URL_BIRTH_SEX: &str = "http://hl7.org/fhir/us/core/StructureDefinition/us-core-birthsex";
const URL_BIRTH_PLACE: &str = "http://hl7.org/fhir/StructureDefinition/birthPlace";
const URL_MOTHERS_MAIDEN_NAME: &str =
    "http://hl7.org/fhir/StructureDefinition/patient-mothersMaidenName";

const SDR: &str = "http://nightingaleproject.github.io/fhirDeathRecord/StructureDefinition";
const URL_SERVED_IN_ARMED_FORCES: &str =
    "http://nightingaleproject.github.io/fhirDeathRecord/StructureDefinition/sdr-decedent-ServedInArmedForces-extension";
const URL_PLACE_OF_DEATH: &str =
    "http://nightingaleproject.github.io/fhirDeathRecord/StructureDefinition/sdr-decedent-PlaceOfDeath-extension";
const URL_DISPOSITION: &str =
    "http://nightingaleproject.github.io/fhirDeathRecord/StructureDefinition/sdr-decedent-Disposition-extension";
const URL_EDUCATION: &str =
    "http://nightingaleproject.github.io/fhirDeathRecord/StructureDefinition/sdr-decedent-Education-extension";
const URL_OCCUPATION: &str =
    "http://nightingaleproject.github.io/fhirDeathRecord/StructureDefinition/sdr-decedent-Occupation-extension";

const URL_SHR_ADDRESS: &str =
    "http://nightingaleproject.github.io/fhirDeathRecord/StructureDefinition/shr-core-Address-extension";
const URL_FACILITY_NAME: &str =
    "http://nightingaleproject.github.io/fhirDeathRecord/StructureDefinition/sdr-decedent-FacilityName-extension";
const URL_PLACE_OF_DEATH_TYPE: &str =
    "http://nightingaleproject.github.io/fhirDeathRecord/StructureDefinition/sdr-decedent-PlaceOfDeathType-extension";
const URL_DISPOSITION_TYPE: &str =
    "http://nightingaleproject.github.io/fhirDeathRecord/StructureDefinition/sdr-decedent-DispositionType-extension";
const URL_DISPOSITION_FACILITY: &str =
    "http://nightingaleproject.github.io/fhirDeathRecord/StructureDefinition/sdr-decedent-DispositionFacility-extension";
const URL_FUNERAL_FACILITY: &str =
    "http://nightingaleproject.github.io/fhirDeathRecord/StructureDefinition/sdr-decedent-FuneralFacility-extension";
const URL_JOB: &str =
    "http://nightingaleproject.github.io/fhirDeathRecord/StructureDefinition/sdr-decedent-Job-extension";
const URL_INDUSTRY: &str =
    "http://nightingaleproject.github.io/fhirDeathRecord/StructureDefinition/sdr-decedent-Industry-extension";

/// Extract decedent fields into a flat fragment.
///
/// # Errors
///
/// Returns [`crate::FhirError::InvalidDateTime`] if `deceasedDateTime` is
/// present but unparseable. Everything else is optional: absent or
/// unrecognised values omit their fields.
pub fn extract(patient: &PatientWire, tables: &CodeTables) -> FhirResult<FlatContents> {
    let mut fragment = FlatContents::new();

    if let Some(name) = patient.name.first() {
        name_fields(&mut fragment, "decedentName", name);
    }

    if let Some(birth_date) = &patient.birth_date {
        put(&mut fragment, "dateOfBirth.dateOfBirth", birth_date.clone());
    }

    if let Some(deceased) = &patient.deceased_date_time {
        let split = split_datetime(deceased)?;
        put(&mut fragment, "dateOfDeath.dateOfDeath", split.date);
        put(&mut fragment, "timeOfDeath.timeOfDeath", split.time);
    }

    if let Some(address) = patient.address.first() {
        address_fields(&mut fragment, "decedentAddress", address);
    }

    // Extensions are an unordered set; each is mapped independently.
    for extension in &patient.extension {
        match extension.url.as_str() {
            URL_RACE => race(&mut fragment, extension, tables),
            URL_ETHNICITY => ethnicity(&mut fragment, extension),
            URL_BIRTH_SEX => birth_sex(&mut fragment, extension),
            URL_BIRTH_PLACE => birth_place(&mut fragment, extension),
            URL_SERVED_IN_ARMED_FORCES => {
                if let Some(served) = extension.value_boolean {
                    put(
                        &mut fragment,
                        "armedForcesService.armedForcesService",
                        yes_no(served),
                    );
                }
            }
            URL_PLACE_OF_DEATH => place_of_death(&mut fragment, extension),
            URL_DISPOSITION => disposition(&mut fragment, extension),
            URL_EDUCATION => {
                let code = extension
                    .value_codeable_concept
                    .as_ref()
                    .and_then(|concept| concept.first_code());
                if let Some(code) = code {
                    put(&mut fragment, "education.education", code);
                }
            }
            URL_OCCUPATION => occupation(&mut fragment, extension),
            URL_MOTHERS_MAIDEN_NAME => {
                if let Some(maiden) = &extension.value_string {
                    put(&mut fragment, "motherName.lastName", maiden.clone());
                }
            }
            url if url.starts_with(SDR) => {
                tracing::warn!(url, "unconsumed decedent extension, skipping");
            }
            _ => {}
        }
    }

    Ok(fragment)
}

/// Collect every coded race entry matching a known category code.
///
/// The specify field is a JSON-encoded array of display names alongside
/// the "Known" option marker; both are omitted when no code matches.
fn race(fragment: &mut FlatContents, extension: &ExtensionWire, tables: &CodeTables) {
    let Some(concept) = &extension.value_codeable_concept else {
        return;
    };

    let mut displays = Vec::new();
    for coding in &concept.coding {
        if let Some(display) = coding.code.as_deref().and_then(|c| tables.race_display(c)) {
            displays.push(display);
        }
    }

    if !displays.is_empty() {
        put(fragment, "race.race.option", "Known");
        let encoded = serde_json::to_string(&displays).unwrap_or_default();
        put(fragment, "race.race.specify", encoded);
    }
}

/// Binary ethnicity: only the exact display "Hispanic or Latino" sets the
/// origin to Yes.
fn ethnicity(fragment: &mut FlatContents, extension: &ExtensionWire) {
    let display = extension
        .value_codeable_concept
        .as_ref()
        .and_then(|concept| concept.first_display());
    if display == Some("Hispanic or Latino") {
        put(fragment, "hispanicOrigin.hispanicOrigin", "Yes");
        put(fragment, "hispanicOrigin.specify", "Hispanic or Latino");
    } else {
        put(fragment, "hispanicOrigin.hispanicOrigin", "No");
    }
}

fn birth_sex(fragment: &mut FlatContents, extension: &ExtensionWire) {
    let sex = match extension.value_code.as_deref() {
        Some("M") => Some("Male"),
        Some("F") => Some("Female"),
        Some("U") => Some("Unknown"),
        _ => None,
    };
    if let Some(sex) = sex {
        put(fragment, "sex.sex", sex);
    }
}

fn birth_place(fragment: &mut FlatContents, extension: &ExtensionWire) {
    let Some(address) = &extension.value_address else {
        return;
    };
    if let Some(city) = &address.city {
        put(fragment, "placeOfBirth.city", city.clone());
    }
    if let Some(state) = &address.state {
        put(fragment, "placeOfBirth.state", state.clone());
    }
    if let Some(zip) = &address.postal_code {
        put(fragment, "placeOfBirth.zip", zip.clone());
    }
}

fn place_of_death(fragment: &mut FlatContents, extension: &ExtensionWire) {
    for sub in &extension.extension {
        match sub.url.as_str() {
            URL_SHR_ADDRESS => {
                if let Some(address) = &sub.value_address {
                    put_trimmed(fragment, "locationOfDeath.city", address.city.as_deref());
                    put_trimmed(fragment, "locationOfDeath.state", address.state.as_deref());
                    put_trimmed(fragment, "locationOfDeath.zip", address.postal_code.as_deref());
                }
            }
            URL_FACILITY_NAME => {
                if let Some(name) = &sub.value_string {
                    put(fragment, "locationOfDeath.name", name.clone());
                }
            }
            URL_PLACE_OF_DEATH_TYPE => {
                let display = sub
                    .value_codeable_concept
                    .as_ref()
                    .and_then(|concept| concept.first_display());
                if let Some(display) = display {
                    put(fragment, "placeOfDeath.placeOfDeath", display);
                }
            }
            _ => {}
        }
    }
}

fn disposition(fragment: &mut FlatContents, extension: &ExtensionWire) {
    for sub in &extension.extension {
        match sub.url.as_str() {
            URL_DISPOSITION_TYPE => {
                let display = sub
                    .value_codeable_concept
                    .as_ref()
                    .and_then(|concept| concept.first_display());
                if let Some(display) = display {
                    put(fragment, "methodOfDisposition.methodOfDisposition", display);
                }
            }
            URL_DISPOSITION_FACILITY => facility(fragment, sub, "placeOfDisposition"),
            URL_FUNERAL_FACILITY => facility(fragment, sub, "funeralFacility"),
            _ => {}
        }
    }
}

fn facility(fragment: &mut FlatContents, extension: &ExtensionWire, prefix: &str) {
    for sub in &extension.extension {
        match sub.url.as_str() {
            URL_FACILITY_NAME => {
                if let Some(name) = &sub.value_string {
                    put(fragment, &format!("{prefix}.name"), name.clone());
                }
            }
            URL_SHR_ADDRESS => {
                if let Some(address) = &sub.value_address {
                    put_trimmed(fragment, &format!("{prefix}.city"), address.city.as_deref());
                    put_trimmed(fragment, &format!("{prefix}.state"), address.state.as_deref());
                    put_trimmed(fragment, &format!("{prefix}.zip"), address.postal_code.as_deref());
                }
            }
            _ => {}
        }
    }
}

fn occupation(fragment: &mut FlatContents, extension: &ExtensionWire) {
    for sub in &extension.extension {
        match sub.url.as_str() {
            URL_JOB => {
                if let Some(job) = &sub.value_string {
                    put(fragment, "usualOccupation.usualOccupation", job.clone());
                }
            }
            URL_INDUSTRY => {
                if let Some(industry) = &sub.value_string {
                    put(fragment, "kindOfBusiness.kindOfBusiness", industry.clone());
                }
            }
            _ => {}
        }
    }
}
