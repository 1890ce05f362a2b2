//! Certifier (`Practitioner` resource) extraction.

use super::{address_fields, name_fields, put};
use crate::codes::CodeTables;
use crate::wire::PractitionerWire;
use crate::FlatContents;

const URL_CERTIFIER_TYPE: &str =
    "https://github.com/nightingaleproject/fhir-death-record/StructureDefinition/certifier-type";

/// Extract certifier fields into a flat fragment.
///
/// Name and address follow the same pattern as the decedent. The
/// certifier type goes through the three-entry code table; an
/// unrecognised code omits the field entirely. Certifier
/// credential/qualification data is intentionally not consumed.
pub fn extract(practitioner: &PractitionerWire, tables: &CodeTables) -> FlatContents {
    let mut fragment = FlatContents::new();

    if let Some(name) = practitioner.name.first() {
        name_fields(&mut fragment, "personCompletingCauseOfDeathName", name);
    }

    if let Some(address) = practitioner.address.first() {
        address_fields(&mut fragment, "personCompletingCauseOfDeathAddress", address);
    }

    for extension in &practitioner.extension {
        if extension.url == URL_CERTIFIER_TYPE {
            let display = extension
                .value_coding
                .as_ref()
                .and_then(|coding| coding.code.as_deref())
                .and_then(|code| tables.certifier_type_display(code));
            if let Some(display) = display {
                put(&mut fragment, "certifierType.certifierType", display);
            }
        }
    }

    fragment
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn practitioner(json: &str) -> PractitionerWire {
        serde_json::from_str(json).expect("valid practitioner wire JSON")
    }

    fn text(fragment: &FlatContents, key: &str) -> Option<String> {
        fragment.get(key).and_then(Value::as_str).map(str::to_string)
    }

    #[test]
    fn extracts_name_and_address() {
        let wire = practitioner(
            r#"{"name": [{"given": ["Sam", "Lee"], "family": "Reed"}],
                "address": [{"line": ["9 Elm St"], "city": "Boston", "state": "MA", "postalCode": "02101"}]}"#,
        );
        let fragment = extract(&wire, &CodeTables::new());

        assert_eq!(
            text(&fragment, "personCompletingCauseOfDeathName.firstName").as_deref(),
            Some("Sam")
        );
        assert_eq!(
            text(&fragment, "personCompletingCauseOfDeathName.middleName").as_deref(),
            Some("Lee")
        );
        assert_eq!(
            text(&fragment, "personCompletingCauseOfDeathName.lastName").as_deref(),
            Some("Reed")
        );
        assert_eq!(
            text(&fragment, "personCompletingCauseOfDeathAddress.street").as_deref(),
            Some("9 Elm St")
        );
        assert_eq!(
            text(&fragment, "personCompletingCauseOfDeathAddress.zip").as_deref(),
            Some("02101")
        );
    }

    #[test]
    fn maps_certifier_type_code() {
        let wire = practitioner(
            r#"{"extension": [{
                "url": "https://github.com/nightingaleproject/fhir-death-record/StructureDefinition/certifier-type",
                "valueCoding": {"code": "440051000124108"}
            }]}"#,
        );
        let fragment = extract(&wire, &CodeTables::new());
        assert_eq!(
            text(&fragment, "certifierType.certifierType").as_deref(),
            Some("Medical Examiner/Coroner")
        );
    }

    #[test]
    fn unrecognised_certifier_type_omits_field() {
        let wire = practitioner(
            r#"{"extension": [{
                "url": "https://github.com/nightingaleproject/fhir-death-record/StructureDefinition/certifier-type",
                "valueCoding": {"code": "000000000000000"}
            }]}"#,
        );
        let fragment = extract(&wire, &CodeTables::new());
        assert!(fragment.get("certifierType.certifierType").is_none());
    }
}
