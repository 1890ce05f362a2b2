//! Cause-of-death condition extraction.

use super::put;
use crate::wire::ConditionWire;
use crate::FlatContents;

/// The positional convention reserves four cause-of-death slots.
const MAX_CAUSES: usize = 4;

/// Extract the cause-of-death chain into a flat fragment.
///
/// Conditions are consumed in document order while each has both
/// non-empty descriptive text and an onset interval; the scan
/// short-circuits at the first condition lacking either (not an error).
/// Slot 0 is the immediate cause; slots 1..=3 are underlying causes.
pub fn extract(conditions: &[ConditionWire]) -> FlatContents {
    let mut fragment = FlatContents::new();

    for (index, condition) in conditions.iter().take(MAX_CAUSES).enumerate() {
        let text = condition
            .text
            .as_ref()
            .and_then(|narrative| narrative.div.as_deref())
            .filter(|div| !div.trim().is_empty());
        let onset = condition
            .onset_string
            .as_deref()
            .filter(|onset| !onset.trim().is_empty());

        let (Some(text), Some(onset)) = (text, onset) else {
            break;
        };

        if index == 0 {
            put(&mut fragment, "cod.immediate", text);
            put(&mut fragment, "cod.immediateInt", onset);
        } else {
            put(&mut fragment, &format!("cod.under{index}"), text);
            put(&mut fragment, &format!("cod.under{index}Int"), onset);
        }
    }

    fragment
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn condition(text: Option<&str>, onset: Option<&str>) -> ConditionWire {
        let mut value = serde_json::json!({});
        if let Some(text) = text {
            value["text"] = serde_json::json!({ "div": text });
        }
        if let Some(onset) = onset {
            value["onsetString"] = Value::String(onset.to_string());
        }
        serde_json::from_value(value).expect("valid condition wire")
    }

    fn text_of(fragment: &FlatContents, key: &str) -> Option<String> {
        fragment.get(key).and_then(Value::as_str).map(str::to_string)
    }

    #[test]
    fn first_condition_is_immediate_cause() {
        let fragment = extract(&[condition(Some("Cardiac arrest"), Some("Minutes"))]);
        assert_eq!(
            text_of(&fragment, "cod.immediate").as_deref(),
            Some("Cardiac arrest")
        );
        assert_eq!(text_of(&fragment, "cod.immediateInt").as_deref(), Some("Minutes"));
    }

    #[test]
    fn later_conditions_are_underlying_causes() {
        let fragment = extract(&[
            condition(Some("Cardiac arrest"), Some("Minutes")),
            condition(Some("Coronary artery disease"), Some("Years")),
            condition(Some("Hypertension"), Some("Decades")),
        ]);
        assert_eq!(
            text_of(&fragment, "cod.under1").as_deref(),
            Some("Coronary artery disease")
        );
        assert_eq!(text_of(&fragment, "cod.under1Int").as_deref(), Some("Years"));
        assert_eq!(text_of(&fragment, "cod.under2").as_deref(), Some("Hypertension"));
    }

    #[test]
    fn scan_short_circuits_on_missing_onset() {
        let fragment = extract(&[
            condition(Some("Cardiac arrest"), Some("Minutes")),
            condition(Some("No onset recorded"), None),
            condition(Some("Hypertension"), Some("Decades")),
        ]);
        assert!(fragment.get("cod.under1").is_none());
        assert!(fragment.get("cod.under2").is_none());
    }

    #[test]
    fn at_most_four_slots_are_consumed() {
        let chain: Vec<_> = (0..6)
            .map(|i| condition(Some(&format!("Cause {i}")), Some("Years")))
            .collect();
        let fragment = extract(&chain);
        assert!(fragment.get("cod.under3").is_some());
        assert!(fragment.get("cod.under4").is_none());
    }

    #[test]
    fn empty_chain_yields_empty_fragment() {
        assert!(extract(&[]).is_empty());
    }
}
