//! Static code lookup tables.
//!
//! Bidirectional mappings between external coded vocabularies and the
//! registry's internal display vocabulary. The tables are a versioned
//! static contract: they are built once at process start, never mutated,
//! and shared by reference across concurrent record operations. Migrating
//! a vocabulary is a breaking schema change requiring coordinated rollout,
//! not a live update.
//!
//! Lookups are case-sensitive exact matches. An unmapped code means the
//! corresponding field is simply absent from output; no default value is
//! ever substituted.

use std::collections::HashMap;

/// Immutable code lookup tables for death-record vocabulary.
///
/// Construct once with [`CodeTables::new`] and share by reference (or via
/// `Arc`) wherever mapping is needed.
#[derive(Debug)]
pub struct CodeTables {
    race_code_by_display: HashMap<&'static str, &'static str>,
    manner_of_death: HashMap<&'static str, &'static str>,
    pregnancy_status: HashMap<&'static str, &'static str>,
    tobacco_use: HashMap<&'static str, &'static str>,
    transport_injury_role: HashMap<&'static str, &'static str>,
    certifier_type: HashMap<&'static str, &'static str>,
    marital_status: HashMap<&'static str, &'static str>,
}

impl CodeTables {
    /// Vocabulary contract version. Bump on any table change.
    pub const VERSION: &'static str = "2026-1";

    /// Builds the full table set.
    pub fn new() -> Self {
        // Race and ethnicity category displays keyed to their external
        // codes. Stored display -> code; ingest queries it in reverse.
        let race_code_by_display = HashMap::from([
            ("White", "2106-3"),
            ("Black or African American", "2054-5"),
            ("American Indian or Alaskan Native", "1002-5"),
            ("Asian", "2028-5"),
            ("Asian Indian", "2029-7"),
            ("Chinese", "2034-7"),
            ("Filipino", "2036-2"),
            ("Japanese", "2039-6"),
            ("Korean", "2040-4"),
            ("Vietnamese", "2047-9"),
            ("Native Hawaiian", "2079-2"),
            ("Guamanian", "2087-5"),
            ("Chamorro", "2088-3"),
            ("Samoan", "2080-0"),
            ("Other Pacific Islander", "2500-7"),
        ]);

        let manner_of_death = HashMap::from([
            ("38605008", "Natural"),
            ("7878000", "Accident"),
            ("44301001", "Suicide"),
            ("27935005", "Homicide"),
            ("185973002", "Pending Investigation"),
            ("65037004", "Could not be determined"),
        ]);

        // "N/A" is intentionally aliased to the same display as "not
        // pregnant within past year"; the registry does not present a
        // separate not-applicable answer.
        let pregnancy_status = HashMap::from([
            ("PHC1260", "Not pregnant within past year"),
            ("PHC1261", "Pregnant at time of death"),
            ("PHC1262", "Not pregnant, but pregnant within 42 days of death"),
            (
                "PHC1263",
                "Not pregnant, but pregnant 43 days to 1 year before death",
            ),
            ("PHC1264", "Unknown if pregnant within the past year"),
            ("N/A", "Not pregnant within past year"),
        ]);

        // "UNK" and "NASK" (not asked) both collapse to "Unknown".
        let tobacco_use = HashMap::from([
            ("373066001", "Yes"),
            ("373067005", "No"),
            ("2931005", "Probably"),
            ("UNK", "Unknown"),
            ("NASK", "Unknown"),
        ]);

        // Reversed direction relative to the other tables: the display is
        // the internal form and the code is external.
        let transport_injury_role = HashMap::from([
            ("Driver/Operator", "236320001"),
            ("Passenger", "257500003"),
            ("Pedestrian", "257518000"),
            ("Other", "OTH"),
        ]);

        let certifier_type = HashMap::from([
            ("434651000124107", "Certifying Physician"),
            ("434641000124105", "Pronouncing and Certifying Physician"),
            ("440051000124108", "Medical Examiner/Coroner"),
        ]);

        let marital_status = HashMap::from([
            ("M", "Married"),
            ("W", "Widowed"),
            ("D", "Divorced (but not remarried)"),
            ("S", "Never married"),
            ("U", "Unknown"),
        ]);

        Self {
            race_code_by_display,
            manner_of_death,
            pregnancy_status,
            tobacco_use,
            transport_injury_role,
            certifier_type,
            marital_status,
        }
    }

    /// Looks up the display name for a race/ethnicity category code.
    ///
    /// The table is stored display -> code; this walks it in reverse.
    pub fn race_display(&self, code: &str) -> Option<&'static str> {
        self.race_code_by_display
            .iter()
            .find(|&(_, c)| *c == code)
            .map(|(display, _)| *display)
    }

    /// Looks up the external code for a race/ethnicity category display.
    pub fn race_code(&self, display: &str) -> Option<&'static str> {
        self.race_code_by_display.get(display).copied()
    }

    /// Manner-of-death code -> display.
    pub fn manner_of_death_display(&self, code: &str) -> Option<&'static str> {
        self.manner_of_death.get(code).copied()
    }

    /// Pregnancy-status code -> display.
    pub fn pregnancy_status_display(&self, code: &str) -> Option<&'static str> {
        self.pregnancy_status.get(code).copied()
    }

    /// Tobacco-use code -> display.
    pub fn tobacco_use_display(&self, code: &str) -> Option<&'static str> {
        self.tobacco_use.get(code).copied()
    }

    /// Transport-injury-role display -> external code.
    pub fn transport_injury_code(&self, display: &str) -> Option<&'static str> {
        self.transport_injury_role.get(display).copied()
    }

    /// Certifier-type code -> display.
    ///
    /// Safety-critical: an absent mapping means the certifier-type field is
    /// omitted from output entirely.
    pub fn certifier_type_display(&self, code: &str) -> Option<&'static str> {
        self.certifier_type.get(code).copied()
    }

    /// Marital-status code -> display.
    pub fn marital_status_display(&self, code: &str) -> Option<&'static str> {
        self.marital_status.get(code).copied()
    }
}

impl Default for CodeTables {
    fn default() -> Self {
        Self::new()
    }
}
