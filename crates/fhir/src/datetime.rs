//! Date/time parsing and display helpers.
//!
//! Inbound death-record datetimes arrive either with an offset (RFC 3339)
//! or as naive local timestamps; both forms are accepted. A value that
//! parses as neither is a fatal error for the extraction that needed it;
//! no field is ever silently defaulted.

use crate::{FhirError, FhirResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

/// A parsed date/time split into the registry's storage formats.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitDateTime {
    /// `YYYY-MM-DD`
    pub date: String,
    /// 24-hour `HH:MM`
    pub time: String,
}

/// Parses a FHIR datetime string and splits it into date and time fields.
pub fn split_datetime(value: &str) -> FhirResult<SplitDateTime> {
    let naive = parse_naive(value)?;
    Ok(SplitDateTime {
        date: naive.format("%Y-%m-%d").to_string(),
        time: naive.format("%H:%M").to_string(),
    })
}

fn parse_naive(value: &str) -> FhirResult<NaiveDateTime> {
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(value) {
        return Ok(with_offset.naive_local());
    }
    if let Ok(naive) = value.parse::<NaiveDateTime>() {
        return Ok(naive);
    }
    Err(FhirError::InvalidDateTime(value.to_string()))
}

/// Human-facing datetime form, e.g. `Mar 20, 1992 02:15 PM`.
pub fn pretty_datetime(value: &NaiveDateTime) -> String {
    value.format("%b %d, %Y %I:%M %p").to_string()
}

/// Human-facing date form, e.g. `Mar 20, 1992`.
pub fn pretty_date(value: &NaiveDate) -> String {
    value.format("%b %d, %Y").to_string()
}

/// Human-facing time form, e.g. `02:15 PM`.
pub fn pretty_time(value: &NaiveTime) -> String {
    value.format("%I:%M %p").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_rfc3339_datetime() {
        let split = split_datetime("2018-03-10T13:05:00+00:00").expect("parse datetime");
        assert_eq!(split.date, "2018-03-10");
        assert_eq!(split.time, "13:05");
    }

    #[test]
    fn splits_naive_datetime() {
        let split = split_datetime("2018-03-10T04:30:00").expect("parse naive datetime");
        assert_eq!(split.date, "2018-03-10");
        assert_eq!(split.time, "04:30");
    }

    #[test]
    fn keeps_local_wall_clock_of_offset_input() {
        let split = split_datetime("2018-03-10T23:45:00-05:00").expect("parse offset datetime");
        assert_eq!(split.date, "2018-03-10");
        assert_eq!(split.time, "23:45");
    }

    #[test]
    fn rejects_garbage() {
        let err = split_datetime("yesterday-ish").expect_err("should reject garbage");
        match err {
            FhirError::InvalidDateTime(value) => assert_eq!(value, "yesterday-ish"),
            other => panic!("expected InvalidDateTime error, got {other:?}"),
        }
    }

    #[test]
    fn pretty_forms_match_expected_layout() {
        let naive = "2018-03-10T14:05:00"
            .parse::<NaiveDateTime>()
            .expect("valid datetime");
        assert_eq!(pretty_datetime(&naive), "Mar 10, 2018 02:05 PM");
        assert_eq!(pretty_date(&naive.date()), "Mar 10, 2018");
        assert_eq!(pretty_time(&naive.time()), "02:05 PM");
    }
}
