use std::{fmt, str::FromStr};

use chrono::{NaiveTime, Timelike};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

const MINUTES_PER_HOUR: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    pub fn total_minutes(&self) -> i64 {
        i64::from(self.0.hour()) * MINUTES_PER_HOUR + i64::from(self.0.minute())
    }

    pub fn as_naive_time(&self) -> NaiveTime {
        self.0
    }
}

impl FromStr for TimeOfDay {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveTime::parse_from_str(s.trim(), "%H:%M")
            .map(TimeOfDay)
            .map_err(|_| ValidationError::MalformedTime(s.to_string()))
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

/// Decimal hours from `start` to `end` on the same day.
///
/// Windows that cross midnight are not supported, so `end <= start` is an
/// error rather than a zero or negative duration.
pub fn hours_between(start: TimeOfDay, end: TimeOfDay) -> Result<Decimal, ValidationError> {
    let minutes = end.total_minutes() - start.total_minutes();
    if minutes <= 0 {
        return Err(ValidationError::EndNotAfterStart {
            start: start.to_string(),
            end: end.to_string(),
        });
    }

    Ok(Decimal::from(minutes) / Decimal::from(MINUTES_PER_HOUR))
}

pub fn parse_hours_between(start: &str, end: &str) -> Result<Decimal, ValidationError> {
    hours_between(start.parse()?, end.parse()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time_of_day() {
        let time: TimeOfDay = "08:30".parse().unwrap();
        assert_eq!(time.total_minutes(), 510);
        assert_eq!(time.to_string(), "08:30");

        let padded: TimeOfDay = " 23:59 ".parse().unwrap();
        assert_eq!(padded.total_minutes(), 23 * 60 + 59);
    }

    #[test]
    fn test_malformed_time_of_day() {
        for raw in ["", "8h30", "24:00", "12:60", "noon", "12:30:00"] {
            assert_eq!(
                raw.parse::<TimeOfDay>(),
                Err(ValidationError::MalformedTime(raw.to_string())),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_hours_between_whole_and_partial_hours() {
        assert_eq!(parse_hours_between("09:00", "17:00").unwrap(), Decimal::from(8));
        assert_eq!(
            parse_hours_between("08:30", "17:15").unwrap(),
            Decimal::new(875, 2)
        );
        assert_eq!(
            parse_hours_between("10:00", "10:15").unwrap(),
            Decimal::new(25, 2)
        );
    }

    #[test]
    fn test_hours_between_matches_minute_difference() {
        let times = ["00:00", "06:07", "09:20", "12:45", "17:59", "23:59"];
        for start in times {
            for end in times {
                let start: TimeOfDay = start.parse().unwrap();
                let end: TimeOfDay = end.parse().unwrap();
                if start >= end {
                    continue;
                }
                let expected = Decimal::from(end.total_minutes() - start.total_minutes())
                    / Decimal::from(60);
                let first = hours_between(start, end).unwrap();
                let second = hours_between(start, end).unwrap();
                assert_eq!(first, expected);
                assert_eq!(first, second);
            }
        }
    }

    #[test]
    fn test_end_not_after_start_is_rejected() {
        let err = parse_hours_between("17:00", "09:00").unwrap_err();
        assert_eq!(
            err,
            ValidationError::EndNotAfterStart {
                start: "17:00".to_string(),
                end: "09:00".to_string(),
            }
        );
        assert_eq!(err.to_string(), "end must be after start (17:00 - 09:00)");

        // same time and midnight-spanning shifts
        assert!(parse_hours_between("12:00", "12:00").is_err());
        assert!(parse_hours_between("22:00", "02:00").is_err());
    }

    #[test]
    fn test_time_of_day_serde() {
        let time: TimeOfDay = serde_json::from_str("\"07:05\"").unwrap();
        assert_eq!(time.total_minutes(), 7 * 60 + 5);
        assert_eq!(serde_json::to_string(&time).unwrap(), "\"07:05\"");
        assert!(serde_json::from_str::<TimeOfDay>("\"7 o'clock\"").is_err());
    }
}
