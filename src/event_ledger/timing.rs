use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::error::ValidationError;
use crate::event_ledger::event::{Assignment, Event};
use crate::event_ledger::time_of_day::TimeOfDay;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EventPhase {
    Upcoming,
    Ongoing,
    Finished,
}

impl EventPhase {
    pub fn at(now: DateTime<Utc>, starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> Self {
        if now < starts_at {
            EventPhase::Upcoming
        } else if now < ends_at {
            EventPhase::Ongoing
        } else {
            EventPhase::Finished
        }
    }
}

/// Resolves a wall-clock time on `date` in `tz`.
///
/// When clocks fall back the earlier of the two instants is used. Times
/// skipped when clocks spring forward do not exist and are refused.
pub fn resolve_local(
    date: NaiveDate,
    time: TimeOfDay,
    tz: Tz,
) -> Result<DateTime<Utc>, ValidationError> {
    let local = date.and_time(time.as_naive_time());
    tz.from_local_datetime(&local)
        .earliest()
        .map(|instant| instant.with_timezone(&Utc))
        .ok_or_else(|| {
            ValidationError::NonexistentLocalTime(local.to_string(), tz.name().to_string())
        })
}

pub fn parse_time_zone(name: &str) -> Result<Tz, ValidationError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| ValidationError::UnknownTimeZone(name.to_string()))
}

impl Event {
    pub fn zone(&self, default_tz: Tz) -> Tz {
        self.time_zone.unwrap_or(default_tz)
    }

    pub fn window(
        &self,
        default_tz: Tz,
    ) -> Result<(DateTime<Utc>, DateTime<Utc>), ValidationError> {
        let tz = self.zone(default_tz);
        Ok((
            resolve_local(self.date, self.start_time, tz)?,
            resolve_local(self.date, self.end_time, tz)?,
        ))
    }

    pub fn shift_window(
        &self,
        assignment: &Assignment,
        default_tz: Tz,
    ) -> Result<(DateTime<Utc>, DateTime<Utc>), ValidationError> {
        let tz = self.zone(default_tz);
        Ok((
            resolve_local(self.date, assignment.shift_start, tz)?,
            resolve_local(self.date, assignment.shift_end, tz)?,
        ))
    }

    pub fn phase(&self, now: DateTime<Utc>, default_tz: Tz) -> Result<EventPhase, ValidationError> {
        let (starts_at, ends_at) = self.window(default_tz)?;
        Ok(EventPhase::at(now, starts_at, ends_at))
    }
}
