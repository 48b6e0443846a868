use std::{collections::BTreeMap, io::BufReader, path::Path, str::FromStr};

use anyhow::{Context, Error};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{LedgerError, LedgerResult, ValidationError};
use crate::event_ledger::event::{Assignment, Employee, Event, Expense, HoursStatus};
use crate::event_ledger::time_of_day::TimeOfDay;
use crate::event_ledger::timing::parse_time_zone;

#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum RawEvents {
    List(Vec<RawEvent>),
    Keyed(BTreeMap<String, RawEvent>),
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    pub id: Option<String>,
    pub title: Option<String>,
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub location: Option<String>,
    pub time_zone: Option<String>,
    pub assigned_employees: Option<BTreeMap<String, RawAssignment>>,
    pub expenses: Option<RawExpenses>,
    pub total_budget: Option<Value>,
}

// expenses are pushed under generated keys, older exports hold a list
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum RawExpenses {
    List(Vec<RawExpense>),
    Keyed(BTreeMap<String, RawExpense>),
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawExpense {
    pub description: Option<String>,
    pub amount: Option<Value>,
    pub created_at: Option<Value>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawAssignment {
    pub employee_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub hourly_wage: Option<Value>,
    pub shift_start: Option<String>,
    pub shift_end: Option<String>,
    pub hours_worked: Option<Value>,
    pub total_cost: Option<Value>,
    pub hours_approved: Option<bool>,
    pub hours_rejected: Option<bool>,
    pub approved_at: Option<Value>,
    pub rejected_at: Option<Value>,
    pub was_edited: Option<bool>,
    pub edit_note: Option<String>,
}

pub fn read_events(path: &Path) -> Result<Vec<Event>, Error> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open file: {}", path.to_string_lossy()))?;

    let reader = BufReader::new(file);
    let snapshot: Value = serde_json::from_reader(reader)
        .with_context(|| format!("snapshot is not valid JSON: {}", path.to_string_lossy()))?;

    let raw_events = unwrap_events(snapshot)
        .with_context(|| format!("snapshot has no events: {}", path.to_string_lossy()))?;
    validate_snapshot(raw_events)
        .with_context(|| format!("invalid snapshot: {}", path.to_string_lossy()))
}

pub fn parse_snapshot(json: &str) -> LedgerResult<Vec<Event>> {
    let snapshot: Value = serde_json::from_str(json)?;
    validate_snapshot(unwrap_events(snapshot)?)
}

// exports come as {"events": {...}}, a bare map of event id to event, or a list
fn unwrap_events(mut snapshot: Value) -> Result<RawEvents, serde_json::Error> {
    let wrapped = snapshot
        .get("events")
        .is_some_and(|events| events.is_object() || events.is_array());
    let events = if wrapped {
        snapshot["events"].take()
    } else {
        snapshot
    };

    serde_json::from_value(events)
}

pub fn validate_snapshot(raw_events: RawEvents) -> LedgerResult<Vec<Event>> {
    let keyed: Vec<(String, RawEvent)> = match raw_events {
        RawEvents::Keyed(map) => map.into_iter().collect(),
        RawEvents::List(list) => list
            .into_iter()
            .enumerate()
            .map(|(index, event)| (event.id.clone().unwrap_or_else(|| index.to_string()), event))
            .collect(),
    };

    let mut events = keyed
        .into_iter()
        .map(|(id, event)| validate_event(id, event))
        .collect::<LedgerResult<Vec<Event>>>()?;
    events.sort_by(|a, b| (a.date, a.start_time, &a.id).cmp(&(b.date, b.start_time, &b.id)));

    tracing::debug!(events = events.len(), "snapshot validated");
    Ok(events)
}

fn validate_event(id: String, raw: RawEvent) -> LedgerResult<Event> {
    let event_error = |source| LedgerError::Event {
        event_id: id.clone(),
        source,
    };

    let date = parse_date(raw.date.as_deref()).map_err(event_error)?;
    let start_time = parse_time(raw.start_time.as_deref(), "startTime").map_err(event_error)?;
    let end_time = parse_time(raw.end_time.as_deref(), "endTime").map_err(event_error)?;

    let mut event = Event::new(
        id.clone(),
        raw.title.unwrap_or_default(),
        date,
        start_time,
        end_time,
    )
    .map_err(event_error)?;

    event.location = raw.location.filter(|location| !location.trim().is_empty());
    event.time_zone = raw
        .time_zone
        .as_deref()
        .map(parse_time_zone)
        .transpose()
        .map_err(event_error)?;
    event.total_budget = raw
        .total_budget
        .as_ref()
        .map(|value| parse_amount("totalBudget", value))
        .transpose()
        .map_err(event_error)?
        .unwrap_or(Decimal::ZERO);

    event.expenses = validate_expenses(raw.expenses).map_err(event_error)?;

    for (key, raw_assignment) in raw.assigned_employees.unwrap_or_default() {
        let employee_id = raw_assignment.employee_id.clone().unwrap_or(key);
        let assignment = validate_assignment(&event, employee_id.clone(), raw_assignment)
            .map_err(|source| LedgerError::Assignment {
                event_id: id.clone(),
                employee_id,
                source,
            })?;
        event.assign(assignment);
    }

    Ok(event)
}

fn validate_expenses(raw: Option<RawExpenses>) -> Result<Vec<Expense>, ValidationError> {
    let raw_expenses: Vec<RawExpense> = match raw {
        None => vec![],
        Some(RawExpenses::List(list)) => list,
        Some(RawExpenses::Keyed(map)) => map.into_values().collect(),
    };

    let mut expenses = raw_expenses
        .into_iter()
        .map(|raw| {
            let amount = parse_amount(
                "amount",
                raw.amount.as_ref().ok_or(ValidationError::MissingField("amount"))?,
            )?;
            let created_at = parse_timestamp(
                "createdAt",
                raw.created_at
                    .as_ref()
                    .ok_or(ValidationError::MissingField("createdAt"))?,
            )?;
            Expense::new(raw.description.unwrap_or_default(), amount, created_at)
        })
        .collect::<Result<Vec<Expense>, ValidationError>>()?;
    expenses.sort_by_key(|expense| expense.created_at);

    Ok(expenses)
}

fn validate_assignment(
    event: &Event,
    employee_id: String,
    raw: RawAssignment,
) -> Result<Assignment, ValidationError> {
    let hourly_wage = parse_amount(
        "hourlyWage",
        raw.hourly_wage
            .as_ref()
            .ok_or(ValidationError::MissingField("hourlyWage"))?,
    )?;
    // shifts default to the event's own window
    let shift_start = match raw.shift_start.as_deref() {
        Some(start) => start.parse()?,
        None => event.start_time,
    };
    let shift_end = match raw.shift_end.as_deref() {
        Some(end) => end.parse()?,
        None => event.end_time,
    };

    let mut assignment = Assignment::schedule(
        Employee {
            employee_id,
            first_name: raw.first_name.unwrap_or_default(),
            last_name: raw.last_name.unwrap_or_default(),
        },
        hourly_wage,
        shift_start,
        shift_end,
    )?;

    if let Some(hours) = raw.hours_worked.as_ref() {
        assignment.hours_worked = parse_amount("hoursWorked", hours)?;
    }

    assignment.status = match (
        raw.hours_approved.unwrap_or(false),
        raw.hours_rejected.unwrap_or(false),
    ) {
        (true, true) => return Err(ValidationError::ConflictingApprovalFlags),
        (true, false) => HoursStatus::Approved {
            approved_at: parse_timestamp(
                "approvedAt",
                raw.approved_at
                    .as_ref()
                    .ok_or(ValidationError::MissingField("approvedAt"))?,
            )?,
            was_edited: raw.was_edited.unwrap_or(false),
            edit_note: raw.edit_note.filter(|note| !note.trim().is_empty()),
        },
        (false, true) => HoursStatus::Rejected {
            rejected_at: parse_timestamp(
                "rejectedAt",
                raw.rejected_at
                    .as_ref()
                    .ok_or(ValidationError::MissingField("rejectedAt"))?,
            )?,
        },
        (false, false) => HoursStatus::Pending,
    };

    if assignment.status.is_rejected() {
        assignment.hours_worked = Decimal::ZERO;
    }
    assignment.total_cost = assignment.cost_of(assignment.hours_worked)?;

    if let Some(stored) = raw.total_cost.as_ref() {
        let stored = parse_amount("totalCost", stored)?;
        if !same_to_the_cent(stored, assignment.total_cost) {
            tracing::warn!(
                employee_id = %assignment.employee_id,
                %stored,
                computed = %assignment.total_cost,
                "stored totalCost disagrees with hours and wage, using computed value"
            );
        }
    }

    Ok(assignment)
}

fn same_to_the_cent(a: Decimal, b: Decimal) -> bool {
    a.round_dp(2) == b.round_dp(2)
}

fn parse_date(raw: Option<&str>) -> Result<NaiveDate, ValidationError> {
    let raw = raw.ok_or(ValidationError::MissingField("date"))?;
    // dates are sometimes stored as full ISO timestamps
    let day = raw.trim().split('T').next().unwrap_or_default();
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|_| ValidationError::MalformedDate(raw.to_string()))
}

fn parse_time(raw: Option<&str>, field: &'static str) -> Result<TimeOfDay, ValidationError> {
    raw.ok_or(ValidationError::MissingField(field))?.parse()
}

pub fn parse_amount(field: &'static str, value: &Value) -> Result<Decimal, ValidationError> {
    let amount = match value {
        Value::Number(number) => parse_decimal(&number.to_string()),
        Value::String(text) => parse_decimal(text.trim()),
        _ => None,
    }
    .ok_or_else(|| ValidationError::NonNumeric {
        field,
        value: value.to_string(),
    })?;

    if amount < Decimal::ZERO {
        return Err(ValidationError::NegativeAmount {
            field,
            value: amount,
        });
    }
    Ok(amount)
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

// epoch milliseconds or RFC 3339
fn parse_timestamp(field: &'static str, value: &Value) -> Result<DateTime<Utc>, ValidationError> {
    let malformed = || ValidationError::MalformedTimestamp {
        field,
        value: value.to_string(),
    };

    match value {
        Value::Number(number) => number
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .ok_or_else(malformed),
        Value::String(text) => DateTime::parse_from_rfc3339(text.trim())
            .map(|instant| instant.with_timezone(&Utc))
            .map_err(|_| malformed()),
        _ => Err(malformed()),
    }
}
