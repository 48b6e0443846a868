use std::{collections::HashMap, path::Path};

use anyhow::{Context, Error};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{LedgerError, LedgerResult, ValidationError};
use crate::event_ledger::budget::reconcile_budget;
use crate::event_ledger::event::{EmployeeId, Event, HoursStatus};
use crate::event_ledger::snapshot::read_events;
use crate::event_ledger::time_of_day::TimeOfDay;
use crate::event_ledger::timing::EventPhase;
use crate::event_ledger::wages::{
    approved_hours, approved_wage_cost, checked_sum, scheduled_hours, wage_cost,
};

const DISPLAY_DECIMALS: u32 = 2;

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    pub event_id: String,
    pub title: String,
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub phase: EventPhase,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub scheduled_hours: Decimal,
    pub approved_hours: Decimal,
    pub wage_cost: Decimal,
    pub approved_wage_cost: Decimal,
    pub total_budget: Decimal,
    pub other_expenses: Decimal,
    pub total_expenses: Decimal,
    pub remaining_budget: Decimal,
    pub wage_percentage: Decimal,
    pub expense_percentage: Decimal,
    pub over_budget: bool,
    pub pending_count: usize,
    pub approved_count: usize,
    pub rejected_count: usize,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeHoursSummary {
    pub employee_id: EmployeeId,
    pub first_name: String,
    pub last_name: String,
    pub approved_hours: Decimal,
    pub approved_pay: Decimal,
    pub approved_shifts: usize,
    pub pending_shifts: usize,
    pub rejected_shifts: usize,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledShift {
    pub event_id: String,
    pub event_title: String,
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub shift_start: TimeOfDay,
    pub shift_end: TimeOfDay,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub phase: EventPhase,
    pub hours_worked: Decimal,
    pub total_cost: Decimal,
    pub hours: HoursStatus,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Ledger {
    pub generated_at: DateTime<Utc>,
    pub events: Vec<EventSummary>,
    pub employees: Vec<EmployeeHoursSummary>,
}

pub fn summarize_events_from_json_file(
    path: &Path,
    now: DateTime<Utc>,
    default_tz: Tz,
) -> Result<Ledger, Error> {
    let events = read_events(path)?;

    derive_ledger(&events, now, default_tz)
        .with_context(|| format!("Failed to summarize events in {}", path.to_string_lossy()))
}

pub fn derive_ledger(
    events: &[Event],
    now: DateTime<Utc>,
    default_tz: Tz,
) -> LedgerResult<Ledger> {
    let summaries = events
        .iter()
        .map(|event| {
            summarize_event(event, now, default_tz).map_err(|source| LedgerError::Event {
                event_id: event.id.clone(),
                source,
            })
        })
        .collect::<LedgerResult<Vec<EventSummary>>>()?;

    let over_budget = summaries.iter().filter(|summary| summary.over_budget).count();
    tracing::info!(events = summaries.len(), over_budget, "ledger derived");

    Ok(Ledger {
        generated_at: now,
        events: summaries,
        employees: summarize_employee_hours(events).map_err(LedgerError::Totals)?,
    })
}

pub fn summarize_event(
    event: &Event,
    now: DateTime<Utc>,
    default_tz: Tz,
) -> Result<EventSummary, ValidationError> {
    let (starts_at, ends_at) = event.window(default_tz)?;

    let budget = reconcile_budget(
        event.total_budget,
        wage_cost(event.assignments())?,
        event.expenses.iter().map(|expense| expense.amount),
    )?;

    let count = |predicate: fn(&HoursStatus) -> bool| {
        event
            .assignments()
            .filter(|assignment| predicate(&assignment.status))
            .count()
    };

    let summary = EventSummary {
        event_id: event.id.clone(),
        title: event.title.clone(),
        date: event.date,
        location: event.location.clone(),
        phase: EventPhase::at(now, starts_at, ends_at),
        starts_at,
        ends_at,
        scheduled_hours: round(scheduled_hours(event.assignments())?),
        approved_hours: round(approved_hours(event.assignments())?),
        wage_cost: round(budget.wage_cost),
        approved_wage_cost: round(approved_wage_cost(event.assignments())?),
        total_budget: round(budget.total_budget),
        other_expenses: round(budget.other_expenses),
        total_expenses: round(budget.total_expenses),
        remaining_budget: round(budget.remaining_budget),
        wage_percentage: round(budget.wage_percentage),
        expense_percentage: round(budget.expense_percentage),
        over_budget: budget.is_over_budget(),
        pending_count: count(HoursStatus::is_pending),
        approved_count: count(HoursStatus::is_approved),
        rejected_count: count(HoursStatus::is_rejected),
    };

    if summary.over_budget {
        tracing::warn!(
            event_id = %event.id,
            remaining_budget = %summary.remaining_budget,
            "event is over budget"
        );
    } else {
        tracing::debug!(
            event_id = %event.id,
            wage_cost = %summary.wage_cost,
            remaining_budget = %summary.remaining_budget,
            "event summarized"
        );
    }

    Ok(summary)
}

/// Only approved assignments count toward hours and pay, the others are
/// only counted.
pub fn summarize_employee_hours(
    events: &[Event],
) -> Result<Vec<EmployeeHoursSummary>, ValidationError> {
    let mut summaries: HashMap<&str, EmployeeHoursSummary> = HashMap::new();

    for assignment in events.iter().flat_map(|event| event.assignments()) {
        let summary = summaries
            .entry(assignment.employee_id.as_str())
            .or_insert_with(|| EmployeeHoursSummary {
                employee_id: assignment.employee_id.clone(),
                first_name: assignment.first_name.clone(),
                last_name: assignment.last_name.clone(),
                approved_hours: Decimal::ZERO,
                approved_pay: Decimal::ZERO,
                approved_shifts: 0,
                pending_shifts: 0,
                rejected_shifts: 0,
            });

        match assignment.status {
            HoursStatus::Pending => summary.pending_shifts += 1,
            HoursStatus::Approved { .. } => {
                summary.approved_shifts += 1;
                summary.approved_hours = checked_sum(
                    "approvedHours",
                    [summary.approved_hours, assignment.hours_worked],
                )?;
                summary.approved_pay = checked_sum(
                    "approvedPay",
                    [summary.approved_pay, assignment.total_cost],
                )?;
            }
            HoursStatus::Rejected { .. } => summary.rejected_shifts += 1,
        }
    }

    let mut summaries: Vec<EmployeeHoursSummary> = summaries
        .into_values()
        .map(|mut summary| {
            summary.approved_hours = round(summary.approved_hours);
            summary.approved_pay = round(summary.approved_pay);
            summary
        })
        .collect();
    summaries.sort_by(|a, b| a.employee_id.cmp(&b.employee_id));
    Ok(summaries)
}

pub fn employee_schedule(
    employee_id: &str,
    events: &[Event],
    now: DateTime<Utc>,
    default_tz: Tz,
) -> Result<Vec<ScheduledShift>, ValidationError> {
    let mut shifts = events
        .iter()
        .filter_map(|event| {
            event
                .assignment(employee_id)
                .map(|assignment| (event, assignment))
        })
        .map(|(event, assignment)| -> Result<ScheduledShift, ValidationError> {
            let (starts_at, ends_at) = event.shift_window(assignment, default_tz)?;
            Ok(ScheduledShift {
                event_id: event.id.clone(),
                event_title: event.title.clone(),
                date: event.date,
                location: event.location.clone(),
                shift_start: assignment.shift_start,
                shift_end: assignment.shift_end,
                starts_at,
                ends_at,
                phase: EventPhase::at(now, starts_at, ends_at),
                hours_worked: assignment.hours_worked,
                total_cost: assignment.total_cost,
                hours: assignment.status.clone(),
            })
        })
        .collect::<Result<Vec<ScheduledShift>, ValidationError>>()?;
    shifts.sort_by_key(|shift| shift.starts_at);

    Ok(shifts)
}

fn round(value: Decimal) -> Decimal {
    value.round_dp(DISPLAY_DECIMALS)
}
