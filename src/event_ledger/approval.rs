use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::error::{ApprovalError, ValidationError};
use crate::event_ledger::event::{Assignment, Event, HoursStatus};

fn validate_hours(hours: Decimal) -> Result<Decimal, ValidationError> {
    if hours < Decimal::ZERO {
        return Err(ValidationError::NegativeAmount {
            field: "hoursWorked",
            value: hours,
        });
    }
    Ok(hours)
}

fn normalize_note(note: Option<String>) -> Option<String> {
    note.map(|note| note.trim().to_string())
        .filter(|note| !note.is_empty())
}

impl Assignment {
    /// Without `edited_hours` the scheduled hours are approved as-is. The
    /// assignment is left untouched when the step is refused.
    pub fn approve(
        &mut self,
        edited_hours: Option<Decimal>,
        edit_note: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<(), ApprovalError> {
        match self.status {
            HoursStatus::Pending => {}
            HoursStatus::Approved { approved_at, .. } => {
                return Err(ApprovalError::AlreadyApproved(approved_at))
            }
            HoursStatus::Rejected { rejected_at } => {
                return Err(ApprovalError::AlreadyRejected(rejected_at))
            }
        }

        let scheduled = self.scheduled_hours();
        let hours = validate_hours(edited_hours.unwrap_or(scheduled))?;
        let total_cost = self.cost_of(hours)?;

        self.hours_worked = hours;
        self.total_cost = total_cost;
        self.status = HoursStatus::Approved {
            approved_at: at,
            was_edited: hours != scheduled,
            edit_note: normalize_note(edit_note),
        };
        Ok(())
    }

    pub fn reject(&mut self, at: DateTime<Utc>) -> Result<(), ApprovalError> {
        match self.status {
            HoursStatus::Pending => {}
            HoursStatus::Approved { approved_at, .. } => {
                return Err(ApprovalError::AlreadyApproved(approved_at))
            }
            HoursStatus::Rejected { rejected_at } => {
                return Err(ApprovalError::AlreadyRejected(rejected_at))
            }
        }

        self.hours_worked = Decimal::ZERO;
        self.total_cost = Decimal::ZERO;
        self.status = HoursStatus::Rejected { rejected_at: at };
        Ok(())
    }

    pub fn edit_approved(
        &mut self,
        hours: Decimal,
        edit_note: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<(), ApprovalError> {
        let previous_note = match &self.status {
            HoursStatus::Approved { edit_note, .. } => edit_note.clone(),
            HoursStatus::Pending => return Err(ApprovalError::NotApproved),
            HoursStatus::Rejected { rejected_at } => {
                return Err(ApprovalError::AlreadyRejected(*rejected_at))
            }
        };
        let hours = validate_hours(hours)?;
        let total_cost = self.cost_of(hours)?;

        self.hours_worked = hours;
        self.total_cost = total_cost;
        self.status = HoursStatus::Approved {
            approved_at: at,
            was_edited: true,
            edit_note: normalize_note(edit_note).or(previous_note),
        };
        Ok(())
    }
}

impl Event {
    fn assignment_mut(&mut self, employee_id: &str) -> Result<&mut Assignment, ApprovalError> {
        self.assigned_employees
            .get_mut(employee_id)
            .ok_or_else(|| ApprovalError::UnknownEmployee(employee_id.to_string()))
    }

    pub fn approve_hours(
        &mut self,
        employee_id: &str,
        edited_hours: Option<Decimal>,
        edit_note: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<&Assignment, ApprovalError> {
        let assignment = self.assignment_mut(employee_id)?;
        assignment.approve(edited_hours, edit_note, at)?;
        tracing::debug!(event_id = %self.id, employee_id, "hours approved");
        self.assignment_ref(employee_id)
    }

    pub fn reject_hours(
        &mut self,
        employee_id: &str,
        at: DateTime<Utc>,
    ) -> Result<&Assignment, ApprovalError> {
        self.assignment_mut(employee_id)?.reject(at)?;
        tracing::debug!(event_id = %self.id, employee_id, "hours rejected");
        self.assignment_ref(employee_id)
    }

    pub fn edit_approved_hours(
        &mut self,
        employee_id: &str,
        hours: Decimal,
        edit_note: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<&Assignment, ApprovalError> {
        self.assignment_mut(employee_id)?
            .edit_approved(hours, edit_note, at)?;
        tracing::debug!(event_id = %self.id, employee_id, "approved hours edited");
        self.assignment_ref(employee_id)
    }

    fn assignment_ref(&self, employee_id: &str) -> Result<&Assignment, ApprovalError> {
        self.assignment(employee_id)
            .ok_or_else(|| ApprovalError::UnknownEmployee(employee_id.to_string()))
    }
}
