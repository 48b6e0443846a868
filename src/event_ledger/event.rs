use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::ValidationError;
use crate::event_ledger::time_of_day::{hours_between, TimeOfDay};
use crate::event_ledger::wages::{line_cost, shift_cost};

pub type EmployeeId = String;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Employee {
    pub employee_id: EmployeeId,
    pub first_name: String,
    pub last_name: String,
}

// Stored records carry two independent hoursApproved/hoursRejected flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum HoursStatus {
    Pending,
    Approved {
        approved_at: DateTime<Utc>,
        was_edited: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        edit_note: Option<String>,
    },
    Rejected {
        rejected_at: DateTime<Utc>,
    },
}

impl HoursStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, HoursStatus::Pending)
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, HoursStatus::Approved { .. })
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, HoursStatus::Rejected { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub employee_id: EmployeeId,
    pub first_name: String,
    pub last_name: String,
    pub hourly_wage: Decimal,
    pub shift_start: TimeOfDay,
    pub shift_end: TimeOfDay,
    pub hours_worked: Decimal,
    pub total_cost: Decimal,
    #[serde(flatten)]
    pub status: HoursStatus,
}

impl Assignment {
    pub fn schedule(
        employee: Employee,
        hourly_wage: Decimal,
        shift_start: TimeOfDay,
        shift_end: TimeOfDay,
    ) -> Result<Self, ValidationError> {
        if hourly_wage < Decimal::ZERO {
            return Err(ValidationError::NegativeAmount {
                field: "hourlyWage",
                value: hourly_wage,
            });
        }
        let hours_worked = hours_between(shift_start, shift_end)?;

        Ok(Assignment {
            employee_id: employee.employee_id,
            first_name: employee.first_name,
            last_name: employee.last_name,
            hourly_wage,
            shift_start,
            shift_end,
            hours_worked,
            total_cost: shift_cost(shift_start, shift_end, hourly_wage)?,
            status: HoursStatus::Pending,
        })
    }

    pub fn scheduled_hours(&self) -> Decimal {
        // shift windows are validated on construction
        hours_between(self.shift_start, self.shift_end).unwrap_or(Decimal::ZERO)
    }

    /// What `hours` cost at this assignment's wage. The scheduled hours are
    /// priced from the shift's minutes.
    pub fn cost_of(&self, hours: Decimal) -> Result<Decimal, ValidationError> {
        if hours == self.scheduled_hours() {
            shift_cost(self.shift_start, self.shift_end, self.hourly_wage)
        } else {
            line_cost(hours, self.hourly_wage)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub description: String,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    pub fn new(
        description: impl Into<String>,
        amount: Decimal,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let description = description.into().trim().to_string();
        if description.is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        if amount < Decimal::ZERO {
            return Err(ValidationError::NegativeAmount {
                field: "amount",
                value: amount,
            });
        }

        Ok(Expense {
            description,
            amount,
            created_at,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub location: Option<String>,
    pub time_zone: Option<Tz>,
    pub assigned_employees: BTreeMap<EmployeeId, Assignment>,
    pub expenses: Vec<Expense>,
    pub total_budget: Decimal,
}

impl Event {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        date: NaiveDate,
        start_time: TimeOfDay,
        end_time: TimeOfDay,
    ) -> Result<Self, ValidationError> {
        hours_between(start_time, end_time)?;

        Ok(Event {
            id: id.into(),
            title: title.into(),
            date,
            start_time,
            end_time,
            location: None,
            time_zone: None,
            assigned_employees: BTreeMap::new(),
            expenses: Vec::new(),
            total_budget: Decimal::ZERO,
        })
    }

    pub fn with_budget(mut self, total_budget: Decimal) -> Result<Self, ValidationError> {
        if total_budget < Decimal::ZERO {
            return Err(ValidationError::NegativeAmount {
                field: "totalBudget",
                value: total_budget,
            });
        }
        self.total_budget = total_budget;
        Ok(self)
    }

    // replaces any earlier assignment for the same employee
    pub fn assign(&mut self, assignment: Assignment) -> Option<Assignment> {
        self.assigned_employees
            .insert(assignment.employee_id.clone(), assignment)
    }

    pub fn unassign(&mut self, employee_id: &str) -> Option<Assignment> {
        self.assigned_employees.remove(employee_id)
    }

    pub fn assignment(&self, employee_id: &str) -> Option<&Assignment> {
        self.assigned_employees.get(employee_id)
    }

    pub fn add_expense(
        &mut self,
        description: impl Into<String>,
        amount: Decimal,
        created_at: DateTime<Utc>,
    ) -> Result<(), ValidationError> {
        self.expenses.push(Expense::new(description, amount, created_at)?);
        Ok(())
    }

    pub fn assignments(&self) -> impl Iterator<Item = &Assignment> {
        self.assigned_employees.values()
    }
}
