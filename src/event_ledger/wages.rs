use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::event_ledger::event::Assignment;
use crate::event_ledger::time_of_day::{hours_between, TimeOfDay};

pub fn line_cost(hours: Decimal, hourly_wage: Decimal) -> Result<Decimal, ValidationError> {
    hours
        .checked_mul(hourly_wage)
        .ok_or(ValidationError::AmountOutOfRange { field: "totalCost" })
}

/// Cost of a whole shift, worked out from minutes so that 20 minutes at 150
/// comes to exactly 50.
pub fn shift_cost(
    start: TimeOfDay,
    end: TimeOfDay,
    hourly_wage: Decimal,
) -> Result<Decimal, ValidationError> {
    hours_between(start, end)?;
    let minutes = Decimal::from(end.total_minutes() - start.total_minutes());

    minutes
        .checked_mul(hourly_wage)
        .and_then(|cost| cost.checked_div(Decimal::from(60)))
        .ok_or(ValidationError::AmountOutOfRange { field: "totalCost" })
}

pub(crate) fn checked_sum(
    field: &'static str,
    values: impl IntoIterator<Item = Decimal>,
) -> Result<Decimal, ValidationError> {
    values.into_iter().try_fold(Decimal::ZERO, |total, value| {
        total
            .checked_add(value)
            .ok_or(ValidationError::AmountOutOfRange { field })
    })
}

pub fn wage_cost<'a>(
    assignments: impl IntoIterator<Item = &'a Assignment>,
) -> Result<Decimal, ValidationError> {
    checked_sum(
        "wageCost",
        assignments.into_iter().map(|assignment| assignment.total_cost),
    )
}

pub fn approved_wage_cost<'a>(
    assignments: impl IntoIterator<Item = &'a Assignment>,
) -> Result<Decimal, ValidationError> {
    checked_sum(
        "approvedWageCost",
        assignments
            .into_iter()
            .filter(|assignment| assignment.status.is_approved())
            .map(|assignment| assignment.total_cost),
    )
}

pub fn scheduled_hours<'a>(
    assignments: impl IntoIterator<Item = &'a Assignment>,
) -> Result<Decimal, ValidationError> {
    checked_sum(
        "scheduledHours",
        assignments.into_iter().map(|assignment| assignment.hours_worked),
    )
}

pub fn approved_hours<'a>(
    assignments: impl IntoIterator<Item = &'a Assignment>,
) -> Result<Decimal, ValidationError> {
    checked_sum(
        "approvedHours",
        assignments
            .into_iter()
            .filter(|assignment| assignment.status.is_approved())
            .map(|assignment| assignment.hours_worked),
    )
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::event_ledger::event::{Employee, HoursStatus};

    fn assignment(id: &str, start: &str, end: &str, wage: i64) -> Assignment {
        Assignment::schedule(
            Employee {
                employee_id: id.to_string(),
                first_name: id.to_string(),
                last_name: String::new(),
            },
            Decimal::from(wage),
            start.parse().unwrap(),
            end.parse().unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_line_cost() {
        assert_eq!(
            line_cost(Decimal::from(8), Decimal::from(150)).unwrap(),
            Decimal::from(1200)
        );
        assert_eq!(
            line_cost(Decimal::new(25, 2), Decimal::new(18050, 2)).unwrap(),
            Decimal::new(451250, 4)
        );
        assert_eq!(
            line_cost(Decimal::from(2), Decimal::MAX),
            Err(ValidationError::AmountOutOfRange { field: "totalCost" })
        );
    }

    #[test]
    fn test_shift_cost_is_exact_for_partial_hours() {
        let cost = shift_cost(
            "09:00".parse().unwrap(),
            "09:20".parse().unwrap(),
            Decimal::from(150),
        )
        .unwrap();
        assert_eq!(cost, Decimal::from(50));

        let cost = shift_cost(
            "09:00".parse().unwrap(),
            "09:40".parse().unwrap(),
            Decimal::new(18050, 2),
        )
        .unwrap();
        assert_eq!(cost.round_dp(2), Decimal::new(12033, 2));
        assert!(shift_cost(
            "09:20".parse().unwrap(),
            "09:00".parse().unwrap(),
            Decimal::from(150)
        )
        .is_err());
    }

    #[test]
    fn test_wage_cost_of_nothing_is_zero() {
        let none: Vec<Assignment> = vec![];
        assert_eq!(wage_cost(&none).unwrap(), Decimal::ZERO);
        assert_eq!(approved_wage_cost(&none).unwrap(), Decimal::ZERO);
        assert_eq!(scheduled_hours(&none).unwrap(), Decimal::ZERO);
        assert_eq!(approved_hours(&none).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_wage_cost_sums_every_assignment_once() {
        let assignments = vec![
            assignment("e1", "09:00", "17:00", 150),
            assignment("e2", "09:00", "13:00", 200),
        ];
        assert_eq!(assignments[0].total_cost, Decimal::from(1200));
        assert_eq!(assignments[1].total_cost, Decimal::from(800));
        assert_eq!(wage_cost(&assignments).unwrap(), Decimal::from(2000));
        assert_eq!(scheduled_hours(&assignments).unwrap(), Decimal::from(12));
    }

    #[test]
    fn test_approved_figures_only_count_approved() {
        let at = Utc.with_ymd_and_hms(2024, 6, 15, 8, 0, 0).unwrap();
        let mut approved = assignment("e1", "09:00", "17:00", 150);
        approved.status = HoursStatus::Approved {
            approved_at: at,
            was_edited: false,
            edit_note: None,
        };
        let pending = assignment("e2", "09:00", "13:00", 200);

        let assignments = vec![approved, pending];
        assert_eq!(wage_cost(&assignments).unwrap(), Decimal::from(2000));
        assert_eq!(approved_wage_cost(&assignments).unwrap(), Decimal::from(1200));
        assert_eq!(approved_hours(&assignments).unwrap(), Decimal::from(8));
    }

    #[test]
    fn test_wage_cost_overflow_is_an_error() {
        let mut first = assignment("e1", "09:00", "17:00", 150);
        let mut second = assignment("e2", "09:00", "17:00", 150);
        first.total_cost = Decimal::MAX;
        second.total_cost = Decimal::ONE;

        assert_eq!(
            wage_cost(&[first, second]),
            Err(ValidationError::AmountOutOfRange { field: "wageCost" })
        );
    }
}
