use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::ValidationError;
use crate::event_ledger::wages::checked_sum;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetReconciliation {
    pub total_budget: Decimal,
    pub wage_cost: Decimal,
    pub other_expenses: Decimal,
    pub total_expenses: Decimal,
    pub remaining_budget: Decimal,
    pub wage_percentage: Decimal,
    pub expense_percentage: Decimal,
}

impl BudgetReconciliation {
    pub fn is_over_budget(&self) -> bool {
        self.remaining_budget < Decimal::ZERO
    }
}

/// Reconciles wages and itemized expenses against `total_budget`.
///
/// A zero budget reports zero percentages instead of dividing by zero.
pub fn reconcile_budget(
    total_budget: Decimal,
    wage_cost: Decimal,
    expense_amounts: impl IntoIterator<Item = Decimal>,
) -> Result<BudgetReconciliation, ValidationError> {
    let other_expenses = checked_sum("otherExpenses", expense_amounts)?;
    let total_expenses = checked_sum("totalExpenses", [wage_cost, other_expenses])?;
    let remaining_budget = total_budget
        .checked_sub(total_expenses)
        .ok_or(ValidationError::AmountOutOfRange {
            field: "remainingBudget",
        })?;

    Ok(BudgetReconciliation {
        total_budget,
        wage_cost,
        other_expenses,
        total_expenses,
        remaining_budget,
        wage_percentage: percentage_of("wagePercentage", wage_cost, total_budget)?,
        expense_percentage: percentage_of("expensePercentage", total_expenses, total_budget)?,
    })
}

fn percentage_of(
    field: &'static str,
    part: Decimal,
    whole: Decimal,
) -> Result<Decimal, ValidationError> {
    if whole <= Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }

    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(HUNDRED))
        .ok_or(ValidationError::AmountOutOfRange { field })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reconcile_budget() {
        let reconciliation = reconcile_budget(
            Decimal::from(10_000),
            Decimal::from(2000),
            [Decimal::from(500)],
        )
        .unwrap();

        assert_eq!(reconciliation.other_expenses, Decimal::from(500));
        assert_eq!(reconciliation.total_expenses, Decimal::from(2500));
        assert_eq!(reconciliation.remaining_budget, Decimal::from(7500));
        assert_eq!(reconciliation.wage_percentage, Decimal::from(20));
        assert_eq!(reconciliation.expense_percentage, Decimal::from(25));
        assert!(!reconciliation.is_over_budget());
    }

    #[test]
    fn test_zero_budget_reports_zero_percentages() {
        let reconciliation = reconcile_budget(Decimal::ZERO, Decimal::from(2000), []).unwrap();

        assert_eq!(reconciliation.wage_percentage, Decimal::ZERO);
        assert_eq!(reconciliation.expense_percentage, Decimal::ZERO);
        assert_eq!(reconciliation.other_expenses, Decimal::ZERO);
        assert_eq!(reconciliation.remaining_budget, Decimal::from(-2000));
        assert!(reconciliation.is_over_budget());
    }

    #[test]
    fn test_no_spend_leaves_whole_budget() {
        let reconciliation = reconcile_budget(Decimal::from(800), Decimal::ZERO, []).unwrap();
        assert_eq!(reconciliation.remaining_budget, Decimal::from(800));
        assert_eq!(reconciliation.wage_percentage, Decimal::ZERO);
        assert!(!reconciliation.is_over_budget());
    }

    #[test]
    fn test_over_budget() {
        let reconciliation = reconcile_budget(
            Decimal::from(1000),
            Decimal::from(900),
            [Decimal::new(7550, 2), Decimal::new(4950, 2)],
        )
        .unwrap();
        assert_eq!(reconciliation.other_expenses, Decimal::from(125));
        assert_eq!(reconciliation.remaining_budget, Decimal::from(-25));
        assert_eq!(reconciliation.wage_percentage, Decimal::from(90));
        assert!(reconciliation.is_over_budget());
    }

    #[test]
    fn test_overflow_is_an_error() {
        assert_eq!(
            reconcile_budget(Decimal::MAX, Decimal::MAX, [Decimal::ONE]),
            Err(ValidationError::AmountOutOfRange {
                field: "totalExpenses"
            })
        );
        assert_eq!(
            reconcile_budget(Decimal::ONE, Decimal::ZERO, [Decimal::MAX, Decimal::MAX]),
            Err(ValidationError::AmountOutOfRange {
                field: "otherExpenses"
            })
        );
        assert_eq!(
            reconcile_budget(Decimal::ONE, Decimal::MAX, []),
            Err(ValidationError::AmountOutOfRange {
                field: "wagePercentage"
            })
        );
    }
}
