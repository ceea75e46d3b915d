//! Derived values the client displays.
//!
//! All functions here are pure: sums, installment progress, purchase
//! totals, and the per-window income/expense summary.

use serde::Serialize;

use centavo_shared::types::Cents;

use crate::transaction::{TransactionRecord, TransactionType};

/// Sums the amounts of all records of the given type.
#[must_use]
pub fn sum_by_type(transactions: &[TransactionRecord], ty: TransactionType) -> Cents {
    transactions
        .iter()
        .filter(|t| t.transaction_type == ty)
        .map(|t| t.amount_in_cents)
        .sum()
}

/// Installment progress as a whole percentage in `0..=100`.
///
/// `installment_number / total_installments x 100`, rounded; `0` when
/// either field is absent (the parent anchor reports 0).
#[must_use]
pub fn progress(transaction: &TransactionRecord) -> i64 {
    match (
        transaction.installment_number,
        transaction.total_installments,
    ) {
        (Some(number), Some(total)) if total > 0 && number >= 0 => {
            let number = i64::from(number).clamp(0, i64::from(total));
            let total = i64::from(total);
            (number * 100 + total / 2) / total
        }
        _ => 0,
    }
}

/// The committed total of a record: `total_installments x amount` for
/// installment records, the plain amount otherwise.
#[must_use]
pub fn total_amount(transaction: &TransactionRecord) -> Cents {
    match transaction.total_installments {
        Some(total) if total > 0 => transaction.amount_in_cents.saturating_mul(i64::from(total)),
        _ => transaction.amount_in_cents,
    }
}

/// Installments still ahead of this one: `total - number`, floored at 0;
/// 0 when the fields are absent.
#[must_use]
pub fn remaining_installments(transaction: &TransactionRecord) -> i32 {
    match (
        transaction.installment_number,
        transaction.total_installments,
    ) {
        (Some(number), Some(total)) => (total - number).max(0),
        _ => 0,
    }
}

/// Income/expense totals for a query window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSummary {
    /// Sum of INCOME amounts.
    pub income_in_cents: Cents,
    /// Sum of EXPENSE, RECURRING, and INSTALLMENT amounts — the client's
    /// "expenses" grouping.
    pub expenses_in_cents: Cents,
    /// `income - expenses`, may be negative.
    pub balance_in_cents: Cents,
}

/// Computes the income/expense summary over a record set.
#[must_use]
pub fn period_summary(transactions: &[TransactionRecord]) -> PeriodSummary {
    let income_in_cents = sum_by_type(transactions, TransactionType::Income);
    let expenses_in_cents: Cents = transactions
        .iter()
        .filter(|t| t.transaction_type.is_outgoing())
        .map(|t| t.amount_in_cents)
        .sum();
    let balance_in_cents = Cents::new(
        income_in_cents
            .into_inner()
            .saturating_sub(expenses_in_cents.into_inner()),
    );
    PeriodSummary {
        income_in_cents,
        expenses_in_cents,
        balance_in_cents,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::TransactionStatus;
    use centavo_shared::types::{TransactionId, UserId};
    use chrono::{NaiveDate, Utc};
    use proptest::prelude::*;

    fn record(ty: TransactionType, amount: i64) -> TransactionRecord {
        TransactionRecord {
            id: TransactionId::new(),
            user_id: UserId::new(),
            description: "x".to_string(),
            amount_in_cents: Cents::new(amount),
            date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            due_date: None,
            transaction_type: ty,
            status: TransactionStatus::Pending,
            date_occurred: None,
            installment_number: None,
            total_installments: None,
            parent_transaction_id: None,
            recurrence_pattern: None,
            next_occurrence: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn installment(number: i32, total: i32, amount: i64) -> TransactionRecord {
        let mut r = record(TransactionType::Installment, amount);
        r.installment_number = Some(number);
        r.total_installments = Some(total);
        r.parent_transaction_id = Some(TransactionId::new());
        r
    }

    #[test]
    fn test_sum_by_type() {
        let records = vec![
            record(TransactionType::Income, 100),
            record(TransactionType::Income, 250),
            record(TransactionType::Expense, 999),
        ];
        assert_eq!(
            sum_by_type(&records, TransactionType::Income),
            Cents::new(350)
        );
        assert_eq!(
            sum_by_type(&records, TransactionType::Expense),
            Cents::new(999)
        );
        assert_eq!(
            sum_by_type(&records, TransactionType::Transfer),
            Cents::ZERO
        );
    }

    #[test]
    fn test_progress_examples() {
        assert_eq!(progress(&installment(1, 10, 100)), 10);
        assert_eq!(progress(&installment(5, 10, 100)), 50);
        assert_eq!(progress(&installment(10, 10, 100)), 100);
        assert_eq!(progress(&installment(1, 3, 100)), 33);
        assert_eq!(progress(&installment(2, 3, 100)), 67);
    }

    #[test]
    fn test_progress_absent_fields_is_zero() {
        assert_eq!(progress(&record(TransactionType::Expense, 100)), 0);
        // Parent anchor: total set, number absent.
        let mut anchor = record(TransactionType::Installment, 100);
        anchor.total_installments = Some(10);
        assert_eq!(progress(&anchor), 0);
    }

    #[test]
    fn test_total_amount() {
        assert_eq!(
            total_amount(&installment(3, 10, 50_000)),
            Cents::new(500_000)
        );
        // Anchor has no number but still totals the purchase.
        let mut anchor = record(TransactionType::Installment, 50_000);
        anchor.total_installments = Some(10);
        assert_eq!(total_amount(&anchor), Cents::new(500_000));
        // Plain records report their own amount.
        assert_eq!(
            total_amount(&record(TransactionType::Expense, 1_234)),
            Cents::new(1_234)
        );
    }

    #[test]
    fn test_remaining_installments() {
        assert_eq!(remaining_installments(&installment(3, 10, 100)), 7);
        assert_eq!(remaining_installments(&installment(10, 10, 100)), 0);
        assert_eq!(remaining_installments(&record(TransactionType::Expense, 1)), 0);
    }

    #[test]
    fn test_period_summary_groups_outgoing() {
        let records = vec![
            record(TransactionType::Income, 1_000),
            record(TransactionType::Expense, 300),
            record(TransactionType::Recurring, 200),
            installment(1, 4, 100),
            record(TransactionType::Transfer, 5_000),
        ];
        let summary = period_summary(&records);
        assert_eq!(summary.income_in_cents, Cents::new(1_000));
        assert_eq!(summary.expenses_in_cents, Cents::new(600));
        assert_eq!(summary.balance_in_cents, Cents::new(400));
    }

    proptest! {
        /// Progress is bounded in 0..=100 and non-decreasing in the
        /// installment number for a fixed total.
        #[test]
        fn prop_progress_bounded_and_monotone(total in 1i32..=60) {
            let mut previous = 0;
            for number in 1..=total {
                let p = progress(&installment(number, total, 100));
                prop_assert!((0..=100).contains(&p));
                prop_assert!(p >= previous, "progress regressed at {number}/{total}");
                previous = p;
            }
            prop_assert_eq!(progress(&installment(total, total, 100)), 100);
        }

        /// The summary balance is exactly income minus expenses.
        #[test]
        fn prop_summary_balance(
            income in proptest::collection::vec(0i64..1_000_000, 0..8),
            expenses in proptest::collection::vec(0i64..1_000_000, 0..8),
        ) {
            let mut records: Vec<TransactionRecord> = income
                .iter()
                .map(|&a| record(TransactionType::Income, a))
                .collect();
            records.extend(expenses.iter().map(|&a| record(TransactionType::Expense, a)));

            let summary = period_summary(&records);
            let expected = income.iter().sum::<i64>() - expenses.iter().sum::<i64>();
            prop_assert_eq!(summary.balance_in_cents, Cents::new(expected));
        }
    }
}
