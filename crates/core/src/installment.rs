//! Expansion of an installment purchase into N equal children.
//!
//! A purchase request with `total_installments = N` materializes as one
//! parent anchor (no installment number) plus N numbered children. The
//! plan computed here is pure; the store inserts it atomically.

use chrono::NaiveDate;

use centavo_shared::types::Cents;

use crate::calendar::add_months;
use crate::transaction::DomainError;

/// Minimum number of installments in a purchase.
pub const MIN_INSTALLMENTS: i32 = 2;
/// Maximum number of installments in a purchase.
pub const MAX_INSTALLMENTS: i32 = 60;

/// One planned child of an installment purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedInstallment {
    /// 1-based position among the siblings.
    pub installment_number: i32,
    /// Planned date: the base date advanced `number - 1` months.
    pub date: NaiveDate,
    /// Due date, equal to the planned date.
    pub due_date: NaiveDate,
    /// Per-installment amount, identical across siblings.
    pub amount_in_cents: Cents,
}

/// The full expansion plan for an installment purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallmentPlan {
    /// Per-installment amount.
    pub per_installment: Cents,
    /// Number of children.
    pub total_installments: i32,
    /// Date of the first installment (the anchor's date).
    pub first_date: NaiveDate,
    /// The planned children, ordered by installment number.
    pub children: Vec<PlannedInstallment>,
}

impl InstallmentPlan {
    /// The committed purchase total: `total_installments x per_installment`.
    #[must_use]
    pub fn total_committed(&self) -> Cents {
        self.per_installment
            .saturating_mul(i64::from(self.total_installments))
    }
}

/// Plans the expansion of an installment purchase.
///
/// The k-th child is dated `first_date + (k - 1)` months with month-end
/// clamping, carries the identical per-installment amount, and is due on
/// its own date.
///
/// # Errors
///
/// Returns `InstallmentCountOutOfRange` for counts outside `2..=60`,
/// `NegativeAmount` for a negative per-installment amount,
/// `AmountOverflow` if the committed total does not fit in 64-bit cents,
/// and `DateOverflow` if a child date leaves the calendar range.
pub fn plan_installments(
    per_installment: Cents,
    first_date: NaiveDate,
    total_installments: i32,
) -> Result<InstallmentPlan, DomainError> {
    if !(MIN_INSTALLMENTS..=MAX_INSTALLMENTS).contains(&total_installments) {
        return Err(DomainError::InstallmentCountOutOfRange(total_installments));
    }
    if per_installment.is_negative() {
        return Err(DomainError::NegativeAmount(per_installment.into_inner()));
    }
    per_installment
        .checked_mul(i64::from(total_installments))
        .ok_or(DomainError::AmountOverflow)?;

    let mut children = Vec::with_capacity(usize::try_from(total_installments).unwrap_or(0));
    for k in 1..=total_installments {
        #[allow(clippy::cast_sign_loss)]
        let offset = (k - 1) as u32;
        let date = add_months(first_date, offset)?;
        children.push(PlannedInstallment {
            installment_number: k,
            date,
            due_date: date,
            amount_in_cents: per_installment,
        });
    }

    Ok(InstallmentPlan {
        per_installment,
        total_installments,
        first_date,
        children,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_notebook_purchase_scenario() {
        // 10 monthly installments of R$500.00 starting 2024-01-10.
        let plan = plan_installments(Cents::new(50_000), date(2024, 1, 10), 10).unwrap();

        assert_eq!(plan.children.len(), 10);
        assert_eq!(plan.total_committed(), Cents::new(500_000));

        for (i, child) in plan.children.iter().enumerate() {
            let k = i32::try_from(i).unwrap() + 1;
            assert_eq!(child.installment_number, k);
            assert_eq!(child.amount_in_cents, Cents::new(50_000));
            assert_eq!(child.due_date, child.date);
        }
        assert_eq!(plan.children[0].date, date(2024, 1, 10));
        assert_eq!(plan.children[1].date, date(2024, 2, 10));
        assert_eq!(plan.children[9].date, date(2024, 10, 10));
    }

    #[test]
    fn test_month_end_schedule_clamps() {
        let plan = plan_installments(Cents::new(10_000), date(2024, 1, 31), 4).unwrap();
        let dates: Vec<NaiveDate> = plan.children.iter().map(|c| c.date).collect();
        assert_eq!(
            dates,
            vec![
                date(2024, 1, 31),
                date(2024, 2, 29),
                date(2024, 3, 31),
                date(2024, 4, 30),
            ]
        );
    }

    #[test]
    fn test_count_bounds_rejected() {
        for total in [-1, 0, 1, 61] {
            assert_eq!(
                plan_installments(Cents::new(1_000), date(2024, 1, 1), total),
                Err(DomainError::InstallmentCountOutOfRange(total))
            );
        }
    }

    #[test]
    fn test_negative_amount_rejected() {
        assert_eq!(
            plan_installments(Cents::new(-100), date(2024, 1, 1), 3),
            Err(DomainError::NegativeAmount(-100))
        );
    }

    #[test]
    fn test_total_overflow_rejected() {
        assert_eq!(
            plan_installments(Cents::new(i64::MAX / 2), date(2024, 1, 1), 3),
            Err(DomainError::AmountOverflow)
        );
    }

    proptest! {
        /// For any valid request, exactly `total` children exist and the
        /// committed amount equals `total x per_installment`.
        #[test]
        fn prop_count_and_total_invariants(
            amount in 0i64..10_000_000,
            total in MIN_INSTALLMENTS..=MAX_INSTALLMENTS,
            year in 2000i32..2100,
            month in 1u32..=12,
            day in 1u32..=28,
        ) {
            let first = NaiveDate::from_ymd_opt(year, month, day).unwrap();
            let plan = plan_installments(Cents::new(amount), first, total).unwrap();

            prop_assert_eq!(plan.children.len(), usize::try_from(total).unwrap());

            let sum: Cents = plan.children.iter().map(|c| c.amount_in_cents).sum();
            prop_assert_eq!(sum, Cents::new(amount).saturating_mul(i64::from(total)));
            prop_assert_eq!(sum, plan.total_committed());
        }

        /// Child dates are strictly increasing and numbered 1..=total.
        #[test]
        fn prop_schedule_is_ordered(
            total in MIN_INSTALLMENTS..=MAX_INSTALLMENTS,
            year in 2000i32..2100,
            month in 1u32..=12,
            day in 1u32..=31,
        ) {
            let Some(first) = NaiveDate::from_ymd_opt(year, month, day) else {
                return Ok(());
            };
            let plan = plan_installments(Cents::new(1_000), first, total).unwrap();

            for window in plan.children.windows(2) {
                prop_assert!(window[0].date < window[1].date);
                prop_assert_eq!(
                    window[0].installment_number + 1,
                    window[1].installment_number
                );
            }
            prop_assert_eq!(plan.children[0].installment_number, 1);
            prop_assert_eq!(
                plan.children.last().unwrap().installment_number,
                total
            );
        }

        /// Out-of-range counts never produce a plan.
        #[test]
        fn prop_out_of_range_counts_rejected(
            total in prop_oneof![i32::MIN..MIN_INSTALLMENTS, (MAX_INSTALLMENTS + 1)..i32::MAX],
        ) {
            let result = plan_installments(Cents::new(1_000), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), total);
            prop_assert_eq!(result, Err(DomainError::InstallmentCountOutOfRange(total)));
        }
    }
}
