//! Status transition rules and settlement effects.
//!
//! PENDING is the only non-terminal state. The legal transitions are:
//!
//! | from    | to        | allowed for                  |
//! |---------|-----------|------------------------------|
//! | PENDING | PAID      | EXPENSE, INSTALLMENT         |
//! | PENDING | RECEIVED  | INCOME                       |
//! | PENDING | COMPLETED | TRANSFER, RECURRING          |
//! | PENDING | CANCELLED | every type                   |
//!
//! Transitions into PAID or RECEIVED stamp `date_occurred`; nothing else
//! touches it. Settled and cancelled records never go back to PENDING.

use crate::transaction::{DomainError, TransactionStatus, TransactionType};

/// Validates a requested status transition.
///
/// # Errors
///
/// Returns `DomainError::InvalidTransition` when the transition is not in
/// the allowed table, including polarity mismatches (PAID on an income,
/// RECEIVED on an expense) and any transition out of a terminal state.
pub fn validate_transition(
    transaction_type: TransactionType,
    from: TransactionStatus,
    to: TransactionStatus,
) -> Result<(), DomainError> {
    let allowed = from == TransactionStatus::Pending
        && match to {
            TransactionStatus::Paid => matches!(
                transaction_type,
                TransactionType::Expense | TransactionType::Installment
            ),
            TransactionStatus::Received => transaction_type == TransactionType::Income,
            TransactionStatus::Completed => matches!(
                transaction_type,
                TransactionType::Transfer | TransactionType::Recurring
            ),
            TransactionStatus::Cancelled => true,
            TransactionStatus::Pending => false,
        };

    if allowed {
        Ok(())
    } else {
        Err(DomainError::InvalidTransition {
            transaction_type,
            from,
            to,
        })
    }
}

/// Returns true when entering `status` stamps `date_occurred`.
#[must_use]
pub const fn stamps_date_occurred(status: TransactionStatus) -> bool {
    status.is_settled()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ALL_STATUSES: [TransactionStatus; 5] = [
        TransactionStatus::Pending,
        TransactionStatus::Paid,
        TransactionStatus::Received,
        TransactionStatus::Completed,
        TransactionStatus::Cancelled,
    ];

    #[test]
    fn test_expense_paid_allowed() {
        assert!(
            validate_transition(
                TransactionType::Expense,
                TransactionStatus::Pending,
                TransactionStatus::Paid
            )
            .is_ok()
        );
    }

    #[test]
    fn test_installment_paid_allowed() {
        assert!(
            validate_transition(
                TransactionType::Installment,
                TransactionStatus::Pending,
                TransactionStatus::Paid
            )
            .is_ok()
        );
    }

    #[test]
    fn test_income_received_allowed() {
        assert!(
            validate_transition(
                TransactionType::Income,
                TransactionStatus::Pending,
                TransactionStatus::Received
            )
            .is_ok()
        );
    }

    #[test]
    fn test_polarity_mismatch_rejected() {
        // Income cannot be PAID.
        assert!(
            validate_transition(
                TransactionType::Income,
                TransactionStatus::Pending,
                TransactionStatus::Paid
            )
            .is_err()
        );
        // Expense cannot be RECEIVED.
        assert!(
            validate_transition(
                TransactionType::Expense,
                TransactionStatus::Pending,
                TransactionStatus::Received
            )
            .is_err()
        );
    }

    #[test]
    fn test_paid_is_terminal() {
        // Once PAID, a re-transition to RECEIVED or back to PENDING fails.
        for to in ALL_STATUSES {
            assert!(
                validate_transition(TransactionType::Expense, TransactionStatus::Paid, to)
                    .is_err(),
                "PAID -> {to} should be rejected"
            );
        }
    }

    #[test]
    fn test_cancel_from_pending_any_type() {
        for ty in TransactionType::ALL {
            assert!(
                validate_transition(ty, TransactionStatus::Pending, TransactionStatus::Cancelled)
                    .is_ok()
            );
        }
    }

    #[test]
    fn test_cancel_after_settlement_rejected() {
        assert!(
            validate_transition(
                TransactionType::Expense,
                TransactionStatus::Paid,
                TransactionStatus::Cancelled
            )
            .is_err()
        );
        assert!(
            validate_transition(
                TransactionType::Income,
                TransactionStatus::Received,
                TransactionStatus::Cancelled
            )
            .is_err()
        );
    }

    #[test]
    fn test_completed_only_for_transfer_and_recurring() {
        assert!(
            validate_transition(
                TransactionType::Transfer,
                TransactionStatus::Pending,
                TransactionStatus::Completed
            )
            .is_ok()
        );
        assert!(
            validate_transition(
                TransactionType::Recurring,
                TransactionStatus::Pending,
                TransactionStatus::Completed
            )
            .is_ok()
        );
        for ty in [
            TransactionType::Income,
            TransactionType::Expense,
            TransactionType::Installment,
        ] {
            assert!(
                validate_transition(ty, TransactionStatus::Pending, TransactionStatus::Completed)
                    .is_err()
            );
        }
    }

    #[test]
    fn test_stamps_date_occurred() {
        assert!(stamps_date_occurred(TransactionStatus::Paid));
        assert!(stamps_date_occurred(TransactionStatus::Received));
        assert!(!stamps_date_occurred(TransactionStatus::Completed));
        assert!(!stamps_date_occurred(TransactionStatus::Cancelled));
        assert!(!stamps_date_occurred(TransactionStatus::Pending));
    }

    fn status_strategy() -> impl Strategy<Value = TransactionStatus> {
        prop_oneof![
            Just(TransactionStatus::Pending),
            Just(TransactionStatus::Paid),
            Just(TransactionStatus::Received),
            Just(TransactionStatus::Completed),
            Just(TransactionStatus::Cancelled),
        ]
    }

    fn type_strategy() -> impl Strategy<Value = TransactionType> {
        prop_oneof![
            Just(TransactionType::Income),
            Just(TransactionType::Expense),
            Just(TransactionType::Transfer),
            Just(TransactionType::Recurring),
            Just(TransactionType::Installment),
        ]
    }

    proptest! {
        /// No transition ever leaves a terminal state.
        #[test]
        fn prop_terminal_states_are_final(
            ty in type_strategy(),
            from in status_strategy(),
            to in status_strategy(),
        ) {
            if from.is_terminal() {
                prop_assert!(validate_transition(ty, from, to).is_err());
            }
        }

        /// A transition that stamps `date_occurred` is always a settlement
        /// with matching polarity.
        #[test]
        fn prop_stamping_implies_settlement_polarity(
            ty in type_strategy(),
            to in status_strategy(),
        ) {
            if validate_transition(ty, TransactionStatus::Pending, to).is_ok()
                && stamps_date_occurred(to)
            {
                let matches_polarity = match to {
                    TransactionStatus::Paid => matches!(
                        ty,
                        TransactionType::Expense | TransactionType::Installment
                    ),
                    TransactionStatus::Received => ty == TransactionType::Income,
                    _ => false,
                };
                prop_assert!(matches_polarity);
            }
        }

        /// PENDING is never a transition target.
        #[test]
        fn prop_pending_is_initial_only(
            ty in type_strategy(),
            from in status_strategy(),
        ) {
            prop_assert!(validate_transition(ty, from, TransactionStatus::Pending).is_err());
        }
    }
}
