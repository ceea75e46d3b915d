//! Domain error types.

use chrono::NaiveDate;
use thiserror::Error;

use crate::transaction::types::{TransactionStatus, TransactionType};

/// Errors produced by domain validation and state rules.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    // ========== Field Validation ==========
    /// Description must not be empty.
    #[error("Description must not be empty")]
    EmptyDescription,

    /// Amounts are non-negative.
    #[error("Amount must not be negative: {0} cents")]
    NegativeAmount(i64),

    /// Due date precedes the planned date.
    #[error("Due date {due_date} is before the transaction date {date}")]
    DueDateBeforeDate {
        /// Planned date.
        date: NaiveDate,
        /// Offending due date.
        due_date: NaiveDate,
    },

    // ========== Installment Fields ==========
    /// Installment count outside the supported range.
    #[error("Installment count must be between 2 and 60, got {0}")]
    InstallmentCountOutOfRange(i32),

    /// Installment number outside `1..=total`.
    #[error("Installment number {number} is outside 1..={total}")]
    InstallmentNumberOutOfRange {
        /// Offending installment number.
        number: i32,
        /// Total installments of the purchase.
        total: i32,
    },

    /// Installment fields on a non-installment transaction.
    #[error("Installment fields are only valid on INSTALLMENT transactions")]
    UnexpectedInstallmentFields,

    /// An installment child must reference its parent anchor.
    #[error("Installment child is missing its parent reference")]
    MissingParentReference,

    // ========== Recurrence Fields ==========
    /// Recurrence fields on a non-recurring transaction.
    #[error("Recurrence fields are only valid on RECURRING transactions")]
    UnexpectedRecurrenceFields,

    /// A recurring template must carry a pattern.
    #[error("Recurring transaction is missing its recurrence pattern")]
    MissingRecurrencePattern,

    /// `next_occurrence` must be strictly after the template date.
    #[error("Next occurrence {next_occurrence} is not after the template date {date}")]
    NextOccurrenceNotAfterDate {
        /// Template date.
        date: NaiveDate,
        /// Offending pointer.
        next_occurrence: NaiveDate,
    },

    // ========== Status ==========
    /// Transition not in the allowed table.
    #[error("Cannot transition a {transaction_type} transaction from {from} to {to}")]
    InvalidTransition {
        /// Type of the transaction.
        transaction_type: TransactionType,
        /// Current status.
        from: TransactionStatus,
        /// Requested status.
        to: TransactionStatus,
    },

    /// `date_occurred` is set exactly for PAID/RECEIVED.
    #[error("date_occurred must be set exactly when status is PAID or RECEIVED")]
    DateOccurredStatusMismatch,

    // ========== Calendar ==========
    /// Month number outside `1..=12`.
    #[error("Month number must be between 1 and 12, got {0}")]
    MonthOutOfRange(u32),

    /// Date arithmetic left the supported calendar range.
    #[error("Date arithmetic overflowed the supported calendar range")]
    DateOverflow,

    // ========== Amounts ==========
    /// Total purchase amount does not fit in 64-bit cents.
    #[error("Amount arithmetic overflowed")]
    AmountOverflow,
}
