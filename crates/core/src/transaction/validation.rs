//! Record invariant validation.
//!
//! Creation requests and stored records are validated against the same
//! rules; the store refuses to persist anything that fails here.

use crate::installment::{MAX_INSTALLMENTS, MIN_INSTALLMENTS};
use crate::transaction::error::DomainError;
use crate::transaction::types::{
    NewTransaction, NewTransactionKind, TransactionPatch, TransactionRecord, TransactionType,
};

/// Validates a creation request.
///
/// # Errors
///
/// Returns the first violated rule: empty description, negative amount,
/// due date before date, or an out-of-range installment count.
pub fn validate_new_transaction(input: &NewTransaction) -> Result<(), DomainError> {
    if input.description.trim().is_empty() {
        return Err(DomainError::EmptyDescription);
    }
    if input.amount_in_cents.is_negative() {
        return Err(DomainError::NegativeAmount(
            input.amount_in_cents.into_inner(),
        ));
    }
    if let Some(due_date) = input.due_date
        && due_date < input.date
    {
        return Err(DomainError::DueDateBeforeDate {
            date: input.date,
            due_date,
        });
    }
    if let NewTransactionKind::Installment { total_installments } = input.kind
        && !(MIN_INSTALLMENTS..=MAX_INSTALLMENTS).contains(&total_installments)
    {
        return Err(DomainError::InstallmentCountOutOfRange(total_installments));
    }
    Ok(())
}

/// Validates a stored record against the full invariant set.
///
/// # Errors
///
/// Returns the first violated invariant. Checks everything
/// `validate_new_transaction` checks plus the cross-field rules only a
/// materialized record can violate: installment/recurrence field coupling
/// and the `date_occurred` / status relationship.
pub fn validate_record(record: &TransactionRecord) -> Result<(), DomainError> {
    if record.description.trim().is_empty() {
        return Err(DomainError::EmptyDescription);
    }
    if record.amount_in_cents.is_negative() {
        return Err(DomainError::NegativeAmount(
            record.amount_in_cents.into_inner(),
        ));
    }
    if let Some(due_date) = record.due_date
        && due_date < record.date
    {
        return Err(DomainError::DueDateBeforeDate {
            date: record.date,
            due_date,
        });
    }

    validate_installment_fields(record)?;
    validate_recurrence_fields(record)?;

    // date_occurred is set iff the status is a settled one.
    if record.date_occurred.is_some() != record.status.is_settled() {
        return Err(DomainError::DateOccurredStatusMismatch);
    }

    Ok(())
}

fn validate_installment_fields(record: &TransactionRecord) -> Result<(), DomainError> {
    if record.transaction_type == TransactionType::Installment {
        let Some(total) = record.total_installments else {
            return Err(DomainError::InstallmentCountOutOfRange(0));
        };
        if !(MIN_INSTALLMENTS..=MAX_INSTALLMENTS).contains(&total) {
            return Err(DomainError::InstallmentCountOutOfRange(total));
        }
        match record.installment_number {
            // The parent anchor carries no number but also no parent link.
            None => {
                if record.parent_transaction_id.is_some() {
                    return Err(DomainError::MissingParentReference);
                }
            }
            Some(number) => {
                if number < 1 || number > total {
                    return Err(DomainError::InstallmentNumberOutOfRange { number, total });
                }
                if record.parent_transaction_id.is_none() {
                    return Err(DomainError::MissingParentReference);
                }
            }
        }
    } else if record.installment_number.is_some() || record.total_installments.is_some() {
        return Err(DomainError::UnexpectedInstallmentFields);
    }
    Ok(())
}

fn validate_recurrence_fields(record: &TransactionRecord) -> Result<(), DomainError> {
    if record.transaction_type == TransactionType::Recurring {
        if record.recurrence_pattern.is_none() {
            return Err(DomainError::MissingRecurrencePattern);
        }
        if let Some(next_occurrence) = record.next_occurrence
            && next_occurrence <= record.date
        {
            return Err(DomainError::NextOccurrenceNotAfterDate {
                date: record.date,
                next_occurrence,
            });
        }
    } else if record.recurrence_pattern.is_some() || record.next_occurrence.is_some() {
        return Err(DomainError::UnexpectedRecurrenceFields);
    }
    Ok(())
}

/// Validates a field patch against the record it would be applied to.
///
/// # Errors
///
/// Returns `EmptyDescription`, `NegativeAmount`, or `DueDateBeforeDate`
/// for the patched values.
pub fn validate_patch(
    record: &TransactionRecord,
    patch: &TransactionPatch,
) -> Result<(), DomainError> {
    if let Some(description) = &patch.description
        && description.trim().is_empty()
    {
        return Err(DomainError::EmptyDescription);
    }
    if let Some(amount) = patch.amount_in_cents
        && amount.is_negative()
    {
        return Err(DomainError::NegativeAmount(amount.into_inner()));
    }

    let date = patch.date.unwrap_or(record.date);
    let due_date = patch.due_date.or(record.due_date);
    if let Some(due_date) = due_date
        && due_date < date
    {
        return Err(DomainError::DueDateBeforeDate { date, due_date });
    }
    Ok(())
}
