//! Transaction domain types and validation.
//!
//! - Transaction records, creation inputs, and field patches
//! - Record invariant validation
//! - Error types for domain operations

pub mod error;
pub mod types;
pub mod validation;

pub use error::DomainError;
pub use types::{
    NewTransaction, NewTransactionKind, RecurrencePattern, TransactionPatch, TransactionRecord,
    TransactionStatus, TransactionType,
};
pub use validation::{validate_new_transaction, validate_patch, validate_record};
