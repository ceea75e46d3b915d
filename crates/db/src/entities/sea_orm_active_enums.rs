//! `SeaORM` active enums mirroring the database enum types.
//!
//! Database values are lowercase; conversions to and from the core domain
//! enums live here so repositories never match on strings.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use centavo_core::transaction as domain;

/// Transaction type classification (`transaction_type` enum).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_type")]
pub enum TransactionType {
    /// Money coming in.
    #[sea_orm(string_value = "income")]
    Income,
    /// Money going out.
    #[sea_orm(string_value = "expense")]
    Expense,
    /// Movement between the user's own accounts.
    #[sea_orm(string_value = "transfer")]
    Transfer,
    /// Recurring template.
    #[sea_orm(string_value = "recurring")]
    Recurring,
    /// Installment child or parent anchor.
    #[sea_orm(string_value = "installment")]
    Installment,
}

/// Transaction lifecycle status (`transaction_status` enum).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_status")]
pub enum TransactionStatus {
    /// Planned, not yet settled.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Settled outgoing money.
    #[sea_orm(string_value = "paid")]
    Paid,
    /// Settled incoming money.
    #[sea_orm(string_value = "received")]
    Received,
    /// Finished without a money event.
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Abandoned before settlement.
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// Recurrence cadence (`recurrence_pattern` enum).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "recurrence_pattern")]
pub enum RecurrencePattern {
    /// Once a month.
    #[sea_orm(string_value = "monthly")]
    Monthly,
    /// Once a week.
    #[sea_orm(string_value = "weekly")]
    Weekly,
    /// Once a year.
    #[sea_orm(string_value = "yearly")]
    Yearly,
}

impl From<domain::TransactionType> for TransactionType {
    fn from(value: domain::TransactionType) -> Self {
        match value {
            domain::TransactionType::Income => Self::Income,
            domain::TransactionType::Expense => Self::Expense,
            domain::TransactionType::Transfer => Self::Transfer,
            domain::TransactionType::Recurring => Self::Recurring,
            domain::TransactionType::Installment => Self::Installment,
        }
    }
}

impl From<TransactionType> for domain::TransactionType {
    fn from(value: TransactionType) -> Self {
        match value {
            TransactionType::Income => Self::Income,
            TransactionType::Expense => Self::Expense,
            TransactionType::Transfer => Self::Transfer,
            TransactionType::Recurring => Self::Recurring,
            TransactionType::Installment => Self::Installment,
        }
    }
}

impl From<domain::TransactionStatus> for TransactionStatus {
    fn from(value: domain::TransactionStatus) -> Self {
        match value {
            domain::TransactionStatus::Pending => Self::Pending,
            domain::TransactionStatus::Paid => Self::Paid,
            domain::TransactionStatus::Received => Self::Received,
            domain::TransactionStatus::Completed => Self::Completed,
            domain::TransactionStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<TransactionStatus> for domain::TransactionStatus {
    fn from(value: TransactionStatus) -> Self {
        match value {
            TransactionStatus::Pending => Self::Pending,
            TransactionStatus::Paid => Self::Paid,
            TransactionStatus::Received => Self::Received,
            TransactionStatus::Completed => Self::Completed,
            TransactionStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<domain::RecurrencePattern> for RecurrencePattern {
    fn from(value: domain::RecurrencePattern) -> Self {
        match value {
            domain::RecurrencePattern::Monthly => Self::Monthly,
            domain::RecurrencePattern::Weekly => Self::Weekly,
            domain::RecurrencePattern::Yearly => Self::Yearly,
        }
    }
}

impl From<RecurrencePattern> for domain::RecurrencePattern {
    fn from(value: RecurrencePattern) -> Self {
        match value {
            RecurrencePattern::Monthly => Self::Monthly,
            RecurrencePattern::Weekly => Self::Weekly,
            RecurrencePattern::Yearly => Self::Yearly,
        }
    }
}
