//! Transaction domain types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use centavo_shared::types::{Cents, TransactionId, UserId};

/// Transaction type classification.
///
/// Wire representation is UPPERCASE, matching the mobile client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    /// Money coming in.
    Income,
    /// Money going out.
    Expense,
    /// Movement between the user's own accounts.
    Transfer,
    /// A template that periodically generates settlement occurrences.
    Recurring,
    /// One payment of a multi-payment purchase (or the parent anchor).
    Installment,
}

impl TransactionType {
    /// All transaction types, in wire order.
    pub const ALL: [Self; 5] = [
        Self::Income,
        Self::Expense,
        Self::Transfer,
        Self::Recurring,
        Self::Installment,
    ];

    /// Wire name of the type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Income => "INCOME",
            Self::Expense => "EXPENSE",
            Self::Transfer => "TRANSFER",
            Self::Recurring => "RECURRING",
            Self::Installment => "INSTALLMENT",
        }
    }

    /// Parses a wire name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "INCOME" => Some(Self::Income),
            "EXPENSE" => Some(Self::Expense),
            "TRANSFER" => Some(Self::Transfer),
            "RECURRING" => Some(Self::Recurring),
            "INSTALLMENT" => Some(Self::Installment),
            _ => None,
        }
    }

    /// Returns true for types the client groups under "expenses":
    /// plain expenses, recurring templates, and installments.
    #[must_use]
    pub const fn is_outgoing(self) -> bool {
        matches!(self, Self::Expense | Self::Recurring | Self::Installment)
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transaction lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionStatus {
    /// Initial state: the transaction is planned but not settled.
    Pending,
    /// Settled outgoing money (expenses and installments). Terminal.
    Paid,
    /// Settled incoming money (income). Terminal.
    Received,
    /// Finished without a money event (transfers, retired templates). Terminal.
    Completed,
    /// Abandoned before settlement. Terminal.
    Cancelled,
}

impl TransactionStatus {
    /// Wire name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Paid => "PAID",
            Self::Received => "RECEIVED",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Parses a wire name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(Self::Pending),
            "PAID" => Some(Self::Paid),
            "RECEIVED" => Some(Self::Received),
            "COMPLETED" => Some(Self::Completed),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns true once no further transitions are allowed.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Returns true for statuses that stamp `date_occurred`.
    #[must_use]
    pub const fn is_settled(self) -> bool {
        matches!(self, Self::Paid | Self::Received)
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recurrence cadence for RECURRING templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecurrencePattern {
    /// Once a month, same day-of-month (clamped to month end).
    Monthly,
    /// Once a week, same weekday.
    Weekly,
    /// Once a year, same month and day (Feb 29 clamps on non-leap years).
    Yearly,
}

impl RecurrencePattern {
    /// Wire name of the pattern.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Monthly => "MONTHLY",
            Self::Weekly => "WEEKLY",
            Self::Yearly => "YEARLY",
        }
    }

    /// Parses a wire name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "MONTHLY" => Some(Self::Monthly),
            "WEEKLY" => Some(Self::Weekly),
            "YEARLY" => Some(Self::Yearly),
            _ => None,
        }
    }
}

impl std::fmt::Display for RecurrencePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully materialized transaction record, as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Unique identifier, immutable.
    pub id: TransactionId,
    /// Owning user; transactions are never shared.
    pub user_id: UserId,
    /// Human description, non-empty.
    pub description: String,
    /// Amount in whole cents, non-negative. For installments this is the
    /// per-installment amount, not the purchase total.
    pub amount_in_cents: Cents,
    /// Planned/expected date.
    pub date: NaiveDate,
    /// Optional due date, `>= date` when present.
    pub due_date: Option<NaiveDate>,
    /// Type classification.
    pub transaction_type: TransactionType,
    /// Lifecycle status.
    pub status: TransactionStatus,
    /// Set exactly when status is PAID or RECEIVED.
    pub date_occurred: Option<DateTime<Utc>>,
    /// 1-based position among siblings; `None` on the parent anchor.
    pub installment_number: Option<i32>,
    /// Total sibling count, on the anchor and every child.
    pub total_installments: Option<i32>,
    /// Link to the parent anchor (installment children) or to the
    /// recurring template (materialized occurrences).
    pub parent_transaction_id: Option<TransactionId>,
    /// Cadence, RECURRING templates only.
    pub recurrence_pattern: Option<RecurrencePattern>,
    /// Next date an occurrence is due, strictly after `date`.
    pub next_occurrence: Option<NaiveDate>,
    /// Stamped by the store on insert.
    pub created_at: DateTime<Utc>,
    /// Stamped by the store on every write; doubles as the
    /// optimistic-lock token.
    pub updated_at: DateTime<Utc>,
}

/// Type-specific payload of a creation request.
///
/// A tagged union rather than a bag of optionals: requests cannot mix
/// installment fields into an income, or recurrence fields into an expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewTransactionKind {
    /// Plain income.
    Income,
    /// Plain expense.
    Expense,
    /// Transfer between own accounts.
    Transfer,
    /// Installment purchase: expands into an anchor plus N children.
    Installment {
        /// Number of installments, `2..=60`.
        total_installments: i32,
    },
    /// Recurring template.
    Recurring {
        /// Cadence of the template.
        pattern: RecurrencePattern,
    },
}

impl NewTransactionKind {
    /// The transaction type records of this kind carry.
    #[must_use]
    pub const fn transaction_type(&self) -> TransactionType {
        match self {
            Self::Income => TransactionType::Income,
            Self::Expense => TransactionType::Expense,
            Self::Transfer => TransactionType::Transfer,
            Self::Installment { .. } => TransactionType::Installment,
            Self::Recurring { .. } => TransactionType::Recurring,
        }
    }
}

/// A validated creation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    /// Owning user.
    pub user_id: UserId,
    /// Human description.
    pub description: String,
    /// Amount in cents (per installment for installment purchases).
    pub amount_in_cents: Cents,
    /// Planned date (first due date for installment purchases).
    pub date: NaiveDate,
    /// Optional due date.
    pub due_date: Option<NaiveDate>,
    /// Type-specific payload.
    pub kind: NewTransactionKind,
}

/// Fields an edit request may change.
///
/// Status is deliberately absent: status changes go through the status
/// machine so the `date_occurred` coupling cannot be bypassed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TransactionPatch {
    /// New description.
    pub description: Option<String>,
    /// New amount in cents.
    pub amount_in_cents: Option<Cents>,
    /// New planned date.
    pub date: Option<NaiveDate>,
    /// New due date.
    pub due_date: Option<NaiveDate>,
}

impl TransactionPatch {
    /// Returns true when the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.amount_in_cents.is_none()
            && self.date.is_none()
            && self.due_date.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_wire_names_roundtrip() {
        for ty in TransactionType::ALL {
            assert_eq!(TransactionType::parse(ty.as_str()), Some(ty));
        }
        assert_eq!(TransactionType::parse("JOURNAL"), None);
        assert_eq!(TransactionType::parse("income"), None);
    }

    #[test]
    fn test_status_terminality() {
        assert!(!TransactionStatus::Pending.is_terminal());
        assert!(TransactionStatus::Paid.is_terminal());
        assert!(TransactionStatus::Received.is_terminal());
        assert!(TransactionStatus::Completed.is_terminal());
        assert!(TransactionStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_settled_statuses() {
        assert!(TransactionStatus::Paid.is_settled());
        assert!(TransactionStatus::Received.is_settled());
        assert!(!TransactionStatus::Completed.is_settled());
        assert!(!TransactionStatus::Cancelled.is_settled());
        assert!(!TransactionStatus::Pending.is_settled());
    }

    #[test]
    fn test_outgoing_grouping() {
        assert!(TransactionType::Expense.is_outgoing());
        assert!(TransactionType::Recurring.is_outgoing());
        assert!(TransactionType::Installment.is_outgoing());
        assert!(!TransactionType::Income.is_outgoing());
        assert!(!TransactionType::Transfer.is_outgoing());
    }

    #[test]
    fn test_patch_rejects_unknown_fields() {
        let err = serde_json::from_str::<TransactionPatch>(r#"{"status":"PAID"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_patch_camel_case() {
        let patch: TransactionPatch =
            serde_json::from_str(r#"{"amountInCents": 1250, "dueDate": "2024-03-15"}"#).unwrap();
        assert_eq!(patch.amount_in_cents, Some(Cents::new(1250)));
        assert_eq!(
            patch.due_date,
            Some(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
        );
        assert!(patch.description.is_none());
    }
}
