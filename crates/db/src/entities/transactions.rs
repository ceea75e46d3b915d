//! `SeaORM` Entity for transactions table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{RecurrencePattern, TransactionStatus, TransactionType};

/// Transaction row.
///
/// Installment children and materialized recurrence occurrences link to
/// their anchor/template through `parent_transaction_id`, forming a
/// one-level tree.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// Human description.
    pub description: String,
    /// Amount in whole cents (per installment for installment records).
    pub amount_in_cents: i64,
    /// Planned/expected date.
    pub date: Date,
    /// Optional due date, `>= date`.
    pub due_date: Option<Date>,
    /// Type classification.
    pub transaction_type: TransactionType,
    /// Lifecycle status.
    pub status: TransactionStatus,
    /// Set exactly while status is paid/received.
    pub date_occurred: Option<DateTimeWithTimeZone>,
    /// 1-based installment position; NULL on the parent anchor.
    pub installment_number: Option<i32>,
    /// Total installments of the purchase.
    pub total_installments: Option<i32>,
    /// Parent anchor or recurring template.
    pub parent_transaction_id: Option<Uuid>,
    /// Cadence, recurring templates only.
    pub recurrence_pattern: Option<RecurrencePattern>,
    /// Next occurrence pointer, recurring templates only.
    pub next_occurrence: Option<Date>,
    /// Insert timestamp, store-stamped.
    pub created_at: DateTimeWithTimeZone,
    /// Write timestamp, store-stamped; optimistic-lock token.
    pub updated_at: DateTimeWithTimeZone,
}

/// Entity relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Owning user.
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
    /// Parent anchor / recurring template.
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentTransactionId",
        to = "Column::Id"
    )]
    Parent,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
