//! Transaction repository for transaction store operations.
//!
//! All multi-record guarantees live here: installment expansion and parent
//! cascade deletes run inside one database transaction, and every write to
//! an existing record is guarded by an optimistic lock on `updated_at`.

use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnAcquireErr, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::debug;
use uuid::Uuid;

use centavo_core::installment::plan_installments;
use centavo_core::recurrence::{advance, plan_occurrence};
use centavo_core::status::{stamps_date_occurred, validate_transition};
use centavo_core::transaction::{
    DomainError, NewTransaction, NewTransactionKind, TransactionPatch, TransactionRecord,
    TransactionStatus, TransactionType, validate_new_transaction, validate_patch,
};
use centavo_shared::AppError;
use centavo_shared::types::{Cents, TransactionId, UserId};

use crate::entities::transactions;

/// Error types for transaction store operations.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    /// Transaction not found.
    #[error("Transaction not found: {0}")]
    NotFound(Uuid),

    /// The record is not a recurring template.
    #[error("Transaction {0} is not a recurring template")]
    NotRecurring(Uuid),

    /// The record is not an installment.
    #[error("Transaction {0} is not an installment")]
    NotInstallment(Uuid),

    /// Domain rule violation.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Concurrent modification detected.
    #[error("Concurrent modification detected for transaction {0}, please retry")]
    ConcurrentModification(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<TransactionError> for AppError {
    fn from(err: TransactionError) -> Self {
        match err {
            TransactionError::NotFound(id) => Self::NotFound(format!("Transaction {id}")),
            TransactionError::NotRecurring(_) | TransactionError::NotInstallment(_) => {
                Self::Validation(err.to_string())
            }
            TransactionError::Domain(domain) => match domain {
                DomainError::InvalidTransition { .. } => Self::InvalidTransition(domain.to_string()),
                other => Self::Validation(other.to_string()),
            },
            TransactionError::ConcurrentModification(_) => Self::Conflict(err.to_string()),
            TransactionError::Database(DbErr::ConnectionAcquire(ConnAcquireErr::Timeout)) => {
                Self::Timeout("The store did not respond in time, please try again".to_string())
            }
            TransactionError::Database(db) => Self::Database(db.to_string()),
        }
    }
}

/// A created transaction together with the children an installment
/// expansion produced.
#[derive(Debug, Clone)]
pub struct CreatedTransaction {
    /// The created record (the parent anchor for installment purchases).
    pub transaction: TransactionRecord,
    /// Installment children, ordered by installment number; empty for
    /// non-installment creations.
    pub installments: Vec<TransactionRecord>,
}

/// Result of materializing a recurring occurrence.
#[derive(Debug, Clone)]
pub struct MaterializedOccurrence {
    /// The settlement record for the period.
    pub occurrence: TransactionRecord,
    /// True when the period had already been materialized and the existing
    /// record was returned instead of a new one.
    pub already_existed: bool,
}

/// Transaction repository for store operations.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    db: DatabaseConnection,
}

impl TransactionRepository {
    /// Creates a new transaction repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a transaction from a validated request.
    ///
    /// INSTALLMENT requests expand into a parent anchor plus N children in
    /// one database transaction; a failure mid-expansion rolls everything
    /// back. RECURRING requests initialize the `next_occurrence` pointer
    /// one period after the template date.
    ///
    /// # Errors
    ///
    /// Returns a domain error for invalid input, or a database error.
    pub async fn create(
        &self,
        input: NewTransaction,
    ) -> Result<CreatedTransaction, TransactionError> {
        validate_new_transaction(&input)?;

        match input.kind {
            NewTransactionKind::Installment { total_installments } => {
                self.create_installment_purchase(&input, total_installments)
                    .await
            }
            NewTransactionKind::Recurring { pattern } => {
                let next_occurrence = advance(pattern, input.date)?;
                let model = self
                    .insert_record(
                        &self.db,
                        &input,
                        TransactionType::Recurring,
                        InsertExtras {
                            recurrence_pattern: Some(pattern),
                            next_occurrence: Some(next_occurrence),
                            ..InsertExtras::default()
                        },
                    )
                    .await?;
                Ok(CreatedTransaction {
                    transaction: to_record(model),
                    installments: Vec::new(),
                })
            }
            NewTransactionKind::Income | NewTransactionKind::Expense
            | NewTransactionKind::Transfer => {
                let model = self
                    .insert_record(
                        &self.db,
                        &input,
                        input.kind.transaction_type(),
                        InsertExtras::default(),
                    )
                    .await?;
                Ok(CreatedTransaction {
                    transaction: to_record(model),
                    installments: Vec::new(),
                })
            }
        }
    }

    /// Expands an installment purchase into anchor + children atomically.
    async fn create_installment_purchase(
        &self,
        input: &NewTransaction,
        total_installments: i32,
    ) -> Result<CreatedTransaction, TransactionError> {
        let plan = plan_installments(input.amount_in_cents, input.date, total_installments)?;

        let txn = self.db.begin().await?;

        let parent = self
            .insert_record(
                &txn,
                input,
                TransactionType::Installment,
                InsertExtras {
                    total_installments: Some(total_installments),
                    ..InsertExtras::default()
                },
            )
            .await?;

        let mut installments = Vec::with_capacity(plan.children.len());
        for child in &plan.children {
            let child_input = NewTransaction {
                date: child.date,
                due_date: Some(child.due_date),
                ..input.clone()
            };
            let model = self
                .insert_record(
                    &txn,
                    &child_input,
                    TransactionType::Installment,
                    InsertExtras {
                        installment_number: Some(child.installment_number),
                        total_installments: Some(total_installments),
                        parent_transaction_id: Some(parent.id),
                        ..InsertExtras::default()
                    },
                )
                .await?;
            installments.push(to_record(model));
        }

        txn.commit().await?;

        debug!(
            parent_id = %parent.id,
            children = installments.len(),
            "Installment purchase expanded"
        );

        Ok(CreatedTransaction {
            transaction: to_record(parent),
            installments,
        })
    }

    /// Inserts one record on the given connection (pool or transaction).
    async fn insert_record<C: ConnectionTrait>(
        &self,
        conn: &C,
        input: &NewTransaction,
        transaction_type: TransactionType,
        extras: InsertExtras,
    ) -> Result<transactions::Model, TransactionError> {
        let now = Utc::now().into();
        let record = transactions::ActiveModel {
            id: Set(TransactionId::new().into_inner()),
            user_id: Set(input.user_id.into_inner()),
            description: Set(input.description.clone()),
            amount_in_cents: Set(input.amount_in_cents.into_inner()),
            date: Set(input.date),
            due_date: Set(input.due_date),
            transaction_type: Set(transaction_type.into()),
            status: Set(TransactionStatus::Pending.into()),
            date_occurred: Set(None),
            installment_number: Set(extras.installment_number),
            total_installments: Set(extras.total_installments),
            parent_transaction_id: Set(extras.parent_transaction_id),
            recurrence_pattern: Set(extras.recurrence_pattern.map(Into::into)),
            next_occurrence: Set(extras.next_occurrence),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let model = record.insert(conn).await?;
        Ok(model)
    }

    /// Gets a transaction by id.
    ///
    /// # Errors
    ///
    /// Returns `TransactionError::NotFound` if absent or owned by another
    /// user, or a database error.
    pub async fn get(
        &self,
        user_id: Uuid,
        transaction_id: Uuid,
    ) -> Result<TransactionRecord, TransactionError> {
        let model = transactions::Entity::find_by_id(transaction_id)
            .filter(transactions::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?
            .ok_or(TransactionError::NotFound(transaction_id))?;
        Ok(to_record(model))
    }

    /// Gets an installment record (anchor or child) by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent, `NotInstallment` for other types.
    pub async fn get_installment(
        &self,
        user_id: Uuid,
        transaction_id: Uuid,
    ) -> Result<TransactionRecord, TransactionError> {
        let record = self.get(user_id, transaction_id).await?;
        if record.transaction_type != centavo_core::transaction::TransactionType::Installment {
            return Err(TransactionError::NotInstallment(transaction_id));
        }
        Ok(record)
    }

    /// Lists the installment children of a parent anchor, ordered by
    /// installment number.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`/`NotInstallment` for a bad parent id, or a
    /// database error.
    pub async fn installment_children(
        &self,
        user_id: Uuid,
        parent_id: Uuid,
    ) -> Result<Vec<TransactionRecord>, TransactionError> {
        // The parent must exist and be an installment record.
        self.get_installment(user_id, parent_id).await?;

        let children = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .filter(transactions::Column::ParentTransactionId.eq(parent_id))
            .filter(
                transactions::Column::TransactionType
                    .eq(crate::entities::sea_orm_active_enums::TransactionType::Installment),
            )
            .order_by_asc(transactions::Column::InstallmentNumber)
            .all(&self.db)
            .await?;

        Ok(children.into_iter().map(to_record).collect())
    }

    /// Lists transactions whose `date` falls inside the inclusive window,
    /// optionally restricted to a type set. Ordered by `date` ascending,
    /// ties broken by `created_at` ascending.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub async fn query(
        &self,
        user_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
        types: &[centavo_core::transaction::TransactionType],
    ) -> Result<Vec<TransactionRecord>, TransactionError> {
        let mut query = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .filter(transactions::Column::Date.gte(start_date))
            .filter(transactions::Column::Date.lte(end_date));

        if !types.is_empty() {
            let db_types: Vec<crate::entities::sea_orm_active_enums::TransactionType> =
                types.iter().map(|t| (*t).into()).collect();
            query = query.filter(transactions::Column::TransactionType.is_in(db_types));
        }

        let models = query
            .order_by_asc(transactions::Column::Date)
            .order_by_asc(transactions::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(to_record).collect())
    }

    /// Applies a field patch (description, amount, dates).
    ///
    /// Status is not patchable here; use `transition_status`. The write is
    /// guarded by the record's `updated_at`: a concurrent writer surfaces
    /// as `ConcurrentModification` and the caller re-fetches.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, a domain validation error, concurrent
    /// modification, or a database error.
    pub async fn update_fields(
        &self,
        user_id: Uuid,
        transaction_id: Uuid,
        patch: TransactionPatch,
    ) -> Result<TransactionRecord, TransactionError> {
        let record = self.get(user_id, transaction_id).await?;
        if patch.is_empty() {
            return Ok(record);
        }
        validate_patch(&record, &patch)?;

        let mut update = transactions::Entity::update_many()
            .filter(transactions::Column::Id.eq(transaction_id))
            .filter(transactions::Column::UserId.eq(user_id))
            .filter(transactions::Column::UpdatedAt.eq(record.updated_at))
            .col_expr(transactions::Column::UpdatedAt, Expr::value(Utc::now()));

        if let Some(description) = patch.description {
            update = update.col_expr(transactions::Column::Description, Expr::value(description));
        }
        if let Some(amount) = patch.amount_in_cents {
            update = update.col_expr(
                transactions::Column::AmountInCents,
                Expr::value(amount.into_inner()),
            );
        }
        if let Some(date) = patch.date {
            update = update.col_expr(transactions::Column::Date, Expr::value(date));
        }
        if let Some(due_date) = patch.due_date {
            update = update.col_expr(transactions::Column::DueDate, Expr::value(Some(due_date)));
        }

        let result = update.exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(TransactionError::ConcurrentModification(transaction_id));
        }

        self.get(user_id, transaction_id).await
    }

    /// Transitions a transaction's status through the status machine.
    ///
    /// Entering PAID or RECEIVED stamps `date_occurred`. Serialized per
    /// record via the `updated_at` optimistic lock, so two concurrent
    /// settlements cannot both succeed.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `Domain(InvalidTransition)`, concurrent
    /// modification, or a database error.
    pub async fn transition_status(
        &self,
        user_id: Uuid,
        transaction_id: Uuid,
        new_status: TransactionStatus,
    ) -> Result<TransactionRecord, TransactionError> {
        let record = self.get(user_id, transaction_id).await?;
        validate_transition(record.transaction_type, record.status, new_status)?;

        let date_occurred = stamps_date_occurred(new_status).then(Utc::now);
        let db_status: crate::entities::sea_orm_active_enums::TransactionStatus =
            new_status.into();

        let result = transactions::Entity::update_many()
            .filter(transactions::Column::Id.eq(transaction_id))
            .filter(transactions::Column::UserId.eq(user_id))
            .filter(transactions::Column::UpdatedAt.eq(record.updated_at))
            .col_expr(transactions::Column::Status, Expr::value(db_status))
            .col_expr(
                transactions::Column::DateOccurred,
                Expr::value(date_occurred),
            )
            .col_expr(transactions::Column::UpdatedAt, Expr::value(Utc::now()))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(TransactionError::ConcurrentModification(transaction_id));
        }

        debug!(
            transaction_id = %transaction_id,
            status = %new_status,
            "Status transition applied"
        );

        self.get(user_id, transaction_id).await
    }

    /// Deletes a transaction.
    ///
    /// Deleting an installment parent anchor removes the anchor and every
    /// child in one database transaction; a reader never observes a
    /// partially deleted purchase. The schema's `ON DELETE CASCADE`
    /// backs the same guarantee for any parent-linked records.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or a database error.
    pub async fn delete(
        &self,
        user_id: Uuid,
        transaction_id: Uuid,
    ) -> Result<(), TransactionError> {
        let record = self.get(user_id, transaction_id).await?;

        let txn = self.db.begin().await?;

        let removed_children = transactions::Entity::delete_many()
            .filter(transactions::Column::ParentTransactionId.eq(transaction_id))
            .exec(&txn)
            .await?
            .rows_affected;

        let removed = transactions::Entity::delete_by_id(transaction_id)
            .exec(&txn)
            .await?
            .rows_affected;
        if removed == 0 {
            // Deleted underneath us between the fetch and the delete.
            return Err(TransactionError::NotFound(transaction_id));
        }

        txn.commit().await?;

        debug!(
            transaction_id = %transaction_id,
            transaction_type = %record.transaction_type,
            children = removed_children,
            "Transaction deleted"
        );

        Ok(())
    }

    /// Materializes the due occurrence of a recurring template.
    ///
    /// Creates an EXPENSE settlement record dated at the template's
    /// current `next_occurrence` and advances the pointer, all in one
    /// database transaction with the template row locked. Idempotent per
    /// period: a second call for the same date returns the existing
    /// occurrence untouched.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `NotRecurring` for non-template records, or a
    /// database error.
    pub async fn materialize_occurrence(
        &self,
        user_id: Uuid,
        template_id: Uuid,
    ) -> Result<MaterializedOccurrence, TransactionError> {
        let txn = self.db.begin().await?;

        let template_model = transactions::Entity::find_by_id(template_id)
            .filter(transactions::Column::UserId.eq(user_id))
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(TransactionError::NotFound(template_id))?;
        let template = to_record(template_model);

        if template.transaction_type != centavo_core::transaction::TransactionType::Recurring {
            return Err(TransactionError::NotRecurring(template_id));
        }

        let plan = plan_occurrence(&template)?;

        // Period key: (template id, occurrence date). A second call for
        // the same period returns the existing record and only moves the
        // pointer forward.
        let existing = transactions::Entity::find()
            .filter(transactions::Column::ParentTransactionId.eq(template_id))
            .filter(transactions::Column::Date.eq(plan.date))
            .filter(
                transactions::Column::TransactionType
                    .eq(crate::entities::sea_orm_active_enums::TransactionType::Expense),
            )
            .one(&txn)
            .await?;
        if let Some(model) = existing {
            transactions::Entity::update_many()
                .filter(transactions::Column::Id.eq(template_id))
                .col_expr(
                    transactions::Column::NextOccurrence,
                    Expr::value(Some(plan.next_pointer)),
                )
                .col_expr(transactions::Column::UpdatedAt, Expr::value(Utc::now()))
                .exec(&txn)
                .await?;
            txn.commit().await?;
            return Ok(MaterializedOccurrence {
                occurrence: to_record(model),
                already_existed: true,
            });
        }

        let occurrence_input = NewTransaction {
            user_id: UserId::from_uuid(user_id),
            description: template.description.clone(),
            amount_in_cents: template.amount_in_cents,
            date: plan.date,
            due_date: Some(plan.date),
            kind: NewTransactionKind::Expense,
        };
        let occurrence = self
            .insert_record(
                &txn,
                &occurrence_input,
                TransactionType::Expense,
                InsertExtras {
                    parent_transaction_id: Some(template_id),
                    ..InsertExtras::default()
                },
            )
            .await?;

        transactions::Entity::update_many()
            .filter(transactions::Column::Id.eq(template_id))
            .col_expr(
                transactions::Column::NextOccurrence,
                Expr::value(Some(plan.next_pointer)),
            )
            .col_expr(transactions::Column::UpdatedAt, Expr::value(Utc::now()))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        debug!(
            template_id = %template_id,
            occurrence_date = %plan.date,
            next_pointer = %plan.next_pointer,
            "Recurring occurrence materialized"
        );

        Ok(MaterializedOccurrence {
            occurrence: to_record(occurrence),
            already_existed: false,
        })
    }
}

/// Optional columns of an insert, beyond the common creation fields.
#[derive(Debug, Clone, Default)]
struct InsertExtras {
    installment_number: Option<i32>,
    total_installments: Option<i32>,
    parent_transaction_id: Option<Uuid>,
    recurrence_pattern: Option<centavo_core::transaction::RecurrencePattern>,
    next_occurrence: Option<NaiveDate>,
}

/// Converts a database row into a core domain record.
fn to_record(model: transactions::Model) -> TransactionRecord {
    TransactionRecord {
        id: TransactionId::from_uuid(model.id),
        user_id: UserId::from_uuid(model.user_id),
        description: model.description,
        amount_in_cents: Cents::new(model.amount_in_cents),
        date: model.date,
        due_date: model.due_date,
        transaction_type: model.transaction_type.into(),
        status: model.status.into(),
        date_occurred: model.date_occurred.map(|d| d.with_timezone(&Utc)),
        installment_number: model.installment_number,
        total_installments: model.total_installments,
        parent_transaction_id: model.parent_transaction_id.map(TransactionId::from_uuid),
        recurrence_pattern: model.recurrence_pattern.map(Into::into),
        next_occurrence: model.next_occurrence,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::sea_orm_active_enums as db_enums;
    use centavo_core::transaction as domain;

    fn model(transaction_type: db_enums::TransactionType) -> transactions::Model {
        transactions::Model {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            description: "Internet".to_string(),
            amount_in_cents: 9_990,
            date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            due_date: None,
            transaction_type,
            status: db_enums::TransactionStatus::Pending,
            date_occurred: None,
            installment_number: None,
            total_installments: None,
            parent_transaction_id: None,
            recurrence_pattern: None,
            next_occurrence: None,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_to_record_maps_scalars() {
        let m = model(db_enums::TransactionType::Expense);
        let id = m.id;
        let record = to_record(m);
        assert_eq!(record.id.into_inner(), id);
        assert_eq!(record.amount_in_cents, Cents::new(9_990));
        assert_eq!(record.transaction_type, domain::TransactionType::Expense);
        assert_eq!(record.status, domain::TransactionStatus::Pending);
        assert!(record.date_occurred.is_none());
    }

    #[test]
    fn test_to_record_maps_recurrence() {
        let mut m = model(db_enums::TransactionType::Recurring);
        m.recurrence_pattern = Some(db_enums::RecurrencePattern::Monthly);
        m.next_occurrence = NaiveDate::from_ymd_opt(2024, 6, 2);
        let record = to_record(m);
        assert_eq!(
            record.recurrence_pattern,
            Some(domain::RecurrencePattern::Monthly)
        );
        assert_eq!(
            record.next_occurrence,
            NaiveDate::from_ymd_opt(2024, 6, 2)
        );
    }

    #[test]
    fn test_enum_conversion_roundtrip() {
        for ty in domain::TransactionType::ALL {
            let db_ty: db_enums::TransactionType = ty.into();
            let back: domain::TransactionType = db_ty.into();
            assert_eq!(back, ty);
        }
    }

    #[test]
    fn test_error_mapping() {
        let id = Uuid::new_v4();
        let app: AppError = TransactionError::NotFound(id).into();
        assert_eq!(app.status_code(), 404);

        let app: AppError = TransactionError::ConcurrentModification(id).into();
        assert_eq!(app.status_code(), 409);

        let app: AppError = TransactionError::Domain(DomainError::InvalidTransition {
            transaction_type: domain::TransactionType::Expense,
            from: domain::TransactionStatus::Paid,
            to: domain::TransactionStatus::Pending,
        })
        .into();
        assert_eq!(app.status_code(), 422);

        let app: AppError =
            TransactionError::Domain(DomainError::InstallmentCountOutOfRange(61)).into();
        assert_eq!(app.status_code(), 400);

        let app: AppError =
            TransactionError::Database(DbErr::ConnectionAcquire(ConnAcquireErr::Timeout)).into();
        assert_eq!(app.status_code(), 504);
    }
}
