//! Transaction routes: list, summary, create, get, edit, status, delete,
//! and recurrence materialization.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::AppState;
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use centavo_core::aggregate::{
    PeriodSummary, period_summary, progress, remaining_installments, total_amount,
};
use centavo_core::planner::current_month_window;
use centavo_core::transaction::{
    NewTransaction, NewTransactionKind, RecurrencePattern, TransactionPatch, TransactionRecord,
    TransactionStatus, TransactionType,
};
use centavo_db::TransactionRepository;
use centavo_shared::AppError;
use centavo_shared::types::{Cents, UserId};

/// Creates the transaction routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", get(list_transactions))
        .route("/transactions", post(create_transaction))
        .route("/transactions/summary", get(transactions_summary))
        .route("/transactions/{transaction_id}", get(get_transaction))
        .route("/transactions/{transaction_id}", put(update_transaction))
        .route("/transactions/{transaction_id}", delete(delete_transaction))
        .route("/transactions/{transaction_id}/status", put(update_status))
        .route(
            "/transactions/{transaction_id}/occurrences",
            post(materialize_occurrence),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing transactions.
#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    /// Window start (YYYY-MM-DD), inclusive.
    #[serde(rename = "startDate")]
    pub start_date: Option<NaiveDate>,
    /// Window end (YYYY-MM-DD), inclusive.
    #[serde(rename = "endDate")]
    pub end_date: Option<NaiveDate>,
    /// Comma-separated list of UPPERCASE type names.
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
}

/// Query parameters for fetching one transaction.
#[derive(Debug, Deserialize)]
pub struct GetTransactionQuery {
    /// Embed installment children in the response.
    #[serde(rename = "withInstallments", default)]
    pub with_installments: bool,
}

/// Request body for creating a transaction.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateTransactionRequest {
    /// Description.
    pub description: String,
    /// Amount in cents (per installment for INSTALLMENT requests).
    pub amount_in_cents: Cents,
    /// Planned date (first due date for INSTALLMENT requests).
    pub date: NaiveDate,
    /// Optional due date.
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// Transaction type (UPPERCASE).
    #[serde(rename = "type")]
    pub transaction_type: String,
    /// Installment count, INSTALLMENT only.
    #[serde(default)]
    pub total_installments: Option<i32>,
    /// Cadence, RECURRING only; defaults to MONTHLY.
    #[serde(default)]
    pub recurrence_pattern: Option<String>,
}

impl CreateTransactionRequest {
    /// Converts the wire request into a typed creation input, rejecting
    /// type/field mismatches at the boundary.
    fn into_new_transaction(self, user_id: Uuid) -> Result<NewTransaction, ApiError> {
        let transaction_type = TransactionType::parse(&self.transaction_type).ok_or_else(|| {
            ApiError(AppError::Validation(format!(
                "Unknown transaction type: {}",
                self.transaction_type
            )))
        })?;

        if transaction_type != TransactionType::Installment && self.total_installments.is_some() {
            return Err(ApiError(AppError::Validation(
                "totalInstallments is only valid for INSTALLMENT transactions".to_string(),
            )));
        }
        if transaction_type != TransactionType::Recurring && self.recurrence_pattern.is_some() {
            return Err(ApiError(AppError::Validation(
                "recurrencePattern is only valid for RECURRING transactions".to_string(),
            )));
        }

        let kind = match transaction_type {
            TransactionType::Income => NewTransactionKind::Income,
            TransactionType::Expense => NewTransactionKind::Expense,
            TransactionType::Transfer => NewTransactionKind::Transfer,
            TransactionType::Installment => {
                let total_installments = self.total_installments.ok_or_else(|| {
                    ApiError(AppError::Validation(
                        "totalInstallments is required for INSTALLMENT transactions".to_string(),
                    ))
                })?;
                NewTransactionKind::Installment { total_installments }
            }
            TransactionType::Recurring => {
                let pattern = match self.recurrence_pattern.as_deref() {
                    None => RecurrencePattern::Monthly,
                    Some(raw) => RecurrencePattern::parse(raw).ok_or_else(|| {
                        ApiError(AppError::Validation(format!(
                            "Unknown recurrence pattern: {raw}"
                        )))
                    })?,
                };
                NewTransactionKind::Recurring { pattern }
            }
        };

        Ok(NewTransaction {
            user_id: UserId::from_uuid(user_id),
            description: self.description,
            amount_in_cents: self.amount_in_cents,
            date: self.date,
            due_date: self.due_date,
            kind,
        })
    }
}

/// Request body for a status change.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    /// Target status (UPPERCASE).
    pub status: String,
}

/// Response for a transaction.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    /// Transaction ID.
    pub id: Uuid,
    /// Owning user ID.
    pub user_id: Uuid,
    /// Description.
    pub description: String,
    /// Amount in cents.
    pub amount_in_cents: Cents,
    /// Planned date.
    pub date: NaiveDate,
    /// Due date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    /// Transaction type.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// Lifecycle status.
    pub status: TransactionStatus,
    /// Settlement timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_occurred: Option<DateTime<Utc>>,
    /// Installment position.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installment_number: Option<i32>,
    /// Installment count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_installments: Option<i32>,
    /// Parent anchor / template link.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_transaction_id: Option<Uuid>,
    /// Recurrence cadence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence_pattern: Option<RecurrencePattern>,
    /// Next occurrence pointer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_occurrence: Option<NaiveDate>,
    /// Created timestamp.
    pub created_at: DateTime<Utc>,
    /// Updated timestamp.
    pub updated_at: DateTime<Utc>,
    /// Payment progress percentage, installment records only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<i64>,
    /// Committed purchase total, installment records only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_amount_in_cents: Option<Cents>,
    /// Installments still ahead, installment records only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_installments: Option<i32>,
    /// Embedded installment children, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installments: Option<Vec<TransactionResponse>>,
}

impl TransactionResponse {
    /// Builds a response from a domain record. Installment records carry
    /// the derived purchase figures alongside the raw fields.
    pub fn from_record(record: TransactionRecord) -> Self {
        let (progress, total_amount_in_cents, remaining) =
            if record.transaction_type == TransactionType::Installment {
                (
                    Some(progress(&record)),
                    Some(total_amount(&record)),
                    Some(remaining_installments(&record)),
                )
            } else {
                (None, None, None)
            };
        Self {
            id: record.id.into_inner(),
            user_id: record.user_id.into_inner(),
            description: record.description,
            amount_in_cents: record.amount_in_cents,
            date: record.date,
            due_date: record.due_date,
            transaction_type: record.transaction_type,
            status: record.status,
            date_occurred: record.date_occurred,
            installment_number: record.installment_number,
            total_installments: record.total_installments,
            parent_transaction_id: record.parent_transaction_id.map(|id| id.into_inner()),
            recurrence_pattern: record.recurrence_pattern,
            next_occurrence: record.next_occurrence,
            created_at: record.created_at,
            updated_at: record.updated_at,
            progress,
            total_amount_in_cents,
            remaining_installments: remaining,
            installments: None,
        }
    }

    /// Builds a response with installment children embedded.
    pub fn with_installments(
        record: TransactionRecord,
        children: Vec<TransactionRecord>,
    ) -> Self {
        let mut response = Self::from_record(record);
        response.installments = Some(children.into_iter().map(Self::from_record).collect());
        response
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/transactions` - List transactions in a date window.
///
/// `type` is a comma-separated list of type names; when `startDate` and
/// `endDate` are omitted, the current calendar month is used.
async fn list_transactions(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListTransactionsQuery>,
) -> ApiResult<Json<Vec<TransactionResponse>>> {
    let (start_date, end_date) = resolve_window(query.start_date, query.end_date)?;
    let types = parse_type_list(query.transaction_type.as_deref())?;

    let repo = TransactionRepository::new((*state.db).clone());
    let records = repo
        .query(auth.user_id(), start_date, end_date, &types)
        .await?;

    Ok(Json(
        records
            .into_iter()
            .map(TransactionResponse::from_record)
            .collect(),
    ))
}

/// GET `/transactions/summary` - Income/expense totals for a window.
async fn transactions_summary(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListTransactionsQuery>,
) -> ApiResult<Json<PeriodSummary>> {
    let (start_date, end_date) = resolve_window(query.start_date, query.end_date)?;

    let repo = TransactionRepository::new((*state.db).clone());
    let records = repo.query(auth.user_id(), start_date, end_date, &[]).await?;

    Ok(Json(period_summary(&records)))
}

/// GET `/transactions/{id}` - Fetch one transaction, optionally with its
/// installment children embedded.
async fn get_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(transaction_id): Path<Uuid>,
    Query(query): Query<GetTransactionQuery>,
) -> ApiResult<Json<TransactionResponse>> {
    let repo = TransactionRepository::new((*state.db).clone());
    let record = repo.get(auth.user_id(), transaction_id).await?;

    if query.with_installments && record.transaction_type == TransactionType::Installment {
        let children = repo
            .installment_children(auth.user_id(), transaction_id)
            .await?;
        return Ok(Json(TransactionResponse::with_installments(
            record, children,
        )));
    }

    Ok(Json(TransactionResponse::from_record(record)))
}

/// POST `/transactions` - Create a transaction.
///
/// INSTALLMENT requests expand into a parent anchor plus N children and
/// return the anchor with the children embedded.
async fn create_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateTransactionRequest>,
) -> ApiResult<(StatusCode, Json<TransactionResponse>)> {
    let input = payload.into_new_transaction(auth.user_id())?;

    let repo = TransactionRepository::new((*state.db).clone());
    let created = repo.create(input).await?;

    info!(
        transaction_id = %created.transaction.id,
        transaction_type = %created.transaction.transaction_type,
        installments = created.installments.len(),
        "Transaction created"
    );

    let response = if created.installments.is_empty() {
        TransactionResponse::from_record(created.transaction)
    } else {
        TransactionResponse::with_installments(created.transaction, created.installments)
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// PUT `/transactions/{id}` - Patch editable fields.
///
/// The patch type rejects unknown fields, so a status smuggled into this
/// endpoint is a deserialization error rather than a silent write.
async fn update_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(transaction_id): Path<Uuid>,
    Json(patch): Json<TransactionPatch>,
) -> ApiResult<Json<TransactionResponse>> {
    let repo = TransactionRepository::new((*state.db).clone());
    let updated = repo
        .update_fields(auth.user_id(), transaction_id, patch)
        .await?;

    info!(transaction_id = %transaction_id, "Transaction updated");

    Ok(Json(TransactionResponse::from_record(updated)))
}

/// PUT `/transactions/{id}/status` - Transition status.
async fn update_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(transaction_id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> ApiResult<Json<TransactionResponse>> {
    let new_status = TransactionStatus::parse(&payload.status).ok_or_else(|| {
        ApiError(AppError::Validation(format!(
            "Unknown status: {}",
            payload.status
        )))
    })?;

    let repo = TransactionRepository::new((*state.db).clone());
    let updated = repo
        .transition_status(auth.user_id(), transaction_id, new_status)
        .await?;

    info!(
        transaction_id = %transaction_id,
        status = %new_status,
        "Transaction status changed"
    );

    Ok(Json(TransactionResponse::from_record(updated)))
}

/// POST `/transactions/{id}/occurrences` - Materialize the due occurrence
/// of a recurring template. Idempotent per period: re-posting the same
/// period returns the existing record with 200 instead of 201.
async fn materialize_occurrence(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(transaction_id): Path<Uuid>,
) -> ApiResult<(StatusCode, Json<TransactionResponse>)> {
    let repo = TransactionRepository::new((*state.db).clone());
    let result = repo
        .materialize_occurrence(auth.user_id(), transaction_id)
        .await?;

    info!(
        template_id = %transaction_id,
        occurrence_id = %result.occurrence.id,
        already_existed = result.already_existed,
        "Recurring occurrence materialized"
    );

    let status = if result.already_existed {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((
        status,
        Json(TransactionResponse::from_record(result.occurrence)),
    ))
}

/// DELETE `/transactions/{id}` - Delete a transaction; installment parents
/// cascade to every child.
async fn delete_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(transaction_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let repo = TransactionRepository::new((*state.db).clone());
    repo.delete(auth.user_id(), transaction_id).await?;

    info!(transaction_id = %transaction_id, "Transaction deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Resolves the query window: both bounds, or the current month when both
/// are absent.
fn resolve_window(
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> Result<(NaiveDate, NaiveDate), ApiError> {
    match (start_date, end_date) {
        (Some(start), Some(end)) => {
            if start > end {
                return Err(ApiError(AppError::Validation(format!(
                    "startDate {start} is after endDate {end}"
                ))));
            }
            Ok((start, end))
        }
        (None, None) => {
            let window = current_month_window(Utc::now().date_naive())
                .map_err(|e| ApiError(AppError::Internal(e.to_string())))?;
            Ok((window.start, window.end))
        }
        _ => Err(ApiError(AppError::Validation(
            "startDate and endDate must be provided together".to_string(),
        ))),
    }
}

/// Parses a comma-separated type list; `None`/empty means no filter.
fn parse_type_list(raw: Option<&str>) -> Result<Vec<TransactionType>, ApiError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    let mut types = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let ty = TransactionType::parse(name).ok_or_else(|| {
            ApiError(AppError::Validation(format!(
                "Unknown transaction type: {name}"
            )))
        })?;
        if !types.contains(&ty) {
            types.push(ty);
        }
    }
    Ok(types)
}
