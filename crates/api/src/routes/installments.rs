//! Installment routes: parent anchor lookup, children listing, and the
//! cascading delete the client's "delete every associated installment"
//! dialog talks to.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
};
use tracing::info;
use uuid::Uuid;

use crate::AppState;
use crate::error::ApiResult;
use crate::middleware::AuthUser;
use crate::routes::transactions::TransactionResponse;
use centavo_db::TransactionRepository;

/// Creates the installment routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/installments/{installment_id}", get(get_installment))
        .route(
            "/installments/{installment_id}/installments",
            get(list_children),
        )
        .route("/installments/{installment_id}", delete(delete_installment))
}

/// GET `/installments/{id}` - Fetch an installment record (anchor or
/// child).
async fn get_installment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(installment_id): Path<Uuid>,
) -> ApiResult<Json<TransactionResponse>> {
    let repo = TransactionRepository::new((*state.db).clone());
    let record = repo.get_installment(auth.user_id(), installment_id).await?;
    Ok(Json(TransactionResponse::from_record(record)))
}

/// GET `/installments/{id}/installments` - Children of a parent anchor,
/// ordered by installment number.
async fn list_children(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(installment_id): Path<Uuid>,
) -> ApiResult<Json<Vec<TransactionResponse>>> {
    let repo = TransactionRepository::new((*state.db).clone());
    let children = repo
        .installment_children(auth.user_id(), installment_id)
        .await?;
    Ok(Json(
        children
            .into_iter()
            .map(TransactionResponse::from_record)
            .collect(),
    ))
}

/// DELETE `/installments/{id}` - Delete an installment record. Deleting a
/// parent anchor removes every child atomically.
async fn delete_installment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(installment_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let repo = TransactionRepository::new((*state.db).clone());

    // Refuse non-installment ids on this surface before deleting.
    repo.get_installment(auth.user_id(), installment_id).await?;
    repo.delete(auth.user_id(), installment_id).await?;

    info!(installment_id = %installment_id, "Installment deleted");

    Ok(StatusCode::NO_CONTENT)
}
