use axum::{Extension, Json, extract::State, http::StatusCode};

use crate::{
    Error, UserID,
    app_state::DbState,
    db::lock_connection,
    extract::ApiJson,
    transaction::{LedgerResponse, NewTransaction, create_transaction},
};

/// A route handler for recording a new transaction.
///
/// Responds with 201, the created transaction and the new balance of its account.
pub async fn create_transaction_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    ApiJson(new_transaction): ApiJson<NewTransaction>,
) -> Result<(StatusCode, Json<LedgerResponse>), Error> {
    let connection = lock_connection(&state.db_connection)?;
    let entry = create_transaction(new_transaction, user_id, &connection)?;

    Ok((
        StatusCode::CREATED,
        Json(LedgerResponse::new("Transaction created successfully", entry)),
    ))
}
