use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde_json::{Value, json};

use crate::{
    Error, UserID, app_state::DbState, database_id::TransactionId, db::lock_connection,
    transaction::delete_transaction,
};

/// A route handler for deleting a transaction, responds with the restored
/// balance of its account.
pub async fn delete_transaction_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Json<Value>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let new_balance = delete_transaction(transaction_id, user_id, &connection)?;

    Ok(Json(json!({
        "success": true,
        "message": "Transaction deleted successfully",
        "new_balance": new_balance,
    })))
}
