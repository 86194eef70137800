//! Defines the endpoint for deleting an account.

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde_json::{Value, json};

use crate::{
    Error, UserID, account::delete_account, app_state::DbState, database_id::AccountId,
    db::lock_connection,
};

/// A route handler for deleting an account and all of its transactions.
pub async fn delete_account_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    Path(account_id): Path<AccountId>,
) -> Result<Json<Value>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    delete_account(account_id, user_id, &connection)?;

    tracing::info!("user {user_id} deleted account {account_id}");

    Ok(Json(json!({
        "message": "Account deleted successfully",
        "account_deleted": true,
    })))
}
