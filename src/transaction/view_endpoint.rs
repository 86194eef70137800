use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::{
    Error, UserID,
    app_state::DbState,
    database_id::TransactionId,
    db::lock_connection,
    transaction::{TransactionWithAccount, get_all_transactions, get_transaction},
};

/// A route handler for listing the user's transactions, most recent first.
pub async fn get_transactions_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Vec<TransactionWithAccount>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_all_transactions(user_id, &connection).map(Json)
}

/// A route handler for getting a single transaction.
pub async fn get_transaction_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Json<TransactionWithAccount>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_transaction(transaction_id, user_id, &connection).map(Json)
}
