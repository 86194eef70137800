//! Defines the endpoint for updating an account.

use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::{
    Error, UserID,
    account::{Account, AccountPatch, rename_account},
    app_state::DbState,
    database_id::AccountId,
    db::lock_connection,
    extract::ApiJson,
};

/// A route handler for renaming an account.
///
/// The balance cannot be set directly, a body with a `balance` field is rejected.
pub async fn edit_account_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    Path(account_id): Path<AccountId>,
    ApiJson(patch): ApiJson<AccountPatch>,
) -> Result<Json<Account>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    rename_account(account_id, user_id, patch, &connection).map(Json)
}
