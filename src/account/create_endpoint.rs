//! Defines the endpoint for creating an account.

use axum::{Extension, Json, extract::State, http::StatusCode};

use crate::{
    Error, UserID,
    account::{Account, NewAccount, create_account},
    app_state::DbState,
    db::lock_connection,
    extract::ApiJson,
};

/// A route handler for creating a new account.
///
/// Responds with 201 and the new account.
pub async fn create_account_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    ApiJson(new_account): ApiJson<NewAccount>,
) -> Result<(StatusCode, Json<Account>), Error> {
    let connection = lock_connection(&state.db_connection)?;
    let account = create_account(user_id, new_account, &connection)?;

    tracing::info!("user {user_id} created account {}", account.id);

    Ok((StatusCode::CREATED, Json(account)))
}
