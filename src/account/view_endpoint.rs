//! Defines the endpoints for reading accounts.

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    Error, UserID,
    account::{
        Account, AccountTotals, get_account, get_total_account_balance, list_accounts, sum_balances,
    },
    app_state::DbState,
    database_id::AccountId,
    db::lock_connection,
};

/// The response body for listing accounts.
#[derive(Debug, Serialize)]
pub struct AccountsList {
    /// The user's accounts ordered by name.
    pub accounts_list: Vec<Account>,
    /// The sum of the balances.
    pub total_balance: Decimal,
    /// The number of accounts.
    pub accounts_count: usize,
}

/// A route handler for listing the user's accounts with their total balance.
pub async fn get_accounts_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<AccountsList>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let accounts = list_accounts(user_id, &connection)?;
    let totals = sum_balances(&accounts)?;

    Ok(Json(AccountsList {
        accounts_list: accounts,
        total_balance: totals.total_balance,
        accounts_count: totals.accounts_count,
    }))
}

/// A route handler for the total balance across the user's accounts.
pub async fn get_total_balance_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<AccountTotals>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_total_account_balance(user_id, &connection).map(Json)
}

/// A route handler for getting a single account.
pub async fn get_account_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    Path(account_id): Path<AccountId>,
) -> Result<Json<Account>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_account(account_id, user_id, &connection).map(Json)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::Value;

    use crate::{
        endpoints::{self, format_endpoint},
        test_utils::{create_test_account, get_test_server, log_in_test_user},
    };

    #[tokio::test]
    async fn list_accounts_with_totals() {
        let server = get_test_server();
        let token = log_in_test_user(&server, "alice@example.com").await;
        create_test_account(&server, &token, "Savings", 100.0).await;
        create_test_account(&server, &token, "Card", -30.0).await;

        let response = server
            .get(endpoints::ACCOUNTS)
            .authorization_bearer(&token)
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["accounts_count"], 2);
        assert_eq!(body["total_balance"].as_f64(), Some(70.0));
        assert_eq!(body["accounts_list"][0]["name"], "Card");
        assert_eq!(body["accounts_list"][1]["name"], "Savings");
    }

    #[tokio::test]
    async fn total_balance() {
        let server = get_test_server();
        let token = log_in_test_user(&server, "alice@example.com").await;
        create_test_account(&server, &token, "Savings", 12.5).await;

        let response = server
            .get(endpoints::ACCOUNTS_TOTAL)
            .authorization_bearer(&token)
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["total_balance"].as_f64(), Some(12.5));
        assert_eq!(body["accounts_count"], 1);
    }

    #[tokio::test]
    async fn get_other_users_account_is_not_found() {
        let server = get_test_server();
        let alice = log_in_test_user(&server, "alice@example.com").await;
        let bob = log_in_test_user(&server, "bob@example.com").await;
        let account_id = create_test_account(&server, &alice, "Checking", 0.0).await;

        let response = server
            .get(&format_endpoint(endpoints::ACCOUNT, account_id))
            .authorization_bearer(&bob)
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn list_requires_token() {
        let server = get_test_server();

        server
            .get(endpoints::ACCOUNTS)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}
