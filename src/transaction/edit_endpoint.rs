use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::{
    Error, UserID,
    app_state::DbState,
    database_id::TransactionId,
    db::lock_connection,
    extract::ApiJson,
    transaction::{LedgerResponse, TransactionPatch, update_transaction},
};

/// A route handler for changing some of the fields of a transaction.
///
/// Fields missing from the body keep their current value.
pub async fn edit_transaction_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
    ApiJson(patch): ApiJson<TransactionPatch>,
) -> Result<Json<LedgerResponse>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let entry = update_transaction(transaction_id, user_id, patch, &connection)?;

    Ok(Json(LedgerResponse::new(
        "Transaction updated successfully",
        entry,
    )))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::{
        endpoints::{self, format_endpoint},
        test_utils::{create_test_account, get_test_server, log_in_test_user},
    };

    async fn create_income(
        server: &axum_test::TestServer,
        token: &str,
        account_id: i64,
        amount: i64,
    ) -> i64 {
        let response = server
            .post(endpoints::TRANSACTIONS)
            .authorization_bearer(token)
            .json(&json!({"type": "INCOME", "amount": amount, "account_id": account_id}))
            .await;
        response.assert_status(StatusCode::CREATED);

        response.json::<Value>()["data"]["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn patch_to_expense_updates_balance() {
        let server = get_test_server();
        let token = log_in_test_user(&server, "alice@example.com").await;
        let account_id = create_test_account(&server, &token, "Checking", 0.0).await;
        let transaction_id = create_income(&server, &token, account_id, 100).await;

        let response = server
            .patch(&format_endpoint(endpoints::TRANSACTION, transaction_id))
            .authorization_bearer(&token)
            .json(&json!({"type": "EXPENSE", "amount": 30}))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["new_balance"].as_f64(), Some(-30.0));
        assert_eq!(body["data"]["signed_amount"].as_f64(), Some(-30.0));
    }

    #[tokio::test]
    async fn patch_with_zero_amount_sets_zero() {
        let server = get_test_server();
        let token = log_in_test_user(&server, "alice@example.com").await;
        let account_id = create_test_account(&server, &token, "Checking", 0.0).await;
        let transaction_id = create_income(&server, &token, account_id, 100).await;

        let response = server
            .patch(&format_endpoint(endpoints::TRANSACTION, transaction_id))
            .authorization_bearer(&token)
            .json(&json!({"amount": 0}))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["amount"].as_f64(), Some(0.0));
        assert_eq!(body["new_balance"].as_f64(), Some(0.0));
    }

    #[tokio::test]
    async fn patch_of_other_users_transaction_is_not_found() {
        let server = get_test_server();
        let alice = log_in_test_user(&server, "alice@example.com").await;
        let bob = log_in_test_user(&server, "bob@example.com").await;
        let account_id = create_test_account(&server, &alice, "Checking", 0.0).await;
        let transaction_id = create_income(&server, &alice, account_id, 100).await;

        let response = server
            .patch(&format_endpoint(endpoints::TRANSACTION, transaction_id))
            .authorization_bearer(&bob)
            .json(&json!({"amount": 1}))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn patch_moving_account_reports_destination_balance() {
        let server = get_test_server();
        let token = log_in_test_user(&server, "alice@example.com").await;
        let from = create_test_account(&server, &token, "Checking", 0.0).await;
        let to = create_test_account(&server, &token, "Savings", 10.0).await;
        let transaction_id = create_income(&server, &token, from, 100).await;

        let response = server
            .patch(&format_endpoint(endpoints::TRANSACTION, transaction_id))
            .authorization_bearer(&token)
            .json(&json!({"account_id": to}))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["new_balance"].as_f64(), Some(110.0));
        assert_eq!(body["data"]["account_id"].as_i64(), Some(to));
    }
}
