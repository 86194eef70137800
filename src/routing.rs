//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Json, Router, middleware,
    routing::{get, post},
};
use serde_json::{Value, json};

use crate::{
    AppState,
    account::{
        create_account_endpoint, delete_account_endpoint, edit_account_endpoint,
        get_account_endpoint, get_accounts_endpoint, get_total_balance_endpoint,
    },
    auth::{auth_guard, log_in, register_user},
    dashboard::{get_categories_endpoint, get_dashboard_endpoint, get_summary_endpoint},
    endpoints,
    not_found::get_404_not_found,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, edit_transaction_endpoint,
        get_transaction_endpoint, get_transactions_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::ROOT, get(get_api_info))
        .route(endpoints::REGISTER, post(register_user))
        .route(endpoints::LOG_IN, post(log_in));

    let protected_routes = Router::new()
        .route(
            endpoints::ACCOUNTS,
            get(get_accounts_endpoint).post(create_account_endpoint),
        )
        .route(endpoints::ACCOUNTS_TOTAL, get(get_total_balance_endpoint))
        .route(
            endpoints::ACCOUNT,
            get(get_account_endpoint)
                .patch(edit_account_endpoint)
                .delete(delete_account_endpoint),
        )
        .route(
            endpoints::TRANSACTIONS,
            get(get_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            get(get_transaction_endpoint)
                .patch(edit_transaction_endpoint)
                .delete(delete_transaction_endpoint),
        )
        .route(endpoints::DASHBOARD, get(get_dashboard_endpoint))
        .route(endpoints::DASHBOARD_CATEGORIES, get(get_categories_endpoint))
        .route(endpoints::DASHBOARD_SUMMARY, get(get_summary_endpoint))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

/// Describe the API and list the endpoints available to clients.
async fn get_api_info() -> Json<Value> {
    Json(json!({
        "message": "FinTrack personal finance API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "auth": [endpoints::REGISTER, endpoints::LOG_IN],
            "accounts": [endpoints::ACCOUNTS, endpoints::ACCOUNTS_TOTAL, endpoints::ACCOUNT],
            "transactions": [endpoints::TRANSACTIONS, endpoints::TRANSACTION],
            "dashboard": [
                endpoints::DASHBOARD,
                endpoints::DASHBOARD_CATEGORIES,
                endpoints::DASHBOARD_SUMMARY,
            ],
        },
    }))
}

#[cfg(test)]
mod root_route_tests {
    use axum::http::StatusCode;
    use serde_json::Value;

    use crate::{endpoints, test_utils::get_test_server};

    #[tokio::test]
    async fn root_describes_api_without_token() {
        let server = get_test_server();

        let response = server.get(endpoints::ROOT).await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(body["endpoints"]["auth"][0], endpoints::REGISTER);
        assert!(body["endpoints"]["dashboard"].is_array());
    }

    #[tokio::test]
    async fn unknown_route_is_json_404() {
        let server = get_test_server();

        let response = server.get("/does/not/exist").await;

        response.assert_status(StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert!(body["error"].is_string());
    }
}
