use axum_test::TestServer;
use rusqlite::Connection;
use serde_json::{Value, json};

use crate::{AppState, JwtSecret, auth::AccessToken, build_router, endpoints};

pub(crate) const TEST_PASSWORD: &str = "averysafeandsecurepassword";

pub(crate) fn get_test_server() -> TestServer {
    get_test_server_with_password_cost(4)
}

/// A test server that hashes passwords with the bcrypt `cost`.
pub(crate) fn get_test_server_with_password_cost(cost: u32) -> TestServer {
    let connection =
        Connection::open_in_memory().expect("Could not open database in memory.");
    let secret = JwtSecret::new("a-sufficiently-long-secret-for-hs256")
        .expect("Could not create JWT secret.");
    let state = AppState::new(connection, &secret)
        .expect("Could not create app state.")
        .with_password_cost(cost);

    TestServer::new(build_router(state))
}

/// Register a user with [TEST_PASSWORD] and return a bearer token for them.
pub(crate) async fn log_in_test_user(server: &TestServer, email: &str) -> String {
    server
        .post(endpoints::REGISTER)
        .json(&json!({
            "email": email,
            "password": TEST_PASSWORD,
            "name": "Test User",
        }))
        .await
        .assert_status_success();

    let response = server
        .post(endpoints::LOG_IN)
        .json(&json!({"email": email, "password": TEST_PASSWORD}))
        .await;
    response.assert_status_ok();

    response.json::<AccessToken>().access_token
}

/// Create an account through the API and return its ID.
pub(crate) async fn create_test_account(
    server: &TestServer,
    token: &str,
    name: &str,
    balance: f64,
) -> i64 {
    let response = server
        .post(endpoints::ACCOUNTS)
        .authorization_bearer(token)
        .json(&json!({"name": name, "balance": balance}))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);

    response.json::<Value>()["id"]
        .as_i64()
        .expect("Account ID missing from response")
}
