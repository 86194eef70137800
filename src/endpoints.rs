//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/accounts/{account_id}', use [format_endpoint].

/// Describes the API and lists its endpoints.
pub const ROOT: &str = "/";

/// The route for registering a new user.
pub const REGISTER: &str = "/auth/register";
/// The route for logging in and getting a bearer token.
pub const LOG_IN: &str = "/auth/login";

/// The route to list and create accounts.
pub const ACCOUNTS: &str = "/accounts";
/// The route for the total balance across all accounts.
pub const ACCOUNTS_TOTAL: &str = "/accounts/total";
/// The route to access a single account.
pub const ACCOUNT: &str = "/accounts/{account_id}";

/// The route to list and create transactions.
pub const TRANSACTIONS: &str = "/transactions";
/// The route to access a single transaction.
pub const TRANSACTION: &str = "/transactions/{transaction_id}";

/// The route for the dashboard statistics.
pub const DASHBOARD: &str = "/dashboard";
/// The route for the top spending and income categories.
pub const DASHBOARD_CATEGORIES: &str = "/dashboard/categories";
/// The route for the short financial summary.
pub const DASHBOARD_SUMMARY: &str = "/dashboard/summary";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is the text from a left brace up to and including the next
/// right brace. For example, in the endpoint path '/accounts/{account_id}',
/// '{account_id}' is the parameter. Only the first parameter is replaced.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let end = endpoint_path[start..]
        .find('}')
        .map(|offset| start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!("{}{id}{}", &endpoint_path[..start], &endpoint_path[end..])
}
