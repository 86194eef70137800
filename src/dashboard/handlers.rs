//! Dashboard route handlers.

use std::num::NonZeroUsize;

use axum::{Extension, Json, extract::State};
use serde::Deserialize;
use time::OffsetDateTime;

use crate::{
    Error, UserID,
    app_state::DbState,
    dashboard::{
        aggregation::{CategoryTotal, top_categories},
        stats::{Dashboard, FinancialSummary, build_dashboard, build_summary},
        transaction::get_all_user_transactions,
    },
    db::lock_connection,
    extract::ApiQuery,
};

/// The number of categories returned when the client does not ask for a limit.
const DEFAULT_CATEGORY_LIMIT: usize = 5;

/// The query string for the top categories.
#[derive(Debug, Deserialize)]
pub struct CategoriesQuery {
    /// The maximum number of categories to return. Zero is rejected.
    pub limit: Option<NonZeroUsize>,
}

/// A route handler for the dashboard statistics.
pub async fn get_dashboard_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Dashboard>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    build_dashboard(user_id, OffsetDateTime::now_utc(), &connection).map(Json)
}

/// A route handler for the categories with the largest totals.
pub async fn get_categories_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    ApiQuery(query): ApiQuery<CategoriesQuery>,
) -> Result<Json<Vec<CategoryTotal>>, Error> {
    let limit = query
        .limit
        .map(NonZeroUsize::get)
        .unwrap_or(DEFAULT_CATEGORY_LIMIT);
    let connection = lock_connection(&state.db_connection)?;
    let transactions = get_all_user_transactions(user_id, &connection)?;

    top_categories(&transactions, limit).map(Json)
}

/// A route handler for the financial summary of the user's accounts.
pub async fn get_summary_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<FinancialSummary>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    build_summary(user_id, OffsetDateTime::now_utc(), &connection).map(Json)
}
