//! Dashboard module
//!
//! Provides statistics over a user's accounts and transactions: balances per
//! account, income and expenses for the current month and year, and the
//! categories with the largest totals.

mod aggregation;
mod handlers;
mod stats;
mod transaction;

pub use handlers::{get_categories_endpoint, get_dashboard_endpoint, get_summary_endpoint};
