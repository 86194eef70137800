//! The transaction ledger.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and the request bodies for creating and patching transactions
//! - The ledger functions, the only code that writes transactions or account balances
//! - Read-only queries and the route handlers for the transaction endpoints

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod ledger;
mod query;
mod view_endpoint;

pub use core::{
    NewTransaction, TRANSACTION_COLUMNS, Transaction, TransactionPatch, TransactionType,
    TransactionWithAccount, create_transaction_table, map_transaction_row,
};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use edit_endpoint::edit_transaction_endpoint;
pub(crate) use ledger::record_transaction;
pub use ledger::{LedgerResponse, create_transaction, delete_transaction, update_transaction};
pub use query::{get_all_transactions, get_recent_transactions, get_transaction};
pub use view_endpoint::{get_transaction_endpoint, get_transactions_endpoint};
