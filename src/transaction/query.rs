//! Read-only queries over a user's transactions.

use rusqlite::{Connection, OptionalExtension, Row};

use crate::{
    Error, UserID,
    database_id::TransactionId,
    ownership::{Owned, assert_owned},
    transaction::core::{TransactionWithAccount, map_transaction_row},
};

impl Owned for TransactionWithAccount {
    fn owner(&self) -> UserID {
        self.transaction.user_id
    }
}

const SELECT_WITH_ACCOUNT: &str = "SELECT t.id, t.account_id, t.user_id, t.type, t.amount, \
    t.category, t.description, t.date, t.is_opening_balance, a.name \
    FROM \"transaction\" t INNER JOIN account a ON a.id = t.account_id";

fn map_row_with_account(row: &Row) -> Result<TransactionWithAccount, rusqlite::Error> {
    Ok(TransactionWithAccount {
        transaction: map_transaction_row(row)?,
        account_name: row.get(9)?,
    })
}

/// Get all of a user's transactions, most recent first.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn get_all_transactions(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<TransactionWithAccount>, Error> {
    query_newest_first(user_id, None, connection)
}

/// Get the `limit` most recent of a user's transactions.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn get_recent_transactions(
    user_id: UserID,
    limit: u32,
    connection: &Connection,
) -> Result<Vec<TransactionWithAccount>, Error> {
    query_newest_first(user_id, Some(limit), connection)
}

fn query_newest_first(
    user_id: UserID,
    limit: Option<u32>,
    connection: &Connection,
) -> Result<Vec<TransactionWithAccount>, Error> {
    // A negative limit means no limit in SQLite.
    let limit = limit.map(i64::from).unwrap_or(-1);

    connection
        .prepare(&format!(
            "{SELECT_WITH_ACCOUNT} WHERE t.user_id = :user_id \
            ORDER BY t.date DESC, t.id DESC LIMIT :limit"
        ))?
        .query_map(
            &[(":user_id", &user_id.as_i64()), (":limit", &limit)],
            map_row_with_account,
        )?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Get the transaction with `id` if it is owned by `user_id`.
///
/// # Errors
/// Returns a:
/// - [Error::NotAuthorized] if the transaction does not exist or belongs to another user,
/// - [Error::SqlError] if there is some other SQL error.
pub fn get_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<TransactionWithAccount, Error> {
    let transaction = connection
        .prepare(&format!("{SELECT_WITH_ACCOUNT} WHERE t.id = :id"))?
        .query_row(&[(":id", &id)], map_row_with_account)
        .optional()?;

    assert_owned(transaction, user_id)
}
