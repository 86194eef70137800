//! Database queries for retrieving dashboard transaction data.

use std::{collections::HashMap, ops::Range};

use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    Error, UserID,
    database_id::AccountId,
    transaction::{TRANSACTION_COLUMNS, Transaction, map_transaction_row},
};

/// Gets a user's transactions dated within `period`, leaving out opening
/// balance entries.
///
/// The start of the period is inclusive and the end exclusive.
///
/// # Errors
/// Returns [Error::SqlError] if the SQL query fails.
pub(super) fn get_transactions_in_period(
    user_id: UserID,
    period: Range<OffsetDateTime>,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\"
            WHERE user_id = ?1 AND is_opening_balance = 0 AND date >= ?2 AND date < ?3"
        ))?
        .query_map(
            (user_id.as_i64(), period.start, period.end),
            map_transaction_row,
        )?
        .collect::<Result<Vec<Transaction>, rusqlite::Error>>()
        .map_err(|error| error.into())
}

/// Gets all of a user's transactions regardless of date, leaving out opening
/// balance entries.
///
/// # Errors
/// Returns [Error::SqlError] if the SQL query fails.
pub(super) fn get_all_user_transactions(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\"
            WHERE user_id = ?1 AND is_opening_balance = 0"
        ))?
        .query_map([user_id.as_i64()], map_transaction_row)?
        .collect::<Result<Vec<Transaction>, rusqlite::Error>>()
        .map_err(|error| error.into())
}

/// Counts the transactions in each of a user's accounts, leaving out opening
/// balance entries.
///
/// Accounts without transactions are included with a count of zero.
///
/// # Errors
/// Returns [Error::SqlError] if the SQL query fails.
pub(super) fn count_transactions_by_account(
    user_id: UserID,
    connection: &Connection,
) -> Result<HashMap<AccountId, usize>, Error> {
    connection
        .prepare(
            "SELECT a.id, COUNT(t.id) FROM account a
            LEFT JOIN \"transaction\" t ON t.account_id = a.id AND t.is_opening_balance = 0
            WHERE a.user_id = ?1
            GROUP BY a.id",
        )?
        .query_map([user_id.as_i64()], |row| {
            Ok((row.get(0)?, row.get::<_, i64>(1)? as usize))
        })?
        .collect::<Result<HashMap<AccountId, usize>, rusqlite::Error>>()
        .map_err(|error| error.into())
}
