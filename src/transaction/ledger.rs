//! The only write path for transactions and account balances.
//!
//! Every function here runs its writes in a single SQLite transaction so that
//! a transaction row is never visible without the matching balance change.
//! Opening the SQLite transaction with [TransactionBehavior::Immediate] takes
//! the write lock up front, which serializes concurrent balance updates.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};
use rust_decimal::Decimal;
use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    Error, UserID,
    account::get_account,
    database_id::{AccountId, TransactionId},
    money::{checked_add, checked_sub, get_decimal, to_sql_text},
    ownership::assert_owned,
    transaction::core::{
        DEFAULT_CATEGORY, NewTransaction, Transaction, TransactionPatch, find_transaction,
        to_utc, validate_amount,
    },
};

/// A transaction that was just written and the balance of its account afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    /// The transaction as stored.
    pub transaction: Transaction,
    /// The balance of the transaction's account after the write.
    pub new_balance: Decimal,
}

/// The response body for a transaction that was created or updated.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerResponse {
    /// Always true, errors use the error body instead.
    pub success: bool,
    /// A message describing what happened.
    pub message: String,
    /// The transaction as stored.
    pub data: Transaction,
    /// The balance of the transaction's account after the write.
    pub new_balance: Decimal,
}

impl LedgerResponse {
    /// Wrap a successful ledger write.
    pub fn new(message: &str, entry: LedgerEntry) -> Self {
        Self {
            success: true,
            message: message.to_owned(),
            data: entry.transaction,
            new_balance: entry.new_balance,
        }
    }
}

/// Record a new transaction for `user_id` and add its signed amount to the
/// balance of its account.
///
/// # Errors
/// Returns a:
/// - [Error::NotAuthorized] if the account does not exist or belongs to another user,
/// - [Error::Validation] if the amount is negative,
/// - [Error::AmountOutOfRange] if a balance would overflow,
/// - [Error::SqlError] if there is some other SQL error, in which case nothing is written.
pub fn create_transaction(
    new_transaction: NewTransaction,
    user_id: UserID,
    connection: &Connection,
) -> Result<LedgerEntry, Error> {
    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;
    let entry = record_transaction(new_transaction, user_id, &transaction)?;
    transaction.commit()?;

    tracing::debug!(
        "recorded transaction {} on account {}, balance is now {}",
        entry.transaction.id,
        entry.transaction.account_id,
        entry.new_balance
    );

    Ok(entry)
}

/// Insert a transaction and adjust its account's balance on a connection that
/// is already inside a SQLite transaction.
///
/// The caller is responsible for committing.
pub(crate) fn record_transaction(
    new_transaction: NewTransaction,
    user_id: UserID,
    connection: &Connection,
) -> Result<LedgerEntry, Error> {
    let amount = validate_amount(new_transaction.amount)?;
    let account = get_account(new_transaction.account_id, user_id, connection)?;

    let category = match new_transaction.category {
        Some(category) if !category.trim().is_empty() => category,
        _ => DEFAULT_CATEGORY.to_owned(),
    };
    let description = new_transaction.description.unwrap_or_default();
    let date = new_transaction
        .date
        .map(to_utc)
        .unwrap_or_else(OffsetDateTime::now_utc);

    connection.execute(
        "INSERT INTO \"transaction\"
        (account_id, user_id, type, amount, category, description, date, is_opening_balance)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        (
            account.id,
            user_id.as_i64(),
            new_transaction.transaction_type,
            to_sql_text(amount),
            &category,
            &description,
            date,
            new_transaction.opening_balance,
        ),
    )?;

    let transaction = Transaction {
        id: connection.last_insert_rowid(),
        account_id: account.id,
        user_id,
        transaction_type: new_transaction.transaction_type,
        amount,
        category,
        description,
        date,
        is_opening_balance: new_transaction.opening_balance,
    };

    let new_balance = adjust_balance(account.id, transaction.signed_amount(), connection)?;

    Ok(LedgerEntry {
        transaction,
        new_balance,
    })
}

/// Apply `patch` to the transaction with `id` and move the balances of the
/// affected accounts by the change in signed amount.
///
/// If the patch moves the transaction to another account, the old signed
/// amount is reversed on the old account and the new signed amount applied to
/// the new account. Otherwise the account is adjusted by the difference
/// between the new and old signed amounts.
///
/// # Errors
/// Returns a:
/// - [Error::NotAuthorized] if the transaction or the destination account does
///   not exist or belongs to another user,
/// - [Error::Validation] if the new amount is negative,
/// - [Error::AmountOutOfRange] if a balance would overflow,
/// - [Error::SqlError] if there is some other SQL error, in which case nothing is written.
pub fn update_transaction(
    id: TransactionId,
    user_id: UserID,
    patch: TransactionPatch,
    connection: &Connection,
) -> Result<LedgerEntry, Error> {
    let sql_transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    let old = assert_owned(find_transaction(id, &sql_transaction)?, user_id)?;
    let new = patch.apply(&old)?;

    if new.account_id != old.account_id {
        get_account(new.account_id, user_id, &sql_transaction)?;
    }

    sql_transaction.execute(
        "UPDATE \"transaction\"
        SET account_id = ?1, type = ?2, amount = ?3, category = ?4, description = ?5, date = ?6
        WHERE id = ?7 AND user_id = ?8",
        (
            new.account_id,
            new.transaction_type,
            to_sql_text(new.amount),
            &new.category,
            &new.description,
            new.date,
            new.id,
            user_id.as_i64(),
        ),
    )?;

    let new_balance = if new.account_id == old.account_id {
        adjust_balance(
            new.account_id,
            checked_sub(new.signed_amount(), old.signed_amount())?,
            &sql_transaction,
        )?
    } else {
        adjust_balance(old.account_id, -old.signed_amount(), &sql_transaction)?;
        adjust_balance(new.account_id, new.signed_amount(), &sql_transaction)?
    };

    sql_transaction.commit()?;

    tracing::debug!(
        "updated transaction {id}, balance of account {} is now {new_balance}",
        new.account_id
    );

    Ok(LedgerEntry {
        transaction: new,
        new_balance,
    })
}

/// Delete the transaction with `id` and remove its signed amount from the
/// balance of its account.
///
/// Returns the balance of the account after the deletion.
///
/// # Errors
/// Returns a:
/// - [Error::NotAuthorized] if the transaction does not exist or belongs to another user,
/// - [Error::AmountOutOfRange] if the balance would overflow,
/// - [Error::SqlError] if there is some other SQL error, in which case nothing is written.
pub fn delete_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Decimal, Error> {
    let sql_transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    let transaction = assert_owned(find_transaction(id, &sql_transaction)?, user_id)?;

    sql_transaction.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    let new_balance = adjust_balance(
        transaction.account_id,
        -transaction.signed_amount(),
        &sql_transaction,
    )?;

    sql_transaction.commit()?;

    Ok(new_balance)
}

/// Add `delta` to the balance of the account with `account_id`.
///
/// # Errors
/// Returns [Error::AmountOutOfRange] if the new balance overflows. Nothing is
/// written in that case and the caller's SQLite transaction is rolled back
/// when it is dropped.
fn adjust_balance(
    account_id: AccountId,
    delta: Decimal,
    connection: &Connection,
) -> Result<Decimal, Error> {
    let balance = connection.query_row(
        "SELECT balance FROM account WHERE id = ?1",
        [account_id],
        |row| get_decimal(row, 0),
    )?;

    let new_balance = checked_add(balance, delta)?;

    connection.execute(
        "UPDATE account SET balance = ?1 WHERE id = ?2",
        (to_sql_text(new_balance), account_id),
    )?;

    Ok(new_balance)
}
