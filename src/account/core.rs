use rusqlite::{Connection, OptionalExtension, Row, Transaction as SqlTransaction, TransactionBehavior};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error, UserID,
    database_id::AccountId,
    money::{checked_sum, get_decimal, to_sql_text},
    ownership::{Owned, assert_owned},
    transaction::{NewTransaction, TransactionType, record_transaction},
};

/// The category of the transaction that records an account's opening balance.
pub const OPENING_BALANCE_CATEGORY: &str = "Solde initial";

/// A bank account, credit card or wallet that holds money for a user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Account {
    /// The id for the account.
    pub id: AccountId,
    /// The user that owns the account.
    pub user_id: UserID,
    /// The name of the account.
    pub name: String,
    /// The signed sum of the account's transactions.
    pub balance: Decimal,
    /// When the account was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Owned for Account {
    fn owner(&self) -> UserID {
        self.user_id
    }
}

/// The data for creating an account.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewAccount {
    /// The name of the account.
    pub name: String,
    /// The amount of money already in the account.
    #[serde(default)]
    pub balance: Option<Decimal>,
}

/// The fields of an account that can be changed after creation.
///
/// The balance is not one of them: it only changes through transactions.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccountPatch {
    /// The new name for the account.
    #[serde(default)]
    pub name: Option<String>,
}

/// The total balance across a user's accounts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AccountTotals {
    /// The sum of the balances.
    pub total_balance: Decimal,
    /// The number of accounts.
    pub accounts_count: usize,
}

pub fn create_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS account (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            balance TEXT NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_account_user ON account(user_id);",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_account(row: &Row) -> Result<Account, rusqlite::Error> {
    let id = row.get(0)?;
    let user_id = UserID::new(row.get(1)?);
    let name = row.get(2)?;
    let balance = get_decimal(row, 3)?;
    let created_at = row.get(4)?;

    Ok(Account {
        id,
        user_id,
        name,
        balance,
        created_at,
    })
}

/// Look up an account by `id` regardless of who owns it.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn find_account(id: AccountId, connection: &Connection) -> Result<Option<Account>, Error> {
    connection
        .prepare("SELECT id, user_id, name, balance, created_at FROM account WHERE id = :id")?
        .query_row(&[(":id", &id)], map_row_to_account)
        .optional()
        .map_err(Error::from)
}

/// Get the account with `id` if it is owned by `user_id`.
///
/// # Errors
/// Returns [Error::NotAuthorized] if the account does not exist or belongs to
/// another user.
pub fn get_account(id: AccountId, user_id: UserID, connection: &Connection) -> Result<Account, Error> {
    assert_owned(find_account(id, connection)?, user_id)
}

/// Create an account for `user_id`.
///
/// A non-zero opening balance is recorded as a transaction in the same unit
/// of work as the account, so the account's balance always matches its
/// transactions.
///
/// # Errors
/// Returns a:
/// - [Error::Validation] if the name is blank,
/// - [Error::SqlError] if there is some other SQL error.
pub fn create_account(
    user_id: UserID,
    new_account: NewAccount,
    connection: &Connection,
) -> Result<Account, Error> {
    let name = new_account.name.trim();

    if name.is_empty() {
        return Err(Error::Validation("account name must not be empty".to_owned()));
    }

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    transaction.execute(
        "INSERT INTO account (user_id, name, balance, created_at) VALUES (?1, ?2, ?3, ?4)",
        (
            user_id.as_i64(),
            name,
            to_sql_text(Decimal::ZERO),
            OffsetDateTime::now_utc(),
        ),
    )?;

    let id = transaction.last_insert_rowid();

    if let Some(opening_balance) = new_account.balance.filter(|balance| !balance.is_zero()) {
        let transaction_type = if opening_balance.is_sign_negative() {
            TransactionType::Expense
        } else {
            TransactionType::Income
        };

        record_transaction(
            NewTransaction::build(transaction_type, opening_balance.abs(), id)
                .category(OPENING_BALANCE_CATEGORY)
                .opening_balance(),
            user_id,
            &transaction,
        )?;
    }

    let account = get_account(id, user_id, &transaction)?;
    transaction.commit()?;

    Ok(account)
}

/// Get all of a user's accounts ordered by name.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn list_accounts(user_id: UserID, connection: &Connection) -> Result<Vec<Account>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, balance, created_at FROM account
            WHERE user_id = :user_id
            ORDER BY name ASC, id ASC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_row_to_account)?
        .map(|maybe_account| maybe_account.map_err(Error::from))
        .collect()
}

/// Sum the balances of `accounts`.
///
/// # Errors
/// Returns [Error::AmountOutOfRange] if the total overflows.
pub fn sum_balances(accounts: &[Account]) -> Result<AccountTotals, Error> {
    Ok(AccountTotals {
        total_balance: checked_sum(accounts.iter().map(|account| account.balance))?,
        accounts_count: accounts.len(),
    })
}

/// Get the total balance across all of a user's accounts.
///
/// # Errors
/// Returns an:
/// - [Error::AmountOutOfRange] if the total overflows,
/// - [Error::SqlError] if there is an SQL error.
pub fn get_total_account_balance(
    user_id: UserID,
    connection: &Connection,
) -> Result<AccountTotals, Error> {
    sum_balances(&list_accounts(user_id, connection)?)
}

/// Apply `patch` to the account with `id` owned by `user_id`.
///
/// # Errors
/// Returns a:
/// - [Error::NotAuthorized] if the account does not exist or belongs to another user,
/// - [Error::Validation] if the new name is blank,
/// - [Error::SqlError] if there is some other SQL error.
pub fn rename_account(
    id: AccountId,
    user_id: UserID,
    patch: AccountPatch,
    connection: &Connection,
) -> Result<Account, Error> {
    let account = get_account(id, user_id, connection)?;

    let Some(name) = patch.name else {
        return Ok(account);
    };

    let name = name.trim();

    if name.is_empty() {
        return Err(Error::Validation("account name must not be empty".to_owned()));
    }

    connection.execute(
        "UPDATE account SET name = ?1 WHERE id = ?2 AND user_id = ?3",
        (name, id, user_id.as_i64()),
    )?;

    Ok(Account {
        name: name.to_owned(),
        ..account
    })
}

/// Delete the account with `id` owned by `user_id` along with its transactions.
///
/// # Errors
/// Returns a:
/// - [Error::NotAuthorized] if the account does not exist or belongs to another user,
/// - [Error::SqlError] if there is some other SQL error.
pub fn delete_account(id: AccountId, user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM account WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotAuthorized);
    }

    Ok(())
}

#[cfg(test)]
mod create_table_tests {
    use rusqlite::Connection;

    use crate::user::create_user_table;

    use super::create_account_table;

    #[test]
    fn sql_is_valid() {
        let connection =
            Connection::open_in_memory().expect("Could not initialise in-memory SQLite database");
        create_user_table(&connection).unwrap();

        assert_eq!(Ok(()), create_account_table(&connection));
    }
}
