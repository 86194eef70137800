//! Defines the core data models and database queries for transactions.

use rusqlite::{
    Connection, OptionalExtension, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, UtcOffset};

use crate::{
    Error, UserID,
    database_id::{AccountId, TransactionId},
    money::get_decimal,
    ownership::Owned,
};

/// The category given to transactions created without one.
pub const DEFAULT_CATEGORY: &str = "Général";

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    /// Money coming into the account.
    Income,
    /// Money leaving the account.
    Expense,
}

impl TransactionType {
    /// The name used for the type in the database and in JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "INCOME",
            TransactionType::Expense => "EXPENSE",
        }
    }

    /// Apply the sign of this type to the unsigned `amount`.
    pub fn sign(&self, amount: Decimal) -> Decimal {
        match self {
            TransactionType::Income => amount,
            TransactionType::Expense => -amount,
        }
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "INCOME" => Ok(TransactionType::Income),
            "EXPENSE" => Ok(TransactionType::Expense),
            other => Err(FromSqlError::Other(
                format!("unknown transaction type \"{other}\"").into(),
            )),
        }
    }
}

/// An expense or income recorded against one of a user's accounts.
///
/// Transactions are written through the functions in [crate::transaction::ledger]
/// so that the balance of the owning account stays in sync.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "TransactionView")]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The account the transaction belongs to.
    pub account_id: AccountId,
    /// The user that owns both the transaction and its account.
    pub user_id: UserID,
    /// Whether the transaction is income or an expense.
    pub transaction_type: TransactionType,
    /// The unsigned amount of money, never negative.
    pub amount: Decimal,
    /// A free-form category, e.g. "Groceries".
    pub category: String,
    /// A text description of what the transaction was for.
    pub description: String,
    /// When the transaction happened, in UTC.
    pub date: OffsetDateTime,
    /// Whether the transaction records the balance an account was opened with.
    ///
    /// Opening balances count towards the account balance but not towards
    /// income and expense statistics.
    pub is_opening_balance: bool,
}

impl Transaction {
    /// The effect this transaction has on its account's balance.
    pub fn signed_amount(&self) -> Decimal {
        self.transaction_type.sign(self.amount)
    }
}

impl Owned for Transaction {
    fn owner(&self) -> UserID {
        self.user_id
    }
}

/// The JSON representation of a [Transaction].
///
/// Carries the signed amount alongside the unsigned amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionView {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The account the transaction belongs to.
    pub account_id: AccountId,
    /// The user that owns the transaction.
    pub user_id: UserID,
    /// Whether the transaction is income or an expense.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// The unsigned amount.
    pub amount: Decimal,
    /// The amount with the sign of its effect on the account balance.
    pub signed_amount: Decimal,
    /// The category of the transaction.
    pub category: String,
    /// The description of the transaction.
    pub description: String,
    /// When the transaction happened.
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    /// Whether the transaction records an account's opening balance.
    pub is_opening_balance: bool,
}

impl From<Transaction> for TransactionView {
    fn from(transaction: Transaction) -> Self {
        Self {
            signed_amount: transaction.signed_amount(),
            id: transaction.id,
            account_id: transaction.account_id,
            user_id: transaction.user_id,
            transaction_type: transaction.transaction_type,
            amount: transaction.amount,
            category: transaction.category,
            description: transaction.description,
            date: transaction.date,
            is_opening_balance: transaction.is_opening_balance,
        }
    }
}

/// A transaction along with the name of the account it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionWithAccount {
    /// The transaction.
    #[serde(flatten)]
    pub transaction: Transaction,
    /// The name of the account the transaction belongs to.
    pub account_name: String,
}

/// The fields a client provides to record a new transaction.
///
/// The owner is never read from the request body, it always comes from the
/// verified token.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewTransaction {
    /// Whether the transaction is income or an expense.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// The unsigned amount, must not be negative.
    pub amount: Decimal,
    /// Defaults to [DEFAULT_CATEGORY] when missing or blank.
    #[serde(default)]
    pub category: Option<String>,
    /// Defaults to an empty string.
    #[serde(default)]
    pub description: Option<String>,
    /// Defaults to the time the transaction is recorded.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub date: Option<OffsetDateTime>,
    /// The account to record the transaction against.
    pub account_id: AccountId,
    /// Set when an account is created with a balance, never by clients.
    #[serde(skip)]
    pub opening_balance: bool,
}

impl NewTransaction {
    /// Create a new transaction with the defaults for the optional fields.
    ///
    /// Shortcut for filling in the struct for discoverability.
    pub fn build(
        transaction_type: TransactionType,
        amount: Decimal,
        account_id: AccountId,
    ) -> Self {
        Self {
            transaction_type,
            amount,
            category: None,
            description: None,
            date: None,
            account_id,
            opening_balance: false,
        }
    }

    /// Set the category for the transaction.
    pub fn category(mut self, category: &str) -> Self {
        self.category = Some(category.to_owned());
        self
    }

    /// Mark the transaction as the opening balance of its account.
    pub fn opening_balance(mut self) -> Self {
        self.opening_balance = true;
        self
    }

    /// Set the date for the transaction.
    #[cfg(test)]
    pub fn date(mut self, date: OffsetDateTime) -> Self {
        self.date = Some(date);
        self
    }
}

/// The fields a client may change on an existing transaction.
///
/// A field that is `None` was not present in the request and keeps its
/// current value. An explicit zero amount or empty string is a change.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransactionPatch {
    /// The new type.
    #[serde(default, rename = "type")]
    pub transaction_type: Option<TransactionType>,
    /// The new amount, must not be negative.
    #[serde(default)]
    pub amount: Option<Decimal>,
    /// The new category.
    #[serde(default)]
    pub category: Option<String>,
    /// The new description.
    #[serde(default)]
    pub description: Option<String>,
    /// The new date.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub date: Option<OffsetDateTime>,
    /// Move the transaction to another of the user's accounts.
    #[serde(default)]
    pub account_id: Option<AccountId>,
}

impl TransactionPatch {
    /// Apply the provided fields to `transaction`.
    ///
    /// # Errors
    /// Returns [Error::Validation] if the patched amount is negative.
    pub fn apply(&self, transaction: &Transaction) -> Result<Transaction, Error> {
        let amount = match self.amount {
            Some(amount) => validate_amount(amount)?,
            None => transaction.amount,
        };

        Ok(Transaction {
            id: transaction.id,
            account_id: self.account_id.unwrap_or(transaction.account_id),
            user_id: transaction.user_id,
            transaction_type: self
                .transaction_type
                .unwrap_or(transaction.transaction_type),
            amount,
            category: self
                .category
                .clone()
                .unwrap_or_else(|| transaction.category.clone()),
            description: self
                .description
                .clone()
                .unwrap_or_else(|| transaction.description.clone()),
            date: self.date.map(to_utc).unwrap_or(transaction.date),
            is_opening_balance: transaction.is_opening_balance,
        })
    }
}

/// Check that `amount` can be used as a transaction amount.
///
/// # Errors
/// Returns [Error::Validation] if `amount` is negative.
pub fn validate_amount(amount: Decimal) -> Result<Decimal, Error> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(Error::Validation(format!(
            "amount must not be negative, got {amount}"
        )));
    }

    Ok(amount)
}

/// Convert `date` to UTC so that dates compare correctly as stored text.
pub fn to_utc(date: OffsetDateTime) -> OffsetDateTime {
    date.to_offset(UtcOffset::UTC)
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                account_id INTEGER NOT NULL,
                user_id INTEGER NOT NULL,
                type TEXT NOT NULL CHECK (type IN ('INCOME', 'EXPENSE')),
                amount TEXT NOT NULL,
                category TEXT NOT NULL,
                description TEXT NOT NULL,
                date TEXT NOT NULL,
                is_opening_balance INTEGER NOT NULL DEFAULT 0,
                FOREIGN KEY(account_id) REFERENCES account(id) ON UPDATE CASCADE ON DELETE CASCADE,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    // Used for listing a user's transactions newest first and for the dashboard.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_account ON \"transaction\"(account_id);",
        (),
    )?;

    Ok(())
}

/// The columns read by [map_transaction_row], in order.
pub const TRANSACTION_COLUMNS: &str =
    "id, account_id, user_id, type, amount, category, description, date, is_opening_balance";

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        account_id: row.get(1)?,
        user_id: UserID::new(row.get(2)?),
        transaction_type: row.get(3)?,
        amount: get_decimal(row, 4)?,
        category: row.get(5)?,
        description: row.get(6)?,
        date: row.get(7)?,
        is_opening_balance: row.get(8)?,
    })
}

/// Look up a transaction by `id` regardless of who owns it.
///
/// Callers must pass the result through [crate::ownership::assert_owned]
/// before exposing it.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn find_transaction(
    id: TransactionId,
    connection: &Connection,
) -> Result<Option<Transaction>, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE id = :id"
        ))?
        .query_row(&[(":id", &id)], map_transaction_row)
        .optional()
        .map_err(Error::from)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod model_tests {
    use rust_decimal::Decimal;
    use time::macros::datetime;

    use crate::{
        Error, UserID,
        transaction::{Transaction, TransactionPatch, TransactionType},
    };

    fn income_of(amount: i64) -> Transaction {
        Transaction {
            id: 1,
            account_id: 1,
            user_id: UserID::new(1),
            transaction_type: TransactionType::Income,
            amount: Decimal::from(amount),
            category: "Salary".to_owned(),
            description: "".to_owned(),
            date: datetime!(2025-10-05 12:00 UTC),
            is_opening_balance: false,
        }
    }

    #[test]
    fn income_is_positive_and_expense_negative() {
        let mut transaction = income_of(100);
        assert_eq!(transaction.signed_amount(), Decimal::from(100));

        transaction.transaction_type = TransactionType::Expense;
        assert_eq!(transaction.signed_amount(), Decimal::from(-100));
    }

    #[test]
    fn empty_patch_keeps_every_field() {
        let transaction = income_of(100);

        let patched = TransactionPatch::default().apply(&transaction).unwrap();

        assert_eq!(patched, transaction);
    }

    #[test]
    fn explicit_zero_amount_is_applied() {
        let transaction = income_of(100);
        let patch = TransactionPatch {
            amount: Some(Decimal::ZERO),
            ..Default::default()
        };

        let patched = patch.apply(&transaction).unwrap();

        assert_eq!(patched.amount, Decimal::ZERO);
        assert_eq!(patched.signed_amount(), Decimal::ZERO);
    }

    #[test]
    fn explicit_empty_description_is_applied() {
        let mut transaction = income_of(100);
        transaction.description = "pay day".to_owned();
        let patch = TransactionPatch {
            description: Some(String::new()),
            ..Default::default()
        };

        let patched = patch.apply(&transaction).unwrap();

        assert_eq!(patched.description, "");
    }

    #[test]
    fn negative_amount_is_rejected() {
        let patch = TransactionPatch {
            amount: Some(Decimal::from(-1)),
            ..Default::default()
        };

        let result = patch.apply(&income_of(100));

        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn patch_deserializes_absent_and_zero_differently() {
        let absent: TransactionPatch = serde_json::from_str(r#"{"category": "Food"}"#).unwrap();
        let zero: TransactionPatch = serde_json::from_str(r#"{"amount": 0}"#).unwrap();

        assert_eq!(absent.amount, None);
        assert_eq!(zero.amount, Some(Decimal::ZERO));
    }

    #[test]
    fn patch_rejects_unknown_fields() {
        let result = serde_json::from_str::<TransactionPatch>(r#"{"user_id": 2}"#);

        assert!(result.is_err());
    }
}
