//! Transaction aggregation for the dashboard statistics.
//!
//! Amounts are stored as decimal text, so sums are computed in Rust rather
//! than with SQL aggregate functions.

use std::collections::HashMap;

use rusqlite::Connection;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use serde::Serialize;
use time::{Duration, OffsetDateTime, Time};

use crate::{
    Error, UserID,
    dashboard::transaction::get_transactions_in_period,
    money::{checked_add, checked_percentage},
    transaction::{Transaction, TransactionType},
};

/// The sum and number of transactions of each type in a period.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PeriodTotals {
    /// The total income.
    pub income: Decimal,
    /// The total expenses, as a positive number.
    pub expenses: Decimal,
    /// The number of income transactions.
    pub income_count: usize,
    /// The number of expense transactions.
    pub expense_count: usize,
}

impl PeriodTotals {
    /// Income minus expenses.
    pub fn net(&self) -> Decimal {
        self.income - self.expenses
    }

    /// The number of transactions of either type.
    pub fn transactions_count(&self) -> usize {
        self.income_count + self.expense_count
    }
}

/// The totals for one category and transaction type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    /// The category name.
    pub category: String,
    /// Whether the category total is income or expenses.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// The sum of the amounts.
    pub total_amount: Decimal,
    /// The number of transactions.
    pub transactions_count: usize,
    /// The mean amount, rounded to cents.
    pub average_amount: Decimal,
}

/// Sum a user's transactions by type over `[period_start, now)`.
///
/// Opening balance entries are not counted.
///
/// # Errors
/// Returns an:
/// - [Error::AmountOutOfRange] if a total overflows,
/// - [Error::SqlError] if the SQL query fails.
pub fn aggregate(
    user_id: UserID,
    period_start: OffsetDateTime,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<PeriodTotals, Error> {
    let transactions = get_transactions_in_period(user_id, period_start..now, connection)?;

    sum_by_type(&transactions)
}

/// Sum `transactions` by type.
///
/// # Errors
/// Returns [Error::AmountOutOfRange] if a total overflows.
pub fn sum_by_type(transactions: &[Transaction]) -> Result<PeriodTotals, Error> {
    transactions
        .iter()
        .try_fold(PeriodTotals::default(), |mut totals, transaction| -> Result<_, Error> {
            match transaction.transaction_type {
                TransactionType::Income => {
                    totals.income = checked_add(totals.income, transaction.amount)?;
                    totals.income_count += 1;
                }
                TransactionType::Expense => {
                    totals.expenses = checked_add(totals.expenses, transaction.amount)?;
                    totals.expense_count += 1;
                }
            }

            Ok(totals)
        })
}

/// Group `transactions` by category and type, largest total first.
///
/// Only the first `limit` groups are returned.
///
/// # Errors
/// Returns [Error::AmountOutOfRange] if a category total overflows.
pub fn top_categories(
    transactions: &[Transaction],
    limit: usize,
) -> Result<Vec<CategoryTotal>, Error> {
    let mut groups: HashMap<(&str, TransactionType), (Decimal, usize)> = HashMap::new();

    for transaction in transactions {
        let group = groups
            .entry((transaction.category.as_str(), transaction.transaction_type))
            .or_insert((Decimal::ZERO, 0));
        group.0 = checked_add(group.0, transaction.amount)?;
        group.1 += 1;
    }

    let mut categories: Vec<CategoryTotal> = groups
        .into_iter()
        .map(|((category, transaction_type), (total_amount, count))| CategoryTotal {
            category: category.to_owned(),
            transaction_type,
            total_amount,
            transactions_count: count,
            average_amount: average(total_amount, count),
        })
        .collect();

    categories.sort_by(|a, b| {
        b.total_amount
            .cmp(&a.total_amount)
            .then_with(|| a.category.cmp(&b.category))
            .then_with(|| a.transaction_type.cmp(&b.transaction_type))
    });
    categories.truncate(limit);

    Ok(categories)
}

/// `total` divided by `count` rounded to cents, or zero if `count` is zero.
pub fn average(total: Decimal, count: usize) -> Decimal {
    if count == 0 {
        return Decimal::ZERO;
    }

    (total / Decimal::from(count)).round_dp(2)
}

/// `part` as a percentage of `whole` rounded to the nearest integer, halves
/// rounded away from zero. Zero if `whole` is zero.
///
/// # Errors
/// Returns [Error::AmountOutOfRange] if the percentage does not fit in an `i64`.
pub fn percentage(part: Decimal, whole: Decimal) -> Result<i64, Error> {
    checked_percentage(part, whole)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(Error::AmountOutOfRange)
}

/// Midnight UTC on the first day of the month of `now`.
pub fn start_of_month(now: OffsetDateTime) -> OffsetDateTime {
    let first_day = now.date() - Duration::days(i64::from(now.day()) - 1);

    first_day.with_time(Time::MIDNIGHT).assume_utc()
}

/// Midnight UTC on the first day of the year of `now`.
pub fn start_of_year(now: OffsetDateTime) -> OffsetDateTime {
    let first_day = now.date() - Duration::days(i64::from(now.ordinal()) - 1);

    first_day.with_time(Time::MIDNIGHT).assume_utc()
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use time::macros::datetime;

    use crate::{
        Error, UserID,
        transaction::{Transaction, TransactionType},
    };

    use super::{average, percentage, start_of_month, start_of_year, sum_by_type, top_categories};

    fn transaction(transaction_type: TransactionType, amount: i64, category: &str) -> Transaction {
        Transaction {
            id: 1,
            account_id: 1,
            user_id: UserID::new(1),
            transaction_type,
            amount: Decimal::from(amount),
            category: category.to_owned(),
            description: String::new(),
            date: datetime!(2025-06-15 12:00 UTC),
            is_opening_balance: false,
        }
    }

    #[test]
    fn sums_income_and_expenses() {
        let transactions = [
            transaction(TransactionType::Income, 100, "Salary"),
            transaction(TransactionType::Expense, 40, "Food"),
        ];

        let totals = sum_by_type(&transactions).unwrap();

        assert_eq!(totals.income, Decimal::from(100));
        assert_eq!(totals.expenses, Decimal::from(40));
        assert_eq!(totals.net(), Decimal::from(60));
        assert_eq!(totals.income_count, 1);
        assert_eq!(totals.expense_count, 1);
        assert_eq!(totals.transactions_count(), 2);
    }

    #[test]
    fn sums_nothing_to_zero() {
        let totals = sum_by_type(&[]).unwrap();

        assert_eq!(totals.net(), Decimal::ZERO);
        assert_eq!(totals.transactions_count(), 0);
    }

    #[test]
    fn groups_categories_by_name_and_type() {
        let transactions = [
            transaction(TransactionType::Expense, 30, "Food"),
            transaction(TransactionType::Expense, 20, "Food"),
            transaction(TransactionType::Income, 10, "Food"),
            transaction(TransactionType::Income, 500, "Salary"),
            transaction(TransactionType::Expense, 5, "Transport"),
        ];

        let categories = top_categories(&transactions, 3).unwrap();

        assert_eq!(categories.len(), 3);
        assert_eq!(categories[0].category, "Salary");
        assert_eq!(categories[1].category, "Food");
        assert_eq!(categories[1].transaction_type, TransactionType::Expense);
        assert_eq!(categories[1].total_amount, Decimal::from(50));
        assert_eq!(categories[1].transactions_count, 2);
        assert_eq!(categories[1].average_amount, Decimal::from(25));
        assert_eq!(categories[2].total_amount, Decimal::from(10));
    }

    #[test]
    fn average_of_nothing_is_zero() {
        assert_eq!(average(Decimal::from(10), 0), Decimal::ZERO);
        assert_eq!(average(Decimal::from(10), 3), Decimal::new(333, 2));
    }

    #[test]
    fn percentage_rounds_half_away_from_zero() {
        assert_eq!(percentage(Decimal::from(1), Decimal::from(8)).unwrap(), 13);
        assert_eq!(percentage(Decimal::from(-1), Decimal::from(8)).unwrap(), -13);
        assert_eq!(percentage(Decimal::from(5), Decimal::ZERO).unwrap(), 0);
    }

    #[test]
    fn overflowing_totals_are_errors() {
        let mut huge = transaction(TransactionType::Income, 0, "Salary");
        huge.amount = Decimal::MAX;
        let transactions = [huge.clone(), huge];

        assert!(matches!(
            sum_by_type(&transactions),
            Err(Error::AmountOutOfRange)
        ));
        assert!(matches!(
            top_categories(&transactions, 5),
            Err(Error::AmountOutOfRange)
        ));
        assert!(matches!(
            percentage(Decimal::MAX, Decimal::new(1, 2)),
            Err(Error::AmountOutOfRange)
        ));
    }

    #[test]
    fn period_starts_are_midnight_utc() {
        let now = datetime!(2025-10-16 15:42:07 UTC);

        assert_eq!(start_of_month(now), datetime!(2025-10-01 00:00 UTC));
        assert_eq!(start_of_year(now), datetime!(2025-01-01 00:00 UTC));
    }
}
