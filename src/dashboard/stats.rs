//! Builds the statistics shown on the dashboard and the financial summary.

use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    Error, UserID,
    account::{Account, list_accounts, sum_balances},
    dashboard::{
        aggregation::{PeriodTotals, aggregate, average, percentage, start_of_month, start_of_year},
        transaction::count_transactions_by_account,
    },
    database_id::{AccountId, TransactionId},
    money::{checked_add, checked_percentage},
    transaction::{TransactionType, TransactionWithAccount, get_recent_transactions},
};

/// The number of transactions listed on the dashboard.
const DASHBOARD_RECENT_LIMIT: u32 = 10;

/// The number of transactions listed in the financial summary.
const SUMMARY_RECENT_LIMIT: u32 = 5;

/// The label shown for transactions whose category was cleared.
const UNCATEGORIZED: &str = "Non catégorisé";

/// Whether an amount is above or below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    /// Zero or more.
    Positive,
    /// Less than zero.
    Negative,
}

impl Trend {
    fn of(amount: Decimal) -> Self {
        if amount.is_sign_negative() && !amount.is_zero() {
            Trend::Negative
        } else {
            Trend::Positive
        }
    }
}

/// The balances across all of a user's accounts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub total_balance: Decimal,
    pub total_accounts: usize,
    /// The sum of the balances above zero.
    pub positive_balance: Decimal,
    /// The absolute sum of the balances below zero.
    pub negative_balance: Decimal,
    pub net_worth: Decimal,
}

/// An account with its share of the total balance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountShare {
    pub id: AccountId,
    pub name: String,
    pub balance: Decimal,
    pub transactions_count: usize,
    /// The balance as a whole percentage of the total balance.
    pub percentage: i64,
    pub status: Trend,
}

/// A transaction as listed on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentTransaction {
    pub id: TransactionId,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub category: String,
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub account_name: String,
    /// The signed amount in euros, e.g. "+100€" or "-40€".
    pub formatted_amount: String,
}

impl From<TransactionWithAccount> for RecentTransaction {
    fn from(value: TransactionWithAccount) -> Self {
        let transaction = value.transaction;
        let sign = match transaction.transaction_type {
            TransactionType::Income => '+',
            TransactionType::Expense => '-',
        };
        let category = if transaction.category.trim().is_empty() {
            UNCATEGORIZED.to_owned()
        } else {
            transaction.category
        };

        Self {
            id: transaction.id,
            transaction_type: transaction.transaction_type,
            formatted_amount: format!("{sign}{}€", transaction.amount.normalize()),
            amount: transaction.amount,
            category,
            description: transaction.description,
            date: transaction.date,
            account_name: value.account_name,
        }
    }
}

/// Income and expenses since the start of the current month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyStats {
    pub income: Decimal,
    pub expenses: Decimal,
    pub net: Decimal,
    pub transactions_count: usize,
    pub income_transactions: usize,
    pub expense_transactions: usize,
    pub average_income: Decimal,
    pub average_expense: Decimal,
}

impl From<PeriodTotals> for MonthlyStats {
    fn from(totals: PeriodTotals) -> Self {
        Self {
            income: totals.income,
            expenses: totals.expenses,
            net: totals.net(),
            transactions_count: totals.transactions_count(),
            income_transactions: totals.income_count,
            expense_transactions: totals.expense_count,
            average_income: average(totals.income, totals.income_count),
            average_expense: average(totals.expenses, totals.expense_count),
        }
    }
}

/// Income and expenses since the start of the current year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyStats {
    pub income: Decimal,
    pub expenses: Decimal,
    pub net: Decimal,
    pub transactions_count: usize,
    /// Income divided by the number of months elapsed, including the current one.
    pub monthly_average_income: Decimal,
    pub monthly_average_expenses: Decimal,
}

impl YearlyStats {
    fn new(totals: PeriodTotals, months_elapsed: u8) -> Self {
        let months_elapsed = usize::from(months_elapsed);

        Self {
            income: totals.income,
            expenses: totals.expenses,
            net: totals.net(),
            transactions_count: totals.transactions_count(),
            monthly_average_income: average(totals.income, months_elapsed),
            monthly_average_expenses: average(totals.expenses, months_elapsed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trends {
    pub balance_trend: Trend,
    pub monthly_trend: Trend,
    /// The share of this month's income that was not spent, as a whole percentage.
    pub savings_rate: i64,
}

/// The response body for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub overview: Overview,
    pub accounts: Vec<AccountShare>,
    pub recent_transactions: Vec<RecentTransaction>,
    pub monthly_stats: MonthlyStats,
    pub yearly_stats: YearlyStats,
    pub trends: Trends,
}

/// Build the dashboard for `user_id` with the periods ending at `now`.
///
/// # Errors
/// Returns an:
/// - [Error::AmountOutOfRange] if a total or percentage overflows,
/// - [Error::SqlError] if any of the queries fail.
pub fn build_dashboard(
    user_id: UserID,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<Dashboard, Error> {
    let accounts = list_accounts(user_id, connection)?;
    let overview = build_overview(&accounts)?;
    let transaction_counts = count_transactions_by_account(user_id, connection)?;

    let mut account_shares = accounts
        .into_iter()
        .map(|account| -> Result<_, Error> {
            Ok(AccountShare {
                transactions_count: transaction_counts.get(&account.id).copied().unwrap_or(0),
                percentage: percentage(account.balance, overview.total_balance)?,
                status: Trend::of(account.balance),
                id: account.id,
                name: account.name,
                balance: account.balance,
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;
    account_shares.sort_by(|a, b| b.balance.cmp(&a.balance).then_with(|| a.id.cmp(&b.id)));

    let recent_transactions = get_recent_transactions(user_id, DASHBOARD_RECENT_LIMIT, connection)?
        .into_iter()
        .map(RecentTransaction::from)
        .collect();

    let monthly_totals = aggregate(user_id, start_of_month(now), now, connection)?;
    let yearly_totals = aggregate(user_id, start_of_year(now), now, connection)?;

    let trends = Trends {
        balance_trend: Trend::of(overview.total_balance),
        monthly_trend: Trend::of(monthly_totals.net()),
        savings_rate: percentage(monthly_totals.net(), monthly_totals.income)?,
    };

    Ok(Dashboard {
        overview,
        accounts: account_shares,
        recent_transactions,
        monthly_stats: monthly_totals.into(),
        yearly_stats: YearlyStats::new(yearly_totals, u8::from(now.month())),
        trends,
    })
}

fn build_overview(accounts: &[Account]) -> Result<Overview, Error> {
    let totals = sum_balances(accounts)?;
    let (positive_balance, negative_balance) = accounts.iter().try_fold(
        (Decimal::ZERO, Decimal::ZERO),
        |(positive, negative), account| -> Result<_, Error> {
            if account.balance > Decimal::ZERO {
                Ok((checked_add(positive, account.balance)?, negative))
            } else {
                Ok((positive, checked_add(negative, account.balance)?))
            }
        },
    )?;

    Ok(Overview {
        total_balance: totals.total_balance,
        total_accounts: totals.accounts_count,
        positive_balance,
        negative_balance: negative_balance.abs(),
        net_worth: totals.total_balance,
    })
}

/// Counts of accounts by the sign of their balance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountsSummary {
    pub total_accounts: usize,
    /// Accounts with a balance above zero.
    pub positive_accounts: usize,
    /// Accounts with a balance below zero.
    pub negative_accounts: usize,
    /// The mean balance, rounded to cents.
    pub average_balance: Decimal,
}

/// An account with its balance as a percentage of the total balance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryAccount {
    #[serde(flatten)]
    pub account: Account,
    /// Rounded to two decimal places.
    pub percentage_of_total: Decimal,
}

/// Income, expenses and net over the current month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyNet {
    pub income: Decimal,
    pub expenses: Decimal,
    pub net: Decimal,
}

/// The response body for the financial summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialSummary {
    pub total_balance: Decimal,
    pub accounts_summary: AccountsSummary,
    pub accounts: Vec<SummaryAccount>,
    pub monthly_stats: MonthlyNet,
    pub recent_transactions: Vec<TransactionWithAccount>,
}

/// Build the financial summary for `user_id` with the month ending at `now`.
///
/// Accounts are listed by balance, largest first. Accounts with a zero
/// balance are counted as neither positive nor negative.
///
/// # Errors
/// Returns an:
/// - [Error::AmountOutOfRange] if a total or percentage overflows,
/// - [Error::SqlError] if any of the queries fail.
pub fn build_summary(
    user_id: UserID,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<FinancialSummary, Error> {
    let mut accounts = list_accounts(user_id, connection)?;
    accounts.sort_by(|a, b| b.balance.cmp(&a.balance).then_with(|| a.id.cmp(&b.id)));
    let totals = sum_balances(&accounts)?;

    let accounts_summary = AccountsSummary {
        total_accounts: totals.accounts_count,
        positive_accounts: accounts
            .iter()
            .filter(|account| account.balance > Decimal::ZERO)
            .count(),
        negative_accounts: accounts
            .iter()
            .filter(|account| account.balance < Decimal::ZERO)
            .count(),
        average_balance: average(totals.total_balance, totals.accounts_count),
    };

    let accounts = accounts
        .into_iter()
        .map(|account| -> Result<_, Error> {
            Ok(SummaryAccount {
                percentage_of_total: checked_percentage(account.balance, totals.total_balance)?
                    .round_dp(2),
                account,
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;

    let monthly_totals = aggregate(user_id, start_of_month(now), now, connection)?;
    let recent_transactions = get_recent_transactions(user_id, SUMMARY_RECENT_LIMIT, connection)?;

    Ok(FinancialSummary {
        total_balance: totals.total_balance,
        accounts_summary,
        accounts,
        monthly_stats: MonthlyNet {
            income: monthly_totals.income,
            expenses: monthly_totals.expenses,
            net: monthly_totals.net(),
        },
        recent_transactions,
    })
}
