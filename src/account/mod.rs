mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod view_endpoint;

pub use core::{
    Account, AccountPatch, AccountTotals, NewAccount, create_account, create_account_table,
    delete_account, get_account, get_total_account_balance, list_accounts, rename_account,
    sum_balances,
};
pub use create_endpoint::create_account_endpoint;
pub use delete_endpoint::delete_account_endpoint;
pub use edit_endpoint::edit_account_endpoint;
pub use view_endpoint::{get_account_endpoint, get_accounts_endpoint, get_total_balance_endpoint};
