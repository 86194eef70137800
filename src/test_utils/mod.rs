//! Helpers shared by the unit tests.

mod http;

use std::str::FromStr;

use email_address::EmailAddress;
use rusqlite::Connection;

use crate::{PasswordHash, User, initialize_db, user::create_user};

pub(crate) use http::{
    TEST_PASSWORD, create_test_account, get_test_server, get_test_server_with_password_cost,
    log_in_test_user,
};

pub(crate) fn get_test_connection() -> Connection {
    let conn = Connection::open_in_memory().expect("Could not create in-memory SQLite database");
    initialize_db(&conn).expect("Could not initialize database");

    conn
}

#[track_caller]
pub(crate) fn create_test_user(email: &str, conn: &Connection) -> User {
    create_user(
        EmailAddress::from_str(email).expect("Invalid test email"),
        "Test User",
        PasswordHash::new_unchecked("not a real hash"),
        conn,
    )
    .expect("Could not create test user")
}

pub(crate) fn count_transactions(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM \"transaction\"", [], |row| row.get(0))
        .expect("Could not count transactions")
}
