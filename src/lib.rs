//! FinTrack is a REST API for managing personal finances.
//!
//! Users register, log in with a bearer token, keep track of their bank
//! accounts, record income and expenses against those accounts, and view
//! aggregated statistics on a dashboard.
//!
//! Each account carries a cached balance. The ledger in [transaction] is the
//! only write path to that balance: every transaction that is created, edited
//! or deleted adjusts the balance of the owning account in the same SQLite
//! transaction, so the balance always equals the signed sum of the account's
//! transactions.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod account;
mod app_state;
mod auth;
mod config;
mod dashboard;
mod database_id;
mod db;
pub mod endpoints;
mod extract;
mod logging;
mod money;
mod not_found;
mod ownership;
mod password;
mod routing;
#[cfg(test)]
mod test_utils;
mod transaction;
mod user;

pub use app_state::AppState;
pub use auth::JwtSecret;
pub use config::ServerConfig;
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use password::{PasswordHash, ValidatedPassword};
pub use routing::build_router;
pub use user::{User, UserID};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The requested resource does not exist or belongs to another user.
    ///
    /// The two cases are deliberately indistinguishable to the client so that
    /// a user cannot discover the existence of other users' accounts or
    /// transactions.
    #[error("the requested resource could not be found")]
    NotAuthorized,

    /// The email and password combination did not match a registered user.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Registration was attempted with an email that is already in use.
    #[error("email already exists")]
    EmailAlreadyExists,

    /// The request body or query was malformed or failed validation.
    #[error("{0}")]
    Validation(String),

    /// The password is shorter than the minimum length.
    #[error("password must be at least {0} characters long")]
    TooShort(usize),

    /// A sum, difference or ratio of amounts does not fit in a decimal.
    #[error("amount out of range")]
    AmountOutOfRange,

    /// The request to a protected route did not carry a bearer token.
    #[error("missing token")]
    MissingToken,

    /// The bearer token could not be verified, has expired or refers to a
    /// user that no longer exists.
    #[error("invalid token")]
    InvalidToken,

    /// The JWT secret given at start up is not usable.
    #[error("invalid JWT secret: {0}")]
    InvalidJwtSecret(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The JWT library failed to sign a token.
    #[error("could not create token: {0}")]
    TokenCreation(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
            {
                Error::EmailAlreadyExists
            }
            // Every lookup is scoped to the authenticated user, so no rows
            // means the resource is missing or owned by someone else.
            rusqlite::Error::QueryReturnedNoRows => Error::NotAuthorized,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Error::Validation(rejection.body_text())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Error::NotAuthorized => (
                StatusCode::NOT_FOUND,
                "The requested resource could not be found.".to_owned(),
            ),
            Error::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid credentials".to_owned())
            }
            Error::EmailAlreadyExists => (StatusCode::CONFLICT, "Email already exists".to_owned()),
            Error::Validation(message) => (StatusCode::UNPROCESSABLE_ENTITY, message),
            Error::TooShort(_) => (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()),
            Error::AmountOutOfRange => (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()),
            Error::MissingToken => (StatusCode::UNAUTHORIZED, "Missing token".to_owned()),
            Error::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid token".to_owned()),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_owned(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
