//! Handles log-in requests and issues bearer tokens.

use std::str::FromStr;

use axum::{Json, extract::State};
use email_address::EmailAddress;
use serde::{Deserialize, Serialize};

use crate::{
    Error, PasswordHash, ValidatedPassword,
    auth::{AuthState, token::encode_token},
    db::lock_connection,
    extract::ApiJson,
    user::get_user_by_email,
};

/// Hashed in place of a stored password when the email is not registered.
const DUMMY_PASSWORD: &str = "not-a-registered-password";

/// The raw data entered by the user to log in.
///
/// The password is stored as a plain string. There is no need for validation here since
/// it will be compared against the password in the database, which has been verified.
#[derive(Clone, Deserialize)]
pub struct LogInData {
    /// Email entered during log-in.
    pub email: String,
    /// Password entered during log-in.
    pub password: String,
}

/// The response to a successful log-in.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessToken {
    /// The bearer token to send in the `Authorization` header.
    pub access_token: String,
}

/// Handler for log-in requests via the POST method.
///
/// # Errors
///
/// This function will return an error in a few situations.
/// - The email does not belong to a registered user.
/// - The password is not correct.
/// - An internal error occurred when verifying the password or signing the token.
pub async fn log_in(
    State(state): State<AuthState>,
    ApiJson(data): ApiJson<LogInData>,
) -> Result<Json<AccessToken>, Error> {
    let email =
        EmailAddress::from_str(data.email.trim()).map_err(|_| Error::InvalidCredentials)?;

    let maybe_user = {
        let connection = lock_connection(&state.db_connection)?;

        match get_user_by_email(&email, &connection) {
            Ok(user) => Some(user),
            Err(Error::NotAuthorized) => None,
            Err(error) => return Err(error),
        }
    };

    let Some(user) = maybe_user else {
        // Spend as long as a password check so unknown emails are not revealed
        // by the response time.
        hash_dummy_password(state.password_cost);
        return Err(Error::InvalidCredentials);
    };

    let is_password_valid = user.password_hash.verify(&data.password).map_err(|error| {
        tracing::error!("Unhandled error while verifying credentials: {error}");
        Error::HashingError(error.to_string())
    })?;

    if !is_password_valid {
        return Err(Error::InvalidCredentials);
    }

    let access_token = encode_token(
        user.id,
        user.email.as_str(),
        state.token_duration,
        &state.jwt_keys,
    )?;

    Ok(Json(AccessToken { access_token }))
}

fn hash_dummy_password(cost: u32) {
    let result = ValidatedPassword::new(DUMMY_PASSWORD)
        .and_then(|password| PasswordHash::new(password, cost));

    if let Err(error) = result {
        tracing::error!("Could not hash dummy password: {error}");
    }
}
