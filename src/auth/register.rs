//! Handles registration requests.

use std::str::FromStr;

use axum::{Json, extract::State, http::StatusCode};
use email_address::EmailAddress;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    Error, PasswordHash, ValidatedPassword, auth::AuthState, db::lock_connection,
    extract::ApiJson, user::create_user,
};

/// The data a client sends to create an account.
#[derive(Debug, Deserialize)]
pub struct RegisterData {
    /// The email to log in with.
    pub email: String,
    /// The plain text password, validated against the password policy.
    pub password: String,
    /// The name shown for the user.
    pub name: String,
}

/// Handler for registration requests via the POST method.
///
/// Responds with 201 and the new user's ID and email.
///
/// # Errors
///
/// This function will return an error in a few situations.
/// - The email is not a valid email address.
/// - The name is blank.
/// - The password is too short.
/// - The email already belongs to a registered user.
/// - An internal error occurred when hashing the password.
pub async fn register_user(
    State(state): State<AuthState>,
    ApiJson(data): ApiJson<RegisterData>,
) -> Result<(StatusCode, Json<Value>), Error> {
    let email = EmailAddress::from_str(data.email.trim())
        .map_err(|error| Error::Validation(format!("invalid email: {error}")))?;

    let name = data.name.trim();

    if name.is_empty() {
        return Err(Error::Validation("name must not be empty".to_owned()));
    }

    let password = ValidatedPassword::new(&data.password)?;
    let password_hash = PasswordHash::new(password, state.password_cost)?;

    let connection = lock_connection(&state.db_connection)?;
    let user = create_user(email, name, password_hash, &connection)?;

    tracing::info!("registered user {}", user.id);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully",
            "user": {
                "id": user.id,
                "email": user.email.as_str(),
            },
        })),
    ))
}
