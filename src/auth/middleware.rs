//! Authentication middleware that verifies bearer tokens on protected routes.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use rusqlite::Connection;
use time::Duration;

use crate::{
    AppState, Error,
    auth::token::{JwtKeys, decode_token},
    db::lock_connection,
    user::{UserID, get_user_by_id},
};

/// The state needed for the auth middleware and the auth endpoints.
#[derive(Debug, Clone)]
pub struct AuthState {
    /// The keys for signing and verifying bearer tokens.
    pub jwt_keys: JwtKeys,
    /// The duration for which bearer tokens are valid.
    pub token_duration: Duration,
    /// The bcrypt cost used when hashing new passwords.
    pub password_cost: u32,
    /// The database connection for looking up users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            jwt_keys: state.jwt_keys.clone(),
            token_duration: state.token_duration,
            password_cost: state.password_cost,
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Middleware function that checks for a valid bearer token.
///
/// The user ID is placed into the request and the request executed normally
/// if the token is valid and its user still exists, otherwise a 401 response
/// is returned.
///
/// **Note**: Route handlers can use the function argument
/// `Extension(user_id): Extension<UserID>` to receive the user ID.
pub async fn auth_guard(
    State(state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(&state, &request) {
        Ok(user_id) => {
            request.extensions_mut().insert(user_id);
            next.run(request).await
        }
        Err(error) => error.into_response(),
    }
}

fn authenticate(state: &AuthState, request: &Request) -> Result<UserID, Error> {
    let Some(Authorization(bearer)) = request.headers().typed_get::<Authorization<Bearer>>()
    else {
        return Err(Error::MissingToken);
    };

    let claims = decode_token(bearer.token(), &state.jwt_keys)?;

    let connection = lock_connection(&state.db_connection)?;

    match get_user_by_id(claims.sub, &connection) {
        Ok(user) => Ok(user.id),
        Err(Error::NotAuthorized) => {
            tracing::debug!("rejected token for deleted user {}", claims.sub);
            Err(Error::InvalidToken)
        }
        Err(error) => Err(error),
    }
}
