//! Registration, log-in and the bearer token guard for protected routes.

mod log_in;
mod middleware;
mod register;
mod token;

pub use log_in::{AccessToken, log_in};
pub use middleware::{AuthState, auth_guard};
pub use register::register_user;
pub use token::{DEFAULT_TOKEN_DURATION, JwtKeys, JwtSecret};
