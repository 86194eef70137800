//! Signing and verifying the JSON Web Tokens used as bearer tokens.

use std::fmt::Debug;

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{Error, UserID};

/// The default time a token stays valid for.
pub const DEFAULT_TOKEN_DURATION: Duration = Duration::days(1);

/// The secret used to sign tokens.
///
/// There is no default secret, the server refuses to start without one.
#[derive(Clone, PartialEq)]
pub struct JwtSecret(String);

impl JwtSecret {
    /// The minimum number of bytes a secret must have.
    pub const MIN_LENGTH: usize = 32;

    /// Validate a raw secret string.
    ///
    /// # Errors
    /// Returns [Error::InvalidJwtSecret] if `raw_secret` is shorter than
    /// [JwtSecret::MIN_LENGTH] bytes or only whitespace.
    pub fn new(raw_secret: &str) -> Result<Self, Error> {
        if raw_secret.trim().is_empty() {
            return Err(Error::InvalidJwtSecret("the secret is empty".to_owned()));
        }

        if raw_secret.len() < Self::MIN_LENGTH {
            return Err(Error::InvalidJwtSecret(format!(
                "the secret must be at least {} bytes long, got {}",
                Self::MIN_LENGTH,
                raw_secret.len()
            )));
        }

        Ok(Self(raw_secret.to_owned()))
    }
}

impl Debug for JwtSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("JwtSecret(********)")
    }
}

/// The keys derived from a [JwtSecret].
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtKeys {
    /// Derive the HMAC keys for signing and verifying tokens.
    pub fn new(secret: &JwtSecret) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.0.as_bytes()),
            decoding: DecodingKey::from_secret(secret.0.as_bytes()),
        }
    }
}

impl Debug for JwtKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("JwtKeys { .. }")
    }
}

/// The contents of a JSON Web Token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// The ID of the user the token was issued to.
    pub sub: UserID,
    /// The email of the user the token was issued to.
    pub email: String,
    /// The time the token was issued as a Unix timestamp.
    pub iat: i64,
    /// The expiry time of the token as a Unix timestamp.
    pub exp: i64,
}

/// Sign a token for `user_id` that expires after `duration`.
///
/// # Errors
/// Returns [Error::TokenCreation] if the token could not be signed.
pub fn encode_token(
    user_id: UserID,
    email: &str,
    duration: Duration,
    keys: &JwtKeys,
) -> Result<String, Error> {
    let now = OffsetDateTime::now_utc();
    let claims = Claims {
        sub: user_id,
        email: email.to_owned(),
        iat: now.unix_timestamp(),
        exp: (now + duration).unix_timestamp(),
    };

    encode(&Header::default(), &claims, &keys.encoding)
        .map_err(|error| Error::TokenCreation(error.to_string()))
}

/// Verify the signature and expiry of `token` and return its claims.
///
/// # Errors
/// Returns [Error::InvalidToken] if the token is malformed, badly signed or expired.
pub fn decode_token(token: &str, keys: &JwtKeys) -> Result<Claims, Error> {
    decode::<Claims>(token, &keys.decoding, &Validation::default())
        .map(|token_data| token_data.claims)
        .map_err(|error| {
            tracing::debug!("rejected token: {error}");
            Error::InvalidToken
        })
}


#[cfg(test)]
mod token_tests {
    use jsonwebtoken::{EncodingKey, Header, encode};
    use time::{Duration, OffsetDateTime};

    use crate::{Error, JwtSecret, UserID};

    use super::{Claims, JwtKeys, decode_token, encode_token};

    fn get_keys(secret: &str) -> JwtKeys {
        JwtKeys::new(&JwtSecret::new(secret).unwrap())
    }

    #[test]
    fn decode_gives_back_claims() {
        let keys = get_keys("a-sufficiently-long-secret-for-hs256");

        let token = encode_token(UserID::new(42), "foo@bar.baz", Duration::minutes(5), &keys)
            .unwrap();
        let claims = decode_token(&token, &keys).unwrap();

        assert_eq!(claims.sub, UserID::new(42));
        assert_eq!(claims.email, "foo@bar.baz");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn decode_fails_with_other_secret() {
        let keys = get_keys("a-sufficiently-long-secret-for-hs256");
        let other_keys = get_keys("another-sufficiently-long-secret-!!");
        let token = encode_token(UserID::new(1), "foo@bar.baz", Duration::minutes(5), &keys)
            .unwrap();

        assert_eq!(decode_token(&token, &other_keys), Err(Error::InvalidToken));
    }

    #[test]
    fn decode_fails_on_expired_token() {
        let secret = "a-sufficiently-long-secret-for-hs256";
        let keys = get_keys(secret);
        let issued = OffsetDateTime::now_utc() - Duration::hours(2);
        let claims = Claims {
            sub: UserID::new(1),
            email: "foo@bar.baz".to_owned(),
            iat: issued.unix_timestamp(),
            exp: (issued + Duration::hours(1)).unix_timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        assert_eq!(decode_token(&token, &keys), Err(Error::InvalidToken));
    }

    #[test]
    fn decode_fails_on_garbage() {
        let keys = get_keys("a-sufficiently-long-secret-for-hs256");

        assert_eq!(decode_token("not.a.token", &keys), Err(Error::InvalidToken));
    }
}
