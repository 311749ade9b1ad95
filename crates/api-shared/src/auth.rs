//! Header-level authentication helpers.
//!
//! These functions only parse and compare header values. Resolving a bearer token to a user is
//! the identity provider's job.

/// Prefix of an `Authorization` header carrying a session token.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Header carrying the anonymous key on signup.
pub const ANON_KEY_HEADER: &str = "apikey";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Unauthorized - no token provided")]
    MissingToken,
    #[error("Unauthorized")]
    Invalid,
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
///
/// # Errors
///
/// Returns [`AuthError::MissingToken`] if the header is absent or carries an empty token, and
/// [`AuthError::Invalid`] if it uses another scheme.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let value = header.map(str::trim).unwrap_or_default();
    if value.is_empty() {
        return Err(AuthError::MissingToken);
    }
    let token = value
        .strip_prefix(BEARER_PREFIX)
        .ok_or(AuthError::Invalid)?
        .trim();
    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}

/// Checks the anonymous key presented on signup.
///
/// When no key is configured every request passes.
pub fn validate_anon_key(provided: Option<&str>, expected: Option<&str>) -> Result<(), AuthError> {
    match expected {
        None => Ok(()),
        Some(expected) if provided == Some(expected) => Ok(()),
        Some(_) => Err(AuthError::Invalid),
    }
}
