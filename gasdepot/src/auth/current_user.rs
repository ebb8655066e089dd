//! Extractor for the authenticated user.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::{
    AppState,
    api::models::users::CurrentUser,
    auth::session,
    errors::{Error, Result},
};

/// Authentication gate for every business endpoint.
///
/// Reads the `Authorization` header, which must be a two-part
/// `<scheme> <token>` value, and verifies the token. The scheme word itself
/// is not interpreted; clients conventionally send `Bearer`. A missing or
/// malformed header and a failed signature/expiry check all reject the
/// request with 403.
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let auth_header = parts.headers.get(header::AUTHORIZATION).ok_or(Error::Forbidden {
            message: Some("Missing Authorization header".to_string()),
        })?;

        let auth_str = auth_header.to_str().map_err(|_| Error::Forbidden {
            message: Some("Invalid Authorization header".to_string()),
        })?;

        let mut words = auth_str.split_whitespace();
        let token = match (words.next(), words.next(), words.next()) {
            (Some(_scheme), Some(token), None) => token,
            _ => {
                return Err(Error::Forbidden {
                    message: Some("Authorization header must be '<scheme> <token>'".to_string()),
                });
            }
        };

        session::verify_session_token(token, &state.config)
    }
}
