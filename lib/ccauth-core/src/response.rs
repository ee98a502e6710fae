//! Token response parsing.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::{AuthorizationHeaderValue, SecureString, TokenError};

#[derive(Deserialize)]
struct RawTokenResponse {
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<Value>,
}

/// A successful token endpoint response.
///
/// Only `token_type`, `access_token` and `expires_in` are recognized, any other key
/// is ignored. `expires_in` is informational: it is reported, never acted upon.
pub struct TokenResponse {
    token_type: Option<String>,
    access_token: SecureString,
    expires_in: Option<Duration>,
}

impl TokenResponse {
    /// Parses a token response from an already decoded JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::TokenResponseError`] if the value is not an object, a
    /// recognized field has the wrong type, or `access_token` is missing or empty.
    pub fn from_json(value: &Value) -> Result<Self, TokenError> {
        if !value.is_object() {
            return Err(TokenError::response("expected a JSON object"));
        }

        let raw: RawTokenResponse = serde_path_to_error::deserialize(value).map_err(|err| {
            TokenError::response(format!("at '{}': {}", err.path(), err.inner()))
        })?;

        let access_token = raw
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| TokenError::response("missing access_token"))?;

        Ok(Self {
            token_type: raw.token_type,
            access_token: SecureString::new(access_token),
            expires_in: raw.expires_in.as_ref().and_then(parse_expires_in),
        })
    }

    /// Parses a token response from the raw response body.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::TokenResponseError`] if the body is not valid JSON, or for
    /// any of the reasons of [`TokenResponse::from_json`].
    pub fn from_slice(body: &[u8]) -> Result<Self, TokenError> {
        let value = parse_json(body)?;
        Self::from_json(&value)
    }

    /// The token type as returned by the server, if any.
    pub fn token_type(&self) -> Option<&str> {
        self.token_type.as_deref()
    }

    /// The access token.
    pub fn access_token(&self) -> &SecureString {
        &self.access_token
    }

    /// The advertised lifetime of the token.
    pub fn expires_in(&self) -> Option<Duration> {
        self.expires_in
    }

    /// Derives the `Authorization` header value, defaulting the token type to `Bearer`.
    pub fn authorization(&self) -> AuthorizationHeaderValue {
        AuthorizationHeaderValue::new(self.token_type(), self.access_token.as_str())
    }
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("token_type", &self.token_type)
            .field("access_token", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

pub(crate) fn parse_json(body: &[u8]) -> Result<Value, TokenError> {
    serde_json::from_slice(body)
        .map_err(|err| TokenError::response(format!("body is not valid JSON: {err}")))
}

// Some servers send the lifetime as a string
fn parse_expires_in(value: &Value) -> Option<Duration> {
    match value {
        Value::Number(number) => number
            .as_u64()
            .map(Duration::from_secs)
            .or_else(|| number.as_f64().and_then(|secs| Duration::try_from_secs_f64(secs).ok())),
        Value::String(text) => text.trim().parse().ok().map(Duration::from_secs),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[test]
    fn should_parse_full_response() {
        let response = TokenResponse::from_json(&json!({
            "token_type": "Bearer",
            "access_token": "abc123",
            "expires_in": 3600,
            "scope": "api",
        }))
        .expect("valid response");

        assert_eq!(response.token_type(), Some("Bearer"));
        assert_eq!(response.access_token().as_str(), "abc123");
        assert_eq!(response.expires_in(), Some(Duration::from_secs(3600)));
        assert_eq!(response.authorization().as_str(), "Bearer abc123");
    }

    #[test]
    fn should_default_token_type_to_bearer() {
        let response = TokenResponse::from_slice(br#"{"access_token":"abc123","expires_in":3599}"#)
            .expect("valid response");

        assert_eq!(response.token_type(), None);
        assert_eq!(response.expires_in(), Some(Duration::from_secs(3599)));
        assert_eq!(response.authorization().as_str(), "Bearer abc123");
    }

    #[rstest]
    #[case::bearer("Bearer", "tok", "Bearer tok")]
    #[case::lowercase("bearer", "tok", "bearer tok")]
    #[case::mac("MAC", "tok", "MAC tok")]
    #[case::empty_type("", "tok", "Bearer tok")]
    fn should_compose_authorization(
        #[case] token_type: &str,
        #[case] access_token: &str,
        #[case] expected: &str,
    ) {
        let response = TokenResponse::from_json(&json!({
            "token_type": token_type,
            "access_token": access_token,
        }))
        .expect("valid response");

        assert_eq!(response.authorization().as_str(), expected);
    }

    #[rstest]
    #[case::string(json!("120"), Some(Duration::from_secs(120)))]
    #[case::float(json!(1.5), Some(Duration::from_millis(1500)))]
    #[case::negative(json!(-1), None)]
    #[case::garbage(json!("soon"), None)]
    #[case::null(Value::Null, None)]
    fn should_read_expires_in_leniently(#[case] expires_in: Value, #[case] expected: Option<Duration>) {
        let response = TokenResponse::from_json(&json!({
            "access_token": "tok",
            "expires_in": expires_in,
        }))
        .expect("valid response");

        assert_eq!(response.expires_in(), expected);
    }

    #[rstest]
    #[case::missing(json!({"error": "invalid_client"}))]
    #[case::empty(json!({"access_token": ""}))]
    #[case::null(json!({"access_token": null}))]
    fn should_reject_missing_access_token(#[case] body: Value) {
        let result = TokenResponse::from_json(&body);

        let Err(TokenError::TokenResponseError { reason }) = result else {
            panic!("expected TokenResponseError");
        };
        assert_eq!(reason, "missing access_token");
    }

    #[test]
    fn should_report_path_of_mistyped_field() {
        let result = TokenResponse::from_json(&json!({"access_token": 42}));

        let Err(TokenError::TokenResponseError { reason }) = result else {
            panic!("expected TokenResponseError");
        };
        assert!(reason.starts_with("at 'access_token'"), "reason: {reason}");
    }

    #[rstest]
    #[case::html(b"<html>oops</html>".as_slice())]
    #[case::empty(b"".as_slice())]
    fn should_reject_non_json_body(#[case] body: &[u8]) {
        let result = TokenResponse::from_slice(body);

        let Err(TokenError::TokenResponseError { reason }) = result else {
            panic!("expected TokenResponseError");
        };
        assert!(reason.starts_with("body is not valid JSON"), "reason: {reason}");
    }

    #[test]
    fn should_reject_non_object_json() {
        let result = TokenResponse::from_slice(br#"["abc123"]"#);

        assert!(matches!(result, Err(TokenError::TokenResponseError { .. })));
    }

    #[test]
    fn should_redact_debug_output() {
        let response =
            TokenResponse::from_json(&json!({"access_token": "super-secret-token"})).expect("valid");

        let debug = format!("{response:?}");

        assert!(!debug.contains("super-secret-token"));
    }
}
