use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use http::HeaderValue;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::TokenError;

/// Default token type used when the token response does not provide one.
pub const DEFAULT_TOKEN_TYPE: &str = "Bearer";

/// Secure wrapper for sensitive string data that automatically zeroes memory on drop.
///
/// Used for the client secret, the access token and the derived `Authorization` value.
/// The value is redacted in `Debug` and masked in `Display`.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecureString(String);

impl SecureString {
    /// Creates a new secure string from the provided value.
    pub fn new(value: String) -> Self {
        Self(value)
    }

    /// Returns a reference to the inner string value.
    ///
    /// # Security Note
    /// The returned reference should not be stored for extended periods
    /// to minimize exposure time of sensitive data.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the inner value is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Masks sensitive data for display purposes: first and last four characters only.
    fn mask_sensitive(value: &str) -> String {
        let count = value.chars().count();
        if count <= 8 {
            return "***".to_string();
        }
        let head = value.chars().take(4).collect::<String>();
        let tail = value.chars().skip(count - 4).collect::<String>();
        format!("{head}...{tail}")
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureString")
            .field("value", &"[REDACTED]")
            .finish()
    }
}

impl fmt::Display for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Self::mask_sensitive(&self.0))
    }
}

impl From<String> for SecureString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecureString {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

/// The client identifier and secret presented to the token endpoint.
///
/// Empty values are accepted: the token server is the one deciding whether
/// anonymous or partial credentials are acceptable.
#[derive(Clone)]
pub struct ClientCredentials {
    client_id: String,
    client_secret: SecureString,
}

impl ClientCredentials {
    /// Creates client credentials.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<SecureString>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Returns the client identifier.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Returns the client secret.
    pub fn client_secret(&self) -> &SecureString {
        &self.client_secret
    }

    /// Builds the `Basic <base64(client_id:client_secret)>` credential (RFC 7617).
    pub(crate) fn basic_authorization(&self) -> SecureString {
        let mut pair = format!("{}:{}", self.client_id, self.client_secret.as_str());
        let encoded = STANDARD.encode(pair.as_bytes());
        pair.zeroize();
        SecureString::new(format!("Basic {encoded}"))
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

/// The `Authorization` header value derived from a token response:
/// `"<token_type> <access_token>"`.
///
/// It only lives for the dispatch of a single target request.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthorizationHeaderValue {
    token_type: String,
    value: SecureString,
}

impl AuthorizationHeaderValue {
    /// Derives the header value, falling back to `Bearer` when `token_type` is absent or empty.
    pub fn new(token_type: Option<&str>, access_token: &str) -> Self {
        let token_type = token_type
            .filter(|token_type| !token_type.is_empty())
            .unwrap_or(DEFAULT_TOKEN_TYPE)
            .to_string();
        let value = SecureString::new(format!("{token_type} {access_token}"));
        Self { token_type, value }
    }

    /// Returns the token type prefix (e.g. `Bearer`).
    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    /// Returns the full header value.
    pub fn as_str(&self) -> &str {
        self.value.as_str()
    }

    /// Converts into an HTTP header value flagged as sensitive.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::TokenResponseError`] if the token contains characters
    /// that are not allowed in an HTTP header.
    pub fn to_header_value(&self) -> Result<HeaderValue, TokenError> {
        let mut value = HeaderValue::from_str(self.value.as_str()).map_err(|err| {
            TokenError::response(format!("access_token is not a valid header value: {err}"))
        })?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl fmt::Debug for AuthorizationHeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizationHeaderValue")
            .field("token_type", &self.token_type)
            .field("value", &"[REDACTED]")
            .finish()
    }
}

impl fmt::Display for AuthorizationHeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}
