//! Token request configuration and builder.

use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::TokenError;

/// How the client credentials are presented to the token endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RequestStyle {
    /// `Authorization: Basic` header, form body with `grant_type` (and `scope`).
    #[default]
    Basic,
    /// Credentials in a `application/x-www-form-urlencoded` body.
    Form,
    /// Credentials in a `application/json` body.
    Json,
}

impl RequestStyle {
    /// All request styles, in declaration order.
    pub const ALL: [Self; 3] = [Self::Basic, Self::Form, Self::Json];

    /// The selector used on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Form => "form",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for RequestStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStyle {
    type Err = TokenError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|style| style.as_str() == value)
            .ok_or_else(|| {
                TokenError::configuration(format!(
                    "token-request-type is invalid value: '{value}' (expected one of: basic, form, json)"
                ))
            })
    }
}

/// Where and how to request a token.
///
/// Use [`TokenRequestConfig::builder`] to create instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRequestConfig {
    token_endpoint: Url,
    request_style: RequestStyle,
    scope: Option<String>,
    print_token_response: bool,
}

impl TokenRequestConfig {
    /// Creates a builder for the given token endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::ConfigurationError`] if the endpoint is not an absolute
    /// `http`/`https` URL.
    pub fn builder(token_endpoint: impl AsRef<str>) -> Result<TokenRequestConfigBuilder, TokenError> {
        TokenRequestConfigBuilder::new(token_endpoint)
    }

    /// The token endpoint URL.
    pub fn token_endpoint(&self) -> &Url {
        &self.token_endpoint
    }

    /// The request style.
    pub fn request_style(&self) -> RequestStyle {
        self.request_style
    }

    /// The requested scope, never empty.
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// Whether the token response should be emitted for diagnostics.
    pub fn print_token_response(&self) -> bool {
        self.print_token_response
    }
}

/// Builder for [`TokenRequestConfig`].
#[derive(Debug, Clone)]
pub struct TokenRequestConfigBuilder {
    token_endpoint: Url,
    request_style: RequestStyle,
    scope: Option<String>,
    print_token_response: bool,
}

impl TokenRequestConfigBuilder {
    fn new(token_endpoint: impl AsRef<str>) -> Result<Self, TokenError> {
        let raw = token_endpoint.as_ref();
        let token_endpoint = Url::parse(raw).map_err(|err| {
            TokenError::configuration(format!("invalid token endpoint URL '{raw}': {err}"))
        })?;
        if !matches!(token_endpoint.scheme(), "http" | "https") || !token_endpoint.has_host() {
            return Err(TokenError::configuration(format!(
                "invalid token endpoint URL '{raw}': expected an absolute http(s) URL"
            )));
        }

        Ok(Self {
            token_endpoint,
            request_style: RequestStyle::default(),
            scope: None,
            print_token_response: false,
        })
    }

    /// Sets the request style.
    #[must_use]
    pub fn with_request_style(mut self, request_style: RequestStyle) -> Self {
        self.request_style = request_style;
        self
    }

    /// Sets the scope; an empty scope is treated as no scope.
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        let scope = scope.into();
        self.scope = (!scope.is_empty()).then_some(scope);
        self
    }

    /// Enables or disables the diagnostic emission of the token response.
    #[must_use]
    pub fn with_print_token_response(mut self, print_token_response: bool) -> Self {
        self.print_token_response = print_token_response;
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> TokenRequestConfig {
        let Self {
            token_endpoint,
            request_style,
            scope,
            print_token_response,
        } = self;

        TokenRequestConfig {
            token_endpoint,
            request_style,
            scope,
            print_token_response,
        }
    }
}
