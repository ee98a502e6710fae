//! Attaching the acquired token to the target request.

use std::fmt;

use http::HeaderMap;
use http::header::AUTHORIZATION;
use tracing::info;

use crate::{
    AuthorizationHeaderValue, ClientCredentials, TokenError, TokenExchange, TokenRequestConfig,
    TokenTransport,
};

/// A target request that can receive an `Authorization` header.
///
/// Implementations overwrite any previous `Authorization` header and leave every other
/// header and the body untouched. Nothing is modified when an error is returned.
pub trait AuthorizeRequest {
    /// Sets the `Authorization` header.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::TokenResponseError`] if the value cannot be used as a header.
    fn set_authorization(&mut self, value: &AuthorizationHeaderValue) -> Result<(), TokenError>;
}

impl AuthorizeRequest for HeaderMap {
    fn set_authorization(&mut self, value: &AuthorizationHeaderValue) -> Result<(), TokenError> {
        let header_value = value.to_header_value()?;
        self.insert(AUTHORIZATION, header_value);
        Ok(())
    }
}

impl AuthorizeRequest for reqwest::Request {
    fn set_authorization(&mut self, value: &AuthorizationHeaderValue) -> Result<(), TokenError> {
        self.headers_mut().set_authorization(value)
    }
}

impl<B> AuthorizeRequest for http::Request<B> {
    fn set_authorization(&mut self, value: &AuthorizationHeaderValue) -> Result<(), TokenError> {
        self.headers_mut().set_authorization(value)
    }
}

/// Client-credentials authentication for a host HTTP client.
///
/// This is the single entry point of a host integration: call
/// [`ClientCredentialsAuth::authorize`] right before dispatching the target request.
/// A fresh token is requested on every call.
///
/// # Example
///
/// ```rust,no_run
/// use ccauth_core::{ClientCredentials, ClientCredentialsAuth, TokenExchange, TokenRequestConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = reqwest::Client::new();
/// let auth = ClientCredentialsAuth::new(
///     ClientCredentials::new("id1", "secret1"),
///     TokenRequestConfig::builder("https://auth.example/token")?.build(),
///     TokenExchange::new(client.clone()),
/// );
///
/// let mut request = client.get("https://api.example/users").build()?;
/// auth.authorize(&mut request).await?;
/// let response = client.execute(request).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ClientCredentialsAuth<T = reqwest::Client> {
    credentials: ClientCredentials,
    config: TokenRequestConfig,
    exchange: TokenExchange<T>,
}

impl<T> ClientCredentialsAuth<T>
where
    T: TokenTransport,
{
    /// Creates the authentication.
    pub fn new(
        credentials: ClientCredentials,
        config: TokenRequestConfig,
        exchange: TokenExchange<T>,
    ) -> Self {
        Self {
            credentials,
            config,
            exchange,
        }
    }

    /// The token request configuration.
    pub fn config(&self) -> &TokenRequestConfig {
        &self.config
    }

    /// Acquires a token and attaches it to the request.
    ///
    /// # Errors
    ///
    /// Any [`TokenError`] from the token exchange; the request is left unchanged and
    /// must not be sent.
    pub async fn authorize<R>(&self, request: &mut R) -> Result<(), TokenError>
    where
        R: AuthorizeRequest + ?Sized,
    {
        let authorization = self
            .exchange
            .acquire_token(&self.credentials, &self.config)
            .await?;
        request.set_authorization(&authorization)?;
        info!(
            token_type = authorization.token_type(),
            "Authorization header attached"
        );

        Ok(())
    }
}

impl<T> fmt::Debug for ClientCredentialsAuth<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentialsAuth")
            .field("credentials", &self.credentials)
            .field("config", &self.config)
            .field("exchange", &self.exchange)
            .finish()
    }
}
