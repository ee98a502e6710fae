//! The token exchange: one token request in, one `Authorization` value out.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::observer::{ConsoleObserver, TokenResponseObserver};
use crate::response::parse_json;
use crate::{
    AuthorizationHeaderValue, ClientCredentials, TokenError, TokenRequest, TokenRequestConfig,
    TokenResponse, TokenTransport,
};

/// Acquires client-credentials tokens through a [`TokenTransport`].
///
/// Holds no token state: every call to [`TokenExchange::acquire_token`] performs a new
/// token request.
///
/// # Example
///
/// ```rust,no_run
/// use ccauth_core::{ClientCredentials, RequestStyle, TokenExchange, TokenRequestConfig};
///
/// # async fn example() -> Result<(), ccauth_core::TokenError> {
/// let credentials = ClientCredentials::new("id1", "secret1");
/// let config = TokenRequestConfig::builder("https://auth.example/token")?
///     .with_request_style(RequestStyle::Form)
///     .with_scope("read write")
///     .build();
///
/// let exchange = TokenExchange::new(reqwest::Client::new());
/// let authorization = exchange.acquire_token(&credentials, &config).await?;
/// assert!(authorization.as_str().starts_with("Bearer "));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct TokenExchange<T = reqwest::Client> {
    transport: T,
    observer: Arc<dyn TokenResponseObserver>,
}

impl<T> TokenExchange<T>
where
    T: TokenTransport,
{
    /// Creates an exchange printing diagnostics (when enabled) to the console.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            observer: Arc::new(ConsoleObserver),
        }
    }

    /// Replaces the diagnostics observer.
    #[must_use]
    pub fn with_observer(mut self, observer: impl TokenResponseObserver + 'static) -> Self {
        self.observer = Arc::new(observer);
        self
    }

    /// Returns the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Requests a token and derives the `Authorization` header value.
    ///
    /// Builds the request for the configured style, sends it once, then reads
    /// `token_type` (default `Bearer`) and `access_token` from the JSON answer.
    ///
    /// # Errors
    ///
    /// - [`TokenError::ConfigurationError`] if the request cannot be built
    /// - [`TokenError::TokenEndpointUnreachable`] on transport failure
    /// - [`TokenError::TokenRequestRejected`] on a non-2xx status
    /// - [`TokenError::TokenResponseError`] if the body is not JSON, lacks
    ///   `access_token`, or the token cannot be used as a header value
    pub async fn acquire_token(
        &self,
        credentials: &ClientCredentials,
        config: &TokenRequestConfig,
    ) -> Result<AuthorizationHeaderValue, TokenError> {
        let request = TokenRequest::new(credentials, config)?;
        debug!(
            style = %config.request_style(),
            endpoint = %config.token_endpoint(),
            scope = config.scope(),
            "acquiring client credentials token"
        );

        let response = self.transport.send(request).await?;

        let status = response.status();
        if !status.is_success() {
            if config.print_token_response() {
                self.observer.on_error_response(status, response.body());
            }
            return Err(TokenError::TokenRequestRejected {
                status: status.as_u16(),
                body: response.body_text(),
            });
        }

        let json = parse_json(response.body())?;
        if config.print_token_response() {
            self.observer.on_token_response(&json);
        }
        let token = TokenResponse::from_json(&json)?;
        debug!(
            token_type = token.token_type(),
            expires_in = ?token.expires_in(),
            "token acquired"
        );

        let authorization = token.authorization();
        authorization.to_header_value()?;

        Ok(authorization)
    }
}

impl<T> fmt::Debug for TokenExchange<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenExchange")
            .field("transport", &self.transport)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use http::StatusCode;
    use serde_json::Value;

    use super::*;
    use crate::{RequestStyle, TokenHttpResponse};

    /// Answers every request with the same canned response and records what was sent.
    #[derive(Debug, Clone)]
    struct CannedTransport {
        status: StatusCode,
        body: &'static str,
        calls: Arc<AtomicUsize>,
        last_body: Arc<Mutex<Vec<u8>>>,
    }

    impl CannedTransport {
        fn new(status: StatusCode, body: &'static str) -> Self {
            Self {
                status,
                body,
                calls: Arc::default(),
                last_body: Arc::default(),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl TokenTransport for CannedTransport {
        async fn send(&self, request: TokenRequest) -> Result<TokenHttpResponse, TokenError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_body.lock().expect("lock") = request.body().to_vec();
            Ok(TokenHttpResponse::new(self.status, self.body))
        }
    }

    #[derive(Debug, Default, Clone)]
    struct RecordingObserver {
        responses: Arc<Mutex<Vec<Value>>>,
        errors: Arc<Mutex<Vec<(StatusCode, Vec<u8>)>>>,
    }

    impl TokenResponseObserver for RecordingObserver {
        fn on_token_response(&self, response: &Value) {
            self.responses.lock().expect("lock").push(response.clone());
        }

        fn on_error_response(&self, status: StatusCode, body: &[u8]) {
            self.errors.lock().expect("lock").push((status, body.to_vec()));
        }
    }

    fn credentials() -> ClientCredentials {
        ClientCredentials::new("id1", "secret1")
    }

    fn config(print: bool) -> TokenRequestConfig {
        TokenRequestConfig::builder("https://auth.example/token")
            .expect("valid endpoint")
            .with_request_style(RequestStyle::Form)
            .with_print_token_response(print)
            .build()
    }

    #[tokio::test]
    async fn should_derive_bearer_header_when_token_type_missing() {
        let transport =
            CannedTransport::new(StatusCode::OK, r#"{"access_token":"abc123","expires_in":3599}"#);
        let exchange = TokenExchange::new(transport.clone());

        let authorization = exchange
            .acquire_token(&credentials(), &config(false))
            .await
            .expect("token");

        assert_eq!(authorization.as_str(), "Bearer abc123");
        assert_eq!(transport.calls(), 1);
        assert_eq!(
            *transport.last_body.lock().expect("lock"),
            b"client_id=id1&client_secret=secret1&grant_type=client_credentials"
        );
    }

    #[tokio::test]
    async fn should_use_returned_token_type() {
        let transport =
            CannedTransport::new(StatusCode::OK, r#"{"token_type":"MAC","access_token":"xyz"}"#);
        let exchange = TokenExchange::new(transport);

        let authorization = exchange
            .acquire_token(&credentials(), &config(false))
            .await
            .expect("token");

        assert_eq!(authorization.as_str(), "MAC xyz");
    }

    #[tokio::test]
    async fn should_request_a_new_token_on_every_call() {
        let transport = CannedTransport::new(StatusCode::OK, r#"{"access_token":"abc123"}"#);
        let exchange = TokenExchange::new(transport.clone());

        exchange
            .acquire_token(&credentials(), &config(false))
            .await
            .expect("first token");
        exchange
            .acquire_token(&credentials(), &config(false))
            .await
            .expect("second token");

        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn should_reject_non_success_status() {
        let transport =
            CannedTransport::new(StatusCode::UNAUTHORIZED, r#"{"error":"invalid_client"}"#);
        let exchange = TokenExchange::new(transport);

        let result = exchange.acquire_token(&credentials(), &config(false)).await;

        assert_eq!(
            result.expect_err("rejected"),
            TokenError::TokenRequestRejected {
                status: 401,
                body: r#"{"error":"invalid_client"}"#.to_string(),
            }
        );
    }

    #[tokio::test]
    async fn should_fail_on_missing_access_token() {
        let transport = CannedTransport::new(StatusCode::OK, r#"{"token_type":"Bearer"}"#);
        let exchange = TokenExchange::new(transport);

        let result = exchange.acquire_token(&credentials(), &config(false)).await;

        assert!(matches!(
            result,
            Err(TokenError::TokenResponseError { .. })
        ));
    }

    #[tokio::test]
    async fn should_fail_on_non_json_success_body() {
        let transport = CannedTransport::new(StatusCode::OK, "access_token=abc123");
        let observer = RecordingObserver::default();
        let exchange = TokenExchange::new(transport).with_observer(observer.clone());

        let result = exchange.acquire_token(&credentials(), &config(true)).await;

        assert!(matches!(
            result,
            Err(TokenError::TokenResponseError { .. })
        ));
        assert!(observer.responses.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn should_fail_on_token_unusable_as_header() {
        let transport = CannedTransport::new(StatusCode::OK, r#"{"access_token":"abc\n123"}"#);
        let exchange = TokenExchange::new(transport);

        let result = exchange.acquire_token(&credentials(), &config(false)).await;

        assert!(matches!(
            result,
            Err(TokenError::TokenResponseError { .. })
        ));
    }

    #[tokio::test]
    async fn should_emit_token_response_without_changing_header() {
        let body = r#"{"token_type":"Bearer","access_token":"abc123","expires_in":3599}"#;
        let silent = TokenExchange::new(CannedTransport::new(StatusCode::OK, body));
        let observer = RecordingObserver::default();
        let printing = TokenExchange::new(CannedTransport::new(StatusCode::OK, body))
            .with_observer(observer.clone());

        let quiet_header = silent
            .acquire_token(&credentials(), &config(false))
            .await
            .expect("token");
        let printed_header = printing
            .acquire_token(&credentials(), &config(true))
            .await
            .expect("token");

        assert_eq!(quiet_header, printed_header);
        let responses = observer.responses.lock().expect("lock");
        assert_eq!(responses.len(), 1);
        assert_eq!(responses.first().and_then(|json| json["access_token"].as_str()), Some("abc123"));
    }

    #[tokio::test]
    async fn should_emit_error_response_when_printing() {
        let observer = RecordingObserver::default();
        let exchange = TokenExchange::new(CannedTransport::new(
            StatusCode::UNAUTHORIZED,
            r#"{"error":"invalid_client"}"#,
        ))
        .with_observer(observer.clone());

        let result = exchange.acquire_token(&credentials(), &config(true)).await;

        assert!(result.is_err());
        let errors = observer.errors.lock().expect("lock");
        assert_eq!(
            errors.as_slice(),
            &[(StatusCode::UNAUTHORIZED, br#"{"error":"invalid_client"}"#.to_vec())]
        );
    }

    #[tokio::test]
    async fn should_not_emit_anything_when_printing_disabled() {
        let observer = RecordingObserver::default();
        let exchange = TokenExchange::new(CannedTransport::new(
            StatusCode::OK,
            r#"{"access_token":"abc123"}"#,
        ))
        .with_observer(observer.clone());

        exchange
            .acquire_token(&credentials(), &config(false))
            .await
            .expect("token");

        assert!(observer.responses.lock().expect("lock").is_empty());
        assert!(observer.errors.lock().expect("lock").is_empty());
    }
}
