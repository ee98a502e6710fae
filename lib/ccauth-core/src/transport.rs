//! The seam between the token exchange and the HTTP client.

use std::error::Error as _;
use std::fmt;
use std::future::Future;

use http::StatusCode;
use reqwest::Body;
use tracing::debug;

use crate::{TokenError, TokenRequest};

/// Status and body of the token endpoint answer.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenHttpResponse {
    status: StatusCode,
    body: Vec<u8>,
}

impl TokenHttpResponse {
    /// Creates a response.
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// The HTTP status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The raw body.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The body as text, replacing invalid UTF-8 sequences.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl fmt::Debug for TokenHttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The body holds the access token on success
        f.debug_struct("TokenHttpResponse")
            .field("status", &self.status)
            .field("body_length", &self.body.len())
            .finish()
    }
}

/// Sends a [`TokenRequest`] and returns the raw answer.
///
/// Implementations perform exactly one round trip per call: no retry, no cache.
/// Timeouts are whatever the underlying client is configured with.
pub trait TokenTransport {
    /// Sends the request.
    ///
    /// Any status code is a successful exchange at this level; only transport
    /// failures are errors, reported as [`TokenError::TokenEndpointUnreachable`].
    fn send(
        &self,
        request: TokenRequest,
    ) -> impl Future<Output = Result<TokenHttpResponse, TokenError>> + Send;
}

impl TokenTransport for reqwest::Client {
    async fn send(&self, request: TokenRequest) -> Result<TokenHttpResponse, TokenError> {
        let (method, url, headers, body) = request.into_parts();
        let endpoint = url.to_string();

        let mut request = reqwest::Request::new(method, url);
        *request.headers_mut() = headers;
        *request.body_mut() = Some(Body::from(body));

        debug!(%endpoint, "requesting token...");
        let response = self
            .execute(request)
            .await
            .map_err(|err| unreachable_endpoint(&endpoint, &err))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| unreachable_endpoint(&endpoint, &err))?;
        debug!(%endpoint, %status, "...token endpoint answered");

        Ok(TokenHttpResponse::new(status, body.to_vec()))
    }
}

fn unreachable_endpoint(endpoint: &str, err: &reqwest::Error) -> TokenError {
    let mut reason = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        reason.push_str(": ");
        reason.push_str(&cause.to_string());
        source = cause.source();
    }

    TokenError::TokenEndpointUnreachable {
        url: endpoint.to_string(),
        reason,
    }
}
