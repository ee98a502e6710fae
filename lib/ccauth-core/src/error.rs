//! Errors raised while acquiring a client-credentials token.

/// Errors that can occur during token acquisition.
///
/// Every variant is fatal for the current invocation: the target request must not be
/// sent. Nothing is retried.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Error, derive_more::Display)]
pub enum TokenError {
    /// The configuration is unusable (bad token endpoint URL, unknown request style).
    ///
    /// Detected before any network call.
    #[display("OAuth2 configuration error: {reason}")]
    ConfigurationError {
        /// Description of the configuration issue.
        reason: String,
    },

    /// The token endpoint could not be reached (DNS, connect, TLS, timeout...).
    #[display("Token endpoint '{url}' is unreachable: {reason}")]
    TokenEndpointUnreachable {
        /// The token endpoint URL.
        url: String,
        /// Description of the transport failure.
        reason: String,
    },

    /// The token endpoint answered with a non-success status.
    #[display("Token request rejected with status {status}: {body}")]
    TokenRequestRejected {
        /// The HTTP status code returned by the token endpoint.
        status: u16,
        /// The raw response body, for diagnostics.
        body: String,
    },

    /// The token response is not valid JSON or lacks a usable `access_token`.
    #[display("Invalid OAuth2 token response: {reason}")]
    TokenResponseError {
        /// Description of what was invalid.
        reason: String,
    },
}

impl TokenError {
    pub(crate) fn configuration(reason: impl Into<String>) -> Self {
        Self::ConfigurationError {
            reason: reason.into(),
        }
    }

    pub(crate) fn response(reason: impl Into<String>) -> Self {
        Self::TokenResponseError {
            reason: reason.into(),
        }
    }
}
