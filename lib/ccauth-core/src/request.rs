//! Token request descriptors, one constructor per [`RequestStyle`].

use std::fmt;

use headers::{ContentType, HeaderMapExt};
use http::header::AUTHORIZATION;
use http::{HeaderMap, HeaderValue, Method};
use serde::Serialize;
use url::Url;

use crate::{ClientCredentials, RequestStyle, TokenError, TokenRequestConfig};

/// The only grant this crate speaks.
pub const GRANT_TYPE: &str = "client_credentials";

/// Token request parameters.
///
/// Field order is the wire order for both the form and the JSON encodings.
#[derive(Serialize)]
struct TokenRequestParams<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    client_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_secret: Option<&'a str>,
    grant_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    scope: Option<&'a str>,
}

impl<'a> TokenRequestParams<'a> {
    fn without_credentials(scope: Option<&'a str>) -> Self {
        Self {
            client_id: None,
            client_secret: None,
            grant_type: GRANT_TYPE,
            scope,
        }
    }

    fn with_credentials(credentials: &'a ClientCredentials, scope: Option<&'a str>) -> Self {
        Self {
            client_id: Some(credentials.client_id()),
            client_secret: Some(credentials.client_secret().as_str()),
            grant_type: GRANT_TYPE,
            scope,
        }
    }

    fn to_form(&self) -> Result<Vec<u8>, TokenError> {
        serde_urlencoded::to_string(self)
            .map(String::into_bytes)
            .map_err(|err| TokenError::configuration(format!("cannot encode token request: {err}")))
    }

    fn to_json(&self) -> Result<Vec<u8>, TokenError> {
        serde_json::to_vec(self)
            .map_err(|err| TokenError::configuration(format!("cannot encode token request: {err}")))
    }
}

/// A fully built token request, ready to be handed to a [`TokenTransport`](crate::TokenTransport).
///
/// Always a `POST` to the configured token endpoint.
#[derive(Clone)]
pub struct TokenRequest {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl TokenRequest {
    /// Builds the request matching the configured request style.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::ConfigurationError`] if the request cannot be encoded.
    pub fn new(
        credentials: &ClientCredentials,
        config: &TokenRequestConfig,
    ) -> Result<Self, TokenError> {
        let endpoint = config.token_endpoint();
        let scope = config.scope();
        match config.request_style() {
            RequestStyle::Basic => Self::basic(credentials, endpoint, scope),
            RequestStyle::Form => Self::form(credentials, endpoint, scope),
            RequestStyle::Json => Self::json(credentials, endpoint, scope),
        }
    }

    /// Credentials in an `Authorization: Basic` header, form body
    /// `grant_type=client_credentials[&scope=...]`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::ConfigurationError`] if the request cannot be encoded.
    pub fn basic(
        credentials: &ClientCredentials,
        endpoint: &Url,
        scope: Option<&str>,
    ) -> Result<Self, TokenError> {
        let body = TokenRequestParams::without_credentials(scope).to_form()?;

        let mut authorization = HeaderValue::from_str(credentials.basic_authorization().as_str())
            .map_err(|err| TokenError::configuration(format!("invalid Basic credentials: {err}")))?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, authorization);
        headers.typed_insert(ContentType::from(mime::APPLICATION_WWW_FORM_URLENCODED));

        Ok(Self::post(endpoint, headers, body))
    }

    /// Credentials in the form body:
    /// `client_id=..&client_secret=..&grant_type=client_credentials[&scope=...]`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::ConfigurationError`] if the request cannot be encoded.
    pub fn form(
        credentials: &ClientCredentials,
        endpoint: &Url,
        scope: Option<&str>,
    ) -> Result<Self, TokenError> {
        let body = TokenRequestParams::with_credentials(credentials, scope).to_form()?;

        let mut headers = HeaderMap::new();
        headers.typed_insert(ContentType::from(mime::APPLICATION_WWW_FORM_URLENCODED));

        Ok(Self::post(endpoint, headers, body))
    }

    /// Credentials in a JSON body; the `scope` key is omitted when there is no scope.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::ConfigurationError`] if the request cannot be encoded.
    pub fn json(
        credentials: &ClientCredentials,
        endpoint: &Url,
        scope: Option<&str>,
    ) -> Result<Self, TokenError> {
        let body = TokenRequestParams::with_credentials(credentials, scope).to_json()?;

        let mut headers = HeaderMap::new();
        headers.typed_insert(ContentType::from(mime::APPLICATION_JSON));

        Ok(Self::post(endpoint, headers, body))
    }

    fn post(endpoint: &Url, headers: HeaderMap, body: Vec<u8>) -> Self {
        Self {
            method: Method::POST,
            url: endpoint.clone(),
            headers,
            body,
        }
    }

    /// The HTTP method, always `POST`.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The token endpoint.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The encoded request body.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Splits the request into its parts.
    pub fn into_parts(self) -> (Method, Url, HeaderMap, Vec<u8>) {
        let Self {
            method,
            url,
            headers,
            body,
        } = self;
        (method, url, headers, body)
    }
}

impl fmt::Debug for TokenRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The body may carry the client secret
        f.debug_struct("TokenRequest")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field("headers", &self.headers)
            .field("body_length", &self.body.len())
            .finish()
    }
}
