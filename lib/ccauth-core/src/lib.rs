//! # ccauth Core
//!
//! Authenticate an outgoing HTTP request with a bearer token obtained through the
//! OAuth2.0 client-credentials grant.
//!
//! For every target request, a token request is sent to the token endpoint, the
//! `access_token` is read from the JSON answer and the target request receives an
//! `Authorization: <token_type> <access_token>` header. Tokens are never cached:
//! each invocation performs its own token request.
//!
//! ## Token request styles
//!
//! The way the client credentials are presented is selected with [`RequestStyle`]:
//!
//! | Style   | Credentials                          | Body                                                         |
//! |---------|--------------------------------------|--------------------------------------------------------------|
//! | `basic` | `Authorization: Basic base64(id:secret)` | `grant_type=client_credentials[&scope=..]`               |
//! | `form`  | form body                            | `client_id=..&client_secret=..&grant_type=client_credentials[&scope=..]` |
//! | `json`  | JSON body                            | `{"client_id":..,"client_secret":..,"grant_type":"client_credentials"[,"scope":..]}` |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ccauth_core::{
//!     ClientCredentials, ClientCredentialsAuth, RequestStyle, TokenExchange, TokenRequestConfig,
//! };
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = reqwest::Client::new();
//!
//! let config = TokenRequestConfig::builder("https://auth.example/token")?
//!     .with_request_style(RequestStyle::Json)
//!     .with_scope("api")
//!     .build();
//! let auth = ClientCredentialsAuth::new(
//!     ClientCredentials::new("id1", "secret1"),
//!     config,
//!     TokenExchange::new(client.clone()),
//! );
//!
//! let mut request = client.get("https://api.example/resources").build()?;
//! auth.authorize(&mut request).await?;
//! let response = client.execute(request).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing without a network
//!
//! [`TokenExchange`] is generic over [`TokenTransport`]; implement it to answer token
//! requests from memory. [`TokenRequest`] can also be built and inspected directly.

mod auth;
pub use self::auth::{AuthorizationHeaderValue, ClientCredentials, DEFAULT_TOKEN_TYPE, SecureString};

mod augment;
pub use self::augment::{AuthorizeRequest, ClientCredentialsAuth};

mod config;
pub use self::config::{RequestStyle, TokenRequestConfig, TokenRequestConfigBuilder};

mod error;
pub use self::error::TokenError;

mod exchange;
pub use self::exchange::TokenExchange;

pub mod observer;
pub use self::observer::{ConsoleObserver, TokenResponseObserver};

mod request;
pub use self::request::{GRANT_TYPE, TokenRequest};

mod response;
pub use self::response::TokenResponse;

mod transport;
pub use self::transport::{TokenHttpResponse, TokenTransport};
