#![allow(dead_code)]

use ccauth_core::{
    ClientCredentials, ClientCredentialsAuth, RequestStyle, TokenExchange, TokenRequestConfig,
};
use tracing::info;
use wiremock::MockServer;

pub const CLIENT_ID: &str = "id1";
pub const CLIENT_SECRET: &str = "secret1";

pub fn init_tracing() {
    // should be run once, fail otherwise, we skip that error
    let _ = tracing_subscriber::fmt()
        .pretty()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();

    info!("Tracing initialized");
}

pub async fn start_server() -> MockServer {
    init_tracing();
    MockServer::start().await
}

pub fn token_config(
    server: &MockServer,
    style: RequestStyle,
    scope: Option<&str>,
) -> anyhow::Result<TokenRequestConfig> {
    let mut builder = TokenRequestConfig::builder(format!("{}/token", server.uri()))?
        .with_request_style(style);
    if let Some(scope) = scope {
        builder = builder.with_scope(scope);
    }
    Ok(builder.build())
}

pub fn auth(config: TokenRequestConfig, client: &reqwest::Client) -> ClientCredentialsAuth {
    ClientCredentialsAuth::new(
        ClientCredentials::new(CLIENT_ID, CLIENT_SECRET),
        config,
        TokenExchange::new(client.clone()),
    )
}

/// What a host does: authorize, then send the target request.
pub async fn send_target(
    auth: &ClientCredentialsAuth,
    client: &reqwest::Client,
    url: &str,
) -> anyhow::Result<reqwest::Response> {
    let mut request = client.get(url).build()?;
    auth.authorize(&mut request).await?;
    let response = client.execute(request).await?;
    Ok(response)
}
