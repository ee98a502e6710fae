#![allow(missing_docs)]
use std::io::{self, Write};

use anyhow::{Context, Result};
use ccauth_core::{ClientCredentials, ClientCredentialsAuth, TokenExchange, TokenRequestConfig};
use reqwest::header::{HeaderName, HeaderValue};
use tracing::{Level, debug, info, warn};

mod args;
use self::args::{AppArgs, Command, USAGE};

mod netrc;
use self::netrc::Netrc;

#[tokio::main]
async fn main() -> Result<()> {
    let args = match AppArgs::parse().context("parsing arguments")? {
        Command::Run(args) => *args,
        Command::Help => {
            io::stdout().write_all(USAGE.as_bytes())?;
            return Ok(());
        }
    };

    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    run(args).await
}

async fn run(args: AppArgs) -> Result<()> {
    let credentials = resolve_credentials(&args)?;

    let config = TokenRequestConfig::builder(&args.token_endpoint)?
        .with_request_style(args.token_request_type)
        .with_print_token_response(args.print_token_response);
    let config = match &args.scope {
        Some(scope) => config.with_scope(scope),
        None => config,
    }
    .build();

    // One client, one timeout, for both the token and the target request
    let mut client = reqwest::Client::builder();
    if let Some(timeout) = args.timeout {
        client = client.timeout(timeout);
    }
    let client = client.build().context("building HTTP client")?;

    let mut request = client.request(args.method.clone(), args.url.clone());
    for (name, value) in &args.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .with_context(|| format!("invalid header name '{name}'"))?;
        let value = HeaderValue::from_str(value)
            .with_context(|| format!("invalid value for header '{name}'"))?;
        request = request.header(name, value);
    }
    let mut request = request.build().context("building target request")?;

    let auth = ClientCredentialsAuth::new(credentials, config, TokenExchange::new(client.clone()));
    auth.authorize(&mut request)
        .await
        .context("acquiring OAuth2 client credentials token")?;

    debug!(method = %request.method(), url = %request.url(), "sending target request...");
    let response = client
        .execute(request)
        .await
        .context("sending target request")?;
    info!(status = %response.status(), "...target request answered");

    let mut head = format!("{:?} {}\n", response.version(), response.status());
    for (name, value) in response.headers() {
        head.push_str(&format!("{name}: {}\n", String::from_utf8_lossy(value.as_bytes())));
    }
    head.push('\n');
    let body = response.bytes().await.context("reading target response")?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(head.as_bytes())?;
    stdout.write_all(&body)?;
    stdout.flush()?;

    Ok(())
}

/// Explicit `--auth` credentials win over the netrc entry of the target host.
fn resolve_credentials(args: &AppArgs) -> Result<ClientCredentials> {
    if let Some((client_id, client_secret)) = &args.auth {
        return Ok(ClientCredentials::new(client_id.as_str(), client_secret.as_str()));
    }

    // An explicit netrc file must exist, the default one is optional
    let netrc = match (&args.netrc_file, Netrc::default_path()) {
        (Some(path), _) => Some(
            Netrc::read(path).with_context(|| format!("reading netrc file {}", path.display()))?,
        ),
        (None, Some(path)) => Netrc::load(&path)
            .with_context(|| format!("reading netrc file {}", path.display()))?,
        (None, None) => None,
    };
    let host = args.url.host_str().unwrap_or_default();
    let from_netrc = netrc.and_then(|netrc| netrc.credentials_for(host));

    if let Some(credentials) = from_netrc {
        debug!(host, "using netrc credentials");
        return Ok(credentials);
    }

    warn!(host, "no client credentials found, requesting a token without them");
    Ok(ClientCredentials::new("", ""))
}
