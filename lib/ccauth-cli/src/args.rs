use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use ccauth_core::RequestStyle;
use reqwest::Method;
use url::Url;

pub const USAGE: &str = "\
Send an HTTP request authenticated with an OAuth2.0 client-credentials token.

Usage: ccauth [OPTIONS] [METHOD] <URL>

Options:
  -a, --auth <CLIENT_ID:CLIENT_SECRET>  client credentials (default: netrc entry of the URL host)
      --token-endpoint <URL>            OAuth 2.0 token endpoint URI
      --token-request-type <TYPE>       basic | form | json [default: basic]
      --scope <SCOPE>                   OAuth 2.0 scope
      --print-token-response            print the OAuth2 token response
      --netrc-file <PATH>               netrc file [default: $NETRC or ~/.netrc]
      --timeout <SECONDS>               timeout for the token and target requests
  -H, --header <NAME:VALUE>             extra header of the target request (repeatable)
  -v, --verbose                         debug logging
  -h, --help                            print this help
";

#[derive(Debug)]
pub struct AppArgs {
    pub method: Method,
    pub url: Url,
    pub auth: Option<(String, String)>,
    pub token_endpoint: String,
    pub token_request_type: RequestStyle,
    pub scope: Option<String>,
    pub print_token_response: bool,
    pub netrc_file: Option<PathBuf>,
    pub timeout: Option<Duration>,
    pub headers: Vec<(String, String)>,
    pub verbose: bool,
}

/// Either a request to run or a help request.
#[derive(Debug)]
pub enum Command {
    Run(Box<AppArgs>),
    Help,
}

impl AppArgs {
    pub fn parse() -> Result<Command> {
        Self::parse_from(std::env::args_os().skip(1).collect())
    }

    pub fn parse_from(args: Vec<OsString>) -> Result<Command> {
        let mut pargs = pico_args::Arguments::from_vec(args);

        if pargs.contains(["-h", "--help"]) {
            return Ok(Command::Help);
        }

        let auth = pargs
            .opt_value_from_fn(["-a", "--auth"], parse_auth)
            .context("parsing auth argument")?;

        let token_endpoint: Option<String> = pargs
            .opt_value_from_str("--token-endpoint")
            .context("parsing token-endpoint argument")?;

        let token_request_type = pargs
            .opt_value_from_str("--token-request-type")
            .context("parsing token-request-type argument")?;

        let scope = pargs
            .opt_value_from_str("--scope")
            .context("parsing scope argument")?;

        let print_token_response = pargs.contains("--print-token-response");

        let netrc_file = pargs
            .opt_value_from_os_str("--netrc-file", |value| {
                Ok::<_, std::convert::Infallible>(PathBuf::from(value))
            })
            .context("parsing netrc-file argument")?;

        let timeout = pargs
            .opt_value_from_fn("--timeout", parse_timeout)
            .context("parsing timeout argument")?;

        let headers = pargs
            .values_from_fn(["-H", "--header"], parse_header)
            .context("parsing header argument")?;

        let verbose = pargs.contains(["-v", "--verbose"]);

        let free = pargs
            .finish()
            .into_iter()
            .map(|arg| {
                arg.into_string()
                    .map_err(|arg| anyhow::anyhow!("invalid UTF-8 argument: {arg:?}"))
            })
            .collect::<Result<Vec<_>>>()?;
        if let Some(option) = free.iter().find(|arg| arg.starts_with('-')) {
            bail!("unknown option '{option}'\n\n{USAGE}");
        }
        let (method, url) = match free.as_slice() {
            [url] => (Method::GET, url),
            [method, url] => (
                Method::from_bytes(method.to_ascii_uppercase().as_bytes())
                    .with_context(|| format!("invalid method '{method}'"))?,
                url,
            ),
            [] => bail!("missing URL\n\n{USAGE}"),
            [_, _, unexpected, ..] => bail!("unexpected argument '{unexpected}'\n\n{USAGE}"),
        };
        let url = Url::parse(url).with_context(|| format!("invalid URL '{url}'"))?;

        let Some(token_endpoint) = token_endpoint else {
            bail!("--token-endpoint is required");
        };

        let result = Self {
            method,
            url,
            auth,
            token_endpoint,
            token_request_type: token_request_type.unwrap_or_default(),
            scope,
            print_token_response,
            netrc_file,
            timeout,
            headers,
            verbose,
        };
        Ok(Command::Run(Box::new(result)))
    }
}

/// `id:secret`, the secret being everything after the first colon.
fn parse_auth(value: &str) -> Result<(String, String)> {
    let (client_id, client_secret) = value.split_once(':').unwrap_or((value, ""));
    Ok((client_id.to_string(), client_secret.to_string()))
}

fn parse_timeout(value: &str) -> Result<Duration> {
    let seconds = value
        .parse::<f64>()
        .with_context(|| format!("invalid timeout '{value}'"))?;
    Duration::try_from_secs_f64(seconds).with_context(|| format!("invalid timeout '{value}'"))
}

fn parse_header(value: &str) -> Result<(String, String)> {
    let Some((name, header_value)) = value.split_once(':') else {
        bail!("invalid header '{value}', expected NAME:VALUE");
    };
    Ok((name.trim().to_string(), header_value.trim().to_string()))
}
