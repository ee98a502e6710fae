//! Diagnostic emission of the token endpoint answers (`--print-token-response`).
//!
//! Observers only see the answers; they cannot influence the derived header.

use std::io::{self, Write};

use http::StatusCode;
use serde_json::Value;
use tracing::warn;

const FRAME: &str = "==========";

/// Receives the token endpoint answers when printing is enabled.
pub trait TokenResponseObserver: Send + Sync {
    /// Called with the decoded JSON body of a successful token response.
    fn on_token_response(&self, response: &Value);

    /// Called with the status and raw body of a rejected token request.
    fn on_error_response(&self, status: StatusCode, body: &[u8]);
}

/// Writes successful responses to stdout and rejections to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleObserver;

impl TokenResponseObserver for ConsoleObserver {
    fn on_token_response(&self, response: &Value) {
        let text = format_token_response(response);
        if let Err(error) = io::stdout().lock().write_all(text.as_bytes()) {
            warn!(%error, "fail to print the token response");
        }
    }

    fn on_error_response(&self, status: StatusCode, body: &[u8]) {
        let text = format_error_response(status, body);
        if let Err(error) = io::stderr().lock().write_all(text.as_bytes()) {
            warn!(%error, "fail to print the token error response");
        }
    }
}

/// Formats a successful token response.
pub fn format_token_response(response: &Value) -> String {
    format!(
        "token_response: \n{FRAME} \n{}\n{FRAME}\n",
        pretty(response)
    )
}

/// Formats a rejected token request, pretty-printing the body when it is JSON.
pub fn format_error_response(status: StatusCode, body: &[u8]) -> String {
    let mut text = format!("oauth2 error response:\nstatus={}\n", status.as_u16());
    match serde_json::from_slice::<Value>(body) {
        Ok(json) => {
            text.push_str(&format!(
                "token_error_response: \n{FRAME} \n{}\n{FRAME}\n",
                pretty(&json)
            ));
        }
        Err(_) => {
            text.push_str(&format!(
                "error_response: \n{FRAME} \n{}\n{FRAME}\n",
                String::from_utf8_lossy(body)
            ));
        }
    }
    text
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
