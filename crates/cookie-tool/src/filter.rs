//! Line-oriented command loop.
//!
//! Each input line is one command:
//!
//! ```text
//! seal <cookie>                      → the cookie with its username encrypted
//! open [--scheme=<scheme>] <cookie>  → the parsed cookie as a JSON object
//! ```
//!
//! Everything after the verb (and the optional flag) is the cookie, spaces
//! included, so usernames such as `john doe` go through unchanged.
//!
//! Every failure is answered with a JSON [`ErrorResponse`] line; the loop only
//! stops at EOF or on an I/O error.

use std::str::FromStr;

use anyhow::Result;
use common::{protocol::ErrorResponse, AuthScheme};
use cookie_crypt::{CookieHooks, CookieIssue};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, warn};

const SCHEME_FLAG: &str = "--scheme=";

/// A parsed input line.
#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Seal { cookie: &'a str },
    Open { cookie: &'a str, scheme: AuthScheme },
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Result<Self, ErrorResponse> {
        let (verb, rest) = line
            .trim_start()
            .split_once(char::is_whitespace)
            .filter(|(_, rest)| !rest.is_empty())
            .ok_or_else(|| ErrorResponse::new("bad_request", "missing cookie argument"))?;
        match verb {
            "seal" => Ok(Self::Seal { cookie: rest }),
            "open" => {
                let (scheme, cookie) = match rest.strip_prefix(SCHEME_FLAG) {
                    Some(flagged) => {
                        let (name, cookie) = flagged.split_once(char::is_whitespace).ok_or_else(
                            || ErrorResponse::new("bad_request", "missing cookie argument"),
                        )?;
                        let scheme = AuthScheme::from_str(name)
                            .map_err(|e| ErrorResponse::new("bad_request", e.to_string()))?;
                        (scheme, cookie)
                    }
                    None => (AuthScheme::Auth, rest),
                };
                Ok(Self::Open { cookie, scheme })
            }
            other => Err(ErrorResponse::new(
                "bad_request",
                format!("unknown command: {other}"),
            )),
        }
    }
}

/// Read commands from `reader` until EOF, writing one response line each to `writer`.
///
/// # Errors
///
/// Returns an error if reading or writing fails.
pub async fn run<R, W>(hooks: &CookieHooks, reader: R, mut writer: W) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    let mut served = 0u64;
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = handle_line(hooks, &line)?;
        writer.write_all(response.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
        served += 1;
    }
    debug!(served, "input closed");
    Ok(())
}

/// Produce the response line for one command.
fn handle_line(hooks: &CookieHooks, line: &str) -> Result<String> {
    let command = match Command::parse(line) {
        Ok(c) => c,
        Err(e) => return Ok(serde_json::to_string(&e)?),
    };

    match command {
        Command::Seal { cookie } => {
            let issue = CookieIssue {
                cookie,
                user_id: 0,
                scheme: AuthScheme::Auth,
            };
            match hooks.encrypt_auth_cookie(issue) {
                Ok(sealed) => Ok(sealed),
                Err(e) => {
                    warn!(error = %e, "seal refused");
                    Ok(serde_json::to_string(&ErrorResponse::new(
                        "encryption_failure",
                        e.to_string(),
                    ))?)
                }
            }
        }
        Command::Open { cookie, scheme } => match hooks.parse_auth_cookie(cookie, scheme) {
            Some(parsed) => Ok(serde_json::to_string(&parsed)?),
            None => Ok(serde_json::to_string(&ErrorResponse::new(
                "invalid_cookie",
                "cookie could not be parsed",
            ))?),
        },
    }
}
