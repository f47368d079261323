//! Loopback redirect receiver for installed-app authorization.
//!
//! The consent page redirects the browser to `http://127.0.0.1:<port>/`
//! with `code` and `state` in the query string. [`LoopbackReceiver`]
//! accepts connections until one carries those parameters.

use std::net::Ipv4Addr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info};
use url::Url;

use crate::error::{Error, Result};

/// Upper bound on the request head we are willing to buffer.
const MAX_REQUEST_BYTES: usize = 8 * 1024;

const SUCCESS_PAGE: &str = "<html><body><h3>Authorization complete.</h3>\
    <p>You can close this window and return to the terminal.</p></body></html>";
const FAILURE_PAGE: &str = "<html><body><h3>Authorization failed.</h3>\
    <p>Check the terminal for details.</p></body></html>";

/// Query parameters of an authorization redirect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackParams {
    /// Authorization code.
    pub code: Option<String>,
    /// Echoed state value.
    pub state: Option<String>,
    /// Error code when the user or server refused.
    pub error: Option<String>,
    /// Error description.
    pub error_description: Option<String>,
}

impl CallbackParams {
    /// Parses a request target such as `/?code=...&state=...`.
    ///
    /// Returns `None` for requests that carry no authorization parameters
    /// (a browser fetching `/favicon.ico`, for instance).
    ///
    /// # Errors
    ///
    /// Returns an error if the target is not an origin-form path.
    pub fn parse(target: &str) -> Result<Option<Self>> {
        if !target.starts_with('/') {
            return Err(Error::InvalidRedirect(format!("unexpected target {target}")));
        }
        let url = Url::parse(&format!("http://127.0.0.1{target}"))?;

        let mut params = Self::default();
        for (key, value) in url.query_pairs() {
            let slot = match &*key {
                "code" => &mut params.code,
                "state" => &mut params.state,
                "error" => &mut params.error,
                "error_description" => &mut params.error_description,
                _ => continue,
            };
            *slot = Some(value.into_owned());
        }

        if params.code.is_none() && params.error.is_none() {
            return Ok(None);
        }
        Ok(Some(params))
    }

    /// Validates the redirect against the expected state and returns the code.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AccessDenied`] when the user declined, an OAuth
    /// error for other server errors, [`Error::StateMismatch`] when the
    /// state differs, or [`Error::InvalidRedirect`] when the code is missing.
    pub fn into_code(self, expected_state: &str) -> Result<String> {
        if let Some(error) = self.error {
            if error == "access_denied" {
                return Err(Error::AccessDenied);
            }
            return Err(Error::rejected(
                error,
                self.error_description.unwrap_or_default(),
            ));
        }
        if self.state.as_deref() != Some(expected_state) {
            return Err(Error::StateMismatch);
        }
        self.code
            .filter(|code| !code.is_empty())
            .ok_or_else(|| Error::InvalidRedirect("missing authorization code".into()))
    }
}

/// One-shot HTTP listener on the loopback interface.
#[derive(Debug)]
pub struct LoopbackReceiver {
    listener: TcpListener,
    port: u16,
}

impl LoopbackReceiver {
    /// Binds `127.0.0.1:port`; port 0 picks a free port.
    ///
    /// # Errors
    ///
    /// Returns an error if the port cannot be bound.
    pub async fn bind(port: u16) -> Result<Self> {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, port)).await?;
        let port = listener.local_addr()?.port();
        debug!("Loopback receiver listening on port {port}");
        Ok(Self { listener, port })
    }

    /// Port the receiver is bound to.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Redirect URI to register with the authorization request.
    #[must_use]
    pub fn redirect_uri(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Waits for the authorization redirect and returns the code.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] if no redirect arrives in time, or any
    /// error from [`CallbackParams::into_code`].
    pub async fn wait_for_code(self, expected_state: &str, timeout: Duration) -> Result<String> {
        tokio::time::timeout(timeout, self.accept_code(expected_state))
            .await
            .map_err(|_| Error::Timeout(timeout.as_secs()))?
    }

    async fn accept_code(&self, expected_state: &str) -> Result<String> {
        loop {
            let (mut stream, peer) = self.listener.accept().await?;
            let target = match read_request_target(&mut stream).await {
                Ok(target) => target,
                Err(e) => {
                    debug!("Ignoring malformed request from {peer}: {e}");
                    continue;
                }
            };

            let Ok(Some(params)) = CallbackParams::parse(&target) else {
                respond(&mut stream, "404 Not Found", "").await;
                continue;
            };

            let result = params.into_code(expected_state);
            match &result {
                Ok(_) => {
                    info!("Authorization redirect received");
                    respond(&mut stream, "200 OK", SUCCESS_PAGE).await;
                }
                Err(_) => respond(&mut stream, "400 Bad Request", FAILURE_PAGE).await,
            }
            return result;
        }
    }
}

/// Reads the request head and returns the request target.
async fn read_request_target(stream: &mut TcpStream) -> Result<String> {
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf.len() > MAX_REQUEST_BYTES {
            return Err(Error::InvalidRedirect("request head too large".into()));
        }
    }

    let head = String::from_utf8_lossy(&buf);
    let request_line = head.lines().next().unwrap_or_default();
    let mut parts = request_line.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("GET"), Some(target)) => Ok(target.to_string()),
        _ => Err(Error::InvalidRedirect(format!(
            "unexpected request line {request_line:?}"
        ))),
    }
}

async fn respond(stream: &mut TcpStream, status: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: text/html; charset=utf-8\r\n\
         Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    if let Err(e) = stream.write_all(response.as_bytes()).await {
        debug!("Failed to answer loopback request: {e}");
    }
    let _ = stream.shutdown().await;
}
