//! Interactive user consent
//!
//! The installed-application flow: a one-shot HTTP listener on the loopback
//! interface receives the authorization redirect, the user's browser is sent
//! to the authorization URL, and the returned code is exchanged for tokens.

use crate::error::{AuthError, Result};
use crate::oauth::OAuthFlowManager;
use crate::types::OAuthTokens;
use async_trait::async_trait;
use core_runtime::logging::redact_if_sensitive;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, instrument, warn};
use url::Url;

const MAX_REQUEST_HEAD: usize = 8 * 1024;

const SUCCESS_PAGE: &str = "<html><body><h3>The authentication flow has completed.</h3>\
<p>You may close this window.</p></body></html>";

const FAILURE_PAGE: &str = "<html><body><h3>Authorization was not granted.</h3>\
<p>You may close this window and return to the terminal.</p></body></html>";

/// Obtains a fresh token set from the user.
#[async_trait]
pub trait ConsentFlow: Send + Sync {
    async fn obtain_tokens(&self, oauth: &OAuthFlowManager) -> Result<OAuthTokens>;
}

/// Opens the authorization URL for the user.
pub trait BrowserLauncher: Send + Sync {
    fn launch(&self, url: &str) -> std::io::Result<()>;
}

/// Launches the platform default browser.
pub struct SystemBrowser;

impl BrowserLauncher for SystemBrowser {
    fn launch(&self, url: &str) -> std::io::Result<()> {
        open::that_detached(url)
    }
}

/// Prints the URL only; for headless hosts.
pub struct PrintOnly;

impl BrowserLauncher for PrintOnly {
    fn launch(&self, _url: &str) -> std::io::Result<()> {
        Ok(())
    }
}

/// Query parameters delivered to the redirect URI.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

impl CallbackParams {
    /// Parse the request target of the redirect (`/?code=...&state=...`).
    ///
    /// Returns `None` for requests that carry neither a code nor an error,
    /// such as the browser asking for `/favicon.ico`.
    pub fn from_request_target(target: &str) -> Option<Self> {
        let url = Url::parse("http://localhost").ok()?.join(target).ok()?;

        let mut params = CallbackParams::default();
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "code" => params.code = Some(value.into_owned()),
                "state" => params.state = Some(value.into_owned()),
                "error" => params.error = Some(value.into_owned()),
                _ => {}
            }
        }

        if params.code.is_some() || params.error.is_some() {
            Some(params)
        } else {
            None
        }
    }
}

/// Consent via a loopback redirect listener.
///
/// # Example
///
/// ```no_run
/// use core_auth::consent::{ConsentFlow, LoopbackConsentFlow};
/// use std::time::Duration;
///
/// # async fn example(oauth: &core_auth::OAuthFlowManager) -> core_auth::Result<()> {
/// let flow = LoopbackConsentFlow::new(Duration::from_secs(300));
/// let tokens = flow.obtain_tokens(oauth).await?;
/// # Ok(())
/// # }
/// ```
pub struct LoopbackConsentFlow {
    timeout: Duration,
    bind_addr: IpAddr,
    launcher: Arc<dyn BrowserLauncher>,
}

impl LoopbackConsentFlow {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            bind_addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
            launcher: Arc::new(SystemBrowser),
        }
    }

    pub fn with_launcher(mut self, launcher: Arc<dyn BrowserLauncher>) -> Self {
        self.launcher = launcher;
        self
    }

    pub fn with_bind_addr(mut self, addr: IpAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    async fn wait_for_callback(&self, listener: &TcpListener) -> Result<CallbackParams> {
        loop {
            let (mut stream, peer) = listener
                .accept()
                .await
                .map_err(|e| AuthError::ConsentFailed(format!("Listener failed: {}", e)))?;
            debug!(%peer, "Accepted redirect connection");

            let target = match read_request_target(&mut stream).await {
                Ok(target) => target,
                Err(e) => {
                    debug!(error = %e, "Ignoring malformed redirect request");
                    continue;
                }
            };

            match CallbackParams::from_request_target(&target) {
                Some(params) => {
                    let page = if params.error.is_some() {
                        FAILURE_PAGE
                    } else {
                        SUCCESS_PAGE
                    };
                    if let Err(e) = write_response(&mut stream, "200 OK", page).await {
                        warn!(error = %e, "Failed to answer the browser");
                    }
                    return Ok(params);
                }
                None => {
                    let _ = write_response(&mut stream, "404 Not Found", "").await;
                }
            }
        }
    }
}

#[async_trait]
impl ConsentFlow for LoopbackConsentFlow {
    #[instrument(skip(self, oauth), fields(timeout_secs = self.timeout.as_secs()))]
    async fn obtain_tokens(&self, oauth: &OAuthFlowManager) -> Result<OAuthTokens> {
        let listener = TcpListener::bind((self.bind_addr, 0))
            .await
            .map_err(|e| AuthError::ConsentFailed(format!("Cannot bind redirect listener: {}", e)))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| AuthError::ConsentFailed(e.to_string()))?;
        let redirect_uri = format!("http://{}/", local_addr);

        let (auth_url, verifier) = oauth.build_auth_url(&redirect_uri)?;

        eprintln!(
            "Please visit this URL to authorize this application:\n{}\n",
            auth_url
        );
        if let Err(e) = self.launcher.launch(&auth_url) {
            warn!(error = %e, "Could not open a browser; open the URL manually");
        }
        info!(port = local_addr.port(), "Waiting for authorization redirect");

        let params = tokio::time::timeout(self.timeout, self.wait_for_callback(&listener))
            .await
            .map_err(|_| AuthError::ConsentTimedOut {
                waited_secs: self.timeout.as_secs(),
            })??;

        if let Some(error) = params.error {
            warn!(%error, "Authorization server returned an error");
            return Err(AuthError::ConsentDenied(error));
        }

        let code = params
            .code
            .ok_or_else(|| AuthError::ConsentFailed("Redirect carried no code".to_string()))?;
        let state = params.state.unwrap_or_default();
        debug!(code = %redact_if_sensitive("code", &code), "Received authorization code");

        oauth
            .exchange_code(&code, &state, &verifier, &redirect_uri)
            .await
    }
}

/// Read the request line and headers, returning the request target.
async fn read_request_target(stream: &mut TcpStream) -> std::io::Result<String> {
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];

    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf.len() > MAX_REQUEST_HEAD {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "request head too large",
            ));
        }
    }

    let head = String::from_utf8_lossy(&buf);
    let request_line = head.lines().next().unwrap_or_default();
    let mut parts = request_line.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("GET"), Some(target)) => Ok(target.to_string()),
        _ => Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "expected a GET request",
        )),
    }
}

async fn write_response(stream: &mut TcpStream, status: &str, body: &str) -> std::io::Result<()> {
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}
