//! Modem session client
//!
//! Handles the token-protected form login against the modem's embedded web
//! interface and authenticated retrieval of the DOCSIS status page. The
//! session cookie handed out on login lives in the client's cookie store and
//! rides along on every subsequent request; the session itself is never
//! explicitly destroyed.

use std::sync::LazyLock;

use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, warn};
use url::Url;

use crate::config::ModemConfig;
use crate::decoder::StatusPage;
use crate::errors::{AppError, AppResult, AuthError, ScrapeError};
use crate::models::LoginToken;

const LOGIN_PAGE_PATH: &str = "/GenieLogin.asp";
const LOGIN_SUBMIT_PATH: &str = "/goform/GenieLogin";
const STATUS_PAGE_PATH: &str = "/DocsisStatus.asp";

/// Fixed login-intent flag the firmware expects in the form post
const LOGIN_INTENT: &str = "1";

static WEB_TOKEN_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"input[name="webToken"]"#).expect("valid selector"));

/// HTTP client for one modem, with session cookie retention
pub struct ModemClient {
    http: Client,
    username: String,
    password: String,
    login_page_url: Url,
    login_submit_url: Url,
    status_page_url: Url,
}

impl ModemClient {
    /// Build a client for the configured modem
    ///
    /// The cookie store replaces the cookie jar the firmware's session
    /// handling depends on; connect and request timeouts bound how long a
    /// single poll cycle can hang on an unresponsive modem.
    pub fn new(config: &ModemConfig) -> AppResult<Self> {
        let base = Url::parse(&config.url).map_err(|e| {
            AppError::configuration(format!("Invalid modem url '{}': {e}", config.url))
        })?;

        let join = |path: &str| {
            base.join(path)
                .map_err(|e| AppError::configuration(format!("Invalid modem path '{path}': {e}")))
        };
        let login_page_url = join(LOGIN_PAGE_PATH)?;
        let login_submit_url = join(LOGIN_SUBMIT_PATH)?;
        let status_page_url = join(STATUS_PAGE_PATH)?;

        let http = Client::builder()
            .cookie_store(true)
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            username: config.username.clone(),
            password: config.password.clone(),
            login_page_url,
            login_submit_url,
            status_page_url,
        })
    }

    /// Fetch the single-use anti-forgery token from the login page
    ///
    /// An absent token field is not fatal by itself; the modem will simply
    /// reject the login, which post-login verification surfaces.
    pub async fn fetch_login_token(&self) -> Result<LoginToken, AuthError> {
        debug!("Fetching login token from {}", self.login_page_url);
        let response = self.http.get(self.login_page_url.clone()).send().await?;
        let body = response.text().await?;

        let token = parse_login_token(&body);
        if token.is_empty() {
            warn!("Login page has no webToken field; login will likely be rejected");
        }
        Ok(token)
    }

    /// Perform the form login and verify the session actually authenticated
    ///
    /// The modem answers a rejected login with HTTP 200, so success is
    /// verified by fetching the status page and checking for its
    /// authenticated table marker.
    pub async fn login(&self) -> Result<(), AuthError> {
        let token = self.fetch_login_token().await?;

        debug!("Posting login form to {}", self.login_submit_url);
        let form = [
            ("webToken", token.as_str()),
            ("loginUsername", self.username.as_str()),
            ("loginPassword", self.password.as_str()),
            ("login", LOGIN_INTENT),
        ];
        let response = self
            .http
            .post(self.login_submit_url.clone())
            .form(&form)
            .send()
            .await?;
        // Body content carries no success signal; drain it for the cookie.
        response.text().await?;

        match self.fetch_status_page().await {
            Ok(_) => Ok(()),
            Err(ScrapeError::SessionExpired) => Err(AuthError::rejected(
                "status page is missing authenticated content after login",
            )),
            Err(ScrapeError::Network(e)) => Err(AuthError::Network(e)),
            Err(ScrapeError::Parse { message }) => Err(AuthError::rejected(format!(
                "unusable status page after login: {message}"
            ))),
        }
    }

    /// Authenticated fetch of the DOCSIS status page
    pub async fn fetch_status_page(&self) -> Result<StatusPage, ScrapeError> {
        debug!("Fetching status page from {}", self.status_page_url);
        let response = self.http.get(self.status_page_url.clone()).send().await?;
        let body = response.text().await?;

        let page = StatusPage::parse(&body)?;
        if !page.is_authenticated() {
            return Err(ScrapeError::SessionExpired);
        }
        Ok(page)
    }
}

/// Extract the value of the hidden `webToken` input
fn parse_login_token(body: &str) -> LoginToken {
    let document = Html::parse_document(body);
    document
        .select(&WEB_TOKEN_SELECTOR)
        .next()
        .and_then(|input| input.value().attr("value"))
        .map(LoginToken::new)
        .unwrap_or_else(LoginToken::empty)
}
