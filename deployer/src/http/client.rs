//! Authenticated HTTP session against the platform

use std::time::Duration;

use reqwest::{header, Client, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{debug, info, warn};
use url::Url;

use crate::errors::DeployError;

/// Default per-request timeout. Package imports can be large.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Endpoint roots derived from the instance URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Contract-based REST root, used for auth
    pub base_url: String,

    /// Customization API root
    pub customization_url: String,
}

impl Endpoints {
    /// Derive the endpoint roots from an instance URL such as `https://erp.example.com/Site`
    pub fn from_instance_url(instance_url: &str) -> Result<Self, DeployError> {
        let parsed = Url::parse(instance_url)
            .map_err(|e| DeployError::ConfigError(format!("Invalid instance URL {instance_url}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(DeployError::ConfigError(format!(
                "Unsupported instance URL scheme: {}",
                parsed.scheme()
            )));
        }

        let root = instance_url.trim_end_matches('/');
        Ok(Self {
            base_url: format!("{root}/entity"),
            customization_url: format!("{root}/CustomizationApi"),
        })
    }
}

/// Login credentials
#[derive(Debug)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NotAuthenticated,
    Authenticated,
    Closed,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    name: &'a str,
    password: &'a str,
}

/// One cookie-backed session with the platform
///
/// The transport is created eagerly and released by [`SessionClient::logout`],
/// which is the only way a session reaches [`SessionState::Closed`].
pub struct SessionClient {
    client: Option<Client>,
    endpoints: Endpoints,
    credentials: Credentials,
    state: SessionState,
}

impl SessionClient {
    /// Create a new, unauthenticated session
    pub fn new(
        endpoints: Endpoints,
        credentials: Credentials,
        request_timeout: Duration,
    ) -> Result<Self, DeployError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .cookie_store(true)
            .default_headers(headers)
            .timeout(request_timeout)
            .build()?;

        Ok(Self {
            client: Some(client),
            endpoints,
            credentials,
            state: SessionState::NotAuthenticated,
        })
    }

    /// Get the session state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Authenticate and keep the session cookies
    pub async fn login(&mut self) -> Result<(), DeployError> {
        info!("Authenticating as {}...", self.credentials.username);

        let url = format!("{}/auth/login", self.endpoints.base_url);
        let body = LoginRequest {
            name: &self.credentials.username,
            password: self.credentials.password.expose_secret(),
        };

        let response = self
            .transport()?
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| DeployError::AuthError(e.to_string()))?;
        check_status(response, "Login")
            .await
            .map_err(DeployError::AuthError)?;

        self.state = SessionState::Authenticated;
        info!("Authentication successful");
        Ok(())
    }

    /// End the session and release the transport
    ///
    /// Never fails: problems are logged as warnings. Calling it again, or on
    /// a session that never authenticated, does not send anything.
    pub async fn logout(&mut self) {
        let client = self.client.take();
        let was_authenticated = self.state == SessionState::Authenticated;
        self.state = SessionState::Closed;

        let Some(client) = client else {
            debug!("Session already closed");
            return;
        };
        if !was_authenticated {
            debug!("Session was never authenticated, releasing transport");
            return;
        }

        info!("Logging out...");
        let url = format!("{}/auth/logout", self.endpoints.base_url);
        match client.post(&url).send().await {
            Ok(response) => match check_status(response, "Logout").await {
                Ok(_) => info!("Logout successful"),
                Err(e) => warn!("Logout encountered an issue: {}", e),
            },
            Err(e) => warn!("Logout encountered an issue: {}", e),
        }
    }

    /// POST a JSON body to a customization endpoint
    pub(crate) async fn post_customization<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<Response, String> {
        let url = format!("{}/{}", self.endpoints.customization_url, endpoint);
        debug!("POST {}", url);

        let client = self.transport().map_err(|e| e.to_string())?;
        let response = client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        check_status(response, endpoint).await
    }

    fn transport(&self) -> Result<&Client, DeployError> {
        match (&self.client, self.state) {
            (Some(client), state) if state != SessionState::Closed => Ok(client),
            _ => Err(DeployError::SessionClosed),
        }
    }
}

/// Turn a non-2xx response into an error message carrying the status and body
async fn check_status(response: Response, what: &str) -> Result<Response, String> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    debug!("{} failed: {} - {}", what, status, body);
    if body.is_empty() {
        Err(status.to_string())
    } else {
        Err(format!("{}: {}", status, body))
    }
}
