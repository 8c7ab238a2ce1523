use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use url::Url;

use super::error::ApiError;
use super::transport::Transport;

const API_PREFIX: &str = "/api/v1";
const TOKEN_PATH: &str = "/realms/xr-cm/protocol/openid-connect/token";
const CLIENT_ID: &str = "xr-web-client";

/// Connection settings for the API client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub host: String,
    pub username: String,
    pub password: String,
    pub insecure: bool,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_idle_connections: usize,
}

impl ClientConfig {
    pub fn new(host: &str, username: &str, password: &str) -> Self {
        Self {
            host: host.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            insecure: false,
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(90),
            max_idle_connections: 10,
        }
    }

    pub fn insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// IPM API client
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    host: String,
    base_url: String,
    username: String,
    password: String,
    token: RwLock<Option<String>>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let host = config.host.trim_end_matches('/').to_string();
        let parsed =
            Url::parse(&host).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", config.host, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidUrl(format!(
                "{}: scheme must be http or https",
                config.host
            )));
        }

        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(config.insecure)
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.idle_timeout)
            .pool_max_idle_per_host(config.max_idle_connections)
            .build()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                base_url: format!("{}{}", host, API_PREFIX),
                host,
                username: config.username,
                password: config.password,
                token: RwLock::new(None),
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    async fn token(&self, refresh: bool) -> Result<String, ApiError> {
        if !refresh {
            if let Some(token) = self.inner.token.read().await.as_ref() {
                return Ok(token.clone());
            }
        }

        let url = format!("{}{}", self.inner.host, TOKEN_PATH);
        tracing::debug!("Requesting access token from: {}", url);

        let response = self
            .inner
            .http
            .post(&url)
            .form(&[
                ("grant_type", "password"),
                ("client_id", CLIENT_ID),
                ("username", self.inner.username.as_str()),
                ("password", self.inner.password.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!("Token request rejected with {}: {}", status, text);
            return Err(ApiError::Authentication(format!("status: {}, {}", status.as_u16(), text)));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Parse(format!("token response: {}", e)))?;

        *self.inner.token.write().await = Some(token.access_token.clone());
        Ok(token.access_token)
    }

    async fn send(
        &self,
        method: &Method,
        path: &str,
        body: Option<&[u8]>,
        token: &str,
    ) -> Result<reqwest::Response, ApiError> {
        let url = format!("{}{}", self.inner.base_url, path);
        tracing::debug!("{} request to: {}", method, url);

        let mut request = self
            .inner
            .http
            .request(method.clone(), &url)
            .bearer_auth(token)
            .header(ACCEPT, "application/json");
        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, "application/json")
                .body(body.to_vec());
        }

        Ok(request.send().await?)
    }
}

#[async_trait]
impl Transport for Client {
    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Vec<u8>, ApiError> {
        let token = self.token(false).await?;
        let mut response = self.send(&method, path, body.as_deref(), &token).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::debug!("Access token rejected, requesting a new one");
            let token = self.token(true).await?;
            response = self.send(&method, path, body.as_deref(), &token).await?;
        }

        let status = response.status();
        tracing::debug!("Response status: {}", status);

        let bytes = response.bytes().await?;
        if status.is_success() {
            return Ok(bytes.to_vec());
        }

        let message = String::from_utf8_lossy(&bytes).into_owned();
        tracing::error!("API error response: {}", message);
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }
}
