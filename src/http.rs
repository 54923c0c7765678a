//! HTTP client for the SkiFinder API.
//!
//! This module provides:
//! - Typed endpoints for resorts, POIs, lifts, route search and accounts
//! - One fixed JSON envelope per list endpoint (`{"resorts": [...]}`, `{"route": [...]}`, ...)
//! - Bearer authentication from a pluggable [`TokenStore`]
//! - Single-flight token refresh: a 401 triggers one refresh shared by every request that
//!   fails while it is in flight, then the original request is retried once

use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use futures::future::{BoxFuture, FutureExt};
use log::{debug, info, warn};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use crate::auth::{Credentials, LoginResponse, RefreshRequest, Session, SignupResponse};
use crate::{ApiConfig, Lift, Poi, Resort, RouteRequest, RouteStep};

const MAX_IDLE_CONNECTIONS: usize = 8;

/// Errors returned by [`ApiClient`].
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{message} (HTTP {status})")]
    Api { status: u16, message: String },
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("not authenticated")]
    Unauthorized,
    #[error("failed to create HTTP client: {0}")]
    Client(String),
}

// ============================================================================
// Token storage
// ============================================================================

/// Persistent storage for the session tokens (keychain, keystore, ...).
pub trait TokenStore: Send + Sync {
    fn access_token(&self) -> Option<String>;
    fn refresh_token(&self) -> Option<String>;
    fn store(&self, access_token: &str, refresh_token: &str);
    fn clear(&self);
}

#[derive(Debug, Default)]
struct Tokens {
    access: Option<String>,
    refresh: Option<String>,
}

/// In-process token store, lost on restart.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: RwLock<Tokens>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn access_token(&self) -> Option<String> {
        self.tokens.read().unwrap_or_else(|e| e.into_inner()).access.clone()
    }

    fn refresh_token(&self) -> Option<String> {
        self.tokens.read().unwrap_or_else(|e| e.into_inner()).refresh.clone()
    }

    fn store(&self, access_token: &str, refresh_token: &str) {
        let mut tokens = self.tokens.write().unwrap_or_else(|e| e.into_inner());
        tokens.access = Some(access_token.to_string());
        tokens.refresh = Some(refresh_token.to_string());
    }

    fn clear(&self) {
        *self.tokens.write().unwrap_or_else(|e| e.into_inner()) = Tokens::default();
    }
}

// ============================================================================
// Refresh coordination
// ============================================================================

/// Actor owning the in-flight token refresh.
///
/// Callers send a reply channel. The actor runs one refresh for the first waiting caller,
/// then answers it and every caller that queued up meanwhile with the same outcome.
pub struct RefreshCoordinator {
    requests: mpsc::UnboundedSender<oneshot::Sender<Option<String>>>,
}

impl RefreshCoordinator {
    /// Spawn the actor on the current Tokio runtime.
    ///
    /// `refresh` performs one refresh and yields the new access token on success.
    pub fn spawn<F>(refresh: F) -> Self
    where
        F: Fn() -> BoxFuture<'static, Option<String>> + Send + Sync + 'static,
    {
        let (requests, mut pending) = mpsc::unbounded_channel::<oneshot::Sender<Option<String>>>();

        tokio::spawn(async move {
            while let Some(first) = pending.recv().await {
                let mut waiters = vec![first];
                let outcome = refresh().await;

                while let Ok(waiter) = pending.try_recv() {
                    waiters.push(waiter);
                }

                debug!(
                    "[RefreshCoordinator] refresh {} for {} waiters",
                    if outcome.is_some() { "succeeded" } else { "failed" },
                    waiters.len()
                );

                for waiter in waiters {
                    let _ = waiter.send(outcome.clone());
                }
            }
        });

        Self { requests }
    }

    /// Wait for a refreshed access token; `None` if the refresh failed.
    pub async fn refresh(&self) -> Option<String> {
        let (reply, outcome) = oneshot::channel();
        if self.requests.send(reply).is_err() {
            return None;
        }
        outcome.await.ok().flatten()
    }
}

// ============================================================================
// Response envelopes
// ============================================================================

#[derive(Debug, Deserialize)]
struct ResortsEnvelope {
    resorts: Vec<Resort>,
}

#[derive(Debug, Deserialize)]
struct PoisEnvelope {
    pois: Vec<Poi>,
}

#[derive(Debug, Deserialize)]
struct LiftsEnvelope {
    lifts: Vec<Lift>,
}

#[derive(Debug, Deserialize)]
struct RouteEnvelope {
    route: Vec<RouteStep>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Build an [`ApiError::Api`] from an error body, falling back to `fallback` when the
/// server sent no message.
fn api_error(status: StatusCode, body: &[u8], fallback: &str) -> ApiError {
    let message = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| fallback.to_string());
    ApiError::Api { status: status.as_u16(), message }
}

// ============================================================================
// Client
// ============================================================================

/// Client for the SkiFinder API.
pub struct ApiClient {
    client: Client,
    config: ApiConfig,
    tokens: Arc<dyn TokenStore>,
    refresher: RefreshCoordinator,
}

impl ApiClient {
    /// Create a client. Must be called from within a Tokio runtime.
    pub fn new(config: ApiConfig, tokens: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .pool_max_idle_per_host(MAX_IDLE_CONNECTIONS)
            .pool_idle_timeout(Duration::from_secs(60))
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Client(e.to_string()))?;

        let refresher = {
            let client = client.clone();
            let config = config.clone();
            let tokens = Arc::clone(&tokens);
            RefreshCoordinator::spawn(move || {
                let client = client.clone();
                let config = config.clone();
                let tokens = Arc::clone(&tokens);
                async move {
                    match refresh_session(&client, &config, tokens.as_ref()).await {
                        Ok(session) => Some(session.access_token),
                        Err(e) => {
                            warn!("[ApiClient] Token refresh failed: {}", e);
                            None
                        }
                    }
                }
                .boxed()
            })
        };

        info!("[ApiClient] Using {}", config.base_url);

        Ok(Self { client, config, tokens, refresher })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// True when an access token is stored.
    pub fn is_authenticated(&self) -> bool {
        self.tokens.access_token().is_some()
    }

    /// `GET /resorts`
    pub async fn fetch_resorts(&self) -> Result<Vec<Resort>, ApiError> {
        let envelope: ResortsEnvelope = self
            .send(Method::GET, "/resorts", None, "Failed to fetch resorts")
            .await?;
        Ok(envelope.resorts)
    }

    /// `GET /resorts/{id}/pois`
    pub async fn fetch_resort_pois(&self, resort_id: i64) -> Result<Vec<Poi>, ApiError> {
        let path = format!("/resorts/{}/pois", resort_id);
        let envelope: PoisEnvelope = self
            .send(Method::GET, &path, None, "Failed to fetch POIs")
            .await?;
        Ok(envelope.pois)
    }

    /// `GET /resorts/{id}/lifts`
    pub async fn fetch_resort_lifts(&self, resort_id: i64) -> Result<Vec<Lift>, ApiError> {
        let path = format!("/resorts/{}/lifts", resort_id);
        let envelope: LiftsEnvelope = self
            .send(Method::GET, &path, None, "Failed to fetch lifts")
            .await?;
        Ok(envelope.lifts)
    }

    /// `POST /route`: the raw path between two points.
    pub async fn find_route(&self, request: &RouteRequest) -> Result<Vec<RouteStep>, ApiError> {
        let body = serde_json::to_value(request)?;
        let envelope: RouteEnvelope = self
            .send(Method::POST, "/route", Some(body), "Failed to find route")
            .await?;
        info!(
            "[ApiClient] Route {} -> {}: {} segments",
            request.start_point_id,
            request.end_point_id,
            envelope.route.len()
        );
        Ok(envelope.route)
    }

    /// `POST /login`; stores the issued tokens.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        let body = serde_json::to_value(credentials)?;
        let response: LoginResponse = self
            .send(Method::POST, "/login", Some(body), "Login failed")
            .await?;
        self.tokens
            .store(&response.session.access_token, &response.session.refresh_token);
        Ok(response)
    }

    /// `POST /signup`
    pub async fn signup(&self, credentials: &Credentials) -> Result<SignupResponse, ApiError> {
        let body = serde_json::to_value(credentials)?;
        self.send(Method::POST, "/signup", Some(body), "Signup failed").await
    }

    /// Refresh the session now, outside the 401 path.
    pub async fn refresh_token(&self) -> Result<Session, ApiError> {
        refresh_session(&self.client, &self.config, self.tokens.as_ref()).await
    }

    /// Forget the stored session.
    pub fn logout(&self) {
        self.tokens.clear();
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
        fallback: &str,
    ) -> Result<T, ApiError> {
        let url = self.config.url(path);
        let mut retried = false;

        loop {
            let token = self.tokens.access_token();
            let mut request = self.client.request(method.clone(), &url);
            if let Some(token) = &token {
                request = request.bearer_auth(token);
            }
            if let Some(body) = &body {
                request = request.json(body);
            }

            let start = Instant::now();
            let response = request.send().await?;
            let status = response.status();

            if self.config.enable_logging {
                info!("[ApiClient] {} {} -> {} in {:?}", method, path, status, start.elapsed());
            } else {
                debug!("[ApiClient] {} {} -> {}", method, path, status);
            }

            if status == StatusCode::UNAUTHORIZED && token.is_some() {
                if retried {
                    return Err(ApiError::Unauthorized);
                }
                retried = true;

                warn!("[ApiClient] 401 from {} - attempting token refresh", path);
                if self.refresher.refresh().await.is_some() {
                    info!("[ApiClient] Token refreshed, retrying {}", path);
                    continue;
                }

                self.tokens.clear();
                return Err(ApiError::Unauthorized);
            }

            let bytes = response.bytes().await?;
            if !status.is_success() {
                return Err(api_error(status, &bytes, fallback));
            }
            return Ok(serde_json::from_slice(&bytes)?);
        }
    }
}

/// `POST /refresh` with the stored refresh token; stores the new pair on success.
///
/// A rejected refresh token (401/403) clears the store.
async fn refresh_session(
    client: &Client,
    config: &ApiConfig,
    tokens: &dyn TokenStore,
) -> Result<Session, ApiError> {
    let Some(refresh_token) = tokens.refresh_token() else {
        debug!("[ApiClient] No refresh token available");
        return Err(ApiError::Unauthorized);
    };

    let response = client
        .post(config.url("/refresh"))
        .json(&RefreshRequest { refresh_token })
        .send()
        .await?;
    let status = response.status();
    let bytes = response.bytes().await?;

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        warn!("[ApiClient] Refresh token rejected ({}) - clearing session", status);
        tokens.clear();
        return Err(ApiError::Unauthorized);
    }
    if !status.is_success() {
        return Err(api_error(status, &bytes, "Failed to refresh session"));
    }

    let response: LoginResponse = serde_json::from_slice(&bytes)?;
    tokens.store(&response.session.access_token, &response.session.refresh_token);
    info!("[ApiClient] Session refreshed");
    Ok(response.session)
}
