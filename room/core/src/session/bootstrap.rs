//! Session Bootstrap
//!
//! Resolves the access token and fetches the signed-in user when a room is
//! opened, then publishes the user on a `watch` channel.
//!
//! # Flow
//!
//! ```text
//!   room URL ──has token param?──yes──▶ save token ─────────────┐
//!        │                                                      │
//!        no                                                     ▼
//!        └──▶ cookie exchange ──ok──▶ save token ──▶ GET /<type>/me ──ok──▶ publish user
//!                   │                                    ▲          │
//!                   err: redirect to web app,            │          err: stay unresolved
//!                   fall back to stored token ───────────┘
//! ```
//!
//! The user is published "eventually, or never": a failed fetch leaves the
//! channel at `None` and nothing else in the room depends on it.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Url;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::client::{ApiClient, ApiError};
use super::credential::{token_from_url, AccessToken, CredentialError, CredentialSource, TokenStore};
use super::user::{CurrentUser, UserType};
use crate::config::RoomConfig;

/// Errors building the session stack
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// API client could not be created
    #[error("failed to create API client: {0}")]
    Client(#[from] ApiError),

    /// Credential storage failed
    #[error(transparent)]
    Credential(#[from] CredentialError),
}

/// Calls the bootstrap needs from the API
///
/// Split out so the bootstrap flow can run against a mock.
#[async_trait]
pub trait SessionApi: Send + Sync {
    /// Exchange the web app's session cookie for an access token
    async fn exchange_cookie(&self) -> Result<AccessToken, CredentialError>;

    /// Fetch the signed-in user of the given type
    async fn fetch_current_user(&self, user_type: UserType) -> Result<CurrentUser, ApiError>;
}

/// [`SessionApi`] over HTTP
pub struct HttpSessionApi {
    client: ApiClient,
    set_cookie_url: String,
    cookie_name: String,
}

impl HttpSessionApi {
    /// Create from an API client and configuration
    #[must_use]
    pub fn new(client: ApiClient, config: &RoomConfig) -> Self {
        Self {
            client,
            set_cookie_url: config.set_cookie_url.clone(),
            cookie_name: config.token_cookie_name.clone(),
        }
    }

    /// Underlying API client
    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}

#[async_trait]
impl SessionApi for HttpSessionApi {
    async fn exchange_cookie(&self) -> Result<AccessToken, CredentialError> {
        self.client
            .exchange_cookie(&self.set_cookie_url, &self.cookie_name)
            .await
    }

    async fn fetch_current_user(&self, user_type: UserType) -> Result<CurrentUser, ApiError> {
        let path = user_type.me_path();
        let body: serde_json::Value = self.client.get_json(path).await?;
        CurrentUser::from_json(user_type, body).map_err(|e| ApiError::Decode {
            url: self.client.url(path),
            reason: e.to_string(),
        })
    }
}

/// What a bootstrap run ended with
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BootstrapOutcome {
    /// Where the token came from (`None` = no token at all)
    pub credential: Option<CredentialSource>,
    /// Web app URL to send the user back to after a failed exchange
    pub redirect_to: Option<String>,
    /// The signed-in user, if the fetch succeeded
    pub user: Option<CurrentUser>,
}

/// Resolves the credential and the current user for one room
pub struct SessionBootstrap<A: SessionApi> {
    api: Arc<A>,
    tokens: Arc<TokenStore>,
    user_type: UserType,
    token_query_param: String,
    next_app_url: String,
    user_tx: watch::Sender<Option<CurrentUser>>,
}

impl<A: SessionApi + 'static> SessionBootstrap<A> {
    /// Create a bootstrap for the given user type
    #[must_use]
    pub fn new(api: Arc<A>, tokens: Arc<TokenStore>, user_type: UserType, config: &RoomConfig) -> Self {
        let (user_tx, _rx) = watch::channel(None);
        Self {
            api,
            tokens,
            user_type,
            token_query_param: config.token_query_param.clone(),
            next_app_url: config.next_app_url.clone(),
            user_tx,
        }
    }

    /// User type this bootstrap fetches
    #[must_use]
    pub fn user_type(&self) -> UserType {
        self.user_type
    }

    /// Subscribe to the resolved user
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<CurrentUser>> {
        self.user_tx.subscribe()
    }

    /// The resolved user, if any
    #[must_use]
    pub fn current_user(&self) -> Option<CurrentUser> {
        self.user_tx.borrow().clone()
    }

    /// Resolve the token and fetch the user
    ///
    /// Never fails: every collaborator error is logged and reflected in the
    /// returned outcome.
    pub async fn run(&self, room_url: &Url) -> BootstrapOutcome {
        let mut outcome = BootstrapOutcome::default();

        if let Some(token) = token_from_url(room_url, &self.token_query_param) {
            self.persist(token).await;
            outcome.credential = Some(CredentialSource::QueryParam);
        } else {
            match self.api.exchange_cookie().await {
                Ok(token) => {
                    self.persist(token).await;
                    outcome.credential = Some(CredentialSource::CookieExchange);
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        redirect_to = %self.next_app_url,
                        "Cookie exchange failed"
                    );
                    outcome.redirect_to = Some(self.next_app_url.clone());
                    outcome.credential = self.stored_token().await;
                }
            }
        }

        if let Some(source) = outcome.credential {
            tracing::info!(source = %source, "Access token resolved");
        }

        match self.api.fetch_current_user(self.user_type).await {
            Ok(user) => {
                tracing::info!(
                    user_type = %self.user_type,
                    user_id = %user.user().id,
                    "Current user fetched"
                );
                self.user_tx.send_replace(Some(user.clone()));
                outcome.user = Some(user);
            }
            Err(e) => {
                tracing::warn!(
                    user_type = %self.user_type,
                    error = %e,
                    "Failed to fetch current user"
                );
            }
        }

        outcome
    }

    /// Run on a background task
    pub fn spawn(self: Arc<Self>, room_url: Url) -> JoinHandle<BootstrapOutcome> {
        tokio::spawn(async move { self.run(&room_url).await })
    }

    async fn persist(&self, token: AccessToken) {
        if let Err(e) = self.tokens.save(token).await {
            // The in-memory token is still set; only the on-disk copy is lost
            tracing::warn!(error = %e, "Failed to persist access token");
        }
    }

    async fn stored_token(&self) -> Option<CredentialSource> {
        match self.tokens.load().await {
            Ok(Some(_)) => Some(CredentialSource::Stored),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load stored access token");
                None
            }
        }
    }
}
