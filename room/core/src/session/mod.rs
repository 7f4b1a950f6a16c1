//! Session Bootstrap
//!
//! Everything the room needs before screens can talk to the API: the access
//! token (from the room URL or the cookie exchange), the HTTP client that
//! injects it, and the signed-in user.
//!
//! # Module Overview
//!
//! - [`credential`]: token type, URL/cookie extraction, on-disk token store
//! - [`client`]: `reqwest` client with bearer injection
//! - [`user`]: doctor/student user shapes
//! - [`bootstrap`]: the resolve-then-fetch flow and user publication

pub mod bootstrap;
pub mod client;
pub mod credential;
pub mod user;

use std::sync::Arc;

pub use bootstrap::{BootstrapError, BootstrapOutcome, HttpSessionApi, SessionApi, SessionBootstrap};
pub use client::{ApiClient, ApiError};
pub use credential::{AccessToken, CredentialError, CredentialSource, TokenStore};
pub use user::{CurrentUser, Doctor, Gender, Student, User, UserType};

use crate::config::RoomConfig;

/// Build the HTTP session stack for a room
///
/// Returns the bootstrap together with a client sharing its token store, so
/// screens issue requests with whatever token the bootstrap resolves.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be created.
pub fn http_session(
    config: &RoomConfig,
    user_type: UserType,
) -> Result<(SessionBootstrap<HttpSessionApi>, ApiClient), BootstrapError> {
    let tokens = Arc::new(TokenStore::new(config.token_file.clone()));
    let client = ApiClient::new(config, Arc::clone(&tokens))?;
    let api = Arc::new(HttpSessionApi::new(client.clone(), config));
    let bootstrap = SessionBootstrap::new(api, tokens, user_type, config);
    Ok((bootstrap, client))
}
