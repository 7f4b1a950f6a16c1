//! Room Core - Headless Logic for the Telehealth Room
//!
//! This crate holds everything in the room that is not drawing: the overlay
//! stack manager, the session bootstrap, room routing and treatment records.
//! It can drive the terminal surface or run headless in tests.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                         Surface (TUI)                            │
//! │   room screen · treatment panel · leave dialog · compositor      │
//! └───────┬─────────────────────────────────────────▲────────────────┘
//!         │ register / open / close / destroy_all   │ OverlaySnapshot
//! ┌───────▼─────────────────────────────────────────┴────────────────┐
//! │                          ROOM CORE                               │
//! │  ┌──────────────────────┐  ┌─────────────────┐  ┌─────────────┐  │
//! │  │ OverlayController    │  │ SessionBootstrap│  │ Treatment   │  │
//! │  │  └ OverlaySnapshot   │  │  └ ApiClient    │  │  └ Draft    │  │
//! │  │  └ OverlayStack      │  │  └ TokenStore   │  │  └ Record   │  │
//! │  └──────────────────────┘  └─────────────────┘  └─────────────┘  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Module Overview
//!
//! - [`overlay`]: overlay registry, controller and stacking order
//! - [`session`]: access token, API client, current user
//! - [`route`]: room URL parsing (doctor vs. student)
//! - [`treatment`]: treatment drafts, validation and submission
//! - [`config`]: TOML + environment configuration
//!
//! # No TUI Dependencies
//!
//! This crate has **zero** dependencies on ratatui, crossterm, or any other
//! UI framework. Overlay payloads are a type parameter chosen by the surface.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod overlay;
pub mod route;
pub mod session;
pub mod treatment;

// Re-exports for convenience
pub use overlay::{
    overlay_z_index, OverlayBatch, OverlayController, OverlayEntry, OverlayKey, OverlaySnapshot,
    OverlayStack, Priority, StackLayer, CONTENT_Z_INDEX, DEFAULT_OVERLAY_BASE_Z,
};
pub use route::RoomRoute;
pub use session::{
    http_session, AccessToken, ApiClient, ApiError, BootstrapError, BootstrapOutcome,
    CredentialError, CredentialSource, CurrentUser, HttpSessionApi, SessionApi, SessionBootstrap,
    TokenStore, UserType,
};
pub use treatment::{submit_treatment, TreatmentDraft, TreatmentError, TreatmentLevel, TreatmentRecord};

// Config exports
pub use config::{
    default_config_path, load_config, load_config_from_path, ConfigError, ConfigOverrides,
    ConfigSource, RoomConfig, RoomToml,
};
