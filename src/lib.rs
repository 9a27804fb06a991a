//! MediaSense - playback arbitration across media players.
//!
//! MediaSense watches the media players of a desktop session and keeps a
//! single priority source audible: while a priority-1 player (typically a
//! browser) plays, every other player is paused; when it stops, the paused
//! player gets its turn again. Pauses the user makes by hand are remembered
//! and respected.
//!
//! - [`arbitration`]: the engine, its poll driver and event sinks
//! - [`config`] and [`config_store`]: TOML configuration with hot reload
//! - [`services::mpris`]: the MPRIS player provider
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use mediasense::arbitration::{
//!     Engine, MemoryProvider, PlaybackState, PlayerSnapshot, PollDriver, TracingSink,
//! };
//! use mediasense::config::ArbitrationConfig;
//!
//! # async fn demo() {
//! let provider = Arc::new(MemoryProvider::new(vec![
//!     PlayerSnapshot::new("firefox.1", PlaybackState::Playing),
//!     PlayerSnapshot::new("spotify.1", PlaybackState::Playing),
//! ]));
//!
//! let driver = PollDriver::new(
//!     Engine::new(),
//!     provider,
//!     Arc::new(ArbitrationConfig::default()),
//!     Arc::new(TracingSink),
//! );
//!
//! // spotify.1 gets paused while firefox.1 plays
//! driver.tick().await;
//! # }
//! ```

/// Playback arbitration engine and poll driver.
pub mod arbitration;

/// Configuration schema definitions and validation.
pub mod config;

/// Reactive configuration store with change tracking.
pub mod config_store;

/// Core error types and result aliases.
pub mod core;

/// Command-line interface.
pub mod cli;

/// Player providers for system integration.
pub mod services;

/// Runtime status shared between the service and the CLI.
pub mod runtime_state;

/// Logging setup.
pub mod tracing_config;

/// Re-exported core types for convenience.
pub use core::{MediaSenseError, Result};
