// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Rust SDK client for Loom user-action telemetry.
//!
//! Captures discrete interaction events (screen views, taps, text-input
//! metadata, navigation, search, custom and revenue events), buffers them
//! in memory, and uploads them in batches to a collection endpoint on a
//! periodic schedule with bounded retry.
//!
//! Recording is fire-and-forget: track calls never touch the network and
//! never fail because of it. Delivery failures are absorbed into per-action
//! retry counts, visible through [`TelemetryClient::statistics`]; actions
//! that exhaust their retries are parked and reported as failed rather than
//! retried forever.
//!
//! # Example
//!
//! ```ignore
//! use loom_telemetry::TelemetryClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), loom_telemetry::TelemetryError> {
//!     let client = TelemetryClient::builder()
//!         .api_key("key_xxx")
//!         .app_version(env!("CARGO_PKG_VERSION"))
//!         .build_and_start()?;
//!
//!     client.set_global_property("env", "production", true);
//!     client.track_screen_view("Home")?;
//!     client.track_button_tap("Home", "get_started")?;
//!
//!     client.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod buffer;
pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod properties;
pub mod providers;
pub mod scheduler;
pub mod transport;

pub use buffer::ActionBuffer;
pub use client::{ActionRecorder, TelemetryClient, TelemetryClientBuilder};
pub use config::TelemetryConfig;
pub use endpoint::{resolve_endpoint, validate_endpoint, DEFAULT_ENDPOINT, ENDPOINT_ENV_VAR};
pub use error::{Result, TelemetryError};
pub use properties::GlobalProperties;
pub use providers::{DeviceInfoProvider, SessionState, StaticDeviceInfo};
pub use scheduler::{FlushOutcome, FlushScheduler};
pub use transport::{user_agent, BatchTransport, HttpTransport, SDK_NAME, SDK_VERSION};

pub use loom_telemetry_core::{
	ActionBatch, ActionId, ActionType, BatchId, BatchInfo, BufferStatistics, FlushReason,
	IdentitySnapshot, SessionInfo, UserAction, DEFAULT_MAX_RETRIES,
};
