// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Collaborator seams: device snapshot provider and session identity state.
//!
//! Device info must be pre-resolved and cached by the time the SDK asks for
//! it; the provider is queried synchronously once per batch, never during
//! record calls. Async platform-permission flows (advertising ids,
//! attribution) live outside the SDK and feed a provider implementation.

use std::sync::RwLock;

use chrono::{DateTime, Utc};
use loom_telemetry_core::IdentitySnapshot;
use serde_json::{Map, Value};
use uuid::Uuid;

/// Supplies the opaque device snapshot attached to each outgoing batch.
pub trait DeviceInfoProvider: Send + Sync {
	/// Returns the current device snapshot. Must be cheap and non-blocking.
	fn device_snapshot(&self) -> Map<String, Value>;
}

/// A device snapshot fixed at construction time.
#[derive(Debug, Clone, Default)]
pub struct StaticDeviceInfo {
	snapshot: Map<String, Value>,
}

impl StaticDeviceInfo {
	pub fn new(snapshot: Map<String, Value>) -> Self {
		Self { snapshot }
	}

	/// Detects what can be read cheaply from the process environment:
	/// platform, architecture, locale, and timezone where set.
	pub fn detect() -> Self {
		let mut snapshot = Map::new();
		snapshot.insert("platform".to_string(), std::env::consts::OS.into());
		snapshot.insert("arch".to_string(), std::env::consts::ARCH.into());
		if let Ok(locale) = std::env::var("LANG") {
			if !locale.is_empty() {
				snapshot.insert("locale".to_string(), locale.into());
			}
		}
		if let Ok(timezone) = std::env::var("TZ") {
			if !timezone.is_empty() {
				snapshot.insert("timezone".to_string(), timezone.into());
			}
		}
		Self { snapshot }
	}

	/// Adds one entry to the snapshot.
	pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.snapshot.insert(key.into(), value.into());
		self
	}
}

impl DeviceInfoProvider for StaticDeviceInfo {
	fn device_snapshot(&self) -> Map<String, Value> {
		self.snapshot.clone()
	}
}

/// Identity state owned by the client: the session id is fixed for the
/// client's lifetime, the user id is settable at any time. Records snapshot
/// this state at record time and batches snapshot it at flush time.
#[derive(Debug)]
pub struct SessionState {
	session_id: String,
	session_start: DateTime<Utc>,
	user_id: RwLock<Option<String>>,
}

impl SessionState {
	pub fn new() -> Self {
		Self {
			session_id: Uuid::new_v4().to_string(),
			session_start: Utc::now(),
			user_id: RwLock::new(None),
		}
	}

	pub fn session_id(&self) -> &str {
		&self.session_id
	}

	pub fn set_user_id(&self, user_id: Option<String>) {
		*self
			.user_id
			.write()
			.unwrap_or_else(|e| e.into_inner()) = user_id;
	}

	pub fn user_id(&self) -> Option<String> {
		self.user_id
			.read()
			.unwrap_or_else(|e| e.into_inner())
			.clone()
	}

	/// Current identity at this instant.
	pub fn snapshot(&self) -> IdentitySnapshot {
		IdentitySnapshot {
			user_id: self.user_id(),
			session_id: self.session_id.clone(),
			session_start: self.session_start,
		}
	}
}

impl Default for SessionState {
	fn default() -> Self {
		Self::new()
	}
}
