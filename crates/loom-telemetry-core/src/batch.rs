// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The batch wire format.
//!
//! An [`ActionBatch`] is the transmission unit: a snapshot of eligible
//! actions plus batch, device, and session metadata. Batches are transient,
//! built fresh for every flush attempt and never persisted, and every
//! attempt carries a fresh [`BatchId`] distinct from the action ids inside.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::action::{ActionId, UserAction};
use crate::error::TelemetryCoreError;

/// Unique identifier for one flush attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchId(pub Uuid);

impl BatchId {
	#[must_use]
	pub fn new() -> Self {
		Self(Uuid::new_v4())
	}
}

impl Default for BatchId {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Display for BatchId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl std::str::FromStr for BatchId {
	type Err = uuid::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(Self(Uuid::parse_str(s)?))
	}
}

/// What triggered a flush attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlushReason {
	/// The periodic scheduler tick.
	Interval,
	/// An explicit caller-triggered flush.
	Manual,
	/// The final flush during client shutdown.
	Shutdown,
}

impl FlushReason {
	pub fn as_str(&self) -> &'static str {
		match self {
			FlushReason::Interval => "interval",
			FlushReason::Manual => "manual",
			FlushReason::Shutdown => "shutdown",
		}
	}
}

impl std::fmt::Display for FlushReason {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

impl std::str::FromStr for FlushReason {
	type Err = TelemetryCoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"interval" => Ok(FlushReason::Interval),
			"manual" => Ok(FlushReason::Manual),
			"shutdown" => Ok(FlushReason::Shutdown),
			_ => Err(TelemetryCoreError::InvalidFlushReason(s.to_string())),
		}
	}
}

/// Current identity at a point in time: who the user is and which session
/// they are in. Captured per record at record time and per batch at flush
/// time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentitySnapshot {
	pub user_id: Option<String>,
	pub session_id: String,
	pub session_start: DateTime<Utc>,
}

/// Session metadata attached to a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
	pub session_id: String,
	#[serde(with = "chrono::serde::ts_milliseconds")]
	pub session_start: DateTime<Utc>,
	pub user_id: Option<String>,
}

impl From<&IdentitySnapshot> for SessionInfo {
	fn from(snapshot: &IdentitySnapshot) -> Self {
		Self {
			session_id: snapshot.session_id.clone(),
			session_start: snapshot.session_start,
			user_id: snapshot.user_id.clone(),
		}
	}
}

/// Metadata describing one flush attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchInfo {
	pub batch_id: BatchId,
	pub event_count: usize,
	pub flush_reason: FlushReason,
	#[serde(with = "chrono::serde::ts_milliseconds")]
	pub flush_timestamp: DateTime<Utc>,
}

/// The batch payload POSTed to the collection endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionBatch {
	pub events: Vec<UserAction>,
	pub batch_info: BatchInfo,
	pub device_info: Map<String, Value>,
	pub session_info: SessionInfo,
}

impl ActionBatch {
	/// Builds a batch from a snapshot of eligible actions.
	///
	/// Pure except for the freshly generated batch id and flush timestamp;
	/// the actions themselves are taken as an owned snapshot and are not
	/// mutated.
	pub fn build(
		events: Vec<UserAction>,
		device_info: Map<String, Value>,
		identity: &IdentitySnapshot,
		flush_reason: FlushReason,
	) -> Self {
		let batch_info = BatchInfo {
			batch_id: BatchId::new(),
			event_count: events.len(),
			flush_reason,
			flush_timestamp: Utc::now(),
		};
		Self {
			events,
			batch_info,
			device_info,
			session_info: SessionInfo::from(identity),
		}
	}

	/// The ids of every action in this batch, in batch order.
	pub fn event_ids(&self) -> Vec<ActionId> {
		self.events.iter().map(|e| e.id).collect()
	}

	pub fn len(&self) -> usize {
		self.events.len()
	}

	pub fn is_empty(&self) -> bool {
		self.events.is_empty()
	}
}
