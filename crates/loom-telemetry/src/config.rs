// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tunable configuration for the telemetry client.

use std::time::Duration;

use loom_telemetry_core::DEFAULT_MAX_RETRIES;

/// Default interval between scheduled flushes.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(5);

/// Default bound on a single transport request, so a hung call cannot
/// starve the scheduler.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Default number of synced actions retained after compaction.
pub const DEFAULT_KEEP_SYNCED_LIMIT: usize = 500;

/// Configuration for the telemetry client.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
	/// Interval between scheduled flushes.
	pub flush_interval: Duration,
	/// Bound on a single transport request.
	pub request_timeout: Duration,
	/// Flush attempts per action before it is parked as failed.
	pub max_retries: u32,
	/// Synced actions retained after a successful flush; oldest beyond this
	/// are evicted. Unsynced actions are never evicted.
	pub keep_synced_limit: usize,
}

impl Default for TelemetryConfig {
	fn default() -> Self {
		Self {
			flush_interval: DEFAULT_FLUSH_INTERVAL,
			request_timeout: DEFAULT_REQUEST_TIMEOUT,
			max_retries: DEFAULT_MAX_RETRIES,
			keep_synced_limit: DEFAULT_KEEP_SYNCED_LIMIT,
		}
	}
}
