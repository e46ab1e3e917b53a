// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the telemetry SDK.
//!
//! Configuration and validation errors surface synchronously to the caller.
//! Transport errors never do: the flush path converts them to failed
//! outcomes that only show up in retry counts and statistics.

use thiserror::Error;

/// Telemetry SDK errors.
#[derive(Debug, Error)]
pub enum TelemetryError {
	/// The collection endpoint is missing, malformed, or not allowed.
	#[error("invalid collection endpoint: {0}")]
	InvalidEndpoint(String),

	/// The flush interval must be non-zero.
	#[error("invalid flush interval: must be non-zero")]
	InvalidFlushInterval,

	/// A required field on a track call was empty or malformed.
	#[error("event validation failed: {0}")]
	ValidationFailed(String),

	/// HTTP request failed (network error or timeout).
	#[error("HTTP request failed: {0}")]
	RequestFailed(#[from] reqwest::Error),

	/// The collector returned a non-2xx response.
	#[error("collector error ({status}): {message}")]
	ServerError { status: u16, message: String },

	/// The client has been shut down.
	#[error("client has been shut down")]
	ClientShutdown,
}

/// Result type alias for telemetry operations.
pub type Result<T> = std::result::Result<T, TelemetryError>;
