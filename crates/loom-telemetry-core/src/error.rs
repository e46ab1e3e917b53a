// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the telemetry core model.

use thiserror::Error;

/// Errors that can occur while parsing telemetry core types.
#[derive(Debug, Error)]
pub enum TelemetryCoreError {
	/// Invalid action type string
	#[error("invalid action type: {0}")]
	InvalidActionType(String),

	/// Invalid flush reason string
	#[error("invalid flush reason: {0}")]
	InvalidFlushReason(String),
}
