// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Batch transport to the collection endpoint.
//!
//! The transport sends one serialized batch per call and reports success or
//! failure. It performs no retries and no backoff; bounded retry belongs
//! to the buffer's eligibility mechanism, driven by the scheduler.

use std::time::Duration;

use async_trait::async_trait;
use loom_telemetry_core::ActionBatch;
use reqwest::Client;
use tracing::{debug, warn};

use crate::error::{Result, TelemetryError};

/// SDK name for identification.
pub const SDK_NAME: &str = "loom-telemetry";
/// SDK version for identification.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Sends batches to the collector. The seam tests and custom delivery
/// pipelines plug into.
#[async_trait]
pub trait BatchTransport: Send + Sync {
	/// Sends one batch. Success is a 2xx response; any network error,
	/// timeout, or non-2xx status is a failure.
	async fn send(&self, batch: &ActionBatch) -> Result<()>;
}

/// Returns the standard telemetry User-Agent string.
///
/// Format: `loom-telemetry/{version} (Platform: {platform})`
pub fn user_agent(platform: &str) -> String {
	format!("{SDK_NAME}/{SDK_VERSION} (Platform: {platform})")
}

/// HTTP transport: a single JSON POST per batch.
pub struct HttpTransport {
	client: Client,
	endpoint: String,
	api_key: Option<String>,
}

impl HttpTransport {
	/// Builds the transport with a bounded request timeout so a hung call
	/// cannot starve the flush scheduler.
	pub fn new(
		endpoint: impl Into<String>,
		api_key: Option<String>,
		request_timeout: Duration,
		platform: &str,
	) -> Result<Self> {
		let client = Client::builder()
			.user_agent(user_agent(platform))
			.timeout(request_timeout)
			.build()?;
		Ok(Self {
			client,
			endpoint: endpoint.into(),
			api_key,
		})
	}

	pub fn endpoint(&self) -> &str {
		&self.endpoint
	}
}

#[async_trait]
impl BatchTransport for HttpTransport {
	async fn send(&self, batch: &ActionBatch) -> Result<()> {
		debug!(
			batch_id = %batch.batch_info.batch_id,
			event_count = batch.batch_info.event_count,
			"sending telemetry batch"
		);

		let mut request = self.client.post(&self.endpoint).json(batch);
		if let Some(api_key) = &self.api_key {
			request = request.header("X-API-Key", api_key);
		}

		let response = request.send().await?;

		if response.status().is_success() {
			debug!(batch_id = %batch.batch_info.batch_id, "telemetry batch accepted");
			Ok(())
		} else {
			let status = response.status().as_u16();
			let message = response.text().await.unwrap_or_default();
			warn!(status, "collector rejected telemetry batch");
			Err(TelemetryError::ServerError { status, message })
		}
	}
}
