// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Periodic flush scheduling.
//!
//! One background task drains the buffer on a fixed interval. At most one
//! flush is in flight at any instant: a tick or an explicit flush arriving
//! while another flush is running is skipped, not queued, and the skipped
//! work is simply picked up by the next attempt. Failed records stay
//! eligible for the next tick until the retry ceiling; there is no separate
//! backoff timer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use loom_telemetry_core::{ActionBatch, FlushReason};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::buffer::ActionBuffer;
use crate::providers::{DeviceInfoProvider, SessionState};
use crate::transport::BatchTransport;

/// What a single flush attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
	/// The batch was accepted; this many actions are now synced.
	Sent(usize),
	/// The send failed; this many actions had their retry count bumped.
	Failed(usize),
	/// Nothing was eligible; not an error.
	Empty,
	/// Another flush was already in flight; nothing was attempted.
	Skipped,
}

/// Drives the flush pipeline: select eligible actions, build the batch,
/// send it, apply the outcome.
pub struct FlushScheduler {
	buffer: Arc<ActionBuffer>,
	transport: Arc<dyn BatchTransport>,
	device_info: Arc<dyn DeviceInfoProvider>,
	session: Arc<SessionState>,
	flush_interval: Duration,
	keep_synced_limit: usize,
	in_flight: AtomicBool,
	shutdown: AtomicBool,
	flush_notify: Notify,
	task: Mutex<Option<JoinHandle<()>>>,
}

impl FlushScheduler {
	pub fn new(
		buffer: Arc<ActionBuffer>,
		transport: Arc<dyn BatchTransport>,
		device_info: Arc<dyn DeviceInfoProvider>,
		session: Arc<SessionState>,
		flush_interval: Duration,
		keep_synced_limit: usize,
	) -> Self {
		Self {
			buffer,
			transport,
			device_info,
			session,
			flush_interval,
			keep_synced_limit,
			in_flight: AtomicBool::new(false),
			shutdown: AtomicBool::new(false),
			flush_notify: Notify::new(),
			task: Mutex::new(None),
		}
	}

	/// Starts the periodic flush loop. Idempotent: a live loop is left
	/// running.
	pub fn start(self: &Arc<Self>) {
		let mut task = self.lock_task();
		self.shutdown.store(false, Ordering::SeqCst);
		let stale = task.as_ref().map(JoinHandle::is_finished).unwrap_or(true);
		if stale {
			let scheduler = Arc::clone(self);
			*task = Some(tokio::spawn(async move { scheduler.run().await }));
		}
	}

	/// Stops the loop, letting any in-flight flush finish first. Idempotent.
	pub async fn stop(&self) {
		self.shutdown.store(true, Ordering::SeqCst);
		self.flush_notify.notify_one();
		let handle = self.lock_task().take();
		if let Some(handle) = handle {
			let _ = handle.await;
		}
	}

	pub fn is_running(&self) -> bool {
		self.lock_task()
			.as_ref()
			.map(|handle| !handle.is_finished())
			.unwrap_or(false)
	}

	/// Runs one flush attempt now, out of band.
	///
	/// Respects the no-overlap rule: if a flush is already in flight this
	/// returns [`FlushOutcome::Skipped`] rather than waiting.
	pub async fn flush_now(&self, reason: FlushReason) -> FlushOutcome {
		if self
			.in_flight
			.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
			.is_err()
		{
			debug!(reason = %reason, "flush skipped, another flush in flight");
			return FlushOutcome::Skipped;
		}
		let outcome = self.flush_inner(reason).await;
		self.in_flight.store(false, Ordering::SeqCst);
		outcome
	}

	/// The pipeline body. The buffer lock is never held here across the
	/// network call: eligibility is a snapshot, the outcome a second
	/// all-or-nothing write.
	async fn flush_inner(&self, reason: FlushReason) -> FlushOutcome {
		let eligible = self.buffer.select_eligible();
		if eligible.is_empty() {
			return FlushOutcome::Empty;
		}

		let batch = ActionBatch::build(
			eligible,
			self.device_info.device_snapshot(),
			&self.session.snapshot(),
			reason,
		);
		let ids = batch.event_ids();
		let count = ids.len();

		match self.transport.send(&batch).await {
			Ok(()) => {
				self.buffer.apply_outcome(&ids, true);
				self.buffer.compact(self.keep_synced_limit);
				debug!(count, reason = %reason, "telemetry flush succeeded");
				FlushOutcome::Sent(count)
			}
			Err(e) => {
				self.buffer.apply_outcome(&ids, false);
				warn!(error = %e, count, reason = %reason, "telemetry flush failed");
				FlushOutcome::Failed(count)
			}
		}
	}

	async fn run(&self) {
		info!(
			interval_secs = self.flush_interval.as_secs(),
			"telemetry flush scheduler started"
		);

		loop {
			tokio::select! {
				_ = tokio::time::sleep(self.flush_interval) => {
					if self.shutdown.load(Ordering::SeqCst) {
						break;
					}
					self.flush_now(FlushReason::Interval).await;
				}
				_ = self.flush_notify.notified() => {
					if self.shutdown.load(Ordering::SeqCst) {
						break;
					}
				}
			}
		}

		info!("telemetry flush scheduler stopped");
	}

	fn lock_task(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
		self.task.lock().unwrap_or_else(|e| e.into_inner())
	}
}
