// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The in-memory action buffer.
//!
//! The single shared mutable resource in the SDK: an append-only FIFO of
//! recorded actions plus their sync state. All mutation goes through this
//! type, so the record invariants (one-way sync flag, monotone retries)
//! hold under concurrency. The internal lock is held only for short
//! critical sections and never across I/O: the flush path snapshots
//! eligible actions, performs the network call without the lock, then
//! applies the outcome in a second critical section.

use std::collections::HashSet;
use std::sync::Mutex;

use loom_telemetry_core::{ActionId, BufferStatistics, UserAction};
use tracing::debug;

/// Thread-safe, insertion-ordered buffer of recorded actions.
///
/// Pure data structure: no I/O, and no operation fails.
#[derive(Debug)]
pub struct ActionBuffer {
	actions: Mutex<Vec<UserAction>>,
	max_retries: u32,
}

impl ActionBuffer {
	pub fn new(max_retries: u32) -> Self {
		Self {
			actions: Mutex::new(Vec::new()),
			max_retries,
		}
	}

	pub fn max_retries(&self) -> u32 {
		self.max_retries
	}

	/// Appends a recorded action. Never blocks on network.
	pub fn append(&self, action: UserAction) {
		self.lock().push(action);
	}

	/// Snapshot of all flush-eligible actions (unsynced, under the retry
	/// ceiling), in insertion order.
	pub fn select_eligible(&self) -> Vec<UserAction> {
		self.lock()
			.iter()
			.filter(|a| a.is_eligible(self.max_retries))
			.cloned()
			.collect()
	}

	/// Snapshot of unsynced actions in insertion order, optionally capped.
	/// Includes actions past the retry ceiling: this is the query half of
	/// the host-driven sync protocol, which ignores the ceiling.
	pub fn unsynced(&self, limit: Option<usize>) -> Vec<UserAction> {
		let actions = self.lock();
		let iter = actions.iter().filter(|a| !a.is_synced()).cloned();
		match limit {
			Some(n) => iter.take(n).collect(),
			None => iter.collect(),
		}
	}

	/// Applies one batch outcome to the given actions: marks them synced on
	/// success, bumps their retry counts on failure. All-or-nothing per
	/// call; ids no longer in the buffer (purged) are silently ignored.
	pub fn apply_outcome(&self, ids: &[ActionId], success: bool) {
		let id_set: HashSet<ActionId> = ids.iter().copied().collect();
		let mut actions = self.lock();
		for action in actions.iter_mut().filter(|a| id_set.contains(&a.id)) {
			if success {
				action.mark_synced();
			} else {
				action.record_failed_attempt();
			}
		}
	}

	/// Marks the given actions as synced. Idempotent: already-synced ids
	/// and unknown ids are no-ops. Returns how many actions newly flipped.
	pub fn mark_synced(&self, ids: &[ActionId]) -> usize {
		let id_set: HashSet<ActionId> = ids.iter().copied().collect();
		let mut actions = self.lock();
		let mut flipped = 0;
		for action in actions.iter_mut().filter(|a| id_set.contains(&a.id)) {
			if !action.is_synced() {
				action.mark_synced();
				flipped += 1;
			}
		}
		flipped
	}

	/// Sync-state counts, taken in one critical section so the numbers are
	/// never torn mid-mutation.
	pub fn statistics(&self) -> BufferStatistics {
		let actions = self.lock();
		let total = actions.len();
		let synced = actions.iter().filter(|a| a.is_synced()).count();
		let failed = actions
			.iter()
			.filter(|a| a.has_exhausted_retries(self.max_retries))
			.count();
		BufferStatistics {
			total,
			synced,
			unsynced: total - synced,
			failed,
		}
	}

	/// Empties the buffer. Irreversible. Returns the number of actions
	/// dropped.
	pub fn purge_all(&self) -> usize {
		let mut actions = self.lock();
		let dropped = actions.len();
		actions.clear();
		dropped
	}

	/// Retains at most `keep_synced_limit` synced actions, dropping the
	/// oldest first. Unsynced actions are never touched regardless of
	/// count; compaction bounds synced history, not pending work. Returns
	/// the number of actions dropped.
	pub fn compact(&self, keep_synced_limit: usize) -> usize {
		let mut actions = self.lock();
		let synced = actions.iter().filter(|a| a.is_synced()).count();
		if synced <= keep_synced_limit {
			return 0;
		}
		let mut to_drop = synced - keep_synced_limit;
		let dropped = to_drop;
		actions.retain(|a| {
			if to_drop > 0 && a.is_synced() {
				to_drop -= 1;
				false
			} else {
				true
			}
		});
		debug!(dropped, "compacted synced telemetry history");
		dropped
	}

	pub fn len(&self) -> usize {
		self.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.lock().is_empty()
	}

	// A poisoned lock means a panic mid-mutation elsewhere; recover the
	// data rather than poisoning the host application too.
	fn lock(&self) -> std::sync::MutexGuard<'_, Vec<UserAction>> {
		self.actions.lock().unwrap_or_else(|e| e.into_inner())
	}
}
