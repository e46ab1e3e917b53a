// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Buffer statistics reported to the host application.

use serde::{Deserialize, Serialize};

/// Sync-state counts for the action buffer.
///
/// `unsynced` counts every action not yet acknowledged, including those at
/// the retry ceiling; `failed` is the subset of `unsynced` whose retries are
/// exhausted. `total == synced + unsynced` at every observable point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferStatistics {
	pub total: usize,
	pub synced: usize,
	pub unsynced: usize,
	pub failed: usize,
}

impl BufferStatistics {
	pub fn is_empty(&self) -> bool {
		self.total == 0
	}
}
