// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Global properties merged into every recorded action.
//!
//! The merge happens exactly once, at record time, with caller-specified
//! properties winning on key collision. The flush path serializes stored
//! records as-is, so a global property changed after an action was recorded
//! never rewrites that action's payload.

use std::sync::RwLock;

use serde_json::{Map, Value};

/// A small mutable key→value store attached to all recorded actions.
///
/// Low-contention: reads dominate (one snapshot per recorded action), so a
/// `RwLock` fits. Lock poisoning is recovered rather than propagated; a
/// telemetry store must never panic the host application.
#[derive(Debug, Default)]
pub struct GlobalProperties {
	inner: RwLock<Map<String, Value>>,
}

impl GlobalProperties {
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts or overwrites a property.
	///
	/// With `override_existing` false, an existing key is left untouched and
	/// the call reports failure, never a silent success.
	pub fn set(
		&self,
		key: impl Into<String>,
		value: impl Into<Value>,
		override_existing: bool,
	) -> bool {
		let key = key.into();
		let mut inner = self.write();
		if !override_existing && inner.contains_key(&key) {
			return false;
		}
		inner.insert(key, value.into());
		true
	}

	/// Removes a property if present; no-op otherwise.
	pub fn unset(&self, key: &str) {
		self.write().remove(key);
	}

	/// Snapshot copy of the store. Caller mutation does not affect the
	/// internal map.
	pub fn all(&self) -> Map<String, Value> {
		self.read().clone()
	}

	/// Removes all properties.
	pub fn clear(&self) {
		self.write().clear();
	}

	pub fn len(&self) -> usize {
		self.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.read().is_empty()
	}

	fn read(&self) -> std::sync::RwLockReadGuard<'_, Map<String, Value>> {
		self.inner.read().unwrap_or_else(|e| e.into_inner())
	}

	fn write(&self) -> std::sync::RwLockWriteGuard<'_, Map<String, Value>> {
		self.inner.write().unwrap_or_else(|e| e.into_inner())
	}
}
