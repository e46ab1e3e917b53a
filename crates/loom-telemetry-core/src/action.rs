// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The captured user-action model.
//!
//! A [`UserAction`] is immutable once recorded except for its local sync
//! state: `is_synced` moves false→true exactly once and `retry_count` only
//! grows. Both fields are private so those transitions can only happen
//! through [`UserAction::mark_synced`] and
//! [`UserAction::record_failed_attempt`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::TelemetryCoreError;

/// Default ceiling on flush attempts per action. An action that has failed
/// this many times is excluded from future batches but stays queryable as
/// failed.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Unique identifier for a captured action.
///
/// Assigned once at record time and never reused; batch acknowledgments
/// refer to actions by this id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionId(pub Uuid);

impl ActionId {
	#[must_use]
	pub fn new() -> Self {
		Self(Uuid::new_v4())
	}

	#[must_use]
	pub fn as_uuid(&self) -> &Uuid {
		&self.0
	}
}

impl Default for ActionId {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Display for ActionId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl std::str::FromStr for ActionId {
	type Err = uuid::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(Self(Uuid::parse_str(s)?))
	}
}

/// The closed set of action kinds the SDK records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
	/// A screen or page became visible.
	ScreenView,
	/// A button or other tappable element was activated.
	ButtonTap,
	/// Text was entered into a field. Only derived metadata (length,
	/// field id) is recorded, never the text itself.
	TextInput,
	/// Navigation from one screen to another.
	Navigation,
	/// A search was performed. Only derived metadata is recorded.
	Search,
	/// A host-application-defined event.
	Custom,
	/// A revenue event.
	Revenue,
	/// An in-app purchase.
	Iap,
}

impl ActionType {
	/// Returns the wire representation of this action type.
	pub fn as_str(&self) -> &'static str {
		match self {
			ActionType::ScreenView => "screen_view",
			ActionType::ButtonTap => "button_tap",
			ActionType::TextInput => "text_input",
			ActionType::Navigation => "navigation",
			ActionType::Search => "search",
			ActionType::Custom => "custom",
			ActionType::Revenue => "revenue",
			ActionType::Iap => "iap",
		}
	}
}

impl std::fmt::Display for ActionType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

impl std::str::FromStr for ActionType {
	type Err = TelemetryCoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"screen_view" => Ok(ActionType::ScreenView),
			"button_tap" => Ok(ActionType::ButtonTap),
			"text_input" => Ok(ActionType::TextInput),
			"navigation" => Ok(ActionType::Navigation),
			"search" => Ok(ActionType::Search),
			"custom" => Ok(ActionType::Custom),
			"revenue" => Ok(ActionType::Revenue),
			"iap" => Ok(ActionType::Iap),
			_ => Err(TelemetryCoreError::InvalidActionType(s.to_string())),
		}
	}
}

/// One captured user interaction plus its local sync state.
///
/// Identity fields (`user_id`, `session_id`) and version fields are
/// snapshots taken at record time; they are not updated retroactively if
/// identity changes later. Device info is batch-level metadata and does not
/// appear on the record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAction {
	pub id: ActionId,
	pub action_type: ActionType,
	#[serde(with = "chrono::serde::ts_milliseconds")]
	pub timestamp: DateTime<Utc>,
	pub user_id: Option<String>,
	pub session_id: String,
	pub app_version: String,
	pub sdk_version: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub screen_name: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub element_id: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub element_type: Option<String>,
	#[serde(default, skip_serializing_if = "Map::is_empty")]
	pub properties: Map<String, Value>,
	/// Local sync state, not part of the wire payload.
	#[serde(skip)]
	is_synced: bool,
	/// Local retry bookkeeping, not part of the wire payload.
	#[serde(skip)]
	retry_count: u32,
}

impl UserAction {
	/// Creates a new unsynced action with a fresh id and the current time.
	pub fn new(action_type: ActionType, session_id: impl Into<String>) -> Self {
		Self {
			id: ActionId::new(),
			action_type,
			timestamp: Utc::now(),
			user_id: None,
			session_id: session_id.into(),
			app_version: String::new(),
			sdk_version: String::new(),
			screen_name: None,
			element_id: None,
			element_type: None,
			properties: Map::new(),
			is_synced: false,
			retry_count: 0,
		}
	}

	pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
		self.user_id = Some(user_id.into());
		self
	}

	pub fn with_screen_name(mut self, screen_name: impl Into<String>) -> Self {
		self.screen_name = Some(screen_name.into());
		self
	}

	/// Sets the element id and type of the interacted widget.
	pub fn with_element(
		mut self,
		element_id: impl Into<String>,
		element_type: impl Into<String>,
	) -> Self {
		self.element_id = Some(element_id.into());
		self.element_type = Some(element_type.into());
		self
	}

	pub fn with_versions(
		mut self,
		app_version: impl Into<String>,
		sdk_version: impl Into<String>,
	) -> Self {
		self.app_version = app_version.into();
		self.sdk_version = sdk_version.into();
		self
	}

	/// Inserts a single property, overwriting an existing key.
	pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.properties.insert(key.into(), value.into());
		self
	}

	/// Replaces the property map wholesale.
	pub fn with_properties(mut self, properties: Map<String, Value>) -> Self {
		self.properties = properties;
		self
	}

	/// Whether this action has been acknowledged by the collector.
	pub fn is_synced(&self) -> bool {
		self.is_synced
	}

	/// Number of failed flush attempts so far.
	pub fn retry_count(&self) -> u32 {
		self.retry_count
	}

	/// Marks this action as synced. Idempotent; the flag never reverts.
	pub fn mark_synced(&mut self) {
		self.is_synced = true;
	}

	/// Records one failed flush attempt.
	pub fn record_failed_attempt(&mut self) {
		self.retry_count = self.retry_count.saturating_add(1);
	}

	/// Whether this action should be included in the next flush attempt:
	/// unsynced and under the retry ceiling.
	pub fn is_eligible(&self, max_retries: u32) -> bool {
		!self.is_synced && self.retry_count < max_retries
	}

	/// Whether this action has hit the retry ceiling without syncing.
	pub fn has_exhausted_retries(&self, max_retries: u32) -> bool {
		!self.is_synced && self.retry_count >= max_retries
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn test_new_action_is_unsynced() {
		let action = UserAction::new(ActionType::ScreenView, "session-1");
		assert!(!action.is_synced());
		assert_eq!(action.retry_count(), 0);
		assert!(action.is_eligible(DEFAULT_MAX_RETRIES));
	}

	#[test]
	fn test_mark_synced_is_one_way() {
		let mut action = UserAction::new(ActionType::ButtonTap, "session-1");
		action.mark_synced();
		assert!(action.is_synced());

		// A second call changes nothing.
		action.mark_synced();
		assert!(action.is_synced());
	}

	#[test]
	fn test_retry_count_is_monotonic() {
		let mut action = UserAction::new(ActionType::Custom, "session-1");
		for expected in 1..=5u32 {
			action.record_failed_attempt();
			assert_eq!(action.retry_count(), expected);
		}
	}

	#[test]
	fn test_eligibility_respects_retry_ceiling() {
		let mut action = UserAction::new(ActionType::Search, "session-1");
		for _ in 0..DEFAULT_MAX_RETRIES {
			assert!(action.is_eligible(DEFAULT_MAX_RETRIES));
			action.record_failed_attempt();
		}
		assert!(!action.is_eligible(DEFAULT_MAX_RETRIES));
		assert!(action.has_exhausted_retries(DEFAULT_MAX_RETRIES));
	}

	#[test]
	fn test_synced_action_is_not_eligible() {
		let mut action = UserAction::new(ActionType::Navigation, "session-1");
		action.mark_synced();
		assert!(!action.is_eligible(DEFAULT_MAX_RETRIES));
		assert!(!action.has_exhausted_retries(DEFAULT_MAX_RETRIES));
	}

	#[test]
	fn test_wire_shape_uses_camel_case_keys() {
		let action = UserAction::new(ActionType::ButtonTap, "session-1")
			.with_user_id("user-1")
			.with_screen_name("Checkout")
			.with_element("buy_now", "button")
			.with_versions("2.1.0", "0.1.0")
			.with_property("cart_size", 3);

		let value = serde_json::to_value(&action).unwrap();
		let obj = value.as_object().unwrap();

		assert!(obj.contains_key("id"));
		assert_eq!(obj["actionType"], "button_tap");
		assert!(obj["timestamp"].is_i64());
		assert_eq!(obj["userId"], "user-1");
		assert_eq!(obj["sessionId"], "session-1");
		assert_eq!(obj["appVersion"], "2.1.0");
		assert_eq!(obj["sdkVersion"], "0.1.0");
		assert_eq!(obj["screenName"], "Checkout");
		assert_eq!(obj["elementId"], "buy_now");
		assert_eq!(obj["elementType"], "button");
		assert_eq!(obj["properties"]["cart_size"], 3);

		// Local sync state never goes on the wire.
		assert!(!obj.contains_key("isSynced"));
		assert!(!obj.contains_key("retryCount"));
		// Device info is batch-level metadata, not per-event.
		assert!(!obj.contains_key("deviceInfo"));
	}

	#[test]
	fn test_wire_shape_omits_absent_optionals() {
		let action = UserAction::new(ActionType::ScreenView, "session-1");
		let value = serde_json::to_value(&action).unwrap();
		let obj = value.as_object().unwrap();

		assert!(!obj.contains_key("screenName"));
		assert!(!obj.contains_key("elementId"));
		assert!(!obj.contains_key("elementType"));
		assert!(!obj.contains_key("properties"));
		// userId stays present (null) so consumers see an explicit field.
		assert!(obj.contains_key("userId"));
		assert!(obj["userId"].is_null());
	}

	#[test]
	fn test_timestamp_serializes_as_epoch_millis() {
		let action = UserAction::new(ActionType::ScreenView, "session-1");
		let value = serde_json::to_value(&action).unwrap();
		let millis = value["timestamp"].as_i64().unwrap();
		assert_eq!(millis, action.timestamp.timestamp_millis());
	}

	proptest! {
		#[test]
		fn action_ids_are_unique(_seed: u64) {
			let a = ActionId::new();
			let b = ActionId::new();
			prop_assert_ne!(a, b);
		}

		#[test]
		fn action_id_roundtrip(uuid_bytes in any::<[u8; 16]>()) {
			let id = ActionId(Uuid::from_bytes(uuid_bytes));
			let s = id.to_string();
			let parsed: ActionId = s.parse().unwrap();
			prop_assert_eq!(id, parsed);
		}

		#[test]
		fn action_type_roundtrip(action_type in prop_oneof![
			Just(ActionType::ScreenView),
			Just(ActionType::ButtonTap),
			Just(ActionType::TextInput),
			Just(ActionType::Navigation),
			Just(ActionType::Search),
			Just(ActionType::Custom),
			Just(ActionType::Revenue),
			Just(ActionType::Iap),
		]) {
			let s = action_type.to_string();
			let parsed: ActionType = s.parse().unwrap();
			prop_assert_eq!(action_type, parsed);

			let json = serde_json::to_string(&action_type).unwrap();
			let from_json: ActionType = serde_json::from_str(&json).unwrap();
			prop_assert_eq!(action_type, from_json);
		}

		#[test]
		fn garbage_action_types_dont_parse(s in "[A-Z][a-zA-Z ]{0,20}") {
			prop_assert!(s.parse::<ActionType>().is_err());
		}

		#[test]
		fn retry_count_never_decreases(failures in 0..10u32) {
			let mut action = UserAction::new(ActionType::Custom, "s");
			let mut last = action.retry_count();
			for _ in 0..failures {
				action.record_failed_attempt();
				prop_assert!(action.retry_count() >= last);
				last = action.retry_count();
			}
		}
	}
}
