// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Telemetry client for recording and uploading user actions.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use loom_telemetry_core::{
	ActionId, ActionType, BufferStatistics, FlushReason, UserAction,
};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::buffer::ActionBuffer;
use crate::config::TelemetryConfig;
use crate::endpoint;
use crate::error::{Result, TelemetryError};
use crate::properties::GlobalProperties;
use crate::providers::{DeviceInfoProvider, SessionState, StaticDeviceInfo};
use crate::scheduler::{FlushOutcome, FlushScheduler};
use crate::transport::{BatchTransport, HttpTransport, SDK_VERSION};

/// Builder for constructing a [`TelemetryClient`].
pub struct TelemetryClientBuilder {
	endpoint: Option<String>,
	api_key: Option<String>,
	app_version: Option<String>,
	platform: Option<String>,
	config: TelemetryConfig,
	device_info: Option<Arc<dyn DeviceInfoProvider>>,
	transport: Option<Arc<dyn BatchTransport>>,
	enabled: bool,
}

impl TelemetryClientBuilder {
	/// Creates a new builder with default settings.
	pub fn new() -> Self {
		Self {
			endpoint: None,
			api_key: None,
			app_version: None,
			platform: None,
			config: TelemetryConfig::default(),
			device_info: None,
			transport: None,
			enabled: true,
		}
	}

	/// Sets the collection endpoint URL.
	///
	/// Accepted plain or base64-encoded. The `LOOM_TELEMETRY_ENDPOINT`
	/// environment variable overrides this value; with neither set the
	/// built-in default endpoint is used.
	pub fn endpoint(mut self, url: impl Into<String>) -> Self {
		self.endpoint = Some(url.into());
		self
	}

	/// Sets the API key sent as `X-API-Key` on every batch.
	pub fn api_key(mut self, key: impl Into<String>) -> Self {
		self.api_key = Some(key.into());
		self
	}

	/// Sets the host application version stamped on each action.
	pub fn app_version(mut self, version: impl Into<String>) -> Self {
		self.app_version = Some(version.into());
		self
	}

	/// Sets the platform name used in the User-Agent header. Defaults to
	/// the compile-target OS.
	pub fn platform(mut self, platform: impl Into<String>) -> Self {
		self.platform = Some(platform.into());
		self
	}

	/// Sets the interval between scheduled flushes.
	pub fn flush_interval(mut self, interval: Duration) -> Self {
		self.config.flush_interval = interval;
		self
	}

	/// Sets the bound on a single transport request.
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.config.request_timeout = timeout;
		self
	}

	/// Sets the flush-attempt ceiling per action.
	pub fn max_retries(mut self, max_retries: u32) -> Self {
		self.config.max_retries = max_retries;
		self
	}

	/// Sets how many synced actions are retained after a successful flush.
	pub fn keep_synced_limit(mut self, limit: usize) -> Self {
		self.config.keep_synced_limit = limit;
		self
	}

	/// Sets the device snapshot provider. Defaults to
	/// [`StaticDeviceInfo::detect`].
	pub fn device_info_provider(mut self, provider: Arc<dyn DeviceInfoProvider>) -> Self {
		self.device_info = Some(provider);
		self
	}

	/// Overrides the batch transport. Primarily useful for tests and
	/// host-driven custom delivery pipelines; when set, the endpoint and
	/// API key are unused.
	pub fn transport(mut self, transport: Arc<dyn BatchTransport>) -> Self {
		self.transport = Some(transport);
		self
	}

	/// Starts the client disabled; recording is gated until
	/// [`TelemetryClient::set_enabled`] turns it on.
	pub fn disabled(mut self) -> Self {
		self.enabled = false;
		self
	}

	/// Builds the client. Configuration errors (invalid endpoint, zero
	/// flush interval) fail this call only; nothing is started.
	pub fn build(self) -> Result<TelemetryClient> {
		if self.config.flush_interval.is_zero() {
			return Err(TelemetryError::InvalidFlushInterval);
		}

		let platform = self
			.platform
			.unwrap_or_else(|| std::env::consts::OS.to_string());

		let transport = match self.transport {
			Some(transport) => transport,
			None => {
				let endpoint = endpoint::resolve_endpoint(self.endpoint.as_deref())?;
				Arc::new(HttpTransport::new(
					endpoint,
					self.api_key,
					self.config.request_timeout,
					&platform,
				)?) as Arc<dyn BatchTransport>
			}
		};

		let device_info = self
			.device_info
			.unwrap_or_else(|| Arc::new(StaticDeviceInfo::detect()));

		let buffer = Arc::new(ActionBuffer::new(self.config.max_retries));
		let session = Arc::new(SessionState::new());
		let scheduler = Arc::new(FlushScheduler::new(
			Arc::clone(&buffer),
			transport,
			device_info,
			Arc::clone(&session),
			self.config.flush_interval,
			self.config.keep_synced_limit,
		));

		let inner = Arc::new(ClientInner {
			buffer,
			global_properties: GlobalProperties::new(),
			session,
			scheduler,
			app_version: self.app_version.unwrap_or_else(|| "unknown".to_string()),
			enabled: AtomicBool::new(self.enabled),
			tracking_stopped: AtomicBool::new(false),
			closed: AtomicBool::new(false),
		});

		info!(session_id = %inner.session.session_id(), "telemetry client initialized");

		Ok(TelemetryClient { inner })
	}

	/// Builds the client and starts the flush scheduler.
	pub fn build_and_start(self) -> Result<TelemetryClient> {
		let client = self.build()?;
		client.start();
		Ok(client)
	}
}

impl Default for TelemetryClientBuilder {
	fn default() -> Self {
		Self::new()
	}
}

struct ClientInner {
	buffer: Arc<ActionBuffer>,
	global_properties: GlobalProperties,
	session: Arc<SessionState>,
	scheduler: Arc<FlushScheduler>,
	app_version: String,
	enabled: AtomicBool,
	tracking_stopped: AtomicBool,
	closed: AtomicBool,
}

/// Client for recording user actions and uploading them in batches.
///
/// Recording is fire-and-forget: `track_*` calls touch only the in-memory
/// buffer and return immediately, regardless of network state. A background
/// scheduler drains the buffer on an interval; [`TelemetryClient::flush`]
/// runs the same pipeline on demand.
///
/// # Example
///
/// ```ignore
/// use loom_telemetry::TelemetryClient;
///
/// let client = TelemetryClient::builder()
///     .api_key("key_xxx")
///     .app_version(env!("CARGO_PKG_VERSION"))
///     .build_and_start()?;
///
/// client.track_screen_view("Checkout")?;
/// client.track_button_tap("Checkout", "buy_now")?;
///
/// // Uploads happen on the schedule; force one if needed:
/// client.flush().await;
///
/// client.shutdown().await;
/// ```
#[derive(Clone)]
pub struct TelemetryClient {
	inner: Arc<ClientInner>,
}

impl TelemetryClient {
	/// Creates a new builder for constructing a client.
	pub fn builder() -> TelemetryClientBuilder {
		TelemetryClientBuilder::new()
	}

	/// Starts the background flush scheduler. Idempotent.
	pub fn start(&self) {
		if self.inner.closed.load(Ordering::SeqCst) {
			return;
		}
		self.inner.scheduler.start();
	}

	/// Records a screen becoming visible.
	pub fn track_screen_view(&self, screen_name: &str) -> Result<Option<ActionId>> {
		require_non_empty(screen_name, "screen name")?;
		self.record(
			ActionType::ScreenView,
			Some(screen_name),
			None,
			None,
			Map::new(),
		)
	}

	/// Records a button (or other tappable element) activation.
	pub fn track_button_tap(&self, screen_name: &str, element_id: &str) -> Result<Option<ActionId>> {
		require_non_empty(screen_name, "screen name")?;
		require_non_empty(element_id, "element id")?;
		self.record(
			ActionType::ButtonTap,
			Some(screen_name),
			Some(element_id),
			Some("button"),
			Map::new(),
		)
	}

	/// Records text entry into a field. Only the input length is recorded,
	/// never the text itself.
	pub fn track_text_input(
		&self,
		screen_name: &str,
		element_id: &str,
		input_length: usize,
	) -> Result<Option<ActionId>> {
		require_non_empty(screen_name, "screen name")?;
		require_non_empty(element_id, "element id")?;
		let mut properties = Map::new();
		properties.insert("input_length".to_string(), input_length.into());
		self.record(
			ActionType::TextInput,
			Some(screen_name),
			Some(element_id),
			Some("text_field"),
			properties,
		)
	}

	/// Records navigation from one screen to another.
	pub fn track_navigation(&self, from_screen: &str, to_screen: &str) -> Result<Option<ActionId>> {
		require_non_empty(from_screen, "from screen")?;
		require_non_empty(to_screen, "to screen")?;
		let mut properties = Map::new();
		properties.insert("from_screen".to_string(), from_screen.into());
		properties.insert("to_screen".to_string(), to_screen.into());
		self.record(
			ActionType::Navigation,
			Some(to_screen),
			None,
			None,
			properties,
		)
	}

	/// Records a search. Only the query length is recorded, never the query.
	pub fn track_search(&self, screen_name: &str, query_length: usize) -> Result<Option<ActionId>> {
		require_non_empty(screen_name, "screen name")?;
		let mut properties = Map::new();
		properties.insert("query_length".to_string(), query_length.into());
		self.record(ActionType::Search, Some(screen_name), None, None, properties)
	}

	/// Records a host-application-defined event.
	pub fn track_custom(
		&self,
		event_name: &str,
		properties: Map<String, Value>,
	) -> Result<Option<ActionId>> {
		require_non_empty(event_name, "event name")?;
		let mut properties = properties;
		properties.insert("event_name".to_string(), event_name.into());
		self.record(ActionType::Custom, None, None, None, properties)
	}

	/// Records a revenue event.
	pub fn track_revenue(
		&self,
		product_id: &str,
		amount: f64,
		currency: &str,
	) -> Result<Option<ActionId>> {
		require_non_empty(product_id, "product id")?;
		require_non_empty(currency, "currency")?;
		require_valid_amount(amount)?;
		let mut properties = Map::new();
		properties.insert("product_id".to_string(), product_id.into());
		properties.insert("amount".to_string(), amount.into());
		properties.insert("currency".to_string(), currency.into());
		self.record(ActionType::Revenue, None, None, None, properties)
	}

	/// Records an in-app purchase.
	pub fn track_iap(
		&self,
		product_id: &str,
		amount: f64,
		currency: &str,
		quantity: u32,
	) -> Result<Option<ActionId>> {
		require_non_empty(product_id, "product id")?;
		require_non_empty(currency, "currency")?;
		require_valid_amount(amount)?;
		let mut properties = Map::new();
		properties.insert("product_id".to_string(), product_id.into());
		properties.insert("amount".to_string(), amount.into());
		properties.insert("currency".to_string(), currency.into());
		properties.insert("quantity".to_string(), quantity.into());
		self.record(ActionType::Iap, None, None, None, properties)
	}

	/// Starts a chained recorder for call sites the typed helpers don't
	/// cover.
	///
	/// ```ignore
	/// client.action(ActionType::Custom)
	///     .screen_name("Settings")
	///     .property("toggle", "dark_mode")
	///     .record()?;
	/// ```
	pub fn action(&self, action_type: ActionType) -> ActionRecorder<'_> {
		ActionRecorder {
			client: self,
			action_type,
			screen_name: None,
			element_id: None,
			element_type: None,
			properties: Map::new(),
		}
	}

	/// The record primitive behind every `track_*` helper.
	///
	/// Returns `Ok(None)` without recording when tracking is disabled,
	/// stopped, or shut down; telemetry gating is never an error for the
	/// caller. No network I/O happens on this path.
	fn record(
		&self,
		action_type: ActionType,
		screen_name: Option<&str>,
		element_id: Option<&str>,
		element_type: Option<&str>,
		properties: Map<String, Value>,
	) -> Result<Option<ActionId>> {
		if !self.is_recording() {
			debug!(action_type = %action_type, "action dropped, tracking is off");
			return Ok(None);
		}

		// Global properties merged once, at record time; caller keys win.
		let mut merged = self.inner.global_properties.all();
		for (key, value) in properties {
			merged.insert(key, value);
		}

		let identity = self.inner.session.snapshot();
		let mut action = UserAction::new(action_type, identity.session_id)
			.with_versions(self.inner.app_version.clone(), SDK_VERSION)
			.with_properties(merged);
		action.user_id = identity.user_id;
		if let Some(screen_name) = screen_name {
			action = action.with_screen_name(screen_name);
		}
		action.element_id = element_id.map(str::to_string);
		action.element_type = element_type.map(str::to_string);

		let id = action.id;
		self.inner.buffer.append(action);
		Ok(Some(id))
	}

	fn is_recording(&self) -> bool {
		self.inner.enabled.load(Ordering::SeqCst)
			&& !self.inner.tracking_stopped.load(Ordering::SeqCst)
			&& !self.inner.closed.load(Ordering::SeqCst)
	}

	/// Flushes eligible actions now, out of band. Transport failure shows
	/// up in the returned outcome and in statistics, never as an error.
	pub async fn flush(&self) -> FlushOutcome {
		if self.inner.closed.load(Ordering::SeqCst) {
			return FlushOutcome::Skipped;
		}
		self.inner.scheduler.flush_now(FlushReason::Manual).await
	}

	/// Enables or disables recording. Disabling only gates new records:
	/// already-buffered actions continue to flush.
	pub fn set_enabled(&self, enabled: bool) {
		self.inner.enabled.store(enabled, Ordering::SeqCst);
	}

	pub fn is_enabled(&self) -> bool {
		self.inner.enabled.load(Ordering::SeqCst)
	}

	/// Stops all tracking: gates recording and halts the flush scheduler,
	/// letting any in-flight flush finish.
	pub async fn stop_all_tracking(&self) {
		self.inner.tracking_stopped.store(true, Ordering::SeqCst);
		self.inner.scheduler.stop().await;
		info!("all tracking stopped");
	}

	/// Resumes tracking and restarts the flush scheduler.
	pub fn resume_all_tracking(&self) {
		if self.inner.closed.load(Ordering::SeqCst) {
			return;
		}
		self.inner.tracking_stopped.store(false, Ordering::SeqCst);
		self.inner.scheduler.start();
		info!("tracking resumed");
	}

	/// Sets the user id stamped on actions recorded from now on. Earlier
	/// records keep the identity they were recorded under.
	pub fn set_user_id(&self, user_id: Option<String>) {
		self.inner.session.set_user_id(user_id);
	}

	pub fn user_id(&self) -> Option<String> {
		self.inner.session.user_id()
	}

	pub fn session_id(&self) -> &str {
		self.inner.session.session_id()
	}

	/// Sync-state counts for the buffer.
	pub fn statistics(&self) -> BufferStatistics {
		self.inner.buffer.statistics()
	}

	/// Unsynced actions in insertion order, optionally capped, for
	/// host-driven sync pipelines.
	pub fn unsynced_actions(&self, limit: Option<usize>) -> Vec<UserAction> {
		self.inner.buffer.unsynced(limit)
	}

	/// Acknowledges host-synced actions. Idempotent; returns how many
	/// actions newly flipped to synced.
	pub fn mark_actions_synced(&self, ids: &[ActionId]) -> usize {
		self.inner.buffer.mark_synced(ids)
	}

	/// Deletes all buffered actions, synced or not. Irreversible. Returns
	/// the number of actions dropped.
	pub fn purge_all(&self) -> usize {
		let dropped = self.inner.buffer.purge_all();
		info!(dropped, "telemetry buffer purged");
		dropped
	}

	/// Sets a global property attached to all actions recorded from now
	/// on. With `override_existing` false an existing key is left untouched
	/// and the call returns false.
	pub fn set_global_property(
		&self,
		key: impl Into<String>,
		value: impl Into<Value>,
		override_existing: bool,
	) -> bool {
		self.inner.global_properties.set(key, value, override_existing)
	}

	/// Removes a global property.
	pub fn unset_global_property(&self, key: &str) {
		self.inner.global_properties.unset(key);
	}

	/// Snapshot copy of the global properties.
	pub fn global_properties(&self) -> Map<String, Value> {
		self.inner.global_properties.all()
	}

	/// Removes all global properties.
	pub fn clear_global_properties(&self) {
		self.inner.global_properties.clear();
	}

	/// Shuts the client down: halts the scheduler and runs one final
	/// flush. Returns the final flush outcome. Double shutdown is Ok.
	pub async fn shutdown(&self) -> FlushOutcome {
		if self.inner.closed.swap(true, Ordering::SeqCst) {
			return FlushOutcome::Skipped;
		}
		self.inner.scheduler.stop().await;
		let outcome = self.inner.scheduler.flush_now(FlushReason::Shutdown).await;
		info!("telemetry client shut down");
		outcome
	}

	/// Returns true if the client has been shut down.
	pub fn is_closed(&self) -> bool {
		self.inner.closed.load(Ordering::SeqCst)
	}
}

/// Chained recorder returned by [`TelemetryClient::action`].
pub struct ActionRecorder<'a> {
	client: &'a TelemetryClient,
	action_type: ActionType,
	screen_name: Option<String>,
	element_id: Option<String>,
	element_type: Option<String>,
	properties: Map<String, Value>,
}

impl ActionRecorder<'_> {
	pub fn screen_name(mut self, screen_name: impl Into<String>) -> Self {
		self.screen_name = Some(screen_name.into());
		self
	}

	pub fn element_id(mut self, element_id: impl Into<String>) -> Self {
		self.element_id = Some(element_id.into());
		self
	}

	pub fn element_type(mut self, element_type: impl Into<String>) -> Self {
		self.element_type = Some(element_type.into());
		self
	}

	pub fn property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.properties.insert(key.into(), value.into());
		self
	}

	/// Records the action. Same gating and merge semantics as the typed
	/// `track_*` helpers.
	pub fn record(self) -> Result<Option<ActionId>> {
		self.client.record(
			self.action_type,
			self.screen_name.as_deref(),
			self.element_id.as_deref(),
			self.element_type.as_deref(),
			self.properties,
		)
	}
}

fn require_non_empty(value: &str, field: &str) -> Result<()> {
	if value.trim().is_empty() {
		return Err(TelemetryError::ValidationFailed(format!(
			"{field} must not be empty"
		)));
	}
	Ok(())
}

fn require_valid_amount(amount: f64) -> Result<()> {
	if !amount.is_finite() || amount < 0.0 {
		return Err(TelemetryError::ValidationFailed(
			"amount must be a non-negative finite number".to_string(),
		));
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use loom_telemetry_core::ActionBatch;
	use std::sync::Mutex;

	struct RecordingTransport {
		sent: Mutex<Vec<ActionBatch>>,
	}

	impl RecordingTransport {
		fn new() -> Arc<Self> {
			Arc::new(Self {
				sent: Mutex::new(Vec::new()),
			})
		}

		fn sent_batches(&self) -> Vec<ActionBatch> {
			self.sent.lock().unwrap().clone()
		}
	}

	#[async_trait]
	impl BatchTransport for RecordingTransport {
		async fn send(&self, batch: &ActionBatch) -> Result<()> {
			self.sent.lock().unwrap().push(batch.clone());
			Ok(())
		}
	}

	fn test_client(transport: Arc<RecordingTransport>) -> TelemetryClient {
		TelemetryClient::builder()
			.transport(transport)
			.app_version("1.2.3")
			.build()
			.unwrap()
	}

	#[test]
	fn test_build_with_default_endpoint() {
		let client = TelemetryClient::builder().build();
		assert!(client.is_ok());
	}

	#[test]
	fn test_build_rejects_invalid_endpoint() {
		let result = TelemetryClient::builder().endpoint("not a url").build();
		assert!(matches!(result, Err(TelemetryError::InvalidEndpoint(_))));
	}

	#[test]
	fn test_build_rejects_zero_flush_interval() {
		let result = TelemetryClient::builder()
			.flush_interval(Duration::ZERO)
			.build();
		assert!(matches!(result, Err(TelemetryError::InvalidFlushInterval)));
	}

	#[test]
	fn test_recording_appends_to_buffer() {
		let client = test_client(RecordingTransport::new());

		let id = client.track_screen_view("Home").unwrap();
		assert!(id.is_some());

		let stats = client.statistics();
		assert_eq!(stats.total, 1);
		assert_eq!(stats.unsynced, 1);
	}

	#[test]
	fn test_disabled_client_drops_silently() {
		let client = test_client(RecordingTransport::new());
		client.set_enabled(false);

		let id = client.track_screen_view("Home").unwrap();
		assert!(id.is_none());
		assert!(client.statistics().is_empty());

		client.set_enabled(true);
		assert!(client.track_screen_view("Home").unwrap().is_some());
	}

	#[test]
	fn test_validation_fails_loudly_even_when_gated() {
		let client = test_client(RecordingTransport::new());
		client.set_enabled(false);

		// A programming error at the call site surfaces regardless of gates.
		assert!(matches!(
			client.track_screen_view("  "),
			Err(TelemetryError::ValidationFailed(_))
		));
	}

	#[test]
	fn test_validation_errors() {
		let client = test_client(RecordingTransport::new());

		assert!(client.track_button_tap("Home", "").is_err());
		assert!(client.track_navigation("", "Detail").is_err());
		assert!(client.track_custom("", Map::new()).is_err());
		assert!(client.track_revenue("sku_1", f64::NAN, "USD").is_err());
		assert!(client.track_revenue("sku_1", -1.0, "USD").is_err());
		assert!(client.track_iap("sku_1", 0.99, "", 1).is_err());
	}

	#[test]
	fn test_global_properties_merge_with_caller_winning() {
		let client = test_client(RecordingTransport::new());
		client.set_global_property("env", "staging", true);
		client.set_global_property("region", "eu", true);

		client
			.action(ActionType::Custom)
			.property("env", "prod")
			.record()
			.unwrap();

		let actions = client.unsynced_actions(None);
		assert_eq!(actions[0].properties["env"], "prod");
		assert_eq!(actions[0].properties["region"], "eu");
	}

	#[test]
	fn test_global_property_changes_do_not_rewrite_stored_records() {
		let client = test_client(RecordingTransport::new());
		client.set_global_property("env", "staging", true);
		client.track_screen_view("Home").unwrap();

		client.set_global_property("env", "prod", true);

		let actions = client.unsynced_actions(None);
		assert_eq!(actions[0].properties["env"], "staging");
	}

	#[test]
	fn test_global_property_override_protection() {
		let client = test_client(RecordingTransport::new());
		assert!(client.set_global_property("k", "v1", true));
		assert!(!client.set_global_property("k", "v2", false));
		assert_eq!(client.global_properties()["k"], "v1");
	}

	#[test]
	fn test_identity_is_snapshot_at_record_time() {
		let client = test_client(RecordingTransport::new());

		client.track_screen_view("Home").unwrap();
		client.set_user_id(Some("user-1".to_string()));
		client.track_screen_view("Detail").unwrap();

		let actions = client.unsynced_actions(None);
		assert_eq!(actions[0].user_id, None);
		assert_eq!(actions[1].user_id, Some("user-1".to_string()));
		assert_eq!(actions[0].session_id, client.session_id());
	}

	#[test]
	fn test_text_input_records_length_not_content() {
		let client = test_client(RecordingTransport::new());
		client
			.track_text_input("Login", "password_field", 16)
			.unwrap();

		let actions = client.unsynced_actions(None);
		assert_eq!(actions[0].properties["input_length"], 16);
		assert_eq!(actions[0].properties.len(), 1);
		assert_eq!(actions[0].element_type.as_deref(), Some("text_field"));
	}

	#[test]
	fn test_versions_are_stamped() {
		let client = test_client(RecordingTransport::new());
		client.track_screen_view("Home").unwrap();

		let actions = client.unsynced_actions(None);
		assert_eq!(actions[0].app_version, "1.2.3");
		assert_eq!(actions[0].sdk_version, SDK_VERSION);
	}

	#[test]
	fn test_mark_actions_synced_is_idempotent() {
		let client = test_client(RecordingTransport::new());
		let id = client.track_screen_view("Home").unwrap().unwrap();

		assert_eq!(client.mark_actions_synced(&[id]), 1);
		assert_eq!(client.mark_actions_synced(&[id]), 0);
		assert_eq!(client.statistics().synced, 1);
	}

	#[test]
	fn test_purge_all_zeros_statistics() {
		let client = test_client(RecordingTransport::new());
		for _ in 0..5 {
			client.track_screen_view("Home").unwrap();
		}
		let ids: Vec<_> = client
			.unsynced_actions(Some(2))
			.iter()
			.map(|a| a.id)
			.collect();
		client.mark_actions_synced(&ids);

		assert_eq!(client.purge_all(), 5);
		assert!(client.statistics().is_empty());
	}

	#[tokio::test]
	async fn test_flush_drains_buffer() {
		let transport = RecordingTransport::new();
		let client = test_client(Arc::clone(&transport));

		for i in 0..3 {
			client.track_screen_view(&format!("S{i}")).unwrap();
		}

		assert_eq!(client.flush().await, FlushOutcome::Sent(3));
		assert_eq!(client.statistics().synced, 3);

		let batches = transport.sent_batches();
		assert_eq!(batches.len(), 1);
		assert_eq!(batches[0].batch_info.flush_reason, FlushReason::Manual);
	}

	#[tokio::test]
	async fn test_stop_and_resume_tracking() {
		let client = test_client(RecordingTransport::new());
		client.start();

		client.stop_all_tracking().await;
		assert!(client.track_screen_view("Home").unwrap().is_none());

		client.resume_all_tracking();
		assert!(client.track_screen_view("Home").unwrap().is_some());

		client.shutdown().await;
	}

	#[tokio::test]
	async fn test_shutdown_runs_final_flush_and_gates_recording() {
		let transport = RecordingTransport::new();
		let client = test_client(Arc::clone(&transport));
		client.track_screen_view("Home").unwrap();

		let outcome = client.shutdown().await;
		assert_eq!(outcome, FlushOutcome::Sent(1));
		assert!(client.is_closed());

		let batches = transport.sent_batches();
		assert_eq!(batches[0].batch_info.flush_reason, FlushReason::Shutdown);

		// Recording and flushing are gated after shutdown.
		assert!(client.track_screen_view("Home").unwrap().is_none());
		assert_eq!(client.flush().await, FlushOutcome::Skipped);
	}

	#[tokio::test]
	async fn test_double_shutdown_is_ok() {
		let client = test_client(RecordingTransport::new());
		client.shutdown().await;
		assert_eq!(client.shutdown().await, FlushOutcome::Skipped);
	}
}
