// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Example: Record user actions and flush them using the loom-telemetry SDK.
//!
//! Run with:
//!   cargo run --example track -p loom-telemetry

use loom_telemetry::{ActionType, TelemetryClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	// Configure from environment or use defaults for testing
	let endpoint = std::env::var("LOOM_TELEMETRY_ENDPOINT")
		.unwrap_or_else(|_| "http://localhost:8080/api/telemetry/batch".to_string());
	let api_key = std::env::var("LOOM_API_KEY").ok();

	println!("Initializing telemetry client...");
	println!("  Endpoint: {}", endpoint);

	// Build the client and start the background flush scheduler
	let mut builder = TelemetryClient::builder()
		.endpoint(&endpoint)
		.app_version("0.1.0-example")
		.flush_interval(std::time::Duration::from_secs(5));
	if let Some(api_key) = api_key {
		builder = builder.api_key(api_key);
	}
	let client = builder.build_and_start()?;

	// Properties attached to every action recorded from here on
	client.set_global_property("environment", "development", true);
	client.set_global_property("experiment", "onboarding_v2", true);

	client.set_user_id(Some("user_example_123".to_string()));

	// Record a typical interaction sequence
	println!("\nRecording actions...");
	client.track_screen_view("Home")?;
	client.track_button_tap("Home", "get_started")?;
	client.track_navigation("Home", "Catalog")?;
	client.track_search("Catalog", 12)?;
	client.track_text_input("Signup", "email_field", 24)?;

	// Anything the typed helpers don't cover goes through the recorder
	client
		.action(ActionType::Custom)
		.screen_name("Settings")
		.property("event_name", "toggle_theme")
		.property("theme", "dark")
		.record()?;

	client.track_iap("premium_monthly", 9.99, "USD", 1)?;

	let stats = client.statistics();
	println!("  Buffered: {} ({} unsynced)", stats.total, stats.unsynced);

	// Force an immediate flush instead of waiting for the scheduler
	println!("\nFlushing...");
	let outcome = client.flush().await;
	println!("  Outcome: {:?}", outcome);

	let stats = client.statistics();
	println!(
		"  Synced: {}, unsynced: {}, failed: {}",
		stats.synced, stats.unsynced, stats.failed
	);

	client.shutdown().await;
	println!("\nDone.");
	Ok(())
}
