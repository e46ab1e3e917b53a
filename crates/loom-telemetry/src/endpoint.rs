// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Collection endpoint resolution and validation.
//!
//! Precedence, highest first: the `LOOM_TELEMETRY_ENDPOINT` environment
//! override, the caller-supplied URL (accepted base64-encoded, detected by
//! prefix and decoded), then the built-in default. Local/dev hosts and
//! known tunnel-service domains are accepted for non-production testing;
//! anything else must be a well-formed multi-label hostname.

use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::Url;
use tracing::debug;

use crate::error::{Result, TelemetryError};

/// Built-in default collection endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://loom.ghuntley.com/api/telemetry/batch";

/// Environment variable overriding any configured endpoint.
pub const ENDPOINT_ENV_VAR: &str = "LOOM_TELEMETRY_ENDPOINT";

/// Base64 of `http`, the marker for an encoded endpoint value.
const BASE64_URL_PREFIX: &str = "aHR0c";

/// Tunnel-service domains accepted without a production hostname check.
const TUNNEL_DOMAINS: &[&str] = &[
	"ngrok.io",
	"ngrok-free.app",
	"trycloudflare.com",
	"loca.lt",
	"serveo.net",
];

/// Resolves the collection endpoint from the environment, the configured
/// value, or the default, and validates it.
pub fn resolve_endpoint(configured: Option<&str>) -> Result<String> {
	let env_override = std::env::var(ENDPOINT_ENV_VAR).ok();
	resolve_from(env_override.as_deref(), configured)
}

fn resolve_from(env_override: Option<&str>, configured: Option<&str>) -> Result<String> {
	let raw = env_override.or(configured).unwrap_or(DEFAULT_ENDPOINT);
	let endpoint = decode_if_base64(raw);
	validate_endpoint(&endpoint)?;
	Ok(endpoint)
}

/// Decodes a base64-encoded endpoint value, detected by prefix. A value
/// that carries the prefix but fails to decode is returned unchanged and
/// left to validation.
fn decode_if_base64(raw: &str) -> String {
	if !raw.starts_with(BASE64_URL_PREFIX) {
		return raw.to_string();
	}
	match STANDARD
		.decode(raw)
		.ok()
		.and_then(|bytes| String::from_utf8(bytes).ok())
	{
		Some(decoded) => {
			debug!("decoded base64 endpoint override");
			decoded
		}
		None => raw.to_string(),
	}
}

/// Validates an endpoint URL against the acceptance policy.
pub fn validate_endpoint(endpoint: &str) -> Result<()> {
	let url = Url::parse(endpoint)
		.map_err(|e| TelemetryError::InvalidEndpoint(format!("{endpoint}: {e}")))?;

	match url.scheme() {
		"http" | "https" => {}
		other => {
			return Err(TelemetryError::InvalidEndpoint(format!(
				"unsupported scheme: {other}"
			)));
		}
	}

	let host = url
		.host_str()
		.ok_or_else(|| TelemetryError::InvalidEndpoint("missing host".to_string()))?;

	if is_local_host(host) || is_tunnel_host(host) || is_well_formed_hostname(host) {
		Ok(())
	} else {
		Err(TelemetryError::InvalidEndpoint(format!(
			"host not allowed: {host}"
		)))
	}
}

/// Loopback addresses, `.local` names, and the Android emulator host
/// gateway, accepted for development.
fn is_local_host(host: &str) -> bool {
	matches!(host, "localhost" | "127.0.0.1" | "[::1]" | "0.0.0.0" | "10.0.2.2")
		|| host.ends_with(".local")
}

fn is_tunnel_host(host: &str) -> bool {
	TUNNEL_DOMAINS
		.iter()
		.any(|domain| host == *domain || host.ends_with(&format!(".{domain}")))
}

/// A multi-label hostname: at least two non-empty labels of alphanumerics
/// and interior hyphens.
fn is_well_formed_hostname(host: &str) -> bool {
	let labels: Vec<&str> = host.split('.').collect();
	if labels.len() < 2 {
		return false;
	}
	labels.iter().all(|label| {
		!label.is_empty()
			&& label.len() <= 63
			&& !label.starts_with('-')
			&& !label.ends_with('-')
			&& label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_endpoint_when_nothing_configured() {
		let endpoint = resolve_from(None, None).unwrap();
		assert_eq!(endpoint, DEFAULT_ENDPOINT);
	}

	#[test]
	fn test_configured_endpoint_beats_default() {
		let endpoint = resolve_from(None, Some("https://collect.example.com/v1")).unwrap();
		assert_eq!(endpoint, "https://collect.example.com/v1");
	}

	#[test]
	fn test_env_override_beats_configured() {
		let endpoint = resolve_from(
			Some("https://env.example.com/batch"),
			Some("https://collect.example.com/v1"),
		)
		.unwrap();
		assert_eq!(endpoint, "https://env.example.com/batch");
	}

	#[test]
	fn test_base64_endpoint_is_decoded() {
		let encoded = STANDARD.encode("https://collect.example.com/v1");
		assert!(encoded.starts_with(BASE64_URL_PREFIX));

		let endpoint = resolve_from(None, Some(&encoded)).unwrap();
		assert_eq!(endpoint, "https://collect.example.com/v1");
	}

	#[test]
	fn test_plain_url_is_not_decoded() {
		let endpoint = resolve_from(None, Some("http://localhost:8080/batch")).unwrap();
		assert_eq!(endpoint, "http://localhost:8080/batch");
	}

	#[test]
	fn test_local_hosts_accepted() {
		for url in [
			"http://localhost:8080/batch",
			"http://127.0.0.1:3000/batch",
			"http://10.0.2.2:8080/batch",
			"http://collector.local/batch",
		] {
			assert!(validate_endpoint(url).is_ok(), "{url} should be accepted");
		}
	}

	#[test]
	fn test_tunnel_hosts_accepted() {
		for url in [
			"https://abc123.ngrok.io/batch",
			"https://demo.ngrok-free.app/batch",
			"https://blue-fox.trycloudflare.com/batch",
			"https://myapp.loca.lt/batch",
		] {
			assert!(validate_endpoint(url).is_ok(), "{url} should be accepted");
		}
	}

	#[test]
	fn test_multi_label_hostnames_accepted() {
		assert!(validate_endpoint("https://collect.example.com/v1").is_ok());
		assert!(validate_endpoint("https://a-b.example-site.io/x").is_ok());
	}

	#[test]
	fn test_rejects_bad_schemes() {
		assert!(matches!(
			validate_endpoint("ftp://collect.example.com/v1"),
			Err(TelemetryError::InvalidEndpoint(_))
		));
		assert!(matches!(
			validate_endpoint("file:///tmp/batch"),
			Err(TelemetryError::InvalidEndpoint(_))
		));
	}

	#[test]
	fn test_rejects_single_label_hosts() {
		assert!(validate_endpoint("https://collector/batch").is_err());
	}

	#[test]
	fn test_rejects_garbage() {
		assert!(validate_endpoint("not a url").is_err());
		assert!(validate_endpoint("https://bad_host$.example.com/x").is_err());
		assert!(validate_endpoint("").is_err());
	}

	#[test]
	fn test_undecodable_prefixed_value_is_rejected() {
		// Carries the marker prefix but is not valid base64 or a valid URL.
		assert!(resolve_from(None, Some("aHR0c!!!notbase64")).is_err());
	}
}
