// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// Transport-level timeout applied unless the caller picks another one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Returns a builder preconfigured with the socialauth User-Agent and
/// [`DEFAULT_TIMEOUT`].
///
/// ```ignore
/// let client = socialauth_common_http::builder()
///     .connect_timeout(Duration::from_secs(5))
///     .build()?;
/// ```
pub fn builder() -> ClientBuilder {
	Client::builder()
		.user_agent(user_agent())
		.timeout(DEFAULT_TIMEOUT)
}

/// Builds a client with the standard settings.
///
/// # Errors
///
/// Fails only if the TLS backend cannot be initialised.
pub fn new_client() -> reqwest::Result<Client> {
	tracing::debug!(
		timeout_ms = DEFAULT_TIMEOUT.as_millis() as u64,
		"building HTTP client"
	);
	builder().build()
}

/// `socialauth/{crate version}`
pub fn user_agent() -> String {
	format!("socialauth/{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn user_agent_has_product_and_version() {
		let ua = user_agent();
		let parts: Vec<&str> = ua.split('/').collect();
		assert_eq!(parts.len(), 2);
		assert_eq!(parts[0], "socialauth");
		assert_eq!(parts[1], env!("CARGO_PKG_VERSION"));
	}

	#[test]
	fn client_builds() {
		assert!(new_client().is_ok());
	}
}
