// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error taxonomy for provider configuration and the login flow.

use std::path::PathBuf;

/// Errors raised while loading or validating provider configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	/// A key the provider declared as required is absent or empty.
	#[error("missing configuration for provider {provider}: {key}")]
	MissingConfiguration { provider: String, key: String },

	#[error("invalid value for {key}: {message}")]
	InvalidValue { key: String, message: String },

	#[error("failed to parse TOML config at {path}: {source}")]
	TomlParse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("failed to read config file {path}: {source}")]
	FileRead {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("validation error: {0}")]
	Validation(String),
}

/// Errors surfaced by a single authentication attempt.
///
/// Nothing here is retried or recovered; the attempt is aborted and the error
/// is handed back to the caller as-is.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
	/// Transport failure or non-success status from the identity provider.
	#[error("upstream HTTP error{}: {message}", status_suffix(.status))]
	UpstreamHttp { status: Option<u16>, message: String },

	/// The provider answered with a body that is not the JSON we expected.
	#[error("malformed response: {0}")]
	MalformedResponse(String),

	/// The provider rejected the request with an OAuth error object.
	#[error("provider rejected request: {}", .description.as_deref().unwrap_or(.error.as_str()))]
	Rejected {
		error: String,
		description: Option<String>,
	},

	/// The `state` returned on the callback does not match the one issued.
	#[error("OAuth state mismatch")]
	InvalidState,

	/// A URL composed from configuration could not be parsed.
	#[error("invalid URL: {0}")]
	InvalidUrl(#[from] url::ParseError),

	#[error("unknown provider: {0}")]
	UnknownProvider(String),

	#[error(transparent)]
	Config(#[from] ConfigError),
}

fn status_suffix(status: &Option<u16>) -> String {
	status.map(|s| format!(" (status {s})")).unwrap_or_default()
}

impl From<reqwest::Error> for ProviderError {
	fn from(e: reqwest::Error) -> Self {
		ProviderError::UpstreamHttp {
			status: e.status().map(|s| s.as_u16()),
			message: e.to_string(),
		}
	}
}

/// Longest upstream body kept in an error message, in bytes.
pub const BODY_EXCERPT_LIMIT: usize = 512;

/// Lossy UTF-8 rendering of an upstream body, cut to
/// [`BODY_EXCERPT_LIMIT`] bytes on a char boundary.
pub fn body_excerpt(body: &[u8]) -> String {
	let text = String::from_utf8_lossy(body);
	if text.len() <= BODY_EXCERPT_LIMIT {
		return text.into_owned();
	}
	let mut end = BODY_EXCERPT_LIMIT;
	while !text.is_char_boundary(end) {
		end -= 1;
	}
	format!("{}... ({} bytes total)", &text[..end], body.len())
}

impl ProviderError {
	/// [`ProviderError::UpstreamHttp`] for a non-success response, carrying
	/// an excerpt of its body.
	pub fn upstream_status(status: u16, context: &str, body: &[u8]) -> Self {
		ProviderError::UpstreamHttp {
			status: Some(status),
			message: format!("{context}: {}", body_excerpt(body)),
		}
	}

	/// True for [`ProviderError::Config`] wrapping a missing required key.
	pub fn is_missing_configuration(&self) -> bool {
		matches!(
			self,
			ProviderError::Config(ConfigError::MissingConfiguration { .. })
		)
	}
}
