// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Layered provider configuration.
//!
//! Each provider is configured from, in increasing precedence:
//!
//! 1. Built-in defaults
//! 2. A TOML file (`[providers.<name>]` table)
//! 3. Environment variables (`SOCIALAUTH_<NAME>_<KEY>`)
//!
//! ```toml
//! [providers.okta]
//! client_id = "0oa1b2c3"
//! redirect_uri = "https://app.example.com/auth/okta/callback"
//! base_url = "https://acme.okta.com"
//! auth_server_id = "default"
//! ```
//!
//! Besides the standard client credentials, a provider declares the extra
//! keys it reads via [`crate::ConfigurableProvider::additional_config_keys`].
//! Required keys are checked when the layers are finalized.

pub mod layer;
pub mod sources;

pub use layer::ProviderConfigLayer;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use socialauth_common_secret::SecretString;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::debug;

use crate::error::ConfigError;
use crate::token::TokenAuthMethod;

/// Default location of the TOML config file.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/socialauth/providers.toml";

/// A provider-specific configuration key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigKey {
	pub name: &'static str,
	pub required: bool,
}

impl ConfigKey {
	pub const fn required(name: &'static str) -> Self {
		Self {
			name,
			required: true,
		}
	}

	pub const fn optional(name: &'static str) -> Self {
		Self {
			name,
			required: false,
		}
	}
}

/// Validated configuration for one provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
	pub client_id: String,
	pub client_secret: SecretString,
	pub redirect_uri: String,
	/// Overrides the adapter's default scopes when set.
	pub scopes: Option<Vec<String>>,
	pub token_auth_method: TokenAuthMethod,
	additional: BTreeMap<String, String>,
}

impl ProviderConfig {
	pub fn new(
		client_id: impl Into<String>,
		client_secret: impl Into<SecretString>,
		redirect_uri: impl Into<String>,
	) -> Self {
		Self {
			client_id: client_id.into(),
			client_secret: client_secret.into(),
			redirect_uri: redirect_uri.into(),
			scopes: None,
			token_auth_method: TokenAuthMethod::default(),
			additional: BTreeMap::new(),
		}
	}

	/// Set a provider-specific key.
	pub fn with_additional(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.additional.insert(key.into(), value.into());
		self
	}

	pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.scopes = Some(scopes.into_iter().map(Into::into).collect());
		self
	}

	pub fn with_token_auth_method(mut self, method: TokenAuthMethod) -> Self {
		self.token_auth_method = method;
		self
	}

	/// A provider-specific value; empty strings count as absent.
	pub fn get(&self, key: &str) -> Option<&str> {
		self
			.additional
			.get(key)
			.map(String::as_str)
			.filter(|v| !v.is_empty())
	}

	/// Like [`ProviderConfig::get`] but fails with
	/// [`ConfigError::MissingConfiguration`].
	pub fn require(&self, provider: &str, key: &str) -> Result<&str, ConfigError> {
		self.get(key).ok_or_else(|| ConfigError::MissingConfiguration {
			provider: provider.to_string(),
			key: key.to_string(),
		})
	}

	/// Check that every required key is present.
	pub fn validate_keys(&self, provider: &str, keys: &[ConfigKey]) -> Result<(), ConfigError> {
		for key in keys.iter().filter(|k| k.required) {
			self.require(provider, key.name)?;
		}
		Ok(())
	}

	/// Check the standard OAuth client fields.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.client_id.is_empty() {
			return Err(ConfigError::Validation(
				"client_id cannot be empty".to_string(),
			));
		}
		if self.client_secret.is_empty() {
			return Err(ConfigError::Validation(
				"client_secret cannot be empty".to_string(),
			));
		}
		if self.redirect_uri.is_empty() {
			return Err(ConfigError::Validation(
				"redirect_uri cannot be empty".to_string(),
			));
		}
		Ok(())
	}
}

/// Load a provider's configuration from defaults, the system TOML file and
/// the environment.
pub fn load_provider_config(
	provider: &str,
	keys: &[ConfigKey],
) -> Result<ProviderConfig, ConfigError> {
	load_from_sources(
		provider,
		keys,
		vec![
			Box::new(DefaultsSource),
			Box::new(TomlSource::new(DEFAULT_CONFIG_PATH)),
			Box::new(EnvSource::new()),
		],
	)
}

/// Load a provider's configuration with a custom TOML file path.
pub fn load_provider_config_with_file(
	provider: &str,
	keys: &[ConfigKey],
	config_path: impl Into<PathBuf>,
) -> Result<ProviderConfig, ConfigError> {
	load_from_sources(
		provider,
		keys,
		vec![
			Box::new(DefaultsSource),
			Box::new(TomlSource::new(config_path)),
			Box::new(EnvSource::new()),
		],
	)
}

/// Merge `sources` in precedence order and finalize the result.
pub fn load_from_sources(
	provider: &str,
	keys: &[ConfigKey],
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<ProviderConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ProviderConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), provider, "loading configuration source");
		merged.merge(source.load(provider, keys)?);
	}

	merged.build(provider, keys)
}
