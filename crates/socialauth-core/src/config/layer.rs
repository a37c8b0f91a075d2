// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Partial provider configuration produced by each source.

use serde::{Deserialize, Serialize};
use socialauth_common_secret::SecretString;
use std::collections::BTreeMap;

use super::{ConfigKey, ProviderConfig};
use crate::error::ConfigError;
use crate::token::TokenAuthMethod;

/// Configuration layer for one provider (all fields optional for layering).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfigLayer {
	pub client_id: Option<String>,
	#[serde(skip_serializing)]
	pub client_secret: Option<SecretString>,
	pub redirect_uri: Option<String>,
	pub scopes: Option<Vec<String>>,
	pub token_auth_method: Option<String>,
	/// Declared provider keys such as `base_url`. Each source fills this
	/// itself, keeping only the keys the provider declares.
	#[serde(skip)]
	pub additional: BTreeMap<String, String>,
}

impl ProviderConfigLayer {
	/// Merge with another layer, preferring values from `other`.
	pub fn merge(&mut self, other: ProviderConfigLayer) {
		if other.client_id.is_some() {
			self.client_id = other.client_id;
		}
		if other.client_secret.is_some() {
			self.client_secret = other.client_secret;
		}
		if other.redirect_uri.is_some() {
			self.redirect_uri = other.redirect_uri;
		}
		if other.scopes.is_some() {
			self.scopes = other.scopes;
		}
		if other.token_auth_method.is_some() {
			self.token_auth_method = other.token_auth_method;
		}
		self.additional.extend(other.additional);
	}

	pub fn is_configured(&self) -> bool {
		self.client_id.as_ref().is_some_and(|s| !s.is_empty())
	}

	/// Finalize into a validated [`ProviderConfig`].
	///
	/// # Errors
	///
	/// - [`ConfigError::MissingConfiguration`] when a client field or a
	///   required provider key is absent.
	/// - [`ConfigError::Validation`] when a client field is empty.
	/// - [`ConfigError::InvalidValue`] for an unknown `token_auth_method`.
	pub fn build(self, provider: &str, keys: &[ConfigKey]) -> Result<ProviderConfig, ConfigError> {
		let missing = |key: &str| ConfigError::MissingConfiguration {
			provider: provider.to_string(),
			key: key.to_string(),
		};

		let client_id = self.client_id.ok_or_else(|| missing("client_id"))?;
		let client_secret = self.client_secret.ok_or_else(|| missing("client_secret"))?;
		let redirect_uri = self.redirect_uri.ok_or_else(|| missing("redirect_uri"))?;
		let token_auth_method = self
			.token_auth_method
			.as_deref()
			.map(str::parse::<TokenAuthMethod>)
			.transpose()?
			.unwrap_or_default();

		let mut config = ProviderConfig::new(client_id, client_secret, redirect_uri)
			.with_token_auth_method(token_auth_method);
		config.scopes = self.scopes;
		for (key, value) in self.additional {
			config = config.with_additional(key, value);
		}

		config.validate()?;
		config.validate_keys(provider, keys)?;
		Ok(config)
	}
}
