// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Lookup of configured providers by name.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::adapter::ConfigurableProvider;
use crate::config::{self, ProviderConfig};
use crate::error::ProviderError;
use crate::oauth2::OAuth2Core;

/// Configured providers, keyed by lower-cased identifier.
#[derive(Debug, Default, Clone)]
pub struct ProviderRegistry {
	drivers: HashMap<String, Arc<OAuth2Core>>,
}

impl ProviderRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Validate `config` against `P`'s declared keys, build the adapter and
	/// register it.
	///
	/// # Errors
	///
	/// [`ProviderError::Config`] wrapping
	/// [`crate::ConfigError::MissingConfiguration`] when a required key is
	/// absent, or any error from the adapter's own construction.
	pub fn register<P: ConfigurableProvider>(
		&mut self,
		config: ProviderConfig,
	) -> Result<Arc<OAuth2Core>, ProviderError> {
		let core = build_core::<P>(config)?;
		Ok(self.insert(P::IDENTIFIER, core))
	}

	/// Load `P`'s configuration from the standard sources and register it.
	pub fn register_from_sources<P: ConfigurableProvider>(
		&mut self,
		config_path: Option<&std::path::Path>,
	) -> Result<Arc<OAuth2Core>, ProviderError> {
		let name = P::IDENTIFIER.to_ascii_lowercase();
		let config = match config_path {
			Some(path) => config::load_provider_config_with_file(&name, P::additional_config_keys(), path)?,
			None => config::load_provider_config(&name, P::additional_config_keys())?,
		};
		self.register::<P>(config)
	}

	/// Register an already-built host under `name`.
	pub fn insert(&mut self, name: &str, core: OAuth2Core) -> Arc<OAuth2Core> {
		let core = Arc::new(core);
		info!(provider = name, "registered OAuth provider");
		self.drivers.insert(name.to_ascii_lowercase(), Arc::clone(&core));
		core
	}

	/// Look up a provider by case-insensitive name.
	pub fn driver(&self, name: &str) -> Result<Arc<OAuth2Core>, ProviderError> {
		self
			.drivers
			.get(&name.to_ascii_lowercase())
			.cloned()
			.ok_or_else(|| ProviderError::UnknownProvider(name.to_string()))
	}

	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.drivers.keys().map(String::as_str)
	}
}

/// Validate and construct a host for `P` without registering it.
pub fn build_core<P: ConfigurableProvider>(config: ProviderConfig) -> Result<OAuth2Core, ProviderError> {
	let name = P::IDENTIFIER.to_ascii_lowercase();
	config.validate()?;
	config.validate_keys(&name, P::additional_config_keys())?;
	let adapter = P::from_config(&config)?;
	OAuth2Core::new(Arc::new(adapter), config)
}
