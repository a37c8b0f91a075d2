// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: defaults, TOML files and environment variables.

use serde::Deserialize;
use socialauth_common_secret::SecretString;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, trace};

use super::{ConfigKey, ProviderConfigLayer};
use crate::error::ConfigError;
use crate::scopes::ScopeSet;

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// A place provider configuration can come from.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self, provider: &str, keys: &[ConfigKey]) -> Result<ProviderConfigLayer, ConfigError>;
}

/// Built-in defaults. Providers carry their own default scopes, so this is
/// empty.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self, _provider: &str, _keys: &[ConfigKey]) -> Result<ProviderConfigLayer, ConfigError> {
		Ok(ProviderConfigLayer::default())
	}
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
	#[serde(default)]
	providers: BTreeMap<String, toml::Table>,
}

/// Pull the declared keys out of a provider table. Undeclared keys are left
/// behind; a declared key must hold a string.
fn take_declared_keys(
	table: &mut toml::Table,
	keys: &[ConfigKey],
) -> Result<BTreeMap<String, String>, ConfigError> {
	let mut declared = BTreeMap::new();
	for key in keys {
		match table.remove(key.name) {
			Some(toml::Value::String(value)) => {
				declared.insert(key.name.to_string(), value);
			}
			Some(other) => {
				return Err(ConfigError::InvalidValue {
					key: key.name.to_string(),
					message: format!("expected a string, found {}", other.type_str()),
				});
			}
			None => {}
		}
	}
	Ok(declared)
}

/// TOML file with one `[providers.<name>]` table per provider.
///
/// A missing file is not an error; it simply contributes nothing.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self, provider: &str, keys: &[ConfigKey]) -> Result<ProviderConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(ProviderConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let parse_error = |e: toml::de::Error| ConfigError::TomlParse {
			path: self.path.clone(),
			source: e,
		};
		let mut file: ConfigFile = toml::from_str(&content).map_err(parse_error)?;

		trace!(provider, "parsed provider tables from TOML");
		let Some(mut table) = file.providers.remove(&provider.to_ascii_lowercase()) else {
			return Ok(ProviderConfigLayer::default());
		};

		let additional = take_declared_keys(&mut table, keys)?;
		let mut layer: ProviderConfigLayer = toml::Value::Table(table)
			.try_into()
			.map_err(parse_error)?;
		layer.additional = additional;
		Ok(layer)
	}
}

type Lookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Environment variables.
///
/// Convention: `SOCIALAUTH_<PROVIDER>_<KEY>`, e.g. `SOCIALAUTH_OKTA_BASE_URL`.
/// The client secret may instead be read from the file named by
/// `SOCIALAUTH_<PROVIDER>_CLIENT_SECRET_FILE`.
pub struct EnvSource {
	lookup: Lookup,
}

impl Default for EnvSource {
	fn default() -> Self {
		Self::new()
	}
}

impl EnvSource {
	/// Read from the process environment.
	pub fn new() -> Self {
		Self::with_lookup(|name| std::env::var(name).ok())
	}

	/// Read through a custom lookup function.
	pub fn with_lookup<F>(lookup: F) -> Self
	where
		F: Fn(&str) -> Option<String> + Send + Sync + 'static,
	{
		Self {
			lookup: Box::new(lookup),
		}
	}

	fn var(&self, name: &str) -> Option<String> {
		(self.lookup)(name).filter(|s| !s.is_empty())
	}

	fn secret(&self, name: &str) -> Result<Option<SecretString>, ConfigError> {
		let file_var = format!("{name}_FILE");
		if let Some(path) = self.var(&file_var) {
			let path = PathBuf::from(path);
			let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileRead {
				path: path.clone(),
				source: e,
			})?;
			let secret = content.strip_suffix('\n').unwrap_or(&content).to_string();
			return Ok(Some(SecretString::new(secret)));
		}
		Ok(self.var(name).map(SecretString::new))
	}
}

/// `SOCIALAUTH_<PROVIDER>_`
pub fn env_prefix(provider: &str) -> String {
	format!("SOCIALAUTH_{}_", provider.to_ascii_uppercase().replace('-', "_"))
}

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self, provider: &str, keys: &[ConfigKey]) -> Result<ProviderConfigLayer, ConfigError> {
		let prefix = env_prefix(provider);
		debug!(prefix = %prefix, "loading environment variables");

		let additional = keys
			.iter()
			.filter_map(|key| {
				self
					.var(&format!("{prefix}{}", key.name.to_ascii_uppercase()))
					.map(|value| (key.name.to_string(), value))
			})
			.collect();

		Ok(ProviderConfigLayer {
			client_id: self.var(&format!("{prefix}CLIENT_ID")),
			client_secret: self.secret(&format!("{prefix}CLIENT_SECRET"))?,
			redirect_uri: self.var(&format!("{prefix}REDIRECT_URI")),
			scopes: self
				.var(&format!("{prefix}SCOPES"))
				.map(|s| ScopeSet::parse(&s).iter().map(str::to_string).collect()),
			token_auth_method: self.var(&format!("{prefix}TOKEN_AUTH_METHOD")),
			additional,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;
	use std::io::Write;

	const KEYS: &[ConfigKey] = &[
		ConfigKey::required("base_url"),
		ConfigKey::optional("auth_server_id"),
	];

	fn env(vars: &[(&str, &str)]) -> EnvSource {
		let vars: HashMap<String, String> = vars
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect();
		EnvSource::with_lookup(move |name| vars.get(name).cloned())
	}

	#[test]
	fn env_prefix_is_upper_snake() {
		assert_eq!(env_prefix("okta"), "SOCIALAUTH_OKTA_");
		assert_eq!(env_prefix("azure-ad"), "SOCIALAUTH_AZURE_AD_");
	}

	#[test]
	fn env_source_reads_standard_and_declared_keys() {
		let source = env(&[
			("SOCIALAUTH_OKTA_CLIENT_ID", "0oa1"),
			("SOCIALAUTH_OKTA_CLIENT_SECRET", "secret"),
			("SOCIALAUTH_OKTA_REDIRECT_URI", "https://app.example.com/cb"),
			("SOCIALAUTH_OKTA_SCOPES", "openid,groups"),
			("SOCIALAUTH_OKTA_BASE_URL", "https://acme.okta.com"),
			("SOCIALAUTH_OKTA_UNDECLARED", "ignored"),
		]);
		let layer = source.load("okta", KEYS).unwrap();

		assert_eq!(layer.client_id.as_deref(), Some("0oa1"));
		assert_eq!(layer.client_secret.as_ref().map(|s| s.expose().as_str()), Some("secret"));
		assert_eq!(layer.scopes, Some(vec!["openid".to_string(), "groups".to_string()]));
		assert_eq!(layer.additional.get("base_url").map(String::as_str), Some("https://acme.okta.com"));
		assert!(!layer.additional.contains_key("auth_server_id"));
		assert_eq!(layer.additional.len(), 1);
	}

	#[test]
	fn env_source_reads_secret_from_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "from-file").unwrap();
		let path = file.path().to_string_lossy().into_owned();

		let source = env(&[
			("SOCIALAUTH_OKTA_CLIENT_SECRET", "from-env"),
			("SOCIALAUTH_OKTA_CLIENT_SECRET_FILE", path.as_str()),
		]);
		let layer = source.load("okta", KEYS).unwrap();
		assert_eq!(layer.client_secret.unwrap().expose(), "from-file");
	}

	#[test]
	fn toml_source_selects_provider_table() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		write!(
			file,
			r#"
[providers.okta]
client_id = "0oa1"
client_secret = "secret"
redirect_uri = "https://app.example.com/cb"
scopes = ["openid", "email"]
base_url = "https://acme.okta.com"
auth_server_id = "default"

[providers.other]
client_id = "nope"
"#
		)
		.unwrap();

		let layer = TomlSource::new(file.path()).load("OKTA", KEYS).unwrap();
		assert_eq!(layer.client_id.as_deref(), Some("0oa1"));
		assert_eq!(layer.scopes, Some(vec!["openid".to_string(), "email".to_string()]));
		assert_eq!(layer.additional.get("auth_server_id").map(String::as_str), Some("default"));
	}

	#[test]
	fn toml_source_ignores_undeclared_and_foreign_keys() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		write!(
			file,
			r#"
[providers.okta]
client_id = "0oa1"
client_secret = "secret"
redirect_uri = "https://app.example.com/cb"
base_url = "https://acme.okta.com"
retries = 3
undeclared = "kept out"

[providers.other]
timeout = 30
"#
		)
		.unwrap();

		let layer = TomlSource::new(file.path()).load("okta", KEYS).unwrap();
		assert_eq!(layer.client_id.as_deref(), Some("0oa1"));
		assert_eq!(layer.additional.len(), 1);
		assert_eq!(layer.additional.get("base_url").map(String::as_str), Some("https://acme.okta.com"));
	}

	#[test]
	fn toml_source_rejects_non_string_declared_key() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		write!(file, "[providers.okta]\nbase_url = 443\n").unwrap();

		let err = TomlSource::new(file.path()).load("okta", KEYS).unwrap_err();
		assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "base_url"));
	}

	#[test]
	fn toml_source_missing_file_is_empty() {
		let layer = TomlSource::new("/nonexistent/socialauth.toml")
			.load("okta", KEYS)
			.unwrap();
		assert!(!layer.is_configured());
	}

	#[test]
	fn toml_source_reports_parse_errors() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		write!(file, "[providers.okta\nclient_id = ").unwrap();
		let err = TomlSource::new(file.path()).load("okta", KEYS).unwrap_err();
		assert!(matches!(err, ConfigError::TomlParse { .. }));
	}

	#[test]
	fn environment_overrides_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		write!(
			file,
			r#"
[providers.okta]
client_id = "from-file"
client_secret = "secret"
redirect_uri = "https://app.example.com/cb"
base_url = "https://file.okta.com"
"#
		)
		.unwrap();

		let config = super::super::load_from_sources(
			"okta",
			KEYS,
			vec![
				Box::new(env(&[("SOCIALAUTH_OKTA_BASE_URL", "https://env.okta.com")])),
				Box::new(TomlSource::new(file.path())),
				Box::new(DefaultsSource),
			],
		)
		.unwrap();

		assert_eq!(config.client_id, "from-file");
		assert_eq!(config.get("base_url"), Some("https://env.okta.com"));
	}
}
