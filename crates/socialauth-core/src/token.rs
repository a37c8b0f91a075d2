// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Token-endpoint request fields and response types.

use serde::{Deserialize, Serialize};
use socialauth_common_secret::{SecretString, REDACTED};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

pub const GRANT_TYPE: &str = "grant_type";
pub const AUTHORIZATION_CODE: &str = "authorization_code";
pub const CLIENT_ID: &str = "client_id";
pub const CLIENT_SECRET: &str = "client_secret";
pub const CODE: &str = "code";
pub const REDIRECT_URI: &str = "redirect_uri";

/// Fields whose values are masked in `Debug` output.
const SENSITIVE_FIELDS: &[&str] = &[CLIENT_SECRET, CODE];

/// Form fields posted to a token endpoint.
///
/// Ordered so the encoded body is deterministic.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct TokenFields(BTreeMap<String, String>);

impl TokenFields {
	pub fn new() -> Self {
		Self::default()
	}

	/// Set a field, replacing any previous value.
	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
		self.0.insert(key.into(), value.into());
	}

	/// Builder form of [`TokenFields::insert`].
	pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.insert(key, value);
		self
	}

	/// Merge `other` into `self`; values from `other` win.
	pub fn merge(mut self, other: TokenFields) -> Self {
		self.0.extend(other.0);
		self
	}

	pub fn remove(&mut self, key: &str) -> Option<String> {
		self.0.remove(key)
	}

	pub fn get(&self, key: &str) -> Option<&str> {
		self.0.get(key).map(String::as_str)
	}

}

impl Serialize for TokenFields {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		self.0.serialize(serializer)
	}
}

impl fmt::Debug for TokenFields {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut map = f.debug_map();
		for (key, value) in &self.0 {
			if SENSITIVE_FIELDS.contains(&key.as_str()) {
				map.entry(key, &REDACTED);
			} else {
				map.entry(key, value);
			}
		}
		map.finish()
	}
}

/// How client credentials are presented to the token endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenAuthMethod {
	/// `client_id` and `client_secret` in the form body.
	#[default]
	ClientSecretPost,
	/// HTTP Basic `Authorization` header; the secret is left out of the body.
	ClientSecretBasic,
}

impl FromStr for TokenAuthMethod {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"client_secret_post" => Ok(Self::ClientSecretPost),
			"client_secret_basic" => Ok(Self::ClientSecretBasic),
			other => Err(ConfigError::InvalidValue {
				key: "token_auth_method".to_string(),
				message: format!(
					"'{other}' is not one of client_secret_post, client_secret_basic"
				),
			}),
		}
	}
}

/// Successful response from a token endpoint.
///
/// Every credential is wrapped in [`SecretString`] so the response can be
/// logged with `?response` safely.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
	pub access_token: SecretString,
	#[serde(default = "default_token_type")]
	pub token_type: String,
	#[serde(default)]
	pub expires_in: Option<u64>,
	#[serde(default)]
	pub refresh_token: Option<SecretString>,
	#[serde(default)]
	pub id_token: Option<SecretString>,
	#[serde(default)]
	pub scope: Option<String>,
}

fn default_token_type() -> String {
	"Bearer".to_string()
}

/// RFC 6749 §5.2 error body.
#[derive(Debug, Deserialize)]
pub(crate) struct OAuthErrorResponse {
	pub error: String,
	pub error_description: Option<String>,
}
