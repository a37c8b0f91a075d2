// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Okta OAuth 2.0 / OpenID Connect provider adapter.
//!
//! This crate supplies the Okta-specific pieces of the login flow; the
//! generic parts (state, code exchange, HTTP client) live in
//! [`socialauth_core::OAuth2Core`].
//!
//! # Endpoints
//!
//! Every endpoint hangs off the tenant's base URL and an optional custom
//! authorization server:
//!
//! | `auth_server_id` | Token endpoint |
//! |------------------|----------------|
//! | *(unset)*        | `https://acme.okta.com/oauth2/v1/token` |
//! | `default`        | `https://acme.okta.com/oauth2/default/v1/token` |
//! | `aus1a2b3c`      | `https://acme.okta.com/oauth2/aus1a2b3c/v1/token` |
//!
//! Without an authorization server id Okta uses the org authorization
//! server; with one it uses the named custom server.
//!
//! # Configuration
//!
//! | Key              | Required | Env var                          |
//! |------------------|----------|----------------------------------|
//! | `base_url`       | yes      | `SOCIALAUTH_OKTA_BASE_URL`       |
//! | `auth_server_id` | no       | `SOCIALAUTH_OKTA_AUTH_SERVER_ID` |
//!
//! plus the standard `client_id`, `client_secret` and `redirect_uri`.
//!
//! # Example
//!
//! ```rust,no_run
//! use socialauth_core::ProviderRegistry;
//! use socialauth_provider_okta::OktaProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut registry = ProviderRegistry::new();
//! let okta = registry.register_from_sources::<OktaProvider>(None)?;
//!
//! // Step 1: send the user to Okta
//! let redirect = okta.redirect()?;
//!
//! // Step 2: on the callback, check the state and finish the login
//! okta.verify_state(redirect.state.as_deref(), Some("state-from-callback"))?;
//! let user = okta.user("authorization-code-from-callback").await?;
//! println!("{:?} <{:?}>", user.name(), user.email());
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use serde_json::Value;
use socialauth_core::token::{AUTHORIZATION_CODE, CODE, GRANT_TYPE};
use socialauth_core::user::{claim_bool, claim_string, claim_value};
use socialauth_core::{
	AuthorizationRequest, ConfigError, ConfigKey, ConfigurableProvider, OidcProviderAdapter,
	ProviderConfig, ProviderError, RawClaims, ScopeSet, TokenFields, User, UserFields,
};
use url::Url;

/// Unique provider identifier.
pub const IDENTIFIER: &str = "OKTA";

/// Scope definitions.
///
/// See <https://developer.okta.com/docs/reference/api/oidc/#scopes>.
pub const SCOPE_OPENID: &str = "openid";
pub const SCOPE_PROFILE: &str = "profile";
pub const SCOPE_EMAIL: &str = "email";
pub const SCOPE_ADDRESS: &str = "address";
pub const SCOPE_PHONE: &str = "phone";
pub const SCOPE_OFFLINE_ACCESS: &str = "offline_access";

/// Scopes requested unless configuration says otherwise.
pub const DEFAULT_SCOPES: &[&str] = &[SCOPE_OPENID, SCOPE_PROFILE, SCOPE_EMAIL];

pub const CONFIG_BASE_URL: &str = "base_url";
pub const CONFIG_AUTH_SERVER_ID: &str = "auth_server_id";

const CONFIG_KEYS: &[ConfigKey] = &[
	ConfigKey::required(CONFIG_BASE_URL),
	ConfigKey::optional(CONFIG_AUTH_SERVER_ID),
];

// =============================================================================
// Configuration
// =============================================================================

/// Okta tenant settings. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OktaConfig {
	base_url: String,
	auth_server_id: String,
}

impl OktaConfig {
	/// `base_url` is the tenant root, e.g. `https://acme.okta.com`. It is
	/// not validated here; a malformed value fails when a URL is parsed.
	pub fn new(base_url: impl Into<String>) -> Self {
		let base_url: String = base_url.into();
		Self {
			base_url: base_url.trim_end_matches('/').to_string(),
			auth_server_id: String::new(),
		}
	}

	/// Select a custom authorization server (e.g. `default`).
	pub fn with_auth_server_id(mut self, auth_server_id: impl Into<String>) -> Self {
		let id: String = auth_server_id.into();
		self.auth_server_id = id.trim_matches('/').to_string();
		self
	}

	/// Read `base_url` and `auth_server_id` from provider configuration.
	///
	/// # Errors
	///
	/// [`ConfigError::MissingConfiguration`] if `base_url` is absent or empty.
	pub fn from_provider_config(config: &ProviderConfig) -> Result<Self, ConfigError> {
		let base_url = config.require("okta", CONFIG_BASE_URL)?;
		let okta = Self::new(base_url);
		Ok(match config.get(CONFIG_AUTH_SERVER_ID) {
			Some(id) => okta.with_auth_server_id(id),
			None => okta,
		})
	}

	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	pub fn auth_server_id(&self) -> Option<&str> {
		Some(self.auth_server_id.as_str()).filter(|s| !s.is_empty())
	}

	/// `"{id}/"` for a custom authorization server, `""` otherwise.
	pub fn auth_server_segment(&self) -> String {
		match self.auth_server_id() {
			Some(id) => format!("{id}/"),
			None => String::new(),
		}
	}

	/// `{base_url}/oauth2/{segment}`, always ending in `/`.
	pub fn server_url(&self) -> String {
		format!("{}/oauth2/{}", self.base_url, self.auth_server_segment())
	}
}

// =============================================================================
// Provider
// =============================================================================

/// The Okta adapter.
///
/// Stateless apart from its [`OktaConfig`]; one instance can serve any number
/// of concurrent logins.
#[derive(Debug, Clone)]
pub struct OktaProvider {
	config: OktaConfig,
}

impl OktaProvider {
	pub fn new(config: OktaConfig) -> Self {
		Self { config }
	}

	pub fn config(&self) -> &OktaConfig {
		&self.config
	}

	pub fn authorize_url(&self) -> String {
		format!("{}v1/authorize", self.config.server_url())
	}

	/// Token endpoint for the code exchange.
	pub fn build_token_url(&self) -> String {
		format!("{}v1/token", self.config.server_url())
	}

	pub fn userinfo_url(&self) -> String {
		format!("{}v1/userinfo", self.config.server_url())
	}

	/// Full authorization URL: the authorize endpoint plus the host's
	/// standard parameters (`client_id`, `redirect_uri`, `scope`,
	/// `response_type`, `state`).
	///
	/// # Errors
	///
	/// [`ProviderError::InvalidUrl`] if the configured `base_url` is not a
	/// valid absolute URL.
	#[tracing::instrument(skip(self, request), fields(client_id = %request.client_id))]
	pub fn build_authorization_url(
		&self,
		request: &AuthorizationRequest<'_>,
	) -> Result<Url, ProviderError> {
		request.from_base(&self.authorize_url())
	}

	/// Fetch the user's claims from the userinfo endpoint.
	///
	/// # Errors
	///
	/// - [`ProviderError::UpstreamHttp`]: network error or non-success status.
	/// - [`ProviderError::MalformedResponse`]: body is not a JSON object.
	#[tracing::instrument(skip(self, http, access_token), name = "OktaProvider::fetch_user_claims")]
	pub async fn fetch_user_claims(
		&self,
		http: &reqwest::Client,
		access_token: &str,
	) -> Result<RawClaims, ProviderError> {
		tracing::debug!("fetching Okta user info");

		let response = http
			.get(self.userinfo_url())
			.header("Accept", "application/json")
			.header("Authorization", format!("Bearer {access_token}"))
			.send()
			.await?;

		let status = response.status();
		if !status.is_success() {
			let body = response.bytes().await.unwrap_or_default();
			tracing::warn!(status = status.as_u16(), "Okta userinfo request failed");
			return Err(ProviderError::upstream_status(
				status.as_u16(),
				"failed to get user info",
				&body,
			));
		}

		let body = response.bytes().await?;
		match serde_json::from_slice::<Value>(&body) {
			Ok(Value::Object(claims)) => Ok(claims),
			Ok(other) => Err(ProviderError::MalformedResponse(format!(
				"user info response is not a JSON object: {}",
				json_kind(&other)
			))),
			Err(e) => Err(ProviderError::MalformedResponse(format!(
				"failed to parse user info response: {e}"
			))),
		}
	}

	/// Map Okta claims to a [`User`].
	///
	/// Absent claims map to `None`; an absent `email_verified` maps to
	/// `false`. The claims are kept verbatim as the user's raw data.
	pub fn map_claims_to_user(&self, claims: RawClaims) -> User {
		let fields = UserFields {
			id: claim_string(&claims, "sub"),
			email: claim_string(&claims, "email"),
			email_verified: claim_bool(&claims, "email_verified").unwrap_or(false),
			nickname: claim_string(&claims, "nickname"),
			name: claim_string(&claims, "name"),
			first_name: claim_string(&claims, "given_name"),
			last_name: claim_string(&claims, "family_name"),
			profile_url: claim_string(&claims, "profile"),
			address: claim_value(&claims, "address"),
			phone: claim_string(&claims, "phone"),
		};
		User::from_claims(claims, fields)
	}

	/// Token request body: the host's fields plus `grant_type` and `code`,
	/// which always take precedence.
	pub fn build_token_request_fields(&self, base: TokenFields, code: &str) -> TokenFields {
		base.merge(
			TokenFields::new()
				.with(GRANT_TYPE, AUTHORIZATION_CODE)
				.with(CODE, code),
		)
	}
}

fn json_kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "boolean",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "array",
		Value::Object(_) => "object",
	}
}

#[async_trait]
impl OidcProviderAdapter for OktaProvider {
	fn identifier(&self) -> &'static str {
		IDENTIFIER
	}

	fn default_scopes(&self) -> ScopeSet {
		ScopeSet::new(DEFAULT_SCOPES.iter().copied())
	}

	fn auth_url(&self, request: &AuthorizationRequest<'_>) -> Result<Url, ProviderError> {
		self.build_authorization_url(request)
	}

	fn token_url(&self) -> String {
		self.build_token_url()
	}

	async fn user_by_token(
		&self,
		http: &reqwest::Client,
		access_token: &str,
	) -> Result<RawClaims, ProviderError> {
		self.fetch_user_claims(http, access_token).await
	}

	fn map_user_to_object(&self, claims: RawClaims) -> User {
		self.map_claims_to_user(claims)
	}

	fn token_fields(&self, base: TokenFields, code: &str) -> TokenFields {
		self.build_token_request_fields(base, code)
	}
}

impl ConfigurableProvider for OktaProvider {
	const IDENTIFIER: &'static str = IDENTIFIER;

	fn additional_config_keys() -> &'static [ConfigKey] {
		CONFIG_KEYS
	}

	fn from_config(config: &ProviderConfig) -> Result<Self, ConfigError> {
		OktaConfig::from_provider_config(config).map(Self::new)
	}
}


#[cfg(test)]
mod proptests {
	use super::*;
	use proptest::prelude::*;

	proptest! {
		/// A custom authorization server always appears as `/{id}/v1/...`.
		#[test]
		fn token_url_embeds_auth_server_id(
			tenant in "[a-z]{3,10}",
			id in "[a-zA-Z0-9]{1,20}",
		) {
			let okta = OktaProvider::new(
				OktaConfig::new(format!("https://{tenant}.okta.com")).with_auth_server_id(id.clone()),
			);
			let url = okta.build_token_url();
			let expected_suffix = format!("/oauth2/{id}/v1/token");
			let expected_segment = format!("{id}/v1/token");
			prop_assert!(url.contains(&expected_segment));
			prop_assert!(url.ends_with(&expected_suffix));
			prop_assert!(!url["https://".len()..].contains("//"));
		}

		/// Every endpoint shares the same server prefix.
		#[test]
		fn endpoints_share_server_url(
			tenant in "[a-z]{3,10}",
			id in "[a-z0-9]{0,12}",
		) {
			let okta = OktaProvider::new(
				OktaConfig::new(format!("https://{tenant}.okta.com")).with_auth_server_id(id),
			);
			let server = okta.config().server_url();
			prop_assert!(okta.authorize_url().starts_with(&server));
			prop_assert!(okta.build_token_url().starts_with(&server));
			prop_assert!(okta.userinfo_url().starts_with(&server));
		}

		/// `grant_type` and `code` win over anything in the base fields.
		#[test]
		fn token_fields_override_base(
			code in "[a-zA-Z0-9]{1,40}",
			other_grant in "[a-z_]{1,20}",
		) {
			let base = TokenFields::new()
				.with(GRANT_TYPE, other_grant)
				.with("client_id", "id");
			let fields = OktaProvider::new(OktaConfig::new("https://acme.okta.com"))
				.build_token_request_fields(base, &code);
			prop_assert_eq!(fields.get(GRANT_TYPE), Some(AUTHORIZATION_CODE));
			prop_assert_eq!(fields.get(CODE), Some(code.as_str()));
		}

		/// Mapping never loses or alters the raw claims.
		#[test]
		fn raw_claims_round_trip(
			sub in "[a-zA-Z0-9]{1,20}",
			extra_key in "[a-z]{1,10}",
			extra_value in "[a-zA-Z0-9 ]{0,20}",
		) {
			let mut claims = RawClaims::new();
			claims.insert("sub".to_string(), Value::String(sub.clone()));
			claims.insert(format!("x_{extra_key}"), Value::String(extra_value));

			let user = OktaProvider::new(OktaConfig::new("https://acme.okta.com"))
				.map_claims_to_user(claims.clone());
			prop_assert_eq!(user.raw(), &claims);
			prop_assert_eq!(user.id(), Some(sub.as_str()));
		}
	}
}
