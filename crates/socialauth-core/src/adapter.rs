// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The capability interface every identity provider implements.
//!
//! [`crate::OAuth2Core`] owns the generic authorization-code flow and calls
//! back into an [`OidcProviderAdapter`] for the provider-specific pieces:
//!
//! ```text
//! OAuth2Core ──auth_url(request)──────────▶ adapter ──▶ request.from_base(endpoint)
//!            ──token_url()────────────────▶ adapter
//!            ──token_fields(base, code)───▶ adapter
//!            ──user_by_token(http, token)─▶ adapter ──▶ GET userinfo
//!            ──map_user_to_object(claims)─▶ adapter ──▶ User
//! ```

use async_trait::async_trait;
use url::Url;

use crate::config::{ConfigKey, ProviderConfig};
use crate::error::{ConfigError, ProviderError};
use crate::request::AuthorizationRequest;
use crate::scopes::ScopeSet;
use crate::token::{TokenFields, AUTHORIZATION_CODE, CODE, GRANT_TYPE};
use crate::user::{RawClaims, User};

/// Provider-specific hooks used by [`crate::OAuth2Core`].
///
/// Implementations hold only immutable configuration and must be safe to
/// share across concurrent login attempts.
#[async_trait]
pub trait OidcProviderAdapter: Send + Sync + std::fmt::Debug {
	/// Stable identifier, e.g. `"OKTA"`.
	fn identifier(&self) -> &'static str;

	/// Scopes requested when the configuration does not override them.
	fn default_scopes(&self) -> ScopeSet;

	/// Full authorization URL for `request`.
	fn auth_url(&self, request: &AuthorizationRequest<'_>) -> Result<Url, ProviderError>;

	/// Token endpoint used for the code exchange.
	fn token_url(&self) -> String;

	/// Fetch the raw claims for an access token.
	async fn user_by_token(
		&self,
		http: &reqwest::Client,
		access_token: &str,
	) -> Result<RawClaims, ProviderError>;

	/// Map raw claims to a normalized [`User`]. Must not fail.
	fn map_user_to_object(&self, claims: RawClaims) -> User;

	/// Token-request body. `base` holds the host's client fields.
	fn token_fields(&self, base: TokenFields, code: &str) -> TokenFields {
		base
			.with(GRANT_TYPE, AUTHORIZATION_CODE)
			.with(CODE, code)
	}
}

/// An adapter that can be built from layered configuration.
pub trait ConfigurableProvider: OidcProviderAdapter + Sized + 'static {
	/// Name used for config tables, env prefixes and registry lookup.
	const IDENTIFIER: &'static str;

	/// Keys read from configuration in addition to the client credentials.
	/// The host refuses to build the provider if a required one is missing.
	fn additional_config_keys() -> &'static [ConfigKey];

	fn from_config(config: &ProviderConfig) -> Result<Self, ConfigError>;
}
