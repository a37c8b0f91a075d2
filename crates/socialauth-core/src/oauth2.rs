// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The generic OAuth 2.0 authorization-code flow.
//!
//! # Flow
//!
//! 1. [`OAuth2Core::redirect`] issues a random `state` and the provider's
//!    authorization URL. The caller stores the state and redirects the user.
//! 2. The provider redirects back with `code` and `state`; the caller checks
//!    the state with [`OAuth2Core::verify_state`].
//! 3. [`OAuth2Core::user`] exchanges the code at the provider's token
//!    endpoint, fetches the claims with the access token and maps them to a
//!    [`User`].
//!
//! PKCE, token caching, refresh and retries are out of scope. Every error is
//! returned to the caller and aborts the attempt.

use rand::distributions::Alphanumeric;
use rand::Rng;
use std::collections::BTreeMap;
use std::sync::Arc;
use url::Url;

use crate::adapter::OidcProviderAdapter;
use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::request::AuthorizationRequest;
use crate::scopes::ScopeSet;
use crate::token::{
	OAuthErrorResponse, TokenAuthMethod, TokenFields, TokenResponse, CLIENT_ID, CLIENT_SECRET,
	CODE, REDIRECT_URI,
};
use crate::user::User;

/// Length of generated `state` values.
pub const STATE_LENGTH: usize = 40;

/// The URL to send the user to and the state to remember for the callback.
#[derive(Debug, Clone)]
pub struct AuthorizationRedirect {
	pub url: Url,
	/// `None` for stateless providers.
	pub state: Option<String>,
}

/// Drives the authorization-code flow for one provider.
///
/// Holds the adapter, immutable client configuration and an HTTP client.
/// Cheap to share behind an `Arc`; no method mutates shared state.
#[derive(Debug, Clone)]
pub struct OAuth2Core {
	adapter: Arc<dyn OidcProviderAdapter>,
	config: ProviderConfig,
	scopes: ScopeSet,
	parameters: BTreeMap<String, String>,
	stateless: bool,
	http_client: reqwest::Client,
}

impl OAuth2Core {
	/// Create a host for `adapter` using the shared HTTP client settings.
	///
	/// Scopes come from `config.scopes` if set, otherwise from the adapter.
	///
	/// # Errors
	///
	/// Returns [`ProviderError::UpstreamHttp`] if the HTTP client cannot be
	/// built.
	#[tracing::instrument(skip_all, fields(provider = adapter.identifier()))]
	pub fn new(
		adapter: Arc<dyn OidcProviderAdapter>,
		config: ProviderConfig,
	) -> Result<Self, ProviderError> {
		let http_client = socialauth_common_http::new_client()?;
		Ok(Self::with_http_client(adapter, config, http_client))
	}

	/// Create a host with a caller-supplied HTTP client.
	pub fn with_http_client(
		adapter: Arc<dyn OidcProviderAdapter>,
		config: ProviderConfig,
		http_client: reqwest::Client,
	) -> Self {
		let mut scopes = adapter.default_scopes();
		if let Some(configured) = &config.scopes {
			scopes.replace(configured.iter().cloned());
		}

		Self {
			adapter,
			config,
			scopes,
			parameters: BTreeMap::new(),
			stateless: false,
			http_client,
		}
	}

	/// Request additional scopes on top of the current ones.
	pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.scopes.extend(scopes);
		self
	}

	/// Replace the requested scopes.
	pub fn set_scopes<I, S>(mut self, scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.scopes.replace(scopes);
		self
	}

	/// Extra query parameters for the authorization URL.
	pub fn with_parameters<I, K, V>(mut self, parameters: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		self
			.parameters
			.extend(parameters.into_iter().map(|(k, v)| (k.into(), v.into())));
		self
	}

	/// Skip `state` generation and verification.
	pub fn stateless(mut self) -> Self {
		self.stateless = true;
		self
	}

	pub fn adapter(&self) -> &dyn OidcProviderAdapter {
		self.adapter.as_ref()
	}

	pub fn config(&self) -> &ProviderConfig {
		&self.config
	}

	pub fn scopes(&self) -> &ScopeSet {
		&self.scopes
	}

	pub fn http_client(&self) -> &reqwest::Client {
		&self.http_client
	}

	/// Generate a random alphanumeric `state`.
	pub fn generate_state() -> String {
		rand::thread_rng()
			.sample_iter(&Alphanumeric)
			.take(STATE_LENGTH)
			.map(char::from)
			.collect()
	}

	/// Authorization URL for a caller-chosen `state`.
	///
	/// The state is dropped when the host is stateless.
	#[tracing::instrument(skip(self, state), fields(provider = self.adapter.identifier()))]
	pub fn authorization_url(&self, state: Option<&str>) -> Result<Url, ProviderError> {
		let request = AuthorizationRequest {
			client_id: &self.config.client_id,
			redirect_uri: &self.config.redirect_uri,
			scopes: &self.scopes,
			state: if self.stateless { None } else { state },
			parameters: &self.parameters,
		};
		self.adapter.auth_url(&request)
	}

	/// Generate a state and build the authorization URL for it.
	pub fn redirect(&self) -> Result<AuthorizationRedirect, ProviderError> {
		let state = (!self.stateless).then(Self::generate_state);
		let url = self.authorization_url(state.as_deref())?;
		Ok(AuthorizationRedirect { url, state })
	}

	/// Compare the state issued in [`OAuth2Core::redirect`] with the one on
	/// the callback.
	///
	/// # Errors
	///
	/// [`ProviderError::InvalidState`] if either is missing or they differ.
	/// Always succeeds for stateless hosts.
	pub fn verify_state(
		&self,
		expected: Option<&str>,
		received: Option<&str>,
	) -> Result<(), ProviderError> {
		if self.stateless {
			return Ok(());
		}
		match (expected, received) {
			(Some(expected), Some(received)) if !expected.is_empty() && expected == received => Ok(()),
			_ => {
				tracing::warn!(provider = self.adapter.identifier(), "OAuth state mismatch");
				Err(ProviderError::InvalidState)
			}
		}
	}

	/// Client fields every token request starts from.
	pub fn base_token_fields(&self, code: &str) -> TokenFields {
		TokenFields::new()
			.with(CLIENT_ID, self.config.client_id.as_str())
			.with(CLIENT_SECRET, self.config.client_secret.expose().as_str())
			.with(CODE, code)
			.with(REDIRECT_URI, self.config.redirect_uri.as_str())
	}

	/// The token-request body after the adapter's additions.
	pub fn token_fields(&self, code: &str) -> TokenFields {
		self.adapter.token_fields(self.base_token_fields(code), code)
	}

	fn basic_auth_header(&self) -> String {
		let credentials = format!(
			"{}:{}",
			self.config.client_id,
			self.config.client_secret.expose()
		);
		let encoded = base64::Engine::encode(
			&base64::engine::general_purpose::STANDARD,
			credentials.as_bytes(),
		);
		format!("Basic {encoded}")
	}

	/// Exchange an authorization code for tokens.
	///
	/// # Errors
	///
	/// - [`ProviderError::UpstreamHttp`]: network error or non-success status.
	/// - [`ProviderError::Rejected`]: the provider returned an OAuth error body.
	/// - [`ProviderError::MalformedResponse`]: unexpected response format.
	#[tracing::instrument(skip(self, code), fields(provider = self.adapter.identifier()))]
	pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, ProviderError> {
		tracing::debug!("exchanging authorization code for tokens");

		let mut fields = self.token_fields(code);
		let mut request = self
			.http_client
			.post(self.adapter.token_url())
			.header("Accept", "application/json");

		if self.config.token_auth_method == TokenAuthMethod::ClientSecretBasic {
			fields.remove(CLIENT_SECRET);
			request = request.header("Authorization", self.basic_auth_header());
		}

		let response = request.form(&fields).send().await?;
		let status = response.status();
		let body = response.bytes().await?;

		if let Ok(error) = serde_json::from_slice::<OAuthErrorResponse>(&body) {
			if !error.error.is_empty() {
				tracing::warn!(status = status.as_u16(), error = %error.error, "token endpoint rejected code");
				return Err(ProviderError::Rejected {
					error: error.error,
					description: error.error_description,
				});
			}
		}

		if !status.is_success() {
			tracing::warn!(status = status.as_u16(), "token endpoint returned error status");
			return Err(ProviderError::upstream_status(
				status.as_u16(),
				"token request failed",
				&body,
			));
		}

		serde_json::from_slice(&body)
			.map_err(|e| ProviderError::MalformedResponse(format!("failed to parse token response: {e}")))
	}

	/// Fetch and normalize the user an access token belongs to.
	#[tracing::instrument(skip(self, access_token), fields(provider = self.adapter.identifier()))]
	pub async fn user_from_token(&self, access_token: &str) -> Result<User, ProviderError> {
		let claims = self
			.adapter
			.user_by_token(&self.http_client, access_token)
			.await?;
		Ok(
			self
				.adapter
				.map_user_to_object(claims)
				.with_access_token(access_token.to_string().into()),
		)
	}

	/// Complete a login: exchange `code`, fetch the user and attach the tokens.
	#[tracing::instrument(skip(self, code), fields(provider = self.adapter.identifier()))]
	pub async fn user(&self, code: &str) -> Result<User, ProviderError> {
		let tokens = self.exchange_code(code).await?;
		let user = self.user_from_token(tokens.access_token.expose()).await?;
		tracing::debug!(user_id = ?user.id(), "login completed");
		Ok(user.with_token(&tokens))
	}
}
