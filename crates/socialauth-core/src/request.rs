// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Generic authorization-URL construction.

use std::collections::BTreeMap;
use url::Url;

use crate::error::ProviderError;
use crate::scopes::ScopeSet;

/// Everything needed to turn a provider's authorize endpoint into the full
/// redirect URL.
///
/// Adapters receive this in [`crate::OidcProviderAdapter::auth_url`], compute
/// their endpoint and hand it back through [`AuthorizationRequest::from_base`].
#[derive(Debug, Clone, Copy)]
pub struct AuthorizationRequest<'a> {
	pub client_id: &'a str,
	pub redirect_uri: &'a str,
	pub scopes: &'a ScopeSet,
	/// CSRF token; `None` for stateless flows.
	pub state: Option<&'a str>,
	/// Extra query parameters (e.g. `prompt`, `login_hint`).
	pub parameters: &'a BTreeMap<String, String>,
}

impl AuthorizationRequest<'_> {
	/// Append the standard authorization-code parameters to `base_url`.
	///
	/// Parameter order is `client_id`, `redirect_uri`, `scope`,
	/// `response_type`, `state`, followed by the extras in key order. An extra
	/// never overrides a standard parameter.
	///
	/// # Errors
	///
	/// Returns [`ProviderError::InvalidUrl`] if `base_url` does not parse.
	pub fn from_base(&self, base_url: &str) -> Result<Url, ProviderError> {
		let mut url = Url::parse(base_url)?;

		{
			let mut query = url.query_pairs_mut();
			query
				.append_pair("client_id", self.client_id)
				.append_pair("redirect_uri", self.redirect_uri)
				.append_pair("scope", &self.scopes.joined())
				.append_pair("response_type", "code");
			if let Some(state) = self.state {
				query.append_pair("state", state);
			}
			for (key, value) in self.parameters {
				if !is_reserved(key) {
					query.append_pair(key, value);
				}
			}
		}

		Ok(url)
	}
}

fn is_reserved(key: &str) -> bool {
	matches!(
		key,
		"client_id" | "redirect_uri" | "scope" | "response_type" | "state"
	)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn query(url: &Url) -> Vec<(String, String)> {
		url.query_pairs()
			.map(|(k, v)| (k.into_owned(), v.into_owned()))
			.collect()
	}

	#[test]
	fn builds_standard_parameters_in_order() {
		let scopes = ScopeSet::new(["openid", "profile", "email"]);
		let parameters = BTreeMap::new();
		let request = AuthorizationRequest {
			client_id: "0oa1",
			redirect_uri: "https://app.example.com/callback",
			scopes: &scopes,
			state: Some("xyz"),
			parameters: &parameters,
		};

		let url = request.from_base("https://acme.okta.com/oauth2/v1/authorize").unwrap();
		assert_eq!(url.path(), "/oauth2/v1/authorize");
		assert_eq!(
			query(&url),
			vec![
				("client_id".to_string(), "0oa1".to_string()),
				(
					"redirect_uri".to_string(),
					"https://app.example.com/callback".to_string()
				),
				("scope".to_string(), "openid profile email".to_string()),
				("response_type".to_string(), "code".to_string()),
				("state".to_string(), "xyz".to_string()),
			]
		);
		assert!(url.as_str().contains("scope=openid+profile+email"));
	}

	#[test]
	fn stateless_request_has_no_state() {
		let scopes = ScopeSet::new(["openid"]);
		let parameters = BTreeMap::new();
		let request = AuthorizationRequest {
			client_id: "id",
			redirect_uri: "https://app.example.com/cb",
			scopes: &scopes,
			state: None,
			parameters: &parameters,
		};
		let url = request.from_base("https://idp.example.com/authorize").unwrap();
		assert!(!query(&url).iter().any(|(k, _)| k == "state"));
	}

	#[test]
	fn extras_cannot_override_standard_parameters() {
		let scopes = ScopeSet::new(["openid"]);
		let mut parameters = BTreeMap::new();
		parameters.insert("prompt".to_string(), "login".to_string());
		parameters.insert("state".to_string(), "forged".to_string());
		let request = AuthorizationRequest {
			client_id: "id",
			redirect_uri: "https://app.example.com/cb",
			scopes: &scopes,
			state: Some("real"),
			parameters: &parameters,
		};
		let url = request.from_base("https://idp.example.com/authorize").unwrap();
		let pairs = query(&url);
		assert!(pairs.contains(&("prompt".to_string(), "login".to_string())));
		assert_eq!(pairs.iter().filter(|(k, _)| k == "state").count(), 1);
		assert!(pairs.contains(&("state".to_string(), "real".to_string())));
	}

	#[test]
	fn malformed_base_is_invalid_url() {
		let scopes = ScopeSet::default();
		let parameters = BTreeMap::new();
		let request = AuthorizationRequest {
			client_id: "id",
			redirect_uri: "cb",
			scopes: &scopes,
			state: None,
			parameters: &parameters,
		};
		let err = request.from_base("/oauth2/v1/authorize").unwrap_err();
		assert!(matches!(err, ProviderError::InvalidUrl(_)));
	}
}
