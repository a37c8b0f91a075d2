// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The provider-neutral user record produced by a successful login.

use serde::Serialize;
use serde_json::{Map, Value};
use socialauth_common_secret::SecretString;

use crate::scopes::ScopeSet;
use crate::token::TokenResponse;

/// Claims as returned by a provider's userinfo endpoint.
pub type RawClaims = Map<String, Value>;

/// Fields an adapter extracts from [`RawClaims`].
///
/// Everything is optional except `email_verified`, which the adapter resolves
/// to a concrete default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserFields {
	pub id: Option<String>,
	pub email: Option<String>,
	pub email_verified: bool,
	pub nickname: Option<String>,
	pub name: Option<String>,
	pub first_name: Option<String>,
	pub last_name: Option<String>,
	pub profile_url: Option<String>,
	pub address: Option<Value>,
	pub phone: Option<String>,
}

/// A normalized user.
///
/// Built once per login from the mapped [`UserFields`] and the untouched
/// [`RawClaims`]. Token data from the code exchange may be attached with
/// [`User::with_token`], which consumes the value.
#[derive(Debug, Clone, Serialize)]
pub struct User {
	id: Option<String>,
	email: Option<String>,
	email_verified: bool,
	nickname: Option<String>,
	name: Option<String>,
	first_name: Option<String>,
	last_name: Option<String>,
	profile_url: Option<String>,
	address: Option<Value>,
	phone: Option<String>,
	raw: RawClaims,
	#[serde(skip)]
	token: Option<SecretString>,
	#[serde(skip)]
	refresh_token: Option<SecretString>,
	#[serde(skip_serializing_if = "Option::is_none")]
	expires_in: Option<u64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	approved_scopes: Option<ScopeSet>,
}

impl User {
	/// Combine mapped fields with the raw claims they came from.
	pub fn from_claims(raw: RawClaims, fields: UserFields) -> Self {
		Self {
			id: fields.id,
			email: fields.email,
			email_verified: fields.email_verified,
			nickname: fields.nickname,
			name: fields.name,
			first_name: fields.first_name,
			last_name: fields.last_name,
			profile_url: fields.profile_url,
			address: fields.address,
			phone: fields.phone,
			raw,
			token: None,
			refresh_token: None,
			expires_in: None,
			approved_scopes: None,
		}
	}

	/// Attach the access token used to fetch this user.
	pub fn with_access_token(mut self, token: SecretString) -> Self {
		self.token = Some(token);
		self
	}

	/// Attach everything the token endpoint returned.
	pub fn with_token(mut self, response: &TokenResponse) -> Self {
		self.token = Some(response.access_token.clone());
		self.refresh_token = response.refresh_token.clone();
		self.expires_in = response.expires_in;
		self.approved_scopes = response.scope.as_deref().map(ScopeSet::parse);
		self
	}

	pub fn id(&self) -> Option<&str> {
		self.id.as_deref()
	}

	pub fn email(&self) -> Option<&str> {
		self.email.as_deref()
	}

	pub fn email_verified(&self) -> bool {
		self.email_verified
	}

	pub fn nickname(&self) -> Option<&str> {
		self.nickname.as_deref()
	}

	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	pub fn first_name(&self) -> Option<&str> {
		self.first_name.as_deref()
	}

	pub fn last_name(&self) -> Option<&str> {
		self.last_name.as_deref()
	}

	pub fn profile_url(&self) -> Option<&str> {
		self.profile_url.as_deref()
	}

	pub fn address(&self) -> Option<&Value> {
		self.address.as_ref()
	}

	pub fn phone(&self) -> Option<&str> {
		self.phone.as_deref()
	}

	/// The claims exactly as the provider returned them.
	pub fn raw(&self) -> &RawClaims {
		&self.raw
	}

	pub fn token(&self) -> Option<&SecretString> {
		self.token.as_ref()
	}

	pub fn refresh_token(&self) -> Option<&SecretString> {
		self.refresh_token.as_ref()
	}

	pub fn expires_in(&self) -> Option<u64> {
		self.expires_in
	}

	pub fn approved_scopes(&self) -> Option<&ScopeSet> {
		self.approved_scopes.as_ref()
	}
}

/// Read a claim as a string. Numbers are stringified; other types are `None`.
pub fn claim_string(claims: &RawClaims, key: &str) -> Option<String> {
	match claims.get(key)? {
		Value::String(s) => Some(s.clone()),
		Value::Number(n) => Some(n.to_string()),
		_ => None,
	}
}

/// Read a boolean claim, accepting `true`/`false` and their string forms.
pub fn claim_bool(claims: &RawClaims, key: &str) -> Option<bool> {
	match claims.get(key)? {
		Value::Bool(b) => Some(*b),
		Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
		Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
		_ => None,
	}
}

/// Read a claim as an arbitrary JSON value, treating `null` as absent.
pub fn claim_value(claims: &RawClaims, key: &str) -> Option<Value> {
	claims.get(key).filter(|v| !v.is_null()).cloned()
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn claims(value: Value) -> RawClaims {
		match value {
			Value::Object(map) => map,
			_ => panic!("test claims must be an object"),
		}
	}

	#[test]
	fn claim_string_handles_strings_numbers_and_others() {
		let c = claims(json!({"a": "x", "b": 42, "c": true, "d": null}));
		assert_eq!(claim_string(&c, "a"), Some("x".to_string()));
		assert_eq!(claim_string(&c, "b"), Some("42".to_string()));
		assert_eq!(claim_string(&c, "c"), None);
		assert_eq!(claim_string(&c, "d"), None);
		assert_eq!(claim_string(&c, "missing"), None);
	}

	#[test]
	fn claim_bool_accepts_string_forms() {
		let c = claims(json!({"a": true, "b": "false", "c": "TRUE", "d": 1}));
		assert_eq!(claim_bool(&c, "a"), Some(true));
		assert_eq!(claim_bool(&c, "b"), Some(false));
		assert_eq!(claim_bool(&c, "c"), Some(true));
		assert_eq!(claim_bool(&c, "d"), None);
		assert_eq!(claim_bool(&c, "missing"), None);
	}

	#[test]
	fn claim_value_drops_null() {
		let c = claims(json!({"address": {"country": "NZ"}, "phone": null}));
		assert_eq!(claim_value(&c, "address"), Some(json!({"country": "NZ"})));
		assert_eq!(claim_value(&c, "phone"), None);
	}

	#[test]
	fn from_claims_keeps_raw_untouched() {
		let raw = claims(json!({"sub": "u1", "custom": [1, 2, 3]}));
		let user = User::from_claims(
			raw.clone(),
			UserFields {
				id: Some("u1".to_string()),
				..Default::default()
			},
		);
		assert_eq!(user.raw(), &raw);
		assert_eq!(user.id(), Some("u1"));
		assert!(user.token().is_none());
	}

	#[test]
	fn serialized_user_never_contains_tokens() {
		let response: TokenResponse = serde_json::from_str(
			r#"{"access_token": "at-secret", "refresh_token": "rt-secret", "token_type": "Bearer", "expires_in": 3600, "scope": "openid email"}"#,
		)
		.unwrap();
		let user = User::from_claims(RawClaims::new(), UserFields::default()).with_token(&response);

		assert_eq!(user.token().map(|t| t.expose().as_str()), Some("at-secret"));
		assert_eq!(user.expires_in(), Some(3600));
		assert!(user.approved_scopes().unwrap().contains("email"));

		let json = serde_json::to_string(&user).unwrap();
		assert!(!json.contains("at-secret"));
		assert!(!json.contains("rt-secret"));
		assert!(!format!("{user:?}").contains("at-secret"));
	}
}
