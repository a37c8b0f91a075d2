// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Redacting wrapper for OAuth credentials.
//!
//! Client secrets, authorization codes, access tokens and refresh tokens all
//! pass through the login flow. [`Secret<T>`] keeps them out of logs, config
//! dumps and error messages:
//!
//! - `Debug` prints `Secret("[REDACTED]")`, `Display` prints `[REDACTED]`
//! - `Serialize` writes `"[REDACTED]"`; `Deserialize` reads the real value
//! - the inner value is zeroized on drop
//! - reading the value requires an explicit [`Secret::expose`]
//!
//! ```
//! use socialauth_common_secret::SecretString;
//!
//! let client_secret = SecretString::new("0oa-shh".to_string());
//! assert_eq!(format!("{client_secret}"), "[REDACTED]");
//! assert_eq!(client_secret.expose(), "0oa-shh");
//! ```
//!
//! With `tracing`, both `%secret` and `?secret` field captures go through
//! the redacted `Display`/`Debug` impls.

use std::fmt;
use zeroize::Zeroize;

/// Placeholder written wherever a secret would otherwise appear.
pub const REDACTED: &str = "[REDACTED]";

/// A value that must never be printed or serialized in the clear.
///
/// There is deliberately no `Deref`; call sites opt in with [`Secret::expose`].
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct Secret<T>
where
	T: Zeroize,
{
	inner: T,
}

/// The common case: a secret string such as a client secret or bearer token.
pub type SecretString = Secret<String>;

impl<T> Secret<T>
where
	T: Zeroize,
{
	pub fn new(inner: T) -> Self {
		Self { inner }
	}

	/// Borrow the wrapped value.
	pub fn expose(&self) -> &T {
		&self.inner
	}
}

impl SecretString {
	/// True when the wrapped string is empty. Used by config validation.
	pub fn is_empty(&self) -> bool {
		self.inner.is_empty()
	}
}

impl From<String> for SecretString {
	fn from(value: String) -> Self {
		Self::new(value)
	}
}

impl From<&str> for SecretString {
	fn from(value: &str) -> Self {
		Self::new(value.to_string())
	}
}

impl<T> Clone for Secret<T>
where
	T: Zeroize + Clone,
{
	fn clone(&self) -> Self {
		Self::new(self.inner.clone())
	}
}

impl<T> fmt::Debug for Secret<T>
where
	T: Zeroize,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Secret").field(&REDACTED).finish()
	}
}

impl<T> fmt::Display for Secret<T>
where
	T: Zeroize,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

impl<T> PartialEq for Secret<T>
where
	T: Zeroize + PartialEq,
{
	fn eq(&self, other: &Self) -> bool {
		self.inner == other.inner
	}
}

impl<T> Eq for Secret<T> where T: Zeroize + Eq {}

#[cfg(feature = "serde")]
mod serde_impl {
	use super::{Secret, REDACTED};
	use serde::{Deserialize, Deserializer, Serialize, Serializer};
	use zeroize::Zeroize;

	impl<T> Serialize for Secret<T>
	where
		T: Serialize + Zeroize,
	{
		fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
		where
			S: Serializer,
		{
			serializer.serialize_str(REDACTED)
		}
	}

	impl<'de, T> Deserialize<'de> for Secret<T>
	where
		T: Deserialize<'de> + Zeroize,
	{
		fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
		where
			D: Deserializer<'de>,
		{
			T::deserialize(deserializer).map(Secret::new)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn debug_hides_client_secret() {
		let secret = SecretString::from("okta-client-secret");
		let out = format!("{secret:?}");
		assert_eq!(out, "Secret(\"[REDACTED]\")");
		assert!(!out.contains("okta-client-secret"));
	}

	#[test]
	fn display_hides_bearer_token() {
		let token = SecretString::from("eyJhbGciOiJSUzI1NiJ9.payload");
		assert_eq!(token.to_string(), REDACTED);
	}

	#[test]
	fn expose_returns_value() {
		let token = SecretString::from("abc");
		assert_eq!(token.expose(), "abc");
	}

	#[test]
	fn empty_check() {
		assert!(SecretString::from("").is_empty());
		assert!(!SecretString::from("x").is_empty());
	}

	#[test]
	fn equality_uses_inner_value() {
		assert_eq!(SecretString::from("a"), SecretString::from("a"));
		assert_ne!(SecretString::from("a"), SecretString::from("b"));
	}

	#[test]
	fn optional_secret_stays_redacted() {
		let refresh: Option<SecretString> = Some("refresh-123".into());
		let out = format!("{refresh:?}");
		assert!(out.contains(REDACTED));
		assert!(!out.contains("refresh-123"));
	}

	#[cfg(feature = "serde")]
	#[test]
	fn serde_redacts_on_write_and_reads_real_value() {
		let secret = SecretString::from("hunter2");
		assert_eq!(serde_json::to_string(&secret).unwrap(), "\"[REDACTED]\"");

		let parsed: SecretString = serde_json::from_str("\"hunter2\"").unwrap();
		assert_eq!(parsed.expose(), "hunter2");
	}
}

#[cfg(test)]
mod proptests {
	use super::*;
	use proptest::prelude::*;

	proptest! {
		#[test]
		fn formatted_output_never_contains_value(inner in "[a-zA-Z0-9_.-]{4,64}") {
			prop_assume!(!REDACTED.contains(&inner));
			prop_assume!(!"Secret".contains(&inner));

			let secret = SecretString::new(inner.clone());
			let debugged = format!("{secret:?}");
			prop_assert!(!debugged.contains(&inner));
			let displayed = format!("{secret}");
			prop_assert!(!displayed.contains(&inner));
		}

		#[test]
		fn clone_keeps_value(inner in ".*") {
			let secret = SecretString::new(inner.clone());
			let cloned = secret.clone();
			prop_assert_eq!(cloned.expose(), &inner);
		}
	}
}
