// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Ordered, duplicate-free OAuth scope lists.

use serde::{Deserialize, Serialize};

/// Separator used by OIDC providers when scopes are sent as one parameter.
pub const SPACE_SEPARATOR: &str = " ";

/// An ordered set of scope identifiers.
///
/// Insertion order is preserved so the serialized `scope` parameter is stable,
/// and a scope that is already present is never added twice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeSet {
	scopes: Vec<String>,
	#[serde(default = "default_separator")]
	separator: String,
}

fn default_separator() -> String {
	SPACE_SEPARATOR.to_string()
}

impl Default for ScopeSet {
	fn default() -> Self {
		Self {
			scopes: Vec::new(),
			separator: default_separator(),
		}
	}
}

impl ScopeSet {
	/// Build a set from scopes, dropping duplicates and empty entries.
	pub fn new<I, S>(scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let mut set = Self::default();
		set.extend(scopes);
		set
	}

	/// Use a different separator when joining (some providers want `,`).
	pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
		self.separator = separator.into();
		self
	}

	/// Parse a scope string separated by spaces and/or commas.
	pub fn parse(scope_str: &str) -> Self {
		Self::new(
			scope_str
				.split([' ', ','])
				.map(str::trim)
				.filter(|s| !s.is_empty()),
		)
	}

	/// Append a scope unless it is already present. Returns whether it was added.
	pub fn insert(&mut self, scope: impl Into<String>) -> bool {
		let scope = scope.into();
		if scope.is_empty() || self.contains(&scope) {
			return false;
		}
		self.scopes.push(scope);
		true
	}

	/// Append every scope not already present, keeping the existing order.
	pub fn extend<I, S>(&mut self, scopes: I)
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		for scope in scopes {
			self.insert(scope);
		}
	}

	/// Replace the contents, keeping the separator.
	pub fn replace<I, S>(&mut self, scopes: I)
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.scopes.clear();
		self.extend(scopes);
	}

	pub fn contains(&self, scope: &str) -> bool {
		self.scopes.iter().any(|s| s == scope)
	}

	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.scopes.iter().map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.scopes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.scopes.is_empty()
	}

	pub fn separator(&self) -> &str {
		&self.separator
	}

	/// The value sent as the `scope` request parameter.
	pub fn joined(&self) -> String {
		self.scopes.join(&self.separator)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn keeps_insertion_order_and_drops_duplicates() {
		let scopes = ScopeSet::new(["openid", "profile", "email", "openid"]);
		assert_eq!(scopes.len(), 3);
		assert_eq!(scopes.joined(), "openid profile email");
	}

	#[test]
	fn extend_appends_only_new_scopes() {
		let mut scopes = ScopeSet::new(["openid", "profile", "email"]);
		scopes.extend(["email", "groups"]);
		assert_eq!(scopes.joined(), "openid profile email groups");
	}

	#[test]
	fn replace_discards_previous_scopes() {
		let mut scopes = ScopeSet::new(["openid", "profile"]).with_separator(",");
		scopes.replace(["phone", "address"]);
		assert_eq!(scopes.joined(), "phone,address");
		assert_eq!(scopes.separator(), ",");
	}

	#[test]
	fn parse_accepts_spaces_and_commas() {
		assert_eq!(
			ScopeSet::parse("openid profile,email").joined(),
			"openid profile email"
		);
		assert_eq!(
			ScopeSet::parse("  openid  ,  email  ").joined(),
			"openid email"
		);
		assert!(ScopeSet::parse("   ").is_empty());
	}

	#[test]
	fn empty_scopes_are_ignored() {
		let mut scopes = ScopeSet::default();
		assert!(!scopes.insert(""));
		assert!(scopes.is_empty());
		assert_eq!(scopes.joined(), "");
	}
}
