// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Generic OAuth 2.0 authorization-code host for pluggable OIDC providers.
//!
//! Provider crates implement [`OidcProviderAdapter`] (and
//! [`ConfigurableProvider`] to be built from configuration). This crate owns
//! everything that is the same for every provider: the authorization URL
//! parameters, `state` handling, the code exchange, the shared HTTP client
//! and the normalized [`User`] record.
//!
//! # Example
//!
//! ```rust,ignore
//! use socialauth_core::ProviderRegistry;
//! use socialauth_provider_okta::OktaProvider;
//!
//! let mut registry = ProviderRegistry::new();
//! registry.register_from_sources::<OktaProvider>(None)?;
//!
//! let okta = registry.driver("okta")?;
//! let redirect = okta.redirect()?;
//! // ... store redirect.state, send the user to redirect.url ...
//! okta.verify_state(stored_state.as_deref(), callback_state.as_deref())?;
//! let user = okta.user(&code).await?;
//! ```

pub mod adapter;
pub mod config;
pub mod error;
pub mod oauth2;
pub mod registry;
pub mod request;
pub mod scopes;
pub mod token;
pub mod user;

pub use adapter::{ConfigurableProvider, OidcProviderAdapter};
pub use config::{ConfigKey, ProviderConfig};
pub use error::{ConfigError, ProviderError};
pub use oauth2::{AuthorizationRedirect, OAuth2Core};
pub use registry::{build_core, ProviderRegistry};
pub use request::AuthorizationRequest;
pub use scopes::ScopeSet;
pub use token::{TokenAuthMethod, TokenFields, TokenResponse};
pub use user::{RawClaims, User, UserFields};

pub use socialauth_common_secret::SecretString;
