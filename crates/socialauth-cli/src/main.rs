// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use socialauth_core::{OAuth2Core, ProviderRegistry, User};
use socialauth_provider_okta::OktaProvider;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// socialauth - OAuth 2.0 / OpenID Connect login helper
#[derive(Parser, Debug)]
#[command(name = "socialauth", version, about, long_about = None)]
struct Args {
	/// Path to the providers TOML file (default: /etc/socialauth/providers.toml)
	#[arg(short, long, env = "SOCIALAUTH_CONFIG")]
	config: Option<PathBuf>,

	/// Log output format
	#[arg(long, value_enum, env = "SOCIALAUTH_LOG_FORMAT", default_value = "pretty")]
	log_format: LogFormat,

	/// Provider to use
	#[arg(short, long, env = "SOCIALAUTH_PROVIDER", default_value = "okta")]
	provider: String,

	#[command(subcommand)]
	command: Command,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormat {
	Pretty,
	Compact,
	Json,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Print the authorization URL to send a user to
	AuthorizeUrl {
		/// Use this state instead of generating one
		#[arg(long, conflicts_with = "stateless")]
		state: Option<String>,
		/// Omit the state parameter
		#[arg(long)]
		stateless: bool,
		/// Additional scope (repeatable)
		#[arg(long = "scope", value_name = "SCOPE")]
		scopes: Vec<String>,
		/// Extra query parameter (repeatable: --param KEY=VALUE)
		#[arg(long = "param", value_name = "KEY=VALUE")]
		params: Vec<String>,
	},
	/// Print the token endpoint URL
	TokenUrl,
	/// Exchange an authorization code and print the user
	Exchange {
		/// Authorization code from the callback
		#[arg(long)]
		code: String,
		/// State received on the callback
		#[arg(long, requires = "expected_state")]
		state: Option<String>,
		/// State issued with the authorization URL
		#[arg(long)]
		expected_state: Option<String>,
	},
	/// Fetch the user for an access token
	Userinfo {
		/// Access token
		#[arg(long, env = "SOCIALAUTH_ACCESS_TOKEN", hide_env_values = true)]
		token: String,
	},
}

fn init_tracing(format: LogFormat) {
	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new("socialauth=info"));

	match format {
		LogFormat::Json => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().json().with_writer(std::io::stderr))
				.init();
		}
		LogFormat::Compact => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().compact().with_writer(std::io::stderr))
				.init();
		}
		LogFormat::Pretty => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().with_writer(std::io::stderr))
				.init();
		}
	}
}

fn build_registry(config: Option<&std::path::Path>) -> Result<ProviderRegistry> {
	let mut registry = ProviderRegistry::new();
	registry
		.register_from_sources::<OktaProvider>(config)
		.context("failed to configure Okta provider")?;
	Ok(registry)
}

fn parse_params(params: &[String]) -> Result<Vec<(String, String)>> {
	params
		.iter()
		.map(|p| {
			p.split_once('=')
				.map(|(k, v)| (k.to_string(), v.to_string()))
				.with_context(|| format!("invalid parameter {p:?}, expected KEY=VALUE"))
		})
		.collect()
}

fn user_json(user: &User) -> Result<String> {
	serde_json::to_string_pretty(user).context("failed to serialize user")
}

async fn run(core: OAuth2Core, command: Command) -> Result<()> {
	match command {
		Command::AuthorizeUrl {
			state,
			stateless,
			scopes,
			params,
		} => {
			let mut core = core.with_scopes(scopes).with_parameters(parse_params(&params)?);
			if stateless {
				core = core.stateless();
			}
			let (url, state) = match state {
				Some(state) => (core.authorization_url(Some(&state))?, Some(state)),
				None => {
					let redirect = core.redirect()?;
					(redirect.url, redirect.state)
				}
			};
			println!(
				"{}",
				serde_json::to_string_pretty(&json!({ "url": url.as_str(), "state": state }))?
			);
		}
		Command::TokenUrl => {
			println!("{}", core.adapter().token_url());
		}
		Command::Exchange {
			code,
			state,
			expected_state,
		} => {
			if expected_state.is_some() {
				core.verify_state(expected_state.as_deref(), state.as_deref())?;
			}
			let user = core.user(&code).await?;
			info!(user_id = ?user.id(), "login completed");
			println!("{}", user_json(&user)?);
		}
		Command::Userinfo { token } => {
			let user = core.user_from_token(&token).await?;
			println!("{}", user_json(&user)?);
		}
	}
	Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
	let args = Args::parse();
	init_tracing(args.log_format);

	let registry = build_registry(args.config.as_deref())?;
	let core = registry.driver(&args.provider)?;
	info!(provider = %args.provider, "starting socialauth");

	run(OAuth2Core::clone(&core), args.command).await
}

#[cfg(test)]
mod tests {
	use super::*;
	use clap::CommandFactory;

	#[test]
	fn verify_cli() {
		Args::command().debug_assert();
	}

	#[test]
	fn parses_authorize_url_flags() {
		let args = Args::try_parse_from([
			"socialauth",
			"--log-format",
			"json",
			"authorize-url",
			"--scope",
			"groups",
			"--scope",
			"offline_access",
			"--param",
			"prompt=login",
		])
		.unwrap();
		assert_eq!(args.log_format, LogFormat::Json);
		match args.command {
			Command::AuthorizeUrl { scopes, params, .. } => {
				assert_eq!(scopes, vec!["groups", "offline_access"]);
				assert_eq!(params, vec!["prompt=login"]);
			}
			other => panic!("unexpected command: {other:?}"),
		}
	}

	#[test]
	fn state_and_stateless_conflict() {
		let result = Args::try_parse_from([
			"socialauth",
			"authorize-url",
			"--state",
			"abc",
			"--stateless",
		]);
		assert!(result.is_err());
	}

	#[test]
	fn exchange_state_requires_expected_state() {
		let result = Args::try_parse_from(["socialauth", "exchange", "--code", "c", "--state", "s"]);
		assert!(result.is_err());
	}

	#[test]
	fn parse_params_splits_on_first_equals() {
		let params = parse_params(&["a=b=c".to_string(), "k=".to_string()]).unwrap();
		assert_eq!(
			params,
			vec![("a".to_string(), "b=c".to_string()), ("k".to_string(), String::new())]
		);
		assert!(parse_params(&["novalue".to_string()]).is_err());
	}
}
