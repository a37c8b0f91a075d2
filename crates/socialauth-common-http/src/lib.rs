// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP client construction.
//!
//! Every outbound call to an identity provider (token exchange, userinfo)
//! goes through a client built here so they all carry the same User-Agent
//! and an upper bound on how long a login attempt can block.

mod client;

pub use client::{builder, new_client, user_agent, DEFAULT_TIMEOUT};
