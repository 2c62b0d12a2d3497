// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Apple Token Authorizer - Sign in with Apple request authorizer
//!
//! This crate verifies Apple identity tokens presented as bearer tokens and
//! turns the result into an allow/deny decision for an API gateway.
//!
//! ## Modules
//!
//! - `auth` - Token verification and policy decisions
//! - `api` - HTTP host adapter (Axum)
//! - `config` - Environment configuration
//! - `telemetry` - Logging setup

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod state;
pub mod telemetry;
