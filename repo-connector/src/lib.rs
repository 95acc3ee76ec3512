// /////////////////////////////////////////////////////////////////////////////
// Repo Connector
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

// Production code safety enforced via CI and `make lint-strict`
// (lib/bins checked separately from tests - tests may use unwrap/expect)

//! # Repo Connector
//!
//! A basic repository connector: moves artifact and metadata files between
//! a local cache and remote repositories, with resumable transfers,
//! cross-process partial-file coordination, and pluggable checksum
//! validation.
//!
//! ## Architecture
//!
//! - [`checksum`] computes streaming multi-algorithm digests and validates
//!   them against a pluggable policy across provided/included/external
//!   checksum sources.
//! - [`lockfile`] and [`partial_file`] coordinate resumable downloads
//!   across concurrent processes sharing the same local cache.
//! - `listener` adapts the byte-stream-level callbacks a transporter drives
//!   into the richer, ordered [`repo_connector_domain::ports::TransferListener`]
//!   events.
//! - [`connector`] bounds concurrent transfers with a worker pool and wires
//!   [`tasks`] (peek/get/put runners) against a transporter and a
//!   repository layout.
//! - [`config`] resolves the recognized session options, layered
//!   defaults → file → override, with per-repository pinning.
//! - [`testkit`] holds in-memory test doubles for the port traits, shared by
//!   this crate's own tests and by downstream integration tests.

pub mod checksum;
pub mod config;
pub mod connector;
pub mod listener;
pub mod lockfile;
pub mod partial_file;
pub mod tasks;
pub mod testkit;
mod util;

pub use repo_connector_domain::ConnectorError;
