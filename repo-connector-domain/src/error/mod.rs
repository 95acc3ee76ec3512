// /////////////////////////////////////////////////////////////////////////////
// Repo Connector
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Error Module
//!
//! Structured errors for the repository connector domain layer, categorized
//! by failure class so callers can decide retry/recovery strategy without
//! string matching.

mod connector_error;

pub use connector_error::{ChecksumFailure, ChecksumKind, ConnectorError, ErrorClass};
