// /////////////////////////////////////////////////////////////////////////////
// Repo Connector
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Repo Connector Domain
//!
//! Pure, reusable types for the basic repository connector: the entities
//! and value objects that describe a transfer, and the port traits
//! (transporter, layout, checksum policy/algorithm, listener) that the
//! core crate is wired against.
//!
//! ## Architecture
//!
//! Following the hexagonal layering of the rest of this workspace:
//!
//! - [`entities`] and [`value_objects`] are plain data, validated at
//!   construction, with no I/O.
//! - [`ports`] defines the capability sets external collaborators (the
//!   transporter, the repository layout, the checksum policy) must supply.
//!   Domain traits here are synchronous unless the capability is
//!   inherently I/O-bound (the transporter), matching the convention that
//!   CPU-bound domain logic stays sync while I/O ports may be async.
//! - [`error`] is the closed error taxonomy every fallible operation in
//!   this workspace propagates through `Result`.
//!
//! This crate has no knowledge of dependency resolution, HTTP, or any
//! specific repository layout — those are the caller's concern.

pub mod entities;
pub mod error;
pub mod ports;
pub mod value_objects;

pub use error::ConnectorError;
