// /////////////////////////////////////////////////////////////////////////////
// Repo Connector
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Port Traits
//!
//! Capability sets the core consumes but never implements: the transporter,
//! the repository layout, the checksum policy, the checksum algorithm
//! factory, a provided-checksum source, and the transfer listener. Every
//! concrete implementation (HTTP client, Maven2 layout, "accept first
//! match" policy, ...) lives outside this crate; the core is wired against
//! these traits only.
//!
//! Following the hexagonal pattern this workspace uses for its other
//! infrastructure ports: I/O-bound capabilities ([`Transporter`]) are
//! `async_trait`, while pure decision logic ([`ChecksumPolicy`],
//! [`RepositoryLayout`]) stays synchronous.

mod checksum_algorithm;
mod checksum_policy;
mod provided_checksums;
mod repository_layout;
mod transfer_listener;
mod transporter;

pub use checksum_algorithm::{ChecksumAlgorithm, RunningDigest};
pub use checksum_policy::ChecksumPolicy;
pub use provided_checksums::ProvidedChecksumSource;
pub use repository_layout::RepositoryLayout;
pub use transfer_listener::{ByteStreamListener, TransferEvent, TransferListener};
pub use transporter::{TransportError, Transporter};
