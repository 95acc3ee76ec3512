// /////////////////////////////////////////////////////////////////////////////
// Repo Connector
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The checksum policy decides whether a computed digest is acceptable,
//! whether validation should short-circuit once a match is found, and
//! whether a validated mismatch should still be tolerated.
//!
//! Domain traits here are synchronous: these are pure decisions, not I/O.

use crate::error::{ChecksumFailure, ChecksumKind, ConnectorError};

/// Pluggable policy consumed by [`crate::ports::ChecksumAlgorithm`]-keyed
/// validation in the checksum validator.
///
/// Every "may throw" callback returns `Result` here; the validator
/// propagates the error as-is.
pub trait ChecksumPolicy: Send + Sync {
    /// Called when a computed digest matches an expected one.
    ///
    /// Returns `true` to short-circuit the remaining kinds/algorithms as
    /// accepted; a policy configured to "inspect all" always returns
    /// `false` and relies on [`Self::on_no_more_checksums`].
    fn on_checksum_match(&self, algorithm: &str, kind: ChecksumKind) -> bool;

    /// Called when a computed digest does not match an expected one.
    fn on_checksum_mismatch(&self, algorithm: &str, kind: ChecksumKind, failure: &ChecksumFailure)
        -> Result<(), ConnectorError>;

    /// Called when an expected checksum could not be evaluated (e.g. the
    /// computed digest itself errored, or the sidecar fetch failed).
    fn on_checksum_error(&self, algorithm: &str, kind: ChecksumKind, failure: &ConnectorError);

    /// Called once validation has walked every configured kind without a
    /// short-circuiting match.
    fn on_no_more_checksums(&self) -> Result<(), ConnectorError>;

    /// Called when a checksum-failure retry is about to be attempted.
    fn on_transfer_retry(&self);

    /// Called when the retry budget is exhausted; the return value decides
    /// whether the surrounding task should accept the file anyway
    /// (`true`) or surface the failure (`false`).
    fn on_transfer_checksum_failure(&self, failure: &ChecksumFailure) -> bool;
}
