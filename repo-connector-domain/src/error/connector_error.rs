// /////////////////////////////////////////////////////////////////////////////
// Repo Connector
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

use thiserror::Error;

/// The source of an expected checksum digest.
///
/// Ordering between variants matters: `Provided` is always validated before
/// `RemoteIncluded`, which is validated before `RemoteExternal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChecksumKind {
    /// Supplied out-of-band by the caller.
    Provided,
    /// Returned inline in the transport's response headers/body.
    RemoteIncluded,
    /// Fetched as a sibling URI (e.g. `foo.jar.sha1`).
    RemoteExternal,
}

/// How the transporter classifies a failed `peek`/`get`/`put`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    NotFound,
    Other,
}

/// A validated digest mismatch, carrying enough detail for the policy to
/// decide whether the surrounding retry should tolerate it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumFailure {
    pub algorithm: String,
    pub kind: ChecksumKind,
    pub expected: String,
    pub actual: String,
    /// True for failures attributable to a transient cause (e.g. a
    /// truncated response) rather than a definitive content mismatch.
    pub retry_worthy: bool,
}

/// Domain-specific errors for the repository connector.
///
/// Each variant maps onto one of the failure kinds in the error taxonomy:
/// not-found, transport failure, checksum failure/missing, local I/O, lock
/// timeout, missing connector, closed connector, and cancellation.
#[derive(Error, Debug, Clone)]
pub enum ConnectorError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("transport failure: {0}")]
    TransportFailure(String),

    #[error(
        "checksum mismatch for {algorithm} ({kind:?}): expected {expected}, actual {actual}, retry_worthy={retry_worthy}"
    )]
    ChecksumFailure {
        algorithm: String,
        kind: ChecksumKind,
        expected: String,
        actual: String,
        retry_worthy: bool,
    },

    #[error("no checksum matched and the policy requires verification")]
    ChecksumMissing,

    #[error("local io error: {0}")]
    LocalIo(String),

    #[error("lock wait timed out after {0}ms")]
    LockTimeout(u64),

    #[error("no connector available for this repository")]
    NoConnector,

    #[error("connector is closed")]
    ConnectorClosed,

    #[error("cancelled: {0}")]
    Cancelled(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl ConnectorError {
    pub fn checksum_failure(failure: ChecksumFailure) -> Self {
        Self::ChecksumFailure {
            algorithm: failure.algorithm,
            kind: failure.kind,
            expected: failure.expected,
            actual: failure.actual,
            retry_worthy: failure.retry_worthy,
        }
    }

    /// Whether the failure represents a transient condition worth retrying
    /// at a higher level (outside the one in-task retry this crate already
    /// performs for checksum mismatches).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ConnectorError::LockTimeout(_) | ConnectorError::LocalIo(_) | ConnectorError::TransportFailure(_)
        )
    }

    pub fn category(&self) -> &'static str {
        match self {
            ConnectorError::NotFound(_) => "not_found",
            ConnectorError::TransportFailure(_) => "transport",
            ConnectorError::ChecksumFailure { .. } => "checksum",
            ConnectorError::ChecksumMissing => "checksum",
            ConnectorError::LocalIo(_) => "io",
            ConnectorError::LockTimeout(_) => "lock_timeout",
            ConnectorError::NoConnector => "connector",
            ConnectorError::ConnectorClosed => "connector",
            ConnectorError::Cancelled(_) => "cancellation",
            ConnectorError::InvalidConfiguration(_) => "configuration",
        }
    }
}

impl From<std::io::Error> for ConnectorError {
    fn from(err: std::io::Error) -> Self {
        ConnectorError::LocalIo(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverable_errors_are_flagged() {
        assert!(ConnectorError::LockTimeout(3000).is_recoverable());
        assert!(!ConnectorError::ConnectorClosed.is_recoverable());
    }

    #[test]
    fn checksum_failure_round_trips_fields() {
        let failure = ChecksumFailure {
            algorithm: "SHA-1".to_string(),
            kind: ChecksumKind::RemoteExternal,
            expected: "abc".to_string(),
            actual: "def".to_string(),
            retry_worthy: true,
        };
        let err = ConnectorError::checksum_failure(failure);
        match err {
            ConnectorError::ChecksumFailure { algorithm, expected, actual, .. } => {
                assert_eq!(algorithm, "SHA-1");
                assert_eq!(expected, "abc");
                assert_eq!(actual, "def");
            }
            _ => panic!("wrong variant"),
        }
    }
}
