// /////////////////////////////////////////////////////////////////////////////
// Repo Connector
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The wire-level transport the connector drives. Implementations speak
//! whatever protocol the remote repository uses (HTTP, SFTP, ...); the
//! core only ever calls `peek`/`get`/`put` and classifies failures through
//! `classify`.

use crate::error::ErrorClass;
use crate::ports::ByteStreamListener;
use async_trait::async_trait;
use std::path::Path;

/// Transport failure, opaque to the core beyond its message and the
/// transporter's own classification of it.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// External transporter contract: `peek`, `get`, `put` against a URI, with
/// exception classification and a shutdown hook.
///
/// Implementations are assumed safe for concurrent `peek`/`get`/`put`
/// calls; the connector shares one transporter across every task it runs.
#[async_trait]
pub trait Transporter: Send + Sync {
    /// Checks that a URI exists without downloading its content.
    async fn peek(&self, uri: &str) -> Result<(), TransportError>;

    /// Downloads `uri` into `dest`. When `resume` is true the transporter
    /// issues a ranged request starting at `dest`'s current length and
    /// appends; on partial-response refusal it must truncate `dest` and
    /// restart, re-emitting `started` with a zero offset through
    /// `listener`.
    async fn get(
        &self,
        uri: &str,
        dest: &Path,
        resume: bool,
        listener: &(dyn ByteStreamListener + Send + Sync),
    ) -> Result<(), TransportError>;

    /// Uploads the contents of `src` to `uri`.
    async fn put(&self, uri: &str, src: &Path) -> Result<(), TransportError>;

    /// Classifies a transport failure as absent-on-remote vs. everything
    /// else.
    fn classify(&self, err: &TransportError) -> ErrorClass;

    /// Releases any resources the transporter holds (connection pools,
    /// sockets, ...). Idempotent.
    async fn close(&self);
}
