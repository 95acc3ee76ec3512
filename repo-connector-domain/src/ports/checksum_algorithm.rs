// /////////////////////////////////////////////////////////////////////////////
// Repo Connector
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! A checksum algorithm is externally supplied: the core only needs a
//! stable name, a file-extension tag, and a way to start a fresh running
//! digest.

/// An in-progress digest computation for one algorithm.
///
/// Implementations are expected to be cheap to create and are never shared
/// across threads; the calculator owns one per enabled algorithm.
pub trait RunningDigest: Send {
    fn update(&mut self, bytes: &[u8]);

    /// Returns the lowercase hex digest of the bytes seen so far, without
    /// consuming or otherwise disturbing the running computation — callers
    /// may keep calling `update` afterward.
    fn finish_hex(&self) -> String;
}

/// A stateful digest factory plus the algorithm's stable identity.
///
/// Implementations are supplied by the repository layout
/// (`algorithm_factories()`); the core never hardcodes a specific hash
/// function.
pub trait ChecksumAlgorithm: Send + Sync {
    /// Stable algorithm name, e.g. `"SHA-1"`, `"MD5"`, `"SHA-256"`.
    fn name(&self) -> &str;

    /// File-extension tag used for the sidecar file, e.g. `"sha1"`.
    fn extension(&self) -> &str;

    /// Starts a new, empty running digest.
    fn new_digest(&self) -> Box<dyn RunningDigest>;
}
