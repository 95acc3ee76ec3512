// /////////////////////////////////////////////////////////////////////////////
// Repo Connector
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! A sibling URI that is expected to carry the expected digest for a given
//! checksum algorithm (the REMOTE_EXTERNAL checksum kind).

/// Pairs a checksum algorithm's name (e.g. `"SHA-1"`) with the URI at which
/// its sidecar file is expected to live, relative to the entity's base
/// location.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChecksumLocation {
    algorithm_name: String,
    uri: String,
}

impl ChecksumLocation {
    pub fn new(algorithm_name: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            algorithm_name: algorithm_name.into(),
            uri: uri.into(),
        }
    }

    pub fn algorithm_name(&self) -> &str {
        &self.algorithm_name
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }
}
