// /////////////////////////////////////////////////////////////////////////////
// Repo Connector
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The output of a layout lookup: a relative URI for the entity itself,
//! plus the set of checksum sidecar locations the layout knows about.

use crate::value_objects::ChecksumLocation;
use std::collections::HashSet;

/// A forward-slash relative URI and its associated checksum sidecar
/// locations, as produced by [`crate::ports::RepositoryLayout`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    uri: String,
    checksum_locations: HashSet<ChecksumLocation>,
}

impl Location {
    pub fn new(uri: impl Into<String>, checksum_locations: impl IntoIterator<Item = ChecksumLocation>) -> Self {
        Self {
            uri: uri.into(),
            checksum_locations: checksum_locations.into_iter().collect(),
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn checksum_locations(&self) -> impl Iterator<Item = &ChecksumLocation> {
        self.checksum_locations.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_checksum_locations() {
        let loc = Location::new(
            "org/example/artifact/1.0/artifact-1.0.jar",
            [ChecksumLocation::new("SHA-1", "artifact-1.0.jar.sha1")],
        );
        assert_eq!(loc.uri(), "org/example/artifact/1.0/artifact-1.0.jar");
        assert_eq!(loc.checksum_locations().count(), 1);
    }
}
