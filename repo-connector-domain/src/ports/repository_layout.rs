// /////////////////////////////////////////////////////////////////////////////
// Repo Connector
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Maps an artifact or metadata entity to a URI and a list of external
//! checksum locations, and enumerates the checksum algorithms the
//! repository supports.

use crate::entities::Entity;
use crate::error::ConnectorError;
use crate::ports::ChecksumAlgorithm;
use crate::value_objects::{ChecksumLocation, Location};
use std::sync::Arc;

/// Layout contract the connector is constructed against. One layout
/// instance is shared across all tasks a connector runs.
pub trait RepositoryLayout: Send + Sync {
    /// The relative URI for an entity. `upload` distinguishes GET-layout
    /// from PUT-layout when a repository lays these out differently.
    fn location_of(&self, entity: &Entity, upload: bool) -> Result<String, ConnectorError>;

    /// The external checksum sidecar locations for an entity, relative to
    /// its already-resolved base URI.
    fn checksum_locations_of(&self, entity: &Entity, upload: bool, base_uri: &str) -> Vec<ChecksumLocation>;

    /// Every checksum algorithm this repository validates against, in the
    /// order validation should consider them.
    fn algorithm_factories(&self) -> Vec<Arc<dyn ChecksumAlgorithm>>;

    /// Convenience combining [`Self::location_of`] and
    /// [`Self::checksum_locations_of`] into one [`Location`] value object.
    fn resolve(&self, entity: &Entity, upload: bool) -> Result<Location, ConnectorError> {
        let uri = self.location_of(entity, upload)?;
        let checksum_locations = self.checksum_locations_of(entity, upload, &uri);
        Ok(Location::new(uri, checksum_locations))
    }
}
