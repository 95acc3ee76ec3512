// /////////////////////////////////////////////////////////////////////////////
// Repo Connector
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! In-memory test doubles for the port traits, reused by this crate's own
//! unit tests and by `tests/` integration scenarios. Not behind `cfg(test)`
//! so integration tests in `tests/` can depend on them too.

use crate::checksum::algorithms::Sha1Algorithm;
use async_trait::async_trait;
use repo_connector_domain::entities::Entity;
use repo_connector_domain::error::{ChecksumFailure, ChecksumKind, ErrorClass};
use repo_connector_domain::ports::{ByteStreamListener, ChecksumAlgorithm, ChecksumPolicy, RepositoryLayout, TransportError, Transporter};
use repo_connector_domain::value_objects::ChecksumLocation;
use repo_connector_domain::ConnectorError;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

const NOT_FOUND_MARKER: &str = "fake-transporter: not found";

/// In-memory transporter backed by a fixed map of `uri -> bytes`. Anything
/// not in the map is reported (and classified) as not found.
#[derive(Default)]
pub struct FakeTransporter {
    responses: Mutex<HashMap<String, Vec<u8>>>,
    pub put_log: Mutex<Vec<(String, Vec<u8>)>>,
}

impl FakeTransporter {
    pub fn with_response(self, uri: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.responses.lock().unwrap().insert(uri.into(), bytes.into());
        self
    }
}

#[async_trait]
impl Transporter for FakeTransporter {
    async fn peek(&self, uri: &str) -> Result<(), TransportError> {
        if self.responses.lock().unwrap().contains_key(uri) {
            Ok(())
        } else {
            Err(TransportError(NOT_FOUND_MARKER.to_string()))
        }
    }

    async fn get(
        &self,
        uri: &str,
        dest: &Path,
        _resume: bool,
        listener: &(dyn ByteStreamListener + Send + Sync),
    ) -> Result<(), TransportError> {
        let bytes = self
            .responses
            .lock()
            .unwrap()
            .get(uri)
            .cloned()
            .ok_or_else(|| TransportError(NOT_FOUND_MARKER.to_string()))?;
        listener
            .started(0, Some(bytes.len() as u64))
            .map_err(|e| TransportError(e.to_string()))?;
        listener.progressed(&bytes).map_err(|e| TransportError(e.to_string()))?;
        std::fs::write(dest, &bytes).map_err(|e| TransportError(e.to_string()))?;
        Ok(())
    }

    async fn put(&self, uri: &str, src: &Path) -> Result<(), TransportError> {
        let bytes = std::fs::read(src).map_err(|e| TransportError(e.to_string()))?;
        self.put_log.lock().unwrap().push((uri.to_string(), bytes));
        Ok(())
    }

    fn classify(&self, err: &TransportError) -> ErrorClass {
        if err.0 == NOT_FOUND_MARKER {
            ErrorClass::NotFound
        } else {
            ErrorClass::Other
        }
    }

    async fn close(&self) {}
}

/// Accepts every checksum match and swallows mismatches/missing checksums;
/// exercises the "tolerant" policy path.
#[derive(Default)]
pub struct PermissiveChecksumPolicy;

impl ChecksumPolicy for PermissiveChecksumPolicy {
    fn on_checksum_match(&self, _algorithm: &str, _kind: ChecksumKind) -> bool {
        true
    }

    fn on_checksum_mismatch(
        &self,
        _algorithm: &str,
        _kind: ChecksumKind,
        _failure: &ChecksumFailure,
    ) -> Result<(), ConnectorError> {
        Ok(())
    }

    fn on_checksum_error(&self, _algorithm: &str, _kind: ChecksumKind, _failure: &ConnectorError) {}

    fn on_no_more_checksums(&self) -> Result<(), ConnectorError> {
        Ok(())
    }

    fn on_transfer_retry(&self) {}

    fn on_transfer_checksum_failure(&self, _failure: &ChecksumFailure) -> bool {
        true
    }
}

/// Surfaces every mismatch immediately and never tolerates a final checksum
/// failure; exercises the "abort" policy path.
pub struct StrictChecksumPolicy;

impl ChecksumPolicy for StrictChecksumPolicy {
    fn on_checksum_match(&self, _algorithm: &str, _kind: ChecksumKind) -> bool {
        true
    }

    fn on_checksum_mismatch(
        &self,
        _algorithm: &str,
        _kind: ChecksumKind,
        failure: &ChecksumFailure,
    ) -> Result<(), ConnectorError> {
        Err(ConnectorError::checksum_failure(failure.clone()))
    }

    fn on_checksum_error(&self, _algorithm: &str, _kind: ChecksumKind, _failure: &ConnectorError) {}

    fn on_no_more_checksums(&self) -> Result<(), ConnectorError> {
        Err(ConnectorError::ChecksumMissing)
    }

    fn on_transfer_retry(&self) {}

    fn on_transfer_checksum_failure(&self, _failure: &ChecksumFailure) -> bool {
        false
    }
}

/// Maps every entity to a single fixed URI (set via [`Self::with_uri`]),
/// with no external checksum sidecar locations unless added, and a
/// default SHA-1-only algorithm list.
pub struct FakeRepositoryLayout {
    uri: String,
    checksum_locations: Vec<ChecksumLocation>,
    algorithms: Vec<Arc<dyn ChecksumAlgorithm>>,
}

impl Default for FakeRepositoryLayout {
    fn default() -> Self {
        Self {
            uri: String::new(),
            checksum_locations: Vec::new(),
            algorithms: vec![Arc::new(Sha1Algorithm)],
        }
    }
}

impl FakeRepositoryLayout {
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = uri.into();
        self
    }

    pub fn with_checksum_location(mut self, location: ChecksumLocation) -> Self {
        self.checksum_locations.push(location);
        self
    }

    pub fn with_algorithms(mut self, algorithms: Vec<Arc<dyn ChecksumAlgorithm>>) -> Self {
        self.algorithms = algorithms;
        self
    }
}

impl RepositoryLayout for FakeRepositoryLayout {
    fn location_of(&self, _entity: &Entity, _upload: bool) -> Result<String, ConnectorError> {
        Ok(self.uri.clone())
    }

    fn checksum_locations_of(&self, _entity: &Entity, _upload: bool, _base_uri: &str) -> Vec<ChecksumLocation> {
        self.checksum_locations.clone()
    }

    fn algorithm_factories(&self) -> Vec<Arc<dyn ChecksumAlgorithm>> {
        self.algorithms.clone()
    }
}
