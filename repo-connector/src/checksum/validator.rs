// /////////////////////////////////////////////////////////////////////////////
// Repo Connector
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Checksum Validator
//!
//! Applies a pluggable policy across the three checksum kinds (provided,
//! remote-included, remote-external) with ordered preference, and owns
//! the commit/rollback lifecycle of the sidecar checksum files.
//!
//! Ordering: PROVIDED before REMOTE_INCLUDED before REMOTE_EXTERNAL;
//! within a kind, the layout's configured algorithm order decides.

use repo_connector_domain::error::{ChecksumFailure, ChecksumKind};
use repo_connector_domain::ports::{ChecksumAlgorithm, ChecksumPolicy, Transporter};
use repo_connector_domain::value_objects::ChecksumLocation;
use repo_connector_domain::ConnectorError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::checksum::sidecar;

/// Either a literal value to write, or a temp file to move, into a sidecar
/// path once the surrounding transfer is accepted.
#[derive(Debug)]
enum PendingValue {
    Literal(String),
    TempFile(PathBuf),
}

pub struct ChecksumValidator {
    dest_file: PathBuf,
    algorithms: Vec<Arc<dyn ChecksumAlgorithm>>,
    external_locations: Vec<ChecksumLocation>,
    policy: Option<Arc<dyn ChecksumPolicy>>,
    provided: Option<HashMap<String, String>>,
    transporter: Arc<dyn Transporter>,
    pending: HashMap<PathBuf, PendingValue>,
}

impl ChecksumValidator {
    pub fn new(
        dest_file: PathBuf,
        algorithms: Vec<Arc<dyn ChecksumAlgorithm>>,
        external_locations: Vec<ChecksumLocation>,
        policy: Option<Arc<dyn ChecksumPolicy>>,
        provided: Option<HashMap<String, String>>,
        transporter: Arc<dyn Transporter>,
    ) -> Self {
        Self {
            dest_file,
            algorithms,
            external_locations,
            policy,
            provided,
            transporter,
            pending: HashMap::new(),
        }
    }

    /// Builds a [`crate::checksum::ChecksumCalculator`] over the enabled
    /// algorithms, or `None` if no policy is active (nothing to compute).
    pub fn new_checksum_calculator(&self) -> Option<crate::checksum::ChecksumCalculator> {
        if self.policy.is_none() {
            return None;
        }
        crate::checksum::ChecksumCalculator::new(self.algorithms.clone())
    }

    fn sidecar_path(&self, extension: &str) -> PathBuf {
        let mut name = self.dest_file.clone().into_os_string();
        name.push(".");
        name.push(extension);
        PathBuf::from(name)
    }

    fn extension_for(&self, algorithm: &str) -> Option<&str> {
        self.algorithms
            .iter()
            .find(|a| a.name() == algorithm)
            .map(|a| a.extension())
    }

    fn ordered_algorithm_names(&self) -> Vec<String> {
        self.algorithms.iter().map(|a| a.name().to_string()).collect()
    }

    fn record_pending_literal(&mut self, algorithm: &str, value: &str) {
        if let Some(ext) = self.extension_for(algorithm) {
            let path = self.sidecar_path(ext);
            self.pending.insert(path, PendingValue::Literal(value.to_string()));
        }
    }

    /// Validates computed digests against the active policy.
    ///
    /// A digest mismatch is always retry-worthy: a wrong checksum on a
    /// freshly fetched file is just as much a reason to re-fetch as one
    /// found after resuming a partial file, mirroring the Maven resolver's
    /// `ChecksumFailureException(expected, actual)`, which always sets
    /// `retryWorthy = true`.
    pub async fn validate(
        &mut self,
        actual: &HashMap<String, Result<String, ConnectorError>>,
        included: Option<&HashMap<String, String>>,
    ) -> Result<(), ConnectorError> {
        let Some(policy) = self.policy.clone() else {
            return Ok(());
        };

        if self.validate_kind(&policy, ChecksumKind::Provided, self.provided.clone().as_ref(), actual)? {
            return Ok(());
        }

        if self.validate_kind(&policy, ChecksumKind::RemoteIncluded, included, actual)? {
            return Ok(());
        }

        if self.validate_external(&policy, actual).await? {
            return Ok(());
        }

        policy.on_no_more_checksums()
    }

    fn validate_kind(
        &mut self,
        policy: &Arc<dyn ChecksumPolicy>,
        kind: ChecksumKind,
        expected_map: Option<&HashMap<String, String>>,
        actual: &HashMap<String, Result<String, ConnectorError>>,
    ) -> Result<bool, ConnectorError> {
        let Some(expected_map) = expected_map else {
            return Ok(false);
        };
        for algorithm in self.ordered_algorithm_names() {
            let Some(expected) = expected_map.get(&algorithm) else {
                continue;
            };
            let Some(actual_result) = actual.get(&algorithm) else {
                continue;
            };
            let actual_hex = match actual_result {
                Ok(hex) => hex,
                Err(err) => {
                    policy.on_checksum_error(&algorithm, kind, err);
                    continue;
                }
            };
            self.record_pending_literal(&algorithm, expected);
            if expected.eq_ignore_ascii_case(actual_hex) {
                if policy.on_checksum_match(&algorithm, kind) {
                    return Ok(true);
                }
            } else {
                let failure = ChecksumFailure {
                    algorithm: algorithm.clone(),
                    kind,
                    expected: expected.clone(),
                    actual: actual_hex.clone(),
                    retry_worthy: true,
                };
                policy.on_checksum_mismatch(&algorithm, kind, &failure)?;
            }
        }
        Ok(false)
    }

    async fn validate_external(
        &mut self,
        policy: &Arc<dyn ChecksumPolicy>,
        actual: &HashMap<String, Result<String, ConnectorError>>,
    ) -> Result<bool, ConnectorError> {
        // Clone to end the borrow of `self` before the mutable calls below.
        let locations = self.external_locations.clone();
        for location in &locations {
            let algorithm = location.algorithm_name();
            let Some(actual_result) = actual.get(algorithm) else {
                continue;
            };
            let actual_hex = match actual_result {
                Ok(hex) => hex.clone(),
                Err(err) => {
                    policy.on_checksum_error(algorithm, ChecksumKind::RemoteExternal, err);
                    continue;
                }
            };

            match self.fetch_sidecar(location).await {
                Ok(None) => continue,
                Err(err) => {
                    policy.on_checksum_error(algorithm, ChecksumKind::RemoteExternal, &err);
                    continue;
                }
                Ok(Some((expected, temp_path))) => {
                    if let Some(ext) = self.extension_for(algorithm) {
                        let sidecar_path = self.sidecar_path(ext);
                        self.pending.insert(sidecar_path, PendingValue::TempFile(temp_path));
                    }
                    if expected.eq_ignore_ascii_case(&actual_hex) {
                        if policy.on_checksum_match(algorithm, ChecksumKind::RemoteExternal) {
                            return Ok(true);
                        }
                    } else {
                        let failure = ChecksumFailure {
                            algorithm: algorithm.to_string(),
                            kind: ChecksumKind::RemoteExternal,
                            expected,
                            actual: actual_hex,
                            retry_worthy: true,
                        };
                        policy.on_checksum_mismatch(algorithm, ChecksumKind::RemoteExternal, &failure)?;
                    }
                }
            }
        }
        Ok(false)
    }

    /// Fetches an external checksum sidecar to a temp file and parses it.
    /// Returns `Ok(None)` on a 404; propagates other transport errors.
    async fn fetch_sidecar(&self, location: &ChecksumLocation) -> Result<Option<(String, PathBuf)>, ConnectorError> {
        let temp_path = sidecar::unique_temp_path(&self.dest_file);
        let listener = sidecar::NullByteStreamListener;
        match self.transporter.get(location.uri(), &temp_path, false, &listener).await {
            Ok(()) => {
                let hex = sidecar::parse_sidecar_file(&temp_path)?;
                Ok(Some((hex, temp_path)))
            }
            Err(err) => {
                let _ = std::fs::remove_file(&temp_path);
                match self.transporter.classify(&err) {
                    repo_connector_domain::error::ErrorClass::NotFound => Ok(None),
                    repo_connector_domain::error::ErrorClass::Other => {
                        Err(ConnectorError::TransportFailure(err.0))
                    }
                }
            }
        }
    }

    /// Delegates to the policy's final-failure decision; its boolean
    /// decides whether the surrounding retry should accept the file
    /// anyway.
    pub fn handle(&self, failure: &ChecksumFailure) -> bool {
        match &self.policy {
            Some(policy) => policy.on_transfer_checksum_failure(failure),
            None => false,
        }
    }

    /// Notifies the policy of a retry, discards all pending writes, and
    /// deletes every temp file recorded so far.
    pub fn retry(&mut self) {
        if let Some(policy) = &self.policy {
            policy.on_transfer_retry();
        }
        self.clear_pending();
    }

    /// Moves/writes every pending sidecar into place. Failures on an
    /// individual sidecar are logged and do not abort the remaining
    /// commits.
    pub fn commit(&mut self) {
        for (sidecar_path, value) in self.pending.drain() {
            let result = match &value {
                PendingValue::Literal(text) => std::fs::write(&sidecar_path, text.as_bytes()),
                PendingValue::TempFile(temp_path) => std::fs::rename(temp_path, &sidecar_path).or_else(|_| {
                    std::fs::copy(temp_path, &sidecar_path)?;
                    std::fs::remove_file(temp_path)
                }),
            };
            if let Err(err) = result {
                tracing::warn!(sidecar = %sidecar_path.display(), error = %err, "failed to commit checksum sidecar");
            }
        }
    }

    /// Deletes every remaining temp file. Idempotent.
    pub fn close(&mut self) {
        self.clear_pending();
    }

    fn clear_pending(&mut self) {
        for (_, value) in self.pending.drain() {
            if let PendingValue::TempFile(path) = value {
                let _ = std::fs::remove_file(path);
            }
        }
    }
}

impl Drop for ChecksumValidator {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::algorithms::{Md5Algorithm, Sha1Algorithm};
    use crate::testkit::{FakeTransporter, PermissiveChecksumPolicy, StrictChecksumPolicy};
    use std::path::Path;

    fn actual_ok(algo: &str, hex: &str) -> HashMap<String, Result<String, ConnectorError>> {
        HashMap::from([(algo.to_string(), Ok(hex.to_string()))])
    }

    #[tokio::test]
    async fn no_policy_means_no_validation() {
        let transporter: Arc<dyn Transporter> = Arc::new(FakeTransporter::default());
        let mut validator = ChecksumValidator::new(
            PathBuf::from("/tmp/dest"),
            vec![],
            vec![],
            None,
            None,
            transporter,
        );
        let actual = HashMap::new();
        assert!(validator.validate(&actual, None).await.is_ok());
    }

    #[tokio::test]
    async fn provided_match_short_circuits() {
        let transporter: Arc<dyn Transporter> = Arc::new(FakeTransporter::default());
        let mut provided = HashMap::new();
        provided.insert("SHA-1".to_string(), "0beec7b5ea3f0fdbc95d0dd47f3c5bc275da8a33".to_string());
        let mut validator = ChecksumValidator::new(
            Path::new("/tmp/dest-provided").to_path_buf(),
            vec![Arc::new(Sha1Algorithm)],
            vec![],
            Some(Arc::new(PermissiveChecksumPolicy::default())),
            Some(provided),
            transporter,
        );
        let actual = actual_ok("SHA-1", "0beec7b5ea3f0fdbc95d0dd47f3c5bc275da8a33");
        assert!(validator.validate(&actual, None).await.is_ok());
    }

    #[tokio::test]
    async fn strict_policy_surfaces_mismatch() {
        let transporter: Arc<dyn Transporter> = Arc::new(FakeTransporter::default());
        let mut provided = HashMap::new();
        provided.insert("MD5".to_string(), "deadbeefdeadbeefdeadbeefdeadbeef".to_string());
        let mut validator = ChecksumValidator::new(
            Path::new("/tmp/dest-mismatch").to_path_buf(),
            vec![Arc::new(Md5Algorithm)],
            vec![],
            Some(Arc::new(StrictChecksumPolicy)),
            Some(provided),
            transporter,
        );
        let actual = actual_ok("MD5", "acbd18db4cc2f85cedef654fccc4a4d8");
        let result = validator.validate(&actual, None).await;
        assert!(matches!(result, Err(ConnectorError::ChecksumFailure { .. })));
    }
}
