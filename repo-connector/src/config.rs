// /////////////////////////////////////////////////////////////////////////////
// Repo Connector
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Session Configuration
//!
//! The recognized connector options, layered the way the rest of this
//! workspace layers configuration: built-in defaults, then an optional
//! file, then explicit overrides supplied by the embedding application.
//! Every key except `parallel-put` may additionally be pinned to one
//! repository by registering it under `"<key>.<repositoryId>"`.
//!
//! `SessionConfig` itself is a plain, validated, immutable struct - once
//! built, a [`crate::connector::Connector`] just reads its fields. The
//! [`config`] crate only does the layering during [`SessionConfig::resolve`];
//! nothing downstream depends on it.

use config::{Config, ConfigError, File, FileFormat};
use repo_connector_domain::ConnectorError;
use std::collections::HashMap;
use std::path::Path;

pub const WORKER_THREADS: &str = "worker-threads";
pub const RESUME: &str = "resume";
pub const RESUME_THRESHOLD_BYTES: &str = "resume-threshold-bytes";
pub const REQUEST_TIMEOUT_MS: &str = "request-timeout-ms";
pub const SMART_CHECKSUMS: &str = "smart-checksums";
pub const PERSISTED_CHECKSUMS: &str = "persisted-checksums";
pub const PARALLEL_PUT: &str = "parallel-put";

const DEFAULT_WORKER_THREADS: i64 = 5;
const DEFAULT_RESUME: bool = true;
const DEFAULT_RESUME_THRESHOLD_BYTES: i64 = 65_536;
const DEFAULT_REQUEST_TIMEOUT_MS: i64 = 60_000;
const DEFAULT_SMART_CHECKSUMS: bool = true;
const DEFAULT_PERSISTED_CHECKSUMS: bool = true;
const DEFAULT_PARALLEL_PUT: bool = true;

/// Recognized connector options, resolved once at construction time and
/// consulted per-repository thereafter.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    repository_id: String,
    worker_threads: usize,
    resume: bool,
    resume_threshold_bytes: u64,
    request_timeout_ms: i64,
    smart_checksums: bool,
    persisted_checksums: bool,
    parallel_put: bool,
}

impl SessionConfig {
    /// Builds a [`Config`] layering built-in defaults under an optional TOML
    /// file and explicit overrides (in that order of increasing priority),
    /// then resolves every recognized option for `repository_id`.
    pub fn resolve(
        repository_id: impl Into<String>,
        config_file: Option<&Path>,
        overrides: &HashMap<String, String>,
    ) -> Result<Self, ConnectorError> {
        let repository_id = repository_id.into();
        let mut builder = Config::builder()
            .set_default(WORKER_THREADS, DEFAULT_WORKER_THREADS)
            .and_then(|b| b.set_default(RESUME, DEFAULT_RESUME))
            .and_then(|b| b.set_default(RESUME_THRESHOLD_BYTES, DEFAULT_RESUME_THRESHOLD_BYTES))
            .and_then(|b| b.set_default(REQUEST_TIMEOUT_MS, DEFAULT_REQUEST_TIMEOUT_MS))
            .and_then(|b| b.set_default(SMART_CHECKSUMS, DEFAULT_SMART_CHECKSUMS))
            .and_then(|b| b.set_default(PERSISTED_CHECKSUMS, DEFAULT_PERSISTED_CHECKSUMS))
            .and_then(|b| b.set_default(PARALLEL_PUT, DEFAULT_PARALLEL_PUT))
            .map_err(to_connector_error)?;

        if let Some(path) = config_file {
            builder = builder.add_source(File::new(&path.to_string_lossy(), FileFormat::Toml).required(false));
        }
        for (key, value) in overrides {
            builder = builder.set_override(key.as_str(), value.as_str()).map_err(to_connector_error)?;
        }

        let resolved = builder.build().map_err(to_connector_error)?;

        Ok(Self {
            worker_threads: Self::resolve_key(&resolved, WORKER_THREADS, &repository_id)?,
            resume: Self::resolve_key(&resolved, RESUME, &repository_id)?,
            resume_threshold_bytes: Self::resolve_key(&resolved, RESUME_THRESHOLD_BYTES, &repository_id)?,
            request_timeout_ms: Self::resolve_key(&resolved, REQUEST_TIMEOUT_MS, &repository_id)?,
            smart_checksums: Self::resolve_key(&resolved, SMART_CHECKSUMS, &repository_id)?,
            persisted_checksums: Self::resolve_key(&resolved, PERSISTED_CHECKSUMS, &repository_id)?,
            // parallel-put is never overridable per repository, per spec.
            parallel_put: resolved.get(PARALLEL_PUT).map_err(to_connector_error)?,
            repository_id,
        })
    }

    /// Looks up `"<key>.<repositoryId>"` first, falling back to the bare
    /// key's layered default/file/override value.
    fn resolve_key<'de, T: serde::Deserialize<'de>>(
        resolved: &Config,
        key: &str,
        repository_id: &str,
    ) -> Result<T, ConnectorError> {
        let scoped = format!("{key}.{repository_id}");
        match resolved.get::<T>(&scoped) {
            Ok(value) => Ok(value),
            Err(ConfigError::NotFound(_)) => resolved.get(key).map_err(to_connector_error),
            Err(err) => Err(to_connector_error(err)),
        }
    }

    pub fn repository_id(&self) -> &str {
        &self.repository_id
    }

    pub fn worker_threads(&self) -> usize {
        self.worker_threads
    }

    pub fn resume(&self) -> bool {
        self.resume
    }

    pub fn resume_threshold_bytes(&self) -> u64 {
        self.resume_threshold_bytes
    }

    pub fn request_timeout_ms(&self) -> i64 {
        self.request_timeout_ms
    }

    pub fn smart_checksums(&self) -> bool {
        self.smart_checksums
    }

    pub fn persisted_checksums(&self) -> bool {
        self.persisted_checksums
    }

    pub fn parallel_put(&self) -> bool {
        self.parallel_put
    }
}

fn to_connector_error(err: ConfigError) -> ConnectorError {
    ConnectorError::InvalidConfiguration(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_with_no_overrides() {
        let session = SessionConfig::resolve("central", None, &HashMap::new()).unwrap();
        assert_eq!(session.worker_threads(), 5);
        assert!(session.resume());
        assert_eq!(session.resume_threshold_bytes(), 65_536);
        assert!(session.smart_checksums());
        assert!(session.persisted_checksums());
        assert!(session.parallel_put());
    }

    #[test]
    fn bare_override_applies_to_every_repository() {
        let overrides = HashMap::from([(WORKER_THREADS.to_string(), "1".to_string())]);
        let session = SessionConfig::resolve("central", None, &overrides).unwrap();
        assert_eq!(session.worker_threads(), 1);
    }

    #[test]
    fn per_repository_override_takes_precedence() {
        let overrides = HashMap::from([
            (WORKER_THREADS.to_string(), "8".to_string()),
            (format!("{WORKER_THREADS}.central"), "2".to_string()),
        ]);
        let central = SessionConfig::resolve("central", None, &overrides).unwrap();
        let other = SessionConfig::resolve("snapshots", None, &overrides).unwrap();
        assert_eq!(central.worker_threads(), 2);
        assert_eq!(other.worker_threads(), 8);
    }

    #[test]
    fn parallel_put_is_never_scoped_per_repository() {
        let overrides = HashMap::from([
            (PARALLEL_PUT.to_string(), "false".to_string()),
            (format!("{PARALLEL_PUT}.central"), "true".to_string()),
        ]);
        let session = SessionConfig::resolve("central", None, &overrides).unwrap();
        assert!(!session.parallel_put());
    }
}
