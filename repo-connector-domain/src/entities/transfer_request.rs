// /////////////////////////////////////////////////////////////////////////////
// Repo Connector
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! A single requested download or upload, as submitted to
//! [`crate::ports::RepositoryLayout`]-driven connector batches.

use crate::entities::Entity;
use crate::ports::{ChecksumPolicy, ProvidedChecksumSource, TransferListener};
use crate::value_objects::TraceToken;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// One requested transfer. Each variant carries an opaque trace token and
/// a listener sink; `get` variants additionally carry an optional
/// checksum policy (no policy means validation is skipped entirely).
#[derive(Clone)]
pub enum TransferRequest {
    ArtifactGet {
        entity: Entity,
        dest: PathBuf,
        policy: Option<Arc<dyn ChecksumPolicy>>,
        /// When true, runs a `peek` only (existence check) and skips
        /// download and checksum validation entirely.
        existence_only: bool,
        /// Checksums the caller already knows the transport reports
        /// out-of-band (e.g. a response header inspected before this
        /// request was submitted) - the REMOTE_INCLUDED validation kind.
        /// Ignored unless `smart-checksums` is enabled.
        inlined_checksums: Option<HashMap<String, String>>,
        /// Out-of-band expected digests (the PROVIDED validation kind),
        /// e.g. values recorded in a lockfile or dependency manifest.
        provided: Option<Arc<dyn ProvidedChecksumSource>>,
        trace: TraceToken,
        listener: Arc<dyn TransferListener>,
    },
    MetadataGet {
        entity: Entity,
        dest: PathBuf,
        policy: Option<Arc<dyn ChecksumPolicy>>,
        existence_only: bool,
        inlined_checksums: Option<HashMap<String, String>>,
        provided: Option<Arc<dyn ProvidedChecksumSource>>,
        trace: TraceToken,
        listener: Arc<dyn TransferListener>,
    },
    ArtifactPut {
        entity: Entity,
        src: PathBuf,
        trace: TraceToken,
        listener: Arc<dyn TransferListener>,
    },
    MetadataPut {
        entity: Entity,
        src: PathBuf,
        trace: TraceToken,
        listener: Arc<dyn TransferListener>,
    },
}

impl TransferRequest {
    pub fn entity(&self) -> &Entity {
        match self {
            TransferRequest::ArtifactGet { entity, .. }
            | TransferRequest::MetadataGet { entity, .. }
            | TransferRequest::ArtifactPut { entity, .. }
            | TransferRequest::MetadataPut { entity, .. } => entity,
        }
    }

    pub fn trace(&self) -> TraceToken {
        match self {
            TransferRequest::ArtifactGet { trace, .. }
            | TransferRequest::MetadataGet { trace, .. }
            | TransferRequest::ArtifactPut { trace, .. }
            | TransferRequest::MetadataPut { trace, .. } => *trace,
        }
    }

    pub fn listener(&self) -> &Arc<dyn TransferListener> {
        match self {
            TransferRequest::ArtifactGet { listener, .. }
            | TransferRequest::MetadataGet { listener, .. }
            | TransferRequest::ArtifactPut { listener, .. }
            | TransferRequest::MetadataPut { listener, .. } => listener,
        }
    }

    pub fn is_metadata(&self) -> bool {
        matches!(self, TransferRequest::MetadataGet { .. } | TransferRequest::MetadataPut { .. })
    }

    /// The fields shared by `ArtifactGet`/`MetadataGet`, or `None` for a put.
    pub fn as_get(&self) -> Option<GetFields<'_>> {
        match self {
            TransferRequest::ArtifactGet { dest, policy, existence_only, inlined_checksums, provided, .. }
            | TransferRequest::MetadataGet { dest, policy, existence_only, inlined_checksums, provided, .. } => {
                Some(GetFields {
                    dest,
                    policy,
                    existence_only: *existence_only,
                    inlined_checksums,
                    provided,
                })
            }
            TransferRequest::ArtifactPut { .. } | TransferRequest::MetadataPut { .. } => None,
        }
    }

    /// The source file of a put, or `None` for a get.
    pub fn src(&self) -> Option<&PathBuf> {
        match self {
            TransferRequest::ArtifactPut { src, .. } | TransferRequest::MetadataPut { src, .. } => Some(src),
            TransferRequest::ArtifactGet { .. } | TransferRequest::MetadataGet { .. } => None,
        }
    }
}

/// Borrowed view over the fields common to both get variants.
pub struct GetFields<'a> {
    pub dest: &'a PathBuf,
    pub policy: &'a Option<Arc<dyn ChecksumPolicy>>,
    pub existence_only: bool,
    pub inlined_checksums: &'a Option<HashMap<String, String>>,
    pub provided: &'a Option<Arc<dyn ProvidedChecksumSource>>,
}
