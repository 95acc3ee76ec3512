// /////////////////////////////////////////////////////////////////////////////
// Repo Connector
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Connector
//!
//! Owns one transporter and one repository layout for a single remote
//! repository, bounds concurrent transfers with a worker pool, and
//! assembles [`crate::tasks`] runners from submitted [`TransferRequest`]s.
//!
//! Worker selection follows the source system's "direct vs. pooled"
//! split: a pool of size one, or a batch of one, just runs every task
//! inline on the caller's task. Otherwise the first task still runs
//! inline and the remainder are spawned onto tokio, each bounded by a
//! [`Semaphore`] permit - the pool's "size" is the permit count, not a
//! dedicated set of threads.

use crate::config::SessionConfig;
use crate::partial_file::PartialFileFactory;
use crate::tasks::{self, GetRequest, PutRequest};
use repo_connector_domain::entities::{Entity, MetadataLevel, TransferRequest};
use repo_connector_domain::ports::{RepositoryLayout, TransferEvent, TransferListener, Transporter};
use repo_connector_domain::ConnectorError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;

struct Shared {
    repository_id: String,
    layout: Arc<dyn RepositoryLayout>,
    transporter: Arc<dyn Transporter>,
    config: SessionConfig,
    partial_file_factory: PartialFileFactory,
    permits: Option<Arc<Semaphore>>,
    closed: AtomicBool,
}

/// Per-remote-repository connector: the entry point for submitting
/// get/put batches once constructed. Cheap to clone; every clone shares
/// the same underlying transporter, layout, pool, and closed flag.
#[derive(Clone)]
pub struct Connector {
    shared: Arc<Shared>,
}

impl Connector {
    /// Constructs a connector for `repository_id` against the given
    /// layout and transporter. Fails with [`ConnectorError::NoConnector`]
    /// if the layout cannot serve this repository at all (no checksum
    /// algorithms configured).
    pub fn new(
        repository_id: impl Into<String>,
        layout: Arc<dyn RepositoryLayout>,
        transporter: Arc<dyn Transporter>,
        config: SessionConfig,
    ) -> Result<Self, ConnectorError> {
        let repository_id = repository_id.into();
        if layout.algorithm_factories().is_empty() {
            return Err(ConnectorError::NoConnector);
        }

        let partial_file_factory = PartialFileFactory {
            resume_enabled: config.resume(),
            resume_threshold_bytes: config.resume_threshold_bytes(),
            request_timeout_ms: config.request_timeout_ms(),
        };

        let permits = if config.worker_threads() <= 1 {
            None
        } else {
            Some(Arc::new(Semaphore::new(config.worker_threads())))
        };

        Ok(Self {
            shared: Arc::new(Shared {
                repository_id,
                layout,
                transporter,
                config,
                partial_file_factory,
                permits,
                closed: AtomicBool::new(false),
            }),
        })
    }

    pub fn repository_id(&self) -> &str {
        &self.shared.repository_id
    }

    /// Runs every submitted get request to completion. Blocks until each
    /// has reported its terminal event through its own listener;
    /// per-task failures are never surfaced here, only the precondition
    /// failure of the connector already being closed is.
    pub async fn get(&self, requests: Vec<TransferRequest>) -> Result<(), ConnectorError> {
        self.ensure_open()?;
        self.run_batch(requests, |shared, r| run_get(shared, r)).await;
        Ok(())
    }

    /// Runs every submitted put request to completion: artifact uploads
    /// first, then metadata uploads grouped by level (version, artifact,
    /// group, root) with a barrier between groups. When `parallel-put` is
    /// disabled, every group runs with effective width 1.
    pub async fn put(&self, requests: Vec<TransferRequest>) -> Result<(), ConnectorError> {
        self.ensure_open()?;

        let (artifacts, metadata): (Vec<_>, Vec<_>) = requests.into_iter().partition(|r| !r.is_metadata());
        self.put_batch(artifacts).await;

        for level in [MetadataLevel::Version, MetadataLevel::Artifact, MetadataLevel::Group, MetadataLevel::Root] {
            let group: Vec<TransferRequest> = metadata
                .iter()
                .filter(|r| r.entity().metadata_level() == Some(level))
                .cloned()
                .collect();
            self.put_batch(group).await;
        }
        Ok(())
    }

    async fn put_batch(&self, requests: Vec<TransferRequest>) {
        if !self.shared.config.parallel_put() {
            for request in requests {
                run_put(self.shared.clone(), request).await;
            }
            return;
        }
        self.run_batch(requests, |shared, r| run_put(shared, r)).await;
    }

    /// Shared dispatch: the first task always runs inline; the rest run
    /// inline too unless a worker pool is configured and the batch has
    /// more than one task, in which case they're spawned behind a
    /// semaphore permit.
    async fn run_batch<F, Fut>(&self, requests: Vec<TransferRequest>, task: F)
    where
        F: Fn(Arc<Shared>, TransferRequest) -> Fut,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let pooled = self.shared.permits.is_some() && requests.len() > 1;
        let mut handles = Vec::new();
        let mut iter = requests.into_iter();

        if let Some(first) = iter.next() {
            task(self.shared.clone(), first).await;
        }
        for request in iter {
            if pooled {
                let shared = self.shared.clone();
                let permits = self.shared.permits.clone();
                let fut = task(shared, request);
                handles.push(tokio::spawn(async move {
                    let _permit = match permits {
                        Some(sem) => Some(sem.acquire_owned().await.expect("semaphore is never closed")),
                        None => None,
                    };
                    fut.await;
                }));
            } else {
                task(self.shared.clone(), request).await;
            }
        }
        for handle in handles {
            let _ = handle.await;
        }
    }

    /// Idempotent shutdown: closes the transporter and marks the
    /// connector closed so later submissions fail fast. Safe to call more
    /// than once and from multiple callers concurrently.
    pub async fn close(&self) {
        if self.shared.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.shared.transporter.close().await;
    }

    fn ensure_open(&self) -> Result<(), ConnectorError> {
        if self.shared.closed.load(Ordering::SeqCst) {
            Err(ConnectorError::ConnectorClosed)
        } else {
            Ok(())
        }
    }
}

async fn run_get(shared: Arc<Shared>, request: TransferRequest) {
    let listener = request.listener().clone();
    let entity = request.entity().clone();
    let Some(fields) = request.as_get() else {
        tracing::error!("get() received a put-shaped request, ignoring");
        return;
    };

    let location = match shared.layout.resolve(&entity, false) {
        Ok(location) => location,
        Err(err) => {
            report_resolve_failure(&listener, &entity_hint(&entity), err);
            return;
        }
    };

    if fields.existence_only {
        tasks::run_peek(location.uri(), shared.transporter.as_ref(), listener.as_ref()).await;
        return;
    }

    let provided = fields.provided.as_ref().and_then(|p| p.provided_checksums());
    let get_request = GetRequest {
        uri: location.uri().to_string(),
        dest: fields.dest.clone(),
        algorithms: shared.layout.algorithm_factories(),
        external_locations: location.checksum_locations().cloned().collect(),
        policy: fields.policy.clone(),
        provided,
        inlined_checksums: fields.inlined_checksums.clone(),
        smart_checksums: shared.config.smart_checksums(),
        persisted_checksums: shared.config.persisted_checksums(),
    };
    tasks::run_get(get_request, shared.transporter.clone(), listener, &shared.partial_file_factory).await;
}

async fn run_put(shared: Arc<Shared>, request: TransferRequest) {
    let listener = request.listener().clone();
    let entity = request.entity().clone();
    let Some(src) = request.src() else {
        tracing::error!("put() received a get-shaped request, ignoring");
        return;
    };

    let location = match shared.layout.resolve(&entity, true) {
        Ok(location) => location,
        Err(err) => {
            report_resolve_failure(&listener, &entity_hint(&entity), err);
            return;
        }
    };

    let put_request = PutRequest {
        uri: location.uri().to_string(),
        src: src.clone(),
        sidecar_locations: location.checksum_locations().cloned().collect(),
        algorithms: shared.layout.algorithm_factories(),
    };
    tasks::run_put(put_request, shared.transporter.clone(), listener).await;
}

fn entity_hint(entity: &Entity) -> String {
    match entity {
        Entity::Artifact(a) => a.to_string(),
        Entity::Metadata(m) => format!("{}:{:?}", m.group_id, m.level),
    }
}

/// Reports a layout-resolution failure through the transfer's listener;
/// used before a URI is even known, so no STARTED/PROGRESSED ever fires.
fn report_resolve_failure(listener: &Arc<dyn TransferListener>, uri_hint: &str, err: ConnectorError) {
    let mut event = TransferEvent::new(uri_hint);
    event.failure = Some(err);
    listener.transfer_failed(&event);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::testkit::{FakeRepositoryLayout, FakeTransporter};
    use repo_connector_domain::entities::ArtifactCoordinates;
    use repo_connector_domain::value_objects::TraceToken;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingListener {
        terminal: Mutex<Option<&'static str>>,
    }

    impl TransferListener for RecordingListener {
        fn transfer_succeeded(&self, _event: &TransferEvent) {
            *self.terminal.lock().unwrap() = Some("succeeded");
        }

        fn transfer_failed(&self, _event: &TransferEvent) {
            *self.terminal.lock().unwrap() = Some("failed");
        }
    }

    fn jar_entity() -> Entity {
        Entity::Artifact(ArtifactCoordinates {
            group_id: "org.example".to_string(),
            artifact_id: "widget".to_string(),
            version: "1.0".to_string(),
            classifier: None,
            extension: "jar".to_string(),
        })
    }

    #[tokio::test]
    async fn get_downloads_a_single_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("widget-1.0.jar");

        let layout = Arc::new(FakeRepositoryLayout::default().with_uri("a.jar"));
        let transporter: Arc<dyn Transporter> =
            Arc::new(FakeTransporter::default().with_response("a.jar", b"foo".to_vec()));
        let config = SessionConfig::resolve("central", None, &HashMap::new()).unwrap();
        let connector = Connector::new("central", layout, transporter, config).unwrap();

        let listener = Arc::new(RecordingListener::default());
        let request = TransferRequest::ArtifactGet {
            entity: jar_entity(),
            dest: dest.clone(),
            policy: None,
            existence_only: false,
            inlined_checksums: None,
            provided: None,
            trace: TraceToken::new(),
            listener: listener.clone(),
        };

        connector.get(vec![request]).await.unwrap();

        assert_eq!(*listener.terminal.lock().unwrap(), Some("succeeded"));
        assert_eq!(std::fs::read(&dest).unwrap(), b"foo");
    }

    #[tokio::test]
    async fn closed_connector_rejects_new_batches() {
        let layout = Arc::new(FakeRepositoryLayout::default().with_uri("a.jar"));
        let transporter: Arc<dyn Transporter> = Arc::new(FakeTransporter::default());
        let config = SessionConfig::resolve("central", None, &HashMap::new()).unwrap();
        let connector = Connector::new("central", layout, transporter, config).unwrap();

        connector.close().await;
        let result = connector.get(vec![]).await;
        assert!(matches!(result, Err(ConnectorError::ConnectorClosed)));
    }

    #[tokio::test]
    async fn put_uploads_artifact_then_metadata_by_level() {
        let layout = Arc::new(FakeRepositoryLayout::default().with_uri("a.jar"));
        let transporter = Arc::new(FakeTransporter::default());
        let dyn_transporter: Arc<dyn Transporter> = transporter.clone();
        let config = SessionConfig::resolve("central", None, &HashMap::new()).unwrap();
        let connector = Connector::new("central", layout, dyn_transporter, config).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("widget-1.0.jar");
        std::fs::write(&src, b"foo").unwrap();

        let listener = Arc::new(RecordingListener::default());
        let request = TransferRequest::ArtifactPut {
            entity: jar_entity(),
            src,
            trace: TraceToken::new(),
            listener,
        };

        connector.put(vec![request]).await.unwrap();
        assert_eq!(transporter.put_log.lock().unwrap().len(), 1);
    }
}
