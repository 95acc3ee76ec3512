// /////////////////////////////////////////////////////////////////////////////
// Repo Connector
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Downloads one entity into its destination, coordinating a resumable
//! partial file, validating its checksum, and retrying once on a
//! retry-worthy checksum mismatch before deferring to the policy's final
//! say.

use crate::checksum::ChecksumValidator;
use crate::listener::ListenerAdapter;
use crate::partial_file::{PartialFile, PartialFileFactory};
use repo_connector_domain::error::ChecksumFailure;
use repo_connector_domain::ports::{ChecksumAlgorithm, ChecksumPolicy, TransferEvent, TransferListener, Transporter};
use repo_connector_domain::value_objects::ChecksumLocation;
use repo_connector_domain::ConnectorError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const MAX_TRIALS: u32 = 2;

pub struct GetRequest {
    pub uri: String,
    pub dest: PathBuf,
    pub algorithms: Vec<Arc<dyn ChecksumAlgorithm>>,
    pub external_locations: Vec<ChecksumLocation>,
    pub policy: Option<Arc<dyn ChecksumPolicy>>,
    pub provided: Option<HashMap<String, String>>,
    pub inlined_checksums: Option<HashMap<String, String>>,
    pub smart_checksums: bool,
    pub persisted_checksums: bool,
}

pub async fn run(
    request: GetRequest,
    transporter: Arc<dyn Transporter>,
    listener: Arc<dyn TransferListener>,
    partial_file_factory: &PartialFileFactory,
) {
    let initiated_event = TransferEvent::new(request.uri.clone());
    if let Err(failure) = listener.transfer_initiated(&initiated_event) {
        fail(&listener, &request.uri, failure);
        return;
    }

    if let Err(err) = tokio::fs::create_dir_all(parent_of(&request.dest)).await {
        fail(&listener, &request.uri, ConnectorError::from(err));
        return;
    }

    let peek_transporter = transporter.clone();
    let uri = request.uri.clone();
    let remote_access_check = move || {
        let transporter = peek_transporter.clone();
        let uri = uri.clone();
        async move { transporter.peek(&uri).await.map_err(|e| ConnectorError::TransportFailure(e.0)) }
    };

    let partial = match partial_file_factory.new_instance(&request.dest, remote_access_check).await {
        Ok(Some(partial)) => partial,
        Ok(None) => {
            tracing::debug!(uri = %request.uri, "another process already completed this download");
            listener.transfer_succeeded(&initiated_event);
            return;
        }
        Err(err) => {
            fail(&listener, &request.uri, err);
            return;
        }
    };

    let mut validator = ChecksumValidator::new(
        request.dest.clone(),
        request.algorithms.clone(),
        request.external_locations.clone(),
        request.policy.clone(),
        request.provided.clone(),
        transporter.clone(),
    );
    let calculator = validator.new_checksum_calculator();
    let adapter = ListenerAdapter::new(request.uri.clone(), listener.clone(), calculator, partial.path().to_path_buf());

    let mut outcome = run_trials(&request, &transporter, &adapter, &partial, &mut validator).await;
    if outcome.is_ok() {
        outcome = move_into_place(partial.path(), &request.dest).await;
    }
    if request.persisted_checksums && outcome.is_ok() {
        validator.commit();
    }

    partial.close().await;
    validator.close();

    match outcome {
        Ok(()) => adapter.succeeded(),
        Err(err) => adapter.failed(err),
    }
}

async fn move_into_place(from: &Path, to: &Path) -> Result<(), ConnectorError> {
    if tokio::fs::rename(from, to).await.is_ok() {
        return Ok(());
    }
    tokio::fs::copy(from, to).await?;
    tokio::fs::remove_file(from).await?;
    Ok(())
}

fn fail(listener: &Arc<dyn TransferListener>, uri: &str, failure: ConnectorError) {
    let mut event = TransferEvent::new(uri);
    event.failure = Some(failure);
    listener.transfer_failed(&event);
}

async fn run_trials(
    request: &GetRequest,
    transporter: &Arc<dyn Transporter>,
    adapter: &ListenerAdapter,
    partial: &PartialFile,
    validator: &mut ChecksumValidator,
) -> Result<(), ConnectorError> {
    for trial in 0..MAX_TRIALS {
        let resume = partial.is_resume() && trial == 0;

        transporter
            .get(&request.uri, partial.path(), resume, adapter)
            .await
            .map_err(|e| ConnectorError::TransportFailure(e.0))?;

        let actual = adapter.checksums();
        let included = if request.smart_checksums { request.inlined_checksums.as_ref() } else { None };

        match validator.validate(&actual, included).await {
            Ok(()) => return Ok(()),
            Err(ConnectorError::ChecksumFailure { algorithm, kind, expected, actual, retry_worthy }) => {
                let failure = ChecksumFailure { algorithm, kind, expected, actual, retry_worthy };
                if trial + 1 < MAX_TRIALS && failure.retry_worthy {
                    adapter.corrupted(ConnectorError::checksum_failure(failure))?;
                    validator.retry();
                    continue;
                }
                if validator.handle(&failure) {
                    adapter.corrupted(ConnectorError::checksum_failure(failure))?;
                    return Ok(());
                }
                return Err(ConnectorError::checksum_failure(failure));
            }
            Err(other) => return Err(other),
        }
    }
    unreachable!("every trial either returns or continues")
}

fn parent_of(dest: &Path) -> PathBuf {
    dest.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::algorithms::Sha1Algorithm;
    use crate::testkit::{FakeTransporter, PermissiveChecksumPolicy, StrictChecksumPolicy};
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

    fn factory() -> PartialFileFactory {
        PartialFileFactory {
            resume_enabled: true,
            resume_threshold_bytes: 65_536,
            request_timeout_ms: 1_000,
        }
    }

    #[tokio::test]
    async fn matching_checksum_downloads_successfully() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("artifact-1.0.jar");
        let transporter: Arc<dyn Transporter> =
            Arc::new(FakeTransporter::default().with_response("a.jar", b"foo".to_vec()));
        let listener = Arc::new(RecordingListener::default());

        let mut provided = HashMap::new();
        provided.insert("SHA-1".to_string(), "0beec7b5ea3f0fdbc95d0dd47f3c5bc275da8a33".to_string());

        let request = GetRequest {
            uri: "a.jar".to_string(),
            dest: dest.clone(),
            algorithms: vec![Arc::new(Sha1Algorithm)],
            external_locations: vec![],
            policy: Some(Arc::new(PermissiveChecksumPolicy::default())),
            provided: Some(provided),
            inlined_checksums: None,
            smart_checksums: true,
            persisted_checksums: true,
        };

        run(request, transporter, listener.clone(), &factory()).await;

        assert_eq!(*listener.terminal.lock().unwrap(), Some("succeeded"));
        assert_eq!(std::fs::read(&dest).unwrap(), b"foo");
    }

    #[tokio::test]
    async fn strict_policy_fails_on_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("artifact-1.0.jar");
        let transporter: Arc<dyn Transporter> =
            Arc::new(FakeTransporter::default().with_response("a.jar", b"foo".to_vec()));
        let listener = Arc::new(RecordingListener::default());

        let mut provided = HashMap::new();
        provided.insert("SHA-1".to_string(), "deadbeefdeadbeefdeadbeefdeadbeefdeadbeef".to_string());

        let request = GetRequest {
            uri: "a.jar".to_string(),
            dest: dest.clone(),
            algorithms: vec![Arc::new(Sha1Algorithm)],
            external_locations: vec![],
            policy: Some(Arc::new(StrictChecksumPolicy)),
            provided: Some(provided),
            inlined_checksums: None,
            smart_checksums: true,
            persisted_checksums: true,
        };

        run(request, transporter, listener.clone(), &factory()).await;

        assert_eq!(*listener.terminal.lock().unwrap(), Some("failed"));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn missing_uri_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("missing.jar");
        let transporter: Arc<dyn Transporter> = Arc::new(FakeTransporter::default());
        let listener = Arc::new(RecordingListener::default());

        let request = GetRequest {
            uri: "missing.jar".to_string(),
            dest,
            algorithms: vec![],
            external_locations: vec![],
            policy: None,
            provided: None,
            inlined_checksums: None,
            smart_checksums: true,
            persisted_checksums: true,
        };

        run(request, transporter, listener.clone(), &factory()).await;
        assert_eq!(*listener.terminal.lock().unwrap(), Some("failed"));
    }
}
