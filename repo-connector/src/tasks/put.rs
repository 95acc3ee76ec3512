// /////////////////////////////////////////////////////////////////////////////
// Repo Connector
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Uploads one entity's file, then best-effort uploads its checksum
//! sidecars. Sidecar failures are logged and never fail the task.

use crate::checksum::ChecksumCalculator;
use crate::util::unique_sibling;
use repo_connector_domain::ports::{ChecksumAlgorithm, TransferEvent, TransferListener, Transporter};
use repo_connector_domain::value_objects::ChecksumLocation;
use repo_connector_domain::ConnectorError;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

const READ_BUF_SIZE: usize = 64 * 1024;

pub struct PutRequest {
    pub uri: String,
    pub src: std::path::PathBuf,
    pub sidecar_locations: Vec<ChecksumLocation>,
    pub algorithms: Vec<Arc<dyn ChecksumAlgorithm>>,
}

pub async fn run(request: PutRequest, transporter: Arc<dyn Transporter>, listener: Arc<dyn TransferListener>) {
    let event = TransferEvent::new(request.uri.clone());
    if let Err(failure) = listener.transfer_initiated(&event) {
        fail(&listener, event, failure);
        return;
    }

    if let Err(err) = transporter.put(&request.uri, &request.src).await {
        fail(&listener, event, ConnectorError::TransportFailure(err.0));
        return;
    }

    if !request.sidecar_locations.is_empty() {
        upload_sidecars(&request, &transporter).await;
    }

    listener.transfer_succeeded(&event);
}

async fn upload_sidecars(request: &PutRequest, transporter: &Arc<dyn Transporter>) {
    let Some(digests) = compute_digests(&request.src, request.algorithms.clone()) else {
        return;
    };

    for location in &request.sidecar_locations {
        let Some(Ok(hex)) = digests.get(location.algorithm_name()) else {
            continue;
        };
        if let Err(err) = upload_one_sidecar(transporter, location.uri(), hex, &request.src).await {
            tracing::warn!(
                uri = %location.uri(),
                error = %err,
                "failed to upload checksum sidecar, continuing"
            );
        }
    }
}

async fn upload_one_sidecar(
    transporter: &Arc<dyn Transporter>,
    uri: &str,
    hex: &str,
    src: &Path,
) -> Result<(), ConnectorError> {
    let temp_path = unique_sibling(src, "sidecar");
    tokio::fs::write(&temp_path, hex.as_bytes()).await?;
    let result = transporter
        .put(uri, &temp_path)
        .await
        .map_err(|e| ConnectorError::TransportFailure(e.0));
    let _ = tokio::fs::remove_file(&temp_path).await;
    result
}

fn compute_digests(
    src: &Path,
    algorithms: Vec<Arc<dyn ChecksumAlgorithm>>,
) -> Option<std::collections::HashMap<String, Result<String, ConnectorError>>> {
    let mut calculator = ChecksumCalculator::new(algorithms)?;
    match read_and_feed(src, &mut calculator) {
        Ok(()) => {}
        Err(err) => tracing::warn!(src = %src.display(), error = %err, "failed to read source file for sidecar digests"),
    }
    Some(calculator.finish())
}

fn read_and_feed(src: &Path, calculator: &mut ChecksumCalculator) -> std::io::Result<()> {
    let mut file = std::fs::File::open(src)?;
    let mut buf = [0u8; READ_BUF_SIZE];
    loop {
        let read = file.read(&mut buf)?;
        if read == 0 {
            break;
        }
        calculator.update(&buf[..read]);
    }
    Ok(())
}

fn fail(listener: &Arc<dyn TransferListener>, mut event: TransferEvent, failure: ConnectorError) {
    event.failure = Some(failure);
    listener.transfer_failed(&event);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::algorithms::{Md5Algorithm, Sha1Algorithm};
    use crate::testkit::FakeTransporter;
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

    #[tokio::test]
    async fn uploads_body_then_sidecars() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("artifact-1.0.jar");
        std::fs::write(&src, b"foo").unwrap();

        let transporter = Arc::new(FakeTransporter::default());
        let listener = Arc::new(RecordingListener::default());

        let request = PutRequest {
            uri: "a.jar".to_string(),
            src,
            sidecar_locations: vec![
                ChecksumLocation::new("SHA-1", "a.jar.sha1"),
                ChecksumLocation::new("MD5", "a.jar.md5"),
            ],
            algorithms: vec![Arc::new(Sha1Algorithm), Arc::new(Md5Algorithm)],
        };

        run(request, transporter.clone() as Arc<dyn Transporter>, listener.clone()).await;

        assert_eq!(*listener.terminal.lock().unwrap(), Some("succeeded"));
        let log = transporter.put_log.lock().unwrap();
        assert_eq!(log.len(), 3);
        assert_eq!(log[0].0, "a.jar");
        assert_eq!(log[0].1, b"foo");
        assert_eq!(log[1].0, "a.jar.sha1");
        assert_eq!(log[1].1, b"0beec7b5ea3f0fdbc95d0dd47f3c5bc275da8a33");
        assert_eq!(log[2].0, "a.jar.md5");
        assert_eq!(log[2].1, b"acbd18db4cc2f85cedef654fccc4a4d8");
    }

    #[tokio::test]
    async fn upload_failure_reports_failed_without_sidecars() {
        let transporter = Arc::new(FakeTransporter::default());
        let listener = Arc::new(RecordingListener::default());

        let request = PutRequest {
            uri: "a.jar".to_string(),
            src: std::path::PathBuf::from("/does/not/exist.jar"),
            sidecar_locations: vec![],
            algorithms: vec![],
        };

        run(request, transporter, listener.clone()).await;
        assert_eq!(*listener.terminal.lock().unwrap(), Some("failed"));
    }
}
