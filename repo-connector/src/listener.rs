// /////////////////////////////////////////////////////////////////////////////
// Repo Connector
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Bridges the byte-stream-level callbacks a [`repo_connector_domain::ports::Transporter`]
//! drives while it streams a GET into the richer, ordered
//! [`TransferListener`] events a caller observes, and keeps a checksum
//! calculator primed against whatever offset each attempt resumed from.
//!
//! A task runner may invoke the transporter more than once for the same
//! logical transfer (a resumed partial-response restart, or one of this
//! crate's own retry trials); only the first `started` call is forwarded to
//! the user-facing listener, while every one re-primes the calculator so
//! digests always reflect the data actually on disk.

use crate::checksum::ChecksumCalculator;
use repo_connector_domain::ports::{ByteStreamListener, TransferEvent, TransferListener};
use repo_connector_domain::ConnectorError;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

struct AdapterState {
    calculator: Option<ChecksumCalculator>,
    transferred_bytes: u64,
    resource_length: Option<u64>,
    resume_offset: u64,
    started_emitted: bool,
}

pub struct ListenerAdapter {
    inner: Arc<dyn TransferListener>,
    uri: String,
    temp_path: PathBuf,
    state: Mutex<AdapterState>,
}

impl ListenerAdapter {
    pub fn new(
        uri: impl Into<String>,
        inner: Arc<dyn TransferListener>,
        calculator: Option<ChecksumCalculator>,
        temp_path: PathBuf,
    ) -> Self {
        Self {
            inner,
            uri: uri.into(),
            temp_path,
            state: Mutex::new(AdapterState {
                calculator,
                transferred_bytes: 0,
                resource_length: None,
                resume_offset: 0,
                started_emitted: false,
            }),
        }
    }

    fn event(&self, state: &AdapterState, failure: Option<ConnectorError>) -> TransferEvent {
        TransferEvent {
            uri: self.uri.clone(),
            transferred_bytes: state.transferred_bytes,
            resource_length: state.resource_length,
            resume_offset: state.resume_offset,
            failure,
        }
    }

    pub fn initiated(&self) -> Result<(), ConnectorError> {
        let state = self.state.lock().unwrap();
        self.inner.transfer_initiated(&self.event(&state, None))
    }

    /// Forwarded whenever a retry trial or policy decides to tolerate a
    /// checksum mismatch; may fire more than once before the terminal
    /// event.
    pub fn corrupted(&self, failure: ConnectorError) -> Result<(), ConnectorError> {
        let state = self.state.lock().unwrap();
        self.inner.transfer_corrupted(&self.event(&state, Some(failure)))
    }

    pub fn succeeded(&self) {
        let state = self.state.lock().unwrap();
        self.inner.transfer_succeeded(&self.event(&state, None));
    }

    pub fn failed(&self, failure: ConnectorError) {
        let state = self.state.lock().unwrap();
        self.inner.transfer_failed(&self.event(&state, Some(failure)));
    }

    /// Current digests, or an empty map when no checksum calculator is
    /// active for this transfer (the validator's policy is `None`).
    pub fn checksums(&self) -> HashMap<String, Result<String, ConnectorError>> {
        self.state
            .lock()
            .unwrap()
            .calculator
            .as_ref()
            .map(|c| c.finish())
            .unwrap_or_default()
    }
}

impl ByteStreamListener for ListenerAdapter {
    fn started(&self, data_offset: u64, data_length: Option<u64>) -> Result<(), ConnectorError> {
        let mut state = self.state.lock().unwrap();
        state.resume_offset = data_offset;
        state.resource_length = data_length;
        state.transferred_bytes = data_offset;
        if let Some(calculator) = state.calculator.as_mut() {
            calculator.prime(&self.temp_path, data_offset);
        }
        if !state.started_emitted {
            state.started_emitted = true;
            let event = self.event(&state, None);
            return self.inner.transfer_started(&event);
        }
        Ok(())
    }

    fn progressed(&self, buffer: &[u8]) -> Result<(), ConnectorError> {
        let mut state = self.state.lock().unwrap();
        if let Some(calculator) = state.calculator.as_mut() {
            calculator.update(buffer);
        }
        state.transferred_bytes += buffer.len() as u64;
        let event = self.event(&state, None);
        self.inner.transfer_progressed(&event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::algorithms::Sha1Algorithm;
    use std::sync::Arc;

    #[derive(Default)]
    struct RecordingListener {
        events: Mutex<Vec<&'static str>>,
    }

    impl TransferListener for RecordingListener {
        fn transfer_initiated(&self, _event: &TransferEvent) -> Result<(), ConnectorError> {
            self.events.lock().unwrap().push("initiated");
            Ok(())
        }

        fn transfer_started(&self, _event: &TransferEvent) -> Result<(), ConnectorError> {
            self.events.lock().unwrap().push("started");
            Ok(())
        }

        fn transfer_progressed(&self, _event: &TransferEvent) -> Result<(), ConnectorError> {
            self.events.lock().unwrap().push("progressed");
            Ok(())
        }

        fn transfer_succeeded(&self, _event: &TransferEvent) {
            self.events.lock().unwrap().push("succeeded");
        }
    }

    #[test]
    fn started_is_forwarded_only_once_but_reprimes_every_call() {
        let dir = tempfile::tempdir().unwrap();
        let temp_path = dir.path().join("dest.tmp");
        std::fs::write(&temp_path, b"foo").unwrap();

        let recording = Arc::new(RecordingListener::default());
        let calculator = ChecksumCalculator::new(vec![Arc::new(Sha1Algorithm)]);
        let adapter = ListenerAdapter::new("https://example/artifact.jar", recording.clone(), calculator, temp_path);

        adapter.initiated().unwrap();
        adapter.started(0, Some(3)).unwrap();
        adapter.progressed(b"foo").unwrap();
        adapter.started(3, Some(3)).unwrap(); // a same-trial internal restart
        adapter.succeeded();

        let events = recording.events.lock().unwrap().clone();
        assert_eq!(events, vec!["initiated", "started", "progressed", "succeeded"]);
    }

    #[test]
    fn checksums_reflect_primed_and_updated_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let temp_path = dir.path().join("dest.tmp");
        std::fs::write(&temp_path, b"fo").unwrap();

        let recording = Arc::new(RecordingListener::default());
        let calculator = ChecksumCalculator::new(vec![Arc::new(Sha1Algorithm)]);
        let adapter = ListenerAdapter::new("uri", recording, calculator, temp_path);

        adapter.started(2, None).unwrap();
        adapter.progressed(b"o").unwrap();

        let checksums = adapter.checksums();
        assert_eq!(
            checksums.get("SHA-1").unwrap().as_ref().unwrap(),
            "0beec7b5ea3f0fdbc95d0dd47f3c5bc275da8a33"
        );
    }

    #[test]
    fn no_calculator_yields_empty_checksums() {
        let dir = tempfile::tempdir().unwrap();
        let temp_path = dir.path().join("dest.tmp");
        std::fs::write(&temp_path, b"").unwrap();
        let recording = Arc::new(RecordingListener::default());
        let adapter = ListenerAdapter::new("uri", recording, None, temp_path);
        adapter.started(0, None).unwrap();
        assert!(adapter.checksums().is_empty());
    }
}
