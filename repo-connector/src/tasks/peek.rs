// /////////////////////////////////////////////////////////////////////////////
// Repo Connector
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Existence-only check: `INITIATED` -> `transporter.peek` -> `SUCCEEDED`
//! or `FAILED`. Used whenever a request's `existence_only` flag is set, in
//! place of a full [`crate::tasks::get`].

use repo_connector_domain::ports::{TransferEvent, TransferListener, Transporter};

pub async fn run(uri: &str, transporter: &dyn Transporter, listener: &dyn TransferListener) {
    let event = TransferEvent::new(uri);
    if let Err(failure) = listener.transfer_initiated(&event) {
        let mut event = event;
        event.failure = Some(failure);
        listener.transfer_failed(&event);
        return;
    }

    match transporter.peek(uri).await {
        Ok(()) => listener.transfer_succeeded(&event),
        Err(err) => {
            let mut event = event;
            event.failure = Some(repo_connector_domain::ConnectorError::TransportFailure(err.0));
            listener.transfer_failed(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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
    async fn existing_uri_succeeds() {
        let transporter = FakeTransporter::default().with_response("a.jar", b"data".to_vec());
        let listener = RecordingListener::default();
        run("a.jar", &transporter, &listener).await;
        assert_eq!(*listener.terminal.lock().unwrap(), Some("succeeded"));
    }

    #[tokio::test]
    async fn missing_uri_fails() {
        let transporter = FakeTransporter::default();
        let listener = RecordingListener::default();
        run("missing.jar", &transporter, &listener).await;
        assert_eq!(*listener.terminal.lock().unwrap(), Some("failed"));
    }
}
