// /////////////////////////////////////////////////////////////////////////////
// Repo Connector
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The user-observable side of a transfer: a strictly ordered sequence of
//! events, and the lower-level byte-stream callbacks a [`crate::ports::Transporter`]
//! drives while it streams bytes.

use crate::error::ConnectorError;

/// A single user-observable occurrence during a transfer.
#[derive(Debug, Clone)]
pub struct TransferEvent {
    pub uri: String,
    /// Bytes transferred so far (cumulative), as of this event.
    pub transferred_bytes: u64,
    /// Total resource length, if known at this point.
    pub resource_length: Option<u64>,
    /// Offset resumed from, if this is (or follows) a resumed transfer.
    pub resume_offset: u64,
    /// Populated on `corrupted`/`failed` events.
    pub failure: Option<ConnectorError>,
}

impl TransferEvent {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            transferred_bytes: 0,
            resource_length: None,
            resume_offset: 0,
            failure: None,
        }
    }
}

/// User-facing listener sink.
///
/// Exactly one `initiated`, one `started`, zero or more `progressed`, and
/// exactly one of `succeeded` or `failed` (optionally preceded by one or
/// more `corrupted`) fire per transfer. A cancellation raised from
/// `initiated`, `started`, `progressed`, or `corrupted` propagates out of
/// the transporter's callback and is reported as `failed`.
pub trait TransferListener: Send + Sync {
    fn transfer_initiated(&self, event: &TransferEvent) -> Result<(), ConnectorError> {
        let _ = event;
        Ok(())
    }

    fn transfer_started(&self, event: &TransferEvent) -> Result<(), ConnectorError> {
        let _ = event;
        Ok(())
    }

    fn transfer_progressed(&self, event: &TransferEvent) -> Result<(), ConnectorError> {
        let _ = event;
        Ok(())
    }

    fn transfer_corrupted(&self, event: &TransferEvent) -> Result<(), ConnectorError> {
        let _ = event;
        Ok(())
    }

    fn transfer_succeeded(&self, event: &TransferEvent) {
        let _ = event;
    }

    fn transfer_failed(&self, event: &TransferEvent) {
        let _ = event;
    }
}

/// Byte-stream-level callbacks a [`crate::ports::Transporter`] drives while
/// it reads/writes a GET. Distinct from [`TransferListener`] so transporter
/// implementations don't need to know about the richer user-facing event
/// shape; the core's listener adapter implements this and translates into
/// [`TransferEvent`]s plus feeds the checksum calculator.
pub trait ByteStreamListener {
    /// The transport has started (or restarted) streaming. `data_offset`
    /// is nonzero only for a resumed transfer; `data_length` is the
    /// server-reported total length, if known.
    fn started(&self, data_offset: u64, data_length: Option<u64>) -> Result<(), ConnectorError>;

    /// A chunk of bytes was just written to the destination file.
    fn progressed(&self, buffer: &[u8]) -> Result<(), ConnectorError>;
}
