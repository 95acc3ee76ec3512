// /////////////////////////////////////////////////////////////////////////////
// Repo Connector
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Checksum Calculator
//!
//! Streaming multi-algorithm digest with a resume-seek primer. One
//! calculator is created per GET and fed bytes as they arrive; `prime`
//! replays the bytes already on disk so a resumed transfer still produces
//! a digest over the whole file.
//!
//! Digest error state is sticky per algorithm and never cross-contaminates
//! another algorithm's result.

use repo_connector_domain::ports::ChecksumAlgorithm;
use repo_connector_domain::ConnectorError;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

type Slot = Result<Box<dyn repo_connector_domain::ports::RunningDigest>, ConnectorError>;

/// Holds one running digest per distinct algorithm name.
pub struct ChecksumCalculator {
    algorithms: Vec<Arc<dyn ChecksumAlgorithm>>,
    slots: Vec<(String, Slot)>,
}

const PRIME_BUF_SIZE: usize = 64 * 1024;

impl ChecksumCalculator {
    /// Returns `None` if `algorithms` is empty - nothing to compute.
    pub fn new(algorithms: Vec<Arc<dyn ChecksumAlgorithm>>) -> Option<Self> {
        if algorithms.is_empty() {
            return None;
        }
        let slots = algorithms
            .iter()
            .map(|a| (a.name().to_string(), Ok(a.new_digest())))
            .collect();
        Some(Self { algorithms, slots })
    }

    /// Resets all digests, then, if `offset > 0`, reads exactly `offset`
    /// bytes from `data_file` starting at position 0 into the digests. If
    /// the file is shorter than `offset`, every digest is recorded as
    /// errored and `prime` still returns normally.
    pub fn prime(&mut self, data_file: &Path, offset: u64) {
        self.reset();
        if offset == 0 {
            return;
        }

        match Self::prime_bytes(data_file, offset, &mut self.slots) {
            Ok(()) => {}
            Err(err) => {
                for (_, slot) in self.slots.iter_mut() {
                    *slot = Err(err.clone());
                }
            }
        }
    }

    fn prime_bytes(data_file: &Path, offset: u64, slots: &mut [(String, Slot)]) -> Result<(), ConnectorError> {
        let mut file = File::open(data_file)?;
        file.seek(SeekFrom::Start(0))?;
        let mut remaining = offset;
        let mut buf = [0u8; PRIME_BUF_SIZE];
        while remaining > 0 {
            let want = remaining.min(PRIME_BUF_SIZE as u64) as usize;
            let read = file.read(&mut buf[..want])?;
            if read == 0 {
                return Err(ConnectorError::LocalIo(format!(
                    "{} is shorter than the requested resume offset {offset}",
                    data_file.display()
                )));
            }
            for (_, slot) in slots.iter_mut() {
                if let Ok(digest) = slot {
                    digest.update(&buf[..read]);
                }
            }
            remaining -= read as u64;
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.slots = self
            .algorithms
            .iter()
            .map(|a| (a.name().to_string(), Ok(a.new_digest())))
            .collect();
    }

    /// Feeds `bytes` to every live digest. Never mutates the caller's view
    /// of `bytes`.
    pub fn update(&mut self, bytes: &[u8]) {
        for (_, slot) in self.slots.iter_mut() {
            if let Ok(digest) = slot {
                digest.update(bytes);
            }
        }
    }

    /// Returns `algorithm name -> (lowercase hex digest | error)` as of
    /// right now. Idempotent: does not consume or disturb the calculator,
    /// so it may be called again after further `update`/`prime` calls.
    pub fn finish(&self) -> HashMap<String, Result<String, ConnectorError>> {
        self.slots
            .iter()
            .map(|(name, slot)| {
                let value = match slot {
                    Ok(digest) => Ok(digest.finish_hex()),
                    Err(err) => Err(err.clone()),
                };
                (name.clone(), value)
            })
            .collect()
    }
}
