// /////////////////////////////////////////////////////////////////////////////
// Repo Connector
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Coordinates a GET's working file across concurrent processes sharing
//! the same local cache: a resumable `.part` sidecar guarded by a
//! [`crate::lockfile::LockFile`], or a throwaway temp file when resume is
//! disabled or unavailable.

use crate::lockfile::LockFile;
use crate::util::unique_sibling;
use repo_connector_domain::ConnectorError;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Configuration a [`crate::connector::Connector`] holds once and reuses for
/// every GET.
#[derive(Debug, Clone, Copy)]
pub struct PartialFileFactory {
    pub resume_enabled: bool,
    pub resume_threshold_bytes: u64,
    pub request_timeout_ms: i64,
}

/// The working file a GET writes into: either a resumable sidecar that
/// survives across failed attempts, or a one-shot temp file.
pub enum PartialFile {
    Resumable {
        part_path: PathBuf,
        lock: LockFile,
        threshold: u64,
    },
    Temp {
        path: PathBuf,
    },
}

impl PartialFileFactory {
    /// Returns `None` when another process just finished the same
    /// download concurrently and the caller should skip it entirely.
    pub async fn new_instance<F, Fut>(
        &self,
        dest_file: &Path,
        remote_access_check: F,
    ) -> Result<Option<PartialFile>, ConnectorError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), ConnectorError>>,
    {
        if !self.resume_enabled {
            return Ok(Some(PartialFile::Temp {
                path: unique_sibling(dest_file, "tmp"),
            }));
        }

        let part_path = part_path_of(dest_file);
        let req_timestamp = SystemTime::now();
        let lock = LockFile::acquire(&part_path, self.request_timeout_ms, remote_access_check).await?;

        if lock.concurrent && Self::destination_just_completed(dest_file, req_timestamp) {
            lock.release().await;
            return Ok(None);
        }

        if let Err(err) = ensure_exists(&part_path).await {
            tracing::debug!(
                part_path = %part_path.display(),
                error = %err,
                "failed to create partial file, falling back to a temp file"
            );
            lock.release().await;
            return Ok(Some(PartialFile::Temp {
                path: unique_sibling(dest_file, "tmp"),
            }));
        }

        Ok(Some(PartialFile::Resumable {
            part_path,
            lock,
            threshold: self.resume_threshold_bytes,
        }))
    }

    fn destination_just_completed(dest_file: &Path, req_timestamp: SystemTime) -> bool {
        let grace = req_timestamp
            .checked_sub(Duration::from_millis(100))
            .unwrap_or(req_timestamp);
        std::fs::metadata(dest_file)
            .and_then(|meta| meta.modified())
            .is_ok_and(|modified| modified >= grace)
    }
}

impl PartialFile {
    pub fn path(&self) -> &Path {
        match self {
            PartialFile::Resumable { part_path, .. } => part_path,
            PartialFile::Temp { path } => path,
        }
    }

    /// True iff a lock is held and the working file already holds at least
    /// the factory's resume threshold worth of useful data.
    pub fn is_resume(&self) -> bool {
        match self {
            PartialFile::Resumable { part_path, threshold, .. } => file_len(part_path) >= *threshold,
            PartialFile::Temp { .. } => false,
        }
    }

    /// Deletes the working file unless it's a resumable sidecar that holds
    /// at least `threshold` bytes, then releases the lock (if any).
    /// Consuming `self` makes repeat calls impossible, so this needs no
    /// internal idempotency flag.
    pub async fn close(self) {
        match self {
            PartialFile::Resumable { part_path, lock, threshold } => {
                if file_len(&part_path) < threshold {
                    let _ = tokio::fs::remove_file(&part_path).await;
                }
                lock.release().await;
            }
            PartialFile::Temp { path } => {
                let _ = tokio::fs::remove_file(&path).await;
            }
        }
    }
}

fn file_len(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

fn part_path_of(dest_file: &Path) -> PathBuf {
    let mut name = dest_file.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest_file.with_file_name(name)
}

async fn ensure_exists(path: &Path) -> std::io::Result<()> {
    tokio::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(path)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factory() -> PartialFileFactory {
        PartialFileFactory {
            resume_enabled: true,
            resume_threshold_bytes: 4,
            request_timeout_ms: 1000,
        }
    }

    #[tokio::test]
    async fn resume_disabled_yields_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("artifact-1.0.jar");
        let factory = PartialFileFactory {
            resume_enabled: false,
            ..factory()
        };
        let partial = factory.new_instance(&dest, || async { Ok(()) }).await.unwrap().unwrap();
        assert!(matches!(partial, PartialFile::Temp { .. }));
        assert!(!partial.is_resume());
        partial.close().await;
    }

    #[tokio::test]
    async fn fresh_resumable_file_is_below_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("artifact-1.0.jar");
        let partial = factory().new_instance(&dest, || async { Ok(()) }).await.unwrap().unwrap();
        assert!(matches!(partial, PartialFile::Resumable { .. }));
        assert!(!partial.is_resume());
        let part_path = partial.path().to_path_buf();
        assert!(part_path.exists());
        partial.close().await;
        assert!(!part_path.exists());
    }

    #[tokio::test]
    async fn resumable_file_above_threshold_reports_resume_and_survives_close() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("artifact-1.0.jar");
        let partial = factory().new_instance(&dest, || async { Ok(()) }).await.unwrap().unwrap();
        std::fs::write(partial.path(), b"0123456789").unwrap();
        assert!(partial.is_resume());
        let part_path = partial.path().to_path_buf();
        partial.close().await;
        assert!(part_path.exists());
    }

    #[tokio::test]
    async fn concurrent_completed_download_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("artifact-1.0.jar");
        std::fs::write(&dest, b"done").unwrap();

        let part_path = part_path_of(&dest);
        let holder = LockFile::acquire(&part_path, 0, || async { Ok(()) }).await.unwrap();
        let release_handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            holder.release().await;
        });

        let result = factory().new_instance(&dest, || async { Ok(()) }).await.unwrap();
        assert!(result.is_none());

        release_handle.await.unwrap();
    }
}
