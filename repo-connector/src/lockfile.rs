// /////////////////////////////////////////////////////////////////////////////
// Repo Connector
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Cross-process advisory lock on a partial-file's `.lock` sidecar.
//!
//! A non-blocking attempt is tried first; on contention, a caller-supplied
//! remote-access check runs once, then the lock is polled every 100ms,
//! tracking the target file's length so a download that is still making
//! progress never times out early.

use async_fd_lock::{LockWrite, RwLockWriteGuard};
use futures::FutureExt;
use repo_connector_domain::ConnectorError;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::fs::File;

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const MIN_TIMEOUT: Duration = Duration::from_secs(3);

/// Holds an exclusive lock on `<part_file>.lock` for as long as it's alive.
/// Dropping without calling [`LockFile::release`] still unlocks (the guard's
/// own `Drop` does that); `release` additionally best-effort deletes the
/// sidecar.
pub struct LockFile {
    guard: RwLockWriteGuard<File>,
    lock_path: PathBuf,
    /// Whether the lock was contended when this instance acquired it.
    pub concurrent: bool,
}

impl LockFile {
    /// Attempts a non-blocking exclusive lock on `<part_file>.lock`.
    ///
    /// `remote_access_check` runs exactly once, on the first observation of
    /// contention; its failure aborts acquisition. `request_timeout_ms <= 0`
    /// means wait indefinitely for the lock holder to keep making progress.
    pub async fn acquire<F, Fut>(
        part_file: &Path,
        request_timeout_ms: i64,
        remote_access_check: F,
    ) -> Result<Self, ConnectorError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), ConnectorError>>,
    {
        let lock_path = sidecar_path(part_file);

        let file = match Self::open(&lock_path).await {
            Ok(file) => file,
            Err(err) => {
                let _ = tokio::fs::remove_file(&lock_path).await;
                return Err(err);
            }
        };

        match file.lock_write().now_or_never() {
            Some(Ok(guard)) => {
                return Ok(Self {
                    guard,
                    lock_path,
                    concurrent: false,
                });
            }
            Some(Err(err)) => return Err(Self::lock_error(&lock_path, err.error)),
            None => {}
        }

        remote_access_check().await?;

        let mut last_len = file_len(part_file);
        let mut last_advance = Instant::now();
        let timeout = (request_timeout_ms > 0)
            .then(|| Duration::from_millis(request_timeout_ms as u64).max(MIN_TIMEOUT));

        loop {
            let file = Self::open(&lock_path).await?;
            tokio::select! {
                result = file.lock_write() => {
                    let guard = result.map_err(|err| Self::lock_error(&lock_path, err.error))?;
                    return Ok(Self { guard, lock_path, concurrent: true });
                }
                _ = tokio::time::sleep(POLL_INTERVAL) => {
                    let current_len = file_len(part_file);
                    if current_len != last_len {
                        last_len = current_len;
                        last_advance = Instant::now();
                    }
                    if let Some(timeout) = timeout {
                        if last_advance.elapsed() > timeout {
                            return Err(ConnectorError::LockTimeout(timeout.as_millis() as u64));
                        }
                    }
                }
            }
        }
    }

    /// Releases the lock, closes the file handle, and best-effort deletes
    /// the sidecar lock file.
    pub async fn release(self) {
        let lock_path = self.lock_path.clone();
        drop(self.guard);
        let _ = tokio::fs::remove_file(&lock_path).await;
    }

    async fn open(lock_path: &Path) -> Result<File, ConnectorError> {
        tokio::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .read(true)
            .open(lock_path)
            .await
            .map_err(|err| ConnectorError::LocalIo(format!("{}: {err}", lock_path.display())))
    }

    fn lock_error(lock_path: &Path, err: std::io::Error) -> ConnectorError {
        ConnectorError::LocalIo(format!("{}: {err}", lock_path.display()))
    }
}

fn file_len(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

fn sidecar_path(part_file: &Path) -> PathBuf {
    let mut name = part_file.file_name().unwrap_or_default().to_os_string();
    name.push(".lock");
    part_file.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn uncontended_lock_reports_not_concurrent() {
        let dir = tempfile::tempdir().unwrap();
        let part = dir.path().join("dest.part");
        std::fs::write(&part, b"").unwrap();

        let lock = LockFile::acquire(&part, 0, || async { Ok(()) }).await.unwrap();
        assert!(!lock.concurrent);
        lock.release().await;
        assert!(!sidecar_path(&part).exists());
    }

    #[tokio::test]
    async fn remote_access_check_failure_aborts_contended_acquire() {
        let dir = tempfile::tempdir().unwrap();
        let part = dir.path().join("dest.part");
        std::fs::write(&part, b"").unwrap();

        let first = LockFile::acquire(&part, 0, || async { Ok(()) }).await.unwrap();

        let result = LockFile::acquire(&part, 200, || async {
            Err(ConnectorError::NotFound("gone".to_string()))
        })
        .await;
        assert!(matches!(result, Err(ConnectorError::NotFound(_))));

        first.release().await;
    }

    #[tokio::test]
    async fn contended_lock_times_out_when_no_progress() {
        let dir = tempfile::tempdir().unwrap();
        let part = dir.path().join("dest.part");
        std::fs::write(&part, b"").unwrap();

        let first = LockFile::acquire(&part, 0, || async { Ok(()) }).await.unwrap();

        let result = LockFile::acquire(&part, 1, || async { Ok(()) }).await;
        assert!(matches!(result, Err(ConnectorError::LockTimeout(_))));

        first.release().await;
    }
}
