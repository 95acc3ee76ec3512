// /////////////////////////////////////////////////////////////////////////////
// Repo Connector
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Small helpers shared by the checksum validator: unique temp-file naming
//! and tolerant parsing of fetched sidecar files.

use crate::util::unique_sibling;
use repo_connector_domain::ports::ByteStreamListener;
use repo_connector_domain::ConnectorError;
use std::path::{Path, PathBuf};

/// A sibling path that won't collide with any other in-flight temp file,
/// used to stage a fetched checksum sidecar before it is committed.
pub fn unique_temp_path(dest_file: &Path) -> PathBuf {
    unique_sibling(dest_file, "tmp")
}

/// Parses a fetched sidecar file into its hex digest.
///
/// Tolerant of surrounding whitespace and of the common `<hex>  <filename>`
/// form some servers emit: only the leading run of hex characters is kept.
pub fn parse_sidecar_file(path: &Path) -> Result<String, ConnectorError> {
    let text = std::fs::read_to_string(path)?;
    let token = text.split_whitespace().next().unwrap_or("");
    let hex: String = token.chars().take_while(|c| c.is_ascii_hexdigit()).collect();
    if hex.is_empty() {
        return Err(ConnectorError::LocalIo(format!(
            "{}: sidecar file does not contain a hex digest",
            path.display()
        )));
    }
    Ok(hex)
}

/// No-op [`ByteStreamListener`] used for sidecar fetches, which don't carry
/// user-facing progress events.
pub struct NullByteStreamListener;

impl ByteStreamListener for NullByteStreamListener {
    fn started(&self, _data_offset: u64, _data_length: Option<u64>) -> Result<(), ConnectorError> {
        Ok(())
    }

    fn progressed(&self, _buffer: &[u8]) -> Result<(), ConnectorError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_temp_path_keeps_original_extension_visible() {
        let path = unique_temp_path(Path::new("/tmp/x/artifact-1.0.jar"));
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("artifact-1.0.jar."));
        assert!(name.ends_with(".tmp"));
    }

    #[test]
    fn parses_bare_hex_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dest.sha1");
        std::fs::write(&path, "0beec7b5ea3f0fdbc95d0dd47f3c5bc275da8a33\n").unwrap();
        assert_eq!(
            parse_sidecar_file(&path).unwrap(),
            "0beec7b5ea3f0fdbc95d0dd47f3c5bc275da8a33"
        );
    }

    #[test]
    fn parses_hex_with_trailing_filename_comment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dest.sha1");
        std::fs::write(&path, "0beec7b5ea3f0fdbc95d0dd47f3c5bc275da8a33  artifact-1.0.jar\n").unwrap();
        assert_eq!(
            parse_sidecar_file(&path).unwrap(),
            "0beec7b5ea3f0fdbc95d0dd47f3c5bc275da8a33"
        );
    }

    #[test]
    fn empty_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dest.sha1");
        std::fs::write(&path, "").unwrap();
        assert!(parse_sidecar_file(&path).is_err());
    }
}
