// /////////////////////////////////////////////////////////////////////////////
// Repo Connector
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Small path helpers shared across modules.

use std::path::{Path, PathBuf};
use uuid::Uuid;

/// A sibling of `path` that won't collide with any other in-flight file,
/// named `<original-file-name>.<uuid>.<suffix>`.
pub(crate) fn unique_sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(format!(".{}.{suffix}", Uuid::new_v4()));
    path.with_file_name(name)
}
