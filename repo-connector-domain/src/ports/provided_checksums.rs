// /////////////////////////////////////////////////////////////////////////////
// Repo Connector
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! An out-of-band source of expected checksums (the PROVIDED kind),
//! e.g. values recorded in a lockfile or dependency manifest.

use std::collections::HashMap;

/// Supplies a map of `algorithm name -> expected lowercase hex digest` for
/// a single transfer, if the caller has one available out-of-band.
pub trait ProvidedChecksumSource: Send + Sync {
    fn provided_checksums(&self) -> Option<HashMap<String, String>>;
}
