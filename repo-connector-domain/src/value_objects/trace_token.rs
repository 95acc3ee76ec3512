// /////////////////////////////////////////////////////////////////////////////
// Repo Connector
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! An opaque correlation token threaded through a single transfer request,
//! useful for tying together its listener events and log lines.

use std::fmt::{self, Display, Formatter};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceToken(Uuid);

impl TraceToken {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TraceToken {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for TraceToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for TraceToken {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_unique() {
        assert_ne!(TraceToken::new(), TraceToken::new());
    }
}
