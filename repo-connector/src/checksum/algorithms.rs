// /////////////////////////////////////////////////////////////////////////////
// Repo Connector
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Built-in [`ChecksumAlgorithm`] implementations for the three digests
//! Maven-style repositories commonly use. Layouts are free to supply their
//! own; these exist so callers don't have to.

use md5::Md5;
use repo_connector_domain::ports::{ChecksumAlgorithm, RunningDigest};
use sha1::Sha1;
use sha2::Sha256;
use sha2::Digest;

struct Sha1Digest(Sha1);
struct Sha256Digest(Sha256);
struct Md5Digest(Md5);

impl RunningDigest for Sha1Digest {
    fn update(&mut self, bytes: &[u8]) {
        Digest::update(&mut self.0, bytes);
    }

    fn finish_hex(&self) -> String {
        hex::encode(self.0.clone().finalize())
    }
}

impl RunningDigest for Sha256Digest {
    fn update(&mut self, bytes: &[u8]) {
        Digest::update(&mut self.0, bytes);
    }

    fn finish_hex(&self) -> String {
        hex::encode(self.0.clone().finalize())
    }
}

impl RunningDigest for Md5Digest {
    fn update(&mut self, bytes: &[u8]) {
        Digest::update(&mut self.0, bytes);
    }

    fn finish_hex(&self) -> String {
        hex::encode(self.0.clone().finalize())
    }
}

pub struct Sha1Algorithm;
pub struct Sha256Algorithm;
pub struct Md5Algorithm;

impl ChecksumAlgorithm for Sha1Algorithm {
    fn name(&self) -> &str {
        "SHA-1"
    }

    fn extension(&self) -> &str {
        "sha1"
    }

    fn new_digest(&self) -> Box<dyn RunningDigest> {
        Box::new(Sha1Digest(Sha1::new()))
    }
}

impl ChecksumAlgorithm for Sha256Algorithm {
    fn name(&self) -> &str {
        "SHA-256"
    }

    fn extension(&self) -> &str {
        "sha256"
    }

    fn new_digest(&self) -> Box<dyn RunningDigest> {
        Box::new(Sha256Digest(Sha256::new()))
    }
}

impl ChecksumAlgorithm for Md5Algorithm {
    fn name(&self) -> &str {
        "MD5"
    }

    fn extension(&self) -> &str {
        "md5"
    }

    fn new_digest(&self) -> Box<dyn RunningDigest> {
        Box::new(Md5Digest(Md5::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha1_matches_known_vector() {
        let algo = Sha1Algorithm;
        let mut digest = algo.new_digest();
        digest.update(b"foo");
        assert_eq!(digest.finish_hex(), "0beec7b5ea3f0fdbc95d0dd47f3c5bc275da8a33");
    }

    #[test]
    fn md5_matches_known_vector() {
        let algo = Md5Algorithm;
        let mut digest = algo.new_digest();
        digest.update(b"foo");
        assert_eq!(digest.finish_hex(), "acbd18db4cc2f85cedef654fccc4a4d8");
    }
}
