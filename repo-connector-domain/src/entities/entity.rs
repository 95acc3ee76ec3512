// /////////////////////////////////////////////////////////////////////////////
// Repo Connector
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Identifiable things the layout knows how to map to a URI.

use std::fmt::{self, Display, Formatter};

/// A `groupId:artifactId:version:classifier:extension` coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactCoordinates {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub classifier: Option<String>,
    pub extension: String,
}

impl Display for ArtifactCoordinates {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{classifier}")?;
        }
        write!(f, ":{}", self.extension)
    }
}

/// The level at which a metadata entity lives in the coordinate tree.
///
/// Ordered the way [`crate::ports::RepositoryLayout`] producers group
/// metadata uploads: version, then artifact, then group, then root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MetadataLevel {
    Version,
    Artifact,
    Group,
    Root,
}

/// A coordinate-tree node whose file is a repository index, not an
/// artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetadataCoordinates {
    pub level: MetadataLevel,
    pub group_id: String,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
}

/// Either an artifact or a metadata coordinate; the thing a
/// [`crate::ports::RepositoryLayout`] maps to a [`crate::value_objects::Location`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Entity {
    Artifact(ArtifactCoordinates),
    Metadata(MetadataCoordinates),
}

impl Entity {
    pub fn metadata_level(&self) -> Option<MetadataLevel> {
        match self {
            Entity::Artifact(_) => None,
            Entity::Metadata(m) => Some(m.level),
        }
    }
}
