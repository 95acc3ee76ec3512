// /////////////////////////////////////////////////////////////////////////////
// Repo Connector
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # CLI Parser
//!
//! Command-line interface parsing using clap.
//!
//! This module defines the CLI structure and handles argument parsing.
//! Security validation happens in the validator module after parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Main CLI structure
#[derive(Parser, Debug, Clone)]
#[command(name = "repo-connector")]
#[command(about = concat!("Repo Connector demo CLI v", env!("CARGO_PKG_VERSION")))]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Session-config TOML file, layered under built-in defaults
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Repository this invocation targets
    #[arg(short, long, default_value = "central")]
    pub repository_id: String,

    /// Override the connector's worker-thread count for this invocation
    #[arg(long)]
    pub worker_threads: Option<usize>,
}

/// Coordinates shared by every subcommand that names an artifact.
#[derive(clap::Args, Debug, Clone)]
pub struct ArtifactArgs {
    /// Group id, e.g. "org.example"
    #[arg(long)]
    pub group_id: String,

    /// Artifact id, e.g. "widget-core"
    #[arg(long)]
    pub artifact_id: String,

    /// Version, e.g. "1.2.3"
    #[arg(long)]
    pub version: String,

    /// Optional classifier, e.g. "sources"
    #[arg(long)]
    pub classifier: Option<String>,

    /// File extension, e.g. "jar"
    #[arg(long, default_value = "jar")]
    pub extension: String,
}

/// CLI subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Download an artifact from the repository into the local cache
    Get {
        #[command(flatten)]
        artifact: ArtifactArgs,

        /// Destination file path
        #[arg(short, long)]
        dest: PathBuf,
    },

    /// Upload an artifact (and its checksum sidecars) to the repository
    Put {
        #[command(flatten)]
        artifact: ArtifactArgs,

        /// Source file path
        #[arg(short, long)]
        src: PathBuf,
    },

    /// Check whether an artifact exists in the repository, without downloading it
    Peek {
        #[command(flatten)]
        artifact: ArtifactArgs,
    },
}

/// Parse CLI arguments
///
/// This is the entry point for CLI parsing. It uses clap to parse
/// arguments and returns the parsed CLI structure.
///
/// # Panics
///
/// Clap exits the process with a usage message if parsing fails.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_get_command() {
        let cli = Cli::parse_from([
            "repo-connector",
            "--repository-id",
            "central",
            "get",
            "--group-id",
            "org.example",
            "--artifact-id",
            "widget-core",
            "--version",
            "1.2.3",
            "--dest",
            "/tmp/widget-core-1.2.3.jar",
        ]);

        assert_eq!(cli.repository_id, "central");
        match cli.command {
            Commands::Get { artifact, dest } => {
                assert_eq!(artifact.group_id, "org.example");
                assert_eq!(artifact.artifact_id, "widget-core");
                assert_eq!(artifact.extension, "jar");
                assert_eq!(dest, PathBuf::from("/tmp/widget-core-1.2.3.jar"));
            }
            other => panic!("expected Get, got {other:?}"),
        }
    }

    #[test]
    fn parses_peek_command() {
        let cli = Cli::parse_from([
            "repo-connector",
            "peek",
            "--group-id",
            "org.example",
            "--artifact-id",
            "widget-core",
            "--version",
            "1.2.3",
        ]);

        assert!(matches!(cli.command, Commands::Peek { .. }));
    }
}
