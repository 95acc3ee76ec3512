// /////////////////////////////////////////////////////////////////////////////
// Repo Connector
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Command-Line Interface Module
//!
//! Bootstrap-layer CLI handling with security-first design.
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │  1. parser::parse_cli()             │  Parse CLI with clap
//! └─────────────────┬───────────────────┘
//!                   ↓
//! ┌─────────────────────────────────────┐
//! │  2. validate_cli()                  │  Security validation
//! └─────────────────┬───────────────────┘
//!                   ↓
//! ┌─────────────────────────────────────┐
//! │  3. ValidatedCli                    │  Safe, validated config
//! └─────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `parser` - CLI structure and clap parsing
//! - `validator` - Security validation layer

pub mod parser;
pub mod validator;

pub use parser::{parse_cli, ArtifactArgs, Cli, Commands};
pub use validator::{ParseError, SecureArgParser};

use repo_connector_domain::entities::ArtifactCoordinates;
use std::path::PathBuf;

/// Validated CLI configuration
///
/// Holds every CLI argument after security validation: existing-file
/// arguments are canonicalized, new-file arguments are checked against
/// the same dangerous-pattern/protected-directory rules without
/// requiring the path to already exist.
#[derive(Debug, Clone)]
pub struct ValidatedCli {
    pub command: ValidatedCommand,
    pub verbose: bool,
    pub config: Option<PathBuf>,
    pub repository_id: String,
    pub worker_threads: Option<usize>,
}

/// Validated command variants
#[derive(Debug, Clone)]
pub enum ValidatedCommand {
    Get { artifact: ArtifactCoordinates, dest: PathBuf },
    Put { artifact: ArtifactCoordinates, src: PathBuf },
    Peek { artifact: ArtifactCoordinates },
}

/// Parse and validate CLI arguments
///
/// Combines parsing and validation:
/// 1. Parse CLI with clap
/// 2. Validate every path and string argument with [`SecureArgParser`]
/// 3. Return [`ValidatedCli`] on success
///
/// # Errors
///
/// Returns [`ParseError`] if any validation fails.
pub fn parse_and_validate() -> Result<ValidatedCli, ParseError> {
    let cli = parse_cli();
    validate_cli(cli)
}

fn validate_artifact(artifact: ArtifactArgs) -> Result<ArtifactCoordinates, ParseError> {
    SecureArgParser::validate_argument(&artifact.group_id)?;
    SecureArgParser::validate_argument(&artifact.artifact_id)?;
    SecureArgParser::validate_argument(&artifact.version)?;
    if let Some(classifier) = &artifact.classifier {
        SecureArgParser::validate_argument(classifier)?;
    }
    SecureArgParser::validate_argument(&artifact.extension)?;

    Ok(ArtifactCoordinates {
        group_id: artifact.group_id,
        artifact_id: artifact.artifact_id,
        version: artifact.version,
        classifier: artifact.classifier,
        extension: artifact.extension,
    })
}

/// Validate parsed CLI arguments
///
/// Applies security validation to every argument: path canonicalization,
/// dangerous-pattern detection, and worker-thread range checking.
///
/// # Errors
///
/// Returns [`ParseError`] if any validation fails.
fn validate_cli(cli: Cli) -> Result<ValidatedCli, ParseError> {
    let config = match &cli.config {
        Some(path) => Some(SecureArgParser::validate_path(&path.to_string_lossy())?),
        None => None,
    };

    SecureArgParser::validate_argument(&cli.repository_id)?;

    if let Some(threads) = cli.worker_threads {
        SecureArgParser::validate_number::<usize>("worker-threads", &threads.to_string(), Some(1), Some(256))?;
    }

    let command = match cli.command {
        Commands::Get { artifact, dest } => {
            let artifact = validate_artifact(artifact)?;
            let dest = SecureArgParser::validate_destination_path(&dest.to_string_lossy())?;
            ValidatedCommand::Get { artifact, dest }
        }
        Commands::Put { artifact, src } => {
            let artifact = validate_artifact(artifact)?;
            let src = SecureArgParser::validate_path(&src.to_string_lossy())?;
            ValidatedCommand::Put { artifact, src }
        }
        Commands::Peek { artifact } => {
            let artifact = validate_artifact(artifact)?;
            ValidatedCommand::Peek { artifact }
        }
    };

    Ok(ValidatedCli {
        command,
        verbose: cli.verbose,
        config,
        repository_id: cli.repository_id,
        worker_threads: cli.worker_threads,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_get_command() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli {
            command: Commands::Get {
                artifact: ArtifactArgs {
                    group_id: "org.example".to_string(),
                    artifact_id: "widget-core".to_string(),
                    version: "1.2.3".to_string(),
                    classifier: None,
                    extension: "jar".to_string(),
                },
                dest: dir.path().join("widget-core-1.2.3.jar"),
            },
            verbose: false,
            config: None,
            repository_id: "central".to_string(),
            worker_threads: Some(4),
        };

        let validated = validate_cli(cli).unwrap();
        assert_eq!(validated.repository_id, "central");
        assert!(matches!(validated.command, ValidatedCommand::Get { .. }));
    }

    #[test]
    fn rejects_dangerous_group_id() {
        let cli = Cli {
            command: Commands::Peek {
                artifact: ArtifactArgs {
                    group_id: "org;rm -rf /".to_string(),
                    artifact_id: "widget-core".to_string(),
                    version: "1.2.3".to_string(),
                    classifier: None,
                    extension: "jar".to_string(),
                },
            },
            verbose: false,
            config: None,
            repository_id: "central".to_string(),
            worker_threads: None,
        };

        assert!(matches!(validate_cli(cli), Err(ParseError::DangerousPattern { .. })));
    }

    #[test]
    fn rejects_worker_threads_out_of_range() {
        let cli = Cli {
            command: Commands::Peek {
                artifact: ArtifactArgs {
                    group_id: "org.example".to_string(),
                    artifact_id: "widget-core".to_string(),
                    version: "1.2.3".to_string(),
                    classifier: None,
                    extension: "jar".to_string(),
                },
            },
            verbose: false,
            config: None,
            repository_id: "central".to_string(),
            worker_threads: Some(0),
        };

        assert!(matches!(validate_cli(cli), Err(ParseError::InvalidValue { .. })));
    }
}
