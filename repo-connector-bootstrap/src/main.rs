// /////////////////////////////////////////////////////////////////////////////
// Repo Connector
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Demo entry point wiring the bootstrap layer to [`repo_connector::connector::Connector`].
//!
//! There is no production [`repo_connector_domain::ports::Transporter`] or
//! [`repo_connector_domain::ports::RepositoryLayout`] in this workspace -
//! those are external ports a hosting application supplies - so this demo
//! wires the in-memory doubles from [`repo_connector::testkit`] to exercise
//! the full get/put/peek path end to end.

use repo_connector::config::SessionConfig;
use repo_connector::connector::Connector;
use repo_connector::testkit::{FakeRepositoryLayout, FakeTransporter};
use repo_connector_bootstrap::cli::ValidatedCommand;
use repo_connector_bootstrap::logger::{BootstrapLogger, ConsoleLogger};
use repo_connector_bootstrap::shutdown::ShutdownCoordinator;
use repo_connector_bootstrap::signals::create_signal_handler;
use repo_connector_bootstrap::{bootstrap_cli, exit_code::result_to_exit_code};
use repo_connector_domain::entities::{Entity, TransferRequest};
use repo_connector_domain::ports::{TransferEvent, TransferListener};
use repo_connector_domain::value_objects::TraceToken;
use repo_connector_domain::ConnectorError;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Reports every transfer event to [`tracing`] through the bootstrap logger.
struct DemoListener {
    logger: Arc<dyn BootstrapLogger>,
}

impl TransferListener for DemoListener {
    fn transfer_started(&self, event: &TransferEvent) -> Result<(), ConnectorError> {
        self.logger.info(&format!("transferring {}", event.uri));
        Ok(())
    }

    fn transfer_succeeded(&self, event: &TransferEvent) {
        self.logger.info(&format!("done: {} ({} bytes)", event.uri, event.transferred_bytes));
    }

    fn transfer_failed(&self, event: &TransferEvent) {
        let reason = event.failure.as_ref().map(ToString::to_string).unwrap_or_else(|| "unknown error".to_string());
        self.logger.error(&format!("failed: {} - {reason}", event.uri));
    }
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let validated = match bootstrap_cli() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("CLI error: {e}");
            return std::process::ExitCode::from(64); // EX_USAGE
        }
    };

    init_tracing(validated.verbose);
    let result = run(validated).await;
    result_to_exit_code(result)
}

async fn run(validated: repo_connector_bootstrap::cli::ValidatedCli) -> Result<(), ConnectorError> {
    let logger: Arc<dyn BootstrapLogger> = Arc::new(ConsoleLogger::with_prefix("repo-connector"));
    let coordinator = ShutdownCoordinator::new(DEFAULT_SHUTDOWN_GRACE_PERIOD);
    let shutdown_token = coordinator.token();
    let signal_handler = create_signal_handler();
    tokio::spawn(async move {
        signal_handler
            .wait_for_signal(Box::new(move || shutdown_token.cancel()))
            .await;
    });

    let mut overrides = HashMap::new();
    if let Some(threads) = validated.worker_threads {
        overrides.insert(repo_connector::config::WORKER_THREADS.to_string(), threads.to_string());
    }
    let session = SessionConfig::resolve(validated.repository_id.as_str(), validated.config.as_deref(), &overrides)?;

    let transporter = Arc::new(FakeTransporter::default());
    let layout = Arc::new(FakeRepositoryLayout::default().with_uri(format!("demo://{}/", validated.repository_id)));
    let connector = Connector::new(validated.repository_id.clone(), layout, transporter, session)?;

    let listener: Arc<dyn TransferListener> = Arc::new(DemoListener { logger: logger.clone() });
    let token = coordinator.token();

    let outcome = tokio::select! {
        result = dispatch(&connector, validated.command, listener) => result,
        _ = token.cancelled() => {
            logger.warn("shutdown requested, abandoning in-flight transfer");
            Ok(())
        }
    };

    connector.close().await;
    outcome
}

async fn dispatch(connector: &Connector, command: ValidatedCommand, listener: Arc<dyn TransferListener>) -> Result<(), ConnectorError> {
    match command {
        ValidatedCommand::Get { artifact, dest } => {
            let request = TransferRequest::ArtifactGet {
                entity: Entity::Artifact(artifact),
                dest,
                policy: None,
                existence_only: false,
                inlined_checksums: None,
                provided: None,
                trace: TraceToken::new(),
                listener,
            };
            connector.get(vec![request]).await
        }
        ValidatedCommand::Put { artifact, src } => {
            let request = TransferRequest::ArtifactPut {
                entity: Entity::Artifact(artifact),
                src,
                trace: TraceToken::new(),
                listener,
            };
            connector.put(vec![request]).await
        }
        ValidatedCommand::Peek { artifact } => {
            let request = TransferRequest::ArtifactGet {
                entity: Entity::Artifact(artifact),
                dest: PathBuf::new(),
                policy: None,
                existence_only: true,
                inlined_checksums: None,
                provided: None,
                trace: TraceToken::new(),
                listener,
            };
            connector.get(vec![request]).await
        }
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default_filter = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
