use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::Parser;
use tracing::debug;

use editorial::cli::{Cli, Command};
use editorial::commands;
use editorial::service::{InMemoryWorkflowService, RestWorkflowService, StoreSnapshot};
use editorial::telemetry;
use editorial::ui::Terminal;
use editorial::workflow::Actor;
use editorial::{EditorialConfig, EditorialError, ReviewDesk};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let term = Terminal::default();

    match run(cli, &term).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Workflow rejections are shown as the bare inline message.
            match err.downcast_ref::<EditorialError>() {
                Some(inner) if inner.as_workflow().is_some() => term.error(inner),
                _ => term.fail(&format!("{err:#}")),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, term: &Terminal) -> Result<()> {
    let config = EditorialConfig::load().context("failed to load editorial.toml")?;
    telemetry::init(cli.verbose, config.log_format);

    let actor = Actor::new(cli.actor_id, cli.role.into());
    debug!(role = %actor.role, actor_id = actor.id, offline = cli.offline, "starting");

    match cli.command {
        Command::Demo => commands::run_demo(term).await?,
        Command::Seed => {
            if !cli.offline {
                bail!("seed requires --offline");
            }
            let store = open_store(&config).await?;
            store.restore(StoreSnapshot::demo(Utc::now())).await?;
            term.success(&format!("seeded {}", config.store_path));
        }
        command if cli.offline => {
            let store = open_store(&config).await?;
            commands::execute(&ReviewDesk::new(store, actor), command, &config, term).await?;
        }
        command => {
            let service = RestWorkflowService::from_config(&config)?;
            commands::execute(&ReviewDesk::new(service, actor), command, &config, term).await?;
        }
    }
    Ok(())
}

async fn open_store(config: &EditorialConfig) -> Result<InMemoryWorkflowService> {
    InMemoryWorkflowService::open(&config.store_path)
        .await
        .with_context(|| format!("failed to open store {}", config.store_path))
}
