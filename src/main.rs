//! podman-compose-systemd - run podman-compose projects as systemd user services
//!
//! Registers the compose project in the current directory, lists registered
//! projects, and installs the `podman-compose@.service` template unit.

use std::{env, process::ExitCode};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod error;
mod project;
mod systemd;

use cli::Cli;
use config::Settings;
use systemd::commands::{Action, Completion, Dispatcher};

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let action: Action = cli.action.parse()?;

    let mut settings = Settings::load()?;
    if let Some(dir) = cli.registry_dir {
        let dir = std::path::absolute(&dir)
            .context(format!("Failed to resolve registry directory: {:?}", dir))?;
        settings.set_registry_dir(dir);
    }
    if let Some(path) = cli.unit_path {
        settings.unit_path = path;
    }
    tracing::debug!("settings: {:?}", settings);

    let working_dir = env::current_dir().context("Failed to get current directory")?;
    let dispatcher = Dispatcher::new(settings);

    match dispatcher.run(action, &working_dir)? {
        Completion::Success => Ok(ExitCode::SUCCESS),
        Completion::NeedsPrivilege => Ok(ExitCode::FAILURE),
    }
}
