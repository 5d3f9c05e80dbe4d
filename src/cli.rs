//! CLI definitions for podman-compose-systemd
//!
//! The action is taken as a plain string and parsed into `Action` before
//! settings are loaded.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(name = "podman-compose-systemd")]
#[command(version, about = "podman-compose systemd unit file creator", long_about = None)]
pub struct Cli {
    /// One of: register, list, ls, create-unit
    #[arg(value_name = "ACTION")]
    pub action: String,

    /// Registry directory (default: ~/.config/containers/compose/projects)
    #[arg(long, value_name = "DIR")]
    pub registry_dir: Option<PathBuf>,

    /// Path of the generated unit template
    #[arg(long, value_name = "PATH")]
    pub unit_path: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}
