//! Compose project discovery
//!
//! Locates the compose file in a project directory and builds the environment
//! snapshot that gets persisted into the registry.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use colored::Colorize;

use super::env::{EnvSnapshot, InvalidEnvLine, parse_env_file};
use crate::error::ComposeSystemdError;

/// Recognized compose file names, in lookup order
pub const COMPOSE_FILE_NAMES: [&str; 2] = ["docker-compose.yml", "docker-compose.yaml"];

/// Local override file read from the project directory
pub const ENV_FILE_NAME: &str = ".env";

pub const PROJECT_DIR_KEY: &str = "COMPOSE_PROJECT_DIR";
pub const COMPOSE_FILE_KEY: &str = "COMPOSE_FILE";

/// A compose project ready to be registered
#[derive(Debug, Clone)]
pub struct ComposeProject {
    /// Base name of the project directory
    pub name: String,
    pub dir: PathBuf,
    pub compose_file: PathBuf,
    pub env: EnvSnapshot,
    /// Override file that was merged, if any
    pub env_file: Option<PathBuf>,
    /// Override lines that were rejected
    pub invalid_lines: Vec<InvalidEnvLine>,
}

impl ComposeProject {
    /// Build the project snapshot for `working_dir`
    pub fn from_dir(working_dir: &Path) -> Result<Self> {
        let dir = fs::canonicalize(working_dir)
            .context(format!("Failed to resolve project directory: {:?}", working_dir))?;

        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ComposeSystemdError::InvalidProjectDir { dir: dir.clone() })?;

        let compose_file = find_compose_file(&dir)
            .ok_or_else(|| ComposeSystemdError::MissingComposeFile { dir: dir.clone() })?;

        let mut env = EnvSnapshot::new();
        env.insert(PROJECT_DIR_KEY, dir.to_string_lossy());
        env.insert(COMPOSE_FILE_KEY, compose_file.to_string_lossy());

        let mut invalid_lines = Vec::new();
        let env_path = dir.join(ENV_FILE_NAME);
        let env_file = if env_path.is_file() {
            println!(
                "{} Loading environment variables from {}",
                "ℹ".blue(),
                env_path.display()
            );

            let parsed = parse_env_file(&env_path)?;
            for (key, value) in parsed.pairs {
                env.insert(key, value);
            }
            for invalid in &parsed.invalid {
                println!("{} {}", "⚠".yellow(), invalid);
            }
            invalid_lines = parsed.invalid;

            Some(env_path)
        } else {
            None
        };

        Ok(Self {
            name,
            dir,
            compose_file,
            env,
            env_file,
            invalid_lines,
        })
    }
}

/// First recognized compose file present in `dir`
pub fn find_compose_file(dir: &Path) -> Option<PathBuf> {
    COMPOSE_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}
