use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Registry location relative to the user's home, as systemd sees it via `%h`
pub const DEFAULT_STACKS_DIR: &str = ".config/containers/compose/projects";

/// System-wide location of the instantiated user unit template
pub const DEFAULT_UNIT_PATH: &str = "/etc/systemd/user/podman-compose@.service";

/// Command the unit runs, expanded by systemd at activation time
pub const DEFAULT_COMMAND: &str = "%h/.local/bin/podman-compose";

pub const CONFIG_FILE_ENV: &str = "PODMAN_COMPOSE_SYSTEMD_CONFIG";
pub const REGISTRY_DIR_ENV: &str = "PODMAN_COMPOSE_SYSTEMD_REGISTRY_DIR";
pub const UNIT_PATH_ENV: &str = "PODMAN_COMPOSE_SYSTEMD_UNIT_PATH";

/// What `register` does when the project already has a registry entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverwritePolicy {
    /// Replace the entry silently
    #[default]
    Replace,
    /// Print a warning, then replace
    Warn,
    /// Keep a timestamped copy of the old entry, then replace
    Backup,
}

/// On-disk configuration file. Every field is optional.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub stacks_dir: Option<String>,
    pub registry_dir: Option<PathBuf>,
    pub unit_path: Option<PathBuf>,
    pub command: Option<String>,
    #[serde(default)]
    pub overwrite: OverwritePolicy,
}

/// Resolved settings handed to the registry and the unit generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Home directory `%h` expands to for the invoking user
    pub home: PathBuf,
    pub stacks_dir: String,
    pub registry_dir: PathBuf,
    pub unit_path: PathBuf,
    pub command: String,
    pub overwrite: OverwritePolicy,
}

impl Settings {
    /// Built-in defaults for the given home directory
    pub fn with_home(home: &Path) -> Self {
        Self {
            home: home.to_path_buf(),
            stacks_dir: DEFAULT_STACKS_DIR.to_string(),
            registry_dir: home.join(DEFAULT_STACKS_DIR),
            unit_path: PathBuf::from(DEFAULT_UNIT_PATH),
            command: DEFAULT_COMMAND.to_string(),
            overwrite: OverwritePolicy::default(),
        }
    }

    /// Load settings: defaults, then the config file, then environment overrides
    pub fn load() -> Result<Self> {
        let home = dirs::home_dir().context("Failed to get home directory")?;
        let mut settings = Self::with_home(&home);

        if let Some(path) = get_config_file_path() {
            if path.exists() {
                let file = load_config_file(&path)?;
                settings.apply_file(file);
            }
        }

        settings.apply_env(|key| env::var(key).ok());

        Ok(settings)
    }

    /// Merge values from a config file over the current settings
    pub fn apply_file(&mut self, file: ConfigFile) {
        if let Some(stacks_dir) = file.stacks_dir {
            self.registry_dir = self.home.join(&stacks_dir);
            self.stacks_dir = stacks_dir;
        }
        if let Some(dir) = file.registry_dir {
            self.set_registry_dir(dir);
        }
        if let Some(path) = file.unit_path {
            self.unit_path = path;
        }
        if let Some(command) = file.command {
            self.command = command;
        }
        self.overwrite = file.overwrite;
    }

    /// Apply `PODMAN_COMPOSE_SYSTEMD_*` overrides read through `lookup`
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup(REGISTRY_DIR_ENV) {
            self.set_registry_dir(PathBuf::from(dir));
        }
        if let Some(path) = lookup(UNIT_PATH_ENV) {
            self.unit_path = PathBuf::from(path);
        }
    }

    /// Move the registry. A directory under home also moves `stacks_dir`, so
    /// the unit's `EnvironmentFile=%h/...` keeps pointing at it.
    pub fn set_registry_dir(&mut self, dir: PathBuf) {
        if let Ok(relative) = dir.strip_prefix(&self.home) {
            if !relative.as_os_str().is_empty() {
                self.stacks_dir = relative.to_string_lossy().to_string();
            }
        }
        self.registry_dir = dir;
    }

    /// Whether `%h/<stacks_dir>` is the directory registrations are written to
    pub fn unit_reads_registry(&self) -> bool {
        self.home.join(&self.stacks_dir) == self.registry_dir
    }
}

/// Get the configuration file path
/// Checks PODMAN_COMPOSE_SYSTEMD_CONFIG first,
/// then defaults to <config dir>/podman-compose-systemd/config.toml
pub fn get_config_file_path() -> Option<PathBuf> {
    if let Ok(custom) = env::var(CONFIG_FILE_ENV) {
        return Some(PathBuf::from(custom));
    }

    dirs::config_dir().map(|dir| dir.join("podman-compose-systemd").join("config.toml"))
}

/// Load a configuration file from a specific path
pub fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content =
        fs::read_to_string(path).context(format!("Failed to read config file: {:?}", path))?;

    toml::from_str(&content).context(format!("Failed to parse config file: {:?}", path))
}
