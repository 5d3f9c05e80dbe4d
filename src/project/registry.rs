//! Project registry
//!
//! This module manages the per-user directory of registered projects.
//! Each project is stored as `<name>.env`, a `KEY=VALUE` file systemd loads
//! through `EnvironmentFile=`.
//!
//! Writers are not locked against each other: two concurrent registrations of
//! the same project leave whichever finished last.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::Local;
use colored::Colorize;

use super::env::EnvSnapshot;
use crate::config::OverwritePolicy;

pub const ENTRY_EXTENSION: &str = "env";

/// Per-user registry of project environment snapshots
#[derive(Debug, Clone)]
pub struct Registry {
    dir: PathBuf,
    overwrite: OverwritePolicy,
}

impl Registry {
    pub fn new(dir: impl Into<PathBuf>, overwrite: OverwritePolicy) -> Self {
        Self {
            dir: dir.into(),
            overwrite,
        }
    }

    /// Path of the entry for a project name
    pub fn entry_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", name, ENTRY_EXTENSION))
    }

    /// Write a project's snapshot, fully replacing any previous entry
    pub fn register(&self, name: &str, env: &EnvSnapshot) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).context(format!(
            "Failed to create registry directory: {:?}",
            self.dir
        ))?;

        let path = self.entry_path(name);

        if path.exists() {
            self.handle_existing(name, &path)?;
        }

        tracing::debug!("writing [{}]: ...", path.display());
        fs::write(&path, env.to_string())
            .context(format!("Failed to write registry entry: {:?}", path))?;
        tracing::debug!("writing [{}]: done.", path.display());

        Ok(path)
    }

    fn handle_existing(&self, name: &str, path: &Path) -> Result<()> {
        match self.overwrite {
            OverwritePolicy::Replace => {}
            OverwritePolicy::Warn => {
                println!(
                    "{} Project {} is already registered, replacing {}",
                    "⚠".yellow(),
                    name.bright_white(),
                    path.display()
                );
            }
            OverwritePolicy::Backup => {
                let backup = self.backup_entry(name, path)?;
                println!("{} Backup created: {}", "✓".green(), backup.display());
            }
        }
        Ok(())
    }

    /// Copy an existing entry aside. Backups do not end in `.env`, so they
    /// never show up as registered projects.
    fn backup_entry(&self, name: &str, path: &Path) -> Result<PathBuf> {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let backup_path = self
            .dir
            .join(format!("{}.{}.{}.bak", name, ENTRY_EXTENSION, timestamp));

        fs::copy(path, &backup_path).context(format!(
            "Failed to back up registry entry: {:?}",
            path
        ))?;

        Ok(backup_path)
    }

    /// Names of all registered projects, in directory order.
    ///
    /// A missing registry directory is treated as empty.
    pub fn list(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).context(format!(
                    "Failed to read registry directory: {:?}",
                    self.dir
                ));
            }
        };

        let names = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().map(|ext| ext == ENTRY_EXTENSION).unwrap_or(false))
            .filter_map(|p| {
                p.file_stem()
                    .map(|stem| stem.to_string_lossy().to_string())
            })
            .filter(|name| !name.is_empty())
            .collect();

        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn snapshot(pairs: &[(&str, &str)]) -> EnvSnapshot {
        let mut env = EnvSnapshot::new();
        for (k, v) in pairs {
            env.insert(*k, *v);
        }
        env
    }

    #[test]
    fn test_register_creates_directory_and_entry() {
        let tmp = TempDir::new().unwrap();
        let registry = Registry::new(tmp.path().join("a/b/projects"), OverwritePolicy::Replace);

        let path = registry
            .register("myapp", &snapshot(&[("COMPOSE_PROJECT_DIR", "/srv/myapp"), ("FOO", "bar")]))
            .unwrap();

        assert_eq!(path, registry.entry_path("myapp"));
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "COMPOSE_PROJECT_DIR=/srv/myapp\nFOO=bar\n");
    }

    #[test]
    fn test_register_then_list_contains_name_once() {
        let tmp = TempDir::new().unwrap();
        let registry = Registry::new(tmp.path(), OverwritePolicy::Replace);

        registry.register("alpha", &snapshot(&[("A", "1")])).unwrap();
        registry.register("beta", &snapshot(&[("B", "1")])).unwrap();
        registry.register("myapp", &snapshot(&[("C", "1")])).unwrap();

        let names = registry.list().unwrap();
        assert_eq!(names.iter().filter(|n| *n == "myapp").count(), 1);
        assert_eq!(names.len(), 3);
    }

    #[test]
    fn test_reregister_replaces_contents() {
        let tmp = TempDir::new().unwrap();
        let registry = Registry::new(tmp.path(), OverwritePolicy::Replace);

        registry
            .register("app", &snapshot(&[("OLD", "1"), ("SHARED", "x")]))
            .unwrap();
        let path = registry.register("app", &snapshot(&[("SHARED", "y")])).unwrap();

        let content = fs::read_to_string(path).unwrap();
        assert_eq!(content, "SHARED=y\n");
        assert_eq!(registry.list().unwrap(), vec!["app".to_string()]);
    }

    #[test]
    fn test_list_missing_directory_is_empty() {
        let tmp = TempDir::new().unwrap();
        let registry = Registry::new(tmp.path().join("nope"), OverwritePolicy::Replace);

        assert!(registry.list().unwrap().is_empty());
    }

    #[test]
    fn test_list_ignores_other_files() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("web.env"), "A=1\n").unwrap();
        fs::write(tmp.path().join("notes.txt"), "hello").unwrap();
        fs::write(tmp.path().join("web.env.20250101_000000.bak"), "A=0\n").unwrap();

        let registry = Registry::new(tmp.path(), OverwritePolicy::Replace);

        assert_eq!(registry.list().unwrap(), vec!["web".to_string()]);
    }

    #[test]
    fn test_backup_policy_keeps_previous_entry() {
        let tmp = TempDir::new().unwrap();
        let registry = Registry::new(tmp.path(), OverwritePolicy::Backup);

        registry.register("app", &snapshot(&[("V", "1")])).unwrap();
        registry.register("app", &snapshot(&[("V", "2")])).unwrap();

        let backups: Vec<_> = fs::read_dir(tmp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".bak"))
            .collect();
        assert_eq!(backups.len(), 1);
        assert_eq!(fs::read_to_string(backups[0].path()).unwrap(), "V=1\n");
        assert_eq!(
            fs::read_to_string(registry.entry_path("app")).unwrap(),
            "V=2\n"
        );
        assert_eq!(registry.list().unwrap(), vec!["app".to_string()]);
    }
}
