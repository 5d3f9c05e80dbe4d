//! Systemd unit template
//!
//! Renders the `podman-compose@.service` template unit. `%h` and `%i` are
//! left for systemd to expand when an instance is activated.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

use crate::config::Settings;

/// Inputs of the generated unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitTemplate {
    /// Command run by every Exec line
    pub command: String,
    /// Registry directory relative to the user's home
    pub stacks_dir: String,
    /// Where the unit is installed, echoed in the header comment
    pub unit_path: PathBuf,
}

/// What happened to a generated unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOutcome {
    Written(PathBuf),
    /// The target could not be written; the caller should print the unit
    PrintedFallback(PathBuf),
}

impl UnitTemplate {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            command: settings.command.clone(),
            stacks_dir: settings.stacks_dir.clone(),
            unit_path: settings.unit_path.clone(),
        }
    }

    /// Render the unit file
    pub fn generate(&self) -> String {
        let script = &self.command;
        format!(
            "# {unit_path}

[Unit]
Description=%i rootless pod manual (podman-compose)

[Service]
Type=simple
EnvironmentFile=%h/{stacks_dir}/%i.env
ExecStartPre=-{script} up --no-start
ExecStartPre={script} up -d
ExecStart={script} wait
ExecStop={script} stop


[Install]
WantedBy=default.target
",
            unit_path = self.unit_path.display(),
            stacks_dir = self.stacks_dir,
        )
    }
}

fn is_permission_error(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::PermissionDenied | ErrorKind::ReadOnlyFilesystem
    )
}

/// Write `content` to `path`, or report that it must be printed instead.
///
/// Writability is not probed up front: a missing parent directory yields
/// `PrintedFallback` without writing, otherwise the write is attempted and a
/// permission failure yields `PrintedFallback`. Other I/O errors are returned.
pub fn write_unit(path: &Path, content: &str) -> Result<UnitOutcome> {
    let parent_exists = path.parent().map(|p| p.is_dir()).unwrap_or(false);
    if !parent_exists {
        return Ok(UnitOutcome::PrintedFallback(path.to_path_buf()));
    }

    tracing::debug!("writing [{}]: ...", path.display());
    match fs::write(path, content) {
        Ok(()) => {
            tracing::debug!("writing [{}]: done.", path.display());
            Ok(UnitOutcome::Written(path.to_path_buf()))
        }
        Err(e) if is_permission_error(e.kind()) => {
            tracing::warn!("Could not write to [{}]: {}", path.display(), e);
            Ok(UnitOutcome::PrintedFallback(path.to_path_buf()))
        }
        Err(e) => Err(e).context(format!("Failed to write unit file: {:?}", path)),
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::config::{DEFAULT_COMMAND, DEFAULT_STACKS_DIR, DEFAULT_UNIT_PATH};

    fn default_template() -> UnitTemplate {
        UnitTemplate {
            command: DEFAULT_COMMAND.to_string(),
            stacks_dir: DEFAULT_STACKS_DIR.to_string(),
            unit_path: PathBuf::from(DEFAULT_UNIT_PATH),
        }
    }

    #[test]
    fn test_generate_default_unit() {
        let expected = "\
# /etc/systemd/user/podman-compose@.service

[Unit]
Description=%i rootless pod manual (podman-compose)

[Service]
Type=simple
EnvironmentFile=%h/.config/containers/compose/projects/%i.env
ExecStartPre=-%h/.local/bin/podman-compose up --no-start
ExecStartPre=%h/.local/bin/podman-compose up -d
ExecStart=%h/.local/bin/podman-compose wait
ExecStop=%h/.local/bin/podman-compose stop


[Install]
WantedBy=default.target
";
        assert_eq!(default_template().generate(), expected);
    }

    #[test]
    fn test_generate_is_deterministic() {
        let template = UnitTemplate {
            command: "/usr/local/bin/podman-compose".to_string(),
            ..default_template()
        };

        assert_eq!(template.generate(), template.generate());
        assert!(
            template
                .generate()
                .contains("ExecStart=/usr/local/bin/podman-compose wait")
        );
        assert!(template.generate().contains("%i.env"));
    }

    #[test]
    fn test_write_unit_to_writable_dir() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("podman-compose@.service");

        let outcome = write_unit(&path, "unit").unwrap();

        assert_eq!(outcome, UnitOutcome::Written(path.clone()));
        assert_eq!(fs::read_to_string(path).unwrap(), "unit");
    }

    #[test]
    fn test_write_unit_missing_dir_falls_back() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("no/such/dir/podman-compose@.service");

        let outcome = write_unit(&path, "unit").unwrap();

        assert_eq!(outcome, UnitOutcome::PrintedFallback(path.clone()));
        assert!(!path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_write_unit_read_only_dir_falls_back() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("units");
        fs::create_dir(&dir).unwrap();
        fs::set_permissions(&dir, fs::Permissions::from_mode(0o555)).unwrap();

        // root ignores directory permissions
        let canary = dir.join("canary");
        if fs::write(&canary, "").is_ok() {
            fs::remove_file(&canary).unwrap();
            fs::set_permissions(&dir, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let path = dir.join("podman-compose@.service");
        let outcome = write_unit(&path, "unit").unwrap();

        assert_eq!(outcome, UnitOutcome::PrintedFallback(path.clone()));
        assert!(!path.exists());

        fs::set_permissions(&dir, fs::Permissions::from_mode(0o755)).unwrap();
    }
}
