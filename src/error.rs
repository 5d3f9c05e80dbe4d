//! Error types for podman-compose-systemd
//!
//! Hard failures are carried through `anyhow`; the variants here are the ones
//! callers need to tell apart.

use std::path::PathBuf;

use thiserror::Error;

use crate::systemd::commands::Action;

#[derive(Debug, Error)]
pub enum ComposeSystemdError {
    /// Neither recognized compose file exists in the project directory
    #[error("No docker-compose.yml or docker-compose.yaml file found in {}", dir.display())]
    MissingComposeFile { dir: PathBuf },

    #[error("Invalid action '{0}'. Must be one of {expected}", expected = Action::expected())]
    InvalidAction(String),

    /// The project directory has no usable base name
    #[error("Cannot derive a project name from {}", dir.display())]
    InvalidProjectDir { dir: PathBuf },
}
