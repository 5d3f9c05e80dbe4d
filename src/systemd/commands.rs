//! Action dispatch
//!
//! Runs one of `register`, `list`/`ls` or `create-unit` against the
//! configured registry and unit path, and prints operator guidance.

use std::{env, fmt, path::Path, str::FromStr};

use anyhow::Result;
use colored::Colorize;

use super::unit::{UnitOutcome, UnitTemplate, write_unit};
use crate::{
    config::Settings,
    error::ComposeSystemdError,
    project::{compose::ComposeProject, registry::Registry},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Register,
    List,
    CreateUnit,
}

impl Action {
    /// Accepted action strings, `ls` being an alias of `list`
    pub const NAMES: [&'static str; 4] = ["register", "list", "ls", "create-unit"];

    pub fn expected() -> String {
        Self::NAMES
            .iter()
            .map(|n| format!("'{}'", n))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromStr for Action {
    type Err = ComposeSystemdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "register" => Ok(Action::Register),
            "list" | "ls" => Ok(Action::List),
            "create-unit" => Ok(Action::CreateUnit),
            other => Err(ComposeSystemdError::InvalidAction(other.to_string())),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Register => "register",
            Action::List => "list",
            Action::CreateUnit => "create-unit",
        };
        f.write_str(name)
    }
}

/// How an action finished, when it did not fail outright
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Success,
    /// The unit was printed because its target was not writable
    NeedsPrivilege,
}

/// Runs actions with injected settings
pub struct Dispatcher {
    settings: Settings,
}

impl Dispatcher {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn registry(&self) -> Registry {
        Registry::new(&self.settings.registry_dir, self.settings.overwrite)
    }

    /// Run one action
    pub fn run(&self, action: Action, working_dir: &Path) -> Result<Completion> {
        tracing::debug!("dispatching {}", action);

        match action {
            Action::Register => {
                let project = self.register(working_dir)?;
                print!("{}", register_guidance(&project.name, &current_user()));
                Ok(Completion::Success)
            }
            Action::List => {
                for name in self.list()? {
                    println!("{}", name);
                }
                Ok(Completion::Success)
            }
            Action::CreateUnit => self.create_unit(),
        }
    }

    /// Snapshot the project in `working_dir` and store it in the registry
    pub fn register(&self, working_dir: &Path) -> Result<ComposeProject> {
        let project = ComposeProject::from_dir(working_dir)?;

        println!(
            "{} Project: {}",
            "ℹ".blue(),
            project.name.bright_white()
        );
        println!("{} Directory: {}", "ℹ".blue(), project.dir.display());
        println!(
            "{} Compose file: {}",
            "ℹ".blue(),
            project.compose_file.display()
        );
        if let Some(env_file) = &project.env_file {
            if !project.invalid_lines.is_empty() {
                println!(
                    "{} Skipped {} invalid line(s) in {}",
                    "⚠".yellow(),
                    project.invalid_lines.len(),
                    env_file.display()
                );
            }
        }

        let path = self.registry().register(&project.name, &project.env)?;

        println!(
            "{} Registered {} in {}",
            "✓".green(),
            project.name.bright_white(),
            path.display()
        );

        Ok(project)
    }

    /// Registered project names, sorted
    pub fn list(&self) -> Result<Vec<String>> {
        let mut names = self.registry().list()?;
        names.sort();
        Ok(names)
    }

    /// Generate the unit and write it, printing it if the target is not writable
    pub fn create_unit(&self) -> Result<Completion> {
        let path = &self.settings.unit_path;
        let unit = UnitTemplate::from_settings(&self.settings).generate();

        println!(
            "{} Creating the default base systemd unit file at {}",
            "ℹ".blue(),
            path.display()
        );
        println!(
            "{} This requires sudo or root access to write to {}",
            "ℹ".blue(),
            path.display()
        );
        if !self.settings.unit_reads_registry() {
            let env_file = format!("%h/{}/%i.env", self.settings.stacks_dir);
            println!(
                "{} Registry {} is outside your home directory; the unit reads {}",
                "⚠".yellow(),
                self.settings.registry_dir.display(),
                env_file.bright_white()
            );
        }

        match write_unit(path, &unit)? {
            UnitOutcome::Written(path) => {
                println!("{} Wrote {}", "✓".green(), path.display());
                println!();
                println!(
                    "While in your project directory run {}.",
                    "podman-compose-systemd register".bright_white()
                );
                println!("If your .env file changes, you need to re-register the project.");
                Ok(Completion::Success)
            }
            UnitOutcome::PrintedFallback(path) => {
                println!("{}", unit);
                println!(
                    "{} Could not write to [{}], use 'sudo'",
                    "ERROR:".red(),
                    path.display()
                );
                Ok(Completion::NeedsPrivilege)
            }
        }
    }
}

/// Login name for the linger hint
fn current_user() -> String {
    env::var("USER")
        .or_else(|_| env::var("LOGNAME"))
        .unwrap_or_else(|_| "$USER".to_string())
}

/// Guidance printed after a successful registration
pub fn register_guidance(name: &str, user: &str) -> String {
    format!(
        "
you can use systemd commands like enable, start, stop, status, cat
all without `sudo` like this:

\t\tsystemctl --user enable --now 'podman-compose@{name}'
\t\tsystemctl --user status 'podman-compose@{name}'
\t\tjournalctl --user -xeu 'podman-compose@{name}'

and for that to work outside a session
you might need to run the following command *once*

\t\tsudo loginctl enable-linger '{user}'

you can use podman commands like:

\t\tpodman pod ps
\t\tpodman pod stats 'pod_{name}'
\t\tpodman pod logs --tail=10 -f 'pod_{name}'
"
    )
}
