//! `KEY=VALUE` environment files
//!
//! Parses the project's `.env` override file and serializes snapshots into
//! the registry format read by systemd's `EnvironmentFile=`.

use std::{fmt, fs, path::Path, path::PathBuf};

use anyhow::{Context, Result};

/// Ordered mapping of environment variables.
///
/// Re-inserting an existing key replaces its value in place, so the first
/// occurrence decides the position and the last one decides the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    entries: Vec<(String, String)>,
}

impl EnvSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();

        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Registry format: one `KEY=VALUE` line per entry
impl fmt::Display for EnvSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.entries {
            writeln!(f, "{}={}", key, value)?;
        }
        Ok(())
    }
}

/// A line of an override file that could not be used
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidEnvLine {
    pub path: PathBuf,
    /// 1-based
    pub line_number: usize,
    pub line: String,
}

impl fmt::Display for InvalidEnvLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid line in {}:{}: {}",
            self.path.display(),
            self.line_number,
            self.line
        )
    }
}

/// Result of parsing an env file: usable pairs in file order plus rejects
#[derive(Debug, Default)]
pub struct ParsedEnv {
    pub pairs: Vec<(String, String)>,
    pub invalid: Vec<InvalidEnvLine>,
}

enum Line<'a> {
    Skip,
    Pair(&'a str, &'a str),
    Invalid,
}

/// Comments and blank lines are skipped; a line without `=`, or with an empty
/// key or value, is invalid.
fn parse_line(line: &str) -> Line<'_> {
    if line.starts_with('#') {
        return Line::Skip;
    }

    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Line::Skip;
    }

    match trimmed.split_once('=') {
        Some((key, value)) if !key.is_empty() && !value.is_empty() => Line::Pair(key, value),
        _ => Line::Invalid,
    }
}

/// Parse env file content. `path` is only used to label rejected lines.
pub fn parse_env_content(path: &Path, content: &str) -> ParsedEnv {
    let mut parsed = ParsedEnv::default();

    for (idx, line) in content.lines().enumerate() {
        match parse_line(line) {
            Line::Pair(key, value) => parsed.pairs.push((key.to_string(), value.to_string())),
            Line::Skip => {}
            Line::Invalid => parsed.invalid.push(InvalidEnvLine {
                path: path.to_path_buf(),
                line_number: idx + 1,
                line: line.to_string(),
            }),
        }
    }

    parsed
}

/// Read and parse an env file
pub fn parse_env_file(path: &Path) -> Result<ParsedEnv> {
    let content =
        fs::read_to_string(path).context(format!("Failed to read env file: {:?}", path))?;

    Ok(parse_env_content(path, &content))
}
