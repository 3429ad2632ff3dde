//! Project root discovery + optional `devcli.yaml` settings.
//!
//! Root precedence: --root flag > DEVCLI_ROOT env > nearest ancestor with
//! Cargo.toml > current directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::log_debug;

pub const ROOT_ENV: &str = "DEVCLI_ROOT";
pub const SETTINGS_FILE: &str = "devcli.yaml";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub project_name: String,
    /// Invocation name the completion function is registered for.
    pub program: String,
    pub completion: CompletionSettings,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CompletionSettings {
    /// Artifact path, relative to the project root.
    pub artifact: PathBuf,
    /// Glob patterns (relative to the root) of files defining the command tree.
    pub sources: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            project_name: env!("CARGO_PKG_NAME").to_string(),
            program: "devcli".to_string(),
            completion: CompletionSettings::default(),
        }
    }
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            artifact: PathBuf::from("autogen/completion.sh"),
            sources: vec!["src/main.rs".to_string(), "src/cmd/**/*.rs".to_string()],
        }
    }
}

impl Settings {
    /// Load `<root>/devcli.yaml`, falling back to defaults when absent.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(SETTINGS_FILE);
        if !path.exists() {
            log_debug!("no {SETTINGS_FILE} under {}; using defaults", root.display());
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_yaml(&raw).with_context(|| format!("Invalid settings in {}", path.display()))
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }
}

/// Determine the project root (see module docs for precedence).
pub fn resolve_root(flag: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(root) = flag {
        return Ok(root);
    }
    if let Ok(env_root) = std::env::var(ROOT_ENV)
        && !env_root.trim().is_empty()
    {
        return Ok(PathBuf::from(env_root));
    }
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    Ok(find_manifest_root(&cwd).unwrap_or(cwd))
}

/// Nearest ancestor (including `start`) containing a Cargo.toml.
pub fn find_manifest_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join("Cargo.toml").is_file())
        .map(Path::to_path_buf)
}
