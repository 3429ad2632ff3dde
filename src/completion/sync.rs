/*!
sync.rs - keeps the generated completion artifact in step with its sources.

Staleness: the artifact is stale when it does not exist, or when any source
file has a modification time strictly newer than the artifact's. Sources
that do not exist are ignored.

Regeneration writes to a temporary file in the artifact's directory and
renames it into place, so an interrupted run never leaves a truncated
artifact behind.
*/

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};

use crate::{log_debug, log_info, log_trace};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Staleness {
    /// Artifact does not exist yet.
    Missing,
    /// This source is newer than the artifact.
    Stale(PathBuf),
    Fresh,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    UpToDate,
    Regenerated {
        path: PathBuf,
        bytes: usize,
        was_missing: bool,
    },
}

#[derive(Debug, Clone)]
pub struct SyncController {
    artifact: PathBuf,
    sources: Vec<PathBuf>,
}

impl SyncController {
    pub fn new(artifact: impl Into<PathBuf>, sources: Vec<PathBuf>) -> Self {
        Self {
            artifact: artifact.into(),
            sources,
        }
    }

    /// Resolve `patterns` (globs relative to `root`) into the source list.
    pub fn from_patterns(root: &Path, artifact: &Path, patterns: &[String]) -> Result<Self> {
        let mut sources = Vec::new();
        for pattern in patterns {
            let full = root.join(pattern);
            let full = full.to_string_lossy();
            let entries =
                glob::glob(&full).with_context(|| format!("Invalid source pattern '{pattern}'"))?;
            for entry in entries {
                let path = entry.with_context(|| format!("Failed to read source for '{pattern}'"))?;
                sources.push(path);
            }
        }
        sources.sort();
        sources.dedup();
        log_debug!("completion sources: {} file(s)", sources.len());

        Ok(Self::new(root.join(artifact), sources))
    }

    pub fn artifact(&self) -> &Path {
        &self.artifact
    }

    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    pub fn staleness(&self) -> Result<Staleness> {
        if !self.artifact.exists() {
            return Ok(Staleness::Missing);
        }
        let artifact_mtime = mtime(&self.artifact)?;

        for src in self.sources.iter().filter(|p| p.exists()) {
            let src_mtime = mtime(src)?;
            log_trace!("source {} mtime {:?}", src.display(), src_mtime);
            if src_mtime > artifact_mtime {
                return Ok(Staleness::Stale(src.clone()));
            }
        }
        Ok(Staleness::Fresh)
    }

    /// Regenerate via `generate` if stale; otherwise do nothing.
    pub fn sync<F>(&self, generate: F) -> Result<SyncOutcome>
    where
        F: FnOnce() -> Result<String>,
    {
        let staleness = self.staleness()?;
        let was_missing = match &staleness {
            Staleness::Fresh => return Ok(SyncOutcome::UpToDate),
            Staleness::Missing => true,
            Staleness::Stale(src) => {
                log_debug!("{} is newer than the artifact", src.display());
                false
            }
        };

        log_info!("regenerating {}", self.artifact.display());
        let script = generate().context("Failed to generate completion script")?;
        self.write_atomic(&script)?;

        Ok(SyncOutcome::Regenerated {
            path: self.artifact.clone(),
            bytes: script.len(),
            was_missing,
        })
    }

    fn write_atomic(&self, content: &str) -> Result<()> {
        let dir = match self.artifact.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)
            .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
        tmp.write_all(content.as_bytes())
            .context("Failed to write completion script")?;
        tmp.as_file()
            .sync_all()
            .context("Failed to flush completion script")?;
        tmp.persist(&self.artifact)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to replace {}", self.artifact.display()))?;
        Ok(())
    }
}

fn mtime(path: &Path) -> Result<SystemTime> {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .with_context(|| format!("Failed to read modification time of {}", path.display()))
}
