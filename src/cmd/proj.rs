/*!
`proj.rs`

Implements `devcli proj <info|size|stats>`.

  info  : project root + git branch / commit count / dirty state
  size  : total bytes under the root (ignored directories skipped)
  stats : file / directory counts, line totals for text files, top extensions

`size` and `stats` share one walk filter: hidden entries and build/output
directories (`target`, `node_modules`, `dist`) are never descended into.
*/

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use clap::{Args, Subcommand};
use walkdir::{DirEntry, WalkDir};

use super::AppContext;
use super::shared::capture_tool;
use super::style::{Role, StyleOptions, color, human_bytes, table};
use crate::completion::{Completer, CompletionProvider, filter_prefix};
use crate::log_debug;

#[derive(Args, Debug)]
pub struct ProjArgs {
    #[command(subcommand)]
    pub command: ProjCommands,
}

#[derive(Subcommand, Debug)]
pub enum ProjCommands {
    /// Show project information
    Info,
    /// Show repository size
    Size,
    /// Show detailed statistics
    Stats,
}

pub fn execute_proj(args: ProjArgs, ctx: &AppContext) -> Result<()> {
    match args.command {
        ProjCommands::Info => execute_info(ctx),
        ProjCommands::Size => {
            let bytes = total_size(&ctx.root);
            println!("Repository size: {}", human_bytes(bytes));
            Ok(())
        }
        ProjCommands::Stats => execute_stats(&ctx.root),
    }
}

fn execute_info(ctx: &AppContext) -> Result<()> {
    let style = StyleOptions::detect();
    println!("Project: {}", color(Role::Primary, &ctx.settings.project_name, &style));
    println!("Project root: {}", ctx.root.display());

    match git_summary(&ctx.root) {
        Some(git) => {
            println!("Git branch: {}", git.branch);
            println!("Total commits: {}", git.commits);
            println!(
                "Uncommitted changes: {}",
                if git.dirty { "Yes" } else { "No" }
            );
        }
        None => eprintln!("Not a git repository or git not available"),
    }
    Ok(())
}

struct GitSummary {
    branch: String,
    commits: String,
    dirty: bool,
}

fn git_summary(root: &Path) -> Option<GitSummary> {
    let git = |args: &[&str]| -> Option<String> {
        match capture_tool(root, "git", args) {
            Ok(out) if out.success() => Some(out.stdout.trim().to_string()),
            Ok(out) => {
                log_debug!("git {:?} exited with {}: {}", args, out.code, out.stderr.trim());
                None
            }
            Err(e) => {
                log_debug!("git unavailable: {e:#}");
                None
            }
        }
    };
    Some(GitSummary {
        branch: git(&["rev-parse", "--abbrev-ref", "HEAD"])?,
        commits: git(&["rev-list", "--count", "HEAD"])?,
        dirty: !git(&["status", "--porcelain"])?.is_empty(),
    })
}

/* -------------------------------------------------------------------------- */
/* Walking                                                                     */
/* -------------------------------------------------------------------------- */

const IGNORED_DIRS: &[&str] = &["target", "node_modules", "dist"];

fn is_ignored(entry: &DirEntry) -> bool {
    if entry.depth() == 0 {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || (entry.file_type().is_dir() && IGNORED_DIRS.contains(&name.as_ref()))
}

fn walk(root: &Path) -> impl Iterator<Item = DirEntry> {
    WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| !is_ignored(e))
        .filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(err) => {
                log_debug!("skipping unreadable entry: {err}");
                None
            }
        })
}

/// Sum of file sizes under `root`.
pub fn total_size(root: &Path) -> u64 {
    walk(root)
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}

const TEXT_EXTENSIONS: &[&str] = &[
    "rs", "toml", "md", "txt", "yaml", "yml", "json", "sh", "py", "js", "ts", "html", "css",
];

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ProjectStats {
    pub files: usize,
    pub dirs: usize,
    pub lines: usize,
    /// `(extension, count)`, most frequent first; ties by extension name.
    pub extensions: Vec<(String, usize)>,
}

pub fn collect_stats(root: &Path) -> ProjectStats {
    let mut stats = ProjectStats::default();
    let mut by_ext: HashMap<String, usize> = HashMap::new();

    for entry in walk(root).filter(|e| e.depth() > 0) {
        if entry.file_type().is_dir() {
            stats.dirs += 1;
            continue;
        }
        if !entry.file_type().is_file() {
            continue;
        }
        stats.files += 1;

        let ext = entry
            .path()
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_else(|| "(none)".to_string());
        if TEXT_EXTENSIONS.contains(&ext.as_str())
            && let Ok(content) = std::fs::read_to_string(entry.path())
        {
            stats.lines += content.lines().count();
        }
        *by_ext.entry(ext).or_default() += 1;
    }

    let mut extensions: Vec<(String, usize)> = by_ext.into_iter().collect();
    extensions.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    extensions.truncate(10);
    stats.extensions = extensions;
    stats
}

fn execute_stats(root: &Path) -> Result<()> {
    let style = StyleOptions::detect();
    let stats = collect_stats(root);

    println!("Project Statistics");
    println!("  Total files: {}", stats.files);
    println!("  Total directories: {}", stats.dirs);
    println!("  Lines in text files: {}", stats.lines);
    println!();

    let rows: Vec<Vec<String>> = stats
        .extensions
        .iter()
        .map(|(ext, n)| vec![ext.clone(), n.to_string()])
        .collect();
    println!("{}", table(&["EXTENSION", "FILES"], &rows, &style));
    Ok(())
}

/* -------------------------------------------------------------------------- */
/* Dynamic completers                                                          */
/* -------------------------------------------------------------------------- */

pub struct ProjCompletions;

impl CompletionProvider for ProjCompletions {
    fn group(&self) -> &str {
        "proj"
    }

    fn completers(&self) -> Result<Vec<(&'static str, Completer)>> {
        Ok(vec![
            ("", complete_proj as Completer),
            ("info", no_arguments),
            ("size", no_arguments),
            ("stats", no_arguments),
        ])
    }
}

fn complete_proj(args: &[String], incomplete: &str) -> Vec<String> {
    if args.is_empty() || args[0] == "proj" {
        return filter_prefix(["info", "size", "stats"], incomplete);
    }
    Vec::new()
}

fn no_arguments(_args: &[String], _incomplete: &str) -> Vec<String> {
    Vec::new()
}
