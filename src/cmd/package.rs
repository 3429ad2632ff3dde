//! `devcli package <create|list|clean>`: packaging placeholders.

use std::path::PathBuf;

use anyhow::Result;
use clap::builder::ValueHint;
use clap::{Args, Subcommand};

use super::choices::{OutputFormat, PackageFormat};
use super::shared::{enabled, placeholder};
use crate::completion::{Completer, CompletionProvider, filter_prefix};

#[derive(Args, Debug)]
pub struct PackageArgs {
    #[command(subcommand)]
    pub command: PackageCommands,
}

#[derive(Subcommand, Debug)]
pub enum PackageCommands {
    /// Create distribution packages
    Create {
        /// Package format
        #[arg(long, value_enum)]
        format: Option<PackageFormat>,
        /// Output directory for packages
        #[arg(short, long, value_hint = ValueHint::DirPath)]
        output: Option<PathBuf>,
        /// Package name (defaults to project name)
        #[arg(long)]
        name: Option<String>,
        /// Package version
        #[arg(long)]
        pkg_version: Option<String>,
        /// Sign the package
        #[arg(long)]
        sign: bool,
        /// Show what would be packaged
        #[arg(long)]
        dry_run: bool,
    },
    /// List packages
    List {
        /// List local packages only
        #[arg(long)]
        local: bool,
        /// List remote packages only
        #[arg(long)]
        remote: bool,
        /// Show only outdated packages
        #[arg(long)]
        outdated: bool,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Clean package artifacts
    Clean {
        /// Clean all package artifacts
        #[arg(long)]
        all: bool,
        /// Clean dist directory
        #[arg(long)]
        dist: bool,
        /// Clean package cache
        #[arg(long)]
        cache: bool,
        /// Force clean without confirmation
        #[arg(long)]
        force: bool,
    },
}

pub fn execute_package(args: PackageArgs, project_name: &str) -> Result<()> {
    match args.command {
        PackageCommands::Create {
            format,
            output,
            name,
            pkg_version,
            sign,
            dry_run,
        } => placeholder(
            "Package create",
            &[
                ("Format", format.map(|f| f.to_string())),
                ("Output", output.map(|o| o.display().to_string())),
                ("Name", Some(name.unwrap_or_else(|| project_name.to_string()))),
                ("Version", pkg_version),
                ("Sign", enabled(sign)),
                ("Dry run", enabled(dry_run)),
            ],
            "package creation",
        ),
        PackageCommands::List {
            local,
            remote,
            outdated,
            format,
        } => placeholder(
            "Package list",
            &[
                ("Local only", enabled(local)),
                ("Remote only", enabled(remote)),
                ("Outdated only", enabled(outdated)),
                ("Format", Some(format.to_string())),
            ],
            "package listing",
        ),
        PackageCommands::Clean {
            all,
            dist,
            cache,
            force,
        } => placeholder(
            "Package clean",
            &[
                ("All artifacts", enabled(all)),
                ("Dist directory", enabled(dist)),
                ("Package cache", enabled(cache)),
                ("Force", enabled(force)),
            ],
            "cleaning package artifacts",
        ),
    }
    Ok(())
}

/* ---- completers ---- */

pub struct PackageCompletions;

impl CompletionProvider for PackageCompletions {
    fn group(&self) -> &str {
        "package"
    }

    fn completers(&self) -> Result<Vec<(&'static str, Completer)>> {
        Ok(vec![
            ("", complete_package as Completer),
            ("create", complete_create),
            ("list", complete_list),
            ("clean", complete_clean),
        ])
    }
}

fn complete_package(args: &[String], incomplete: &str) -> Vec<String> {
    match args.first().map(String::as_str) {
        None | Some("package") => filter_prefix(["create", "list", "clean"], incomplete),
        Some("create") => complete_create(&args[1..], incomplete),
        Some("list") => complete_list(&args[1..], incomplete),
        Some("clean") => complete_clean(&args[1..], incomplete),
        Some(_) => Vec::new(),
    }
}

fn complete_create(args: &[String], incomplete: &str) -> Vec<String> {
    if incomplete.starts_with('-') {
        return filter_prefix(
            ["--format", "--output", "--name", "--pkg-version", "--sign", "--dry-run"],
            incomplete,
        );
    }
    if args.last().map(String::as_str) == Some("--format") {
        return filter_prefix(["crate", "tarball", "zip", "all"], incomplete);
    }
    Vec::new()
}

fn complete_list(args: &[String], incomplete: &str) -> Vec<String> {
    if incomplete.starts_with('-') {
        return filter_prefix(["--local", "--remote", "--outdated", "--format"], incomplete);
    }
    if args.last().map(String::as_str) == Some("--format") {
        return filter_prefix(["table", "json", "yaml"], incomplete);
    }
    Vec::new()
}

fn complete_clean(_args: &[String], incomplete: &str) -> Vec<String> {
    if !incomplete.starts_with('-') {
        return Vec::new();
    }
    filter_prefix(["--all", "--dist", "--cache", "--force"], incomplete)
}
