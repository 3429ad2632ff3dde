//! `devcli build <all|clean|component>`: placeholders that echo their options.

use anyhow::Result;
use clap::{Args, Subcommand};

use super::choices::{Arch, Platform};
use super::shared::{enabled, placeholder};
use crate::completion::{Completer, CompletionProvider, filter_prefix};

#[derive(Args, Debug)]
pub struct BuildArgs {
    #[command(subcommand)]
    pub command: BuildCommands,
}

#[derive(Subcommand, Debug)]
pub enum BuildCommands {
    /// Build all targets
    All {
        /// Target platform
        #[arg(long, value_enum)]
        target: Option<Platform>,
        /// Target architecture
        #[arg(long, value_enum)]
        arch: Option<Arch>,
        /// Force rebuild even if up-to-date
        #[arg(long)]
        force: bool,
        /// Only copy files, don't compile
        #[arg(long)]
        copy_only: bool,
        /// Build with debug symbols
        #[arg(long)]
        debug: bool,
        /// Build optimized release version
        #[arg(long)]
        release: bool,
    },
    /// Clean build artifacts
    Clean {
        /// Force clean even if already clean
        #[arg(long)]
        force: bool,
        /// Also clean cache directories
        #[arg(long)]
        cache: bool,
        /// Also clean dependencies
        #[arg(long)]
        deps: bool,
    },
    /// Build a specific component
    Component {
        component: Option<String>,
        #[arg(long, value_enum)]
        target: Option<Platform>,
        #[arg(long, value_enum)]
        arch: Option<Arch>,
        #[arg(long)]
        force: bool,
        #[arg(long)]
        copy_only: bool,
    },
}

pub fn execute_build(args: BuildArgs) -> Result<()> {
    match args.command {
        BuildCommands::All {
            target,
            arch,
            force,
            copy_only,
            debug,
            release,
        } => placeholder(
            "Build all",
            &[
                ("Target platform", target.map(|t| t.to_string())),
                ("Architecture", arch.map(|a| a.to_string())),
                ("Force rebuild", enabled(force)),
                ("Copy-only mode", enabled(copy_only)),
                ("Debug build", enabled(debug)),
                ("Release build", enabled(release)),
            ],
            "future build functionality",
        ),
        BuildCommands::Clean { force, cache, deps } => placeholder(
            "Clean",
            &[
                ("Force clean", enabled(force)),
                ("Clean cache", enabled(cache)),
                ("Clean dependencies", enabled(deps)),
            ],
            "cleaning build artifacts",
        ),
        BuildCommands::Component {
            component,
            target,
            arch,
            force,
            copy_only,
        } => {
            let title = match &component {
                Some(c) => format!("Build component '{c}'"),
                None => "Build component (none specified)".to_string(),
            };
            placeholder(
                &title,
                &[
                    ("Target", target.map(|t| t.to_string())),
                    ("Architecture", arch.map(|a| a.to_string())),
                    ("Force rebuild", enabled(force)),
                    ("Copy-only mode", enabled(copy_only)),
                ],
                "component build functionality",
            )
        }
    }
    Ok(())
}

/* ---- completers ---- */

const COMPONENTS: &[&str] = &["frontend", "backend", "docs", "tests", "assets"];

pub struct BuildCompletions;

impl CompletionProvider for BuildCompletions {
    fn group(&self) -> &str {
        "build"
    }

    fn completers(&self) -> Result<Vec<(&'static str, Completer)>> {
        Ok(vec![
            ("", complete_build as Completer),
            ("all", complete_all),
            ("clean", complete_clean),
            ("component", complete_component),
        ])
    }
}

fn complete_build(args: &[String], incomplete: &str) -> Vec<String> {
    match args.first().map(String::as_str) {
        None | Some("build") => filter_prefix(["all", "clean", "component"], incomplete),
        Some("all") => complete_all(&args[1..], incomplete),
        Some("clean") => complete_clean(&args[1..], incomplete),
        Some("component") => complete_component(&args[1..], incomplete),
        Some(_) => Vec::new(),
    }
}

fn complete_all(_args: &[String], incomplete: &str) -> Vec<String> {
    if !incomplete.starts_with('-') {
        return Vec::new();
    }
    filter_prefix(
        ["--target", "--arch", "--force", "--copy-only", "--debug", "--release"],
        incomplete,
    )
}

fn complete_clean(_args: &[String], incomplete: &str) -> Vec<String> {
    if !incomplete.starts_with('-') {
        return Vec::new();
    }
    filter_prefix(["--force", "--cache", "--deps"], incomplete)
}

/// Component names until one is given, then options.
fn complete_component(args: &[String], incomplete: &str) -> Vec<String> {
    if args.is_empty() && !incomplete.starts_with('-') {
        return filter_prefix(COMPONENTS.iter().copied(), incomplete);
    }
    if incomplete.starts_with('-') {
        return filter_prefix(
            ["--target", "--arch", "--force", "--copy-only"],
            incomplete,
        );
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(subcommand)]
        cmd: TestSub,
    }

    #[derive(clap::Subcommand, Debug)]
    enum TestSub {
        Build(BuildArgs),
    }

    #[test]
    fn clap_parses_choices() {
        let cli = TestCli::try_parse_from([
            "t", "build", "all", "--target", "darwin", "--arch", "x86_64", "--debug",
        ])
        .unwrap();
        let TestSub::Build(b) = cli.cmd;
        match b.command {
            BuildCommands::All {
                target, arch, debug, ..
            } => {
                assert_eq!(target, Some(Platform::Darwin));
                assert_eq!(arch, Some(Arch::X86_64));
                assert!(debug);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn clap_rejects_unknown_platform() {
        assert!(TestCli::try_parse_from(["t", "build", "all", "--target", "beos"]).is_err());
    }

    #[test]
    fn component_names_then_options() {
        assert_eq!(complete_component(&[], "d"), vec!["docs"]);
        let typed = vec!["docs".to_string()];
        assert!(complete_component(&typed, "").is_empty());
        assert_eq!(complete_component(&typed, "--c"), vec!["--copy-only"]);
    }

    #[test]
    fn group_completer_delegates() {
        assert_eq!(complete_build(&[], "c"), vec!["clean", "component"]);
        let args = vec!["component".to_string()];
        assert_eq!(complete_build(&args, "fr"), vec!["frontend"]);
        let args = vec!["clean".to_string()];
        assert_eq!(complete_build(&args, "--d"), vec!["--deps"]);
    }
}
