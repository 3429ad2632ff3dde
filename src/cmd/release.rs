//! `devcli release <create|publish|list>`: release placeholders.
//!
//! `create --branch` completes from local git branches when git is available.

use anyhow::Result;
use clap::{Args, Subcommand};

use super::choices::{Arch, OutputFormat, Platform, PublishTarget};
use super::shared::{capture_tool, enabled, placeholder};
use crate::completion::{Completer, CompletionProvider, filter_prefix};

#[derive(Args, Debug)]
pub struct ReleaseArgs {
    #[command(subcommand)]
    pub command: ReleaseCommands,
}

#[derive(Subcommand, Debug)]
pub enum ReleaseCommands {
    /// Create a new release
    Create {
        /// Version number (e.g. 1.0.0)
        version: Option<String>,
        /// Target platform (all when omitted)
        #[arg(long, value_enum)]
        target: Option<Platform>,
        /// Target architecture (all when omitted)
        #[arg(long, value_enum)]
        arch: Option<Arch>,
        /// Git tag to create for this release
        #[arg(long)]
        tag: Option<String>,
        /// Branch to release from
        #[arg(long)]
        branch: Option<String>,
        /// Create as draft release
        #[arg(long)]
        draft: bool,
        /// Mark as pre-release
        #[arg(long)]
        prerelease: bool,
        /// Release notes or changelog
        #[arg(long)]
        notes: Option<String>,
        /// Show what would be done without doing it
        #[arg(long)]
        dry_run: bool,
    },
    /// Publish a release
    Publish {
        /// Version to publish
        version: Option<String>,
        #[arg(long, value_enum, default_value_t = PublishTarget::All)]
        target: PublishTarget,
        /// Skip running tests before publish
        #[arg(long)]
        skip_tests: bool,
        /// Skip building before publish
        #[arg(long)]
        skip_build: bool,
        /// Force publish even if version exists
        #[arg(long)]
        force: bool,
        /// Show what would be published
        #[arg(long)]
        dry_run: bool,
    },
    /// List releases
    List {
        /// Git remote name
        #[arg(long, default_value = "origin")]
        remote: String,
        /// Maximum number of releases to show
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
}

pub fn execute_release(args: ReleaseArgs) -> Result<()> {
    match args.command {
        ReleaseCommands::Create {
            version,
            target,
            arch,
            tag,
            branch,
            draft,
            prerelease,
            notes,
            dry_run,
        } => placeholder(
            "Release create",
            &[
                ("Version", version),
                ("Target", Some(target.map_or("all".to_string(), |t| t.to_string()))),
                ("Architecture", Some(arch.map_or("all".to_string(), |a| a.to_string()))),
                ("Tag", tag),
                ("Branch", branch),
                ("Draft", enabled(draft)),
                ("Pre-release", enabled(prerelease)),
                ("Notes", notes),
                ("Dry run", enabled(dry_run)),
            ],
            "release creation",
        ),
        ReleaseCommands::Publish {
            version,
            target,
            skip_tests,
            skip_build,
            force,
            dry_run,
        } => placeholder(
            "Release publish",
            &[
                ("Version", version),
                ("Target", Some(target.to_string())),
                ("Skip tests", enabled(skip_tests)),
                ("Skip build", enabled(skip_build)),
                ("Force", enabled(force)),
                ("Dry run", enabled(dry_run)),
            ],
            "release publishing",
        ),
        ReleaseCommands::List {
            remote,
            limit,
            format,
        } => placeholder(
            "Release list",
            &[
                ("Remote", Some(remote)),
                ("Limit", limit.map(|l| l.to_string())),
                ("Format", Some(format.to_string())),
            ],
            "release listing",
        ),
    }
    Ok(())
}

/* ---- completers ---- */

pub struct ReleaseCompletions;

impl CompletionProvider for ReleaseCompletions {
    fn group(&self) -> &str {
        "release"
    }

    fn completers(&self) -> Result<Vec<(&'static str, Completer)>> {
        Ok(vec![
            ("", complete_release as Completer),
            ("create", complete_create),
            ("publish", complete_publish),
            ("list", complete_list),
        ])
    }
}

fn complete_release(args: &[String], incomplete: &str) -> Vec<String> {
    match args.first().map(String::as_str) {
        None | Some("release") => filter_prefix(["create", "publish", "list"], incomplete),
        Some("create") => complete_create(&args[1..], incomplete),
        Some("publish") => complete_publish(&args[1..], incomplete),
        Some("list") => complete_list(&args[1..], incomplete),
        Some(_) => Vec::new(),
    }
}

const FALLBACK_BRANCHES: &[&str] = &["main", "master", "develop"];

fn complete_create(args: &[String], incomplete: &str) -> Vec<String> {
    if incomplete.starts_with('-') {
        return filter_prefix(
            [
                "--target",
                "--arch",
                "--tag",
                "--branch",
                "--draft",
                "--prerelease",
                "--notes",
                "--dry-run",
            ],
            incomplete,
        );
    }
    match args.last().map(String::as_str) {
        Some("--branch") => {
            let branches = local_branches().unwrap_or_else(|| {
                FALLBACK_BRANCHES.iter().map(|b| b.to_string()).collect()
            });
            filter_prefix(branches.iter().map(String::as_str), incomplete)
        }
        // positional VERSION
        None => filter_prefix(["major", "minor", "patch", "1.0.0", "0.1.0"], incomplete),
        Some(_) => Vec::new(),
    }
}

fn local_branches() -> Option<Vec<String>> {
    let cwd = std::env::current_dir().ok()?;
    let out = capture_tool(&cwd, "git", &["branch", "--format=%(refname:short)"]).ok()?;
    if !out.success() {
        return None;
    }
    let branches: Vec<String> = out
        .stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();
    (!branches.is_empty()).then_some(branches)
}

fn complete_publish(_args: &[String], incomplete: &str) -> Vec<String> {
    if !incomplete.starts_with('-') {
        return Vec::new();
    }
    filter_prefix(
        ["--target", "--skip-tests", "--skip-build", "--force", "--dry-run"],
        incomplete,
    )
}

fn complete_list(args: &[String], incomplete: &str) -> Vec<String> {
    if incomplete.starts_with('-') {
        return filter_prefix(["--remote", "--limit", "--format"], incomplete);
    }
    match args.last().map(String::as_str) {
        Some("--limit") => filter_prefix(["5", "10", "20", "50", "100"], incomplete),
        Some("--format") => filter_prefix(["table", "json", "yaml"], incomplete),
        _ => Vec::new(),
    }
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
        Release(ReleaseArgs),
    }

    fn parse(args: &[&str]) -> ReleaseCommands {
        let cli = TestCli::try_parse_from(std::iter::once("t").chain(args.iter().copied()))
            .unwrap();
        let TestSub::Release(r) = cli.cmd;
        r.command
    }

    #[test]
    fn create_takes_positional_version() {
        match parse(&["release", "create", "1.4.0", "--draft"]) {
            ReleaseCommands::Create {
                version,
                draft,
                target,
                ..
            } => {
                assert_eq!(version.as_deref(), Some("1.4.0"));
                assert!(draft);
                assert_eq!(target, None);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn publish_and_list_defaults() {
        assert!(matches!(
            parse(&["release", "publish"]),
            ReleaseCommands::Publish {
                target: PublishTarget::All,
                ..
            }
        ));
        match parse(&["release", "list", "--limit", "5"]) {
            ReleaseCommands::List { remote, limit, .. } => {
                assert_eq!(remote, "origin");
                assert_eq!(limit, Some(5));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn create_completions() {
        assert_eq!(complete_create(&[], "m"), vec!["major", "minor"]);
        assert_eq!(complete_create(&[], "--pre"), vec!["--prerelease"]);
        let after_branch = vec!["--branch".to_string()];
        // Either real branches or the fallback list; both are prefix-filtered.
        assert!(complete_create(&after_branch, "zzz-no-such-branch").is_empty());
    }

    #[test]
    fn list_value_completions() {
        let args = vec!["--limit".to_string()];
        assert_eq!(complete_list(&args, "1"), vec!["10", "100"]);
        assert_eq!(complete_release(&[], "p"), vec!["publish"]);
    }
}
