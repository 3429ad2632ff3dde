/*!
`dev.rs`

Implements `devcli dev <format|lint|typecheck|test|all|precommit|completion>`.

Every check shells out to cargo through `shared::run_tool` (inherited stdio,
exit code forwarded) except `precommit`, which captures tool output and only
prints it for failing steps.

  format [--check]              cargo fmt --all [-- --check]
  lint [--fix]                  cargo clippy --all-targets (--fix --allow-dirty | -- -D warnings)
  typecheck                     cargo check --all-targets
  test [--coverage] [--failfast] cargo test | cargo llvm-cov
  all                           every check above + completion battery; exit 1 on any failure
  precommit [--fix] [--ci]      fmt, clippy, check (+ tests with --ci)
*/

use std::path::Path;

use anyhow::Result;
use clap::{Args, Subcommand};

use super::AppContext;
use super::completion::{self as completion_cmd, CompletionArgs, execute_completion};
use super::shared::{capture_tool, exit_with, run_tool};
use super::style::{Role, StyleOptions, color, emoji, status};
use crate::completion::{Completer, CompletionProvider, filter_prefix};
use crate::log_debug;

#[derive(Args, Debug)]
pub struct DevArgs {
    #[command(subcommand)]
    pub command: DevCommands,
}

#[derive(Subcommand, Debug)]
pub enum DevCommands {
    /// Format code with rustfmt
    Format {
        /// Check formatting without modifying files
        #[arg(long)]
        check: bool,
    },
    /// Lint code with clippy
    Lint {
        /// Apply clippy's suggested fixes
        #[arg(long)]
        fix: bool,
    },
    /// Type-check all targets
    Typecheck,
    /// Run the test suite
    Test {
        /// Run under cargo-llvm-cov
        #[arg(long)]
        coverage: bool,
        /// Stop at the first failing test binary
        #[arg(long)]
        failfast: bool,
    },
    /// Run all checks
    All,
    /// Run all pre-commit checks locally
    Precommit {
        /// Automatically fix issues where possible
        #[arg(long)]
        fix: bool,
        /// Run in CI mode (also runs the test suite)
        #[arg(long)]
        ci: bool,
    },
    /// Shell completion management
    Completion(CompletionArgs),
}

pub fn execute_dev(args: DevArgs, ctx: &AppContext) -> Result<()> {
    let root = ctx.root.as_path();
    match args.command {
        DevCommands::Format { check } => exit_with(run_tool(root, "cargo", &format_args(check))?),
        DevCommands::Lint { fix } => exit_with(run_tool(root, "cargo", &lint_args(fix))?),
        DevCommands::Typecheck => exit_with(run_tool(root, "cargo", &typecheck_args())?),
        DevCommands::Test { coverage, failfast } => {
            exit_with(run_tool(root, "cargo", &test_args(coverage, failfast))?)
        }
        DevCommands::All => execute_all(ctx),
        DevCommands::Precommit { fix, ci } => execute_precommit(root, fix, ci),
        DevCommands::Completion(c) => execute_completion(c, ctx),
    }
}

fn format_args(check: bool) -> Vec<&'static str> {
    let mut args = vec!["fmt", "--all"];
    if check {
        args.extend(["--", "--check"]);
    }
    args
}

fn lint_args(fix: bool) -> Vec<&'static str> {
    let mut args = vec!["clippy", "--all-targets"];
    if fix {
        args.extend(["--fix", "--allow-dirty", "--allow-staged"]);
    } else {
        args.extend(["--", "-D", "warnings"]);
    }
    args
}

fn typecheck_args() -> Vec<&'static str> {
    vec!["check", "--all-targets"]
}

fn test_args(coverage: bool, failfast: bool) -> Vec<&'static str> {
    let mut args = if coverage {
        vec!["llvm-cov", "--summary-only"]
    } else {
        vec!["test"]
    };
    if !failfast {
        args.push("--no-fail-fast");
    }
    args
}

/* -------------------------------------------------------------------------- */
/* all                                                                         */
/* -------------------------------------------------------------------------- */

fn execute_all(ctx: &AppContext) -> Result<()> {
    let style = StyleOptions::detect();
    println!("Running all development checks...");

    let checks: [(&str, Vec<&str>); 4] = [
        ("Formatting check", format_args(true)),
        ("Linting", lint_args(false)),
        ("Type checking", typecheck_args()),
        ("Tests", test_args(false, false)),
    ];

    let mut failed: Vec<&str> = Vec::new();
    for (name, args) in &checks {
        banner(name);
        if run_tool(&ctx.root, "cargo", args)? != 0 {
            failed.push(*name);
        }
    }

    banner("Completion tests");
    let tree = completion_cmd::live_tree();
    for r in completion_cmd::structural_checks(&tree, &ctx.settings.program) {
        println!("{}", status(r.passed, r.name, &style));
        if !r.passed {
            log_debug!("completion check '{}' failed: {:?}", r.name, r.detail);
            if !failed.contains(&"Completion tests") {
                failed.push("Completion tests");
            }
        }
    }

    if failed.is_empty() {
        println!("\n{}", status(true, "All checks passed!", &style));
        Ok(())
    } else {
        eprintln!(
            "\n{}",
            status(false, format!("Failed checks: {}", failed.join(", ")), &style)
        );
        std::process::exit(1);
    }
}

fn banner(name: &str) {
    let rule = "=".repeat(60);
    println!("\n{rule}\nRunning {name}...\n{rule}");
}

/* -------------------------------------------------------------------------- */
/* precommit                                                                   */
/* -------------------------------------------------------------------------- */

fn execute_precommit(root: &Path, fix: bool, ci: bool) -> Result<()> {
    let style = StyleOptions::detect();
    let search = emoji("search", &style);
    if ci {
        println!("{search} Running CI checks (all files)...");
    } else {
        println!("{search} Running pre-commit checks...");
    }

    let mut steps: Vec<(&str, Vec<&str>)> = vec![
        ("rustfmt", format_args(false)),
        ("clippy", lint_args(fix)),
        ("cargo check", typecheck_args()),
    ];
    if ci {
        steps.push(("tests", test_args(false, false)));
    }

    let mut any_failures = false;
    for (name, args) in steps {
        println!("\nRunning {name}...");
        let out = capture_tool(root, "cargo", &args)?;
        if out.success() {
            println!("   {}", status(true, format!("{name}: all good"), &style));
            continue;
        }
        any_failures = true;
        println!("   {}", status(false, format!("{name} failed"), &style));
        for stream in [&out.stdout, &out.stderr] {
            if !stream.trim().is_empty() {
                println!("{}", stream.trim_end());
            }
        }
    }

    println!("\n{}", "=".repeat(60));
    if any_failures {
        eprintln!("{}", status(false, "Pre-commit checks failed!", &style));
        if !fix {
            println!(
                "\n{} {}",
                emoji("info", &style),
                color(
                    Role::Dim,
                    "Tip: run `devcli dev precommit --fix` to fix issues automatically",
                    &style
                )
            );
        }
        std::process::exit(1);
    }
    println!("{}", status(true, "All pre-commit checks passed!", &style));
    Ok(())
}

/* -------------------------------------------------------------------------- */
/* Dynamic completers                                                          */
/* -------------------------------------------------------------------------- */

const SUBCOMMANDS: &[&str] = &[
    "all",
    "format",
    "lint",
    "typecheck",
    "test",
    "precommit",
    "completion",
];

pub struct DevCompletions;

impl CompletionProvider for DevCompletions {
    fn group(&self) -> &str {
        "dev"
    }

    fn completers(&self) -> Result<Vec<(&'static str, Completer)>> {
        Ok(vec![
            ("", complete_dev as Completer),
            ("all", complete_all),
            ("format", complete_format),
            ("lint", complete_lint),
            ("typecheck", complete_typecheck),
            ("test", complete_test),
            ("precommit", complete_precommit),
            ("completion", completion_cmd::complete_completion_cmd),
        ])
    }
}

/// `dev ...`: subcommand names, then delegate on the first typed word.
fn complete_dev(args: &[String], incomplete: &str) -> Vec<String> {
    let Some(first) = args.first().filter(|a| a.as_str() != "dev") else {
        return filter_prefix(SUBCOMMANDS.iter().copied(), incomplete);
    };
    let rest = &args[1..];
    match first.as_str() {
        "all" => complete_all(rest, incomplete),
        "format" => complete_format(rest, incomplete),
        "lint" => complete_lint(rest, incomplete),
        "typecheck" => complete_typecheck(rest, incomplete),
        "test" => complete_test(rest, incomplete),
        "precommit" => complete_precommit(rest, incomplete),
        "completion" => completion_cmd::complete_completion_cmd(rest, incomplete),
        _ => Vec::new(),
    }
}

fn complete_all(_args: &[String], incomplete: &str) -> Vec<String> {
    options_only(&["--verbose", "--quiet"], incomplete)
}

fn complete_format(_args: &[String], incomplete: &str) -> Vec<String> {
    options_or_files(&["--check", "--verbose"], "**/*.rs", incomplete)
}

fn complete_lint(_args: &[String], incomplete: &str) -> Vec<String> {
    options_or_files(&["--fix", "--verbose"], "**/*.rs", incomplete)
}

fn complete_typecheck(_args: &[String], incomplete: &str) -> Vec<String> {
    if incomplete.starts_with('-') {
        return filter_prefix(["--verbose"], incomplete);
    }
    let Ok(cwd) = std::env::current_dir() else {
        return Vec::new();
    };
    visible_dirs(&cwd)
        .into_iter()
        .filter(|d| d.starts_with(incomplete))
        .collect()
}

fn complete_test(_args: &[String], incomplete: &str) -> Vec<String> {
    options_or_files(
        &["--coverage", "--failfast", "--verbose"],
        "tests/**/*.rs",
        incomplete,
    )
}

fn complete_precommit(_args: &[String], incomplete: &str) -> Vec<String> {
    options_only(&["--fix", "--ci", "--verbose"], incomplete)
}

fn options_only(options: &[&str], incomplete: &str) -> Vec<String> {
    if incomplete.starts_with('-') {
        filter_prefix(options.iter().copied(), incomplete)
    } else {
        Vec::new()
    }
}

const FILE_SUGGESTION_LIMIT: usize = 10;

fn options_or_files(options: &[&str], pattern: &str, incomplete: &str) -> Vec<String> {
    if incomplete.starts_with('-') {
        return filter_prefix(options.iter().copied(), incomplete);
    }
    let Ok(cwd) = std::env::current_dir() else {
        return Vec::new();
    };
    matching_files(&cwd, pattern, incomplete)
}

/// Files under `base` matching `pattern`, relative to `base`, outside `target/`.
pub fn matching_files(base: &Path, pattern: &str, incomplete: &str) -> Vec<String> {
    let full = base.join(pattern);
    let Ok(paths) = glob::glob(&full.to_string_lossy()) else {
        return Vec::new();
    };
    let mut out: Vec<String> = paths
        .filter_map(|p| p.ok())
        .filter_map(|p| {
            p.strip_prefix(base)
                .ok()
                .map(|r| r.to_string_lossy().into_owned())
        })
        .filter(|rel| !rel.starts_with("target/") && rel.starts_with(incomplete))
        .collect();
    out.sort();
    out.truncate(FILE_SUGGESTION_LIMIT);
    out
}

/// Non-hidden directory names directly under `base`, sorted.
pub fn visible_dirs(base: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(base) else {
        return Vec::new();
    };
    let mut dirs: Vec<String> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| !name.starts_with('.'))
        .collect();
    dirs.sort();
    dirs
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
        Dev(DevArgs),
    }

    fn parse(args: &[&str]) -> DevCommands {
        let cli = TestCli::try_parse_from(std::iter::once("t").chain(args.iter().copied()))
            .unwrap();
        let TestSub::Dev(d) = cli.cmd;
        d.command
    }

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn clap_parses_dev_subcommands() {
        assert!(matches!(
            parse(&["dev", "format", "--check"]),
            DevCommands::Format { check: true }
        ));
        assert!(matches!(
            parse(&["dev", "test", "--failfast"]),
            DevCommands::Test {
                coverage: false,
                failfast: true
            }
        ));
        assert!(matches!(
            parse(&["dev", "precommit", "--ci"]),
            DevCommands::Precommit { fix: false, ci: true }
        ));
    }

    #[test]
    fn tool_arguments() {
        assert_eq!(format_args(true), vec!["fmt", "--all", "--", "--check"]);
        assert_eq!(format_args(false), vec!["fmt", "--all"]);
        assert!(lint_args(true).contains(&"--fix"));
        assert_eq!(lint_args(false).last(), Some(&"warnings"));
        assert_eq!(test_args(false, true), vec!["test"]);
        assert_eq!(test_args(true, false)[0], "llvm-cov");
    }

    #[test]
    fn group_completer_lists_then_delegates() {
        assert_eq!(complete_dev(&[], "t"), vec!["typecheck", "test"]);
        assert_eq!(complete_dev(&strings(&["dev"]), "p"), vec!["precommit"]);
        assert_eq!(complete_dev(&strings(&["precommit"]), "--c"), vec!["--ci"]);
        assert_eq!(complete_dev(&strings(&["completion"]), "sy"), vec!["sync"]);
        assert!(complete_dev(&strings(&["bogus"]), "").is_empty());
    }

    #[test]
    fn option_completers() {
        assert_eq!(complete_format(&[], "--c"), vec!["--check"]);
        assert_eq!(complete_lint(&[], "--f"), vec!["--fix"]);
        assert_eq!(complete_test(&[], "--f"), vec!["--failfast"]);
        assert!(complete_all(&[], "x").is_empty());
    }

    #[test]
    fn file_suggestions_skip_target_and_cap() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::create_dir_all(dir.path().join("target/debug")).unwrap();
        for i in 0..12 {
            std::fs::write(src.join(format!("m{i:02}.rs")), "").unwrap();
        }
        std::fs::write(dir.path().join("target/debug/build.rs"), "").unwrap();
        std::fs::write(src.join("notes.txt"), "").unwrap();

        let all = matching_files(dir.path(), "**/*.rs", "");
        assert_eq!(all.len(), FILE_SUGGESTION_LIMIT);
        assert!(all.iter().all(|p| p.starts_with("src/") && p.ends_with(".rs")));
        assert_eq!(all[0], "src/m00.rs");

        let few = matching_files(dir.path(), "**/*.rs", "src/m1");
        assert_eq!(few, vec!["src/m10.rs", "src/m11.rs"]);
    }

    #[test]
    fn dirs_exclude_hidden() {
        let dir = tempfile::tempdir().unwrap();
        for d in ["src", ".git", "benches"] {
            std::fs::create_dir(dir.path().join(d)).unwrap();
        }
        std::fs::write(dir.path().join("Cargo.toml"), "").unwrap();
        assert_eq!(visible_dirs(dir.path()), vec!["benches", "src"]);
    }

    #[test]
    fn provider_registers_group_and_children() {
        let entries = DevCompletions.completers().unwrap();
        let names: Vec<_> = entries.iter().map(|(n, _)| *n).collect();
        assert_eq!(names[0], "");
        assert!(names.contains(&"completion"));
        assert_eq!(DevCompletions.group(), "dev");
    }
}
