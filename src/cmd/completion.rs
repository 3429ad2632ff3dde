/*!
`completion.rs`

Implements `devcli dev completion <sync|test|resolve|list|tree|script>`.

  sync    : regenerate the completion artifact when any command source is newer
  test    : structural battery against the live command tree (exit 1 on failure)
  resolve : live dynamic completion for a dotted command path
  list    : registered dynamic completer paths
  tree    : extracted command tree as JSON / YAML
  script  : generated script on stdout (artifact untouched)

JSON output shape (resolve):
{
  "status": "ok",
  "path": "dev.format",
  "incomplete": "--c",
  "candidates": ["--check"]
}
*/

use std::path::Path;

use anyhow::Result;
use clap::{Args, CommandFactory, Subcommand, ValueEnum};

use super::AppContext;
use super::style::{Role, StyleOptions, color, emoji, status, table};
use crate::completion::{
    CommandNode, CompletionRouter, SyncController, SyncOutcome, bash, extract, filter_prefix,
    synthesize,
};

#[derive(Args, Debug)]
pub struct CompletionArgs {
    #[command(subcommand)]
    pub command: CompletionCommands,
}

#[derive(Subcommand, Debug)]
pub enum CompletionCommands {
    /// Sync shell completion with current CLI commands
    Sync,
    /// Test shell completion functionality
    Test,
    /// Resolve dynamic completions for a dotted command path
    Resolve(ResolveArgs),
    /// List command paths with registered dynamic completers
    List {
        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print the extracted command tree
    Tree {
        #[arg(long, value_enum, default_value_t = TreeFormat::Json)]
        format: TreeFormat,
    },
    /// Print the generated completion script to stdout
    Script,
}

#[derive(ValueEnum, Clone, Copy, Debug, Eq, PartialEq)]
pub enum TreeFormat {
    Json,
    Yaml,
}

/// `resolve [--incomplete WORD] [--json] <PATH> [ARGS]...`
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Partial word being completed
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    pub incomplete: String,

    /// Output JSON instead of one candidate per line
    #[arg(long)]
    pub json: bool,

    /// Dotted command path (e.g. dev.format)
    pub path: String,

    /// Arguments already typed after the command
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// Entry point for `dev completion`.
pub fn execute_completion(args: CompletionArgs, ctx: &AppContext) -> Result<()> {
    match args.command {
        CompletionCommands::Sync => execute_sync(ctx),
        CompletionCommands::Test => execute_test(ctx),
        CompletionCommands::Resolve(r) => execute_resolve(r, ctx),
        CompletionCommands::List { json } => execute_list(json, ctx),
        CompletionCommands::Tree { format } => execute_tree(format),
        CompletionCommands::Script => {
            print!("{}", generate_script(&ctx.settings.program));
            Ok(())
        }
    }
}

/// Live command tree of this binary.
pub fn live_tree() -> CommandNode {
    extract(&crate::Cli::command())
}

/// Full completion script for the live tree.
pub fn generate_script(program: &str) -> String {
    synthesize(program, &live_tree())
}

/* -------------------------------------------------------------------------- */
/* sync                                                                        */
/* -------------------------------------------------------------------------- */

fn execute_sync(ctx: &AppContext) -> Result<()> {
    let style = StyleOptions::detect();
    match run_sync(ctx) {
        Ok(SyncOutcome::UpToDate) => {
            println!(
                "{} Shell completion is already up to date",
                color(Role::Success, emoji("success", &style), &style)
            );
            Ok(())
        }
        Ok(SyncOutcome::Regenerated {
            path, was_missing, ..
        }) => {
            if was_missing {
                println!("{} Shell completion script was missing", emoji("warn", &style));
            }
            println!("{} Generated {}", emoji("success", &style), relative(&path, &ctx.root));
            println!(
                "{} {}",
                emoji("info", &style),
                color(
                    Role::Dim,
                    format!(
                        "Restart your shell or run `source {}` to load new completions",
                        path.display()
                    ),
                    &style
                )
            );
            Ok(())
        }
        Err(e) => {
            eprintln!(
                "{} Failed to generate completion: {e:#}",
                color(Role::Error, emoji("error", &style), &style)
            );
            std::process::exit(1);
        }
    }
}

fn run_sync(ctx: &AppContext) -> Result<SyncOutcome> {
    let completion = &ctx.settings.completion;
    let ctl = SyncController::from_patterns(&ctx.root, &completion.artifact, &completion.sources)?;
    println!(
        "{} Checking {} source file(s) against {}",
        emoji("sync", &StyleOptions::detect()),
        ctl.sources().len(),
        relative(ctl.artifact(), &ctx.root)
    );
    ctl.sync(|| Ok(generate_script(&ctx.settings.program)))
}

fn relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

/* -------------------------------------------------------------------------- */
/* test                                                                        */
/* -------------------------------------------------------------------------- */

pub const EXPECTED_TOP_LEVEL: &[&str] = &["build", "dev", "package", "proj", "release"];
pub const EXPECTED_DEV: &[&str] = &["format", "lint", "typecheck", "test", "all", "precommit"];

/// Result of one structural assertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub name: &'static str,
    pub passed: bool,
    pub detail: Option<String>,
}

impl CheckResult {
    fn new(name: &'static str, failure: Option<String>) -> Self {
        Self {
            name,
            passed: failure.is_none(),
            detail: failure,
        }
    }
}

/// Fixed battery of structural assertions over `tree`.
pub fn structural_checks(tree: &CommandNode, program: &str) -> Vec<CheckResult> {
    let script = synthesize(program, tree);
    let function = bash::function_name(program);

    let generation = if script.is_empty() {
        Some("script is empty".to_string())
    } else if !script.starts_with("#!/bin/bash") {
        Some("missing #!/bin/bash header".to_string())
    } else if !script.contains(&function) {
        Some(format!("missing function {function}"))
    } else {
        None
    };

    let determinism = (script != synthesize(program, tree))
        .then(|| "two generations differ".to_string());

    let top = missing(tree, EXPECTED_TOP_LEVEL).map(|m| format!("missing commands: {m}"));

    let dev = match tree.subcommand("dev") {
        Some(dev) => missing(dev, EXPECTED_DEV).map(|m| format!("missing dev commands: {m}")),
        None => Some("no `dev` group".to_string()),
    };

    vec![
        CheckResult::new("Completion generation", generation),
        CheckResult::new("Deterministic output", determinism),
        CheckResult::new("Top-level commands", top),
        CheckResult::new("Dev subcommands", dev),
    ]
}

fn missing(node: &CommandNode, expected: &[&str]) -> Option<String> {
    let absent: Vec<&str> = expected
        .iter()
        .copied()
        .filter(|name| node.subcommand(name).is_none())
        .collect();
    (!absent.is_empty()).then(|| absent.join(", "))
}

fn execute_test(ctx: &AppContext) -> Result<()> {
    let style = StyleOptions::detect();
    println!("Running completion tests...");

    let results = structural_checks(&live_tree(), &ctx.settings.program);
    for r in &results {
        let line = match &r.detail {
            Some(d) => format!("{} test failed: {d}", r.name),
            None => format!("{} test passed", r.name),
        };
        println!("{}", status(r.passed, line, &style));
    }

    if results.iter().all(|r| r.passed) {
        println!("\n{}", status(true, "All completion tests passed!", &style));
        Ok(())
    } else {
        eprintln!("\n{}", status(false, "Some completion tests failed", &style));
        std::process::exit(1);
    }
}

/* -------------------------------------------------------------------------- */
/* resolve / list / tree                                                       */
/* -------------------------------------------------------------------------- */

fn execute_resolve(args: ResolveArgs, ctx: &AppContext) -> Result<()> {
    let router = CompletionRouter::new(&ctx.registry);
    let candidates = router.resolve(&args.path, &args.args, &args.incomplete);

    if args.json {
        println!(
            "{}",
            serde_json::json!({
                "status": "ok",
                "path": args.path,
                "incomplete": args.incomplete,
                "candidates": candidates,
            })
        );
    } else {
        for c in candidates {
            println!("{c}");
        }
    }
    Ok(())
}

fn execute_list(json: bool, ctx: &AppContext) -> Result<()> {
    let paths = ctx.registry.available_paths();
    let skipped = &ctx.registry.report().skipped;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "status": "ok",
                "count": ctx.registry.len(),
                "paths": paths,
                "skipped": skipped,
            })
        );
        return Ok(());
    }

    let style = StyleOptions::detect();
    let rows: Vec<Vec<String>> = paths
        .iter()
        .copied()
        .enumerate()
        .map(|(i, p)| {
            let group = p.split('.').next().unwrap_or(p).to_string();
            vec![(i + 1).to_string(), p.to_string(), group]
        })
        .collect();
    println!("{}", table(&["#", "PATH", "GROUP"], &rows, &style));

    if !skipped.is_empty() {
        println!(
            "\n{} {}",
            emoji("warn", &style),
            color(
                Role::Warning,
                format!("skipped during discovery: {}", skipped.join(", ")),
                &style
            )
        );
    }
    Ok(())
}

fn execute_tree(format: TreeFormat) -> Result<()> {
    let tree = live_tree();
    match format {
        TreeFormat::Json => println!("{}", serde_json::to_string_pretty(&tree)?),
        TreeFormat::Yaml => print!("{}", serde_yaml::to_string(&tree)?),
    }
    Ok(())
}

/* -------------------------------------------------------------------------- */
/* Dynamic completers for this group                                           */
/* -------------------------------------------------------------------------- */

pub const SUBCOMMANDS: &[&str] = &["sync", "test", "resolve", "list", "tree", "script"];

/// `dev completion ...`: subcommand names until one has been typed.
pub fn complete_completion_cmd(args: &[String], incomplete: &str) -> Vec<String> {
    if args.is_empty() {
        return filter_prefix(SUBCOMMANDS.iter().copied(), incomplete);
    }
    if args[0] == "tree" && args.last().map(String::as_str) == Some("--format") {
        return filter_prefix(["json", "yaml"], incomplete);
    }
    Vec::new()
}
