use std::path::PathBuf;

use anyhow::Result;
use clap::builder::ValueHint;
use clap::{Parser, Subcommand};

mod cmd;
mod completion;
mod config;
mod utils;

use cmd::{AppContext, BuildArgs, DevArgs, PackageArgs, ProjArgs, ReleaseArgs};

/// devcli - developer task runner
///
/// Command layout:
///   devcli build   <all|clean|component>      (placeholders)
///   devcli dev     <format|lint|typecheck|test|all|precommit>
///   devcli dev completion <sync|test|resolve|list|tree|script>
///   devcli package <create|list|clean>        (placeholders)
///   devcli proj    <info|size|stats>
///   devcli release <create|publish|list>      (placeholders)
///
/// Global flags / env:
///   -v / -vv        Increase verbosity (logs go to stderr)
///   -q / --quiet    Errors only
///   -C / --root     Project root (or DEVCLI_ROOT env; else nearest Cargo.toml)
///
/// Shell completion:
///   devcli dev completion sync     regenerate autogen/completion.sh when stale
///   source autogen/completion.sh   enable completion in bash / zsh
///
/// Examples:
///   devcli dev format --check
///   devcli dev completion resolve dev.format --incomplete=--c
///   devcli -C ../other proj stats
#[derive(Parser, Debug)]
#[command(
    name = "devcli",
    version,
    about = "devcli - developer task runner with generated shell completion",
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Silence all non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Project root directory
    #[arg(short = 'C', long, global = true, value_name = "DIR", value_hint = ValueHint::DirPath)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show version information
    Version,

    /// Build commands (placeholder for project builds)
    Build(BuildArgs),

    /// Development tools
    Dev(DevArgs),

    /// Package commands (placeholder for packaging)
    Package(PackageArgs),

    /// Project management commands
    Proj(ProjArgs),

    /// Release commands (placeholder for releases)
    Release(ReleaseArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = utils::derive_level(cli.verbose, cli.quiet);
    utils::init_logging(level);

    let root = config::resolve_root(cli.root.clone())?;
    let settings = config::Settings::load(&root)?;
    log_debug!("project root: {}", root.display());
    let ctx = AppContext::new(root, settings);

    match cli.command {
        Commands::Version => {
            println!("{} {}", ctx.settings.program, env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Build(args) => cmd::execute_build(args),
        Commands::Dev(args) => cmd::execute_dev(args, &ctx),
        Commands::Package(args) => cmd::execute_package(args, &ctx.settings.project_name),
        Commands::Proj(args) => cmd::execute_proj(args, &ctx),
        Commands::Release(args) => cmd::execute_release(args),
    }
}
