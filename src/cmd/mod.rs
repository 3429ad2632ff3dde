/*!
Command dispatcher module.

Layout:
  src/cmd/
    mod.rs          (this file: AppContext, provider list, re-exports)
    build.rs        (BuildArgs   + execute_build,   BuildCompletions)
    dev.rs          (DevArgs     + execute_dev,     DevCompletions)
    completion.rs   (CompletionArgs + execute_completion; nested under `dev`)
    package.rs      (PackageArgs + execute_package, PackageCompletions)
    proj.rs         (ProjArgs    + execute_proj,    ProjCompletions)
    release.rs      (ReleaseArgs + execute_release, ReleaseCompletions)
    choices.rs      (ValueEnum option domains)
    shared.rs       (external tool runner, placeholder output)
    style.rs        (color / emoji / table helpers)

Conventions:
  - Each group exposes one public `execute_*` function returning `anyhow::Result<()>`.
  - Argument structs derive `clap::Args`.
  - Each group exposes one `CompletionProvider`; `completion_providers()` is the
    only place they are listed.
*/

use std::path::PathBuf;

use crate::completion::{CompletionProvider, CompletionRegistry};
use crate::config::Settings;

pub mod build;
pub mod choices;
pub mod completion;
pub mod dev;
pub mod package;
pub mod proj;
pub mod release;
pub mod shared;
pub mod style;

pub use build::{BuildArgs, execute_build};
pub use dev::{DevArgs, execute_dev};
pub use package::{PackageArgs, execute_package};
pub use proj::{ProjArgs, execute_proj};
pub use release::{ReleaseArgs, execute_release};

/// Per-invocation state handed to command handlers.
pub struct AppContext {
    pub root: PathBuf,
    pub settings: Settings,
    pub registry: CompletionRegistry,
}

impl AppContext {
    pub fn new(root: PathBuf, settings: Settings) -> Self {
        let registry = CompletionRegistry::discover(&completion_providers());
        Self {
            root,
            settings,
            registry,
        }
    }
}

/// Every command group's dynamic completers.
pub fn completion_providers() -> [&'static dyn CompletionProvider; 5] {
    [
        &build::BuildCompletions,
        &dev::DevCompletions,
        &package::PackageCompletions,
        &proj::ProjCompletions,
        &release::ReleaseCompletions,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::CompletionRouter;

    fn ctx() -> AppContext {
        AppContext::new(PathBuf::from("."), Settings::default())
    }

    #[test]
    fn every_group_registers_without_skips() {
        let ctx = ctx();
        assert!(ctx.registry.report().skipped.is_empty());
        for group in ["build", "dev", "package", "proj", "release"] {
            assert!(ctx.registry.contains(group), "{group} missing");
        }
        assert!(ctx.registry.contains("dev.completion"));
        assert!(ctx.registry.contains("build.component"));
    }

    #[test]
    fn router_resolves_registered_and_parent_paths() {
        let ctx = ctx();
        let router = CompletionRouter::new(&ctx.registry);
        assert_eq!(
            router.resolve("build.component", &[], "ba"),
            vec!["backend"]
        );
        // No `proj.info.deep` completer: falls back to `proj.info`.
        assert!(router.resolve("proj.info.deep", &[], "").is_empty());
        // `dev.completion.sync` is unregistered; parent `dev.completion` answers.
        assert_eq!(
            router.resolve("dev.completion.sync", &[], "sc"),
            vec!["script"]
        );
        // Grandparents are never consulted.
        assert!(router.resolve("proj.nope.deeper", &[], "").is_empty());
        assert_eq!(
            router.resolve("dev.completion.tree", &["tree".into(), "--format".into()], "j"),
            vec!["json"]
        );
    }
}
