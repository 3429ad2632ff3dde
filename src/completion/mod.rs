//! Shell completion: command-tree introspection, script synthesis, dynamic completers.
//!
//! tree     : CommandNode / OptionSpec + extract(&clap::Command)
//! plan     : typed completion plan (compile + in-process evaluation)
//! bash     : ScriptBackend rendering a plan to a bash/zsh script
//! registry : CompletionProvider trait + CompletionRegistry
//! router   : CompletionRouter::resolve (exact path, then one parent level)
//! sync     : SyncController (mtime staleness + atomic artifact rewrite)

pub mod bash;
pub mod plan;
pub mod registry;
pub mod router;
pub mod sync;
pub mod tree;

pub use bash::{BashBackend, ScriptBackend};
pub use plan::CompletionPlan;
pub use registry::{Completer, CompletionProvider, CompletionRegistry, filter_prefix};
pub use router::CompletionRouter;
pub use sync::{SyncController, SyncOutcome};
pub use tree::{CommandNode, extract};

/// Compile `tree` and render it with the bash backend.
pub fn synthesize(program: &str, tree: &CommandNode) -> String {
    BashBackend.render(&CompletionPlan::compile(program, tree))
}
