//! Runtime lookup of a dynamic completer for a dotted command path.
//!
//! resolve(path, args, incomplete):
//!   exact path registered        -> that completer
//!   else direct parent (one level only, never grandparents) -> parent completer
//!   else                         -> empty list

use super::registry::CompletionRegistry;
use crate::log_trace;

pub struct CompletionRouter<'a> {
    registry: &'a CompletionRegistry,
}

impl<'a> CompletionRouter<'a> {
    pub fn new(registry: &'a CompletionRegistry) -> Self {
        Self { registry }
    }

    pub fn resolve(&self, path: &str, args: &[String], incomplete: &str) -> Vec<String> {
        if let Some(completer) = self.registry.get(path) {
            log_trace!("completion: '{path}' matched directly");
            return completer(args, incomplete);
        }

        if let Some((parent, _)) = path.rsplit_once('.')
            && let Some(completer) = self.registry.get(parent)
        {
            log_trace!("completion: '{path}' fell back to '{parent}'");
            return completer(args, incomplete);
        }

        log_trace!("completion: no completer for '{path}'");
        Vec::new()
    }
}
