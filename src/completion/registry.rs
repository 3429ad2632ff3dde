/*!
registry.rs - dynamic completers contributed by command modules.

Each command group ships a `CompletionProvider`. At startup the registry
walks an explicit provider list and indexes every completer by dotted path:

  ("", completer)        -> "<group>"
  ("format", completer)  -> "<group>.format"

A provider that fails, or an entry with a malformed name, is logged and
skipped; discovery carries on with the rest. Once built the registry is
read-only.
*/

use std::collections::HashMap;

use anyhow::Result;

use crate::{log_debug, log_error};

/// Pure completion function: (already typed args, incomplete word) -> candidates.
pub type Completer = fn(&[String], &str) -> Vec<String>;

/// A command group's contribution of dynamic completers.
pub trait CompletionProvider {
    /// Group name; first segment of every key this provider registers.
    fn group(&self) -> &str;

    /// `(name, completer)` pairs. An empty name registers the group itself.
    fn completers(&self) -> Result<Vec<(&'static str, Completer)>>;
}

/// Outcome of registering providers, kept for diagnostics (`dev completion list`).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DiscoveryReport {
    pub registered: usize,
    pub skipped: Vec<String>,
}

#[derive(Default)]
pub struct CompletionRegistry {
    completions: HashMap<String, Completer>,
    report: DiscoveryReport,
}

impl CompletionRegistry {
    /// Build the registry from an explicit provider list.
    pub fn discover(providers: &[&dyn CompletionProvider]) -> Self {
        let mut registry = Self::default();
        for provider in providers {
            registry.load_provider(*provider);
        }
        log_debug!(
            "completion registry: {} completer(s), {} skipped",
            registry.report.registered,
            registry.report.skipped.len()
        );
        registry
    }

    fn load_provider(&mut self, provider: &dyn CompletionProvider) {
        let group = provider.group();
        if !is_segment(group) {
            log_error!("completion provider with invalid group name '{group}' skipped");
            self.report.skipped.push(group.to_string());
            return;
        }

        let entries = match provider.completers() {
            Ok(entries) => entries,
            Err(e) => {
                log_error!("completion provider '{group}' failed: {e:#}");
                self.report.skipped.push(group.to_string());
                return;
            }
        };

        for (name, completer) in entries {
            let path = if name.is_empty() {
                group.to_string()
            } else if is_segment(name) {
                format!("{group}.{name}")
            } else {
                log_error!("completer '{name}' in provider '{group}' has an invalid name; skipped");
                self.report.skipped.push(format!("{group}.{name}"));
                continue;
            };

            if self.completions.contains_key(&path) {
                log_debug!("completer '{path}' already registered; keeping the first");
                self.report.skipped.push(path);
                continue;
            }
            self.completions.insert(path, completer);
            self.report.registered += 1;
        }
    }

    pub fn get(&self, path: &str) -> Option<Completer> {
        self.completions.get(path).copied()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.completions.contains_key(path)
    }

    /// All registered paths, sorted.
    pub fn available_paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.completions.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }

    pub fn len(&self) -> usize {
        self.completions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.completions.is_empty()
    }

    pub fn report(&self) -> &DiscoveryReport {
        &self.report
    }
}

fn is_segment(name: &str) -> bool {
    !name.is_empty() && !name.contains('.') && !name.chars().any(char::is_whitespace)
}

/// Keep `candidates` starting with `incomplete`, preserving order.
pub fn filter_prefix<'a>(
    candidates: impl IntoIterator<Item = &'a str>,
    incomplete: &str,
) -> Vec<String> {
    candidates
        .into_iter()
        .filter(|c| c.starts_with(incomplete))
        .map(str::to_string)
        .collect()
}
