//! Command tree model + extraction from a live `clap::Command`.
//!
//! extract(&Command) -> CommandNode { name, help, options, subcommands }
//! Order is declaration order everywhere; nothing is sorted here.

use clap::builder::{ValueHint, ValueParser};
use clap::{Arg, Command, value_parser};
use serde::Serialize;

/// Whether an option takes a value and, if so, what kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Boolean / counting switch (no value).
    Flag,
    Text,
    Path,
    /// Integer or float parsed by clap's numeric value parsers.
    Number,
    /// Finite enumerated domain (see `OptionSpec::choices`).
    Choice,
}

/// One declared flag/option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionSpec {
    /// Accepted spellings, short form first (`-o`, `--output`).
    pub names: Vec<String>,
    pub value_kind: ValueKind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
}

impl OptionSpec {
    pub fn flag<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            value_kind: ValueKind::Flag,
            choices: Vec::new(),
        }
    }

    pub fn choice<I, S, C, T>(names: I, choices: C) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        C: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            value_kind: ValueKind::Choice,
            choices: choices.into_iter().map(Into::into).collect(),
        }
    }

    /// Spellings beginning with `--`.
    pub fn long_names(&self) -> impl Iterator<Item = &str> {
        self.names
            .iter()
            .map(String::as_str)
            .filter(|n| n.starts_with("--"))
    }
}

/// One command or group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandNode {
    pub name: String,
    pub help: String,
    pub options: Vec<OptionSpec>,
    pub subcommands: Vec<CommandNode>,
}

impl CommandNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            help: String::new(),
            options: Vec::new(),
            subcommands: Vec::new(),
        }
    }

    pub fn with_option(mut self, opt: OptionSpec) -> Self {
        self.options.push(opt);
        self
    }

    pub fn with_subcommand(mut self, child: CommandNode) -> Self {
        self.subcommands.push(child);
        self
    }

    pub fn subcommand(&self, name: &str) -> Option<&CommandNode> {
        self.subcommands.iter().find(|c| c.name == name)
    }

    pub fn subcommand_names(&self) -> impl Iterator<Item = &str> {
        self.subcommands.iter().map(|c| c.name.as_str())
    }

    /// Every spelling of every option, in declaration order.
    pub fn option_spellings(&self) -> Vec<String> {
        self.options
            .iter()
            .flat_map(|o| o.names.iter().cloned())
            .collect()
    }

    pub fn is_leaf(&self) -> bool {
        self.subcommands.is_empty()
    }
}

/// Walk a clap command graph into an owned `CommandNode` tree.
///
/// Works on the *unbuilt* command (as returned by `CommandFactory::command()`),
/// so clap's auto-generated `--help` / `--version` are not part of the tree.
pub fn extract(cmd: &Command) -> CommandNode {
    let options = cmd
        .get_arguments()
        .filter(|a| !a.is_positional() && !a.is_hide_set())
        .filter_map(option_spec)
        .collect();

    let subcommands = cmd
        .get_subcommands()
        .filter(|s| !s.is_hide_set())
        .map(extract)
        .collect();

    CommandNode {
        name: cmd.get_name().to_string(),
        help: cmd.get_about().map(|s| s.to_string()).unwrap_or_default(),
        options,
        subcommands,
    }
}

fn option_spec(arg: &Arg) -> Option<OptionSpec> {
    let mut names = Vec::new();
    if let Some(s) = arg.get_short() {
        names.push(format!("-{s}"));
    }
    if let Some(l) = arg.get_long() {
        names.push(format!("--{l}"));
    }
    if let Some(aliases) = arg.get_visible_aliases() {
        names.extend(aliases.into_iter().map(|a| format!("--{a}")));
    }
    if names.is_empty() {
        return None;
    }

    // Flags report bool possible values through their parser; ignore those.
    if !arg.get_action().takes_values() {
        return Some(OptionSpec {
            names,
            value_kind: ValueKind::Flag,
            choices: Vec::new(),
        });
    }

    let choices: Vec<String> = arg
        .get_possible_values()
        .into_iter()
        .filter(|pv| !pv.is_hide_set())
        .map(|pv| pv.get_name().to_string())
        .collect();

    let value_kind = if !choices.is_empty() {
        ValueKind::Choice
    } else {
        match arg.get_value_hint() {
            ValueHint::AnyPath
            | ValueHint::FilePath
            | ValueHint::DirPath
            | ValueHint::ExecutablePath => ValueKind::Path,
            _ if is_numeric(arg) => ValueKind::Number,
            _ => ValueKind::Text,
        }
    };

    Some(OptionSpec {
        names,
        value_kind,
        choices,
    })
}

fn is_numeric(arg: &Arg) -> bool {
    let id = arg.get_value_parser().type_id();
    let numeric: [ValueParser; 14] = [
        value_parser!(u8).into(),
        value_parser!(u16).into(),
        value_parser!(u32).into(),
        value_parser!(u64).into(),
        value_parser!(usize).into(),
        value_parser!(i8).into(),
        value_parser!(i16).into(),
        value_parser!(i32).into(),
        value_parser!(i64).into(),
        value_parser!(isize).into(),
        value_parser!(f32).into(),
        value_parser!(f64).into(),
        value_parser!(u128).into(),
        value_parser!(i128).into(),
    ];
    numeric.iter().any(|p| p.type_id() == id)
}
