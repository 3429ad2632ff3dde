/*!
plan.rs - typed completion plan compiled from a `CommandNode` tree.

A plan is a tree of `Arm`s (one per command node), each holding an ordered
list of `Step`s:

  RestrictValues : previous word is a long option with choices -> offer choices
  Dispatch       : find the first later non-option word naming a child -> recurse;
                   otherwise offer unused options (dash word) or child names
  OfferOptions   : leaf; offer unused options

The shell backend (`bash.rs`) renders a plan to text. `CompletionPlan::complete`
evaluates the same plan in-process against a word list, with the semantics the
emitted shell function has.

Word indexing follows the shell's COMP_WORDS: index 0 is the program name, the
word under the cursor is the last one. The arm at depth `d` knows the index of
its own word through `idx_d`; the root's index is 0.
*/

use super::tree::CommandNode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Restrict candidates to `choices` when the previous word is one of `flags`.
    RestrictValues {
        flags: Vec<String>,
        choices: Vec<String>,
    },
    /// Look for a child command among words after this arm's own word.
    Dispatch {
        /// Depth of the children (this arm's depth + 1).
        child_depth: usize,
        children: Vec<Arm>,
        /// Options offered while no child has been typed yet.
        options: Vec<String>,
    },
    /// Leaf: offer this arm's options that were not typed yet.
    OfferOptions { options: Vec<String> },
}

/// Compiled logic for one command node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arm {
    pub name: String,
    pub depth: usize,
    pub steps: Vec<Step>,
}

impl Arm {
    pub fn children(&self) -> &[Arm] {
        self.steps
            .iter()
            .find_map(|s| match s {
                Step::Dispatch { children, .. } => Some(children.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }
}

/// Root of a compiled plan plus the program it completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionPlan {
    pub program: String,
    pub root: Arm,
}

impl CompletionPlan {
    pub fn compile(program: impl Into<String>, tree: &CommandNode) -> Self {
        Self {
            program: program.into(),
            root: compile_arm(tree, 0),
        }
    }

    /// Candidates for `incomplete`, given the words typed after the program name.
    pub fn complete<S: AsRef<str>>(&self, typed: &[S], incomplete: &str) -> Vec<String> {
        let mut words: Vec<&str> = Vec::with_capacity(typed.len() + 2);
        words.push(self.program.as_str());
        words.extend(typed.iter().map(AsRef::as_ref));
        words.push(incomplete);
        let cword = words.len() - 1;
        eval_arm(&self.root, &words, cword, 0)
    }
}

/// Compile one node (and its subtree) at `depth`.
pub fn compile_arm(node: &CommandNode, depth: usize) -> Arm {
    let mut steps = Vec::new();

    for opt in node.options.iter().filter(|o| !o.choices.is_empty()) {
        let flags: Vec<String> = opt.long_names().map(str::to_string).collect();
        if flags.is_empty() {
            continue;
        }
        steps.push(Step::RestrictValues {
            flags,
            choices: opt.choices.clone(),
        });
    }

    let options = node.option_spellings();
    if node.is_leaf() {
        steps.push(Step::OfferOptions { options });
    } else {
        let children = node
            .subcommands
            .iter()
            .map(|child| compile_arm(child, depth + 1))
            .collect();
        steps.push(Step::Dispatch {
            child_depth: depth + 1,
            children,
            options,
        });
    }

    Arm {
        name: node.name.clone(),
        depth,
        steps,
    }
}

fn eval_arm(arm: &Arm, words: &[&str], cword: usize, own_idx: usize) -> Vec<String> {
    let cur = words[cword];
    let prev = if cword > 0 { words[cword - 1] } else { "" };

    for step in &arm.steps {
        match step {
            Step::RestrictValues { flags, choices } => {
                if flags.iter().any(|f| f == prev) {
                    return prefix_filter(choices.iter().map(String::as_str), cur);
                }
            }
            Step::Dispatch {
                children, options, ..
            } => {
                for i in (own_idx + 1)..cword {
                    let w = words[i];
                    if w.starts_with('-') {
                        continue;
                    }
                    if let Some(child) = children.iter().find(|c| c.name == w) {
                        return eval_arm(child, words, cword, i);
                    }
                }
                if cur.starts_with('-') {
                    return unused_options(options, words, cword);
                }
                return prefix_filter(children.iter().map(|c| c.name.as_str()), cur);
            }
            Step::OfferOptions { options } => {
                return unused_options(options, words, cword);
            }
        }
    }
    Vec::new()
}

/// Options not typed anywhere in words[1..cword], prefix-filtered by the current word.
fn unused_options(options: &[String], words: &[&str], cword: usize) -> Vec<String> {
    let typed = &words[1..cword];
    let remaining = options
        .iter()
        .map(String::as_str)
        .filter(|o| !typed.contains(o));
    prefix_filter(remaining, words[cword])
}

fn prefix_filter<'a>(items: impl Iterator<Item = &'a str>, cur: &str) -> Vec<String> {
    items
        .filter(|s| s.starts_with(cur))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::tree::OptionSpec;

    fn abc_tree() -> CommandNode {
        CommandNode::new("prog")
            .with_subcommand(CommandNode::new("alpha"))
            .with_subcommand(CommandNode::new("beta"))
            .with_subcommand(CommandNode::new("gamma"))
    }

    fn dev_tree() -> CommandNode {
        CommandNode::new("prog")
            .with_option(OptionSpec::flag(["--debug"]))
            .with_subcommand(
                CommandNode::new("dev")
                    .with_option(OptionSpec::flag(["-v", "--verbose"]))
                    .with_subcommand(
                        CommandNode::new("format")
                            .with_option(OptionSpec::flag(["--check"]))
                            .with_option(OptionSpec::flag(["--fix"])),
                    )
                    .with_subcommand(
                        CommandNode::new("report").with_option(OptionSpec::choice(
                            ["-f", "--format"],
                            ["table", "json", "yaml"],
                        )),
                    ),
            )
    }

    fn plan(tree: &CommandNode) -> CompletionPlan {
        CompletionPlan::compile("prog", tree)
    }

    const NONE: &[&str] = &[];

    #[test]
    fn root_lists_subcommands_in_order() {
        let p = plan(&abc_tree());
        assert_eq!(p.complete(NONE, ""), vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn prefix_filter_on_subcommands() {
        let p = plan(&abc_tree());
        assert_eq!(p.complete(NONE, "b"), vec!["beta"]);
        assert!(p.complete(NONE, "x").is_empty());
    }

    #[test]
    fn leaf_excludes_used_options() {
        let p = plan(&dev_tree());
        assert_eq!(p.complete(&["dev", "format", "--check"], "-"), vec!["--fix"]);
        assert_eq!(p.complete(&["dev", "format", "--check"], ""), vec!["--fix"]);
        assert_eq!(
            p.complete(&["dev", "format"], "--"),
            vec!["--check", "--fix"]
        );
    }

    #[test]
    fn exclusion_counts_options_typed_at_any_level() {
        let p = plan(&dev_tree());
        // `--fix` typed before the subcommand still counts as used.
        assert_eq!(p.complete(&["dev", "--fix", "format"], "-"), vec!["--check"]);
    }

    #[test]
    fn choice_values_follow_long_option() {
        let p = plan(&dev_tree());
        assert_eq!(
            p.complete(&["dev", "report", "--format"], ""),
            vec!["table", "json", "yaml"]
        );
        assert_eq!(p.complete(&["dev", "report", "--format"], "j"), vec!["json"]);
    }

    #[test]
    fn short_spelling_does_not_trigger_choices() {
        let p = plan(&dev_tree());
        assert_eq!(p.complete(&["dev", "report", "-f"], ""), vec!["--format"]);
    }

    #[test]
    fn interleaved_flags_before_subcommand() {
        let p = plan(&dev_tree());
        assert_eq!(
            p.complete(&["dev", "--verbose", "format"], "-"),
            vec!["--check", "--fix"]
        );
        assert_eq!(
            p.complete(&["--debug", "dev", "--verbose", "report", "--format"], "y"),
            vec!["yaml"]
        );
    }

    #[test]
    fn group_without_child_offers_names_or_options() {
        let p = plan(&dev_tree());
        assert_eq!(p.complete(&["dev"], ""), vec!["format", "report"]);
        assert_eq!(p.complete(&["dev"], "-"), vec!["-v", "--verbose"]);
        assert_eq!(p.complete(&["dev", "-v"], "-"), vec!["--verbose"]);
    }

    #[test]
    fn unknown_word_is_not_a_dispatch() {
        let p = plan(&dev_tree());
        assert_eq!(p.complete(&["dev", "nope"], "f"), vec!["format"]);
    }

    #[test]
    fn depths_are_threaded() {
        let p = plan(&dev_tree());
        assert_eq!(p.root.depth, 0);
        let dev = &p.root.children()[0];
        assert_eq!(dev.depth, 1);
        assert!(dev.children().iter().all(|c| c.depth == 2));
        assert!(dev.children()[0].children().is_empty());
    }

    #[test]
    fn compile_is_deterministic() {
        assert_eq!(plan(&dev_tree()), plan(&dev_tree()));
    }
}
