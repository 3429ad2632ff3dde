/*!
bash.rs - text backend turning a `CompletionPlan` into a bash/zsh script.

Output layout:
  shebang + header + `_<prog>_completions_loaded` marker
  `__<prog>_unused_options` helper (prints spellings absent from words[1..cword])
  `_<prog>_completions` function (nested `case` arms, one per plan arm)
  interactive-only registration stanza (bash native, zsh via bashcompinit)

Per-depth state lives in `idx_N` (word index of the arm at depth N) and
`sub_N` (child name found for depth N). Indentation is fixed at 4 spaces,
so a given plan always renders to the same bytes.
*/

use std::borrow::Cow;

use super::plan::{Arm, CompletionPlan, Step};

/// A renderer from a compiled plan to a shell artifact.
pub trait ScriptBackend {
    fn render(&self, plan: &CompletionPlan) -> String;
}

/// bash (and zsh through `bashcompinit`).
#[derive(Debug, Default, Clone, Copy)]
pub struct BashBackend;

impl ScriptBackend for BashBackend {
    fn render(&self, plan: &CompletionPlan) -> String {
        let names = Names::for_program(&plan.program);
        let mut w = ShellWriter::default();

        w.line("#!/bin/bash");
        w.line(format!("# Auto-generated completion script for {}. Do not edit.", plan.program));
        w.line(format!("# Regenerate with: {} dev completion sync", plan.program));
        w.line(format!("export {}=1", names.marker));
        w.blank();

        render_unused_helper(&mut w, &names);
        w.blank();

        w.line(format!("{}() {{", names.function));
        w.indent();
        render_word_setup(&mut w);
        w.blank();
        w.line("local idx_0=0");
        render_arm(&mut w, &plan.root, &names);
        w.dedent();
        w.line("}");
        w.blank();

        render_registration(&mut w, &plan.program, &names);
        w.finish()
    }
}

/// Name of the completion function the script defines for `program`.
pub fn function_name(program: &str) -> String {
    format!("_{}_completions", ident(program))
}

fn ident(program: &str) -> String {
    program
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Shell identifiers derived from the program name.
struct Names {
    function: String,
    helper: String,
    marker: String,
}

impl Names {
    fn for_program(program: &str) -> Self {
        let ident = ident(program);
        Self {
            function: function_name(program),
            helper: format!("__{ident}_unused_options"),
            marker: format!("_{ident}_completions_loaded"),
        }
    }
}

fn render_unused_helper(w: &mut ShellWriter, names: &Names) {
    w.line(format!("{}() {{", names.helper));
    w.indent();
    w.line("local opt j used");
    w.line("for opt in \"$@\"; do");
    w.indent();
    w.line("used=0");
    w.line("for ((j=1; j < cword; j++)); do");
    w.indent();
    w.line("if [[ \"${words[j]}\" == \"${opt}\" ]]; then");
    w.indent();
    w.line("used=1");
    w.line("break");
    w.dedent();
    w.line("fi");
    w.dedent();
    w.line("done");
    w.line("if (( used == 0 )); then");
    w.indent();
    w.line("printf '%s\\n' \"${opt}\"");
    w.dedent();
    w.line("fi");
    w.dedent();
    w.line("done");
    w.dedent();
    w.line("}");
}

fn render_word_setup(w: &mut ShellWriter) {
    const PLAIN: [&str; 4] = [
        "cur=\"${COMP_WORDS[COMP_CWORD]}\"",
        "prev=\"${COMP_WORDS[COMP_CWORD-1]}\"",
        "words=(\"${COMP_WORDS[@]}\")",
        "cword=$COMP_CWORD",
    ];

    w.line("local cur prev words cword i");
    w.line("if [[ -n \"$ZSH_VERSION\" ]]; then");
    w.indent();
    PLAIN.iter().for_each(|l| w.line(*l));
    w.dedent();
    w.line("elif type _get_comp_words_by_ref &>/dev/null; then");
    w.indent();
    w.line("_get_comp_words_by_ref -n : cur prev words cword");
    w.dedent();
    w.line("else");
    w.indent();
    PLAIN.iter().for_each(|l| w.line(*l));
    w.dedent();
    w.line("fi");
}

fn render_arm(w: &mut ShellWriter, arm: &Arm, names: &Names) {
    let restrictions: Vec<(&[String], &[String])> = arm
        .steps
        .iter()
        .filter_map(|s| match s {
            Step::RestrictValues { flags, choices } => {
                Some((flags.as_slice(), choices.as_slice()))
            }
            _ => None,
        })
        .collect();

    if !restrictions.is_empty() {
        w.line("case \"${prev}\" in");
        w.indent();
        for (flags, choices) in restrictions {
            w.line(format!("{})", pattern(flags.iter().map(String::as_str))));
            w.indent();
            w.line(compreply_words(choices.iter().map(String::as_str)));
            w.line("return 0");
            w.line(";;");
            w.dedent();
        }
        w.dedent();
        w.line("esac");
    }

    for step in &arm.steps {
        match step {
            Step::RestrictValues { .. } => {}
            Step::Dispatch {
                child_depth,
                children,
                options,
            } => render_dispatch(w, arm.depth, *child_depth, children, options, names),
            Step::OfferOptions { options } => {
                w.line(compreply_unused(options, names));
                w.line("return 0");
            }
        }
    }
}

fn render_dispatch(
    w: &mut ShellWriter,
    depth: usize,
    child_depth: usize,
    children: &[Arm],
    options: &[String],
    names: &Names,
) {
    let child_pattern = pattern(children.iter().map(|c| c.name.as_str()));

    w.line(format!("local sub_{child_depth}='' idx_{child_depth}=0"));
    w.line(format!("for ((i=idx_{depth}+1; i < cword; i++)); do"));
    w.indent();
    w.line("if [[ \"${words[i]}\" != -* ]]; then");
    w.indent();
    w.line("case \"${words[i]}\" in");
    w.indent();
    w.line(format!("{child_pattern})"));
    w.indent();
    w.line(format!("sub_{child_depth}=\"${{words[i]}}\""));
    w.line(format!("idx_{child_depth}=$i"));
    w.line("break");
    w.line(";;");
    w.dedent();
    w.dedent();
    w.line("esac");
    w.dedent();
    w.line("fi");
    w.dedent();
    w.line("done");

    w.line(format!("case \"${{sub_{child_depth}}}\" in"));
    w.indent();
    for child in children {
        w.line(format!("{})", quote(&child.name)));
        w.indent();
        render_arm(w, child, names);
        w.line(";;");
        w.dedent();
    }
    w.line("*)");
    w.indent();
    w.line("if [[ \"${cur}\" == -* ]]; then");
    w.indent();
    w.line(compreply_unused(options, names));
    w.dedent();
    w.line("else");
    w.indent();
    w.line(compreply_words(children.iter().map(|c| c.name.as_str())));
    w.dedent();
    w.line("fi");
    w.line(";;");
    w.dedent();
    w.dedent();
    w.line("esac");
    w.line("return 0");
}

fn render_registration(w: &mut ShellWriter, program: &str, names: &Names) {
    let register = format!("complete -F {} {}", names.function, quote(program));
    w.line("# Only enable completion for interactive shells");
    w.line("if [[ $- == *i* ]]; then");
    w.indent();
    w.line("if [[ -n \"$BASH_VERSION\" ]]; then");
    w.indent();
    w.line(&register);
    w.dedent();
    w.line("fi");
    w.line("if [[ -n \"$ZSH_VERSION\" ]]; then");
    w.indent();
    w.line("autoload -U +X bashcompinit && bashcompinit");
    w.line(&register);
    w.dedent();
    w.line("fi");
    w.dedent();
    w.line("fi");
}

fn quote(word: &str) -> Cow<'_, str> {
    shell_words::quote(word)
}

fn pattern<'a>(words: impl Iterator<Item = &'a str>) -> String {
    words.map(quote).collect::<Vec<_>>().join("|")
}

fn compreply_words<'a>(words: impl Iterator<Item = &'a str>) -> String {
    let list = words.collect::<Vec<_>>().join(" ");
    format!("COMPREPLY=($(compgen -W \"{list}\" -- \"${{cur}}\"))")
}

fn compreply_unused(options: &[String], names: &Names) -> String {
    if options.is_empty() {
        return "COMPREPLY=()".to_string();
    }
    let args = options
        .iter()
        .map(|o| quote(o))
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        "COMPREPLY=($(compgen -W \"$({} {args})\" -- \"${{cur}}\"))",
        names.helper
    )
}

/// Line buffer with fixed 4-space indentation.
#[derive(Default)]
struct ShellWriter {
    out: String,
    level: usize,
}

impl ShellWriter {
    fn line(&mut self, text: impl AsRef<str>) {
        for _ in 0..self.level {
            self.out.push_str("    ");
        }
        self.out.push_str(text.as_ref());
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn indent(&mut self) {
        self.level += 1;
    }

    fn dedent(&mut self) {
        self.level = self.level.saturating_sub(1);
    }

    fn finish(self) -> String {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::tree::{CommandNode, OptionSpec};

    fn tree() -> CommandNode {
        CommandNode::new("devcli")
            .with_option(OptionSpec::flag(["-v", "--verbose"]))
            .with_subcommand(
                CommandNode::new("dev").with_subcommand(
                    CommandNode::new("format")
                        .with_option(OptionSpec::flag(["--check"]))
                        .with_option(OptionSpec::flag(["--fix"])),
                ),
            )
            .with_subcommand(CommandNode::new("package").with_subcommand(
                CommandNode::new("list").with_option(OptionSpec::choice(
                    ["--format"],
                    ["table", "json", "yaml"],
                )),
            ))
    }

    fn render(t: &CommandNode) -> String {
        BashBackend.render(&CompletionPlan::compile("devcli", t))
    }

    #[test]
    fn header_and_registration() {
        let s = render(&tree());
        assert!(s.starts_with("#!/bin/bash\n"));
        assert!(s.contains("export _devcli_completions_loaded=1"));
        assert!(s.contains("_devcli_completions() {"));
        assert!(s.contains("if [[ $- == *i* ]]; then"));
        assert!(s.contains("complete -F _devcli_completions devcli"));
        assert!(s.contains("autoload -U +X bashcompinit && bashcompinit"));
        assert!(s.ends_with("fi\n"));
    }

    #[test]
    fn dispatch_uses_depth_indexed_state() {
        let s = render(&tree());
        assert!(s.contains("local sub_1='' idx_1=0"));
        assert!(s.contains("for ((i=idx_0+1; i < cword; i++)); do"));
        assert!(s.contains("dev|package)"));
        assert!(s.contains("for ((i=idx_1+1; i < cword; i++)); do"));
        assert!(s.contains("idx_2=$i"));
        assert!(!s.contains("idx_3"), "leaves do not open a new depth");
    }

    #[test]
    fn choices_rendered_for_long_option() {
        let s = render(&tree());
        assert!(s.contains("case \"${prev}\" in"));
        assert!(s.contains("--format)"));
        assert!(s.contains("compgen -W \"table json yaml\" -- \"${cur}\""));
    }

    #[test]
    fn leaf_offers_unused_options() {
        let s = render(&tree());
        assert!(s.contains("$(__devcli_unused_options --check --fix)"));
        assert!(s.contains("__devcli_unused_options() {"));
    }

    #[test]
    fn subcommands_keep_declaration_order() {
        let s = render(&tree());
        let dev = s.find(" dev)\n").unwrap();
        let package = s.find(" package)\n").unwrap();
        assert!(dev < package);
        assert!(s.contains("compgen -W \"dev package\""));
    }

    #[test]
    fn rendering_is_byte_identical() {
        assert_eq!(render(&tree()), render(&tree()));
    }

    #[test]
    fn program_name_sanitized_for_identifiers() {
        let s = BashBackend.render(&CompletionPlan::compile("my-cli", &tree()));
        assert!(s.contains("_my_cli_completions() {"));
        assert!(s.contains("complete -F _my_cli_completions my-cli"));
        assert_eq!(function_name("my-cli"), "_my_cli_completions");
        assert_eq!(function_name("dev.cli2"), "_dev_cli2_completions");
    }

    /// Source `script` in a real bash, fill COMP_WORDS / COMP_CWORD and
    /// return COMPREPLY. `None` when bash is not installed.
    #[cfg(unix)]
    fn bash_reply(
        script: &std::path::Path,
        typed: &[&str],
        incomplete: &str,
    ) -> Option<Vec<String>> {
        let words: Vec<String> = std::iter::once("devcli")
            .chain(typed.iter().copied())
            .chain(std::iter::once(incomplete))
            .map(|w| quote(w).into_owned())
            .collect();
        let driver = format!(
            "source {}\nCOMP_WORDS=({})\nCOMP_CWORD={}\n{}\nprintf '%s\\n' \"${{COMPREPLY[@]}}\"\n",
            quote(&script.to_string_lossy()),
            words.join(" "),
            words.len() - 1,
            function_name("devcli"),
        );
        let out = std::process::Command::new("bash")
            .args(["--noprofile", "--norc", "-c", &driver])
            .output()
            .ok()?;
        assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
        Some(
            String::from_utf8_lossy(&out.stdout)
                .lines()
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    #[cfg(unix)]
    #[test]
    fn sourced_script_agrees_with_plan() {
        let t = CommandNode::new("devcli")
            .with_option(OptionSpec::flag(["-v", "--verbose"]))
            .with_option(OptionSpec::flag(["--debug"]))
            .with_subcommand(
                CommandNode::new("dev")
                    .with_option(OptionSpec::flag(["--verbose"]))
                    .with_subcommand(
                        CommandNode::new("format")
                            .with_option(OptionSpec::flag(["--check"]))
                            .with_option(OptionSpec::flag(["--fix"])),
                    )
                    .with_subcommand(CommandNode::new("report").with_option(
                        OptionSpec::choice(["--format"], ["table", "json", "yaml"]),
                    )),
            )
            .with_subcommand(
                CommandNode::new("package").with_subcommand(CommandNode::new("list")),
            );
        let plan = CompletionPlan::compile("devcli", &t);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("completion.sh");
        std::fs::write(&path, BashBackend.render(&plan)).unwrap();

        let cases: &[(&[&str], &str)] = &[
            (&[], ""),
            (&[], "-"),
            (&["--debug", "dev", "--verbose", "report", "--format"], "y"),
            (&["dev", "--fix", "format"], "-"),
            (&["dev", "format", "--check"], "-"),
            (&["dev"], "--"),
            (&["package"], ""),
            (&["package", "list"], ""),
        ];
        for &(typed, incomplete) in cases {
            let Some(reply) = bash_reply(&path, typed, incomplete) else {
                eprintln!("bash not available; skipping");
                return;
            };
            assert_eq!(
                reply,
                plan.complete(typed, incomplete),
                "words {typed:?} + {incomplete:?}"
            );
        }
        assert_eq!(
            bash_reply(&path, &["dev", "format", "--check"], "-"),
            Some(vec!["--fix".to_string()])
        );
    }

    #[test]
    fn empty_option_list_clears_reply() {
        let t = CommandNode::new("devcli").with_subcommand(CommandNode::new("version"));
        let s = render(&t);
        assert!(s.contains("COMPREPLY=()"));
    }
}
