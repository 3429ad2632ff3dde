/*!
shared.rs - external tool invocation shared by `dev` and `proj`.

  - run_tool      : spawn with inherited stdio, print `Running: ...`, return exit code
  - capture_tool  : spawn with captured stdout/stderr (for git queries etc.)
  - display_command : shell-quoted rendering of an invocation
  - exit_with     : forward a non-zero child exit code as our own
  - placeholder   : "Not yet implemented" report for stub commands

Both spawn helpers create a short-lived Tokio runtime and block on the
async variant; nothing else in the crate is async.
*/

use std::path::Path;
use std::process::Stdio;
use std::time::Instant;

use anyhow::{Context, Result};

use crate::log_debug;

/// Captured result of a finished tool.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
    pub elapsed_ms: u128,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// `cargo clippy --fix` -> "cargo clippy --fix" (with shell quoting where needed).
pub fn display_command(program: &str, args: &[&str]) -> String {
    shell_words::join(std::iter::once(program).chain(args.iter().copied()))
}

/// Run `program args` in `cwd`, inheriting stdio. Returns the exit code.
pub fn run_tool(cwd: &Path, program: &str, args: &[&str]) -> Result<i32> {
    println!("Running: {}", display_command(program, args));
    let rt = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    rt.block_on(run_tool_async(cwd, program, args))
}

pub async fn run_tool_async(cwd: &Path, program: &str, args: &[&str]) -> Result<i32> {
    let started = Instant::now();
    let status = tokio::process::Command::new(program)
        .args(args)
        .current_dir(cwd)
        .status()
        .await
        .with_context(|| format!("Failed to spawn '{program}' (is it installed?)"))?;
    log_debug!(
        "{} exited with {:?} after {} ms",
        program,
        status.code(),
        started.elapsed().as_millis()
    );
    // Killed by a signal: no code; report generic failure.
    Ok(status.code().unwrap_or(1))
}

/// Run `program args` in `cwd` with captured output.
pub fn capture_tool(cwd: &Path, program: &str, args: &[&str]) -> Result<ToolOutput> {
    let rt = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    rt.block_on(capture_tool_async(cwd, program, args))
}

pub async fn capture_tool_async(cwd: &Path, program: &str, args: &[&str]) -> Result<ToolOutput> {
    let started = Instant::now();
    let out = tokio::process::Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .output()
        .await
        .with_context(|| format!("Failed to spawn '{program}' (is it installed?)"))?;

    let output = ToolOutput {
        code: out.status.code().unwrap_or(1),
        stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
        elapsed_ms: started.elapsed().as_millis(),
    };
    log_debug!(
        "{} {:?} exited with {} after {} ms",
        program,
        args,
        output.code,
        output.elapsed_ms
    );
    Ok(output)
}

/// Exit the process with `code` unless it is 0.
pub fn exit_with(code: i32) -> Result<()> {
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

/// Report for commands that are declared but not implemented yet; echoes the
/// options the user supplied.
pub fn placeholder(title: &str, details: &[(&str, Option<String>)], footer: &str) {
    println!("{}", placeholder_text(title, details, footer));
}

fn placeholder_text(title: &str, details: &[(&str, Option<String>)], footer: &str) -> String {
    let mut out = format!("{title}: Not yet implemented");
    for (label, value) in details {
        if let Some(v) = value {
            out.push_str(&format!("\n  {label}: {v}"));
        }
    }
    out.push_str(&format!("\n\nThis is a placeholder for {footer}"));
    out
}

/// `Some("enabled")` when the flag is set.
pub fn enabled(flag: bool) -> Option<String> {
    flag.then(|| "enabled".to_string())
}

/* ---- Tests (basic) ---- */
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_plain_command() {
        assert_eq!(
            display_command("cargo", &["clippy", "--fix"]),
            "cargo clippy --fix"
        );
    }

    #[test]
    fn display_quotes_spaces() {
        assert_eq!(
            display_command("git", &["commit", "-m", "two words"]),
            "git commit -m 'two words'"
        );
    }

    #[cfg(unix)]
    #[test]
    fn capture_reports_exit_code_and_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let out = capture_tool(dir.path(), "sh", &["-c", "echo hi; exit 3"]).unwrap();
        assert_eq!(out.code, 3);
        assert_eq!(out.stdout.trim(), "hi");
        assert!(!out.success());
    }

    #[test]
    fn placeholder_echoes_supplied_options_only() {
        let text = placeholder_text(
            "Build all",
            &[
                ("Target platform", Some("linux".into())),
                ("Architecture", None),
                ("Force rebuild", enabled(true)),
                ("Debug build", enabled(false)),
            ],
            "future build functionality",
        );
        assert_eq!(
            text,
            "Build all: Not yet implemented\n  Target platform: linux\n  Force rebuild: enabled\n\nThis is a placeholder for future build functionality"
        );
    }

    #[test]
    fn missing_program_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = capture_tool(dir.path(), "devcli-no-such-tool", &[]).unwrap_err();
        assert!(err.to_string().contains("devcli-no-such-tool"));
    }
}
