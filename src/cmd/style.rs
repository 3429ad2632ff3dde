/*!
style.rs

Human-output helpers for `devcli` commands.

  - StyleOptions::detect() : NO_COLOR / NO_EMOJI / COLUMNS aware
  - color(role, text, &style)
  - emoji(tag, &style)
  - status(ok, text, &style) : "✔ text" / "✖ text" line
  - table(headers, rows, &style)
  - human_bytes(n)

Machine output (`--json`, `resolve`, `script`) must not go through these.
*/

use std::borrow::Cow;

#[derive(Debug, Clone)]
pub struct StyleOptions {
    pub use_color: bool,
    pub use_emoji: bool,
    pub term_width: usize,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self::detect()
    }
}

impl StyleOptions {
    pub fn detect() -> Self {
        let width = std::env::var("COLUMNS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .map(|w| w.clamp(40, 220))
            .unwrap_or(100);

        StyleOptions {
            use_color: std::env::var_os("NO_COLOR").is_none(),
            use_emoji: std::env::var_os("NO_EMOJI").is_none(),
            term_width: width,
        }
    }

    /// No color, no emoji; used by tests for stable output.
    pub fn plain() -> Self {
        StyleOptions {
            use_color: false,
            use_emoji: false,
            term_width: 100,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Role {
    Primary,
    Accent,
    Success,
    Warning,
    Error,
    Dim,
}

pub fn color(role: Role, text: impl AsRef<str>, style: &StyleOptions) -> String {
    if !style.use_color {
        return text.as_ref().to_string();
    }
    let code = match role {
        Role::Primary => "38;5;45",
        Role::Accent => "38;5;213",
        Role::Success => "38;5;82",
        Role::Warning => "38;5;214",
        Role::Error => "38;5;196",
        Role::Dim => "2",
    };
    format!("\x1b[{code}m{}\x1b[0m", text.as_ref())
}

pub fn emoji(tag: &str, style: &StyleOptions) -> &'static str {
    if !style.use_emoji {
        return "";
    }
    match tag {
        "success" => "✔",
        "error" => "✖",
        "warn" => "⚠",
        "info" => "ℹ",
        "sync" => "🔄",
        "search" => "🔍",
        _ => "",
    }
}

/// Single pass/fail line, e.g. `✔ Formatting`.
pub fn status(ok: bool, text: impl AsRef<str>, style: &StyleOptions) -> String {
    let (tag, role) = if ok {
        ("success", Role::Success)
    } else {
        ("error", Role::Error)
    };
    let mark = emoji(tag, style);
    let mark = if mark.is_empty() {
        if ok { "ok" } else { "FAIL" }
    } else {
        mark
    };
    format!("{} {}", color(role, mark, style), text.as_ref())
}

pub fn table(headers: &[&str], rows: &[Vec<String>], style: &StyleOptions) -> String {
    if headers.is_empty() {
        return String::new();
    }
    let col_count = headers.len();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(col_count) {
            widths[i] = widths[i].max(display_width(cell));
        }
    }

    // Shrink the widest column until the table fits.
    let total: usize = widths.iter().sum::<usize>() + (col_count - 1) * 2;
    if total > style.term_width {
        let overflow = total - style.term_width;
        if let Some((idx, _)) = widths.iter().enumerate().max_by_key(|(_, w)| **w) {
            widths[idx] = widths[idx].saturating_sub(overflow).max(2);
        }
    }

    let mut out = String::new();
    let header_line = headers
        .iter()
        .enumerate()
        .map(|(i, h)| pad_or_truncate(h, widths[i]))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(&color(Role::Accent, header_line.trim_end(), style));
    out.push('\n');

    let sep = widths
        .iter()
        .map(|w| "-".repeat(*w))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(&color(Role::Dim, sep, style));

    for row in rows {
        out.push('\n');
        let line = (0..col_count)
            .map(|c| pad_or_truncate(row.get(c).map(String::as_str).unwrap_or(""), widths[c]))
            .collect::<Vec<_>>()
            .join("  ");
        out.push_str(line.trim_end());
    }

    out
}

/// 1536 -> "1.5 KiB"
pub fn human_bytes(n: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = n as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{n} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

fn pad_or_truncate(s: &str, width: usize) -> String {
    let len = display_width(s);
    if len <= width {
        return format!("{s}{}", " ".repeat(width - len));
    }
    if width <= 1 {
        return "…".to_string();
    }
    let mut out: String = strip_ansi(s).chars().take(width - 1).collect();
    out.push('…');
    out
}

fn strip_ansi(s: &str) -> Cow<'_, str> {
    if !s.contains('\x1b') {
        return Cow::Borrowed(s);
    }
    let mut buf = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            // Skip up to and including the final letter of the CSI sequence.
            for n in chars.by_ref() {
                if n.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }
        buf.push(c);
    }
    Cow::Owned(buf)
}

fn display_width(s: &str) -> usize {
    strip_ansi(s).chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_aligns_columns() {
        let style = StyleOptions::plain();
        let t = table(
            &["#", "PATH"],
            &[
                vec!["1".into(), "dev".into()],
                vec!["2".into(), "dev.format".into()],
            ],
            &style,
        );
        let lines: Vec<_> = t.lines().collect();
        assert_eq!(lines[0], "#  PATH");
        assert_eq!(lines[1], "-  ----------");
        assert_eq!(lines[3], "2  dev.format");
    }

    #[test]
    fn status_without_emoji_uses_words() {
        let style = StyleOptions::plain();
        assert_eq!(status(true, "fine", &style), "ok fine");
        assert_eq!(status(false, "broken", &style), "FAIL broken");
    }

    #[test]
    fn strip_ansi_removes_csi() {
        assert_eq!(strip_ansi("\x1b[31mRED\x1b[0m"), "RED");
        assert_eq!(display_width("\x1b[1mab\x1b[0m"), 2);
    }

    #[test]
    fn human_bytes_units() {
        assert_eq!(human_bytes(512), "512 B");
        assert_eq!(human_bytes(1536), "1.5 KiB");
        assert_eq!(human_bytes(3 * 1024 * 1024), "3.0 MiB");
    }

    #[test]
    fn narrow_terminal_truncates() {
        let style = StyleOptions {
            term_width: 40,
            ..StyleOptions::plain()
        };
        let long = "x".repeat(80);
        let t = table(&["NAME"], &[vec![long]], &style);
        assert!(t.lines().nth(2).unwrap().ends_with('…'));
    }
}
