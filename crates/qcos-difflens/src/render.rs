use std::fmt::Write;

use qcos_core::{DiffKind, DiffLine, EditScript, Hunk};

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";
const RESET: &str = "\x1b[0m";

/// Group the changes of `script` into hunks with `context` unchanged lines
/// on each side.
///
/// Two changes end up in the same hunk when at most `2 * context` unchanged
/// lines separate them. A script without changes has no hunks.
///
/// # Examples
///
/// ```
/// use qcos_difflens::{compute_diff, render::hunks};
///
/// let script = compute_diff("a\nb\nc\nd\ne", "a\nb\nX\nd\ne");
/// let hunks = hunks(&script, 1);
/// assert_eq!(hunks.len(), 1);
/// assert_eq!(hunks[0].header(), "@@ -2,3 +2,3 @@");
/// ```
pub fn hunks(script: &EditScript, context: usize) -> Vec<Hunk> {
    let lines = script.lines();

    let mut ranges: Vec<(usize, usize)> = Vec::new();
    for (idx, line) in lines.iter().enumerate() {
        if line.kind == DiffKind::Context {
            continue;
        }
        let start = idx.saturating_sub(context);
        let end = (idx + context + 1).min(lines.len());
        match ranges.last_mut() {
            Some(last) if start <= last.1 => last.1 = end,
            _ => ranges.push((start, end)),
        }
    }

    // Lines of each side that precede index `i`.
    let mut old_before = Vec::with_capacity(lines.len() + 1);
    let mut new_before = Vec::with_capacity(lines.len() + 1);
    let (mut old_seen, mut new_seen) = (0usize, 0usize);
    for line in lines {
        old_before.push(old_seen);
        new_before.push(new_seen);
        if line.kind.in_original() {
            old_seen += 1;
        }
        if line.kind.in_modified() {
            new_seen += 1;
        }
    }
    old_before.push(old_seen);
    new_before.push(new_seen);

    ranges
        .into_iter()
        .map(|(start, end)| {
            let old_lines = old_before[end] - old_before[start];
            let new_lines = new_before[end] - new_before[start];
            Hunk {
                old_start: range_start(old_before[start], old_lines),
                old_lines,
                new_start: range_start(new_before[start], new_lines),
                new_lines,
                lines: lines[start..end].to_vec(),
            }
        })
        .collect()
}

fn range_start(preceding: usize, count: usize) -> usize {
    if count == 0 {
        preceding
    } else {
        preceding + 1
    }
}

/// Render every line of `script` with its `+`/`-`/` ` marker.
///
/// With `color`, added lines are green and removed lines red.
///
/// # Examples
///
/// ```
/// use qcos_difflens::{compute_diff, render::render_lines};
///
/// let out = render_lines(&compute_diff("a\nb", "a\nc"), false);
/// assert_eq!(out, " a\n-b\n+c\n");
/// ```
pub fn render_lines(script: &EditScript, color: bool) -> String {
    let mut out = String::new();
    for line in script {
        push_line(&mut out, line, color);
    }
    out
}

fn push_line(out: &mut String, line: &DiffLine, color: bool) {
    let paint = match line.kind {
        DiffKind::Added if color => Some(GREEN),
        DiffKind::Removed if color => Some(RED),
        _ => None,
    };
    match paint {
        Some(code) => {
            let _ = writeln!(out, "{code}{line}{RESET}");
        }
        None => {
            let _ = writeln!(out, "{line}");
        }
    }
}

/// Render `script` as a Markdown section with a fenced `diff` block.
pub fn render_markdown(script: &EditScript, title: &str) -> String {
    let stats = script.stats();
    let mut out = String::new();
    let _ = writeln!(out, "### {title}\n");
    let _ = writeln!(out, "**{}** added, **{}** removed\n", stats.added, stats.removed);
    out.push_str("```diff\n");
    out.push_str(&render_lines(script, false));
    out.push_str("```\n");
    out
}

/// Render `script` as a unified patch between `old_name` and `new_name`.
///
/// The patch describes the split-line model, so a trailing newline shows up
/// as a final empty line rather than a `\ No newline at end of file` marker.
/// Returns an empty string when the script has no changes.
///
/// # Examples
///
/// ```
/// use qcos_difflens::{compute_diff, render::render_patch};
///
/// let patch = render_patch(&compute_diff("a\nb", "a\nc"), "f.txt", "f.txt", 3, false);
/// assert!(patch.starts_with("--- a/f.txt\n+++ b/f.txt\n@@ -1,2 +1,2 @@\n"));
///
/// assert!(render_patch(&compute_diff("a", "a"), "f", "f", 3, false).is_empty());
/// ```
pub fn render_patch(
    script: &EditScript,
    old_name: &str,
    new_name: &str,
    context: usize,
    color: bool,
) -> String {
    if !script.has_changes() {
        return String::new();
    }

    let mut out = String::new();
    let _ = writeln!(out, "--- a/{old_name}");
    let _ = writeln!(out, "+++ b/{new_name}");
    for hunk in hunks(script, context) {
        if color {
            let _ = writeln!(out, "{CYAN}{}{RESET}", hunk.header());
        } else {
            let _ = writeln!(out, "{}", hunk.header());
        }
        for line in &hunk.lines {
            push_line(&mut out, line, color);
        }
    }
    out
}
