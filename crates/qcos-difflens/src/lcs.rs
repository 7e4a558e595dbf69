use qcos_core::{DiffLine, EditScript};

/// LCS table size above which [`LineDiffer`] logs a warning by default.
pub const DEFAULT_WARN_CELLS: usize = 4_000_000;

/// Split a document into lines on `\n`.
///
/// The empty string has zero lines. Anything else is split verbatim, so a
/// trailing newline yields a final empty line and joining the result with
/// `\n` always gives back the input.
///
/// # Examples
///
/// ```
/// use qcos_difflens::split_lines;
///
/// assert!(split_lines("").is_empty());
/// assert_eq!(split_lines("a\nb"), vec!["a", "b"]);
/// assert_eq!(split_lines("a\n"), vec!["a", ""]);
/// ```
pub fn split_lines(text: &str) -> Vec<&str> {
    if text.is_empty() {
        Vec::new()
    } else {
        text.split('\n').collect()
    }
}

/// Compute the line diff between `original` and `modified`.
///
/// Shorthand for [`LineDiffer::default().diff`](LineDiffer::diff).
///
/// # Examples
///
/// ```
/// use qcos_core::DiffLine;
/// use qcos_difflens::compute_diff;
///
/// let script = compute_diff("line1\nline2\nline3", "line1\nlineX\nline3");
/// assert_eq!(
///     script.lines(),
///     &[
///         DiffLine::context("line1"),
///         DiffLine::removed("line2"),
///         DiffLine::added("lineX"),
///         DiffLine::context("line3"),
///     ]
/// );
/// ```
pub fn compute_diff(original: &str, modified: &str) -> EditScript {
    LineDiffer::default().diff(original, modified)
}

/// Compute the line diff between two already-split line sequences.
pub fn compute_diff_lines<S: AsRef<str>>(original: &[S], modified: &[S]) -> EditScript {
    LineDiffer::default().diff_lines(original, modified)
}

/// Longest-common-subsequence line differ.
///
/// Builds the full `(m+1) x (n+1)` LCS table, so time and memory are
/// O(m·n). Tables larger than `warn_cells` still run but log a warning.
#[derive(Debug, Clone, Copy)]
pub struct LineDiffer {
    warn_cells: usize,
}

impl Default for LineDiffer {
    fn default() -> Self {
        Self {
            warn_cells: DEFAULT_WARN_CELLS,
        }
    }
}

impl LineDiffer {
    pub fn with_warn_cells(warn_cells: usize) -> Self {
        Self { warn_cells }
    }

    /// Diff two documents, splitting them with [`split_lines`].
    pub fn diff(&self, original: &str, modified: &str) -> EditScript {
        self.diff_lines(&split_lines(original), &split_lines(modified))
    }

    /// Diff two line sequences.
    ///
    /// The script is reconstructed by walking the table backwards from the
    /// bottom-right corner. When skipping a modified line and skipping an
    /// original line keep the same LCS length, the walk emits the addition
    /// first; after reversal this puts removals before additions in every
    /// changed block.
    pub fn diff_lines<S: AsRef<str>>(&self, original: &[S], modified: &[S]) -> EditScript {
        let m = original.len();
        let n = modified.len();

        let cells = (m + 1).saturating_mul(n + 1);
        if cells > self.warn_cells {
            tracing::warn!(
                original_lines = m,
                modified_lines = n,
                cells,
                "large line diff; LCS table is quadratic in input size"
            );
        } else {
            tracing::debug!(original_lines = m, modified_lines = n, "computing line diff");
        }

        let table = LcsTable::build(original, modified);

        let mut lines = Vec::with_capacity(m + n);
        let (mut i, mut j) = (m, n);
        loop {
            if i > 0 && j > 0 && original[i - 1].as_ref() == modified[j - 1].as_ref() {
                lines.push(DiffLine::context(original[i - 1].as_ref()));
                i -= 1;
                j -= 1;
            } else if j > 0 && (i == 0 || table.get(i, j - 1) >= table.get(i - 1, j)) {
                lines.push(DiffLine::added(modified[j - 1].as_ref()));
                j -= 1;
            } else if i > 0 && (j == 0 || table.get(i, j - 1) < table.get(i - 1, j)) {
                lines.push(DiffLine::removed(original[i - 1].as_ref()));
                i -= 1;
            } else {
                break;
            }
        }
        lines.reverse();

        EditScript::from(lines)
    }
}

/// Row-major `(m+1) x (n+1)` table of LCS prefix lengths.
struct LcsTable {
    cols: usize,
    cells: Vec<usize>,
}

impl LcsTable {
    fn build<S: AsRef<str>>(original: &[S], modified: &[S]) -> Self {
        let rows = original.len() + 1;
        let cols = modified.len() + 1;
        let mut cells = vec![0usize; rows * cols];

        for i in 1..rows {
            for j in 1..cols {
                cells[i * cols + j] = if original[i - 1].as_ref() == modified[j - 1].as_ref() {
                    cells[(i - 1) * cols + (j - 1)] + 1
                } else {
                    cells[(i - 1) * cols + j].max(cells[i * cols + (j - 1)])
                };
            }
        }

        Self { cols, cells }
    }

    fn get(&self, i: usize, j: usize) -> usize {
        self.cells[i * self.cols + j]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qcos_core::DiffKind;

    fn kinds(script: &EditScript) -> Vec<DiffKind> {
        script.iter().map(|l| l.kind).collect()
    }

    #[test]
    fn seed_scenario() {
        let script = compute_diff("line1\nline2\nline3", "line1\nlineX\nline3");
        assert_eq!(
            script.into_lines(),
            vec![
                DiffLine::context("line1"),
                DiffLine::removed("line2"),
                DiffLine::added("lineX"),
                DiffLine::context("line3"),
            ]
        );
    }

    #[test]
    fn both_empty_gives_empty_script() {
        assert!(compute_diff("", "").is_empty());
    }

    #[test]
    fn empty_modified_removes_everything() {
        let script = compute_diff("a\nb", "");
        assert_eq!(
            script.into_lines(),
            vec![DiffLine::removed("a"), DiffLine::removed("b")]
        );
    }

    #[test]
    fn empty_original_adds_everything() {
        let script = compute_diff("", "a\nb");
        assert_eq!(
            script.into_lines(),
            vec![DiffLine::added("a"), DiffLine::added("b")]
        );
    }

    #[test]
    fn identical_inputs_are_all_context() {
        let text = "fn main() {\n    run();\n}\n";
        let script = compute_diff(text, text);
        assert_eq!(script.len(), 4);
        assert!(script.iter().all(|l| l.kind == DiffKind::Context));
        assert_eq!(script.original_text(), text);
    }

    #[test]
    fn minimal_single_substitution() {
        let script = compute_diff_lines(&["a", "b", "c"], &["a", "x", "c"]);
        let stats = script.stats();
        assert_eq!(stats.added, 1);
        assert_eq!(stats.removed, 1);
        assert_eq!(stats.context, 2);
        assert_eq!(
            kinds(&script),
            vec![
                DiffKind::Context,
                DiffKind::Removed,
                DiffKind::Added,
                DiffKind::Context
            ]
        );
    }

    #[test]
    fn total_replacement_removes_before_adding() {
        let script = compute_diff("a\nb\nc", "x\ny");
        assert_eq!(
            kinds(&script),
            vec![
                DiffKind::Removed,
                DiffKind::Removed,
                DiffKind::Removed,
                DiffKind::Added,
                DiffKind::Added
            ]
        );
        assert_eq!(script.original_text(), "a\nb\nc");
        assert_eq!(script.modified_text(), "x\ny");
    }

    #[test]
    fn pure_insertion_in_the_middle() {
        let script = compute_diff("a\nc", "a\nb\nc");
        assert_eq!(
            script.into_lines(),
            vec![
                DiffLine::context("a"),
                DiffLine::added("b"),
                DiffLine::context("c"),
            ]
        );
    }

    #[test]
    fn trailing_newline_change_is_one_line() {
        let script = compute_diff("a\nb", "a\nb\n");
        assert_eq!(
            script.into_lines(),
            vec![
                DiffLine::context("a"),
                DiffLine::context("b"),
                DiffLine::added(""),
            ]
        );
    }

    #[test]
    fn carriage_returns_are_line_content() {
        let script = compute_diff("a\r\nb", "a\nb");
        assert_eq!(script.stats().context, 1);
        assert_eq!(script.original_text(), "a\r\nb");
        assert_eq!(script.modified_text(), "a\nb");
    }

    #[test]
    fn repeated_calls_are_identical() {
        let a = "x\ny\nx\ny\nz";
        let b = "y\nx\nz\nx";
        assert_eq!(compute_diff(a, b), compute_diff(a, b));
    }

    #[test]
    fn lcs_table_lengths() {
        let table = LcsTable::build(&["a", "b", "c", "b"], &["b", "c", "b", "a"]);
        assert_eq!(table.get(4, 4), 3);
        assert_eq!(table.get(0, 4), 0);
        assert_eq!(table.get(1, 4), 1);
    }

    #[test]
    fn warn_threshold_does_not_change_result() {
        let quiet = LineDiffer::with_warn_cells(0).diff("a\nb", "b\nc");
        assert_eq!(quiet, compute_diff("a\nb", "b\nc"));
    }
}
