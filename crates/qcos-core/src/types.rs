use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Classification of a single line in an edit script.
///
/// # Examples
///
/// ```
/// use qcos_core::DiffKind;
///
/// assert_eq!(DiffKind::Added.marker(), '+');
/// assert_eq!(format!("{}", DiffKind::Removed), "removed");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffKind {
    /// Present, unchanged, in both versions.
    Context,
    /// Present only in the modified version.
    Added,
    /// Present only in the original version.
    Removed,
}

impl DiffKind {
    /// The unified-diff marker for this kind: `' '`, `'+'` or `'-'`.
    pub fn marker(self) -> char {
        match self {
            DiffKind::Context => ' ',
            DiffKind::Added => '+',
            DiffKind::Removed => '-',
        }
    }

    /// Returns `true` for lines that belong to the original text.
    pub fn in_original(self) -> bool {
        !matches!(self, DiffKind::Added)
    }

    /// Returns `true` for lines that belong to the modified text.
    pub fn in_modified(self) -> bool {
        !matches!(self, DiffKind::Removed)
    }
}

impl fmt::Display for DiffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffKind::Context => write!(f, "context"),
            DiffKind::Added => write!(f, "added"),
            DiffKind::Removed => write!(f, "removed"),
        }
    }
}

/// One tagged line of an edit script. `text` never carries a line terminator.
///
/// # Examples
///
/// ```
/// use qcos_core::{DiffKind, DiffLine};
///
/// let line = DiffLine::added("let x = 1;");
/// assert_eq!(line.kind, DiffKind::Added);
/// assert_eq!(line.to_string(), "+let x = 1;");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffLine {
    /// How this line relates the two versions.
    pub kind: DiffKind,
    /// Line content.
    pub text: String,
}

impl DiffLine {
    pub fn new(kind: DiffKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn context(text: impl Into<String>) -> Self {
        Self::new(DiffKind::Context, text)
    }

    pub fn added(text: impl Into<String>) -> Self {
        Self::new(DiffKind::Added, text)
    }

    pub fn removed(text: impl Into<String>) -> Self {
        Self::new(DiffKind::Removed, text)
    }
}

impl fmt::Display for DiffLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.marker(), self.text)
    }
}

/// Ordered sequence of [`DiffLine`]s turning an original text into a modified one.
///
/// Dropping `added` lines and joining with `\n` gives back the original;
/// dropping `removed` lines gives back the modified text. Serializes as a
/// bare JSON array.
///
/// # Examples
///
/// ```
/// use qcos_core::{DiffLine, EditScript};
///
/// let script = EditScript::from(vec![
///     DiffLine::context("a"),
///     DiffLine::removed("b"),
///     DiffLine::added("x"),
/// ]);
/// assert_eq!(script.original_text(), "a\nb");
/// assert_eq!(script.modified_text(), "a\nx");
/// assert!(script.has_changes());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EditScript {
    lines: Vec<DiffLine>,
}

impl EditScript {
    pub fn lines(&self) -> &[DiffLine] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<DiffLine> {
        self.lines
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DiffLine> {
        self.lines.iter()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Returns `true` if any line is added or removed.
    pub fn has_changes(&self) -> bool {
        self.lines.iter().any(|l| l.kind != DiffKind::Context)
    }

    /// Rebuild the original text from `context` and `removed` lines.
    pub fn original_text(&self) -> String {
        self.join_where(DiffKind::in_original)
    }

    /// Rebuild the modified text from `context` and `added` lines.
    pub fn modified_text(&self) -> String {
        self.join_where(DiffKind::in_modified)
    }

    /// Count lines per kind.
    pub fn stats(&self) -> DiffStats {
        let mut stats = DiffStats::default();
        for line in &self.lines {
            match line.kind {
                DiffKind::Context => stats.context += 1,
                DiffKind::Added => stats.added += 1,
                DiffKind::Removed => stats.removed += 1,
            }
        }
        stats
    }

    fn join_where(&self, keep: impl Fn(DiffKind) -> bool) -> String {
        self.lines
            .iter()
            .filter(|l| keep(l.kind))
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl From<Vec<DiffLine>> for EditScript {
    fn from(lines: Vec<DiffLine>) -> Self {
        Self { lines }
    }
}

impl FromIterator<DiffLine> for EditScript {
    fn from_iter<I: IntoIterator<Item = DiffLine>>(iter: I) -> Self {
        Self {
            lines: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for EditScript {
    type Item = DiffLine;
    type IntoIter = std::vec::IntoIter<DiffLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.into_iter()
    }
}

impl<'a> IntoIterator for &'a EditScript {
    type Item = &'a DiffLine;
    type IntoIter = std::slice::Iter<'a, DiffLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}

/// Per-kind line counts of an [`EditScript`].
///
/// # Examples
///
/// ```
/// use qcos_core::DiffStats;
///
/// let stats = DiffStats { added: 2, removed: 1, context: 7 };
/// assert_eq!(stats.to_string(), "+2 -1 (7 unchanged)");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    /// Lines only in the modified text.
    pub added: usize,
    /// Lines only in the original text.
    pub removed: usize,
    /// Lines in both.
    pub context: usize,
}

impl fmt::Display for DiffStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "+{} -{} ({} unchanged)",
            self.added, self.removed, self.context
        )
    }
}

/// A contiguous window of an edit script with its unified-diff ranges.
///
/// Starts are 1-based. A side with zero lines reports the line *before*
/// the window as its start, matching `diff -u`.
///
/// # Examples
///
/// ```
/// use qcos_core::{DiffLine, Hunk};
///
/// let hunk = Hunk {
///     old_start: 1,
///     old_lines: 2,
///     new_start: 1,
///     new_lines: 2,
///     lines: vec![DiffLine::removed("b"), DiffLine::added("x")],
/// };
/// assert_eq!(hunk.header(), "@@ -1,2 +1,2 @@");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hunk {
    /// Starting line in the original text.
    pub old_start: usize,
    /// Number of original lines covered.
    pub old_lines: usize,
    /// Starting line in the modified text.
    pub new_start: usize,
    /// Number of modified lines covered.
    pub new_lines: usize,
    /// The tagged lines of this hunk.
    pub lines: Vec<DiffLine>,
}

impl Hunk {
    /// The `@@ -a,b +c,d @@` header line.
    pub fn header(&self) -> String {
        format!(
            "@@ -{},{} +{},{} @@",
            self.old_start, self.old_lines, self.new_start, self.new_lines
        )
    }
}

/// Output format for CLI subcommands.
///
/// Implements [`FromStr`] so it can be used directly with `clap` argument parsing.
///
/// # Examples
///
/// ```
/// use qcos_core::OutputFormat;
///
/// let fmt: OutputFormat = "json".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Json);
///
/// let fmt: OutputFormat = "md".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Markdown);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Text,
    /// Machine-readable JSON with camelCase keys.
    Json,
    /// Markdown-formatted output.
    Markdown,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EditScript {
        EditScript::from(vec![
            DiffLine::context("line1"),
            DiffLine::removed("line2"),
            DiffLine::added("lineX"),
            DiffLine::context("line3"),
        ])
    }

    #[test]
    fn output_format_from_str() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!(
            "markdown".parse::<OutputFormat>().unwrap(),
            OutputFormat::Markdown
        );
        assert!("sarif".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn output_format_default_is_text() {
        assert_eq!(OutputFormat::default(), OutputFormat::Text);
        assert_eq!(OutputFormat::Markdown.to_string(), "markdown");
    }

    #[test]
    fn diff_kind_markers() {
        assert_eq!(DiffKind::Context.marker(), ' ');
        assert_eq!(DiffKind::Added.marker(), '+');
        assert_eq!(DiffKind::Removed.marker(), '-');
    }

    #[test]
    fn diff_kind_serializes_lowercase() {
        let json = serde_json::to_string(&DiffKind::Removed).unwrap();
        assert_eq!(json, "\"removed\"");
        let kind: DiffKind = serde_json::from_str("\"context\"").unwrap();
        assert_eq!(kind, DiffKind::Context);
    }

    #[test]
    fn edit_script_rebuilds_both_sides() {
        let script = sample();
        assert_eq!(script.original_text(), "line1\nline2\nline3");
        assert_eq!(script.modified_text(), "line1\nlineX\nline3");
    }

    #[test]
    fn empty_script_rebuilds_empty_text() {
        let script = EditScript::default();
        assert!(script.is_empty());
        assert!(!script.has_changes());
        assert_eq!(script.original_text(), "");
        assert_eq!(script.modified_text(), "");
    }

    #[test]
    fn edit_script_serializes_as_array() {
        let json = serde_json::to_value(sample()).unwrap();
        let arr = json.as_array().unwrap();
        assert_eq!(arr.len(), 4);
        assert_eq!(arr[1]["kind"], "removed");
        assert_eq!(arr[1]["text"], "line2");
    }

    #[test]
    fn stats_count_each_kind() {
        let stats = sample().stats();
        assert_eq!(
            stats,
            DiffStats {
                added: 1,
                removed: 1,
                context: 2
            }
        );
    }

    #[test]
    fn hunk_serializes_camel_case() {
        let hunk = Hunk {
            old_start: 0,
            old_lines: 0,
            new_start: 1,
            new_lines: 1,
            lines: vec![DiffLine::added("x")],
        };
        let json = serde_json::to_value(&hunk).unwrap();
        assert!(json.get("oldStart").is_some());
        assert!(json.get("old_start").is_none());
        assert_eq!(hunk.header(), "@@ -0,0 +1,1 @@");
    }
}
