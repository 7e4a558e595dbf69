use pretty_assertions::assert_eq;
use proptest::prelude::*;
use qcos_core::{DiffKind, DiffLine};
use qcos_difflens::{compute_diff, compute_diff_lines, render::hunks};

// Small alphabet so that generated documents share lines often.
fn document() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(vec!["a", "b", "c", "", "{", "}"]), 0..12)
        .prop_map(|lines| lines.join("\n"))
}

proptest! {
    #[test]
    fn reconstructs_both_inputs(original in document(), modified in document()) {
        let script = compute_diff(&original, &modified);
        prop_assert_eq!(script.original_text(), original);
        prop_assert_eq!(script.modified_text(), modified);
    }

    #[test]
    fn identity_is_all_context(text in document()) {
        let script = compute_diff(&text, &text);
        prop_assert!(script.iter().all(|l| l.kind == DiffKind::Context));
        prop_assert_eq!(script.original_text(), text);
    }

    #[test]
    fn deterministic(original in document(), modified in document()) {
        prop_assert_eq!(
            compute_diff(&original, &modified),
            compute_diff(&original, &modified)
        );
    }

    #[test]
    fn hunks_cover_every_change(original in document(), modified in document(), context in 0usize..4) {
        let script = compute_diff(&original, &modified);
        let changed = script.iter().filter(|l| l.kind != DiffKind::Context).count();
        let in_hunks: usize = hunks(&script, context)
            .iter()
            .map(|h| h.lines.iter().filter(|l| l.kind != DiffKind::Context).count())
            .sum();
        prop_assert_eq!(changed, in_hunks);
    }
}

#[test]
fn script_length_is_minimal() {
    // |script| = m + n - |LCS|; for these inputs the LCS is "b c".
    let script = compute_diff_lines(&["a", "b", "c", "d"], &["b", "x", "c"]);
    let stats = script.stats();
    assert_eq!(stats.context, 2);
    assert_eq!(stats.added + stats.removed, 3);
}

#[test]
fn no_shared_lines_is_total_replacement() {
    let script = compute_diff("alpha\nbeta", "gamma\ndelta\nepsilon");
    assert_eq!(
        script.into_lines(),
        vec![
            DiffLine::removed("alpha"),
            DiffLine::removed("beta"),
            DiffLine::added("gamma"),
            DiffLine::added("delta"),
            DiffLine::added("epsilon"),
        ]
    );
}

#[test]
fn source_file_edit() {
    let original = "\
import React from 'react';

const Panel = () => {
  return <div>QCOS</div>;
};

export default Panel;";
    let modified = "\
import React from 'react';

const Panel = () => {
  const title = 'QCOS v3.11';
  return <div>{title}</div>;
};

export default Panel;";

    let script = compute_diff(original, modified);
    assert_eq!(
        script.into_lines(),
        vec![
            DiffLine::context("import React from 'react';"),
            DiffLine::context(""),
            DiffLine::context("const Panel = () => {"),
            DiffLine::removed("  return <div>QCOS</div>;"),
            DiffLine::added("  const title = 'QCOS v3.11';"),
            DiffLine::added("  return <div>{title}</div>;"),
            DiffLine::context("};"),
            DiffLine::context(""),
            DiffLine::context("export default Panel;"),
        ]
    );
}
