//! Human-readable dump of a recognition tree.
//!
//! Nodes are written in pre-order and separated by a dashed rule:
//!
//! ```text
//! n=5
//! (result of R-step: (0,3:4)0.35000000)
//! V=[0, 1, 2, 3]
//! total successes of this branch: 1
//! Matrix on 4 elements:
//!
//! 0    0.00000000  1.02000000 ...
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context;

use crate::config::{REPORT_PRECISION, REPORT_RULE_WIDTH};
use crate::recognition::{RecognitionNode, RecognitionTree};

fn write_node<W: Write>(out: &mut W, node: &RecognitionNode, include_matrices: bool) -> std::io::Result<()> {
    writeln!(out, "n={}", node.item_count())?;
    if let Some(step) = node.reduction_step() {
        writeln!(out, "(result of R-step: {step:.prec$})", prec = REPORT_PRECISION)?;
    }
    writeln!(out, "V={:?}", node.items())?;
    writeln!(out, "total successes of this branch: {}", node.success_count())?;

    if include_matrices {
        if let Some(matrix) = node.matrix() {
            write!(out, "Matrix on {} elements:", node.item_count())?;
            for (label, row) in node.items().iter().zip(matrix.rows()) {
                write!(out, "\n{label}  ")?;
                for value in row {
                    write!(out, "{value:12.prec$}", prec = REPORT_PRECISION)?;
                }
            }
            writeln!(out)?;
        }
    }

    // Expanded nodes whose children all failed further down carry no
    // reason of their own; the line is still written, empty.
    if node.success_count() == 0 {
        let reason = node.failure_reason().map_or("", |reason| reason.as_str());
        writeln!(out, "reason of abort: {reason}")?;
    }
    Ok(())
}

/// Write every node of `tree` to `out`.
pub fn write_report<W: Write>(
    tree: &RecognitionTree,
    out: &mut W,
    include_matrices: bool,
) -> std::io::Result<()> {
    let rule = "-".repeat(REPORT_RULE_WIDTH);
    for (i, id) in tree.preorder().into_iter().enumerate() {
        if i > 0 {
            write!(out, "\n{rule}\n")?;
        }
        write_node(out, tree.node(id), include_matrices)?;
    }
    Ok(())
}

/// Render the report into a string.
pub fn format_report(tree: &RecognitionTree, include_matrices: bool) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_report(tree, &mut buf, include_matrices);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Write the report to `path`.
pub fn save_report(path: &Path, tree: &RecognitionTree, include_matrices: bool) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create report '{}'", path.display()))?;
    let mut out = BufWriter::new(file);
    write_report(tree, &mut out, include_matrices)
        .and_then(|()| out.flush())
        .with_context(|| format!("failed to write report '{}'", path.display()))
}
