//! # Plain-text report tables
//!
//! One table per thread (plus a CUMULATIVE table when more than one thread
//! reported), per frame bucket. Tree-mode rows are indented with box-drawing
//! branches; times are milliseconds with two decimals. An empty aggregation
//! produces no output for that scope.

use std::io::{self, Write};

use crate::analysis::{
    leaf_name, AggregateEntry, AggregateNode, Aggregation, ProfileReport, ScopeReport,
};

const NUMERIC_HEADERS: [&str; 9] = [
    "INCLUSIVE", "EXCLUSIVE", "  CALLS  ", " INC_MIN ", " INC_MAX ", " INC_MEAN",
    " EXC_MIN ", " EXC_MAX ", " EXC_MEAN",
];
const NUMERIC_WIDTH: usize = 10;

/// Render a full report pass.
pub fn render<W: Write>(out: &mut W, report: &ProfileReport, title: &str) -> io::Result<()> {
    if report.is_empty() {
        return Ok(());
    }
    writeln!(out, "Perf report: {title}")?;

    for scope in &report.frames {
        if let Some(frame) = scope.frame {
            writeln!(out)?;
            writeln!(out, "==============================")?;
            writeln!(out, "{frame}")?;
            writeln!(out, "==============================")?;
        }
        render_scope(out, scope)?;
    }

    if let Some(combined) = &report.combined {
        writeln!(out)?;
        writeln!(out, "==============================")?;
        writeln!(out, "All frames")?;
        writeln!(out, "==============================")?;
        render_scope(out, combined)?;
    }

    Ok(())
}

fn render_scope<W: Write>(out: &mut W, scope: &ScopeReport) -> io::Result<()> {
    for thread in &scope.threads {
        render_table(out, &thread.thread_id.to_string(), &thread.aggregation)?;
    }
    if scope.threads.len() > 1 {
        render_table(out, "CUMULATIVE", &scope.cumulative)?;
    }
    render_annotations(out, scope)?;
    Ok(())
}

/// One row: display label plus the entry it shows.
type Row<'a> = (String, &'a AggregateEntry);

fn render_table<W: Write>(out: &mut W, label: &str, aggregation: &Aggregation) -> io::Result<()> {
    if aggregation.is_empty() {
        return Ok(());
    }

    let mut rows: Vec<Row<'_>> = Vec::new();
    match aggregation {
        Aggregation::Tree(nodes) => collect_tree_rows(nodes, &mut rows),
        Aggregation::Flat(entries) => {
            rows.extend(entries.iter().map(|e| (e.key.clone(), e)));
        }
    }

    let width = rows
        .iter()
        .map(|(label, _)| label.chars().count())
        .chain(std::iter::once(label.chars().count()))
        .max()
        .unwrap_or(0);

    let cell = NUMERIC_WIDTH;
    let rule = horizontal_rule(width);
    writeln!(out)?;
    writeln!(out, "{rule}")?;
    write!(out, "| {label:<width$} |")?;
    for header in NUMERIC_HEADERS {
        write!(out, " {header:^cell$} |")?;
    }
    writeln!(out)?;
    writeln!(out, "{rule}")?;

    for (row_label, entry) in &rows {
        write!(out, "| {row_label:<width$} |")?;
        for value in [entry.inclusive_sum, entry.exclusive_sum] {
            write!(out, " {:>cell$} |", format_ms(value))?;
        }
        write!(out, " {:>cell$} |", entry.count)?;
        for value in [
            entry.min_inclusive,
            entry.max_inclusive,
            entry.mean_inclusive(),
            entry.min_exclusive,
            entry.max_exclusive,
            entry.mean_exclusive(),
        ] {
            write!(out, " {:>cell$} |", format_ms(value))?;
        }
        writeln!(out)?;
    }

    writeln!(out, "{rule}")
}

/// Depth-first traversal, siblings already in emission order. Iterative with
/// an explicit work stack so tree depth is bounded by the heap rather than
/// the thread stack.
fn collect_tree_rows<'a>(nodes: &'a [AggregateNode], rows: &mut Vec<Row<'a>>) {
    // (node, depth, last sibling); children pushed in reverse so they pop in
    // sibling order.
    let mut work: Vec<(&AggregateNode, usize, bool)> = Vec::new();
    let last = nodes.len().saturating_sub(1);
    for (i, node) in nodes.iter().enumerate().rev() {
        work.push((node, 0, i == last));
    }

    while let Some((node, depth, is_last)) = work.pop() {
        let label = if depth == 0 {
            node.entry.key.clone()
        } else {
            let indent = "   ".repeat(depth - 1);
            let branch = if is_last { "\u{2514}\u{2500} " } else { "\u{251c}\u{2500} " };
            format!("{indent}{branch}{}", leaf_name(&node.entry.key))
        };
        rows.push((label, &node.entry));

        let last = node.children.len().saturating_sub(1);
        for (i, child) in node.children.iter().enumerate().rev() {
            work.push((child, depth + 1, i == last));
        }
    }
}

fn render_annotations<W: Write>(out: &mut W, scope: &ScopeReport) -> io::Result<()> {
    if scope.annotations.is_empty() {
        return Ok(());
    }
    writeln!(out)?;
    writeln!(out, "Notes:")?;
    for note in &scope.annotations {
        writeln!(
            out,
            "  At {} ms [{}]: {}",
            format_ms(note.timestamp),
            note.thread_id,
            note.text
        )?;
    }
    Ok(())
}

fn horizontal_rule(label_width: usize) -> String {
    let mut rule = format!("+={}=+", "=".repeat(label_width));
    for _ in NUMERIC_HEADERS {
        rule.push_str(&"=".repeat(NUMERIC_WIDTH + 2));
        rule.push('+');
    }
    rule
}

/// Seconds rendered as milliseconds with two decimals.
fn format_ms(seconds: f64) -> String {
    format!("{:.2}", seconds * 1000.0)
}
