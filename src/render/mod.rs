// src/render/mod.rs
//
// Terminal presentation of a result set: a fixed-width table, per-row cards,
// and frequency-count listings. All of it is plain text written to one
// `String`; styling belongs to whatever hosts the output.

use std::fmt::Write;

use crate::table::Table;

/// Fixed-width text table with a header rule. Column widths fit the widest
/// cell; an empty result set renders as a single informational line, not an
/// error.
pub fn text_table(table: &Table) -> String {
    if table.is_empty() {
        return "(no rows)\n".to_string();
    }
    let widths: Vec<usize> = table
        .headers
        .iter()
        .enumerate()
        .map(|(col, h)| {
            table
                .rows
                .iter()
                .map(|r| r.get(col).map(|c| c.trim().chars().count()).unwrap_or(0))
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    render_row(&mut out, &table.headers, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    render_row(&mut out, &rule, &widths);
    for row in &table.rows {
        let cells: Vec<String> = row.iter().map(|c| c.trim().to_string()).collect();
        render_row(&mut out, &cells, &widths);
    }
    out
}

fn render_row<S: AsRef<str>>(out: &mut String, cells: &[S], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(c, w)| format!("{:<width$}", c.as_ref(), width = w))
        .collect();
    let _ = writeln!(out, "{}", line.join("  "));
}

/// Card view: one block per row, `Header: value` per line, empty cells
/// skipped. The original rendered these as styled HTML cards; the content is
/// the same.
pub fn cards(table: &Table) -> String {
    if table.is_empty() {
        return "(no rows)\n".to_string();
    }
    let mut out = String::new();
    for (i, row) in table.rows.iter().enumerate() {
        let _ = writeln!(out, "--- {} ---", i + 1);
        for (header, cell) in table.headers.iter().zip(row) {
            let cell = cell.trim();
            if cell.is_empty() {
                continue;
            }
            let _ = writeln!(out, "{}: {}", header.trim(), cell);
        }
        out.push('\n');
    }
    out
}

/// Frequency counts as `label  count` lines under a title.
pub fn counts(title: &str, pairs: &[(String, usize)]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", title);
    if pairs.is_empty() {
        let _ = writeln!(out, "  (none)");
        return out;
    }
    let width = pairs.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
    for (label, count) in pairs {
        let _ = writeln!(out, "  {:<width$}  {}", label, count, width = width);
    }
    out
}
