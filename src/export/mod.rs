// src/export/mod.rs

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use csv::{ReaderBuilder, Writer};
use tracing::info;

use crate::dates;
use crate::filter::DateRange;
use crate::table::Table;

/// Serialize a table to CSV, column order preserved. Cells in `date_cols`
/// that parse as dates are re-formatted to `DD-MM-YYYY`; everything else is
/// written as-is.
pub fn write_csv(table: &Table, date_cols: &[usize], path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("creating CSV file {}", path.display()))?;
    write_csv_to(table, date_cols, Writer::from_writer(file))?;
    info!(path = %path.display(), rows = table.len(), "CSV exported");
    Ok(())
}

/// In-memory CSV bytes (the UI download path), UTF-8.
pub fn csv_bytes(table: &Table, date_cols: &[usize]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_csv_to(table, date_cols, Writer::from_writer(&mut buf))?;
    Ok(buf)
}

fn write_csv_to<W: std::io::Write>(
    table: &Table,
    date_cols: &[usize],
    mut w: Writer<W>,
) -> Result<()> {
    w.write_record(&table.headers).context("writing CSV header")?;
    for row in &table.rows {
        let rendered: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(col, cell)| {
                if date_cols.contains(&col) {
                    match dates::parse_cell(cell) {
                        Some(d) => dates::format_dmy(d),
                        None => cell.clone(),
                    }
                } else {
                    cell.clone()
                }
            })
            .collect();
        w.write_record(&rendered).context("writing CSV row")?;
    }
    w.flush().context("flushing CSV writer")?;
    Ok(())
}

/// Read a CSV file back into a table (round-trip checks, offline fixtures).
pub fn read_csv(path: &Path) -> Result<Table> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("opening CSV file {}", path.display()))?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV header")?
        .iter()
        .map(|h| h.to_string())
        .collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.context("reading CSV row")?;
        rows.push(record.iter().map(|c| c.to_string()).collect());
    }
    Ok(Table::new(headers, rows))
}

fn sanitize(part: &str) -> String {
    let cleaned: String = part
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "export".to_string()
    } else {
        cleaned
    }
}

/// Download name for a range-filtered export, e.g.
/// `running_contests_2024-01-15_to_2024-02-01.csv`.
pub fn range_filename(prefix: &str, range: &DateRange) -> String {
    format!(
        "{}_{}_to_{}.csv",
        sanitize(prefix),
        range.from.format("%Y-%m-%d"),
        range.to.format("%Y-%m-%d")
    )
}

/// Download name for a search export, e.g. `BZID-1304470286_history.csv`.
pub fn search_filename(query: &str) -> String {
    format!("{}_history.csv", sanitize(query))
}
