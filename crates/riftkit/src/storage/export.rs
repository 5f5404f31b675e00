//! Export of tabular records.

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::{Error, Result};

/// A record that renders as one row of a table.
pub trait Tabular {
    fn headers() -> &'static [&'static str];
    fn row(&self) -> Vec<String>;
}

/// Common interface for file export formats.
pub trait ExportFormat {
    fn extension(&self) -> &'static str;

    fn format_rows<T: Tabular + Serialize>(&self, rows: &[T]) -> Result<String>;

    fn write<T: Tabular + Serialize, P: AsRef<Path>>(&self, path: P, rows: &[T]) -> Result<()> {
        fs::write(path, self.format_rows(rows)?)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CsvExporter;

impl ExportFormat for CsvExporter {
    fn extension(&self) -> &'static str {
        "csv"
    }

    fn format_rows<T: Tabular + Serialize>(&self, rows: &[T]) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(T::headers())?;
        for row in rows {
            writer.write_record(row.row())?;
        }
        let bytes = writer.into_inner().map_err(|e| Error::Io(e.into_error()))?;
        String::from_utf8(bytes).map_err(|e| Error::InvalidInput(e.to_string()))
    }
}

/// Pretty-printed JSON array of the records' serde representation.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExporter;

impl ExportFormat for JsonExporter {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn format_rows<T: Tabular + Serialize>(&self, rows: &[T]) -> Result<String> {
        Ok(serde_json::to_string_pretty(rows)?)
    }
}

/// Write `rows` to `path`, choosing the format from the file extension.
pub fn export_to_path<T: Tabular + Serialize, P: AsRef<Path>>(path: P, rows: &[T]) -> Result<()> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("csv") => CsvExporter.write(path, rows),
        Some("json") => JsonExporter.write(path, rows),
        _ => Err(Error::InvalidInput(format!(
            "unsupported export format: {} (use .csv or .json)",
            path.display()
        ))),
    }
}

/// Render rows as an aligned plain-text table.
pub fn format_table<T: Tabular>(rows: &[T]) -> String {
    let headers = T::headers();
    let cells: Vec<Vec<String>> = rows.iter().map(Tabular::row).collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &cells {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut output = render_line(headers.iter().copied(), &widths);
    output.push('\n');
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    output.push_str(&rule.join("  "));
    output.push('\n');
    for row in &cells {
        output.push_str(&render_line(row.iter().map(String::as_str), &widths));
        output.push('\n');
    }
    output
}

fn render_line<'a>(values: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let cells: Vec<String> = values
        .zip(widths)
        .map(|(v, w)| format!("{:<width$}", v, width = *w))
        .collect();
    cells.join("  ").trim_end().to_string()
}
