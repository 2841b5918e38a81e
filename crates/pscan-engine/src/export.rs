//! Result table export.
//!
//! Dispatches on the destination extension: `.csv` is comma separated,
//! `.txt`/`.tsv` and anything unrecognized are tab separated, `.xlsx` is
//! a workbook. `.xls` is not produced; the destination is rewritten to
//! `.xlsx` and the adjusted path returned so callers can report the real
//! file.

use std::path::{Path, PathBuf};

use pscan_types::Tabular;
use rust_xlsxwriter::{Workbook, XlsxError};

use crate::error::{QueryError, QueryResult};

/// Writes a result table to `path`, returning the path actually written.
///
/// # Errors
///
/// [`QueryError::ExportPath`] when the destination directory does not
/// exist, [`QueryError::PermissionDenied`] on access denial, and
/// [`QueryError::ExportWrite`] for any other write failure.
pub fn write_table<P: AsRef<Path>>(table: &dyn Tabular, path: P) -> QueryResult<PathBuf> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            return Err(QueryError::ExportPath {
                path: path.display().to_string(),
            });
        }
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "csv" => {
            write_delimited(table, path, b',')?;
            Ok(path.to_path_buf())
        }
        "xlsx" => {
            write_xlsx(table, path)?;
            Ok(path.to_path_buf())
        }
        // Legacy format: rewritten rather than produced
        "xls" => {
            let upgraded = path.with_extension("xlsx");
            write_xlsx(table, &upgraded)?;
            Ok(upgraded)
        }
        _ => {
            write_delimited(table, path, b'\t')?;
            Ok(path.to_path_buf())
        }
    }
}

fn write_delimited(table: &dyn Tabular, path: &Path, delimiter: u8) -> QueryResult<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .map_err(|e| export_csv_error(path, e))?;

    writer
        .write_record(table.column_names())
        .map_err(|e| export_csv_error(path, e))?;
    for row in table.rows() {
        writer
            .write_record(&row)
            .map_err(|e| export_csv_error(path, e))?;
    }
    writer.flush().map_err(|e| export_io_error(path, e))
}

fn write_xlsx(table: &dyn Tabular, path: &Path) -> QueryResult<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    for (col, name) in table.column_names().iter().enumerate() {
        sheet
            .write_string(0, col as u16, name)
            .map_err(|e| export_xlsx_error(path, e))?;
    }

    for (row_idx, row) in table.rows().iter().enumerate() {
        for (col, cell) in row.iter().enumerate() {
            if cell.is_empty() {
                continue;
            }
            let row_num = (row_idx + 1) as u32;
            // Numeric cells export as numbers so spreadsheets sort them
            if let Ok(value) = cell.parse::<f64>() {
                sheet
                    .write_number(row_num, col as u16, value)
                    .map_err(|e| export_xlsx_error(path, e))?;
            } else {
                sheet
                    .write_string(row_num, col as u16, cell)
                    .map_err(|e| export_xlsx_error(path, e))?;
            }
        }
    }

    workbook
        .save(path)
        .map_err(|e| export_xlsx_error(path, e))
}

fn export_io_error(path: &Path, err: std::io::Error) -> QueryError {
    match err.kind() {
        std::io::ErrorKind::PermissionDenied => QueryError::PermissionDenied {
            path: path.display().to_string(),
        },
        std::io::ErrorKind::NotFound => QueryError::ExportPath {
            path: path.display().to_string(),
        },
        _ => QueryError::ExportWrite {
            path: path.display().to_string(),
            source: err,
        },
    }
}

fn export_csv_error(path: &Path, err: csv::Error) -> QueryError {
    let detail = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(io_err) => export_io_error(path, io_err),
        _ => QueryError::ExportWrite {
            path: path.display().to_string(),
            source: std::io::Error::other(detail),
        },
    }
}

fn export_xlsx_error(path: &Path, err: XlsxError) -> QueryError {
    match err {
        XlsxError::IoError(io_err) => export_io_error(path, io_err),
        other => QueryError::ExportWrite {
            path: path.display().to_string(),
            source: std::io::Error::other(other.to_string()),
        },
    }
}
