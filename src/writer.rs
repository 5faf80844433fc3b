//! Persisting result tables as CSV

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Writer, WriterBuilder};
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::info;

use crate::normalize::{EnrichmentResultRow, EnrichmentResultTable, COLUMNS};
use crate::{GoError, GoResult};

/// Summary of a written result file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReport {
    /// Path of the written file
    pub path: PathBuf,
    /// Number of data rows, without header
    pub rows: usize,
}

fn write_error(path: &Path, err: impl ToString) -> GoError {
    GoError::Write {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

/// Writes the complete `table` to `dir/file_name`
///
/// `dir` and all missing parents are created. An existing file is replaced.
/// The header is written even if the table is empty.
///
/// # Errors
///
/// [`GoError::Write`] if the folder or the file cannot be written
pub fn write_table<P: AsRef<Path>>(
    table: &EnrichmentResultTable,
    dir: P,
    file_name: &str,
) -> GoResult<WriteReport> {
    write_rows(table.rows(), &COLUMNS, dir.as_ref(), file_name)
}

/// Writes `header` and all `rows` to `dir/file_name`
///
/// The rows go to a temporary file in `dir` first, which replaces the
/// target only after everything was flushed. A failed write leaves an
/// existing file untouched.
pub(crate) fn write_rows<T: Serialize>(
    rows: &[T],
    header: &[&str],
    dir: &Path,
    file_name: &str,
) -> GoResult<WriteReport> {
    fs::create_dir_all(dir).map_err(|err| write_error(dir, err))?;
    let path = dir.join(file_name);

    let tmp = NamedTempFile::new_in(dir).map_err(|err| write_error(dir, err))?;
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(tmp);
    write_records(&mut wtr, header, rows).map_err(|err| write_error(&path, err))?;
    let tmp = wtr
        .into_inner()
        .map_err(|err| write_error(&path, err.error()))?;
    tmp.persist(&path)
        .map_err(|err| write_error(&path, err.error))?;

    info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(WriteReport {
        path,
        rows: rows.len(),
    })
}

fn write_records<W: Write, T: Serialize>(
    wtr: &mut Writer<W>,
    header: &[&str],
    rows: &[T],
) -> csv::Result<()> {
    wtr.write_record(header)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Reads a table that was written by [`write_table`]
///
/// # Errors
///
/// - [`GoError::FileNotFound`]: `path` does not exist
/// - [`GoError::InvalidInput`]: the file is not a result table
pub fn read_table<P: AsRef<Path>>(path: P) -> GoResult<EnrichmentResultTable> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(GoError::FileNotFound(path.display().to_string()));
    }
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let rows = rdr
        .deserialize::<EnrichmentResultRow>()
        .collect::<Result<Vec<_>, _>>()?;
    Ok(EnrichmentResultTable::from(rows))
}
