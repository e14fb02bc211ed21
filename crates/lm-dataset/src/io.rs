use std::fs::File;
use std::io;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::DatasetError;
use crate::table::SummaryTable;

/// Field separators of the tables this pipeline touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Comma,
    Semicolon,
    Tab,
}

impl Delimiter {
    pub fn byte(self) -> u8 {
        match self {
            Self::Comma => b',',
            Self::Semicolon => b';',
            Self::Tab => b'\t',
        }
    }

    /// Guess from the file extension: `.tsv` is tab-separated, anything
    /// else comma-separated.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("tsv") => Self::Tab,
            _ => Self::Comma,
        }
    }
}

/// Reads header-addressed rows. Columns absent from `T` are ignored.
pub fn read_rows<T, R>(reader: R, delimiter: Delimiter) -> Result<Vec<T>, DatasetError>
where
    T: DeserializeOwned,
    R: io::Read,
{
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter.byte())
        .flexible(true)
        .from_reader(reader);
    let mut out = Vec::new();
    for rec in rdr.deserialize() {
        out.push(rec?);
    }
    Ok(out)
}

pub fn read_rows_from_path<T>(path: &Path, delimiter: Delimiter) -> Result<Vec<T>, DatasetError>
where
    T: DeserializeOwned,
{
    let rows = read_rows(File::open(path)?, delimiter)?;
    tracing::debug!(path = %path.display(), rows = rows.len(), "table read");
    Ok(rows)
}

pub fn write_rows<T, W>(writer: W, rows: &[T]) -> Result<(), DatasetError>
where
    T: Serialize,
    W: io::Write,
{
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_rows_to_path<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), DatasetError> {
    write_rows(File::create(path)?, rows)?;
    tracing::debug!(path = %path.display(), rows = rows.len(), "table written");
    Ok(())
}

/// `object_date` first, then one column per category.
pub fn write_summary<W: io::Write>(writer: W, table: &SummaryTable) -> Result<(), DatasetError> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = Vec::with_capacity(table.categories.len() + 1);
    header.push("object_date");
    header.extend(table.categories.iter().map(String::as_str));
    wtr.write_record(&header)?;

    for (date, counts) in &table.rows {
        let mut record = Vec::with_capacity(counts.len() + 1);
        record.push(date.clone());
        record.extend(counts.iter().map(usize::to_string));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}
