use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::errors::SaverError;
use crate::models::ExportRow;

pub type CsvRow = [String; 3];

pub const FIELDNAMES: [&str; 3] = ["title", "url", "type"];

/// Row-at-a-time CSV sink: comma separated, minimal quoting, CRLF line endings.
pub struct SavedCsvWriter<W: Write> {
    inner: csv::Writer<W>,
}

impl<W: Write> SavedCsvWriter<W> {
    pub fn new(writer: W) -> Self {
        let inner = WriterBuilder::new()
            .delimiter(b',')
            .quote_style(QuoteStyle::Necessary)
            .terminator(Terminator::CRLF)
            .has_headers(false)
            .from_writer(writer);
        Self { inner }
    }

    pub fn write_header(&mut self) -> Result<(), SaverError> {
        self.write_record(&FIELDNAMES)
    }

    pub fn write_row(&mut self, row: &ExportRow) -> Result<(), SaverError> {
        self.write_record(&row.as_record())
    }

    pub fn into_inner(self) -> Result<W, SaverError> {
        self.inner
            .into_inner()
            .map_err(|err| SaverError::Io(err.into_error()))
    }

    fn write_record(&mut self, record: &[&str]) -> Result<(), SaverError> {
        self.inner.write_record(record)?;
        self.inner.flush()?;
        Ok(())
    }
}

/// Creates (or truncates) `path` for a fresh export.
pub fn create_export_file(path: &Path) -> Result<SavedCsvWriter<File>, SaverError> {
    let file = File::create(path)?;
    Ok(SavedCsvWriter::new(file))
}

/// Reads an export back, header excluded.
pub fn read_rows(path: &Path) -> Result<Vec<CsvRow>, SaverError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let field = |index: usize| record.get(index).unwrap_or_default().to_string();
        rows.push([field(0), field(1), field(2)]);
    }
    Ok(rows)
}
