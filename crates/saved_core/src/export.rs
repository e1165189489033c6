use std::io::Write;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::client::Session;
use crate::csv_utils::{create_export_file, SavedCsvWriter};
use crate::errors::{ExportError, SaverError};
use crate::models::{ExportRow, SavedItem};

#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    pub target_file: PathBuf,
    /// Stop after this many saved items; `None` exports everything.
    pub limit: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct ExportResult {
    pub target_file: PathBuf,
    pub written: u64,
}

/// Streams the logged-in user's saved items into `options.target_file`.
///
/// The file is truncated first. On failure whatever was written so far is left in place.
pub fn export_saved(
    session: &Session,
    options: &ExportOptions,
) -> Result<ExportResult, ExportError> {
    let target_file = options.target_file.clone();
    let mut writer = create_export_file(&target_file).map_err(|err| {
        ExportError::from(err).context(format!("cannot open {}", target_file.display()))
    })?;
    info!("Writing results to {}", target_file.display());
    writer.write_header()?;

    let user = session.current_user()?;
    debug!("Exporting saved items of u/{}", user.name());
    let written = write_saved_items(&mut writer, user.saved(options.limit))?;
    writer.into_inner()?;

    Ok(ExportResult {
        target_file,
        written,
    })
}

/// Writes one row per item, in order, below a header the caller already wrote.
///
/// Stops at the first error without pulling any further items.
pub fn write_saved_items<W, I>(
    writer: &mut SavedCsvWriter<W>,
    items: I,
) -> Result<u64, SaverError>
where
    W: Write,
    I: IntoIterator<Item = Result<SavedItem, SaverError>>,
{
    let mut written: u64 = 0;
    for item in items {
        let item = item?;
        let row = ExportRow::from_item(&item)?;
        info!("{item} is a {}", row.kind);
        writer.write_row(&row)?;
        written += 1;
    }

    Ok(written)
}
