use std::fs::{self, File};
use std::path::{Path, PathBuf};
use log::{error, info};

use crate::error::OutputError;
use crate::record::{JobRecord, COLUMNS};

/// Writes the job table to `path` as CSV, one row per record.
///
/// The table goes to a `.partial` sibling first and is renamed into place once
/// complete, so `path` never holds a half-written table.
pub fn write_records<P: AsRef<Path>>(path: P, records: &[JobRecord]) -> Result<(), OutputError> {
    let path = path.as_ref();
    let partial = partial_path(path);

    if let Err(e) = write_table(&partial, records) {
        error!("Failed to write {:?}: {}", partial, e);
        let _ = fs::remove_file(&partial);
        return Err(e);
    }

    fs::rename(&partial, path).map_err(|source| {
        let _ = fs::remove_file(&partial);
        OutputError::Io {
            path: path.display().to_string(),
            source,
        }
    })?;

    info!("Wrote {} job records to {:?}", records.len(), path);
    Ok(())
}

fn write_table(path: &Path, records: &[JobRecord]) -> Result<(), OutputError> {
    let file = File::create(path).map_err(|source| OutputError::Io {
        path: path.display().to_string(),
        source,
    })?;

    // Header written by hand so an empty batch still gets one.
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    csv_writer.write_record(COLUMNS)?;

    for record in records {
        csv_writer.serialize(record.row())?;
    }

    csv_writer.flush().map_err(|source| OutputError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(())
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    path.with_file_name(name)
}
