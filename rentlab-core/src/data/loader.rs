//! CSV loading for rental contracts.
//!
//! Rows that fail validation are dropped with a warning and reported back in
//! the `LoadReport`; the load itself only fails when the file can't be read,
//! the header doesn't carry the required columns, or nothing survives.

use super::schema::{parse_row, DataFormatError, RawContractRow, COLUMNS};
use super::store::{LoadReport, RecordStore};
use crate::domain::ContractRecord;
use log::{debug, info, warn};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that abort a load.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read CSV header: {0}")]
    Header(#[source] csv::Error),

    #[error("missing required column '{canonical}' (or alias '{alias}')")]
    MissingColumn {
        canonical: &'static str,
        alias: &'static str,
    },

    #[error("no valid rows ({rejected} rejected)")]
    NoValidRows { rejected: usize },

    #[error("failed to write CSV: {0}")]
    Write(#[from] csv::Error),
}

/// Load and validate a contracts CSV file.
pub fn load_csv(path: impl AsRef<Path>) -> Result<LoadReport, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let report = read_csv(file)?;
    info!(
        "loaded {} contracts from {} ({} rejected, hash {})",
        report.accepted(),
        path.display(),
        report.rejected.len(),
        &report.store.dataset_hash()[..12]
    );
    Ok(report)
}

/// Load from any reader. The first line must be a header.
pub fn read_csv<R: Read>(reader: R) -> Result<LoadReport, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(reader);

    let headers = rdr.headers().map_err(LoadError::Header)?.clone();
    check_headers(&headers)?;

    let mut parsed: Vec<(usize, ContractRecord)> = Vec::new();
    let mut rejected: Vec<DataFormatError> = Vec::new();

    for (idx, result) in rdr.deserialize::<RawContractRow>().enumerate() {
        let row = idx + 1;
        let outcome = result
            .map_err(|e| DataFormatError::Malformed {
                row,
                message: e.to_string(),
            })
            .and_then(|raw| parse_row(row, &raw));
        match outcome {
            Ok(record) => parsed.push((row, record)),
            Err(e) => {
                warn!("dropping contract row: {e}");
                rejected.push(e);
            }
        }
    }

    let mut report = RecordStore::from_numbered(parsed);
    for e in &report.rejected {
        warn!("dropping contract row: {e}");
    }
    rejected.append(&mut report.rejected);
    rejected.sort_by_key(DataFormatError::row);
    report.rejected = rejected;

    if report.store.is_empty() {
        return Err(LoadError::NoValidRows {
            rejected: report.rejected.len(),
        });
    }
    debug!("csv parse complete: {} rows accepted", report.accepted());
    Ok(report)
}

fn check_headers(headers: &csv::StringRecord) -> Result<(), LoadError> {
    for &(canonical, alias) in COLUMNS {
        let present = headers.iter().any(|h| h == canonical || h == alias);
        if !present {
            return Err(LoadError::MissingColumn { canonical, alias });
        }
    }
    Ok(())
}

/// Write records with the canonical header.
pub fn write_csv<W: Write>(writer: W, records: &[ContractRecord]) -> Result<(), LoadError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for r in records {
        wtr.serialize(RawContractRow::from(r))?;
    }
    wtr.flush().map_err(|e| LoadError::Write(e.into()))?;
    Ok(())
}
