//! CSV import provider.
//!
//! Reads `{dir}/{SYMBOL}.csv` with header `date,open,high,low,close,volume`.
//! Used for offline runs and as a deterministic fixture source in tests.

use super::canonicalize::canonicalize;
use super::provider::{DataError, DataProvider, DataSource, FetchResult};
use crate::domain::Bar;
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }

    /// Read every row of a CSV file into bars. Any malformed row fails the file.
    pub fn read_bars(path: &Path) -> Result<Vec<Bar>, DataError> {
        let mut reader = csv::Reader::from_path(path)
            .map_err(|e| DataError::Io(format!("{}: {e}", path.display())))?;

        reader
            .deserialize::<CsvRow>()
            .map(|row| -> Result<Bar, DataError> {
                let row = row.map_err(|e| {
                    DataError::ResponseFormatChanged(format!("{}: {e}", path.display()))
                })?;
                Ok(Bar {
                    date: row.date,
                    open: row.open,
                    high: row.high,
                    low: row.low,
                    close: row.close,
                    volume: row.volume,
                })
            })
            .collect()
    }
}

impl DataProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv_import"
    }

    fn fetch(&self, symbol: &str) -> Result<FetchResult, DataError> {
        let path = self.path_for(symbol);
        if !path.exists() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        let bars = Self::read_bars(&path)?;
        Ok(FetchResult {
            series: canonicalize(symbol, bars)?,
            source: DataSource::CsvImport,
        })
    }
}
