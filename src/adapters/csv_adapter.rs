//! CSV file data adapter.
//!
//! Layout of the data directory:
//!
//! - `instruments.csv` (or the configured name): `code,name`
//! - `<code>.csv`: `date,open,high,low,close,volume` with ISO dates

use crate::domain::error::SimtraderError;
use crate::domain::instrument::Instrument;
use crate::domain::price_series::PriceSample;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use log::info;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_INSTRUMENTS_FILE: &str = "instruments.csv";

pub struct CsvAdapter {
    base_path: PathBuf,
    instruments_file: String,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self {
            base_path,
            instruments_file: DEFAULT_INSTRUMENTS_FILE.to_string(),
        }
    }

    pub fn with_instruments_file(mut self, file: impl Into<String>) -> Self {
        self.instruments_file = file.into();
        self
    }

    fn prices_path(&self, code: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", code))
    }

    fn read(&self, path: &PathBuf) -> Result<String, SimtraderError> {
        fs::read_to_string(path).map_err(|e| SimtraderError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })
    }
}

fn field<'r>(record: &'r csv::StringRecord, i: usize, name: &str) -> Result<&'r str, SimtraderError> {
    record
        .get(i)
        .map(str::trim)
        .ok_or_else(|| SimtraderError::Data {
            reason: format!("missing {} column", name),
        })
}

fn parse_field<T>(record: &csv::StringRecord, i: usize, name: &str) -> Result<T, SimtraderError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    field(record, i, name)?
        .parse()
        .map_err(|e| SimtraderError::Data {
            reason: format!("invalid {} value: {}", name, e),
        })
}

impl DataPort for CsvAdapter {
    fn list_instruments(&self) -> Result<Vec<Instrument>, SimtraderError> {
        let path = self.base_path.join(&self.instruments_file);
        let content = self.read(&path)?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut instruments = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| SimtraderError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;
            let code = field(&record, 0, "code")?;
            let name = field(&record, 1, "name")?;
            instruments.push(Instrument::new(code, name));
        }

        info!("loaded {} instruments from {}", instruments.len(), path.display());
        Ok(instruments)
    }

    fn fetch_prices(&self, code: &str) -> Result<Vec<PriceSample>, SimtraderError> {
        let path = self.prices_path(code);
        let content = self.read(&path)?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut samples = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| SimtraderError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date = NaiveDate::parse_from_str(field(&record, 0, "date")?, "%Y-%m-%d")
                .map_err(|e| SimtraderError::Data {
                    reason: format!("invalid date format: {}", e),
                })?;

            samples.push(PriceSample {
                date,
                open: parse_field(&record, 1, "open")?,
                high: parse_field(&record, 2, "high")?,
                low: parse_field(&record, 3, "low")?,
                close: parse_field(&record, 4, "close")?,
                volume: parse_field(&record, 5, "volume")?,
            });
        }

        samples.sort_by_key(|s| s.date);
        Ok(samples)
    }
}
