//! Daily price samples and per-instrument series.

use crate::domain::error::SimtraderError;
use chrono::NaiveDate;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceSample {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

#[derive(Debug, Clone)]
pub struct PriceSeries {
    pub code: String,
    pub samples: Vec<PriceSample>,
    pub date_index: HashMap<NaiveDate, usize>,
}

impl PriceSeries {
    pub fn new(code: String, mut samples: Vec<PriceSample>) -> Self {
        samples.sort_by_key(|s| s.date);
        let date_index = samples
            .iter()
            .enumerate()
            .map(|(i, sample)| (sample.date, i))
            .collect();
        Self {
            code,
            samples,
            date_index,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample at an absolute index. Negative or past-the-end indices fail.
    pub fn sample_at(&self, index: i64) -> Result<&PriceSample, SimtraderError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.samples.get(i))
            .ok_or_else(|| SimtraderError::IndexOutOfRange {
                code: self.code.clone(),
                index,
                len: self.samples.len(),
            })
    }

    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        self.date_index.get(&date).copied()
    }

    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date)),
            _ => None,
        }
    }
}

/// Price series for every loaded instrument, keyed by code.
#[derive(Debug, Clone, Default)]
pub struct PriceBook {
    series: HashMap<String, PriceSeries>,
}

impl PriceBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, series: PriceSeries) {
        self.series.insert(series.code.clone(), series);
    }

    pub fn series(&self, code: &str) -> Result<&PriceSeries, SimtraderError> {
        self.series.get(code).ok_or_else(|| SimtraderError::NoData {
            code: code.to_string(),
        })
    }

    pub fn sample_at(&self, code: &str, index: i64) -> Result<&PriceSample, SimtraderError> {
        self.series(code)?.sample_at(index)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

impl FromIterator<PriceSeries> for PriceBook {
    fn from_iter<I: IntoIterator<Item = PriceSeries>>(iter: I) -> Self {
        let mut book = PriceBook::new();
        for series in iter {
            book.insert(series);
        }
        book
    }
}
