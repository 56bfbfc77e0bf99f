#![allow(dead_code)]

use chrono::NaiveDate;
use simtrader::domain::error::SimtraderError;
use simtrader::domain::instrument::{Instrument, InstrumentRegistry};
use simtrader::domain::ledger::DuplicatePolicy;
pub use simtrader::domain::price_series::PriceSample;
use simtrader::domain::price_series::{PriceBook, PriceSeries};
use simtrader::domain::session::Session;
use simtrader::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub instruments: Vec<Instrument>,
    pub prices: HashMap<String, Vec<PriceSample>>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            instruments: Vec::new(),
            prices: HashMap::new(),
        }
    }

    pub fn with_instrument(mut self, code: &str, name: &str, samples: Vec<PriceSample>) -> Self {
        self.instruments.push(Instrument::new(code, name));
        self.prices.insert(code.to_string(), samples);
        self
    }
}

impl DataPort for MockDataPort {
    fn list_instruments(&self) -> Result<Vec<Instrument>, SimtraderError> {
        Ok(self.instruments.clone())
    }

    fn fetch_prices(&self, code: &str) -> Result<Vec<PriceSample>, SimtraderError> {
        self.prices
            .get(code)
            .cloned()
            .ok_or_else(|| SimtraderError::Data {
                reason: format!("no prices for {code}"),
            })
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_sample(date_str: &str, close: f64) -> PriceSample {
    PriceSample {
        date: NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap(),
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        volume: 1000,
    }
}

/// Consecutive calendar days starting at `start_date`.
pub fn generate_samples(start_date: &str, count: usize, start_price: f64) -> Vec<PriceSample> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    (0..count)
        .map(|i| PriceSample {
            date: start + chrono::Duration::days(i as i64),
            open: start_price + i as f64,
            high: start_price + i as f64 + 1.0,
            low: start_price + i as f64 - 1.0,
            close: start_price + i as f64,
            volume: 1000,
        })
        .collect()
}

/// TOPIX ETF on 2013-07-04, 05, 08 plus a second instrument.
pub fn topix_session(policy: DuplicatePolicy) -> Session {
    let registry = InstrumentRegistry::from_instruments(vec![
        Instrument::new("1321", "TOPIX"),
        Instrument::new("7203", "トヨタ自動車"),
    ])
    .unwrap();
    let prices: PriceBook = vec![
        PriceSeries::new(
            "1321".into(),
            vec![
                make_sample("2013-07-04", 1480.0),
                make_sample("2013-07-05", 1490.0),
                make_sample("2013-07-08", 1500.0),
            ],
        ),
        PriceSeries::new("7203".into(), generate_samples("2013-07-01", 10, 6000.0)),
    ]
    .into_iter()
    .collect();
    Session::new(registry, prices, policy)
}
