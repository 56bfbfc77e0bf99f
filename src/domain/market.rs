//! Builds the per-run instrument registry and price book from a data port.
//!
//! Every listed instrument goes into the registry. Instruments whose price
//! data cannot be read, or is empty, are reported as skipped and have no
//! series in the book.

use crate::domain::error::SimtraderError;
use crate::domain::instrument::InstrumentRegistry;
use crate::domain::price_series::{PriceBook, PriceSeries};
use crate::ports::data_port::DataPort;
use log::{info, warn};

pub struct Market {
    pub registry: InstrumentRegistry,
    pub prices: PriceBook,
    pub skipped: Vec<SkippedCode>,
}

#[derive(Debug, Clone)]
pub struct SkippedCode {
    pub code: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Unreadable(String),
    NoSamples,
}

pub fn load_market(data_port: &dyn DataPort) -> Result<Market, SimtraderError> {
    let registry = InstrumentRegistry::from_instruments(data_port.list_instruments()?)?;
    let mut prices = PriceBook::new();
    let mut skipped = Vec::new();

    for code in registry.codes() {
        let samples = match data_port.fetch_prices(code) {
            Ok(samples) => samples,
            Err(e) => {
                warn!("skipping prices for {} ({})", code, e);
                skipped.push(SkippedCode {
                    code: code.to_string(),
                    reason: SkipReason::Unreadable(e.to_string()),
                });
                continue;
            }
        };

        if samples.is_empty() {
            warn!("skipping prices for {} (no samples)", code);
            skipped.push(SkippedCode {
                code: code.to_string(),
                reason: SkipReason::NoSamples,
            });
            continue;
        }

        prices.insert(PriceSeries::new(code.to_string(), samples));
    }

    info!(
        "loaded {} instruments, {} with prices",
        registry.len(),
        prices.len()
    );

    Ok(Market {
        registry,
        prices,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::instrument::Instrument;
    use crate::domain::price_series::PriceSample;
    use chrono::NaiveDate;

    struct StubPort {
        instruments: Vec<Instrument>,
    }

    impl DataPort for StubPort {
        fn list_instruments(&self) -> Result<Vec<Instrument>, SimtraderError> {
            Ok(self.instruments.clone())
        }

        fn fetch_prices(&self, code: &str) -> Result<Vec<PriceSample>, SimtraderError> {
            match code {
                "1321" => Ok(vec![PriceSample {
                    date: NaiveDate::from_ymd_opt(2013, 7, 8).unwrap(),
                    open: 1.0,
                    high: 1.0,
                    low: 1.0,
                    close: 1.0,
                    volume: 1,
                }]),
                "1001" => Ok(vec![]),
                _ => Err(SimtraderError::Data {
                    reason: "no file".into(),
                }),
            }
        }
    }

    #[test]
    fn load_market_skips_codes_without_prices() {
        let port = StubPort {
            instruments: vec![
                Instrument::new("1321", "TOPIX"),
                Instrument::new("1001", "日経平均"),
                Instrument::new("7203", "トヨタ自動車"),
            ],
        };
        let market = load_market(&port).unwrap();

        assert_eq!(market.registry.len(), 3);
        assert_eq!(market.prices.len(), 1);
        assert_eq!(market.skipped.len(), 2);
        assert_eq!(market.skipped[0].code, "1001");
        assert_eq!(market.skipped[0].reason, SkipReason::NoSamples);
        assert!(matches!(
            &market.skipped[1].reason,
            SkipReason::Unreadable(msg) if msg.contains("no file")
        ));
    }

    #[test]
    fn load_market_rejects_duplicate_codes() {
        let port = StubPort {
            instruments: vec![
                Instrument::new("1321", "TOPIX"),
                Instrument::new("1321", "TOPIX"),
            ],
        };
        assert!(matches!(
            load_market(&port),
            Err(SimtraderError::DuplicateInstrument { .. })
        ));
    }
}
