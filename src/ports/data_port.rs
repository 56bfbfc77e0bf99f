//! Data access port trait.

use crate::domain::error::SimtraderError;
use crate::domain::instrument::Instrument;
use crate::domain::price_series::PriceSample;

pub trait DataPort {
    /// Instruments in catalog order.
    fn list_instruments(&self) -> Result<Vec<Instrument>, SimtraderError>;

    /// Daily samples for one instrument, oldest first.
    fn fetch_prices(&self, code: &str) -> Result<Vec<PriceSample>, SimtraderError>;
}
