//! Instrument registry (brand list).
//!
//! Keeps instruments in load order, which is the order `CodeList` reports,
//! plus a code index for override lookups.

use crate::domain::error::SimtraderError;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instrument {
    pub code: String,
    pub name: String,
}

impl Instrument {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InstrumentRegistry {
    instruments: Vec<Instrument>,
    by_code: HashMap<String, usize>,
}

impl InstrumentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_instruments(
        instruments: impl IntoIterator<Item = Instrument>,
    ) -> Result<Self, SimtraderError> {
        let mut registry = Self::new();
        for instrument in instruments {
            registry.insert(instrument)?;
        }
        Ok(registry)
    }

    pub fn insert(&mut self, instrument: Instrument) -> Result<(), SimtraderError> {
        if self.by_code.contains_key(&instrument.code) {
            return Err(SimtraderError::DuplicateInstrument {
                code: instrument.code,
            });
        }
        self.by_code
            .insert(instrument.code.clone(), self.instruments.len());
        self.instruments.push(instrument);
        Ok(())
    }

    pub fn lookup(&self, code: &str) -> Result<&Instrument, SimtraderError> {
        self.by_code
            .get(code)
            .map(|&i| &self.instruments[i])
            .ok_or_else(|| SimtraderError::MissingInstrument {
                code: code.to_string(),
            })
    }

    pub fn contains(&self, code: &str) -> bool {
        self.by_code.contains_key(code)
    }

    pub fn all(&self) -> &[Instrument] {
        &self.instruments
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.instruments.iter().map(|i| i.code.as_str())
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}
