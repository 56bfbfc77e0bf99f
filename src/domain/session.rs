//! Simulation session: owns the per-run state and plays the role of the
//! simulation loop, moving the cursor and routing calls through the
//! provider chain.

use crate::domain::builtins::simulate::SimulateBuiltins;
use crate::domain::builtins::undefined::UndefinedBuiltins;
use crate::domain::builtins::{self, BuiltinProvider, Call, CallContext, Cursor};
use crate::domain::error::SimtraderError;
use crate::domain::instrument::InstrumentRegistry;
use crate::domain::ledger::{DuplicatePolicy, Ledger};
use crate::domain::price_series::PriceBook;
use crate::domain::value::Value;
use crate::ports::output_port::OutputSink;
use chrono::NaiveDate;
use std::path::PathBuf;

/// Settings for one simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub data_dir: PathBuf,
    pub instruments_file: String,
    pub policy: DuplicatePolicy,
    pub system: Option<String>,
    pub show_ledger: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Position {
    code: String,
    index: usize,
}

pub struct Session {
    registry: InstrumentRegistry,
    prices: PriceBook,
    builtins: SimulateBuiltins,
    fallback: Box<dyn BuiltinProvider>,
    position: Option<Position>,
}

impl Session {
    pub fn new(registry: InstrumentRegistry, prices: PriceBook, policy: DuplicatePolicy) -> Self {
        Self {
            registry,
            prices,
            builtins: SimulateBuiltins::new(Ledger::new(policy)),
            fallback: Box::new(UndefinedBuiltins),
            position: None,
        }
    }

    /// Provider asked for calls the simulation builtins do not handle.
    pub fn with_fallback(mut self, fallback: Box<dyn BuiltinProvider>) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn set_system(&mut self, system: impl Into<String>) {
        self.builtins.ledger_mut().set_system(system);
    }

    pub fn registry(&self) -> &InstrumentRegistry {
        &self.registry
    }

    pub fn prices(&self) -> &PriceBook {
        &self.prices
    }

    pub fn ledger(&self) -> &Ledger {
        self.builtins.ledger()
    }

    pub fn into_ledger(self) -> Ledger {
        self.builtins.into_ledger()
    }

    pub fn current(&self) -> Option<(&str, usize)> {
        self.position
            .as_ref()
            .map(|p| (p.code.as_str(), p.index))
    }

    pub fn set_cursor(&mut self, code: &str, index: usize) -> Result<(), SimtraderError> {
        self.registry.lookup(code)?;
        let series = self.prices.series(code)?;
        if index >= series.len() {
            return Err(SimtraderError::IndexOutOfRange {
                code: code.to_string(),
                index: index as i64,
                len: series.len(),
            });
        }
        self.position = Some(Position {
            code: code.to_string(),
            index,
        });
        Ok(())
    }

    /// Move the cursor to the sample dated `date` for `code`.
    pub fn seek(&mut self, code: &str, date: NaiveDate) -> Result<(), SimtraderError> {
        let index = self
            .prices
            .series(code)?
            .index_of(date)
            .ok_or_else(|| SimtraderError::DateNotFound {
                code: code.to_string(),
                date,
            })?;
        self.set_cursor(code, index)
    }

    pub fn invoke(
        &mut self,
        name: &str,
        args: &[Value],
        at: i64,
        ats: Option<&str>,
        sink: &mut dyn OutputSink,
    ) -> Result<Option<Value>, SimtraderError> {
        let call = Call {
            name,
            args,
            at,
            ats,
        };
        let cursor = match &self.position {
            Some(p) => Some(Cursor {
                instrument: self.registry.lookup(&p.code)?,
                index: p.index,
            }),
            None => None,
        };
        let ctx = CallContext {
            registry: &self.registry,
            prices: &self.prices,
            cursor,
        };
        builtins::dispatch(
            &mut [&mut self.builtins, self.fallback.as_mut()],
            &call,
            &ctx,
            sink,
        )
    }

    /// Walk every sample of `code` in date order, calling `f` with the
    /// cursor on each one. Stops at the first error.
    pub fn for_each_bar<F>(&mut self, code: &str, mut f: F) -> Result<(), SimtraderError>
    where
        F: FnMut(&mut Session) -> Result<(), SimtraderError>,
    {
        let len = self.prices.series(code)?.len();
        for index in 0..len {
            self.set_cursor(code, index)?;
            f(self)?;
        }
        Ok(())
    }
}
