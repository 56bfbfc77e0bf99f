//! Builtin-function providers.
//!
//! The evaluator hands every function call to an ordered chain of
//! providers. A provider either handles the call or answers
//! [`Invocation::NotHandled`], in which case the next one is asked.

pub mod simulate;
pub mod undefined;

use crate::domain::error::SimtraderError;
use crate::domain::instrument::{Instrument, InstrumentRegistry};
use crate::domain::price_series::PriceBook;
use crate::domain::value::Value;
use crate::ports::output_port::OutputSink;

/// One function-call expression as seen by a provider.
#[derive(Debug, Clone, Copy)]
pub struct Call<'a> {
    pub name: &'a str,
    pub args: &'a [Value],
    /// Sample offset from the current index (`@` with an integer).
    pub at: i64,
    /// Instrument override (`@` with a code).
    pub ats: Option<&'a str>,
}

impl<'a> Call<'a> {
    pub fn new(name: &'a str, args: &'a [Value]) -> Self {
        Self {
            name,
            args,
            at: 0,
            ats: None,
        }
    }

    pub fn at(mut self, offset: i64) -> Self {
        self.at = offset;
        self
    }

    pub fn on(mut self, code: &'a str) -> Self {
        self.ats = Some(code);
        self
    }

    pub fn arity(&self) -> usize {
        self.args.len()
    }
}

/// Where the simulation loop currently stands.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    pub instrument: &'a Instrument,
    pub index: usize,
}

/// Read-only state a call is evaluated against, threaded in per call.
#[derive(Debug, Clone, Copy)]
pub struct CallContext<'a> {
    pub registry: &'a InstrumentRegistry,
    pub prices: &'a PriceBook,
    pub cursor: Option<Cursor<'a>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    Handled(Option<Value>),
    NotHandled,
}

pub trait BuiltinProvider {
    fn invoke(
        &mut self,
        call: &Call<'_>,
        ctx: &CallContext<'_>,
        sink: &mut dyn OutputSink,
    ) -> Result<Invocation, SimtraderError>;
}

/// Ask each provider in turn; the first one that handles the call wins.
pub fn dispatch(
    providers: &mut [&mut dyn BuiltinProvider],
    call: &Call<'_>,
    ctx: &CallContext<'_>,
    sink: &mut dyn OutputSink,
) -> Result<Option<Value>, SimtraderError> {
    for provider in providers.iter_mut() {
        if let Invocation::Handled(value) = provider.invoke(call, ctx, sink)? {
            return Ok(value);
        }
    }
    Err(SimtraderError::UndefinedFunction {
        name: call.name.to_string(),
        arity: call.arity(),
    })
}
