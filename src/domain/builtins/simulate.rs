//! Simulation builtins: `CodeList`, `Print`, `PrintLog`, `Buy`, `Sell`.
//!
//! # Resolution order
//!
//! - No arguments: only `CodeList` is handled; the override is not checked.
//! - Otherwise the acting instrument is resolved first (current instrument
//!   or the `ats` override). An unknown override fails the call with
//!   `MissingInstrument` even when the name is not one of ours.
//! - Then `(name, arity)` selects a [`SimBuiltin`]; anything else is
//!   forwarded untouched, without reading price data.
//! - Dates always come from the cursor instrument's series at
//!   `index + at`. The override only supplies the code and name.
//!
//! Handlers return an [`Effect`]. The ledger mutation happens inside the
//! handler; the text is written to the sink only after the handler
//! succeeded, so a failed call emits nothing.

use super::{BuiltinProvider, Call, CallContext, Invocation};
use crate::domain::error::SimtraderError;
use crate::domain::instrument::{Instrument, InstrumentRegistry};
use crate::domain::ledger::{Ledger, LogEntry, Side};
use crate::domain::value::Value;
use crate::ports::output_port::OutputSink;
use chrono::NaiveDate;
use log::{debug, warn};

pub const NARRATION_DATE_FORMAT: &str = "%y/%m/%d";
pub const LINE_END: &str = "\r\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimBuiltin {
    CodeList,
    Print,
    PrintLog,
    Buy,
    Sell,
}

impl SimBuiltin {
    pub fn lookup(name: &str, arity: usize) -> Option<Self> {
        match (name, arity) {
            ("CodeList", 0) => Some(SimBuiltin::CodeList),
            ("Print", 1) => Some(SimBuiltin::Print),
            ("PrintLog", 1) => Some(SimBuiltin::PrintLog),
            ("Buy", 2) => Some(SimBuiltin::Buy),
            ("Sell", 2) => Some(SimBuiltin::Sell),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SimBuiltin::CodeList => "CodeList",
            SimBuiltin::Print => "Print",
            SimBuiltin::PrintLog => "PrintLog",
            SimBuiltin::Buy => "Buy",
            SimBuiltin::Sell => "Sell",
        }
    }

    pub fn arity(self) -> usize {
        match self {
            SimBuiltin::CodeList => 0,
            SimBuiltin::Print | SimBuiltin::PrintLog => 1,
            SimBuiltin::Buy | SimBuiltin::Sell => 2,
        }
    }
}

/// Result of a handled call: the value for the evaluator and the text
/// for the sink.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Effect {
    pub value: Option<Value>,
    pub text: Option<String>,
}

impl Effect {
    fn value(value: Value) -> Self {
        Self {
            value: Some(value),
            text: None,
        }
    }

    fn line(text: String) -> Self {
        Self {
            value: None,
            text: Some(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    Handled(Effect),
    Forward,
}

#[derive(Debug, Default)]
pub struct SimulateBuiltins {
    ledger: Ledger,
}

impl SimulateBuiltins {
    pub fn new(ledger: Ledger) -> Self {
        Self { ledger }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    pub fn into_ledger(self) -> Ledger {
        self.ledger
    }

    /// Run a call without touching a sink.
    pub fn evaluate(
        &mut self,
        call: &Call<'_>,
        ctx: &CallContext<'_>,
    ) -> Result<Dispatch, SimtraderError> {
        let acting = if call.args.is_empty() {
            None
        } else {
            acting_instrument(call, ctx)?
        };

        let Some(builtin) = SimBuiltin::lookup(call.name, call.arity()) else {
            return Ok(Dispatch::Forward);
        };
        debug!("{}({} args) at {:+}", builtin.name(), call.arity(), call.at);

        let effect = match builtin {
            SimBuiltin::CodeList => Effect::value(code_list(ctx.registry)),
            SimBuiltin::Print => print(builtin, &call.args[0], String::new())?,
            SimBuiltin::PrintLog => {
                let instrument = acting.ok_or(SimtraderError::NoCursor)?;
                let date = resolve_date(ctx, call.at)?;
                let prefix = format!(
                    "{} {} {} ",
                    instrument.code,
                    instrument.name,
                    date.format(NARRATION_DATE_FORMAT)
                );
                print(builtin, &call.args[0], prefix)?
            }
            SimBuiltin::Buy => self.trade(builtin, Side::Buy, call, ctx, acting)?,
            SimBuiltin::Sell => self.trade(builtin, Side::Sell, call, ctx, acting)?,
        };
        Ok(Dispatch::Handled(effect))
    }

    fn trade(
        &mut self,
        builtin: SimBuiltin,
        side: Side,
        call: &Call<'_>,
        ctx: &CallContext<'_>,
        acting: Option<&Instrument>,
    ) -> Result<Effect, SimtraderError> {
        let instrument = acting.ok_or(SimtraderError::NoCursor)?;
        let price = int_arg(builtin, call.args, 0)?;
        let quantity = int_arg(builtin, call.args, 1)?;
        let date = resolve_date(ctx, call.at)?;

        let entry = LogEntry {
            date,
            code: instrument.code.clone(),
            price,
            quantity,
            side,
        };
        if let Err(e) = self.ledger.add(entry) {
            warn!("{} {} on {} rejected: {}", builtin.name(), instrument.code, date, e);
            return Err(e);
        }

        Ok(Effect::line(format!(
            "{} {} {} {}円 {}株 {}{}",
            instrument.code,
            instrument.name,
            date.format(NARRATION_DATE_FORMAT),
            price,
            quantity,
            side.marker(),
            LINE_END
        )))
    }
}

impl BuiltinProvider for SimulateBuiltins {
    fn invoke(
        &mut self,
        call: &Call<'_>,
        ctx: &CallContext<'_>,
        sink: &mut dyn OutputSink,
    ) -> Result<Invocation, SimtraderError> {
        match self.evaluate(call, ctx)? {
            Dispatch::Handled(effect) => {
                if let Some(text) = &effect.text {
                    sink.append_text(text);
                }
                Ok(Invocation::Handled(effect.value))
            }
            Dispatch::Forward => Ok(Invocation::NotHandled),
        }
    }
}

fn acting_instrument<'a>(
    call: &Call<'_>,
    ctx: &CallContext<'a>,
) -> Result<Option<&'a Instrument>, SimtraderError> {
    match call.ats {
        Some(code) => ctx.registry.lookup(code).map(Some),
        None => Ok(ctx.cursor.map(|c| c.instrument)),
    }
}

/// Date of the cursor's own sample at `index + at`. An override changes
/// which instrument is named, never which day is simulated.
fn resolve_date(ctx: &CallContext<'_>, at: i64) -> Result<NaiveDate, SimtraderError> {
    let cursor = ctx.cursor.ok_or(SimtraderError::NoCursor)?;
    let code = &cursor.instrument.code;
    let base = cursor.index as i64;
    match base.checked_add(at) {
        Some(index) => Ok(ctx.prices.sample_at(code, index)?.date),
        None => Err(SimtraderError::IndexOutOfRange {
            code: code.clone(),
            index: base.saturating_add(at),
            len: ctx.prices.series(code)?.len(),
        }),
    }
}

fn code_list(registry: &InstrumentRegistry) -> Value {
    Value::Array(registry.codes().map(Value::from).collect())
}

fn print(builtin: SimBuiltin, arg: &Value, prefix: String) -> Result<Effect, SimtraderError> {
    if arg.is_array() {
        return Err(SimtraderError::WrongArgumentType {
            name: builtin.name().to_string(),
            position: 1,
        });
    }
    Ok(Effect::line(format!("{prefix}{arg}{LINE_END}")))
}

fn int_arg(builtin: SimBuiltin, args: &[Value], i: usize) -> Result<i64, SimtraderError> {
    args[i]
        .as_int()
        .ok_or_else(|| SimtraderError::WrongArgumentType {
            name: builtin.name().to_string(),
            position: i + 1,
        })
}
