//! Terminal provider placed at the end of a chain.

use super::{BuiltinProvider, Call, CallContext, Invocation};
use crate::domain::error::SimtraderError;
use crate::ports::output_port::OutputSink;
use log::debug;

/// Declines every call, so `dispatch` reports `UndefinedFunction`.
#[derive(Debug, Default, Clone, Copy)]
pub struct UndefinedBuiltins;

impl BuiltinProvider for UndefinedBuiltins {
    fn invoke(
        &mut self,
        call: &Call<'_>,
        _ctx: &CallContext<'_>,
        _sink: &mut dyn OutputSink,
    ) -> Result<Invocation, SimtraderError> {
        debug!("no provider for {}({} args)", call.name, call.arity());
        Ok(Invocation::NotHandled)
    }
}
