//! Domain error types.

use chrono::NaiveDate;

/// Failure of an arithmetic or ordering operation on script values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValueError {
    #[error("array operand in {op}")]
    ArrayOperand { op: &'static str },

    #[error("null operand in {op}")]
    NullOperand { op: &'static str },

    #[error("incompatible operands for {op}: {left} and {right}")]
    Incompatible {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },

    #[error("division by zero")]
    DivisionByZero,
}

/// Top-level error type for simtrader.
#[derive(Debug, thiserror::Error)]
pub enum SimtraderError {
    #[error("missing brand code {code}")]
    MissingInstrument { code: String },

    #[error("wrong type argument for {name}({position})")]
    WrongArgumentType { name: String, position: usize },

    #[error("undefined function {name} with {arity} argument(s)")]
    UndefinedFunction { name: String, arity: usize },

    #[error("trade already recorded for {code} on {date}")]
    DuplicateTrade { code: String, date: NaiveDate },

    #[error("duplicate brand code {code}")]
    DuplicateInstrument { code: String },

    #[error("price index {index} out of range for {code} ({len} samples)")]
    IndexOutOfRange { code: String, index: i64, len: usize },

    #[error("no price data for {code}")]
    NoData { code: String },

    #[error("no price sample for {code} on {date}")]
    DateNotFound { code: String, date: NaiveDate },

    #[error("no current instrument selected")]
    NoCursor,

    #[error("invalid date '{input}' (expected YYYY-MM-DD)")]
    InvalidDate { input: String },

    #[error(transparent)]
    Value(#[from] ValueError),

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&SimtraderError> for std::process::ExitCode {
    fn from(err: &SimtraderError) -> Self {
        let code: u8 = match err {
            SimtraderError::Io(_) => 1,
            SimtraderError::ConfigParse { .. }
            | SimtraderError::ConfigMissing { .. }
            | SimtraderError::ConfigInvalid { .. } => 2,
            SimtraderError::Data { .. }
            | SimtraderError::NoData { .. }
            | SimtraderError::DateNotFound { .. }
            | SimtraderError::DuplicateInstrument { .. } => 3,
            SimtraderError::MissingInstrument { .. }
            | SimtraderError::WrongArgumentType { .. }
            | SimtraderError::UndefinedFunction { .. }
            | SimtraderError::DuplicateTrade { .. }
            | SimtraderError::IndexOutOfRange { .. }
            | SimtraderError::NoCursor
            | SimtraderError::InvalidDate { .. }
            | SimtraderError::Value(_) => 4,
        };
        std::process::ExitCode::from(code)
    }
}
