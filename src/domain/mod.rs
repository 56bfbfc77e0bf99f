//! Core domain types and logic.

pub mod value;
pub mod instrument;
pub mod price_series;
pub mod ledger;
pub mod builtins;
pub mod session;
pub mod market;
pub mod config_validation;
pub mod error;
