//! Concrete adapter implementations for ports.

pub mod console_output;
pub mod csv_adapter;
pub mod file_config_adapter;
