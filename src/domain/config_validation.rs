//! Configuration validation.
//!
//! Validates all config fields before a session is built.

use crate::domain::error::SimtraderError;
use crate::domain::ledger::DuplicatePolicy;
use crate::ports::config_port::ConfigPort;

pub fn validate_session_config(config: &dyn ConfigPort) -> Result<(), SimtraderError> {
    validate_data_directory(config)?;
    validate_instruments_file(config)?;
    validate_duplicate_policy(config)?;
    validate_show_ledger(config)?;
    Ok(())
}

fn validate_data_directory(config: &dyn ConfigPort) -> Result<(), SimtraderError> {
    match config.get_string("data", "directory") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        Some(_) => Err(SimtraderError::ConfigInvalid {
            section: "data".to_string(),
            key: "directory".to_string(),
            reason: "directory must not be empty".to_string(),
        }),
        None => Err(SimtraderError::ConfigMissing {
            section: "data".to_string(),
            key: "directory".to_string(),
        }),
    }
}

fn validate_instruments_file(config: &dyn ConfigPort) -> Result<(), SimtraderError> {
    match config.get_string("data", "instruments") {
        Some(s) if s.trim().is_empty() => Err(SimtraderError::ConfigInvalid {
            section: "data".to_string(),
            key: "instruments".to_string(),
            reason: "instruments file name must not be empty".to_string(),
        }),
        _ => Ok(()),
    }
}

fn validate_duplicate_policy(config: &dyn ConfigPort) -> Result<(), SimtraderError> {
    if let Some(s) = config.get_string("ledger", "duplicate_policy") {
        s.parse::<DuplicatePolicy>()
            .map_err(|reason| SimtraderError::ConfigInvalid {
                section: "ledger".to_string(),
                key: "duplicate_policy".to_string(),
                reason,
            })?;
    }
    Ok(())
}

fn validate_show_ledger(config: &dyn ConfigPort) -> Result<(), SimtraderError> {
    if let Some(s) = config.get_string("output", "show_ledger") {
        // Same spellings FileConfigAdapter::get_bool accepts.
        let known = ["true", "yes", "1", "false", "no", "0"];
        if !known.contains(&s.trim().to_lowercase().as_str()) {
            return Err(SimtraderError::ConfigInvalid {
                section: "output".to_string(),
                key: "show_ledger".to_string(),
                reason: format!("expected a boolean, got '{}'", s),
            });
        }
    }
    Ok(())
}
