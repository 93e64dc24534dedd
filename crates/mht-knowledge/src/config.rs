//! `EngineConfig` loading.
//!
//! ```toml
//! conflict_threshold_pct = 5.0
//! compute_missing_scores = true
//! ```
//!
//! Every field is optional; an empty document yields the defaults.

use std::path::Path;

use mht_contracts::{
    config::EngineConfig,
    error::{MhtError, MhtResult},
};

/// Parse `s` as TOML engine configuration.
///
/// Returns `MhtError::ConfigError` if the TOML is malformed, names an
/// unknown key, or holds an out-of-range value.
pub fn engine_config_from_toml_str(s: &str) -> MhtResult<EngineConfig> {
    let config: EngineConfig = toml::from_str(s).map_err(|e| MhtError::ConfigError {
        reason: format!("failed to parse engine config TOML: {}", e),
    })?;
    validate(&config)?;
    Ok(config)
}

/// Read the file at `path` and parse it as engine configuration.
pub fn engine_config_from_file(path: &Path) -> MhtResult<EngineConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| MhtError::ConfigError {
        reason: format!("failed to read engine config '{}': {}", path.display(), e),
    })?;
    engine_config_from_toml_str(&contents)
}

fn validate(config: &EngineConfig) -> MhtResult<()> {
    let invalid = |reason: String| Err(MhtError::ConfigError { reason });

    let pct = config.conflict_threshold_pct;
    if pct.is_nan() || pct < 0.0 {
        return invalid(format!(
            "conflict_threshold_pct must be non-negative, got {pct}"
        ));
    }
    if !(0.0..=1.0).contains(&config.incomplete_data_confidence_factor) {
        return invalid(format!(
            "incomplete_data_confidence_factor must be within [0, 1], got {}",
            config.incomplete_data_confidence_factor
        ));
    }
    if config.max_saved_plans == 0 {
        return invalid("max_saved_plans must be at least 1".to_string());
    }
    Ok(())
}
