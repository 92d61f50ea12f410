//! Logger configuration loaded from a JSON file.

use crate::error::{Error, Result};
use crate::safety;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Line voltage assumed when none is configured.
pub const DEFAULT_LINE_VOLTAGE: f32 = 110.0;
/// Seconds between telemetry samples when none is configured.
pub const DEFAULT_INTERVAL_SECS: u64 = 10;

/// Settings for energy estimation and periodic logging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Estimated AC line voltage used for energy conversion.
    pub line_voltage: f32,
    /// Seconds between samples when logging repeatedly.
    pub interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            line_voltage: DEFAULT_LINE_VOLTAGE,
            interval_secs: DEFAULT_INTERVAL_SECS,
        }
    }
}

impl Config {
    /// Read a config file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("read {}: {e}", path.display())))?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| Error::Config(format!("parse {}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the settings are usable.
    pub fn validate(&self) -> Result<()> {
        safety::validate_line_voltage(self.line_voltage)?;
        if self.interval_secs == 0 {
            return Err(Error::OutOfRange {
                field: "interval_secs",
                value: "0".into(),
                min: "1".into(),
                max: u64::MAX.to_string(),
            });
        }
        Ok(())
    }
}
