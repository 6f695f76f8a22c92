use std::time::Duration;

use crate::limits::{DEFAULT_SWEEP_INTERVAL_SECS, MAX_EXPANSION_DAYS};

/// Tunables for an engine instance. `from_env` reads `TESSERA_*` variables,
/// falling back to the defaults for anything unset or unparsable.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Widest availability expansion accepted, in days (inclusive range).
    pub max_expansion_days: i64,
    /// Cadence of the completion sweep.
    pub sweep_interval: Duration,
    /// Prometheus exporter port, if metrics are exposed.
    pub metrics_port: Option<u16>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_expansion_days: MAX_EXPANSION_DAYS,
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
            metrics_port: None,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let max_expansion_days = std::env::var("TESSERA_MAX_EXPANSION_DAYS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_expansion_days);
        let sweep_interval_secs: u64 = std::env::var("TESSERA_SWEEP_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_SWEEP_INTERVAL_SECS);
        let metrics_port: Option<u16> = std::env::var("TESSERA_METRICS_PORT")
            .ok()
            .and_then(|s| s.parse().ok());
        Self {
            max_expansion_days,
            sweep_interval: Duration::from_secs(sweep_interval_secs),
            metrics_port,
        }
    }
}
