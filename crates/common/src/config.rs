//! Bot configuration types.

use serde::{Deserialize, Serialize};

/// Top-level bot configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Directory holding the JSON data collections.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Directory for the append-only event journal.
    #[serde(default = "default_journal_dir")]
    pub journal_dir: String,

    /// Engine parameters.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Timing parameters (seconds) for the scheduled run mode.
    #[serde(default)]
    pub timing: TimingConfig,
}

/// Prediction engine parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// End-of-day quotes loaded per generator run.
    #[serde(default = "default_quote_window")]
    pub quote_window: usize,

    /// Most recent prior predictions considered by the certainty estimate.
    #[serde(default = "default_history_limit")]
    pub prediction_history_limit: usize,

    /// Lookback window (days) for the certainty estimate.
    #[serde(default = "default_lookback_days")]
    pub certainty_lookback_days: i64,

    /// Certainty when no prior track record exists (coin-flip prior).
    #[serde(default = "default_certainty")]
    pub default_certainty: f64,

    /// Ceiling applied to a perfect streak shorter than `min_streak`.
    #[serde(default = "default_streak_clamp")]
    pub streak_clamp: f64,

    /// Matching predictions needed before full confidence is allowed.
    #[serde(default = "default_min_streak")]
    pub min_streak: usize,

    /// Days a forecast remains open before it can be graded.
    #[serde(default = "default_validity_days")]
    pub validity_days: i64,
}

/// Intervals for the scheduled run mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Seconds between generator sweeps over all companies.
    #[serde(default = "default_generate_interval")]
    pub generate_interval_secs: u64,

    /// Seconds between validator sweeps.
    #[serde(default = "default_validate_interval")]
    pub validate_interval_secs: u64,

    /// Seconds between heartbeat log lines.
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_secs: u64,
}

fn default_data_dir() -> String {
    "data".into()
}
fn default_journal_dir() -> String {
    "journal".into()
}
fn default_quote_window() -> usize {
    7
}
fn default_history_limit() -> usize {
    100
}
fn default_lookback_days() -> i64 {
    30
}
fn default_certainty() -> f64 {
    0.5
}
fn default_streak_clamp() -> f64 {
    0.6
}
fn default_min_streak() -> usize {
    3
}
fn default_validity_days() -> i64 {
    1
}
fn default_generate_interval() -> u64 {
    3600
}
fn default_validate_interval() -> u64 {
    900
}
fn default_heartbeat_interval() -> u64 {
    30
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            journal_dir: default_journal_dir(),
            engine: EngineConfig::default(),
            timing: TimingConfig::default(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            quote_window: default_quote_window(),
            prediction_history_limit: default_history_limit(),
            certainty_lookback_days: default_lookback_days(),
            default_certainty: default_certainty(),
            streak_clamp: default_streak_clamp(),
            min_streak: default_min_streak(),
            validity_days: default_validity_days(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            generate_interval_secs: default_generate_interval(),
            validate_interval_secs: default_validate_interval(),
            heartbeat_interval_secs: default_heartbeat_interval(),
        }
    }
}
