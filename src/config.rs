//! Configuration loader — merges env vars, .env file, and config.toml.

use std::path::Path;

use common::config::BotConfig;
use common::Error;

fn parse_positive_u64(raw: &str, env_name: &str) -> Result<u64, Error> {
    let parsed = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| Error::Config(format!("{env_name} must be an integer > 0")))?;
    if parsed == 0 {
        return Err(Error::Config(format!("{env_name} must be an integer > 0")));
    }
    Ok(parsed)
}

fn validate_config(config: &BotConfig) -> Result<(), Error> {
    let mut issues: Vec<String> = Vec::new();

    if config.data_dir.trim().is_empty() {
        issues.push("data_dir must not be empty".into());
    }
    if config.journal_dir.trim().is_empty() {
        issues.push("journal_dir must not be empty".into());
    }

    if config.engine.quote_window < 2 {
        issues.push("engine.quote_window must be >= 2".into());
    }
    if config.engine.prediction_history_limit == 0 {
        issues.push("engine.prediction_history_limit must be > 0".into());
    }
    if config.engine.certainty_lookback_days <= 0 {
        issues.push("engine.certainty_lookback_days must be > 0".into());
    }
    if !(0.0..=1.0).contains(&config.engine.default_certainty) {
        issues.push("engine.default_certainty must be in [0,1]".into());
    }
    if !(0.0..=1.0).contains(&config.engine.streak_clamp) {
        issues.push("engine.streak_clamp must be in [0,1]".into());
    }
    if config.engine.validity_days <= 0 {
        issues.push("engine.validity_days must be > 0".into());
    }

    if config.timing.generate_interval_secs == 0 {
        issues.push("timing.generate_interval_secs must be > 0".into());
    }
    if config.timing.validate_interval_secs == 0 {
        issues.push("timing.validate_interval_secs must be > 0".into());
    }
    if config.timing.heartbeat_interval_secs == 0 {
        issues.push("timing.heartbeat_interval_secs must be > 0".into());
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "Invalid config:\n - {}",
            issues.join("\n - ")
        )))
    }
}

/// Load bot configuration from environment and optional config file.
pub fn load_config() -> Result<BotConfig, Error> {
    // 1. Load .env file from project root or parent directories.
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {}", e);
    }

    // 2. Start with defaults.
    let mut config = BotConfig::default();

    // 3. Try loading config.toml if it exists.
    let config_path = Path::new("config.toml");
    if config_path.exists() {
        let contents = std::fs::read_to_string(config_path)
            .map_err(|e| Error::Config(format!("Failed to read config.toml: {}", e)))?;
        config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config.toml: {}", e)))?;
    }

    // 4. Override with environment variables (highest priority).
    if let Ok(dir) = std::env::var("PREDICTION_DATA_DIR") {
        config.data_dir = dir;
    }
    if let Ok(dir) = std::env::var("PREDICTION_JOURNAL_DIR") {
        config.journal_dir = dir;
    }
    if let Ok(raw) = std::env::var("PREDICTION_GENERATE_INTERVAL_SECS") {
        config.timing.generate_interval_secs =
            parse_positive_u64(&raw, "PREDICTION_GENERATE_INTERVAL_SECS")?;
    }
    if let Ok(raw) = std::env::var("PREDICTION_VALIDATE_INTERVAL_SECS") {
        config.timing.validate_interval_secs =
            parse_positive_u64(&raw, "PREDICTION_VALIDATE_INTERVAL_SECS")?;
    }

    validate_config(&config)?;

    Ok(config)
}
