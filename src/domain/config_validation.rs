//! Configuration validation.
//!
//! Checks every `[backtest]`, `[strategy]` and `[report]` key before a run.
//! A key that is present but unparseable is an error rather than a silent
//! fallback to its default.

use crate::domain::error::SwingtraderError;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), SwingtraderError> {
    validate_initial_capital(config)?;
    validate_dates(config)?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), SwingtraderError> {
    for key in ["rsi_period", "ema_period", "macd_fast", "macd_slow", "macd_signal"] {
        validate_period(config, key)?;
    }
    for key in ["target_gain", "stop_loss", "sizing_stop_loss"] {
        validate_positive(config, key)?;
    }
    validate_risk_per_trade(config)?;
    validate_rsi_oversold(config)?;
    validate_volume_surge(config)?;
    validate_bool(config, "strategy", "ema_trend_filter")?;
    Ok(())
}

pub fn validate_report_config(config: &dyn ConfigPort) -> Result<(), SwingtraderError> {
    for key in ["max_drawdown", "total_return", "final_equity"] {
        validate_bool(config, "report", key)?;
    }
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> SwingtraderError {
    SwingtraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

/// Parse `[section] key` as f64 if present.
fn parse_number(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<f64>, SwingtraderError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| invalid(section, key, format!("'{}' is not a number", raw))),
    }
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), SwingtraderError> {
    if let Some(value) = parse_number(config, "backtest", "initial_capital")? {
        if !(value.is_finite() && value > 0.0) {
            return Err(invalid(
                "backtest",
                "initial_capital",
                "initial_capital must be positive",
            ));
        }
    }
    Ok(())
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), SwingtraderError> {
    let start_str = config.get_string("backtest", "start_date");
    let end_str = config.get_string("backtest", "end_date");

    let start_date = parse_date(start_str.as_deref(), "start_date")?;
    let end_date = parse_date(end_str.as_deref(), "end_date")?;

    if start_date > end_date {
        return Err(invalid(
            "backtest",
            "start_date",
            "start_date must not be after end_date",
        ));
    }
    Ok(())
}

pub fn parse_date(value: Option<&str>, field: &str) -> Result<NaiveDate, SwingtraderError> {
    match value {
        None => Err(SwingtraderError::ConfigMissing {
            section: "backtest".to_string(),
            key: field.to_string(),
        }),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
            invalid(
                "backtest",
                field,
                format!("invalid {} format, expected YYYY-MM-DD", field),
            )
        }),
    }
}

fn validate_period(config: &dyn ConfigPort, key: &str) -> Result<(), SwingtraderError> {
    if let Some(raw) = config.get_string("strategy", key) {
        match raw.trim().parse::<i64>() {
            Ok(value) if value >= 1 => {}
            Ok(_) => return Err(invalid("strategy", key, format!("{key} must be at least 1"))),
            Err(_) => {
                return Err(invalid(
                    "strategy",
                    key,
                    format!("'{}' is not an integer", raw),
                ))
            }
        }
    }
    Ok(())
}

fn validate_positive(config: &dyn ConfigPort, key: &str) -> Result<(), SwingtraderError> {
    if let Some(value) = parse_number(config, "strategy", key)? {
        if !(value.is_finite() && value > 0.0) {
            return Err(invalid("strategy", key, format!("{key} must be positive")));
        }
    }
    Ok(())
}

fn validate_risk_per_trade(config: &dyn ConfigPort) -> Result<(), SwingtraderError> {
    if let Some(value) = parse_number(config, "strategy", "risk_per_trade")? {
        if !(value > 0.0 && value <= 1.0) {
            return Err(invalid(
                "strategy",
                "risk_per_trade",
                "risk_per_trade must be in (0, 1]",
            ));
        }
    }
    Ok(())
}

fn validate_rsi_oversold(config: &dyn ConfigPort) -> Result<(), SwingtraderError> {
    if let Some(value) = parse_number(config, "strategy", "rsi_oversold")? {
        if !(0.0..=100.0).contains(&value) {
            return Err(invalid(
                "strategy",
                "rsi_oversold",
                "rsi_oversold must be between 0 and 100",
            ));
        }
    }
    Ok(())
}

fn validate_volume_surge(config: &dyn ConfigPort) -> Result<(), SwingtraderError> {
    if let Some(value) = parse_number(config, "strategy", "volume_surge")? {
        if !(value.is_finite() && value >= 0.0) {
            return Err(invalid(
                "strategy",
                "volume_surge",
                "volume_surge must be non-negative",
            ));
        }
    }
    Ok(())
}

fn validate_bool(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<(), SwingtraderError> {
    if config.get_string(section, key).is_some()
        && config.get_bool(section, key, true) != config.get_bool(section, key, false)
    {
        return Err(invalid(section, key, "expected true or false"));
    }
    Ok(())
}
