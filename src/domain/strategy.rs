//! Strategy parameters: indicator periods, entry rules, exits and sizing.
//!
//! `Default` reproduces the oversold-bounce strategy: RSI(14) < 30, rising
//! MACD(12,26,9) histogram, 10% volume surge; exit at +10% or -5%; risk 5%
//! of capital per trade against a 5% stop distance.

use crate::domain::error::SwingtraderError;
use crate::domain::indicator::IndicatorType;
use crate::domain::indicator::{ema, macd, rsi};

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyParams {
    pub rsi_period: usize,
    pub ema_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub entry: EntryRules,
    pub exit: ExitRules,
    pub sizing: SizingParams,
}

/// Thresholds consulted by the signal evaluator.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryRules {
    pub rsi_oversold: f64,
    pub volume_surge: f64,
    /// Require close above the EMA. Off unless explicitly enabled.
    pub ema_trend_filter: bool,
}

/// Fixed exit thresholds as fractions of the entry price.
#[derive(Debug, Clone, PartialEq)]
pub struct ExitRules {
    pub target_gain: f64,
    pub stop_loss: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SizingParams {
    /// Fraction of capital put at risk on each trade.
    pub risk_per_trade: f64,
    /// Assumed stop distance, as a fraction of price, used to turn the risk
    /// budget into a share count.
    pub stop_loss_pct: f64,
}

impl Default for EntryRules {
    fn default() -> Self {
        EntryRules {
            rsi_oversold: 30.0,
            volume_surge: 1.1,
            ema_trend_filter: false,
        }
    }
}

impl Default for ExitRules {
    fn default() -> Self {
        ExitRules {
            target_gain: 0.10,
            stop_loss: 0.05,
        }
    }
}

impl Default for SizingParams {
    fn default() -> Self {
        SizingParams {
            risk_per_trade: 0.05,
            stop_loss_pct: 0.05,
        }
    }
}

impl Default for StrategyParams {
    fn default() -> Self {
        StrategyParams {
            rsi_period: rsi::DEFAULT_PERIOD,
            ema_period: ema::DEFAULT_SPAN,
            macd_fast: macd::DEFAULT_FAST,
            macd_slow: macd::DEFAULT_SLOW,
            macd_signal: macd::DEFAULT_SIGNAL,
            entry: EntryRules::default(),
            exit: ExitRules::default(),
            sizing: SizingParams::default(),
        }
    }
}

impl StrategyParams {
    pub fn indicators(&self) -> Vec<IndicatorType> {
        vec![
            IndicatorType::Rsi(self.rsi_period),
            IndicatorType::Ema(self.ema_period),
            IndicatorType::Macd {
                fast: self.macd_fast,
                slow: self.macd_slow,
                signal: self.macd_signal,
            },
        ]
    }

    pub fn validate(&self) -> Result<(), SwingtraderError> {
        let periods = [
            ("rsi_period", self.rsi_period),
            ("ema_period", self.ema_period),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
        ];
        for (name, period) in periods {
            if period < 1 {
                return Err(SwingtraderError::invalid_input(format!(
                    "{name} must be at least 1"
                )));
            }
        }

        let fractions = [
            ("target_gain", self.exit.target_gain),
            ("stop_loss", self.exit.stop_loss),
            ("risk_per_trade", self.sizing.risk_per_trade),
            ("sizing_stop_loss", self.sizing.stop_loss_pct),
        ];
        for (name, value) in fractions {
            if !(value.is_finite() && value > 0.0) {
                return Err(SwingtraderError::invalid_input(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }

        if self.sizing.risk_per_trade > 1.0 {
            return Err(SwingtraderError::invalid_input(
                "risk_per_trade must not exceed 1",
            ));
        }

        if !(self.entry.volume_surge.is_finite() && self.entry.volume_surge >= 0.0) {
            return Err(SwingtraderError::invalid_input(
                "volume_surge must be non-negative",
            ));
        }
        if !(0.0..=100.0).contains(&self.entry.rsi_oversold) {
            return Err(SwingtraderError::invalid_input(
                "rsi_oversold must be between 0 and 100",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_constants() {
        let p = StrategyParams::default();
        assert_eq!(p.rsi_period, 14);
        assert_eq!(p.ema_period, 20);
        assert_eq!((p.macd_fast, p.macd_slow, p.macd_signal), (12, 26, 9));
        assert!((p.entry.rsi_oversold - 30.0).abs() < f64::EPSILON);
        assert!((p.entry.volume_surge - 1.1).abs() < f64::EPSILON);
        assert!(!p.entry.ema_trend_filter);
        assert!((p.exit.target_gain - 0.10).abs() < f64::EPSILON);
        assert!((p.exit.stop_loss - 0.05).abs() < f64::EPSILON);
        assert!((p.sizing.risk_per_trade - 0.05).abs() < f64::EPSILON);
        assert!((p.sizing.stop_loss_pct - 0.05).abs() < f64::EPSILON);
    }

    #[test]
    fn defaults_validate() {
        assert!(StrategyParams::default().validate().is_ok());
    }

    #[test]
    fn zero_period_rejected() {
        let p = StrategyParams {
            macd_slow: 0,
            ..StrategyParams::default()
        };
        let err = p.validate().unwrap_err();
        assert!(err.to_string().contains("macd_slow"));
    }

    #[test]
    fn negative_stop_loss_rejected() {
        let mut p = StrategyParams::default();
        p.exit.stop_loss = -0.05;
        assert!(matches!(
            p.validate(),
            Err(SwingtraderError::InvalidInput { .. })
        ));
    }

    #[test]
    fn wide_exit_band_accepted() {
        let mut p = StrategyParams::default();
        p.exit.target_gain = 1.5;
        assert!(p.validate().is_ok());
    }

    #[test]
    fn risk_above_whole_capital_rejected() {
        let mut p = StrategyParams::default();
        p.sizing.risk_per_trade = 1.5;
        let err = p.validate().unwrap_err();
        assert!(err.to_string().contains("risk_per_trade"));
    }

    #[test]
    fn rsi_threshold_out_of_range_rejected() {
        let mut p = StrategyParams::default();
        p.entry.rsi_oversold = 120.0;
        assert!(p.validate().is_err());
    }

    #[test]
    fn indicators_listed_with_parameters() {
        let names: Vec<String> = StrategyParams::default()
            .indicators()
            .iter()
            .map(|i| i.to_string())
            .collect();
        assert_eq!(names, vec!["RSI(14)", "EMA(20)", "MACD(12,26,9)"]);
    }
}
