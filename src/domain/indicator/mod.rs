//! Technical indicator implementations.
//!
//! All indicators are pure functions over a close-price slice:
//! - [`calculate_rsi`]: rolling-mean RSI, `None` during warm-up
//! - [`calculate_ema`]: EMA seeded with the first close, defined everywhere
//! - [`calculate_macd`]: MACD line, signal line and histogram
//!
//! `IndicatorType` names an indicator together with its parameters.

pub mod ema;
pub mod macd;
pub mod rsi;

pub use ema::calculate_ema;
pub use macd::{calculate_macd, MacdSeries};
pub use rsi::calculate_rsi;

use crate::domain::error::SwingtraderError;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Rsi(usize),
    Ema(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
        }
    }
}

/// Reject empty input and zero periods.
pub(crate) fn check_input(
    closes: &[f64],
    period: usize,
    indicator: &IndicatorType,
) -> Result<(), SwingtraderError> {
    if closes.is_empty() {
        return Err(SwingtraderError::invalid_input(format!(
            "{indicator}: price series is empty"
        )));
    }
    if period < 1 {
        return Err(SwingtraderError::invalid_input(format!(
            "{indicator}: period must be at least 1"
        )));
    }
    Ok(())
}
