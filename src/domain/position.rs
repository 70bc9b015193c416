//! Open position and trade log records.

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub shares: i64,
}

impl Position {
    pub fn market_value(&self, price: f64) -> f64 {
        self.shares as f64 * price
    }

    /// Fractional gain relative to the entry price.
    pub fn gain(&self, price: f64) -> f64 {
        (price - self.entry_price) / self.entry_price
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    Target,
    StopLoss,
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloseReason::Target => write!(f, "target"),
            CloseReason::StopLoss => write!(f, "stop_loss"),
        }
    }
}

/// Exit half of a trade, filled in when the position closes.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeExit {
    pub date: NaiveDate,
    pub price: f64,
    pub gain: f64,
    pub reason: CloseReason,
}

/// One entry in the trade log. Open until `exit` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub shares: i64,
    pub exit: Option<TradeExit>,
}

impl Trade {
    pub fn open(position: &Position) -> Self {
        Trade {
            entry_date: position.entry_date,
            entry_price: position.entry_price,
            shares: position.shares,
            exit: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.exit.is_none()
    }

    /// Realized gain, `None` while open.
    pub fn gain(&self) -> Option<f64> {
        self.exit.as_ref().map(|e| e.gain)
    }

    pub fn pnl(&self) -> Option<f64> {
        self.exit
            .as_ref()
            .map(|e| self.shares as f64 * (e.price - self.entry_price))
    }
}
