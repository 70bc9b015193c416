#![allow(dead_code)]

use chrono::NaiveDate;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
pub use swingtrader::domain::ohlcv::OhlcvBar;
use swingtrader::domain::error::SwingtraderError;
pub use swingtrader::domain::series::Bar;
use swingtrader::ports::data_port::DataPort;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, SwingtraderError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(SwingtraderError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(symbol)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= start_date && b.date <= end_date)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn list_symbols(&self) -> Result<Vec<String>, SwingtraderError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, SwingtraderError> {
        Ok(self
            .data
            .get(symbol)
            .and_then(|bars| Some((bars.first()?.date, bars.last()?.date, bars.len()))))
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Consecutive calendar days starting 2024-01-01.
pub fn day(i: usize) -> NaiveDate {
    date(2024, 1, 1) + chrono::Duration::days(i as i64)
}

pub fn make_ohlcv(i: usize, close: f64, volume: i64) -> OhlcvBar {
    OhlcvBar {
        date: day(i),
        open: close,
        high: close,
        low: close,
        close,
        volume,
    }
}

/// Raw series from `(close, volume)` pairs.
pub fn ohlcv_series(points: &[(f64, i64)]) -> Vec<OhlcvBar> {
    points
        .iter()
        .enumerate()
        .map(|(i, &(close, volume))| make_ohlcv(i, close, volume))
        .collect()
}

/// An enriched bar with neutral indicators: RSI 50, flat MACD.
pub fn quiet_bar(i: usize, close: f64) -> Bar {
    Bar {
        date: day(i),
        open: close,
        high: close,
        low: close,
        close,
        volume: 1_000,
        rsi: Some(50.0),
        ema: Some(close),
        macd: Some(0.0),
        macd_signal: Some(0.0),
        macd_hist: Some(0.0),
    }
}

/// An enriched bar meeting every default entry condition against a
/// preceding `quiet_bar`.
pub fn signal_bar(i: usize, close: f64) -> Bar {
    Bar {
        rsi: Some(25.0),
        macd_hist: Some(0.5),
        volume: 2_000,
        ..quiet_bar(i, close)
    }
}

/// Quiet bars at `close` except for a signal at `signal_at`.
pub fn series_with_signal(len: usize, signal_at: usize, close: f64) -> Vec<Bar> {
    (0..len)
        .map(|i| {
            if i == signal_at {
                signal_bar(i, close)
            } else {
                quiet_bar(i, close)
            }
        })
        .collect()
}

pub fn write_csv(dir: &Path, symbol: &str, bars: &[OhlcvBar]) {
    let mut content = String::from("date,open,high,low,close,volume\n");
    for b in bars {
        content.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.date, b.open, b.high, b.low, b.close, b.volume
        ));
    }
    fs::write(dir.join(format!("{symbol}.csv")), content).unwrap();
}
