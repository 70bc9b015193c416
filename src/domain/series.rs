//! Enriched price series: raw bars validated and joined with indicator values.

use chrono::NaiveDate;

use crate::domain::error::SwingtraderError;
use crate::domain::indicator::{calculate_ema, calculate_macd, calculate_rsi};
use crate::domain::ohlcv::{closes, OhlcvBar};
use crate::domain::strategy::StrategyParams;

/// One trading day with its derived indicators. `None` marks warm-up.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
    pub rsi: Option<f64>,
    pub ema: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_hist: Option<f64>,
}

impl Bar {
    /// A bar with no indicator values attached.
    pub fn from_ohlcv(bar: &OhlcvBar) -> Self {
        Bar {
            date: bar.date,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
            rsi: None,
            ema: None,
            macd: None,
            macd_signal: None,
            macd_hist: None,
        }
    }
}

/// Check that a raw series is non-empty, strictly ascending by date, with
/// positive prices and non-negative volume. Calendar gaps are allowed.
pub fn validate_bars(bars: &[OhlcvBar]) -> Result<(), SwingtraderError> {
    if bars.is_empty() {
        return Err(SwingtraderError::invalid_input("price series is empty"));
    }

    for (i, bar) in bars.iter().enumerate() {
        if !bar.has_valid_prices() {
            return Err(SwingtraderError::invalid_input(format!(
                "bar {} ({}) has a non-positive or non-finite price",
                i, bar.date
            )));
        }
        if bar.volume < 0 {
            return Err(SwingtraderError::invalid_input(format!(
                "bar {} ({}) has negative volume {}",
                i, bar.date, bar.volume
            )));
        }
        if i > 0 {
            let prev = bars[i - 1].date;
            if bar.date == prev {
                return Err(SwingtraderError::invalid_input(format!(
                    "duplicate date {}",
                    bar.date
                )));
            }
            if bar.date < prev {
                return Err(SwingtraderError::invalid_input(format!(
                    "bars out of order: {} follows {}",
                    bar.date, prev
                )));
            }
        }
    }
    Ok(())
}

/// Validate `bars` and attach RSI, EMA and MACD values per `params`.
pub fn enrich(bars: &[OhlcvBar], params: &StrategyParams) -> Result<Vec<Bar>, SwingtraderError> {
    validate_bars(bars)?;

    let closes = closes(bars);
    let rsi = calculate_rsi(&closes, params.rsi_period)?;
    let ema = calculate_ema(&closes, params.ema_period)?;
    let macd = calculate_macd(&closes, params.macd_fast, params.macd_slow, params.macd_signal)?;

    let enriched = bars
        .iter()
        .enumerate()
        .map(|(i, raw)| Bar {
            rsi: rsi[i],
            ema: Some(ema[i]),
            macd: Some(macd.line[i]),
            macd_signal: Some(macd.signal[i]),
            macd_hist: Some(macd.histogram[i]),
            ..Bar::from_ohlcv(raw)
        })
        .collect();

    Ok(enriched)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_bar(day: u32, close: f64) -> OhlcvBar {
        OhlcvBar {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1000,
        }
    }

    fn make_bars(n: u32) -> Vec<OhlcvBar> {
        (1..=n).map(|d| make_bar(d, 100.0 + d as f64)).collect()
    }

    #[test]
    fn validate_rejects_empty() {
        assert!(matches!(
            validate_bars(&[]),
            Err(SwingtraderError::InvalidInput { .. })
        ));
    }

    #[test]
    fn validate_rejects_duplicate_dates() {
        let bars = vec![make_bar(1, 100.0), make_bar(1, 101.0)];
        let err = validate_bars(&bars).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn validate_rejects_descending_dates() {
        let bars = vec![make_bar(2, 100.0), make_bar(1, 101.0)];
        let err = validate_bars(&bars).unwrap_err();
        assert!(err.to_string().contains("out of order"));
    }

    #[test]
    fn validate_rejects_negative_volume() {
        let mut bars = make_bars(3);
        bars[1].volume = -5;
        assert!(validate_bars(&bars).is_err());
    }

    #[test]
    fn validate_rejects_zero_price() {
        let mut bars = make_bars(3);
        bars[2].low = 0.0;
        assert!(validate_bars(&bars).is_err());
    }

    #[test]
    fn validate_allows_gaps() {
        let bars = vec![make_bar(1, 100.0), make_bar(5, 101.0), make_bar(20, 99.0)];
        assert!(validate_bars(&bars).is_ok());
    }

    #[test]
    fn enrich_attaches_indicators() {
        let params = StrategyParams {
            rsi_period: 3,
            ..StrategyParams::default()
        };
        let bars = enrich(&make_bars(6), &params).unwrap();

        assert_eq!(bars.len(), 6);
        assert!(bars[2].rsi.is_none());
        assert!(bars[3].rsi.is_some());
        assert_eq!(bars[0].ema, Some(101.0));
        for bar in &bars {
            assert!(bar.macd.is_some());
            assert!(bar.macd_signal.is_some());
            assert!(bar.macd_hist.is_some());
        }
    }

    #[test]
    fn enrich_keeps_ohlcv_fields() {
        let raw = make_bars(2);
        let bars = enrich(&raw, &StrategyParams::default()).unwrap();
        assert_eq!(bars[1].date, raw[1].date);
        assert_eq!(bars[1].close, raw[1].close);
        assert_eq!(bars[1].volume, raw[1].volume);
    }

    #[test]
    fn enrich_rejects_zero_period() {
        let params = StrategyParams {
            ema_period: 0,
            ..StrategyParams::default()
        };
        assert!(enrich(&make_bars(5), &params).is_err());
    }
}
