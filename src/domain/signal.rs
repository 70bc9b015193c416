//! Entry signal evaluation.

use crate::domain::series::Bar;
use crate::domain::strategy::EntryRules;

/// True when every entry condition holds for `current` against `previous`:
/// RSI oversold, MACD histogram rising, volume above `previous * surge`,
/// and close above EMA when the trend filter is on. A missing indicator
/// value fails its condition.
pub fn should_enter(current: &Bar, previous: &Bar, rules: &EntryRules) -> bool {
    let oversold = matches!(current.rsi, Some(rsi) if rsi < rules.rsi_oversold);

    let momentum = match (current.macd_hist, previous.macd_hist) {
        (Some(cur), Some(prev)) => cur > prev,
        _ => false,
    };

    let volume_surge = current.volume as f64 > previous.volume as f64 * rules.volume_surge;

    let trend = !rules.ema_trend_filter
        || matches!(current.ema, Some(ema) if current.close > ema);

    oversold && momentum && volume_surge && trend
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar(day: u32, rsi: Option<f64>, hist: Option<f64>, volume: i64) -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            open: 50.0,
            high: 50.0,
            low: 50.0,
            close: 50.0,
            volume,
            rsi,
            ema: Some(52.0),
            macd: Some(0.0),
            macd_signal: Some(0.0),
            macd_hist: hist,
        }
    }

    fn prev() -> Bar {
        bar(4, Some(35.0), Some(-0.5), 1000)
    }

    #[test]
    fn all_conditions_met() {
        let cur = bar(5, Some(20.0), Some(-0.2), 1500);
        assert!(should_enter(&cur, &prev(), &EntryRules::default()));
    }

    #[test]
    fn rsi_not_oversold() {
        let cur = bar(5, Some(30.0), Some(-0.2), 1500);
        assert!(!should_enter(&cur, &prev(), &EntryRules::default()));
    }

    #[test]
    fn macd_histogram_not_rising() {
        let cur = bar(5, Some(20.0), Some(-0.5), 1500);
        assert!(!should_enter(&cur, &prev(), &EntryRules::default()));
    }

    #[test]
    fn volume_surge_is_strict() {
        // exactly 1.1x is not a surge
        let cur = bar(5, Some(20.0), Some(-0.2), 1100);
        assert!(!should_enter(&cur, &prev(), &EntryRules::default()));
        let cur = bar(5, Some(20.0), Some(-0.2), 1101);
        assert!(should_enter(&cur, &prev(), &EntryRules::default()));
    }

    #[test]
    fn undefined_rsi_never_enters() {
        let cur = bar(5, None, Some(-0.2), 1500);
        assert!(!should_enter(&cur, &prev(), &EntryRules::default()));
    }

    #[test]
    fn undefined_previous_histogram_never_enters() {
        let cur = bar(5, Some(20.0), Some(-0.2), 1500);
        let previous = bar(4, Some(35.0), None, 1000);
        assert!(!should_enter(&cur, &previous, &EntryRules::default()));
    }

    #[test]
    fn trend_filter_blocks_when_below_ema() {
        let cur = bar(5, Some(20.0), Some(-0.2), 1500);
        let rules = EntryRules {
            ema_trend_filter: true,
            ..EntryRules::default()
        };
        assert!(!should_enter(&cur, &prev(), &rules));
    }

    #[test]
    fn trend_filter_passes_when_above_ema() {
        let mut cur = bar(5, Some(20.0), Some(-0.2), 1500);
        cur.close = 55.0;
        let rules = EntryRules {
            ema_trend_filter: true,
            ..EntryRules::default()
        };
        assert!(should_enter(&cur, &prev(), &rules));
    }
}
