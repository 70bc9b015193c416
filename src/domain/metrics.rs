//! Performance metrics and the formatted summary report.
//!
//! Win/loss statistics only look at closed trades. An open trade at the end
//! of the series counts toward `total_trades` but is never classified as a
//! win or a loss, so it stays out of the win-rate denominator.

use std::fmt;

use super::backtest::BacktestResult;
use super::portfolio::EquityPoint;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub total_trades: usize,
    pub closed_trades: usize,
    pub open_trades: usize,
    pub trades_won: usize,
    pub trades_lost: usize,
    pub win_rate: f64,
    pub avg_gain: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub max_drawdown: f64,
    pub total_return: f64,
    pub final_equity: f64,
}

impl Metrics {
    pub fn compute(result: &BacktestResult) -> Self {
        let total_trades = result.trades.len();
        let gains: Vec<f64> = result.trades.iter().filter_map(|t| t.gain()).collect();
        let closed_trades = gains.len();

        let wins: Vec<f64> = gains.iter().copied().filter(|g| *g > 0.0).collect();
        let losses: Vec<f64> = gains.iter().copied().filter(|g| *g <= 0.0).collect();

        let win_rate = if closed_trades > 0 {
            wins.len() as f64 / closed_trades as f64
        } else {
            0.0
        };

        let final_equity = result.final_equity();
        let total_return = if result.initial_capital > 0.0 {
            (final_equity - result.initial_capital) / result.initial_capital
        } else {
            0.0
        };

        Metrics {
            total_trades,
            closed_trades,
            open_trades: total_trades - closed_trades,
            trades_won: wins.len(),
            trades_lost: losses.len(),
            win_rate,
            avg_gain: mean(&gains),
            avg_win: mean(&wins),
            avg_loss: mean(&losses),
            max_drawdown: compute_max_drawdown(&result.equity_curve),
            total_return,
            final_equity,
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Largest peak-to-trough decline as a fraction of the running peak.
pub fn compute_max_drawdown(equity_curve: &[EquityPoint]) -> f64 {
    let Some(first) = equity_curve.first() else {
        return 0.0;
    };

    let mut peak = first.equity;
    let mut max_dd = 0.0_f64;

    for point in equity_curve {
        if point.equity > peak {
            peak = point.equity;
        } else if peak > 0.0 {
            let dd = (peak - point.equity) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }

    max_dd
}

/// Optional report lines, each off unless requested.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportOptions {
    pub max_drawdown: bool,
    pub total_return: bool,
    pub final_equity: bool,
}

pub const NO_TRADES: &str = "No trades executed";

#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    NoTrades,
    Summary(Vec<(String, String)>),
}

impl Report {
    pub fn generate(result: &BacktestResult, options: &ReportOptions) -> Self {
        if result.trades.is_empty() {
            return Report::NoTrades;
        }
        Report::from_metrics(&Metrics::compute(result), options)
    }

    pub fn from_metrics(metrics: &Metrics, options: &ReportOptions) -> Self {
        let mut lines = vec![
            ("Total Trades", metrics.total_trades.to_string()),
            ("Winning Trades", metrics.trades_won.to_string()),
            ("Losing Trades", metrics.trades_lost.to_string()),
            ("Open Trades", metrics.open_trades.to_string()),
            ("Win Rate", format_pct(metrics.win_rate)),
            ("Average Gain", format_pct(metrics.avg_gain)),
            ("Average Winner", format_pct(metrics.avg_win)),
            ("Average Loser", format_pct(metrics.avg_loss)),
        ];
        if options.max_drawdown {
            lines.push(("Max Drawdown", format_pct(metrics.max_drawdown)));
        }
        if options.total_return {
            lines.push(("Total Return", format_pct(metrics.total_return)));
        }
        if options.final_equity {
            lines.push(("Final Equity", format_currency(metrics.final_equity)));
        }

        Report::Summary(
            lines
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        )
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        match self {
            Report::NoTrades => None,
            Report::Summary(lines) => lines
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str()),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::NoTrades => write!(f, "{}", NO_TRADES),
            Report::Summary(lines) => {
                for (name, value) in lines {
                    writeln!(f, "{}: {}", name, value)?;
                }
                Ok(())
            }
        }
    }
}

/// 0.4532 -> "45.32%"
pub fn format_pct(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

/// 123456.789 -> "$123,456.79"
pub fn format_currency(amount: f64) -> String {
    let formatted = format!("{:.2}", amount.abs());
    let (whole, cents) = formatted
        .split_once('.')
        .unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{sign}${grouped}.{cents}")
}
