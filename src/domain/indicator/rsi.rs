//! RSI (Relative Strength Index).
//!
//! Simple rolling means over the trailing `n` close-to-close changes:
//! - avg_gain = mean(max(delta, 0)), avg_loss = mean(max(-delta, 0))
//! - RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! - avg_loss == 0: RSI = 100
//!
//! Warmup: index i needs n prior deltas, so indices 0..n are `None`.

use crate::domain::error::SwingtraderError;
use crate::domain::indicator::{check_input, IndicatorType};

pub const DEFAULT_PERIOD: usize = 14;

pub fn calculate_rsi(closes: &[f64], period: usize) -> Result<Vec<Option<f64>>, SwingtraderError> {
    check_input(closes, period, &IndicatorType::Rsi(period))?;

    let mut values = vec![None; closes.len()];
    if closes.len() <= period {
        return Ok(values);
    }

    let mut gains = Vec::with_capacity(closes.len() - 1);
    let mut losses = Vec::with_capacity(closes.len() - 1);
    for w in closes.windows(2) {
        let change = w[1] - w[0];
        gains.push(if change > 0.0 { change } else { 0.0 });
        losses.push(if change < 0.0 { -change } else { 0.0 });
    }

    // deltas[j] is the change into closes[j + 1]
    let mut gain_sum: f64 = gains[..period].iter().sum();
    let mut loss_sum: f64 = losses[..period].iter().sum();

    for i in period..closes.len() {
        if i > period {
            let entering = i - 1;
            let leaving = i - 1 - period;
            gain_sum += gains[entering] - gains[leaving];
            loss_sum += losses[entering] - losses[leaving];
        }
        values[i] = Some(rsi_value(gain_sum / period as f64, loss_sum / period as f64));
    }

    Ok(values)
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss <= 0.0 {
        return 100.0;
    }
    let rsi = 100.0 - (100.0 / (1.0 + avg_gain / avg_loss));
    rsi.clamp(0.0, 100.0)
}
