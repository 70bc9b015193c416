//! Exponential Moving Average.
//!
//! k = 2/(n+1), seeded with the first close (no SMA seed), then
//! EMA[i] = C[i]*k + EMA[i-1]*(1-k). Defined for every index.

use crate::domain::error::SwingtraderError;
use crate::domain::indicator::{check_input, IndicatorType};

pub const DEFAULT_SPAN: usize = 20;

pub fn calculate_ema(closes: &[f64], span: usize) -> Result<Vec<f64>, SwingtraderError> {
    check_input(closes, span, &IndicatorType::Ema(span))?;

    let k = smoothing_factor(span);
    let mut values = Vec::with_capacity(closes.len());
    let mut ema = closes[0];
    values.push(ema);

    for &close in &closes[1..] {
        ema = close * k + ema * (1.0 - k);
        values.push(ema);
    }

    Ok(values)
}

pub fn smoothing_factor(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}
