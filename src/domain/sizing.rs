//! Risk-based position sizing.

use crate::domain::strategy::SizingParams;

/// Number of whole shares to buy at `price` with `capital` available.
///
/// risk_budget = capital * risk_per_trade
/// stop_loss_points = price * stop_loss_pct
/// shares = min(floor(risk_budget / stop_loss_points), floor(capital / price))
///
/// Returns 0 (no entry) when nothing is affordable. The result never costs
/// more than `capital`.
pub fn position_size(capital: f64, price: f64, params: &SizingParams) -> i64 {
    if !(capital.is_finite() && price.is_finite()) || capital <= 0.0 || price <= 0.0 {
        return 0;
    }

    let mut max_affordable = (capital / price).floor() as i64;
    while max_affordable > 0 && max_affordable as f64 * price > capital {
        max_affordable -= 1;
    }

    let risk_budget = capital * params.risk_per_trade;
    let stop_loss_points = price * params.stop_loss_pct;
    let shares = if stop_loss_points > 0.0 {
        (risk_budget / stop_loss_points).floor() as i64
    } else {
        max_affordable
    };

    shares.min(max_affordable).max(0)
}
