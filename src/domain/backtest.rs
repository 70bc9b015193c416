//! Backtest engine and event loop.
//!
//! The per-bar state machine is the pure [`step`] function: given the prior
//! [`Account`] and the current/previous bars it returns the next account,
//! the bar's mark-to-market equity and at most one trade event.
//! [`BacktestEngine`] owns the account, the trade log and the equity curve
//! and drives `step` over a series in one pass.

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::domain::error::SwingtraderError;
use crate::domain::portfolio::{Account, EquityPoint};
use crate::domain::position::{CloseReason, Position, Trade, TradeExit};
use crate::domain::series::Bar;
use crate::domain::signal::should_enter;
use crate::domain::sizing::position_size;
use crate::domain::strategy::StrategyParams;

pub const DEFAULT_INITIAL_CAPITAL: f64 = 100_000.0;

/// Run-level parameters: what to simulate and with how much capital.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_capital: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TradeEvent {
    Opened(Position),
    Closed {
        position: Position,
        exit: TradeExit,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub account: Account,
    pub equity: f64,
    pub event: Option<TradeEvent>,
}

/// Advance the simulation by one bar.
///
/// Equity is marked before any transition. An open position is only checked
/// for exit; a flat account is only checked for entry.
pub fn step(
    account: Account,
    current: &Bar,
    previous: &Bar,
    params: &StrategyParams,
) -> StepOutcome {
    let equity = account.equity(current.close);
    let Account { cash, position } = account;

    match position {
        Some(position) => {
            let gain = position.gain(current.close);
            let reason = if gain >= params.exit.target_gain {
                Some(CloseReason::Target)
            } else if gain <= -params.exit.stop_loss {
                Some(CloseReason::StopLoss)
            } else {
                None
            };

            match reason {
                Some(reason) => {
                    let exit = TradeExit {
                        date: current.date,
                        price: current.close,
                        gain,
                        reason,
                    };
                    StepOutcome {
                        account: Account {
                            cash: cash + position.market_value(current.close),
                            position: None,
                        },
                        equity,
                        event: Some(TradeEvent::Closed { position, exit }),
                    }
                }
                None => StepOutcome {
                    account: Account {
                        cash,
                        position: Some(position),
                    },
                    equity,
                    event: None,
                },
            }
        }
        None => {
            let shares = if should_enter(current, previous, &params.entry) {
                position_size(cash, current.close, &params.sizing)
            } else {
                0
            };

            if shares > 0 {
                let position = Position {
                    entry_date: current.date,
                    entry_price: current.close,
                    shares,
                };
                StepOutcome {
                    account: Account {
                        cash: cash - position.market_value(current.close),
                        position: Some(position.clone()),
                    },
                    equity,
                    event: Some(TradeEvent::Opened(position)),
                }
            } else {
                StepOutcome {
                    account: Account {
                        cash,
                        position: None,
                    },
                    equity,
                    event: None,
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub initial_capital: f64,
    /// Account at the end of the series; an open position stays unrealized.
    pub account: Account,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
}

impl BacktestResult {
    pub fn final_equity(&self) -> f64 {
        self.equity_curve
            .last()
            .map(|p| p.equity)
            .unwrap_or(self.initial_capital)
    }

    pub fn closed_trades(&self) -> impl Iterator<Item = &Trade> {
        self.trades.iter().filter(|t| !t.is_open())
    }

    pub fn open_trade(&self) -> Option<&Trade> {
        self.trades.last().filter(|t| t.is_open())
    }
}

pub struct BacktestEngine {
    params: StrategyParams,
    initial_capital: f64,
    account: Account,
    trades: Vec<Trade>,
    equity_curve: Vec<EquityPoint>,
}

impl BacktestEngine {
    pub fn new(initial_capital: f64, params: StrategyParams) -> Result<Self, SwingtraderError> {
        if !(initial_capital.is_finite() && initial_capital > 0.0) {
            return Err(SwingtraderError::invalid_input(format!(
                "initial capital must be positive, got {initial_capital}"
            )));
        }
        params.validate()?;

        Ok(BacktestEngine {
            params,
            initial_capital,
            account: Account::new(initial_capital),
            trades: Vec::new(),
            equity_curve: Vec::new(),
        })
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn equity_curve(&self) -> &[EquityPoint] {
        &self.equity_curve
    }

    /// Simulate one bar and record its equity and any trade event.
    pub fn process(&mut self, current: &Bar, previous: &Bar) -> Option<TradeEvent> {
        let account = std::mem::replace(&mut self.account, Account::new(0.0));
        let outcome = step(account, current, previous, &self.params);

        self.account = outcome.account;
        self.equity_curve.push(EquityPoint {
            date: current.date,
            equity: outcome.equity,
        });

        match &outcome.event {
            Some(TradeEvent::Opened(position)) => {
                debug!(
                    date = %position.entry_date,
                    price = position.entry_price,
                    shares = position.shares,
                    "opened position"
                );
                self.trades.push(Trade::open(position));
            }
            Some(TradeEvent::Closed { exit, .. }) => {
                debug!(
                    date = %exit.date,
                    price = exit.price,
                    gain = exit.gain,
                    reason = %exit.reason,
                    "closed position"
                );
                if let Some(trade) = self.trades.last_mut().filter(|t| t.is_open()) {
                    trade.exit = Some(exit.clone());
                }
            }
            None => {}
        }

        outcome.event
    }

    /// Run over the whole series. Bar 0 only seeds the previous-bar slot, so
    /// the equity curve gains `bars.len() - 1` points.
    pub fn run(mut self, bars: &[Bar]) -> Result<BacktestResult, SwingtraderError> {
        if bars.is_empty() {
            return Err(SwingtraderError::invalid_input("price series is empty"));
        }

        for window in bars.windows(2) {
            self.process(&window[1], &window[0]);
        }

        let result = self.into_result();
        info!(
            bars = bars.len(),
            trades = result.trades.len(),
            final_equity = result.final_equity(),
            "backtest complete"
        );
        Ok(result)
    }

    pub fn into_result(self) -> BacktestResult {
        BacktestResult {
            initial_capital: self.initial_capital,
            account: self.account,
            trades: self.trades,
            equity_curve: self.equity_curve,
        }
    }
}

/// Convenience wrapper: build an engine and run it over `bars`.
pub fn run_backtest(
    bars: &[Bar],
    initial_capital: f64,
    params: &StrategyParams,
) -> Result<BacktestResult, SwingtraderError> {
    BacktestEngine::new(initial_capital, params.clone())?.run(bars)
}
