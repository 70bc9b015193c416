//! CSV export of the trade log and equity curve for external plotting.
//!
//! Writes `trades.csv` and `equity.csv` into the output directory. Exit
//! columns are left empty for a trade still open at the end of the series.

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::SwingtraderError;
use crate::domain::position::Trade;
use crate::ports::report_port::ReportPort;

pub const TRADES_FILE: &str = "trades.csv";
pub const EQUITY_FILE: &str = "equity.csv";

const TRADE_HEADER: [&str; 8] = [
    "entry_date",
    "entry_price",
    "shares",
    "exit_date",
    "exit_price",
    "gain",
    "pnl",
    "reason",
];
const EQUITY_HEADER: [&str; 2] = ["date", "equity"];

#[derive(Debug, Serialize)]
struct TradeRow {
    entry_date: String,
    entry_price: f64,
    shares: i64,
    exit_date: Option<String>,
    exit_price: Option<f64>,
    gain: Option<f64>,
    pnl: Option<f64>,
    reason: Option<String>,
}

impl From<&Trade> for TradeRow {
    fn from(trade: &Trade) -> Self {
        let exit = trade.exit.as_ref();
        TradeRow {
            entry_date: trade.entry_date.to_string(),
            entry_price: trade.entry_price,
            shares: trade.shares,
            exit_date: exit.map(|e| e.date.to_string()),
            exit_price: exit.map(|e| e.price),
            gain: exit.map(|e| e.gain),
            pnl: trade.pnl(),
            reason: exit.map(|e| e.reason.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
struct EquityRow {
    date: String,
    equity: f64,
}

pub struct CsvExportAdapter;

impl CsvExportAdapter {
    /// The header is written up front so an empty log still yields a
    /// readable file.
    fn write_rows<T: Serialize>(
        path: &Path,
        header: &[&str],
        rows: impl IntoIterator<Item = T>,
    ) -> Result<(), SwingtraderError> {
        let to_data_err = |e: csv::Error| SwingtraderError::Data {
            reason: format!("failed to write {}: {}", path.display(), e),
        };

        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(path)
            .map_err(to_data_err)?;
        wtr.write_record(header).map_err(to_data_err)?;
        for row in rows {
            wtr.serialize(row).map_err(to_data_err)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl ReportPort for CsvExportAdapter {
    fn write(&self, result: &BacktestResult, output_dir: &Path) -> Result<(), SwingtraderError> {
        fs::create_dir_all(output_dir)?;

        Self::write_rows(
            &output_dir.join(TRADES_FILE),
            &TRADE_HEADER,
            result.trades.iter().map(TradeRow::from),
        )?;
        Self::write_rows(
            &output_dir.join(EQUITY_FILE),
            &EQUITY_HEADER,
            result.equity_curve.iter().map(|p| EquityRow {
                date: p.date.to_string(),
                equity: p.equity,
            }),
        )?;
        Ok(())
    }
}
