//! Result export port trait.

use std::path::Path;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::SwingtraderError;

/// Port for handing the trade log and equity curve to an external consumer
/// such as a plotting tool.
pub trait ReportPort {
    fn write(&self, result: &BacktestResult, output_dir: &Path) -> Result<(), SwingtraderError>;
}
