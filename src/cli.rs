//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_export_adapter::CsvExportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{self as backtest_engine, BacktestConfig, DEFAULT_INITIAL_CAPITAL};
use crate::domain::config_validation::{
    parse_date, validate_backtest_config, validate_report_config, validate_strategy_config,
};
use crate::domain::error::SwingtraderError;
use crate::domain::metrics::{Report, ReportOptions};
use crate::domain::series;
use crate::domain::strategy::{EntryRules, ExitRules, SizingParams, StrategyParams};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

pub const DEFAULT_DATA_DIR: &str = "data";

#[derive(Parser, Debug)]
#[command(name = "swingtrader", about = "Rule-based swing trading backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest and print the performance report
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Override `[backtest] symbol`
        #[arg(long)]
        symbol: Option<String>,
        /// Directory for trades.csv and equity.csv
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration without touching data
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show the data range for a symbol
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
    },
    /// List symbols available in the data directory
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let outcome = match cli.command {
        Command::Backtest {
            config,
            symbol,
            output,
        } => run_backtest(&config, symbol.as_deref(), output.as_deref()),
        Command::Validate { config } => run_validate(&config),
        Command::Info { config, symbol } => run_info(&config, symbol.as_deref()),
        Command::ListSymbols { config } => run_list_symbols(&config),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, SwingtraderError> {
    info!("Loading config from {}", path.display());
    FileConfigAdapter::from_file(path)
}

fn validate_all(config: &dyn ConfigPort) -> Result<(), SwingtraderError> {
    validate_backtest_config(config)?;
    validate_strategy_config(config)?;
    validate_report_config(config)
}

fn run_backtest(
    config_path: &Path,
    symbol_override: Option<&str>,
    output_override: Option<&Path>,
) -> Result<(), SwingtraderError> {
    let config = load_config(config_path)?;
    validate_all(&config)?;

    let mut bt_config = build_backtest_config(&config)?;
    bt_config.symbol = resolve_symbol(symbol_override, &config)?;
    let params = build_strategy_params(&config);
    let report_options = build_report_options(&config);

    let output_dir = output_override
        .map(Path::to_path_buf)
        .or_else(|| config.get_string("report", "output_dir").map(PathBuf::from));

    let data_port = CsvAdapter::new(data_dir(&config));
    let report = run_backtest_pipeline(
        &data_port,
        &bt_config,
        &params,
        &report_options,
        &CsvExportAdapter,
        output_dir.as_deref(),
    )?;

    print!("{report}");
    if matches!(report, Report::NoTrades) {
        println!();
    }
    Ok(())
}

/// Fetch, enrich, simulate and summarise one symbol.
///
/// When `output_dir` is set the trade log and equity curve are also handed
/// to `report_port`.
pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    bt_config: &BacktestConfig,
    params: &StrategyParams,
    report_options: &ReportOptions,
    report_port: &dyn ReportPort,
    output_dir: Option<&Path>,
) -> Result<Report, SwingtraderError> {
    info!(
        "Fetching {} from {} to {}",
        bt_config.symbol, bt_config.start_date, bt_config.end_date
    );
    let ohlcv = data_port.fetch_ohlcv(
        &bt_config.symbol,
        bt_config.start_date,
        bt_config.end_date,
    )?;
    if ohlcv.is_empty() {
        return Err(SwingtraderError::NoData {
            symbol: bt_config.symbol.clone(),
        });
    }

    let bars = series::enrich(&ohlcv, params)?;
    if bars.len() < 2 {
        warn!("only one bar in range; nothing to simulate");
    }

    let result = backtest_engine::run_backtest(&bars, bt_config.initial_capital, params)?;
    if let Some(trade) = result.open_trade() {
        info!(
            "Position opened {} at {:.2} is still open at the end of the data",
            trade.entry_date, trade.entry_price
        );
    }
    let report = Report::generate(&result, report_options);

    if let Some(dir) = output_dir {
        report_port.write(&result, dir)?;
        info!("Exported trades and equity curve to {}", dir.display());
    }

    Ok(report)
}

pub fn build_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, SwingtraderError> {
    let symbol = config
        .get_string("backtest", "symbol")
        .map(|s| s.trim().to_uppercase())
        .unwrap_or_default();
    let start_date = parse_date(
        config.get_string("backtest", "start_date").as_deref(),
        "start_date",
    )?;
    let end_date = parse_date(
        config.get_string("backtest", "end_date").as_deref(),
        "end_date",
    )?;

    Ok(BacktestConfig {
        symbol,
        start_date,
        end_date,
        initial_capital: config.get_double("backtest", "initial_capital", DEFAULT_INITIAL_CAPITAL),
    })
}

pub fn build_strategy_params(config: &dyn ConfigPort) -> StrategyParams {
    let defaults = StrategyParams::default();
    let s = "strategy";

    StrategyParams {
        rsi_period: config.get_usize(s, "rsi_period", defaults.rsi_period),
        ema_period: config.get_usize(s, "ema_period", defaults.ema_period),
        macd_fast: config.get_usize(s, "macd_fast", defaults.macd_fast),
        macd_slow: config.get_usize(s, "macd_slow", defaults.macd_slow),
        macd_signal: config.get_usize(s, "macd_signal", defaults.macd_signal),
        entry: EntryRules {
            rsi_oversold: config.get_double(s, "rsi_oversold", defaults.entry.rsi_oversold),
            volume_surge: config.get_double(s, "volume_surge", defaults.entry.volume_surge),
            ema_trend_filter: config.get_bool(
                s,
                "ema_trend_filter",
                defaults.entry.ema_trend_filter,
            ),
        },
        exit: ExitRules {
            target_gain: config.get_double(s, "target_gain", defaults.exit.target_gain),
            stop_loss: config.get_double(s, "stop_loss", defaults.exit.stop_loss),
        },
        sizing: SizingParams {
            risk_per_trade: config.get_double(s, "risk_per_trade", defaults.sizing.risk_per_trade),
            stop_loss_pct: config.get_double(s, "sizing_stop_loss", defaults.sizing.stop_loss_pct),
        },
    }
}

pub fn build_report_options(config: &dyn ConfigPort) -> ReportOptions {
    ReportOptions {
        max_drawdown: config.get_bool("report", "max_drawdown", false),
        total_return: config.get_bool("report", "total_return", false),
        final_equity: config.get_bool("report", "final_equity", false),
    }
}

pub fn data_dir(config: &dyn ConfigPort) -> PathBuf {
    config
        .get_string("backtest", "data_dir")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

fn resolve_symbol(
    symbol_override: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<String, SwingtraderError> {
    symbol_override
        .map(str::to_string)
        .or_else(|| config.get_string("backtest", "symbol"))
        .map(|s| s.trim().to_uppercase())
        .ok_or_else(|| SwingtraderError::ConfigMissing {
            section: "backtest".into(),
            key: "symbol".into(),
        })
}

fn run_validate(config_path: &Path) -> Result<(), SwingtraderError> {
    let config = load_config(config_path)?;
    validate_all(&config)?;

    let mut bt_config = build_backtest_config(&config)?;
    bt_config.symbol = resolve_symbol(None, &config)?;
    let params = build_strategy_params(&config);
    params.validate()?;

    println!("Symbol:   {}", bt_config.symbol);
    println!("Period:   {} to {}", bt_config.start_date, bt_config.end_date);
    println!("Capital:  {}", bt_config.initial_capital);
    println!("Indicators:");
    for indicator in params.indicators() {
        println!("  {}", indicator);
    }
    println!(
        "Entry:    RSI < {}, rising MACD histogram, volume > {}x previous{}",
        params.entry.rsi_oversold,
        params.entry.volume_surge,
        if params.entry.ema_trend_filter {
            ", close above EMA"
        } else {
            ""
        }
    );
    println!(
        "Exit:     +{} target, -{} stop",
        params.exit.target_gain, params.exit.stop_loss
    );
    info!("Configuration is valid");
    Ok(())
}

fn run_info(config_path: &Path, symbol_override: Option<&str>) -> Result<(), SwingtraderError> {
    let config = load_config(config_path)?;
    let symbol = resolve_symbol(symbol_override, &config)?;
    let adapter = CsvAdapter::new(data_dir(&config));

    match adapter.get_data_range(&symbol)? {
        Some((first, last, count)) => {
            println!("{symbol}: {first} to {last} ({count} bars)");
            Ok(())
        }
        None => Err(SwingtraderError::NoData { symbol }),
    }
}

fn run_list_symbols(config_path: &Path) -> Result<(), SwingtraderError> {
    let config = load_config(config_path)?;
    let dir = data_dir(&config);
    let symbols = CsvAdapter::new(dir.clone()).list_symbols()?;

    if symbols.is_empty() {
        warn!("No symbols found in {}", dir.display());
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        info!("{} symbols found", symbols.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn strategy_params_default_when_section_absent() {
        let config = make_config("[backtest]\nsymbol = NVDA\n");
        assert_eq!(build_strategy_params(&config), StrategyParams::default());
    }

    #[test]
    fn strategy_params_read_overrides() {
        let config = make_config(
            "[strategy]\nrsi_period = 7\nrsi_oversold = 25\n\
             ema_trend_filter = true\nsizing_stop_loss = 0.08\n",
        );
        let params = build_strategy_params(&config);
        assert_eq!(params.rsi_period, 7);
        assert_eq!(params.entry.rsi_oversold, 25.0);
        assert!(params.entry.ema_trend_filter);
        assert_eq!(params.sizing.stop_loss_pct, 0.08);
        assert_eq!(params.macd_slow, 26);
    }

    #[test]
    fn backtest_config_uppercases_symbol_and_defaults_capital() {
        let config = make_config(
            "[backtest]\nsymbol = nvda\nstart_date = 2023-01-01\nend_date = 2023-12-31\n",
        );
        let bt = build_backtest_config(&config).unwrap();
        assert_eq!(bt.symbol, "NVDA");
        assert_eq!(bt.initial_capital, DEFAULT_INITIAL_CAPITAL);
    }

    #[test]
    fn backtest_config_requires_dates() {
        let config = make_config("[backtest]\nsymbol = NVDA\n");
        let err = build_backtest_config(&config).unwrap_err();
        assert!(matches!(err, SwingtraderError::ConfigMissing { key, .. } if key == "start_date"));
    }

    #[test]
    fn report_options_default_off() {
        let config = make_config("[report]\ntotal_return = true\n");
        let options = build_report_options(&config);
        assert!(options.total_return);
        assert!(!options.max_drawdown);
        assert!(!options.final_equity);
    }

    #[test]
    fn data_dir_defaults() {
        assert_eq!(data_dir(&make_config("[backtest]\n")), PathBuf::from("data"));
        assert_eq!(
            data_dir(&make_config("[backtest]\ndata_dir = /srv/prices\n")),
            PathBuf::from("/srv/prices")
        );
    }

    #[test]
    fn resolve_symbol_prefers_override() {
        let config = make_config("[backtest]\nsymbol = NVDA\n");
        assert_eq!(resolve_symbol(Some("amd"), &config).unwrap(), "AMD");
        assert_eq!(resolve_symbol(None, &config).unwrap(), "NVDA");

        let empty = make_config("[backtest]\n");
        assert!(matches!(
            resolve_symbol(None, &empty),
            Err(SwingtraderError::ConfigMissing { .. })
        ));
    }

    #[test]
    fn cli_parses_backtest_command() {
        let cli = Cli::try_parse_from([
            "swingtrader",
            "backtest",
            "-c",
            "run.ini",
            "--symbol",
            "NVDA",
            "-o",
            "out",
        ])
        .unwrap();
        match cli.command {
            Command::Backtest {
                config,
                symbol,
                output,
            } => {
                assert_eq!(config, PathBuf::from("run.ini"));
                assert_eq!(symbol.as_deref(), Some("NVDA"));
                assert_eq!(output, Some(PathBuf::from("out")));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn cli_parses_list_symbols() {
        let cli =
            Cli::try_parse_from(["swingtrader", "list-symbols", "--config", "run.ini"]).unwrap();
        assert!(matches!(cli.command, Command::ListSymbols { .. }));
    }
}
