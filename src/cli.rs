//! CLI definition and dispatch.
//!
//! Results are printed to stdout as JSON; failures print `{"error": ...}`
//! and exit with the status of the error kind. Logs go to stderr.

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Value};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{self, ErrorSummary};
use crate::domain::error::AlgoblocksError;
use crate::domain::settings::{EngineSettings, RunMode};
use crate::domain::strategy::StrategyConfig;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::MarketDataPort;

#[derive(Parser, Debug)]
#[command(name = "algoblocks", about = "Declarative trading strategy evaluator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Evaluate a strategy over daily history
    Backtest(RunArgs),
    /// Replay a strategy over recent intraday bars
    Simulate(RunArgs),
    /// Check settings and a strategy without fetching data
    Validate {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Strategy JSON file, or `-` for stdin
        #[arg(short, long)]
        strategy: Option<PathBuf>,
    },
    /// Manage saved strategies
    #[cfg(feature = "sqlite")]
    Strategies {
        #[arg(short, long)]
        config: PathBuf,
        #[command(subcommand)]
        action: StrategyCommand,
    },
}

#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// Settings INI file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Strategy JSON file, or `-` for stdin
    #[arg(short, long)]
    pub strategy: Option<PathBuf>,
    /// Saved strategy name
    #[cfg(feature = "sqlite")]
    #[arg(short, long, conflicts_with = "strategy")]
    pub name: Option<String>,
    /// Ticker, overriding the strategy and settings
    #[arg(short, long)]
    pub ticker: Option<String>,
    /// Market data directory, overriding the settings
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
    /// Write the JSON result here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[cfg(feature = "sqlite")]
#[derive(Subcommand, Debug)]
pub enum StrategyCommand {
    /// List saved strategies
    List,
    /// Show one saved strategy
    Show { name: String },
    /// Save a strategy JSON file under a name
    Save {
        name: String,
        /// Strategy JSON file, or `-` for stdin
        #[arg(short, long)]
        strategy: PathBuf,
    },
    /// Rename a saved strategy
    Rename { name: String, new_name: String },
    /// Delete a saved strategy
    Delete { name: String },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest(args) => run_evaluation(RunMode::Backtest, &args),
        Command::Simulate(args) => run_evaluation(RunMode::Simulation, &args),
        Command::Validate { config, strategy } => {
            finish(validate(config.as_deref(), strategy.as_deref()), None)
        }
        #[cfg(feature = "sqlite")]
        Command::Strategies { config, action } => finish(run_strategies(&config, action), None),
    }
}

fn run_evaluation(mode: RunMode, args: &RunArgs) -> ExitCode {
    let result = load_settings(args.config.as_deref()).and_then(|(adapter, mut settings)| {
        if let Some(dir) = &args.data_dir {
            settings.data_dir = dir.clone();
        }
        let strategy = resolve_run_strategy(args, &adapter)?;
        let data = CsvAdapter::new(settings.data_dir.clone());
        execute(mode, &data, &strategy, &settings)
    });
    finish(result, args.output.as_deref())
}

/// Settings from the INI file, or built-in defaults without one.
pub fn load_settings(
    path: Option<&Path>,
) -> Result<(FileConfigAdapter, EngineSettings), AlgoblocksError> {
    let adapter = match path {
        Some(path) => FileConfigAdapter::from_file(path)?,
        None => FileConfigAdapter::empty(),
    };
    let settings = EngineSettings::from_config(&adapter)?;
    Ok((adapter, settings))
}

/// Strategy JSON from a file, or from stdin when the path is `-`.
pub fn read_strategy_file(path: &Path) -> Result<StrategyConfig, AlgoblocksError> {
    let content = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        fs::read_to_string(path)?
    };
    StrategyConfig::from_json_str(&content)
}

/// A JSON strategy file when given, otherwise the `[strategy]` settings
/// section. A ticker override replaces whatever the source named.
pub fn resolve_strategy(
    strategy_path: Option<&Path>,
    settings: &dyn ConfigPort,
    ticker: Option<&str>,
) -> Result<StrategyConfig, AlgoblocksError> {
    let mut config = match strategy_path {
        Some(path) => read_strategy_file(path)?,
        None => StrategyConfig::from_config(settings)?,
    };
    apply_ticker(&mut config, ticker);
    Ok(config)
}

fn apply_ticker(config: &mut StrategyConfig, ticker: Option<&str>) {
    if let Some(t) = ticker.map(str::trim).filter(|t| !t.is_empty()) {
        config.ticker = Some(t.to_uppercase());
    }
}

fn resolve_run_strategy(
    args: &RunArgs,
    settings: &FileConfigAdapter,
) -> Result<StrategyConfig, AlgoblocksError> {
    #[cfg(feature = "sqlite")]
    {
        use crate::adapters::sqlite_adapter::SqliteStrategyStore;
        use crate::ports::strategy_store_port::StrategyStorePort;

        if let Some(name) = &args.name {
            let store = SqliteStrategyStore::from_config(settings)?;
            let mut config = store
                .get(name)?
                .ok_or_else(|| AlgoblocksError::StrategyNotFound { name: name.clone() })?
                .config;
            apply_ticker(&mut config, args.ticker.as_deref());
            return Ok(config);
        }
    }

    resolve_strategy(args.strategy.as_deref(), settings, args.ticker.as_deref())
}

/// Run one mode and return its JSON summary.
pub fn execute(
    mode: RunMode,
    data: &dyn MarketDataPort,
    strategy: &StrategyConfig,
    settings: &EngineSettings,
) -> Result<Value, AlgoblocksError> {
    let run_settings = settings.run_settings(mode);
    tracing::info!(
        mode = mode.section(),
        ticker = %backtest::resolve_ticker(strategy, &settings.default_ticker),
        lookback = %run_settings.lookback,
        interval = %run_settings.interval,
        "running strategy"
    );

    match mode {
        RunMode::Backtest => to_json(&backtest::run_backtest(
            data,
            strategy,
            &settings.default_ticker,
            run_settings,
        )?),
        RunMode::Simulation => to_json(&backtest::run_simulation(
            data,
            strategy,
            &settings.default_ticker,
            run_settings,
        )?),
    }
}

/// Check settings and strategy; report the enabled rules.
pub fn validate(
    config_path: Option<&Path>,
    strategy_path: Option<&Path>,
) -> Result<Value, AlgoblocksError> {
    let (adapter, settings) = load_settings(config_path)?;
    let strategy = resolve_strategy(strategy_path, &adapter, None)?;
    strategy.validate()?;

    let rules: Vec<String> = strategy.indicators().iter().map(|i| i.to_string()).collect();
    tracing::info!(rules = rules.len(), "strategy is valid");

    Ok(json!({
        "ticker": backtest::resolve_ticker(&strategy, &settings.default_ticker),
        "strategy": strategy,
        "rules": rules,
        "required_history": strategy.required_history(),
    }))
}

#[cfg(feature = "sqlite")]
pub fn run_strategies(config_path: &Path, action: StrategyCommand) -> Result<Value, AlgoblocksError> {
    use crate::adapters::sqlite_adapter::SqliteStrategyStore;

    let adapter = FileConfigAdapter::from_file(config_path)?;
    let store = SqliteStrategyStore::from_config(&adapter)?;
    manage_strategies(&store, action)
}

/// Apply one store command.
#[cfg(feature = "sqlite")]
pub fn manage_strategies(
    store: &dyn crate::ports::strategy_store_port::StrategyStorePort,
    action: StrategyCommand,
) -> Result<Value, AlgoblocksError> {
    let not_found = |name: &str| AlgoblocksError::StrategyNotFound {
        name: name.to_string(),
    };

    match action {
        StrategyCommand::List => to_json(&store.list()?),
        StrategyCommand::Show { name } => {
            to_json(&store.get(&name)?.ok_or_else(|| not_found(&name))?)
        }
        StrategyCommand::Save { name, strategy } => {
            let config = read_strategy_file(&strategy)?;
            store.create(&name, &config)?;
            to_json(&store.get(&name)?.ok_or_else(|| not_found(&name))?)
        }
        StrategyCommand::Rename { name, new_name } => {
            store.rename(&name, &new_name)?;
            to_json(&store.get(&new_name)?.ok_or_else(|| not_found(&new_name))?)
        }
        StrategyCommand::Delete { name } => {
            store.delete(&name)?;
            Ok(json!({ "deleted": name.trim() }))
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, AlgoblocksError> {
    Ok(serde_json::to_value(value)?)
}

/// Rendered output and exit status for a command result.
pub fn render(result: &Result<Value, AlgoblocksError>) -> (String, u8) {
    match result {
        Ok(value) => (value.to_string(), 0),
        Err(err) => {
            let payload = serde_json::to_string(&ErrorSummary::from(err))
                .unwrap_or_else(|_| json!({ "error": err.to_string() }).to_string());
            (payload, err.exit_status())
        }
    }
}

fn finish(result: Result<Value, AlgoblocksError>, output: Option<&Path>) -> ExitCode {
    if let Err(err) = &result {
        tracing::error!(error = %err, "command failed");
    }
    let (payload, status) = render(&result);

    match output {
        Some(path) => {
            if let Err(e) = fs::write(path, format!("{}\n", payload)) {
                tracing::error!(path = %path.display(), error = %e, "failed to write output");
                return ExitCode::from(1);
            }
            tracing::info!(path = %path.display(), "result written");
        }
        None => println!("{}", payload),
    }

    ExitCode::from(status)
}
