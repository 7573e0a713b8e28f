//! # CalcuMaster CLI
//!
//! Terminal front end for `calc_core`: one-shot calculator subcommands, the
//! calculation history, favorites, and an interactive prompt.
//!
//! ```text
//! calcumaster eval "2 + 3 * 4"
//! calcumaster --save convert length 5 km mi
//! calcumaster --json loan 100000 10 5
//! calcumaster fav add bmi
//! calcumaster repl
//! ```

mod commands;
mod config;
mod repl;

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use calc_core::catalog;
use calc_core::{CalcError, FavoritesStore, FileStore, HistoryStore, KeyValueStore, MemoryStore, Settings};

use commands::{CalcCommand, Report};

#[derive(Parser)]
#[command(name = "calcumaster")]
#[command(about = "Unit conversion, arithmetic and everyday calculators", long_about = None)]
#[command(version)]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Record the result in history
    #[arg(long, global = true)]
    save: bool,

    /// Config file (default: ~/.calcumaster/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Keep history and favorites in memory only
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Calc(CalcCommand),

    /// Show or clear the calculation history
    History {
        #[command(subcommand)]
        action: Option<HistoryAction>,
    },

    /// Manage favorite calculators
    Fav {
        #[command(subcommand)]
        action: Option<FavAction>,
    },

    /// List calculators, or search them by name and description
    Calculators { query: Option<String> },

    /// Interactive calculator prompt
    Repl,
}

#[derive(Subcommand)]
enum HistoryAction {
    /// Most recent first
    List {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Delete every entry
    Clear,
}

#[derive(Subcommand)]
enum FavAction {
    List,
    /// Calculator path, name, or last path segment (e.g. "bmi")
    Add { calculator: String },
    Remove { calculator: String },
    Toggle { calculator: String },
}

/// Logs go to stderr so stdout carries only results.
fn init_tracing(default_filter: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .with(env_filter)
        .init();
}

/// Storage handles for one invocation.
struct Session {
    settings: Settings,
    data_dir: Option<PathBuf>,
    ephemeral: bool,
}

impl Session {
    fn new(settings: Settings, ephemeral: bool) -> Self {
        let data_dir = config::data_dir(&settings);
        Session {
            settings,
            data_dir,
            ephemeral,
        }
    }

    fn backend(&self) -> Result<Box<dyn KeyValueStore>> {
        if self.ephemeral {
            return Ok(Box::new(MemoryStore::new()));
        }
        let dir = self
            .data_dir
            .clone()
            .context("no data directory available; set data_dir in the config or use --ephemeral")?;
        let owner = format!("calcumaster-{}", std::process::id());
        let store = FileStore::open(&dir, owner).with_context(|| format!("failed to open data directory {:?}", dir))?;
        Ok(Box::new(store))
    }

    fn history(&self) -> Result<HistoryStore<Box<dyn KeyValueStore>>> {
        Ok(HistoryStore::open(self.backend()?, self.settings.history_limit))
    }

    fn favorites(&self) -> Result<FavoritesStore<Box<dyn KeyValueStore>>> {
        Ok(FavoritesStore::open(self.backend()?))
    }
}

fn main() {
    let cli = Cli::parse();
    let json = cli.json;
    let (settings, config_warnings) = config::load(cli.config.as_deref());
    init_tracing(&settings.log_filter);
    for warning in config_warnings {
        tracing::warn!("{warning}");
    }
    tracing::debug!(?settings, "settings loaded");

    if let Err(err) = run(cli, settings) {
        report_error(&err, json);
        std::process::exit(1);
    }
}

fn run(cli: Cli, settings: Settings) -> Result<()> {
    let session = Session::new(settings, cli.ephemeral);

    match cli.command {
        Commands::Calc(command) => {
            let report = commands::run(command, &session.settings.currency_symbol)?;
            emit(&report, cli.json)?;
            if cli.save {
                if let Some(draft) = report.history {
                    session
                        .history()?
                        .append(draft)
                        .context("result computed but could not be saved to history")?;
                }
            }
        }

        Commands::History { action } => {
            let mut history = session.history()?;
            match action.unwrap_or(HistoryAction::List { limit: None }) {
                HistoryAction::List { limit } => {
                    let entries = &history.list()[..limit.unwrap_or(usize::MAX).min(history.len())];
                    let text = if entries.is_empty() {
                        "No history yet".to_string()
                    } else {
                        entries
                            .iter()
                            .map(|e| format!("{}  {} = {}", e.timestamp.format("%Y-%m-%d %H:%M"), e.expression, e.result))
                            .collect::<Vec<_>>()
                            .join("\n")
                    };
                    emit(&Report::new(&entries, text)?, cli.json)?;
                }
                HistoryAction::Clear => {
                    history.clear().context("failed to clear history")?;
                    emit(&Report::new(&serde_json::json!({ "cleared": true }), "History cleared")?, cli.json)?;
                }
            }
        }

        Commands::Fav { action } => {
            let mut favorites = session.favorites()?;
            match action.unwrap_or(FavAction::List) {
                FavAction::List => {}
                FavAction::Add { calculator } => {
                    if !favorites.add(catalog::resolve(&calculator)?)? {
                        tracing::info!(%calculator, "already a favorite");
                    }
                }
                FavAction::Remove { calculator } => {
                    let path = catalog::resolve(&calculator)?.path;
                    if !favorites.remove(path)? {
                        tracing::info!(%calculator, "not a favorite");
                    }
                }
                FavAction::Toggle { calculator } => {
                    favorites.toggle(catalog::resolve(&calculator)?)?;
                }
            }
            let text = if favorites.list().is_empty() {
                "No favorites yet".to_string()
            } else {
                favorites
                    .list()
                    .iter()
                    .map(|c| format!("{:<28} {}", c.name, c.path))
                    .collect::<Vec<_>>()
                    .join("\n")
            };
            emit(&Report::new(&favorites.list(), text)?, cli.json)?;
        }

        Commands::Calculators { query } => {
            emit(&commands::calculators(query.as_deref())?, cli.json)?;
        }

        Commands::Repl => {
            let mut repl = repl::Repl::new(session.history()?);
            repl.run(io::stdin().lock(), io::stdout())?;
        }
    }
    Ok(())
}

fn emit(report: &Report, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&report.json)?);
    } else {
        println!("{}", report.text);
    }
    Ok(())
}

/// Structured JSON for calculator errors in `--json` mode, a message
/// chain on stderr otherwise.
fn report_error(err: &anyhow::Error, json: bool) {
    if json {
        let payload = match err.downcast_ref::<CalcError>() {
            Some(calc) => serde_json::json!({
                "error": calc,
                "code": calc.error_code(),
                "message": format!("{:#}", err),
            }),
            None => serde_json::json!({ "error": null, "message": format!("{:#}", err) }),
        };
        match serde_json::to_string_pretty(&payload) {
            Ok(text) => println!("{}", text),
            Err(_) => eprintln!("Error: {:#}", err),
        }
    } else {
        eprintln!("Error: {:#}", err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_calculator_subcommand() {
        let cli = Cli::try_parse_from(["calcumaster", "--json", "tip", "100", "15", "--people", "3"]).unwrap();
        assert!(cli.json);
        assert!(matches!(
            cli.command,
            Commands::Calc(CalcCommand::Tip { people: 3, .. })
        ));
    }

    #[test]
    fn test_cli_negative_numbers() {
        let cli = Cli::try_parse_from(["calcumaster", "power", "-2", "3"]).unwrap();
        assert!(matches!(cli.command, Commands::Calc(CalcCommand::Power { .. })));
    }

    #[test]
    fn test_cli_fav_and_history() {
        let cli = Cli::try_parse_from(["calcumaster", "fav", "add", "bmi"]).unwrap();
        assert!(matches!(cli.command, Commands::Fav { action: Some(FavAction::Add { .. }) }));
        let cli = Cli::try_parse_from(["calcumaster", "history"]).unwrap();
        assert!(matches!(cli.command, Commands::History { action: None }));
    }

    #[test]
    fn test_save_and_list_history_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            data_dir: Some(dir.path().to_path_buf()),
            ..Settings::default()
        };

        let cli = Cli::try_parse_from(["calcumaster", "--save", "eval", "6 * 7"]).unwrap();
        run(cli, settings.clone()).unwrap();

        let session = Session::new(settings, false);
        let history = session.history().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history.list()[0].expression, "6 * 7");
        assert_eq!(history.list()[0].result, "42");
    }

    #[test]
    fn test_favorites_persist_between_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            data_dir: Some(dir.path().to_path_buf()),
            ..Settings::default()
        };

        let cli = Cli::try_parse_from(["calcumaster", "fav", "add", "bmi"]).unwrap();
        run(cli, settings.clone()).unwrap();

        let favorites = Session::new(settings, false).favorites().unwrap();
        assert!(favorites.contains("/calculators/health/bmi"));
    }

    #[test]
    fn test_unknown_favorite_is_an_error() {
        let cli = Cli::try_parse_from(["calcumaster", "--ephemeral", "fav", "add", "nope"]).unwrap();
        let err = run(cli, Settings::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CalcError>(),
            Some(CalcError::UnknownCalculator { .. })
        ));
    }
}
