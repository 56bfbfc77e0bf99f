//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::console_output::WriterSink;
use crate::adapters::csv_adapter::{CsvAdapter, DEFAULT_INSTRUMENTS_FILE};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config_validation::validate_session_config;
use crate::domain::error::SimtraderError;
use crate::domain::ledger::{DuplicatePolicy, Ledger};
use crate::domain::market::load_market;
use crate::domain::session::{Session, SessionConfig};
use crate::domain::value::Value;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::output_port::OutputSink;

#[derive(Parser, Debug)]
#[command(name = "simtrader", about = "Simulation builtins for backtest scripts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print instrument codes in registry order
    Codes {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Invoke one builtin with the cursor on a given instrument and date
    Call {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        code: String,
        #[arg(long)]
        date: String,
        /// Sample offset from the cursor
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        at: i64,
        /// Instrument override
        #[arg(long)]
        brand: Option<String>,
        name: String,
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Show sample count and date range per instrument
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        code: Option<String>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// One builtin call requested from the command line.
#[derive(Debug, Clone)]
pub struct CallRequest {
    pub code: String,
    pub date: NaiveDate,
    pub at: i64,
    pub brand: Option<String>,
    pub name: String,
    pub args: Vec<Value>,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Codes { config } => run_codes(&config),
        Command::Call {
            config,
            code,
            date,
            at,
            brand,
            name,
            args,
        } => {
            let date = match parse_date(&date) {
                Ok(d) => d,
                Err(e) => {
                    eprintln!("error: {e}");
                    return (&e).into();
                }
            };
            let request = CallRequest {
                code,
                date,
                at,
                brand,
                name,
                args: args.iter().map(|a| Value::from_literal(a)).collect(),
            };
            run_call(&config, &request)
        }
        Command::Info { config, code } => run_info(&config, code.as_deref()),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = SimtraderError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

pub fn parse_date(s: &str) -> Result<NaiveDate, SimtraderError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| SimtraderError::InvalidDate {
        input: s.to_string(),
    })
}

pub fn build_session_config(adapter: &dyn ConfigPort) -> Result<SessionConfig, SimtraderError> {
    validate_session_config(adapter)?;

    let data_dir = adapter
        .get_string("data", "directory")
        .ok_or_else(|| SimtraderError::ConfigMissing {
            section: "data".into(),
            key: "directory".into(),
        })?;

    let policy = match adapter.get_string("ledger", "duplicate_policy") {
        Some(s) => s
            .parse::<DuplicatePolicy>()
            .map_err(|reason| SimtraderError::ConfigInvalid {
                section: "ledger".into(),
                key: "duplicate_policy".into(),
                reason,
            })?,
        None => DuplicatePolicy::default(),
    };

    Ok(SessionConfig {
        data_dir: PathBuf::from(data_dir.trim()),
        instruments_file: adapter
            .get_string("data", "instruments")
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| DEFAULT_INSTRUMENTS_FILE.to_string()),
        policy,
        system: adapter
            .get_string("ledger", "system")
            .filter(|s| !s.trim().is_empty()),
        show_ledger: adapter.get_bool("output", "show_ledger", true),
    })
}

pub fn data_port_for(config: &SessionConfig) -> CsvAdapter {
    CsvAdapter::new(config.data_dir.clone()).with_instruments_file(config.instruments_file.clone())
}

pub fn open_session(
    config: &SessionConfig,
    data_port: &dyn DataPort,
) -> Result<Session, SimtraderError> {
    let market = load_market(data_port)?;
    for skipped in &market.skipped {
        eprintln!("Warning: no prices for {} ({:?})", skipped.code, skipped.reason);
    }
    let mut session = Session::new(market.registry, market.prices, config.policy);
    if let Some(system) = &config.system {
        session.set_system(system.clone());
    }
    Ok(session)
}

/// Position the cursor and run one call, writing narration to `sink`.
pub fn execute_call(
    session: &mut Session,
    request: &CallRequest,
    sink: &mut dyn OutputSink,
) -> Result<Option<Value>, SimtraderError> {
    session.seek(&request.code, request.date)?;
    session.invoke(
        &request.name,
        &request.args,
        request.at,
        request.brand.as_deref(),
        sink,
    )
}

pub fn format_ledger(ledger: &Ledger) -> String {
    let mut out = String::new();
    if let Some(system) = ledger.system() {
        out.push_str(&format!("System: {}\n", system));
    }
    for entry in ledger.all() {
        out.push_str(&format!(
            "  {} {} {} {} x {}\n",
            entry.date,
            entry.code,
            entry.side.marker(),
            entry.price,
            entry.quantity
        ));
    }
    out.push_str(&format!("{} trade(s)\n", ledger.len()));
    out
}

fn prepare(config_path: &Path) -> Result<(SessionConfig, Session), ExitCode> {
    let adapter = load_config(config_path)?;
    let config = build_session_config(&adapter).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })?;
    let session = open_session(&config, &data_port_for(&config)).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })?;
    Ok((config, session))
}

fn run_codes(config_path: &Path) -> ExitCode {
    let (_, mut session) = match prepare(config_path) {
        Ok(p) => p,
        Err(exit) => return exit,
    };

    let mut sink = WriterSink::stdout();
    match session.invoke("CodeList", &[], 0, None, &mut sink) {
        Ok(Some(Value::Array(codes))) => {
            for code in &codes {
                println!("{}", code);
            }
            eprintln!("{} instruments", codes.len());
            ExitCode::SUCCESS
        }
        Ok(other) => {
            eprintln!("error: unexpected CodeList result {:?}", other);
            ExitCode::from(4)
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_call(config_path: &Path, request: &CallRequest) -> ExitCode {
    let (config, mut session) = match prepare(config_path) {
        Ok(p) => p,
        Err(exit) => return exit,
    };

    let mut sink = WriterSink::stdout();
    let result = execute_call(&mut session, request, &mut sink);

    let code = match result {
        Ok(Some(value)) => {
            println!("{}", value);
            ExitCode::SUCCESS
        }
        Ok(None) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    };

    if config.show_ledger && !session.ledger().is_empty() {
        eprint!("\n{}", format_ledger(session.ledger()));
    }
    code
}

fn run_info(config_path: &Path, code: Option<&str>) -> ExitCode {
    let (_, session) = match prepare(config_path) {
        Ok(p) => p,
        Err(exit) => return exit,
    };

    let instruments: Vec<_> = match code {
        Some(c) => match session.registry().lookup(c) {
            Ok(inst) => vec![inst.clone()],
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        },
        None => session.registry().all().to_vec(),
    };

    for inst in &instruments {
        match session
            .prices()
            .series(&inst.code)
            .ok()
            .and_then(|s| s.date_range().map(|r| (s.len(), r)))
        {
            Some((count, (first, last))) => {
                println!(
                    "{} {}: {} samples, {} to {}",
                    inst.code, inst.name, count, first, last
                );
            }
            None => {
                eprintln!("{} {}: no data found", inst.code, inst.name);
            }
        }
    }
    ExitCode::SUCCESS
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(exit) => return exit,
    };

    match build_session_config(&adapter) {
        Ok(config) => {
            eprintln!("  data directory:   {}", config.data_dir.display());
            eprintln!("  instruments file: {}", config.instruments_file);
            eprintln!("  duplicate policy: {:?}", config.policy);
            if let Some(system) = &config.system {
                eprintln!("  system:           {}", system);
            }
            eprintln!("\nConfiguration is valid.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}
