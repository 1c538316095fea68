//! Float IIF CLI
//!
//! Reads a float account CSV export and writes an IIF import file.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- openfloat.csv -o openfloat.iif
//! cargo run -- --config accounts.json --skip-rows 2 export.csv > out.iif
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `info` to see skipped rows and the batch summary

use clap::Parser;
use float_iif::config::{DateOrder, WithdrawalField, WithdrawalSign};
use float_iif::{Config, IifConverter, Result};
use std::fs::{self, File};
use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[command(name = "float-iif", version, about = "Convert float account CSV exports to IIF")]
struct Cli {
    /// Input CSV export ("-" reads stdin)
    input: String,

    /// Output IIF file (default: stdout)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Preamble lines before the header row
    #[arg(long = "skip-rows")]
    skip_rows: Option<usize>,

    /// Column carrying the withdrawal amount
    #[arg(long = "withdrawal-field", value_enum)]
    withdrawal_field: Option<WithdrawalField>,

    /// Sign convention for withdrawals
    #[arg(long = "withdrawal-sign", value_enum)]
    withdrawal_sign: Option<WithdrawalSign>,

    /// Read numeric dates as day/month/year
    #[arg(long = "day-first")]
    day_first: bool,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_path(path)?,
        None => Config::default(),
    };

    if let Some(skip_rows) = cli.skip_rows {
        config.skip_rows = skip_rows;
    }
    if let Some(field) = cli.withdrawal_field {
        config.withdrawal.amount_field = field;
    }
    if let Some(sign) = cli.withdrawal_sign {
        config.withdrawal.sign = sign;
    }
    if cli.day_first {
        config.date_order = DateOrder::DayFirst;
    }

    Ok(config)
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    let mut converter = IifConverter::new(config);

    if cli.input == "-" {
        converter.process_csv(io::stdin().lock())?;
    } else {
        let file = File::open(&cli.input)?;
        converter.process_csv(BufReader::new(file))?;
    }

    // Assembled in memory first so a failed batch never leaves a partial file
    let document = converter.render()?;
    match &cli.output {
        Some(path) => fs::write(path, document)?,
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(document.as_bytes())?;
            handle.flush()?;
        }
    }

    Ok(())
}
