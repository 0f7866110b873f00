use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use hack_asm::driver::{self, DriverConfig, DriverError};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Translate Hack assembly (.asm) into Hack machine code (.hack)",
    after_help = "Exit status: 0 success, 2 usage error, 3 missing path, 4 invalid input kind, \
5 address out of range, 6 unknown mnemonic, 7 malformed instruction, \
8 invalid mnemonic map, 9 I/O error. With --keep-going the first failing file decides."
)]
struct Opts {
    /// A .asm file, or a directory whose .asm files are translated one by one
    #[arg(value_name = "PATH")]
    input: Option<PathBuf>,
    /// Mnemonic table to use instead of the built-in Hack table
    #[arg(long, value_name = "FILE")]
    map: Option<PathBuf>,
    /// In directory mode, keep translating after a file fails
    #[arg(long)]
    keep_going: bool,
    /// Also write <name>.symbols.json with the final symbol table
    #[arg(long)]
    emit_symbols: bool,
}

fn run(opts: &Opts) -> Result<ExitCode> {
    let cfg = DriverConfig {
        keep_going: opts.keep_going,
        emit_symbols: opts.emit_symbols,
    };
    let map = driver::load_map(opts.map.as_deref())?;
    let report = driver::run(opts.input.as_deref(), &map, &cfg)?;
    for out in &report.translated {
        info!("wrote {}", out.display());
    }

    for failure in &report.failures {
        eprintln!("error: {failure}");
    }
    Ok(report.exit_code().map_or(ExitCode::SUCCESS, ExitCode::from))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();
    match run(&opts) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            let code = err.downcast_ref::<DriverError>().map_or(1, DriverError::exit_code);
            ExitCode::from(code)
        }
    }
}
