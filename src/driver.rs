use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::assembler::Assembler;
use crate::error::AsmError;
use crate::mnemonic::{MapError, MnemonicMap};
use crate::source::clean;

pub const SOURCE_EXT: &str = "asm";
pub const OUTPUT_EXT: &str = "hack";
pub const SYMBOLS_EXT: &str = "symbols.json";

#[derive(Debug, Clone, Copy, Default)]
pub struct DriverConfig {
    /// Keep translating the remaining files of a directory after one fails.
    pub keep_going: bool,
    /// Write `<stem>.symbols.json` next to each output.
    pub emit_symbols: bool,
}

#[derive(thiserror::Error, Debug)]
pub enum DriverError {
    #[error("{}", missing_message(.path))]
    MissingPath { path: Option<PathBuf> },
    #[error("{}: expected a .asm file or a directory containing .asm files", .path.display())]
    InvalidInputKind { path: PathBuf },
    #[error("{}: {source}", .path.display())]
    Assemble {
        path: PathBuf,
        #[source]
        source: AsmError,
    },
    #[error("{origin}: invalid mnemonic map: {source}")]
    InvalidMap {
        origin: String,
        #[source]
        source: MapError,
    },
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn missing_message(path: &Option<PathBuf>) -> String {
    match path {
        Some(p) => format!("path does not exist: {}", p.display()),
        None => "no input path received".to_string(),
    }
}

impl DriverError {
    /// Process exit status for this failure class; stable across releases.
    /// Starts at 3 since clap exits with 2 on usage errors.
    pub fn exit_code(&self) -> u8 {
        match self {
            DriverError::MissingPath { .. } => 3,
            DriverError::InvalidInputKind { .. } => 4,
            DriverError::Assemble { source, .. } => match source {
                AsmError::AddressOutOfRange { .. } => 5,
                AsmError::UnknownMnemonic { .. } => 6,
                AsmError::MalformedInstruction { .. } => 7,
            },
            DriverError::InvalidMap { .. } => 8,
            DriverError::Io { .. } => 9,
        }
    }

    fn io(path: &Path, source: io::Error) -> Self {
        DriverError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result of a run. `failures` is only non-empty with `keep_going`, and keeps
/// the order in which files were translated.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub translated: Vec<PathBuf>,
    pub failures: Vec<DriverError>,
}

impl BatchReport {
    /// Exit status of the first failure, if any file failed.
    pub fn exit_code(&self) -> Option<u8> {
        self.failures.first().map(DriverError::exit_code)
    }
}

/// Loads the mnemonic table from `path`, or the built-in Hack table.
pub fn load_map(path: Option<&Path>) -> Result<MnemonicMap, DriverError> {
    match path {
        Some(p) => {
            let text = fs::read_to_string(p).map_err(|e| DriverError::io(p, e))?;
            MnemonicMap::parse(&text).map_err(|source| DriverError::InvalidMap {
                origin: p.display().to_string(),
                source,
            })
        }
        None => MnemonicMap::hack().map_err(|source| DriverError::InvalidMap {
            origin: "built-in table".to_string(),
            source,
        }),
    }
}

fn is_source(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == SOURCE_EXT)
}

/// Expands the input path into the source files to translate, in name order.
pub fn collect_inputs(path: Option<&Path>) -> Result<Vec<PathBuf>, DriverError> {
    let path = path.ok_or(DriverError::MissingPath { path: None })?;
    if !path.exists() {
        return Err(DriverError::MissingPath {
            path: Some(path.to_path_buf()),
        });
    }
    if path.is_file() {
        if !is_source(path) {
            return Err(DriverError::InvalidInputKind {
                path: path.to_path_buf(),
            });
        }
        return Ok(vec![path.to_path_buf()]);
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(path).map_err(|e| DriverError::io(path, e))? {
        let p = entry.map_err(|e| DriverError::io(path, e))?.path();
        if p.is_file() && is_source(&p) {
            files.push(p);
        }
    }
    if files.is_empty() {
        return Err(DriverError::InvalidInputKind {
            path: path.to_path_buf(),
        });
    }
    files.sort();
    Ok(files)
}

pub fn output_path(source: &Path) -> PathBuf {
    source.with_extension(OUTPUT_EXT)
}

pub fn symbols_path(source: &Path) -> PathBuf {
    source.with_extension(SYMBOLS_EXT)
}

enum Failure {
    Asm(AsmError),
    Io(io::Error),
}

impl From<AsmError> for Failure {
    fn from(e: AsmError) -> Self {
        Failure::Asm(e)
    }
}

/// Translates one `.asm` file into its `.hack` sibling and returns the output
/// path. A failed translation leaves no output file behind.
pub fn translate_file(
    source: &Path,
    map: &MnemonicMap,
    cfg: &DriverConfig,
) -> Result<PathBuf, DriverError> {
    let text = fs::read_to_string(source).map_err(|e| DriverError::io(source, e))?;
    let out_path = output_path(source);
    info!("translating {} -> {}", source.display(), out_path.display());

    let resolved = Assembler::new(map)
        .resolve(clean(&text))
        .map_err(|e| DriverError::Assemble {
            path: source.to_path_buf(),
            source: e,
        })?;

    let file = File::create(&out_path).map_err(|e| DriverError::io(&out_path, e))?;
    let mut out = BufWriter::new(file);
    let written = resolved
        .encode_each(|word| writeln!(out, "{word}").map_err(Failure::Io))
        .and_then(|symbols| out.flush().map(|_| symbols).map_err(Failure::Io));
    drop(out);

    let symbols = match written {
        Ok(symbols) => symbols,
        Err(failure) => {
            if let Err(e) = fs::remove_file(&out_path) {
                warn!("could not remove partial output {}: {e}", out_path.display());
            }
            return Err(match failure {
                Failure::Asm(e) => DriverError::Assemble {
                    path: source.to_path_buf(),
                    source: e,
                },
                Failure::Io(e) => DriverError::io(&out_path, e),
            });
        }
    };

    if cfg.emit_symbols {
        let sym_path = symbols_path(source);
        let file = File::create(&sym_path).map_err(|e| DriverError::io(&sym_path, e))?;
        let mut w = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut w, &symbols)
            .map_err(io::Error::from)
            .and_then(|_| w.flush())
            .map_err(|e| DriverError::io(&sym_path, e))?;
    }
    Ok(out_path)
}

/// Translates a file, or every `.asm` file of a directory. Without
/// `keep_going` the first failing file aborts the run.
pub fn run(
    path: Option<&Path>,
    map: &MnemonicMap,
    cfg: &DriverConfig,
) -> Result<BatchReport, DriverError> {
    let mut report = BatchReport::default();
    for source in collect_inputs(path)? {
        match translate_file(&source, map, cfg) {
            Ok(out) => report.translated.push(out),
            Err(e) if cfg.keep_going => {
                warn!("skipping {}: {e}", source.display());
                report.failures.push(e);
            }
            Err(e) => return Err(e),
        }
    }
    Ok(report)
}
